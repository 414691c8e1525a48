//! Reference network engine.
//!
//! A deliberately simple, deterministic implementation of the
//! [`NetworkEngine`] seam so the service is runnable end to end:
//! create links every demand point to its nearest supply point,
//! optimize greedily assigns sinks to sources under capacity. Costs
//! and loss factors come from the `cf-module` input with
//! knowledge-base defaults. Both operations write a working snapshot
//! into the per-call scratch directory they are handed.

use gisnet_domain::{InputBundle, KnowledgeBase, NetworkEngine, ResultBundle};
use std::path::Path;
use thiserror::Error;

mod create;
mod inputs;
mod optimize;

/// Engine invocation failure.
#[derive(Debug, Error)]
pub enum EngineError {
    /// An input field did not have the shape the engine expects
    #[error("input `{field}` has unexpected shape: {reason}")]
    BadInput {
        /// Envelope field name of the offending input
        field: String,
        /// What was wrong with it
        reason: String,
    },

    /// A working snapshot could not be serialized
    #[error("working snapshot: {0}")]
    Snapshot(String),

    /// Working files could not be written
    #[error("working files: {0}")]
    Io(#[from] std::io::Error),
}

/// The built-in network engine.
#[derive(Debug, Clone, Copy, Default)]
pub struct GisEngine;

impl GisEngine {
    /// Create an engine instance.
    pub fn new() -> Self {
        Self
    }
}

impl NetworkEngine for GisEngine {
    type Error = EngineError;

    fn create_network(
        &self,
        workdir: &Path,
        input: &InputBundle,
        kb: &KnowledgeBase,
    ) -> Result<ResultBundle, Self::Error> {
        create::run_create_network(workdir, input, kb)
    }

    fn optimize_network(
        &self,
        workdir: &Path,
        input: &InputBundle,
        kb: &KnowledgeBase,
    ) -> Result<ResultBundle, Self::Error> {
        optimize::run_optimize_network(workdir, input, kb)
    }
}
