//! Trait definitions for external interactions
//!
//! These traits define the boundary between the service layer and the
//! network engine. Concrete engines live in other crates.

use crate::{InputBundle, KnowledgeBase, ResultBundle};
use std::path::Path;

/// The domain engine invoked by the service boundary.
///
/// An implementation may read and write working files rooted at the
/// per-call `workdir` it is handed; it must not touch process-global
/// state, so concurrent calls stay independent. Errors are surfaced to
/// the caller verbatim through `Display`.
pub trait NetworkEngine {
    /// Error type reported by engine invocations.
    type Error: std::fmt::Display;

    /// Compute a road network for the given inputs.
    ///
    /// The result bundle must carry `nodes`, `edges`, `demand_list`
    /// and `supply_list`.
    fn create_network(
        &self,
        workdir: &Path,
        input: &InputBundle,
        kb: &KnowledgeBase,
    ) -> Result<ResultBundle, Self::Error>;

    /// Optimize a previously created network.
    ///
    /// The result bundle must carry the nine structured solution keys
    /// plus a plain-text `report`.
    fn optimize_network(
        &self,
        workdir: &Path,
        input: &InputBundle,
        kb: &KnowledgeBase,
    ) -> Result<ResultBundle, Self::Error>;
}
