//! GisNet Domain Layer
//!
//! Core types shared by every layer of the geospatial network service.
//! It has no external dependencies and defines the value model, the
//! per-call bundles, the knowledge-base handle, and the trait seams
//! behind which the network engine lives.
//!
//! ## Key Concepts
//!
//! - **Value**: the closed set of payload shapes crossing the service
//!   boundary, including a tagged object variant for typed state
//! - **InputBundle / ResultBundle**: per-call field maps, never shared
//!   between calls
//! - **KnowledgeBase**: immutable reference data injected at startup
//! - **NetworkEngine**: the seam behind which create/optimize live

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod bundle;
pub mod kb;
pub mod traits;
pub mod value;

// Re-exports for convenience
pub use bundle::{keys, InputBundle, ResultBundle};
pub use kb::KnowledgeBase;
pub use traits::NetworkEngine;
pub use value::Value;
