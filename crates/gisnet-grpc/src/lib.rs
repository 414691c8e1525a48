#![warn(missing_docs)]

//! GisNet gRPC Service Layer
//!
//! The remote-procedure boundary of the geospatial network service.
//! Implements:
//! - RunCreateNetwork / RunOptimizeNetwork service operations
//! - Per-field payload decode/encode under the configured codec policy
//! - Scoped simulation context discipline around engine invocations
//! - Transport adapter with unbounded message sizes

// Include generated protobuf code
pub mod proto {
    //! Generated protobuf types and service definitions
    tonic::include_proto!("gisnet.v1");
}

pub mod context;
pub mod conversions;
pub mod server;
pub mod service;

pub use context::{ResourceError, SimContext};
pub use server::{start_server, ServerConfig};
pub use service::GisServiceImpl;
