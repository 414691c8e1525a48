//! gRPC server configuration and lifecycle management.
//!
//! Binds the two service operations to a network listener. Message
//! size limits are lifted in both directions: graph and solution
//! payloads must never be rejected on size grounds.

use crate::proto::gis_service_server::GisServiceServer;
use crate::service::GisServiceImpl;
use gisnet_domain::NetworkEngine;
use thiserror::Error;
use tracing::info;

/// Server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Listen address
    pub addr: String,

    /// Listen port
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            addr: "127.0.0.1".to_string(),
            port: 50051,
        }
    }
}

impl ServerConfig {
    /// Create a new server configuration
    pub fn new(addr: impl Into<String>, port: u16) -> Self {
        Self {
            addr: addr.into(),
            port,
        }
    }

    /// Get the full listen address
    pub fn full_address(&self) -> String {
        format!("{}:{}", self.addr, self.port)
    }
}

/// Transport adapter failure; fatal to the process.
#[derive(Debug, Error)]
pub enum ServerError {
    /// The configured listen address does not parse
    #[error("invalid listen address: {0}")]
    Addr(#[from] std::net::AddrParseError),

    /// Binding or serving failed
    #[error("transport error: {0}")]
    Transport(#[from] tonic::transport::Error),
}

/// Start the gRPC server.
///
/// # Errors
/// Returns error if the listen address is invalid or the transport
/// fails to bind or serve.
pub async fn start_server<E>(
    config: ServerConfig,
    service: GisServiceImpl<E>,
) -> Result<(), ServerError>
where
    E: NetworkEngine + Send + Sync + 'static,
{
    let addr = config.full_address().parse()?;

    let service = GisServiceServer::new(service)
        .max_decoding_message_size(usize::MAX)
        .max_encoding_message_size(usize::MAX);

    info!("gis service listening on {addr}");

    tonic::transport::Server::builder()
        .add_service(service)
        .serve(addr)
        .await?;

    Ok(())
}
