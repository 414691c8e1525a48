//! gRPC service implementation.
//!
//! Implements the GisService trait generated from proto definitions.
//! Each call composes: decode inputs -> acquire scoped context ->
//! invoke engine -> release context -> encode outputs, or surfaces a
//! call-level fault. Faults never crash a worker or touch other
//! in-flight calls.

use std::path::PathBuf;
use std::sync::Arc;
use tonic::{Request, Response, Status};
use tracing::debug;

use gisnet_codec::CodecPolicy;
use gisnet_domain::{KnowledgeBase, NetworkEngine, ResultBundle};

use crate::context::SimContext;
use crate::conversions::{
    decode_create_request, decode_optimize_request, encode_create_response,
    encode_optimize_response,
};
use crate::proto::gis_service_server::GisService;
use crate::proto::*;

/// Implementation of the GisService boundary.
///
/// Holds the engine, the process-wide knowledge base (read-only,
/// injected at construction), the active codec policy and the
/// simulation root. One instance serves all calls.
pub struct GisServiceImpl<E> {
    engine: Arc<E>,
    kb: Arc<KnowledgeBase>,
    policy: CodecPolicy,
    sim_root: PathBuf,
}

impl<E> GisServiceImpl<E> {
    /// Create a new service instance.
    pub fn new(
        engine: Arc<E>,
        kb: Arc<KnowledgeBase>,
        policy: CodecPolicy,
        sim_root: impl Into<PathBuf>,
    ) -> Self {
        Self {
            engine,
            kb,
            policy,
            sim_root: sim_root.into(),
        }
    }
}

impl<E> GisServiceImpl<E>
where
    E: NetworkEngine + Send + Sync + 'static,
{
    /// Run one engine invocation inside a scoped simulation context.
    ///
    /// The acquire -> invoke -> release sequence runs on the blocking
    /// pool. If the caller disconnects mid-call the task still runs to
    /// completion: the context is released by its Drop and the result
    /// is dropped instead of delivered.
    async fn run_scoped<F>(&self, invoke: F) -> Result<ResultBundle, Status>
    where
        F: FnOnce(&E, &std::path::Path, &KnowledgeBase) -> Result<ResultBundle, E::Error>
            + Send
            + 'static,
    {
        let engine = Arc::clone(&self.engine);
        let kb = Arc::clone(&self.kb);
        let sim_root = self.sim_root.clone();

        let task = tokio::task::spawn_blocking(move || {
            let context =
                SimContext::acquire(&sim_root).map_err(|e| Status::internal(e.to_string()))?;
            // Engine faults are surfaced verbatim; the context is
            // released by RAII on every exit path.
            invoke(&engine, context.path(), &kb).map_err(|e| Status::internal(e.to_string()))
        });
        task.await
            .map_err(|e| Status::internal(format!("engine task failed: {e}")))?
    }
}

#[tonic::async_trait]
impl<E> GisService for GisServiceImpl<E>
where
    E: NetworkEngine + Send + Sync + 'static,
{
    async fn run_create_network(
        &self,
        request: Request<CreateNetworkRequest>,
    ) -> Result<Response<CreateNetworkResponse>, Status> {
        let req = request.into_inner();

        let input = decode_create_request(self.policy, &req)
            .map_err(|e| Status::invalid_argument(e.to_string()))?;
        debug!("create-network inputs decoded");

        let result = self
            .run_scoped(move |engine, workdir, kb| engine.create_network(workdir, &input, kb))
            .await?;

        let response = encode_create_response(self.policy, result)
            .map_err(|e| Status::internal(e.to_string()))?;
        Ok(Response::new(response))
    }

    async fn run_optimize_network(
        &self,
        request: Request<OptimizeNetworkRequest>,
    ) -> Result<Response<OptimizeNetworkResponse>, Status> {
        let req = request.into_inner();

        let input = decode_optimize_request(self.policy, &req)
            .map_err(|e| Status::invalid_argument(e.to_string()))?;
        debug!("optimize-network inputs decoded");

        let result = self
            .run_scoped(move |engine, workdir, kb| engine.optimize_network(workdir, &input, kb))
            .await?;

        let response = encode_optimize_response(self.policy, result)
            .map_err(|e| Status::internal(e.to_string()))?;
        Ok(Response::new(response))
    }
}
