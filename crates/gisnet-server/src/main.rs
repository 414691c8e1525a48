//! GIS module service entry point.
//!
//! Boots the gRPC boundary: configuration, knowledge base, engine,
//! worker runtime, transport.

mod config;
mod kb_data;

use config::{ConfigError, ServiceConfig};
use gisnet_engine::GisEngine;
use gisnet_grpc::server::ServerError;
use gisnet_grpc::{start_server, GisServiceImpl, ServerConfig};
use std::env;
use std::process;
use std::sync::Arc;
use thiserror::Error;
use tracing::{info, Level};

/// Startup failure; the process exits nonzero.
#[derive(Debug, Error)]
enum ServiceError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("server error: {0}")]
    Server(#[from] ServerError),

    #[error("runtime error: {0}")]
    Runtime(#[from] std::io::Error),
}

fn main() {
    // Log to stderr so stdout stays clean for supervisors
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_max_level(Level::INFO)
        .init();

    if let Err(e) = run() {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

fn run() -> Result<(), ServiceError> {
    let args: Vec<String> = env::args().collect();

    let config = if args.len() > 2 && args[1] == "--config" {
        ServiceConfig::from_file(&args[2])?
    } else if args.len() > 1 && args[1] == "--help" {
        print_help();
        process::exit(0);
    } else {
        ServiceConfig::from_env()?
    };
    let policy = config.codec_policy()?;

    let kb = Arc::new(kb_data::knowledge_base());
    let engine = Arc::new(GisEngine::new());
    let service = GisServiceImpl::new(engine, kb, policy, config.sim_root.clone());
    let server = ServerConfig::new(config.host.clone(), config.port);

    info!(
        "gis module starting at {}:{} ({} workers, {} codec)",
        config.host,
        config.port,
        config.workers,
        policy.as_str()
    );

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(config.workers)
        .max_blocking_threads(config.workers)
        .enable_all()
        .build()?;
    runtime.block_on(start_server(server, service))?;

    Ok(())
}

fn print_help() {
    println!("GisNet Server - geospatial network-engineering service");
    println!();
    println!("USAGE:");
    println!("    gisnet-server [--config <path-to-config.toml>]");
    println!();
    println!("OPTIONS:");
    println!("    --config <file>    Load configuration from TOML file");
    println!("    --help             Print this help message");
    println!();
    println!("ENVIRONMENT (used when no config file is given):");
    println!("    GRPC_HOST          Listen host (required)");
    println!("    GRPC_PORT          Listen port (required)");
    println!("    GRPC_WORKERS       Worker pool size (default: 10)");
    println!("    GIS_CODEC          Codec policy: plain | self-describing");
    println!("    GIS_SIM_ROOT       Simulation scratch root directory");
    println!();
}
