//! Entry point for the `waca-gateway` HTTP server.

use std::sync::Arc;

use tracing::info;
use tracing_subscriber::EnvFilter;
use waca_executor::{CompileRunner, Toolchain};
use waca_gateway::{config::GatewayConfig, routes::create_router};

#[tokio::main]
async fn main() {
    let config = match GatewayConfig::load() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("waca-gateway: {e}");
            std::process::exit(1);
        }
    };

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.default_log_filter()));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let toolchain = config.toolchain();

    let version = match toolchain.version().await {
        Ok(v) => v,
        Err(e) => {
            tracing::error!(invocation = %config.arduino_invocation, error = %e, "arduino-cli version probe failed");
            std::process::exit(1);
        }
    };
    let dirs = match toolchain.directories().await {
        Ok(d) => d,
        Err(e) => {
            tracing::error!(error = %e, "arduino-cli config dump failed");
            std::process::exit(1);
        }
    };
    info!(toolchain = %version, "toolchain ready");
    for dir in dirs.iter() {
        tracing::debug!(dir = %dir.display(), "sanitizing toolchain directory");
    }

    let runner = match CompileRunner::new(toolchain, config.compile_settings(), &dirs) {
        Ok(r) => Arc::new(r),
        Err(e) => {
            tracing::error!(error = %e, "unusable toolchain directories");
            std::process::exit(1);
        }
    };
    let app = create_router(runner);

    let addr = config.listen_addr();
    let listener = match tokio::net::TcpListener::bind(&addr).await {
        Ok(l) => l,
        Err(e) => {
            tracing::error!(addr = %addr, error = %e, "failed to bind");
            std::process::exit(1);
        }
    };

    info!(addr = %addr, "waca-gateway listening");

    if let Err(e) = axum::serve(listener, app).await {
        tracing::error!(error = %e, "server error");
        std::process::exit(1);
    }
}
