//! mockd — programmable HTTP mock server (entry point).

use std::sync::Arc;

use mockd::config::ServerConfig;
use mockd::http::HttpServer;
use mockd::lifecycle::Shutdown;
use mockd::store::Store;

#[tokio::main]
async fn main() {
    let config = ServerConfig::from_env();
    mockd::observability::init(&config);

    tracing::info!("mockd v{} starting", env!("CARGO_PKG_VERSION"));

    let store = match Store::initialize(config.clone()).await {
        Ok(store) => Arc::new(store),
        Err(e) => {
            tracing::error!(error = %e, "failed to initialize expectation store");
            std::process::exit(1);
        }
    };

    let bind_address = format!("{}:{}", config.host, config.port);
    let listener = match tokio::net::TcpListener::bind(&bind_address).await {
        Ok(listener) => listener,
        Err(e) => {
            tracing::error!(address = %bind_address, error = %e, "failed to bind listener");
            std::process::exit(1);
        }
    };
    let local_addr = listener.local_addr().expect("bound listener has a local address");
    tracing::info!(address = %local_addr, "listening for connections");

    let shutdown = Shutdown::new();
    let watcher_shutdown = shutdown.subscribe();
    if config.watch_initialization_json {
        if let Some(path) = config.initialization_json_path.clone() {
            let watcher_store = store.clone();
            tokio::spawn(async move {
                mockd::persistence::watch_initialization_file(watcher_store, path, watcher_shutdown)
                    .await;
            });
        }
    }

    let server = HttpServer::new(store, config);
    if let Err(e) = server.run(listener, shutdown.subscribe()).await {
        tracing::error!(error = %e, "server exited with error");
        std::process::exit(1);
    }

    tracing::info!("shutdown complete");
}
