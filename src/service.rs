use std::{net::SocketAddr, sync::Arc};

use anyhow::{Context, Result};
use axum_server::Handle;
use blob_store::{BlobStore, UserStore};
use tokio::signal;
use tracing::info;

use crate::{
    config::ServerConfig,
    routes::{create_routes, RouteState},
};

#[derive(Clone)]
pub struct Service {
    pub config: ServerConfig,
    pub blob_store: Arc<BlobStore>,
    pub user_store: Arc<UserStore>,
}

impl Service {
    /// Confirm the database exists, ensure the schema, and build the
    /// stores over one shared bounded pool. Any failure here aborts
    /// startup before the listener binds.
    pub async fn new(config: ServerConfig) -> Result<Self> {
        let pool = blob_store::create_pool(&config.database)
            .await
            .context("error initializing the database")?;
        let blob_store = Arc::new(BlobStore::new(pool.clone()));
        let user_store = Arc::new(UserStore::new(pool));

        Ok(Self {
            config,
            blob_store,
            user_store,
        })
    }

    pub async fn start(&self) -> Result<()> {
        let route_state = RouteState {
            blob_store: self.blob_store.clone(),
            user_store: self.user_store.clone(),
        };

        let handle = Handle::new();
        let handle_sh = handle.clone();
        tokio::spawn(async move {
            shutdown_signal(handle_sh).await;
            info!("graceful shutdown signal received, shutting down server gracefully");
        });

        let addr: SocketAddr = self.config.listen_addr.parse()?;
        info!("server api listening on {}", self.config.listen_addr);
        let routes = create_routes(route_state, &self.config);
        axum_server::bind(addr)
            .handle(handle)
            .serve(routes.into_make_service())
            .await?;

        Ok(())
    }
}

async fn shutdown_signal(handle: Handle) {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
        },
        _ = terminate => {
        },
    }
    handle.shutdown();
    info!("signal received, shutting down server gracefully");
}
