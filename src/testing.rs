use anyhow::Result;
use tempfile::TempDir;
use tracing::subscriber;
use tracing_subscriber::{layer::SubscriberExt, Layer};

use crate::{config::ServerConfig, routes::RouteState, service::Service};

pub struct TestService {
    pub service: Service,
    _temp_dir: TempDir,
}

impl TestService {
    pub async fn new() -> Result<Self> {
        let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("trace"));
        let _ = subscriber::set_global_default(
            tracing_subscriber::registry()
                .with(tracing_subscriber::fmt::layer().with_filter(env_filter)),
        );

        let temp_dir = tempfile::tempdir()?;

        let cfg = ServerConfig {
            database: blob_store::DatabaseConfig {
                path: temp_dir
                    .path()
                    .join("blobs.db")
                    .to_str()
                    .unwrap()
                    .to_string(),
                max_connections: 2,
            },
            ..Default::default()
        };
        let service = Service::new(cfg).await?;

        Ok(Self {
            service,
            _temp_dir: temp_dir,
        })
    }

    pub fn route_state(&self) -> RouteState {
        RouteState {
            blob_store: self.service.blob_store.clone(),
            user_store: self.service.user_store.clone(),
        }
    }
}
