use crate::config::{AppConfig, JwtConfig};
use crate::storage::{DocumentStore, JsonFileStore, MemoryStore};
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn DocumentStore>,
    pub config: Arc<AppConfig>,
}

impl AppState {
    pub async fn init() -> anyhow::Result<Self> {
        let config = Arc::new(AppConfig::from_env()?);

        let file_store = JsonFileStore::open(&config.data_file).await?;
        tracing::info!(path = %file_store.path().display(), "data file ready");
        let store = Arc::new(file_store) as Arc<dyn DocumentStore>;

        Ok(Self { store, config })
    }

    /// In-memory store and a fixed test signing key.
    pub fn fake() -> Self {
        let config = Arc::new(AppConfig {
            data_file: "memory".into(),
            jwt: JwtConfig {
                secret: "test".into(),
                issuer: "test-issuer".into(),
                audience: "test-aud".into(),
                ttl_days: 7,
            },
            cookie_secure: false,
        });

        let store = Arc::new(MemoryStore::new()) as Arc<dyn DocumentStore>;
        Self { store, config }
    }
}
