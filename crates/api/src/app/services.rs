//! Infrastructure wiring shared by every handler.

use std::sync::Arc;

use invoify_auth::{Hs256SessionTokens, SessionTokens};
use invoify_infra::{InMemoryStore, PgStore, Store, StoreResult};

use crate::config::{ApiConfig, StoreBackend};

#[derive(Clone)]
pub struct AppServices {
    pub store: Arc<dyn Store>,
    pub tokens: Arc<dyn SessionTokens>,
    pub bcrypt_cost: u32,
}

impl AppServices {
    pub fn new(store: Arc<dyn Store>, tokens: Arc<dyn SessionTokens>, bcrypt_cost: u32) -> Self {
        Self {
            store,
            tokens,
            bcrypt_cost,
        }
    }
}

/// Connect the configured store and build the token issuer.
///
/// Postgres gets its schema applied before the server starts accepting requests.
pub async fn build_services(config: &ApiConfig) -> StoreResult<AppServices> {
    let store: Arc<dyn Store> = match &config.store {
        StoreBackend::Memory => {
            tracing::info!("using in-memory store; data is lost on restart");
            Arc::new(InMemoryStore::new())
        }
        StoreBackend::Postgres { url, max_connections } => {
            let store = PgStore::connect(url, *max_connections).await?;
            store.apply_schema().await?;
            tracing::info!(max_connections, "connected to postgres");
            Arc::new(store)
        }
    };

    let tokens = Arc::new(Hs256SessionTokens::new(config.jwt_secret.as_bytes(), config.session_ttl));

    Ok(AppServices::new(store, tokens, config.bcrypt_cost))
}
