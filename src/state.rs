use std::sync::Arc;

use crate::auth::TokenService;
use crate::config::Config;
use crate::credentials::CredentialStore;
use crate::error::AppError;
use crate::store::PgStore;
use crate::tasks::TaskStore;

/// Everything a request handler needs, built once at startup and shared
/// through `web::Data`.
#[derive(Clone)]
pub struct AppState {
    pub tokens: TokenService,
    pub credentials: CredentialStore,
    pub tasks: TaskStore,
}

impl AppState {
    pub fn new(tokens: TokenService, credentials: CredentialStore, tasks: TaskStore) -> Self {
        Self {
            tokens,
            credentials,
            tasks,
        }
    }

    pub fn from_postgres(config: &Config, store: PgStore) -> Result<Self, AppError> {
        let store = Arc::new(store);
        Ok(Self::new(
            TokenService::new(&config.jwt_secret, config.token_ttl()),
            CredentialStore::new(store.clone(), config.bcrypt_cost)?,
            TaskStore::new(store),
        ))
    }

    #[cfg(test)]
    pub(crate) fn in_memory() -> Self {
        use crate::store::memory::MemoryStore;

        let store = Arc::new(MemoryStore::new());
        let credentials = CredentialStore::new(store.clone(), 4)
            .unwrap_or_else(|e| panic!("test credential store: {}", e));
        Self::new(
            TokenService::new("test-secret", chrono::Duration::minutes(30)),
            credentials,
            TaskStore::new(store),
        )
    }
}
