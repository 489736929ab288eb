use std::sync::Arc;
use tokio::sync::{Semaphore, SemaphorePermit};
use crate::config::Config;
use crate::crypto::token::TokenService;
use crate::error::{AppError, Result};
use crate::repositories::{
    memory::MemoryRepository,
    travel::{PgTravelRepository, TravelRepository},
    user::{PgUserRepository, UserRepository},
};

/// The number of uploads allowed to write to disk at once.
pub const UPLOAD_SLOTS: usize = 16;

/// Bounds how many uploads write to disk concurrently.
#[derive(Clone)]
pub struct UploadLimiter {
    semaphore: Arc<Semaphore>,
}

impl UploadLimiter {
    /// Creates a new `UploadLimiter`.
    pub fn new(slots: usize) -> Self {
        Self {
            semaphore: Arc::new(Semaphore::new(slots)),
        }
    }

    /// Waits for a free slot.
    pub async fn acquire(&self) -> Result<SemaphorePermit<'_>> {
        self.semaphore
            .acquire()
            .await
            .map_err(|_| AppError::Internal("Upload limiter closed".to_string()))
    }
}

/// The application's state.
#[derive(Clone)]
pub struct AppState {
    /// The credential store.
    pub users: Arc<dyn UserRepository>,
    /// The travel store.
    pub travels: Arc<dyn TravelRepository>,
    /// Issues and verifies bearer tokens.
    pub tokens: TokenService,
    /// The application's configuration.
    pub config: Arc<Config>,
    /// The upload limiter.
    pub upload_limiter: UploadLimiter,
}

impl AppState {
    /// Creates a new `AppState`, connecting to PostgreSQL when configured.
    ///
    /// # Arguments
    ///
    /// * `config` - The application's configuration.
    ///
    /// # Returns
    ///
    /// A `Result` containing the `AppState`.
    pub async fn new(config: &Config) -> Result<Self> {
        match config.database_url.as_deref() {
            Some(url) => {
                let pool = crate::db::create_pool(url)?;
                crate::db::migrate(&pool).await?;
                tracing::info!("✅ PostgreSQL pool initialized");

                Ok(Self::with_repositories(
                    config,
                    Arc::new(PgUserRepository::new(pool.clone())),
                    Arc::new(PgTravelRepository::new(pool)),
                ))
            }
            None => {
                tracing::warn!("⚠️ DATABASE_URL not set, data lives in memory and is lost on restart");
                Ok(Self::in_memory(config))
            }
        }
    }

    /// Creates an `AppState` backed by a fresh in-memory store.
    pub fn in_memory(config: &Config) -> Self {
        let store = MemoryRepository::new();
        Self::with_repositories(config, Arc::new(store.clone()), Arc::new(store))
    }

    /// Creates an `AppState` over the given repositories.
    pub fn with_repositories(
        config: &Config,
        users: Arc<dyn UserRepository>,
        travels: Arc<dyn TravelRepository>,
    ) -> Self {
        let tokens = TokenService::new(&config.jwt_secret, config.token_ttl_hours);
        tracing::info!("✅ Token service initialized ({}h lifetime)", config.token_ttl_hours);

        Self {
            users,
            travels,
            tokens,
            config: Arc::new(config.clone()),
            upload_limiter: UploadLimiter::new(UPLOAD_SLOTS),
        }
    }
}
