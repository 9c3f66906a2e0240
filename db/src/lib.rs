mod friend;
mod intro;
mod memory;
mod postgres;
mod user;

use std::sync::Arc;

use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use tracing::info;

use abi::config::{Config, StoreKind};
use abi::errors::Error;

pub use crate::friend::FriendRepo;
pub use crate::intro::IntroRequestRepo;
pub use crate::memory::MemoryStore;
pub use crate::postgres::{PostgresFriend, PostgresIntroRequest, PostgresUser};
pub use crate::user::UserRepo;

/// every store the core needs, behind trait objects
#[derive(Debug, Clone)]
pub struct DbRepo {
    pub user: Arc<dyn UserRepo>,
    pub friend: Arc<dyn FriendRepo>,
    pub intro: Arc<dyn IntroRequestRepo>,
}

impl DbRepo {
    pub async fn new(config: &Config) -> Result<Self, Error> {
        match config.db.store {
            StoreKind::Postgres => {
                let pool = PgPoolOptions::new()
                    .max_connections(config.db.postgres.max_connections)
                    .connect(&config.db.postgres.url())
                    .await?;
                migrate(&pool).await?;
                info!(
                    "connected to postgres {}:{}/{}",
                    config.db.postgres.host, config.db.postgres.port, config.db.postgres.database
                );
                Ok(Self::postgres(pool))
            }
            StoreKind::Memory => {
                info!("using in-memory store, data is lost on shutdown");
                Ok(Self::memory())
            }
        }
    }

    pub fn postgres(pool: PgPool) -> Self {
        Self {
            user: Arc::new(PostgresUser::new(pool.clone())),
            friend: Arc::new(PostgresFriend::new(pool.clone())),
            intro: Arc::new(PostgresIntroRequest::new(pool)),
        }
    }

    pub fn memory() -> Self {
        let store = Arc::new(MemoryStore::new());
        Self {
            user: store.clone(),
            friend: store.clone(),
            intro: store,
        }
    }
}

pub async fn migrate(pool: &PgPool) -> Result<(), Error> {
    sqlx::migrate!("./migrations")
        .run(pool)
        .await
        .map_err(Error::internal)
}

pub(crate) fn now() -> i64 {
    chrono::Utc::now().timestamp_millis()
}
