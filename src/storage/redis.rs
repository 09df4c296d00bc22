//! Redis state backend.

use async_trait::async_trait;
use redis::{AsyncCommands, Client, aio::ConnectionManager};
use url::Url;

use crate::config::StoreEnv;
use crate::error::{AppError, Result};
use crate::storage::StateStore;

/// Redis-backed state store.
///
/// Holds a single connection manager for the whole run; each call works on
/// a cheap clone of it.
#[derive(Clone)]
pub struct RedisStore {
    connection: ConnectionManager,
}

impl RedisStore {
    /// Connect using the `DB_ADDR`/`DB_PASSWORD` settings, database 0.
    pub async fn connect(env: &StoreEnv) -> Result<Self> {
        let url = connection_url(env)?;
        let client = Client::open(url.as_str())?;
        let connection = ConnectionManager::new(client).await?;
        log::info!("Connected to Redis at {}", env.addr);
        Ok(Self { connection })
    }
}

/// Build `redis://[:password@]host:port/0` from the environment settings.
fn connection_url(env: &StoreEnv) -> Result<Url> {
    let addr = env
        .addr
        .trim_start_matches("redis://")
        .trim_end_matches('/');
    let mut url = Url::parse(&format!("redis://{addr}/0"))?;
    if url.host_str().is_none() {
        return Err(AppError::config(format!("DB_ADDR '{}' has no host", env.addr)));
    }
    if let Some(password) = &env.password {
        url.set_password(Some(password))
            .map_err(|_| AppError::config("DB_PASSWORD cannot be applied to DB_ADDR"))?;
    }
    Ok(url)
}

#[async_trait]
impl StateStore for RedisStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        let mut connection = self.connection.clone();
        let value: Option<String> = connection.get(key).await?;
        Ok(value)
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut connection = self.connection.clone();
        connection.set::<_, _, ()>(key, value).await?;
        Ok(())
    }
}
