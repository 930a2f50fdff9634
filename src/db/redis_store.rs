use redis::{AsyncCommands, Client};

use crate::{db::storage::KeyValueStore, error::AppResult};

const NAMESPACE: &str = "reelwatch";

/// Creates a Redis client for the watchlist store
pub fn create_redis_client(redis_url: &str) -> anyhow::Result<Client> {
    let client = Client::open(redis_url)?;
    Ok(client)
}

/// Key-value slots kept as plain string keys on a Redis server
///
/// Values never expire.
#[derive(Clone)]
pub struct RedisStore {
    client: Client,
}

impl RedisStore {
    /// Wraps `client` once a connection to the server has succeeded
    pub async fn connect(client: Client) -> AppResult<Self> {
        client.get_multiplexed_async_connection().await?;
        Ok(Self { client })
    }
}

fn namespaced(key: &str) -> String {
    format!("{NAMESPACE}:{key}")
}

#[async_trait::async_trait]
impl KeyValueStore for RedisStore {
    async fn get(&self, key: &str) -> AppResult<Option<String>> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;
        let value: Option<String> = conn.get(namespaced(key)).await?;
        Ok(value)
    }

    async fn set(&self, key: &str, value: &str) -> AppResult<()> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;
        let _: () = conn.set(namespaced(key), value).await?;
        Ok(())
    }
}

// TODO: run the server-backed tests against a throwaway Redis container in CI
