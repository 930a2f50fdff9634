pub mod redis_store;
pub mod storage;
pub mod watchlist;

use std::sync::Arc;

use crate::config::{Config, StorageBackend};

pub use redis_store::{create_redis_client, RedisStore};
pub use storage::{FileStore, KeyValueStore, MemoryStore};
pub use watchlist::{WatchlistStore, WATCHED_MOVIES_KEY};

/// Opens the storage backend selected in the configuration
pub async fn open_storage(config: &Config) -> anyhow::Result<Arc<dyn KeyValueStore>> {
    let storage: Arc<dyn KeyValueStore> = match config.storage_backend {
        StorageBackend::File => Arc::new(FileStore::new(&config.data_dir)),
        StorageBackend::Redis => {
            let client = create_redis_client(&config.redis_url)?;
            Arc::new(RedisStore::connect(client).await?)
        }
        StorageBackend::Memory => Arc::new(MemoryStore::new()),
    };

    tracing::info!(backend = ?config.storage_backend, "Watchlist storage opened");
    Ok(storage)
}
