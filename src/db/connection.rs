use std::sync::Arc;

use mongodb::{options::ClientOptions, Client};
use tracing::info;

use crate::config::{Config, MongoConfig, StorageBackend};
use crate::store::{MemoryStore, MongoStore, Store};
use crate::utils::error::{AppError, AppResult};

pub async fn init_mongo(config: &MongoConfig) -> AppResult<MongoStore> {
    let mut client_options = ClientOptions::parse(&config.uri)
        .await
        .map_err(|e| AppError::DatabaseError(format!("Failed to parse MongoDB URI: {}", e)))?;

    client_options.app_name = Some("TeamPolls".to_string());

    let client = Client::with_options(client_options)
        .map_err(|e| AppError::DatabaseError(format!("Failed to initialize MongoDB client: {}", e)))?;

    let store = MongoStore::new(client.clone(), client.database(&config.db_name));
    store.ensure_indexes().await?;

    info!(db = %config.db_name, "database connection successful");
    Ok(store)
}

/// Builds the backend selected by `STORAGE_BACKEND`.
pub async fn init_store(config: &Config) -> AppResult<Arc<dyn Store>> {
    match config.storage {
        StorageBackend::Memory => {
            info!("using in-memory poll store");
            Ok(Arc::new(MemoryStore::new()))
        }
        StorageBackend::MongoDB => {
            let mongo = config.mongo.as_ref().ok_or_else(|| {
                AppError::InternalError("MongoDB backend selected without MONGO_URI".to_string())
            })?;
            Ok(Arc::new(init_mongo(mongo).await?))
        }
    }
}
