use std::{env, str::FromStr};

use tracing::info;

use crate::utils::error::{AppError, AppResult};

const DEFAULT_SERVER_ADDR: &str = "0.0.0.0:8000";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StorageBackend {
    #[default]
    Memory,
    MongoDB,
}

impl FromStr for StorageBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "memory" | "mem" => Ok(StorageBackend::Memory),
            "mongodb" | "mongo" => Ok(StorageBackend::MongoDB),
            _ => Err(format!("Unknown storage backend: {}", s)),
        }
    }
}

#[derive(Debug, Clone)]
pub struct MongoConfig {
    pub uri: String,
    pub db_name: String,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub server_addr: String,
    pub cors_origin: String,
    pub storage: StorageBackend,
    /// Present only for the MongoDB backend.
    pub mongo: Option<MongoConfig>,
}

impl Config {
    /// Reads the process environment. Call `dotenvy::dotenv()` first to pick up `.env`.
    pub fn from_env() -> AppResult<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> AppResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let server_addr = lookup("SERVER_ADDR").unwrap_or_else(|| {
            info!("SERVER_ADDR not set, using default {}", DEFAULT_SERVER_ADDR);
            DEFAULT_SERVER_ADDR.to_string()
        });

        let cors_origin = required(&lookup, "CORS_ORIGIN")?;

        let storage = match lookup("STORAGE_BACKEND") {
            Some(value) => value.parse::<StorageBackend>().map_err(AppError::InternalError)?,
            None => StorageBackend::default(),
        };

        let mongo = match storage {
            StorageBackend::MongoDB => Some(MongoConfig {
                uri: required(&lookup, "MONGO_URI")?,
                db_name: required(&lookup, "DB_NAME")?,
            }),
            StorageBackend::Memory => None,
        };

        Ok(Self {
            server_addr,
            cors_origin,
            storage,
            mongo,
        })
    }
}

fn required<F>(lookup: &F, key: &str) -> AppResult<String>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(key)
        .filter(|value| !value.trim().is_empty())
        .ok_or_else(|| AppError::InternalError(format!("{} must be set", key)))
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn config_from(pairs: &[(&str, &str)]) -> AppResult<Config> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_to_memory_backend() {
        let config = config_from(&[("CORS_ORIGIN", "http://localhost:3000")]).unwrap();
        assert_eq!(config.storage, StorageBackend::Memory);
        assert_eq!(config.server_addr, DEFAULT_SERVER_ADDR);
        assert!(config.mongo.is_none());
    }

    #[test]
    fn cors_origin_is_required() {
        assert!(matches!(config_from(&[]), Err(AppError::InternalError(_))));
    }

    #[test]
    fn mongo_backend_needs_uri_and_db() {
        let missing = config_from(&[
            ("CORS_ORIGIN", "http://localhost:3000"),
            ("STORAGE_BACKEND", "mongo"),
            ("MONGO_URI", "mongodb://localhost:27017"),
        ]);
        assert!(missing.is_err());

        let config = config_from(&[
            ("CORS_ORIGIN", "http://localhost:3000"),
            ("STORAGE_BACKEND", "MongoDB"),
            ("MONGO_URI", "mongodb://localhost:27017"),
            ("DB_NAME", "polls"),
        ])
        .unwrap();
        assert_eq!(config.storage, StorageBackend::MongoDB);
        assert_eq!(config.mongo.unwrap().db_name, "polls");
    }

    #[test]
    fn unknown_backend_is_rejected() {
        let result = config_from(&[
            ("CORS_ORIGIN", "http://localhost:3000"),
            ("STORAGE_BACKEND", "redis"),
        ]);
        assert!(result.is_err());
    }
}
