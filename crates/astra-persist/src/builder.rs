use serde::Deserialize;

use crate::error::{PersistError, Result};
use crate::PersistClient;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    #[default]
    Memory,
    Mongodb,
}

pub struct PersistClientBuilder {
    backend: StorageBackend,
    mongodb_uri: Option<String>,
    database: Option<String>,
}

impl PersistClientBuilder {
    pub fn new() -> Self {
        Self {
            backend: StorageBackend::Memory,
            mongodb_uri: None,
            database: None,
        }
    }

    pub fn backend(mut self, backend: StorageBackend) -> Self {
        self.backend = backend;
        self
    }

    pub fn mongodb_uri(mut self, uri: impl Into<String>) -> Self {
        self.mongodb_uri = Some(uri.into());
        self
    }

    pub fn database(mut self, db: impl Into<String>) -> Self {
        self.database = Some(db.into());
        self
    }

    pub async fn build(self) -> Result<PersistClient> {
        match self.backend {
            StorageBackend::Memory => {
                tracing::warn!("Using in-memory storage; posts are lost on restart");
                Ok(PersistClient::in_memory())
            }
            StorageBackend::Mongodb => self.build_mongo().await,
        }
    }

    #[cfg(feature = "mongodb")]
    async fn build_mongo(self) -> Result<PersistClient> {
        let mongodb_uri = self
            .mongodb_uri
            .filter(|uri| !uri.is_empty())
            .ok_or_else(|| PersistError::Internal("mongodb_uri is required".to_string()))?;
        let database = self
            .database
            .ok_or_else(|| PersistError::Internal("database is required".to_string()))?;

        let store = crate::dbs::MongoStore::connect(&mongodb_uri, &database).await?;
        tracing::info!(database = %database, "Connected to MongoDB");
        Ok(PersistClient::from_store(std::sync::Arc::new(store)))
    }

    #[cfg(not(feature = "mongodb"))]
    async fn build_mongo(self) -> Result<PersistClient> {
        Err(PersistError::Internal(
            "storage backend 'mongodb' requires the `mongodb` feature".to_string(),
        ))
    }
}

impl Default for PersistClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}
