//! Per-unit-of-work resource acquisition
//!
//! Components never hold a long-lived store connection or API session.
//! They are handed a [`ResourceProvider`] at construction and open what they
//! need around each unit of work; dropping the handle closes it.

use crate::config::Config;
use crate::source::{ContentSource, RedditClient};
use crate::storage::{SqliteStorage, Storage};
use crate::Result;
use std::path::Path;
use std::sync::Arc;

/// Opens store connections and API sessions on demand
pub trait ResourceProvider: Send + Sync {
    /// Opens a new connection to the persisted store
    fn open_store(&self) -> Result<Box<dyn Storage + Send>>;

    /// Opens a new session against the remote API
    fn open_source(&self) -> Result<Arc<dyn ContentSource>>;
}

/// Production provider: SQLite file plus a Reddit HTTP session
#[derive(Debug, Clone)]
pub struct Resources {
    config: Config,
}

impl Resources {
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }
}

impl ResourceProvider for Resources {
    fn open_store(&self) -> Result<Box<dyn Storage + Send>> {
        let storage = SqliteStorage::new(Path::new(&self.config.database.path))?;
        Ok(Box::new(storage))
    }

    fn open_source(&self) -> Result<Arc<dyn ContentSource>> {
        let client = RedditClient::new(&self.config.api)?;
        Ok(Arc::new(client))
    }
}
