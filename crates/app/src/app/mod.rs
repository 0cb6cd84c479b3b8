use std::path::PathBuf;

use monitor_db::Db;

use crate::error::{AppError, Result};
use crate::services::AppServices;

/// Paths needed to run the local monitor.
#[derive(Clone, Debug)]
pub struct AppConfig {
    pub db_path: PathBuf,
    /// Transcript roots; `None` resolves the default locations on every load.
    pub claude_paths: Option<Vec<PathBuf>>,
}

/// Application state shared by the transport layers.
#[derive(Clone)]
pub struct AppState {
    pub config: AppConfig,
    pub services: AppServices,
}

impl AppState {
    pub fn new(db_path: PathBuf, claude_paths: Option<Vec<PathBuf>>) -> Self {
        let config = AppConfig {
            db_path,
            claude_paths,
        };
        let services = AppServices::new(&config);
        Self { config, services }
    }

    pub fn is_fresh_db(&self) -> bool {
        !self.config.db_path.exists()
    }

    pub fn setup_db(&self) -> Result<()> {
        setup_db(&self.config.db_path)
    }

    pub fn initialize(&self) -> Result<()> {
        let is_fresh_db = self.is_fresh_db();
        self.setup_db()
            .map_err(|err| AppError::Message(format!("initialize db: {}", err)))?;
        if is_fresh_db {
            tracing::info!(path = %self.config.db_path.display(), "created event database");
        }
        Ok(())
    }

    pub fn open_db(&self) -> Result<Db> {
        Ok(Db::open(&self.config.db_path)?)
    }
}

pub fn setup_db(path: &std::path::Path) -> Result<()> {
    let mut db = Db::open(path)?;
    db.migrate()?;
    Ok(())
}
