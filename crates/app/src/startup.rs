use std::path::PathBuf;

use crate::Result;

#[derive(Clone, Debug)]
pub struct AppPaths {
    pub app_data_dir: PathBuf,
    pub db_path: PathBuf,
}

impl AppPaths {
    pub fn new(app_data_dir: PathBuf) -> Self {
        let db_path = app_data_dir.join("events.db");
        Self {
            app_data_dir,
            db_path,
        }
    }

    /// `.data` under the working directory.
    pub fn in_working_dir() -> Result<Self> {
        Ok(Self::new(std::env::current_dir()?.join(".data")))
    }
}

pub fn ensure_app_data_dir(paths: &AppPaths) -> Result<()> {
    std::fs::create_dir_all(&paths.app_data_dir)?;
    Ok(())
}
