use std::path::PathBuf;

use monitor_app::AppPaths;

#[derive(Debug, Clone)]
pub struct DataDirResolution {
    pub paths: AppPaths,
    pub matched_existing: bool,
}

/// `--data-dir` when given, otherwise `.data` under the working directory.
pub fn resolve_data_dir(explicit: Option<PathBuf>) -> Result<DataDirResolution, String> {
    let paths = match explicit {
        Some(dir) => AppPaths::new(dir),
        None => AppPaths::in_working_dir().map_err(|err| format!("resolve data dir: {err}"))?,
    };
    let matched_existing = paths.db_path.exists();
    Ok(DataDirResolution {
        paths,
        matched_existing,
    })
}
