//! Results Store
//!
//! Results persist as a flat JSON object mapping job labels to mean
//! microseconds, so a report can be regenerated without rerunning anything:
//!
//! ```json
//! {
//!   "Serialize LoginViewModel Default": 100,
//!   "Serialize LoginViewModel Jil": 50
//! }
//! ```

use matrixbench_core::ResultsMap;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors reading or writing a results file
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed results file {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

impl StoreError {
    fn io(path: &Path, source: std::io::Error) -> Self {
        StoreError::Io {
            path: path.to_path_buf(),
            source,
        }
    }

    fn json(path: &Path, source: serde_json::Error) -> Self {
        StoreError::Json {
            path: path.to_path_buf(),
            source,
        }
    }
}

/// Write `results` to `path`, replacing any existing file.
///
/// Missing parent directories are created.
pub fn save_results(path: impl AsRef<Path>, results: &ResultsMap) -> Result<(), StoreError> {
    let path = path.as_ref();

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| StoreError::io(parent, e))?;
    }

    let json = serde_json::to_string_pretty(results).map_err(|e| StoreError::json(path, e))?;
    std::fs::write(path, json).map_err(|e| StoreError::io(path, e))?;

    tracing::debug!(path = %path.display(), entries = results.len(), "saved results");
    Ok(())
}

/// Read results previously written by [`save_results`]
pub fn load_results(path: impl AsRef<Path>) -> Result<ResultsMap, StoreError> {
    let path = path.as_ref();

    let content = std::fs::read_to_string(path).map_err(|e| StoreError::io(path, e))?;
    let results: ResultsMap =
        serde_json::from_str(&content).map_err(|e| StoreError::json(path, e))?;

    tracing::debug!(path = %path.display(), entries = results.len(), "loaded results");
    Ok(results)
}
