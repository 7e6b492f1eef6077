//! Patient file discovery.

use std::path::{Path, PathBuf};

use crate::error::{IngestError, Result, read_error};

/// Extension of per-patient hourly tables.
pub const PATIENT_FILE_EXTENSION: &str = "psv";

const DATA_DIR_HINT: &str = "point the data directory at the folder of .psv patient files";

/// Lists every `.psv` file under `dir`, recursing into subdirectories.
///
/// Symlinked directories are skipped, so a link cycle cannot loop.
/// Returns files sorted by path.
pub fn list_patient_files(dir: &Path) -> Result<Vec<PathBuf>> {
    if !dir.is_dir() {
        return Err(IngestError::SourceUnavailable {
            path: dir.to_path_buf(),
            hint: DATA_DIR_HINT.to_string(),
        });
    }

    let mut files = Vec::new();
    let mut pending = vec![dir.to_path_buf()];

    while let Some(current) = pending.pop() {
        let entries =
            std::fs::read_dir(&current).map_err(|e| read_error(&current, e, DATA_DIR_HINT))?;
        for entry_result in entries {
            let entry = entry_result.map_err(|e| IngestError::FileRead {
                path: current.clone(),
                source: e,
            })?;
            let file_type = entry.file_type().map_err(|e| IngestError::FileRead {
                path: entry.path(),
                source: e,
            })?;
            let path = entry.path();

            // Directory symlinks are not followed.
            if file_type.is_dir() {
                pending.push(path);
                continue;
            }

            let is_patient_file = path
                .extension()
                .and_then(|ext| ext.to_str())
                .map(|ext| ext.eq_ignore_ascii_case(PATIENT_FILE_EXTENSION))
                .unwrap_or(false);

            if is_patient_file {
                files.push(path);
            }
        }
    }

    files.sort();
    tracing::debug!(dir = %dir.display(), file_count = files.len(), "discovered patient files");

    Ok(files)
}
