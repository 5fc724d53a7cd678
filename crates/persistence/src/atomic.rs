//! Atomic file replacement
//!
//! Content goes to `<target>.tmp` in the same directory, is flushed and
//! fsynced, then renamed over the target. Readers see either the previous
//! file or the new one, never a truncated mix.

use std::ffi::OsString;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use tracing::warn;

use crate::PersistenceError;

/// Temporary sibling used while `path` is being replaced
pub fn temp_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_else(|| OsString::from("snapshot"));
    name.push(".tmp");
    path.with_file_name(name)
}

/// Replace `path` with whatever `write` produces
///
/// Returns the number of bytes written. On any failure the temporary file is
/// removed and `path` is left untouched.
pub fn write_atomically<F>(path: &Path, write: F) -> Result<u64, PersistenceError>
where
    F: FnOnce(&mut BufWriter<File>) -> Result<(), PersistenceError>,
{
    let tmp = temp_path(path);

    let result = write_temp(&tmp, write).and_then(|bytes| {
        fs::rename(&tmp, path)
            .map_err(|e| PersistenceError::io("rename", path, e))
            .map(|()| bytes)
    });

    match result {
        Ok(bytes) => {
            sync_parent(path);
            Ok(bytes)
        }
        Err(e) => {
            if tmp.exists() {
                if let Err(cleanup) = fs::remove_file(&tmp) {
                    warn!(path = %tmp.display(), error = %cleanup, "Failed to remove temporary file");
                }
            }
            Err(e)
        }
    }
}

fn write_temp<F>(tmp: &Path, write: F) -> Result<u64, PersistenceError>
where
    F: FnOnce(&mut BufWriter<File>) -> Result<(), PersistenceError>,
{
    let file = File::create(tmp).map_err(|e| PersistenceError::io("create", tmp, e))?;
    let mut writer = BufWriter::new(file);

    write(&mut writer)?;

    writer
        .flush()
        .map_err(|e| PersistenceError::io("write", tmp, e))?;
    let file = writer
        .into_inner()
        .map_err(|e| PersistenceError::io("write", tmp, e.into_error()))?;
    file.sync_all()
        .map_err(|e| PersistenceError::io("fsync", tmp, e))?;

    let bytes = file
        .metadata()
        .map_err(|e| PersistenceError::io("stat", tmp, e))?
        .len();
    Ok(bytes)
}

/// Persist the rename itself; best effort
#[cfg(unix)]
fn sync_parent(path: &Path) {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        if let Ok(dir) = File::open(parent) {
            let _ = dir.sync_all();
        }
    }
}

#[cfg(not(unix))]
fn sync_parent(_path: &Path) {}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::tempdir;

    #[test]
    fn test_temp_path_is_sibling() {
        let tmp = temp_path(Path::new("/data/laps/telemetry.json"));
        assert_eq!(tmp, Path::new("/data/laps/telemetry.json.tmp"));
    }

    #[test]
    fn test_write_replaces_content() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("snap.json");
        fs::write(&path, "old").unwrap();

        let bytes = write_atomically(&path, |w| {
            w.write_all(b"{\"new\":true}")
                .map_err(|e| PersistenceError::io("write", Path::new("test"), e))
        })
        .unwrap();

        assert_eq!(bytes, 12);
        assert_eq!(fs::read_to_string(&path).unwrap(), "{\"new\":true}");
        assert!(!temp_path(&path).exists());
    }

    #[test]
    fn test_interrupted_write_keeps_previous_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("snap.json");
        fs::write(&path, "{\"lap\":1}").unwrap();

        let result = write_atomically(&path, |w| {
            w.write_all(b"{\"lap\":2, \"telemetry\": [")
                .map_err(|e| PersistenceError::io("write", Path::new("test"), e))?;
            Err(PersistenceError::io(
                "write",
                Path::new("test"),
                std::io::Error::other("simulated power loss"),
            ))
        });

        assert!(result.is_err());
        assert_eq!(fs::read_to_string(&path).unwrap(), "{\"lap\":1}");
        assert!(!temp_path(&path).exists());
    }

    #[test]
    fn test_missing_directory_fails_cleanly() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("missing").join("snap.json");

        let err = write_atomically(&path, |_| Ok(())).unwrap_err();
        assert!(matches!(err, PersistenceError::Io { op: "create", .. }));
    }
}
