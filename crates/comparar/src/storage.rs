//! Storage backends for baselines, captures and diff artifacts.

use crate::result::{ComparError, ComparResult};
use std::collections::{BTreeMap, BTreeSet};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};

/// Access a caller intends to perform on a path
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessMode {
    /// Path exists and can be read
    Read,
    /// Path can be (over)written
    Write,
}

/// File access used by the engine.
///
/// Implementations are shared across threads; every call observes the state
/// at call time (nothing is cached).
pub trait Storage: Send + Sync {
    /// Whether `path` is accessible for `mode`
    fn exists(&self, path: &Path, mode: AccessMode) -> bool;

    /// Read the whole file
    fn read(&self, path: &Path) -> ComparResult<Vec<u8>>;

    /// Create or replace a file
    fn write(&self, path: &Path, bytes: &[u8]) -> ComparResult<()>;

    /// Names of the regular files directly inside `dir`; empty if `dir` is missing
    fn list_dir(&self, dir: &Path) -> ComparResult<Vec<String>>;

    /// Create `dir` and its parents
    fn ensure_dir(&self, dir: &Path) -> ComparResult<()>;

    /// Remove a file
    fn delete(&self, path: &Path) -> ComparResult<()>;
}

/// Storage on the local filesystem
#[derive(Debug, Clone, Copy, Default)]
pub struct FsStorage;

impl FsStorage {
    /// Create a filesystem storage
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

fn map_io(err: std::io::Error, path: &Path) -> ComparError {
    match err.kind() {
        ErrorKind::NotFound => ComparError::FileNotFound {
            path: path.to_path_buf(),
        },
        ErrorKind::PermissionDenied => ComparError::FileNotWritable {
            path: path.to_path_buf(),
        },
        _ => ComparError::Io(err),
    }
}

impl Storage for FsStorage {
    fn exists(&self, path: &Path, mode: AccessMode) -> bool {
        match mode {
            AccessMode::Read => path.is_file(),
            AccessMode::Write => match std::fs::metadata(path) {
                Ok(meta) => !meta.permissions().readonly(),
                Err(_) => path
                    .parent()
                    .and_then(|p| std::fs::metadata(p).ok())
                    .is_some_and(|meta| meta.is_dir() && !meta.permissions().readonly()),
            },
        }
    }

    fn read(&self, path: &Path) -> ComparResult<Vec<u8>> {
        std::fs::read(path).map_err(|e| map_io(e, path))
    }

    fn write(&self, path: &Path, bytes: &[u8]) -> ComparResult<()> {
        if let Ok(meta) = std::fs::metadata(path) {
            if meta.permissions().readonly() {
                return Err(ComparError::FileNotWritable {
                    path: path.to_path_buf(),
                });
            }
        }
        std::fs::write(path, bytes).map_err(|e| map_io(e, path))
    }

    fn list_dir(&self, dir: &Path) -> ComparResult<Vec<String>> {
        let entries = match std::fs::read_dir(dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut names = Vec::new();
        for entry in entries {
            let entry = entry?;
            if entry.file_type()?.is_file() {
                names.push(entry.file_name().to_string_lossy().into_owned());
            }
        }
        Ok(names)
    }

    fn ensure_dir(&self, dir: &Path) -> ComparResult<()> {
        std::fs::create_dir_all(dir).map_err(|e| map_io(e, dir))
    }

    fn delete(&self, path: &Path) -> ComparResult<()> {
        std::fs::remove_file(path).map_err(|e| map_io(e, path))
    }
}

#[derive(Debug, Default)]
struct MemoryState {
    files: BTreeMap<PathBuf, Vec<u8>>,
    read_only: BTreeSet<PathBuf>,
}

/// In-memory storage for tests and embedding.
///
/// Directories are implicit: a directory exists while any file lives under it.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    state: Mutex<MemoryState>,
}

impl MemoryStorage {
    /// Create an empty storage
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, MemoryState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Put a file, bypassing the read-only check
    pub fn insert(&self, path: impl Into<PathBuf>, bytes: Vec<u8>) {
        self.state().files.insert(path.into(), bytes);
    }

    /// Mark a path as not writable
    pub fn set_read_only(&self, path: impl Into<PathBuf>) {
        self.state().read_only.insert(path.into());
    }

    /// Snapshot of a file's contents
    #[must_use]
    pub fn get(&self, path: impl AsRef<Path>) -> Option<Vec<u8>> {
        self.state().files.get(path.as_ref()).cloned()
    }

    /// All stored paths, sorted
    #[must_use]
    pub fn paths(&self) -> Vec<PathBuf> {
        self.state().files.keys().cloned().collect()
    }
}

impl Storage for MemoryStorage {
    fn exists(&self, path: &Path, mode: AccessMode) -> bool {
        let state = self.state();
        match mode {
            AccessMode::Read => state.files.contains_key(path),
            AccessMode::Write => !state.read_only.contains(path),
        }
    }

    fn read(&self, path: &Path) -> ComparResult<Vec<u8>> {
        self.state()
            .files
            .get(path)
            .cloned()
            .ok_or_else(|| ComparError::FileNotFound {
                path: path.to_path_buf(),
            })
    }

    fn write(&self, path: &Path, bytes: &[u8]) -> ComparResult<()> {
        let mut state = self.state();
        if state.read_only.contains(path) {
            return Err(ComparError::FileNotWritable {
                path: path.to_path_buf(),
            });
        }
        state.files.insert(path.to_path_buf(), bytes.to_vec());
        Ok(())
    }

    fn list_dir(&self, dir: &Path) -> ComparResult<Vec<String>> {
        Ok(self
            .state()
            .files
            .keys()
            .filter(|path| path.parent() == Some(dir))
            .filter_map(|path| path.file_name())
            .map(|name| name.to_string_lossy().into_owned())
            .collect())
    }

    fn ensure_dir(&self, _dir: &Path) -> ComparResult<()> {
        Ok(())
    }

    fn delete(&self, path: &Path) -> ComparResult<()> {
        self.state()
            .files
            .remove(path)
            .map(drop)
            .ok_or_else(|| ComparError::FileNotFound {
                path: path.to_path_buf(),
            })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    mod fs_storage_tests {
        use super::*;

        #[test]
        fn test_write_read_delete() {
            let dir = tempfile::tempdir().unwrap();
            let storage = FsStorage::new();
            let path = dir.path().join("nested").join("a.png");

            storage.ensure_dir(path.parent().unwrap()).unwrap();
            assert!(storage.exists(&path, AccessMode::Write));
            storage.write(&path, b"abc").unwrap();
            assert!(storage.exists(&path, AccessMode::Read));
            assert_eq!(storage.read(&path).unwrap(), b"abc");

            storage.delete(&path).unwrap();
            assert!(!storage.exists(&path, AccessMode::Read));
        }

        #[test]
        fn test_read_missing_is_file_not_found() {
            let dir = tempfile::tempdir().unwrap();
            let err = FsStorage::new().read(&dir.path().join("none.png")).unwrap_err();
            assert!(matches!(err, ComparError::FileNotFound { .. }));
        }

        #[test]
        fn test_delete_missing_is_file_not_found() {
            let dir = tempfile::tempdir().unwrap();
            let err = FsStorage::new().delete(&dir.path().join("none.png")).unwrap_err();
            assert!(matches!(err, ComparError::FileNotFound { .. }));
        }

        #[test]
        fn test_list_dir_files_only() {
            let dir = tempfile::tempdir().unwrap();
            std::fs::write(dir.path().join("a.png"), b"").unwrap();
            std::fs::write(dir.path().join("b.png"), b"").unwrap();
            std::fs::create_dir(dir.path().join("sub")).unwrap();

            let mut names = FsStorage::new().list_dir(dir.path()).unwrap();
            names.sort();
            assert_eq!(names, vec!["a.png", "b.png"]);
        }

        #[test]
        fn test_list_missing_dir_is_empty() {
            let dir = tempfile::tempdir().unwrap();
            let names = FsStorage::new().list_dir(&dir.path().join("absent")).unwrap();
            assert!(names.is_empty());
        }

        #[test]
        fn test_read_only_file_not_writable() {
            let dir = tempfile::tempdir().unwrap();
            let path = dir.path().join("locked.png");
            std::fs::write(&path, b"x").unwrap();
            let mut perms = std::fs::metadata(&path).unwrap().permissions();
            perms.set_readonly(true);
            std::fs::set_permissions(&path, perms).unwrap();

            let storage = FsStorage::new();
            assert!(!storage.exists(&path, AccessMode::Write));
            let err = storage.write(&path, b"y").unwrap_err();
            assert!(matches!(err, ComparError::FileNotWritable { .. }));
        }
    }

    mod memory_storage_tests {
        use super::*;

        #[test]
        fn test_roundtrip_and_listing() {
            let storage = MemoryStorage::new();
            storage.write(Path::new("/b/x.png"), b"1").unwrap();
            storage.write(Path::new("/b/y.png"), b"2").unwrap();
            storage.write(Path::new("/b/sub/z.png"), b"3").unwrap();

            assert_eq!(storage.read(Path::new("/b/x.png")).unwrap(), b"1");
            assert_eq!(
                storage.list_dir(Path::new("/b")).unwrap(),
                vec!["x.png", "y.png"]
            );
            assert_eq!(storage.list_dir(Path::new("/b/sub")).unwrap(), vec!["z.png"]);
        }

        #[test]
        fn test_read_only() {
            let storage = MemoryStorage::new();
            storage.set_read_only("/b/x.png");
            assert!(!storage.exists(Path::new("/b/x.png"), AccessMode::Write));
            let err = storage.write(Path::new("/b/x.png"), b"1").unwrap_err();
            assert!(matches!(err, ComparError::FileNotWritable { .. }));
        }

        #[test]
        fn test_delete() {
            let storage = MemoryStorage::new();
            storage.insert("/a.png", vec![0]);
            storage.delete(Path::new("/a.png")).unwrap();
            assert!(storage.get("/a.png").is_none());
            assert!(storage.delete(Path::new("/a.png")).is_err());
        }

        #[test]
        fn test_shared_across_threads() {
            let storage = MemoryStorage::new();
            std::thread::scope(|scope| {
                for i in 0..4 {
                    let storage = &storage;
                    scope.spawn(move || {
                        storage
                            .write(&PathBuf::from(format!("/t/{i}.png")), &[i])
                            .unwrap();
                    });
                }
            });
            assert_eq!(storage.list_dir(Path::new("/t")).unwrap().len(), 4);
        }
    }
}
