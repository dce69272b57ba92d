//! Diagnostic artifacts written to the temp directory on mismatch, and the
//! registry used to clean them up.

use crate::composite::compose;
use crate::error::{SnapshotError, SnapshotResult};
use crate::raster::SnapshotImage;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

/// Result of writing one artifact.
///
/// `path` is set whenever the file was created, even if writing its
/// contents failed afterwards, so the caller can still register it.
#[derive(Debug)]
pub struct ArtifactWrite {
    pub path: Option<PathBuf>,
    pub result: SnapshotResult<()>,
}

impl ArtifactWrite {
    /// Convert to the created path, or the first error.
    pub fn into_result(self) -> SnapshotResult<PathBuf> {
        self.result?;
        self.path.ok_or_else(|| {
            SnapshotError::io(
                "create artifact file",
                PathBuf::new(),
                std::io::Error::other("no file was created"),
            )
        })
    }
}

/// Write the `expected | diff | actual` composite as `<name>-diff-*.png`.
pub fn write_composite(
    tmp_dir: &Path,
    name: &str,
    diff: &SnapshotImage,
    expected: &SnapshotImage,
    actual: &SnapshotImage,
) -> ArtifactWrite {
    write_temp_file(tmp_dir, name, "diff", &compose(diff, expected, actual))
}

/// Write the actual image as `<name>-actual-*.png`.
pub fn write_actual(tmp_dir: &Path, name: &str, actual: &SnapshotImage) -> ArtifactWrite {
    write_temp_file(tmp_dir, name, "actual", actual)
}

fn write_temp_file(tmp_dir: &Path, name: &str, role: &str, img: &SnapshotImage) -> ArtifactWrite {
    let prefix = format!("{}-{}-", name, role);
    let file = match tempfile::Builder::new()
        .prefix(&prefix)
        .suffix(".png")
        .tempfile_in(tmp_dir)
    {
        Ok(file) => file,
        Err(err) => {
            return ArtifactWrite {
                path: None,
                result: Err(SnapshotError::io("create artifact in", tmp_dir, err)),
            }
        }
    };

    // Keep the file on disk; the registry owns its removal
    let (file, path) = match file.keep() {
        Ok(kept) => kept,
        Err(err) => {
            let path = err.file.path().to_path_buf();
            return ArtifactWrite {
                result: Err(SnapshotError::io("keep artifact file", &path, err.error)),
                path: None,
            };
        }
    };

    let result = img.write_png_file(&file, &path);

    ArtifactWrite {
        path: Some(path),
        result,
    }
}

/// Append-only list of artifact paths owned by one comparator.
///
/// Appends are serialized so comparisons running on several threads against
/// the same comparator do not lose entries.
#[derive(Debug, Default)]
pub struct TempFileRegistry {
    paths: Mutex<Vec<PathBuf>>,
}

impl TempFileRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Vec<PathBuf>> {
        // A panic while holding the lock cannot leave the Vec inconsistent
        self.paths.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn register(&self, path: PathBuf) {
        self.lock().push(path);
    }

    /// Snapshot of the registered paths.
    pub fn paths(&self) -> Vec<PathBuf> {
        self.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Delete every registered file. Missing files are ignored.
    ///
    /// Returns the number of files actually removed.
    pub fn cleanup(&self) -> usize {
        let paths = std::mem::take(&mut *self.lock());
        let mut removed = 0;
        for path in paths {
            match std::fs::remove_file(&path) {
                Ok(()) => removed += 1,
                Err(err) => {
                    log::debug!(target: "snapshot", "skipping cleanup of {:?}: {}", path, err)
                }
            }
        }
        log::debug!(target: "snapshot", "removed {} temporary files", removed);
        removed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::SnapshotColor;
    use tempfile::TempDir;

    const RED: SnapshotColor = SnapshotColor::from_rgba8(255, 0, 0, 255);
    const BLUE: SnapshotColor = SnapshotColor::from_rgba8(0, 0, 255, 255);

    fn file_name(path: &Path) -> String {
        path.file_name().unwrap().to_string_lossy().into_owned()
    }

    #[test]
    fn test_write_actual_naming() {
        let dir = TempDir::new().unwrap();
        let img = SnapshotImage::from_pixel(3, 3, RED);

        let path = write_actual(dir.path(), "my_test", &img).into_result().unwrap();
        let name = file_name(&path);
        assert!(name.starts_with("my_test-actual-"), "{name}");
        assert!(name.ends_with(".png"), "{name}");
        assert_eq!(path.parent(), Some(dir.path()));
        assert_eq!(SnapshotImage::open(&path).unwrap(), img);
    }

    #[test]
    fn test_write_composite_contents() {
        let dir = TempDir::new().unwrap();
        let expected = SnapshotImage::from_pixel(2, 2, BLUE);
        let actual = SnapshotImage::from_pixel(2, 2, RED);
        let diff = SnapshotImage::from_pixel(2, 2, SnapshotColor::DIFF_GREEN);

        let path = write_composite(dir.path(), "c", &diff, &expected, &actual)
            .into_result()
            .unwrap();
        assert!(file_name(&path).starts_with("c-diff-"));

        let composite = SnapshotImage::open(&path).unwrap();
        assert_eq!(composite.width(), 6);
        assert_eq!(composite.height(), 2);
        assert_eq!(composite.pixel(0, 0), BLUE);
        assert_eq!(composite.pixel(2, 0), SnapshotColor::DIFF_GREEN);
        assert_eq!(composite.pixel(5, 1), RED);
    }

    #[test]
    fn test_repeated_writes_do_not_collide() {
        let dir = TempDir::new().unwrap();
        let img = SnapshotImage::from_pixel(1, 1, RED);
        let a = write_actual(dir.path(), "same", &img).into_result().unwrap();
        let b = write_actual(dir.path(), "same", &img).into_result().unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_missing_temp_dir_reports_io_error() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("missing");
        let write = write_actual(&missing, "x", &SnapshotImage::new(1, 1));
        assert!(write.path.is_none());
        assert!(matches!(write.result, Err(SnapshotError::Io { .. })));
    }

    #[test]
    fn test_cleanup_is_best_effort_and_idempotent() {
        let dir = TempDir::new().unwrap();
        let registry = TempFileRegistry::new();
        let img = SnapshotImage::from_pixel(1, 1, RED);

        let a = write_actual(dir.path(), "a", &img).into_result().unwrap();
        let b = write_actual(dir.path(), "b", &img).into_result().unwrap();
        registry.register(a.clone());
        registry.register(b);
        assert_eq!(registry.len(), 2);

        std::fs::remove_file(&a).unwrap();
        assert_eq!(registry.cleanup(), 1);
        assert!(registry.is_empty());
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);

        assert_eq!(registry.cleanup(), 0);
    }
}
