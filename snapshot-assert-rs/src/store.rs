//! Baseline snapshot files on disk.

use crate::error::{SnapshotError, SnapshotResult};
use crate::raster::SnapshotImage;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// File extension of stored snapshots.
pub const SNAPSHOT_EXTENSION: &str = "png";

/// Outcome of [`load_or_create`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Loaded {
    /// No baseline existed; the actual image was stored at this path.
    Created(PathBuf),
    /// The stored baseline.
    Existing(SnapshotImage),
}

/// Path of the snapshot named `name` under `root`.
pub fn snapshot_path(root: &Path, name: &str) -> PathBuf {
    root.join(format!("{}.{}", name, SNAPSHOT_EXTENSION))
}

/// Create `root` if it does not exist. Returns true if it was created.
///
/// Creation errors are ignored here; writing the snapshot reports them.
pub fn ensure_root_exists(root: &Path) -> bool {
    if root.exists() {
        return false;
    }
    match fs::create_dir_all(root) {
        Ok(()) => true,
        Err(err) => {
            log::warn!(target: "snapshot", "failed to create snapshot directory {:?}: {}", root, err);
            false
        }
    }
}

/// Load the snapshot `name`, or store `actual` as the new snapshot.
pub fn load_or_create(root: &Path, name: &str, actual: &SnapshotImage) -> SnapshotResult<Loaded> {
    let path = snapshot_path(root, name);

    match fs::read(&path) {
        Ok(bytes) => {
            let snapshot = SnapshotImage::from_png_bytes(&bytes)
                .map_err(|e| SnapshotError::decode(&path, e))?;
            log::debug!(
                target: "snapshot",
                "loaded snapshot {:?} ({}x{})",
                path,
                snapshot.width(),
                snapshot.height()
            );
            Ok(Loaded::Existing(snapshot))
        }
        Err(err) if err.kind() == ErrorKind::NotFound => {
            create_snapshot(root, &path, actual)?;
            Ok(Loaded::Created(path))
        }
        Err(err) => Err(SnapshotError::io("open snapshot file", path, err)),
    }
}

fn create_snapshot(root: &Path, path: &Path, actual: &SnapshotImage) -> SnapshotResult<()> {
    // Encode next to the target so a failed write never leaves a partial baseline
    let tmp = tempfile::Builder::new()
        .prefix(".snapshot-")
        .suffix(".png.tmp")
        .tempfile_in(root)
        .map_err(|e| SnapshotError::io("create snapshot file", path, e))?;

    actual.write_png_file(tmp.as_file(), path)?;

    // Never overwrite an existing baseline
    tmp.persist_noclobber(path)
        .map_err(|e| SnapshotError::io("create snapshot file", path, e.error))?;
    Ok(())
}
