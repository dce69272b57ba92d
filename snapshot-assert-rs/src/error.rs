//! Error types for snapshot-assert-rs.

use crate::geometry::Rect;
use std::fmt;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Result type alias using SnapshotError.
pub type SnapshotResult<T> = Result<T, SnapshotError>;

/// Locations of the artifacts written for a failing comparison.
///
/// Both paths are set when a mismatch produced artifacts; both are `None`
/// otherwise.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DiffFiles {
    pub(crate) composite_path: Option<PathBuf>,
    pub(crate) actual_path: Option<PathBuf>,
}

impl DiffFiles {
    pub(crate) fn new(composite_path: PathBuf, actual_path: PathBuf) -> Self {
        Self {
            composite_path: Some(composite_path),
            actual_path: Some(actual_path),
        }
    }

    /// Path of the expected | diff | actual composite image.
    pub fn composite_path(&self) -> Option<&Path> {
        self.composite_path.as_deref()
    }

    /// Path of the copy of the actual image.
    pub fn actual_path(&self) -> Option<&Path> {
        self.actual_path.as_deref()
    }

    pub fn is_empty(&self) -> bool {
        self.composite_path.is_none() && self.actual_path.is_none()
    }
}

impl fmt::Display for DiffFiles {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(path) = &self.composite_path {
            write!(f, "\n  diff image: {}", path.display())?;
        }
        if let Some(path) = &self.actual_path {
            write!(f, "\n  new image: {}", path.display())?;
        }
        Ok(())
    }
}

/// Broad category of a [`SnapshotError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SnapshotErrorKind {
    /// Snapshot or artifact storage could not be read, written, encoded or decoded.
    Io,
    /// Snapshot and actual image have different dimensions.
    BoundsMismatch,
    /// Dimensions match but pixels differ.
    PixelsDiffer,
    /// The caller passed something unusable (bad color, bad buffer, no test name).
    Usage,
}

/// Errors that can occur while comparing against a snapshot.
#[derive(Debug, Error)]
pub enum SnapshotError {
    /// Filesystem access failed.
    #[error("unable to {action} {path:?}: {source}")]
    Io {
        action: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// PNG encoding failed.
    #[error("unable to encode PNG {path:?}: {message}")]
    Encode { path: PathBuf, message: String },

    /// An existing file could not be decoded as an image.
    #[error("unable to decode image {path:?}: {message}")]
    Decode { path: PathBuf, message: String },

    /// Snapshot and actual image bounds differ.
    #[error("snapshot and image bounds differ: {expected} != {actual}{files}")]
    BoundsMismatch {
        expected: Rect,
        actual: Rect,
        files: DiffFiles,
    },

    /// Snapshot and actual image differ by one or more pixels.
    #[error("snapshot and image differ by {count} pixels{files}")]
    PixelsDiffer { count: u64, files: DiffFiles },

    /// Raw pixel buffer does not match the declared dimensions.
    #[error("Invalid image data: {len} bytes for {width}x{height} RGBA image")]
    InvalidImageData { width: u32, height: u32, len: usize },

    /// Failed to parse a highlight color.
    #[error("Failed to parse color: {0}")]
    ColorParse(String),

    /// No snapshot name could be derived from the current thread.
    #[error("unable to derive a snapshot name: current thread is unnamed")]
    UnnamedTest,
}

impl SnapshotError {
    pub(crate) fn io(action: &'static str, path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        SnapshotError::Io {
            action,
            path: path.into(),
            source,
        }
    }

    pub(crate) fn encode(path: impl Into<PathBuf>, err: png::EncodingError) -> Self {
        SnapshotError::Encode {
            path: path.into(),
            message: err.to_string(),
        }
    }

    pub(crate) fn decode(path: impl Into<PathBuf>, err: image::ImageError) -> Self {
        SnapshotError::Decode {
            path: path.into(),
            message: err.to_string(),
        }
    }

    pub fn kind(&self) -> SnapshotErrorKind {
        match self {
            SnapshotError::Io { .. } | SnapshotError::Encode { .. } | SnapshotError::Decode { .. } => {
                SnapshotErrorKind::Io
            }
            SnapshotError::BoundsMismatch { .. } => SnapshotErrorKind::BoundsMismatch,
            SnapshotError::PixelsDiffer { .. } => SnapshotErrorKind::PixelsDiffer,
            SnapshotError::InvalidImageData { .. }
            | SnapshotError::ColorParse(_)
            | SnapshotError::UnnamedTest => SnapshotErrorKind::Usage,
        }
    }

    /// True for comparison failures, false for setup failures.
    pub fn is_mismatch(&self) -> bool {
        matches!(
            self.kind(),
            SnapshotErrorKind::BoundsMismatch | SnapshotErrorKind::PixelsDiffer
        )
    }

    /// Artifacts attached to a mismatch, if any.
    pub fn diff_files(&self) -> Option<&DiffFiles> {
        match self {
            SnapshotError::BoundsMismatch { files, .. } | SnapshotError::PixelsDiffer { files, .. } => {
                Some(files)
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pixels_differ_message() {
        let err = SnapshotError::PixelsDiffer {
            count: 100,
            files: DiffFiles::default(),
        };
        assert_eq!(err.to_string(), "snapshot and image differ by 100 pixels");
        assert_eq!(err.kind(), SnapshotErrorKind::PixelsDiffer);
        assert!(err.is_mismatch());
    }

    #[test]
    fn test_bounds_mismatch_message_includes_paths() {
        let err = SnapshotError::BoundsMismatch {
            expected: Rect::from_size(10, 10),
            actual: Rect::from_size(20, 20),
            files: DiffFiles::new(PathBuf::from("/tmp/a-diff-1.png"), PathBuf::from("/tmp/a-actual-1.png")),
        };
        let msg = err.to_string();
        assert!(msg.starts_with("snapshot and image bounds differ: (0,0)-(10,10) != (0,0)-(20,20)"));
        assert!(msg.contains("/tmp/a-diff-1.png"));
        assert!(msg.contains("/tmp/a-actual-1.png"));
    }

    #[test]
    fn test_io_errors_are_not_mismatches() {
        let err = SnapshotError::io(
            "open snapshot file",
            "missing.png",
            std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        );
        assert_eq!(err.kind(), SnapshotErrorKind::Io);
        assert!(!err.is_mismatch());
        assert!(err.diff_files().is_none());
    }

    #[test]
    fn test_diff_files_accessors() {
        let files = DiffFiles::new(PathBuf::from("c.png"), PathBuf::from("a.png"));
        assert_eq!(files.composite_path(), Some(Path::new("c.png")));
        assert_eq!(files.actual_path(), Some(Path::new("a.png")));
        assert!(!files.is_empty());
        assert!(DiffFiles::default().is_empty());
        assert_eq!(DiffFiles::default().to_string(), "");
    }
}
