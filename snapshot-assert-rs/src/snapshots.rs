//! Snapshot comparator: load-or-create, diff, artifacts and typed results.

use crate::artifacts::{write_actual, write_composite, TempFileRegistry};
use crate::diff::diff;
use crate::error::{DiffFiles, SnapshotError, SnapshotResult};
use crate::geometry::SnapshotColor;
use crate::raster::SnapshotImage;
use crate::store::{ensure_root_exists, load_or_create, Loaded};
use std::path::{Path, PathBuf};

/// Default directory for baseline files.
pub const DEFAULT_STORAGE_ROOT: &str = ".snapshots";

lazy_static! {
    static ref DEFAULT_SNAPSHOTS: Snapshots = Snapshots::new();
}

/// Successful comparison outcome.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Comparison {
    /// The actual image matched the stored snapshot.
    Matched,
    /// No snapshot existed; the actual image was stored as the new baseline.
    Created { path: PathBuf },
}

/// Builder for [`Snapshots`].
#[derive(Debug, Clone)]
pub struct SnapshotsBuilder {
    storage_root: PathBuf,
    temp_dir: Option<PathBuf>,
    diff_color: SnapshotColor,
}

impl Default for SnapshotsBuilder {
    fn default() -> Self {
        Self {
            storage_root: PathBuf::from(DEFAULT_STORAGE_ROOT),
            temp_dir: None,
            diff_color: SnapshotColor::DIFF_GREEN,
        }
    }
}

impl SnapshotsBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Directory holding the baseline files.
    pub fn storage_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.storage_root = root.into();
        self
    }

    /// Directory for diff and actual artifacts. Defaults to the platform temp directory.
    pub fn temp_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.temp_dir = Some(dir.into());
        self
    }

    /// Color painted over differing pixels.
    pub fn diff_color(mut self, color: SnapshotColor) -> Self {
        self.diff_color = color;
        self
    }

    /// Set the diff color from a CSS color string.
    pub fn diff_color_str(mut self, color: &str) -> SnapshotResult<Self> {
        self.diff_color = SnapshotColor::parse(color)?;
        Ok(self)
    }

    pub fn build(self) -> Snapshots {
        Snapshots {
            root: self.storage_root,
            tmp: self.temp_dir.unwrap_or_else(std::env::temp_dir),
            diff_color: self.diff_color,
            temp_files: TempFileRegistry::new(),
        }
    }
}

/// Compares images against named snapshots.
///
/// Configuration is fixed at construction. The only mutable state is the
/// registry of artifact files, which is safe to share across threads.
/// Artifacts stay on disk until [`Snapshots::cleanup`] is called.
#[derive(Debug)]
pub struct Snapshots {
    root: PathBuf,
    tmp: PathBuf,
    diff_color: SnapshotColor,
    temp_files: TempFileRegistry,
}

impl Default for Snapshots {
    fn default() -> Self {
        Self::new()
    }
}

impl Snapshots {
    /// Create a comparator with the default configuration.
    pub fn new() -> Self {
        SnapshotsBuilder::default().build()
    }

    /// Create a new builder for more configuration options.
    pub fn builder() -> SnapshotsBuilder {
        SnapshotsBuilder::new()
    }

    pub fn storage_root(&self) -> &Path {
        &self.root
    }

    pub fn temp_dir(&self) -> &Path {
        &self.tmp
    }

    pub fn diff_color(&self) -> SnapshotColor {
        self.diff_color
    }

    /// Every artifact this comparator has written and not yet cleaned up.
    pub fn temp_files(&self) -> Vec<PathBuf> {
        self.temp_files.paths()
    }

    /// Remove all of the temporary files created by this instance.
    pub fn cleanup(&self) -> usize {
        self.temp_files.cleanup()
    }

    /// Compare `actual` to the snapshot `name`, creating the snapshot if it
    /// does not exist.
    ///
    /// Mismatches are returned as [`SnapshotError::BoundsMismatch`] or
    /// [`SnapshotError::PixelsDiffer`]; any other error is a storage failure.
    pub fn compare(&self, name: &str, actual: &SnapshotImage) -> SnapshotResult<Comparison> {
        if ensure_root_exists(&self.root) {
            log::info!(target: "snapshot", "created snapshot directory {:?}", self.root);
        }

        let snapshot = match load_or_create(&self.root, name, actual)? {
            Loaded::Created(path) => {
                log::info!(target: "snapshot", "created new snapshot {:?}", path);
                return Ok(Comparison::Created { path });
            }
            Loaded::Existing(snapshot) => snapshot,
        };

        let result = diff(&snapshot, actual, self.diff_color);

        let mut files = DiffFiles::default();
        if !result.is_identical() {
            files = self.write_artifacts(name, &result.image, &snapshot, actual)?;
        }

        if snapshot.bounds() != actual.bounds() {
            return Err(SnapshotError::BoundsMismatch {
                expected: snapshot.bounds(),
                actual: actual.bounds(),
                files,
            });
        }

        if result.diff_pixels != 0 {
            return Err(SnapshotError::PixelsDiffer {
                count: result.diff_pixels,
                files,
            });
        }

        Ok(Comparison::Matched)
    }

    fn write_artifacts(
        &self,
        name: &str,
        diff: &SnapshotImage,
        snapshot: &SnapshotImage,
        actual: &SnapshotImage,
    ) -> SnapshotResult<DiffFiles> {
        let composite = write_composite(&self.tmp, name, diff, snapshot, actual);
        if let Some(path) = &composite.path {
            self.temp_files.register(path.clone());
        }
        let composite_path = composite.into_result()?;

        let written = write_actual(&self.tmp, name, actual);
        if let Some(path) = &written.path {
            self.temp_files.register(path.clone());
        }
        let actual_path = written.into_result()?;

        log::info!(target: "snapshot", "new image: {:?}", actual_path);
        log::info!(target: "snapshot", "diff image: {:?}", composite_path);
        Ok(DiffFiles::new(composite_path, actual_path))
    }

    /// Panic with the error message unless `actual` matches snapshot `name`.
    #[track_caller]
    pub fn assert(&self, name: &str, actual: &SnapshotImage) {
        if let Err(err) = self.compare(name, actual) {
            panic!("{}", err);
        }
    }

    /// Like [`Snapshots::compare`], naming the snapshot after the running test.
    pub fn compare_current_test(&self, actual: &SnapshotImage) -> SnapshotResult<Comparison> {
        let name = current_test_name()?;
        self.compare(&name, actual)
    }

    /// Like [`Snapshots::assert`], naming the snapshot after the running test.
    #[track_caller]
    pub fn assert_current_test(&self, actual: &SnapshotImage) {
        if let Err(err) = self.compare_current_test(actual) {
            panic!("{}", err);
        }
    }
}

/// Snapshot name for the running test.
///
/// The libtest harness names each test thread after the test path, e.g.
/// `tests::renders_button`, which maps to `tests__renders_button`.
pub fn current_test_name() -> SnapshotResult<String> {
    let thread = std::thread::current();
    let name = thread.name().ok_or(SnapshotError::UnnamedTest)?;
    if name == "main" {
        return Err(SnapshotError::UnnamedTest);
    }
    Ok(sanitize_name(name))
}

fn sanitize_name(name: &str) -> String {
    name.replace("::", "__")
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '<' | '>' | '"' | '|' | '?' | '*' => '_',
            c => c,
        })
        .collect()
}

/// Process-wide comparator with the default configuration, created on first use.
pub fn default_snapshots() -> &'static Snapshots {
    &DEFAULT_SNAPSHOTS
}

/// Compare against snapshot `name` using the default comparator.
pub fn compare(name: &str, actual: &SnapshotImage) -> SnapshotResult<Comparison> {
    default_snapshots().compare(name, actual)
}

/// Assert against snapshot `name` using the default comparator.
#[track_caller]
pub fn assert_snapshot(name: &str, actual: &SnapshotImage) {
    default_snapshots().assert(name, actual)
}

/// Remove the artifacts written by the default comparator.
pub fn cleanup() -> usize {
    default_snapshots().cleanup()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_defaults() {
        let snapshots = Snapshots::new();
        assert_eq!(snapshots.storage_root(), Path::new(".snapshots"));
        assert_eq!(snapshots.temp_dir(), std::env::temp_dir().as_path());
        assert_eq!(snapshots.diff_color(), SnapshotColor::from_rgba8(0, 255, 0, 255));
        assert!(snapshots.temp_files().is_empty());
    }

    #[test]
    fn test_builder_overrides() {
        let snapshots = Snapshots::builder()
            .storage_root("custom-root")
            .temp_dir("custom-tmp")
            .diff_color_str("#ff0000")
            .unwrap()
            .build();
        assert_eq!(snapshots.storage_root(), Path::new("custom-root"));
        assert_eq!(snapshots.temp_dir(), Path::new("custom-tmp"));
        assert_eq!(snapshots.diff_color(), SnapshotColor::from_rgba8(255, 0, 0, 255));
    }

    #[test]
    fn test_default_snapshots_is_shared() {
        assert!(std::ptr::eq(default_snapshots(), default_snapshots()));
        assert_eq!(default_snapshots().storage_root(), Path::new(DEFAULT_STORAGE_ROOT));
    }

    #[test]
    fn test_builder_rejects_bad_color() {
        assert!(Snapshots::builder().diff_color_str("nope").is_err());
    }

    #[test]
    fn test_current_test_name() {
        // libtest runs each test on a thread named after the test path
        assert_eq!(
            current_test_name().unwrap(),
            "snapshots__tests__test_current_test_name"
        );
    }

    #[test]
    fn test_unnamed_thread() {
        let result = std::thread::spawn(current_test_name).join().unwrap();
        assert!(matches!(result, Err(SnapshotError::UnnamedTest)));
    }

    #[test]
    fn test_sanitize_name() {
        assert_eq!(sanitize_name("a::b::c"), "a__b__c");
        assert_eq!(sanitize_name("case/1:x"), "case_1_x");
    }
}
