//! Pixel-exact snapshot assertions for rendered images.
//!
//! The first comparison for a name stores the image as its baseline under the
//! storage root (`.snapshots/<name>.png` by default). Later comparisons load
//! that baseline and diff it against the new image. On mismatch a diff mask is
//! computed, and a composite (`expected | diff | actual`) plus a copy of the
//! actual image are written to the temp directory for inspection.
//!
//! # Example
//!
//! ```rust,ignore
//! use snapshot_assert_rs::{Snapshots, SnapshotImage, SnapshotColor};
//!
//! let snapshots = Snapshots::builder().storage_root("tests/snapshots").build();
//! let img = SnapshotImage::from_pixel(10, 10, SnapshotColor::from_rgba8(0, 0, 255, 255));
//! snapshots.assert("blue_square", &img);
//! snapshots.cleanup();
//! ```

#[macro_use]
extern crate lazy_static;

pub mod artifacts;
pub mod composite;
pub mod diff;
mod error;
mod geometry;
mod raster;
pub mod snapshots;
pub mod store;

// Re-export public API
pub use diff::DiffResult;
pub use error::{DiffFiles, SnapshotError, SnapshotErrorKind, SnapshotResult};
pub use geometry::{Rect, SnapshotColor};
pub use raster::SnapshotImage;
pub use snapshots::{
    assert_snapshot, cleanup, compare, current_test_name, default_snapshots, Comparison,
    Snapshots, SnapshotsBuilder,
};
