//! Pixel-exact difference mask between two images.
//!
//! Two pixels are equal only when all four RGBA channels are equal. There is
//! no tolerance and no premultiplication, so `(0, 0, 0, 0)` and
//! `(255, 0, 0, 0)` are different pixels.

use crate::geometry::{Rect, SnapshotColor};
use crate::raster::SnapshotImage;

/// Difference mask plus the number of differing pixels.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiffResult {
    /// Mask sized to the union of both inputs. Differing pixels carry the
    /// highlight color, matching pixels are transparent.
    pub image: SnapshotImage,
    /// Number of highlighted pixels.
    pub diff_pixels: u64,
}

impl DiffResult {
    pub fn is_identical(&self) -> bool {
        self.diff_pixels == 0
    }
}

/// Compare `left` and `right` pixel by pixel.
///
/// The mask covers `max(widths) × max(heights)`. Within the intersection each
/// unequal pixel is highlighted and counted; everything outside the
/// intersection is highlighted and counted as well.
pub fn diff(left: &SnapshotImage, right: &SnapshotImage, highlight: SnapshotColor) -> DiffResult {
    let width = left.width().max(right.width());
    let height = left.height().max(right.height());
    let min_width = left.width().min(right.width());
    let min_height = left.height().min(right.height());

    let mut mask = SnapshotImage::new(width, height);
    let highlight_px = highlight.to_array();
    let row_bytes = (min_width as usize) * 4;
    let mut diff_pixels: u64 = 0;

    for y in 0..min_height {
        let left_row = &left.row(y)[..row_bytes];
        let right_row = &right.row(y)[..row_bytes];
        if left_row == right_row {
            continue;
        }
        let mask_row = &mut mask.row_mut(y)[..row_bytes];
        for ((l, r), m) in left_row
            .chunks_exact(4)
            .zip(right_row.chunks_exact(4))
            .zip(mask_row.chunks_exact_mut(4))
        {
            if l != r {
                m.copy_from_slice(&highlight_px);
                diff_pixels += 1;
            }
        }
    }

    // Rows below the intersection span the full width, columns to its right
    // only the intersection height, so the corner is counted once.
    if min_height < height {
        let rows = (height - min_height) as u64;
        diff_pixels += rows * width as u64;
    }
    if min_width < width {
        let columns = (width - min_width) as u64;
        diff_pixels += columns * min_height as u64;
    }

    mask.fill_rect(
        Rect {
            x0: min_width,
            y0: 0,
            x1: width,
            y1: height,
        },
        highlight,
    );
    mask.fill_rect(
        Rect {
            x0: 0,
            y0: min_height,
            x1: width,
            y1: height,
        },
        highlight,
    );

    log::debug!(
        target: "snapshot",
        "diff {}x{} vs {}x{}: {} pixels differ",
        left.width(),
        left.height(),
        right.width(),
        right.height(),
        diff_pixels
    );

    DiffResult {
        image: mask,
        diff_pixels,
    }
}
