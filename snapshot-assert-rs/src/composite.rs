//! Side-by-side composite of expected, diff and actual images.

use crate::raster::SnapshotImage;

/// Lay out `expected | diff | actual` left to right.
///
/// The canvas height is `diff.height()`, which already covers both compared
/// images. Sources taller than the canvas are truncated to its top rows.
pub fn compose(
    diff: &SnapshotImage,
    expected: &SnapshotImage,
    actual: &SnapshotImage,
) -> SnapshotImage {
    let width = expected.width() + diff.width() + actual.width();
    let height = diff.height();

    let mut composite = SnapshotImage::new(width, height);
    blit(&mut composite, expected, 0);
    blit(&mut composite, diff, expected.width());
    blit(&mut composite, actual, expected.width() + diff.width());
    composite
}

/// Copy `src` into `dst` with its origin at `(dx, 0)`, clipped to `dst`.
fn blit(dst: &mut SnapshotImage, src: &SnapshotImage, dx: u32) {
    if dx >= dst.width() {
        return;
    }
    let copy_width = src.width().min(dst.width() - dx) as usize;
    let rows = src.height().min(dst.height());
    let start = (dx as usize) * 4;
    for y in 0..rows {
        let src_row = &src.row(y)[..copy_width * 4];
        dst.row_mut(y)[start..start + copy_width * 4].copy_from_slice(src_row);
    }
}
