//! Raster image type and PNG codec.

use crate::error::{SnapshotError, SnapshotResult};
use crate::geometry::{Rect, SnapshotColor};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// An RGBA8 raster anchored at the origin.
///
/// Pixel data is straight (non-premultiplied) alpha, 4 bytes per pixel,
/// row-major.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnapshotImage {
    width: u32,
    height: u32,
    data: Vec<u8>,
}

impl SnapshotImage {
    /// Create an image filled with transparent black.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            data: vec![0u8; (width as usize) * (height as usize) * 4],
        }
    }

    /// Create an image filled with a single color.
    pub fn from_pixel(width: u32, height: u32, color: SnapshotColor) -> Self {
        let data = color
            .to_array()
            .iter()
            .copied()
            .cycle()
            .take((width as usize) * (height as usize) * 4)
            .collect();
        Self {
            width,
            height,
            data,
        }
    }

    /// Wrap a raw RGBA buffer, validating its length.
    pub fn from_rgba8(width: u32, height: u32, data: Vec<u8>) -> SnapshotResult<Self> {
        if data.len() != (width as usize) * (height as usize) * 4 {
            return Err(SnapshotError::InvalidImageData {
                width,
                height,
                len: data.len(),
            });
        }
        Ok(Self {
            width,
            height,
            data,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn bounds(&self) -> Rect {
        Rect::from_size(self.width, self.height)
    }

    /// Raw RGBA bytes.
    pub fn as_raw(&self) -> &[u8] {
        &self.data
    }

    pub fn into_raw(self) -> Vec<u8> {
        self.data
    }

    fn index(&self, x: u32, y: u32) -> usize {
        ((y as usize) * (self.width as usize) + x as usize) * 4
    }

    /// Color at `(x, y)`. Panics when out of bounds.
    pub fn pixel(&self, x: u32, y: u32) -> SnapshotColor {
        assert!(
            x < self.width && y < self.height,
            "pixel ({x}, {y}) out of bounds for {}x{} image",
            self.width,
            self.height
        );
        let idx = self.index(x, y);
        SnapshotColor::from_rgba8(
            self.data[idx],
            self.data[idx + 1],
            self.data[idx + 2],
            self.data[idx + 3],
        )
    }

    /// Set the color at `(x, y)`. Panics when out of bounds.
    pub fn set_pixel(&mut self, x: u32, y: u32, color: SnapshotColor) {
        assert!(
            x < self.width && y < self.height,
            "pixel ({x}, {y}) out of bounds for {}x{} image",
            self.width,
            self.height
        );
        let idx = self.index(x, y);
        self.data[idx..idx + 4].copy_from_slice(&color.to_array());
    }

    /// Fill `rect`, clamped to the image, with `color`.
    pub fn fill_rect(&mut self, rect: Rect, color: SnapshotColor) {
        let x1 = rect.x1.min(self.width);
        let y1 = rect.y1.min(self.height);
        if rect.x0 >= x1 || rect.y0 >= y1 {
            return;
        }
        let px = color.to_array();
        for y in rect.y0..y1 {
            let start = self.index(rect.x0, y);
            let end = self.index(x1, y);
            for chunk in self.data[start..end].chunks_exact_mut(4) {
                chunk.copy_from_slice(&px);
            }
        }
    }

    /// Row `y` as raw RGBA bytes.
    pub(crate) fn row(&self, y: u32) -> &[u8] {
        let start = self.index(0, y);
        &self.data[start..start + (self.width as usize) * 4]
    }

    pub(crate) fn row_mut(&mut self, y: u32) -> &mut [u8] {
        let start = self.index(0, y);
        let len = (self.width as usize) * 4;
        &mut self.data[start..start + len]
    }

    // --- PNG codec ---

    /// Encode as an 8-bit RGBA PNG into `writer`.
    pub fn write_png<W: Write>(&self, writer: W) -> Result<(), png::EncodingError> {
        let mut encoder = png::Encoder::new(writer, self.width, self.height);
        encoder.set_color(png::ColorType::Rgba);
        encoder.set_depth(png::BitDepth::Eight);
        let mut writer = encoder.write_header()?;
        writer.write_image_data(&self.data)?;
        writer.finish()
    }

    /// Encode as PNG bytes.
    pub fn to_png(&self) -> Result<Vec<u8>, png::EncodingError> {
        let mut buf = Vec::new();
        self.write_png(&mut buf)?;
        Ok(buf)
    }

    /// Encode as PNG into an already open file. Errors name `path`.
    pub(crate) fn write_png_file(&self, file: &File, path: &Path) -> SnapshotResult<()> {
        let mut writer = BufWriter::new(file);
        self.write_png(&mut writer)
            .map_err(|e| SnapshotError::encode(path, e))?;
        writer
            .flush()
            .map_err(|e| SnapshotError::io("write image file", path, e))
    }

    /// Encode and write a PNG file, replacing any existing file.
    pub fn save(&self, path: impl AsRef<Path>) -> SnapshotResult<()> {
        let path = path.as_ref();
        let file =
            File::create(path).map_err(|e| SnapshotError::io("create image file", path, e))?;
        self.write_png_file(&file, path)
    }

    /// Decode any PNG (palette, grayscale, 16-bit, ...) into RGBA8.
    pub fn from_png_bytes(bytes: &[u8]) -> Result<Self, image::ImageError> {
        let img = image::load_from_memory_with_format(bytes, image::ImageFormat::Png)?;
        Ok(img.to_rgba8().into())
    }

    /// Read and decode a PNG file.
    pub fn open(path: impl AsRef<Path>) -> SnapshotResult<Self> {
        let path = path.as_ref();
        let bytes =
            std::fs::read(path).map_err(|e| SnapshotError::io("open image file", path, e))?;
        Self::from_png_bytes(&bytes).map_err(|e| SnapshotError::decode(path, e))
    }
}

impl From<image::RgbaImage> for SnapshotImage {
    fn from(img: image::RgbaImage) -> Self {
        let (width, height) = img.dimensions();
        Self {
            width,
            height,
            data: img.into_raw(),
        }
    }
}

impl From<SnapshotImage> for image::RgbaImage {
    fn from(img: SnapshotImage) -> Self {
        image::RgbaImage::from_raw(img.width, img.height, img.data)
            .expect("SnapshotImage buffer length always equals width * height * 4")
    }
}
