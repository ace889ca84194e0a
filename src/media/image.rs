//! Decoded face images.
//!
//! Capture hands over a pixel buffer in whatever channel order the camera
//! stack produced; everything is normalized to RGB8 here so face encoders
//! see a single, documented format.

use anyhow::{bail, Context, Result};
use image::RgbImage;
use std::path::Path;

/// Channel order of a raw capture buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PixelLayout {
    Rgb8,
    Bgr8,
    Rgba8,
    Bgra8,
    /// Single-channel grayscale, replicated across RGB.
    Luma8,
}

impl PixelLayout {
    fn bytes_per_pixel(self) -> usize {
        match self {
            PixelLayout::Rgb8 | PixelLayout::Bgr8 => 3,
            PixelLayout::Rgba8 | PixelLayout::Bgra8 => 4,
            PixelLayout::Luma8 => 1,
        }
    }
}

/// A decoded face image, normalized to RGB8.
#[derive(Debug, Clone)]
pub struct FaceImage {
    pixels: RgbImage,
}

impl FaceImage {
    pub fn from_rgb(pixels: RgbImage) -> Self {
        Self { pixels }
    }

    /// Build from a raw capture buffer, converting the channel order to RGB.
    pub fn from_raw(width: u32, height: u32, layout: PixelLayout, bytes: &[u8]) -> Result<Self> {
        if width == 0 || height == 0 {
            bail!("Image dimensions must be non-zero");
        }

        let expected = width as usize * height as usize * layout.bytes_per_pixel();
        if bytes.len() != expected {
            bail!(
                "Buffer length {} does not match {}x{} {:?} (expected {})",
                bytes.len(),
                width,
                height,
                layout,
                expected
            );
        }

        let mut rgb = Vec::with_capacity(width as usize * height as usize * 3);
        match layout {
            PixelLayout::Rgb8 => rgb.extend_from_slice(bytes),
            PixelLayout::Bgr8 => {
                for px in bytes.chunks_exact(3) {
                    rgb.extend_from_slice(&[px[2], px[1], px[0]]);
                }
            }
            PixelLayout::Rgba8 => {
                for px in bytes.chunks_exact(4) {
                    rgb.extend_from_slice(&[px[0], px[1], px[2]]);
                }
            }
            PixelLayout::Bgra8 => {
                for px in bytes.chunks_exact(4) {
                    rgb.extend_from_slice(&[px[2], px[1], px[0]]);
                }
            }
            PixelLayout::Luma8 => {
                for &px in bytes {
                    rgb.extend_from_slice(&[px, px, px]);
                }
            }
        }

        let pixels = RgbImage::from_raw(width, height, rgb)
            .context("Failed to assemble RGB image buffer")?;
        Ok(Self { pixels })
    }

    /// Decode an image file (for offline enrollment or tests).
    pub fn open(path: &Path) -> Result<Self> {
        let pixels = image::open(path)
            .with_context(|| format!("Failed to decode image: {}", path.display()))?
            .to_rgb8();
        Ok(Self { pixels })
    }

    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    pub fn height(&self) -> u32 {
        self.pixels.height()
    }

    pub fn as_rgb(&self) -> &RgbImage {
        &self.pixels
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_raw_rgb_passthrough() {
        let bytes = [10, 20, 30, 40, 50, 60];
        let img = FaceImage::from_raw(2, 1, PixelLayout::Rgb8, &bytes).unwrap();
        assert_eq!(img.as_rgb().get_pixel(0, 0).0, [10, 20, 30]);
        assert_eq!(img.as_rgb().get_pixel(1, 0).0, [40, 50, 60]);
    }

    #[test]
    fn test_from_raw_bgr_swaps_channels() {
        let bytes = [30, 20, 10];
        let img = FaceImage::from_raw(1, 1, PixelLayout::Bgr8, &bytes).unwrap();
        assert_eq!(img.as_rgb().get_pixel(0, 0).0, [10, 20, 30]);
    }

    #[test]
    fn test_from_raw_bgra_swaps_and_strips_alpha() {
        let bytes = [30, 20, 10, 255];
        let img = FaceImage::from_raw(1, 1, PixelLayout::Bgra8, &bytes).unwrap();
        assert_eq!(img.as_rgb().get_pixel(0, 0).0, [10, 20, 30]);
    }

    #[test]
    fn test_from_raw_luma_replicates() {
        let img = FaceImage::from_raw(1, 1, PixelLayout::Luma8, &[77]).unwrap();
        assert_eq!(img.as_rgb().get_pixel(0, 0).0, [77, 77, 77]);
    }

    #[test]
    fn test_from_raw_rejects_bad_length() {
        assert!(FaceImage::from_raw(2, 2, PixelLayout::Rgb8, &[0; 11]).is_err());
        assert!(FaceImage::from_raw(0, 2, PixelLayout::Rgb8, &[]).is_err());
    }
}
