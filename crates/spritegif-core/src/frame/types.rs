//! Core frame types for the encoding pipeline.

use serde::{Deserialize, Serialize};

use crate::encode::EncodeError;
use crate::Rgb;

/// How a frame whose size differs from the canvas is brought to canvas size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FrameFit {
    /// Draw the frame at the top-left corner of a black canvas, cropping or
    /// padding as needed.
    #[default]
    Blit,
    /// Rescale the whole frame to the canvas with nearest-neighbor sampling.
    Nearest,
}

impl FrameFit {
    /// Convert to the image crate's FilterType, if this fit resamples.
    pub fn to_image_filter(self) -> Option<image::imageops::FilterType> {
        match self {
            FrameFit::Blit => None,
            FrameFit::Nearest => Some(image::imageops::FilterType::Nearest),
        }
    }
}

/// A full-color frame handed to the encoder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawFrame {
    width: u32,
    height: u32,
    /// RGB pixel data in row-major order (3 bytes per pixel).
    pixels: Vec<u8>,
}

impl RawFrame {
    /// Create a frame, validating that `pixels` holds `width * height` RGB triples.
    ///
    /// # Errors
    ///
    /// Returns `EncodeError::InvalidDimensions` if `width * height * 3` does not
    /// fit in `usize`, and `EncodeError::InvalidPixelData` on a length mismatch.
    pub fn new(width: u32, height: u32, pixels: Vec<u8>) -> Result<Self, EncodeError> {
        let expected = Self::byte_len(width, height)
            .ok_or(EncodeError::InvalidDimensions { width, height })?;
        if pixels.len() != expected {
            return Err(EncodeError::InvalidPixelData {
                expected,
                actual: pixels.len(),
            });
        }
        Ok(Self {
            width,
            height,
            pixels,
        })
    }

    /// Create a frame filled with a single color.
    ///
    /// # Errors
    ///
    /// Returns `EncodeError::InvalidDimensions` if the buffer size overflows `usize`.
    pub fn filled(width: u32, height: u32, color: Rgb) -> Result<Self, EncodeError> {
        let len = Self::byte_len(width, height)
            .ok_or(EncodeError::InvalidDimensions { width, height })?;
        let pixels = color.to_array().into_iter().cycle().take(len).collect();
        Ok(Self {
            width,
            height,
            pixels,
        })
    }

    /// Size in bytes of an RGB buffer for `width` x `height`, or `None` on overflow.
    pub fn byte_len(width: u32, height: u32) -> Option<usize> {
        (width as usize)
            .checked_mul(height as usize)?
            .checked_mul(3)
    }

    /// Create a frame from an image::RgbImage.
    pub fn from_rgb_image(img: image::RgbImage) -> Self {
        let (width, height) = img.dimensions();
        Self {
            width,
            height,
            pixels: img.into_raw(),
        }
    }

    /// Decode an encoded image (e.g. a PNG frame exported from a sprite sheet).
    ///
    /// Alpha is dropped; fully transparent pixels keep whatever color they carry.
    pub fn decode(bytes: &[u8]) -> Result<Self, EncodeError> {
        let img = image::load_from_memory(bytes)
            .map_err(|e| EncodeError::Decode(e.to_string()))?;
        Ok(Self::from_rgb_image(img.to_rgb8()))
    }

    /// Convert to an image::RgbImage for resampling.
    pub fn to_rgb_image(&self) -> Option<image::RgbImage> {
        image::RgbImage::from_raw(self.width, self.height, self.pixels.clone())
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// RGB bytes, row-major.
    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    /// Consume the frame and return its pixel buffer.
    pub fn into_pixels(self) -> Vec<u8> {
        self.pixels
    }

    pub fn pixel_count(&self) -> usize {
        self.pixels.len() / 3
    }

    /// Color at (x, y), or `None` when out of bounds.
    pub fn pixel(&self, x: u32, y: u32) -> Option<Rgb> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = ((y as usize) * (self.width as usize) + x as usize) * 3;
        Some(Rgb::new(self.pixels[i], self.pixels[i + 1], self.pixels[i + 2]))
    }

    /// Iterate over the pixels as colors.
    pub fn colors(&self) -> impl Iterator<Item = Rgb> + '_ {
        self.pixels
            .chunks_exact(3)
            .map(|c| Rgb::new(c[0], c[1], c[2]))
    }

    /// True for a zero-area frame.
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

/// A frame mapped onto a palette: one index per pixel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexedFrame {
    pub width: u32,
    pub height: u32,
    pub indices: Vec<u8>,
}

impl IndexedFrame {
    pub fn new(width: u32, height: u32, indices: Vec<u8>) -> Self {
        debug_assert_eq!(
            indices.len(),
            (width as usize) * (height as usize),
            "Index buffer size mismatch"
        );
        Self {
            width,
            height,
            indices,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_raw_frame_validates_length() {
        let frame = RawFrame::new(2, 2, vec![0u8; 12]);
        assert!(frame.is_ok());

        let short = RawFrame::new(2, 2, vec![0u8; 11]);
        assert!(matches!(
            short,
            Err(EncodeError::InvalidPixelData {
                expected: 12,
                actual: 11
            })
        ));
    }

    #[test]
    fn test_raw_frame_zero_area_is_allowed() {
        let frame = RawFrame::new(0, 5, vec![]).unwrap();
        assert!(frame.is_empty());
        assert_eq!(frame.pixel_count(), 0);
    }

    #[test]
    fn test_raw_frame_rejects_overflowing_dimensions() {
        let result = RawFrame::new(u32::MAX, u32::MAX, Vec::new());
        assert!(matches!(
            result,
            Err(EncodeError::InvalidDimensions {
                width: u32::MAX,
                height: u32::MAX
            })
        ));
        assert!(RawFrame::filled(u32::MAX, u32::MAX, Rgb::BLACK).is_err());
    }

    #[test]
    fn test_byte_len() {
        assert_eq!(RawFrame::byte_len(4, 3), Some(36));
        assert_eq!(RawFrame::byte_len(0, u32::MAX), Some(0));
        assert_eq!(RawFrame::byte_len(u32::MAX, u32::MAX), None);
    }

    #[test]
    fn test_filled_frame() {
        let frame = RawFrame::filled(3, 2, Rgb::new(1, 2, 3)).unwrap();
        assert_eq!(frame.pixels().len(), 18);
        assert!(frame.colors().all(|c| c == Rgb::new(1, 2, 3)));
    }

    #[test]
    fn test_pixel_lookup() {
        let pixels = vec![
            255, 0, 0, 0, 255, 0, //
            0, 0, 255, 9, 9, 9,
        ];
        let frame = RawFrame::new(2, 2, pixels).unwrap();
        assert_eq!(frame.pixel(1, 0), Some(Rgb::new(0, 255, 0)));
        assert_eq!(frame.pixel(1, 1), Some(Rgb::new(9, 9, 9)));
        assert_eq!(frame.pixel(2, 0), None);
    }

    #[test]
    fn test_rgb_image_conversion() {
        let frame = RawFrame::filled(4, 3, Rgb::new(10, 20, 30)).unwrap();
        let img = frame.to_rgb_image().unwrap();
        assert_eq!(img.dimensions(), (4, 3));
        assert_eq!(RawFrame::from_rgb_image(img), frame);
    }

    #[test]
    fn test_decode_png() {
        let img = image::RgbImage::from_pixel(3, 2, image::Rgb([7, 8, 9]));
        let mut bytes = std::io::Cursor::new(Vec::new());
        img.write_to(&mut bytes, image::ImageFormat::Png).unwrap();

        let frame = RawFrame::decode(bytes.get_ref()).unwrap();
        assert_eq!((frame.width(), frame.height()), (3, 2));
        assert_eq!(frame.pixel(2, 1), Some(Rgb::new(7, 8, 9)));
    }

    #[test]
    fn test_decode_garbage_fails() {
        let result = RawFrame::decode(&[1, 2, 3, 4]);
        assert!(matches!(result, Err(EncodeError::Decode(_))));
    }

    #[test]
    fn test_frame_fit_filter() {
        assert!(FrameFit::Blit.to_image_filter().is_none());
        assert!(matches!(
            FrameFit::Nearest.to_image_filter(),
            Some(image::imageops::FilterType::Nearest)
        ));
    }
}
