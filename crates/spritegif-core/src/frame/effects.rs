//! Frame effects applied by the editor before frames reach the encoder.
//!
//! Pixel-art sprites are usually tiny, so exports are typically upscaled by an
//! integer factor with nearest-neighbor sampling to keep hard edges, and padded
//! so that animation frames have room around the sprite.

use serde::{Deserialize, Serialize};

use super::RawFrame;
use crate::encode::EncodeError;

/// Largest side a GIF logical screen or image can have.
const MAX_SIDE: u32 = u16::MAX as u32;

/// Amount of pixels to add on each side of a frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Padding {
    pub top: u32,
    pub right: u32,
    pub bottom: u32,
    pub left: u32,
}

impl Padding {
    pub fn new(top: u32, right: u32, bottom: u32, left: u32) -> Self {
        Self {
            top,
            right,
            bottom,
            left,
        }
    }

    /// Same padding on every side.
    pub fn uniform(amount: u32) -> Self {
        Self::new(amount, amount, amount, amount)
    }

    /// Total horizontal padding, or `None` on overflow.
    pub fn horizontal(&self) -> Option<u32> {
        self.left.checked_add(self.right)
    }

    /// Total vertical padding, or `None` on overflow.
    pub fn vertical(&self) -> Option<u32> {
        self.top.checked_add(self.bottom)
    }
}

/// Scale a frame by `factor` using nearest-neighbor sampling.
///
/// The target dimensions are `floor(width * factor)` x `floor(height * factor)`.
///
/// # Errors
///
/// Returns `EncodeError::InvalidDimensions` if the factor is not a positive
/// finite number, or if the scaled frame would be empty or have a side larger
/// than a GIF can hold (65535). Nothing is allocated in that case.
pub fn scale(frame: &RawFrame, factor: f32) -> Result<RawFrame, EncodeError> {
    let scaled_side = |side: u32| (side as f64 * factor as f64).floor();
    let (w, h) = (scaled_side(frame.width()), scaled_side(frame.height()));
    // float-to-int casts saturate, so the error carries the clamped size
    let (width, height) = (w as u32, h as u32);

    if !factor.is_finite() || factor <= 0.0 || width == 0 || height == 0 {
        return Err(EncodeError::InvalidDimensions { width, height });
    }
    if w > MAX_SIDE as f64 || h > MAX_SIDE as f64 {
        return Err(EncodeError::InvalidDimensions { width, height });
    }

    if width == frame.width() && height == frame.height() {
        return Ok(frame.clone());
    }

    let src = frame
        .to_rgb_image()
        .ok_or_else(|| EncodeError::InvalidPixelData {
            expected: frame.pixel_count() * 3,
            actual: frame.pixels().len(),
        })?;
    let scaled = image::imageops::resize(
        &src,
        width,
        height,
        image::imageops::FilterType::Nearest,
    );

    Ok(RawFrame::from_rgb_image(scaled))
}

/// Add black borders around a frame.
///
/// # Errors
///
/// Returns `EncodeError::InvalidDimensions` if the padded frame would be empty
/// or have a side larger than a GIF can hold (65535).
pub fn pad(frame: &RawFrame, padding: Padding) -> Result<RawFrame, EncodeError> {
    let width = padding
        .horizontal()
        .and_then(|extra| frame.width().checked_add(extra));
    let height = padding
        .vertical()
        .and_then(|extra| frame.height().checked_add(extra));

    let (width, height) = match (width, height) {
        (Some(w), Some(h)) if w > 0 && h > 0 && w <= MAX_SIDE && h <= MAX_SIDE => (w, h),
        (w, h) => {
            return Err(EncodeError::InvalidDimensions {
                width: w.unwrap_or(u32::MAX),
                height: h.unwrap_or(u32::MAX),
            })
        }
    };

    let mut canvas = image::RgbImage::new(width, height);
    if let Some(src) = frame.to_rgb_image() {
        image::imageops::replace(
            &mut canvas,
            &src,
            padding.left as i64,
            padding.top as i64,
        );
    }

    Ok(RawFrame::from_rgb_image(canvas))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Rgb;

    fn checker() -> RawFrame {
        // 2x2: white, black / black, white
        RawFrame::new(2, 2, vec![255, 255, 255, 0, 0, 0, 0, 0, 0, 255, 255, 255]).unwrap()
    }

    #[test]
    fn test_scale_integer_factor() {
        let scaled = scale(&checker(), 3.0).unwrap();
        assert_eq!((scaled.width(), scaled.height()), (6, 6));
        assert_eq!(scaled.pixel(0, 0), Some(Rgb::new(255, 255, 255)));
        assert_eq!(scaled.pixel(5, 0), Some(Rgb::BLACK));
        assert_eq!(scaled.pixel(5, 5), Some(Rgb::new(255, 255, 255)));
    }

    #[test]
    fn test_scale_identity_clones() {
        let frame = checker();
        assert_eq!(scale(&frame, 1.0).unwrap(), frame);
    }

    #[test]
    fn test_scale_truncates_dimensions() {
        let frame = RawFrame::filled(3, 3, Rgb::new(1, 1, 1)).unwrap();
        let scaled = scale(&frame, 1.5).unwrap();
        assert_eq!((scaled.width(), scaled.height()), (4, 4));
    }

    #[test]
    fn test_scale_to_nothing_is_error() {
        assert!(scale(&checker(), 0.1).is_err());
        assert!(scale(&checker(), -2.0).is_err());
        assert!(scale(&checker(), f32::NAN).is_err());
    }

    #[test]
    fn test_scale_beyond_gif_limit_is_error() {
        let frame = RawFrame::filled(2, 2, Rgb::BLACK).unwrap();
        assert!(matches!(
            scale(&frame, 1.0e9),
            Err(EncodeError::InvalidDimensions { .. })
        ));
        assert!(matches!(
            scale(&frame, f32::MAX),
            Err(EncodeError::InvalidDimensions {
                width: u32::MAX,
                height: u32::MAX
            })
        ));
        let wide = RawFrame::filled(2, 1, Rgb::BLACK).unwrap();
        assert!(matches!(
            scale(&wide, 32768.0),
            Err(EncodeError::InvalidDimensions {
                width: 65536,
                height: 32768
            })
        ));
    }

    #[test]
    fn test_pad_places_frame() {
        let frame = RawFrame::filled(1, 1, Rgb::new(9, 9, 9)).unwrap();
        let padded = pad(&frame, Padding::new(1, 2, 0, 1)).unwrap();

        assert_eq!((padded.width(), padded.height()), (4, 2));
        assert_eq!(padded.pixel(1, 1), Some(Rgb::new(9, 9, 9)));
        assert_eq!(padded.pixel(0, 0), Some(Rgb::BLACK));
        assert_eq!(padded.pixel(3, 1), Some(Rgb::BLACK));
    }

    #[test]
    fn test_pad_uniform() {
        let padded = pad(&checker(), Padding::uniform(2)).unwrap();
        assert_eq!((padded.width(), padded.height()), (6, 6));
        assert_eq!(padded.pixel(2, 2), Some(Rgb::new(255, 255, 255)));
    }

    #[test]
    fn test_pad_overflow_is_error() {
        let frame = RawFrame::filled(2, 2, Rgb::BLACK).unwrap();
        assert!(matches!(
            pad(&frame, Padding::new(0, u32::MAX, 0, 0)),
            Err(EncodeError::InvalidDimensions {
                width: u32::MAX,
                height: 2
            })
        ));
        assert!(pad(&frame, Padding::new(u32::MAX, 0, 1, 0)).is_err());
        assert!(pad(&frame, Padding::uniform(40_000)).is_err());
        assert_eq!(Padding::new(0, u32::MAX, 0, 1).horizontal(), None);
    }

    #[test]
    fn test_pad_empty_is_error() {
        let frame = RawFrame::new(0, 0, vec![]).unwrap();
        assert!(pad(&frame, Padding::default()).is_err());
    }
}
