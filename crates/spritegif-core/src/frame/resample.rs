//! Bringing frames to canvas size.
//!
//! The container writer never resizes: every frame must already match the
//! canvas when it reaches the classify/compress/write path. The session calls
//! [`fit_to_canvas`] for that.

use std::borrow::Cow;

use super::{FrameFit, RawFrame};
use crate::encode::EncodeError;

/// Fit a frame to exactly `width` x `height`.
///
/// Returns the input borrowed when it already has the canvas size.
///
/// # Errors
///
/// Returns `EncodeError::InvalidDimensions` if the target size is zero.
pub fn fit_to_canvas(
    frame: &RawFrame,
    width: u32,
    height: u32,
    fit: FrameFit,
) -> Result<Cow<'_, RawFrame>, EncodeError> {
    if width == 0 || height == 0 {
        return Err(EncodeError::InvalidDimensions { width, height });
    }

    if frame.width() == width && frame.height() == height {
        return Ok(Cow::Borrowed(frame));
    }

    let mut canvas = image::RgbImage::new(width, height);

    // A zero-area frame contributes nothing; the canvas stays black
    if frame.is_empty() {
        return Ok(Cow::Owned(RawFrame::from_rgb_image(canvas)));
    }

    let src = frame
        .to_rgb_image()
        .ok_or_else(|| EncodeError::InvalidPixelData {
            expected: frame.pixel_count() * 3,
            actual: frame.pixels().len(),
        })?;

    let fitted = match fit.to_image_filter() {
        Some(filter) => image::imageops::resize(&src, width, height, filter),
        None => {
            image::imageops::replace(&mut canvas, &src, 0, 0);
            canvas
        }
    };

    Ok(Cow::Owned(RawFrame::from_rgb_image(fitted)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Rgb;

    fn quadrants() -> RawFrame {
        // 2x2: red, green / blue, white
        RawFrame::new(
            2,
            2,
            vec![255, 0, 0, 0, 255, 0, 0, 0, 255, 255, 255, 255],
        )
        .unwrap()
    }

    #[test]
    fn test_same_size_is_borrowed() {
        let frame = quadrants();
        let fitted = fit_to_canvas(&frame, 2, 2, FrameFit::Blit).unwrap();
        assert!(matches!(fitted, Cow::Borrowed(_)));
    }

    #[test]
    fn test_blit_pads_with_black() {
        let frame = quadrants();
        let fitted = fit_to_canvas(&frame, 3, 3, FrameFit::Blit).unwrap();

        assert_eq!((fitted.width(), fitted.height()), (3, 3));
        assert_eq!(fitted.pixel(0, 0), Some(Rgb::new(255, 0, 0)));
        assert_eq!(fitted.pixel(1, 1), Some(Rgb::new(255, 255, 255)));
        assert_eq!(fitted.pixel(2, 0), Some(Rgb::BLACK));
        assert_eq!(fitted.pixel(0, 2), Some(Rgb::BLACK));
    }

    #[test]
    fn test_blit_crops() {
        let frame = quadrants();
        let fitted = fit_to_canvas(&frame, 1, 1, FrameFit::Blit).unwrap();

        assert_eq!(fitted.pixels(), &[255, 0, 0]);
    }

    #[test]
    fn test_nearest_upscale() {
        let frame = quadrants();
        let fitted = fit_to_canvas(&frame, 4, 4, FrameFit::Nearest).unwrap();

        assert_eq!((fitted.width(), fitted.height()), (4, 4));
        assert_eq!(fitted.pixel(0, 0), Some(Rgb::new(255, 0, 0)));
        assert_eq!(fitted.pixel(3, 0), Some(Rgb::new(0, 255, 0)));
        assert_eq!(fitted.pixel(0, 3), Some(Rgb::new(0, 0, 255)));
        assert_eq!(fitted.pixel(3, 3), Some(Rgb::new(255, 255, 255)));
    }

    #[test]
    fn test_empty_frame_becomes_black_canvas() {
        let frame = RawFrame::new(0, 0, vec![]).unwrap();
        let fitted = fit_to_canvas(&frame, 5, 4, FrameFit::Nearest).unwrap();

        assert_eq!(fitted.pixel_count(), 20);
        assert!(fitted.colors().all(|c| c == Rgb::BLACK));
    }

    #[test]
    fn test_zero_target_error() {
        let frame = quadrants();
        assert!(matches!(
            fit_to_canvas(&frame, 0, 2, FrameFit::Blit),
            Err(EncodeError::InvalidDimensions { .. })
        ));
    }
}
