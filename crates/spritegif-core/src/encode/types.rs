//! Core types for GIF encoding: errors, per-frame metadata and session config.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::container::ContainerState;
use crate::frame::FrameFit;
use crate::quantize::QuantizeError;
use crate::Rgb;

/// Errors that can occur during GIF encoding.
#[derive(Debug, Error)]
pub enum EncodeError {
    /// Pixel data length doesn't match expected dimensions
    #[error("Invalid pixel data: expected {expected} bytes (width * height * 3), got {actual}")]
    InvalidPixelData { expected: usize, actual: usize },

    /// Width or height is zero where a real size is required
    #[error("Invalid dimensions: width ({width}) and height ({height}) must be non-zero")]
    InvalidDimensions { width: u32, height: u32 },

    /// GIF sizes are 16-bit
    #[error("Canvas {width}x{height} exceeds the GIF limit of 65535x65535")]
    CanvasTooLarge { width: u32, height: u32 },

    /// A frame reached the writer without being fitted to the canvas
    #[error("Frame is {actual_width}x{actual_height} but the canvas is {canvas_width}x{canvas_height}")]
    DimensionMismatch {
        canvas_width: u16,
        canvas_height: u16,
        actual_width: u32,
        actual_height: u32,
    },

    /// `open` was called while a sink is still attached
    #[error("Encoder is already writing to a sink")]
    AlreadyOpen,

    /// A frame or `finish` was requested before `open`
    #[error("Encoder has no open sink")]
    NotOpen,

    /// Container blocks requested out of order
    #[error("Cannot {operation} in container state {state:?}")]
    InvalidState {
        operation: &'static str,
        state: ContainerState,
    },

    /// LZW color depth must be 1 to 8 bits
    #[error("Invalid color depth: {0} (must be 1-8)")]
    InvalidColorDepth(u8),

    /// Palette index does not fit the LZW color depth
    #[error("Palette index {index} does not fit in {color_depth} bits")]
    IndexOutOfRange { index: u8, color_depth: u8 },

    /// Palette could not be built
    #[error("Quantization failed: {0}")]
    Quantize(#[from] QuantizeError),

    /// Writing to the sink failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// An input image could not be decoded
    #[error("Image decoding failed: {0}")]
    Decode(String),
}

/// How a decoder should treat a frame's area before the next frame is drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[repr(u8)]
pub enum DisposalMethod {
    /// No disposal specified. The decoder is not required to take any action.
    #[default]
    None = 0,
    /// Leave the graphic in place.
    DoNotDispose = 1,
    /// Restore the area to the background color.
    RestoreBackground = 2,
    /// Restore the area to what was there before the graphic was drawn.
    RestorePrevious = 3,
}

impl DisposalMethod {
    /// The 3-bit code stored in the Graphic Control Extension.
    pub fn code(self) -> u8 {
        self as u8
    }

    /// Pick the disposal for a frame.
    ///
    /// An explicit setting always wins. Otherwise frames with a transparent
    /// color restore to background so transparent areas clear between frames,
    /// and all others use `None`.
    pub fn resolve(explicit: Option<DisposalMethod>, has_transparency: bool) -> Self {
        match explicit {
            Some(method) => method,
            None if has_transparency => DisposalMethod::RestoreBackground,
            None => DisposalMethod::None,
        }
    }
}

impl From<u8> for DisposalMethod {
    fn from(value: u8) -> Self {
        match value & 0b111 {
            1 => DisposalMethod::DoNotDispose,
            2 => DisposalMethod::RestoreBackground,
            3 => DisposalMethod::RestorePrevious,
            _ => DisposalMethod::None,
        }
    }
}

/// Which color table a frame is indexed against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PaletteMode {
    /// Learn a fresh palette from this frame and write it as a local color table.
    #[default]
    Local,
    /// Reuse the first frame's (global) palette and write no local table.
    /// The first frame always builds the global palette.
    Global,
}

/// Per-frame settings passed to `GifEncoder::add_frame`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FrameMetadata {
    /// Delay before the next frame, in hundredths of a second.
    pub delay: u16,
    /// Explicit disposal; `None` applies the transparency-based default.
    pub disposal: Option<DisposalMethod>,
    /// Color rendered as transparent. Need not occur in the frame: the nearest
    /// palette entry is used.
    pub transparent: Option<Rgb>,
    /// Local (default) or global color table.
    pub palette: PaletteMode,
}

impl FrameMetadata {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the delay in milliseconds, rounded to the nearest centisecond.
    pub fn with_delay_ms(mut self, ms: u32) -> Self {
        self.delay = delay_ms_to_centis(ms);
        self
    }

    /// Set the delay from a frame rate. Non-positive rates are ignored.
    pub fn with_frame_rate(mut self, fps: f32) -> Self {
        if fps > 0.0 && fps.is_finite() {
            self.delay = (100.0 / fps).round().min(u16::MAX as f32) as u16;
        }
        self
    }

    pub fn with_disposal(mut self, disposal: DisposalMethod) -> Self {
        self.disposal = Some(disposal);
        self
    }

    pub fn with_transparent(mut self, color: Rgb) -> Self {
        self.transparent = Some(color);
        self
    }

    pub fn with_palette(mut self, palette: PaletteMode) -> Self {
        self.palette = palette;
        self
    }

    /// Delay in milliseconds.
    pub fn delay_ms(&self) -> u32 {
        self.delay as u32 * 10
    }

    /// Frames per second implied by the delay, or 0 for no delay.
    pub fn frame_rate(&self) -> f32 {
        if self.delay == 0 {
            0.0
        } else {
            100.0 / self.delay as f32
        }
    }

    /// Disposal after applying the default policy.
    pub fn resolved_disposal(&self) -> DisposalMethod {
        DisposalMethod::resolve(self.disposal, self.transparent.is_some())
    }
}

/// Milliseconds to centiseconds, rounding half up and saturating at `u16::MAX`.
pub fn delay_ms_to_centis(ms: u32) -> u16 {
    ((ms as u64 + 5) / 10).min(u16::MAX as u64) as u16
}

/// Session-wide settings for `GifEncoder`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EncoderConfig {
    /// Netscape loop count: `None` writes no loop extension (play once),
    /// `Some(0)` loops forever, `Some(n)` plays `n` extra times.
    pub repeat: Option<u16>,
    /// Quantizer sampling factor (1 = best, higher = faster). Clamped to at least 1.
    pub quality: u32,
    /// Canvas size override; defaults to the first frame's size.
    pub canvas_size: Option<(u16, u16)>,
    /// How frames that don't match the canvas are fitted.
    pub fit: FrameFit,
}

impl EncoderConfig {
    /// Default quantizer sampling factor: good colors at reasonable speed.
    pub const DEFAULT_QUALITY: u32 = 10;

    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_repeat(mut self, repeat: Option<u16>) -> Self {
        self.repeat = repeat;
        self
    }

    pub fn with_quality(mut self, quality: u32) -> Self {
        self.quality = quality.max(1);
        self
    }

    pub fn with_canvas_size(mut self, width: u16, height: u16) -> Self {
        self.canvas_size = Some((width, height));
        self
    }

    pub fn with_fit(mut self, fit: FrameFit) -> Self {
        self.fit = fit;
        self
    }
}

impl Default for EncoderConfig {
    fn default() -> Self {
        Self {
            repeat: None,
            quality: Self::DEFAULT_QUALITY,
            canvas_size: None,
            fit: FrameFit::Blit,
        }
    }
}
