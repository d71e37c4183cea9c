//! spritegif Core - Animated GIF encoding library
//!
//! This crate provides the encoding pipeline behind the spritegif sprite-sheet
//! editor's "export as animated GIF": palette reduction, GIF-flavored LZW
//! compression and the GIF89a container, driven frame by frame through an
//! encoding session.

pub mod animation;
pub mod encode;
pub mod frame;
pub mod quantize;

pub use animation::{encode_animation, save_animation, FrameAction};
pub use encode::{
    DisposalMethod, EncodeError, EncoderConfig, FrameMetadata, GifEncoder, PaletteMode,
};
pub use frame::{FrameFit, IndexedFrame, Padding, RawFrame};
pub use quantize::{ColorQuantizer, Palette, QuantizeError};

/// An RGB color
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize,
)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const BLACK: Rgb = Rgb::new(0, 0, 0);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    pub fn to_array(self) -> [u8; 3] {
        [self.r, self.g, self.b]
    }

    /// Squared Euclidean distance over R, G and B.
    pub fn distance_squared(self, other: Rgb) -> u32 {
        let dr = self.r as i32 - other.r as i32;
        let dg = self.g as i32 - other.g as i32;
        let db = self.b as i32 - other.b as i32;
        (dr * dr + dg * dg + db * db) as u32
    }
}

impl From<[u8; 3]> for Rgb {
    fn from([r, g, b]: [u8; 3]) -> Self {
        Self::new(r, g, b)
    }
}
