//! GIF encoding pipeline for spritegif.
//!
//! This module provides functionality for:
//! - GIF-flavored LZW compression of palette indices
//! - Writing GIF89a blocks in the required order
//! - A frame-by-frame session tying quantization, compression and the
//!   container together
//!
//! # Architecture
//!
//! All operations are synchronous and single-threaded. A [`GifEncoder`]
//! exclusively owns its sink from `open` until `finish` hands it back.
//!
//! # Examples
//!
//! ```ignore
//! use spritegif_core::{EncoderConfig, FrameMetadata, GifEncoder, RawFrame, Rgb};
//!
//! let mut encoder = GifEncoder::new(EncoderConfig::new().with_repeat(Some(0)));
//! encoder.open(Vec::new())?;
//! for color in [Rgb::new(255, 0, 0), Rgb::new(0, 255, 0)] {
//!     let frame = RawFrame::filled(16, 16, color)?;
//!     encoder.add_frame(&frame, &FrameMetadata::new().with_delay_ms(100))?;
//! }
//! let gif_bytes = encoder.finish()?;
//! ```

mod container;
mod lzw;
mod session;
mod types;

pub use container::{ContainerState, ContainerWriter, GraphicControl};
pub use lzw::{LzwEncoder, MAX_CODE_BITS};
pub use session::{GifEncoder, DEFAULT_CANVAS};
pub use types::{
    delay_ms_to_centis, DisposalMethod, EncodeError, EncoderConfig, FrameMetadata, PaletteMode,
};
