//! Frame model for the encoding pipeline.
//!
//! This module provides:
//! - `RawFrame`, the full-color frame a caller hands to the encoder
//! - `IndexedFrame`, the same frame mapped onto a palette
//! - Canvas fitting (blit or nearest-neighbor rescale)
//! - The export effects of the editor (nearest-neighbor scale, padding)
//!
//! Resampling is done with the `image` crate's `imageops`.

mod effects;
mod resample;
mod types;

pub use effects::{pad, scale, Padding};
pub use resample::fit_to_canvas;
pub use types::{FrameFit, IndexedFrame, RawFrame};
