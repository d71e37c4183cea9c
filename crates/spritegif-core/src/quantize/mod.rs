//! Palette reduction for GIF frames.
//!
//! This module provides:
//! - Learning a 256-entry adaptive palette from a frame's RGB samples
//! - Classifying arbitrary colors to the nearest palette index
//!
//! # Strategy
//!
//! Frames with at most 256 distinct colors (the common case for pixel-art
//! sprites) get an exact palette: every color is kept as-is, in order of first
//! appearance, so the encoded frame is lossless. Anything richer is reduced with
//! a self-organizing map (see [`NeuQuant`]).
//!
//! Classification always uses plain squared RGB distance, ties going to the
//! lowest index.

mod neuquant;
mod palette;

use std::collections::{HashMap, HashSet};

use thiserror::Error;

use crate::frame::{IndexedFrame, RawFrame};
use crate::Rgb;

pub use neuquant::NeuQuant;
pub use palette::{Palette, COLOR_TABLE_BYTES, PALETTE_SIZE};

/// Errors that can occur while building a palette.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum QuantizeError {
    /// No samples to learn from
    #[error("Cannot quantize an empty sample stream")]
    EmptyInput,

    /// Sample stream is not made of whole RGB triples
    #[error("Invalid sample data: {0} bytes is not a multiple of 3")]
    InvalidSampleLength(usize),
}

/// How a quantizer arrived at its palette.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuantizeMethod {
    /// Input had at most 256 distinct colors; the palette holds them exactly.
    Exact,
    /// Palette was learned by the neural network.
    Neural,
}

/// A palette learned from one sample stream, plus nearest-color lookup.
#[derive(Debug, Clone)]
pub struct ColorQuantizer {
    palette: Palette,
    method: QuantizeMethod,
}

impl ColorQuantizer {
    /// Learn a palette from RGB samples.
    ///
    /// # Arguments
    ///
    /// * `pixels` - RGB samples (3 bytes per pixel)
    /// * `quality` - Sampling factor: 1 examines every pixel, higher values skip
    ///   pixels for speed at the cost of fidelity. Values below 1 are clamped to 1.
    ///
    /// # Errors
    ///
    /// Returns `QuantizeError::EmptyInput` for an empty stream and
    /// `QuantizeError::InvalidSampleLength` if the length is not a multiple of 3.
    pub fn new(pixels: &[u8], quality: u32) -> Result<Self, QuantizeError> {
        if pixels.is_empty() {
            return Err(QuantizeError::EmptyInput);
        }
        if pixels.len() % 3 != 0 {
            return Err(QuantizeError::InvalidSampleLength(pixels.len()));
        }

        if let Some(colors) = distinct_colors(pixels) {
            return Ok(Self {
                palette: Palette::from_colors(&colors),
                method: QuantizeMethod::Exact,
            });
        }

        let network = NeuQuant::train(pixels, quality.max(1) as usize);
        Ok(Self {
            palette: Palette::from_colors(&network.colors()),
            method: QuantizeMethod::Neural,
        })
    }

    /// Finalize and return the learned palette (always 256 entries).
    pub fn process(&self) -> Palette {
        self.palette.clone()
    }

    pub fn palette(&self) -> &Palette {
        &self.palette
    }

    pub fn method(&self) -> QuantizeMethod {
        self.method
    }

    /// Index of the palette entry nearest to `color`.
    pub fn classify(&self, color: Rgb) -> u8 {
        self.palette.nearest(color)
    }

    /// Map every pixel of a frame to a palette index, marking the entries used.
    pub fn index_frame(&mut self, frame: &RawFrame) -> IndexedFrame {
        let mut cache: HashMap<Rgb, u8> = HashMap::new();
        let mut indices = Vec::with_capacity(frame.pixel_count());

        for color in frame.colors() {
            let palette = &self.palette;
            let index = *cache
                .entry(color)
                .or_insert_with(|| palette.nearest(color));
            indices.push(index);
        }
        for &index in cache.values() {
            self.palette.mark_used(index);
        }

        IndexedFrame::new(frame.width(), frame.height(), indices)
    }
}

/// Distinct colors in order of first appearance, or `None` if there are more
/// than fit in a palette.
fn distinct_colors(pixels: &[u8]) -> Option<Vec<Rgb>> {
    let mut seen = HashSet::new();
    let mut colors = Vec::new();
    for chunk in pixels.chunks_exact(3) {
        let color = Rgb::new(chunk[0], chunk[1], chunk[2]);
        if seen.insert(color) {
            if colors.len() == PALETTE_SIZE {
                return None;
            }
            colors.push(color);
        }
    }
    Some(colors)
}


// ============================================================================
// Property-Based Tests
// ============================================================================
