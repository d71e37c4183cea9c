//! WASM-compatible wrapper types for frame data.
//!
//! This module provides JavaScript-friendly types that wrap the core spritegif
//! types, handling the conversion between Rust and JavaScript data representations.

use spritegif_core::frame::{pad, scale, Padding};
use spritegif_core::{EncodeError, RawFrame};
use wasm_bindgen::prelude::*;

/// A full-color frame wrapper for JavaScript.
///
/// # Memory Management
///
/// The pixel data is stored in WASM memory. When you call `pixels()`, a copy is made
/// to JavaScript memory as a `Uint8Array`.
#[wasm_bindgen]
pub struct JsRawFrame {
    inner: RawFrame,
}

#[wasm_bindgen]
impl JsRawFrame {
    /// Create a frame from dimensions and RGB pixel data (3 bytes per pixel,
    /// row-major order).
    #[wasm_bindgen(constructor)]
    pub fn new(width: u32, height: u32, pixels: Vec<u8>) -> Result<JsRawFrame, JsValue> {
        RawFrame::new(width, height, pixels)
            .map(Self::from_core)
            .map_err(|e| JsValue::from_str(&e.to_string()))
    }

    /// Decode a PNG (e.g. one cell exported from a sprite sheet).
    pub fn from_png(bytes: &[u8]) -> Result<JsRawFrame, JsValue> {
        RawFrame::decode(bytes)
            .map(Self::from_core)
            .map_err(|e| JsValue::from_str(&e.to_string()))
    }

    #[wasm_bindgen(getter)]
    pub fn width(&self) -> u32 {
        self.inner.width()
    }

    #[wasm_bindgen(getter)]
    pub fn height(&self) -> u32 {
        self.inner.height()
    }

    /// Number of bytes in the pixel buffer (width * height * 3)
    #[wasm_bindgen(getter)]
    pub fn byte_length(&self) -> usize {
        self.inner.pixels().len()
    }

    /// Returns RGB pixel data as Uint8Array (a copy).
    pub fn pixels(&self) -> Vec<u8> {
        self.inner.pixels().to_vec()
    }

    /// Nearest-neighbor scaled copy, as the editor's export "zoom" does.
    pub fn scaled(&self, factor: f32) -> Result<JsRawFrame, JsValue> {
        self.scaled_core(factor)
            .map_err(|e| JsValue::from_str(&e.to_string()))
    }

    /// Copy with black borders added on each side.
    pub fn padded(&self, top: u32, right: u32, bottom: u32, left: u32) -> Result<JsRawFrame, JsValue> {
        self.padded_core(Padding::new(top, right, bottom, left))
            .map_err(|e| JsValue::from_str(&e.to_string()))
    }
}

impl JsRawFrame {
    pub(crate) fn from_core(inner: RawFrame) -> Self {
        Self { inner }
    }

    pub(crate) fn as_core(&self) -> &RawFrame {
        &self.inner
    }

    pub(crate) fn scaled_core(&self, factor: f32) -> Result<JsRawFrame, EncodeError> {
        scale(&self.inner, factor).map(Self::from_core)
    }

    pub(crate) fn padded_core(&self, padding: Padding) -> Result<JsRawFrame, EncodeError> {
        pad(&self.inner, padding).map(Self::from_core)
    }
}


/// WASM-specific tests that require JsValue.
#[cfg(all(test, target_arch = "wasm32"))]
mod wasm_tests {
    use super::*;
    use wasm_bindgen_test::*;

    wasm_bindgen_test_configure!(run_in_browser);

    #[wasm_bindgen_test]
    fn test_new_validates_length() {
        assert!(JsRawFrame::new(2, 2, vec![0u8; 12]).is_ok());
        assert!(JsRawFrame::new(2, 2, vec![0u8; 11]).is_err());
    }

    #[wasm_bindgen_test]
    fn test_from_png_rejects_garbage() {
        assert!(JsRawFrame::from_png(&[1, 2, 3, 4]).is_err());
    }
}
