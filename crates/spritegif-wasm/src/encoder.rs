//! Animated GIF encoding WASM bindings.
//!
//! This module exposes the spritegif-core encoding session to JavaScript so the
//! editor can export an animation frame by frame, or in one call.
//!
//! # Example
//!
//! ```typescript
//! import { JsGifEncoder, JsRawFrame } from '@spritegif/wasm';
//!
//! const encoder = new JsGifEncoder({ repeat: 0, quality: 10 });
//! for (const cell of cells) {
//!   encoder.add_frame(new JsRawFrame(w, h, cell), { delay: 10 });
//! }
//! const gif = encoder.finish();
//! await writable.write(new Blob([gif], { type: 'image/gif' }));
//! ```

use crate::types::JsRawFrame;
use serde::de::DeserializeOwned;
use spritegif_core::{
    encode_animation, EncodeError, EncoderConfig, FrameAction, FrameMetadata, GifEncoder,
    RawFrame,
};
use wasm_bindgen::prelude::*;

/// Frame-by-frame GIF encoder for JavaScript.
///
/// The output buffer lives in WASM memory until `finish()` copies it out; the
/// encoder is ready for a new animation afterwards.
#[wasm_bindgen]
pub struct JsGifEncoder {
    inner: GifEncoder<Vec<u8>>,
}

#[wasm_bindgen]
impl JsGifEncoder {
    /// Create an encoder from a config object such as
    /// `{ repeat: 0, quality: 10, canvasSize: [64, 64], fit: "nearest" }`.
    /// Missing fields (or `undefined`) use the defaults.
    #[wasm_bindgen(constructor)]
    pub fn new(config: JsValue) -> Result<JsGifEncoder, JsValue> {
        let config: EncoderConfig = from_js_or_default(config)?;
        Self::with_config(config).map_err(|e| JsValue::from_str(&e.to_string()))
    }

    /// Set the canvas size; ignored once a frame has been added.
    pub fn set_canvas_size(&mut self, width: u16, height: u16) {
        self.inner.set_canvas_size(width, height);
    }

    /// Number of frames added since the last `finish()`.
    #[wasm_bindgen(getter)]
    pub fn frame_count(&self) -> usize {
        self.inner.frame_count()
    }

    /// Add a frame. `metadata` is e.g.
    /// `{ delay: 10, disposal: "restoreBackground", transparent: { r: 0, g: 0, b: 0 }, palette: "global" }`.
    pub fn add_frame(&mut self, frame: &JsRawFrame, metadata: JsValue) -> Result<(), JsValue> {
        let metadata: FrameMetadata = from_js_or_default(metadata)?;
        self.push_frame(frame, &metadata)
            .map_err(|e| JsValue::from_str(&e.to_string()))
    }

    /// Finish the animation and return the GIF bytes as a Uint8Array.
    pub fn finish(&mut self) -> Result<Vec<u8>, JsValue> {
        self.take_bytes()
            .map_err(|e| JsValue::from_str(&e.to_string()))
    }
}

impl JsGifEncoder {
    pub(crate) fn with_config(config: EncoderConfig) -> Result<Self, EncodeError> {
        let mut inner = GifEncoder::new(config);
        inner.open(Vec::new())?;
        Ok(Self { inner })
    }

    pub(crate) fn push_frame(
        &mut self,
        frame: &JsRawFrame,
        metadata: &FrameMetadata,
    ) -> Result<(), EncodeError> {
        self.inner.add_frame(frame.as_core(), metadata)
    }

    /// Finish into bytes and reopen on a fresh buffer.
    pub(crate) fn take_bytes(&mut self) -> Result<Vec<u8>, EncodeError> {
        let bytes = self.inner.finish()?;
        self.inner.open(Vec::new())?;
        Ok(bytes)
    }
}

/// Encode a strip of equally sized frames in one call.
///
/// # Arguments
///
/// * `pixels` - RGB data of every frame, one after another
/// * `width` / `height` - Size of each frame
/// * `delay_ms` - Delay between frames in milliseconds
/// * `repeat` - Loop count; 0 loops forever, negative plays once, values above
///   65535 are clamped to 65535
#[wasm_bindgen]
pub fn encode_gif(
    pixels: &[u8],
    width: u32,
    height: u32,
    delay_ms: u32,
    repeat: i32,
) -> Result<Vec<u8>, JsValue> {
    let config = EncoderConfig::new().with_repeat(repeat_from_js(repeat));
    let metadata = FrameMetadata::new().with_delay_ms(delay_ms);
    encode_strip(pixels, width, height, config, &metadata)
        .map_err(|e| JsValue::from_str(&e.to_string()))
}

/// NETSCAPE2.0 loop counts are 16-bit; larger counts clamp instead of
/// dropping the loop block.
fn repeat_from_js(repeat: i32) -> Option<u16> {
    if repeat < 0 {
        return None;
    }
    Some(repeat.min(u16::MAX as i32) as u16)
}

pub(crate) fn encode_strip(
    pixels: &[u8],
    width: u32,
    height: u32,
    config: EncoderConfig,
    metadata: &FrameMetadata,
) -> Result<Vec<u8>, EncodeError> {
    let frame_bytes = RawFrame::byte_len(width, height)
        .ok_or(EncodeError::InvalidDimensions { width, height })?;
    if frame_bytes == 0 {
        return Err(EncodeError::InvalidDimensions { width, height });
    }
    if pixels.is_empty() || pixels.len() % frame_bytes != 0 {
        return Err(EncodeError::InvalidPixelData {
            expected: pixels.len().div_ceil(frame_bytes).max(1) * frame_bytes,
            actual: pixels.len(),
        });
    }

    let frames = pixels
        .chunks_exact(frame_bytes)
        .map(|chunk| RawFrame::new(width, height, chunk.to_vec()))
        .collect::<Result<Vec<_>, _>>()?;
    encode_animation(Vec::new(), frames, config, metadata, |_, _| FrameAction::Encode)
}

fn from_js_or_default<T: DeserializeOwned + Default>(value: JsValue) -> Result<T, JsValue> {
    if value.is_undefined() || value.is_null() {
        return Ok(T::default());
    }
    serde_wasm_bindgen::from_value(value).map_err(|e| JsValue::from_str(&e.to_string()))
}
