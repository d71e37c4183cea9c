//! spritegif WASM - WebAssembly bindings for spritegif
//!
//! This crate provides WASM bindings to expose the spritegif-core animated GIF
//! encoder to the sprite editor's JavaScript/TypeScript front end.
//!
//! # Module Structure
//!
//! - `types` - WASM-compatible wrapper for frames
//! - `encoder` - Frame-by-frame and one-shot GIF encoding
//!
//! # Usage
//!
//! ```typescript
//! import init, { encode_gif } from '@spritegif/wasm';
//!
//! // Initialize WASM module (must call first)
//! await init();
//!
//! // Four 16x16 frames laid out one after another
//! const gif = encode_gif(strip, 16, 16, 100, 0);
//! ```

use wasm_bindgen::prelude::*;

mod encoder;
mod types;

// Re-export public types
pub use encoder::{encode_gif, JsGifEncoder};
pub use types::JsRawFrame;

/// Initialize the WASM module (called automatically on load)
#[wasm_bindgen(start)]
pub fn init() {}

/// Get the version of the WASM module
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}
