//! Sampleplan WASM - WebAssembly bindings for the decode planner
//!
//! This crate provides WASM bindings to expose the sampleplan-core
//! functionality to JavaScript/TypeScript applications.
//!
//! # Module Structure
//!
//! - `types` - WASM-compatible wrapper types for bitmaps, requests and errors
//! - `decode` - Sample ratio, format sniffing, strategy planning and decoding
//!
//! # Usage
//!
//! ```typescript
//! import init, { decode_for_display, JsBitmap } from '@sampleplan/wasm';
//!
//! // Initialize WASM module (must call first)
//! await init();
//!
//! const bytes = new Uint8Array(await file.arrayBuffer());
//! const bitmap = decode_for_display(bytes, { target_width: 256, target_height: 256 }, 2);
//! console.log(`Decoded ${bitmap.width}x${bitmap.height}`);
//! ```

use wasm_bindgen::prelude::*;

mod decode;
mod types;

// Re-export public types
pub use decode::{
    classify_format, compute_sample_ratio, decode_for_display, decode_resource, is_webp_file,
    plan_strategy, probe_dimensions,
};
pub use types::JsBitmap;

/// Initialize the WASM module (called automatically on load)
#[wasm_bindgen(start)]
pub fn init() {}

/// Get the version of the WASM module
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}
