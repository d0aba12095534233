//! WASM-compatible wrapper types for the decode planner.
//!
//! This module converts between core sampleplan types and their JavaScript
//! representations: bitmaps, requests, tiers, and errors.

use sampleplan_core::decode::{
    Bitmap, DecodeError, DecodeRequest, FormatClassification, PixelFormat, PlatformTier,
    Strategy,
};
use wasm_bindgen::prelude::*;

/// A decoded bitmap wrapper for JavaScript.
///
/// # Memory Management
///
/// The pixel data is stored in WASM memory. When you call `pixels()`, a copy is made
/// to JavaScript memory as a `Uint8Array`.
///
/// The `free()` method can be called to explicitly release WASM memory, but this is
/// optional as wasm-bindgen's finalizer will handle cleanup automatically.
#[wasm_bindgen]
pub struct JsBitmap {
    width: u32,
    height: u32,
    format: PixelFormat,
    pixels: Vec<u8>,
}

#[wasm_bindgen]
impl JsBitmap {
    /// Get the bitmap width in pixels
    #[wasm_bindgen(getter)]
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Get the bitmap height in pixels
    #[wasm_bindgen(getter)]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Pixel layout: "rgba8", "rgb8" or "luma8"
    #[wasm_bindgen(getter)]
    pub fn format(&self) -> String {
        pixel_format_name(self.format).to_string()
    }

    /// Bytes per pixel for this bitmap's layout
    #[wasm_bindgen(getter)]
    pub fn channels(&self) -> usize {
        self.format.bytes_per_pixel()
    }

    /// Get the number of bytes in the pixel buffer
    #[wasm_bindgen(getter)]
    pub fn byte_length(&self) -> usize {
        self.pixels.len()
    }

    /// Returns pixel data as Uint8Array.
    ///
    /// Note: This creates a copy of the pixel data.
    pub fn pixels(&self) -> Vec<u8> {
        self.pixels.clone()
    }

    /// Explicitly free WASM memory.
    pub fn free(self) {}
}

impl JsBitmap {
    pub(crate) fn from_bitmap(bitmap: Bitmap) -> Self {
        Self {
            width: bitmap.width,
            height: bitmap.height,
            format: bitmap.format,
            pixels: bitmap.pixels,
        }
    }
}

/// Convert a u8 platform tier value to the core enum.
///
/// Values:
/// - 0 = Legacy
/// - 1 = LegacyPurgeableFloor
/// - 2 = Modern
///
/// Any other value defaults to Modern.
pub(crate) fn tier_from_u8(value: u8) -> PlatformTier {
    match value {
        0 => PlatformTier::Legacy,
        1 => PlatformTier::LegacyPurgeableFloor,
        _ => PlatformTier::Modern,
    }
}

/// Deserialize a request object; `undefined` and `null` mean "no constraints".
pub(crate) fn request_from_js(value: JsValue) -> Result<DecodeRequest, JsValue> {
    if value.is_undefined() || value.is_null() {
        return Ok(DecodeRequest::default());
    }
    serde_wasm_bindgen::from_value(value)
        .map_err(|e| JsValue::from_str(&format!("Invalid decode request: {}", e)))
}

pub(crate) fn strategy_name(strategy: Strategy) -> &'static str {
    match strategy {
        Strategy::ModernPlatformPath => "modern_platform_path",
        Strategy::LegacyBuffered => "legacy_buffered",
        Strategy::LegacyStreamed => "legacy_streamed",
    }
}

pub(crate) fn classification_name(classification: FormatClassification) -> &'static str {
    match classification {
        FormatClassification::Unknown => "unknown",
        FormatClassification::UnstableUnderStreamingDecode => "unstable_under_streaming_decode",
        FormatClassification::Other => "other",
    }
}

pub(crate) fn pixel_format_name(format: PixelFormat) -> &'static str {
    match format {
        PixelFormat::Rgba8 => "rgba8",
        PixelFormat::Rgb8 => "rgb8",
        PixelFormat::Luma8 => "luma8",
    }
}

/// JavaScript `Error.name` for a decode failure.
pub(crate) fn error_name(err: &DecodeError) -> &'static str {
    match err {
        DecodeError::ProbeFailed(_) => "ProbeFailed",
        DecodeError::DecodeFailed(_) | DecodeError::Io(_) => "DecodeFailed",
        DecodeError::UnsupportedInput(_) => "UnsupportedInput",
        DecodeError::ResourceNotFound(_) => "ResourceNotFound",
    }
}

/// Convert a core error into a JavaScript `Error` carrying the failure kind
/// in `name`. Failures are also logged to the browser console.
pub(crate) fn to_js_error(err: DecodeError) -> JsValue {
    let message = err.to_string();

    #[cfg(target_arch = "wasm32")]
    web_sys::console::warn_1(&JsValue::from_str(&format!(
        "sampleplan: {}: {}",
        error_name(&err),
        message
    )));

    let js_err = js_sys::Error::new(&message);
    js_err.set_name(error_name(&err));
    js_err.into()
}
