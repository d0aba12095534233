//! Decode planning WASM bindings.
//!
//! This module exposes the sampleplan-core planner to JavaScript.
//!
//! # Functions
//!
//! - [`compute_sample_ratio`] - Downsample ratio for a source and target size
//! - [`classify_format`] - Container classification from the leading bytes
//! - [`is_webp_file`] - RIFF/WEBP signature check
//! - [`probe_dimensions`] - Native size from the image header
//! - [`plan_strategy`] - Strategy a decode would take on a given platform tier
//! - [`decode_for_display`] - Decode bytes at the smallest sufficient size
//! - [`decode_resource`] - Decode a named bundled resource
//!
//! # Example
//!
//! ```typescript
//! import { decode_for_display, plan_strategy } from '@sampleplan/wasm';
//!
//! const bytes = new Uint8Array(await file.arrayBuffer());
//! const request = { target_width: 512, target_height: 512, fit_mode: 'inside' };
//!
//! console.log(plan_strategy(bytes, request, 0)); // "legacy_streamed"
//! const bitmap = decode_for_display(bytes, request, 0);
//! console.log(`Decoded ${bitmap.width}x${bitmap.height}`);
//! ```

use std::io::Cursor;

use crate::types::{
    classification_name, request_from_js, strategy_name, tier_from_u8, to_js_error, JsBitmap,
};
use sampleplan_core::decode::{
    self, BitmapDecoder, ByteSource, DecodeInput, DecodePlanner, FitMode, ImageCrateDecoder,
    ProbeOptions, ResourceId, ResourceTable,
};
use wasm_bindgen::prelude::*;

/// Compute the integer downsample ratio for a source and requested size.
///
/// A requested axis of 0 is unconstrained. With both axes constrained,
/// `center_inside` picks the larger per-axis ratio (whole image fits), and
/// otherwise the smaller (target is covered).
///
/// # Example
///
/// ```typescript
/// compute_sample_ratio(4000, 3000, 1000, 1000, true); // 4
/// compute_sample_ratio(4000, 3000, 1000, 1000, false); // 3
/// ```
#[wasm_bindgen]
pub fn compute_sample_ratio(
    src_width: u32,
    src_height: u32,
    req_width: u32,
    req_height: u32,
    center_inside: bool,
) -> u32 {
    let fit = if center_inside {
        FitMode::Inside
    } else {
        FitMode::CenterCrop
    };
    decode::compute_sample_ratio(src_width, src_height, req_width, req_height, fit)
}

/// Classify the container from its first 12 bytes.
///
/// Returns `"unstable_under_streaming_decode"` for RIFF/WEBP, `"unknown"` when
/// fewer than 12 bytes are given, and `"other"` otherwise.
#[wasm_bindgen]
pub fn classify_format(bytes: &[u8]) -> String {
    classification_name(decode::classify(bytes)).to_string()
}

/// Check for the RIFF/WEBP container signature.
#[wasm_bindgen]
pub fn is_webp_file(bytes: &[u8]) -> bool {
    decode::is_webp(bytes)
}

/// Read the native dimensions from the image header without decoding pixels.
///
/// # Returns
///
/// A two-element array `[width, height]`.
///
/// # Errors
///
/// Fails with a `ProbeFailed` error if the header cannot be parsed.
#[wasm_bindgen]
pub fn probe_dimensions(bytes: &[u8]) -> Result<Vec<u32>, JsValue> {
    ImageCrateDecoder::new()
        .probe(DecodeInput::Bytes(bytes), &ProbeOptions::default())
        .map(|dims| vec![dims.width, dims.height])
        .map_err(to_js_error)
}

/// Strategy a decode of `bytes` would take on a platform of the given tier.
///
/// # Arguments
///
/// * `bytes` - The encoded image (only the first 12 bytes are examined)
/// * `request` - A request object, or `undefined` for no constraints
/// * `tier` - 0=Legacy, 1=LegacyPurgeableFloor, 2=Modern
#[wasm_bindgen]
pub fn plan_strategy(bytes: &[u8], request: JsValue, tier: u8) -> Result<String, JsValue> {
    let request = request_from_js(request)?;
    planner(tier)
        .plan_stream(&mut ByteSource::new(Cursor::new(bytes)), &request)
        .map(|strategy| strategy_name(strategy).to_string())
        .map_err(to_js_error)
}

/// Decode `bytes` into the smallest bitmap that satisfies `request`.
///
/// # Arguments
///
/// * `bytes` - The encoded image as a `Uint8Array`
/// * `request` - `{ target_width, target_height, fit_mode, preferred_pixel_format,
///   memory_optimization_requested }`; every field is optional
/// * `tier` - 0=Legacy, 1=LegacyPurgeableFloor, 2=Modern
///
/// # Errors
///
/// The thrown `Error` has `name` set to `ProbeFailed`, `DecodeFailed` or
/// `UnsupportedInput`.
#[wasm_bindgen]
pub fn decode_for_display(
    bytes: &[u8],
    request: JsValue,
    tier: u8,
) -> Result<JsBitmap, JsValue> {
    let request = request_from_js(request)?;
    planner(tier)
        .decode_stream(&mut ByteSource::new(Cursor::new(bytes)), &request)
        .map(JsBitmap::from_bitmap)
        .map_err(to_js_error)
}

/// Decode a bundled resource by its declared name.
///
/// Names ending in `.xml` or `.svg` are vector resources and are rejected
/// with an `UnsupportedInput` error before any decoding happens.
#[wasm_bindgen]
pub fn decode_resource(
    name: &str,
    bytes: &[u8],
    request: JsValue,
    tier: u8,
) -> Result<JsBitmap, JsValue> {
    let request = request_from_js(request)?;
    let mut table = ResourceTable::new();
    table.insert(name, name, bytes.to_vec());

    planner(tier)
        .decode_resource(&table, &ResourceId::from(name), &request)
        .map(JsBitmap::from_bitmap)
        .map_err(to_js_error)
}

fn planner(tier: u8) -> DecodePlanner<ImageCrateDecoder> {
    DecodePlanner::new(ImageCrateDecoder::with_tier(tier_from_u8(tier)))
}


/// WASM-specific tests that require JsValue.
///
/// Use `wasm-pack test` to run these.
#[cfg(all(test, target_arch = "wasm32"))]
mod wasm_tests {
    use super::*;
    use wasm_bindgen_test::*;

    wasm_bindgen_test_configure!(run_in_browser);

    const WEBP_HEADER: &[u8] = b"RIFF\x24\x00\x00\x00WEBPVP8 ";

    #[wasm_bindgen_test]
    fn test_probe_dimensions_invalid() {
        assert!(probe_dimensions(&[0, 1, 2, 3]).is_err());
    }

    #[wasm_bindgen_test]
    fn test_plan_strategy_by_tier() {
        assert_eq!(
            plan_strategy(WEBP_HEADER, JsValue::UNDEFINED, 0).unwrap(),
            "legacy_buffered"
        );
        assert_eq!(
            plan_strategy(&[0u8; 16], JsValue::NULL, 0).unwrap(),
            "legacy_streamed"
        );
        assert_eq!(
            plan_strategy(WEBP_HEADER, JsValue::UNDEFINED, 2).unwrap(),
            "modern_platform_path"
        );
    }

    #[wasm_bindgen_test]
    fn test_decode_for_display_invalid() {
        assert!(decode_for_display(&[0, 1, 2, 3], JsValue::UNDEFINED, 0).is_err());
        assert!(decode_for_display(&[], JsValue::UNDEFINED, 2).is_err());
    }

    #[wasm_bindgen_test]
    fn test_decode_resource_rejects_vector() {
        let err = decode_resource("ic_star.xml", b"<vector/>", JsValue::UNDEFINED, 2)
            .err()
            .unwrap();
        let err: js_sys::Error = err.unchecked_into();
        assert_eq!(String::from(err.name()), "UnsupportedInput");
    }

    #[wasm_bindgen_test]
    fn test_invalid_request_rejected() {
        let request = JsValue::from_str("not a request");
        assert!(plan_strategy(WEBP_HEADER, request, 0).is_err());
    }
}
