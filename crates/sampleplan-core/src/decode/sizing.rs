//! Sample-ratio selection for downsampled decoding.
//!
//! A decoder given a sample ratio `r` reads every `r`-th pixel on both axes,
//! producing a bitmap roughly `1/r` the size without ever allocating the
//! full-resolution image. The functions here pick `r` from the native and
//! requested dimensions. They are pure arithmetic and never fail.

use super::{DecodeRequest, FitMode, ProbedDimensions};

/// Compute the raw integer sample ratio for decoding a `src_width x src_height`
/// image into a `req_width x req_height` box.
///
/// A requested dimension of 0 leaves that axis unconstrained. When both axes
/// are constrained, [`FitMode::Inside`] takes the larger per-axis ratio (the
/// whole image fits in the box) and [`FitMode::CenterCrop`] the smaller one
/// (the box stays covered).
///
/// The result can be 0 when the source is smaller than the request along the
/// binding axis; pass it through [`clamp_sample_ratio`] before handing it to
/// a decoder.
pub fn compute_sample_ratio(
    src_width: u32,
    src_height: u32,
    req_width: u32,
    req_height: u32,
    fit_mode: FitMode,
) -> u32 {
    if req_width == 0 && req_height == 0 {
        return 1;
    }

    if src_height <= req_height && src_width <= req_width {
        return 1;
    }

    if req_height == 0 {
        return src_width / req_width;
    }

    if req_width == 0 {
        return src_height / req_height;
    }

    let height_ratio = src_height / req_height;
    let width_ratio = src_width / req_width;

    match fit_mode {
        FitMode::Inside => height_ratio.max(width_ratio),
        FitMode::CenterCrop => height_ratio.min(width_ratio),
    }
}

/// Raise a ratio of 0 to 1; decoders reject a zero ratio.
#[inline]
pub fn clamp_sample_ratio(ratio: u32) -> u32 {
    ratio.max(1)
}

/// Decoder-ready sample ratio for a probed image and a request.
///
/// Returns 1 when the request has no target size.
pub fn sample_ratio_for(probed: ProbedDimensions, request: &DecodeRequest) -> u32 {
    if !request.has_size() {
        return 1;
    }

    clamp_sample_ratio(compute_sample_ratio(
        probed.width,
        probed.height,
        request.target_width,
        request.target_height,
        request.fit_mode,
    ))
}

/// Dimensions of a bitmap decoded at `ratio`.
///
/// Each axis is divided by the ratio and kept at least 1 pixel.
pub fn sampled_dimensions(width: u32, height: u32, ratio: u32) -> (u32, u32) {
    let ratio = clamp_sample_ratio(ratio);
    ((width / ratio).max(1), (height / ratio).max(1))
}


// ============================================================================
// Property-Based Tests
// ============================================================================
