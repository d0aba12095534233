//! Sampleplan Core - Decode planning library
//!
//! This crate decides how to decode an image of unknown format into a bitmap
//! no larger than the caller needs: it picks a downsample ratio, runs the
//! bounds-probe/decode protocol against a pluggable decoder, and routes inputs
//! around platform and container quirks.

pub mod config;
pub mod decode;

pub use config::PlannerConfig;
pub use decode::{
    compute_sample_ratio, Bitmap, BitmapDecoder, ByteSource, DecodeError, DecodePlanner,
    DecodeRequest, FitMode, ImageCrateDecoder, PixelFormat, PlatformTier, Strategy,
};

/// Decode an in-memory image with the bundled `image` decoder.
///
/// The decoder reports `tier`, so callers can pick the strategy table row
/// they want to exercise.
pub fn decode_bytes(
    bytes: &[u8],
    request: &DecodeRequest,
    tier: PlatformTier,
) -> Result<Bitmap, DecodeError> {
    let planner = DecodePlanner::new(ImageCrateDecoder::with_tier(tier));
    planner.decode_stream(&mut ByteSource::new(bytes), request)
}

/// Strategy an in-memory image would be decoded with on a `tier` platform.
pub fn plan_bytes(
    bytes: &[u8],
    request: &DecodeRequest,
    tier: PlatformTier,
) -> Result<Strategy, DecodeError> {
    let planner = DecodePlanner::new(ImageCrateDecoder::with_tier(tier));
    planner.plan_stream(&mut ByteSource::new(bytes), request)
}
