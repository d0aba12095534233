//! Decode planning.
//!
//! This module decides HOW an image is decoded so that the decoder never
//! materialises a full-resolution bitmap when a smaller one satisfies the
//! caller:
//! - Picking an integer sample ratio from native and requested sizes
//! - Running the two-pass "probe bounds, then decode at ratio" protocol
//! - Sniffing containers that are unsafe to decode from a stream
//! - Routing each call to one of three strategies by platform tier
//!
//! # Architecture
//!
//! The pixel decoder itself is an injected [`BitmapDecoder`]. Everything here
//! is synchronous and holds no shared state, so independent decodes can run
//! concurrently.
//!
//! # Examples
//!
//! ```ignore
//! use sampleplan_core::decode::{ByteSource, DecodePlanner, DecodeRequest, ImageCrateDecoder};
//!
//! let file = std::fs::File::open("photo.webp").unwrap();
//! let planner = DecodePlanner::new(ImageCrateDecoder::new());
//! let request = DecodeRequest::new().resize(1024, 768).center_inside();
//! let bitmap = planner.decode_stream(&mut ByteSource::new(file), &request).unwrap();
//! println!("Decoded {}x{} bitmap", bitmap.width, bitmap.height);
//! ```

mod decoder;
mod format;
mod image_backend;
mod probe;
mod resource;
mod sizing;
mod source;
mod strategy;
mod types;

#[cfg(test)]
mod testing;

pub use decoder::{BitmapDecoder, DecodeInput};
pub use format::{classify, is_webp, sniff_format, FORMAT_PREFIX_LEN};
pub use image_backend::ImageCrateDecoder;
pub use probe::{
    decode_with_sizing, probe_dimensions, BufferedInput, ResourceInput, StreamedInput,
    TwoPassInput,
};
pub use resource::{
    is_vector_or_xml_resource, ResolvedResource, ResourceId, ResourceLookup, ResourceTable,
};
pub use sizing::{clamp_sample_ratio, compute_sample_ratio, sample_ratio_for, sampled_dimensions};
pub use source::{ByteSource, PeekReader};
pub use strategy::{select_strategy, DecodePlanner, StrategyInputs};
pub use types::{
    Bitmap, DecodeError, DecodeOptions, DecodeRequest, FitMode, FormatClassification,
    InputOrigin, PixelFormat, PlatformTier, ProbeOptions, ProbedDimensions, Strategy,
};
