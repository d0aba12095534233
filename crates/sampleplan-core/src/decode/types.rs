//! Core types for decode planning.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error types for decode planning operations.
#[derive(Debug, Error)]
pub enum DecodeError {
    /// The decoder could not determine the image bounds (e.g. a corrupt header).
    #[error("Failed to read image bounds: {0}")]
    ProbeFailed(String),

    /// The decoder returned no pixel data on the real pass.
    ///
    /// Treated as a transient I/O-class failure; callers may retry the whole
    /// decode later.
    #[error("Failed to decode bitmap: {0}")]
    DecodeFailed(String),

    /// The input is not a raster image this planner handles (e.g. a vector
    /// or XML resource).
    #[error("Unsupported input: {0}")]
    UnsupportedInput(String),

    /// A resource identifier did not resolve to any bytes.
    #[error("Resource not found: {0}")]
    ResourceNotFound(String),

    /// Reading the byte source failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl DecodeError {
    /// Whether a caller-level retry of the whole decode may succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, DecodeError::DecodeFailed(_) | DecodeError::Io(_))
    }

    pub(crate) fn no_bitmap() -> Self {
        DecodeError::DecodeFailed("decoder returned no bitmap".to_string())
    }
}

/// How the decoded image relates to the target box.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FitMode {
    /// The whole image must fit inside the target box.
    Inside,
    /// The target box must be fully covered; the image may be cropped.
    #[default]
    #[serde(alias = "exact")]
    CenterCrop,
}

/// Pixel layout the caller would like the bitmap decoded into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PixelFormat {
    /// 8-bit RGBA, 4 bytes per pixel.
    #[default]
    Rgba8,
    /// 8-bit RGB, 3 bytes per pixel.
    Rgb8,
    /// 8-bit grayscale, 1 byte per pixel.
    Luma8,
}

impl PixelFormat {
    /// Number of bytes each pixel occupies.
    #[inline]
    pub fn bytes_per_pixel(self) -> usize {
        match self {
            PixelFormat::Rgba8 => 4,
            PixelFormat::Rgb8 => 3,
            PixelFormat::Luma8 => 1,
        }
    }
}

/// What the caller wants decoded.
///
/// A target dimension of 0 leaves that axis unconstrained. Built with the
/// chained setters:
///
/// ```ignore
/// let request = DecodeRequest::new().resize(1000, 1000).center_inside();
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DecodeRequest {
    /// Target width in pixels (0 = unconstrained).
    pub target_width: u32,
    /// Target height in pixels (0 = unconstrained).
    pub target_height: u32,
    /// Fit policy used when both axes are constrained.
    pub fit_mode: FitMode,
    /// Preferred output pixel layout.
    pub preferred_pixel_format: Option<PixelFormat>,
    /// Legacy memory-optimisation flag. Only honoured on platforms below the
    /// purgeable floor, where it forces a fully buffered decode.
    pub memory_optimization_requested: bool,
}

impl DecodeRequest {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn resize(mut self, target_width: u32, target_height: u32) -> Self {
        self.target_width = target_width;
        self.target_height = target_height;
        self
    }

    pub fn center_inside(mut self) -> Self {
        self.fit_mode = FitMode::Inside;
        self
    }

    pub fn center_crop(mut self) -> Self {
        self.fit_mode = FitMode::CenterCrop;
        self
    }

    pub fn pixel_format(mut self, format: PixelFormat) -> Self {
        self.preferred_pixel_format = Some(format);
        self
    }

    pub fn memory_optimized(mut self, requested: bool) -> Self {
        self.memory_optimization_requested = requested;
        self
    }

    /// True if at least one target axis is constrained.
    #[inline]
    pub fn has_size(&self) -> bool {
        self.target_width != 0 || self.target_height != 0
    }

    /// Target size hint for decoders that scale internally.
    pub fn size_hint(&self) -> Option<(u32, u32)> {
        self.has_size().then_some((self.target_width, self.target_height))
    }
}

/// Native image dimensions reported by a bounds-only probe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProbedDimensions {
    pub width: u32,
    pub height: u32,
}

impl ProbedDimensions {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// A probe that reports a zero axis did not find usable bounds.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

/// Options for the bounds-only pass.
///
/// Consumed by [`ProbeOptions::into_decode_options`], so a set of options
/// leaves bounds mode exactly once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ProbeOptions {
    preferred_pixel_format: Option<PixelFormat>,
    shareable_buffer_hint: bool,
}

impl ProbeOptions {
    pub fn for_request(request: &DecodeRequest) -> Self {
        Self {
            preferred_pixel_format: request.preferred_pixel_format,
            shareable_buffer_hint: request.memory_optimization_requested,
        }
    }

    /// Always true: these options never decode pixels.
    #[inline]
    pub fn just_probe_bounds(&self) -> bool {
        true
    }

    pub fn preferred_pixel_format(&self) -> Option<PixelFormat> {
        self.preferred_pixel_format
    }

    pub fn shareable_buffer_hint(&self) -> bool {
        self.shareable_buffer_hint
    }

    /// Leave bounds mode with the given sample ratio (clamped to at least 1).
    pub fn into_decode_options(self, sample_ratio: u32) -> DecodeOptions {
        DecodeOptions {
            sample_ratio: sample_ratio.max(1),
            preferred_pixel_format: self.preferred_pixel_format,
            shareable_buffer_hint: self.shareable_buffer_hint,
        }
    }
}

/// Options for the real pixel decode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecodeOptions {
    sample_ratio: u32,
    preferred_pixel_format: Option<PixelFormat>,
    shareable_buffer_hint: bool,
}

impl DecodeOptions {
    /// Integer subsampling factor, always at least 1.
    #[inline]
    pub fn sample_ratio(&self) -> u32 {
        self.sample_ratio
    }

    /// Always false: these options decode pixels.
    #[inline]
    pub fn just_probe_bounds(&self) -> bool {
        false
    }

    pub fn preferred_pixel_format(&self) -> Option<PixelFormat> {
        self.preferred_pixel_format
    }

    pub fn shareable_buffer_hint(&self) -> bool {
        self.shareable_buffer_hint
    }
}

/// Classification of an input by its leading bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FormatClassification {
    /// Not enough bytes to tell.
    Unknown,
    /// A container that faults some legacy decoders when fed as a stream.
    UnstableUnderStreamingDecode,
    /// Anything else.
    Other,
}

/// Where the input bytes come from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InputOrigin {
    Stream,
    Resource,
}

/// Ordered decode capability level of the platform decoder.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum PlatformTier {
    /// No target-size entry point; memory optimisation only works from byte arrays.
    #[default]
    Legacy,
    /// Legacy decoder that manages bitmap memory itself.
    LegacyPurgeableFloor,
    /// Decoder with a native target-size entry point.
    Modern,
}

/// How a single decode call is executed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    /// Delegate to the decoder's target-size entry point.
    ModernPlatformPath,
    /// Buffer the whole input, then probe and decode from the buffer.
    LegacyBuffered,
    /// Probe through a re-readable view, then decode from the stream.
    LegacyStreamed,
}

/// A decoded bitmap.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bitmap {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Pixel layout of `pixels`.
    pub format: PixelFormat,
    /// Pixel data in row-major order.
    pub pixels: Vec<u8>,
}

impl Bitmap {
    /// Create a new Bitmap with the given dimensions and pixel data.
    pub fn new(width: u32, height: u32, format: PixelFormat, pixels: Vec<u8>) -> Self {
        debug_assert_eq!(
            pixels.len(),
            width as usize * height as usize * format.bytes_per_pixel(),
            "Pixel buffer size mismatch"
        );
        Self {
            width,
            height,
            format,
            pixels,
        }
    }

    /// Size of the pixel buffer in bytes.
    pub fn byte_size(&self) -> usize {
        self.pixels.len()
    }

    /// Check if this is an empty/invalid bitmap.
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0 || self.pixels.is_empty()
    }
}
