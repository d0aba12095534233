//! The external bitmap decoder capability.
//!
//! The planner never decodes pixels itself. It drives an implementation of
//! [`BitmapDecoder`], which is expected to honour the options it is handed:
//! a bounds probe must not allocate pixel memory, and a real decode must
//! subsample by [`DecodeOptions::sample_ratio`].

use std::fmt;
use std::io::BufRead;

use super::{
    Bitmap, DecodeError, DecodeOptions, PixelFormat, PlatformTier, ProbeOptions,
    ProbedDimensions, ResolvedResource,
};

/// Bytes handed to a decoder for one pass.
pub enum DecodeInput<'a> {
    /// A complete in-memory buffer.
    Bytes(&'a [u8]),
    /// A single-pass stream.
    Stream(Box<dyn BufRead + 'a>),
    /// A resolved resource; decoders may use its identity as well as its bytes.
    Resource(&'a ResolvedResource),
}

impl DecodeInput<'_> {
    /// Short name of the input kind, for logging.
    pub fn kind(&self) -> &'static str {
        match self {
            DecodeInput::Bytes(_) => "bytes",
            DecodeInput::Stream(_) => "stream",
            DecodeInput::Resource(_) => "resource",
        }
    }
}

impl fmt::Debug for DecodeInput<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DecodeInput::Bytes(bytes) => f.debug_tuple("Bytes").field(&bytes.len()).finish(),
            DecodeInput::Stream(_) => f.write_str("Stream(..)"),
            DecodeInput::Resource(resource) => {
                f.debug_tuple("Resource").field(&resource.id).finish()
            }
        }
    }
}

/// A platform bitmap decoder.
pub trait BitmapDecoder {
    /// Decode capability level of this decoder.
    fn capability_tier(&self) -> PlatformTier;

    /// Read the native dimensions without decoding pixels.
    ///
    /// Fails with [`DecodeError::ProbeFailed`] if the header cannot be read.
    fn probe(
        &self,
        input: DecodeInput<'_>,
        options: &ProbeOptions,
    ) -> Result<ProbedDimensions, DecodeError>;

    /// Decode pixels, subsampling by `options.sample_ratio()`.
    ///
    /// `Ok(None)` means the decoder produced no bitmap.
    fn decode(
        &self,
        input: DecodeInput<'_>,
        options: &DecodeOptions,
    ) -> Result<Option<Bitmap>, DecodeError>;

    /// Decode straight to a target size, scaling internally.
    ///
    /// `target` is `None` when the caller wants the native size; a 0 axis is
    /// derived from the aspect ratio. Only decoders at
    /// [`PlatformTier::Modern`] are expected to provide this.
    fn decode_with_target_size(
        &self,
        input: DecodeInput<'_>,
        _target: Option<(u32, u32)>,
        _format: Option<PixelFormat>,
    ) -> Result<Option<Bitmap>, DecodeError> {
        Err(DecodeError::UnsupportedInput(format!(
            "decoder has no target-size entry point for {} input",
            input.kind()
        )))
    }
}

impl<D: BitmapDecoder + ?Sized> BitmapDecoder for &D {
    fn capability_tier(&self) -> PlatformTier {
        (**self).capability_tier()
    }

    fn probe(
        &self,
        input: DecodeInput<'_>,
        options: &ProbeOptions,
    ) -> Result<ProbedDimensions, DecodeError> {
        (**self).probe(input, options)
    }

    fn decode(
        &self,
        input: DecodeInput<'_>,
        options: &DecodeOptions,
    ) -> Result<Option<Bitmap>, DecodeError> {
        (**self).decode(input, options)
    }

    fn decode_with_target_size(
        &self,
        input: DecodeInput<'_>,
        target: Option<(u32, u32)>,
        format: Option<PixelFormat>,
    ) -> Result<Option<Bitmap>, DecodeError> {
        (**self).decode_with_target_size(input, target, format)
    }
}
