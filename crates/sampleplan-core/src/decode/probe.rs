//! Two-pass "probe bounds, then decode at ratio" protocol.
//!
//! Used when the decoder has no native target-size entry point:
//!
//! 1. Probe the native dimensions with [`ProbeOptions`] (no pixels decoded).
//! 2. Pick a sample ratio for the request.
//! 3. Turn the probe options into [`DecodeOptions`] and decode for real.
//!
//! Requests without a target size skip the probe and decode at ratio 1.

use std::io::Read;

use tracing::debug;

use super::sizing::sample_ratio_for;
use super::{
    Bitmap, BitmapDecoder, ByteSource, DecodeError, DecodeInput, DecodeRequest, ProbeOptions,
    ProbedDimensions, ResolvedResource,
};

/// An input that can be handed to a decoder twice, bounds pass first.
pub trait TwoPassInput {
    /// Input for the bounds pass. Must leave everything the pixel pass needs
    /// readable.
    fn bounds_input(&mut self) -> DecodeInput<'_>;

    /// Input for the pixel pass.
    fn pixel_input(&mut self) -> DecodeInput<'_>;
}

/// A fully buffered input; both passes read the same slice.
#[derive(Debug, Clone, Copy)]
pub struct BufferedInput<'a> {
    bytes: &'a [u8],
}

impl<'a> BufferedInput<'a> {
    pub fn new(bytes: &'a [u8]) -> Self {
        Self { bytes }
    }
}

impl TwoPassInput for BufferedInput<'_> {
    fn bounds_input(&mut self) -> DecodeInput<'_> {
        DecodeInput::Bytes(self.bytes)
    }

    fn pixel_input(&mut self) -> DecodeInput<'_> {
        DecodeInput::Bytes(self.bytes)
    }
}

/// A stream probed through a re-readable view, then consumed by the pixel pass.
#[derive(Debug)]
pub struct StreamedInput<'a, R> {
    source: &'a mut ByteSource<R>,
}

impl<'a, R: Read> StreamedInput<'a, R> {
    pub fn new(source: &'a mut ByteSource<R>) -> Self {
        Self { source }
    }
}

impl<R: Read> TwoPassInput for StreamedInput<'_, R> {
    fn bounds_input(&mut self) -> DecodeInput<'_> {
        DecodeInput::Stream(Box::new(self.source.peek_reader()))
    }

    fn pixel_input(&mut self) -> DecodeInput<'_> {
        DecodeInput::Stream(Box::new(&mut *self.source))
    }
}

/// A resolved resource passed to the decoder by identity on both passes.
#[derive(Debug, Clone, Copy)]
pub struct ResourceInput<'a> {
    resource: &'a ResolvedResource,
}

impl<'a> ResourceInput<'a> {
    pub fn new(resource: &'a ResolvedResource) -> Self {
        Self { resource }
    }
}

impl TwoPassInput for ResourceInput<'_> {
    fn bounds_input(&mut self) -> DecodeInput<'_> {
        DecodeInput::Resource(self.resource)
    }

    fn pixel_input(&mut self) -> DecodeInput<'_> {
        DecodeInput::Resource(self.resource)
    }
}

/// Probe the native dimensions of an input.
///
/// A probe that reports a zero dimension is treated as
/// [`DecodeError::ProbeFailed`].
pub fn probe_dimensions<D: BitmapDecoder + ?Sized>(
    decoder: &D,
    input: DecodeInput<'_>,
    options: &ProbeOptions,
) -> Result<ProbedDimensions, DecodeError> {
    let probed = decoder.probe(input, options)?;
    if probed.is_empty() {
        return Err(DecodeError::ProbeFailed(format!(
            "decoder reported empty bounds {}x{}",
            probed.width, probed.height
        )));
    }
    Ok(probed)
}

/// Decode `input` for `request`, sizing with a bounds probe when needed.
///
/// Errors from either pass are returned unchanged. A real pass that yields no
/// bitmap becomes [`DecodeError::DecodeFailed`].
pub fn decode_with_sizing<D, I>(
    decoder: &D,
    input: &mut I,
    request: &DecodeRequest,
) -> Result<Bitmap, DecodeError>
where
    D: BitmapDecoder + ?Sized,
    I: TwoPassInput + ?Sized,
{
    let probe_options = ProbeOptions::for_request(request);

    let options = if request.has_size() {
        let probed = probe_dimensions(decoder, input.bounds_input(), &probe_options)?;
        let ratio = sample_ratio_for(probed, request);
        debug!(
            width = probed.width,
            height = probed.height,
            target_width = request.target_width,
            target_height = request.target_height,
            ratio,
            "probed bounds"
        );
        probe_options.into_decode_options(ratio)
    } else {
        probe_options.into_decode_options(1)
    };

    decoder
        .decode(input.pixel_input(), &options)?
        .ok_or_else(DecodeError::no_bitmap)
}
