//! Strategy selection and the top-level decode entry points.
//!
//! All routing happens in [`select_strategy`]:
//!
//! | Condition                                                              | Strategy             |
//! |------------------------------------------------------------------------|----------------------|
//! | tier >= `Modern`                                                       | `ModernPlatformPath` |
//! | unstable container, or memory optimisation below the purgeable floor   | `LegacyBuffered`     |
//! | otherwise                                                              | `LegacyStreamed`     |
//!
//! A chosen strategy is final for the call. If it fails there is no fallback
//! to another strategy; the error goes back to the caller, who owns any retry.

use std::io::Read;

use tracing::{debug, warn};

use super::format::{classify, sniff_format, FORMAT_PREFIX_LEN};
use super::probe::{decode_with_sizing, BufferedInput, ResourceInput, StreamedInput};
use super::resource::{is_vector_or_xml_resource, ResourceId, ResourceLookup};
use super::{
    Bitmap, BitmapDecoder, ByteSource, DecodeError, DecodeInput, DecodeRequest,
    FormatClassification, InputOrigin, PlatformTier, Strategy,
};
use crate::config::PlannerConfig;

/// Everything the selector looks at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StrategyInputs {
    pub tier: PlatformTier,
    pub classification: FormatClassification,
    pub memory_optimization_requested: bool,
    pub origin: InputOrigin,
}

/// Pick the decode strategy for one call.
///
/// `origin` does not change the outcome; resources and streams share the
/// table and differ only in how each strategy reads its input.
pub fn select_strategy(inputs: &StrategyInputs) -> Strategy {
    if inputs.tier >= PlatformTier::Modern {
        return Strategy::ModernPlatformPath;
    }

    let unstable = inputs.classification == FormatClassification::UnstableUnderStreamingDecode;
    let purgeable = inputs.memory_optimization_requested
        && inputs.tier < PlatformTier::LegacyPurgeableFloor;

    if unstable || purgeable {
        Strategy::LegacyBuffered
    } else {
        Strategy::LegacyStreamed
    }
}

/// Plans and runs decodes against a [`BitmapDecoder`].
///
/// Holds no mutable state; one planner can serve concurrent calls if the
/// decoder allows it.
#[derive(Debug, Clone, Default)]
pub struct DecodePlanner<D> {
    decoder: D,
    config: PlannerConfig,
}

impl<D: BitmapDecoder> DecodePlanner<D> {
    pub fn new(decoder: D) -> Self {
        Self {
            decoder,
            config: PlannerConfig::default(),
        }
    }

    pub fn with_config(decoder: D, config: PlannerConfig) -> Self {
        Self { decoder, config }
    }

    pub fn decoder(&self) -> &D {
        &self.decoder
    }

    pub fn config(&self) -> &PlannerConfig {
        &self.config
    }

    /// Effective platform tier: the configured override or the decoder's own.
    pub fn tier(&self) -> PlatformTier {
        self.config
            .platform_tier
            .unwrap_or_else(|| self.decoder.capability_tier())
    }

    /// Strategy a stream would be decoded with. Only peeks at the stream.
    pub fn plan_stream<R: Read>(
        &self,
        source: &mut ByteSource<R>,
        request: &DecodeRequest,
    ) -> Result<Strategy, DecodeError> {
        let classification = classify(source.peek(FORMAT_PREFIX_LEN)?);
        Ok(self.select(classification, request, InputOrigin::Stream))
    }

    /// Decode a byte stream for `request`.
    pub fn decode_stream<R: Read>(
        &self,
        source: &mut ByteSource<R>,
        request: &DecodeRequest,
    ) -> Result<Bitmap, DecodeError> {
        let prefix = source.peek(FORMAT_PREFIX_LEN)?;
        let classification = classify(prefix);
        debug!(format = ?sniff_format(prefix), ?classification, "classified stream");

        match self.select(classification, request, InputOrigin::Stream) {
            Strategy::ModernPlatformPath => {
                let bytes = source.read_to_vec()?;
                self.decode_to_target(DecodeInput::Bytes(&bytes), request)
            }
            Strategy::LegacyBuffered => {
                let bytes = source.read_to_vec()?;
                decode_with_sizing(&self.decoder, &mut BufferedInput::new(&bytes), request)
            }
            Strategy::LegacyStreamed => {
                decode_with_sizing(&self.decoder, &mut StreamedInput::new(source), request)
            }
        }
    }

    /// Decode a bundled resource for `request`.
    ///
    /// Vector/XML resources are rejected with [`DecodeError::UnsupportedInput`]
    /// before any strategy is chosen.
    pub fn decode_resource<L: ResourceLookup + ?Sized>(
        &self,
        lookup: &L,
        id: &ResourceId,
        request: &DecodeRequest,
    ) -> Result<Bitmap, DecodeError> {
        let resource = lookup.resolve(id)?;
        if is_vector_or_xml_resource(&resource) {
            warn!(
                resource = %resource.id,
                name = %resource.declared_name,
                "rejected vector resource"
            );
            return Err(DecodeError::UnsupportedInput(format!(
                "{} ({}) is a vector/XML resource",
                resource.id, resource.declared_name
            )));
        }

        let classification = classify(&resource.bytes);
        match self.select(classification, request, InputOrigin::Resource) {
            Strategy::ModernPlatformPath => {
                self.decode_to_target(DecodeInput::Resource(&resource), request)
            }
            Strategy::LegacyBuffered => decode_with_sizing(
                &self.decoder,
                &mut BufferedInput::new(&resource.bytes),
                request,
            ),
            Strategy::LegacyStreamed => {
                decode_with_sizing(&self.decoder, &mut ResourceInput::new(&resource), request)
            }
        }
    }

    fn select(
        &self,
        classification: FormatClassification,
        request: &DecodeRequest,
        origin: InputOrigin,
    ) -> Strategy {
        let strategy = select_strategy(&StrategyInputs {
            tier: self.tier(),
            classification,
            memory_optimization_requested: request.memory_optimization_requested,
            origin,
        });
        debug!(?strategy, ?origin, tier = ?self.tier(), "selected decode strategy");
        strategy
    }

    fn decode_to_target(
        &self,
        input: DecodeInput<'_>,
        request: &DecodeRequest,
    ) -> Result<Bitmap, DecodeError> {
        self.decoder
            .decode_with_target_size(input, request.size_hint(), request.preferred_pixel_format)?
            .ok_or_else(DecodeError::no_bitmap)
    }
}
