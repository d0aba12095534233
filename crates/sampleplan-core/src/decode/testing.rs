//! Scripted decoder for exercising the planner without real image data.

use std::cell::RefCell;
use std::io::Read;

use super::sizing::sampled_dimensions;
use super::{
    Bitmap, BitmapDecoder, DecodeError, DecodeInput, DecodeOptions, PixelFormat, PlatformTier,
    ProbeOptions, ProbedDimensions,
};

/// One recorded decoder invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Probe {
        input: &'static str,
    },
    Decode {
        input: &'static str,
        sample_ratio: u32,
    },
    DecodeWithTargetSize {
        input: &'static str,
        target: Option<(u32, u32)>,
    },
}

/// Decoder that reports fixed bounds and records every call.
#[derive(Debug)]
pub struct ScriptedDecoder {
    width: u32,
    height: u32,
    tier: PlatformTier,
    probe_fails: bool,
    no_bitmap: bool,
    drain_streams: bool,
    calls: RefCell<Vec<Call>>,
    stream_reads: RefCell<Vec<usize>>,
}

impl ScriptedDecoder {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            tier: PlatformTier::Legacy,
            probe_fails: false,
            no_bitmap: false,
            drain_streams: false,
            calls: RefCell::new(Vec::new()),
            stream_reads: RefCell::new(Vec::new()),
        }
    }

    pub fn with_tier(mut self, tier: PlatformTier) -> Self {
        self.tier = tier;
        self
    }

    pub fn failing_probe(mut self) -> Self {
        self.probe_fails = true;
        self
    }

    pub fn returning_no_bitmap(mut self) -> Self {
        self.no_bitmap = true;
        self
    }

    /// Read stream inputs to the end and record how many bytes each pass saw.
    pub fn draining_streams(mut self) -> Self {
        self.drain_streams = true;
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.borrow().clone()
    }

    pub fn stream_reads(&self) -> Vec<usize> {
        self.stream_reads.borrow().clone()
    }

    pub fn last_sample_ratio(&self) -> Option<u32> {
        self.calls.borrow().iter().rev().find_map(|call| match call {
            Call::Decode { sample_ratio, .. } => Some(*sample_ratio),
            _ => None,
        })
    }

    fn drain(&self, input: DecodeInput<'_>) -> Result<(), DecodeError> {
        if let DecodeInput::Stream(mut reader) = input {
            if self.drain_streams {
                let mut sink = Vec::new();
                reader.read_to_end(&mut sink)?;
                self.stream_reads.borrow_mut().push(sink.len());
            }
        }
        Ok(())
    }

    fn bitmap(&self, width: u32, height: u32, format: Option<PixelFormat>) -> Option<Bitmap> {
        if self.no_bitmap {
            return None;
        }
        let format = format.unwrap_or_default();
        let pixels = vec![0u8; width as usize * height as usize * format.bytes_per_pixel()];
        Some(Bitmap::new(width, height, format, pixels))
    }
}

impl BitmapDecoder for ScriptedDecoder {
    fn capability_tier(&self) -> PlatformTier {
        self.tier
    }

    fn probe(
        &self,
        input: DecodeInput<'_>,
        options: &ProbeOptions,
    ) -> Result<ProbedDimensions, DecodeError> {
        assert!(options.just_probe_bounds());
        self.calls.borrow_mut().push(Call::Probe {
            input: input.kind(),
        });
        self.drain(input)?;
        if self.probe_fails {
            return Err(DecodeError::ProbeFailed("scripted failure".to_string()));
        }
        Ok(ProbedDimensions::new(self.width, self.height))
    }

    fn decode(
        &self,
        input: DecodeInput<'_>,
        options: &DecodeOptions,
    ) -> Result<Option<Bitmap>, DecodeError> {
        assert!(!options.just_probe_bounds());
        self.calls.borrow_mut().push(Call::Decode {
            input: input.kind(),
            sample_ratio: options.sample_ratio(),
        });
        self.drain(input)?;
        let (width, height) = sampled_dimensions(self.width, self.height, options.sample_ratio());
        Ok(self.bitmap(width, height, options.preferred_pixel_format()))
    }

    fn decode_with_target_size(
        &self,
        input: DecodeInput<'_>,
        target: Option<(u32, u32)>,
        format: Option<PixelFormat>,
    ) -> Result<Option<Bitmap>, DecodeError> {
        if self.tier < PlatformTier::Modern {
            return Err(DecodeError::UnsupportedInput(
                "scripted legacy decoder".to_string(),
            ));
        }
        self.calls.borrow_mut().push(Call::DecodeWithTargetSize {
            input: input.kind(),
            target,
        });
        self.drain(input)?;
        let (width, height) = match target {
            Some((0, h)) => ((self.width * h / self.height).max(1), h),
            Some((w, 0)) => (w, (self.height * w / self.width).max(1)),
            Some(size) => size,
            None => (self.width, self.height),
        };
        Ok(self.bitmap(width, height, format))
    }
}
