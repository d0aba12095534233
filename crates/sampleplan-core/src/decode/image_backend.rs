//! [`BitmapDecoder`] backed by the `image` crate.
//!
//! The `image` crate has no subsampling decode, so this decoder decodes at full
//! size and then subsamples with nearest-neighbour to honour the requested
//! ratio. Bounds probes only parse the header; on a stream they read a
//! growing prefix rather than the whole input. Pixel passes over a stream read
//! it to the end first because the format readers need random access.

use std::borrow::Cow;
use std::io::{BufRead, Cursor, Read};

use image::imageops::FilterType;
use image::{DynamicImage, ImageReader};
use tracing::debug;

use super::sizing::sampled_dimensions;
use super::{
    Bitmap, BitmapDecoder, DecodeError, DecodeInput, DecodeOptions, PixelFormat, PlatformTier,
    ProbeOptions, ProbedDimensions,
};

/// Initial prefix size for stream probes.
const PROBE_PREFIX_LEN: usize = 16 * 1024;

/// Reference decoder using `image`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageCrateDecoder {
    tier: PlatformTier,
}

impl Default for ImageCrateDecoder {
    fn default() -> Self {
        Self::new()
    }
}

impl ImageCrateDecoder {
    /// A decoder reporting [`PlatformTier::Modern`].
    pub fn new() -> Self {
        Self {
            tier: PlatformTier::Modern,
        }
    }

    /// A decoder reporting the given tier.
    pub fn with_tier(tier: PlatformTier) -> Self {
        Self { tier }
    }
}

impl BitmapDecoder for ImageCrateDecoder {
    fn capability_tier(&self) -> PlatformTier {
        self.tier
    }

    fn probe(
        &self,
        input: DecodeInput<'_>,
        _options: &ProbeOptions,
    ) -> Result<ProbedDimensions, DecodeError> {
        match input {
            DecodeInput::Bytes(bytes) => probe_bytes(bytes),
            DecodeInput::Resource(resource) => probe_bytes(&resource.bytes),
            DecodeInput::Stream(mut reader) => probe_stream(&mut *reader),
        }
    }

    fn decode(
        &self,
        input: DecodeInput<'_>,
        options: &DecodeOptions,
    ) -> Result<Option<Bitmap>, DecodeError> {
        let bytes = input_bytes(input)?;
        let Some(image) = load(&bytes) else {
            return Ok(None);
        };

        let ratio = options.sample_ratio();
        let image = if ratio > 1 {
            let (width, height) = sampled_dimensions(image.width(), image.height(), ratio);
            image.resize_exact(width, height, FilterType::Nearest)
        } else {
            image
        };

        Ok(Some(to_bitmap(
            image,
            options.preferred_pixel_format().unwrap_or_default(),
        )))
    }

    fn decode_with_target_size(
        &self,
        input: DecodeInput<'_>,
        target: Option<(u32, u32)>,
        format: Option<PixelFormat>,
    ) -> Result<Option<Bitmap>, DecodeError> {
        let bytes = input_bytes(input)?;
        let Some(image) = load(&bytes) else {
            return Ok(None);
        };

        let image = match target {
            Some((width, height)) => {
                let (width, height) =
                    resolve_target(image.width(), image.height(), width, height);
                if (width, height) == (image.width(), image.height()) {
                    image
                } else {
                    image.resize_exact(width, height, FilterType::Triangle)
                }
            }
            None => image,
        };

        Ok(Some(to_bitmap(image, format.unwrap_or_default())))
    }
}

fn input_bytes(input: DecodeInput<'_>) -> Result<Cow<'_, [u8]>, DecodeError> {
    match input {
        DecodeInput::Bytes(bytes) => Ok(Cow::Borrowed(bytes)),
        DecodeInput::Resource(resource) => Ok(Cow::Borrowed(resource.bytes.as_slice())),
        DecodeInput::Stream(mut reader) => {
            let mut bytes = Vec::new();
            reader.read_to_end(&mut bytes)?;
            Ok(Cow::Owned(bytes))
        }
    }
}

fn guessed_reader(bytes: &[u8]) -> Result<ImageReader<Cursor<&[u8]>>, DecodeError> {
    let reader = ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .map_err(|e| DecodeError::ProbeFailed(e.to_string()))?;

    if reader.format().is_none() {
        return Err(DecodeError::ProbeFailed(
            "unrecognized image format".to_string(),
        ));
    }
    Ok(reader)
}

fn probe_bytes(bytes: &[u8]) -> Result<ProbedDimensions, DecodeError> {
    let (width, height) = guessed_reader(bytes)?
        .into_dimensions()
        .map_err(|e| DecodeError::ProbeFailed(e.to_string()))?;
    Ok(ProbedDimensions::new(width, height))
}

/// Read header dimensions from a growing prefix of the stream.
///
/// Starts at [`PROBE_PREFIX_LEN`] bytes and doubles until the header parses
/// or the stream ends, so the bounds pass only buffers what the header needs.
fn probe_stream<R: BufRead + ?Sized>(reader: &mut R) -> Result<ProbedDimensions, DecodeError> {
    let mut prefix = Vec::with_capacity(PROBE_PREFIX_LEN);
    let mut limit = PROBE_PREFIX_LEN;

    loop {
        let want = limit - prefix.len();
        let read = Read::take(&mut *reader, want as u64).read_to_end(&mut prefix)?;
        let at_end = read < want;

        match guessed_reader(&prefix)?.into_dimensions() {
            Ok((width, height)) => {
                debug!(width, height, prefix_len = prefix.len(), "probed stream header");
                return Ok(ProbedDimensions::new(width, height));
            }
            Err(e) if at_end => return Err(DecodeError::ProbeFailed(e.to_string())),
            Err(_) => limit *= 2,
        }
    }
}

/// Decode with format guessing; `None` if the data is not a decodable image.
fn load(bytes: &[u8]) -> Option<DynamicImage> {
    match image::load_from_memory(bytes) {
        Ok(image) => Some(image),
        Err(e) => {
            debug!(error = %e, "image decoder produced no bitmap");
            None
        }
    }
}

/// Fill in an unconstrained (0) axis from the source aspect ratio.
fn resolve_target(src_width: u32, src_height: u32, width: u32, height: u32) -> (u32, u32) {
    match (width, height) {
        (0, 0) => (src_width, src_height),
        (0, h) => {
            let w = (src_width as f64 * h as f64 / src_height as f64).round() as u32;
            (w.max(1), h)
        }
        (w, 0) => {
            let h = (src_height as f64 * w as f64 / src_width as f64).round() as u32;
            (w, h.max(1))
        }
        size => size,
    }
}

fn to_bitmap(image: DynamicImage, format: PixelFormat) -> Bitmap {
    let (width, height) = (image.width(), image.height());
    let pixels = match format {
        PixelFormat::Rgba8 => image.into_rgba8().into_raw(),
        PixelFormat::Rgb8 => image.into_rgb8().into_raw(),
        PixelFormat::Luma8 => image.into_luma8().into_raw(),
    };
    Bitmap::new(width, height, format, pixels)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decode::{
        ByteSource, DecodePlanner, DecodeRequest, StreamedInput, Strategy, TwoPassInput,
    };
    use image::{ImageFormat, Rgb, RgbImage};

    fn encode(width: u32, height: u32, format: ImageFormat) -> Vec<u8> {
        let img = RgbImage::from_fn(width, height, |x, y| {
            Rgb([(x % 256) as u8, (y % 256) as u8, 128])
        });
        let mut buffer = Vec::new();
        DynamicImage::ImageRgb8(img)
            .write_to(&mut Cursor::new(&mut buffer), format)
            .unwrap();
        buffer
    }

    /// PNG of hashed pixels; compresses poorly, so the file is large.
    fn encode_noise(width: u32, height: u32) -> Vec<u8> {
        let img = RgbImage::from_fn(width, height, |x, y| {
            let h = (x.wrapping_mul(0x9E37_79B1) ^ y.wrapping_mul(0x85EB_CA77))
                .wrapping_mul(0xC2B2_AE3D);
            Rgb([(h >> 24) as u8, (h >> 16) as u8, (h >> 8) as u8])
        });
        let mut buffer = Vec::new();
        DynamicImage::ImageRgb8(img)
            .write_to(&mut Cursor::new(&mut buffer), ImageFormat::Png)
            .unwrap();
        buffer
    }

    fn crc32(data: &[u8]) -> u32 {
        let mut crc = 0xFFFF_FFFFu32;
        for &byte in data {
            crc ^= byte as u32;
            for _ in 0..8 {
                crc = if crc & 1 != 0 {
                    (crc >> 1) ^ 0xEDB8_8320
                } else {
                    crc >> 1
                };
            }
        }
        !crc
    }

    /// Insert a private ancillary chunk of `len` bytes right after IHDR.
    fn with_padding_chunk(png: &[u8], len: usize) -> Vec<u8> {
        const AFTER_IHDR: usize = 8 + 4 + 4 + 13 + 4;
        let mut body = b"prVt".to_vec();
        body.extend(std::iter::repeat(0x5A).take(len));

        let mut out = png[..AFTER_IHDR].to_vec();
        out.extend_from_slice(&(len as u32).to_be_bytes());
        out.extend_from_slice(&body);
        out.extend_from_slice(&crc32(&body).to_be_bytes());
        out.extend_from_slice(&png[AFTER_IHDR..]);
        out
    }

    #[test]
    fn test_probe_reads_header() {
        let png = encode(64, 48, ImageFormat::Png);
        let decoder = ImageCrateDecoder::new();
        let probed = decoder
            .probe(DecodeInput::Bytes(&png), &ProbeOptions::default())
            .unwrap();
        assert_eq!(probed, ProbedDimensions::new(64, 48));
    }

    #[test]
    fn test_probe_garbage_fails() {
        let decoder = ImageCrateDecoder::new();
        let err = decoder
            .probe(DecodeInput::Bytes(&[0, 1, 2, 3]), &ProbeOptions::default())
            .unwrap_err();
        assert!(matches!(err, DecodeError::ProbeFailed(_)));
    }

    #[test]
    fn test_decode_subsamples() {
        let png = encode(64, 48, ImageFormat::Png);
        let decoder = ImageCrateDecoder::new();
        let options = ProbeOptions::default().into_decode_options(4);

        let bitmap = decoder
            .decode(DecodeInput::Bytes(&png), &options)
            .unwrap()
            .unwrap();
        assert_eq!((bitmap.width, bitmap.height), (16, 12));
        assert_eq!(bitmap.format, PixelFormat::Rgba8);
        assert_eq!(bitmap.byte_size(), 16 * 12 * 4);
    }

    #[test]
    fn test_decode_garbage_is_no_bitmap() {
        let decoder = ImageCrateDecoder::new();
        let options = ProbeOptions::default().into_decode_options(1);
        let result = decoder
            .decode(DecodeInput::Bytes(&[0, 1, 2, 3]), &options)
            .unwrap();
        assert!(result.is_none());
    }

    #[test]
    fn test_decode_with_target_size_derives_missing_axis() {
        let png = encode(64, 48, ImageFormat::Png);
        let decoder = ImageCrateDecoder::new();

        let bitmap = decoder
            .decode_with_target_size(
                DecodeInput::Bytes(&png),
                Some((32, 0)),
                Some(PixelFormat::Rgb8),
            )
            .unwrap()
            .unwrap();
        assert_eq!((bitmap.width, bitmap.height), (32, 24));
        assert_eq!(bitmap.byte_size(), 32 * 24 * 3);
    }

    #[test]
    fn test_resolve_target() {
        assert_eq!(resolve_target(4000, 3000, 0, 0), (4000, 3000));
        assert_eq!(resolve_target(4000, 3000, 0, 300), (400, 300));
        assert_eq!(resolve_target(4000, 3000, 1000, 0), (1000, 750));
        assert_eq!(resolve_target(4000, 3000, 100, 100), (100, 100));
        assert_eq!(resolve_target(4000, 10, 100, 0), (100, 1));
    }

    #[test]
    fn test_legacy_streamed_end_to_end() {
        let png = encode(200, 100, ImageFormat::Png);
        let planner = DecodePlanner::new(ImageCrateDecoder::with_tier(PlatformTier::Legacy));
        let mut source = ByteSource::new(Cursor::new(png));
        let request = DecodeRequest::new()
            .resize(50, 50)
            .center_inside()
            .pixel_format(PixelFormat::Luma8);

        assert_eq!(
            planner.plan_stream(&mut source, &request).unwrap(),
            Strategy::LegacyStreamed
        );
        let bitmap = planner.decode_stream(&mut source, &request).unwrap();

        // inside: max(100 / 50, 200 / 50) = 4
        assert_eq!((bitmap.width, bitmap.height), (50, 25));
        assert_eq!(bitmap.format, PixelFormat::Luma8);
        assert!(source.exhausted().unwrap());
    }

    #[test]
    fn test_legacy_buffered_webp_end_to_end() {
        let webp = encode(90, 60, ImageFormat::WebP);
        let planner = DecodePlanner::new(ImageCrateDecoder::with_tier(PlatformTier::Legacy));
        let mut source = ByteSource::new(Cursor::new(webp));
        let request = DecodeRequest::new().resize(30, 30);

        assert_eq!(
            planner.plan_stream(&mut source, &request).unwrap(),
            Strategy::LegacyBuffered
        );
        let bitmap = planner.decode_stream(&mut source, &request).unwrap();

        // center crop: min(60 / 30, 90 / 30) = 2
        assert_eq!((bitmap.width, bitmap.height), (45, 30));
    }

    #[test]
    fn test_modern_end_to_end() {
        let png = encode(120, 80, ImageFormat::Png);
        let planner = DecodePlanner::new(ImageCrateDecoder::new());
        let mut source = ByteSource::new(Cursor::new(png));

        let bitmap = planner
            .decode_stream(&mut source, &DecodeRequest::new().resize(60, 40))
            .unwrap();
        assert_eq!((bitmap.width, bitmap.height), (60, 40));
    }

    #[test]
    fn test_corrupt_stream_fails_probe() {
        let mut png = encode(32, 32, ImageFormat::Png);
        png.truncate(10);
        let planner = DecodePlanner::new(ImageCrateDecoder::with_tier(PlatformTier::Legacy));
        let mut source = ByteSource::new(Cursor::new(png));

        let err = planner
            .decode_stream(&mut source, &DecodeRequest::new().resize(8, 8))
            .unwrap_err();
        assert!(matches!(err, DecodeError::ProbeFailed(_)));
    }

    #[test]
    fn test_stream_bounds_pass_reads_only_a_prefix() {
        let png = encode_noise(1024, 1024);
        assert!(png.len() > 1024 * 1024);
        let decoder = ImageCrateDecoder::with_tier(PlatformTier::Legacy);
        let mut source = ByteSource::new(Cursor::new(png.clone()));

        let mut input = StreamedInput::new(&mut source);
        let probed = decoder
            .probe(input.bounds_input(), &ProbeOptions::default())
            .unwrap();

        assert_eq!(probed, ProbedDimensions::new(1024, 1024));
        assert!(source.buffered_len() < 64 * 1024);
        assert_eq!(source.read_to_vec().unwrap(), png);
    }

    #[test]
    fn test_stream_bounds_pass_grows_past_large_chunks() {
        let png = with_padding_chunk(&encode_noise(256, 256), 40 * 1024);
        let decoder = ImageCrateDecoder::with_tier(PlatformTier::Legacy);
        let mut source = ByteSource::new(Cursor::new(png.clone()));

        let probed = decoder
            .probe(
                DecodeInput::Stream(Box::new(source.peek_reader())),
                &ProbeOptions::default(),
            )
            .unwrap();

        assert_eq!(probed, ProbedDimensions::new(256, 256));
        assert!(source.buffered_len() > PROBE_PREFIX_LEN);
        assert!(source.buffered_len() < png.len());

        let planner = DecodePlanner::new(decoder);
        let bitmap = planner
            .decode_stream(&mut source, &DecodeRequest::new().resize(64, 64))
            .unwrap();
        assert_eq!((bitmap.width, bitmap.height), (64, 64));
    }
}
