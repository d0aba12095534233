//! Container sniffing from a peeked byte prefix.
//!
//! WebP is a RIFF container (`RIFF....WEBP`). Some legacy platform decoders
//! fault in native code when a WebP image is fed to them as a stream instead
//! of a complete byte array, so those inputs must be buffered first.

use image::ImageFormat;

use super::FormatClassification;

/// Number of leading bytes [`classify`] needs to see.
pub const FORMAT_PREFIX_LEN: usize = 12;

const RIFF_MAGIC: &[u8; 4] = b"RIFF";
const WEBP_MAGIC: &[u8; 4] = b"WEBP";

/// Classify an input from its leading bytes.
///
/// Only the first [`FORMAT_PREFIX_LEN`] bytes are examined; a longer slice is
/// fine. Fewer bytes than that yields [`FormatClassification::Unknown`].
pub fn classify(prefix: &[u8]) -> FormatClassification {
    if prefix.len() < FORMAT_PREFIX_LEN {
        return FormatClassification::Unknown;
    }

    if is_webp(prefix) {
        FormatClassification::UnstableUnderStreamingDecode
    } else {
        FormatClassification::Other
    }
}

/// Check for the RIFF/WEBP signature.
#[inline]
pub fn is_webp(prefix: &[u8]) -> bool {
    prefix.len() >= FORMAT_PREFIX_LEN && &prefix[0..4] == RIFF_MAGIC && &prefix[8..12] == WEBP_MAGIC
}

/// Best-effort container guess, for diagnostics only.
pub fn sniff_format(prefix: &[u8]) -> Option<ImageFormat> {
    image::guess_format(prefix).ok()
}
