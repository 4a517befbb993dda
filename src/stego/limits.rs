// Copyright (c) 2026 Christoph Gaffga
// SPDX-License-Identifier: GPL-3.0-only
// https://github.com/cgaffga/stegcore

//! Input validation: format whitelist, platform size ceilings, depth policy.
//!
//! All checks run at the public API boundary before any carrier byte is
//! decoded. The platform is a configuration input supplied by the host,
//! not a runtime discovery.

use crate::codec::CarrierKind;

use super::capacity::EncodeWarning;
use super::error::StegoError;

const MIB: usize = 1024 * 1024;

/// Where the host is running. Mobile hosts get tighter ceilings and a
/// stricter depth policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Platform {
    #[default]
    Desktop,
    Mobile,
}

/// Carrier file-size ceiling in bytes.
pub fn carrier_ceiling(kind: CarrierKind, platform: Platform) -> usize {
    match (platform, kind.is_image()) {
        (Platform::Desktop, true) => 100 * MIB,
        (Platform::Desktop, false) => 200 * MIB,
        (Platform::Mobile, _) => 20 * MIB,
    }
}

/// Payload size ceiling in bytes.
pub fn payload_ceiling(platform: Platform) -> usize {
    match platform {
        Platform::Desktop => 50 * MIB,
        Platform::Mobile => 10 * MIB,
    }
}

/// Reject carriers above the platform ceiling.
pub fn validate_carrier_size(
    kind: CarrierKind,
    len: usize,
    platform: Platform,
) -> Result<(), StegoError> {
    let ceiling = carrier_ceiling(kind, platform);
    if len > ceiling {
        return Err(StegoError::UnsupportedFormat(format!(
            "{kind} carrier is {len} bytes; the limit on this platform is {} MiB",
            ceiling / MIB
        )));
    }
    Ok(())
}

/// Reject payloads above the platform ceiling.
pub fn validate_payload_size(len: usize, platform: Platform) -> Result<(), StegoError> {
    let ceiling = payload_ceiling(platform);
    if len > ceiling {
        return Err(StegoError::UnsupportedFormat(format!(
            "payload is {len} bytes; the limit on this platform is {} MiB",
            ceiling / MIB
        )));
    }
    Ok(())
}

/// Classify a file extension or MIME type into a supported carrier kind.
///
/// Known lossy formats get a format-specific rejection reason; anything
/// else falls through to a generic whitelist message.
pub fn classify_format(ext_or_mime: &str) -> Result<CarrierKind, StegoError> {
    let tag = ext_or_mime.trim().trim_start_matches('.').to_ascii_lowercase();
    match tag.as_str() {
        "png" | "image/png" => Ok(CarrierKind::Png),
        "bmp" | "image/bmp" | "image/x-ms-bmp" => Ok(CarrierKind::Bmp),
        "wav" | "wave" | "audio/wav" | "audio/x-wav" | "audio/wave" => Ok(CarrierKind::Wav),

        "jpg" | "jpeg" | "image/jpeg" => Err(StegoError::UnsupportedFormat(
            "JPEG is lossy; recompression would destroy the hidden bits. Use PNG or BMP".into(),
        )),
        "gif" | "image/gif" => Err(StegoError::UnsupportedFormat(
            "GIF palettes cannot hold per-channel LSB data. Use PNG or BMP".into(),
        )),
        "webp" | "image/webp" => Err(StegoError::UnsupportedFormat(
            "WebP is typically lossy; hidden bits would not survive. Use PNG or BMP".into(),
        )),
        "mp3" | "audio/mpeg" => Err(StegoError::UnsupportedFormat(
            "MP3 is lossy; sample LSBs do not survive encoding. Use 16-bit WAV".into(),
        )),
        "ogg" | "oga" | "audio/ogg" => Err(StegoError::UnsupportedFormat(
            "Ogg Vorbis is lossy; sample LSBs do not survive encoding. Use 16-bit WAV".into(),
        )),
        "aac" | "m4a" | "audio/aac" | "audio/mp4" => Err(StegoError::UnsupportedFormat(
            "AAC is lossy; sample LSBs do not survive encoding. Use 16-bit WAV".into(),
        )),

        other => Err(StegoError::UnsupportedFormat(format!(
            "'{other}' is not a supported carrier; use PNG, BMP or 16-bit WAV"
        ))),
    }
}

/// Enforce the LSB depth policy.
///
/// Depth 1 is always allowed. Depths 2-4 require expert mode on desktop;
/// mobile and quick (non-expert) operation is pinned to depth 1. Depths
/// above 2 additionally earn a detectability warning.
pub fn validate_depth(
    depth: u8,
    platform: Platform,
    expert: bool,
) -> Result<Option<EncodeWarning>, StegoError> {
    if !(1..=4).contains(&depth) {
        return Err(StegoError::DepthPolicy(format!(
            "depth {depth} is outside the supported range 1-4"
        )));
    }
    if depth > 1 {
        if platform == Platform::Mobile {
            return Err(StegoError::DepthPolicy(
                "depth above 1 is not allowed on mobile".into(),
            ));
        }
        if !expert {
            return Err(StegoError::DepthPolicy(
                "depth above 1 requires expert mode".into(),
            ));
        }
    }
    if depth > 2 {
        return Ok(Some(EncodeWarning::Detectability { depth }));
    }
    Ok(None)
}
