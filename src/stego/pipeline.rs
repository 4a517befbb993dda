// Copyright (c) 2026 Christoph Gaffga
// SPDX-License-Identifier: GPL-3.0-only
// https://github.com/cgaffga/stegcore

//! Encode/decode pipelines and the public option types.
//!
//! Encode composes: validate -> decode carrier -> payload container ->
//! (compress) -> capacity precheck -> derive key -> encrypt -> frame ->
//! LSB embed -> re-encode carrier. Decode reverses the chain. Every stage
//! hands the next one a plain byte buffer; nothing is shared across
//! operations, so concurrent calls on independent carriers cannot
//! interact.
//!
//! The capacity precheck runs after compression but before key
//! derivation, so an oversized payload fails without paying for PBKDF2.

use crate::codec::{bmp, png, wav, CarrierKind, PcmAudio, Raster};

use super::capacity::{self, CapacityReport, EncodeWarning};
use super::envelope;
use super::error::StegoError;
use super::frame;
use super::limits::{self, Platform};
use super::lsb;
use super::payload::{self, DecodedPayload, PayloadInput};
use super::progress;

/// Options for [`encode`].
#[derive(Debug, Clone)]
pub struct EncodeOptions {
    /// LSB depth 1-4. Depths above 1 require expert mode on desktop.
    pub lsb_depth: u8,
    /// Use the 310,000-iteration KDF work factor (flag bit 1 on the wire).
    pub high_security: bool,
    /// Gzip the payload container before encryption (flag bit 0).
    pub compress: bool,
    pub platform: Platform,
    pub expert: bool,
}

impl Default for EncodeOptions {
    fn default() -> Self {
        Self {
            lsb_depth: 1,
            high_security: false,
            compress: true,
            platform: Platform::Desktop,
            expert: false,
        }
    }
}

/// Options for [`decode`].
#[derive(Debug, Clone)]
pub struct DecodeOptions {
    /// LSB depth the carrier was encoded with; there is no in-band signal.
    pub lsb_depth: u8,
    pub platform: Platform,
    pub expert: bool,
}

impl Default for DecodeOptions {
    fn default() -> Self {
        Self {
            lsb_depth: 1,
            platform: Platform::Desktop,
            expert: false,
        }
    }
}

/// Result of a successful [`encode`].
#[derive(Debug, Clone)]
pub struct EncodeOutput {
    /// The stego carrier, re-encoded in the input format.
    pub bytes: Vec<u8>,
    /// Always equals the input kind (PNG in, PNG out; and so on).
    pub kind: CarrierKind,
    /// Non-fatal advisories (detectability, embed density).
    pub warnings: Vec<EncodeWarning>,
}

/// Progress steps reported by [`encode`]: four stage boundaries plus the
/// embed loop slices.
pub const ENCODE_STEPS: u32 = 4 + progress::LOOP_SLICES;

/// Progress steps reported by [`decode`]: three stage boundaries plus the
/// extract loop slices.
pub const DECODE_STEPS: u32 = 3 + progress::LOOP_SLICES;

/// Encrypt a payload and embed it into a carrier.
///
/// # Errors
/// - [`StegoError::UnsupportedFormat`] if a size ceiling is exceeded.
/// - [`StegoError::DepthPolicy`] if the depth violates the platform/mode policy.
/// - [`StegoError::CarrierCorrupt`] if the carrier fails to decode.
/// - [`StegoError::CapacityExceeded`] if the envelope does not fit.
/// - [`StegoError::Cancelled`] if [`progress::cancel`] was called.
pub fn encode(
    carrier: &[u8],
    kind: CarrierKind,
    payload_input: &PayloadInput,
    password: &str,
    options: &EncodeOptions,
) -> Result<EncodeOutput, StegoError> {
    let result = encode_inner(carrier, kind, payload_input, password, options);
    progress::finish();
    result
}

fn encode_inner(
    carrier: &[u8],
    kind: CarrierKind,
    payload_input: &PayloadInput,
    password: &str,
    options: &EncodeOptions,
) -> Result<EncodeOutput, StegoError> {
    // 1. Boundary validation, before any carrier byte is parsed.
    limits::validate_carrier_size(kind, carrier.len(), options.platform)?;
    limits::validate_payload_size(payload_input.len(), options.platform)?;
    let mut warnings = Vec::new();
    if let Some(w) = limits::validate_depth(options.lsb_depth, options.platform, options.expert)? {
        warnings.push(w);
    }

    progress::init(ENCODE_STEPS);
    progress::check_cancelled()?;

    // 2. Decode the carrier and compute its capacity.
    enum Decoded {
        Image(Raster),
        Audio(PcmAudio),
    }
    let mut decoded = match kind {
        CarrierKind::Png => Decoded::Image(png::decode(carrier)?),
        CarrierKind::Bmp => Decoded::Image(bmp::decode(carrier)?),
        CarrierKind::Wav => Decoded::Audio(wav::decode(carrier)?),
    };
    let cap = match &decoded {
        Decoded::Image(raster) => capacity::image_capacity(raster, options.lsb_depth),
        Decoded::Audio(audio) => capacity::audio_capacity(audio, options.lsb_depth),
    };
    progress::advance();

    // 3. Pack the payload container and apply compression. The prepared
    //    length is exact, so the precheck happens before key derivation.
    let meta = payload::meta_for(payload_input);
    let container = payload::pack(payload_input.bytes(), &meta);
    let prepared = envelope::prepare(&container, options.compress, options.high_security);
    capacity::precheck(prepared.sealed_len(), cap)?;
    if let Some(w) = capacity::density_warning(prepared.sealed_len(), cap) {
        warnings.push(w);
    }
    progress::advance();
    progress::check_cancelled()?;

    // 4. Derive the key, encrypt, and frame the message.
    let sealed = envelope::seal(&prepared, password);
    let message = frame::build_message(&sealed);
    progress::advance();

    // 5. Embed and re-encode in the input format.
    let bytes = match &mut decoded {
        Decoded::Image(raster) => {
            lsb::embed_image(raster, &message, options.lsb_depth)?;
            match kind {
                CarrierKind::Png => png::encode(raster),
                CarrierKind::Bmp => bmp::encode(raster),
                CarrierKind::Wav => unreachable!(),
            }
        }
        Decoded::Audio(audio) => {
            lsb::embed_audio(&mut audio.samples, &message, options.lsb_depth)?;
            wav::encode(audio)
        }
    };
    progress::advance();

    Ok(EncodeOutput {
        bytes,
        kind,
        warnings,
    })
}

/// Extract and decrypt a payload from a stego carrier.
///
/// # Errors
/// - [`StegoError::NoHiddenData`] if no frame is found (including depth
///   mismatch between encode and decode).
/// - [`StegoError::DecryptFailure`] for every crypto/framing/metadata
///   failure, uniformly.
pub fn decode(
    stego: &[u8],
    kind: CarrierKind,
    password: &str,
    options: &DecodeOptions,
) -> Result<DecodedPayload, StegoError> {
    let result = decode_inner(stego, kind, password, options);
    progress::finish();
    result
}

fn decode_inner(
    stego: &[u8],
    kind: CarrierKind,
    password: &str,
    options: &DecodeOptions,
) -> Result<DecodedPayload, StegoError> {
    limits::validate_carrier_size(kind, stego.len(), options.platform)?;
    limits::validate_depth(options.lsb_depth, options.platform, options.expert)?;

    progress::init(DECODE_STEPS);
    progress::check_cancelled()?;

    // 1. Decode the carrier and extract the framed envelope.
    let sealed = match kind {
        CarrierKind::Png => lsb::extract_image(&png::decode(stego)?, options.lsb_depth)?,
        CarrierKind::Bmp => lsb::extract_image(&bmp::decode(stego)?, options.lsb_depth)?,
        CarrierKind::Wav => {
            lsb::extract_audio(&wav::decode(stego)?.samples, options.lsb_depth)?
        }
    };
    progress::advance();
    progress::check_cancelled()?;

    // 2. Open the envelope (KDF, decrypt, inflate).
    let container = envelope::open(&sealed, password)?;
    progress::advance();

    // 3. Unpack the payload container (legacy raw payloads pass through).
    let decoded = payload::unpack(&container)?;
    progress::advance();
    Ok(decoded)
}

/// Measure a carrier's envelope capacity at the given LSB depth.
///
/// Takes no platform context: depth is only range-checked here, since no
/// embedding happens.
pub fn analyze_capacity(
    carrier: &[u8],
    kind: CarrierKind,
    lsb_depth: u8,
) -> Result<CapacityReport, StegoError> {
    if !(1..=4).contains(&lsb_depth) {
        return Err(StegoError::DepthPolicy(format!(
            "depth {lsb_depth} is outside the supported range 1-4"
        )));
    }
    Ok(match kind {
        CarrierKind::Png => capacity::image_capacity(&png::decode(carrier)?, lsb_depth),
        CarrierKind::Bmp => capacity::image_capacity(&bmp::decode(carrier)?, lsb_depth),
        CarrierKind::Wav => capacity::audio_capacity(&wav::decode(carrier)?, lsb_depth),
    })
}
