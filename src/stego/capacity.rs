// Copyright (c) 2026 Christoph Gaffga
// SPDX-License-Identifier: GPL-3.0-only
// https://github.com/cgaffga/stegcore

//! Carrier capacity estimation and the authoritative embed precheck.
//!
//! Capacity counts the message-frame header against the carrier but not
//! the envelope's own fixed overhead; the precheck compares the finished
//! envelope length, so the 8-byte frame header is the only reservation the
//! formula makes:
//!
//! - images: `(W * H * 3 * depth) / 8 - 8` bytes (alpha carries nothing)
//! - audio:  `(samples * depth) / 8 - 8` bytes

use crate::codec::{PcmAudio, Raster};

use super::error::StegoError;
use super::frame::HEADER_LEN;

/// Density above which the embed is flagged as near capacity.
const NEAR_CAPACITY_PERCENT: usize = 50;
/// Density above which the embed is flagged as high density.
const HIGH_DENSITY_PERCENT: usize = 80;

/// Capacity of a carrier at a given LSB depth.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CapacityReport {
    /// Maximum envelope size in bytes.
    pub total_bytes: usize,
}

/// Non-fatal advisories produced during encode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EncodeWarning {
    /// Depth above 2 measurably shifts the carrier's statistics.
    Detectability { depth: u8 },
    /// More than half the capacity is in use.
    NearCapacity { used_percent: usize },
    /// More than 80% of the capacity is in use.
    HighDensity { used_percent: usize },
}

impl std::fmt::Display for EncodeWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Detectability { depth } => write!(
                f,
                "LSB depth {depth} is statistically detectable; depth 1-2 is safer"
            ),
            Self::NearCapacity { used_percent } => {
                write!(f, "carrier is near capacity ({used_percent}% in use)")
            }
            Self::HighDensity { used_percent } => {
                write!(f, "high embed density ({used_percent}% in use)")
            }
        }
    }
}

/// Envelope capacity of an image raster in bytes.
pub fn image_capacity(raster: &Raster, depth: u8) -> CapacityReport {
    capacity_of(raster.pixel_count() * 3, depth)
}

/// Envelope capacity of a PCM buffer in bytes.
pub fn audio_capacity(audio: &PcmAudio, depth: u8) -> CapacityReport {
    capacity_of(audio.samples.len(), depth)
}

fn capacity_of(cells: usize, depth: u8) -> CapacityReport {
    let total_bits = cells * depth as usize;
    CapacityReport {
        total_bytes: (total_bits / 8).saturating_sub(HEADER_LEN),
    }
}

/// The authoritative precheck: the finished envelope must fit the carrier.
///
/// Runs before any key derivation so oversized payloads fail cheaply.
pub fn precheck(envelope_len: usize, capacity: CapacityReport) -> Result<(), StegoError> {
    if envelope_len > capacity.total_bytes {
        return Err(StegoError::CapacityExceeded {
            needed: envelope_len,
            available: capacity.total_bytes,
        });
    }
    Ok(())
}

/// Advisory density warning for an embed that passed the precheck.
pub fn density_warning(envelope_len: usize, capacity: CapacityReport) -> Option<EncodeWarning> {
    if capacity.total_bytes == 0 {
        return None;
    }
    let used_percent = envelope_len * 100 / capacity.total_bytes;
    if used_percent > HIGH_DENSITY_PERCENT {
        Some(EncodeWarning::HighDensity { used_percent })
    } else if used_percent > NEAR_CAPACITY_PERCENT {
        Some(EncodeWarning::NearCapacity { used_percent })
    } else {
        None
    }
}
