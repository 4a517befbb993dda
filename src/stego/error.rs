// Copyright (c) 2026 Christoph Gaffga
// SPDX-License-Identifier: GPL-3.0-only
// https://github.com/cgaffga/stegcore

//! Error types for the steganography pipeline.
//!
//! [`StegoError`] is the single public error type; its variants are the
//! closed taxonomy every failure maps onto. Decode-side crypto, framing,
//! decompression and metadata failures all collapse into the one opaque
//! [`StegoError::DecryptFailure`] so that an attacker probing a stego
//! carrier cannot distinguish which stage rejected it.

use core::fmt;

use crate::codec::CodecError;

/// The uniform message for every decode-side crypto/framing failure.
/// Tests compare this string for equality across failure causes.
pub const DECRYPT_FAILURE_MESSAGE: &str = "Decryption failed - wrong password or corrupted data";

/// Errors that can occur during steganographic encoding or decoding.
#[derive(Debug)]
pub enum StegoError {
    /// The carrier format is not in the PNG/BMP/WAV whitelist, or a size
    /// ceiling was exceeded. Known lossy formats carry a format-specific
    /// reason.
    UnsupportedFormat(String),
    /// The carrier file violated a codec invariant (signature, bounds,
    /// unsupported sub-format).
    CarrierCorrupt(CodecError),
    /// The envelope does not fit the carrier at the requested LSB depth.
    CapacityExceeded { needed: usize, available: usize },
    /// The LSB depth is outside 1..=4 or not allowed by the platform/mode
    /// policy.
    DepthPolicy(String),
    /// No embedded message was found (magic mismatch or insane length).
    NoHiddenData,
    /// Uniform opaque failure for the whole decrypt chain.
    DecryptFailure,
    /// The operation was cancelled by the caller.
    Cancelled,
}

impl fmt::Display for StegoError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnsupportedFormat(reason) => write!(f, "unsupported carrier format: {reason}"),
            Self::CarrierCorrupt(e) => write!(f, "corrupt carrier: {e}"),
            Self::CapacityExceeded { needed, available } => write!(
                f,
                "message needs {needed} bytes but the carrier holds {available} at this depth"
            ),
            Self::DepthPolicy(reason) => write!(f, "LSB depth not allowed: {reason}"),
            Self::NoHiddenData => write!(f, "no hidden data found in this carrier"),
            Self::DecryptFailure => f.write_str(DECRYPT_FAILURE_MESSAGE),
            Self::Cancelled => write!(f, "operation cancelled by user"),
        }
    }
}

impl std::error::Error for StegoError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::CarrierCorrupt(e) => Some(e),
            _ => None,
        }
    }
}

impl From<CodecError> for StegoError {
    fn from(e: CodecError) -> Self {
        Self::CarrierCorrupt(e)
    }
}
