// Copyright (c) 2026 Christoph Gaffga
// SPDX-License-Identifier: GPL-3.0-only
// https://github.com/cgaffga/stegcore

//! Error types for carrier parsing and encoding.

use std::fmt;

/// Errors that can occur while decoding or encoding a carrier file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CodecError {
    /// Input data is too short or truncated.
    UnexpectedEof,
    /// Missing or wrong file signature (PNG magic, "BM", "RIFF"/"WAVE").
    InvalidSignature,
    /// A chunk or header field has invalid or inconsistent content.
    InvalidHeader(&'static str),
    /// Chunk CRC mismatch (PNG).
    CrcMismatch,
    /// The compressed image data stream is corrupt.
    InvalidImageData,
    /// A sub-format the codec does not handle (bit depth, color type,
    /// interlacing, compression mode, sample format).
    Unsupported(&'static str),
    /// Image dimensions are zero or exceed the 32768 per-axis bound.
    InvalidDimensions,
}

impl fmt::Display for CodecError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnexpectedEof => write!(f, "unexpected end of carrier data"),
            Self::InvalidSignature => write!(f, "missing or invalid file signature"),
            Self::InvalidHeader(msg) => write!(f, "invalid header: {msg}"),
            Self::CrcMismatch => write!(f, "chunk CRC mismatch"),
            Self::InvalidImageData => write!(f, "corrupt compressed image data"),
            Self::Unsupported(msg) => write!(f, "unsupported sub-format: {msg}"),
            Self::InvalidDimensions => write!(f, "invalid carrier dimensions"),
        }
    }
}

impl std::error::Error for CodecError {}

pub type Result<T> = std::result::Result<T, CodecError>;
