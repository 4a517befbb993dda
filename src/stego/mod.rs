// Copyright (c) 2026 Christoph Gaffga
// SPDX-License-Identifier: GPL-3.0-only
// https://github.com/cgaffga/stegcore

//! Steganographic encoding and decoding.
//!
//! The pipeline encrypts a payload with a password (PBKDF2-HMAC-SHA256 +
//! AES-256-GCM, optional gzip), frames it, and spreads the frame across
//! the least-significant bits of carrier pixels or audio samples. Depth is
//! an out-of-band parameter: the same value must be supplied to encode and
//! decode.
//!
//! All operations are pure functions of their inputs. Progress and
//! cancellation are exposed through the [`progress`] module for hosts that
//! run operations on a worker thread.

pub mod capacity;
pub mod crypto;
pub mod envelope;
pub mod error;
pub mod frame;
pub mod limits;
pub mod lsb;
pub mod payload;
mod pipeline;
pub mod progress;

pub use capacity::{CapacityReport, EncodeWarning};
pub use error::{StegoError, DECRYPT_FAILURE_MESSAGE};
pub use limits::{classify_format, Platform};
pub use payload::{DecodedPayload, PayloadInput, PayloadKind, PayloadMeta};
pub use pipeline::{
    analyze_capacity, decode, encode, DecodeOptions, EncodeOptions, EncodeOutput, DECODE_STEPS,
    ENCODE_STEPS,
};
