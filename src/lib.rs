// Copyright (c) 2026 Christoph Gaffga
// SPDX-License-Identifier: GPL-3.0-only
// https://github.com/cgaffga/stegcore

//! # stegcore
//!
//! LSB steganography engine for lossless carriers. Encrypts an arbitrary
//! payload with a password and hides the ciphertext in the
//! least-significant bits of a PNG or BMP image or a 16-bit PCM WAV file,
//! producing a carrier that is visually/audibly identical to the original.
//! The reverse operation recovers the payload and its metadata given only
//! the stego carrier and the password.
//!
//! The carrier codecs (`codec` module) are self-contained: PNG with full
//! scanline-filter reconstruction, BMP 24/32-bit, and a RIFF walker for
//! WAV. The steganography layer (`stego` module) uses AES-256-GCM with
//! PBKDF2-HMAC-SHA256 key derivation and optional gzip compression.
//!
//! # Quick start
//!
//! ```rust,ignore
//! use stegcore::{encode, decode, CarrierKind, PayloadInput, EncodeOptions, DecodeOptions};
//!
//! let carrier = std::fs::read("photo.png").unwrap();
//! let payload = PayloadInput::Text("meet at noon".into());
//! let stego = encode(&carrier, CarrierKind::Png, &payload, "passphrase",
//!                    &EncodeOptions::default()).unwrap();
//! let recovered = decode(&stego.bytes, CarrierKind::Png, "passphrase",
//!                        &DecodeOptions::default()).unwrap();
//! assert_eq!(recovered.bytes, b"meet at noon");
//! ```

pub mod codec;
pub mod stego;

pub use codec::{CarrierKind, CodecError, PcmAudio, Raster};
pub use stego::{
    analyze_capacity, classify_format, decode, encode, CapacityReport, DecodeOptions,
    DecodedPayload, EncodeOptions, EncodeOutput, EncodeWarning, PayloadInput, PayloadKind,
    PayloadMeta, Platform, StegoError,
};
pub use stego::progress;
