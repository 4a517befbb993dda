// Copyright (c) 2026 Christoph Gaffga
// SPDX-License-Identifier: GPL-3.0-only
// https://github.com/cgaffga/stegcore

//! Cryptographic primitives for envelope encryption.
//!
//! Key derivation is PBKDF2-HMAC-SHA256 with a 16-byte random salt and an
//! iteration count negotiated by the envelope's flag byte: 100,000 by
//! default, 310,000 when high-security mode is requested. The derived key
//! encrypts with AES-256-GCM under a fresh 12-byte nonce; the 16-byte
//! authentication tag is appended by the standard GCM layout. No additional
//! authenticated data is used.
//!
//! Optional payload compression is deflate with gzip wrapping, applied to
//! the plaintext before encryption.

use std::io::{Read, Write};

use aes_gcm::aead::{Aead, KeyInit};
use aes_gcm::{Aes256Gcm, Nonce};
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;
use pbkdf2::pbkdf2_hmac;
use sha2::Sha256;
use zeroize::Zeroizing;

use super::error::StegoError;

/// AES-GCM nonce length in bytes.
pub const IV_LEN: usize = 12;
/// PBKDF2 salt length in bytes.
pub const SALT_LEN: usize = 16;
/// AES-GCM authentication tag length in bytes.
pub const TAG_LEN: usize = 16;
/// Derived key length in bytes (AES-256).
pub const KEY_LEN: usize = 32;

/// PBKDF2 iteration count in the default mode.
pub const ITERATIONS_STANDARD: u32 = 100_000;
/// PBKDF2 iteration count in high-security mode.
pub const ITERATIONS_HIGH: u32 = 310_000;

/// Ceiling on inflated plaintext, against decompression bombs.
/// Comfortably above the desktop payload limit plus container overhead.
const MAX_INFLATED_BYTES: usize = 64 * 1024 * 1024;

/// Derive the AES-256 key from password + salt.
///
/// The key is wrapped in [`Zeroizing`] so it is wiped when the operation
/// drops it.
pub fn derive_key(password: &str, salt: &[u8], iterations: u32) -> Zeroizing<[u8; KEY_LEN]> {
    let mut key = Zeroizing::new([0u8; KEY_LEN]);
    pbkdf2_hmac::<Sha256>(password.as_bytes(), salt, iterations, &mut *key);
    key
}

/// Generate a cryptographically strong random salt.
pub fn random_salt() -> [u8; SALT_LEN] {
    use rand::{rngs::OsRng, RngCore};
    let mut salt = [0u8; SALT_LEN];
    OsRng.fill_bytes(&mut salt);
    salt
}

/// Generate a fresh random nonce. Never reused for the same key: every
/// encrypt derives a new key from a fresh salt as well.
pub fn random_iv() -> [u8; IV_LEN] {
    use rand::{rngs::OsRng, RngCore};
    let mut iv = [0u8; IV_LEN];
    OsRng.fill_bytes(&mut iv);
    iv
}

/// Encrypt plaintext with AES-256-GCM.
///
/// Returns ciphertext with the 16-byte tag appended.
pub fn encrypt(plaintext: &[u8], key: &[u8; KEY_LEN], iv: &[u8; IV_LEN]) -> Vec<u8> {
    let cipher = Aes256Gcm::new_from_slice(key).expect("valid key length");
    cipher
        .encrypt(Nonce::from_slice(iv), plaintext)
        .expect("AES-GCM encrypt should not fail")
}

/// Decrypt AES-256-GCM ciphertext (tag appended).
///
/// Returns the uniform [`StegoError::DecryptFailure`] on any failure.
pub fn decrypt(
    ciphertext: &[u8],
    key: &[u8; KEY_LEN],
    iv: &[u8; IV_LEN],
) -> Result<Vec<u8>, StegoError> {
    let cipher = Aes256Gcm::new_from_slice(key).expect("valid key length");
    cipher
        .decrypt(Nonce::from_slice(iv), ciphertext)
        .map_err(|_| StegoError::DecryptFailure)
}

/// Compress with deflate, gzip-wrapped.
pub fn gzip_compress(data: &[u8]) -> Vec<u8> {
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder
        .write_all(data)
        .expect("in-memory gzip should not fail");
    encoder.finish().expect("in-memory gzip should not fail")
}

/// Inflate a gzip stream.
///
/// Returns the uniform [`StegoError::DecryptFailure`] on corrupt input or
/// when the output exceeds the inflation ceiling.
pub fn gzip_decompress(data: &[u8]) -> Result<Vec<u8>, StegoError> {
    let mut out = Vec::new();
    let mut decoder = GzDecoder::new(data).take(MAX_INFLATED_BYTES as u64 + 1);
    decoder
        .read_to_end(&mut out)
        .map_err(|_| StegoError::DecryptFailure)?;
    if out.len() > MAX_INFLATED_BYTES {
        return Err(StegoError::DecryptFailure);
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn derive_key_deterministic() {
        let salt = [7u8; SALT_LEN];
        let a = derive_key("password", &salt, 1000);
        let b = derive_key("password", &salt, 1000);
        assert_eq!(*a, *b);
    }

    #[test]
    fn derive_key_differs_by_salt_and_iterations() {
        let a = derive_key("password", &[0u8; SALT_LEN], 1000);
        let b = derive_key("password", &[1u8; SALT_LEN], 1000);
        let c = derive_key("password", &[0u8; SALT_LEN], 1001);
        assert_ne!(*a, *b);
        assert_ne!(*a, *c);
    }

    #[test]
    fn pbkdf2_known_vector() {
        // RFC 6070-style vector recomputed for HMAC-SHA256:
        // PBKDF2-HMAC-SHA256("password", "salt", 1, 32)
        let mut key = [0u8; KEY_LEN];
        pbkdf2_hmac::<Sha256>(b"password", b"salt", 1, &mut key);
        let expected = [
            0x12, 0x0f, 0xb6, 0xcf, 0xfc, 0xf8, 0xb3, 0x2c, 0x43, 0xe7, 0x22, 0x52, 0x56, 0xc4,
            0xf8, 0x37, 0xa8, 0x65, 0x48, 0xc9, 0x2c, 0xcc, 0x35, 0x48, 0x08, 0x05, 0x98, 0x7c,
            0xb7, 0x0b, 0xe1, 0x7b,
        ];
        assert_eq!(key, expected);
    }

    #[test]
    fn encrypt_decrypt_roundtrip() {
        let key = derive_key("secret123", &random_salt(), 1000);
        let iv = random_iv();
        let msg = b"Hello, steganography!";

        let ct = encrypt(msg, &key, &iv);
        assert_eq!(ct.len(), msg.len() + TAG_LEN);
        let pt = decrypt(&ct, &key, &iv).unwrap();
        assert_eq!(pt, msg);
    }

    #[test]
    fn wrong_key_fails() {
        let salt = random_salt();
        let iv = random_iv();
        let key = derive_key("correct", &salt, 1000);
        let ct = encrypt(b"secret message", &key, &iv);

        let wrong = derive_key("wrong", &salt, 1000);
        assert!(matches!(
            decrypt(&ct, &wrong, &iv),
            Err(StegoError::DecryptFailure)
        ));
    }

    #[test]
    fn tampered_ciphertext_fails() {
        let key = derive_key("pass", &random_salt(), 1000);
        let iv = random_iv();
        let mut ct = encrypt(b"payload", &key, &iv);
        let last = ct.len() - 1;
        ct[last] ^= 0x01;
        assert!(matches!(
            decrypt(&ct, &key, &iv),
            Err(StegoError::DecryptFailure)
        ));
    }

    #[test]
    fn gzip_roundtrip() {
        let data = b"repetitive repetitive repetitive repetitive data".repeat(20);
        let compressed = gzip_compress(&data);
        assert!(compressed.len() < data.len());
        assert_eq!(gzip_decompress(&compressed).unwrap(), data);
    }

    #[test]
    fn gzip_empty_roundtrip() {
        let compressed = gzip_compress(b"");
        assert_eq!(gzip_decompress(&compressed).unwrap(), b"");
    }

    #[test]
    fn corrupt_gzip_fails_uniformly() {
        let err = gzip_decompress(&[0x1f, 0x8b, 0xFF, 0xFF, 0x00]).unwrap_err();
        assert!(matches!(err, StegoError::DecryptFailure));
    }
}
