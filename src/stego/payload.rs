// Copyright (c) 2026 Christoph Gaffga
// SPDX-License-Identifier: GPL-3.0-only
// https://github.com/cgaffga/stegcore

//! Payload container: versioned pack/unpack of metadata + raw bytes.
//!
//! The container is the plaintext that gets encrypted:
//!
//! ```text
//! [1 byte ] version (currently 1)
//! [4 bytes] metadata length M (little-endian u32), 0 < M <= 10,240
//! [M bytes] UTF-8 JSON metadata record
//! [N bytes] opaque payload bytes
//! ```
//!
//! Buffers whose version byte is not 1 are treated as legacy raw payloads:
//! the entire buffer becomes the payload and default metadata is
//! synthesized. This compatibility path is mandatory: old carriers embed
//! bare payload bytes with no container at all.

use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};

use super::error::StegoError;

/// Current container version.
pub const VERSION: u8 = 1;
/// Ceiling on the serialized metadata record.
pub const MAX_METADATA_BYTES: usize = 10_240;
/// Filename ceiling, counted in UTF-16 code units (the on-wire invariant).
pub const MAX_NAME_UTF16_UNITS: usize = 255;
/// MIME type ceiling in characters.
pub const MAX_MIME_CHARS: usize = 100;

/// Filename for legacy payloads that carry no metadata.
const LEGACY_NAME: &str = "recovered_data.bin";

/// What the payload is: a text message or a file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PayloadKind {
    Text,
    File,
}

/// The metadata record carried alongside the payload bytes.
///
/// Serialized as JSON inside the container. Unknown fields from other
/// implementations are ignored on decode; wrong field types fail the
/// schema check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayloadMeta {
    #[serde(rename = "type")]
    pub kind: PayloadKind,
    /// Milliseconds since the Unix epoch.
    pub timestamp: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(rename = "mimeType", skip_serializing_if = "Option::is_none")]
    pub mime_type: Option<String>,
}

/// A payload offered for embedding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PayloadInput {
    Text(String),
    File {
        bytes: Vec<u8>,
        name: String,
        mime: String,
    },
}

impl PayloadInput {
    /// The raw payload bytes.
    pub fn bytes(&self) -> &[u8] {
        match self {
            Self::Text(s) => s.as_bytes(),
            Self::File { bytes, .. } => bytes,
        }
    }

    /// Size of the raw payload bytes.
    pub fn len(&self) -> usize {
        self.bytes().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A recovered payload: raw bytes plus the decoded metadata record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedPayload {
    pub bytes: Vec<u8>,
    pub meta: PayloadMeta,
}

/// Strip forbidden characters and truncate a filename.
///
/// Truncation happens first, at 255 UTF-16 code units (never splitting a
/// character), then the filter drops `<>:"/\|?*` and U+0000..U+001F.
/// Applied on pack and re-applied after unpack.
pub fn sanitize_filename(name: &str) -> String {
    let mut truncated = String::new();
    let mut units = 0usize;
    for ch in name.chars() {
        units += ch.len_utf16();
        if units > MAX_NAME_UTF16_UNITS {
            break;
        }
        truncated.push(ch);
    }
    truncated
        .chars()
        .filter(|c| {
            !matches!(c, '<' | '>' | ':' | '"' | '/' | '\\' | '|' | '?' | '*')
                && (*c as u32) >= 0x20
        })
        .collect()
}

/// Current time in milliseconds since the Unix epoch.
fn now_millis() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as i64)
        .unwrap_or(0)
}

/// Build the sanitized metadata record for a payload.
pub fn meta_for(input: &PayloadInput) -> PayloadMeta {
    match input {
        PayloadInput::Text(_) => PayloadMeta {
            kind: PayloadKind::Text,
            timestamp: now_millis(),
            name: None,
            mime_type: None,
        },
        PayloadInput::File { name, mime, .. } => PayloadMeta {
            kind: PayloadKind::File,
            timestamp: now_millis(),
            name: Some(sanitize_filename(name)),
            mime_type: if mime.is_empty() {
                None
            } else {
                Some(mime.chars().take(MAX_MIME_CHARS).collect())
            },
        },
    }
}

/// Pack payload bytes and metadata into a container.
pub fn pack(payload: &[u8], meta: &PayloadMeta) -> Vec<u8> {
    let json = serde_json::to_vec(meta).expect("metadata serialization should not fail");
    // The sanitizers bound name and MIME length, so the record stays far
    // below the ceiling.
    debug_assert!(!json.is_empty() && json.len() <= MAX_METADATA_BYTES);

    let mut out = Vec::with_capacity(5 + json.len() + payload.len());
    out.push(VERSION);
    out.extend_from_slice(&(json.len() as u32).to_le_bytes());
    out.extend_from_slice(&json);
    out.extend_from_slice(payload);
    out
}

/// Unpack a container into payload bytes and metadata.
///
/// A buffer whose leading byte is not the current version is returned
/// whole as a legacy raw payload with synthesized metadata.
///
/// # Errors
/// [`StegoError::DecryptFailure`] when a version-1 container has a
/// malformed length field or metadata record. The error is deliberately
/// the same as every other decode failure.
pub fn unpack(container: &[u8]) -> Result<DecodedPayload, StegoError> {
    let version = match container.first() {
        Some(&v) => v,
        None => return Err(StegoError::DecryptFailure),
    };

    if version != VERSION {
        return Ok(DecodedPayload {
            bytes: container.to_vec(),
            meta: PayloadMeta {
                kind: PayloadKind::File,
                timestamp: now_millis(),
                name: Some(LEGACY_NAME.to_string()),
                mime_type: None,
            },
        });
    }

    if container.len() < 5 {
        return Err(StegoError::DecryptFailure);
    }
    let meta_len =
        u32::from_le_bytes([container[1], container[2], container[3], container[4]]) as usize;
    if meta_len == 0 || meta_len > MAX_METADATA_BYTES || 5 + meta_len > container.len() {
        return Err(StegoError::DecryptFailure);
    }

    let mut meta: PayloadMeta = serde_json::from_slice(&container[5..5 + meta_len])
        .map_err(|_| StegoError::DecryptFailure)?;
    if let Some(name) = meta.name.take() {
        meta.name = Some(sanitize_filename(&name));
    }

    Ok(DecodedPayload {
        bytes: container[5 + meta_len..].to_vec(),
        meta,
    })
}
