// Copyright (c) 2026 Christoph Gaffga
// SPDX-License-Identifier: GPL-3.0-only
// https://github.com/cgaffga/stegcore

//! Message frame construction and reassembly.
//!
//! The frame is the binary container the LSB engines embed into carrier
//! samples:
//!
//! ```text
//! [4 bytes] magic "STEG"
//! [4 bytes] envelope length L (big-endian u32)
//! [L bytes] encrypted envelope
//! ```
//!
//! Embedding streams these bytes MSB-first; extraction reassembles them
//! from the low bits of carrier samples via [`FrameAssembler`], which
//! validates the magic and length as soon as the 8 header bytes are
//! available so a carrier with no hidden data is rejected without scanning
//! every sample.

use crate::codec::bitio::BitWriter;

use super::error::StegoError;

/// Message frame magic.
pub const MAGIC: [u8; 4] = *b"STEG";

/// Frame header size: magic + big-endian length.
pub const HEADER_LEN: usize = 8;

/// Build a message frame around an envelope.
pub fn build_message(envelope: &[u8]) -> Vec<u8> {
    let mut frame = Vec::with_capacity(HEADER_LEN + envelope.len());
    frame.extend_from_slice(&MAGIC);
    frame.extend_from_slice(&(envelope.len() as u32).to_be_bytes());
    frame.extend_from_slice(envelope);
    frame
}

/// Incremental frame reassembly from extracted bit groups.
///
/// Feed the low bits of each carrier sample with [`push`](Self::push);
/// it returns `true` once the full frame has been collected. The magic is
/// checked the moment 8 bytes are available, and the declared length is
/// validated against the carrier's total bit capacity.
pub struct FrameAssembler {
    writer: BitWriter,
    /// Declared envelope length, known once the header is parsed.
    envelope_len: Option<usize>,
    total_bits: usize,
}

impl FrameAssembler {
    /// `total_bits` is the carrier's full bit capacity at the current depth
    /// (used for the length sanity bound).
    pub fn new(total_bits: usize) -> Self {
        Self {
            writer: BitWriter::new(),
            envelope_len: None,
            total_bits,
        }
    }

    /// Push one extracted group of `width` bits.
    ///
    /// Returns `Ok(true)` when the frame is complete.
    ///
    /// # Errors
    /// [`StegoError::NoHiddenData`] if the magic does not match or the
    /// declared length is zero or larger than the carrier could hold.
    pub fn push(&mut self, group: u8, width: u8) -> Result<bool, StegoError> {
        self.writer.write_bits(group as u16, width);

        if self.envelope_len.is_none() && self.writer.byte_len() >= HEADER_LEN {
            let head = self.writer.completed_bytes();
            if head[..4] != MAGIC {
                return Err(StegoError::NoHiddenData);
            }
            let len = u32::from_be_bytes([head[4], head[5], head[6], head[7]]) as usize;
            let max_len = (self.total_bits.saturating_sub(HEADER_LEN * 8)) / 8;
            if len == 0 || len > max_len {
                return Err(StegoError::NoHiddenData);
            }
            self.envelope_len = Some(len);
        }

        match self.envelope_len {
            Some(len) => Ok(self.writer.byte_len() >= HEADER_LEN + len),
            None => Ok(false),
        }
    }

    /// Consume the assembler and return the envelope bytes.
    ///
    /// # Errors
    /// [`StegoError::NoHiddenData`] if the frame never completed.
    pub fn finish(self) -> Result<Vec<u8>, StegoError> {
        let len = self.envelope_len.ok_or(StegoError::NoHiddenData)?;
        let bytes = self.writer.finish();
        if bytes.len() < HEADER_LEN + len {
            return Err(StegoError::NoHiddenData);
        }
        Ok(bytes[HEADER_LEN..HEADER_LEN + len].to_vec())
    }
}
