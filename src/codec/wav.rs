// Copyright (c) 2026 Christoph Gaffga
// SPDX-License-Identifier: GPL-3.0-only
// https://github.com/cgaffga/stegcore

//! WAV codec: RIFF chunk walker extracting 16-bit PCM, canonical 44-byte
//! header on encode.
//!
//! Decode accepts only audio format 1 (integer PCM) at 16 bits per sample
//! and requires both a `fmt ` and a `data` chunk. Sub-chunks are padded to
//! even offsets per RIFF. Encode writes the fixed 44-byte header followed by
//! the interleaved samples in little-endian order.

use super::error::{CodecError, Result};
use super::{read_u16_le, read_u32_le, PcmAudio};

/// Decode a WAV byte stream into interleaved 16-bit PCM.
pub fn decode(data: &[u8]) -> Result<PcmAudio> {
    if data.len() < 12 || &data[..4] != b"RIFF" || &data[8..12] != b"WAVE" {
        return Err(CodecError::InvalidSignature);
    }

    let mut fmt: Option<(u16, u32)> = None; // (channels, sample_rate)
    let mut samples: Option<Vec<i16>> = None;

    let mut pos = 12;
    while pos + 8 <= data.len() {
        let id = &data[pos..pos + 4];
        let size = read_u32_le(data, pos + 4)? as usize;
        let body = data
            .get(pos + 8..pos + 8 + size)
            .ok_or(CodecError::UnexpectedEof)?;

        if id == b"fmt " {
            if size < 16 {
                return Err(CodecError::InvalidHeader("fmt chunk too short"));
            }
            let audio_format = read_u16_le(body, 0)?;
            let channels = read_u16_le(body, 2)?;
            let sample_rate = read_u32_le(body, 4)?;
            let bits_per_sample = read_u16_le(body, 14)?;

            if audio_format != 1 {
                return Err(CodecError::Unsupported("only integer PCM"));
            }
            if bits_per_sample != 16 {
                return Err(CodecError::Unsupported("only 16-bit samples"));
            }
            if channels == 0 {
                return Err(CodecError::InvalidHeader("zero channels"));
            }
            fmt = Some((channels, sample_rate));
        } else if id == b"data" {
            let mut buf = Vec::with_capacity(size / 2);
            for pair in body.chunks_exact(2) {
                buf.push(i16::from_le_bytes([pair[0], pair[1]]));
            }
            samples = Some(buf);
        }
        // LIST, fact, cue and friends carry no samples.

        // Chunks are word-aligned: odd sizes are followed by a pad byte.
        pos += 8 + size + (size & 1);
    }

    let (channels, sample_rate) = fmt.ok_or(CodecError::InvalidHeader("missing fmt chunk"))?;
    let samples = samples.ok_or(CodecError::InvalidHeader("missing data chunk"))?;

    Ok(PcmAudio::new(sample_rate, channels, samples))
}

/// Encode 16-bit PCM as a WAV byte stream with the canonical 44-byte header.
pub fn encode(audio: &PcmAudio) -> Vec<u8> {
    let data_size = audio.samples.len() * 2;
    let byte_rate = audio.sample_rate * audio.channels as u32 * 2;
    let block_align = audio.channels * 2;

    let mut out = Vec::with_capacity(44 + data_size);
    out.extend_from_slice(b"RIFF");
    out.extend_from_slice(&(36 + data_size as u32).to_le_bytes());
    out.extend_from_slice(b"WAVE");

    out.extend_from_slice(b"fmt ");
    out.extend_from_slice(&16u32.to_le_bytes());
    out.extend_from_slice(&1u16.to_le_bytes()); // PCM
    out.extend_from_slice(&audio.channels.to_le_bytes());
    out.extend_from_slice(&audio.sample_rate.to_le_bytes());
    out.extend_from_slice(&byte_rate.to_le_bytes());
    out.extend_from_slice(&block_align.to_le_bytes());
    out.extend_from_slice(&16u16.to_le_bytes()); // bits per sample

    out.extend_from_slice(b"data");
    out.extend_from_slice(&(data_size as u32).to_le_bytes());
    for s in &audio.samples {
        out.extend_from_slice(&s.to_le_bytes());
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encode_decode_roundtrip() {
        let audio = PcmAudio::new(44_100, 2, vec![0, -1, 32_767, -32_768, 1234, -4321]);
        let wav = encode(&audio);
        assert_eq!(wav.len(), 44 + 12);
        assert_eq!(decode(&wav).unwrap(), audio);
    }

    #[test]
    fn header_is_canonical_44_bytes() {
        let wav = encode(&PcmAudio::new(8000, 1, vec![7; 10]));
        assert_eq!(&wav[..4], b"RIFF");
        assert_eq!(&wav[8..12], b"WAVE");
        assert_eq!(&wav[12..16], b"fmt ");
        assert_eq!(read_u32_le(&wav, 16).unwrap(), 16);
        assert_eq!(&wav[36..40], b"data");
        assert_eq!(read_u32_le(&wav, 40).unwrap(), 20);
        // byte rate = rate * channels * 2
        assert_eq!(read_u32_le(&wav, 28).unwrap(), 16_000);
        // block align = channels * 2
        assert_eq!(read_u16_le(&wav, 32).unwrap(), 2);
    }

    #[test]
    fn extra_chunks_skipped() {
        let audio = PcmAudio::new(22_050, 1, vec![5, -5, 9]);
        let plain = encode(&audio);

        // Rebuild with a LIST chunk of odd size between fmt and data,
        // exercising the word-alignment pad.
        let mut wav = plain[..36].to_vec();
        wav.extend_from_slice(b"LIST");
        wav.extend_from_slice(&3u32.to_le_bytes());
        wav.extend_from_slice(b"abc");
        wav.push(0); // pad byte
        wav.extend_from_slice(&plain[36..]);
        let new_size = (wav.len() - 8) as u32;
        wav[4..8].copy_from_slice(&new_size.to_le_bytes());

        assert_eq!(decode(&wav).unwrap(), audio);
    }

    #[test]
    fn bad_signature_rejected() {
        let mut wav = encode(&PcmAudio::new(8000, 1, vec![0]));
        wav[0] = b'X';
        assert!(matches!(decode(&wav), Err(CodecError::InvalidSignature)));

        let mut wav2 = encode(&PcmAudio::new(8000, 1, vec![0]));
        wav2[8..12].copy_from_slice(b"AVI ");
        assert!(matches!(decode(&wav2), Err(CodecError::InvalidSignature)));
    }

    #[test]
    fn non_pcm_rejected() {
        let mut wav = encode(&PcmAudio::new(8000, 1, vec![0]));
        wav[20] = 3; // IEEE float
        assert!(matches!(decode(&wav), Err(CodecError::Unsupported(_))));
    }

    #[test]
    fn eight_bit_rejected() {
        let mut wav = encode(&PcmAudio::new(8000, 1, vec![0]));
        wav[34] = 8;
        assert!(matches!(decode(&wav), Err(CodecError::Unsupported(_))));
    }

    #[test]
    fn missing_data_chunk_rejected() {
        let wav = encode(&PcmAudio::new(8000, 1, vec![1, 2, 3]));
        // Cut the stream right before the data chunk header.
        assert!(matches!(
            decode(&wav[..36]),
            Err(CodecError::InvalidHeader(_))
        ));
    }

    #[test]
    fn truncated_data_chunk_rejected() {
        let wav = encode(&PcmAudio::new(8000, 1, vec![1, 2, 3]));
        assert!(matches!(
            decode(&wav[..wav.len() - 2]),
            Err(CodecError::UnexpectedEof)
        ));
    }

    #[test]
    fn stereo_interleaving_preserved() {
        let audio = PcmAudio::new(48_000, 2, vec![100, -100, 200, -200]);
        let decoded = decode(&encode(&audio)).unwrap();
        assert_eq!(decoded.channels, 2);
        assert_eq!(decoded.samples, vec![100, -100, 200, -200]);
    }
}
