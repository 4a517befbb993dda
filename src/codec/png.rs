// Copyright (c) 2026 Christoph Gaffga
// SPDX-License-Identifier: GPL-3.0-only
// https://github.com/cgaffga/stegcore

//! PNG codec: 8-bit truecolor decode with full scanline filter
//! reconstruction, filter-0 encode.
//!
//! Decode supports color type 2 (RGB) and 6 (RGBA), bit depth 8,
//! interlace 0. All five scanline filters (None, Sub, Up, Average, Paeth)
//! are inverted during reconstruction. Chunk CRCs are verified on read and
//! always produced on write.
//!
//! Encode always emits color type 6 (RGBA), bit depth 8, a single IDAT with
//! every scanline prefixed by filter byte 0, and a zlib-wrapped deflate
//! stream. No adaptive filtering is attempted; decoders interoperating with
//! this output assume filter 0.

use std::io::{Read, Write};

use flate2::read::ZlibDecoder;
use flate2::write::ZlibEncoder;
use flate2::Compression;

use super::error::{CodecError, Result};
use super::{read_u32_be, Raster, MAX_DIMENSION};

/// 8-byte PNG file signature.
pub const SIGNATURE: [u8; 8] = [0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A];

/// Decode a PNG byte stream into an RGBA raster.
pub fn decode(data: &[u8]) -> Result<Raster> {
    if data.len() < SIGNATURE.len() || data[..SIGNATURE.len()] != SIGNATURE {
        return Err(CodecError::InvalidSignature);
    }

    let mut pos = SIGNATURE.len();
    let mut header: Option<Ihdr> = None;
    let mut idat = Vec::new();
    let mut saw_iend = false;

    while pos < data.len() {
        let length = read_u32_be(data, pos)? as usize;
        let chunk_type = data
            .get(pos + 4..pos + 8)
            .ok_or(CodecError::UnexpectedEof)?;
        let chunk_data = data
            .get(pos + 8..pos + 8 + length)
            .ok_or(CodecError::UnexpectedEof)?;
        let stored_crc = read_u32_be(data, pos + 8 + length)?;

        let mut hasher = crc32fast::Hasher::new();
        hasher.update(chunk_type);
        hasher.update(chunk_data);
        if hasher.finalize() != stored_crc {
            return Err(CodecError::CrcMismatch);
        }

        if chunk_type == b"IHDR" {
            if header.is_some() {
                return Err(CodecError::InvalidHeader("duplicate IHDR"));
            }
            header = Some(parse_ihdr(chunk_data)?);
        } else if chunk_type == b"IDAT" {
            if header.is_none() {
                return Err(CodecError::InvalidHeader("IDAT before IHDR"));
            }
            idat.extend_from_slice(chunk_data);
        } else if chunk_type == b"IEND" {
            saw_iend = true;
            break;
        }
        // Ancillary chunks (tEXt, pHYs, gAMA, ...) carry no pixel data.

        pos += 8 + length + 4;
    }

    let header = header.ok_or(CodecError::InvalidHeader("missing IHDR"))?;
    if !saw_iend {
        return Err(CodecError::InvalidHeader("missing IEND"));
    }
    if idat.is_empty() {
        return Err(CodecError::InvalidHeader("missing IDAT"));
    }

    let channels = header.channels();
    let w = header.width as usize;
    let h = header.height as usize;
    let stride = w * channels;
    let expected = h * (1 + stride);

    // Inflate the concatenated IDAT payloads. Bound the read at the exact
    // scanline total so a corrupt length field cannot balloon memory.
    let mut raw = Vec::with_capacity(expected);
    let mut decoder = ZlibDecoder::new(&idat[..]).take(expected as u64 + 1);
    decoder
        .read_to_end(&mut raw)
        .map_err(|_| CodecError::InvalidImageData)?;
    if raw.len() != expected {
        return Err(CodecError::InvalidImageData);
    }

    // Reconstruct scanlines in place, then expand to RGBA.
    let mut recon = vec![0u8; h * stride];
    for y in 0..h {
        let filter = raw[y * (1 + stride)];
        let line = &raw[y * (1 + stride) + 1..y * (1 + stride) + 1 + stride];
        let (done, current) = recon.split_at_mut(y * stride);
        let prev = &done[done.len().saturating_sub(stride)..];
        let current = &mut current[..stride];
        unfilter_line(filter, line, if y == 0 { None } else { Some(prev) }, channels, current)?;
    }

    let mut rgba = Vec::with_capacity(4 * w * h);
    match channels {
        3 => {
            for px in recon.chunks_exact(3) {
                rgba.extend_from_slice(&[px[0], px[1], px[2], 255]);
            }
        }
        4 => rgba = recon,
        _ => unreachable!(),
    }

    Ok(Raster::from_rgba(header.width, header.height, rgba))
}

/// Encode an RGBA raster as a PNG byte stream (color type 6, bit depth 8).
pub fn encode(raster: &Raster) -> Vec<u8> {
    let w = raster.width() as usize;
    let h = raster.height() as usize;
    let stride = w * 4;

    let mut ihdr = Vec::with_capacity(13);
    ihdr.extend_from_slice(&raster.width().to_be_bytes());
    ihdr.extend_from_slice(&raster.height().to_be_bytes());
    ihdr.push(8); // bit depth
    ihdr.push(6); // color type: truecolor + alpha
    ihdr.push(0); // compression: deflate
    ihdr.push(0); // filter method 0
    ihdr.push(0); // interlace: none

    // Filter byte 0 on every scanline.
    let mut scanlines = Vec::with_capacity(h * (1 + stride));
    for y in 0..h {
        scanlines.push(0);
        scanlines.extend_from_slice(&raster.data[y * stride..(y + 1) * stride]);
    }
    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    encoder
        .write_all(&scanlines)
        .expect("in-memory deflate should not fail");
    let idat = encoder.finish().expect("in-memory deflate should not fail");

    let mut out = Vec::with_capacity(SIGNATURE.len() + 12 + ihdr.len() + 12 + idat.len() + 12);
    out.extend_from_slice(&SIGNATURE);
    write_chunk(&mut out, b"IHDR", &ihdr);
    write_chunk(&mut out, b"IDAT", &idat);
    write_chunk(&mut out, b"IEND", &[]);
    out
}

struct Ihdr {
    width: u32,
    height: u32,
    color_type: u8,
}

impl Ihdr {
    fn channels(&self) -> usize {
        match self.color_type {
            2 => 3,
            6 => 4,
            _ => unreachable!(),
        }
    }
}

fn parse_ihdr(data: &[u8]) -> Result<Ihdr> {
    if data.len() != 13 {
        return Err(CodecError::InvalidHeader("IHDR length"));
    }
    let width = read_u32_be(data, 0)?;
    let height = read_u32_be(data, 4)?;
    let bit_depth = data[8];
    let color_type = data[9];
    let compression = data[10];
    let filter = data[11];
    let interlace = data[12];

    if width == 0 || height == 0 || width > MAX_DIMENSION || height > MAX_DIMENSION {
        return Err(CodecError::InvalidDimensions);
    }
    if bit_depth != 8 {
        return Err(CodecError::Unsupported("only 8-bit depth"));
    }
    if color_type != 2 && color_type != 6 {
        return Err(CodecError::Unsupported("only truecolor (RGB/RGBA)"));
    }
    if compression != 0 || filter != 0 {
        return Err(CodecError::InvalidHeader("compression/filter method"));
    }
    if interlace != 0 {
        return Err(CodecError::Unsupported("interlaced PNG"));
    }

    Ok(Ihdr {
        width,
        height,
        color_type,
    })
}

/// Invert one scanline filter.
///
/// `prev` is the previous *reconstructed* scanline (`None` for row 0, which
/// behaves as an all-zero predecessor). The left neighbour is `bpp` bytes
/// back, where `bpp` equals the channel count for 8-bit samples.
fn unfilter_line(
    filter: u8,
    line: &[u8],
    prev: Option<&[u8]>,
    bpp: usize,
    out: &mut [u8],
) -> Result<()> {
    debug_assert_eq!(line.len(), out.len());
    let up = |i: usize| prev.map_or(0u8, |p| p[i]);

    match filter {
        0 => out.copy_from_slice(line),
        1 => {
            for i in 0..line.len() {
                let left = if i >= bpp { out[i - bpp] } else { 0 };
                out[i] = line[i].wrapping_add(left);
            }
        }
        2 => {
            for i in 0..line.len() {
                out[i] = line[i].wrapping_add(up(i));
            }
        }
        3 => {
            for i in 0..line.len() {
                let left = if i >= bpp { out[i - bpp] } else { 0 };
                let avg = ((left as u16 + up(i) as u16) / 2) as u8;
                out[i] = line[i].wrapping_add(avg);
            }
        }
        4 => {
            for i in 0..line.len() {
                let left = if i >= bpp { out[i - bpp] } else { 0 };
                let above = up(i);
                let upper_left = if i >= bpp { prev.map_or(0, |p| p[i - bpp]) } else { 0 };
                out[i] = line[i].wrapping_add(paeth(left, above, upper_left));
            }
        }
        _ => return Err(CodecError::InvalidImageData),
    }
    Ok(())
}

/// The standard Paeth predictor: pick a (left), b (up), or c (upper-left),
/// whichever is closest to `a + b - c`, ties broken in order a, b, c.
fn paeth(a: u8, b: u8, c: u8) -> u8 {
    let p = a as i16 + b as i16 - c as i16;
    let pa = (p - a as i16).abs();
    let pb = (p - b as i16).abs();
    let pc = (p - c as i16).abs();
    if pa <= pb && pa <= pc {
        a
    } else if pb <= pc {
        b
    } else {
        c
    }
}

fn write_chunk(out: &mut Vec<u8>, chunk_type: &[u8; 4], data: &[u8]) {
    out.extend_from_slice(&(data.len() as u32).to_be_bytes());
    out.extend_from_slice(chunk_type);
    out.extend_from_slice(data);
    let mut hasher = crc32fast::Hasher::new();
    hasher.update(chunk_type);
    hasher.update(data);
    out.extend_from_slice(&hasher.finalize().to_be_bytes());
}
