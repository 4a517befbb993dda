// Copyright (c) 2026 Christoph Gaffga
// SPDX-License-Identifier: GPL-3.0-only
// https://github.com/cgaffga/stegcore

//! BMP codec: 24/32-bit BI_RGB decode, 32-bit top-down encode.
//!
//! Decode handles 4-byte row alignment and both bottom-up (positive height)
//! and top-down (negative height) pixel order. Encode always writes 32-bit
//! BGRA, top-down, with no row padding and no palette.

use super::error::{CodecError, Result};
use super::{read_i32_le, read_u16_le, read_u32_le, Raster, MAX_DIMENSION};

/// Byte offset of the pixel-data offset field in the file header.
const PIXEL_OFFSET_FIELD: usize = 10;
/// 14-byte file header + 40-byte BITMAPINFOHEADER.
const HEADERS_LEN: usize = 54;
/// Print resolution written on encode, pixels per metre (72 dpi).
const RESOLUTION_PPM: i32 = 2835;

/// Decode a BMP byte stream into an RGBA raster.
pub fn decode(data: &[u8]) -> Result<Raster> {
    if data.len() < 2 || &data[..2] != b"BM" {
        return Err(CodecError::InvalidSignature);
    }

    let pixel_offset = read_u32_le(data, PIXEL_OFFSET_FIELD)? as usize;
    let width = read_i32_le(data, 18)?;
    let height = read_i32_le(data, 22)?;
    let bits_per_pixel = read_u16_le(data, 28)?;
    let compression = read_u32_le(data, 30)?;

    if bits_per_pixel != 24 && bits_per_pixel != 32 {
        return Err(CodecError::Unsupported("only 24/32-bit BMP"));
    }
    if compression != 0 {
        return Err(CodecError::Unsupported("only uncompressed BI_RGB"));
    }

    let top_down = height < 0;
    let abs_height = height.unsigned_abs();
    if width <= 0
        || abs_height == 0
        || width as u32 > MAX_DIMENSION
        || abs_height > MAX_DIMENSION
    {
        return Err(CodecError::InvalidDimensions);
    }
    if pixel_offset >= data.len() {
        return Err(CodecError::InvalidHeader("pixel data offset out of range"));
    }

    let w = width as usize;
    let h = abs_height as usize;
    let bytes_per_pixel = bits_per_pixel as usize / 8;
    // Rows are aligned to 4-byte boundaries.
    let stride = (w * bits_per_pixel as usize + 31) / 32 * 4;

    let mut rgba = Vec::with_capacity(4 * w * h);
    for y in 0..h {
        let src_row = if top_down { y } else { h - 1 - y };
        let row_start = pixel_offset + src_row * stride;
        // The final row may omit padding; only the pixel bytes must exist.
        if row_start + w * bytes_per_pixel > data.len() {
            return Err(CodecError::UnexpectedEof);
        }
        for x in 0..w {
            let p = row_start + x * bytes_per_pixel;
            let b = data[p];
            let g = data[p + 1];
            let r = data[p + 2];
            let a = if bytes_per_pixel == 4 { data[p + 3] } else { 255 };
            rgba.extend_from_slice(&[r, g, b, a]);
        }
    }

    Ok(Raster::from_rgba(width as u32, abs_height, rgba))
}

/// Encode an RGBA raster as a 32-bit top-down BMP.
pub fn encode(raster: &Raster) -> Vec<u8> {
    let w = raster.width() as usize;
    let h = raster.height() as usize;
    let image_size = 4 * w * h;
    let file_size = HEADERS_LEN + image_size;

    let mut out = Vec::with_capacity(file_size);

    // File header.
    out.extend_from_slice(b"BM");
    out.extend_from_slice(&(file_size as u32).to_le_bytes());
    out.extend_from_slice(&[0; 4]); // reserved
    out.extend_from_slice(&(HEADERS_LEN as u32).to_le_bytes());

    // BITMAPINFOHEADER.
    out.extend_from_slice(&40u32.to_le_bytes());
    out.extend_from_slice(&(raster.width() as i32).to_le_bytes());
    out.extend_from_slice(&(-(raster.height() as i32)).to_le_bytes()); // top-down
    out.extend_from_slice(&1u16.to_le_bytes()); // planes
    out.extend_from_slice(&32u16.to_le_bytes()); // bits per pixel
    out.extend_from_slice(&0u32.to_le_bytes()); // BI_RGB
    out.extend_from_slice(&(image_size as u32).to_le_bytes());
    out.extend_from_slice(&RESOLUTION_PPM.to_le_bytes());
    out.extend_from_slice(&RESOLUTION_PPM.to_le_bytes());
    out.extend_from_slice(&0u32.to_le_bytes()); // palette colors
    out.extend_from_slice(&0u32.to_le_bytes()); // important colors

    // Pixel rows, top-down, no padding (stride 4*W is already aligned).
    for px in raster.data.chunks_exact(4) {
        out.extend_from_slice(&[px[2], px[1], px[0], px[3]]);
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Build a minimal 24-bit bottom-up BMP with padded rows.
    fn build_bmp24(width: usize, height: usize, rows_bottom_up: &[Vec<[u8; 3]>]) -> Vec<u8> {
        let stride = (width * 3 + 3) / 4 * 4;
        let image_size = stride * height;
        let mut out = Vec::new();
        out.extend_from_slice(b"BM");
        out.extend_from_slice(&((HEADERS_LEN + image_size) as u32).to_le_bytes());
        out.extend_from_slice(&[0; 4]);
        out.extend_from_slice(&(HEADERS_LEN as u32).to_le_bytes());
        out.extend_from_slice(&40u32.to_le_bytes());
        out.extend_from_slice(&(width as i32).to_le_bytes());
        out.extend_from_slice(&(height as i32).to_le_bytes());
        out.extend_from_slice(&1u16.to_le_bytes());
        out.extend_from_slice(&24u16.to_le_bytes());
        out.extend_from_slice(&0u32.to_le_bytes());
        out.extend_from_slice(&(image_size as u32).to_le_bytes());
        out.extend_from_slice(&RESOLUTION_PPM.to_le_bytes());
        out.extend_from_slice(&RESOLUTION_PPM.to_le_bytes());
        out.extend_from_slice(&0u32.to_le_bytes());
        out.extend_from_slice(&0u32.to_le_bytes());
        for row in rows_bottom_up {
            let mut written = 0;
            for [r, g, b] in row {
                out.extend_from_slice(&[*b, *g, *r]);
                written += 3;
            }
            for _ in written..stride {
                out.push(0);
            }
        }
        out
    }

    #[test]
    fn decode_24bit_bottom_up() {
        // 2x2: bottom row first in the file.
        let bmp = build_bmp24(
            2,
            2,
            &[
                vec![[10, 11, 12], [20, 21, 22]], // image row y=1
                vec![[30, 31, 32], [40, 41, 42]], // image row y=0
            ],
        );
        let raster = decode(&bmp).unwrap();
        assert_eq!(raster.pixel(0, 0), [30, 31, 32, 255]);
        assert_eq!(raster.pixel(1, 0), [40, 41, 42, 255]);
        assert_eq!(raster.pixel(0, 1), [10, 11, 12, 255]);
        assert_eq!(raster.pixel(1, 1), [20, 21, 22, 255]);
    }

    #[test]
    fn row_padding_respected() {
        // Width 1 at 24bpp: 3 pixel bytes, stride 4.
        let bmp = build_bmp24(1, 2, &[vec![[1, 2, 3]], vec![[4, 5, 6]]]);
        let raster = decode(&bmp).unwrap();
        assert_eq!(raster.pixel(0, 0), [4, 5, 6, 255]);
        assert_eq!(raster.pixel(0, 1), [1, 2, 3, 255]);
    }

    #[test]
    fn encode_decode_roundtrip() {
        let mut raster = Raster::filled(3, 2, [9, 8, 7]);
        raster.set_pixel(1, 0, [100, 101, 102, 103]);
        let bmp = encode(&raster);
        assert_eq!(decode(&bmp).unwrap(), raster);
    }

    #[test]
    fn encode_is_top_down_32bit() {
        let raster = Raster::filled(2, 2, [0, 0, 0]);
        let bmp = encode(&raster);
        assert_eq!(read_u16_le(&bmp, 28).unwrap(), 32);
        assert!(read_i32_le(&bmp, 22).unwrap() < 0, "height must be negative");
        assert_eq!(read_u32_le(&bmp, 10).unwrap(), HEADERS_LEN as u32);
    }

    #[test]
    fn bad_signature_rejected() {
        let mut bmp = encode(&Raster::filled(1, 1, [0, 0, 0]));
        bmp[0] = b'X';
        assert!(matches!(decode(&bmp), Err(CodecError::InvalidSignature)));
    }

    #[test]
    fn sixteen_bit_rejected() {
        let mut bmp = encode(&Raster::filled(1, 1, [0, 0, 0]));
        bmp[28] = 16;
        assert!(matches!(decode(&bmp), Err(CodecError::Unsupported(_))));
    }

    #[test]
    fn compressed_rejected() {
        let mut bmp = encode(&Raster::filled(1, 1, [0, 0, 0]));
        bmp[30] = 1; // BI_RLE8
        assert!(matches!(decode(&bmp), Err(CodecError::Unsupported(_))));
    }

    #[test]
    fn offset_out_of_range_rejected() {
        let mut bmp = encode(&Raster::filled(1, 1, [0, 0, 0]));
        let huge = (bmp.len() as u32 + 100).to_le_bytes();
        bmp[PIXEL_OFFSET_FIELD..PIXEL_OFFSET_FIELD + 4].copy_from_slice(&huge);
        assert!(matches!(decode(&bmp), Err(CodecError::InvalidHeader(_))));
    }

    #[test]
    fn truncated_pixel_data_rejected() {
        let bmp = encode(&Raster::filled(4, 4, [1, 2, 3]));
        assert!(matches!(
            decode(&bmp[..bmp.len() - 8]),
            Err(CodecError::UnexpectedEof)
        ));
    }

    #[test]
    fn oversized_dimensions_rejected() {
        let mut bmp = encode(&Raster::filled(1, 1, [0, 0, 0]));
        bmp[18..22].copy_from_slice(&40_000i32.to_le_bytes());
        assert!(matches!(decode(&bmp), Err(CodecError::InvalidDimensions)));
    }
}
