//! Image fixtures shared by unit and integration tests.
#![allow(dead_code)]

use std::io::Cursor;

use image::{DynamicImage, ImageFormat, Rgba, RgbaImage};

/// Distinct colour per quadrant-ish region, so any geometric change is visible in the pixels.
pub fn asymmetric_rgba(width: u32, height: u32) -> RgbaImage {
    RgbaImage::from_fn(width, height, |x, y| {
        let r = (x * 255 / width.max(1)) as u8;
        let g = (y * 255 / height.max(1)) as u8;
        let b = if x < width / 3 && y < height / 2 { 255 } else { 0 };
        Rgba([r, g, b, 255])
    })
}

pub fn encode(img: &DynamicImage, format: ImageFormat) -> Vec<u8> {
    let mut buf = Vec::new();
    img.write_to(&mut Cursor::new(&mut buf), format).unwrap();
    buf
}

pub fn png_bytes(img: &RgbaImage) -> Vec<u8> {
    encode(&DynamicImage::ImageRgba8(img.clone()), ImageFormat::Png)
}

/// Big-endian TIFF header followed by a single IFD entry: 0x0112 (Orientation), SHORT, 1.
fn orientation_tiff(orientation: u16) -> Vec<u8> {
    let mut exif = vec![
        b'M', b'M', 0, 42, 0, 0, 0, 8, 0, 1, 0x01, 0x12, 0, 3, 0, 0, 0, 1,
    ];
    exif.extend_from_slice(&orientation.to_be_bytes());
    exif.extend_from_slice(&[0, 0, 0, 0, 0, 0]);
    exif
}

/// PNG carrying an `eXIf` chunk with the given orientation value (1-8).
pub fn png_with_orientation(img: &RgbaImage, orientation: u16) -> Vec<u8> {
    let mut png = png_bytes(img);
    let exif = orientation_tiff(orientation);

    let mut body = b"eXIf".to_vec();
    body.extend_from_slice(&exif);

    let mut chunk = (exif.len() as u32).to_be_bytes().to_vec();
    chunk.extend_from_slice(&body);
    chunk.extend_from_slice(&crc32(&body).to_be_bytes());

    // 8-byte signature plus the 25-byte IHDR chunk.
    let at = 8 + 25;
    png.splice(at..at, chunk);
    png
}

/// Baseline JPEG with an APP1 `Exif` segment carrying the given orientation value (1-8).
pub fn jpeg_with_orientation(img: &RgbaImage, orientation: u16) -> Vec<u8> {
    let rgb = DynamicImage::ImageRgba8(img.clone()).to_rgb8();
    let mut jpeg = Vec::new();
    image::codecs::jpeg::JpegEncoder::new_with_quality(&mut jpeg, 95)
        .encode_image(&rgb)
        .unwrap();

    let mut payload = b"Exif\0\0".to_vec();
    payload.extend_from_slice(&orientation_tiff(orientation));

    let mut segment = vec![0xff, 0xe1];
    segment.extend_from_slice(&((payload.len() + 2) as u16).to_be_bytes());
    segment.extend_from_slice(&payload);

    // Right after SOI.
    jpeg.splice(2..2, segment);
    jpeg
}

fn crc32(data: &[u8]) -> u32 {
    let mut crc = 0xffff_ffffu32;
    for &b in data {
        crc ^= u32::from(b);
        for _ in 0..8 {
            let mask = (crc & 1).wrapping_neg();
            crc = (crc >> 1) ^ (0xedb8_8320 & mask);
        }
    }
    !crc
}

pub fn decode(bytes: &[u8]) -> DynamicImage {
    image::load_from_memory(bytes).unwrap()
}
