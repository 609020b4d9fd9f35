use super::*;
use image::{Rgba, RgbaImage};

fn sample() -> DynamicImage {
    DynamicImage::ImageRgba8(RgbaImage::from_pixel(4, 3, Rgba([10, 20, 30, 128])))
}

#[test]
fn allow_list_is_case_sensitive() {
    assert_eq!(OutputFormat::from_token("jpg").unwrap(), OutputFormat::Jpeg);
    assert_eq!(OutputFormat::from_token("jpeg").unwrap(), OutputFormat::Jpeg);
    assert_eq!(OutputFormat::from_token("webp").unwrap(), OutputFormat::WebP);

    for bad in ["PNG", "Jpg", "bmp", "", "png "] {
        let err = OutputFormat::from_token(bad).unwrap_err();
        assert_eq!(err.kind(), crate::ErrorKind::Encode, "{bad:?}");
    }
}

#[test]
fn every_token_resolves() {
    for token in OutputFormat::TOKENS {
        assert!(OutputFormat::from_token(token).is_ok(), "{token}");
    }
}

#[test]
fn mime_types() {
    assert_eq!(OutputFormat::Jpeg.mime_type(), "image/jpeg");
    assert_eq!(OutputFormat::Png.mime_type(), "image/png");
    assert_eq!(OutputFormat::WebP.mime_type(), "image/webp");
}

#[test]
fn encodes_decodable_bytes_with_expected_magic() {
    let png = encode(&sample(), OutputFormat::Png).unwrap();
    assert!(png.starts_with(b"\x89PNG\r\n\x1a\n"));
    assert_eq!(image::guess_format(&png).unwrap(), ImageFormat::Png);

    let jpg = encode(&sample(), OutputFormat::Jpeg).unwrap();
    assert!(jpg.starts_with(&[0xff, 0xd8]));
    let decoded = image::load_from_memory(&jpg).unwrap();
    assert!(!decoded.color().has_alpha());
    assert_eq!((decoded.width(), decoded.height()), (4, 3));

    let webp = encode(&sample(), OutputFormat::WebP).unwrap();
    assert_eq!(image::guess_format(&webp).unwrap(), ImageFormat::WebP);

    let gif = encode(&sample(), OutputFormat::Gif).unwrap();
    assert!(gif.starts_with(b"GIF8"));
}

#[test]
fn png_keeps_alpha() {
    let png = encode(&sample(), OutputFormat::Png).unwrap();
    let decoded = image::load_from_memory(&png).unwrap().to_rgba8();
    assert_eq!(decoded.get_pixel(0, 0).0, [10, 20, 30, 128]);
}

#[test]
fn encoding_is_deterministic() {
    let a = encode(&sample(), OutputFormat::Png).unwrap();
    let b = encode(&sample(), OutputFormat::Png).unwrap();
    assert_eq!(a, b);
}

#[test]
fn jpeg_composites_transparency_over_black() {
    let hidden = DynamicImage::ImageRgba8(RgbaImage::from_pixel(16, 16, Rgba([255, 0, 0, 0])));
    let jpg = encode(&hidden, OutputFormat::Jpeg).unwrap();
    let decoded = image::load_from_memory(&jpg).unwrap().to_rgb8();
    for p in decoded.pixels() {
        assert!(p.0.iter().all(|&c| c <= 4), "{:?}", p.0);
    }
}

#[test]
fn tiff_and_avif_carry_their_signatures() {
    let tiff = encode(&sample(), OutputFormat::Tiff).unwrap();
    assert!(tiff.starts_with(b"II*\0") || tiff.starts_with(b"MM\0*"));
    assert_eq!(image::guess_format(&tiff).unwrap(), ImageFormat::Tiff);

    let avif = encode(&sample(), OutputFormat::Avif).unwrap();
    assert_eq!(&avif[4..8], b"ftyp");
    assert_eq!(&avif[8..12], b"avif");
}
