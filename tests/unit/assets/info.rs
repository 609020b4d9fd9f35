use super::*;
use crate::test_support::{asymmetric_rgba, encode, jpeg_with_orientation, png_with_orientation};

#[test]
fn plain_source_reports_stored_dimensions() {
    let rgb = image::DynamicImage::ImageRgba8(asymmetric_rgba(7, 3)).to_rgb8();
    let img = image::DynamicImage::ImageRgb8(rgb);
    let info = probe_info(&encode(&img, image::ImageFormat::Jpeg)).unwrap();
    assert_eq!(
        info,
        ImageInfo {
            format: "jpeg".to_string(),
            width: 7,
            height: 3,
            orientation: 1,
            normalized_width: 7,
            normalized_height: 3,
            has_alpha: false,
        }
    );
}

#[test]
fn transposing_orientation_swaps_normalized_dimensions() {
    let info = probe_info(&png_with_orientation(&asymmetric_rgba(7, 3), 8)).unwrap();
    assert_eq!(info.orientation, 8);
    assert_eq!((info.width, info.height), (7, 3));
    assert_eq!((info.normalized_width, info.normalized_height), (3, 7));
    assert!(info.has_alpha);
}

#[test]
fn upside_down_orientation_keeps_dimensions() {
    let info = probe_info(&png_with_orientation(&asymmetric_rgba(7, 3), 3)).unwrap();
    assert_eq!(info.orientation, 3);
    assert_eq!((info.normalized_width, info.normalized_height), (7, 3));
}

#[test]
fn info_serializes_as_flat_json() {
    let info = probe_info(&png_with_orientation(&asymmetric_rgba(2, 2), 1)).unwrap();
    let json = serde_json::to_value(&info).unwrap();
    assert_eq!(json["format"], "png");
    assert_eq!(json["normalized_width"], 2);
}

#[test]
fn jpeg_exif_orientation_is_reported() {
    let info = probe_info(&jpeg_with_orientation(&asymmetric_rgba(9, 4), 6)).unwrap();
    assert_eq!(info.format, "jpeg");
    assert_eq!((info.width, info.height), (9, 4));
    assert_eq!(info.orientation, 6);
    assert_eq!((info.normalized_width, info.normalized_height), (4, 9));
    assert!(!info.has_alpha);
}
