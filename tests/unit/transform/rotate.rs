use super::*;
use crate::test_support::asymmetric_rgba;
use image::{GenericImageView, Rgba};

#[test]
fn quarter_turns_are_lossless() {
    let src = asymmetric_rgba(6, 4);
    let img = DynamicImage::ImageRgba8(src.clone());

    assert_eq!(rotate(img.clone(), 0).to_rgba8(), src);
    assert_eq!(
        rotate(img.clone(), 90).to_rgba8(),
        image::imageops::rotate90(&src)
    );
    assert_eq!(
        rotate(img.clone(), 180).to_rgba8(),
        image::imageops::rotate180(&src)
    );
    assert_eq!(rotate(img, 270).to_rgba8(), image::imageops::rotate270(&src));
}

#[test]
fn rotated_size_covers_bounding_box() {
    assert_eq!(rotated_size(4, 2, 0.0), (4, 2));
    assert_eq!(rotated_size(4, 2, 90.0), (2, 4));
    assert_eq!(rotated_size(4, 2, 180.0), (4, 2));
    // 6 * cos(45deg) = 4.24...
    assert_eq!(rotated_size(4, 2, 45.0), (5, 5));
    assert_eq!(rotated_size(100, 10, 30.0), (92, 59));
}

#[test]
fn free_angle_expands_canvas_and_fills_corners() {
    let src = RgbaImage::from_pixel(20, 20, Rgba([255, 255, 255, 255]));
    let out = rotate(DynamicImage::ImageRgba8(src), 45);
    let (w, h) = out.dimensions();
    assert_eq!((w, h), (29, 29));

    let rgba = out.to_rgba8();
    assert_eq!(rgba.get_pixel(0, 0).0, [0, 0, 0, 255]);
    assert_eq!(rgba.get_pixel(w / 2, h / 2).0, [255, 255, 255, 255]);
}

#[test]
fn free_angle_rotation_is_clockwise() {
    // Red marker on the right half of a wide image ends up in the bottom half after ~+60deg.
    let src = RgbaImage::from_fn(40, 10, |x, _| {
        if x >= 30 {
            Rgba([255, 0, 0, 255])
        } else {
            Rgba([0, 0, 255, 255])
        }
    });
    let out = rotate(DynamicImage::ImageRgba8(src), 60).to_rgba8();
    let (w, h) = out.dimensions();

    let red_rows: Vec<u32> = (0..h)
        .filter(|&y| (0..w).any(|x| out.get_pixel(x, y).0 == [255, 0, 0, 255]))
        .collect();
    assert!(!red_rows.is_empty());
    assert!(red_rows.iter().all(|&y| y > h / 2));
}
