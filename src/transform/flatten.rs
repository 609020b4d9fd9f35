use image::{DynamicImage, RgbImage};

use crate::ops::step::Rgb;

/// Composite `img` over an opaque `background`; images without alpha pass through unchanged.
pub fn flatten(img: DynamicImage, background: Rgb) -> DynamicImage {
    if !img.color().has_alpha() {
        return img;
    }
    DynamicImage::ImageRgb8(composite_over(&img, background))
}

/// Opaque RGB pixels of `img` composited over `background`.
pub fn composite_over(img: &DynamicImage, background: Rgb) -> RgbImage {
    if !img.color().has_alpha() {
        return img.to_rgb8();
    }

    let rgba = img.to_rgba8();
    let blend = |c: u8, bg: u8, a: u8| {
        let (c, bg, a) = (u16::from(c), u16::from(bg), u16::from(a));
        ((c * a + bg * (255 - a) + 127) / 255) as u8
    };
    RgbImage::from_fn(rgba.width(), rgba.height(), |x, y| {
        let [r, g, b, a] = rgba.get_pixel(x, y).0;
        image::Rgb([
            blend(r, background.r, a),
            blend(g, background.g, a),
            blend(b, background.b, a),
        ])
    })
}

#[cfg(test)]
#[path = "../../tests/unit/transform/flatten.rs"]
mod tests;
