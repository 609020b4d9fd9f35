use image::{DynamicImage, RgbaImage};
use kurbo::{Affine, Point, Rect, Vec2};
use rayon::prelude::*;

/// Fill for canvas area not covered by a free-angle rotation.
const BACKGROUND: [u8; 4] = [0, 0, 0, 255];

/// Rotate clockwise by `angle` degrees (`0..360`).
///
/// Quarter turns are lossless. Any other angle grows the canvas to the rotated bounding box and
/// resamples bilinearly.
pub fn rotate(img: DynamicImage, angle: u32) -> DynamicImage {
    match angle % 360 {
        0 => img,
        90 => img.rotate90(),
        180 => img.rotate180(),
        270 => img.rotate270(),
        deg => DynamicImage::ImageRgba8(rotate_free(&img.to_rgba8(), f64::from(deg))),
    }
}

/// Canvas size needed to hold a `width`x`height` image rotated by `degrees`.
pub fn rotated_size(width: u32, height: u32, degrees: f64) -> (u32, u32) {
    let bbox = Affine::rotate(degrees.to_radians())
        .transform_rect_bbox(Rect::new(0.0, 0.0, f64::from(width), f64::from(height)));
    // Absorb float noise so 4x2 at 180 degrees stays 4x2.
    let edge = |v: f64| (v - 1e-6).ceil().max(1.0) as u32;
    (edge(bbox.width()), edge(bbox.height()))
}

fn rotate_free(src: &RgbaImage, degrees: f64) -> RgbaImage {
    let (sw, sh) = src.dimensions();
    let (dw, dh) = rotated_size(sw, sh, degrees);

    // Image space is y-down, so a positive angle turns clockwise.
    let forward = Affine::translate(Vec2::new(f64::from(dw) / 2.0, f64::from(dh) / 2.0))
        * Affine::rotate(degrees.to_radians())
        * Affine::translate(Vec2::new(-f64::from(sw) / 2.0, -f64::from(sh) / 2.0));
    let inverse = forward.inverse();

    let mut out = RgbaImage::new(dw, dh);
    let row_len = dw as usize * 4;
    let buf: &mut [u8] = &mut out;
    buf.par_chunks_mut(row_len)
        .enumerate()
        .for_each(|(y, row)| {
            for (x, px) in row.chunks_exact_mut(4).enumerate() {
                let p = inverse * Point::new(x as f64 + 0.5, y as f64 + 0.5);
                px.copy_from_slice(&sample_bilinear(src, p.x - 0.5, p.y - 0.5));
            }
        });
    out
}

/// Premultiplied bilinear sample; texels outside the source read as [`BACKGROUND`].
fn sample_bilinear(src: &RgbaImage, x: f64, y: f64) -> [u8; 4] {
    let (w, h) = (i64::from(src.width()), i64::from(src.height()));
    let x0 = x.floor();
    let y0 = y.floor();
    let (fx, fy) = (x - x0, y - y0);
    let (x0, y0) = (x0 as i64, y0 as i64);
    if x0 < -1 || y0 < -1 || x0 >= w || y0 >= h {
        return BACKGROUND;
    }

    let texel = |ix: i64, iy: i64| -> [f64; 4] {
        let [r, g, b, a] = if ix < 0 || iy < 0 || ix >= w || iy >= h {
            BACKGROUND
        } else {
            src.get_pixel(ix as u32, iy as u32).0
        };
        let a = f64::from(a) / 255.0;
        [f64::from(r) * a, f64::from(g) * a, f64::from(b) * a, a]
    };

    let taps = [
        (texel(x0, y0), (1.0 - fx) * (1.0 - fy)),
        (texel(x0 + 1, y0), fx * (1.0 - fy)),
        (texel(x0, y0 + 1), (1.0 - fx) * fy),
        (texel(x0 + 1, y0 + 1), fx * fy),
    ];
    let mut acc = [0.0f64; 4];
    for (t, wgt) in taps {
        for c in 0..4 {
            acc[c] += t[c] * wgt;
        }
    }

    let a = acc[3];
    if a <= 0.0 {
        return [0, 0, 0, 0];
    }
    let channel = |v: f64| v.round().clamp(0.0, 255.0) as u8;
    [
        channel(acc[0] / a),
        channel(acc[1] / a),
        channel(acc[2] / a),
        channel(a * 255.0),
    ]
}

#[cfg(test)]
#[path = "../../tests/unit/transform/rotate.rs"]
mod tests;
