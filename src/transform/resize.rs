use image::imageops::{self, FilterType};
use image::{DynamicImage, GenericImageView, Rgba, RgbaImage};

use crate::ops::step::Fit;

/// Letterbox fill used by `contain`.
const LETTERBOX: Rgba<u8> = Rgba([0, 0, 0, 255]);

/// Rectangle inside an image.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Region {
    /// Left edge.
    pub left: u32,
    /// Top edge.
    pub top: u32,
    /// Width.
    pub width: u32,
    /// Height.
    pub height: u32,
}

/// Geometry of one resize, computed before touching pixels.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ResizePlan {
    /// Nothing to do.
    Keep,
    /// Resample to exactly `width`x`height`.
    Scale {
        /// Scaled width.
        width: u32,
        /// Scaled height.
        height: u32,
    },
    /// Resample, then keep `crop` of the scaled image.
    ScaleThenCrop {
        /// Scaled width.
        width: u32,
        /// Scaled height.
        height: u32,
        /// Region kept after scaling.
        crop: Region,
    },
    /// Resample, then place the result at `(left, top)` on an opaque canvas.
    ScaleThenPad {
        /// Scaled width.
        width: u32,
        /// Scaled height.
        height: u32,
        /// Canvas width.
        canvas_width: u32,
        /// Canvas height.
        canvas_height: u32,
        /// Horizontal offset of the scaled image.
        left: u32,
        /// Vertical offset of the scaled image.
        top: u32,
    },
}

/// Plan a resize of a `src` sized image.
///
/// Scale factors are clamped to 1, so no output dimension ever exceeds the source. For `contain`
/// and `fill` the requested box is clamped to the source dimensions as well.
pub fn plan_resize(src: (u32, u32), width: Option<u32>, height: Option<u32>, fit: Fit) -> ResizePlan {
    let (sw, sh) = src;
    if sw == 0 || sh == 0 {
        return ResizePlan::Keep;
    }
    let fx = |w: u32| f64::from(w) / f64::from(sw);
    let fy = |h: u32| f64::from(h) / f64::from(sh);

    let (w, h) = match (width, height) {
        (None, None) => return ResizePlan::Keep,
        (Some(w), None) => return scale_plan(src, fx(w).min(1.0)),
        (None, Some(h)) => return scale_plan(src, fy(h).min(1.0)),
        (Some(w), Some(h)) => (w, h),
    };

    match fit {
        Fit::Fill => exact_plan(src, w.min(sw), h.min(sh)),
        Fit::Inside => scale_plan(src, fx(w).min(fy(h)).min(1.0)),
        Fit::Outside => scale_plan(src, fx(w).max(fy(h)).min(1.0)),
        Fit::Cover => {
            let (rw, rh) = scaled(src, fx(w).max(fy(h)).min(1.0));
            let (cw, ch) = (w.min(rw), h.min(rh));
            if (cw, ch) == (rw, rh) {
                return exact_plan(src, rw, rh);
            }
            ResizePlan::ScaleThenCrop {
                width: rw,
                height: rh,
                crop: Region {
                    left: (rw - cw) / 2,
                    top: (rh - ch) / 2,
                    width: cw,
                    height: ch,
                },
            }
        }
        Fit::Contain => {
            let (rw, rh) = scaled(src, fx(w).min(fy(h)).min(1.0));
            let (cw, ch) = (w.min(sw).max(rw), h.min(sh).max(rh));
            if (cw, ch) == (rw, rh) {
                return exact_plan(src, rw, rh);
            }
            ResizePlan::ScaleThenPad {
                width: rw,
                height: rh,
                canvas_width: cw,
                canvas_height: ch,
                left: (cw - rw) / 2,
                top: (ch - rh) / 2,
            }
        }
    }
}

fn scaled((sw, sh): (u32, u32), s: f64) -> (u32, u32) {
    let w = (f64::from(sw) * s).round().max(1.0) as u32;
    let h = (f64::from(sh) * s).round().max(1.0) as u32;
    (w, h)
}

fn scale_plan(src: (u32, u32), s: f64) -> ResizePlan {
    let (w, h) = scaled(src, s);
    exact_plan(src, w, h)
}

fn exact_plan(src: (u32, u32), width: u32, height: u32) -> ResizePlan {
    if (width, height) == src {
        ResizePlan::Keep
    } else {
        ResizePlan::Scale { width, height }
    }
}

/// Resize `img` per [`plan_resize`], Lanczos3 resampling.
pub fn resize(img: DynamicImage, width: Option<u32>, height: Option<u32>, fit: Fit) -> DynamicImage {
    match plan_resize(img.dimensions(), width, height, fit) {
        ResizePlan::Keep => img,
        ResizePlan::Scale { width, height } => img.resize_exact(width, height, FilterType::Lanczos3),
        ResizePlan::ScaleThenCrop {
            width,
            height,
            crop,
        } => img
            .resize_exact(width, height, FilterType::Lanczos3)
            .crop_imm(crop.left, crop.top, crop.width, crop.height),
        ResizePlan::ScaleThenPad {
            width,
            height,
            canvas_width,
            canvas_height,
            left,
            top,
        } => {
            let inner = img.resize_exact(width, height, FilterType::Lanczos3).to_rgba8();
            let mut canvas = RgbaImage::from_pixel(canvas_width, canvas_height, LETTERBOX);
            imageops::replace(&mut canvas, &inner, i64::from(left), i64::from(top));
            DynamicImage::ImageRgba8(canvas)
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/transform/resize.rs"]
mod tests;
