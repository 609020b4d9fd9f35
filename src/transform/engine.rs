//! Applies a planned stack to a source image.
//!
//! The source is decoded and orientation-normalized first; every step then runs in declared
//! order against the current pixels. The first failing step aborts the whole pipeline, so the
//! caller either gets fully encoded bytes or an error, never a partially transformed image.

use image::{DynamicImage, GenericImageView};

use crate::assets::decode::decode_source;
use crate::encode::format::{OutputFormat, encode};
use crate::foundation::error::{RenditionError, RenditionResult};
use crate::ops::parse::Operation;
use crate::ops::step::{Step, plan_steps};
use crate::transform::{flatten::flatten, resize::resize, rotate::rotate};

/// Plan `stack`, then transform and encode `source`.
pub fn apply(source: &[u8], stack: &[Operation], format: OutputFormat) -> RenditionResult<Vec<u8>> {
    let steps = plan_steps(stack)?;
    apply_steps(source, &steps, format)
}

/// Transform and encode `source` with already planned steps.
#[tracing::instrument(level = "debug", skip(source, steps), fields(bytes = source.len(), steps = steps.len()))]
pub fn apply_steps(source: &[u8], steps: &[Step], format: OutputFormat) -> RenditionResult<Vec<u8>> {
    let decoded = decode_source(source)?;
    let image = run_steps(decoded.image, steps)?;
    encode(&image, format)
}

/// Run `steps` in order over an already normalized image.
pub fn run_steps(image: DynamicImage, steps: &[Step]) -> RenditionResult<DynamicImage> {
    steps
        .iter()
        .enumerate()
        .try_fold(image, |img, (index, step)| {
            apply_step(img, step).map_err(|e| match e {
                RenditionError::OperationParameter(msg) => RenditionError::parameter(format!(
                    "step {} ({}): {msg}",
                    index + 1,
                    step.name()
                )),
                other => other,
            })
        })
}

/// Apply one step.
pub fn apply_step(img: DynamicImage, step: &Step) -> RenditionResult<DynamicImage> {
    match *step {
        Step::Resize { width, height, fit } => Ok(resize(img, width, height, fit)),
        Step::Rotate { angle } => Ok(rotate(img, angle)),
        Step::Crop {
            left,
            top,
            width,
            height,
        } => crop(img, left, top, width, height),
        Step::Flatten { background } => Ok(flatten(img, background)),
    }
}

fn crop(img: DynamicImage, left: u32, top: u32, width: u32, height: u32) -> RenditionResult<DynamicImage> {
    let (w, h) = img.dimensions();
    let fits = left.checked_add(width).is_some_and(|right| right <= w)
        && top.checked_add(height).is_some_and(|bottom| bottom <= h);
    if !fits {
        return Err(RenditionError::parameter(format!(
            "crop {width}x{height} at ({left}, {top}) exceeds the {w}x{h} image"
        )));
    }
    Ok(img.crop_imm(left, top, width, height))
}

#[cfg(test)]
#[path = "../../tests/unit/transform/engine.rs"]
mod tests;
