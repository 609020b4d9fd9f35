//! Typed transform steps.
//!
//! Every [`Operation`] is turned into a [`Step`] before any I/O happens, so an unknown type or a
//! malformed parameter never gets as far as decoding the source image.

use std::fmt;

use serde::Serialize;

use crate::foundation::error::{RenditionError, RenditionResult};
use crate::ops::parse::Operation;

/// Resize fit mode.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Fit {
    /// Scale to cover the box, then center-crop the overflow.
    #[default]
    Cover,
    /// Scale to fit inside the box, then letterbox onto the box.
    Contain,
    /// Stretch to the box, ignoring aspect ratio.
    Fill,
    /// Scale to fit inside the box, no padding.
    Inside,
    /// Scale to cover the box, no cropping.
    Outside,
}

impl Fit {
    fn parse(value: &str) -> RenditionResult<Self> {
        match value {
            "cover" => Ok(Self::Cover),
            "contain" => Ok(Self::Contain),
            "fill" => Ok(Self::Fill),
            "inside" => Ok(Self::Inside),
            "outside" => Ok(Self::Outside),
            other => Err(RenditionError::parse(format!(
                "unknown resize fit '{other}' (expected cover, contain, fill, inside or outside)"
            ))),
        }
    }
}

/// Opaque RGB colour.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Rgb {
    /// Red channel.
    pub r: u8,
    /// Green channel.
    pub g: u8,
    /// Blue channel.
    pub b: u8,
}

impl Rgb {
    /// Opaque black, the fill for letterboxing and for alpha dropped by the encoder.
    pub const BLACK: Self = Self { r: 0, g: 0, b: 0 };

    /// Parse exactly six hex digits, e.g. `ff8800`.
    pub fn from_hex(value: &str) -> RenditionResult<Self> {
        if value.len() != 6 || !value.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(RenditionError::parse(format!(
                "colour '{value}' must be 6 hex digits"
            )));
        }
        let channel = |i: usize| {
            u8::from_str_radix(&value[i..i + 2], 16)
                .map_err(|e| RenditionError::parse(format!("colour '{value}': {e}")))
        };
        Ok(Self {
            r: channel(0)?,
            g: channel(2)?,
            b: channel(4)?,
        })
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

impl Serialize for Rgb {
    fn serialize<S: serde::Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
        s.collect_str(self)
    }
}

/// One validated transformation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Step {
    /// Resample, never enlarging beyond the current image.
    Resize {
        /// Target width in pixels.
        width: Option<u32>,
        /// Target height in pixels.
        height: Option<u32>,
        /// How the box is filled.
        fit: Fit,
    },
    /// Rotate clockwise by `angle` degrees, normalized to `0..360`.
    Rotate {
        /// Degrees in `0..360`.
        angle: u32,
    },
    /// Extract a rectangle in the orientation-normalized frame.
    Crop {
        /// Left edge.
        left: u32,
        /// Top edge.
        top: u32,
        /// Rectangle width.
        width: u32,
        /// Rectangle height.
        height: u32,
    },
    /// Composite alpha onto an opaque background.
    Flatten {
        /// Background colour.
        background: Rgb,
    },
}

impl Step {
    /// Operation type name.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Resize { .. } => "resize",
            Self::Rotate { .. } => "rotate",
            Self::Crop { .. } => "crop",
            Self::Flatten { .. } => "flatten",
        }
    }

    /// Validate a parsed operation into a typed step.
    pub fn from_operation(op: &Operation) -> RenditionResult<Self> {
        let args = Args { op };
        match op.kind.as_str() {
            "resize" => {
                args.only(&["width", "height", "fit"])?;
                let width = args.dimension("width")?;
                let height = args.dimension("height")?;
                let fit = match op.option("fit") {
                    Some(v) => Fit::parse(v)?,
                    None => Fit::default(),
                };
                Ok(Self::Resize { width, height, fit })
            }
            "rotate" => {
                args.only(&["angle"])?;
                let angle: i64 = args.int("angle")?.ok_or_else(|| args.missing("angle"))?;
                Ok(Self::Rotate {
                    angle: angle.rem_euclid(360) as u32,
                })
            }
            "crop" => {
                args.only(&["left", "top", "width", "height"])?;
                let left: u32 = args.int("left")?.unwrap_or(0);
                let top: u32 = args.int("top")?.unwrap_or(0);
                let width = args.dimension("width")?.ok_or_else(|| args.missing("width"))?;
                let height = args
                    .dimension("height")?
                    .ok_or_else(|| args.missing("height"))?;
                Ok(Self::Crop {
                    left,
                    top,
                    width,
                    height,
                })
            }
            "flatten" => {
                args.only(&["background"])?;
                let background = op
                    .option("background")
                    .ok_or_else(|| args.missing("background"))?;
                Ok(Self::Flatten {
                    background: Rgb::from_hex(background)?,
                })
            }
            other => Err(RenditionError::unsupported(other)),
        }
    }
}

/// Plan a whole stack, stopping at the first invalid operation.
pub fn plan_steps(stack: &[Operation]) -> RenditionResult<Vec<Step>> {
    stack.iter().map(Step::from_operation).collect()
}

struct Args<'a> {
    op: &'a Operation,
}

impl Args<'_> {
    fn only(&self, allowed: &[&str]) -> RenditionResult<()> {
        match self.op.options.keys().find(|k| !allowed.contains(&k.as_str())) {
            Some(key) => Err(RenditionError::parse(format!(
                "unknown option '{key}' for {} (expected one of: {})",
                self.op.kind,
                allowed.join(", ")
            ))),
            None => Ok(()),
        }
    }

    fn int<T: std::str::FromStr>(&self, key: &str) -> RenditionResult<Option<T>>
    where
        T::Err: fmt::Display,
    {
        self.op
            .option(key)
            .map(|v| {
                v.parse::<T>().map_err(|e| {
                    RenditionError::parse(format!(
                        "{} option '{key}' value '{v}' is not a valid integer: {e}",
                        self.op.kind
                    ))
                })
            })
            .transpose()
    }

    fn dimension(&self, key: &str) -> RenditionResult<Option<u32>> {
        match self.int::<u32>(key)? {
            Some(0) => Err(RenditionError::parameter(format!(
                "{} {key} must be greater than zero",
                self.op.kind
            ))),
            other => Ok(other),
        }
    }

    fn missing(&self, key: &str) -> RenditionError {
        RenditionError::parameter(format!("{} requires '{key}'", self.op.kind))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/ops/step.rs"]
mod tests;
