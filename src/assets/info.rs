use std::io::Cursor;

use image::metadata::Orientation;
use image::{ImageDecoder, ImageReader};
use serde::{Deserialize, Serialize};

use crate::assets::decode::{
    SourceFormat, exif_orientation, looks_like_svg, parse_svg, read_orientation, svg_size,
};
use crate::foundation::error::{RenditionError, RenditionResult};

/// Source metadata, with dimensions as stored and as seen after orientation normalization.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageInfo {
    /// Source container format, e.g. `jpeg`.
    pub format: String,
    /// Stored width.
    pub width: u32,
    /// Stored height.
    pub height: u32,
    /// EXIF orientation value (1 when absent).
    pub orientation: u8,
    /// Width after orientation normalization.
    pub normalized_width: u32,
    /// Height after orientation normalization.
    pub normalized_height: u32,
    /// Whether the source carries an alpha channel.
    pub has_alpha: bool,
}

/// Read metadata without decoding pixel data.
pub fn probe_info(bytes: &[u8]) -> RenditionResult<ImageInfo> {
    let reader = ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .map_err(|e| RenditionError::decode(format!("sniff source format: {e}")))?;

    let Some(format) = reader.format() else {
        if looks_like_svg(bytes) {
            let (width, height) = svg_size(&parse_svg(bytes)?)?;
            return Ok(build_info(
                SourceFormat::Svg,
                (width, height),
                Orientation::NoTransforms,
                true,
            ));
        }
        return Err(RenditionError::decode("unrecognized source image format"));
    };

    let mut decoder = reader
        .into_decoder()
        .map_err(|e| RenditionError::decode(format!("open {format:?} decoder: {e}")))?;
    let orientation = read_orientation(&mut decoder);
    let dimensions = decoder.dimensions();
    let has_alpha = decoder.color_type().has_alpha();

    Ok(build_info(
        SourceFormat::Raster(format),
        dimensions,
        orientation,
        has_alpha,
    ))
}

fn build_info(
    format: SourceFormat,
    (width, height): (u32, u32),
    orientation: Orientation,
    has_alpha: bool,
) -> ImageInfo {
    let orientation = exif_orientation(orientation);
    // Orientations 5-8 transpose the frame.
    let (normalized_width, normalized_height) = if orientation >= 5 {
        (height, width)
    } else {
        (width, height)
    };
    ImageInfo {
        format: format.name(),
        width,
        height,
        orientation,
        normalized_width,
        normalized_height,
        has_alpha,
    }
}

#[cfg(test)]
#[path = "../../tests/unit/assets/info.rs"]
mod tests;
