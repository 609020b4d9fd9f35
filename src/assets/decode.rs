use std::io::Cursor;

use image::metadata::Orientation;
use image::{DynamicImage, ImageDecoder, ImageFormat, ImageReader, RgbaImage};

use crate::foundation::error::{RenditionError, RenditionResult};

/// Largest SVG raster edge we are willing to allocate.
const MAX_SVG_DIM: u32 = 16_384;

/// Container format a source was decoded from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SourceFormat {
    /// Raster format understood by the `image` codecs.
    Raster(ImageFormat),
    /// SVG document rasterized at its intrinsic size.
    Svg,
}

impl SourceFormat {
    /// Lowercase name, e.g. `jpeg`, `png`, `svg`.
    pub fn name(&self) -> String {
        match self {
            Self::Raster(f) => format!("{f:?}").to_lowercase(),
            Self::Svg => "svg".to_string(),
        }
    }
}

/// Source image in the orientation-normalized frame.
#[derive(Clone, Debug)]
pub struct DecodedSource {
    /// Pixels with the embedded orientation already applied.
    pub image: DynamicImage,
    /// Format the bytes were decoded from.
    pub format: SourceFormat,
    /// Orientation that was baked into `image`.
    pub orientation: Orientation,
}

/// Decode source bytes and normalize their orientation.
///
/// The EXIF orientation is applied to the pixel buffer; nothing downstream ever sees the raw
/// sensor frame, and encoders never write the tag back out.
pub fn decode_source(bytes: &[u8]) -> RenditionResult<DecodedSource> {
    let reader = ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .map_err(|e| RenditionError::decode(format!("sniff source format: {e}")))?;

    let Some(format) = reader.format() else {
        if looks_like_svg(bytes) {
            return Ok(DecodedSource {
                image: DynamicImage::ImageRgba8(rasterize_svg(bytes)?),
                format: SourceFormat::Svg,
                orientation: Orientation::NoTransforms,
            });
        }
        return Err(RenditionError::decode("unrecognized source image format"));
    };

    let mut decoder = reader
        .into_decoder()
        .map_err(|e| RenditionError::decode(format!("open {format:?} decoder: {e}")))?;
    let orientation = read_orientation(&mut decoder);
    let mut image = DynamicImage::from_decoder(decoder)
        .map_err(|e| RenditionError::decode(format!("decode {format:?} source: {e}")))?;
    image.apply_orientation(orientation);

    Ok(DecodedSource {
        image,
        format: SourceFormat::Raster(format),
        orientation,
    })
}

pub(crate) fn read_orientation(decoder: &mut impl ImageDecoder) -> Orientation {
    match decoder.orientation() {
        Ok(o) => o,
        Err(e) => {
            tracing::debug!("ignoring unreadable orientation metadata: {e}");
            Orientation::NoTransforms
        }
    }
}

/// EXIF orientation value (1-8) for `orientation`.
pub fn exif_orientation(orientation: Orientation) -> u8 {
    match orientation {
        Orientation::NoTransforms => 1,
        Orientation::FlipHorizontal => 2,
        Orientation::Rotate180 => 3,
        Orientation::FlipVertical => 4,
        Orientation::Rotate90FlipH => 5,
        Orientation::Rotate90 => 6,
        Orientation::Rotate270FlipH => 7,
        Orientation::Rotate270 => 8,
    }
}

pub(crate) fn looks_like_svg(bytes: &[u8]) -> bool {
    let head = &bytes[..bytes.len().min(1024)];
    let head = String::from_utf8_lossy(head);
    let head = head.trim_start_matches('\u{feff}').trim_start();
    if head.starts_with("<svg") {
        return true;
    }
    (head.starts_with("<?xml") || head.starts_with("<!--") || head.starts_with("<!DOCTYPE svg"))
        && head.contains("<svg")
}

pub(crate) fn parse_svg(bytes: &[u8]) -> RenditionResult<usvg::Tree> {
    let opts = usvg::Options::default();
    usvg::Tree::from_data(bytes, &opts)
        .map_err(|e| RenditionError::decode(format!("parse svg source: {e}")))
}

/// Intrinsic pixel size of an SVG tree.
pub(crate) fn svg_size(tree: &usvg::Tree) -> RenditionResult<(u32, u32)> {
    let size = tree.size().to_int_size();
    let (w, h) = (size.width(), size.height());
    if w > MAX_SVG_DIM || h > MAX_SVG_DIM {
        return Err(RenditionError::decode(format!(
            "svg raster size too large: {w}x{h} (max {MAX_SVG_DIM}x{MAX_SVG_DIM})"
        )));
    }
    Ok((w, h))
}

fn rasterize_svg(bytes: &[u8]) -> RenditionResult<RgbaImage> {
    let tree = parse_svg(bytes)?;
    let (width, height) = svg_size(&tree)?;

    let mut pixmap = resvg::tiny_skia::Pixmap::new(width, height)
        .ok_or_else(|| RenditionError::decode("failed to allocate svg pixmap"))?;
    resvg::render(
        &tree,
        resvg::tiny_skia::Transform::default(),
        &mut pixmap.as_mut(),
    );

    // tiny-skia stores premultiplied pixels; the pipeline works on straight alpha.
    let mut rgba = Vec::with_capacity(pixmap.data().len());
    for px in pixmap.pixels() {
        let c = px.demultiply();
        rgba.extend_from_slice(&[c.red(), c.green(), c.blue(), c.alpha()]);
    }

    RgbaImage::from_raw(width, height, rgba)
        .ok_or_else(|| RenditionError::decode("svg raster buffer size mismatch"))
}

#[cfg(test)]
#[path = "../../tests/unit/assets/decode.rs"]
mod tests;
