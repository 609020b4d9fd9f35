use std::fmt;
use std::io::Cursor;

use image::codecs::jpeg::JpegEncoder;
use image::{DynamicImage, ImageFormat};

use crate::foundation::error::{RenditionError, RenditionResult};
use crate::ops::step::Rgb;
use crate::transform::flatten::composite_over;

const JPEG_QUALITY: u8 = 80;

/// Output encodings this crate produces.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum OutputFormat {
    /// `jpg` / `jpeg`.
    Jpeg,
    /// `png`.
    Png,
    /// `webp` (lossless).
    WebP,
    /// `gif`.
    Gif,
    /// `tiff`.
    Tiff,
    /// `avif`.
    Avif,
}

impl OutputFormat {
    /// Accepted request tokens, matched case-sensitively.
    pub const TOKENS: &'static [&'static str] = &["jpg", "jpeg", "png", "webp", "gif", "tiff", "avif"];

    /// Look up a request token.
    pub fn from_token(token: &str) -> RenditionResult<Self> {
        match token {
            "jpg" | "jpeg" => Ok(Self::Jpeg),
            "png" => Ok(Self::Png),
            "webp" => Ok(Self::WebP),
            "gif" => Ok(Self::Gif),
            "tiff" => Ok(Self::Tiff),
            "avif" => Ok(Self::Avif),
            other => Err(RenditionError::encode(format!(
                "unsupported output format '{other}' (expected one of: {})",
                Self::TOKENS.join(", ")
            ))),
        }
    }

    /// MIME type for responses.
    pub fn mime_type(&self) -> &'static str {
        match self {
            Self::Jpeg => "image/jpeg",
            Self::Png => "image/png",
            Self::WebP => "image/webp",
            Self::Gif => "image/gif",
            Self::Tiff => "image/tiff",
            Self::Avif => "image/avif",
        }
    }

    fn image_format(&self) -> ImageFormat {
        match self {
            Self::Jpeg => ImageFormat::Jpeg,
            Self::Png => ImageFormat::Png,
            Self::WebP => ImageFormat::WebP,
            Self::Gif => ImageFormat::Gif,
            Self::Tiff => ImageFormat::Tiff,
            Self::Avif => ImageFormat::Avif,
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Jpeg => "jpeg",
            Self::Png => "png",
            Self::WebP => "webp",
            Self::Gif => "gif",
            Self::Tiff => "tiff",
            Self::Avif => "avif",
        };
        f.write_str(name)
    }
}

/// Encode `img` as `format`.
///
/// Pixels are narrowed to 8-bit RGB or RGBA first. JPEG has no alpha channel, so translucent
/// pixels are composited over black before encoding.
pub fn encode(img: &DynamicImage, format: OutputFormat) -> RenditionResult<Vec<u8>> {
    let mut buf = Vec::new();
    let result = match format {
        OutputFormat::Jpeg => {
            let rgb = composite_over(img, Rgb::BLACK);
            JpegEncoder::new_with_quality(&mut buf, JPEG_QUALITY).encode_image(&rgb)
        }
        other => {
            let narrowed = if img.color().has_alpha() {
                DynamicImage::ImageRgba8(img.to_rgba8())
            } else {
                DynamicImage::ImageRgb8(img.to_rgb8())
            };
            narrowed.write_to(&mut Cursor::new(&mut buf), other.image_format())
        }
    };
    result.map_err(|e| RenditionError::encode(format!("encode {format}: {e}")))?;
    Ok(buf)
}

#[cfg(test)]
#[path = "../../tests/unit/encode/format.rs"]
mod tests;
