use std::io::{BufWriter, Write};
use std::path::Path;

use image::codecs::jpeg::JpegEncoder;
use image::{DynamicImage, ImageError, ImageResult};

use crate::render::RenderResult;

/// Saves a rendered frame to disk; the format follows the file extension.
///
/// JPEG has no alpha channel, so `.jpg`/`.jpeg` outputs are flattened to
/// RGB first. Everything else is handed to `image` as RGBA.
pub fn save_image(result: &RenderResult, output: &Path) -> Result<(), ImageError> {
    let extension = output
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());
    match extension.as_deref() {
        Some("jpg") | Some("jpeg") => DynamicImage::ImageRgba8(result.pixels.clone())
            .to_rgb8()
            .save(output),
        _ => result.pixels.save(output),
    }
}

/// Streams the frame as JPEG to an arbitrary writer (the diagnostic
/// stdout path).
pub fn write_jpeg<W: Write>(result: &RenderResult, writer: W) -> ImageResult<()> {
    let rgb = DynamicImage::ImageRgba8(result.pixels.clone()).to_rgb8();
    let mut encoder = JpegEncoder::new(BufWriter::new(writer));
    encoder.encode_image(&rgb)
}
