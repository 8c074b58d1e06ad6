//! Raster encoding: lossless WebP copies and recompression of originals.

use std::io::Cursor;

use anyhow::{Context, Result};
use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::{CompressionType, FilterType, PngEncoder};
use image::codecs::webp::WebPEncoder;
use image::{DynamicImage, ImageFormat};

/// Encode any decodable raster as lossless WebP.
pub fn to_webp(data: &[u8]) -> Result<Vec<u8>> {
    let img = image::load_from_memory(data).context("failed to decode image")?;
    let img = if img.color().has_alpha() {
        DynamicImage::ImageRgba8(img.to_rgba8())
    } else {
        DynamicImage::ImageRgb8(img.to_rgb8())
    };
    let mut out = Vec::new();
    img.write_with_encoder(WebPEncoder::new_lossless(&mut out))
        .context("failed to encode webp")?;
    Ok(out)
}

/// Re-encode a PNG at the best zlib level.
pub fn recompress_png(data: &[u8]) -> Result<Vec<u8>> {
    let img = image::load_from_memory_with_format(data, ImageFormat::Png)
        .context("failed to decode png")?;
    let mut out = Vec::new();
    img.write_with_encoder(PngEncoder::new_with_quality(
        &mut out,
        CompressionType::Best,
        FilterType::Adaptive,
    ))
    .context("failed to encode png")?;
    Ok(out)
}

/// Re-encode a JPEG at `quality` (1-100).
pub fn recompress_jpeg(data: &[u8], quality: u8) -> Result<Vec<u8>> {
    let img = image::load_from_memory_with_format(data, ImageFormat::Jpeg)
        .context("failed to decode jpeg")?;
    let mut out = Cursor::new(Vec::new());
    DynamicImage::ImageRgb8(img.to_rgb8())
        .write_with_encoder(JpegEncoder::new_with_quality(&mut out, quality))
        .context("failed to encode jpeg")?;
    Ok(out.into_inner())
}

#[cfg(test)]
pub(crate) fn sample_png(width: u32, height: u32) -> Vec<u8> {
    let img = image::RgbImage::from_fn(width, height, |x, y| {
        image::Rgb([(x * 8) as u8, (y * 8) as u8, 128])
    });
    let mut out = Cursor::new(Vec::new());
    DynamicImage::ImageRgb8(img)
        .write_to(&mut out, ImageFormat::Png)
        .unwrap();
    out.into_inner()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_webp_is_lossless_copy() {
        let png = sample_png(16, 16);
        let webp = to_webp(&png).unwrap();
        assert_eq!(&webp[..4], b"RIFF");
        assert_eq!(&webp[8..12], b"WEBP");

        let original = image::load_from_memory(&png).unwrap().to_rgb8();
        let decoded = image::load_from_memory(&webp).unwrap().to_rgb8();
        assert_eq!(original, decoded);
    }

    #[test]
    fn test_recompress_png_keeps_pixels() {
        let png = sample_png(8, 8);
        let out = recompress_png(&png).unwrap();
        let a = image::load_from_memory(&png).unwrap().to_rgb8();
        let b = image::load_from_memory(&out).unwrap().to_rgb8();
        assert_eq!(a, b);
    }

    #[test]
    fn test_recompress_jpeg() {
        let png = sample_png(16, 16);
        let img = image::load_from_memory(&png).unwrap();
        let mut jpeg = Cursor::new(Vec::new());
        img.write_to(&mut jpeg, ImageFormat::Jpeg).unwrap();

        let out = recompress_jpeg(jpeg.get_ref(), 40).unwrap();
        assert_eq!(&out[..2], &[0xff, 0xd8]);
    }

    #[test]
    fn test_undecodable_input_fails() {
        assert!(to_webp(b"not an image").is_err());
    }
}
