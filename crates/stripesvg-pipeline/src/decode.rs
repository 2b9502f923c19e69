//! Image decoding, orientation correction, and pixel grid construction.
//!
//! Accepts raw image bytes (PNG, JPEG, BMP, WebP), applies the EXIF
//! orientation recorded in the file, and produces the [`PixelGrid`]
//! the stripe conversion samples from.

use std::io::Cursor;

use image::{DynamicImage, GrayImage, ImageDecoder, ImageReader, Luma};

use crate::sample::luminance_of;
use crate::types::{ColorMode, PixelGrid, StripeError};

/// Decode raw image bytes into an upright image.
///
/// The EXIF orientation tag (if any) is applied before returning, so
/// photos taken with a rotated camera come out the right way up.
///
/// # Errors
///
/// Returns [`StripeError::EmptyInput`] if `bytes` is empty.
/// Returns [`StripeError::ImageDecode`] if the image format is
/// unrecognized or the data is corrupt.
pub fn decode(bytes: &[u8]) -> Result<DynamicImage, StripeError> {
    if bytes.is_empty() {
        return Err(StripeError::EmptyInput);
    }

    let reader = ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .map_err(image::ImageError::IoError)?;
    let mut decoder = reader.into_decoder()?;
    let orientation = decoder.orientation()?;
    let mut image = DynamicImage::from_decoder(decoder)?;
    image.apply_orientation(orientation);

    tracing::debug!(
        width = image.width(),
        height = image.height(),
        ?orientation,
        "decoded image"
    );
    Ok(image)
}

/// Build the pixel grid for the given colour mode.
///
/// Monochrome conversion samples a single-channel grid whose values use
/// the same BT.601 weighting as colour-mode luminance
/// (see [`luminance_of`]), rounded to the nearest level. Colour
/// conversion keeps the RGB channels. Alpha is discarded.
#[must_use]
pub fn to_grid(image: &DynamicImage, color_mode: ColorMode) -> PixelGrid {
    match (color_mode, image) {
        (ColorMode::Monochrome, DynamicImage::ImageLuma8(gray)) => PixelGrid::Gray(gray.clone()),
        (ColorMode::Monochrome, _) => {
            let rgb = image.to_rgb8();
            PixelGrid::Gray(GrayImage::from_fn(rgb.width(), rgb.height(), |x, y| {
                Luma([to_gray_level(rgb.get_pixel(x, y).0)])
            }))
        }
        (ColorMode::Color, _) => PixelGrid::Rgb(image.to_rgb8()),
    }
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn to_gray_level(rgb: [u8; 3]) -> u8 {
    luminance_of(rgb).round().clamp(0.0, 255.0) as u8
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic)]
mod tests {
    use super::*;

    /// Helper: encode an RGBA image as a PNG byte buffer.
    fn encode_png(img: &image::RgbaImage) -> Vec<u8> {
        let mut buf = Vec::new();
        let encoder = image::codecs::png::PngEncoder::new(&mut buf);
        image::ImageEncoder::write_image(
            encoder,
            img.as_raw(),
            img.width(),
            img.height(),
            image::ExtendedColorType::Rgba8,
        )
        .unwrap();
        buf
    }

    #[test]
    fn empty_input_returns_error() {
        let result = decode(&[]);
        assert!(matches!(result, Err(StripeError::EmptyInput)));
    }

    #[test]
    fn corrupt_bytes_returns_image_decode_error() {
        let result = decode(&[0xFF, 0xFE, 0x00, 0x01]);
        assert!(matches!(result, Err(StripeError::ImageDecode(_))));
    }

    #[test]
    fn output_dimensions_match_input() {
        let img = image::RgbaImage::from_fn(17, 31, |_, _| image::Rgba([128, 64, 32, 255]));
        let decoded = decode(&encode_png(&img)).unwrap();
        assert_eq!(decoded.width(), 17);
        assert_eq!(decoded.height(), 31);
    }

    #[test]
    fn monochrome_grid_is_gray() {
        let img = image::RgbaImage::from_fn(2, 2, |_, _| image::Rgba([255, 255, 255, 255]));
        let decoded = decode(&encode_png(&img)).unwrap();
        let PixelGrid::Gray(gray) = to_grid(&decoded, ColorMode::Monochrome) else {
            panic!("expected a gray grid");
        };
        assert!(gray.pixels().all(|p| p.0[0] == 255));
    }

    #[test]
    fn color_grid_keeps_channels() {
        let img = image::RgbaImage::from_fn(3, 1, |_, _| image::Rgba([200, 100, 50, 255]));
        let decoded = decode(&encode_png(&img)).unwrap();
        let PixelGrid::Rgb(rgb) = to_grid(&decoded, ColorMode::Color) else {
            panic!("expected an RGB grid");
        };
        assert_eq!(rgb.get_pixel(2, 0).0, [200, 100, 50]);
    }

    #[test]
    fn luma_weights_green_over_red_over_blue() {
        let img = image::RgbaImage::from_fn(3, 1, |x, _| match x {
            0 => image::Rgba([255, 0, 0, 255]),
            1 => image::Rgba([0, 255, 0, 255]),
            _ => image::Rgba([0, 0, 255, 255]),
        });
        let decoded = decode(&encode_png(&img)).unwrap();
        let PixelGrid::Gray(gray) = to_grid(&decoded, ColorMode::Monochrome) else {
            panic!("expected a gray grid");
        };
        let (r, g, b) = (
            gray.get_pixel(0, 0).0[0],
            gray.get_pixel(1, 0).0[0],
            gray.get_pixel(2, 0).0[0],
        );
        assert!(g > r && r > b, "expected G > R > B, got R={r} G={g} B={b}");
    }

    #[test]
    fn gray_levels_use_bt601_weights() {
        assert_eq!(to_gray_level([255, 255, 255]), 255);
        assert_eq!(to_gray_level([0, 0, 0]), 0);
        // 0.2989 * 200 + 0.587 * 30 + 0.114 * 30 = 80.81
        assert_eq!(to_gray_level([200, 30, 30]), 81);
        assert_eq!(to_gray_level([77, 77, 77]), 77);
    }
}
