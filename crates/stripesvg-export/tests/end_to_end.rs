//! Integration test: encode an in-memory image, run it through the full
//! conversion, and export to SVG and PNG.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::io::Cursor;

use image::{DynamicImage, GrayImage, ImageFormat, Luma, Rgb, RgbImage};
use stripesvg_export::{SvgMetadata, SvgStyle, to_png_preview, to_svg};
use stripesvg_pipeline::{ColorMode, ProcessOptions, StripeConfig};

fn encode_png(image: DynamicImage) -> Vec<u8> {
    let mut bytes = Vec::new();
    image
        .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
        .unwrap();
    bytes
}

fn gray_png(width: u32, height: u32, value: u8) -> Vec<u8> {
    encode_png(DynamicImage::ImageLuma8(GrayImage::from_pixel(
        width,
        height,
        Luma([value]),
    )))
}

fn render(bytes: &[u8], config: StripeConfig) -> String {
    let options = ProcessOptions {
        config,
        ..ProcessOptions::default()
    };
    let document = stripesvg_pipeline::process(bytes, &options).expect("conversion should succeed");
    to_svg(&document, &SvgMetadata::default(), &SvgStyle::default())
}

#[test]
fn mid_gray_square_renders_two_merged_rows() {
    let svg = render(&gray_png(24, 24, 128), StripeConfig::default());

    assert!(svg.starts_with("<?xml"));
    assert!(svg.contains(r#"xmlns="http://www.w3.org/2000/svg""#));
    assert!(svg.contains(r#"version="1.1""#));
    assert!(svg.contains(r#"viewBox="0 0 24 24""#));

    // Density 2 per block: rows 0, 1, 12, 13, each merged across both
    // block columns.
    assert_eq!(svg.matches("<path").count(), 4);
    for row in [0, 1, 12, 13] {
        assert!(
            svg.contains(&format!(r#"d="M0,{row} L24,{row}""#)),
            "missing row {row}:\n{svg}"
        );
    }
}

#[test]
fn white_image_has_no_strokes() {
    let svg = render(&gray_png(24, 24, 255), StripeConfig::default());
    assert!(!svg.contains("<path"));
    assert!(!svg.contains("<line"));
    assert!(svg.contains(r#"viewBox="0 0 24 24""#));
}

#[test]
fn combined_black_image_is_one_path() {
    let config = StripeConfig {
        combine_into_single_path: true,
        ..StripeConfig::default()
    };
    let svg = render(&gray_png(24, 24, 0), config);
    assert_eq!(svg.matches("<path").count(), 1);
    assert_eq!(svg.matches(" L24,").count(), 10);
}

#[test]
fn color_halves_keep_separate_strokes() {
    let image = RgbImage::from_fn(24, 12, |x, _| {
        if x < 12 { Rgb([200, 0, 0]) } else { Rgb([0, 0, 200]) }
    });
    let config = StripeConfig {
        color_mode: ColorMode::Color,
        ..StripeConfig::default()
    };
    let svg = render(&encode_png(DynamicImage::ImageRgb8(image)), config);
    assert!(svg.contains(r##"stroke="#c80000""##));
    assert!(svg.contains(r##"stroke="#0000c8""##));
    assert!(!svg.contains(r#"stroke="black""#));
}

#[test]
fn preview_matches_svg_geometry() {
    let options = ProcessOptions::default();
    let document = stripesvg_pipeline::process(&gray_png(24, 24, 128), &options).unwrap();
    let png = to_png_preview(&document, &SvgStyle::default()).unwrap();

    let preview = image::load_from_memory(&png).unwrap().to_luma8();
    assert_eq!(preview.dimensions(), (24, 24));
    for row in [0, 1, 12, 13] {
        assert_eq!(preview.get_pixel(6, row).0, [0], "row {row} should be inked");
    }
    for row in [2, 11, 14, 23] {
        assert_eq!(preview.get_pixel(6, row).0, [255], "row {row} should be blank");
    }
}
