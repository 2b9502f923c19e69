//! PNG preview rasterizer.
//!
//! Draws a [`StripeDocument`] onto a white canvas with `tiny-skia` and
//! encodes it as PNG, so a conversion can be checked without an SVG
//! viewer. Anti-aliasing is off: strokes land on whole pixels, which
//! keeps the preview crisp at the document's own resolution.

use tiny_skia::{Color, LineCap, Paint, PathBuilder, Pixmap, Stroke, Transform};

use stripesvg_pipeline::{DrawCommand, StripeDocument, StrokeColor};

use crate::svg::SvgStyle;

/// Errors from raster export.
#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    /// The document has a zero dimension, so there is nothing to draw on.
    #[error("cannot rasterize a {width}x{height} canvas")]
    EmptyCanvas {
        /// Canvas width in pixels.
        width: u32,
        /// Canvas height in pixels.
        height: u32,
    },

    /// The PNG encoder failed.
    #[error("png encoding failed: {0}")]
    PngEncode(String),
}

/// Rasterize a document to PNG bytes at its own pixel dimensions.
///
/// Strokes are drawn at least one pixel wide, centred on the pixel row
/// (or column) they sit on, in black or their block colour.
///
/// # Errors
///
/// Returns [`ExportError::EmptyCanvas`] if either dimension is zero, and
/// [`ExportError::PngEncode`] if encoding fails.
pub fn to_png_preview(document: &StripeDocument, style: &SvgStyle) -> Result<Vec<u8>, ExportError> {
    let width = document.dimensions.width;
    let height = document.dimensions.height;
    let Some(mut pixmap) = Pixmap::new(width, height) else {
        return Err(ExportError::EmptyCanvas { width, height });
    };
    pixmap.fill(Color::WHITE);

    #[allow(clippy::cast_possible_truncation)]
    let stroke = Stroke {
        width: style.stroke_width.max(1.0) as f32,
        line_cap: LineCap::Butt,
        ..Stroke::default()
    };

    for path in &document.paths {
        let mut pb = PathBuilder::new();
        for command in &path.commands {
            let (from, to) = pixel_centred(command);
            pb.move_to(from.0, from.1);
            pb.line_to(to.0, to.1);
        }
        // Empty path: nothing to draw.
        let Some(skia_path) = pb.finish() else {
            continue;
        };

        let mut paint = Paint::default();
        let [r, g, b] = match path.color {
            StrokeColor::Black => [0, 0, 0],
            StrokeColor::Rgb(rgb) => rgb,
        };
        paint.set_color_rgba8(r, g, b, 255);
        paint.anti_alias = false;

        pixmap.stroke_path(&skia_path, &paint, &stroke, Transform::identity(), None);
    }

    pixmap
        .encode_png()
        .map_err(|e| ExportError::PngEncode(e.to_string()))
}

/// Shift a stroke half a pixel across its direction so it covers the
/// pixels of its row or column instead of straddling two.
#[allow(clippy::cast_precision_loss)]
fn pixel_centred(command: &DrawCommand) -> ((f32, f32), (f32, f32)) {
    let (fx, fy) = (command.from.x as f32, command.from.y as f32);
    let (tx, ty) = (command.to.x as f32, command.to.y as f32);
    if command.from.y == command.to.y {
        ((fx, fy + 0.5), (tx, ty + 0.5))
    } else {
        ((fx + 0.5, fy), (tx + 0.5, ty))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use stripesvg_pipeline::{CanvasSizing, Dimensions, Point, StrokePath};

    use super::*;

    fn document(width: u32, height: u32, paths: Vec<StrokePath>) -> StripeDocument {
        StripeDocument {
            dimensions: Dimensions { width, height },
            sizing: CanvasSizing::Responsive,
            paths,
        }
    }

    fn stroke(color: StrokeColor, commands: &[((u32, u32), (u32, u32))]) -> StrokePath {
        StrokePath {
            color,
            commands: commands
                .iter()
                .map(|&((x1, y1), (x2, y2))| DrawCommand {
                    from: Point::new(x1, y1),
                    to: Point::new(x2, y2),
                })
                .collect(),
        }
    }

    fn decode(png: &[u8]) -> image::RgbaImage {
        image::load_from_memory(png).unwrap().to_rgba8()
    }

    #[test]
    fn horizontal_stroke_fills_its_row() {
        let doc = document(24, 4, vec![stroke(StrokeColor::Black, &[((0, 1), (24, 1))])]);
        let img = decode(&to_png_preview(&doc, &SvgStyle::default()).unwrap());
        assert_eq!(img.dimensions(), (24, 4));
        assert_eq!(img.get_pixel(10, 1).0, [0, 0, 0, 255]);
        assert_eq!(img.get_pixel(10, 0).0, [255, 255, 255, 255]);
        assert_eq!(img.get_pixel(10, 2).0, [255, 255, 255, 255]);
    }

    #[test]
    fn vertical_stroke_fills_its_column() {
        let doc = document(4, 24, vec![stroke(StrokeColor::Black, &[((2, 0), (2, 24))])]);
        let img = decode(&to_png_preview(&doc, &SvgStyle::default()).unwrap());
        assert_eq!(img.get_pixel(2, 10).0, [0, 0, 0, 255]);
        assert_eq!(img.get_pixel(1, 10).0, [255, 255, 255, 255]);
    }

    #[test]
    fn color_strokes_keep_their_color() {
        let doc = document(
            24,
            4,
            vec![stroke(StrokeColor::Rgb([200, 10, 30]), &[((0, 0), (24, 0))])],
        );
        let img = decode(&to_png_preview(&doc, &SvgStyle::default()).unwrap());
        assert_eq!(img.get_pixel(12, 0).0, [200, 10, 30, 255]);
    }

    #[test]
    fn compound_path_draws_every_stroke() {
        let doc = document(
            24,
            6,
            vec![stroke(
                StrokeColor::Black,
                &[((0, 0), (24, 0)), ((0, 4), (24, 4))],
            )],
        );
        let img = decode(&to_png_preview(&doc, &SvgStyle::default()).unwrap());
        assert_eq!(img.get_pixel(5, 0).0, [0, 0, 0, 255]);
        assert_eq!(img.get_pixel(5, 4).0, [0, 0, 0, 255]);
        assert_eq!(img.get_pixel(5, 2).0, [255, 255, 255, 255]);
    }

    #[test]
    fn empty_document_is_white() {
        let img = decode(&to_png_preview(&document(8, 8, vec![]), &SvgStyle::default()).unwrap());
        assert!(img.pixels().all(|p| p.0 == [255, 255, 255, 255]));
    }

    #[test]
    fn zero_sized_canvas_is_rejected() {
        let result = to_png_preview(&document(0, 8, vec![]), &SvgStyle::default());
        assert!(matches!(
            result,
            Err(ExportError::EmptyCanvas {
                width: 0,
                height: 8
            })
        ));
    }
}
