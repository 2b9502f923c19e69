//! stripesvg-export: Pure format serializers (sans-IO)
//!
//! Converts a [`StripeDocument`](stripesvg_pipeline::StripeDocument) into
//! output formats: SVG markup, and a PNG preview raster.

pub mod png;
pub mod svg;

pub use png::{ExportError, to_png_preview};
pub use svg::{StrokeElement, SvgMetadata, SvgStyle, build_path_data, to_svg};
