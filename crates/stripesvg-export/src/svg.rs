//! SVG export serializer.
//!
//! Converts a [`StripeDocument`] into an SVG string using the [`svg`]
//! crate for document construction, XML escaping, and path data
//! formatting.
//!
//! Every [`StrokePath`] becomes one `<path>` element whose data is a
//! sequence of `M x,y L x,y` pairs, one pair per stroke. A compound path
//! (monochrome output with combining enabled) therefore carries many
//! pairs in a single `d` attribute. With [`StrokeElement::Line`] each
//! stroke is written as its own `<line>` element instead.
//!
//! Optional [`SvgMetadata`] embeds `<title>`, `<desc>`, and a namespaced
//! `<metadata>` element carrying the conversion settings.
//!
//! This is a pure function with no I/O -- it returns a `String`.

use svg::Document;
use svg::node::element::path::Data;
use svg::node::element::{Description, Element, Line, Path, Title};
use svg::node::{Node, Text, Value};

use stripesvg_pipeline::{CanvasSizing, DrawCommand, StripeDocument, StrokePath};

/// SVG namespace URI for the root element.
const SVG_NAMESPACE: &str = "http://www.w3.org/2000/svg";

/// Namespace for the embedded `<stripesvg:config>` metadata element.
const CONFIG_NAMESPACE: &str = "https://stripesvg.dev/ns/1";

/// One nesting level in the serialized markup.
const INDENT: &str = "  ";

/// Metadata to embed in the SVG document.
///
/// All fields are optional. Text values are XML-escaped automatically by
/// the `svg` crate.
#[derive(Debug, Clone, Default)]
pub struct SvgMetadata<'a> {
    /// Document title, emitted as `<title>`.
    ///
    /// Typically the source image filename (without extension).
    pub title: Option<&'a str>,

    /// Document description, emitted as `<desc>`.
    pub description: Option<&'a str>,

    /// Serialized conversion settings, emitted inside `<metadata>` in a
    /// namespaced `<stripesvg:config>` element so exported files can be
    /// reproduced.
    pub config_json: Option<&'a str>,
}

/// Which SVG element carries each stroke.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum StrokeElement {
    /// One `<path>` per [`StrokePath`]; compound paths stay compound.
    #[default]
    Path,
    /// One `<line>` per stroke. Compound paths are flattened.
    Line,
}

/// Presentation settings that do not affect stroke geometry.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SvgStyle {
    /// Stroke width in user units.
    pub stroke_width: f64,
    /// Element used for strokes.
    pub element: StrokeElement,
}

impl SvgStyle {
    /// Default stroke width in user units.
    pub const DEFAULT_STROKE_WIDTH: f64 = 0.5;
}

impl Default for SvgStyle {
    fn default() -> Self {
        Self {
            stroke_width: Self::DEFAULT_STROKE_WIDTH,
            element: StrokeElement::default(),
        }
    }
}

/// Build an SVG path `d` attribute string from draw commands.
///
/// Each command contributes one `M` and one `L`. Returns an empty string
/// when there are no commands.
///
/// # Examples
///
/// ```
/// use stripesvg_pipeline::{DrawCommand, Point};
/// use stripesvg_export::build_path_data;
///
/// let commands = [
///     DrawCommand { from: Point::new(0, 0), to: Point::new(24, 0) },
///     DrawCommand { from: Point::new(0, 1), to: Point::new(24, 1) },
/// ];
/// assert_eq!(build_path_data(&commands), "M0,0 L24,0 M0,1 L24,1");
/// ```
#[must_use]
pub fn build_path_data(commands: &[DrawCommand]) -> String {
    if commands.is_empty() {
        return String::new();
    }
    let data = commands.iter().fold(Data::new(), |data, command| {
        data.move_to(coords(command.from.x, command.from.y))
            .line_to(coords(command.to.x, command.to.y))
    });
    String::from(Value::from(data))
}

fn coords(x: u32, y: u32) -> (f64, f64) {
    (f64::from(x), f64::from(y))
}

/// Serialize a stripe document into an SVG string.
///
/// The root element carries the SVG namespace, `version="1.1"`, and a
/// `viewBox` of `0 0 width height`. With [`CanvasSizing::Absolute`] the
/// width and height are fixed pixel sizes; with
/// [`CanvasSizing::Responsive`] the drawing scales to its container
/// (`width="100%"`, `height="auto"`) while keeping its aspect ratio.
///
/// An empty document produces a valid SVG with no stroke elements.
#[must_use]
pub fn to_svg(document: &StripeDocument, metadata: &SvgMetadata<'_>, style: &SvgStyle) -> String {
    let w = document.dimensions.width;
    let h = document.dimensions.height;
    let mut doc = Document::new()
        .set("xmlns", SVG_NAMESPACE)
        .set("version", "1.1")
        .set("viewBox", (0, 0, w, h));
    doc = match document.sizing {
        CanvasSizing::Absolute => doc
            .set("width", format!("{w}px"))
            .set("height", format!("{h}px")),
        CanvasSizing::Responsive => doc
            .set("width", "100%")
            .set("height", "auto")
            .set("preserveAspectRatio", "xMidYMid meet"),
    };

    if let Some(title) = metadata.title {
        doc = doc.add(Title::new(title));
    }

    if let Some(description) = metadata.description {
        doc = doc.add(Description::new().add(Text::new(description)));
    }

    if let Some(config_json) = metadata.config_json {
        let mut config_el = Element::new("stripesvg:config");
        config_el.assign("xmlns:stripesvg", CONFIG_NAMESPACE);
        config_el.append(Text::new(config_json));
        let mut metadata_el = Element::new("metadata");
        metadata_el.append(config_el);
        doc = doc.add(metadata_el);
    }

    for path in &document.paths {
        match style.element {
            StrokeElement::Path => {
                let d = build_path_data(&path.commands);
                if d.is_empty() {
                    continue;
                }
                let element = Path::new().set("d", d).set("fill", "none");
                doc = doc.add(stroked(element, path, style));
            }
            StrokeElement::Line => {
                for command in &path.commands {
                    let line = Line::new()
                        .set("x1", command.from.x)
                        .set("y1", command.from.y)
                        .set("x2", command.to.x)
                        .set("y2", command.to.y);
                    doc = doc.add(stroked(line, path, style));
                }
            }
        }
    }

    // The svg crate omits the XML declaration, so we prepend it.
    format!(
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n{}",
        indent(&doc.to_string())
    )
}

/// Indent nested elements by [`INDENT`] per level.
///
/// The svg crate writes each child element on its own line but flush
/// left. A line opens a level when it starts a tag that is neither
/// self-closing nor closed on the same line.
fn indent(markup: &str) -> String {
    let mut out = String::with_capacity(markup.len() * 2);
    let mut depth = 0_usize;
    for line in markup.lines() {
        let closes = line.starts_with("</");
        if closes {
            depth = depth.saturating_sub(1);
        }
        out.push_str(&INDENT.repeat(depth));
        out.push_str(line);
        out.push('\n');
        if line.starts_with('<') && !closes && !line.ends_with("/>") && !line.contains("</") {
            depth += 1;
        }
    }
    out
}

/// Apply the stroke colour and width shared by both element kinds.
fn stroked<N: Node>(mut node: N, path: &StrokePath, style: &SvgStyle) -> N {
    node.assign("stroke", path.color.to_string());
    node.assign("stroke-width", style.stroke_width);
    node
}
