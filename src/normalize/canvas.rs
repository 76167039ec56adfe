//! Canvas normalization: square-canvas detection, padding and physical
//! centering.
//!
//! Sources that declare a square canvas are kept as authored. Everything
//! else is re-canvased: the editor's fitted viewBox gives the content
//! bounding box, from which a padded square canvas is computed and the
//! content is physically translated into its center. Rewriting only the
//! viewport is not enough, the font editor ignores viewBox metadata and
//! reads absolute path coordinates.

use anyhow::{Context, Result, bail};
use quick_xml::events::{BytesEnd, BytesStart, Event};
use quick_xml::{Reader, Writer};

/// Width/height difference below which a canvas counts as square.
const SQUARE_TOLERANCE: f64 = 0.01;

/// A parsed SVG canvas rectangle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Canvas {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

/// True if the canvas is square within tolerance.
pub fn is_square(width: f64, height: f64) -> bool {
    width > 0.0 && height > 0.0 && (width - height).abs() <= SQUARE_TOLERANCE
}

/// Resolve the declared canvas size of a source document.
///
/// Returns `None` for documents usvg cannot parse; the caller treats those
/// as non-square and lets the fit path produce a proper canvas.
pub fn source_canvas_size(svg: &[u8]) -> Option<(f64, f64)> {
    let tree = usvg::Tree::from_data(svg, &usvg::Options::default()).ok()?;
    let size = tree.size();
    Some((f64::from(size.width()), f64::from(size.height())))
}

/// Parse the canvas of an exported document from its root element:
/// the viewBox when present, otherwise width/height attributes.
pub fn parse_canvas(svg: &[u8]) -> Option<Canvas> {
    let text = std::str::from_utf8(svg).ok()?;
    let mut reader = Reader::from_str(text);

    loop {
        match reader.read_event().ok()? {
            Event::Start(e) | Event::Empty(e) if e.local_name().as_ref() == b"svg" => {
                return canvas_from_root(&e);
            }
            Event::Eof => return None,
            _ => {}
        }
    }
}

fn canvas_from_root(e: &BytesStart<'_>) -> Option<Canvas> {
    if let Some(vb) = attr(e, b"viewBox") {
        let parts: Vec<f64> = vb
            .split(|c: char| c.is_whitespace() || c == ',')
            .filter(|s| !s.is_empty())
            .filter_map(|s| s.parse().ok())
            .collect();
        if let [x, y, width, height] = parts[..] {
            return Some(Canvas {
                x,
                y,
                width,
                height,
            });
        }
    }
    let width = parse_length(&attr(e, b"width")?)?;
    let height = parse_length(&attr(e, b"height")?)?;
    Some(Canvas {
        x: 0.0,
        y: 0.0,
        width,
        height,
    })
}

/// Parse an SVG length, tolerating a `px` suffix.
fn parse_length(value: &str) -> Option<f64> {
    value.trim().trim_end_matches("px").trim().parse().ok()
}

fn attr(e: &BytesStart<'_>, name: &[u8]) -> Option<String> {
    e.attributes()
        .flatten()
        .find(|a| a.key.as_ref() == name)
        .and_then(|a| a.unescape_value().ok())
        .map(|v| v.into_owned())
}

// ============================================================================
// Centering
// ============================================================================

/// Re-canvas a fitted document onto a padded square.
///
/// With content bounds `(x, y, w, h)` and padding fraction `p`:
/// `pad = h·p`, `size = max(w, h) + 2·pad`, and the content is wrapped in a
/// group translated by `((size − w)/2 − x, (size − h)/2 − y)` so its center
/// coincides with the canvas center. The new canvas is
/// `viewBox="0 0 size size"` with origin (0,0).
pub fn center_and_pad(svg: &[u8], padding_percent: f64) -> Result<Vec<u8>> {
    let canvas = parse_canvas(svg).context("fitted SVG declares no canvas")?;
    if canvas.width <= 0.0 || canvas.height <= 0.0 {
        bail!("fitted SVG has a degenerate canvas");
    }

    let pad = canvas.height * padding_percent;
    let size = canvas.width.max(canvas.height) + 2.0 * pad;
    let tx = (size - canvas.width) / 2.0 - canvas.x;
    let ty = (size - canvas.height) / 2.0 - canvas.y;

    let text = std::str::from_utf8(svg).context("SVG is not valid UTF-8")?;
    let mut reader = Reader::from_str(text);
    let mut writer = Writer::new(Vec::new());
    let mut depth = 0usize;

    loop {
        match reader.read_event().context("Failed to parse SVG")? {
            Event::Eof => break,
            Event::Start(e) => {
                if depth == 0 && e.local_name().as_ref() == b"svg" {
                    writer.write_event(Event::Start(recanvas_root(&e, size)))?;
                    writer.write_event(Event::Start(translate_group(tx, ty)))?;
                } else {
                    writer.write_event(Event::Start(e.into_owned()))?;
                }
                depth += 1;
            }
            Event::End(e) => {
                depth = depth.saturating_sub(1);
                if depth == 0 && e.local_name().as_ref() == b"svg" {
                    writer.write_event(Event::End(BytesEnd::new("g")))?;
                }
                writer.write_event(Event::End(e.into_owned()))?;
            }
            Event::Empty(e) => {
                if depth == 0 && e.local_name().as_ref() == b"svg" {
                    // No content to translate; still rewrite the canvas.
                    writer.write_event(Event::Empty(recanvas_root(&e, size)))?;
                } else {
                    writer.write_event(Event::Empty(e.into_owned()))?;
                }
            }
            ev => writer.write_event(ev.into_owned())?,
        }
    }

    Ok(writer.into_inner())
}

/// Root element with the canvas rewritten to a `size × size` square at (0,0).
fn recanvas_root(e: &BytesStart<'_>, size: f64) -> BytesStart<'static> {
    let name = String::from_utf8_lossy(e.name().as_ref()).into_owned();
    let mut out = BytesStart::new(name);
    for a in e.attributes().flatten() {
        let key = String::from_utf8_lossy(a.key.as_ref()).into_owned();
        if matches!(key.as_str(), "width" | "height" | "viewBox" | "x" | "y") {
            continue;
        }
        let value = a.unescape_value().unwrap_or_default();
        out.push_attribute((key.as_str(), value.as_ref()));
    }
    let dim = fmt_coord(size);
    out.push_attribute(("width", dim.as_str()));
    out.push_attribute(("height", dim.as_str()));
    out.push_attribute(("viewBox", format!("0 0 {dim} {dim}").as_str()));
    out
}

fn translate_group(tx: f64, ty: f64) -> BytesStart<'static> {
    let mut g = BytesStart::new("g");
    g.push_attribute((
        "transform",
        format!("translate({},{})", fmt_coord(tx), fmt_coord(ty)).as_str(),
    ));
    g
}

/// Fixed 4-decimal formatting keeps the output stable across runs.
fn fmt_coord(v: f64) -> String {
    format!("{v:.4}")
}
