//! Vector editor invocation (Inkscape batch mode).
//!
//! The editor signals failure through the absence of the export file more
//! reliably than through its exit code, so both invocations check the
//! output path instead of the status.

use anyhow::{Result, bail};
use std::path::Path;

use crate::utils::exec::Cmd;

/// Batch action list converting every shape and stroke into fill paths.
const TO_PATH_ACTIONS: &str =
    "select-all;object-to-path;select-all;object-stroke-to-path;export-plain-svg;export-do";

/// Convert all strokes/shapes in `src` to fill paths, exporting plain SVG
/// to `dst`.
pub fn convert_to_paths(inkscape: &Path, src: &Path, dst: &Path) -> Result<()> {
    let output = Cmd::new(inkscape)
        .arg(src)
        .arg("--export-type=svg")
        .arg("--export-plain-svg")
        .arg(format!("--export-filename={}", dst.display()))
        .arg(format!("--actions={TO_PATH_ACTIONS}"))
        .output()?;
    ensure_exported(dst, "stroke-to-path conversion", &output.stderr)
}

/// Export `src` with the canvas fitted to the drawing's bounding box.
///
/// The resulting viewBox is the editor's content bounding box; the canvas
/// normalization step reads it back to compute padding and centering.
pub fn fit_to_drawing(inkscape: &Path, src: &Path, dst: &Path) -> Result<()> {
    let output = Cmd::new(inkscape)
        .arg(src)
        .arg("--export-type=svg")
        .arg("--export-plain-svg")
        .arg("--export-area-drawing")
        .arg(format!("--export-filename={}", dst.display()))
        .output()?;
    ensure_exported(dst, "drawing-area fit", &output.stderr)
}

/// Check that the editor actually produced the export file.
fn ensure_exported(dst: &Path, what: &str, stderr: &[u8]) -> Result<()> {
    if dst.exists() {
        return Ok(());
    }
    let detail = String::from_utf8_lossy(stderr);
    let detail = detail.trim();
    if detail.is_empty() {
        bail!("{what} produced no output");
    }
    bail!("{what} produced no output:\n{detail}");
}
