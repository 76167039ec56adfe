//! Vector normalization: raw SVG sources into canonical, centered,
//! square-canvas icons.
//!
//! Per icon: stroke-to-path conversion (external editor), XML cleanup
//! (in-process), then canvas normalization. Each icon's transform is pure
//! given its own source bytes plus configuration, so the set runs in
//! parallel; an icon that fails is dropped from this run's glyph set with a
//! warning, never aborting the build.

pub mod canvas;
pub mod cleanup;
pub mod editor;

use anyhow::{Context, Result};
use rayon::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};

use crate::cache::SourceIcon;
use crate::config::IconConfig;
use crate::logger;
use crate::utils::scratch::ScratchDir;

/// One icon in the normalized-icon side cache.
#[derive(Debug, Clone)]
pub struct NormalizedIcon {
    /// Stable identifier (file stem).
    pub id: String,
    /// Absolute path of the normalized SVG.
    pub path: PathBuf,
}

/// Normalize every stale icon, in parallel. Returns the identifiers that
/// failed; each failure has already been logged as a warning.
pub fn normalize_all(
    config: &IconConfig,
    icons: &[&SourceIcon],
    scratch: &ScratchDir,
) -> Vec<String> {
    let mut failed: Vec<String> = icons
        .par_iter()
        .filter_map(|icon| match normalize_icon(config, icon, scratch) {
            Ok(()) => None,
            Err(e) => {
                logger::warn(&format!("{} failed: {:#}", icon.id, e));
                // Drop any stale normalized file from a previous version so
                // the old outline cannot sneak into this build, and so the
                // self-healing rule retries the icon next run.
                let _ = fs::remove_file(icon.normalized_path(&config.normalized_dir()));
                Some(icon.id.clone())
            }
        })
        .collect();
    failed.sort();
    failed
}

/// Normalize a single icon into the side cache.
pub fn normalize_icon(config: &IconConfig, icon: &SourceIcon, scratch: &ScratchDir) -> Result<()> {
    let out_path = icon.normalized_path(&config.normalized_dir());

    // 1. Strokes and shapes into fill paths.
    let paths_svg = scratch.file(&format!("{}.paths.svg", icon.id));
    editor::convert_to_paths(&config.tools.inkscape, &icon.path, &paths_svg)?;

    // 2. Strip metadata, invisible shapes and style attributes.
    let exported = fs::read(&paths_svg)
        .with_context(|| format!("Failed to read {}", paths_svg.display()))?;
    let cleaned = cleanup::clean_svg(&exported)?;

    // 3a. Square source canvas: the author's proportions are authoritative.
    let source = fs::read(&icon.path)
        .with_context(|| format!("Failed to read {}", icon.path.display()))?;
    if let Some((w, h)) = canvas::source_canvas_size(&source)
        && canvas::is_square(w, h)
    {
        fs::write(&out_path, &cleaned)
            .with_context(|| format!("Failed to write {}", out_path.display()))?;
        return Ok(());
    }

    // 3b. Otherwise fit the drawing, then pad and center on a new square.
    let cleaned_svg = scratch.file(&format!("{}.clean.svg", icon.id));
    fs::write(&cleaned_svg, &cleaned)
        .with_context(|| format!("Failed to write {}", cleaned_svg.display()))?;

    let fitted_svg = scratch.file(&format!("{}.fit.svg", icon.id));
    editor::fit_to_drawing(&config.tools.inkscape, &cleaned_svg, &fitted_svg)?;

    let fitted = fs::read(&fitted_svg)
        .with_context(|| format!("Failed to read {}", fitted_svg.display()))?;
    let recanvased = canvas::center_and_pad(&fitted, config.font.padding_percent)?;

    fs::write(&out_path, &recanvased)
        .with_context(|| format!("Failed to write {}", out_path.display()))?;
    Ok(())
}

/// Collect the normalized icons currently on disk, ordered by
/// case-insensitive identifier. This order defines codepoint assignment.
pub fn collect_normalized(normalized_dir: &Path) -> Result<Vec<NormalizedIcon>> {
    let mut icons = Vec::new();
    let entries = fs::read_dir(normalized_dir)
        .with_context(|| format!("Failed to read {}", normalized_dir.display()))?;

    for entry in entries.flatten() {
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        let is_svg = path
            .extension()
            .is_some_and(|e| e.eq_ignore_ascii_case("svg"));
        if !is_svg {
            continue;
        }
        if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
            icons.push(NormalizedIcon {
                id: stem.to_string(),
                path,
            });
        }
    }

    icons.sort_by_key(|icon| icon.id.to_lowercase());
    Ok(icons)
}
