//! Build orchestration.
//!
//! State machine per run:
//! scan → diff → normalize (per icon) → persist cache → decide rebuild →
//! skip | full regenerate → cleanup scratch.
//!
//! The cache tracks *source* state only; output completeness is re-verified
//! every run, so a manually deleted artifact forces regeneration even with
//! zero source changes. A rebuild always regenerates the entire glyph table,
//! outline font and all size variants together, because codepoint assignment
//! is a function of the whole ordered icon set.

use anyhow::{Context, Result, bail};
use rustc_hash::FxHashSet;
use std::fs;
use std::path::Path;

use crate::cache::{self, SourceIcon};
use crate::config::IconConfig;
use crate::font::{assemble, bitmap, header};
use crate::freshness::compute_file_hash;
use crate::normalize;
use crate::utils::plural::plural_count;
use crate::utils::scratch::ScratchDir;
use crate::{debug, log, logger};

/// What a run did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildOutcome {
    /// No source changes and all artifacts present; nothing was written
    /// except the refreshed cache record.
    Skip,
    /// Full regeneration ran.
    Rebuilt { glyphs: usize, sizes: usize },
}

/// Run the pipeline once.
pub fn run(config: &IconConfig) -> Result<BuildOutcome> {
    let source_dir = &config.paths.source_dir;
    if !source_dir.is_dir() {
        // Configuration-fatal: abort before touching the cache.
        bail!("source directory not found: {}", source_dir.display());
    }

    debug!("build"; "source: {}", source_dir.display());
    debug!("build"; "font:   {}", config.paths.font_dir.display());
    debug!("build"; "header: {}", config.paths.header_dir.display());
    debug!("build"; "cache:  {}", config.paths.cache_dir.display());

    let normalized_dir = config.normalized_dir();
    for dir in [
        &config.paths.cache_dir,
        &normalized_dir,
        &config.paths.font_dir,
        &config.paths.header_dir,
    ] {
        fs::create_dir_all(dir).with_context(|| format!("Failed to create {}", dir.display()))?;
    }

    // Cleared again on drop, on every exit path.
    let scratch = ScratchDir::acquire(&config.scratch_dir())?;

    // Scan + diff
    let sources = scan_sources(source_dir)?;
    log!("build"; "processing {}", plural_count(sources.len(), "icon"));

    let old_entries = cache::load(&config.paths.cache_dir);
    let diff = cache::diff(&old_entries, &sources, &normalized_dir);

    for id in &diff.added {
        logger::added(id);
    }
    for id in &diff.modified {
        logger::modified(id);
    }
    for id in &diff.removed {
        logger::removed(id);
    }
    for id in &diff.unchanged {
        logger::unchanged(id);
    }

    // Normalize stale icons (parallel; failures are per-icon warnings)
    let stale_ids: FxHashSet<&str> = diff.stale().collect();
    let stale: Vec<&SourceIcon> = sources
        .iter()
        .filter(|s| stale_ids.contains(s.id.as_str()))
        .collect();
    let failed = normalize::normalize_all(config, &stale, &scratch);
    if !failed.is_empty() {
        logger::warn(&format!(
            "{} failed normalization",
            plural_count(failed.len(), "icon")
        ));
    }
    logger::success(&format!("icons: {}", diff.summary()));

    // Persist the full digest set exactly once, before the rebuild stages:
    // a stage-fatal abort still leaves an accurate record for the next run.
    cache::persist(&config.paths.cache_dir, &cache::entries_for(&sources))?;

    if !diff.has_changes() && !artifacts_missing(config) {
        log!("build"; "no changes, font up to date");
        return Ok(BuildOutcome::Skip);
    }

    // Full regeneration
    let icons = normalize::collect_normalized(&normalized_dir)?;
    log!("font"; "assembling {}", plural_count(icons.len(), "glyph"));
    let table = assemble::assemble(config, &icons, &scratch)?;
    logger::success(&format!(
        "{} ({})",
        config.ttf_path().display(),
        plural_count(table.len(), "glyph")
    ));

    header::emit(config, &table)?;
    logger::success(&format!("{}", config.header_path().display()));

    let px_list: Vec<String> = config
        .bitmap
        .sizes
        .iter()
        .map(|s| format!("{}px", s.px))
        .collect();
    log!("bitmap"; "packing {}", px_list.join(", "));
    let sizes = bitmap::pack_all(config, &table, &config.ttf_path(), &scratch);

    log!("build"; "done ({}, {})",
        plural_count(table.len(), "glyph"),
        plural_count(sizes, "size"));
    Ok(BuildOutcome::Rebuilt {
        glyphs: table.len(),
        sizes,
    })
}

/// Scan the source directory for SVG icons, sorted by case-insensitive
/// identifier. Unreadable files are skipped with a warning.
fn scan_sources(source_dir: &Path) -> Result<Vec<SourceIcon>> {
    let mut sources = Vec::new();
    let entries = fs::read_dir(source_dir)
        .with_context(|| format!("Failed to read {}", source_dir.display()))?;

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
        let Some(id) = path.file_stem().and_then(|s| s.to_str()) else {
            continue;
        };

        let digest = compute_file_hash(&path);
        if digest.is_empty() {
            logger::warn(&format!("{id}: unreadable, skipped"));
            continue;
        }
        sources.push(SourceIcon {
            id: id.to_string(),
            path,
            digest,
        });
    }

    sources.sort_by_key(|s| s.id.to_lowercase());
    Ok(sources)
}

/// True if any expected output artifact is missing from disk.
fn artifacts_missing(config: &IconConfig) -> bool {
    if !config.ttf_path().exists() || !config.header_path().exists() {
        return true;
    }
    let data_dir = config.data_dir();
    config
        .bitmap
        .sizes
        .iter()
        .any(|s| !data_dir.join(format!("{}.c.inc", config.bin_stem(s.px))).exists())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{IconConfig, test_parse_config};
    use tempfile::TempDir;

    /// Config rooted in a temp directory with the standard layout created.
    fn temp_config(dir: &TempDir) -> IconConfig {
        let mut config = test_parse_config("");
        config.paths.source_dir = dir.path().join("icons");
        config.paths.font_dir = dir.path().join("font");
        config.paths.header_dir = dir.path().join("include");
        config.paths.cache_dir = dir.path().join(".icon-cache");
        config
    }

    /// Create every output artifact the rebuild decision checks for.
    fn create_artifacts(config: &IconConfig) {
        fs::create_dir_all(&config.paths.font_dir).unwrap();
        fs::create_dir_all(config.data_dir()).unwrap();
        fs::write(config.ttf_path(), "ttf").unwrap();
        fs::write(config.header_path(), "hpp").unwrap();
        for size in &config.bitmap.sizes {
            let name = format!("{}.c.inc", config.bin_stem(size.px));
            fs::write(config.data_dir().join(name), "inc").unwrap();
        }
    }

    #[test]
    fn test_missing_source_dir_is_fatal_before_cache() {
        let dir = TempDir::new().unwrap();
        let config = temp_config(&dir);

        let err = run(&config).unwrap_err();
        assert!(format!("{err}").contains("source directory not found"));
        // The cache was never touched
        assert!(!config.paths.cache_dir.exists());
    }

    #[test]
    fn test_scan_sources_sorted_and_filtered() {
        let dir = TempDir::new().unwrap();
        let src = dir.path().join("icons");
        fs::create_dir_all(&src).unwrap();
        for name in ["Mute.svg", "arrow_left.svg", "solo.SVG", "readme.md"] {
            fs::write(src.join(name), "<svg/>").unwrap();
        }

        let sources = scan_sources(&src).unwrap();
        let ids: Vec<_> = sources.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, vec!["arrow_left", "Mute", "solo"]);
        assert!(sources.iter().all(|s| !s.digest.is_empty()));
    }

    #[test]
    fn test_artifacts_missing() {
        let dir = TempDir::new().unwrap();
        let config = temp_config(&dir);

        // Nothing exists yet
        assert!(artifacts_missing(&config));

        create_artifacts(&config);
        assert!(!artifacts_missing(&config));

        // Deleting any single artifact flips the decision
        fs::remove_file(config.ttf_path()).unwrap();
        assert!(artifacts_missing(&config));
        create_artifacts(&config);

        let one_size = config.data_dir().join(format!(
            "{}.c.inc",
            config.bin_stem(config.bitmap.sizes[0].px)
        ));
        fs::remove_file(one_size).unwrap();
        assert!(artifacts_missing(&config));
    }

    #[test]
    fn test_noop_run_skips_without_external_tools() {
        // Unchanged sources + all artifacts present: the run must decide
        // Skip without invoking any external tool, and must leave the
        // outline font untouched.
        let dir = TempDir::new().unwrap();
        let mut config = temp_config(&dir);
        // Point the editors at nonexistent binaries; a Skip run never
        // spawns them, so this only fails if the decision is wrong.
        config.tools.inkscape = dir.path().join("no-such-inkscape");
        config.tools.fontforge = dir.path().join("no-such-fontforge");

        fs::create_dir_all(&config.paths.source_dir).unwrap();
        let icon_path = config.paths.source_dir.join("mute.svg");
        fs::write(&icon_path, "<svg width=\"24\" height=\"24\"/>").unwrap();

        // Previous run state: record + normalized file + artifacts
        fs::create_dir_all(config.normalized_dir()).unwrap();
        fs::write(config.normalized_dir().join("mute.svg"), "<svg/>").unwrap();
        let mut entries = cache::HashEntries::new();
        entries.insert("mute".into(), compute_file_hash(&icon_path).to_hex());
        fs::create_dir_all(&config.paths.cache_dir).unwrap();
        cache::persist(&config.paths.cache_dir, &entries).unwrap();
        create_artifacts(&config);

        let outcome = run(&config).unwrap();
        assert_eq!(outcome, BuildOutcome::Skip);
        assert_eq!(fs::read_to_string(config.ttf_path()).unwrap(), "ttf");

        // The record was still rewritten with the current digest set
        let reloaded = cache::load(&config.paths.cache_dir);
        assert_eq!(reloaded, entries);
    }

    #[test]
    fn test_touched_identical_source_still_noop() {
        // Rewriting a source with identical bytes (new mtime) must not mark
        // it modified: content hash is authoritative.
        let dir = TempDir::new().unwrap();
        let mut config = temp_config(&dir);
        config.tools.inkscape = dir.path().join("no-such-inkscape");
        config.tools.fontforge = dir.path().join("no-such-fontforge");

        fs::create_dir_all(&config.paths.source_dir).unwrap();
        let icon_path = config.paths.source_dir.join("solo.svg");
        fs::write(&icon_path, "<svg/>").unwrap();

        fs::create_dir_all(config.normalized_dir()).unwrap();
        fs::write(config.normalized_dir().join("solo.svg"), "<svg/>").unwrap();
        let mut entries = cache::HashEntries::new();
        entries.insert("solo".into(), compute_file_hash(&icon_path).to_hex());
        fs::create_dir_all(&config.paths.cache_dir).unwrap();
        cache::persist(&config.paths.cache_dir, &entries).unwrap();
        create_artifacts(&config);

        // "touch": rewrite the same bytes
        fs::write(&icon_path, "<svg/>").unwrap();

        assert_eq!(run(&config).unwrap(), BuildOutcome::Skip);
    }

    #[test]
    fn test_scratch_cleared_after_run() {
        let dir = TempDir::new().unwrap();
        let mut config = temp_config(&dir);
        config.tools.inkscape = dir.path().join("no-such-inkscape");
        config.tools.fontforge = dir.path().join("no-such-fontforge");

        fs::create_dir_all(&config.paths.source_dir).unwrap();
        create_artifacts(&config);
        fs::create_dir_all(config.normalized_dir()).unwrap();
        fs::create_dir_all(&config.paths.cache_dir).unwrap();
        cache::persist(&config.paths.cache_dir, &cache::HashEntries::new()).unwrap();

        let _ = run(&config);
        let scratch = config.scratch_dir();
        assert!(scratch.exists());
        assert_eq!(fs::read_dir(&scratch).unwrap().count(), 0);
    }
}
