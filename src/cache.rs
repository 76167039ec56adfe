//! Hash cache: persisted identifier → digest record plus the run diff.
//!
//! The record answers "did this input change since last run?". It is
//! recomputed fully in memory each run and rewritten atomically (temp file +
//! rename) exactly once, so a crash mid-run can only under-count work on the
//! next run, never corrupt the record.

use anyhow::{Context, Result};
use owo_colors::OwoColorize;
use rustc_hash::FxHashSet;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::debug;
use crate::freshness::ContentHash;

/// File name of the persisted cache record, inside the cache directory.
pub const CACHE_FILE: &str = "hashes.json";

/// Identifier → hex digest, in deterministic (sorted) order.
pub type HashEntries = BTreeMap<String, String>;

/// One scanned source icon.
#[derive(Debug, Clone)]
pub struct SourceIcon {
    /// Stable identifier, derived from the file stem.
    pub id: String,
    /// Absolute path of the source file.
    pub path: PathBuf,
    /// Content digest of the source bytes.
    pub digest: ContentHash,
}

impl SourceIcon {
    /// Path of this icon's normalized counterpart in the side cache.
    pub fn normalized_path(&self, normalized_dir: &Path) -> PathBuf {
        normalized_dir.join(format!("{}.svg", self.id))
    }
}

// ============================================================================
// Record I/O
// ============================================================================

/// Load the cache record. A missing or unreadable record yields an empty
/// map, which classifies every source as added (full rebuild).
pub fn load(cache_dir: &Path) -> HashEntries {
    let path = cache_dir.join(CACHE_FILE);
    let content = match fs::read_to_string(&path) {
        Ok(c) => c,
        Err(_) => return HashEntries::new(),
    };
    match serde_json::from_str(&content) {
        Ok(entries) => entries,
        Err(e) => {
            debug!("cache"; "ignoring corrupt record {}: {}", path.display(), e);
            HashEntries::new()
        }
    }
}

/// Persist the cache record atomically: write a sibling temp file, then
/// rename over the record.
pub fn persist(cache_dir: &Path, entries: &HashEntries) -> Result<()> {
    let path = cache_dir.join(CACHE_FILE);
    let tmp = cache_dir.join(format!("{CACHE_FILE}.tmp"));

    let json = serde_json::to_string_pretty(entries)?;
    fs::write(&tmp, json).with_context(|| format!("Failed to write {}", tmp.display()))?;
    fs::rename(&tmp, &path)
        .with_context(|| format!("Failed to replace {}", path.display()))?;
    Ok(())
}

/// Build the record for the current source set.
pub fn entries_for(sources: &[SourceIcon]) -> HashEntries {
    sources
        .iter()
        .map(|s| (s.id.clone(), s.digest.to_hex()))
        .collect()
}

// ============================================================================
// Diff
// ============================================================================

/// Classification of the current source set against the previous record.
#[derive(Debug, Default)]
pub struct IconDiff {
    pub added: Vec<String>,
    pub modified: Vec<String>,
    pub removed: Vec<String>,
    pub unchanged: Vec<String>,
}

impl IconDiff {
    /// True if any icon was added, modified or removed this run.
    pub fn has_changes(&self) -> bool {
        !self.added.is_empty() || !self.modified.is_empty() || !self.removed.is_empty()
    }

    /// Identifiers that need (re-)normalization this run.
    pub fn stale(&self) -> impl Iterator<Item = &str> {
        self.added
            .iter()
            .chain(self.modified.iter())
            .map(String::as_str)
    }

    /// Colored one-line summary in the `+a ~m -r =u` form.
    pub fn summary(&self) -> String {
        let mut parts = Vec::new();
        if !self.added.is_empty() {
            parts.push(format!("+{}", self.added.len()).green().to_string());
        }
        if !self.modified.is_empty() {
            parts.push(format!("~{}", self.modified.len()).yellow().to_string());
        }
        if !self.removed.is_empty() {
            parts.push(format!("-{}", self.removed.len()).red().to_string());
        }
        if !self.unchanged.is_empty() {
            parts.push(format!("={}", self.unchanged.len()).dimmed().to_string());
        }
        if parts.is_empty() {
            parts.push("=0".dimmed().to_string());
        }
        parts.join(" ")
    }
}

/// Classify current sources against the previous record.
///
/// An icon is *added* if absent from the record, *modified* if its digest
/// differs or its normalized cache file is missing from disk (self-healing),
/// *removed* if recorded but no longer present, otherwise *unchanged*.
///
/// Side effect: removed identifiers' normalized cache files are deleted.
pub fn diff(old: &HashEntries, sources: &[SourceIcon], normalized_dir: &Path) -> IconDiff {
    let mut out = IconDiff::default();
    let current: FxHashSet<&str> = sources.iter().map(|s| s.id.as_str()).collect();

    for icon in sources {
        match old.get(&icon.id) {
            None => out.added.push(icon.id.clone()),
            Some(recorded) if recorded != &icon.digest.to_hex() => {
                out.modified.push(icon.id.clone());
            }
            Some(_) => {
                if icon.normalized_path(normalized_dir).exists() {
                    out.unchanged.push(icon.id.clone());
                } else {
                    // Normalized file lost (cache wiped, partial crash):
                    // regenerate even though the digest matches.
                    out.modified.push(icon.id.clone());
                }
            }
        }
    }

    for id in old.keys() {
        if !current.contains(id.as_str()) {
            let stale_file = normalized_dir.join(format!("{id}.svg"));
            if stale_file.exists() {
                let _ = fs::remove_file(&stale_file);
            }
            out.removed.push(id.clone());
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn icon(dir: &Path, id: &str, content: &str) -> SourceIcon {
        let path = dir.join(format!("{id}.svg"));
        fs::write(&path, content).unwrap();
        SourceIcon {
            id: id.to_string(),
            digest: crate::freshness::compute_file_hash(&path),
            path,
        }
    }

    #[test]
    fn test_load_missing_record() {
        let dir = TempDir::new().unwrap();
        assert!(load(dir.path()).is_empty());
    }

    #[test]
    fn test_load_corrupt_record() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join(CACHE_FILE), "{not json").unwrap();
        assert!(load(dir.path()).is_empty());
    }

    #[test]
    fn test_persist_roundtrip() {
        let dir = TempDir::new().unwrap();
        let mut entries = HashEntries::new();
        entries.insert("mute".into(), "ab".repeat(32));
        persist(dir.path(), &entries).unwrap();

        assert_eq!(load(dir.path()), entries);
        // No temp file left behind
        assert!(!dir.path().join(format!("{CACHE_FILE}.tmp")).exists());
    }

    #[test]
    fn test_diff_added_modified_unchanged() {
        let dir = TempDir::new().unwrap();
        let norm = dir.path().join("svg");
        fs::create_dir_all(&norm).unwrap();

        let a = icon(dir.path(), "arrow_left", "<svg>a</svg>");
        let b = icon(dir.path(), "mute", "<svg>b</svg>");
        let c = icon(dir.path(), "solo", "<svg>c</svg>");

        // a recorded with matching digest + normalized file present,
        // b recorded with a stale digest, c unknown.
        fs::write(norm.join("arrow_left.svg"), "n").unwrap();
        let mut old = HashEntries::new();
        old.insert("arrow_left".into(), a.digest.to_hex());
        old.insert("mute".into(), "0".repeat(64));

        let sources = vec![a, b, c];
        let d = diff(&old, &sources, &norm);

        assert_eq!(d.added, vec!["solo"]);
        assert_eq!(d.modified, vec!["mute"]);
        assert_eq!(d.unchanged, vec!["arrow_left"]);
        assert!(d.removed.is_empty());
        assert!(d.has_changes());
    }

    #[test]
    fn test_diff_self_healing_missing_normalized_file() {
        let dir = TempDir::new().unwrap();
        let norm = dir.path().join("svg");
        fs::create_dir_all(&norm).unwrap();

        let a = icon(dir.path(), "solo", "<svg/>");
        let mut old = HashEntries::new();
        old.insert("solo".into(), a.digest.to_hex());

        // Digest matches but the normalized file does not exist.
        let d = diff(&old, &[a], &norm);
        assert_eq!(d.modified, vec!["solo"]);
        assert!(d.unchanged.is_empty());
    }

    #[test]
    fn test_diff_removed_deletes_normalized_file() {
        let dir = TempDir::new().unwrap();
        let norm = dir.path().join("svg");
        fs::create_dir_all(&norm).unwrap();
        fs::write(norm.join("gone.svg"), "n").unwrap();

        let mut old = HashEntries::new();
        old.insert("gone".into(), "0".repeat(64));

        let d = diff(&old, &[], &norm);
        assert_eq!(d.removed, vec!["gone"]);
        assert!(!norm.join("gone.svg").exists());
    }

    #[test]
    fn test_cache_symmetry_after_add_and_remove() {
        // After adding X and removing Y in one run, the new record contains
        // X and not Y.
        let dir = TempDir::new().unwrap();
        let x = icon(dir.path(), "x", "<svg>x</svg>");

        let mut old = HashEntries::new();
        old.insert("y".into(), "0".repeat(64));

        let sources = vec![x.clone()];
        let entries = entries_for(&sources);
        assert_eq!(entries.get("x"), Some(&x.digest.to_hex()));
        assert!(!entries.contains_key("y"));
    }

    #[test]
    fn test_no_changes() {
        let dir = TempDir::new().unwrap();
        let norm = dir.path().join("svg");
        fs::create_dir_all(&norm).unwrap();
        fs::write(norm.join("a.svg"), "n").unwrap();

        let a = icon(dir.path(), "a", "<svg/>");
        let mut old = HashEntries::new();
        old.insert("a".into(), a.digest.to_hex());

        let d = diff(&old, &[a], &norm);
        assert!(!d.has_changes());
        assert_eq!(d.stale().count(), 0);
    }
}
