//! The glyph table: codepoint assignment, symbolic names, and the font
//! editor's stdout report parser.
//!
//! Codepoints form a contiguous block starting at the configured base,
//! assigned in case-insensitive lexicographic identifier order. The block is
//! NOT content-stable: inserting an icon shifts every icon sorting after it.
//! Symbolic names are stable; consumers must bind to those.

use crate::debug;

/// One assembled glyph: icon identifier and assigned codepoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GlyphEntry {
    pub name: String,
    pub codepoint: u32,
}

impl GlyphEntry {
    /// Sanitized uppercase identifier used for the emitted constant.
    pub fn symbolic_name(&self) -> String {
        symbolic_name(&self.name)
    }
}

/// Ordered set of `(name, codepoint)` pairs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GlyphTable {
    entries: Vec<GlyphEntry>,
}

impl GlyphTable {
    /// Assign sequential codepoints to identifiers, one per icon in
    /// case-insensitive lexicographic order starting at `base`.
    pub fn assign<'a, I>(ids: I, base: u32) -> Self
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut names: Vec<&str> = ids.into_iter().collect();
        names.sort_by_key(|n| n.to_lowercase());
        let entries = names
            .into_iter()
            .enumerate()
            .map(|(i, name)| GlyphEntry {
                name: name.to_string(),
                codepoint: base + i as u32,
            })
            .collect();
        Self { entries }
    }

    /// Parse the font editor's stdout report.
    ///
    /// The editor prints one `GLYPH|<codepoint>|<name>` line per imported
    /// glyph; all other output lines are ignored.
    pub fn parse_report(stdout: &str) -> Self {
        let mut entries = Vec::new();
        for line in stdout.lines() {
            let Some(rest) = line.trim().strip_prefix("GLYPH|") else {
                continue;
            };
            let Some((cp, name)) = rest.split_once('|') else {
                debug!("font"; "malformed report line: {}", line);
                continue;
            };
            let Ok(codepoint) = cp.parse::<u32>() else {
                debug!("font"; "malformed codepoint in report line: {}", line);
                continue;
            };
            entries.push(GlyphEntry {
                name: name.to_string(),
                codepoint,
            });
        }
        Self { entries }
    }

    pub fn entries(&self) -> &[GlyphEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Inclusive `(min, max)` codepoint range covered by the table.
    pub fn codepoint_range(&self) -> Option<(u32, u32)> {
        let min = self.entries.iter().map(|e| e.codepoint).min()?;
        let max = self.entries.iter().map(|e| e.codepoint).max()?;
        Some((min, max))
    }

    /// Icon identifiers in table order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.name.as_str())
    }
}

// ============================================================================
// Name and literal encoding
// ============================================================================

/// Sanitize an icon identifier into an uppercase constant name: runs of
/// non-alphanumeric characters collapse to a single underscore.
pub fn symbolic_name(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut pending_sep = false;
    for c in name.chars() {
        if c.is_ascii_alphanumeric() {
            if pending_sep && !out.is_empty() {
                out.push('_');
            }
            pending_sep = false;
            out.push(c.to_ascii_uppercase());
        } else {
            pending_sep = true;
        }
    }
    out
}

/// Encode a codepoint below 0x10000 as a C string escape sequence of its
/// UTF-8 bytes (1-3 bytes per the standard encoding rules).
pub fn utf8_literal(cp: u32) -> String {
    if cp < 0x80 {
        format!("\\x{cp:02X}")
    } else if cp < 0x800 {
        format!("\\x{:02X}\\x{:02X}", 0xC0 | (cp >> 6), 0x80 | (cp & 0x3F))
    } else {
        format!(
            "\\x{:02X}\\x{:02X}\\x{:02X}",
            0xE0 | (cp >> 12),
            0x80 | ((cp >> 6) & 0x3F),
            0x80 | (cp & 0x3F)
        )
    }
}
