//! Configuration section definitions for `iconforge.toml`.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use super::error::ConfigDiagnostics;

// ============================================================================
// [paths]
// ============================================================================

/// `[paths]` section: where sources, outputs and caches live.
///
/// Relative paths are resolved against the config file's directory; a
/// leading `~` is expanded. The cache record and the normalized-icon cache
/// are owned by this tool and safe to delete entirely (forces a full
/// rebuild).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    /// Directory of SVG icon sources.
    pub source_dir: PathBuf,
    /// Directory receiving the generated TTF.
    pub font_dir: PathBuf,
    /// Directory receiving the C++ header (binary fonts go to `data/` below it).
    pub header_dir: PathBuf,
    /// Cache directory: hash record, normalized SVGs, scratch space.
    pub cache_dir: PathBuf,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            source_dir: PathBuf::from("icons"),
            font_dir: PathBuf::from("font"),
            header_dir: PathBuf::from("src/ui/font"),
            cache_dir: PathBuf::from(".icon-cache"),
        }
    }
}

// ============================================================================
// [tools]
// ============================================================================

/// `[tools]` section: external executables.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolsConfig {
    /// Vector editor used for stroke-to-path conversion and drawing-area fit.
    pub inkscape: PathBuf,
    /// Font editor used to import outlines and emit the TTF.
    pub fontforge: PathBuf,
    /// Node package runner resolving `lv_font_conv`.
    pub npx: PathBuf,
}

impl Default for ToolsConfig {
    fn default() -> Self {
        Self {
            inkscape: PathBuf::from("inkscape"),
            fontforge: PathBuf::from("fontforge"),
            npx: PathBuf::from("npx"),
        }
    }
}

// ============================================================================
// [font]
// ============================================================================

/// `[font]` section: font identity and metric constants.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FontConfig {
    /// Base name for generated files and embedded symbols.
    pub name: String,
    /// Family name recorded in the font.
    pub family: String,
    /// Em square size in font units.
    pub units_per_em: u32,
    /// Ascent in font units.
    pub ascent: u32,
    /// Descent in font units (positive).
    pub descent: u32,
    /// Horizontal margin on each side of a glyph, in font units.
    pub glyph_margin: u32,
    /// First codepoint of the contiguous assignment block.
    pub base_codepoint: u32,
    /// Padding added around non-square icons, as a fraction of content height.
    pub padding_percent: f64,
}

impl Default for FontConfig {
    fn default() -> Self {
        Self {
            name: "app_icons".into(),
            family: "App Icons".into(),
            units_per_em: 1000,
            ascent: 800,
            descent: 200,
            glyph_margin: 50,
            base_codepoint: 0xE000,
            padding_percent: 0.08,
        }
    }
}

impl FontConfig {
    pub fn validate(&self, diag: &mut ConfigDiagnostics) {
        if self.units_per_em == 0 {
            diag.error("font.units_per_em", "must be positive");
        }
        if self.ascent + self.descent != self.units_per_em {
            diag.error_with_hint(
                "font.ascent",
                format!(
                    "ascent ({}) + descent ({}) must equal units_per_em ({})",
                    self.ascent, self.descent, self.units_per_em
                ),
                "the font editor derives the em square from ascent + descent",
            );
        }
        if self.base_codepoint >= 0x10000 {
            diag.error_with_hint(
                "font.base_codepoint",
                "must be below 0x10000",
                "the emitted header encodes codepoints as 1-3 byte UTF-8 literals",
            );
        }
        if !(0.0..=1.0).contains(&self.padding_percent) {
            diag.error("font.padding_percent", "must be between 0.0 and 1.0");
        }
        if self.name.is_empty() || !is_identifier(&self.name) {
            diag.error_with_hint(
                "font.name",
                format!("`{}` is not a valid symbol name", self.name),
                "used as a C identifier prefix: letters, digits and underscores only",
            );
        }
    }
}

// ============================================================================
// [bitmap]
// ============================================================================

/// One target pixel size: `{ name = "S16", px = 16 }`.
///
/// The name becomes a member of the emitted `Size` enum; config order is
/// preserved and the middle entry is the default selector.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SizeSpec {
    pub name: String,
    pub px: u32,
}

/// `[bitmap]` section: binary font packaging.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BitmapConfig {
    /// Target sizes, in selector order.
    pub sizes: Vec<SizeSpec>,
    /// Bits per pixel for the packed bitmaps.
    pub bpp: u32,
    /// Include providing the per-size font registry consumed by the
    /// emitted selector function.
    pub registry_include: String,
    /// Name of the registry object holding one font per size.
    pub registry_object: String,
}

impl Default for BitmapConfig {
    fn default() -> Self {
        Self {
            sizes: vec![
                SizeSpec { name: "S16".into(), px: 16 },
                SizeSpec { name: "S24".into(), px: 24 },
                SizeSpec { name: "S32".into(), px: 32 },
            ],
            bpp: 4,
            registry_include: "FontLoader.hpp".into(),
            registry_object: "icon_fonts".into(),
        }
    }
}

impl BitmapConfig {
    /// The default selector: the middle-indexed configured size.
    pub fn default_size(&self) -> Option<&SizeSpec> {
        self.sizes.get(self.sizes.len() / 2)
    }

    pub fn validate(&self, diag: &mut ConfigDiagnostics) {
        if self.sizes.is_empty() {
            diag.error("bitmap.sizes", "at least one target size is required");
        }
        for size in &self.sizes {
            if size.px == 0 {
                diag.error("bitmap.sizes", format!("`{}` has a zero pixel size", size.name));
            }
            if !is_identifier(&size.name) {
                diag.error_with_hint(
                    "bitmap.sizes",
                    format!("`{}` is not a valid enum member name", size.name),
                    "letters, digits and underscores only, not starting with a digit",
                );
            }
        }
        let mut seen = std::collections::BTreeSet::new();
        for size in &self.sizes {
            if !seen.insert(size.name.as_str()) {
                diag.error("bitmap.sizes", format!("duplicate size name `{}`", size.name));
            }
        }
        if !matches!(self.bpp, 1 | 2 | 3 | 4 | 8) {
            diag.error_with_hint(
                "bitmap.bpp",
                format!("unsupported bits-per-pixel {}", self.bpp),
                "lv_font_conv accepts 1, 2, 3, 4 or 8",
            );
        }
    }
}

/// Check that a string is usable as a C/C++ identifier.
fn is_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_font_defaults_are_valid() {
        let mut diag = ConfigDiagnostics::new();
        FontConfig::default().validate(&mut diag);
        assert!(!diag.has_errors());
    }

    #[test]
    fn test_metrics_mismatch_rejected() {
        let mut diag = ConfigDiagnostics::new();
        let font = FontConfig {
            ascent: 700,
            ..Default::default()
        };
        font.validate(&mut diag);
        assert!(diag.has_errors());
    }

    #[test]
    fn test_base_codepoint_limit() {
        let mut diag = ConfigDiagnostics::new();
        let font = FontConfig {
            base_codepoint: 0x10000,
            ..Default::default()
        };
        font.validate(&mut diag);
        assert!(diag.has_errors());
    }

    #[test]
    fn test_default_size_is_middle() {
        let bitmap = BitmapConfig::default();
        assert_eq!(bitmap.default_size().unwrap().name, "S24");

        let two = BitmapConfig {
            sizes: vec![
                SizeSpec { name: "A".into(), px: 12 },
                SizeSpec { name: "B".into(), px: 20 },
            ],
            ..Default::default()
        };
        assert_eq!(two.default_size().unwrap().name, "B");
    }

    #[test]
    fn test_duplicate_size_names_rejected() {
        let mut diag = ConfigDiagnostics::new();
        let bitmap = BitmapConfig {
            sizes: vec![
                SizeSpec { name: "S16".into(), px: 16 },
                SizeSpec { name: "S16".into(), px: 18 },
            ],
            ..Default::default()
        };
        bitmap.validate(&mut diag);
        assert!(diag.has_errors());
    }

    #[test]
    fn test_bad_bpp_rejected() {
        let mut diag = ConfigDiagnostics::new();
        let bitmap = BitmapConfig {
            bpp: 5,
            ..Default::default()
        };
        bitmap.validate(&mut diag);
        assert!(diag.has_errors());
    }

    #[test]
    fn test_is_identifier() {
        assert!(is_identifier("S16"));
        assert!(is_identifier("_hidden"));
        assert!(!is_identifier("16px"));
        assert!(!is_identifier("bad-name"));
        assert!(!is_identifier(""));
    }
}
