//! Build configuration management for `iconforge.toml`.
//!
//! # Sections
//!
//! | Section    | Purpose                                          |
//! |------------|--------------------------------------------------|
//! | `[paths]`  | Source, output and cache directories             |
//! | `[tools]`  | External editor / converter executables          |
//! | `[font]`   | Font identity and metric constants               |
//! | `[bitmap]` | Target sizes, bit depth, registry include        |
//!
//! Every component receives an immutable `&IconConfig` at construction;
//! nothing reads global state.

mod error;
mod section;

pub use error::{ConfigDiagnostics, ConfigError};
pub use section::{BitmapConfig, FontConfig, PathsConfig, SizeSpec, ToolsConfig};

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};

use crate::log;
use crate::utils::path::{expand_against, normalize_path};

/// Root configuration structure representing iconforge.toml
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IconConfig {
    /// Absolute path to the config file (internal use only)
    #[serde(skip)]
    pub config_path: PathBuf,

    /// Project root directory - parent of config file (internal use only)
    #[serde(skip)]
    pub root: PathBuf,

    /// Directory layout
    #[serde(default)]
    pub paths: PathsConfig,

    /// External tool executables
    #[serde(default)]
    pub tools: ToolsConfig,

    /// Font identity and metrics
    #[serde(default)]
    pub font: FontConfig,

    /// Binary font packaging
    #[serde(default)]
    pub bitmap: BitmapConfig,
}

impl IconConfig {
    /// Load configuration from a config file path.
    pub fn load(config_path: &Path) -> Result<Self> {
        let config_path = normalize_path(config_path);
        let content = fs::read_to_string(&config_path)
            .map_err(|err| ConfigError::Io(config_path.clone(), err))?;

        let (mut config, ignored) = Self::parse_with_ignored(&content)?;
        if !ignored.is_empty() {
            Self::print_unknown_fields_warning(&ignored, &config_path);
        }

        config.config_path = config_path;
        config.finalize();
        config.validate()?;
        Ok(config)
    }

    /// Parse configuration from TOML string
    pub fn from_str(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content).map_err(ConfigError::Toml)?;
        Ok(config)
    }

    /// Parse TOML content, collecting any unknown fields.
    fn parse_with_ignored(content: &str) -> Result<(Self, Vec<String>)> {
        let mut ignored = Vec::new();
        let deserializer = toml::Deserializer::new(content);
        let config = serde_ignored::deserialize(deserializer, |path: serde_ignored::Path| {
            ignored.push(path.to_string());
        })
        .map_err(ConfigError::Toml)?;
        Ok((config, ignored))
    }

    /// Print warning about unknown fields.
    fn print_unknown_fields_warning(fields: &[String], path: &Path) {
        let display_path = path
            .file_name()
            .map(|n| n.to_string_lossy())
            .unwrap_or_else(|| path.to_string_lossy());
        log!("warning"; "ignoring unknown fields in {}:", display_path);
        for field in fields {
            eprintln!("- {field}");
        }
    }

    /// Resolve all paths to absolute form against the project root.
    fn finalize(&mut self) {
        let root = self
            .config_path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default();

        self.paths.source_dir = expand_against(&self.paths.source_dir, &root);
        self.paths.font_dir = expand_against(&self.paths.font_dir, &root);
        self.paths.header_dir = expand_against(&self.paths.header_dir, &root);
        self.paths.cache_dir = expand_against(&self.paths.cache_dir, &root);
        self.root = root;
    }

    /// Validate configuration, collecting all errors at once.
    pub fn validate(&self) -> Result<()> {
        let mut diag = ConfigDiagnostics::new();
        self.font.validate(&mut diag);
        self.bitmap.validate(&mut diag);
        diag.into_result()?;
        Ok(())
    }

    // ========================================================================
    // Derived locations
    // ========================================================================

    /// The generated outline font file.
    pub fn ttf_path(&self) -> PathBuf {
        self.paths.font_dir.join(format!("{}.ttf", self.font.name))
    }

    /// The generated C++ header.
    pub fn header_path(&self) -> PathBuf {
        self.paths.header_dir.join("Icon.hpp")
    }

    /// Directory of per-size byte-array files, under the header location.
    pub fn data_dir(&self) -> PathBuf {
        self.paths.header_dir.join("data")
    }

    /// Side cache of normalized icons.
    pub fn normalized_dir(&self) -> PathBuf {
        self.paths.cache_dir.join("svg")
    }

    /// Scratch space for editor exports and converter blobs.
    pub fn scratch_dir(&self) -> PathBuf {
        self.paths.cache_dir.join("temp")
    }

    /// Base name of the embedded byte array for one pixel size.
    pub fn bin_symbol(&self, px: u32) -> String {
        format!("{}_{}_bin", self.font.name, px)
    }

    /// Base name of the per-size output files.
    pub fn bin_stem(&self, px: u32) -> String {
        format!("{}_{}", self.font.name, px)
    }
}

// ============================================================================
// Test Helpers
// ============================================================================

/// Parse config from a TOML snippet, asserting there are no unknown fields
/// (catches config typos in tests).
#[cfg(test)]
pub fn test_parse_config(content: &str) -> IconConfig {
    let (parsed, ignored) = IconConfig::parse_with_ignored(content).unwrap();
    assert!(
        ignored.is_empty(),
        "test config has unknown fields: {:?}",
        ignored
    );
    parsed
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = test_parse_config("");
        assert_eq!(config.font.units_per_em, 1000);
        assert_eq!(config.font.base_codepoint, 0xE000);
        assert_eq!(config.bitmap.bpp, 4);
        assert_eq!(config.bitmap.sizes.len(), 3);
        assert_eq!(config.paths.source_dir, PathBuf::from("icons"));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_section_overrides() {
        let config = test_parse_config(
            r#"
[paths]
source_dir = "assets/svg"

[font]
name = "panel_icons"
base_codepoint = 0xF000

[bitmap]
bpp = 2
sizes = [{ name = "SMALL", px = 14 }, { name = "LARGE", px = 28 }]
"#,
        );
        assert_eq!(config.paths.source_dir, PathBuf::from("assets/svg"));
        assert_eq!(config.font.name, "panel_icons");
        assert_eq!(config.font.base_codepoint, 0xF000);
        assert_eq!(config.bitmap.bpp, 2);
        assert_eq!(config.bitmap.sizes[1].px, 28);
    }

    #[test]
    fn test_from_str_invalid_toml() {
        let result = IconConfig::from_str("[font\nname = \"x\"");
        assert!(result.is_err());
    }

    #[test]
    fn test_unknown_fields_detected() {
        let content = "[font]\nname = \"x\"\n[mystery]\nfield = 1";
        let (_, ignored) = IconConfig::parse_with_ignored(content).unwrap();
        assert!(ignored.iter().any(|f| f.contains("mystery")));
    }

    #[test]
    fn test_derived_locations() {
        let mut config = test_parse_config("[font]\nname = \"panel\"");
        config.paths.font_dir = PathBuf::from("/out/font");
        config.paths.header_dir = PathBuf::from("/out/include");
        config.paths.cache_dir = PathBuf::from("/out/.cache");

        assert_eq!(config.ttf_path(), PathBuf::from("/out/font/panel.ttf"));
        assert_eq!(config.header_path(), PathBuf::from("/out/include/Icon.hpp"));
        assert_eq!(config.data_dir(), PathBuf::from("/out/include/data"));
        assert_eq!(config.normalized_dir(), PathBuf::from("/out/.cache/svg"));
        assert_eq!(config.scratch_dir(), PathBuf::from("/out/.cache/temp"));
        assert_eq!(config.bin_symbol(16), "panel_16_bin");
        assert_eq!(config.bin_stem(16), "panel_16");
    }

    #[test]
    fn test_validation_rejects_bad_metrics() {
        let config = test_parse_config("[font]\nascent = 500\ndescent = 100");
        assert!(config.validate().is_err());
    }
}
