//! C++ header emission: named codepoint constants and the size selector.
//!
//! Output is byte-for-byte deterministic for a given glyph table and size
//! list; nothing time- or path-dependent is baked in.

use anyhow::{Context, Result};
use std::fs;

use crate::config::IconConfig;
use crate::font::table::{GlyphTable, utf8_literal};

/// Write the header to its configured location.
pub fn emit(config: &IconConfig, table: &GlyphTable) -> Result<()> {
    let path = config.header_path();
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    fs::write(&path, render(config, table))
        .with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(())
}

/// Render the full header.
pub fn render(config: &IconConfig, table: &GlyphTable) -> String {
    let bitmap = &config.bitmap;
    let (min_cp, max_cp) = table.codepoint_range().unwrap_or((0, 0));

    let size_members = bitmap
        .sizes
        .iter()
        .map(|s| format!("{} = {}", s.name, s.px))
        .collect::<Vec<_>>()
        .join(", ");

    let mut lines = vec![
        format!(
            "// Auto-generated | {} icons | U+{:04X}-U+{:04X}",
            table.len(),
            min_cp,
            max_cp
        ),
        "// Codepoints shift when icons are added or removed; bind to the".to_string(),
        "// named constants below, never to raw codepoint values.".to_string(),
        "#pragma once".to_string(),
        "#include <lvgl.h>".to_string(),
        format!("#include \"{}\"", bitmap.registry_include),
        String::new(),
        "namespace Icon {".to_string(),
        format!("    enum Size {{ {size_members} }};"),
        String::new(),
    ];

    for entry in table.entries() {
        lines.push(format!(
            "    constexpr const char* {} = \"{}\";",
            entry.symbolic_name(),
            utf8_literal(entry.codepoint)
        ));
    }

    let default_size = bitmap
        .default_size()
        .map(|s| s.name.clone())
        .unwrap_or_default();

    lines.push(String::new());
    lines.push(format!(
        "    inline void set(lv_obj_t* label, const char* icon, Size size = {default_size}) {{"
    ));
    lines.push(format!(
        "        lv_font_t* font = {};",
        selector_chain(config)
    ));
    lines.push("        lv_obj_set_style_text_font(label, font, 0);".to_string());
    lines.push("        lv_label_set_text(label, icon);".to_string());
    lines.push("    }".to_string());
    lines.push("}  // namespace Icon".to_string());

    lines.join("\n") + "\n"
}

/// Conditional chain resolving the externally-declared per-size font object.
fn selector_chain(config: &IconConfig) -> String {
    let bitmap = &config.bitmap;
    let registry = &bitmap.registry_object;
    let n = bitmap.sizes.len();

    let cases: Vec<String> = bitmap
        .sizes
        .iter()
        .enumerate()
        .map(|(i, s)| {
            let field = format!("{registry}.{}", s.name.to_lowercase());
            if i + 1 == n {
                field
            } else {
                format!("(size == {}) ? {field}", s.name)
            }
        })
        .collect();

    cases.join("\n                        : ")
}
