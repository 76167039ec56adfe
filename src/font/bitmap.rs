//! Size-parameterized binary font packaging.
//!
//! Invokes `lv_font_conv` (resolved through npx) once per configured size
//! over the assembled TTF and the table's contiguous codepoint range, then
//! embeds the blob as a flash-resident byte array plus a declaration header.
//! A missing converter or a failing size is a warning; remaining sizes still
//! complete and the exit code is unaffected.

use anyhow::{Context, Result, bail};
use std::fs;
use std::path::Path;

use crate::config::{IconConfig, SizeSpec};
use crate::font::table::GlyphTable;
use crate::logger;
use crate::utils::exec::Cmd;
use crate::utils::scratch::ScratchDir;

/// Pack every configured size. Returns how many sizes completed.
pub fn pack_all(
    config: &IconConfig,
    table: &GlyphTable,
    ttf: &Path,
    scratch: &ScratchDir,
) -> usize {
    let Some((min_cp, max_cp)) = table.codepoint_range() else {
        return 0;
    };

    let npx = match which::which(&config.tools.npx) {
        Ok(path) => path,
        Err(_) => {
            logger::warn("npx not found, skipping binary fonts");
            logger::warn("install Node.js to get npx");
            return 0;
        }
    };

    let data_dir = config.data_dir();
    if let Err(e) = fs::create_dir_all(&data_dir) {
        logger::warn(&format!("cannot create {}: {e}", data_dir.display()));
        return 0;
    }

    let range = format!("0x{min_cp:04X}-0x{max_cp:04X}");
    let mut done = 0;
    for size in &config.bitmap.sizes {
        match pack_size(config, &npx, ttf, &range, size, &data_dir, scratch) {
            Ok(bytes) => {
                logger::success(&format!("{} ({bytes} bytes)", config.bin_stem(size.px)));
                done += 1;
            }
            Err(e) => logger::warn(&format!("size {}: {e:#}", size.px)),
        }
    }
    done
}

/// Pack one size: convert, then emit the byte array and its declaration
/// header. Returns the blob length.
fn pack_size(
    config: &IconConfig,
    npx: &Path,
    ttf: &Path,
    range: &str,
    size: &SizeSpec,
    data_dir: &Path,
    scratch: &ScratchDir,
) -> Result<usize> {
    let bin_path = scratch.file(&format!("{}.bin", config.bin_stem(size.px)));

    let output = Cmd::new(npx)
        .arg("lv_font_conv")
        .arg("--font")
        .arg(ttf)
        .arg("--size")
        .arg(size.px.to_string())
        .arg("--format")
        .arg("bin")
        .arg("--bpp")
        .arg(config.bitmap.bpp.to_string())
        .arg("--range")
        .arg(range)
        .arg("--no-kerning")
        .arg("-o")
        .arg(&bin_path)
        .output()?;

    if !output.status.success() || !bin_path.exists() {
        bail!("lv_font_conv failed");
    }

    let blob = fs::read(&bin_path)
        .with_context(|| format!("Failed to read {}", bin_path.display()))?;

    let stem = config.bin_stem(size.px);
    let symbol = config.bin_symbol(size.px);
    let bpp = config.bitmap.bpp;

    let inc_path = data_dir.join(format!("{stem}.c.inc"));
    fs::write(&inc_path, render_byte_array(&stem, &symbol, size.px, bpp, &blob))
        .with_context(|| format!("Failed to write {}", inc_path.display()))?;

    let hpp_path = data_dir.join(format!("{stem}.hpp"));
    fs::write(&hpp_path, render_decl_header(&stem, &symbol, size.px, bpp))
        .with_context(|| format!("Failed to write {}", hpp_path.display()))?;

    Ok(blob.len())
}

// ============================================================================
// Rendering
// ============================================================================

/// Byte-array source file: the blob verbatim, 16 bytes per row, kept in
/// read-only flash storage via PROGMEM.
pub fn render_byte_array(stem: &str, symbol: &str, px: u32, bpp: u32, blob: &[u8]) -> String {
    let rows: Vec<String> = blob
        .chunks(16)
        .map(|chunk| {
            chunk
                .iter()
                .map(|b| format!("0x{b:02x}"))
                .collect::<Vec<_>>()
                .join(", ")
        })
        .collect();

    format!(
        "// {stem} | {px}px | {bpp}bpp | {len} bytes\n\n\
         const uint8_t {symbol}[] PROGMEM = {{\n    {body}\n}};\n\
         const uint32_t {symbol}_len = {len};\n",
        len = blob.len(),
        body = rows.join(",\n    "),
    )
}

/// Companion declaration header exposing the array and its length.
pub fn render_decl_header(stem: &str, symbol: &str, px: u32, bpp: u32) -> String {
    format!(
        "// {stem} | {px}px | {bpp}bpp\n\
         #pragma once\n\
         #include <Arduino.h>\n\n\
         extern const uint8_t {symbol}[] PROGMEM;\n\
         extern const uint32_t {symbol}_len;\n"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_byte_array_rows() {
        let blob: Vec<u8> = (0..20).collect();
        let out = render_byte_array("panel_16", "panel_16_bin", 16, 4, &blob);

        assert!(out.contains("// panel_16 | 16px | 4bpp | 20 bytes"));
        assert!(out.contains("const uint8_t panel_16_bin[] PROGMEM = {"));
        // First row: 16 bytes, second row: remaining 4
        assert!(out.contains("0x00, 0x01"));
        assert!(out.contains("0x0f,\n    0x10"));
        assert!(out.contains("const uint32_t panel_16_bin_len = 20;"));
    }

    #[test]
    fn test_render_byte_array_exact_length_annotation() {
        let blob = vec![0xab; 3];
        let out = render_byte_array("x_8", "x_8_bin", 8, 1, &blob);
        assert!(out.contains("| 3 bytes"));
        assert!(out.contains("0xab, 0xab, 0xab\n};"));
        assert!(out.contains("x_8_bin_len = 3;"));
    }

    #[test]
    fn test_render_decl_header() {
        let out = render_decl_header("panel_16", "panel_16_bin", 16, 4);
        assert!(out.contains("#pragma once"));
        assert!(out.contains("#include <Arduino.h>"));
        assert!(out.contains("extern const uint8_t panel_16_bin[] PROGMEM;"));
        assert!(out.contains("extern const uint32_t panel_16_bin_len;"));
    }

    #[test]
    fn test_render_deterministic() {
        let blob = vec![1, 2, 3];
        assert_eq!(
            render_byte_array("a_16", "a_16_bin", 16, 4, &blob),
            render_byte_array("a_16", "a_16_bin", 16, 4, &blob)
        );
    }
}
