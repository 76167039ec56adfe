//! Outline-font assembly via the external font editor.
//!
//! Generates a FontForge batch script over the ordered normalized icons,
//! runs it, and parses the per-glyph report from its stdout. The editor
//! writes the TTF to scratch space; it is moved into place only after the
//! report yields a non-empty table, so a failed assembly never overwrites
//! the previous good font.

use anyhow::{Context, Result, bail};
use rustc_hash::FxHashSet;
use std::fs;
use std::path::Path;

use crate::config::IconConfig;
use crate::font::outline;
use crate::font::table::GlyphTable;
use crate::logger;
use crate::normalize::NormalizedIcon;
use crate::utils::exec::Cmd;
use crate::utils::scratch::ScratchDir;

/// Assemble the outline font from the full normalized icon set.
///
/// `icons` must already be in case-insensitive identifier order; codepoints
/// are taken sequentially from the configured base by the script, so only
/// successfully imported icons consume one (the block stays contiguous when
/// an import fails).
pub fn assemble(
    config: &IconConfig,
    icons: &[NormalizedIcon],
    scratch: &ScratchDir,
) -> Result<GlyphTable> {
    let planned = GlyphTable::assign(
        icons.iter().map(|i| i.id.as_str()),
        config.font.base_codepoint,
    );

    let scratch_ttf = scratch.file(&format!("{}.ttf", config.font.name));
    let script_path = scratch.file("generate_font.py");
    fs::write(&script_path, build_script(config, icons, &scratch_ttf))
        .with_context(|| format!("Failed to write {}", script_path.display()))?;

    let output = Cmd::new(&config.tools.fontforge)
        .arg("-script")
        .arg(&script_path)
        .output()?;

    let stdout = String::from_utf8_lossy(&output.stdout);
    let table = GlyphTable::parse_report(&stdout);
    if table.is_empty() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        let stderr = stderr.trim();
        if stderr.is_empty() {
            bail!("font editor produced zero glyphs");
        }
        bail!("font editor produced zero glyphs:\n{stderr}");
    }

    // Icons the editor dropped are excluded from this run only.
    let imported: FxHashSet<&str> = table.names().collect();
    for name in planned.names() {
        if !imported.contains(name) {
            logger::warn(&format!("{name}: outline import failed, excluded"));
        }
    }

    if !scratch_ttf.exists() {
        bail!("font editor did not write {}", scratch_ttf.display());
    }
    install(&scratch_ttf, &config.ttf_path())?;

    Ok(table)
}

/// Move the assembled font into place (rename, falling back to copy when
/// cache and output live on different filesystems).
fn install(from: &Path, to: &Path) -> Result<()> {
    if fs::rename(from, to).is_ok() {
        return Ok(());
    }
    fs::copy(from, to).with_context(|| format!("Failed to install {}", to.display()))?;
    let _ = fs::remove_file(from);
    Ok(())
}

/// Generate the FontForge batch script.
fn build_script(config: &IconConfig, icons: &[NormalizedIcon], ttf: &Path) -> String {
    let font = &config.font;
    let margin = font.glyph_margin;
    let notdef = outline::render_pen_calls("pen", &outline::notdef_outline(
        font.units_per_em,
        font.ascent,
    ));

    let entries: String = icons
        .iter()
        .map(|icon| {
            format!(
                "    (\"{}\", \"{}\"),\n",
                escape_py(&icon.id),
                escape_py(&icon.path.to_string_lossy())
            )
        })
        .collect();

    format!(
        r#"import sys
import fontforge

font = fontforge.font()
font.fontname = "{name}"
font.familyname = "{family}"
font.fullname = "{family} Regular"
font.em = {em}
font.ascent = {ascent}
font.descent = {descent}

glyph = font.createChar(-1, ".notdef")
pen = glyph.glyphPen()
{notdef}
pen = None
glyph.width = {em}

entries = [
{entries}]
cp = {base}
for name, path in entries:
    glyph = font.createChar(cp)
    try:
        glyph.importOutlines(path)
        glyph.removeOverlap()
        glyph.correctDirection()
        bbox = glyph.boundingBox()
        width = bbox[2] - bbox[0]
        glyph.transform([1, 0, 0, 1, {margin} - bbox[0], 0])
        glyph.width = int(width + 2 * {margin})
    except Exception as err:
        sys.stderr.write("SKIP|%s|%s\n" % (name, err))
        font.removeGlyph(glyph)
        continue
    print("GLYPH|%d|%s" % (cp, name))
    cp += 1

font.generate("{ttf}")
"#,
        name = escape_py(&font.name),
        family = escape_py(&font.family),
        em = font.units_per_em,
        ascent = font.ascent,
        descent = font.descent,
        notdef = notdef,
        entries = entries,
        base = font.base_codepoint,
        margin = margin,
        ttf = escape_py(&ttf.to_string_lossy()),
    )
}

/// Escape a string for inclusion in a double-quoted Python literal.
fn escape_py(s: &str) -> String {
    s.replace('\\', "\\\\").replace('"', "\\\"")
}
