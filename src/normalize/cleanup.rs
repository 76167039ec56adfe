//! In-process SVG cleanup.
//!
//! Strips authoring metadata and editor-namespaced elements, drops invisible
//! fill-less shapes and empty containers, removes fill/style attributes from
//! path elements and forces an explicit non-zero fill rule. The font editor
//! only reads path geometry; everything else is noise that can break the
//! outline import.

use anyhow::{Context, Result};
use quick_xml::events::{BytesStart, Event};
use quick_xml::{Reader, Writer};

/// Editor/metadata namespaces stripped from elements and root attributes.
const STRIP_MARKERS: [&[u8]; 3] = [b"sodipodi", b"inkscape", b"rdf"];

/// Root attribute markers removed in addition to the element markers.
const ROOT_ATTR_MARKERS: [&[u8]; 5] = [b"sodipodi", b"inkscape", b"rdf", b"dc", b"cc"];

/// Clean one exported SVG document.
pub fn clean_svg(input: &[u8]) -> Result<Vec<u8>> {
    let text = std::str::from_utf8(input).context("SVG is not valid UTF-8")?;

    let mut reader = Reader::from_str(text);
    let mut events: Vec<Event<'static>> = Vec::new();
    loop {
        match reader.read_event().context("Failed to parse SVG")? {
            Event::Eof => break,
            ev => events.push(ev.into_owned()),
        }
    }

    let events = strip_elements(events);
    let events = drop_empty_containers(events);
    let events = rewrite_attributes(events);

    let mut writer = Writer::new(Vec::new());
    for ev in events {
        writer.write_event(ev)?;
    }
    Ok(writer.into_inner())
}

// ============================================================================
// Element stripping
// ============================================================================

/// Remove metadata/editor-namespaced subtrees and invisible fill-less shapes.
fn strip_elements(events: Vec<Event<'static>>) -> Vec<Event<'static>> {
    let mut out = Vec::with_capacity(events.len());
    let mut skip_depth: usize = 0;

    for ev in events {
        match &ev {
            Event::Start(e) => {
                if skip_depth > 0 {
                    skip_depth += 1;
                    continue;
                }
                if should_strip(e) {
                    skip_depth = 1;
                    continue;
                }
                out.push(ev);
            }
            Event::Empty(e) => {
                if skip_depth > 0 || should_strip(e) {
                    continue;
                }
                out.push(ev);
            }
            Event::End(_) => {
                if skip_depth > 0 {
                    skip_depth -= 1;
                    continue;
                }
                out.push(ev);
            }
            _ => {
                if skip_depth == 0 {
                    out.push(ev);
                }
            }
        }
    }
    out
}

/// True for elements that carry no glyph geometry.
fn should_strip(e: &BytesStart<'_>) -> bool {
    let qname = e.name();
    let name = qname.as_ref();
    if STRIP_MARKERS.iter().any(|m| contains(name, m)) || e.local_name().as_ref() == b"metadata" {
        return true;
    }

    // Invisible: explicit fill:none without a stroke that could outline it.
    let style = attr_value(e, b"style");
    let fill = attr_value(e, b"fill");
    let fill_none = style.contains("fill:none") || fill == "none";
    fill_none && !style.contains("stroke:")
}

/// Iteratively remove `g`/`defs` elements that contain nothing but
/// whitespace. Collapsing can expose new empty parents, hence the loop.
fn drop_empty_containers(mut events: Vec<Event<'static>>) -> Vec<Event<'static>> {
    loop {
        let mut changed = false;
        let mut out = Vec::with_capacity(events.len());
        let mut i = 0;

        while i < events.len() {
            match &events[i] {
                Event::Empty(e) if is_container(e) => {
                    changed = true;
                    i += 1;
                }
                Event::Start(e) if is_container(e) => {
                    let mut j = i + 1;
                    while j < events.len() && is_whitespace_text(&events[j]) {
                        j += 1;
                    }
                    if j < events.len() && matches!(&events[j], Event::End(_)) {
                        changed = true;
                        i = j + 1;
                    } else {
                        out.push(events[i].clone());
                        i += 1;
                    }
                }
                _ => {
                    out.push(events[i].clone());
                    i += 1;
                }
            }
        }

        events = out;
        if !changed {
            return events;
        }
    }
}

fn is_container(e: &BytesStart<'_>) -> bool {
    matches!(e.local_name().as_ref(), b"g" | b"defs")
}

fn is_whitespace_text(ev: &Event<'_>) -> bool {
    match ev {
        Event::Text(t) => t.iter().all(u8::is_ascii_whitespace),
        _ => false,
    }
}

// ============================================================================
// Attribute rewriting
// ============================================================================

/// Strip editor attributes from the root element and style/fill from paths.
fn rewrite_attributes(events: Vec<Event<'static>>) -> Vec<Event<'static>> {
    let mut root_seen = false;
    events
        .into_iter()
        .map(|ev| match ev {
            Event::Start(e) => Event::Start(fix_element(e, &mut root_seen)),
            Event::Empty(e) => Event::Empty(fix_element(e, &mut root_seen)),
            other => other,
        })
        .collect()
}

fn fix_element(e: BytesStart<'static>, root_seen: &mut bool) -> BytesStart<'static> {
    let local = e.local_name().as_ref().to_vec();
    if !*root_seen && local == b"svg" {
        *root_seen = true;
        return rebuild(&e, |key| {
            key != "style" && !ROOT_ATTR_MARKERS.iter().any(|m| contains(key.as_bytes(), m))
        });
    }
    if local == b"path" {
        let mut fixed = rebuild(&e, |key| !matches!(key, "style" | "fill" | "fill-rule"));
        fixed.push_attribute(("fill-rule", "nonzero"));
        return fixed;
    }
    e
}

/// Rebuild an element keeping only attributes accepted by `keep`.
fn rebuild(e: &BytesStart<'_>, keep: impl Fn(&str) -> bool) -> BytesStart<'static> {
    let name = String::from_utf8_lossy(e.name().as_ref()).into_owned();
    let mut out = BytesStart::new(name);
    for attr in e.attributes().flatten() {
        let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
        if keep(&key) {
            let value = attr.unescape_value().unwrap_or_default();
            out.push_attribute((key.as_str(), value.as_ref()));
        }
    }
    out
}

// ============================================================================
// Helpers
// ============================================================================

fn attr_value(e: &BytesStart<'_>, name: &[u8]) -> String {
    e.attributes()
        .flatten()
        .find(|a| a.key.as_ref() == name)
        .and_then(|a| a.unescape_value().ok())
        .map(|v| v.into_owned())
        .unwrap_or_default()
}

fn contains(haystack: &[u8], needle: &[u8]) -> bool {
    haystack.windows(needle.len()).any(|w| w == needle)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn clean(input: &str) -> String {
        String::from_utf8(clean_svg(input.as_bytes()).unwrap()).unwrap()
    }

    #[test]
    fn test_strips_metadata_and_editor_elements() {
        let svg = r##"<svg xmlns="http://www.w3.org/2000/svg" width="24" height="24">
<metadata><rdf:RDF>stuff</rdf:RDF></metadata>
<sodipodi:namedview pagecolor="#ffffff"/>
<path d="M0 0h10v10z"/>
</svg>"##;
        let out = clean(svg);
        assert!(!out.contains("metadata"));
        assert!(!out.contains("sodipodi"));
        assert!(out.contains(r#"d="M0 0h10v10z""#));
    }

    #[test]
    fn test_strips_invisible_fill_none() {
        let svg = r#"<svg width="24" height="24">
<rect fill="none" width="24" height="24"/>
<path style="fill:none" d="M1 1"/>
<path style="fill:none;stroke:#000" d="M2 2"/>
<path d="M3 3"/>
</svg>"#;
        let out = clean(svg);
        assert!(!out.contains("rect"));
        assert!(!out.contains("M1 1"));
        // Stroked outline survives (strokes become fills upstream)
        assert!(out.contains("M2 2"));
        assert!(out.contains("M3 3"));
    }

    #[test]
    fn test_drops_empty_containers_recursively() {
        let svg = r#"<svg width="24" height="24"><g>
  <g>
  </g>
</g><defs/><path d="M0 0"/></svg>"#;
        let out = clean(svg);
        assert!(!out.contains("<g"));
        assert!(!out.contains("<defs"));
        assert!(out.contains("path"));
    }

    #[test]
    fn test_keeps_populated_groups() {
        let svg = r#"<svg width="24" height="24"><g transform="translate(1,2)"><path d="M0 0"/></g></svg>"#;
        let out = clean(svg);
        assert!(out.contains("<g transform"));
    }

    #[test]
    fn test_path_attrs_normalized() {
        let svg = r##"<svg width="24" height="24"><path style="fill:#fff" fill="#000" fill-rule="evenodd" d="M0 0"/></svg>"##;
        let out = clean(svg);
        assert!(!out.contains("style="));
        assert!(!out.contains("#000"));
        assert!(out.contains(r#"fill-rule="nonzero""#));
        assert!(out.contains(r#"d="M0 0""#));
    }

    #[test]
    fn test_root_editor_attrs_removed_canvas_kept() {
        let svg = r#"<svg xmlns="http://www.w3.org/2000/svg" xmlns:sodipodi="http://x" inkscape:version="1.3" style="x:y" width="24" height="24" viewBox="0 0 24 24"><path d="M0 0"/></svg>"#;
        let out = clean(svg);
        assert!(!out.contains("sodipodi"));
        assert!(!out.contains("inkscape"));
        assert!(!out.contains("style"));
        assert!(out.contains(r#"width="24""#));
        assert!(out.contains(r#"viewBox="0 0 24 24""#));
        assert!(out.contains(r#"xmlns="http://www.w3.org/2000/svg""#));
    }

    #[test]
    fn test_rejects_non_utf8() {
        assert!(clean_svg(&[0xff, 0xfe, 0x00]).is_err());
    }
}
