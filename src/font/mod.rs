//! Outline-font assembly and packaging.
//!
//! - [`outline`]: path-drawing command vocabulary for scripted pen drawing
//! - [`table`]: the glyph table, codepoint assignment and the editor's
//!   stdout report parser
//! - [`assemble`]: FontForge batch script generation and invocation
//! - [`header`]: C++ header emission (named constants + size selector)
//! - [`bitmap`]: per-size binary font packaging via `lv_font_conv`

pub mod assemble;
pub mod bitmap;
pub mod header;
pub mod outline;
pub mod table;
