//! Path-drawing commands in em-square units.
//!
//! Glyph outlines drawn in-process (the `.notdef` placeholder) are expressed
//! as a typed command list and rendered to the font editor's pen protocol by
//! an exhaustive match.

/// One path-drawing operation, in font units (0..units_per_em).
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PathCommand {
    MoveTo { x: f64, y: f64 },
    LineTo { x: f64, y: f64 },
    /// Cubic segment with two control points.
    CurveTo {
        x1: f64,
        y1: f64,
        x2: f64,
        y2: f64,
        x: f64,
        y: f64,
    },
    /// Quadratic segment with one control point.
    QuadTo { x1: f64, y1: f64, x: f64, y: f64 },
    Close,
}

impl PathCommand {
    /// Render this command as one pen call on the named pen variable.
    pub fn to_pen_call(self, pen: &str) -> String {
        match self {
            Self::MoveTo { x, y } => format!("{pen}.moveTo(({x}, {y}))"),
            Self::LineTo { x, y } => format!("{pen}.lineTo(({x}, {y}))"),
            Self::CurveTo {
                x1,
                y1,
                x2,
                y2,
                x,
                y,
            } => format!("{pen}.curveTo(({x1}, {y1}), ({x2}, {y2}), ({x}, {y}))"),
            Self::QuadTo { x1, y1, x, y } => {
                format!("{pen}.qCurveTo(({x1}, {y1}), ({x}, {y}))")
            }
            Self::Close => format!("{pen}.closePath()"),
        }
    }
}

/// Render a command list as pen calls, one per line.
pub fn render_pen_calls(pen: &str, commands: &[PathCommand]) -> String {
    commands
        .iter()
        .map(|c| c.to_pen_call(pen))
        .collect::<Vec<_>>()
        .join("\n")
}

/// The `.notdef` placeholder: a fixed rectangle inset 50 units from the
/// em edges, emitted unconditionally into every font.
pub fn notdef_outline(units_per_em: u32, ascent: u32) -> Vec<PathCommand> {
    let inset = 50.0;
    let right = f64::from(units_per_em) - inset;
    let top = f64::from(ascent) - inset;
    vec![
        PathCommand::MoveTo { x: inset, y: 0.0 },
        PathCommand::LineTo { x: right, y: 0.0 },
        PathCommand::LineTo { x: right, y: top },
        PathCommand::LineTo { x: inset, y: top },
        PathCommand::Close,
    ]
}
