//! Attribute value types and the small parsers §6 specifies for them:
//! shapes, border styles, alignment, text wrap, flow direction, port hints,
//! and the edge-operator/arrow encodings.

use crate::cell::Side;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shape {
    Box,
    Rect,
    Rounded,
    Circle,
    Ellipse,
    Diamond,
    Point,
    Edge,
    None,
    Invisible,
}

impl Shape {
    pub fn parse(s: &str) -> Shape {
        match s {
            "rect" => Shape::Rect,
            "rounded" => Shape::Rounded,
            "circle" => Shape::Circle,
            "ellipse" => Shape::Ellipse,
            "diamond" => Shape::Diamond,
            "point" => Shape::Point,
            "edge" => Shape::Edge,
            "none" => Shape::None,
            "invisible" => Shape::Invisible,
            _ => Shape::Box,
        }
    }
}

impl Default for Shape {
    fn default() -> Self {
        Shape::Box
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BorderStyle {
    Solid,
    Dotted,
    Dashed,
    Double,
    DoubleDash,
    Bold,
    BoldDash,
    Broad,
    Wide,
    Wave,
    DotDash,
    DotDotDash,
    None,
}

impl BorderStyle {
    /// Unknown names substitute `solid` per §7's error-handling policy.
    pub fn parse(s: &str) -> BorderStyle {
        match s {
            "dotted" => BorderStyle::Dotted,
            "dashed" => BorderStyle::Dashed,
            "double" => BorderStyle::Double,
            "double-dash" => BorderStyle::DoubleDash,
            "bold" => BorderStyle::Bold,
            "bold-dash" => BorderStyle::BoldDash,
            "broad" => BorderStyle::Broad,
            "wide" => BorderStyle::Wide,
            "wave" => BorderStyle::Wave,
            "dot-dash" => BorderStyle::DotDash,
            "dot-dot-dash" => BorderStyle::DotDotDash,
            "none" => BorderStyle::None,
            "solid" => BorderStyle::Solid,
            other => {
                tracing::warn!(style = other, "unknown border style, substituting solid");
                BorderStyle::Solid
            }
        }
    }

    /// Relative strength used by the border-collapse merge rule in §4.8:
    /// broad > wide > bold > double > solid > others.
    pub fn strength(self) -> u8 {
        match self {
            BorderStyle::Broad => 6,
            BorderStyle::Wide => 5,
            BorderStyle::Bold | BorderStyle::BoldDash => 4,
            BorderStyle::Double | BorderStyle::DoubleDash => 3,
            BorderStyle::Solid => 2,
            BorderStyle::None => 0,
            _ => 1,
        }
    }
}

impl Default for BorderStyle {
    fn default() -> Self {
        BorderStyle::Solid
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Align {
    Left,
    Center,
    Right,
}

impl Align {
    pub fn parse(s: &str) -> Align {
        match s {
            "left" => Align::Left,
            "right" => Align::Right,
            _ => Align::Center,
        }
    }

    pub fn as_char(self) -> char {
        match self {
            Align::Left => 'l',
            Align::Center => 'c',
            Align::Right => 'r',
        }
    }
}

impl Default for Align {
    fn default() -> Self {
        Align::Center
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LabelPos {
    Top,
    Bottom,
}

impl LabelPos {
    pub fn parse(s: &str) -> LabelPos {
        match s {
            "top" => LabelPos::Top,
            _ => LabelPos::Bottom,
        }
    }
}

impl Default for LabelPos {
    fn default() -> Self {
        LabelPos::Bottom
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextWrap {
    None,
    Auto,
    Columns(usize),
}

impl TextWrap {
    pub fn parse(s: &str) -> TextWrap {
        match s {
            "none" => TextWrap::None,
            "auto" => TextWrap::Auto,
            other => other.parse::<usize>().map(TextWrap::Columns).unwrap_or(TextWrap::None),
        }
    }

    /// `floor(sqrt(length) * 1.4)`, per §4.8.
    pub fn auto_width(length: usize) -> usize {
        ((length as f64).sqrt() * 1.4).floor() as usize
    }
}

/// Absolute/relative flow keyword resolution (§6). Flow is stored as degrees
/// in `{0, 90, 180, 270}`.
pub fn parse_flow(s: &str, incoming: u32) -> u32 {
    let normalize = |d: i64| -> u32 { d.rem_euclid(360) as u32 };
    match s.trim() {
        "east" | "right" | "forward" | "front" => 90,
        "west" | "left" | "back" => 270,
        "north" | "up" => 0,
        "south" | "down" => 180,
        other => {
            if let Ok(n) = other.parse::<i64>() {
                return normalize(n);
            }
            let rel: i64 = match other {
                "forward" => 0,
                "left" => -90,
                "right" => 90,
                "back" => 180,
                _ => return incoming,
            };
            normalize(incoming as i64 + rel)
        }
    }
}

/// A port hint of the form `side` or `side,position`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PortHint {
    pub side: Side,
    pub pos: Option<i64>,
}

impl PortHint {
    pub fn parse(s: &str) -> Option<PortHint> {
        let mut parts = s.split(',');
        let side = match parts.next()?.trim() {
            "north" => Side::North,
            "south" => Side::South,
            "east" => Side::East,
            "west" => Side::West,
            _ => return None,
        };
        let pos = parts.next().and_then(|p| p.trim().parse::<i64>().ok());
        Some(PortHint { side, pos })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EdgeStyle {
    Wave,
    DotDotDash,
    DotDash,
    Dotted,
    DoubleDash,
    Dashed,
    Double,
    Solid,
}

impl EdgeStyle {
    /// Explicit `style` attribute override (§6 attribute catalog). Unknown
    /// names substitute `solid`, matching §7's border/edge style policy.
    pub fn parse(s: &str) -> EdgeStyle {
        match s {
            "wave" => EdgeStyle::Wave,
            "dot-dot-dash" => EdgeStyle::DotDotDash,
            "dot-dash" => EdgeStyle::DotDash,
            "dotted" => EdgeStyle::Dotted,
            "double-dash" => EdgeStyle::DoubleDash,
            "dashed" => EdgeStyle::Dashed,
            "double" => EdgeStyle::Double,
            "solid" => EdgeStyle::Solid,
            other => {
                tracing::warn!(style = other, "unknown edge style, substituting solid");
                EdgeStyle::Solid
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Directionality {
    Bidirectional,
    Undirected,
    Reversed,
    Forward,
}

/// Decode `leftOp`/`rightOp` operator tokens into a line style and
/// directionality, per §6's edge operator encoding table.
pub fn infer_edge_operator(left_op: &str, right_op: &str) -> (EdgeStyle, Directionality) {
    let has_left_arrow = left_op.contains('<');
    let has_right_arrow = right_op.contains('>');
    let directionality = match (has_left_arrow, has_right_arrow) {
        (true, true) => Directionality::Bidirectional,
        (false, false) => Directionality::Undirected,
        (true, false) => Directionality::Reversed,
        (false, true) => Directionality::Forward,
    };

    let stripped = format!(
        "{}{}",
        left_op.trim_matches(|c| c == '<' || c == '>'),
        right_op.trim_matches(|c| c == '<' || c == '>')
    );

    // Order matters: these patterns overlap, so check the most specific
    // token first, exactly as §6 lists them.
    let style = if stripped.contains("~~") {
        EdgeStyle::Wave
    } else if stripped.contains("..-") {
        EdgeStyle::DotDotDash
    } else if stripped.contains(".-") {
        EdgeStyle::DotDash
    } else if stripped.contains("..") {
        EdgeStyle::Dotted
    } else if stripped.contains("= ") {
        EdgeStyle::DoubleDash
    } else if stripped.contains("- ") {
        EdgeStyle::Dashed
    } else if stripped.contains("==") {
        EdgeStyle::Double
    } else if stripped.contains('=') {
        EdgeStyle::DoubleDash
    } else if stripped.contains("--") {
        EdgeStyle::Solid
    } else {
        EdgeStyle::Solid
    };

    (style, directionality)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArrowShape {
    Triangle,
    Diamond,
    Box,
    Dot,
    Inv,
    Line,
    Cross,
    X,
}

impl ArrowShape {
    pub fn parse(s: &str) -> ArrowShape {
        match s {
            "diamond" => ArrowShape::Diamond,
            "box" => ArrowShape::Box,
            "dot" => ArrowShape::Dot,
            "inv" => ArrowShape::Inv,
            "line" => ArrowShape::Line,
            "cross" => ArrowShape::Cross,
            "x" => ArrowShape::X,
            _ => ArrowShape::Triangle,
        }
    }

    /// ASCII glyph for an arrowhead pointing in `dir`. Most shapes collapse
    /// to the triangle glyphs; a handful keep their own (§6).
    pub fn glyph(self, dir: Side) -> char {
        match self {
            ArrowShape::Dot => 'o',
            ArrowShape::Cross | ArrowShape::X => 'x',
            ArrowShape::Line => match dir {
                Side::East | Side::West => '|',
                Side::North | Side::South => '-',
            },
            _ => match dir {
                Side::East => '>',
                Side::West => '<',
                Side::North => '^',
                Side::South => 'v',
            },
        }
    }
}

impl Default for ArrowShape {
    fn default() -> Self {
        ArrowShape::Triangle
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flow_absolute_keywords() {
        assert_eq!(parse_flow("east", 0), 90);
        assert_eq!(parse_flow("west", 0), 270);
        assert_eq!(parse_flow("north", 0), 0);
        assert_eq!(parse_flow("south", 0), 180);
    }

    #[test]
    fn flow_relative_keywords() {
        assert_eq!(parse_flow("right", 90), 90);
        assert_eq!(parse_flow("left", 0), 270);
        assert_eq!(parse_flow("back", 90), 270);
    }

    #[test]
    fn port_hint_parses_side_and_position() {
        let p = PortHint::parse("east,2").unwrap();
        assert_eq!(p.side, Side::East);
        assert_eq!(p.pos, Some(2));
        let p2 = PortHint::parse("north").unwrap();
        assert_eq!(p2.pos, None);
    }

    #[test]
    fn edge_operator_dashed_forward() {
        let (style, dir) = infer_edge_operator("-", "->");
        assert_eq!(style, EdgeStyle::Solid);
        assert_eq!(dir, Directionality::Forward);
    }

    #[test]
    fn edge_operator_dotted_bidirectional() {
        let (style, dir) = infer_edge_operator("<..", "..>");
        assert_eq!(style, EdgeStyle::Dotted);
        assert_eq!(dir, Directionality::Bidirectional);
    }

    #[test]
    fn edge_operator_double_reversed() {
        let (style, dir) = infer_edge_operator("<==", "==");
        assert_eq!(style, EdgeStyle::Double);
        assert_eq!(dir, Directionality::Reversed);
    }

    #[test]
    fn unknown_border_style_substitutes_solid() {
        assert_eq!(BorderStyle::parse("zigzag"), BorderStyle::Solid);
    }
}
