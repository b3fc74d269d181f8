//! ASCII glyph tables for node borders and edge strokes (§4.8). Grounded on
//! the teacher's `renderers/charset.rs` `BoxChars`, generalized from its two
//! charsets (unicode/ascii) to this crate's one-style-per-`BorderStyle`
//! table, since the core never draws anything but ASCII (spec non-goal:
//! no Unicode-width-aware rendering).

use crate::attr::BorderStyle;

/// Corner and edge glyphs for drawing a node's border.
#[derive(Debug, Clone, Copy)]
pub struct BoxChars {
    pub top_left: char,
    pub top_right: char,
    pub bottom_left: char,
    pub bottom_right: char,
    pub horizontal: char,
    pub vertical: char,
}

pub fn box_chars(style: BorderStyle) -> BoxChars {
    match style {
        BorderStyle::None | BorderStyle::Wave => BoxChars {
            top_left: ' ',
            top_right: ' ',
            bottom_left: ' ',
            bottom_right: ' ',
            horizontal: ' ',
            vertical: ' ',
        },
        BorderStyle::Double | BorderStyle::DoubleDash => BoxChars {
            top_left: '+',
            top_right: '+',
            bottom_left: '+',
            bottom_right: '+',
            horizontal: '=',
            vertical: '"',
        },
        BorderStyle::Bold | BorderStyle::BoldDash | BorderStyle::Broad | BorderStyle::Wide => {
            BoxChars {
                top_left: '#',
                top_right: '#',
                bottom_left: '#',
                bottom_right: '#',
                horizontal: '#',
                vertical: '#',
            }
        }
        BorderStyle::Dotted | BorderStyle::DotDash | BorderStyle::DotDotDash => BoxChars {
            top_left: '.',
            top_right: '.',
            bottom_left: '.',
            bottom_right: '.',
            horizontal: '.',
            vertical: ':',
        },
        BorderStyle::Dashed => BoxChars {
            top_left: '+',
            top_right: '+',
            bottom_left: '+',
            bottom_right: '+',
            horizontal: '-',
            vertical: ':',
        },
        BorderStyle::Solid => BoxChars {
            top_left: '+',
            top_right: '+',
            bottom_left: '+',
            bottom_right: '+',
            horizontal: '-',
            vertical: '|',
        },
    }
}

/// 7-tuple of glyphs for an edge style: `[hor, ver, cross, ul, ll, ur, lr]`
/// (§4.8 "Edge drawing").
#[derive(Debug, Clone, Copy)]
pub struct EdgeGlyphs {
    pub hor: char,
    pub ver: char,
    pub cross: char,
    pub ul: char,
    pub ll: char,
    pub ur: char,
    pub lr: char,
}

pub fn edge_glyphs(style: crate::attr::EdgeStyle) -> EdgeGlyphs {
    use crate::attr::EdgeStyle::*;
    match style {
        Wave => EdgeGlyphs {
            hor: '~',
            ver: '~',
            cross: '+',
            ul: '.',
            ll: '\'',
            ur: '.',
            lr: '\'',
        },
        DotDotDash => EdgeGlyphs {
            hor: '.',
            ver: ':',
            cross: '+',
            ul: '.',
            ll: '\'',
            ur: '.',
            lr: '\'',
        },
        DotDash => EdgeGlyphs {
            hor: '.',
            ver: ':',
            cross: '+',
            ul: '.',
            ll: '\'',
            ur: '.',
            lr: '\'',
        },
        Dotted => EdgeGlyphs {
            hor: '.',
            ver: ':',
            cross: '+',
            ul: '.',
            ll: '\'',
            ur: '.',
            lr: '\'',
        },
        DoubleDash => EdgeGlyphs {
            hor: '=',
            ver: '"',
            cross: '+',
            ul: '.',
            ll: '\'',
            ur: '.',
            lr: '\'',
        },
        Dashed => EdgeGlyphs {
            hor: '-',
            ver: ':',
            cross: '+',
            ul: '.',
            ll: '\'',
            ur: '.',
            lr: '\'',
        },
        Double => EdgeGlyphs {
            hor: '=',
            ver: '"',
            cross: 'H',
            ul: '+',
            ll: '+',
            ur: '+',
            lr: '+',
        },
        Solid => EdgeGlyphs {
            hor: '-',
            ver: '|',
            cross: '+',
            ul: '+',
            ll: '+',
            ur: '+',
            lr: '+',
        },
    }
}

/// Crossing glyph for two edges of possibly-different styles meeting at a
/// cell, `a` being the horizontal edge's style and `b` the vertical edge's
/// (§4.8 "Edge drawing": a two-style lookup table, falling back to the
/// horizontal style's own cross glyph for unlisted pairs).
pub fn cross_glyph(a: crate::attr::EdgeStyle, b: crate::attr::EdgeStyle) -> char {
    use crate::attr::EdgeStyle::*;
    match (a, b) {
        (Double, Solid) => '+',
        (DoubleDash, Solid) => '+',
        (Solid, Double) => 'H',
        (Solid, DoubleDash) => 'H',
        (Double, Double) => 'H',
        (Dashed, Solid) | (Solid, Dashed) => '+',
        _ => edge_glyphs(a).cross,
    }
}

/// Repeat unit for an edge style's stroke, phase-aligned to the absolute
/// column/row (§4.8 "Edge drawing", scenario §8.6): `true` draws the
/// style's glyph, `false` leaves a gap. Continuous styles repeat their
/// glyph on every cell; dashed/dotted-family styles leave gaps per their
/// documented pattern.
pub fn stroke_pattern(style: crate::attr::EdgeStyle) -> &'static [bool] {
    use crate::attr::EdgeStyle::*;
    match style {
        Solid | Double | Dotted | Wave => &[true],
        Dashed | DoubleDash | DotDash => &[true, false],
        DotDotDash => &[true, true, false],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crossing_solid_into_double_is_h() {
        assert_eq!(cross_glyph(crate::attr::EdgeStyle::Solid, crate::attr::EdgeStyle::Double), 'H');
        assert_eq!(cross_glyph(crate::attr::EdgeStyle::Double, crate::attr::EdgeStyle::Solid), '+');
    }

    #[test]
    fn dashed_pattern_has_a_gap() {
        let p = stroke_pattern(crate::attr::EdgeStyle::Dashed);
        assert_eq!(p, &[true, false]);
    }

    #[test]
    fn solid_uses_plus_corners() {
        let g = edge_glyphs(crate::attr::EdgeStyle::Solid);
        assert_eq!(g.ul, '+');
        assert_eq!(g.hor, '-');
    }

    #[test]
    fn double_crossing_uses_h() {
        let g = edge_glyphs(crate::attr::EdgeStyle::Double);
        assert_eq!(g.cross, 'H');
    }
}
