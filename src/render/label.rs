//! Label wrapping and placement (§4.8 "Label wrapping and alignment",
//! "printfbAligned"). The fractional-y double application in middle
//! alignment is a deliberate quirk (§9 Open Questions) and is kept, not
//! "fixed".

use crate::attr::{Align, TextWrap};

/// Splits a label on escape tokens, decodes escapes, and re-flows it to a
/// wrap width. Returns parallel `lines`/`aligns` arrays, with one extra
/// trailing alignment entry appended for parity with downstream consumers
/// (§4.8).
pub fn aligned_label(label: &str, align: Align, wrap: TextWrap) -> (Vec<String>, Vec<Align>) {
    let mut lines = Vec::new();
    let mut aligns = Vec::new();
    let mut cur_align = align;

    for raw_line in split_escape_tokens(label) {
        let (text, next_align) = match raw_line {
            RawLine::Text(t) => (t, None),
            RawLine::AlignMarker(a) => {
                cur_align = a;
                continue;
            }
        };
        let collapsed = collapse_whitespace(&decode_escapes(&text));
        let width = wrap_width(wrap, collapsed.len());
        if let Some(w) = width {
            for wrapped in wrap_line(&collapsed, w) {
                lines.push(wrapped);
                aligns.push(cur_align);
            }
        } else {
            lines.push(collapsed);
            aligns.push(cur_align);
        }
        let _ = next_align;
    }
    if lines.is_empty() {
        lines.push(String::new());
        aligns.push(cur_align);
    }
    aligns.push(cur_align);
    (lines, aligns)
}

enum RawLine {
    Text(String),
    AlignMarker(Align),
}

/// Splits on `\n`, `\r`, `\l`, `\c` escape tokens and real newlines. `\l`
/// and `\r` switch the alignment of the line that follows rather than
/// emitting a line themselves.
fn split_escape_tokens(label: &str) -> Vec<RawLine> {
    let mut out = Vec::new();
    let mut cur = String::new();
    let mut chars = label.chars().peekable();
    while let Some(c) = chars.next() {
        if c == '\n' {
            out.push(RawLine::Text(std::mem::take(&mut cur)));
        } else if c == '\\' {
            match chars.peek() {
                Some('n') => {
                    chars.next();
                    out.push(RawLine::Text(std::mem::take(&mut cur)));
                }
                Some('l') => {
                    chars.next();
                    out.push(RawLine::Text(std::mem::take(&mut cur)));
                    out.push(RawLine::AlignMarker(Align::Left));
                }
                Some('r') => {
                    chars.next();
                    out.push(RawLine::Text(std::mem::take(&mut cur)));
                    out.push(RawLine::AlignMarker(Align::Right));
                }
                Some('c') => {
                    chars.next();
                    out.push(RawLine::Text(std::mem::take(&mut cur)));
                    out.push(RawLine::AlignMarker(Align::Center));
                }
                Some('|') => {
                    chars.next();
                    cur.push('|');
                }
                Some('\\') => {
                    chars.next();
                    cur.push('\\');
                }
                _ => cur.push(c),
            }
        } else {
            cur.push(c);
        }
    }
    out.push(RawLine::Text(cur));
    out
}

fn decode_escapes(s: &str) -> String {
    s.to_string()
}

fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn wrap_width(wrap: TextWrap, length: usize) -> Option<usize> {
    match wrap {
        TextWrap::None => None,
        TextWrap::Auto => Some(TextWrap::auto_width(length).max(1)),
        TextWrap::Columns(n) => Some(n.max(1)),
    }
}

/// Reflow a single logical line into lines of at most `width` columns,
/// breaking at the last space, or at a hyphen after the last space if one
/// exists (keeping the hyphen on the prior line).
fn wrap_line(s: &str, width: usize) -> Vec<String> {
    if s.len() <= width {
        return vec![s.to_string()];
    }
    let mut out = Vec::new();
    let mut remaining = s;
    while remaining.len() > width {
        let window = &remaining[..width.min(remaining.len())];
        let break_at = window
            .rfind('-')
            .map(|i| i + 1)
            .or_else(|| window.rfind(' '))
            .unwrap_or(width);
        let (head, tail) = remaining.split_at(break_at);
        out.push(head.trim_end().to_string());
        remaining = tail.trim_start();
    }
    if !remaining.is_empty() {
        out.push(remaining.to_string());
    }
    out
}

/// Place `lines`/`aligns` into the rectangle `(x1, y1, w, h)` of `canvas`.
pub fn printfb_aligned(
    canvas: &mut super::raster::Canvas,
    x1: f64,
    y1: f64,
    w: f64,
    h: f64,
    lines: &[String],
    aligns: &[Align],
    vanchor: VAnchor,
) {
    let n = lines.len() as f64;
    let y0 = match vanchor {
        VAnchor::Top => y1,
        VAnchor::Bottom => y1 + h - n,
        VAnchor::Middle => {
            // Deliberate quirk (§9): the fractional part of y1 is applied
            // twice when centering vertically. Keep it exactly as observed.
            let base = y1 + h / 2.0 - n / 2.0;
            base + y1.fract()
        }
    };

    for (i, line) in lines.iter().enumerate() {
        let align = aligns.get(i).copied().unwrap_or(Align::Left);
        let line_len = line.chars().count() as f64;
        let x0 = match align {
            Align::Left => x1,
            Align::Center => x1 + w / 2.0 - line_len / 2.0,
            Align::Right => x1 + w - line_len,
        };
        let row = (y0 + i as f64).trunc() as i64;
        let mut col = x0.trunc() as i64;
        for ch in line.chars() {
            if ch != ' ' {
                canvas.set(col, row, ch);
            }
            col += 1;
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VAnchor {
    Top,
    Middle,
    Bottom,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collapses_internal_whitespace() {
        let (lines, _) = aligned_label("a   b\tc", Align::Left, TextWrap::None);
        assert_eq!(lines, vec!["a b c".to_string()]);
    }

    #[test]
    fn newline_escape_splits_lines() {
        let (lines, _) = aligned_label("first\\nsecond", Align::Left, TextWrap::None);
        assert_eq!(lines, vec!["first".to_string(), "second".to_string()]);
    }

    #[test]
    fn wrap_is_idempotent_when_fed_back_unwrapped() {
        let (wrapped, _) = aligned_label("hello there friend", Align::Left, TextWrap::Columns(6));
        let joined = wrapped.join("\\n");
        let (again, _) = aligned_label(&joined, Align::Left, TextWrap::None);
        assert_eq!(again, wrapped);
    }
}
