//! ASCII rasterization (§4.8): walks the sized, post-fill cell map and
//! paints nodes, edges and groups onto a character grid, then trims it to
//! a string.
//!
//! `Canvas` mirrors the teacher's `renderers/canvas.rs`: a flat `Vec<Vec<char>>`
//! with get/set and a `render_to_string` that trims trailing whitespace per
//! row and drops trailing blank rows.

use crate::attr::{Align, ArrowShape, BorderStyle, LabelPos, Shape, TextWrap};
use crate::cell::{self, Cell, Side};
use crate::config::RenderConfig;
use crate::error::GraphResult;
use crate::model::Graph;

use super::charset::{box_chars, edge_glyphs};
use super::label::{aligned_label, printfb_aligned, VAnchor};
use super::sizing::{compute_sizes, SizeTable};

pub struct Canvas {
    pub width: i64,
    pub height: i64,
    cells: Vec<Vec<char>>,
}

impl Canvas {
    pub fn new(width: i64, height: i64) -> Self {
        let w = width.max(0) as usize;
        let h = height.max(0) as usize;
        Canvas {
            width,
            height,
            cells: vec![vec![' '; w]; h],
        }
    }

    pub fn get(&self, x: i64, y: i64) -> char {
        if x < 0 || y < 0 || x >= self.width || y >= self.height {
            return ' ';
        }
        self.cells[y as usize][x as usize]
    }

    pub fn set(&mut self, x: i64, y: i64, ch: char) {
        if x < 0 || y < 0 || x >= self.width || y >= self.height {
            return;
        }
        self.cells[y as usize][x as usize] = ch;
    }

    pub fn hline(&mut self, x: i64, y: i64, len: i64, ch: char) {
        for i in 0..len {
            self.set(x + i, y, ch);
        }
    }

    pub fn vline(&mut self, x: i64, y: i64, len: i64, ch: char) {
        for i in 0..len {
            self.set(x, y + i, ch);
        }
    }

    pub fn write_str(&mut self, x: i64, y: i64, s: &str) {
        for (i, ch) in s.chars().enumerate() {
            self.set(x + i as i64, y, ch);
        }
    }

    /// Trims trailing whitespace per row, drops trailing blank rows, and
    /// appends exactly one trailing newline (§4.8 "Trimming").
    pub fn render_to_string(&self) -> String {
        let mut rows: Vec<String> = self
            .cells
            .iter()
            .map(|row| row.iter().collect::<String>().trim_end().to_string())
            .collect();
        while rows.last().is_some_and(|r| r.is_empty()) {
            rows.pop();
        }
        let mut out = rows.join("\n");
        out.push('\n');
        out
    }
}

pub fn rasterize(graph: &Graph) -> GraphResult<String> {
    let cfg = graph.render_config();
    let sizes = compute_sizes(graph);
    let mut canvas = Canvas::new(sizes.total_width(), sizes.total_height());

    // Render order (§4.8): GroupCells first, then edges, then nodes, so
    // edges overwrite group borders and nodes overwrite edge stubs at
    // their own perimeter.
    let mut coords: Vec<(i64, i64)> = graph.cells.keys().copied().collect();
    coords.sort();

    for &(x, y) in &coords {
        if let Some(Cell::GroupCell { group, class, label }) = graph.cells.get(&(x, y)) {
            draw_group_cell(graph, &mut canvas, &sizes, x, y, *group, class, *label);
        }
    }
    for &(x, y) in &coords {
        match graph.cells.get(&(x, y)) {
            Some(Cell::EdgeCell { edge, type_bits }) => {
                draw_edge_cell(graph, &mut canvas, &sizes, cfg, x, y, *edge, *type_bits)
            }
            Some(Cell::CrossCell { primary, secondary, type_bits }) => {
                draw_cross_cell(graph, &mut canvas, &sizes, x, y, *primary, *secondary, *type_bits)
            }
            _ => {}
        }
    }
    for &(x, y) in &coords {
        if let Some(Cell::Node(id)) = graph.cells.get(&(x, y)) {
            draw_node(graph, &mut canvas, &sizes, x, y, *id);
        }
    }

    let mut text = canvas.render_to_string();
    apply_graph_label(graph, &mut text);
    Ok(text)
}

fn draw_node(graph: &Graph, canvas: &mut Canvas, sizes: &SizeTable, x: i64, y: i64, id: crate::model::NodeId) {
    let node = graph.node(id);
    let (cx, cy) = (node.cx, node.cy);
    let (mut px, py, w, h) = sizes.span_rect(x, y, cx, cy);
    let shape = graph
        .resolve_node_attr(id, "shape")
        .map(Shape::parse)
        .unwrap_or_default();
    if shape == Shape::Invisible || shape == Shape::None {
        draw_label_only(graph, canvas, id, px, py, w, h);
        return;
    }
    let border = graph
        .resolve_node_attr(id, "borderstyle")
        .map(BorderStyle::parse)
        .unwrap_or_default();

    if border != BorderStyle::None && w >= 2 && h >= 2 {
        // §4.8 "Border collapse": a shared stroke with a visible neighbor
        // is owned by only one side, and a borderless left neighbor pulls
        // this node's whole box one column left to close the visual gap.
        let collapse = super::sizing::border_collapse(graph, x, y, cx, cy, border);
        if collapse.shift_left {
            px -= 1;
        }
        let chars = box_chars(border);
        let right_chars = collapse.right_style.map(box_chars).unwrap_or(chars);
        let bottom_chars = collapse.bottom_style.map(box_chars).unwrap_or(chars);

        if !collapse.suppress_top {
            canvas.hline(px + 1, py, (w - 2).max(0), chars.horizontal);
            canvas.set(px, py, chars.top_left);
        }
        canvas.set(px + w - 1, py, chars.top_right);
        if !collapse.suppress_left {
            canvas.vline(px, py + 1, (h - 2).max(0), chars.vertical);
        }
        canvas.vline(px + w - 1, py + 1, (h - 2).max(0), right_chars.vertical);
        canvas.hline(px + 1, py + h - 1, (w - 2).max(0), bottom_chars.horizontal);
        canvas.set(px + w - 1, py + h - 1, bottom_chars.bottom_right);
        if collapse.shift_left || collapse.suppress_left {
            canvas.set(px, py + h - 1, ' ');
        } else {
            canvas.set(px, py + h - 1, bottom_chars.bottom_left);
        }
    }

    draw_label_only(graph, canvas, id, px, py, w, h);
}

fn draw_label_only(graph: &Graph, canvas: &mut Canvas, id: crate::model::NodeId, px: i64, py: i64, w: i64, h: i64) {
    let node = graph.node(id);
    let label = graph.resolve_node_attr(id, "label").unwrap_or(&node.name);
    if label.is_empty() {
        return;
    }
    let align = graph
        .resolve_node_attr(id, "align")
        .map(Align::parse)
        .unwrap_or_default();
    let wrap = graph
        .resolve_node_attr(id, "textwrap")
        .map(TextWrap::parse)
        .unwrap_or(TextWrap::None);
    let (lines, aligns) = aligned_label(label, align, wrap);
    printfb_aligned(
        canvas,
        px as f64 + 1.0,
        py as f64,
        (w - 2).max(0) as f64,
        h as f64,
        &lines,
        &aligns,
        VAnchor::Middle,
    );
}

fn draw_edge_cell(
    graph: &Graph,
    canvas: &mut Canvas,
    sizes: &SizeTable,
    cfg: &RenderConfig,
    x: i64,
    y: i64,
    edge: crate::model::EdgeId,
    type_bits: u16,
) {
    let (px, py, w, h) = sizes.cell_rect(x, y);
    let style = graph.edge_style(edge);
    let glyphs = edge_glyphs(style);
    let base = cell::base_type(type_bits);

    if cell::is_loop(base) {
        // §4.8 "Loops draw two vertical pieces plus a horizontal connector,
        // with corner glyphs at indices 3-6."
        if base == cell::N_W_S || base == cell::S_W_N {
            draw_loop_hor(canvas, &glyphs, px, py, w, h);
        } else {
            draw_loop_ver(canvas, &glyphs, px, py, w, h);
        }
    } else {
        // Each style's repeat unit is phase-locked to the absolute
        // column/row so it stays aligned across adjacent cells
        // ("phase-shift by absX mod segLen", §4.8, scenario §8.6).
        let pattern = super::charset::stroke_pattern(style);
        let plen = pattern.len() as i64;
        if base == cell::HOR {
            for i in 0..w {
                let on = pattern[(px + i).rem_euclid(plen) as usize];
                canvas.set(px + i, py + h / 2, if on { glyphs.hor } else { ' ' });
            }
        }
        if base == cell::VER {
            for i in 0..h {
                let on = pattern[(py + i).rem_euclid(plen) as usize];
                canvas.set(px + w / 2, py + i, if on { glyphs.ver } else { ' ' });
            }
        }
        match base {
            cell::N_E => canvas.set(px, py, glyphs.lr),
            cell::N_W => canvas.set(px + w - 1, py, glyphs.ll),
            cell::S_E => canvas.set(px, py + h - 1, glyphs.ur),
            cell::S_W => canvas.set(px + w - 1, py + h - 1, glyphs.ul),
            cell::CROSS => canvas.set(px + w / 2, py + h / 2, glyphs.cross),
            _ => {}
        }
    }

    apply_end_flags(graph, canvas, cfg, edge, type_bits, px, py, w, h);

    if cell::has_label(type_bits) {
        if let Some(label) = graph.resolve_edge_attr(edge, "label") {
            if !label.is_empty() {
                let (lines, aligns) = aligned_label(label, Align::Center, TextWrap::None);
                printfb_aligned(
                    canvas,
                    px as f64,
                    (py - 1).max(0) as f64,
                    w as f64,
                    1.0,
                    &lines,
                    &aligns,
                    VAnchor::Top,
                );
            }
        }
    }
}

/// Horizontal-armed loop: two vertical strokes with a horizontal connector
/// across the top, corners at indices 3-6 of the style's glyph table.
fn draw_loop_hor(canvas: &mut Canvas, glyphs: &super::charset::EdgeGlyphs, px: i64, py: i64, w: i64, h: i64) {
    canvas.hline(px, py, w, glyphs.hor);
    canvas.hline(px, py + h - 1, w, glyphs.hor);
    canvas.vline(px, py + 1, (h - 2).max(0), glyphs.ver);
    canvas.set(px, py, glyphs.ul);
    canvas.set(px + w - 1, py, glyphs.ur);
    canvas.set(px, py + h - 1, glyphs.ll);
    canvas.set(px + w - 1, py + h - 1, glyphs.lr);
}

/// Vertical-armed loop: two vertical strokes with a horizontal connector
/// across the middle, corners at indices 3-6 of the style's glyph table.
fn draw_loop_ver(canvas: &mut Canvas, glyphs: &super::charset::EdgeGlyphs, px: i64, py: i64, w: i64, h: i64) {
    canvas.vline(px, py, h, glyphs.ver);
    canvas.vline(px + w - 1, py, h, glyphs.ver);
    canvas.hline(px + 1, py, (w - 2).max(0), glyphs.hor);
    canvas.set(px, py, glyphs.ul);
    canvas.set(px + w - 1, py, glyphs.ur);
    canvas.set(px, py + h - 1, glyphs.ll);
    canvas.set(px + w - 1, py + h - 1, glyphs.lr);
}

fn draw_cross_cell(
    graph: &Graph,
    canvas: &mut Canvas,
    sizes: &SizeTable,
    x: i64,
    y: i64,
    primary: crate::model::EdgeId,
    secondary: crate::model::EdgeId,
    _type_bits: u16,
) {
    let (px, py, w, h) = sizes.cell_rect(x, y);
    let style_a = graph.edge_style(primary);
    let style_b = graph.edge_style(secondary);
    let ch = super::charset::cross_glyph(style_a, style_b);
    canvas.set(px + w / 2, py + h / 2, ch);
}

fn apply_end_flags(
    graph: &Graph,
    canvas: &mut Canvas,
    cfg: &RenderConfig,
    edge: crate::model::EdgeId,
    type_bits: u16,
    px: i64,
    py: i64,
    w: i64,
    h: i64,
) {
    let shape = graph
        .resolve_edge_attr(edge, "arrowshape")
        .map(ArrowShape::parse)
        .unwrap_or_default();
    let end = cell::end_flags(type_bits);
    let start = cell::start_flags(type_bits);
    if end == 0 && start == 0 {
        return;
    }

    // §4.8 "Apply start/end flags": every flagged side clips one character;
    // an END side additionally gets the arrow glyph when arrows are on.
    let sides = [
        (cell::END_E, cell::START_E, Side::East, px + w - 1, py + h / 2),
        (cell::END_W, cell::START_W, Side::West, px, py + h / 2),
        (cell::END_N, cell::START_N, Side::North, px + w / 2, py),
        (cell::END_S, cell::START_S, Side::South, px + w / 2, py + h - 1),
    ];
    for (end_flag, start_flag, side, sx, sy) in sides {
        if end & end_flag != 0 {
            let ch = if cfg.arrows { shape.glyph(side) } else { ' ' };
            canvas.set(sx, sy, ch);
        } else if start & start_flag != 0 {
            canvas.set(sx, sy, ' ');
        }
    }
}

fn draw_group_cell(
    graph: &Graph,
    canvas: &mut Canvas,
    sizes: &SizeTable,
    x: i64,
    y: i64,
    group: crate::model::GroupId,
    class: &str,
    label: bool,
) {
    let (px, py, w, h) = sizes.cell_rect(x, y);
    let border = graph
        .resolve_group_attr(group, "borderstyle")
        .map(BorderStyle::parse)
        .unwrap_or(BorderStyle::Dashed);
    if graph.group(group).is_anonymous() && graph.resolve_group_attr(group, "borderstyle").is_none() {
        return;
    }
    let ch = box_chars(border).horizontal;
    if class.contains("gt") {
        canvas.hline(px, py, w, ch);
    }
    if class.contains("gb") {
        canvas.hline(px, py + h - 1, w, ch);
    }
    if class.contains("gl") {
        canvas.vline(px, py, h, box_chars(border).vertical);
    }
    if class.contains("gr") {
        canvas.vline(px + w - 1, py, h, box_chars(border).vertical);
    }
    if class == " ga" {
        canvas.set(px, py, '+');
    }

    if label {
        if let Some(text) = graph.resolve_group_attr(group, "label") {
            let align = graph
                .resolve_group_attr(group, "align")
                .map(Align::parse)
                .unwrap_or_default();
            let (lines, aligns) = aligned_label(text, align, TextWrap::None);
            printfb_aligned(canvas, px as f64, py as f64, w as f64, h as f64, &lines, &aligns, VAnchor::Top);
        }
    }
}

fn apply_graph_label(graph: &Graph, text: &mut String) {
    let label = match graph.graph_attrs.get("label") {
        Some(l) if !l.is_empty() => l.clone(),
        _ => return,
    };
    let pos = graph
        .graph_attrs
        .get("labelpos")
        .map(|s| LabelPos::parse(s))
        .unwrap_or_default();
    let width = text.lines().map(|l| l.chars().count()).max().unwrap_or(0);
    let pad = width.saturating_sub(label.chars().count());
    let left = pad / 2;
    let right = pad - left + if width % 2 == 1 { 1 } else { 0 };
    let centered = format!("{}{}{}", " ".repeat(left), label, " ".repeat(right));
    match pos {
        LabelPos::Top => {
            *text = format!("{centered}\n\n{text}");
        }
        LabelPos::Bottom => {
            text.push('\n');
            text.push_str(&centered);
            text.push('\n');
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn render_to_string_ends_with_one_newline() {
        let canvas = Canvas::new(3, 2);
        let out = canvas.render_to_string();
        assert!(out.ends_with('\n'));
        assert!(!out.ends_with("\n\n"));
    }

    #[test]
    fn render_to_string_trims_trailing_blank_rows() {
        let mut canvas = Canvas::new(3, 3);
        canvas.set(0, 0, 'x');
        let out = canvas.render_to_string();
        assert_eq!(out, "x\n");
    }

    #[test]
    fn single_edge_renders_two_framed_nodes() {
        let mut g = Graph::new();
        let a = g.add_node("Bonn");
        let b = g.add_node("Berlin");
        g.node_mut(a).set_attr("label", "Bonn");
        g.node_mut(b).set_attr("label", "Berlin");
        g.add_edge(a, b, "-", "->", Some("car"));
        g.layout().unwrap();
        let out = rasterize(&g).unwrap();
        assert!(out.contains("Bonn"));
        assert!(out.contains("Berlin"));
        assert!(out.ends_with('\n'));
    }
}
