//! Edge routing (§4.5): straight and single-bend fast paths, falling back
//! to an A* search on the character grid with crossing and bend penalties.
//!
//! The A* core (`OccupancyGrid`, the heuristic, the counter-tie-broken
//! `BinaryHeap`) is grounded on the teacher's `layout/pathfinder.rs`; this
//! module generalizes it to multi-cell nodes, port hints, crossing-cell
//! costs and end-flag application, none of which the teacher's single-cell
//! Mermaid nodes needed.

use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashMap, HashSet};

use crate::attr::PortHint;
use crate::cell::{self, Cell, Side};
use crate::config::RenderConfig;
use crate::error::{GraphError, GraphResult};
use crate::model::{EdgeId, Graph, NodeId};

type Point = (i64, i64);

#[derive(Debug, Clone, Copy)]
struct Rect {
    x: i64,
    y: i64,
    cx: i64,
    cy: i64,
}

impl Rect {
    fn is_unit(&self) -> bool {
        self.cx == 1 && self.cy == 1
    }

    fn contains(&self, p: Point) -> bool {
        p.0 >= self.x && p.0 < self.x + self.cx && p.1 >= self.y && p.1 < self.y + self.cy
    }
}

fn node_rect(graph: &Graph, node: NodeId) -> Rect {
    let n = graph.node(node);
    Rect {
        x: n.x,
        y: n.y,
        cx: n.cx,
        cy: n.cy,
    }
}

/// Grid squares immediately adjacent to `rect` on each open side, paired
/// with the side they sit on. A port hint restricts the result to one side
/// (and, with a position, to a single cell on that side).
fn near_places(rect: Rect, hint: Option<PortHint>) -> Vec<(Point, Side)> {
    let mut out = Vec::new();
    let sides = match hint {
        Some(h) => vec![h.side],
        None => vec![Side::North, Side::South, Side::East, Side::West],
    };
    for side in sides {
        let span: Vec<i64> = match side {
            Side::North | Side::South => (rect.x..rect.x + rect.cx).collect(),
            Side::East | Side::West => (rect.y..rect.y + rect.cy).collect(),
        };
        let span = match hint.and_then(|h| h.pos) {
            Some(pos) => {
                let idx = if pos < 0 {
                    (span.len() as i64 + pos).max(0) as usize
                } else {
                    (pos as usize).min(span.len().saturating_sub(1))
                };
                vec![span[idx]]
            }
            None => span,
        };
        for coord in span {
            let p = match side {
                Side::North => (coord, rect.y - 1),
                Side::South => (coord, rect.y + rect.cy),
                Side::East => (rect.x + rect.cx, coord),
                Side::West => (rect.x - 1, coord),
            };
            out.push((p, side));
        }
    }
    out
}

fn port_hint_of(graph: &Graph, edge: EdgeId, key: &str) -> Option<PortHint> {
    graph.resolve_edge_attr(edge, key).and_then(PortHint::parse)
}

/// Manhattan distance plus a one-cell penalty when both axes differ (§4.5).
fn heuristic(a: Point, b: Point) -> i64 {
    let dx = (a.0 - b.0).abs();
    let dy = (a.1 - b.1).abs();
    if dx == 0 || dy == 0 {
        dx + dy
    } else {
        dx + dy + 1
    }
}

const DIRS: [(i64, i64); 4] = [(0, 1), (0, -1), (1, 0), (-1, 0)];

struct Bounds {
    x0: i64,
    y0: i64,
    x1: i64,
    y1: i64,
}

fn occupied_bounds(graph: &Graph, pad: i64) -> Bounds {
    let mut x0 = 0i64;
    let mut y0 = 0i64;
    let mut x1 = 0i64;
    let mut y1 = 0i64;
    for (&(x, y), _) in graph.cells.iter() {
        x0 = x0.min(x);
        y0 = y0.min(y);
        x1 = x1.max(x);
        y1 = y1.max(y);
    }
    for n in graph.nodes() {
        x0 = x0.min(n.x);
        y0 = y0.min(n.y);
        x1 = x1.max(n.x + n.cx - 1);
        y1 = y1.max(n.y + n.cy - 1);
    }
    Bounds {
        x0: x0 - pad,
        y0: y0 - pad,
        x1: x1 + pad,
        y1: y1 + pad,
    }
}

fn node_blocked(graph: &Graph, p: Point, except: &[NodeId]) -> bool {
    graph.nodes().any(|n| {
        !except.contains(&n.id)
            && node_rect(graph, n.id).contains(p)
    })
}

/// Multi-source, multi-goal A* over the character grid.
fn a_star(
    graph: &Graph,
    bounds: &Bounds,
    starts: &[(Point, Side)],
    goals: &HashSet<Point>,
    except: &[NodeId],
    step_budget: u64,
) -> Option<Vec<Point>> {
    let mut counter: u64 = 0;
    let mut open: BinaryHeap<Reverse<(i64, u64, Point)>> = BinaryHeap::new();
    let mut cost_so_far: HashMap<Point, i64> = HashMap::new();
    let mut came_from: HashMap<Point, Option<Point>> = HashMap::new();
    let mut last_dir: HashMap<Point, (i64, i64)> = HashMap::new();

    let nearest_goal_h = |p: Point| -> i64 {
        goals.iter().map(|&g| heuristic(p, g)).min().unwrap_or(0)
    };

    for &(p, side) in starts {
        let crossing_malus = if matches!(
            graph.cells.get(&p).and_then(Cell::as_edge_type).map(cell::base_type),
            Some(cell::HOR) | Some(cell::VER)
        ) {
            30
        } else {
            0
        };
        let h = nearest_goal_h(p) + crossing_malus;
        cost_so_far.insert(p, 0);
        came_from.insert(p, None);
        let into = match side {
            Side::North => (0, -1),
            Side::South => (0, 1),
            Side::East => (1, 0),
            Side::West => (-1, 0),
        };
        last_dir.insert(p, into);
        counter += 1;
        open.push(Reverse((h, counter, p)));
    }

    let mut steps: u64 = 0;
    while let Some(Reverse((_, _, cur))) = open.pop() {
        if goals.contains(&cur) {
            let mut path = Vec::new();
            let mut at = Some(cur);
            while let Some(p) = at {
                path.push(p);
                at = came_from.get(&p).copied().flatten();
            }
            path.reverse();
            return Some(path);
        }
        steps += 1;
        if steps > step_budget {
            return None;
        }
        let current_cost = *cost_so_far.get(&cur).unwrap_or(&i64::MAX);
        let prev_dir = last_dir.get(&cur).copied();
        for (dx, dy) in DIRS {
            let next = (cur.0 + dx, cur.1 + dy);
            if next.0 < bounds.x0 || next.0 > bounds.x1 || next.1 < bounds.y0 || next.1 > bounds.y1
            {
                continue;
            }
            let existing = graph.cells.get(&next);
            let is_hv_edge = matches!(
                existing.and_then(Cell::as_edge_type).map(cell::base_type),
                Some(cell::HOR) | Some(cell::VER)
            );
            if !goals.contains(&next) {
                if node_blocked(graph, next, except) {
                    continue;
                }
                if existing.is_some() && !is_hv_edge {
                    continue;
                }
            }
            let mut step_cost = 1;
            if is_hv_edge {
                step_cost += 30;
            }
            if let Some(pd) = prev_dir {
                if pd != (dx, dy) {
                    step_cost += 6;
                }
            }
            let new_cost = current_cost + step_cost;
            if new_cost < *cost_so_far.get(&next).unwrap_or(&i64::MAX) {
                cost_so_far.insert(next, new_cost);
                came_from.insert(next, Some(cur));
                last_dir.insert(next, (dx, dy));
                let priority = new_cost + nearest_goal_h(next);
                counter += 1;
                open.push(Reverse((priority, counter, next)));
            }
        }
    }
    None
}

/// Collinear-run simplification: keep only direction-change points.
fn simplify(path: Vec<Point>) -> Vec<Point> {
    if path.len() <= 2 {
        return path;
    }
    let mut out = vec![path[0]];
    for i in 1..path.len() - 1 {
        let (px, py) = path[i - 1];
        let (cx, cy) = path[i];
        let (nx, ny) = path[i + 1];
        if (cx - px, cy - py) != (nx - cx, ny - cy) {
            out.push(path[i]);
        }
    }
    out.push(*path.last().unwrap());
    out
}

/// Straighten one Z/S-shaped triple of bends by detouring through a free
/// neighbor, if the whole detour is unoccupied (§4.5 post-processing).
fn straighten(graph: &Graph, path: Vec<Point>, except: &[NodeId]) -> Vec<Point> {
    if path.len() < 5 {
        return path;
    }
    let mut path = path;
    let mut i = 1;
    while i + 2 < path.len() {
        let a = path[i - 1];
        let b = path[i];
        let c = path[i + 1];
        let d = path[i + 2];
        let dir_ab = (b.0 - a.0, b.1 - a.1);
        let dir_cd = (d.0 - c.0, d.1 - c.1);
        // Z/S pattern: both outer legs run parallel, perpendicular to the
        // short middle leg.
        if dir_ab == dir_cd && dir_ab.0.abs() + dir_ab.1.abs() == 1 {
            let mid = (b.0 + (c.0 - b.0), a.1 + (c.1 - b.1));
            let candidate = (a.0 + dir_ab.0, a.1 + dir_ab.1);
            if candidate != b
                && !node_blocked(graph, candidate, except)
                && !graph.cells.contains_key(&candidate)
                && mid == c
            {
                path[i] = candidate;
            }
        }
        i += 1;
    }
    path
}

fn type_for_step(prev: Option<(i64, i64)>, next: Option<(i64, i64)>) -> u16 {
    // prev/next are unit direction vectors of the step *into* and *out of*
    // this cell. Classify via the fixed table in §4.5.
    match (prev, next) {
        (Some((0, _)), Some((0, _))) => cell::VER,
        (Some((_, 0)), Some((_, 0))) => cell::HOR,
        (Some((0, -1)), Some((1, 0))) | (Some((-1, 0)), Some((0, 1))) => cell::S_E,
        (Some((0, -1)), Some((-1, 0))) | (Some((1, 0)), Some((0, 1))) => cell::S_W,
        (Some((0, 1)), Some((1, 0))) | (Some((-1, 0)), Some((0, -1))) => cell::N_E,
        (Some((0, 1)), Some((-1, 0))) | (Some((1, 0)), Some((0, -1))) => cell::N_W,
        (None, Some((0, _))) | (Some((0, _)), None) => cell::VER,
        (None, Some((_, 0))) | (Some((_, 0)), None) => cell::HOR,
        _ => cell::CROSS,
    }
}

pub fn trace_path(graph: &mut Graph, edge_id: EdgeId, cfg: &RenderConfig) -> GraphResult<()> {
    let edge = graph.edge(edge_id).clone();
    if edge.from == edge.to {
        return route_self_loop(graph, edge_id);
    }
    let src_rect = node_rect(graph, edge.from);
    let dst_rect = node_rect(graph, edge.to);
    let start_hint = port_hint_of(graph, edge_id, "start");
    let end_hint = port_hint_of(graph, edge_id, "end");

    let mut points: Option<Vec<Point>> = None;

    if src_rect.is_unit() && dst_rect.is_unit() && start_hint.is_none() && end_hint.is_none() {
        points = try_straight(src_rect, dst_rect)
            .or_else(|| try_single_bend(graph, src_rect, dst_rect, &[edge.from, edge.to]));
    }

    if points.is_none() {
        let bounds = occupied_bounds(graph, cfg.astar_pad);
        let starts = near_places(src_rect, start_hint);
        let goal_places = near_places(dst_rect, end_hint);
        let goals: HashSet<Point> = goal_places.iter().map(|&(p, _)| p).collect();
        let raw = a_star(
            graph,
            &bounds,
            &starts,
            &goals,
            &[edge.from, edge.to],
            cfg.astar_step_budget,
        )
        .ok_or_else(|| GraphError::RoutingFailure {
            from: graph.node(edge.from).name.clone(),
            to: graph.node(edge.to).name.clone(),
        })?;
        points = Some(simplify(raw));
    }

    let mut points = points.unwrap();
    points = straighten(graph, points, &[edge.from, edge.to]);
    commit_path(graph, edge_id, points)
}

fn try_straight(src: Rect, dst: Rect) -> Option<Vec<Point>> {
    let src_cx = src.x;
    let src_cy = src.y;
    let dst_cx = dst.x;
    let dst_cy = dst.y;
    if src_cx == dst_cx {
        let (y0, y1) = (src_cy.min(dst_cy), src_cy.max(dst_cy));
        Some((y0..=y1).map(|y| (src_cx, y)).collect())
    } else if src_cy == dst_cy {
        let (x0, x1) = (src_cx.min(dst_cx), src_cx.max(dst_cx));
        Some((x0..=x1).map(|x| (x, src_cy)).collect())
    } else {
        None
    }
}

fn try_single_bend(
    graph: &Graph,
    src: Rect,
    dst: Rect,
    except: &[NodeId],
) -> Option<Vec<Point>> {
    let corners = [(dst.x, src.y), (src.x, dst.y)];
    for corner in corners {
        if node_blocked(graph, corner, except) || graph.cells.contains_key(&corner) {
            continue;
        }
        let mut path = Vec::new();
        let xs = if src.x < corner.0 {
            (src.x..=corner.0).collect::<Vec<_>>()
        } else {
            (corner.0..=src.x).rev().collect::<Vec<_>>()
        };
        for x in &xs {
            path.push((*x, src.y));
        }
        let ys = if corner.1 < dst.y {
            (corner.1..=dst.y).collect::<Vec<_>>()
        } else {
            (dst.y..=corner.1).rev().collect::<Vec<_>>()
        };
        for y in ys.into_iter().skip(1) {
            path.push((corner.0, y));
        }
        if path.last() == Some(&(dst.x, dst.y)) {
            return Some(path);
        }
    }
    None
}

fn commit_path(graph: &mut Graph, edge_id: EdgeId, points: Vec<Point>) -> GraphResult<()> {
    if points.len() < 2 {
        return Err(GraphError::internal("routed path shorter than two cells"));
    }

    let edge = graph.edge(edge_id).clone();
    let n = points.len();
    let mut types = Vec::with_capacity(n);
    for i in 0..n {
        let prev = if i == 0 { None } else { Some((points[i].0 - points[i - 1].0, points[i].1 - points[i - 1].1)) };
        let next = if i + 1 == n { None } else { Some((points[i + 1].0 - points[i].0, points[i + 1].1 - points[i].1)) };
        types.push(type_for_step(prev, next));
    }

    if n == 2 {
        types[0] = cell::SHORT_CELL;
    }

    // Label cell: the first routeable (non-crossing) cell.
    if let Some(idx) = (0..n).find(|&i| !is_crossing(graph, points[i])) {
        types[idx] |= cell::LABEL_CELL;
    }

    apply_end_flags(graph, &edge, &points, &mut types);

    for (i, &p) in points.iter().enumerate() {
        place_edge_cell(graph, edge_id, p, types[i]);
    }
    graph.edge_mut(edge_id).cell_path = points;
    Ok(())
}

fn is_crossing(graph: &Graph, p: Point) -> bool {
    matches!(graph.cells.get(&p), Some(Cell::CrossCell { .. }))
        || matches!(
            graph.cells.get(&p).and_then(Cell::as_edge_type).map(cell::base_type),
            Some(cell::HOR) | Some(cell::VER)
        )
}

fn apply_end_flags(graph: &Graph, edge: &crate::model::Edge, points: &[Point], types: &mut [u16]) {
    let n = points.len();
    let step = |a: Point, b: Point| -> (i64, i64) { ((b.0 - a.0).signum(), (b.1 - a.1).signum()) };
    let (dx0, dy0) = step(points[0], points[1]);
    let (dxn, dyn_) = step(points[n - 2], points[n - 1]);

    let start_shape_edge = graph.node(edge.from).attr("shape") == Some("edge");
    let end_shape_edge = graph.node(edge.to).attr("shape") == Some("edge");

    if let Some(opp) = Side::from_step(dx0, dy0).map(Side::opposite) {
        if edge.bidirectional {
            if !start_shape_edge {
                types[0] |= opp.end_flag();
            }
        } else if !start_shape_edge {
            types[0] |= opp.start_flag();
        }
    }
    if let Some(side) = Side::from_step(dxn, dyn_) {
        if edge.undirected {
            if !end_shape_edge {
                types[n - 1] |= side.start_flag();
            }
        } else if !end_shape_edge {
            types[n - 1] |= side.end_flag();
        }
    }
}

fn place_edge_cell(graph: &mut Graph, edge_id: EdgeId, p: Point, type_bits: u16) {
    match graph.cells.get(&p) {
        Some(Cell::EdgeCell {
            edge: other,
            type_bits: other_type,
        }) if cell::base_type(*other_type) == cell::HOR || cell::base_type(*other_type) == cell::VER =>
        {
            let other = *other;
            graph.cells.insert(
                p,
                Cell::CrossCell {
                    primary: other,
                    secondary: edge_id,
                    type_bits: cell::CROSS,
                },
            );
        }
        _ => {
            graph.cells.insert(p, Cell::EdgeCell { edge: edge_id, type_bits });
        }
    }
}

fn route_self_loop(graph: &mut Graph, edge_id: EdgeId) -> GraphResult<()> {
    let edge = graph.edge(edge_id).clone();
    let rect = node_rect(graph, edge.from);
    // A loop hangs off the node's east side as a single oversized cell
    // (§3, §4.8 "Loops") rather than a multi-point path — `correctSizeEdgeCell`
    // already reserves 7-8 columns by 5 rows for the loop base types, so the
    // cell itself carries the whole visible shape.
    let point = (rect.x + rect.cx, rect.y);
    let t = cell::E_S_W | cell::START_W | cell::END_W | cell::LABEL_CELL;
    place_edge_cell(graph, edge_id, point, t);
    graph.edge_mut(edge_id).cell_path = vec![point];
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::{grow, place, rank};

    fn route_simple(flow_east: bool) -> Graph {
        let mut g = Graph::new();
        let a = g.add_node("A");
        let b = g.add_node("B");
        g.add_edge(a, b, "-", "->", None);
        if !flow_east {
            g.set_graph_attributes(HashMap::from([("flow".to_string(), "south".to_string())]));
        }
        rank::assign_ranks(&mut g);
        grow::compute_extents(&mut g);
        place::run(&mut g).unwrap();
        g
    }

    use std::collections::HashMap;

    #[test]
    fn straight_path_connects_adjacent_nodes() {
        let mut g = route_simple(true);
        let edge_id = g.edges().next().unwrap().id;
        let cfg = RenderConfig::default();
        trace_path(&mut g, edge_id, &cfg).unwrap();
        let path = g.edge(edge_id).cell_path.clone();
        assert!(path.len() >= 2);
    }

    #[test]
    fn self_loop_routes_without_error() {
        let mut g = Graph::new();
        let a = g.add_node("A");
        let e = g.add_edge(a, a, "-", "->", None);
        grow::compute_extents(&mut g);
        let cfg = RenderConfig::default();
        trace_path(&mut g, e, &cfg).unwrap();
        assert_eq!(g.edge(e).cell_path.len(), 1);
    }
}
