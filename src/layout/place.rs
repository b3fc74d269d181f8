//! Placement driver (§4.4): pops chain actions off a stack, places nodes on
//! the grid with a 2-unit rank spacing, and routes edges once both of their
//! endpoints are placed.

use std::collections::{HashMap, HashSet};

use crate::cell::Cell;
use crate::error::GraphResult;
use crate::model::{Graph, NodeId};

use super::chain::{build_chains, Action};
use super::router;

fn degrees_to_axis_is_x(flow_deg: u32) -> bool {
    matches!(flow_deg % 360, 90 | 270)
}

/// East/south flows grow rank along the positive axis; west/north flows
/// grow it along the negative axis (`x = ±along`, §4.4).
fn degrees_to_sign(flow_deg: u32) -> i64 {
    match flow_deg % 360 {
        90 | 180 => 1,
        _ => -1,
    }
}

/// Finds the smallest `y` (or `x`, depending on axis) at or after
/// `row_pointer` such that the node's `cx * cy` rectangle is entirely free.
fn place_node(graph: &mut Graph, node_id: NodeId, row_pointers: &mut HashMap<i64, i64>) {
    let flow = graph.flow();
    let rank = graph.node(node_id).rank.unwrap_or(-1).abs();
    let along = (rank - 1) * 2 * degrees_to_sign(flow);
    let (cx, cy) = (graph.node(node_id).cx, graph.node(node_id).cy);

    let axis_is_x = degrees_to_axis_is_x(flow);
    let pointer = row_pointers.entry(rank).or_insert(0);

    let mut cursor = *pointer;
    loop {
        let (x, y) = if axis_is_x { (along, cursor) } else { (cursor, along) };
        if rect_is_free(graph, x, y, cx, cy) {
            *pointer = cursor + if axis_is_x { cy } else { cx } + 1;
            fill_rect(graph, node_id, x, y, cx, cy);
            let node = graph.node_mut(node_id);
            node.x = x;
            node.y = y;
            return;
        }
        cursor += 1;
    }
}

fn rect_is_free(graph: &Graph, x: i64, y: i64, cx: i64, cy: i64) -> bool {
    for dx in 0..cx {
        for dy in 0..cy {
            if graph.cells.contains_key(&(x + dx, y + dy)) {
                return false;
            }
        }
    }
    true
}

fn fill_rect(graph: &mut Graph, node_id: NodeId, x: i64, y: i64, cx: i64, cy: i64) {
    graph.cells.insert((x, y), Cell::Node(node_id));
    for dx in 0..cx {
        for dy in 0..cy {
            if dx == 0 && dy == 0 {
                continue;
            }
            graph.cells.insert((x + dx, y + dy), Cell::NodeCell(node_id));
        }
    }
}

/// Runs the full chain/placement/routing pipeline over an already-ranked,
/// already-sized graph.
pub fn run(graph: &mut Graph) -> GraphResult<()> {
    let cfg = graph.render_config().clone();
    let actions = build_chains(graph);
    let mut row_pointers: HashMap<i64, i64> = HashMap::new();
    let mut placed: HashSet<NodeId> = HashSet::new();

    // Two passes: first place every node (so routing always sees both
    // endpoints already on the grid), then trace every edge in the order
    // the chains emitted them.
    for action in &actions {
        if let Action::Node(n) = action {
            if placed.insert(*n) {
                place_node(graph, *n, &mut row_pointers);
            }
        }
    }
    for action in &actions {
        match action {
            Action::Trace(e) | Action::SelfLoop(e) => {
                router::trace_path(graph, *e, &cfg)?;
            }
            Action::Node(_) => {}
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::{grow, rank};

    #[test]
    fn placed_nodes_do_not_overlap() {
        let mut g = Graph::new();
        let a = g.add_node("A");
        let b = g.add_node("B");
        let c = g.add_node("C");
        g.add_edge(a, b, "-", "->", None);
        g.add_edge(a, c, "-", "->", None);
        rank::assign_ranks(&mut g);
        grow::compute_extents(&mut g);
        run(&mut g).unwrap();
        assert_ne!((g.node(b).x, g.node(b).y), (g.node(c).x, g.node(c).y));
    }

    #[test]
    fn every_node_gets_an_anchor_cell() {
        let mut g = Graph::new();
        let a = g.add_node("A");
        let b = g.add_node("B");
        g.add_edge(a, b, "-", "->", None);
        rank::assign_ranks(&mut g);
        grow::compute_extents(&mut g);
        run(&mut g).unwrap();
        assert!(matches!(
            g.cells.get(&(g.node(a).x, g.node(a).y)),
            Some(Cell::Node(_))
        ));
    }
}
