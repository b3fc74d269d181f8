//! Node sizing (§4.1): compute the minimum cell extent `(cx, cy)` a node
//! needs to expose a port per incident edge.

use std::collections::HashMap;

use crate::attr::PortHint;
use crate::cell::Side;
use crate::model::{Graph, NodeId};

const SIDES: [Side; 4] = [Side::North, Side::South, Side::East, Side::West];

fn degrees_to_side(deg: u32) -> Side {
    match deg % 360 {
        0 => Side::North,
        90 => Side::East,
        180 => Side::South,
        _ => Side::West,
    }
}

struct PortTally {
    cnt: HashMap<Side, i64>,
    portnr: HashMap<Side, i64>,
    max: HashMap<Side, i64>,
    unspecified: i64,
    outgoing: i64,
}

impl PortTally {
    fn new() -> Self {
        PortTally {
            cnt: SIDES.iter().map(|&s| (s, 0)).collect(),
            portnr: SIDES.iter().map(|&s| (s, 0)).collect(),
            max: SIDES.iter().map(|&s| (s, 0)).collect(),
            unspecified: 0,
            outgoing: 0,
        }
    }
}

pub fn compute_extents(graph: &mut Graph) {
    let node_ids: Vec<NodeId> = graph.nodes().map(|n| n.id).collect();
    for node_id in node_ids {
        let (cx, cy) = compute_node_extent(graph, node_id);
        let node = graph.node_mut(node_id);
        node.cx = cx;
        node.cy = cy;
    }
}

fn compute_node_extent(graph: &Graph, node_id: NodeId) -> (i64, i64) {
    // Explicit rows/columns short-circuits everything else.
    let explicit_cols = graph
        .resolve_node_attr(node_id, "columns")
        .and_then(|s| s.parse::<i64>().ok());
    let explicit_rows = graph
        .resolve_node_attr(node_id, "rows")
        .and_then(|s| s.parse::<i64>().ok());

    let node = graph.node(node_id);
    let mut tally = PortTally::new();
    let mut self_loops = 0i64;

    for &edge_id in &node.edges {
        let edge = graph.edge(edge_id);
        if edge.from == edge.to {
            self_loops += 1;
        }
        if edge.from == node_id {
            tally.outgoing += 1;
        }
        for (endpoint, hint_key) in [(edge.from, "start"), (edge.to, "end")] {
            if endpoint != node_id {
                continue;
            }
            match edge.attr(hint_key).and_then(PortHint::parse) {
                Some(PortHint { side, pos: Some(p) }) => {
                    *tally.portnr.entry(side).or_insert(0) += 1;
                    let needed = p.unsigned_abs() as i64 + 1;
                    let slot = tally.max.entry(side).or_insert(0);
                    *slot = (*slot).max(needed);
                }
                Some(PortHint { side, pos: None }) => {
                    *tally.cnt.entry(side).or_insert(0) += 1;
                }
                None => tally.unspecified += 1,
            }
        }
    }
    // Self-loops visit both endpoints of the same node; the walk above
    // double counts them once. Net them back out of `unspecified`.
    tally.unspecified -= self_loops;

    let total_unrestricted: i64 = SIDES.iter().map(|s| tally.cnt[s]).sum();
    let port_restricted = SIDES.iter().any(|s| tally.max[s] > 0);

    if total_unrestricted + tally.unspecified < 4 && !port_restricted {
        let cx = explicit_cols.unwrap_or(1).max(1);
        let cy = explicit_rows.unwrap_or(1).max(1);
        return (cx, cy);
    }

    let mut need: HashMap<Side, i64> = SIDES.iter().map(|&s| (s, tally.max[s])).collect();
    for &side in &SIDES {
        let free = tally.max[side] - tally.portnr[side];
        if free < tally.cnt[side] {
            let extra = 2 * tally.cnt[side] - free - 1;
            *need.get_mut(&side).unwrap() += extra.max(0);
        }
    }

    let mut cx = need[&Side::North].max(need[&Side::South]).max(1);
    let mut cy = need[&Side::West].max(need[&Side::East]).max(1);

    let flow = node
        .attr("flow")
        .map(|s| crate::attr::parse_flow(s, graph.flow()))
        .unwrap_or_else(|| graph.flow());
    let front = degrees_to_side(flow);

    let is_sink = tally.outgoing == 0 && !node.is_relative_anchor();

    let free_ports = |cx: i64, cy: i64| -> i64 {
        let mut total = 0;
        for &side in &SIDES {
            if is_sink && side == front {
                continue;
            }
            let capacity = match side {
                Side::North | Side::South => cy,
                Side::East | Side::West => cx,
            };
            total += capacity - tally.cnt[side] - tally.max[side];
        }
        total.max(0)
    };

    // Grow perpendicular-to-flow first for east/west flow, parallel second;
    // mirrored for north/south flow (§4.1 step 6).
    let grow_cy_first = matches!(front, Side::East | Side::West);
    while free_ports(cx, cy) < tally.unspecified {
        if grow_cy_first {
            cy += 2;
        } else {
            cx += 2;
        }
        if free_ports(cx, cy) >= tally.unspecified {
            break;
        }
        if grow_cy_first {
            cx += 2;
        } else {
            cy += 2;
        }
    }

    (explicit_cols.unwrap_or(cx).max(1), explicit_rows.unwrap_or(cy).max(1))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn simple_node_defaults_to_one_by_one() {
        let mut g = Graph::new();
        let a = g.add_node("A");
        let b = g.add_node("B");
        g.add_edge(a, b, "-", "->", None);
        compute_extents(&mut g);
        assert_eq!((g.node(a).cx, g.node(a).cy), (1, 1));
        assert_eq!((g.node(b).cx, g.node(b).cy), (1, 1));
    }

    #[test]
    fn explicit_columns_and_rows_are_honored() {
        let mut g = Graph::new();
        let a = g.add_node("A");
        g.node_mut(a).set_attr("columns", "3");
        g.node_mut(a).set_attr("rows", "1");
        for i in 0..3 {
            let b = g.add_node(&format!("B{i}"));
            g.add_edge(a, b, "-", "->", None);
        }
        compute_extents(&mut g);
        assert_eq!(g.node(a).cx, 3);
        assert_eq!(g.node(a).cy, 1);
    }

    #[test]
    fn many_unspecified_edges_grow_the_node() {
        let mut g = Graph::new();
        let a = g.add_node("A");
        for i in 0..8 {
            let b = g.add_node(&format!("B{i}"));
            g.add_edge(a, b, "-", "->", None);
        }
        compute_extents(&mut g);
        assert!(g.node(a).cx > 1 || g.node(a).cy > 1);
    }
}
