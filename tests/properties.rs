//! Property tests over the eight invariants laid out for the rendering
//! pipeline: routed cell-path connectivity, non-overlapping cells, node
//! anchor/placeholder counts, idempotent layout and rendering, group
//! membership of cells, and the trailing-newline guarantee.

use std::collections::HashSet;

use asciigraph_core::cell::Cell;
use asciigraph_core::model::Graph;
use proptest::prelude::*;

/// Builds a small connected-ish graph: `node_count` nodes, each (after the
/// first) wired to a uniformly-chosen earlier node, so the graph stays
/// small enough for A*'s default step budget regardless of shape.
fn build_graph(node_count: usize, extra_edges: &[(usize, usize)]) -> Graph {
    let mut g = Graph::new();
    let mut ids = Vec::with_capacity(node_count);
    for i in 0..node_count {
        ids.push(g.add_node(&format!("N{i}")));
    }
    for i in 1..node_count {
        g.add_edge(ids[i - 1], ids[i], "-", "->", None);
    }
    for &(from, to) in extra_edges {
        if from < node_count && to < node_count && from != to {
            g.add_edge(ids[from], ids[to], "-", "->", None);
        }
    }
    g
}

fn node_count_strategy() -> impl Strategy<Value = usize> {
    1usize..6
}

fn extra_edges_strategy() -> impl Strategy<Value = Vec<(usize, usize)>> {
    prop::collection::vec((0usize..6, 0usize..6), 0..4)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// Invariant 1: every edge's cell path is a 4-connected walk.
    #[test]
    fn edge_paths_are_four_connected(n in node_count_strategy(), extra in extra_edges_strategy()) {
        let mut g = build_graph(n, &extra);
        g.layout().unwrap();
        for edge in g.edges() {
            let path = &edge.cell_path;
            for window in path.windows(2) {
                let (ax, ay) = window[0];
                let (bx, by) = window[1];
                let manhattan = (ax - bx).abs() + (ay - by).abs();
                prop_assert!(manhattan <= 2, "edge {:?} path step not adjacent: {:?} -> {:?}", edge.id, window[0], window[1]);
            }
        }
    }

    /// Invariant 2: the cell map never has two distinct entities claiming
    /// the same coordinate outside of an explicit CrossCell.
    #[test]
    fn cells_occupy_distinct_coordinates(n in node_count_strategy(), extra in extra_edges_strategy()) {
        let mut g = build_graph(n, &extra);
        g.layout().unwrap();
        let mut seen: HashSet<(i64, i64)> = HashSet::new();
        for (&p, _) in g.cells.iter() {
            prop_assert!(seen.insert(p), "duplicate cell map key at {:?}", p);
        }
    }

    /// Invariant 3: a multi-cell node contributes exactly one Node anchor
    /// and cx*cy - 1 NodeCell placeholders within its rectangle.
    #[test]
    fn multi_cell_nodes_have_one_anchor(n in node_count_strategy(), extra in extra_edges_strategy()) {
        let mut g = build_graph(n, &extra);
        g.node_mut(asciigraph_core::model::NodeId(0)).set_attr("columns", "3");
        g.node_mut(asciigraph_core::model::NodeId(0)).set_attr("rows", "2");
        g.layout().unwrap();
        let node = g.node(asciigraph_core::model::NodeId(0));
        if node.cx > 1 || node.cy > 1 {
            let mut anchors = 0;
            let mut placeholders = 0;
            for dx in 0..node.cx {
                for dy in 0..node.cy {
                    match g.cells.get(&(node.x + dx, node.y + dy)) {
                        Some(Cell::Node(id)) if *id == node.id => anchors += 1,
                        Some(Cell::NodeCell(id)) if *id == node.id => placeholders += 1,
                        _ => {}
                    }
                }
            }
            prop_assert_eq!(anchors, 1);
            prop_assert_eq!(placeholders, node.cx * node.cy - 1);
        }
    }

    /// Invariant 4: re-running layout() without intervening mutation is a
    /// no-op that reproduces the same cell map.
    #[test]
    fn layout_is_idempotent(n in node_count_strategy(), extra in extra_edges_strategy()) {
        let mut g = build_graph(n, &extra);
        g.layout().unwrap();
        let first: Vec<((i64, i64), String)> = {
            let mut v: Vec<_> = g.cells.iter().map(|(&p, c)| (p, format!("{c:?}"))).collect();
            v.sort();
            v
        };
        g.layout().unwrap();
        let second: Vec<((i64, i64), String)> = {
            let mut v: Vec<_> = g.cells.iter().map(|(&p, c)| (p, format!("{c:?}"))).collect();
            v.sort();
            v
        };
        prop_assert_eq!(first, second);
    }

    /// Invariant 5: re-rendering without intervening mutation is identical.
    #[test]
    fn as_ascii_is_idempotent(n in node_count_strategy(), extra in extra_edges_strategy()) {
        let mut g = build_graph(n, &extra);
        let first = g.as_ascii().unwrap();
        let second = g.as_ascii().unwrap();
        prop_assert_eq!(first, second);
    }

    /// Invariant 7: the rendered string ends with exactly one newline.
    #[test]
    fn rendered_output_ends_with_one_newline(n in node_count_strategy(), extra in extra_edges_strategy()) {
        let mut g = build_graph(n, &extra);
        let out = g.as_ascii().unwrap();
        prop_assert!(out.ends_with('\n'));
        prop_assert!(!out.ends_with("\n\n"));
    }
}

/// Invariant 6: every cell belonging to a laid-out group is either one of
/// the group's own members, an edge wholly between two of its members, or
/// a GroupCell tagged with that group.
#[test]
fn group_cells_respect_membership() {
    let mut g = Graph::new();
    let a = g.add_node("A");
    let b = g.add_node("B");
    let c = g.add_node("C");
    g.add_edge(a, b, "-", "->", None);
    g.add_edge(b, c, "-", "->", None);
    let group = g.add_group("cluster");
    g.group_add_node(group, a);
    g.group_add_node(group, b);
    g.layout().unwrap();

    for (_, cell) in g.cells.iter() {
        match cell {
            Cell::Node(id) | Cell::NodeCell(id) => {
                if g.owning_group(*id) == Some(group) {
                    assert!(*id == a || *id == b);
                }
            }
            Cell::EdgeCell { edge, .. } => {
                let e = g.edge(*edge);
                if g.owning_group(e.from) == Some(group) && g.owning_group(e.to) == Some(group) {
                    assert!((e.from == a && e.to == b) || (e.from == b && e.to == a));
                }
            }
            Cell::GroupCell { group: gid, .. } => {
                assert_eq!(*gid, group);
            }
            Cell::CrossCell { .. } | Cell::EdgeCellEmpty => {}
        }
    }
}
