//! Group cell fill (§4.6, §4.7): doubles the grid so group borders have
//! somewhere to live, then fills GroupCells around every group member and
//! picks one to carry the group's label.

use std::collections::{HashMap, HashSet};

use crate::attr::{Align, LabelPos};
use crate::cell::Cell;
use crate::model::{EdgeId, Graph, GroupId, NodeId};

pub fn fill_groups(graph: &mut Graph) {
    if graph.groups().next().is_none() {
        return;
    }
    double_grid(graph);
    splice_edges(graph);
    repair_nodes(graph);
    add_group_cells(graph);
    close_group_gaps(graph);
    assign_group_classes(graph);
    place_group_labels(graph);
}

fn double_grid(graph: &mut Graph) {
    let old: Vec<((i64, i64), Cell)> = graph.cells.drain().collect();
    for ((x, y), cell) in old {
        graph.cells.insert((x * 2, y * 2), cell);
    }
    for node in graph.nodes.iter_mut() {
        node.x *= 2;
        node.y *= 2;
    }
    for edge in graph.edges.iter_mut() {
        for p in edge.cell_path.iter_mut() {
            p.0 *= 2;
            p.1 *= 2;
        }
    }
}

/// Wherever two cells belonging to the same edge (or a crossing) are now
/// two apart on an axis, insert a connecting HOR/VER filler between them.
fn splice_edges(graph: &mut Graph) {
    let edge_ids: Vec<EdgeId> = graph.edges().map(|e| e.id).collect();
    for edge_id in edge_ids {
        let path = graph.edge(edge_id).cell_path.clone();
        let mut filled = Vec::with_capacity(path.len() * 2);
        for window in path.windows(2) {
            let (ax, ay) = window[0];
            let (bx, by) = window[1];
            filled.push((ax, ay));
            let dx = bx - ax;
            let dy = by - ay;
            if dx.abs() == 2 && dy == 0 {
                let mid = (ax + dx.signum(), ay);
                graph.cells.entry(mid).or_insert(Cell::EdgeCell {
                    edge: edge_id,
                    type_bits: crate::cell::HOR,
                });
                filled.push(mid);
            } else if dy.abs() == 2 && dx == 0 {
                let mid = (ax, ay + dy.signum());
                graph.cells.entry(mid).or_insert(Cell::EdgeCell {
                    edge: edge_id,
                    type_bits: crate::cell::VER,
                });
                filled.push(mid);
            }
        }
        if let Some(&last) = path.last() {
            filled.push(last);
        }
        graph.edge_mut(edge_id).cell_path = filled;
    }
}

fn repair_nodes(graph: &mut Graph) {
    let node_ids: Vec<NodeId> = graph.nodes().map(|n| n.id).collect();
    for node_id in node_ids {
        let (x, y, cx, cy) = {
            let n = graph.node(node_id);
            (n.x, n.y, n.cx, n.cy)
        };
        let new_cx = 2 * cx - 1;
        let new_cy = 2 * cy - 1;
        for dx in 0..new_cx {
            for dy in 0..new_cy {
                if dx == 0 && dy == 0 {
                    continue;
                }
                graph
                    .cells
                    .entry((x + dx, y + dy))
                    .or_insert(Cell::NodeCell(node_id));
            }
        }
        let n = graph.node_mut(node_id);
        n.cx = new_cx;
        n.cy = new_cy;
    }
}

fn entity_group(graph: &Graph, cell: &Cell) -> Option<GroupId> {
    if let Some(node) = cell.owning_node() {
        return graph.owning_group(node);
    }
    if let Some(edge) = cell.owning_edge() {
        let e = graph.edge(edge);
        let gf = graph.owning_group(e.from);
        let gt = graph.owning_group(e.to);
        if gf.is_some() && gf == gt {
            return gf;
        }
    }
    None
}

fn add_group_cells(graph: &mut Graph) {
    let owned: Vec<((i64, i64), GroupId)> = graph
        .cells
        .iter()
        .filter_map(|(&p, c)| entity_group(graph, c).map(|g| (p, g)))
        .collect();

    let mut to_add: HashMap<(i64, i64), GroupId> = HashMap::new();
    for ((x, y), group) in &owned {
        for (dx, dy) in [(0, -1), (0, 1), (1, 0), (-1, 0)] {
            let p = (x + dx, y + dy);
            if !graph.cells.contains_key(&p) {
                to_add.entry(p).or_insert(*group);
            }
        }
    }
    for (p, group) in to_add {
        graph.cells.insert(
            p,
            Cell::GroupCell {
                group,
                class: String::new(),
                label: false,
            },
        );
    }
}

fn close_group_gaps(graph: &mut Graph) {
    let cells: Vec<((i64, i64), GroupId)> = graph
        .cells
        .iter()
        .filter_map(|(&p, c)| c.owning_group().map(|g| (p, g)))
        .collect();
    let index: HashSet<(i64, i64)> = cells.iter().map(|&(p, _)| p).collect();
    let mut to_add = Vec::new();
    for &((x, y), group) in &cells {
        for (dx, dy) in [(0, 2), (2, 0)] {
            let far = (x + dx, y + dy);
            if index.contains(&far) && !graph.cells.contains_key(&(x + dx / 2, y + dy / 2)) {
                to_add.push(((x + dx / 2, y + dy / 2), group));
            }
        }
    }
    for (p, group) in to_add {
        graph.cells.insert(
            p,
            Cell::GroupCell {
                group,
                class: String::new(),
                label: false,
            },
        );
    }
}

fn assign_group_classes(graph: &mut Graph) {
    let coords: Vec<(i64, i64)> = graph
        .cells
        .iter()
        .filter(|(_, c)| matches!(c, Cell::GroupCell { .. }))
        .map(|(&p, _)| p)
        .collect();
    for (x, y) in coords {
        let group = match graph.cells.get(&(x, y)) {
            Some(Cell::GroupCell { group, .. }) => *group,
            _ => continue,
        };
        let mut tokens = Vec::new();
        let sides = [
            ((0, -1), " gt"),
            ((0, 1), " gb"),
            ((1, 0), " gr"),
            ((-1, 0), " gl"),
        ];
        for ((dx, dy), token) in sides {
            let neighbor_group = graph.cells.get(&(x + dx, y + dy)).and_then(|c| match c {
                Cell::GroupCell { group, .. } => Some(*group),
                _ => entity_group(graph, c),
            });
            if neighbor_group != Some(group) {
                tokens.push(token);
            }
        }
        let class = if tokens.len() == 4 {
            " ga".to_string()
        } else {
            tokens.concat()
        };
        if let Some(Cell::GroupCell { class: c, .. }) = graph.cells.get_mut(&(x, y)) {
            *c = class;
        }
    }
}

fn place_group_labels(graph: &mut Graph) {
    let group_ids: Vec<GroupId> = graph.groups().map(|g| g.id).collect();
    for group in group_ids {
        let align = graph
            .resolve_group_attr(group, "align")
            .map(Align::parse)
            .unwrap_or_default();
        let labelpos = graph
            .resolve_group_attr(group, "labelpos")
            .map(LabelPos::parse)
            .unwrap_or_default();
        let wanted = match labelpos {
            LabelPos::Top => " gt",
            LabelPos::Bottom => " gb",
        };

        let mut candidates: Vec<(i64, i64)> = graph
            .cells
            .iter()
            .filter(|(_, c)| match c {
                Cell::GroupCell { group: g, class, .. } => *g == group && class == wanted,
                _ => false,
            })
            .map(|(&p, _)| p)
            .collect();
        candidates.sort();
        if candidates.is_empty() {
            continue;
        }
        let min_y = candidates.iter().map(|p| p.1).min().unwrap();
        let row: Vec<(i64, i64)> = candidates.into_iter().filter(|p| p.1 == min_y).collect();
        let chosen = match align {
            Align::Left => *row.first().unwrap(),
            Align::Right => *row.last().unwrap(),
            Align::Center => {
                let min_x = row.iter().map(|p| p.0).min().unwrap();
                let max_x = row.iter().map(|p| p.0).max().unwrap();
                let mid = (min_x + max_x) as f64 / 2.0;
                *row
                    .iter()
                    .min_by(|a, b| {
                        let da = (a.0 as f64 - mid).powi(2);
                        let db = (b.0 as f64 - mid).powi(2);
                        da.partial_cmp(&db).unwrap()
                    })
                    .unwrap()
            }
        };
        if let Some(Cell::GroupCell { label, .. }) = graph.cells.get_mut(&chosen) {
            *label = true;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::{grow, place, rank};

    #[test]
    fn group_members_get_surrounding_group_cells() {
        let mut g = Graph::new();
        let a = g.add_node("A");
        let b = g.add_node("B");
        g.add_edge(a, b, "-", "->", None);
        let group = g.add_group("");
        g.group_add_node(group, a);
        g.group_add_node(group, b);
        rank::assign_ranks(&mut g);
        grow::compute_extents(&mut g);
        place::run(&mut g).unwrap();
        fill_groups(&mut g);
        let has_group_cell = g
            .cells
            .values()
            .any(|c| matches!(c, Cell::GroupCell { group: gid, .. } if *gid == group));
        assert!(has_group_cell);
    }
}
