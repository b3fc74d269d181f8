//! Rank assignment (§4.2): a priority-queue BFS that assigns every node an
//! integer rank, negative for auto-assigned and positive for user-specified.

use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashSet};

use crate::model::{Graph, NodeId};

pub fn assign_ranks(graph: &mut Graph) {
    let node_ids: Vec<NodeId> = graph.nodes().map(|n| n.id).collect();
    if node_ids.is_empty() {
        return;
    }

    let mut ranks: Vec<Option<i64>> = vec![None; graph.nodes.len()];
    for &id in &node_ids {
        if let Some(user_rank) = graph.node(id).rank {
            ranks[id.0] = Some(user_rank);
        }
    }

    let has_predecessor: HashSet<NodeId> = graph.edges().map(|e| e.to).collect();

    // Heap ordered by |rank|, ascending id as tiebreak (§9 "Design
    // Notes" monotonic-id discipline fills in where §4.2 is silent on ties).
    let mut heap: BinaryHeap<Reverse<(i64, usize)>> = BinaryHeap::new();
    let mut seed = |heap: &mut BinaryHeap<Reverse<(i64, usize)>>, ranks: &mut Vec<Option<i64>>| {
        if let Some(root) = graph.root() {
            if ranks[root.0].is_none() {
                ranks[root.0] = Some(-1);
            }
            heap.push(Reverse((ranks[root.0].unwrap().abs(), root.0)));
        }
        for &id in &node_ids {
            if let Some(r) = ranks[id.0] {
                heap.push(Reverse((r.abs(), id.0)));
            } else if !has_predecessor.contains(&id) {
                ranks[id.0] = Some(-1);
                heap.push(Reverse((1, id.0)));
            }
        }
    };
    seed(&mut heap, &mut ranks);

    let mut visited = vec![false; graph.nodes.len()];
    loop {
        while let Some(Reverse((_, idx))) = heap.pop() {
            if visited[idx] {
                continue;
            }
            visited[idx] = true;
            let current = ranks[idx].unwrap();
            let successors: Vec<usize> = graph
                .edges()
                .filter(|e| e.from.0 == idx)
                .map(|e| e.to.0)
                .collect();
            for succ in successors {
                if ranks[succ].is_none() {
                    let next = -(current.abs() + 1);
                    ranks[succ] = Some(next);
                    heap.push(Reverse((next.abs(), succ)));
                }
            }
        }
        // Re-seed any node still unranked (disconnected components).
        if let Some(&id) = node_ids.iter().find(|id| ranks[id.0].is_none()) {
            ranks[id.0] = Some(-1);
            heap.push(Reverse((1, id.0)));
        } else {
            break;
        }
    }

    for &id in &node_ids {
        graph.node_mut(id).rank = ranks[id.0];
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chain_ranks_increase_with_distance_from_root() {
        let mut g = Graph::new();
        let a = g.add_node("A");
        let b = g.add_node("B");
        let c = g.add_node("C");
        g.add_edge(a, b, "-", "->", None);
        g.add_edge(b, c, "-", "->", None);
        assign_ranks(&mut g);
        let ra = g.node(a).rank.unwrap().abs();
        let rb = g.node(b).rank.unwrap().abs();
        let rc = g.node(c).rank.unwrap().abs();
        assert!(ra < rb);
        assert!(rb < rc);
    }

    #[test]
    fn disconnected_nodes_still_get_ranked() {
        let mut g = Graph::new();
        let a = g.add_node("A");
        let b = g.add_node("B");
        assign_ranks(&mut g);
        assert!(g.node(a).rank.is_some());
        assert!(g.node(b).rank.is_some());
    }

    #[test]
    fn user_rank_is_preserved_as_positive() {
        let mut g = Graph::new();
        let a = g.add_node("A");
        g.node_mut(a).rank = Some(3);
        assign_ranks(&mut g);
        assert_eq!(g.node(a).rank, Some(3));
    }
}
