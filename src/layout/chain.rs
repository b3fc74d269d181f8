//! Chain construction (§4.3): group nodes into maximal single-successor
//! sequences and flatten them into an ordered action stack for `place`.

use std::collections::{HashSet, VecDeque};

use crate::model::{EdgeId, Graph, NodeId};

#[derive(Debug, Clone, Copy)]
pub enum Action {
    Node(NodeId),
    Trace(EdgeId),
    SelfLoop(EdgeId),
}

struct Chain {
    members: Vec<NodeId>,
}

pub fn build_chains(graph: &Graph) -> Vec<Action> {
    let mut nodes: Vec<NodeId> = graph.nodes().map(|n| n.id).collect();
    nodes.sort_by_key(|&id| (graph.node(id).rank.unwrap_or(-1).abs(), id.0));

    let successors_of = |n: NodeId| -> Vec<NodeId> {
        graph
            .edges()
            .filter(|e| e.from == n && e.to != n)
            .map(|e| e.to)
            .collect()
    };

    let mut in_chain: HashSet<NodeId> = HashSet::new();
    let mut chains: Vec<Chain> = Vec::new();

    for &start in &nodes {
        if in_chain.contains(&start) {
            continue;
        }
        let mut members = vec![start];
        in_chain.insert(start);
        let mut cursor = start;
        loop {
            let candidates: Vec<NodeId> = successors_of(cursor)
                .into_iter()
                .filter(|s| !in_chain.contains(s))
                .collect();
            // Extend only on an unambiguous single unvisited successor;
            // any other shape (fan-out, already-chained target) ends this
            // chain and is picked up by rank-order iteration or the
            // cross-chain trace pass below.
            let mut distinct = candidates.clone();
            distinct.dedup();
            if distinct.len() == 1 {
                let next = distinct[0];
                members.push(next);
                in_chain.insert(next);
                cursor = next;
            } else {
                break;
            }
        }
        chains.push(Chain { members });
    }

    // Order chains by a DFS from the root's chain (or the first chain,
    // which by construction starts at the lowest-rank node) so the action
    // stack visits reachable chains before unrelated ones, per §4.3.
    let chain_of: std::collections::HashMap<NodeId, usize> = chains
        .iter()
        .enumerate()
        .flat_map(|(i, c)| c.members.iter().map(move |&n| (n, i)))
        .collect();

    let mut order: Vec<usize> = Vec::new();
    let mut seen_chain = vec![false; chains.len()];
    let mut queue: VecDeque<usize> = VecDeque::new();
    queue.push_back(0);
    while let Some(ci) = queue.pop_front() {
        if seen_chain[ci] {
            continue;
        }
        seen_chain[ci] = true;
        order.push(ci);
        for &member in &chains[ci].members {
            for succ in successors_of(member) {
                if let Some(&next_chain) = chain_of.get(&succ) {
                    if !seen_chain[next_chain] {
                        queue.push_back(next_chain);
                    }
                }
            }
        }
    }
    for i in 0..chains.len() {
        if !seen_chain[i] {
            order.push(i);
        }
    }

    let mut placed: HashSet<NodeId> = HashSet::new();
    let mut actions = Vec::new();
    let mut traced: HashSet<EdgeId> = HashSet::new();

    for ci in order {
        let chain = &chains[ci];
        for &m in &chain.members {
            actions.push(Action::Node(m));
            placed.insert(m);
        }
        let member_set: HashSet<NodeId> = chain.members.iter().copied().collect();
        let mut in_chain_edges: Vec<&crate::model::Edge> = graph
            .edges()
            .filter(|e| {
                e.from != e.to
                    && member_set.contains(&e.from)
                    && member_set.contains(&e.to)
                    && !traced.contains(&e.id)
            })
            .collect();
        in_chain_edges.sort_by_key(|e| {
            (graph.node(e.to).rank.unwrap_or(0) - graph.node(e.from).rank.unwrap_or(0)).abs()
        });
        for e in in_chain_edges {
            actions.push(Action::Trace(e.id));
            traced.insert(e.id);
        }
        for &m in &chain.members {
            for &eid in &graph.node(m).edges {
                let e = graph.edge(eid);
                if e.from == m && e.to == m && !traced.contains(&eid) {
                    actions.push(Action::SelfLoop(eid));
                    traced.insert(eid);
                }
            }
        }
    }

    // Cross-chain edges: whatever is left, sorted by span (§4.3).
    let mut remaining: Vec<&crate::model::Edge> = graph
        .edges()
        .filter(|e| e.from != e.to && !traced.contains(&e.id))
        .collect();
    remaining.sort_by_key(|e| {
        (graph.node(e.to).rank.unwrap_or(0) - graph.node(e.from).rank.unwrap_or(0)).abs()
    });
    for e in remaining {
        actions.push(Action::Trace(e.id));
        traced.insert(e.id);
    }

    actions
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::rank::assign_ranks;

    #[test]
    fn linear_chain_places_nodes_in_order() {
        let mut g = Graph::new();
        let a = g.add_node("A");
        let b = g.add_node("B");
        let c = g.add_node("C");
        g.add_edge(a, b, "-", "->", None);
        g.add_edge(b, c, "-", "->", None);
        assign_ranks(&mut g);
        let actions = build_chains(&g);
        let node_order: Vec<NodeId> = actions
            .iter()
            .filter_map(|a| match a {
                Action::Node(n) => Some(*n),
                _ => None,
            })
            .collect();
        assert_eq!(node_order, vec![a, b, c]);
    }

    #[test]
    fn every_edge_gets_traced_exactly_once() {
        let mut g = Graph::new();
        let a = g.add_node("A");
        let b = g.add_node("B");
        let c = g.add_node("C");
        let e1 = g.add_edge(a, b, "-", "->", None);
        let e2 = g.add_edge(b, c, "-", "->", None);
        let e3 = g.add_edge(a, c, "-", "->", None);
        assign_ranks(&mut g);
        let actions = build_chains(&g);
        let traces: HashSet<EdgeId> = actions
            .iter()
            .filter_map(|a| match a {
                Action::Trace(e) => Some(*e),
                _ => None,
            })
            .collect();
        assert!(traces.contains(&e1));
        assert!(traces.contains(&e2));
        assert!(traces.contains(&e3));
        assert_eq!(traces.len(), 3);
    }
}
