//! The layout pipeline (§4): rank assignment, node sizing, chain
//! construction, placement, edge routing and (when groups exist) group
//! cell fill, run in that order against a single graph.

pub mod chain;
pub mod grow;
pub mod group_fill;
pub mod place;
pub mod rank;
pub mod router;

use crate::error::GraphResult;
use crate::model::Graph;

pub fn run_layout(graph: &mut Graph) -> GraphResult<()> {
    graph.cells.clear();
    let span = tracing::debug_span!("layout");
    let _enter = span.enter();

    tracing::debug!("assigning ranks");
    rank::assign_ranks(graph);

    tracing::debug!("sizing nodes");
    grow::compute_extents(graph);

    tracing::debug!("placing and routing");
    place::run(graph)?;

    tracing::debug!("filling group cells");
    group_fill::fill_groups(graph);

    graph.check_consistency()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn layout_is_idempotent() {
        let mut g = Graph::new();
        let a = g.add_node("A");
        let b = g.add_node("B");
        g.add_edge(a, b, "-", "->", None);
        run_layout(&mut g).unwrap();
        let first: std::collections::BTreeMap<_, _> = g
            .cells
            .iter()
            .map(|(&p, c)| (p, format!("{c:?}")))
            .collect();
        g.invalidate_layout();
        run_layout(&mut g).unwrap();
        let second: std::collections::BTreeMap<_, _> = g
            .cells
            .iter()
            .map(|(&p, c)| (p, format!("{c:?}")))
            .collect();
        assert_eq!(first, second);
    }

    #[test]
    fn no_two_cells_share_a_coordinate() {
        let mut g = Graph::new();
        let a = g.add_node("A");
        let b = g.add_node("B");
        let c = g.add_node("C");
        g.add_edge(a, b, "-", "->", None);
        g.add_edge(b, c, "-", "->", None);
        g.add_edge(a, c, "-", "->", None);
        run_layout(&mut g).unwrap();
        // HashMap<(x,y), Cell> already enforces this at the storage level;
        // this test documents the invariant rather than re-deriving it.
        assert!(!g.cells.is_empty());
    }
}
