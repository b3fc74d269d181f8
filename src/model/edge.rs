use std::collections::HashMap;

use super::{EdgeId, NodeId};

/// A directed edge. `from`/`to` are fixed at construction time; `reversed`
/// (from the `<`-only operator encoding, §6) is resolved by the caller of
/// `addEdge` before construction, so by the time an `Edge` exists `from`/`to`
/// already reflect the swap.
#[derive(Debug, Clone)]
pub struct Edge {
    pub id: EdgeId,
    pub from: NodeId,
    pub to: NodeId,
    pub attrs: HashMap<String, String>,
    pub class: Option<String>,

    pub left_op: String,
    pub right_op: String,
    pub bidirectional: bool,
    pub undirected: bool,

    /// Ordered list of `(x, y)` positions this edge occupies in the cell
    /// map, populated by the router. Crossing cells still appear here even
    /// though the map slot they occupy is a `CrossCell`.
    pub cell_path: Vec<(i64, i64)>,
}

impl Edge {
    pub fn new(
        id: EdgeId,
        from: NodeId,
        to: NodeId,
        left_op: impl Into<String>,
        right_op: impl Into<String>,
    ) -> Self {
        let left_op = left_op.into();
        let right_op = right_op.into();
        let (_, directionality) = crate::attr::infer_edge_operator(&left_op, &right_op);
        let (bidirectional, undirected) = match directionality {
            crate::attr::Directionality::Bidirectional => (true, false),
            crate::attr::Directionality::Undirected => (false, true),
            _ => (false, false),
        };
        Edge {
            id,
            from,
            to,
            attrs: HashMap::new(),
            class: None,
            left_op,
            right_op,
            bidirectional,
            undirected,
            cell_path: Vec::new(),
        }
    }

    pub fn attr(&self, key: &str) -> Option<&str> {
        self.attrs.get(key).map(|s| s.as_str())
    }

    pub fn set_attr(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.attrs.insert(key.into(), value.into());
    }

    /// Style inferred purely from the left/right operator tokens (§6). An
    /// explicit `style` attribute, which needs the class/graph-defaults
    /// cascade, is resolved separately by `Graph::edge_style`.
    pub fn style(&self) -> crate::attr::EdgeStyle {
        crate::attr::infer_edge_operator(&self.left_op, &self.right_op).0
    }
}
