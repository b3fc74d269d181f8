use std::collections::HashMap;

use super::{Edge, EdgeId, EntityKind, Group, GroupId, Node, NodeId};
use crate::attr::Directionality;
use crate::cell::Cell;
use crate::error::{GraphError, GraphResult};

/// Root container: nodes, edges, groups, three class-default tables, and
/// graph-level attributes, plus (post-layout) the cell map (§3).
///
/// The monotonic `next_id` counter is shared by nodes and edges, matching
/// §3's "A monotonic counter yields unique numeric ids shared by nodes and
/// edges."
#[derive(Debug, Clone)]
pub struct Graph {
    pub(crate) nodes: Vec<Node>,
    pub(crate) edges: Vec<Edge>,
    pub(crate) groups: Vec<Group>,
    node_index: HashMap<String, NodeId>,
    pub(crate) top_level_groups: Vec<GroupId>,

    node_class_defaults: HashMap<String, HashMap<String, String>>,
    edge_class_defaults: HashMap<String, HashMap<String, String>>,
    group_class_defaults: HashMap<String, HashMap<String, String>>,
    node_defaults: HashMap<String, String>,
    edge_defaults: HashMap<String, String>,
    group_defaults: HashMap<String, String>,

    pub graph_attrs: HashMap<String, String>,
    next_id: u64,

    pub cells: HashMap<(i64, i64), Cell>,
    layout_done: bool,

    pub(crate) render_config: crate::config::RenderConfig,
}

impl Default for Graph {
    fn default() -> Self {
        Self::new()
    }
}

impl Graph {
    pub fn new() -> Self {
        Graph {
            nodes: Vec::new(),
            edges: Vec::new(),
            groups: Vec::new(),
            node_index: HashMap::new(),
            top_level_groups: Vec::new(),
            node_class_defaults: HashMap::new(),
            edge_class_defaults: HashMap::new(),
            group_class_defaults: HashMap::new(),
            node_defaults: HashMap::new(),
            edge_defaults: HashMap::new(),
            group_defaults: HashMap::new(),
            graph_attrs: HashMap::new(),
            next_id: 0,
            cells: HashMap::new(),
            layout_done: false,
            render_config: crate::config::RenderConfig::default(),
        }
    }

    /// Overrides the render-time knobs (§7 ambient "configuration") used by
    /// both routing (A* step budget, padding) and rasterization (arrows).
    /// Takes effect on the next `layout()`/`as_ascii()` call.
    pub fn set_render_config(&mut self, config: crate::config::RenderConfig) {
        self.render_config = config;
    }

    pub fn render_config(&self) -> &crate::config::RenderConfig {
        &self.render_config
    }

    fn alloc_id(&mut self) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    // ---- construction API (§6) ----

    /// Idempotent on `id`: returns the existing node if one was already
    /// added under that name.
    pub fn add_node(&mut self, id: &str) -> NodeId {
        if let Some(&existing) = self.node_index.get(id) {
            return existing;
        }
        let node_id = NodeId(self.alloc_id() as usize);
        self.nodes.push(Node::new(node_id, id));
        self.node_index.insert(id.to_string(), node_id);
        node_id
    }

    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.0]
    }

    pub fn node_mut(&mut self, id: NodeId) -> &mut Node {
        &mut self.nodes[id.0]
    }

    pub fn find_node(&self, name: &str) -> Option<NodeId> {
        self.node_index.get(name).copied()
    }

    /// Nodes in insertion order.
    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.iter()
    }

    pub fn edges(&self) -> impl Iterator<Item = &Edge> {
        self.edges.iter()
    }

    pub fn edge(&self, id: EdgeId) -> &Edge {
        &self.edges[id.0]
    }

    pub fn edge_mut(&mut self, id: EdgeId) -> &mut Edge {
        &mut self.edges[id.0]
    }

    pub fn group(&self, id: GroupId) -> &Group {
        &self.groups[id.0]
    }

    pub fn group_mut(&mut self, id: GroupId) -> &mut Group {
        &mut self.groups[id.0]
    }

    pub fn groups(&self) -> impl Iterator<Item = &Group> {
        self.groups.iter()
    }

    /// `addEdge(fromNode, toNode, leftOp, rightOp, label)`. Honors the
    /// left-only-arrow "reversed" rule (§6) by swapping endpoints before
    /// the edge is constructed.
    pub fn add_edge(
        &mut self,
        from: NodeId,
        to: NodeId,
        left_op: &str,
        right_op: &str,
        label: Option<&str>,
    ) -> EdgeId {
        let (_, directionality) = crate::attr::infer_edge_operator(left_op, right_op);
        let (from, to) = if directionality == Directionality::Reversed {
            (to, from)
        } else {
            (from, to)
        };

        let edge_id = EdgeId(self.alloc_id() as usize);
        let mut edge = Edge::new(edge_id, from, to, left_op, right_op);
        if let Some(label) = label {
            edge.set_attr("label", label);
        }
        self.edges.push(edge);
        self.nodes[from.0].edges.push(edge_id);
        if to != from {
            self.nodes[to.0].edges.push(edge_id);
        }
        self.layout_done = false;
        edge_id
    }

    pub fn add_group(&mut self, name: &str) -> GroupId {
        let group_id = GroupId(self.groups.len());
        self.groups.push(Group::new(group_id, name));
        self.top_level_groups.push(group_id);
        group_id
    }

    pub fn group_add_node(&mut self, group: GroupId, node: NodeId) {
        self.groups[group.0].nodes.push(node);
    }

    pub fn group_add_group(&mut self, parent: GroupId, child: GroupId) {
        self.groups[parent.0].subgroups.push(child);
        self.groups[child.0].parent = Some(parent);
        self.top_level_groups.retain(|&g| g != child);
    }

    pub fn set_graph_attributes(&mut self, attrs: HashMap<String, String>) {
        self.graph_attrs.extend(attrs);
    }

    pub fn set_default_attributes(&mut self, kind: EntityKind, attrs: HashMap<String, String>) {
        match kind {
            EntityKind::Node => self.node_defaults.extend(attrs),
            EntityKind::Edge => self.edge_defaults.extend(attrs),
            EntityKind::Group => self.group_defaults.extend(attrs),
        }
    }

    pub fn set_class_attributes(
        &mut self,
        kind: EntityKind,
        class: &str,
        attrs: HashMap<String, String>,
    ) {
        let table = match kind {
            EntityKind::Node => &mut self.node_class_defaults,
            EntityKind::Edge => &mut self.edge_class_defaults,
            EntityKind::Group => &mut self.group_class_defaults,
        };
        table.entry(class.to_string()).or_default().extend(attrs);
    }

    /// Resolution cascade (§9): own attrs -> class defaults -> graph
    /// defaults -> inherent default (the caller's fallback).
    pub fn resolve_node_attr<'a>(&'a self, node: NodeId, key: &str) -> Option<&'a str> {
        let node = &self.nodes[node.0];
        if let Some(v) = node.attr(key) {
            return Some(v);
        }
        if let Some(class) = &node.class {
            if let Some(v) = self
                .node_class_defaults
                .get(class)
                .and_then(|m| m.get(key))
            {
                return Some(v);
            }
        }
        self.node_defaults.get(key).map(|s| s.as_str())
    }

    /// Explicit `style` attribute (own -> class -> graph defaults, §9) wins
    /// over the left/right operator encoding; falls back to the latter when
    /// no cascade entry resolves it.
    pub fn edge_style(&self, edge: EdgeId) -> crate::attr::EdgeStyle {
        match self.resolve_edge_attr(edge, "style") {
            Some(s) => crate::attr::EdgeStyle::parse(s),
            None => self.edges[edge.0].style(),
        }
    }

    pub fn resolve_edge_attr<'a>(&'a self, edge: EdgeId, key: &str) -> Option<&'a str> {
        let edge = &self.edges[edge.0];
        if let Some(v) = edge.attr(key) {
            return Some(v);
        }
        if let Some(class) = &edge.class {
            if let Some(v) = self
                .edge_class_defaults
                .get(class)
                .and_then(|m| m.get(key))
            {
                return Some(v);
            }
        }
        self.edge_defaults.get(key).map(|s| s.as_str())
    }

    /// Group resolution additionally walks the enclosing-group chain before
    /// falling back to graph defaults, per §9.
    pub fn resolve_group_attr<'a>(&'a self, group: GroupId, key: &str) -> Option<&'a str> {
        let mut cur = Some(group);
        while let Some(gid) = cur {
            let g = &self.groups[gid.0];
            if let Some(v) = g.attr(key) {
                return Some(v);
            }
            if let Some(class) = &g.class {
                if let Some(v) = self
                    .group_class_defaults
                    .get(class)
                    .and_then(|m| m.get(key))
                {
                    return Some(v);
                }
            }
            cur = g.parent;
        }
        self.group_defaults.get(key).map(|s| s.as_str())
    }

    /// Which top-level group (if any, searching recursively) owns this node.
    pub fn owning_group(&self, node: NodeId) -> Option<GroupId> {
        fn search(graph: &Graph, gid: GroupId, node: NodeId) -> Option<GroupId> {
            let g = &graph.groups[gid.0];
            if g.nodes.contains(&node) {
                return Some(gid);
            }
            for &sub in &g.subgroups {
                if let Some(found) = search(graph, sub, node) {
                    return Some(found);
                }
            }
            None
        }
        self.top_level_groups
            .iter()
            .find_map(|&gid| search(self, gid, node))
    }

    pub fn flow(&self) -> u32 {
        self.graph_attrs
            .get("flow")
            .map(|s| crate::attr::parse_flow(s, 90))
            .unwrap_or(90)
    }

    pub fn root(&self) -> Option<NodeId> {
        self.graph_attrs
            .get("root")
            .and_then(|name| self.find_node(name))
    }

    // ---- rendering API (§6) ----

    /// Populates `self.cells`. Idempotent: re-running without intervening
    /// mutation reproduces the same cell map (§8 invariant 4).
    pub fn layout(&mut self) -> GraphResult<()> {
        if self.layout_done {
            return Ok(());
        }
        crate::layout::run_layout(self)?;
        self.layout_done = true;
        Ok(())
    }

    /// Runs `layout()` if needed and returns the rendered drawing,
    /// terminated by exactly one newline (§8 invariant 7).
    pub fn as_ascii(&mut self) -> GraphResult<String> {
        self.layout()?;
        crate::render::rasterize(self)
    }

    pub fn invalidate_layout(&mut self) {
        self.layout_done = false;
        self.cells.clear();
    }

    pub(crate) fn check_consistency(&self) -> GraphResult<()> {
        for node in &self.nodes {
            if node.cx < 1 || node.cy < 1 {
                return Err(GraphError::internal(format!(
                    "node {} has non-positive extent",
                    node.name
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_node_is_idempotent() {
        let mut g = Graph::new();
        let a1 = g.add_node("A");
        let a2 = g.add_node("A");
        assert_eq!(a1, a2);
        assert_eq!(g.nodes().count(), 1);
    }

    #[test]
    fn add_edge_reverses_on_left_only_arrow() {
        let mut g = Graph::new();
        let a = g.add_node("A");
        let b = g.add_node("B");
        let e = g.add_edge(a, b, "<-", "-", None);
        assert_eq!(g.edge(e).from, b);
        assert_eq!(g.edge(e).to, a);
    }

    #[test]
    fn attribute_cascade_resolves_through_class_and_graph_defaults() {
        let mut g = Graph::new();
        let a = g.add_node("A");
        g.node_mut(a).class = Some("warn".to_string());
        g.set_class_attributes(
            EntityKind::Node,
            "warn",
            HashMap::from([("bordercolor".to_string(), "red".to_string())]),
        );
        g.set_default_attributes(
            EntityKind::Node,
            HashMap::from([("shape".to_string(), "box".to_string())]),
        );
        assert_eq!(g.resolve_node_attr(a, "bordercolor"), Some("red"));
        assert_eq!(g.resolve_node_attr(a, "shape"), Some("box"));
        assert_eq!(g.resolve_node_attr(a, "label"), None);
    }

    #[test]
    fn owning_group_finds_nested_membership() {
        let mut g = Graph::new();
        let a = g.add_node("A");
        let top = g.add_group("outer");
        let inner = g.add_group("inner");
        g.group_add_group(top, inner);
        g.group_add_node(inner, a);
        assert_eq!(g.owning_group(a), Some(inner));
    }

    #[test]
    fn explicit_style_attribute_overrides_operator_inference() {
        let mut g = Graph::new();
        let a = g.add_node("A");
        let b = g.add_node("B");
        let e = g.add_edge(a, b, "-", "->", None);
        assert_eq!(g.edge_style(e), crate::attr::EdgeStyle::Solid);
        g.edge_mut(e).set_attr("style", "dotted");
        assert_eq!(g.edge_style(e), crate::attr::EdgeStyle::Dotted);
    }

    #[test]
    fn edge_style_falls_back_through_class_defaults() {
        let mut g = Graph::new();
        let a = g.add_node("A");
        let b = g.add_node("B");
        let e = g.add_edge(a, b, "-", "->", None);
        g.edge_mut(e).class = Some("warn".to_string());
        g.set_class_attributes(
            EntityKind::Edge,
            "warn",
            HashMap::from([("style".to_string(), "dashed".to_string())]),
        );
        assert_eq!(g.edge_style(e), crate::attr::EdgeStyle::Dashed);
    }

    #[test]
    fn render_config_override_is_honored_by_layout() {
        let mut g = Graph::new();
        let a = g.add_node("A");
        let b = g.add_node("B");
        g.add_edge(a, b, "-", "->", None);
        g.set_render_config(crate::config::RenderConfig {
            arrows: false,
            astar_step_budget: 1_000,
            astar_pad: 2,
        });
        assert!(g.as_ascii().is_ok());
        assert!(!g.render_config().arrows);
    }
}
