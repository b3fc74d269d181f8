//! A minimal convenience parser for the bracket/arrow syntax used in this
//! crate's own tests and §8 scenarios (`[A] -> [B]`, groups via `( ... )`).
//!
//! This is not a conformance parser for any upstream declarative or DOT
//! grammar — full parsing is explicitly out of scope (§1); it exists only
//! so the crate's tests can build graphs from literal source text the way
//! the teacher's `parsers::flowchart` builds Mermaid ASTs from source.
//! Grounded on the teacher's `Cursor`-based line scanner (`parsers/base.rs`),
//! generalized to this spec's operator-token encoding (§6) instead of
//! Mermaid's fixed `EDGE_PATTERNS` table.

use regex::Regex;
use std::sync::OnceLock;

use crate::error::{GraphError, GraphResult};
use crate::model::Graph;

fn edge_line_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            r"^\s*\[(?P<from>[^\]]+)\]\s*(?P<leftop>[<\-.=~]+)\s*(?:(?P<label>[^<\-.=~\[\]]+?)\s*)?(?P<rightop>[<\-.=~]+)\s*\[(?P<to>[^\]]+)\]\s*$",
        )
        .expect("static regex is valid")
    })
}

fn attr_line_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^\s*\[(?P<name>[^\]]+)\]\s*\{(?P<attrs>[^}]*)\}\s*$")
            .expect("static regex is valid")
    })
}

/// Parse the convenience syntax into a populated `Graph`. Blank lines are
/// ignored; lines wrapped in a single leading `(` / trailing `)` become an
/// anonymous group containing whatever nodes the wrapped statements touch.
pub fn parse(src: &str) -> GraphResult<Graph> {
    let mut graph = Graph::new();
    let mut pending_group: Option<(crate::model::GroupId, Vec<crate::model::NodeId>)> = None;

    for raw_line in src.lines() {
        let line = raw_line.trim();
        if line.is_empty() {
            continue;
        }

        let (group_open, inner) = if let Some(stripped) = line.strip_prefix('(') {
            (true, stripped.trim())
        } else {
            (false, line)
        };
        let (inner, group_close) = if let Some(stripped) = inner.strip_suffix(')') {
            (stripped.trim(), true)
        } else {
            (inner, false)
        };

        if group_open {
            let gid = graph.add_group("");
            pending_group = Some((gid, Vec::new()));
        }

        if !inner.is_empty() {
            let touched = parse_statement(&mut graph, inner)?;
            if let Some((_, members)) = pending_group.as_mut() {
                members.extend(touched);
            }
        }

        if group_close {
            if let Some((gid, members)) = pending_group.take() {
                for m in members {
                    if !graph.group(gid).nodes.contains(&m) {
                        graph.group_add_node(gid, m);
                    }
                }
            } else {
                return Err(GraphError::invalid("unmatched ')' in source"));
            }
        }
    }

    if pending_group.is_some() {
        return Err(GraphError::invalid("unmatched '(' in source"));
    }

    Ok(graph)
}

fn parse_statement(graph: &mut Graph, stmt: &str) -> GraphResult<Vec<crate::model::NodeId>> {
    if let Some(caps) = edge_line_re().captures(stmt) {
        let from = graph.add_node(caps.name("from").unwrap().as_str().trim());
        let to = graph.add_node(caps.name("to").unwrap().as_str().trim());
        let left_op = caps.name("leftop").unwrap().as_str();
        let right_op = caps.name("rightop").unwrap().as_str();
        let label = caps.name("label").map(|m| m.as_str().trim());
        graph.add_edge(from, to, left_op, right_op, label);
        return Ok(vec![from, to]);
    }
    if let Some(caps) = attr_line_re().captures(stmt) {
        let name = caps.name("name").unwrap().as_str().trim();
        let node = graph.add_node(name);
        for pair in caps.name("attrs").unwrap().as_str().split(',') {
            if let Some((k, v)) = pair.split_once(':') {
                graph.node_mut(node).set_attr(k.trim(), v.trim());
            }
        }
        return Ok(vec![node]);
    }
    if let Some((key, value)) = stmt.split_once(':') {
        if edge_line_re().captures(stmt).is_none() {
            graph
                .graph_attrs
                .insert(key.trim().to_string(), value.trim().to_string());
            return Ok(Vec::new());
        }
    }
    Err(GraphError::invalid(format!("unrecognized statement: {stmt}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_a_single_labeled_edge() {
        let g = parse("[Bonn] - car -> [Berlin]").unwrap();
        assert_eq!(g.nodes().count(), 2);
        assert_eq!(g.edges().count(), 1);
        let edge = g.edges().next().unwrap();
        assert_eq!(edge.attr("label"), Some("car"));
    }

    #[test]
    fn parses_bidirectional_edge() {
        let g = parse("[A] <-> [B]").unwrap();
        let edge = g.edges().next().unwrap();
        assert!(edge.bidirectional);
    }

    #[test]
    fn parses_transitive_triangle() {
        let g = parse("[A] -> [B]\n[B] -> [C]\n[A] -> [C]").unwrap();
        assert_eq!(g.nodes().count(), 3);
        assert_eq!(g.edges().count(), 3);
    }

    #[test]
    fn parses_inline_group() {
        let g = parse("( [A] -> [B] )").unwrap();
        assert_eq!(g.groups().count(), 1);
        let group = g.groups().next().unwrap();
        assert_eq!(group.nodes.len(), 2);
    }

    #[test]
    fn parses_node_attributes() {
        let g = parse("[A]{columns: 3, rows: 1}").unwrap();
        let a = g.find_node("A").unwrap();
        assert_eq!(g.node(a).attr("columns"), Some("3"));
    }
}
