//! Declarative graph-to-ASCII-art layout, routing and rasterization.
//!
//! Build a [`Graph`] with the construction API (`add_node`/`add_edge`/
//! `add_group`), optionally feed it attributes, then call
//! [`Graph::as_ascii`] to lay out and draw it. The pipeline runs grid
//! layout (§4.1-§4.4), A*-based edge routing (§4.5), group cell fill
//! (§4.6-§4.7) and ASCII rasterization (§4.8) in that order.

pub mod attr;
pub mod cell;
pub mod config;
pub mod error;
pub mod layout;
pub mod model;
pub mod parser;
pub mod render;

pub use config::RenderConfig;
pub use error::{GraphError, GraphResult};
pub use model::{EdgeId, EntityKind, Graph, GroupId, NodeId};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn end_to_end_renders_a_labeled_edge() {
        let mut g = parser::parse("[Bonn] - car -> [Berlin]").unwrap();
        let out = g.as_ascii().unwrap();
        assert!(out.contains("Bonn"));
        assert!(out.contains("Berlin"));
        assert!(out.ends_with('\n'));
        assert!(!out.ends_with("\n\n"));
    }

    #[test]
    fn layout_is_idempotent() {
        let mut g = parser::parse("[A] -> [B]\n[B] -> [C]").unwrap();
        let first = g.as_ascii().unwrap();
        let second = g.as_ascii().unwrap();
        assert_eq!(first, second);
    }
}
