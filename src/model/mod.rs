//! The graph/node/edge/group data model (§3).
//!
//! Arena-per-entity-kind, keyed by integer id, per the Design Notes (§9):
//! cross-references store an id newtype rather than a reference, sidestepping
//! the cyclic node↔edge↔graph ownership the teacher avoided with petgraph's
//! own index types (`NodeIndex`/`EdgeIndex`). Iteration order is by arena
//! index, i.e. by the monotonic counter assigned at construction (§5).

mod edge;
mod graph;
mod group;
mod node;

pub use edge::Edge;
pub use graph::Graph;
pub use group::Group;
pub use node::Node;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EdgeId(pub usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GroupId(pub usize);

/// Which of the three class-default tables (§3, §6) an attribute lookup or
/// `setClassAttributes` call targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    Node,
    Edge,
    Group,
}
