use std::collections::HashMap;

use super::{GroupId, NodeId};

/// A named collection of nodes plus child subgroups (§3). An empty `name`
/// is the anonymous-group sentinel and defaults to borderless rendering.
#[derive(Debug, Clone)]
pub struct Group {
    pub id: GroupId,
    pub name: String,
    pub attrs: HashMap<String, String>,
    pub class: Option<String>,
    pub nodes: Vec<NodeId>,
    pub subgroups: Vec<GroupId>,
    pub parent: Option<GroupId>,
}

impl Group {
    pub fn new(id: GroupId, name: impl Into<String>) -> Self {
        Group {
            id,
            name: name.into(),
            attrs: HashMap::new(),
            class: None,
            nodes: Vec::new(),
            subgroups: Vec::new(),
            parent: None,
        }
    }

    pub fn is_anonymous(&self) -> bool {
        self.name.is_empty()
    }

    pub fn attr(&self, key: &str) -> Option<&str> {
        self.attrs.get(key).map(|s| s.as_str())
    }

    pub fn set_attr(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.attrs.insert(key.into(), value.into());
    }
}
