//! Node representation for circuit graphs.

use std::fmt;

/// Unique identifier for an equipotential net.
///
/// Ids are allocated monotonically on first reference and are never reissued;
/// merging two nets drops the larger id and leaves a gap. Ground is not a
/// fixed id: the topology manager marks an arbitrary set of ids as ground.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(u32);

impl NodeId {
    /// Create a new NodeId from a raw value.
    pub fn new(id: u32) -> Self {
        NodeId(id)
    }

    /// Get the raw node ID value.
    pub fn as_u32(self) -> u32 {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A named node in the circuit graph.
#[derive(Debug, Clone)]
pub struct Node {
    id: NodeId,
    name: String,
}

impl Node {
    /// Create a new node with the given ID and user-visible name.
    pub fn new(id: NodeId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
        }
    }

    /// Get the node's ID.
    pub fn id(&self) -> NodeId {
        self.id
    }

    /// Get the node's name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Replace the node's name.
    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_node_id() {
        let id = NodeId::new(42);
        assert_eq!(id.as_u32(), 42);
        assert_eq!(id.to_string(), "42");
    }

    #[test]
    fn test_node_ids_order_by_allocation() {
        assert!(NodeId::new(1) < NodeId::new(7));
    }

    #[test]
    fn test_node_name() {
        let mut node = Node::new(NodeId::new(1), "vdd");
        assert_eq!(node.id().as_u32(), 1);
        assert_eq!(node.name(), "vdd");

        node.set_name("vcc");
        assert_eq!(node.name(), "vcc");
    }
}
