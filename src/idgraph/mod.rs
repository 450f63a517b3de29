//! Identity graph: an explicit (identity, shape, children) view of an object graph.
//!
//! Nodes live in an arena and children are arena indices, so a shared or
//! cyclic reference is just a second index pointing at an existing node.
//! The graph is therefore a DAG (or contains cycles) without duplicated
//! nodes, and never owns the host objects it describes.
//!
//! ## Comparison
//!
//! Graphs are compared through a pre-order token flattening:
//!
//! ```text
//! [identity?] type [value] children... END        first visit
//! [identity?] type CYCLIC                         repeat visit
//! ```
//!
//! Identities appear only for identity-tracked nodes, so `value_equals`
//! can drop them and compare values alone.

pub mod render;

use std::collections::{BTreeSet, HashSet};

use serde::{Deserialize, Serialize};

use crate::types::{FingerprintError, ObjectRef, ShapeTag};

/// Index of a node in an `IdentityGraph`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct NodeId(usize);

impl NodeId {
    /// Create a node index.
    pub const fn new(index: usize) -> Self {
        Self(index)
    }

    /// Arena index.
    pub const fn index(&self) -> usize {
        self.0
    }
}

/// One visited object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VisitNode {
    /// Identity of the described object (a lookup key, not ownership).
    pub identity: ObjectRef,
    /// Shape the object was dispatched as.
    pub tag: ShapeTag,
    /// Host type name.
    pub type_name: String,
    /// Whether the identity is part of the node's observable state.
    pub identity_tracked: bool,
    /// Display form of a terminal value, or a blob summary.
    pub value: Option<String>,
    /// Ordered children.
    pub children: Vec<NodeId>,
}

impl VisitNode {
    /// Create a node without children.
    pub fn new(identity: ObjectRef, tag: ShapeTag, type_name: impl Into<String>) -> Self {
        Self {
            identity,
            tag,
            type_name: type_name.into(),
            identity_tracked: false,
            value: None,
            children: Vec::new(),
        }
    }

    /// Builder: mark the identity as tracked.
    pub fn tracked(mut self, tracked: bool) -> Self {
        self.identity_tracked = tracked;
        self
    }

    /// Builder: attach a value.
    pub fn with_value(mut self, value: impl Into<String>) -> Self {
        self.value = Some(value.into());
        self
    }
}

/// Token of the pre-order flattening used for comparison.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GraphToken {
    /// Identity of a tracked node.
    Identity(ObjectRef),
    /// Host type name.
    Type(String),
    /// Leaf value or blob summary.
    Value(String),
    /// Node reached a second time.
    Cyclic,
    /// End of a node's children.
    End,
}

/// Arena-backed identity graph.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IdentityGraph {
    nodes: Vec<VisitNode>,
    root: Option<NodeId>,
}

impl IdentityGraph {
    /// Create an empty graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Root node, if the root object produced one.
    pub fn root(&self) -> Option<NodeId> {
        self.root
    }

    /// Root node contents.
    pub fn root_node(&self) -> Option<&VisitNode> {
        self.root.and_then(|id| self.node(id))
    }

    /// Look up a node.
    pub fn node(&self, id: NodeId) -> Option<&VisitNode> {
        self.nodes.get(id.0)
    }

    /// Number of distinct nodes.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the graph has no nodes.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// All nodes in construction order.
    pub fn nodes(&self) -> &[VisitNode] {
        &self.nodes
    }

    /// Add a node. The first node added becomes the root.
    pub(crate) fn add_node(&mut self, node: VisitNode) -> Result<NodeId, FingerprintError> {
        self.nodes.try_reserve(1).map_err(FingerprintError::from_alloc)?;
        let id = NodeId(self.nodes.len());
        self.nodes.push(node);
        if self.root.is_none() {
            self.root = Some(id);
        }
        Ok(id)
    }

    /// Append `child` to `parent`'s children.
    pub(crate) fn add_child(&mut self, parent: NodeId, child: NodeId) -> Result<(), FingerprintError> {
        let node = self.nodes.get_mut(parent.0).ok_or_else(|| {
            FingerprintError::Host(format!("dangling identity graph node {}", parent.0))
        })?;
        node.children.try_reserve(1).map_err(FingerprintError::from_alloc)?;
        node.children.push(child);
        Ok(())
    }

    /// Attach a blob summary to an existing node.
    pub(crate) fn set_value(&mut self, id: NodeId, value: String) {
        if let Some(node) = self.nodes.get_mut(id.0) {
            node.value = Some(value);
        }
    }

    /// Pre-order flattening.
    ///
    /// - `check_identity`: emit identities of tracked nodes
    /// - `check_value`: emit values of terminal nodes (blob summaries of
    ///   callables and opaque objects are always emitted)
    pub fn to_tokens(&self, check_identity: bool, check_value: bool) -> Vec<GraphToken> {
        enum Step {
            Enter(NodeId),
            Exit,
        }

        let mut tokens = Vec::new();
        let Some(root) = self.root else {
            return tokens;
        };

        let mut seen: HashSet<NodeId> = HashSet::new();
        let mut stack = vec![Step::Enter(root)];

        while let Some(step) = stack.pop() {
            let id = match step {
                Step::Exit => {
                    tokens.push(GraphToken::End);
                    continue;
                }
                Step::Enter(id) => id,
            };
            let Some(node) = self.node(id) else {
                continue;
            };

            if node.identity_tracked && check_identity {
                tokens.push(GraphToken::Identity(node.identity));
            }
            tokens.push(GraphToken::Type(node.type_name.clone()));

            if !seen.insert(id) {
                tokens.push(GraphToken::Cyclic);
                continue;
            }

            if let Some(value) = &node.value {
                if check_value || !node.tag.is_terminal() {
                    tokens.push(GraphToken::Value(value.clone()));
                }
            }

            stack.push(Step::Exit);
            for child in node.children.iter().rev() {
                stack.push(Step::Enter(*child));
            }
        }

        tokens
    }

    /// Compare values only, ignoring identities.
    ///
    /// Two equal values stored at different identities compare equal.
    pub fn value_equals(&self, other: &IdentityGraph) -> bool {
        self.to_tokens(false, true) == other.to_tokens(false, true)
    }

    /// Identities of all tracked nodes.
    pub fn identity_set(&self) -> BTreeSet<ObjectRef> {
        self.nodes
            .iter()
            .filter(|n| n.identity_tracked)
            .map(|n| n.identity)
            .collect()
    }

    /// Whether two graphs share any tracked object.
    pub fn is_overlap(&self, other: &IdentityGraph) -> bool {
        let mine = self.identity_set();
        other.identity_set().iter().any(|id| mine.contains(id))
    }

    /// Compare only root identity and root type.
    ///
    /// Equal roots with unequal graphs mean the object was modified in place
    /// rather than rebound.
    pub fn root_matches(&self, other: &IdentityGraph) -> bool {
        match (self.root_node(), other.root_node()) {
            (Some(a), Some(b)) => a.identity == b.identity && a.type_name == b.type_name,
            _ => false,
        }
    }
}

impl PartialEq for IdentityGraph {
    fn eq(&self, other: &Self) -> bool {
        self.to_tokens(true, true) == other.to_tokens(true, true)
    }
}
