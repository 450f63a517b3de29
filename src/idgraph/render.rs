//! Text and structured renderings of an identity graph.
//!
//! ```text
//! list (0x1) -> [int (0x2) = 1, dict (0x3) -> [str (0x4) = "a", list (0x1) @shared]]
//! ```
//!
//! Each node is expanded once; later references render as `@shared`.
//! The text form and `to_json` are written iteratively and handle any depth.

use std::collections::HashSet;
use std::fmt::Write as _;

use serde::Serialize;

use super::{IdentityGraph, NodeId};
use crate::types::ShapeTag;

/// Deepest graph `to_view` and `to_json_value` will materialize.
pub const MAX_VIEW_DEPTH: usize = 1_000;

/// Error rendering an identity graph.
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    /// Graph nests deeper than the structured view allows.
    #[error("Identity graph nests deeper than {limit} levels; use to_json")]
    TooDeep {
        /// Depth bound that was exceeded.
        limit: usize,
    },
    /// JSON encoding failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Structured view of one node.
#[derive(Debug, Clone, Serialize)]
pub struct NodeView {
    /// Object identity (hex).
    pub obj_id: String,
    /// Host type name.
    pub obj_type: String,
    /// Dispatch shape.
    pub shape: ShapeTag,
    /// Terminal value or blob summary.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    /// Node was already expanded elsewhere.
    #[serde(skip_serializing_if = "is_false")]
    pub shared: bool,
    /// Ordered children.
    pub children: Vec<NodeView>,
}

fn is_false(b: &bool) -> bool {
    !*b
}

impl IdentityGraph {
    /// Compact arrow-joined text form.
    pub fn to_text(&self) -> String {
        enum Step {
            Enter(NodeId),
            Literal(&'static str),
        }

        let mut out = String::new();
        let Some(root) = self.root else {
            return out;
        };

        let mut seen: HashSet<NodeId> = HashSet::new();
        let mut stack = vec![Step::Enter(root)];

        while let Some(step) = stack.pop() {
            let id = match step {
                Step::Literal(s) => {
                    out.push_str(s);
                    continue;
                }
                Step::Enter(id) => id,
            };
            let Some(node) = self.node(id) else {
                continue;
            };

            let _ = write!(out, "{} ({})", node.type_name, node.identity);
            if !seen.insert(id) {
                out.push_str(" @shared");
                continue;
            }
            if let Some(value) = &node.value {
                let _ = write!(out, " = {}", value);
            }
            let container = matches!(node.tag, ShapeTag::Sequence | ShapeTag::Set | ShapeTag::Mapping);
            if node.children.is_empty() && !container {
                continue;
            }

            out.push_str(" -> [");
            stack.push(Step::Literal("]"));
            for (i, child) in node.children.iter().enumerate().rev() {
                stack.push(Step::Enter(*child));
                if i > 0 {
                    stack.push(Step::Literal(", "));
                }
            }
        }

        out
    }

    /// Structured view with `obj_id`, `obj_type` and `children`.
    ///
    /// Built without recursion. Graphs nested deeper than
    /// `MAX_VIEW_DEPTH` are rejected, since the nested view (and any
    /// `serde_json::Value` made from it) is dropped recursively. Use
    /// [`to_json`](Self::to_json) for graphs of any depth.
    pub fn to_view(&self) -> Result<Option<NodeView>, RenderError> {
        struct Entry {
            parent: Option<usize>,
            view: Option<NodeView>,
        }

        let Some(root) = self.root else {
            return Ok(None);
        };

        // pre-order flattening; a parent always precedes its children
        let mut entries: Vec<Entry> = Vec::new();
        let mut seen: HashSet<NodeId> = HashSet::new();
        let mut stack: Vec<(NodeId, Option<usize>, usize)> = vec![(root, None, 1)];

        while let Some((id, parent, depth)) = stack.pop() {
            if depth > MAX_VIEW_DEPTH {
                return Err(RenderError::TooDeep { limit: MAX_VIEW_DEPTH });
            }
            let Some(node) = self.node(id) else {
                continue;
            };
            let mut view = NodeView {
                obj_id: node.identity.to_string(),
                obj_type: node.type_name.clone(),
                shape: node.tag,
                value: None,
                shared: false,
                children: Vec::new(),
            };
            let index = entries.len();
            if seen.insert(id) {
                view.value = node.value.clone();
                for child in node.children.iter().rev() {
                    stack.push((*child, Some(index), depth + 1));
                }
            } else {
                view.shared = true;
            }
            entries.push(Entry { parent, view: Some(view) });
        }

        // children are complete before their parent is reached from the back
        for index in (1..entries.len()).rev() {
            let Some(mut view) = entries[index].view.take() else {
                continue;
            };
            view.children.reverse();
            if let Some(parent) = entries[index].parent {
                if let Some(parent_view) = entries[parent].view.as_mut() {
                    parent_view.children.push(view);
                }
            }
        }

        let mut root_view = entries.first_mut().and_then(|e| e.view.take());
        if let Some(view) = root_view.as_mut() {
            view.children.reverse();
        }
        Ok(root_view)
    }

    /// Structured form as a JSON value. Same depth bound as `to_view`.
    pub fn to_json_value(&self) -> Result<serde_json::Value, RenderError> {
        Ok(serde_json::to_value(self.to_view()?)?)
    }

    /// Structured form as compact JSON, written without recursion.
    ///
    /// Produces the same document as `to_json_value` and works at any depth.
    pub fn to_json(&self) -> Result<String, RenderError> {
        enum Step {
            Enter(NodeId),
            Literal(&'static str),
        }

        let Some(root) = self.root else {
            return Ok("null".to_string());
        };

        let mut out = String::new();
        let mut seen: HashSet<NodeId> = HashSet::new();
        let mut stack = vec![Step::Enter(root)];

        while let Some(step) = stack.pop() {
            let id = match step {
                Step::Literal(s) => {
                    out.push_str(s);
                    continue;
                }
                Step::Enter(id) => id,
            };
            let Some(node) = self.node(id) else {
                out.push_str("null");
                continue;
            };

            out.push_str("{\"obj_id\":");
            out.push_str(&serde_json::to_string(&node.identity.to_string())?);
            out.push_str(",\"obj_type\":");
            out.push_str(&serde_json::to_string(&node.type_name)?);
            out.push_str(",\"shape\":");
            out.push_str(&serde_json::to_string(&node.tag)?);

            if !seen.insert(id) {
                out.push_str(",\"shared\":true,\"children\":[]}");
                continue;
            }
            if let Some(value) = &node.value {
                out.push_str(",\"value\":");
                out.push_str(&serde_json::to_string(value)?);
            }

            out.push_str(",\"children\":[");
            stack.push(Step::Literal("]}"));
            for (i, child) in node.children.iter().enumerate().rev() {
                stack.push(Step::Enter(*child));
                if i > 0 {
                    stack.push(Step::Literal(","));
                }
            }
        }

        Ok(out)
    }
}
