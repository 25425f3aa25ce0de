/*!
# Edit Batch

Staged tree mutations of one pass. Edits are keyed by the node they
target (the anchor for insertions) and never overlap: a node that was
already edited, that lies inside a subtree another edit consumes, or that
encloses an edited node cannot be edited again in the same pass.
*/

use indexmap::IndexMap;
use serde::Serialize;
use thiserror::Error;

use crate::ast::{Fragment, IdAllocator, NodeId, Slot, SyntaxTree};

use super::text_mapper;

/// One proposed structural change.
#[derive(Debug, Clone, PartialEq)]
pub enum Edit {
    Replace { target: NodeId, replacement: Fragment },
    Remove { target: NodeId },
    InsertBefore { anchor: NodeId, fragment: Fragment },
    InsertAfter { anchor: NodeId, fragment: Fragment },
    /// Moves a statement to position `index` of another statement list.
    Move {
        target: NodeId,
        new_parent: NodeId,
        index: usize,
    },
}

impl Edit {
    /// The node this edit is keyed by.
    pub fn key(&self) -> NodeId {
        match self {
            Edit::Replace { target, .. } | Edit::Remove { target } | Edit::Move { target, .. } => {
                *target
            }
            Edit::InsertBefore { anchor, .. } | Edit::InsertAfter { anchor, .. } => *anchor,
        }
    }

    pub fn kind_name(&self) -> &'static str {
        match self {
            Edit::Replace { .. } => "replace",
            Edit::Remove { .. } => "remove",
            Edit::InsertBefore { .. } => "insert-before",
            Edit::InsertAfter { .. } => "insert-after",
            Edit::Move { .. } => "move",
        }
    }

    /// Whether the key's subtree disappears from its current position.
    pub fn consumes_target(&self) -> bool {
        matches!(
            self,
            Edit::Replace { .. } | Edit::Remove { .. } | Edit::Move { .. }
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EditRejection {
    #[error("node {node} was already edited in this pass")]
    AlreadyEdited { node: NodeId },

    #[error("node {node} lies inside {consumed}, which this pass already rewrites")]
    InsideEditedSubtree { node: NodeId, consumed: NodeId },

    #[error("node {node} encloses {edited}, which this pass already edits")]
    EnclosesEditedNode { node: NodeId, edited: NodeId },

    #[error("node {node} is not part of the current tree")]
    StaleNode { node: NodeId },

    #[error("{edit} of node {node} cannot be expressed in slot {slot:?}")]
    UnsupportedSlot {
        node: NodeId,
        edit: String,
        slot: Option<Slot>,
    },
}

impl EditRejection {
    /// Rejections caused by the edit itself rather than by a conflict.
    pub fn is_malformed(&self) -> bool {
        matches!(
            self,
            EditRejection::StaleNode { .. } | EditRejection::UnsupportedSlot { .. }
        )
    }
}

/// Diagnostic record of an edit the batch refused.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RejectedEdit {
    pub rule: String,
    pub iteration: usize,
    pub edit: String,
    pub node: NodeId,
    pub reason: EditRejection,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AcceptedEdit {
    pub rule: &'static str,
    pub edit: Edit,
}

#[derive(Debug, Clone)]
pub struct EditBatch {
    edits: IndexMap<NodeId, AcceptedEdit>,
    /// Statement lists that receive moved statements.
    destinations: Vec<NodeId>,
    ids: IdAllocator,
}

impl EditBatch {
    pub fn new(tree: &SyntaxTree) -> Self {
        Self {
            edits: IndexMap::new(),
            destinations: Vec::new(),
            ids: IdAllocator::after(tree),
        }
    }

    /// Stages `edit` unless it conflicts with what this pass already holds.
    pub fn record(
        &mut self,
        tree: &SyntaxTree,
        rule: &'static str,
        edit: Edit,
    ) -> Result<(), EditRejection> {
        let key = edit.key();
        if !tree.contains(key) {
            return Err(EditRejection::StaleNode { node: key });
        }
        if let Edit::Move { new_parent, .. } = &edit {
            if !tree.contains(*new_parent) {
                return Err(EditRejection::StaleNode { node: *new_parent });
            }
        }
        text_mapper::check_supported(tree, &edit)?;

        if self.edits.contains_key(&key) {
            return Err(EditRejection::AlreadyEdited { node: key });
        }

        let mut touched = vec![key];
        if let Edit::Move { new_parent, .. } = &edit {
            touched.push(*new_parent);
        }
        for node in &touched {
            if let Some(consumed) = self.consuming_ancestor(tree, *node) {
                return Err(EditRejection::InsideEditedSubtree {
                    node: *node,
                    consumed,
                });
            }
        }

        let edited = self
            .edits
            .keys()
            .copied()
            .find(|edited| tree.is_ancestor(key, *edited))
            .or_else(|| {
                self.destinations
                    .iter()
                    .copied()
                    .find(|d| *d == key || tree.is_ancestor(key, *d))
            });
        if let Some(edited) = edited {
            return Err(EditRejection::EnclosesEditedNode { node: key, edited });
        }

        if let Edit::Move { new_parent, .. } = &edit {
            self.destinations.push(*new_parent);
        }
        self.edits.insert(key, AcceptedEdit { rule, edit });
        Ok(())
    }

    fn consuming_ancestor(&self, tree: &SyntaxTree, node: NodeId) -> Option<NodeId> {
        tree.ancestors(node).find(|ancestor| {
            self.edits
                .get(ancestor)
                .is_some_and(|accepted| accepted.edit.consumes_target())
        })
    }

    /// Whether `node` was consumed by an accepted edit, directly or through
    /// one of its ancestors.
    pub fn is_consumed(&self, tree: &SyntaxTree, node: NodeId) -> bool {
        self.edits
            .get(&node)
            .is_some_and(|accepted| accepted.edit.consumes_target())
            || self.consuming_ancestor(tree, node).is_some()
    }

    pub fn get(&self, node: NodeId) -> Option<&AcceptedEdit> {
        self.edits.get(&node)
    }

    /// Accepted edits in the order they were recorded.
    pub fn iter(&self) -> impl Iterator<Item = &AcceptedEdit> {
        self.edits.values()
    }

    pub fn len(&self) -> usize {
        self.edits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.edits.is_empty()
    }

    pub fn ids_mut(&mut self) -> &mut IdAllocator {
        &mut self.ids
    }
}
