//! The arena-owned document tree.
//!
//! A [`Document`] owns every [`SceneNode`] in a tree, keyed by [`NodeId`].
//! Child order, parent links, and the current selection live on the
//! document; nodes never hold references to each other. All structural
//! mutation (attach, insert-sibling, clone, remove) goes through the
//! document so the parent/child indices stay consistent.
//!
//! The serialized form is a [`DetachedNode`] tree: a node plus recursively
//! nested children, with no arena ids. Stable string ids on nodes survive
//! the round trip and support cross-references from configuration data.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::node::{NodeId, PropertyValue, SceneNode};

/// Errors from document-tree operations.
#[derive(Debug, Error)]
pub enum DocumentError {
    #[error("unknown node {0}")]
    UnknownNode(NodeId),

    #[error("node {0} is not a component instance")]
    NotAnInstance(NodeId),

    #[error("node {0} has no parent")]
    NoParent(NodeId),

    /// A batched property write was rejected. Nothing was written.
    #[error("property write rejected on {node}: {reason}")]
    PropertyWrite { node: NodeId, reason: String },
}

/// A free-standing node subtree, used for serialization and as the payload
/// of attach/insert operations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetachedNode {
    #[serde(flatten)]
    pub node: SceneNode,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<DetachedNode>,
}

impl DetachedNode {
    /// Wraps a node with no children.
    pub fn leaf(node: SceneNode) -> Self {
        Self {
            node,
            children: Vec::new(),
        }
    }

    /// Wraps a node with the given children.
    pub fn with_children(node: SceneNode, children: Vec<DetachedNode>) -> Self {
        Self { node, children }
    }

    /// Returns a copy of this subtree with all stable ids removed.
    ///
    /// Used when cloning within a document, where stable ids must stay
    /// unique.
    pub fn without_stable_ids(&self) -> Self {
        let mut node = self.node.clone();
        node.stable_id = None;
        Self {
            node,
            children: self
                .children
                .iter()
                .map(DetachedNode::without_stable_ids)
                .collect(),
        }
    }
}

struct Entry {
    node: SceneNode,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

/// The document tree.
pub struct Document {
    entries: HashMap<NodeId, Entry>,
    stable_ids: HashMap<String, NodeId>,
    root: NodeId,
    next: u32,
    selection: Vec<NodeId>,
}

impl Document {
    /// Builds a document from a detached root subtree.
    pub fn from_root(root: DetachedNode) -> Self {
        let mut doc = Self {
            entries: HashMap::new(),
            stable_ids: HashMap::new(),
            root: NodeId::new(0),
            next: 0,
            selection: Vec::new(),
        };
        doc.root = doc.materialize(root, None);
        doc
    }

    fn materialize(&mut self, detached: DetachedNode, parent: Option<NodeId>) -> NodeId {
        let id = NodeId::new(self.next);
        self.next += 1;

        if let Some(stable) = &detached.node.stable_id {
            // First registration wins on duplicates.
            if self.stable_ids.contains_key(stable) {
                log::debug!(stable_id = stable.as_str(); "duplicate stable id ignored");
            } else {
                self.stable_ids.insert(stable.clone(), id);
            }
        }

        self.entries.insert(
            id,
            Entry {
                node: detached.node,
                parent,
                children: Vec::new(),
            },
        );

        let children: Vec<NodeId> = detached
            .children
            .into_iter()
            .map(|child| self.materialize(child, Some(id)))
            .collect();
        self.entries
            .get_mut(&id)
            .expect("entry was just inserted")
            .children = children;
        id
    }

    /// The root node id.
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Resolves a node by id.
    pub fn node(&self, id: NodeId) -> Option<&SceneNode> {
        self.entries.get(&id).map(|entry| &entry.node)
    }

    /// Resolves a node mutably by id.
    pub fn node_mut(&mut self, id: NodeId) -> Option<&mut SceneNode> {
        self.entries.get_mut(&id).map(|entry| &mut entry.node)
    }

    /// Resolves a node by its stable string id.
    pub fn node_by_stable_id(&self, stable_id: &str) -> Option<NodeId> {
        self.stable_ids.get(stable_id).copied()
    }

    /// The ordered children of a node; empty for unknown ids and leaves.
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.entries
            .get(&id)
            .map(|entry| entry.children.as_slice())
            .unwrap_or(&[])
    }

    /// The parent of a node, if any.
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.entries.get(&id).and_then(|entry| entry.parent)
    }

    /// Returns true if `id` is a strict descendant of `ancestor`.
    pub fn is_descendant_of(&self, id: NodeId, ancestor: NodeId) -> bool {
        let mut current = self.parent(id);
        while let Some(parent) = current {
            if parent == ancestor {
                return true;
            }
            current = self.parent(parent);
        }
        false
    }

    /// All node ids in document order (pre-order depth-first from the root).
    pub fn all_ids(&self) -> Vec<NodeId> {
        let mut out = Vec::with_capacity(self.entries.len());
        self.collect_subtree(self.root, &mut out);
        out
    }

    /// The ids of the subtree rooted at `id`, pre-order, including `id`.
    pub fn subtree_ids(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        self.collect_subtree(id, &mut out);
        out
    }

    fn collect_subtree(&self, id: NodeId, out: &mut Vec<NodeId>) {
        if !self.entries.contains_key(&id) {
            return;
        }
        out.push(id);
        // Children vec is cloned to keep the borrow local.
        for child in self.children(id).to_vec() {
            self.collect_subtree(child, out);
        }
    }

    /// All node ids whose node matches the predicate, in document order.
    pub fn find_all(&self, mut predicate: impl FnMut(&SceneNode) -> bool) -> Vec<NodeId> {
        self.all_ids()
            .into_iter()
            .filter(|id| self.node(*id).is_some_and(|node| predicate(node)))
            .collect()
    }

    /// Copies the subtree rooted at `id` into a detached tree.
    pub fn subtree(&self, id: NodeId) -> Option<DetachedNode> {
        let entry = self.entries.get(&id)?;
        Some(DetachedNode {
            node: entry.node.clone(),
            children: entry
                .children
                .iter()
                .filter_map(|child| self.subtree(*child))
                .collect(),
        })
    }

    /// Copies the whole document into a detached tree, for serialization.
    pub fn to_detached(&self) -> DetachedNode {
        self.subtree(self.root)
            .expect("document root always resolves")
    }

    /// Attaches a detached subtree as the last child of `parent`.
    pub fn attach(
        &mut self,
        parent: NodeId,
        detached: DetachedNode,
    ) -> Result<NodeId, DocumentError> {
        if !self.entries.contains_key(&parent) {
            return Err(DocumentError::UnknownNode(parent));
        }
        let id = self.materialize(detached, Some(parent));
        self.entries
            .get_mut(&parent)
            .expect("parent checked above")
            .children
            .push(id);
        Ok(id)
    }

    /// Inserts a detached subtree as the immediate next sibling of `sibling`.
    pub fn insert_after(
        &mut self,
        sibling: NodeId,
        detached: DetachedNode,
    ) -> Result<NodeId, DocumentError> {
        let parent = self
            .parent(sibling)
            .ok_or(DocumentError::NoParent(sibling))?;
        let id = self.materialize(detached, Some(parent));
        let children = &mut self
            .entries
            .get_mut(&parent)
            .expect("parent link is consistent")
            .children;
        let position = children
            .iter()
            .position(|child| *child == sibling)
            .map(|index| index + 1)
            .unwrap_or(children.len());
        children.insert(position, id);
        Ok(id)
    }

    /// Clones the subtree at `template` and appends the copy as the last
    /// child of `parent`. Stable ids are not carried onto the copy.
    pub fn append_clone(
        &mut self,
        template: NodeId,
        parent: NodeId,
    ) -> Result<NodeId, DocumentError> {
        let detached = self
            .subtree(template)
            .ok_or(DocumentError::UnknownNode(template))?;
        self.attach(parent, detached.without_stable_ids())
    }

    /// Removes the subtree rooted at `id` from the document.
    ///
    /// The root cannot be removed. Removed nodes are also dropped from the
    /// selection and the stable-id index.
    pub fn remove(&mut self, id: NodeId) -> Result<(), DocumentError> {
        let parent = self.parent(id).ok_or_else(|| {
            if self.entries.contains_key(&id) {
                DocumentError::NoParent(id)
            } else {
                DocumentError::UnknownNode(id)
            }
        })?;

        let removed = self.subtree_ids(id);
        if let Some(entry) = self.entries.get_mut(&parent) {
            entry.children.retain(|child| *child != id);
        }
        for removed_id in removed {
            if let Some(entry) = self.entries.remove(&removed_id) {
                if let Some(stable) = entry.node.stable_id {
                    self.stable_ids.remove(&stable);
                }
            }
        }
        self.selection.retain(|selected| self.entries.contains_key(selected));
        Ok(())
    }

    /// Applies a batch of property writes to an instance node.
    ///
    /// The batch is all-or-nothing: every target name must be declared in
    /// the instance schema with a matching kind, otherwise the whole batch
    /// is rejected and no value is written.
    pub fn set_instance_properties(
        &mut self,
        id: NodeId,
        writes: Vec<(String, PropertyValue)>,
    ) -> Result<(), DocumentError> {
        let entry = self
            .entries
            .get_mut(&id)
            .ok_or(DocumentError::UnknownNode(id))?;
        let instance = entry
            .node
            .as_instance_mut()
            .ok_or(DocumentError::NotAnInstance(id))?;

        for (name, value) in &writes {
            match instance.schema.get(name) {
                None => {
                    return Err(DocumentError::PropertyWrite {
                        node: id,
                        reason: format!("property `{name}` is not declared"),
                    });
                }
                Some(kind) if *kind != value.kind() => {
                    return Err(DocumentError::PropertyWrite {
                        node: id,
                        reason: format!(
                            "property `{name}` is {kind:?}, not {:?}",
                            value.kind()
                        ),
                    });
                }
                Some(_) => {}
            }
        }

        for (name, value) in writes {
            instance.values.insert(name, value);
        }
        Ok(())
    }

    /// Swaps the defining component of an instance node.
    pub fn swap_component(
        &mut self,
        id: NodeId,
        component_key: impl Into<String>,
    ) -> Result<(), DocumentError> {
        let entry = self
            .entries
            .get_mut(&id)
            .ok_or(DocumentError::UnknownNode(id))?;
        let instance = entry
            .node
            .as_instance_mut()
            .ok_or(DocumentError::NotAnInstance(id))?;
        instance.component_key = component_key.into();
        Ok(())
    }

    /// The current selection.
    pub fn selection(&self) -> &[NodeId] {
        &self.selection
    }

    /// Replaces the selection; unknown ids are dropped.
    pub fn select(&mut self, ids: Vec<NodeId>) {
        self.selection = ids
            .into_iter()
            .filter(|id| self.entries.contains_key(id))
            .collect();
    }
}
