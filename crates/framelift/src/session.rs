//! Per-session state.
//!
//! A [`Session`] holds what persists across replacement runs but not across
//! process restarts: manual node-to-mapping assignments and the
//! imported-component cache. Manual assignments take precedence over name
//! matching during discovery and are consumed by the successful replacement
//! of their node.

use std::collections::HashMap;

use indexmap::IndexMap;
use log::{debug, info};

use framelift_core::{document::Document, mapping::MappingSet, node::NodeId};

use crate::error::FrameliftError;
use crate::resolve::ResolvedComponent;

/// Display name shown for a manual entry whose node no longer exists.
pub const DELETED_NODE_SENTINEL: &str = "(deleted)";

/// One manual assignment as presented to a user interface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManualEntry {
    pub node: NodeId,
    /// Current display name of the node, or [`DELETED_NODE_SENTINEL`].
    pub node_name: String,
    pub mapping_id: String,
}

/// Mutable state scoped to one editing session.
#[derive(Default)]
pub struct Session {
    /// Manual node-to-mapping assignments, in assignment order.
    manual: IndexMap<NodeId, String>,
    /// Resolution results cached per component key.
    pub(crate) component_cache: HashMap<String, ResolvedComponent>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    /// Manually assigns a mapping to a node, overriding name matching.
    ///
    /// The mapping id must exist in the set; a later assignment to the same
    /// node replaces the earlier one.
    pub fn map(
        &mut self,
        node: NodeId,
        mapping_id: impl Into<String>,
        mappings: &MappingSet,
    ) -> Result<(), FrameliftError> {
        let mapping_id = mapping_id.into();
        if mappings.get(&mapping_id).is_none() {
            return Err(FrameliftError::UnknownMapping(mapping_id));
        }
        info!(node:%, mapping_id = mapping_id.as_str(); "manual mapping assigned");
        self.manual.insert(node, mapping_id);
        Ok(())
    }

    /// Removes the manual assignment of a node, if any.
    pub fn unmap(&mut self, node: NodeId) {
        if self.manual.shift_remove(&node).is_some() {
            debug!(node:%; "manual mapping removed");
        }
    }

    /// The manually assigned mapping id for a node, if any.
    pub fn manual_mapping(&self, node: NodeId) -> Option<&str> {
        self.manual.get(&node).map(String::as_str)
    }

    /// Manually mapped node ids, in assignment order.
    pub fn manual_nodes(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.manual.keys().copied()
    }

    /// All manual assignments resolved against the document, for display.
    ///
    /// Entries whose node has been deleted are kept and shown with
    /// [`DELETED_NODE_SENTINEL`]; only [`Session::prune`] drops them.
    pub fn entries(&self, doc: &Document) -> Vec<ManualEntry> {
        self.manual
            .iter()
            .map(|(node, mapping_id)| ManualEntry {
                node: *node,
                node_name: doc
                    .node(*node)
                    .map(|n| n.name.clone())
                    .unwrap_or_else(|| DELETED_NODE_SENTINEL.to_string()),
                mapping_id: mapping_id.clone(),
            })
            .collect()
    }

    /// Drops assignments whose node no longer exists in the document.
    pub fn prune(&mut self, doc: &Document) {
        let before = self.manual.len();
        self.manual.retain(|node, _| doc.node(*node).is_some());
        let dropped = before - self.manual.len();
        if dropped > 0 {
            debug!(dropped; "pruned stale manual mappings");
        }
    }

    /// Consumes the assignment of a node after its replacement succeeded.
    pub(crate) fn consume(&mut self, node: NodeId) {
        self.manual.shift_remove(&node);
    }

    /// The current document selection.
    pub fn selection<'a>(&self, doc: &'a Document) -> &'a [NodeId] {
        doc.selection()
    }

    /// Selects a single node, replacing the current selection.
    ///
    /// The selection doubles as the focus cue toward the host; an id that
    /// no longer resolves clears the selection instead.
    pub fn select_and_focus(&self, doc: &mut Document, node: NodeId) {
        debug!(node:%; "focusing node");
        doc.select(vec![node]);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use framelift_core::{
        document::{DetachedNode, Document},
        mapping::{FrameMatcher, Mapping, MatcherKind},
        node::SceneNode,
    };

    fn mappings() -> MappingSet {
        MappingSet::new([(
            "button".to_string(),
            Mapping {
                component_key: "btn-key".into(),
                frame_matcher: FrameMatcher::new(MatcherKind::NameContains, "button"),
                properties: Vec::new(),
                instance_sizing: None,
                repeat: None,
            },
        )])
    }

    fn doc() -> Document {
        Document::from_root(DetachedNode::with_children(
            SceneNode::container("Page"),
            vec![DetachedNode::leaf(SceneNode::container("CTA"))],
        ))
    }

    #[test]
    fn test_map_validates_mapping_id() {
        let doc = doc();
        let node = doc.children(doc.root())[0];
        let mut session = Session::new();

        assert!(matches!(
            session.map(node, "ghost", &mappings()),
            Err(FrameliftError::UnknownMapping(_))
        ));
        session.map(node, "button", &mappings()).unwrap();
        assert_eq!(session.manual_mapping(node), Some("button"));
    }

    #[test]
    fn test_unmap_and_consume() {
        let doc = doc();
        let node = doc.children(doc.root())[0];
        let mut session = Session::new();
        session.map(node, "button", &mappings()).unwrap();

        session.unmap(node);
        assert!(session.manual_mapping(node).is_none());

        session.map(node, "button", &mappings()).unwrap();
        session.consume(node);
        assert!(session.manual_mapping(node).is_none());
    }

    #[test]
    fn test_select_and_focus_drives_document_selection() {
        let mut doc = doc();
        let node = doc.children(doc.root())[0];
        let session = Session::new();

        session.select_and_focus(&mut doc, node);
        assert_eq!(session.selection(&doc), [node]);

        doc.remove(node).unwrap();
        session.select_and_focus(&mut doc, node);
        assert!(session.selection(&doc).is_empty());
    }

    #[test]
    fn test_entries_show_deleted_sentinel_until_pruned() {
        let mut doc = doc();
        let node = doc.children(doc.root())[0];
        let mut session = Session::new();
        session.map(node, "button", &mappings()).unwrap();

        doc.remove(node).unwrap();

        let entries = session.entries(&doc);
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].node_name, DELETED_NODE_SENTINEL);

        session.prune(&doc);
        assert!(session.entries(&doc).is_empty());
    }
}
