//! The replacement orchestrator.
//!
//! [`Replacer`] drives a full run over a document:
//!
//! 1. discover candidates (manual assignments first, then name matching
//!    over containers),
//! 2. drop candidates nested inside other candidates,
//! 3. per candidate: extract content, resolve the target component,
//!    instantiate it next to the placeholder, transplant geometry, apply
//!    properties (and repeated items), remove the placeholder,
//! 4. run the wrapper sizing pass and select the new instances.
//!
//! A candidate that cannot be completed is skipped with a recorded reason;
//! the run itself never fails.

use std::collections::HashSet;

use log::{info, warn};

use framelift_core::{
    content::TabItem,
    document::Document,
    mapping::{Mapping, MappingSet, RepeatSpec},
    node::{
        NodeId, PropertyKind, PropertyValue, SceneNode, SizingMode, StackDirection, StackLayout,
    },
    registry::ComponentRegistry,
};

use crate::apply::{self, ApplyContext, ApplyFailure};
use crate::extract::{self, extract};
use crate::resolve::{ComponentLibrary, ComponentResolver, ResolveContext, ResolvedComponent};
use crate::session::Session;

/// Containers with these names (case-insensitive substring) are treated as
/// thin wrappers around replaced instances and switched to hug sizing.
const WRAPPER_NAMES: &[&str] = &["content", "wrapper", "container", "stack", "actions"];

/// Minimum gap enforced on wrapper stacking layouts, in document units.
const MIN_WRAPPER_GAP: f32 = 8.0;

/// Why a discovered candidate was not replaced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// A manual assignment referenced a mapping id absent from the set.
    UnknownMapping(String),
    /// The candidate is the document root.
    NoParent,
    /// No resolution strategy produced the target component.
    Unresolvable { component_key: String },
    /// The candidate sits inside another candidate; the ancestor's
    /// replacement covers it.
    SupersededByAncestor,
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SkipReason::UnknownMapping(id) => write!(f, "unknown mapping id `{id}`"),
            SkipReason::NoParent => write!(f, "node has no parent"),
            SkipReason::Unresolvable { component_key } => {
                write!(f, "component `{component_key}` could not be resolved")
            }
            SkipReason::SupersededByAncestor => write!(f, "superseded by an ancestor candidate"),
        }
    }
}

/// One skipped candidate.
#[derive(Debug, Clone, PartialEq)]
pub struct SkipRecord {
    pub node: NodeId,
    pub node_name: String,
    pub mapping_id: String,
    pub reason: SkipReason,
}

/// A discovered replacement candidate, before any mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    pub node: NodeId,
    pub node_name: String,
    pub mapping_id: String,
    /// True when the candidate comes from a manual assignment rather than
    /// name matching.
    pub manual: bool,
}

/// Outcome of one replacement run.
#[derive(Debug, Default)]
pub struct ReplaceSummary {
    /// Ids of the new instances, in replacement order.
    pub replaced: Vec<NodeId>,
    pub skips: Vec<SkipRecord>,
    /// Non-propagating property-application failures, per new instance.
    pub apply_failures: Vec<(NodeId, ApplyFailure)>,
}

impl ReplaceSummary {
    pub fn replaced_count(&self) -> usize {
        self.replaced.len()
    }

    pub fn skipped_count(&self) -> usize {
        self.skips.len()
    }
}

/// The replacement engine.
pub struct Replacer<'a> {
    library: &'a dyn ComponentLibrary,
    registry: &'a ComponentRegistry,
    mappings: &'a MappingSet,
    resolver: ComponentResolver,
}

impl<'a> Replacer<'a> {
    pub fn new(
        library: &'a dyn ComponentLibrary,
        registry: &'a ComponentRegistry,
        mappings: &'a MappingSet,
    ) -> Self {
        Self {
            library,
            registry,
            mappings,
            resolver: ComponentResolver::standard(),
        }
    }

    /// Replaces the standard resolution chain, builder-style.
    pub fn with_resolver(mut self, resolver: ComponentResolver) -> Self {
        self.resolver = resolver;
        self
    }

    /// Discovers replacement candidates without mutating the document.
    ///
    /// Manual assignments come first, in assignment order; automatic
    /// candidates follow in document order. Automatic matching considers
    /// container nodes only, and a node already assigned manually is not
    /// matched again by name.
    pub fn discover(&self, doc: &Document, session: &Session) -> Vec<Candidate> {
        let mut out = Vec::new();
        let mut seen: HashSet<NodeId> = HashSet::new();

        for node in session.manual_nodes() {
            let Some(scene) = doc.node(node) else {
                continue;
            };
            let mapping_id = session
                .manual_mapping(node)
                .expect("manual node always has a mapping id");
            seen.insert(node);
            out.push(Candidate {
                node,
                node_name: scene.name.clone(),
                mapping_id: mapping_id.to_string(),
                manual: true,
            });
        }

        for node in doc.all_ids() {
            if seen.contains(&node) {
                continue;
            }
            let Some(scene) = doc.node(node) else {
                continue;
            };
            if scene.as_container().is_none() {
                continue;
            }
            if let Some((mapping_id, _)) = self.mappings.find_for_name(&scene.name) {
                out.push(Candidate {
                    node,
                    node_name: scene.name.clone(),
                    mapping_id: mapping_id.to_string(),
                    manual: false,
                });
            }
        }
        out
    }

    /// Runs a full replacement pass over the document.
    pub fn run(&self, doc: &mut Document, session: &mut Session) -> ReplaceSummary {
        session.prune(doc);
        let candidates = self.discover(doc, session);
        info!(candidates = candidates.len(); "replacement run starting");

        let mut summary = ReplaceSummary::default();
        let targets: HashSet<NodeId> = candidates.iter().map(|c| c.node).collect();

        // Supersession is judged on the pristine tree, before any ancestor
        // replacement deletes the nested candidate.
        let mut active = Vec::new();
        for candidate in candidates {
            if superseded(doc, candidate.node, &targets) {
                summary.skips.push(SkipRecord {
                    node: candidate.node,
                    node_name: candidate.node_name,
                    mapping_id: candidate.mapping_id,
                    reason: SkipReason::SupersededByAncestor,
                });
            } else {
                active.push(candidate);
            }
        }

        for candidate in active {
            if doc.node(candidate.node).is_none() {
                continue;
            }
            match self.replace_one(doc, session, &candidate, &mut summary) {
                Ok(instance) => {
                    session.consume(candidate.node);
                    summary.replaced.push(instance);
                }
                Err(reason) => {
                    warn!(
                        node:% = candidate.node,
                        name = candidate.node_name.as_str(),
                        reason:% = reason;
                        "replacement skipped"
                    );
                    summary.skips.push(SkipRecord {
                        node: candidate.node,
                        node_name: candidate.node_name,
                        mapping_id: candidate.mapping_id,
                        reason,
                    });
                }
            }
        }

        let sized = size_wrapper_chain(doc, &summary.replaced);
        doc.select(summary.replaced.clone());
        info!(
            replaced = summary.replaced.len(),
            skipped = summary.skips.len(),
            wrappers_sized = sized;
            "replacement run finished"
        );
        summary
    }

    fn replace_one(
        &self,
        doc: &mut Document,
        session: &mut Session,
        candidate: &Candidate,
        summary: &mut ReplaceSummary,
    ) -> Result<NodeId, SkipReason> {
        let mapping = self
            .mappings
            .get(&candidate.mapping_id)
            .ok_or_else(|| SkipReason::UnknownMapping(candidate.mapping_id.clone()))?;
        if doc.parent(candidate.node).is_none() {
            return Err(SkipReason::NoParent);
        }

        let content = extract(doc, candidate.node, Some(mapping));

        let resolved = {
            let ctx = ResolveContext {
                library: self.library,
                registry: self.registry,
                document: doc,
            };
            self.resolver
                .resolve(&mapping.component_key, &ctx, &mut session.component_cache)
                .ok_or_else(|| SkipReason::Unresolvable {
                    component_key: mapping.component_key.clone(),
                })?
        };

        let detached = match resolved {
            ResolvedComponent::Imported(template) => template.tree.without_stable_ids(),
            ResolvedComponent::Local(definition) => doc
                .subtree(definition)
                .ok_or_else(|| SkipReason::Unresolvable {
                    component_key: mapping.component_key.clone(),
                })?
                .without_stable_ids(),
        };

        let placeholder = doc
            .node(candidate.node)
            .expect("candidate existence checked above")
            .clone();
        let instance = doc
            .insert_after(candidate.node, detached)
            .map_err(|_| SkipReason::NoParent)?;

        transplant(doc, &placeholder, instance, mapping);

        let outcome = apply::apply(
            doc,
            instance,
            &content,
            mapping,
            self.mappings,
            &self.resolver,
            ApplyContext {
                library: self.library,
                registry: self.registry,
                cache: &mut session.component_cache,
            },
        );
        summary
            .apply_failures
            .extend(outcome.failures.into_iter().map(|f| (instance, f)));

        if let Some(repeat) = &mapping.repeat {
            if let Some(items) = &content.items {
                populate_items(doc, instance, repeat, items);
            }
        }

        doc.remove(candidate.node)
            .expect("placeholder has a parent and was not removed");
        Ok(instance)
    }
}

/// True when any strict ancestor of `node` is itself a candidate.
fn superseded(doc: &Document, node: NodeId, targets: &HashSet<NodeId>) -> bool {
    let mut current = doc.parent(node);
    while let Some(ancestor) = current {
        if targets.contains(&ancestor) {
            return true;
        }
        current = doc.parent(ancestor);
    }
    false
}

/// Carries the placeholder's placement and state onto the new instance.
///
/// Position, visibility, lock state, rotation, and constraints transfer;
/// the instance keeps its own size so the component's dimensions win.
fn transplant(doc: &mut Document, placeholder: &SceneNode, instance: NodeId, mapping: &Mapping) {
    let Some(node) = doc.node_mut(instance) else {
        return;
    };
    node.rect = node.rect.at(placeholder.rect.x(), placeholder.rect.y());
    node.visible = placeholder.visible;
    node.locked = placeholder.locked;
    node.rotation = placeholder.rotation;
    node.constraints = placeholder.constraints;
    node.align_self = placeholder.align_self;
    node.grow = placeholder.grow;

    if let Some(sizing) = &mapping.instance_sizing {
        if let Some(horizontal) = sizing.horizontal {
            node.sizing_horizontal = horizontal;
        }
        if let Some(vertical) = sizing.vertical {
            node.sizing_vertical = vertical;
        }
    }
}

/// Fills the repeated-item list of a fresh instance from extracted items.
///
/// Existing matching children are reused in order as item templates; extra
/// items clone the first template; surplus template children are hidden.
/// Per-item failures are logged and do not affect sibling items.
fn populate_items(doc: &mut Document, instance: NodeId, repeat: &RepeatSpec, items: &[TabItem]) {
    let Some(list) = extract::find_item_list(doc, instance, repeat) else {
        warn!(
            instance:%,
            matcher = repeat.item_list_matcher.value.as_str();
            "instantiated component has no item list container"
        );
        return;
    };

    let templates: Vec<NodeId> = doc
        .children(list)
        .iter()
        .copied()
        .filter(|child| {
            doc.node(*child)
                .is_some_and(|node| repeat.item_matcher.matches(&node.name))
        })
        .collect();
    let Some(first_template) = templates.first().copied() else {
        warn!(instance:%; "item list container has no item template");
        return;
    };

    for (index, item) in items.iter().enumerate() {
        let target = match templates.get(index) {
            Some(existing) => *existing,
            None => match doc.append_clone(first_template, list) {
                Ok(clone) => clone,
                Err(err) => {
                    warn!(index, err:%; "failed to clone item template");
                    continue;
                }
            },
        };
        if let Some(node) = doc.node_mut(target) {
            node.visible = true;
        }
        if let Err(reason) = apply_item(doc, target, item) {
            warn!(index, reason = reason.as_str(); "item population failed");
        }
    }

    for surplus in templates.iter().skip(items.len()) {
        if let Some(node) = doc.node_mut(*surplus) {
            node.visible = false;
        }
    }
}

/// Writes one item's label (and icon, when present) onto an item node.
///
/// Instance items take the label through their single declared text
/// property; plain container items take it through their first descendant
/// text node.
fn apply_item(doc: &mut Document, target: NodeId, item: &TabItem) -> Result<(), String> {
    let is_instance = doc
        .node(target)
        .ok_or_else(|| "item node disappeared".to_string())?
        .as_instance()
        .is_some();

    if is_instance {
        let property = single_text_property(doc, target)
            .ok_or_else(|| "no unambiguous text property on item".to_string())?;
        doc.set_instance_properties(
            target,
            vec![(property, PropertyValue::Text(item.label.clone()))],
        )
        .map_err(|err| err.to_string())?;
    } else {
        let text_node = doc
            .subtree_ids(target)
            .into_iter()
            .find(|id| doc.node(*id).is_some_and(|node| node.as_text().is_some()))
            .ok_or_else(|| "no text node inside item".to_string())?;
        if let Some(data) = doc.node_mut(text_node).and_then(|node| node.as_text_mut()) {
            data.characters = item.label.clone();
        }
    }

    if let Some(icon_key) = &item.icon_key {
        let nested = doc
            .subtree_ids(target)
            .into_iter()
            .skip(1)
            .find(|id| doc.node(*id).is_some_and(|node| node.as_instance().is_some()));
        if let Some(nested) = nested {
            doc.swap_component(nested, icon_key.clone())
                .map_err(|err| err.to_string())?;
        }
    }
    Ok(())
}

/// The single declared text property of an instance, preferring one whose
/// name mentions text or label when several are declared.
fn single_text_property(doc: &Document, instance: NodeId) -> Option<String> {
    let schema = &doc.node(instance)?.as_instance()?.schema;
    let text_props: Vec<&str> = schema
        .iter()
        .filter(|(_, kind)| **kind == PropertyKind::Text)
        .map(|(name, _)| name.as_str())
        .collect();
    match text_props.as_slice() {
        [only] => Some(only.to_string()),
        several => {
            let mut preferred = several.iter().filter(|name| {
                let lower = name.to_lowercase();
                lower.contains("text") || lower.contains("label")
            });
            match (preferred.next(), preferred.next()) {
                (Some(only), None) => Some(only.to_string()),
                _ => None,
            }
        }
    }
}

/// Switches wrapper containers around the new instances to hug sizing.
///
/// Walks each replaced instance's full ancestor chain; every ancestor
/// container whose name matches [`WRAPPER_NAMES`] gets a stacking layout
/// when it has none, a minimum gap, and both axes set to hug so the
/// instance's own size drives the layout. Non-wrapper ancestors are
/// stepped over, not walk-terminating. Returns the number of adjusted
/// wrappers.
fn size_wrapper_chain(doc: &mut Document, replaced: &[NodeId]) -> usize {
    let mut visited: HashSet<NodeId> = HashSet::new();
    let mut adjusted = 0;

    for instance in replaced {
        let mut current = doc.parent(*instance);
        while let Some(ancestor) = current {
            if !visited.insert(ancestor) {
                // This chain has already been walked to the root.
                break;
            }
            if is_wrapper(doc, ancestor) {
                let children: Vec<NodeId> = doc.children(ancestor).to_vec();
                if let Some(node) = doc.node_mut(ancestor) {
                    node.sizing_horizontal = SizingMode::Hug;
                    node.sizing_vertical = SizingMode::Hug;
                    if let Some(container) = node.as_container_mut() {
                        match &mut container.layout {
                            Some(layout) => layout.gap = layout.gap.max(MIN_WRAPPER_GAP),
                            None => {
                                container.layout = Some(StackLayout::new(
                                    StackDirection::Vertical,
                                    MIN_WRAPPER_GAP,
                                ));
                            }
                        }
                    }
                    adjusted += 1;
                }
                // Alignment overrides fight hug sizing once the wrapper hugs.
                for child in children {
                    if let Some(node) = doc.node_mut(child) {
                        node.align_self = None;
                        node.grow = 0.0;
                    }
                }
            }
            current = doc.parent(ancestor);
        }
    }
    adjusted
}

fn is_wrapper(doc: &Document, id: NodeId) -> bool {
    doc.node(id).is_some_and(|node| {
        if node.as_container().is_none() {
            return false;
        }
        let name = node.name.to_lowercase();
        WRAPPER_NAMES.iter().any(|wrapper| name.contains(wrapper))
    })
}

#[cfg(test)]
mod tests {
    use indexmap::IndexMap;

    use super::*;
    use crate::library::StaticLibrary;
    use framelift_core::{
        document::DetachedNode,
        geometry::Rect,
        mapping::{FrameMatcher, MatcherKind, PropertyRule, SourceExtractor},
        node::{FontSize, NodeKind},
        registry::ComponentRegistry,
    };

    fn button_schema() -> IndexMap<String, PropertyKind> {
        IndexMap::from([
            ("label".to_string(), PropertyKind::Text),
            ("iconLeft".to_string(), PropertyKind::Boolean),
        ])
    }

    fn button_template() -> DetachedNode {
        let mut node =
            SceneNode::instance("Button", "btn-key").with_rect(Rect::new(0.0, 0.0, 120.0, 40.0));
        node.as_instance_mut().unwrap().schema = button_schema();
        DetachedNode::leaf(node)
    }

    fn button_mapping() -> Mapping {
        Mapping {
            component_key: "btn-key".into(),
            frame_matcher: FrameMatcher::new(MatcherKind::NameContains, "button"),
            properties: vec![
                PropertyRule::new("label", SourceExtractor::Text),
                PropertyRule::new("iconLeft", SourceExtractor::HasLeftIcon),
            ],
            instance_sizing: None,
            repeat: None,
        }
    }

    fn button_library() -> StaticLibrary {
        let mut library = StaticLibrary::default();
        library.add_component("btn-key", "Button", button_template());
        library
    }

    fn placeholder_button(name: &str, x: f32, y: f32) -> DetachedNode {
        DetachedNode::with_children(
            SceneNode::container(name).with_rect(Rect::new(x, y, 200.0, 48.0)),
            vec![DetachedNode::leaf(
                SceneNode::text("label", "Submit", 14.0)
                    .with_rect(Rect::new(80.0, 16.0, 40.0, 16.0)),
            )],
        )
    }

    fn run_replacer(
        doc: &mut Document,
        library: &StaticLibrary,
        mappings: &MappingSet,
        session: &mut Session,
    ) -> ReplaceSummary {
        let registry = ComponentRegistry::new(Vec::new());
        Replacer::new(library, &registry, mappings).run(doc, session)
    }

    #[test]
    fn test_scalar_replacement_end_to_end() {
        let mut doc = Document::from_root(DetachedNode::with_children(
            SceneNode::container("Page"),
            vec![placeholder_button("Primary Button", 30.0, 50.0)],
        ));
        let mappings = MappingSet::new([("button".to_string(), button_mapping())]);
        let mut session = Session::new();

        let summary = run_replacer(&mut doc, &button_library(), &mappings, &mut session);
        assert_eq!(summary.replaced_count(), 1);
        assert!(summary.skips.is_empty());
        assert!(summary.apply_failures.is_empty());

        let instance = summary.replaced[0];
        let node = doc.node(instance).unwrap();
        // Position transplanted, component size kept.
        assert_eq!(node.rect, Rect::new(30.0, 50.0, 120.0, 40.0));
        assert_eq!(
            node.as_instance().unwrap().values.get("label"),
            Some(&PropertyValue::Text("Submit".into()))
        );
        assert_eq!(
            node.as_instance().unwrap().values.get("iconLeft"),
            Some(&PropertyValue::Boolean(false))
        );

        // The placeholder is gone and the instance is selected.
        assert_eq!(doc.children(doc.root()), [instance]);
        assert_eq!(doc.selection(), [instance]);
    }

    #[test]
    fn test_scalar_replacement_with_icon_swap() {
        let mut template = button_template();
        template
            .node
            .as_instance_mut()
            .unwrap()
            .schema
            .insert("icon".to_string(), PropertyKind::InstanceSwap);
        let mut library = StaticLibrary::default();
        library.add_component("btn-key", "Button", template);
        library.add_component(
            "search-icon",
            "Icon/Search",
            DetachedNode::leaf(SceneNode::instance("Icon/Search", "search-icon")),
        );

        let mut mapping = button_mapping();
        mapping
            .properties
            .push(PropertyRule::new("icon", SourceExtractor::LeftIconInstance));

        let placeholder = DetachedNode::with_children(
            SceneNode::container("Primary Button").with_rect(Rect::new(0.0, 0.0, 200.0, 48.0)),
            vec![
                DetachedNode::leaf(
                    SceneNode::text("label", "Submit", 14.0)
                        .with_rect(Rect::new(80.0, 16.0, 40.0, 16.0)),
                ),
                DetachedNode::leaf(
                    SceneNode::instance("icon", "search-icon")
                        .with_rect(Rect::new(32.0, 16.0, 16.0, 16.0)),
                ),
            ],
        );
        let mut doc = Document::from_root(DetachedNode::with_children(
            SceneNode::container("Page"),
            vec![placeholder],
        ));
        let mappings = MappingSet::new([("button".to_string(), mapping)]);
        let mut session = Session::new();

        let summary = run_replacer(&mut doc, &library, &mappings, &mut session);
        assert_eq!(summary.replaced_count(), 1);
        assert!(summary.apply_failures.is_empty());

        let values = doc
            .node(summary.replaced[0])
            .unwrap()
            .as_instance()
            .unwrap()
            .values
            .clone();
        assert_eq!(values.get("label"), Some(&PropertyValue::Text("Submit".into())));
        assert_eq!(values.get("iconLeft"), Some(&PropertyValue::Boolean(true)));
        assert_eq!(
            values.get("icon"),
            Some(&PropertyValue::InstanceSwap("search-icon".into()))
        );
    }

    #[test]
    fn test_unresolvable_component_skips_and_keeps_placeholder() {
        let mut doc = Document::from_root(DetachedNode::with_children(
            SceneNode::container("Page"),
            vec![placeholder_button("Primary Button", 0.0, 0.0)],
        ));
        let mappings = MappingSet::new([("button".to_string(), button_mapping())]);
        let mut session = Session::new();

        let summary = run_replacer(&mut doc, &StaticLibrary::default(), &mappings, &mut session);
        assert_eq!(summary.replaced_count(), 0);
        assert!(matches!(
            summary.skips.as_slice(),
            [SkipRecord {
                reason: SkipReason::Unresolvable { .. },
                ..
            }]
        ));
        assert_eq!(doc.children(doc.root()).len(), 1);
    }

    #[test]
    fn test_descendant_candidate_is_superseded() {
        let card_template = DetachedNode::leaf(
            SceneNode::instance("Card", "card-key").with_rect(Rect::new(0.0, 0.0, 300.0, 200.0)),
        );
        let mut library = button_library();
        library.add_component("card-key", "Card", card_template);

        let inner = placeholder_button("CTA Button", 10.0, 150.0);
        let outer = DetachedNode::with_children(
            SceneNode::container("Insurance Card").with_rect(Rect::new(0.0, 0.0, 320.0, 220.0)),
            vec![inner],
        );
        let mut doc = Document::from_root(DetachedNode::with_children(
            SceneNode::container("Page"),
            vec![outer],
        ));

        let mappings = MappingSet::new([
            (
                "card".to_string(),
                Mapping {
                    component_key: "card-key".into(),
                    frame_matcher: FrameMatcher::new(MatcherKind::NameContains, "card"),
                    properties: Vec::new(),
                    instance_sizing: None,
                    repeat: None,
                },
            ),
            ("button".to_string(), button_mapping()),
        ]);
        let mut session = Session::new();

        let summary = run_replacer(&mut doc, &library, &mappings, &mut session);
        assert_eq!(summary.replaced_count(), 1);
        assert_eq!(
            doc.node(summary.replaced[0])
                .unwrap()
                .as_instance()
                .unwrap()
                .component_key,
            "card-key"
        );
        assert!(matches!(
            summary.skips.as_slice(),
            [SkipRecord {
                reason: SkipReason::SupersededByAncestor,
                ..
            }]
        ));
    }

    #[test]
    fn test_manual_mapping_overrides_name_matching() {
        // The node's name matches nothing; only the manual assignment
        // makes it a candidate.
        let mut doc = Document::from_root(DetachedNode::with_children(
            SceneNode::container("Page"),
            vec![placeholder_button("Mystery Frame", 0.0, 0.0)],
        ));
        let target = doc.children(doc.root())[0];
        let mappings = MappingSet::new([("button".to_string(), button_mapping())]);
        let mut session = Session::new();
        session.map(target, "button", &mappings).unwrap();

        let summary = run_replacer(&mut doc, &button_library(), &mappings, &mut session);
        assert_eq!(summary.replaced_count(), 1);
        // The consumed assignment does not survive the successful run.
        assert!(session.manual_mapping(target).is_none());
    }

    #[test]
    fn test_instance_sizing_override() {
        let mut mapping = button_mapping();
        mapping.instance_sizing = Some(framelift_core::mapping::InstanceSizing {
            horizontal: Some(SizingMode::Fill),
            vertical: None,
        });
        let mut doc = Document::from_root(DetachedNode::with_children(
            SceneNode::container("Page"),
            vec![placeholder_button("Primary Button", 0.0, 0.0)],
        ));
        let mappings = MappingSet::new([("button".to_string(), mapping)]);
        let mut session = Session::new();

        let summary = run_replacer(&mut doc, &button_library(), &mappings, &mut session);
        let node = doc.node(summary.replaced[0]).unwrap();
        assert_eq!(node.sizing_horizontal, SizingMode::Fill);
        assert_eq!(node.sizing_vertical, SizingMode::Fixed);
    }

    fn tab_item_template(name: &str) -> DetachedNode {
        let mut node =
            SceneNode::instance(name, "tab-key").with_rect(Rect::new(0.0, 0.0, 60.0, 32.0));
        node.as_instance_mut().unwrap().schema =
            IndexMap::from([("label".to_string(), PropertyKind::Text)]);
        DetachedNode::leaf(node)
    }

    fn tabs_library(template_items: usize) -> StaticLibrary {
        let items = (0..template_items)
            .map(|i| tab_item_template(&format!("Tab {i}")))
            .collect();
        let list = DetachedNode::with_children(
            SceneNode::container("Tab List").with_rect(Rect::new(0.0, 0.0, 300.0, 32.0)),
            items,
        );
        let root = DetachedNode::with_children(
            SceneNode::instance("Tabs", "tabs-key").with_rect(Rect::new(0.0, 0.0, 300.0, 32.0)),
            vec![list],
        );
        let mut library = StaticLibrary::default();
        library.add_component("tabs-key", "Tabs", root);
        library
    }

    fn tabs_mapping() -> Mapping {
        Mapping {
            component_key: "tabs-key".into(),
            frame_matcher: FrameMatcher::new(MatcherKind::NameContains, "tab bar"),
            properties: Vec::new(),
            instance_sizing: None,
            repeat: Some(RepeatSpec {
                item_component_key: "tab-key".into(),
                item_list_matcher: FrameMatcher::new(MatcherKind::NameContains, "tab list"),
                item_matcher: FrameMatcher::new(MatcherKind::NameContains, "tab"),
            }),
        }
    }

    fn tab_placeholder(labels: &[&str]) -> DetachedNode {
        let tabs = labels
            .iter()
            .enumerate()
            .map(|(i, label)| {
                let x = i as f32 * 70.0;
                DetachedNode::with_children(
                    SceneNode::container(format!("Tab / {label}"))
                        .with_rect(Rect::new(x, 0.0, 60.0, 32.0)),
                    vec![DetachedNode::leaf(
                        SceneNode::text("label", *label, 12.0)
                            .with_rect(Rect::new(x + 10.0, 8.0, 40.0, 16.0)),
                    )],
                )
            })
            .collect();
        let list = DetachedNode::with_children(
            SceneNode::container("Tab List").with_rect(Rect::new(0.0, 0.0, 300.0, 32.0)),
            tabs,
        );
        DetachedNode::with_children(
            SceneNode::container("Tab Bar").with_rect(Rect::new(0.0, 100.0, 300.0, 32.0)),
            vec![list],
        )
    }

    fn item_labels(doc: &Document, instance: NodeId) -> Vec<(String, bool)> {
        let repeat = tabs_mapping().repeat.unwrap();
        let list = extract::find_item_list(doc, instance, &repeat).unwrap();
        doc.children(list)
            .iter()
            .map(|id| {
                let node = doc.node(*id).unwrap();
                let label = node
                    .as_instance()
                    .and_then(|data| data.values.get("label"))
                    .and_then(|value| match value {
                        PropertyValue::Text(text) => Some(text.clone()),
                        _ => None,
                    })
                    .unwrap_or_default();
                (label, node.visible)
            })
            .collect()
    }

    #[test]
    fn test_repeating_items_grow_to_match_content() {
        // One template tab, three extracted tabs: two clones appended.
        let mut doc = Document::from_root(DetachedNode::with_children(
            SceneNode::container("Page"),
            vec![tab_placeholder(&["Overview", "Details", "Settings"])],
        ));
        let mappings = MappingSet::new([("tabs".to_string(), tabs_mapping())]);
        let mut session = Session::new();

        let summary = run_replacer(&mut doc, &tabs_library(1), &mappings, &mut session);
        assert_eq!(summary.replaced_count(), 1);

        let labels = item_labels(&doc, summary.replaced[0]);
        assert_eq!(
            labels,
            [
                ("Overview".to_string(), true),
                ("Details".to_string(), true),
                ("Settings".to_string(), true),
            ]
        );
    }

    #[test]
    fn test_surplus_template_items_are_hidden() {
        let mut doc = Document::from_root(DetachedNode::with_children(
            SceneNode::container("Page"),
            vec![tab_placeholder(&["One", "Two"])],
        ));
        let mappings = MappingSet::new([("tabs".to_string(), tabs_mapping())]);
        let mut session = Session::new();

        let summary = run_replacer(&mut doc, &tabs_library(4), &mappings, &mut session);
        let labels = item_labels(&doc, summary.replaced[0]);
        assert_eq!(labels.len(), 4);
        assert_eq!(labels[0], ("One".to_string(), true));
        assert_eq!(labels[1], ("Two".to_string(), true));
        assert!(!labels[2].1);
        assert!(!labels[3].1);
    }

    #[test]
    fn test_wrapper_chain_switches_to_hug_sizing() {
        let wrapper = DetachedNode::with_children(
            SceneNode::container("Content").with_rect(Rect::new(0.0, 0.0, 400.0, 300.0)),
            vec![placeholder_button("Primary Button", 10.0, 10.0)],
        );
        let mut doc = Document::from_root(DetachedNode::with_children(
            SceneNode::container("Page"),
            vec![wrapper],
        ));
        let mappings = MappingSet::new([("button".to_string(), button_mapping())]);
        let mut session = Session::new();

        run_replacer(&mut doc, &button_library(), &mappings, &mut session);

        let wrapper = doc.children(doc.root())[0];
        let node = doc.node(wrapper).unwrap();
        assert_eq!(node.sizing_horizontal, SizingMode::Hug);
        assert_eq!(node.sizing_vertical, SizingMode::Hug);
        let layout = node.as_container().unwrap().layout.unwrap();
        assert!(layout.gap >= MIN_WRAPPER_GAP);

        // Non-wrapper names are left alone.
        assert_eq!(
            doc.node(doc.root()).unwrap().sizing_horizontal,
            SizingMode::Fixed
        );
    }

    #[test]
    fn test_wrapper_above_non_wrapper_ancestor_is_sized() {
        // Page > Content (wrapper) > Card Body (not a wrapper) > placeholder:
        // the walk must step over "Card Body" and still reach "Content".
        let body = DetachedNode::with_children(
            SceneNode::container("Card Body").with_rect(Rect::new(0.0, 0.0, 300.0, 200.0)),
            vec![placeholder_button("Primary Button", 10.0, 10.0)],
        );
        let wrapper = DetachedNode::with_children(
            SceneNode::container("Content").with_rect(Rect::new(0.0, 0.0, 400.0, 300.0)),
            vec![body],
        );
        let mut doc = Document::from_root(DetachedNode::with_children(
            SceneNode::container("Page"),
            vec![wrapper],
        ));
        let mappings = MappingSet::new([("button".to_string(), button_mapping())]);
        let mut session = Session::new();

        let summary = run_replacer(&mut doc, &button_library(), &mappings, &mut session);
        assert_eq!(summary.replaced_count(), 1);

        let content = doc.children(doc.root())[0];
        let body = doc.children(content)[0];
        assert_eq!(doc.node(content).unwrap().name, "Content");
        assert_eq!(doc.node(content).unwrap().sizing_horizontal, SizingMode::Hug);
        assert_eq!(doc.node(content).unwrap().sizing_vertical, SizingMode::Hug);
        // The non-wrapper in between is left untouched.
        assert_eq!(doc.node(body).unwrap().sizing_horizontal, SizingMode::Fixed);
        assert!(doc.node(body).unwrap().as_container().unwrap().layout.is_none());
    }

    #[test]
    fn test_wrapper_sizing_is_idempotent() {
        let wrapper = DetachedNode::with_children(
            SceneNode::container("Content").with_rect(Rect::new(0.0, 0.0, 400.0, 300.0)),
            vec![placeholder_button("Primary Button", 10.0, 10.0)],
        );
        let mut doc = Document::from_root(DetachedNode::with_children(
            SceneNode::container("Page"),
            vec![wrapper],
        ));
        let wrapper_id = doc.children(doc.root())[0];
        let instance = doc.children(wrapper_id)[0];
        if let Some(container) = doc.node_mut(wrapper_id).unwrap().as_container_mut() {
            container.layout = Some(StackLayout::new(StackDirection::Horizontal, 12.0));
        }

        let first = size_wrapper_chain(&mut doc, &[instance]);
        let snapshot = doc.node(wrapper_id).unwrap().clone();
        let second = size_wrapper_chain(&mut doc, &[instance]);
        assert_eq!(first, 1);
        assert_eq!(second, 1);
        assert_eq!(doc.node(wrapper_id).unwrap(), &snapshot);
        // An existing larger gap and direction are preserved.
        let layout = snapshot.as_container().unwrap().layout.unwrap();
        assert_eq!(layout.direction, StackDirection::Horizontal);
        assert_eq!(layout.gap, 12.0);
    }

    #[test]
    fn test_dry_discovery_does_not_mutate() {
        let mut doc = Document::from_root(DetachedNode::with_children(
            SceneNode::container("Page"),
            vec![placeholder_button("Primary Button", 0.0, 0.0)],
        ));
        let mappings = MappingSet::new([("button".to_string(), button_mapping())]);
        let registry = ComponentRegistry::new(Vec::new());
        let library = button_library();
        let replacer = Replacer::new(&library, &registry, &mappings);
        let session = Session::new();

        let before = doc.to_detached();
        let candidates = replacer.discover(&doc, &session);
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].mapping_id, "button");
        assert!(!candidates[0].manual);
        assert_eq!(doc.to_detached(), before);

        // Mixed-size text inside the placeholder does not disturb
        // discovery, which only looks at names.
        let label = doc
            .find_all(|node| node.as_text().is_some())
            .into_iter()
            .next()
            .unwrap();
        if let NodeKind::Text(data) = &mut doc.node_mut(label).unwrap().kind {
            data.font_size = FontSize::Mixed;
        }
        assert_eq!(replacer.discover(&doc, &session).len(), 1);
    }
}
