//! Content extraction from placeholder subtrees.
//!
//! Given a placeholder node, the extractor computes an abstract summary of
//! its visible content: the primary text run, icon presence and identity on
//! each side of the text, and — for repeating mappings — an ordered list of
//! per-item summaries. The summary is the only thing the applicator ever
//! sees; it never touches the placeholder tree itself.

use log::debug;

use framelift_core::{
    content::{ExtractedContent, TabItem},
    document::Document,
    mapping::{Mapping, RepeatSpec},
    node::{NodeId, NodeKind},
};

/// Icons are typically this size or smaller; vectors and containers whose
/// larger dimension is at or below the threshold count as icon candidates.
pub const ICON_SIZE_THRESHOLD: f32 = 64.0;

/// Extracts a content summary from the subtree rooted at `root`.
///
/// The repeating-item list is populated only when `mapping` declares
/// repeating-item fields.
pub fn extract(doc: &Document, root: NodeId, mapping: Option<&Mapping>) -> ExtractedContent {
    let mut content = extract_scalar(doc, root);
    if let Some(repeat) = mapping.and_then(|mapping| mapping.repeat.as_ref()) {
        content.items = Some(extract_items(doc, root, repeat));
    }
    content
}

/// Scalar extraction: primary text plus left/right icon classification.
fn extract_scalar(doc: &Document, root: NodeId) -> ExtractedContent {
    let text_nodes = collect_text_nodes(doc, root);
    let icon_nodes = collect_icon_candidates(doc, root);

    let Some(primary) = primary_text(doc, &text_nodes) else {
        // Without a text anchor there is no left/right distinction; report
        // everything as a left icon, keyed by the first candidate when it
        // happens to be an instance.
        let first_key = icon_nodes.first().and_then(|id| instance_key(doc, *id));
        return ExtractedContent {
            text: None,
            has_left_icon: !icon_nodes.is_empty(),
            has_right_icon: false,
            left_icon_key: first_key,
            right_icon_key: None,
            items: None,
        };
    };

    let text_center = center_x(doc, primary);
    let mut left: Vec<NodeId> = Vec::new();
    let mut right: Vec<NodeId> = Vec::new();
    for id in icon_nodes {
        if center_x(doc, id) < text_center {
            left.push(id);
        } else {
            right.push(id);
        }
    }

    let left_icon = closest_to(doc, &left, text_center);
    let right_icon = closest_to(doc, &right, text_center);

    let characters = doc
        .node(primary)
        .and_then(|node| node.as_text())
        .map(|text| text.characters.clone());
    debug!(
        text:? = characters,
        left_icons = left.len(),
        right_icons = right.len();
        "extracted placeholder content"
    );

    ExtractedContent {
        text: characters,
        has_left_icon: left_icon.is_some(),
        has_right_icon: right_icon.is_some(),
        left_icon_key: left_icon.and_then(|id| instance_key(doc, id)),
        right_icon_key: right_icon.and_then(|id| instance_key(doc, id)),
        items: None,
    }
}

/// All text nodes in the subtree, including `root` itself when it is text.
fn collect_text_nodes(doc: &Document, root: NodeId) -> Vec<NodeId> {
    doc.subtree_ids(root)
        .into_iter()
        .filter(|id| doc.node(*id).is_some_and(|node| node.as_text().is_some()))
        .collect()
}

/// Icon-like visual nodes among the descendants of `root`.
///
/// Instances always qualify. Vectors and containers qualify when their
/// larger dimension is at or below [`ICON_SIZE_THRESHOLD`]; larger
/// containers are recursed into instead, so icons wrapped in non-icon
/// groups are still found.
fn collect_icon_candidates(doc: &Document, root: NodeId) -> Vec<NodeId> {
    let mut out = Vec::new();
    for child in doc.children(root) {
        collect_icon_candidates_at(doc, *child, &mut out);
    }
    out
}

fn collect_icon_candidates_at(doc: &Document, id: NodeId, out: &mut Vec<NodeId>) {
    let Some(node) = doc.node(id) else {
        return;
    };
    match &node.kind {
        NodeKind::Text(_) => {}
        NodeKind::Instance(_) => out.push(id),
        NodeKind::Vector => {
            if node.rect.max_dimension() <= ICON_SIZE_THRESHOLD {
                out.push(id);
            }
        }
        NodeKind::Container(_) => {
            if node.rect.max_dimension() <= ICON_SIZE_THRESHOLD {
                out.push(id);
            } else {
                for child in doc.children(id) {
                    collect_icon_candidates_at(doc, *child, out);
                }
            }
        }
    }
}

/// Picks the primary text: largest font size, ties broken by longest
/// character count. Mixed-size runs rank as size zero.
fn primary_text(doc: &Document, candidates: &[NodeId]) -> Option<NodeId> {
    let mut best: Option<NodeId> = None;
    for id in candidates {
        let Some(current) = doc.node(*id).and_then(|node| node.as_text()) else {
            continue;
        };
        let Some(best_id) = best else {
            best = Some(*id);
            continue;
        };
        let best_text = doc
            .node(best_id)
            .and_then(|node| node.as_text())
            .expect("best candidate is a text node");

        let current_size = current.font_size.ranking_size();
        let best_size = best_text.font_size.ranking_size();
        if current_size > best_size
            || (current_size == best_size
                && current.characters.chars().count() > best_text.characters.chars().count())
        {
            best = Some(*id);
        }
    }
    best
}

/// Horizontal center of a node, preferring its absolute bounding box.
fn center_x(doc: &Document, id: NodeId) -> f32 {
    doc.node(id)
        .map(|node| node.measure_rect().center_x())
        .unwrap_or(0.0)
}

/// The candidate whose center is horizontally closest to `target_x`; this
/// picks the icon adjacent to the text rather than a far-away one on the
/// same side.
fn closest_to(doc: &Document, candidates: &[NodeId], target_x: f32) -> Option<NodeId> {
    candidates.iter().copied().min_by(|a, b| {
        let da = (center_x(doc, *a) - target_x).abs();
        let db = (center_x(doc, *b) - target_x).abs();
        da.total_cmp(&db)
    })
}

/// The component key of a node, when it is an instance with a known key.
fn instance_key(doc: &Document, id: NodeId) -> Option<String> {
    doc.node(id)
        .and_then(|node| node.as_instance())
        .map(|instance| instance.component_key.clone())
        .filter(|key| !key.is_empty())
}

/// Repeating-item extraction: locate the item list container, then run the
/// scalar extraction on each matching child, preserving child order.
fn extract_items(doc: &Document, root: NodeId, repeat: &RepeatSpec) -> Vec<TabItem> {
    let Some(list) = find_item_list(doc, root, repeat) else {
        debug!(matcher = repeat.item_list_matcher.value.as_str(); "no item list container found");
        return Vec::new();
    };

    doc.children(list)
        .iter()
        .copied()
        .filter(|child| {
            doc.node(*child)
                .is_some_and(|node| repeat.item_matcher.matches(&node.name))
        })
        .map(|child| {
            let content = extract_scalar(doc, child);
            TabItem {
                label: content.text.unwrap_or_default(),
                has_icon: content.has_left_icon || content.has_right_icon,
                icon_key: content.left_icon_key.or(content.right_icon_key),
            }
        })
        .collect()
}

/// First descendant container (or instance) matching the item-list matcher,
/// in document order; `root` itself is not considered.
pub(crate) fn find_item_list(doc: &Document, root: NodeId, repeat: &RepeatSpec) -> Option<NodeId> {
    doc.subtree_ids(root)
        .into_iter()
        .skip(1)
        .find(|id| {
            doc.node(*id).is_some_and(|node| {
                matches!(
                    node.kind,
                    NodeKind::Container(_) | NodeKind::Instance(_)
                ) && repeat.item_list_matcher.matches(&node.name)
            })
        })
}
