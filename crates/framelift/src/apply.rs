//! Property application.
//!
//! The applicator takes an extracted content summary and a mapping's
//! property rules and writes the corresponding values onto a freshly
//! created instance. Scalar values (text, booleans, static literals) go
//! through one all-or-nothing batched write; instance swaps are applied
//! independently through a distinct path. A rule whose source resolves to
//! nothing is skipped silently so the instance keeps its defaults.

use log::{debug, warn};

use framelift_core::{
    content::ExtractedContent,
    document::Document,
    mapping::{Mapping, MappingSet, SourceExtractor, StaticValue},
    node::{NodeId, PropertyKind, PropertyValue},
};

use crate::resolve::{ComponentResolver, ResolveContext, ResolvedComponent};

/// A non-propagating failure recorded during property application.
#[derive(Debug, Clone, PartialEq)]
pub enum ApplyFailure {
    /// The batched scalar write was rejected; no scalar property of the
    /// batch was assigned.
    PropertyWrite { reason: String },
    /// One instance-swap rule failed; other swaps were unaffected.
    Swap { target: String, reason: String },
}

impl std::fmt::Display for ApplyFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ApplyFailure::PropertyWrite { reason } => {
                write!(f, "property write rejected: {reason}")
            }
            ApplyFailure::Swap { target, reason } => {
                write!(f, "swap `{target}` failed: {reason}")
            }
        }
    }
}

/// What the applicator did: counts plus any recorded failures.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ApplyOutcome {
    pub scalar_writes: usize,
    pub swaps_applied: usize,
    pub failures: Vec<ApplyFailure>,
}

/// Writes extracted content onto `instance` according to the mapping's
/// property rules.
///
/// Failures never propagate; they are collected in the returned outcome
/// and the replacement as a whole still counts as performed.
pub fn apply(
    doc: &mut Document,
    instance: NodeId,
    content: &ExtractedContent,
    mapping: &Mapping,
    mappings: &MappingSet,
    resolver: &ComponentResolver,
    ctx_parts: ApplyContext<'_>,
) -> ApplyOutcome {
    let mut outcome = ApplyOutcome::default();

    let mut batch: Vec<(String, PropertyValue)> = Vec::new();
    let mut swaps: Vec<(String, String)> = Vec::new();

    for rule in &mapping.properties {
        match &rule.source {
            SourceExtractor::Text => {
                if let Some(text) = &content.text {
                    batch.push((rule.target.clone(), PropertyValue::Text(text.clone())));
                }
            }
            SourceExtractor::HasLeftIcon => {
                batch.push((
                    rule.target.clone(),
                    PropertyValue::Boolean(content.has_left_icon),
                ));
            }
            SourceExtractor::HasRightIcon => {
                batch.push((
                    rule.target.clone(),
                    PropertyValue::Boolean(content.has_right_icon),
                ));
            }
            SourceExtractor::LeftIconInstance => {
                if let Some(key) = &content.left_icon_key {
                    swaps.push((rule.target.clone(), key.clone()));
                }
            }
            SourceExtractor::RightIconInstance => {
                if let Some(key) = &content.right_icon_key {
                    swaps.push((rule.target.clone(), key.clone()));
                }
            }
            SourceExtractor::Static(value) => {
                let value = match value {
                    StaticValue::Text(text) => PropertyValue::Text(text.clone()),
                    StaticValue::Boolean(flag) => PropertyValue::Boolean(*flag),
                };
                batch.push((rule.target.clone(), value));
            }
        }
    }

    maybe_add_free_text_write(doc, instance, content, mapping, mappings, &mut batch);

    // Validate swap targets against the library before mutating anything;
    // an unresolvable icon key is a per-swap failure, not a batch failure.
    let mut resolved_swaps: Vec<(String, String)> = Vec::new();
    for (target, key) in swaps {
        let ctx = ResolveContext {
            library: ctx_parts.library,
            registry: ctx_parts.registry,
            document: doc,
        };
        match resolver.resolve(&key, &ctx, ctx_parts.cache) {
            Some(_) => resolved_swaps.push((target, key)),
            None => outcome.failures.push(ApplyFailure::Swap {
                target,
                reason: format!("component `{key}` could not be imported"),
            }),
        }
    }

    if !batch.is_empty() {
        let batch_len = batch.len();
        match doc.set_instance_properties(instance, batch) {
            Ok(()) => outcome.scalar_writes = batch_len,
            Err(err) => {
                warn!(instance:%, err:%; "batched property write failed");
                outcome.failures.push(ApplyFailure::PropertyWrite {
                    reason: err.to_string(),
                });
            }
        }
    }

    for (target, key) in resolved_swaps {
        match apply_swap(doc, instance, &target, &key) {
            Ok(()) => outcome.swaps_applied += 1,
            Err(reason) => {
                warn!(instance:%, target = target.as_str(), reason = reason.as_str();
                    "instance swap failed");
                outcome.failures.push(ApplyFailure::Swap { target, reason });
            }
        }
    }

    outcome
}

/// Collaborators the applicator needs for swap-key validation.
pub struct ApplyContext<'a> {
    pub library: &'a dyn crate::resolve::ComponentLibrary,
    pub registry: &'a framelift_core::registry::ComponentRegistry,
    pub cache: &'a mut std::collections::HashMap<String, ResolvedComponent>,
}

/// The free-text slot special case.
///
/// Applies only to the designated free-text component: when no explicit
/// rule produced a text value but the content carries non-empty text, find
/// the one unclaimed declared text property (or, among several, the one
/// whose name mentions text/label) and write the text there. Ambiguity
/// writes nothing rather than guessing.
fn maybe_add_free_text_write(
    doc: &Document,
    instance: NodeId,
    content: &ExtractedContent,
    mapping: &Mapping,
    mappings: &MappingSet,
    batch: &mut Vec<(String, PropertyValue)>,
) {
    let Some(free_text_key) = &mappings.free_text_component_key else {
        return;
    };
    if &mapping.component_key != free_text_key {
        return;
    }
    let Some(text) = content.text.as_ref().filter(|text| !text.is_empty()) else {
        return;
    };
    if batch
        .iter()
        .any(|(_, value)| value.kind() == PropertyKind::Text)
    {
        return;
    }

    let Some(schema) = doc
        .node(instance)
        .and_then(|node| node.as_instance())
        .map(|data| &data.schema)
    else {
        return;
    };

    let claimed: Vec<&str> = batch.iter().map(|(name, _)| name.as_str()).collect();
    let unclaimed: Vec<&str> = schema
        .iter()
        .filter(|(name, kind)| {
            **kind == PropertyKind::Text && !claimed.contains(&name.as_str())
        })
        .map(|(name, _)| name.as_str())
        .collect();

    let target = match unclaimed.as_slice() {
        [] => None,
        [only] => Some(*only),
        several => {
            let mut preferred = several.iter().filter(|name| {
                let lower = name.to_lowercase();
                lower.contains("text") || lower.contains("label")
            });
            match (preferred.next(), preferred.next()) {
                (Some(only), None) => Some(*only),
                _ => None,
            }
        }
    };

    if let Some(target) = target {
        debug!(instance:%, target; "free-text slot detected");
        batch.push((target.to_string(), PropertyValue::Text(text.clone())));
    }
}

/// Applies one instance swap.
///
/// Prefers a declared instance-swap exposed property named `target`; when
/// the instance declares none, falls back to a nested instance whose
/// display name contains a hint derived from the property name.
fn apply_swap(
    doc: &mut Document,
    instance: NodeId,
    target: &str,
    component_key: &str,
) -> Result<(), String> {
    let declared = doc
        .node(instance)
        .and_then(|node| node.as_instance())
        .and_then(|data| data.schema.get(target))
        .copied();

    if declared == Some(PropertyKind::InstanceSwap) {
        return doc
            .set_instance_properties(
                instance,
                vec![(
                    target.to_string(),
                    PropertyValue::InstanceSwap(component_key.to_string()),
                )],
            )
            .map_err(|err| err.to_string());
    }

    let hint = swap_name_hint(target)
        .ok_or_else(|| format!("no usable name hint in `{target}`"))?;
    let nested = find_nested_instance_by_name(doc, instance, &hint)
        .ok_or_else(|| format!("no nested instance matching `{hint}`"))?;
    doc.swap_component(nested, component_key)
        .map_err(|err| err.to_string())
}

/// Derives a nested-instance name hint from an exposed property name like
/// `"◇ icon L#102:0"` → `"icon L"`: strips the decorative glyph prefix and
/// the trailing `#id:id` suffix.
fn swap_name_hint(property_name: &str) -> Option<String> {
    // Suffix first, so a bare `#12:3` reduces to nothing instead of `12:3`.
    let stripped = match property_name.rfind('#') {
        Some(pos)
            if !property_name[pos + 1..].is_empty()
                && property_name[pos + 1..]
                    .chars()
                    .all(|c| c.is_ascii_digit() || c == ':') =>
        {
            &property_name[..pos]
        }
        _ => property_name,
    };

    let stripped = stripped.trim_start_matches(|c: char| {
        !(c.is_alphanumeric() || c == '_' || c.is_whitespace())
    });

    let hint = stripped.trim();
    if hint.is_empty() {
        None
    } else {
        Some(hint.to_string())
    }
}

/// First nested instance (depth-first) whose name contains `pattern`,
/// case-insensitively. The searched root itself is excluded.
fn find_nested_instance_by_name(doc: &Document, root: NodeId, pattern: &str) -> Option<NodeId> {
    let pattern = pattern.to_lowercase();
    doc.subtree_ids(root).into_iter().skip(1).find(|id| {
        doc.node(*id).is_some_and(|node| {
            node.as_instance().is_some() && node.name.to_lowercase().contains(&pattern)
        })
    })
}
