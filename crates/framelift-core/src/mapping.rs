//! Frame matchers and property-mapping configuration.
//!
//! A [`Mapping`] binds a name-matching rule ([`FrameMatcher`]) to a target
//! library component and an ordered list of [`PropertyRule`]s describing how
//! extracted placeholder content populates the new instance. Mappings are
//! immutable per session and are consulted in declaration order: the first
//! matcher that accepts a name wins.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::node::SizingMode;

/// The matching strategy of a [`FrameMatcher`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatcherKind {
    /// Substring test on the normalized name.
    NameContains,
    /// Exact equality on the normalized name.
    NameEquals,
    /// Prefix test on the normalized name.
    NameStartsWith,
    /// Equality after stripping hyphens, underscores, and whitespace from
    /// both sides, so `"Card-Insurance-Coverage"` matches
    /// `"card insurance coverage"`.
    NameFuzzy,
}

/// A name-matching rule for placeholder frames.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrameMatcher {
    pub kind: MatcherKind,
    pub value: String,
}

impl FrameMatcher {
    pub fn new(kind: MatcherKind, value: impl Into<String>) -> Self {
        Self {
            kind,
            value: value.into(),
        }
    }

    /// Tests a candidate display name against this matcher.
    ///
    /// The candidate is normalized (trimmed, lowercased) before testing;
    /// matching is case-insensitive throughout. An empty matcher value
    /// never matches.
    pub fn matches(&self, name: &str) -> bool {
        if self.value.is_empty() {
            return false;
        }
        let name = name.trim().to_lowercase();
        let value = self.value.to_lowercase();
        match self.kind {
            MatcherKind::NameContains => name.contains(&value),
            MatcherKind::NameEquals => name == value,
            MatcherKind::NameStartsWith => name.starts_with(&value),
            MatcherKind::NameFuzzy => squash_separators(&name) == squash_separators(&value),
        }
    }
}

/// Strips hyphens, underscores, and all whitespace.
fn squash_separators(value: &str) -> String {
    value
        .chars()
        .filter(|c| !matches!(c, '-' | '_') && !c.is_whitespace())
        .collect()
}

/// A literal value carried by a static property rule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StaticValue {
    Boolean(bool),
    Text(String),
}

/// Where a property rule's value comes from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceExtractor {
    /// The placeholder's primary text.
    Text,
    /// Whether an icon sits left of the primary text.
    HasLeftIcon,
    /// Whether an icon sits right of the primary text.
    HasRightIcon,
    /// The component key of the left icon, when it is an instance.
    LeftIconInstance,
    /// The component key of the right icon, when it is an instance.
    RightIconInstance,
    /// A literal, always-present value.
    Static(StaticValue),
}

/// One property-population rule: write `source` into the target's exposed
/// property named `target`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropertyRule {
    pub target: String,
    pub source: SourceExtractor,
}

impl PropertyRule {
    pub fn new(target: impl Into<String>, source: SourceExtractor) -> Self {
        Self {
            target: target.into(),
            source,
        }
    }
}

/// Optional per-axis sizing override applied to a fresh instance.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct InstanceSizing {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub horizontal: Option<SizingMode>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vertical: Option<SizingMode>,
}

/// Repeating-item fields for variable-cardinality mappings (tab bars).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RepeatSpec {
    /// Key of the individual repeated-item component.
    pub item_component_key: String,
    /// Matcher locating the item list container inside the placeholder and
    /// inside the instantiated target.
    pub item_list_matcher: FrameMatcher,
    /// Matcher selecting individual items within the list.
    pub item_matcher: FrameMatcher,
}

/// A replacement rule: which frames it applies to and how to populate the
/// target component.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Mapping {
    /// Stable key of the target library component or variant set.
    pub component_key: String,
    pub frame_matcher: FrameMatcher,
    #[serde(default)]
    pub properties: Vec<PropertyRule>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instance_sizing: Option<InstanceSizing>,
    /// Present only for variable-cardinality mappings.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub repeat: Option<RepeatSpec>,
}

/// The full mapping configuration, in declaration order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MappingSet {
    /// Component key whose free-text slot is auto-detected when no explicit
    /// text rule produced a value (the "tag" component special case).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub free_text_component_key: Option<String>,
    #[serde(default)]
    pub mappings: IndexMap<String, Mapping>,
}

impl MappingSet {
    /// Creates a mapping set from id/mapping pairs, preserving order.
    pub fn new(mappings: impl IntoIterator<Item = (String, Mapping)>) -> Self {
        Self {
            free_text_component_key: None,
            mappings: mappings.into_iter().collect(),
        }
    }

    /// Sets the designated free-text component key, builder-style.
    pub fn with_free_text_component_key(mut self, key: impl Into<String>) -> Self {
        self.free_text_component_key = Some(key.into());
        self
    }

    /// Looks up a mapping by id.
    pub fn get(&self, id: &str) -> Option<&Mapping> {
        self.mappings.get(id)
    }

    /// All mapping ids, in declaration order.
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.mappings.keys().map(String::as_str)
    }

    /// Finds the first mapping whose frame matcher accepts `name`,
    /// in declaration order.
    pub fn find_for_name(&self, name: &str) -> Option<(&str, &Mapping)> {
        self.mappings
            .iter()
            .find(|(_, mapping)| mapping.frame_matcher.matches(name))
            .map(|(id, mapping)| (id.as_str(), mapping))
    }
}
