//! The static component registry.
//!
//! Local metadata about library components, loaded at process start and
//! immutable for the session. The registry is not the component library
//! itself: it only records keys, display names, component kinds, and — for
//! components that also exist locally in the document — the stable document
//! id used by the last-resort resolution strategy.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Whether a key names a single component or a variant set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ComponentKind {
    Component,
    ComponentSet,
}

/// Registry entry for one library component.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComponentInfo {
    pub key: String,
    pub name: String,
    pub kind: ComponentKind,
    /// Stable document id of a local copy of this component, when one
    /// exists in the working document.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub document_id: Option<String>,
}

/// Immutable component metadata with key and name lookup.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(from = "RegistryData", into = "RegistryData")]
pub struct ComponentRegistry {
    components: Vec<ComponentInfo>,
    by_key: HashMap<String, usize>,
    by_name: HashMap<String, usize>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct RegistryData {
    #[serde(default)]
    components: Vec<ComponentInfo>,
}

impl From<RegistryData> for ComponentRegistry {
    fn from(data: RegistryData) -> Self {
        Self::new(data.components)
    }
}

impl From<ComponentRegistry> for RegistryData {
    fn from(registry: ComponentRegistry) -> Self {
        Self {
            components: registry.components,
        }
    }
}

impl ComponentRegistry {
    /// Builds a registry, indexing by key and case-insensitive name.
    ///
    /// On duplicate keys or names the first entry wins.
    pub fn new(components: Vec<ComponentInfo>) -> Self {
        let mut by_key = HashMap::new();
        let mut by_name = HashMap::new();
        for (index, info) in components.iter().enumerate() {
            by_key.entry(info.key.clone()).or_insert(index);
            by_name.entry(info.name.to_lowercase()).or_insert(index);
        }
        Self {
            components,
            by_key,
            by_name,
        }
    }

    /// Looks up a component by its stable key.
    pub fn by_key(&self, key: &str) -> Option<&ComponentInfo> {
        self.by_key.get(key).map(|index| &self.components[*index])
    }

    /// Looks up a component by display name, case-insensitively.
    pub fn by_name(&self, name: &str) -> Option<&ComponentInfo> {
        self.by_name
            .get(&name.to_lowercase())
            .map(|index| &self.components[*index])
    }

    /// All registry entries, in load order.
    pub fn components(&self) -> &[ComponentInfo] {
        &self.components
    }
}
