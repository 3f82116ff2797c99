//! An in-memory component library.
//!
//! [`StaticLibrary`] is the serde-loadable [`ComponentLibrary`] used by the
//! CLI and by tests: component templates and variant sets keyed by stable
//! key, loaded once at process start. A real host environment would provide
//! its own implementation of the trait.

use serde::{Deserialize, Serialize};

use framelift_core::document::DetachedNode;

use crate::resolve::{ComponentLibrary, ComponentTemplate, ImportError};

/// One library component: a stable key, a display name, and the instance
/// subtree materialized on instantiation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LibraryComponent {
    pub key: String,
    pub name: String,
    pub template: DetachedNode,
}

/// A variant set: several components behind one key, one of them default.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LibraryComponentSet {
    pub key: String,
    pub name: String,
    /// Key of the default variant; must name one of `variants`.
    pub default_variant: String,
    pub variants: Vec<LibraryComponent>,
}

/// A static, load-once component library.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StaticLibrary {
    #[serde(default)]
    components: Vec<LibraryComponent>,
    #[serde(default)]
    component_sets: Vec<LibraryComponentSet>,
}

impl StaticLibrary {
    /// Adds a single component.
    pub fn add_component(
        &mut self,
        key: impl Into<String>,
        name: impl Into<String>,
        template: DetachedNode,
    ) {
        self.components.push(LibraryComponent {
            key: key.into(),
            name: name.into(),
            template,
        });
    }

    /// Adds a variant set from `(key, name, template)` triples.
    pub fn add_component_set(
        &mut self,
        key: impl Into<String>,
        name: impl Into<String>,
        default_variant: impl Into<String>,
        variants: Vec<(&str, &str, DetachedNode)>,
    ) {
        self.component_sets.push(LibraryComponentSet {
            key: key.into(),
            name: name.into(),
            default_variant: default_variant.into(),
            variants: variants
                .into_iter()
                .map(|(key, name, template)| LibraryComponent {
                    key: key.to_string(),
                    name: name.to_string(),
                    template,
                })
                .collect(),
        });
    }
}

impl ComponentLibrary for StaticLibrary {
    fn import_component(&self, key: &str) -> Result<ComponentTemplate, ImportError> {
        let component = self
            .components
            .iter()
            .find(|component| component.key == key)
            .ok_or_else(|| ImportError::UnknownKey(key.to_string()))?;
        Ok(ComponentTemplate {
            key: component.key.clone(),
            name: component.name.clone(),
            tree: component.template.clone(),
        })
    }

    fn import_component_set(&self, key: &str) -> Result<ComponentTemplate, ImportError> {
        let set = self
            .component_sets
            .iter()
            .find(|set| set.key == key)
            .ok_or_else(|| ImportError::UnknownKey(key.to_string()))?;
        let default = set
            .variants
            .iter()
            .find(|variant| variant.key == set.default_variant)
            .ok_or_else(|| ImportError::WrongKind {
                key: key.to_string(),
                expected: "variant set with a resolvable default variant",
            })?;
        Ok(ComponentTemplate {
            key: default.key.clone(),
            name: default.name.clone(),
            tree: default.template.clone(),
        })
    }
}
