//! Component resolution.
//!
//! Turning a mapping's `component_key` into something instantiable is an
//! ordered chain of strategies, tried first to last, first success wins:
//!
//! 1. import the key as a single component from the library,
//! 2. import it as a variant set and take the default variant,
//! 3. fall back to a local document node via the registry's document id.
//!
//! Each strategy is a [`ResolveStrategy`] with one `try_resolve` operation,
//! so new strategies can be added without touching the orchestrator.
//! Results are cached per key for the session regardless of which strategy
//! succeeded; a key that fails every strategy aborts only the replacement
//! that needed it.

use std::collections::HashMap;

use log::{debug, warn};
use thiserror::Error;

use framelift_core::{
    document::{DetachedNode, Document},
    node::NodeId,
    registry::ComponentRegistry,
};

/// Failure to import a component from the library.
#[derive(Debug, Clone, Error)]
pub enum ImportError {
    #[error("unknown component key `{0}`")]
    UnknownKey(String),

    #[error("component `{key}` is not a {expected}")]
    WrongKind { key: String, expected: &'static str },

    #[error("library unavailable: {0}")]
    Unavailable(String),
}

/// An instantiable component fetched from the library.
///
/// The `tree` is a detached instance subtree; instantiation materializes a
/// copy of it into the document.
#[derive(Debug, Clone, PartialEq)]
pub struct ComponentTemplate {
    pub key: String,
    pub name: String,
    pub tree: DetachedNode,
}

/// The component library seam.
///
/// The host environment (or [`StaticLibrary`](crate::StaticLibrary) in
/// tests and the CLI) provides component templates by stable key. An import
/// either resolves or fails; failed imports are never retried.
pub trait ComponentLibrary {
    /// Imports a single component by key.
    fn import_component(&self, key: &str) -> Result<ComponentTemplate, ImportError>;

    /// Imports a variant set by key, yielding its default variant.
    fn import_component_set(&self, key: &str) -> Result<ComponentTemplate, ImportError>;
}

/// A successfully resolved component, ready to instantiate.
#[derive(Debug, Clone, PartialEq)]
pub enum ResolvedComponent {
    /// A template imported from the library.
    Imported(ComponentTemplate),
    /// A local document node acting as the component definition.
    Local(NodeId),
}

/// Read-only collaborators available to resolution strategies.
pub struct ResolveContext<'a> {
    pub library: &'a dyn ComponentLibrary,
    pub registry: &'a ComponentRegistry,
    pub document: &'a Document,
}

/// One step of the resolution chain.
pub trait ResolveStrategy {
    /// Short name used in logs.
    fn name(&self) -> &'static str;

    /// Attempts to resolve `key`; `None` passes the key to the next
    /// strategy.
    fn try_resolve(&self, key: &str, ctx: &ResolveContext<'_>) -> Option<ResolvedComponent>;
}

/// Strategy 1: the key names a single library component.
struct ImportComponent;

impl ResolveStrategy for ImportComponent {
    fn name(&self) -> &'static str {
        "import-component"
    }

    fn try_resolve(&self, key: &str, ctx: &ResolveContext<'_>) -> Option<ResolvedComponent> {
        match ctx.library.import_component(key) {
            Ok(template) => Some(ResolvedComponent::Imported(template)),
            Err(err) => {
                debug!(key, err:% = err; "component import failed");
                None
            }
        }
    }
}

/// Strategy 2: the key names a variant set; use its default variant.
struct ImportComponentSet;

impl ResolveStrategy for ImportComponentSet {
    fn name(&self) -> &'static str {
        "import-component-set"
    }

    fn try_resolve(&self, key: &str, ctx: &ResolveContext<'_>) -> Option<ResolvedComponent> {
        match ctx.library.import_component_set(key) {
            Ok(template) => Some(ResolvedComponent::Imported(template)),
            Err(err) => {
                debug!(key, err:% = err; "variant-set import failed");
                None
            }
        }
    }
}

/// Strategy 3: the registry knows a local document node for this key.
struct LocalDocumentLookup;

impl ResolveStrategy for LocalDocumentLookup {
    fn name(&self) -> &'static str {
        "local-document-lookup"
    }

    fn try_resolve(&self, key: &str, ctx: &ResolveContext<'_>) -> Option<ResolvedComponent> {
        let info = ctx.registry.by_key(key)?;
        let stable_id = info.document_id.as_deref()?;
        let node = ctx.document.node_by_stable_id(stable_id)?;
        Some(ResolvedComponent::Local(node))
    }
}

/// The ordered resolution chain with a per-session cache.
pub struct ComponentResolver {
    strategies: Vec<Box<dyn ResolveStrategy>>,
}

impl ComponentResolver {
    /// The standard chain: component import, then variant-set import, then
    /// local document lookup.
    pub fn standard() -> Self {
        Self {
            strategies: vec![
                Box::new(ImportComponent),
                Box::new(ImportComponentSet),
                Box::new(LocalDocumentLookup),
            ],
        }
    }

    /// Creates a resolver with a custom strategy chain.
    pub fn with_strategies(strategies: Vec<Box<dyn ResolveStrategy>>) -> Self {
        Self { strategies }
    }

    /// Resolves a component key, consulting and filling `cache`.
    ///
    /// Returns `None` when every strategy fails; the caller treats that as
    /// a skipped replacement, never a run-aborting fault.
    pub fn resolve(
        &self,
        key: &str,
        ctx: &ResolveContext<'_>,
        cache: &mut HashMap<String, ResolvedComponent>,
    ) -> Option<ResolvedComponent> {
        if let Some(hit) = cache.get(key) {
            return Some(hit.clone());
        }
        for strategy in &self.strategies {
            if let Some(resolved) = strategy.try_resolve(key, ctx) {
                debug!(key, strategy = strategy.name(); "component resolved");
                cache.insert(key.to_string(), resolved.clone());
                return Some(resolved);
            }
        }
        warn!(key; "component could not be resolved by any strategy");
        None
    }
}
