//! Framelift - upgrades placeholder frames to design-system components.
//!
//! Framelift scans a document tree for placeholder frames whose names match
//! configured replacement rules, infers their visible content (text, icons,
//! repeated sub-items), and replaces each placeholder with an instance of
//! the corresponding library component, transplanting the inferred content
//! and geometry onto the new instance.
//!
//! # Pipeline
//!
//! ```text
//! Document + MappingSet
//!     ↓ discover (manual mappings first, then name matching)
//! (node, mapping) pairs
//!     ↓ deduplicate (ancestors supersede descendants)
//!     ↓ per node: extract → resolve → instantiate → transplant → apply
//! Replaced instances
//!     ↓ container sizing pass
//! ReplaceSummary
//! ```
//!
//! The entry point is [`Replacer`]; per-session state (manual mappings and
//! the imported-component cache) lives in [`Session`].

mod apply;
mod error;
mod extract;
mod library;
mod replace;
mod resolve;
mod session;

pub use framelift_core::{content, document, geometry, mapping, node, registry};

pub use apply::{ApplyFailure, ApplyOutcome};
pub use error::FrameliftError;
pub use extract::{ICON_SIZE_THRESHOLD, extract};
pub use library::{LibraryComponent, LibraryComponentSet, StaticLibrary};
pub use replace::{Candidate, ReplaceSummary, Replacer, SkipReason, SkipRecord};
pub use resolve::{
    ComponentLibrary, ComponentResolver, ComponentTemplate, ImportError, ResolveStrategy,
    ResolvedComponent,
};
pub use session::{DELETED_NODE_SENTINEL, ManualEntry, Session};
