//! Framelift Core Types and Definitions
//!
//! This crate provides the foundational types for the framelift replacement
//! engine. It includes:
//!
//! - **Geometry**: Rectangles and positioning helpers ([`geometry`] module)
//! - **Scene nodes**: The tagged scene-node model ([`node`] module)
//! - **Document**: The arena-owned document tree ([`document`] module)
//! - **Registry**: Component library metadata ([`registry`] module)
//! - **Mappings**: Frame matchers and property-mapping rules ([`mapping`] module)
//! - **Content**: Extracted placeholder content ([`content`] module)

pub mod content;
pub mod document;
pub mod geometry;
pub mod mapping;
pub mod node;
pub mod registry;
