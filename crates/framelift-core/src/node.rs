//! The scene-node model.
//!
//! A document tree is made of [`SceneNode`]s. Each node carries geometry,
//! visibility and constraint state shared by all node kinds, plus a
//! [`NodeKind`] tag holding kind-specific data. The kind is a closed tagged
//! union so that branching over node kinds is exhaustive; a new kind fails
//! to compile rather than silently falling through a string comparison.
//!
//! # Organization
//!
//! - [`SceneNode`] - the node itself, with builder-style constructors
//! - [`NodeKind`] - container | text | vector | instance
//! - [`ContainerData`] / [`StackLayout`] / [`SizingMode`] - layout state
//! - [`TextData`] / [`FontSize`] - text runs
//! - [`InstanceData`] / [`PropertyKind`] / [`PropertyValue`] - component
//!   instances and their exposed properties

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::geometry::Rect;

/// Identifier of a node within a [`Document`](crate::document::Document).
///
/// Ids are assigned by the owning document and are meaningless across
/// documents. The serialized document format instead uses optional stable
/// string ids ([`SceneNode::stable_id`]).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(u32);

impl NodeId {
    pub(crate) fn new(raw: u32) -> Self {
        Self(raw)
    }
}

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// How a node is anchored to its parent along one axis.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Anchor {
    #[default]
    Min,
    Center,
    Max,
    Stretch,
    Scale,
}

/// Per-axis anchoring constraints.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Constraints {
    #[serde(default)]
    pub horizontal: Anchor,
    #[serde(default)]
    pub vertical: Anchor,
}

/// Alignment override for a child inside a stacking container.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Align {
    Start,
    Center,
    End,
    Stretch,
}

/// Direction of a stacking layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StackDirection {
    Horizontal,
    Vertical,
}

/// A stacking (auto-layout) configuration on a container.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StackLayout {
    pub direction: StackDirection,
    /// Gap between consecutive children, in document units.
    #[serde(default)]
    pub gap: f32,
}

impl StackLayout {
    pub fn new(direction: StackDirection, gap: f32) -> Self {
        Self { direction, gap }
    }
}

/// How a container sizes itself along one axis.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SizingMode {
    /// Shrink to fit content.
    Hug,
    /// Grow to fill the parent.
    Fill,
    /// Keep the explicit size.
    #[default]
    Fixed,
}

/// Container-specific state: the optional stacking layout.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ContainerData {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub layout: Option<StackLayout>,
}

/// Font size of a text run.
///
/// A text node mixing several sizes ranks as size zero during primary-text
/// selection, deprioritizing it behind any uniformly sized run.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FontSize {
    Fixed(f32),
    Mixed,
}

impl FontSize {
    /// The size used for ranking text nodes; `Mixed` ranks as zero.
    pub fn ranking_size(self) -> f32 {
        match self {
            FontSize::Fixed(size) => size,
            FontSize::Mixed => 0.0,
        }
    }
}

/// Text-node state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextData {
    pub characters: String,
    pub font_size: FontSize,
}

/// The declared kind of an exposed component property.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PropertyKind {
    Text,
    Boolean,
    Variant,
    InstanceSwap,
}

/// A typed value assigned to an exposed component property.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PropertyValue {
    Text(String),
    Boolean(bool),
    Variant(String),
    /// Key of the component swapped into a nested instance slot.
    InstanceSwap(String),
}

impl PropertyValue {
    /// The property kind this value is assignable to.
    pub fn kind(&self) -> PropertyKind {
        match self {
            PropertyValue::Text(_) => PropertyKind::Text,
            PropertyValue::Boolean(_) => PropertyKind::Boolean,
            PropertyValue::Variant(_) => PropertyKind::Variant,
            PropertyValue::InstanceSwap(_) => PropertyKind::InstanceSwap,
        }
    }
}

/// Instance-specific state: the defining component and exposed properties.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InstanceData {
    /// Stable key of the defining library component.
    pub component_key: String,
    /// Declared exposed properties, in declaration order.
    #[serde(default)]
    pub schema: IndexMap<String, PropertyKind>,
    /// Current property overrides.
    #[serde(default)]
    pub values: IndexMap<String, PropertyValue>,
}

/// Kind-specific node data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum NodeKind {
    Container(ContainerData),
    Text(TextData),
    Vector,
    Instance(InstanceData),
}

/// A node in the document tree.
///
/// Children are owned by the document, not the node; see
/// [`Document`](crate::document::Document).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneNode {
    pub name: String,
    #[serde(default)]
    pub rect: Rect,
    /// Absolute bounding box, when known. Preferred over [`Self::rect`] for
    /// horizontal-center computations.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub absolute: Option<Rect>,
    #[serde(default = "default_true")]
    pub visible: bool,
    #[serde(default)]
    pub locked: bool,
    #[serde(default)]
    pub rotation: f32,
    #[serde(default)]
    pub constraints: Constraints,
    /// Alignment override when this node is a child of a stacking container.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub align_self: Option<Align>,
    /// Grow factor when this node is a child of a stacking container.
    #[serde(default)]
    pub grow: f32,
    /// How this node sizes itself horizontally.
    #[serde(default)]
    pub sizing_horizontal: SizingMode,
    /// How this node sizes itself vertically.
    #[serde(default)]
    pub sizing_vertical: SizingMode,
    /// Stable id carried through serialization; unique within a document.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stable_id: Option<String>,
    #[serde(flatten)]
    pub kind: NodeKind,
}

fn default_true() -> bool {
    true
}

impl SceneNode {
    fn with_kind(name: impl Into<String>, kind: NodeKind) -> Self {
        Self {
            name: name.into(),
            rect: Rect::default(),
            absolute: None,
            visible: true,
            locked: false,
            rotation: 0.0,
            constraints: Constraints::default(),
            align_self: None,
            grow: 0.0,
            sizing_horizontal: SizingMode::default(),
            sizing_vertical: SizingMode::default(),
            stable_id: None,
            kind,
        }
    }

    /// Creates a container node with no layout.
    pub fn container(name: impl Into<String>) -> Self {
        Self::with_kind(name, NodeKind::Container(ContainerData::default()))
    }

    /// Creates a text node with a uniform font size.
    pub fn text(name: impl Into<String>, characters: impl Into<String>, font_size: f32) -> Self {
        Self::with_kind(
            name,
            NodeKind::Text(TextData {
                characters: characters.into(),
                font_size: FontSize::Fixed(font_size),
            }),
        )
    }

    /// Creates a vector node.
    pub fn vector(name: impl Into<String>) -> Self {
        Self::with_kind(name, NodeKind::Vector)
    }

    /// Creates an instance node of the given component key.
    pub fn instance(name: impl Into<String>, component_key: impl Into<String>) -> Self {
        Self::with_kind(
            name,
            NodeKind::Instance(InstanceData {
                component_key: component_key.into(),
                ..InstanceData::default()
            }),
        )
    }

    /// Sets the local geometry, builder-style.
    pub fn with_rect(mut self, rect: Rect) -> Self {
        self.rect = rect;
        self
    }

    /// Sets the absolute bounding box, builder-style.
    pub fn with_absolute(mut self, absolute: Rect) -> Self {
        self.absolute = Some(absolute);
        self
    }

    /// Sets the stable id, builder-style.
    pub fn with_stable_id(mut self, id: impl Into<String>) -> Self {
        self.stable_id = Some(id.into());
        self
    }

    /// The rectangle used for center computations: the absolute bounding box
    /// when present, the local rect otherwise.
    pub fn measure_rect(&self) -> Rect {
        self.absolute.unwrap_or(self.rect)
    }

    /// Returns the text data if this is a text node.
    pub fn as_text(&self) -> Option<&TextData> {
        match &self.kind {
            NodeKind::Text(data) => Some(data),
            _ => None,
        }
    }

    /// Returns the text data mutably if this is a text node.
    pub fn as_text_mut(&mut self) -> Option<&mut TextData> {
        match &mut self.kind {
            NodeKind::Text(data) => Some(data),
            _ => None,
        }
    }

    /// Returns the container data if this is a container node.
    pub fn as_container(&self) -> Option<&ContainerData> {
        match &self.kind {
            NodeKind::Container(data) => Some(data),
            _ => None,
        }
    }

    /// Returns the container data mutably if this is a container node.
    pub fn as_container_mut(&mut self) -> Option<&mut ContainerData> {
        match &mut self.kind {
            NodeKind::Container(data) => Some(data),
            _ => None,
        }
    }

    /// Returns the instance data if this is an instance node.
    pub fn as_instance(&self) -> Option<&InstanceData> {
        match &self.kind {
            NodeKind::Instance(data) => Some(data),
            _ => None,
        }
    }

    /// Returns the instance data mutably if this is an instance node.
    pub fn as_instance_mut(&mut self) -> Option<&mut InstanceData> {
        match &mut self.kind {
            NodeKind::Instance(data) => Some(data),
            _ => None,
        }
    }
}
