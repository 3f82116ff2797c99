//! Geometric primitives for scene-node placement.
//!
//! Framelift uses a coordinate system consistent with most design tools:
//! origin at the top-left, X increasing rightward, Y increasing downward.
//! Node geometry is expressed as a [`Rect`] (top-left corner plus size);
//! icon side classification and adjacency work on horizontal centers.

use serde::{Deserialize, Serialize};

/// A rectangle positioned by its top-left corner.
///
/// # Examples
///
/// ```
/// # use framelift_core::geometry::Rect;
/// let r = Rect::new(10.0, 20.0, 40.0, 16.0);
/// assert_eq!(r.center_x(), 30.0);
/// assert_eq!(r.max_dimension(), 40.0);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    x: f32,
    y: f32,
    width: f32,
    height: f32,
}

impl Rect {
    /// Creates a new rectangle from a top-left corner and a size.
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Returns the x-coordinate of the top-left corner.
    pub fn x(self) -> f32 {
        self.x
    }

    /// Returns the y-coordinate of the top-left corner.
    pub fn y(self) -> f32 {
        self.y
    }

    /// Returns the width of the rectangle.
    pub fn width(self) -> f32 {
        self.width
    }

    /// Returns the height of the rectangle.
    pub fn height(self) -> f32 {
        self.height
    }

    /// Returns a new rectangle moved to the given top-left position.
    pub fn at(self, x: f32, y: f32) -> Self {
        Self { x, y, ..self }
    }

    /// Returns a new rectangle translated by the given offset.
    pub fn translate(self, dx: f32, dy: f32) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
            ..self
        }
    }

    /// Returns the horizontal center of the rectangle.
    pub fn center_x(self) -> f32 {
        self.x + self.width / 2.0
    }

    /// Returns the vertical center of the rectangle.
    pub fn center_y(self) -> f32 {
        self.y + self.height / 2.0
    }

    /// Returns the larger of width and height.
    ///
    /// Used by the extractor's icon heuristic: vectors and small containers
    /// whose larger dimension is at or below the icon threshold are treated
    /// as icons.
    pub fn max_dimension(self) -> f32 {
        self.width.max(self.height)
    }

    /// Returns true if both dimensions are zero.
    pub fn is_empty(self) -> bool {
        self.width == 0.0 && self.height == 0.0
    }
}
