//! Rectangle primitives for free-space bookkeeping
//!
//! Coordinates use a top-left origin: `y` grows downward.

use crate::types::ContainerSpec;

/// Relative slack for comparisons on accumulated float coordinates
pub(crate) const EPSILON: f64 = 1e-9;

/// Comparison slack for a container, scaled to the largest page extent so
/// that rounding at large coordinates stays inside it
pub(crate) fn tolerance(container: &ContainerSpec) -> f64 {
    EPSILON
        * container
            .page_width()
            .max(container.page_height())
            .max(1.0)
}

/// An axis-aligned rectangle in page coordinates
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    /// X position (left edge)
    pub x: f64,
    /// Y position (top edge)
    pub y: f64,
    /// Width
    pub width: f64,
    /// Height
    pub height: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Right edge x coordinate
    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    /// Bottom edge y coordinate
    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    pub fn area(&self) -> f64 {
        self.width * self.height
    }

    /// Degenerate rectangles carry no usable space
    pub fn is_empty(&self, tol: f64) -> bool {
        self.width <= tol || self.height <= tol
    }

    /// Whether a `width` x `height` box fits inside
    pub fn fits(&self, width: f64, height: f64, tol: f64) -> bool {
        width <= self.width + tol && height <= self.height + tol
    }

    /// Whether `other` lies entirely within this rectangle
    pub fn contains(&self, other: &Rect, tol: f64) -> bool {
        other.x >= self.x - tol
            && other.y >= self.y - tol
            && other.right() <= self.right() + tol
            && other.bottom() <= self.bottom() + tol
    }

    /// Whether the interiors overlap; shared edges do not count
    pub fn intersects(&self, other: &Rect, tol: f64) -> bool {
        self.x < other.right() - tol
            && other.x < self.right() - tol
            && self.y < other.bottom() - tol
            && other.y < self.bottom() - tol
    }

    /// Grow by `amount` on every side
    pub fn inflate(&self, amount: f64) -> Rect {
        Rect::new(
            self.x - amount,
            self.y - amount,
            self.width + 2.0 * amount,
            self.height + 2.0 * amount,
        )
    }
}
