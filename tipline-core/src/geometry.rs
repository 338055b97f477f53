//! Rectangle snapshots and the coordinate spaces the positioner works in.
use serde::{Deserialize, Serialize};

/// Viewport-relative bounding box of an element.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub left: f64,
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    /// Build a rect from its top-left corner and size, deriving `right`/`bottom`.
    #[must_use]
    pub fn from_origin_size(left: f64, top: f64, width: f64, height: f64) -> Self {
        Self {
            left,
            top,
            right: left + width,
            bottom: top + height,
            width,
            height,
        }
    }

    #[must_use]
    pub const fn size(&self) -> Size {
        Size {
            width: self.width,
            height: self.height,
        }
    }
}

/// Scroll position of a scrollable element.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ScrollOffset {
    pub left: f64,
    pub top: f64,
}

impl ScrollOffset {
    #[must_use]
    pub const fn new(left: f64, top: f64) -> Self {
        Self { left, top }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    #[must_use]
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

/// A [`Rect`] translated into a container's local coordinate space.
///
/// `left`/`top` account for the container's scroll offset so they can be
/// written straight into an absolutely positioned child's style. `right` and
/// `bottom` keep the raw viewport delta between the two boxes.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Dimension {
    pub left: f64,
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
    pub width: f64,
    pub height: f64,
}

impl Dimension {
    #[must_use]
    pub fn relative_to(element: &Rect, container: &Rect, scroll: ScrollOffset) -> Self {
        Self {
            left: element.left - container.left + scroll.left,
            top: element.top - container.top + scroll.top,
            right: element.right - container.right,
            bottom: element.bottom - container.bottom,
            width: element.width,
            height: element.height,
        }
    }
}

/// Pixel offset written to the overlay's `top`/`left` style.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Coordinate {
    pub top: f64,
    pub left: f64,
}

impl Coordinate {
    #[must_use]
    pub const fn new(top: f64, left: f64) -> Self {
        Self { top, left }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn origin_size_derives_far_edges() {
        let rect = Rect::from_origin_size(10.0, 20.0, 30.0, 40.0);
        assert_eq!(rect.right, 40.0);
        assert_eq!(rect.bottom, 60.0);
        assert_eq!(rect.size(), Size::new(30.0, 40.0));
    }

    #[test]
    fn dimension_adds_container_scroll() {
        let element = Rect::from_origin_size(120.0, 80.0, 50.0, 20.0);
        let container = Rect::from_origin_size(20.0, 30.0, 400.0, 300.0);
        let dim = Dimension::relative_to(&element, &container, ScrollOffset::new(5.0, 40.0));
        assert_eq!(dim.left, 105.0);
        assert_eq!(dim.top, 90.0);
        assert_eq!(dim.right, 170.0 - 420.0);
        assert_eq!(dim.bottom, 100.0 - 330.0);
        assert_eq!((dim.width, dim.height), (50.0, 20.0));
    }
}
