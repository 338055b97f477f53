//! Tipline Positioning Engine
//!
//! Platform-agnostic tooltip placement. A tooltip's overlay is first centered
//! over its anchor, then moved by fluent placement calls (above, below, left,
//! right, align, auto-place, inside) computed from that centered reference.
//! All environment access goes through the [`TooltipHost`] trait, so this
//! crate has no DOM dependency.

pub mod config;
pub mod geometry;
pub mod host;
pub mod memory;
pub mod placement;
pub mod positioner;
pub mod tooltip;

// Re-export commonly used types
pub use config::{ConfigError, TooltipConfig};
pub use geometry::{Coordinate, Dimension, Rect, ScrollOffset, Size};
pub use host::{
    EventHandler, EventKind, HostEvent, ListenerId, ListenerTarget, TimerId, TooltipHost,
};
pub use memory::{MemoryHost, MemoryHostError, NodeId};
pub use placement::{AutoOffsets, AxisUpdate, InsideEdge, Marker, Placement, UnknownEdge};
pub use positioner::{Measurements, Positioner, Transition};
pub use tooltip::{Overlay, Tooltip, TooltipError};
