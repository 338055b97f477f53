//! Host environment boundary
//!
//! The positioner never touches a DOM directly. Everything it reads or
//! writes goes through [`TooltipHost`], which the browser binding implements
//! on top of `web-sys` and [`crate::memory::MemoryHost`] implements in memory.
use crate::geometry::{Coordinate, Rect, ScrollOffset, Size};

/// Handle for a registered event listener.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct ListenerId(pub u64);

/// Handle for a scheduled callback.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct TimerId(pub u64);

#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
pub enum EventKind {
    Scroll,
    Click,
    MouseEnter,
    MouseLeave,
}

impl EventKind {
    /// DOM event type name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Scroll => "scroll",
            Self::Click => "click",
            Self::MouseEnter => "mouseenter",
            Self::MouseLeave => "mouseleave",
        }
    }
}

/// Where a listener is attached.
#[derive(Debug)]
pub enum ListenerTarget<'a, E> {
    Element(&'a E),
    Document,
}

/// Event delivered to a listener.
#[derive(Debug, Clone)]
pub struct HostEvent<E> {
    pub kind: EventKind,
    /// Element the event originated from, when the host can resolve one.
    pub target: Option<E>,
}

pub type EventHandler<E> = Box<dyn FnMut(&HostEvent<E>)>;

/// Measurement, mutation and event primitives a tooltip needs from its environment.
///
/// Hosts are single-threaded and may be re-entered: a handler running inside
/// an event dispatch is allowed to call [`TooltipHost::unlisten`] on itself or
/// any other listener.
pub trait TooltipHost {
    type Element: Clone + 'static;
    type Error: std::error::Error + 'static;

    /// Viewport-relative bounding box.
    fn bounding_rect(&self, element: &Self::Element) -> Rect;

    fn scroll_offset(&self, element: &Self::Element) -> ScrollOffset;

    /// Outer size including borders. Only meaningful once the element is attached.
    fn outer_size(&self, element: &Self::Element) -> Size;

    fn viewport(&self) -> Size;

    /// Parse markup and return its first element, or `None` when it has none.
    ///
    /// # Errors
    ///
    /// Returns an error if the host cannot create elements.
    fn parse_markup(&self, markup: &str) -> Result<Option<Self::Element>, Self::Error>;

    /// # Errors
    ///
    /// Returns an error if the host rejects the insertion.
    fn append_child(
        &self,
        parent: &Self::Element,
        child: &Self::Element,
    ) -> Result<(), Self::Error>;

    /// Remove an element from its parent. Detached elements are left alone.
    ///
    /// # Errors
    ///
    /// Returns an error if the host rejects the removal.
    fn detach(&self, element: &Self::Element) -> Result<(), Self::Error>;

    /// Write `top`/`left` pixel offsets.
    ///
    /// # Errors
    ///
    /// Returns an error if the style cannot be written.
    fn set_position(
        &self,
        element: &Self::Element,
        coordinate: Coordinate,
    ) -> Result<(), Self::Error>;

    /// # Errors
    ///
    /// Returns an error if the style cannot be written.
    fn set_display(&self, element: &Self::Element, display: &str) -> Result<(), Self::Error>;

    /// # Errors
    ///
    /// Returns an error if the class list cannot be modified.
    fn add_class(&self, element: &Self::Element, class: &str) -> Result<(), Self::Error>;

    /// # Errors
    ///
    /// Returns an error if the class list cannot be modified.
    fn remove_class(&self, element: &Self::Element, class: &str) -> Result<(), Self::Error>;

    /// Register an event listener. The host owns the handler until [`TooltipHost::unlisten`].
    ///
    /// # Errors
    ///
    /// Returns an error if the listener cannot be attached.
    fn listen(
        &self,
        target: ListenerTarget<'_, Self::Element>,
        kind: EventKind,
        handler: EventHandler<Self::Element>,
    ) -> Result<ListenerId, Self::Error>;

    /// Unregister a listener. Unknown ids are ignored.
    fn unlisten(&self, id: ListenerId);

    /// Run `callback` once after `delay_ms`.
    ///
    /// # Errors
    ///
    /// Returns an error if the timer cannot be scheduled.
    fn schedule(&self, delay_ms: u32, callback: Box<dyn FnOnce()>) -> Result<TimerId, Self::Error>;

    /// Cancel a pending callback. Fired or unknown ids are ignored.
    fn cancel(&self, id: TimerId);
}
