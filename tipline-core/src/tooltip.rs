//! Tooltip handle
//!
//! A [`Tooltip`] owns one overlay element appended to a container and keeps
//! it positioned relative to an anchor element. Construction centers the
//! overlay over the anchor; the placement methods then move it relative to
//! that centered reference and can be chained:
//!
//! ```
//! use std::rc::Rc;
//! use tipline_core::geometry::{Rect, Size};
//! use tipline_core::memory::MemoryHost;
//! use tipline_core::tooltip::Tooltip;
//!
//! let host = Rc::new(MemoryHost::new(Size::new(1024.0, 768.0)));
//! let container = host.add_element(Rect::from_origin_size(0.0, 0.0, 500.0, 500.0));
//! let anchor = host.add_element(Rect::from_origin_size(100.0, 100.0, 50.0, 20.0));
//! host.set_markup_size(Size::new(40.0, 20.0));
//!
//! let tooltip = Tooltip::new(Rc::clone(&host), anchor, container, "<div>hi</div>").unwrap();
//! tooltip.align_right(0.0).above(5.0);
//! assert_eq!(tooltip.last_coordinate().top, 75.0);
//! ```
use std::cell::{Cell, RefCell};
use std::fmt::{self, Display};
use std::rc::Rc;

use thiserror::Error;

use crate::config::{ConfigError, TooltipConfig};
use crate::geometry::{Coordinate, Dimension};
use crate::host::{
    EventHandler, EventKind, HostEvent, ListenerId, ListenerTarget, TimerId, TooltipHost,
};
use crate::placement::{AutoOffsets, InsideEdge, Marker, Placement};
use crate::positioner::{Measurements, Positioner};

/// The overlay handed to [`Tooltip::new`]: an existing element or markup to parse.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Overlay<E> {
    Element(E),
    Markup(String),
}

impl<E> From<&str> for Overlay<E> {
    fn from(markup: &str) -> Self {
        Self::Markup(markup.to_string())
    }
}

impl<E> From<String> for Overlay<E> {
    fn from(markup: String) -> Self {
        Self::Markup(markup)
    }
}

#[derive(Debug, Error)]
pub enum TooltipError {
    #[error("the tooltip overlay must be an element or markup containing an element")]
    InvalidOverlay,
    #[error("invalid tooltip config: {0}")]
    Config(#[from] ConfigError),
    #[error("host failed to {operation}: {message}")]
    Host {
        operation: &'static str,
        message: String,
    },
}

impl TooltipError {
    fn host(operation: &'static str, err: &impl Display) -> Self {
        Self::Host {
            operation,
            message: err.to_string(),
        }
    }
}

#[derive(Copy, Clone, PartialEq, Eq, Debug)]
enum Purpose {
    Scroll,
    Dismiss,
    Callback,
}

struct Inner<H: TooltipHost> {
    host: Rc<H>,
    anchor: H::Element,
    container: H::Element,
    overlay: H::Element,
    config: TooltipConfig,
    positioner: RefCell<Positioner>,
    listeners: RefCell<Vec<(ListenerId, Purpose)>>,
    dismiss_timer: Cell<Option<TimerId>>,
    pending_callbacks: RefCell<Vec<TimerId>>,
    destroyed: Cell<bool>,
}

impl<H: TooltipHost + 'static> Inner<H> {
    fn measure(&self) -> Measurements {
        measure(
            self.host.as_ref(),
            &self.anchor,
            &self.container,
            &self.overlay,
        )
    }

    fn write(&self, coordinate: Coordinate) {
        if let Err(err) = self.host.set_position(&self.overlay, coordinate) {
            log::warn!("failed to position tooltip: {err}");
        }
    }

    fn apply(&self, placement: &Placement) {
        if self.destroyed.get() {
            return;
        }
        let transition = self.positioner.borrow_mut().place(placement);
        let Some(transition) = transition else {
            log::debug!("placement {placement:?} addressed no axis");
            return;
        };
        self.write(transition.coordinate);
        for marker in &transition.added {
            let class = marker.class_name(&self.config.class_prefix);
            if let Err(err) = self.host.add_class(&self.overlay, &class) {
                log::warn!("failed to add tooltip class {class}: {err}");
            }
        }
        log::debug!(
            "placed tooltip {placement:?} at ({:.1}, {:.1})",
            transition.coordinate.top,
            transition.coordinate.left
        );
    }

    fn center(&self) {
        if self.destroyed.get() {
            return;
        }
        for marker in Marker::ALL {
            let class = marker.class_name(&self.config.class_prefix);
            if let Err(err) = self.host.remove_class(&self.overlay, &class) {
                log::warn!("failed to remove tooltip class {class}: {err}");
            }
        }
        let measurements = self.measure();
        let centered = self.positioner.borrow_mut().recenter(measurements);
        self.write(centered);
        log::debug!(
            "re-centered tooltip at ({:.1}, {:.1})",
            centered.top,
            centered.left
        );
    }

    fn follow_scroll(&self, delta: f64) {
        if self.destroyed.get() || delta == 0.0 {
            return;
        }
        let coordinate = self.positioner.borrow_mut().shift_top(delta);
        self.write(coordinate);
    }

    fn set_display(&self, display: &str) {
        if self.destroyed.get() {
            return;
        }
        if let Err(err) = self.host.set_display(&self.overlay, display) {
            log::warn!("failed to set tooltip display: {err}");
        }
    }

    fn track(
        &self,
        target: ListenerTarget<'_, H::Element>,
        kind: EventKind,
        handler: EventHandler<H::Element>,
        purpose: Purpose,
    ) {
        match self.host.listen(target, kind, handler) {
            Ok(id) => self.listeners.borrow_mut().push((id, purpose)),
            Err(err) => log::warn!("failed to listen for {}: {err}", kind.as_str()),
        }
    }

    fn arm_dismissal(self: &Rc<Self>) {
        if self.destroyed.get() {
            return;
        }
        let weak = Rc::downgrade(self);
        let handler: EventHandler<H::Element> = Box::new(move |_: &HostEvent<H::Element>| {
            if let Some(inner) = weak.upgrade() {
                inner.destroy();
            }
        });
        self.track(
            ListenerTarget::Document,
            EventKind::Click,
            handler,
            Purpose::Dismiss,
        );
    }

    fn unlisten_where(&self, matches: impl Fn(Purpose) -> bool) {
        let removed: Vec<ListenerId> = {
            let mut listeners = self.listeners.borrow_mut();
            let (removed, kept): (Vec<_>, Vec<_>) = listeners
                .drain(..)
                .partition(|(_, purpose)| matches(*purpose));
            *listeners = kept;
            removed.into_iter().map(|(id, _)| id).collect()
        };
        for id in removed {
            self.host.unlisten(id);
        }
    }

    fn cancel_pending_callbacks(&self) {
        let pending = self.pending_callbacks.take();
        for timer in pending {
            self.host.cancel(timer);
        }
    }

    fn release(&self) {
        if let Some(timer) = self.dismiss_timer.take() {
            self.host.cancel(timer);
        }
        self.cancel_pending_callbacks();
        self.unlisten_where(|_| true);
    }

    fn destroy(&self) {
        if self.destroyed.replace(true) {
            return;
        }
        self.release();
        if let Err(err) = self.host.detach(&self.overlay) {
            log::warn!("failed to detach tooltip: {err}");
        }
        log::debug!("tooltip destroyed");
    }
}

impl<H: TooltipHost> Drop for Inner<H> {
    fn drop(&mut self) {
        // the overlay stays where it is; only host-held callbacks are released
        if let Some(timer) = self.dismiss_timer.take() {
            self.host.cancel(timer);
        }
        for timer in self.pending_callbacks.get_mut().drain(..) {
            self.host.cancel(timer);
        }
        for (id, _) in self.listeners.get_mut().drain(..) {
            self.host.unlisten(id);
        }
    }
}

fn measure<H: TooltipHost>(
    host: &H,
    anchor: &H::Element,
    container: &H::Element,
    overlay: &H::Element,
) -> Measurements {
    Measurements {
        anchor_rect: host.bounding_rect(anchor),
        container_rect: host.bounding_rect(container),
        container_scroll: host.scroll_offset(container),
        overlay_size: host.outer_size(overlay),
        viewport: host.viewport(),
    }
}

/// Cheap, clonable handle to a positioned overlay.
///
/// Every method returns `&Self` so placements chain. Once [`Tooltip::destroy`]
/// has run, every operation is a no-op.
pub struct Tooltip<H: TooltipHost> {
    inner: Rc<Inner<H>>,
}

impl<H: TooltipHost> Clone for Tooltip<H> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<H: TooltipHost> fmt::Debug for Tooltip<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Tooltip")
            .field("config", &self.inner.config)
            .field("destroyed", &self.inner.destroyed.get())
            .finish_non_exhaustive()
    }
}

impl<H: TooltipHost + 'static> Tooltip<H> {
    /// Attach `overlay` to `container` and center it over `anchor` using the default config.
    ///
    /// # Errors
    ///
    /// Returns [`TooltipError::InvalidOverlay`] when markup contains no element,
    /// or [`TooltipError::Host`] when the host rejects parsing, attachment or
    /// the first style write.
    pub fn new(
        host: Rc<H>,
        anchor: H::Element,
        container: H::Element,
        overlay: impl Into<Overlay<H::Element>>,
    ) -> Result<Self, TooltipError> {
        Self::with_config(host, anchor, container, overlay, TooltipConfig::default())
    }

    /// Same as [`Tooltip::new`] with an explicit config.
    ///
    /// # Errors
    ///
    /// Also returns [`TooltipError::Config`] if `config` fails validation.
    pub fn with_config(
        host: Rc<H>,
        anchor: H::Element,
        container: H::Element,
        overlay: impl Into<Overlay<H::Element>>,
        config: TooltipConfig,
    ) -> Result<Self, TooltipError> {
        config.validate()?;
        let overlay = match overlay.into() {
            Overlay::Element(element) => element,
            Overlay::Markup(markup) => host
                .parse_markup(&markup)
                .map_err(|err| TooltipError::host("parse overlay markup", &err))?
                .ok_or(TooltipError::InvalidOverlay)?,
        };

        host.append_child(&container, &overlay)
            .map_err(|err| TooltipError::host("attach overlay", &err))?;

        // the overlay only has a measurable size once attached
        let positioner = Positioner::new(measure(host.as_ref(), &anchor, &container, &overlay));
        let centered = positioner.centered();
        if let Err(err) = host.set_position(&overlay, centered) {
            if let Err(detach_err) = host.detach(&overlay) {
                log::warn!("failed to detach tooltip after positioning failed: {detach_err}");
            }
            return Err(TooltipError::host("position overlay", &err));
        }
        log::debug!(
            "tooltip centered at ({:.1}, {:.1})",
            centered.top,
            centered.left
        );

        Ok(Self {
            inner: Rc::new(Inner {
                host,
                anchor,
                container,
                overlay,
                config,
                positioner: RefCell::new(positioner),
                listeners: RefCell::new(Vec::new()),
                dismiss_timer: Cell::new(None),
                pending_callbacks: RefCell::new(Vec::new()),
                destroyed: Cell::new(false),
            }),
        })
    }

    /// Apply any placement request.
    pub fn place(&self, placement: &Placement) -> &Self {
        self.inner.apply(placement);
        self
    }

    pub fn above(&self, cushion: f64) -> &Self {
        self.place(&Placement::Above { cushion })
    }

    pub fn below(&self, cushion: f64) -> &Self {
        self.place(&Placement::Below { cushion })
    }

    pub fn left(&self, cushion: f64) -> &Self {
        self.place(&Placement::Left { cushion })
    }

    pub fn right(&self, cushion: f64) -> &Self {
        self.place(&Placement::Right { cushion })
    }

    /// Line the overlay's left edge up with the anchor's left edge.
    pub fn align_left(&self, cushion: f64) -> &Self {
        self.place(&Placement::AlignLeft { cushion })
    }

    /// Line the overlay's right edge up with the anchor's right edge.
    pub fn align_right(&self, cushion: f64) -> &Self {
        self.place(&Placement::AlignRight { cushion })
    }

    /// Move beside the anchor, toward the wider half of the viewport.
    pub fn auto_place_horizontally(&self, cushion: f64) -> &Self {
        self.place(&Placement::AutoHorizontal { cushion })
    }

    /// Move above or below the anchor, toward the taller half of the viewport.
    pub fn auto_place_vertically(&self, cushion: f64) -> &Self {
        self.place(&Placement::AutoVertical { cushion })
    }

    pub fn auto_place(&self, left_cushion: f64, top_cushion: f64) -> &Self {
        self.place(&Placement::Auto {
            left_cushion,
            top_cushion,
        })
    }

    /// Hug the given edges from inside the anchor. An empty list does nothing.
    pub fn inside(&self, edges: impl IntoIterator<Item = InsideEdge>) -> &Self {
        self.place(&Placement::Inside {
            edges: edges.into_iter().collect(),
        })
    }

    /// Drop every placement marker, re-measure everything and re-center.
    ///
    /// Call after the page reflows; measurements are otherwise snapshots.
    pub fn center(&self) -> &Self {
        self.inner.center();
        self
    }

    pub fn hide(&self) -> &Self {
        self.inner.set_display("none");
        self
    }

    pub fn show(&self) -> &Self {
        self.inner.set_display(&self.inner.config.shown_display);
        self
    }

    /// Release every listener and pending timer, then detach the overlay. Idempotent.
    pub fn destroy(&self) -> &Self {
        self.inner.destroy();
        self
    }

    /// Keep the overlay pinned to the anchor while `scroller` scrolls: each
    /// scroll event shifts the applied top by `previous - current` scroll top,
    /// so scrolling down moves the overlay up with the content.
    pub fn scroll_with(&self, scroller: &H::Element) -> &Self {
        if self.inner.destroyed.get() {
            return self;
        }
        let weak = Rc::downgrade(&self.inner);
        let element = scroller.clone();
        let last_top = Cell::new(self.inner.host.scroll_offset(scroller).top);
        let handler: EventHandler<H::Element> = Box::new(move |_: &HostEvent<H::Element>| {
            let Some(inner) = weak.upgrade() else {
                return;
            };
            let current = inner.host.scroll_offset(&element).top;
            inner.follow_scroll(last_top.replace(current) - current);
        });
        self.inner.track(
            ListenerTarget::Element(scroller),
            EventKind::Scroll,
            handler,
            Purpose::Scroll,
        );
        self
    }

    /// Destroy the tooltip on the next document click.
    ///
    /// The listener is armed after `dismiss_delay_ms` so the click that
    /// opened the tooltip does not close it. Calling again while armed or
    /// pending does nothing.
    pub fn remove_listener(&self) -> &Self {
        let inner = &self.inner;
        let already_armed = inner
            .listeners
            .borrow()
            .iter()
            .any(|(_, purpose)| *purpose == Purpose::Dismiss);
        if inner.destroyed.get() || already_armed || inner.dismiss_timer.get().is_some() {
            return self;
        }
        let weak = Rc::downgrade(inner);
        let scheduled = inner.host.schedule(
            inner.config.dismiss_delay_ms,
            Box::new(move || {
                if let Some(inner) = weak.upgrade() {
                    inner.dismiss_timer.set(None);
                    inner.arm_dismissal();
                }
            }),
        );
        match scheduled {
            Ok(timer) => inner.dismiss_timer.set(Some(timer)),
            Err(err) => log::warn!("failed to schedule tooltip dismissal: {err}"),
        }
        self
    }

    /// Call `callback(click_target, overlay)` on every document click until
    /// [`Tooltip::off_callback`] or [`Tooltip::destroy`].
    ///
    /// The document listener is installed on the next host tick, so a click
    /// that is still propagating when this is called never reaches `callback`.
    pub fn set_click_callback<F>(&self, mut callback: F) -> &Self
    where
        F: FnMut(Option<&H::Element>, &H::Element) + 'static,
    {
        let inner = &self.inner;
        if inner.destroyed.get() {
            return self;
        }
        let weak = Rc::downgrade(inner);
        let own_timer: Rc<Cell<Option<TimerId>>> = Rc::new(Cell::new(None));
        let slot = Rc::clone(&own_timer);
        let scheduled = inner.host.schedule(
            0,
            Box::new(move || {
                let Some(inner) = weak.upgrade() else {
                    return;
                };
                if let Some(timer) = slot.take() {
                    inner
                        .pending_callbacks
                        .borrow_mut()
                        .retain(|pending| *pending != timer);
                }
                if inner.destroyed.get() {
                    return;
                }
                let weak = Rc::downgrade(&inner);
                let handler: EventHandler<H::Element> =
                    Box::new(move |event: &HostEvent<H::Element>| {
                        if let Some(inner) = weak.upgrade()
                            && !inner.destroyed.get()
                        {
                            callback(event.target.as_ref(), &inner.overlay);
                        }
                    });
                inner.track(
                    ListenerTarget::Document,
                    EventKind::Click,
                    handler,
                    Purpose::Callback,
                );
            }),
        );
        match scheduled {
            Ok(timer) => {
                own_timer.set(Some(timer));
                inner.pending_callbacks.borrow_mut().push(timer);
            }
            Err(err) => log::warn!("failed to schedule tooltip click callback: {err}"),
        }
        self
    }

    /// Remove click callbacks without destroying the tooltip.
    pub fn off_callback(&self) -> &Self {
        self.inner.cancel_pending_callbacks();
        self.inner
            .unlisten_where(|purpose| purpose == Purpose::Callback);
        self
    }

    #[must_use]
    pub fn centered_coordinate(&self) -> Coordinate {
        self.inner.positioner.borrow().centered()
    }

    /// Coordinate most recently written to the overlay.
    #[must_use]
    pub fn last_coordinate(&self) -> Coordinate {
        self.inner.positioner.borrow().last()
    }

    /// Anchor box in container space, from the last measurement.
    #[must_use]
    pub fn anchor_dimension(&self) -> Dimension {
        self.inner
            .positioner
            .borrow()
            .measurements()
            .anchor_dimension()
    }

    /// Overlay box in container space, measured from the host now.
    #[must_use]
    pub fn overlay_dimension(&self) -> Dimension {
        let inner = &self.inner;
        let positioner = inner.positioner.borrow();
        let measurements = positioner.measurements();
        Dimension::relative_to(
            &inner.host.bounding_rect(&inner.overlay),
            &measurements.container_rect,
            measurements.container_scroll,
        )
    }

    /// Sides the quadrant heuristic picks for the current measurements.
    #[must_use]
    pub fn auto_offsets(&self) -> AutoOffsets {
        self.inner.positioner.borrow().measurements().auto_offsets()
    }

    /// Markers applied since construction or the last [`Tooltip::center`].
    #[must_use]
    pub fn markers(&self) -> Vec<Marker> {
        self.inner
            .positioner
            .borrow()
            .markers()
            .iter()
            .copied()
            .collect()
    }

    #[must_use]
    pub fn anchor(&self) -> &H::Element {
        &self.inner.anchor
    }

    #[must_use]
    pub fn container(&self) -> &H::Element {
        &self.inner.container
    }

    #[must_use]
    pub fn overlay(&self) -> &H::Element {
        &self.inner.overlay
    }

    #[must_use]
    pub fn config(&self) -> &TooltipConfig {
        &self.inner.config
    }

    #[must_use]
    pub fn is_destroyed(&self) -> bool {
        self.inner.destroyed.get()
    }
}
