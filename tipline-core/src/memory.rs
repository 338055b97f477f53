//! In-memory host
//!
//! A headless [`TooltipHost`] that keeps a flat node table, a listener
//! registry and a manual clock. Positioned children report a bounding rect
//! derived from their parent's rect, scroll offset and written `top`/`left`,
//! the way an absolutely positioned DOM child would.
use std::cell::{Cell, RefCell};
use std::collections::{BTreeMap, BTreeSet};

use thiserror::Error;

use crate::geometry::{Coordinate, Rect, ScrollOffset, Size};
use crate::host::{
    EventHandler, EventKind, HostEvent, ListenerId, ListenerTarget, TimerId, TooltipHost,
};

#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct NodeId(usize);

#[derive(Debug, Error, PartialEq, Eq)]
pub enum MemoryHostError {
    #[error("unknown node {0}")]
    UnknownNode(usize),
    #[error("node {0} cannot be appended to itself")]
    SelfAppend(usize),
}

#[derive(Debug, Clone, Default)]
struct Node {
    rect: Rect,
    size: Size,
    scroll: ScrollOffset,
    rooted: bool,
    parent: Option<NodeId>,
    position: Option<Coordinate>,
    display: Option<String>,
    classes: BTreeSet<String>,
    markup: Option<String>,
}

struct Registration {
    target: Option<NodeId>,
    kind: EventKind,
    handler: Option<EventHandler<NodeId>>,
}

struct Timer {
    due: u64,
    callback: Box<dyn FnOnce()>,
}

pub struct MemoryHost {
    nodes: RefCell<Vec<Node>>,
    viewport: Cell<Size>,
    markup_size: Cell<Size>,
    listeners: RefCell<BTreeMap<u64, Registration>>,
    timers: RefCell<BTreeMap<u64, Timer>>,
    next_id: Cell<u64>,
    clock: Cell<u64>,
}

impl MemoryHost {
    #[must_use]
    pub fn new(viewport: Size) -> Self {
        Self {
            nodes: RefCell::new(Vec::new()),
            viewport: Cell::new(viewport),
            markup_size: Cell::new(Size::default()),
            listeners: RefCell::new(BTreeMap::new()),
            timers: RefCell::new(BTreeMap::new()),
            next_id: Cell::new(1),
            clock: Cell::new(0),
        }
    }

    /// Add a laid-out element with a fixed viewport rect.
    pub fn add_element(&self, rect: Rect) -> NodeId {
        self.push(Node {
            rect,
            size: rect.size(),
            rooted: true,
            ..Node::default()
        })
    }

    /// Add a detached element that takes `size` once attached.
    pub fn add_overlay(&self, size: Size) -> NodeId {
        self.push(Node {
            size,
            ..Node::default()
        })
    }

    /// Size given to elements produced by [`TooltipHost::parse_markup`].
    pub fn set_markup_size(&self, size: Size) {
        self.markup_size.set(size);
    }

    pub fn set_viewport(&self, viewport: Size) {
        self.viewport.set(viewport);
    }

    /// Move or resize a laid-out element.
    pub fn set_rect(&self, id: NodeId, rect: Rect) {
        self.update(id, |node| {
            node.rect = rect;
            node.size = rect.size();
        });
    }

    pub fn set_size(&self, id: NodeId, size: Size) {
        self.update(id, |node| node.size = size);
    }

    /// Set a scroll offset without emitting a scroll event.
    pub fn set_scroll(&self, id: NodeId, offset: ScrollOffset) {
        self.update(id, |node| node.scroll = offset);
    }

    /// Scroll an element and deliver a `scroll` event to its listeners.
    pub fn scroll_to(&self, id: NodeId, offset: ScrollOffset) {
        self.set_scroll(id, offset);
        self.dispatch(Some(id), EventKind::Scroll, None);
    }

    /// Click `target` (or empty document space). The event bubbles from the
    /// target through its ancestors to the document.
    pub fn click(&self, target: Option<NodeId>) {
        let mut current = target;
        while let Some(id) = current {
            self.dispatch(Some(id), EventKind::Click, target);
            current = self.parent(id);
        }
        self.dispatch(None, EventKind::Click, target);
    }

    pub fn hover(&self, id: NodeId) {
        self.dispatch(Some(id), EventKind::MouseEnter, Some(id));
    }

    pub fn unhover(&self, id: NodeId) {
        self.dispatch(Some(id), EventKind::MouseLeave, Some(id));
    }

    /// Advance the clock, firing due callbacks in due order.
    pub fn advance(&self, ms: u64) {
        let until = self.clock.get().saturating_add(ms);
        loop {
            let next = {
                let mut timers = self.timers.borrow_mut();
                let due = timers
                    .iter()
                    .filter(|(_, timer)| timer.due <= until)
                    .min_by_key(|(id, timer)| (timer.due, **id))
                    .map(|(id, _)| *id);
                due.and_then(|id| timers.remove(&id))
            };
            let Some(timer) = next else {
                break;
            };
            self.clock.set(timer.due);
            (timer.callback)();
        }
        self.clock.set(until);
    }

    #[must_use]
    pub fn now(&self) -> u64 {
        self.clock.get()
    }

    #[must_use]
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes.borrow().get(id.0).and_then(|node| node.parent)
    }

    #[must_use]
    pub fn is_attached(&self, id: NodeId) -> bool {
        self.parent(id).is_some()
    }

    #[must_use]
    pub fn children(&self, id: NodeId) -> Vec<NodeId> {
        self.nodes
            .borrow()
            .iter()
            .enumerate()
            .filter(|(_, node)| node.parent == Some(id))
            .map(|(index, _)| NodeId(index))
            .collect()
    }

    /// Last written `top`/`left`.
    #[must_use]
    pub fn position(&self, id: NodeId) -> Option<Coordinate> {
        self.nodes.borrow().get(id.0).and_then(|node| node.position)
    }

    #[must_use]
    pub fn display(&self, id: NodeId) -> Option<String> {
        self.nodes
            .borrow()
            .get(id.0)
            .and_then(|node| node.display.clone())
    }

    #[must_use]
    pub fn has_class(&self, id: NodeId, class: &str) -> bool {
        self.nodes
            .borrow()
            .get(id.0)
            .is_some_and(|node| node.classes.contains(class))
    }

    #[must_use]
    pub fn classes(&self, id: NodeId) -> Vec<String> {
        self.nodes
            .borrow()
            .get(id.0)
            .map(|node| node.classes.iter().cloned().collect())
            .unwrap_or_default()
    }

    #[must_use]
    pub fn markup(&self, id: NodeId) -> Option<String> {
        self.nodes
            .borrow()
            .get(id.0)
            .and_then(|node| node.markup.clone())
    }

    #[must_use]
    pub fn listener_count(&self) -> usize {
        self.listeners.borrow().len()
    }

    #[must_use]
    pub fn listener_count_for(&self, id: NodeId) -> usize {
        self.listeners
            .borrow()
            .values()
            .filter(|reg| reg.target == Some(id))
            .count()
    }

    #[must_use]
    pub fn pending_timers(&self) -> usize {
        self.timers.borrow().len()
    }

    fn push(&self, node: Node) -> NodeId {
        let mut nodes = self.nodes.borrow_mut();
        nodes.push(node);
        NodeId(nodes.len() - 1)
    }

    fn update(&self, id: NodeId, apply: impl FnOnce(&mut Node)) {
        if let Some(node) = self.nodes.borrow_mut().get_mut(id.0) {
            apply(node);
        }
    }

    fn try_update(&self, id: NodeId, apply: impl FnOnce(&mut Node)) -> Result<(), MemoryHostError> {
        let mut nodes = self.nodes.borrow_mut();
        let node = nodes
            .get_mut(id.0)
            .ok_or(MemoryHostError::UnknownNode(id.0))?;
        apply(node);
        Ok(())
    }

    fn next_id(&self) -> u64 {
        let id = self.next_id.get();
        self.next_id.set(id + 1);
        id
    }

    fn dispatch(&self, target: Option<NodeId>, kind: EventKind, event_target: Option<NodeId>) {
        let ids: Vec<u64> = self
            .listeners
            .borrow()
            .iter()
            .filter(|(_, reg)| reg.target == target && reg.kind == kind)
            .map(|(id, _)| *id)
            .collect();
        let event = HostEvent {
            kind,
            target: event_target,
        };
        for id in ids {
            let handler = self
                .listeners
                .borrow_mut()
                .get_mut(&id)
                .and_then(|reg| reg.handler.take());
            let Some(mut handler) = handler else {
                continue;
            };
            handler(&event);
            if let Some(reg) = self.listeners.borrow_mut().get_mut(&id) {
                reg.handler = Some(handler);
            }
        }
    }
}

impl TooltipHost for MemoryHost {
    type Element = NodeId;
    type Error = MemoryHostError;

    fn bounding_rect(&self, element: &NodeId) -> Rect {
        let (node_rect, size, parent, position) = {
            let nodes = self.nodes.borrow();
            let Some(node) = nodes.get(element.0) else {
                return Rect::default();
            };
            (node.rect, node.size, node.parent, node.position)
        };
        match (parent, position) {
            (Some(parent), Some(position)) => {
                let parent_rect = self.bounding_rect(&parent);
                let scroll = self.scroll_offset(&parent);
                Rect::from_origin_size(
                    parent_rect.left - scroll.left + position.left,
                    parent_rect.top - scroll.top + position.top,
                    size.width,
                    size.height,
                )
            }
            _ => node_rect,
        }
    }

    fn scroll_offset(&self, element: &NodeId) -> ScrollOffset {
        self.nodes
            .borrow()
            .get(element.0)
            .map(|node| node.scroll)
            .unwrap_or_default()
    }

    fn outer_size(&self, element: &NodeId) -> Size {
        self.nodes
            .borrow()
            .get(element.0)
            .filter(|node| node.rooted || node.parent.is_some())
            .map(|node| node.size)
            .unwrap_or_default()
    }

    fn viewport(&self) -> Size {
        self.viewport.get()
    }

    fn parse_markup(&self, markup: &str) -> Result<Option<NodeId>, MemoryHostError> {
        let has_element = markup
            .split('<')
            .skip(1)
            .any(|rest| rest.starts_with(|c: char| c.is_ascii_alphabetic()));
        if !has_element {
            return Ok(None);
        }
        Ok(Some(self.push(Node {
            size: self.markup_size.get(),
            markup: Some(markup.trim().to_string()),
            ..Node::default()
        })))
    }

    fn append_child(&self, parent: &NodeId, child: &NodeId) -> Result<(), MemoryHostError> {
        if parent == child {
            return Err(MemoryHostError::SelfAppend(child.0));
        }
        if self.nodes.borrow().get(parent.0).is_none() {
            return Err(MemoryHostError::UnknownNode(parent.0));
        }
        self.try_update(*child, |node| node.parent = Some(*parent))
    }

    fn detach(&self, element: &NodeId) -> Result<(), MemoryHostError> {
        self.try_update(*element, |node| node.parent = None)
    }

    fn set_position(
        &self,
        element: &NodeId,
        coordinate: Coordinate,
    ) -> Result<(), MemoryHostError> {
        self.try_update(*element, |node| node.position = Some(coordinate))
    }

    fn set_display(&self, element: &NodeId, display: &str) -> Result<(), MemoryHostError> {
        self.try_update(*element, |node| node.display = Some(display.to_string()))
    }

    fn add_class(&self, element: &NodeId, class: &str) -> Result<(), MemoryHostError> {
        self.try_update(*element, |node| {
            node.classes.insert(class.to_string());
        })
    }

    fn remove_class(&self, element: &NodeId, class: &str) -> Result<(), MemoryHostError> {
        self.try_update(*element, |node| {
            node.classes.remove(class);
        })
    }

    fn listen(
        &self,
        target: ListenerTarget<'_, NodeId>,
        kind: EventKind,
        handler: EventHandler<NodeId>,
    ) -> Result<ListenerId, MemoryHostError> {
        let target = match target {
            ListenerTarget::Element(id) => {
                if self.nodes.borrow().get(id.0).is_none() {
                    return Err(MemoryHostError::UnknownNode(id.0));
                }
                Some(*id)
            }
            ListenerTarget::Document => None,
        };
        let id = self.next_id();
        self.listeners.borrow_mut().insert(
            id,
            Registration {
                target,
                kind,
                handler: Some(handler),
            },
        );
        Ok(ListenerId(id))
    }

    fn unlisten(&self, id: ListenerId) {
        let removed = self.listeners.borrow_mut().remove(&id.0);
        drop(removed);
    }

    fn schedule(
        &self,
        delay_ms: u32,
        callback: Box<dyn FnOnce()>,
    ) -> Result<TimerId, MemoryHostError> {
        let id = self.next_id();
        let due = self.clock.get().saturating_add(u64::from(delay_ms));
        self.timers.borrow_mut().insert(id, Timer { due, callback });
        Ok(TimerId(id))
    }

    fn cancel(&self, id: TimerId) {
        let removed = self.timers.borrow_mut().remove(&id.0);
        drop(removed);
    }
}
