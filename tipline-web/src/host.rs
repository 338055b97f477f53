//! `web-sys` implementation of [`TooltipHost`]
//!
//! Listener and timer closures are owned by the host and keyed by id. A
//! closure that is unregistered may still be on the stack (a dismissal click
//! handler removes itself), so released closures are dropped from a fresh
//! microtask instead of inline.
use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;

use tipline_core::{
    Coordinate, EventHandler, EventKind, HostEvent, ListenerId, ListenerTarget, Rect,
    ScrollOffset, Size, TimerId, TooltipHost,
};
use wasm_bindgen::JsCast;
use wasm_bindgen::closure::Closure;
use web_sys::{Document, Event, EventTarget, HtmlElement, Window};

use crate::dom::{self, DomError};

struct DomListener {
    target: EventTarget,
    kind: EventKind,
    closure: Closure<dyn FnMut(Event)>,
}

struct DomTimer {
    handle: i32,
    fired: Rc<Cell<bool>>,
    _closure: Closure<dyn FnMut()>,
}

fn release_later<T: 'static>(value: T) {
    wasm_bindgen_futures::spawn_local(async move {
        drop(value);
    });
}

pub struct DomHost {
    window: Window,
    document: Document,
    listeners: RefCell<HashMap<u64, DomListener>>,
    timers: RefCell<HashMap<u64, DomTimer>>,
    next_id: Cell<u64>,
}

impl DomHost {
    /// # Errors
    /// Returns an error when no browser window or document is available.
    pub fn new() -> Result<Self, DomError> {
        let window = dom::window()?;
        let document = window.document().ok_or(DomError::MissingDocument)?;
        Ok(Self {
            window,
            document,
            listeners: RefCell::new(HashMap::new()),
            timers: RefCell::new(HashMap::new()),
            next_id: Cell::new(1),
        })
    }

    #[must_use]
    pub const fn document(&self) -> &Document {
        &self.document
    }

    #[must_use]
    pub fn listener_count(&self) -> usize {
        self.listeners.borrow().len()
    }

    /// Timers scheduled and neither fired nor cancelled.
    #[must_use]
    pub fn pending_timers(&self) -> usize {
        self.timers
            .borrow()
            .values()
            .filter(|timer| !timer.fired.get())
            .count()
    }

    fn next_id(&self) -> u64 {
        let id = self.next_id.get();
        self.next_id.set(id + 1);
        id
    }

    fn sweep_fired_timers(&self) {
        let fired: Vec<DomTimer> = {
            let mut timers = self.timers.borrow_mut();
            let ids: Vec<u64> = timers
                .iter()
                .filter(|(_, timer)| timer.fired.get())
                .map(|(id, _)| *id)
                .collect();
            ids.into_iter()
                .filter_map(|id| timers.remove(&id))
                .collect()
        };
        if !fired.is_empty() {
            release_later(fired);
        }
    }
}

impl Drop for DomHost {
    fn drop(&mut self) {
        for (_, listener) in self.listeners.get_mut().drain() {
            let _ = listener.target.remove_event_listener_with_callback(
                listener.kind.as_str(),
                listener.closure.as_ref().unchecked_ref(),
            );
            release_later(listener);
        }
        for (_, timer) in self.timers.get_mut().drain() {
            if !timer.fired.get() {
                self.window.clear_timeout_with_handle(timer.handle);
            }
            release_later(timer);
        }
    }
}

impl TooltipHost for DomHost {
    type Element = HtmlElement;
    type Error = DomError;

    fn bounding_rect(&self, element: &HtmlElement) -> Rect {
        let rect = element.get_bounding_client_rect();
        Rect {
            left: rect.left(),
            top: rect.top(),
            right: rect.right(),
            bottom: rect.bottom(),
            width: rect.width(),
            height: rect.height(),
        }
    }

    fn scroll_offset(&self, element: &HtmlElement) -> ScrollOffset {
        ScrollOffset::new(
            f64::from(element.scroll_left()),
            f64::from(element.scroll_top()),
        )
    }

    fn outer_size(&self, element: &HtmlElement) -> Size {
        Size::new(
            f64::from(element.offset_width()),
            f64::from(element.offset_height()),
        )
    }

    fn viewport(&self) -> Size {
        let read = |value: Result<wasm_bindgen::JsValue, wasm_bindgen::JsValue>| {
            value.ok().and_then(|v| v.as_f64()).unwrap_or(0.0)
        };
        Size::new(
            read(self.window.inner_width()),
            read(self.window.inner_height()),
        )
    }

    fn parse_markup(&self, markup: &str) -> Result<Option<HtmlElement>, DomError> {
        let scratch = self.document.create_element("div")?;
        scratch.set_inner_html(markup);
        let Some(first) = scratch.first_element_child() else {
            return Ok(None);
        };
        first.remove();
        Ok(first.dyn_into::<HtmlElement>().ok())
    }

    fn append_child(&self, parent: &HtmlElement, child: &HtmlElement) -> Result<(), DomError> {
        parent.append_child(child)?;
        Ok(())
    }

    fn detach(&self, element: &HtmlElement) -> Result<(), DomError> {
        element.remove();
        Ok(())
    }

    fn set_position(&self, element: &HtmlElement, coordinate: Coordinate) -> Result<(), DomError> {
        let style = element.style();
        style.set_property("top", &format!("{}px", coordinate.top))?;
        style.set_property("left", &format!("{}px", coordinate.left))?;
        Ok(())
    }

    fn set_display(&self, element: &HtmlElement, display: &str) -> Result<(), DomError> {
        element.style().set_property("display", display)?;
        Ok(())
    }

    fn add_class(&self, element: &HtmlElement, class: &str) -> Result<(), DomError> {
        element.class_list().add_1(class)?;
        Ok(())
    }

    fn remove_class(&self, element: &HtmlElement, class: &str) -> Result<(), DomError> {
        element.class_list().remove_1(class)?;
        Ok(())
    }

    fn listen(
        &self,
        target: ListenerTarget<'_, HtmlElement>,
        kind: EventKind,
        mut handler: EventHandler<HtmlElement>,
    ) -> Result<ListenerId, DomError> {
        let target: EventTarget = match target {
            ListenerTarget::Element(element) => element.clone().into(),
            ListenerTarget::Document => self.document.clone().into(),
        };
        let closure = Closure::<dyn FnMut(Event)>::new(move |event: Event| {
            let origin = event
                .target()
                .and_then(|origin| origin.dyn_into::<HtmlElement>().ok());
            handler(&HostEvent {
                kind,
                target: origin,
            });
        });
        target.add_event_listener_with_callback(kind.as_str(), closure.as_ref().unchecked_ref())?;

        let id = self.next_id();
        self.listeners.borrow_mut().insert(
            id,
            DomListener {
                target,
                kind,
                closure,
            },
        );
        Ok(ListenerId(id))
    }

    fn unlisten(&self, id: ListenerId) {
        let Some(listener) = self.listeners.borrow_mut().remove(&id.0) else {
            return;
        };
        if let Err(err) = listener.target.remove_event_listener_with_callback(
            listener.kind.as_str(),
            listener.closure.as_ref().unchecked_ref(),
        ) {
            log::warn!(
                "failed to remove {} listener: {}",
                listener.kind.as_str(),
                dom::js_error_message(&err)
            );
        }
        release_later(listener);
    }

    fn schedule(&self, delay_ms: u32, callback: Box<dyn FnOnce()>) -> Result<TimerId, DomError> {
        self.sweep_fired_timers();
        let fired = Rc::new(Cell::new(false));
        let flag = Rc::clone(&fired);
        let mut callback = Some(callback);
        let closure = Closure::<dyn FnMut()>::new(move || {
            flag.set(true);
            if let Some(callback) = callback.take() {
                callback();
            }
        });
        let handle = self
            .window
            .set_timeout_with_callback_and_timeout_and_arguments_0(
                closure.as_ref().unchecked_ref(),
                i32::try_from(delay_ms).unwrap_or(i32::MAX),
            )?;

        let id = self.next_id();
        self.timers.borrow_mut().insert(
            id,
            DomTimer {
                handle,
                fired,
                _closure: closure,
            },
        );
        Ok(TimerId(id))
    }

    fn cancel(&self, id: TimerId) {
        let Some(timer) = self.timers.borrow_mut().remove(&id.0) else {
            return;
        };
        if !timer.fired.get() {
            self.window.clear_timeout_with_handle(timer.handle);
        }
        release_later(timer);
    }
}
