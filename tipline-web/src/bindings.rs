//! JavaScript-facing `Tooltip` class
//!
//! Mirrors the fluent core API for plain script callers. Every chainable
//! method returns another handle to the same tooltip, and omitted cushions
//! default to zero.
use std::rc::Rc;

use js_sys::{Array, Function};
use tipline_core::{InsideEdge, Overlay, Tooltip, TooltipConfig};
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{Event, HtmlElement};

use crate::dom::{self, to_js_error};
use crate::host::DomHost;

thread_local! {
    static SHARED_HOST: std::cell::OnceCell<Rc<DomHost>> = const { std::cell::OnceCell::new() };
}

/// The host shared by every script-created tooltip on this thread.
fn shared_host() -> Result<Rc<DomHost>, JsValue> {
    SHARED_HOST.with(|cell| {
        if let Some(host) = cell.get() {
            return Ok(Rc::clone(host));
        }
        let host = Rc::new(DomHost::new().map_err(|err| to_js_error(&err))?);
        let _ = cell.set(Rc::clone(&host));
        Ok(host)
    })
}

#[wasm_bindgen(js_name = Tooltip)]
pub struct JsTooltip {
    inner: Tooltip<DomHost>,
}

impl JsTooltip {
    fn chained(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }

    #[must_use]
    pub const fn as_tooltip(&self) -> &Tooltip<DomHost> {
        &self.inner
    }
}

#[wasm_bindgen(js_class = Tooltip)]
impl JsTooltip {
    /// `tooltip` is an element or an HTML string whose first element becomes
    /// the overlay. `config` is an optional plain object.
    ///
    /// # Errors
    /// Throws a `TypeError` when `tooltip` is neither an element nor a string,
    /// and an `Error` when the config is invalid or the DOM rejects the overlay.
    #[wasm_bindgen(constructor)]
    pub fn new(
        element: HtmlElement,
        container: HtmlElement,
        tooltip: JsValue,
        config: Option<JsValue>,
    ) -> Result<JsTooltip, JsValue> {
        let config = match config {
            Some(value) if !value.is_undefined() && !value.is_null() => {
                serde_wasm_bindgen::from_value::<TooltipConfig>(value)
                    .map_err(|err| to_js_error(&err))?
            }
            _ => TooltipConfig::default(),
        };
        let host = shared_host()?;
        let overlay: Overlay<HtmlElement> = if let Some(markup) = tooltip.as_string() {
            Overlay::Markup(markup)
        } else {
            let element = tooltip.dyn_into::<HtmlElement>().map_err(|_| {
                JsValue::from(js_sys::TypeError::new(
                    "tooltip must be an HTMLElement or an HTML string",
                ))
            })?;
            Overlay::Element(element)
        };
        let inner = Tooltip::with_config(host, element, container, overlay, config).map_err(|err| {
            dom::console_error(&format!("tooltip construction failed: {err}"));
            to_js_error(&err)
        })?;
        Ok(Self { inner })
    }

    pub fn above(&self, cushion: Option<f64>) -> JsTooltip {
        self.inner.above(cushion.unwrap_or(0.0));
        self.chained()
    }

    pub fn below(&self, cushion: Option<f64>) -> JsTooltip {
        self.inner.below(cushion.unwrap_or(0.0));
        self.chained()
    }

    pub fn left(&self, cushion: Option<f64>) -> JsTooltip {
        self.inner.left(cushion.unwrap_or(0.0));
        self.chained()
    }

    pub fn right(&self, cushion: Option<f64>) -> JsTooltip {
        self.inner.right(cushion.unwrap_or(0.0));
        self.chained()
    }

    #[wasm_bindgen(js_name = alignLeft)]
    pub fn align_left(&self, cushion: Option<f64>) -> JsTooltip {
        self.inner.align_left(cushion.unwrap_or(0.0));
        self.chained()
    }

    #[wasm_bindgen(js_name = alignRight)]
    pub fn align_right(&self, cushion: Option<f64>) -> JsTooltip {
        self.inner.align_right(cushion.unwrap_or(0.0));
        self.chained()
    }

    #[wasm_bindgen(js_name = autoPlaceHorizontally)]
    pub fn auto_place_horizontally(&self, cushion: Option<f64>) -> JsTooltip {
        self.inner.auto_place_horizontally(cushion.unwrap_or(0.0));
        self.chained()
    }

    #[wasm_bindgen(js_name = autoPlaceVertically)]
    pub fn auto_place_vertically(&self, cushion: Option<f64>) -> JsTooltip {
        self.inner.auto_place_vertically(cushion.unwrap_or(0.0));
        self.chained()
    }

    #[wasm_bindgen(js_name = autoPlace)]
    pub fn auto_place(&self, left_cushion: Option<f64>, top_cushion: Option<f64>) -> JsTooltip {
        self.inner
            .auto_place(left_cushion.unwrap_or(0.0), top_cushion.unwrap_or(0.0));
        self.chained()
    }

    /// `edges` holds keywords among `top`, `bottom`, `left`, `right`; others are ignored.
    pub fn inside(&self, edges: &Array) -> JsTooltip {
        let keywords: Vec<String> = edges.iter().filter_map(|value| value.as_string()).collect();
        self.inner.inside(InsideEdge::parse_all(keywords));
        self.chained()
    }

    pub fn center(&self) -> JsTooltip {
        self.inner.center();
        self.chained()
    }

    pub fn hide(&self) -> JsTooltip {
        self.inner.hide();
        self.chained()
    }

    pub fn show(&self) -> JsTooltip {
        self.inner.show();
        self.chained()
    }

    pub fn destroy(&self) -> JsTooltip {
        self.inner.destroy();
        self.chained()
    }

    #[wasm_bindgen(js_name = scrollWith)]
    pub fn scroll_with(&self, scroller: &HtmlElement) -> JsTooltip {
        self.inner.scroll_with(scroller);
        self.chained()
    }

    #[wasm_bindgen(js_name = removeListener)]
    pub fn remove_listener(&self) -> JsTooltip {
        self.inner.remove_listener();
        self.chained()
    }

    /// Stops `event` from propagating, then calls `callback(target, tooltip)`
    /// on each later document click.
    #[wasm_bindgen(js_name = setClickCallback)]
    pub fn set_click_callback(&self, event: Option<Event>, callback: Function) -> JsTooltip {
        if let Some(event) = event {
            event.stop_propagation();
        }
        self.inner.set_click_callback(move |target, overlay| {
            let target = target.map_or(JsValue::NULL, |target| target.clone().into());
            if let Err(err) = callback.call2(&JsValue::NULL, &target, overlay) {
                log::warn!(
                    "tooltip click callback threw: {}",
                    dom::js_error_message(&err)
                );
            }
        });
        self.chained()
    }

    #[wasm_bindgen(js_name = offCallback)]
    pub fn off_callback(&self) -> JsTooltip {
        self.inner.off_callback();
        self.chained()
    }

    /// # Errors
    /// Fails only if the coordinate cannot be serialized.
    #[wasm_bindgen(js_name = centeredCoordinate)]
    pub fn centered_coordinate(&self) -> Result<JsValue, JsValue> {
        serde_wasm_bindgen::to_value(&self.inner.centered_coordinate())
            .map_err(|err| to_js_error(&err))
    }

    /// # Errors
    /// Fails only if the coordinate cannot be serialized.
    #[wasm_bindgen(js_name = lastCoordinate)]
    pub fn last_coordinate(&self) -> Result<JsValue, JsValue> {
        serde_wasm_bindgen::to_value(&self.inner.last_coordinate())
            .map_err(|err| to_js_error(&err))
    }

    /// Marker class names currently applied to the overlay.
    pub fn markers(&self) -> Array {
        let prefix = &self.inner.config().class_prefix;
        self.inner
            .markers()
            .into_iter()
            .map(|marker| JsValue::from(marker.class_name(prefix)))
            .collect()
    }

    #[wasm_bindgen(getter)]
    pub fn tooltip(&self) -> HtmlElement {
        self.inner.overlay().clone()
    }

    #[wasm_bindgen(getter, js_name = isDestroyed)]
    pub fn is_destroyed(&self) -> bool {
        self.inner.is_destroyed()
    }
}
