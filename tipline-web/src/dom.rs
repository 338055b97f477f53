use thiserror::Error;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{Document, Window};

#[derive(Debug, Error)]
pub enum DomError {
    #[error("`window` is unavailable outside a browser context")]
    MissingWindow,
    #[error("`document` is unavailable in this browser context")]
    MissingDocument,
    #[error("JavaScript error: {0}")]
    Js(String),
}

impl From<JsValue> for DomError {
    fn from(value: JsValue) -> Self {
        Self::Js(js_error_message(&value))
    }
}

/// Retrieve the global `window` object.
///
/// # Errors
/// Returns an error when executed outside a browser context.
pub fn window() -> Result<Window, DomError> {
    web_sys::window().ok_or(DomError::MissingWindow)
}

/// Retrieve the document object for DOM interactions.
///
/// # Errors
/// Returns an error when no window or document is available.
pub fn document() -> Result<Document, DomError> {
    window()?.document().ok_or(DomError::MissingDocument)
}

/// Convert a JavaScript value into a readable string for error reporting.
#[must_use]
pub fn js_error_message(value: &JsValue) -> String {
    value
        .as_string()
        .or_else(|| {
            value
                .dyn_ref::<js_sys::Error>()
                .map(|err| err.message().into())
        })
        .unwrap_or_else(|| format!("{value:?}"))
}

/// Log an error message to the browser console.
pub fn console_error(message: &str) {
    web_sys::console::error_1(&JsValue::from(message));
}

/// Wrap a Rust error as a JavaScript `Error` carrying its message.
#[must_use]
pub fn to_js_error(err: &impl std::fmt::Display) -> JsValue {
    js_sys::Error::new(&err.to_string()).into()
}
