//! Browser binding for `tipline-core`: a `web-sys` host, a script-facing
//! `Tooltip` class and Yew hover helpers.
#![forbid(unsafe_code)]
#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

pub mod bindings;
pub mod dom;
pub mod host;
pub mod hover;

pub use bindings::JsTooltip;
pub use dom::DomError;
pub use host::DomHost;
pub use hover::{HoverTooltip, HoverTooltipOptions, HoverTooltipProps, use_hover_tooltip};

/// Install the panic hook when the feature is enabled. Safe to call repeatedly.
#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(js_name = initTipline)]
pub fn init() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
    log::debug!("tipline initialized");
}
