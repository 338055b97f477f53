//! Yew integration: a hover-triggered tooltip hook and a wrapper component.
use tipline_core::{Placement, TooltipConfig};
use yew::hook;
use yew::prelude::*;

#[derive(Clone, PartialEq, Debug, Default)]
pub struct HoverTooltipOptions {
    /// Overlay markup; its first element becomes the tooltip
    pub markup: AttrValue,
    /// Applied in order each time the tooltip opens. Empty leaves it centered.
    pub placements: Vec<Placement>,
    pub config: TooltipConfig,
}

#[cfg(target_arch = "wasm32")]
mod session {
    use std::cell::RefCell;
    use std::rc::{Rc, Weak};

    use tipline_core::{EventKind, HostEvent, ListenerId, ListenerTarget, Tooltip, TooltipHost};
    use web_sys::HtmlElement;

    use super::HoverTooltipOptions;
    use crate::host::DomHost;

    type Active = RefCell<Option<Tooltip<DomHost>>>;

    /// Listeners on one anchor plus the tooltip currently open for it.
    pub struct HoverSession {
        host: Rc<DomHost>,
        listeners: Vec<ListenerId>,
        active: Rc<Active>,
    }

    impl HoverSession {
        pub fn start(
            anchor: HtmlElement,
            container: HtmlElement,
            options: HoverTooltipOptions,
        ) -> Option<Self> {
            let host = match DomHost::new() {
                Ok(host) => Rc::new(host),
                Err(err) => {
                    log::warn!("hover tooltip unavailable: {err}");
                    return None;
                }
            };
            let active: Rc<Active> = Rc::new(RefCell::new(None));
            let mut listeners = Vec::with_capacity(2);

            let open = {
                let host = Rc::downgrade(&host);
                let active = Rc::downgrade(&active);
                let anchor = anchor.clone();
                move |_: &HostEvent<HtmlElement>| {
                    open_tooltip(&host, &active, &anchor, &container, &options);
                }
            };
            match host.listen(
                ListenerTarget::Element(&anchor),
                EventKind::MouseEnter,
                Box::new(open),
            ) {
                Ok(id) => listeners.push(id),
                Err(err) => log::warn!("failed to listen for mouseenter: {err}"),
            }

            let close = {
                let active = Rc::downgrade(&active);
                move |_: &HostEvent<HtmlElement>| close_tooltip(&active)
            };
            match host.listen(
                ListenerTarget::Element(&anchor),
                EventKind::MouseLeave,
                Box::new(close),
            ) {
                Ok(id) => listeners.push(id),
                Err(err) => log::warn!("failed to listen for mouseleave: {err}"),
            }

            Some(Self {
                host,
                listeners,
                active,
            })
        }
    }

    fn open_tooltip(
        host: &Weak<DomHost>,
        active: &Weak<Active>,
        anchor: &HtmlElement,
        container: &HtmlElement,
        options: &HoverTooltipOptions,
    ) {
        let (Some(host), Some(active)) = (host.upgrade(), active.upgrade()) else {
            return;
        };
        if active.borrow().is_some() {
            return;
        }
        let tooltip = match Tooltip::with_config(
            host,
            anchor.clone(),
            container.clone(),
            options.markup.to_string(),
            options.config.clone(),
        ) {
            Ok(tooltip) => tooltip,
            Err(err) => {
                log::warn!("failed to open hover tooltip: {err}");
                return;
            }
        };
        for placement in &options.placements {
            tooltip.place(placement);
        }
        *active.borrow_mut() = Some(tooltip);
    }

    fn close_tooltip(active: &Weak<Active>) {
        let Some(active) = active.upgrade() else {
            return;
        };
        let open = active.borrow_mut().take();
        if let Some(tooltip) = open {
            tooltip.destroy();
        }
    }

    impl Drop for HoverSession {
        fn drop(&mut self) {
            for id in self.listeners.drain(..) {
                self.host.unlisten(id);
            }
            let open = self.active.borrow_mut().take();
            if let Some(tooltip) = open {
                tooltip.destroy();
            }
        }
    }
}

/// Show a tooltip over `anchor` while the pointer hovers it. The overlay is
/// appended to `container` on enter and removed on leave or unmount.
#[cfg(target_arch = "wasm32")]
#[hook]
pub fn use_hover_tooltip(anchor: NodeRef, container: NodeRef, options: HoverTooltipOptions) {
    use_effect_with(
        (anchor, container, options),
        move |(anchor, container, options)| {
            let session = match (
                anchor.cast::<web_sys::HtmlElement>(),
                container.cast::<web_sys::HtmlElement>(),
            ) {
                (Some(anchor), Some(container)) => {
                    session::HoverSession::start(anchor, container, options.clone())
                }
                _ => None,
            };
            move || drop(session)
        },
    );
}

#[cfg(not(target_arch = "wasm32"))]
#[hook]
pub fn use_hover_tooltip(anchor: NodeRef, container: NodeRef, options: HoverTooltipOptions) {
    let _ = (anchor, container, options);
}

/// Escape text for safe interpolation into overlay markup.
#[must_use]
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

#[derive(Properties, PartialEq, Clone)]
pub struct HoverTooltipProps {
    pub text: AttrValue,
    #[prop_or_default]
    pub placements: Vec<Placement>,
    #[prop_or_default]
    pub config: TooltipConfig,
    #[prop_or_default]
    pub class: Classes,
    #[prop_or_default]
    pub children: Children,
}

#[function_component(HoverTooltip)]
pub fn hover_tooltip(props: &HoverTooltipProps) -> Html {
    let anchor = use_node_ref();
    let container = use_node_ref();
    let markup = format!(
        "<div class=\"tipline-tooltip\" role=\"tooltip\">{}</div>",
        escape_html(&props.text)
    );
    use_hover_tooltip(
        anchor.clone(),
        container.clone(),
        HoverTooltipOptions {
            markup: AttrValue::from(markup),
            placements: props.placements.clone(),
            config: props.config.clone(),
        },
    );

    let class = classes!("tipline-scope", props.class.clone());
    html! {
        <span class={class} ref={container} style="position: relative; display: inline-block;">
            <span class="tipline-anchor" ref={anchor}>
                { for props.children.iter() }
            </span>
        </span>
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escape_html_neutralizes_markup() {
        assert_eq!(
            escape_html(r#"<b onclick="x()">Tom & 'Jerry'</b>"#),
            "&lt;b onclick=&quot;x()&quot;&gt;Tom &amp; &#39;Jerry&#39;&lt;/b&gt;"
        );
        assert_eq!(escape_html("plain"), "plain");
    }

    #[test]
    fn default_options_leave_tooltip_centered() {
        let options = HoverTooltipOptions::default();
        assert!(options.placements.is_empty());
        assert_eq!(options.config, TooltipConfig::default());
    }
}
