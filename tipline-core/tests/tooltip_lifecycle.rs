#![allow(clippy::float_cmp)]

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use tipline_core::{
    Coordinate, EventKind, HostEvent, ListenerTarget, MemoryHost, NodeId, Overlay, Rect,
    ScrollOffset, Size, Tooltip, TooltipConfig, TooltipHost,
};

struct Scene {
    host: Rc<MemoryHost>,
    page: NodeId,
    container: NodeId,
    anchor: NodeId,
    overlay: NodeId,
}

fn scene() -> Scene {
    let host = Rc::new(MemoryHost::new(Size::new(1000.0, 800.0)));
    let page = host.add_element(Rect::from_origin_size(0.0, 0.0, 1000.0, 3000.0));
    let container = host.add_element(Rect::from_origin_size(0.0, 0.0, 500.0, 500.0));
    let anchor = host.add_element(Rect::from_origin_size(100.0, 100.0, 50.0, 20.0));
    let overlay = host.add_overlay(Size::new(40.0, 20.0));
    Scene {
        host,
        page,
        container,
        anchor,
        overlay,
    }
}

fn build(scene: &Scene) -> Tooltip<MemoryHost> {
    Tooltip::new(
        Rc::clone(&scene.host),
        scene.anchor,
        scene.container,
        Overlay::Element(scene.overlay),
    )
    .unwrap()
}

#[test]
fn destroy_is_idempotent() {
    let s = scene();
    let tooltip = build(&s);
    tooltip.destroy();
    assert!(!s.host.is_attached(s.overlay));
    assert!(tooltip.is_destroyed());

    tooltip.destroy();
    assert!(!s.host.is_attached(s.overlay));
    assert!(s.host.children(s.container).is_empty());
}

#[test]
fn scrolling_down_moves_overlay_up_with_anchor() {
    let s = scene();
    let tooltip = build(&s);
    tooltip.scroll_with(&s.page);
    let before = s.host.position(s.overlay).unwrap();

    s.host.scroll_to(s.page, ScrollOffset::new(0.0, 10.0));
    let after = s.host.position(s.overlay).unwrap();
    assert_eq!(after.top, before.top - 10.0);
    assert_eq!(after.left, before.left);
}

#[test]
fn scroll_with_follows_scroll_deltas() {
    let s = scene();
    s.host.set_scroll(s.page, ScrollOffset::new(0.0, 20.0));
    let tooltip = build(&s);
    tooltip.above(5.0).scroll_with(&s.page);
    let before = s.host.position(s.overlay).unwrap();

    // previous minus current: +10, then -4
    s.host.scroll_to(s.page, ScrollOffset::new(0.0, 10.0));
    assert_eq!(s.host.position(s.overlay).unwrap().top, before.top + 10.0);
    s.host.scroll_to(s.page, ScrollOffset::new(0.0, 14.0));

    let after = s.host.position(s.overlay).unwrap();
    assert_eq!(after.top, before.top + 6.0);
    assert_eq!(after.left, before.left);
    assert_eq!(tooltip.last_coordinate(), after);
}

#[test]
fn scroll_with_starts_from_current_offset() {
    let s = scene();
    s.host.set_scroll(s.page, ScrollOffset::new(0.0, 200.0));
    let tooltip = build(&s);
    tooltip.scroll_with(&s.page);

    s.host.scroll_to(s.page, ScrollOffset::new(0.0, 195.0));
    assert_eq!(
        s.host.position(s.overlay),
        Some(Coordinate::new(105.0, 105.0))
    );
}

#[test]
fn scroll_listener_is_released_on_destroy() {
    let s = scene();
    let tooltip = build(&s);
    tooltip.scroll_with(&s.page);
    assert_eq!(s.host.listener_count_for(s.page), 1);

    tooltip.destroy();
    assert_eq!(s.host.listener_count_for(s.page), 0);
    s.host.scroll_to(s.page, ScrollOffset::new(0.0, 50.0));
    assert_eq!(
        s.host.position(s.overlay),
        Some(Coordinate::new(100.0, 105.0))
    );
}

#[test]
fn dismissal_arms_after_delay() {
    let s = scene();
    let tooltip = build(&s);
    tooltip.remove_listener();

    // the opening click is still propagating
    s.host.click(Some(s.anchor));
    assert!(s.host.is_attached(s.overlay));
    assert_eq!(s.host.listener_count(), 0);

    s.host.advance(49);
    assert_eq!(s.host.listener_count(), 0);
    s.host.advance(1);
    assert_eq!(s.host.listener_count(), 1);

    s.host.click(None);
    assert!(tooltip.is_destroyed());
    assert!(!s.host.is_attached(s.overlay));
    assert_eq!(s.host.listener_count(), 0);
}

#[test]
fn dismissal_delay_comes_from_config() {
    let s = scene();
    let config = TooltipConfig {
        dismiss_delay_ms: 0,
        ..TooltipConfig::default()
    };
    let tooltip = Tooltip::with_config(
        Rc::clone(&s.host),
        s.anchor,
        s.container,
        Overlay::Element(s.overlay),
        config,
    )
    .unwrap();
    tooltip.remove_listener().remove_listener();
    assert_eq!(s.host.pending_timers(), 1);

    s.host.advance(0);
    assert_eq!(s.host.listener_count(), 1);
    tooltip.remove_listener();
    assert_eq!(s.host.pending_timers(), 0);
    assert_eq!(s.host.listener_count(), 1);
}

#[test]
fn destroy_before_arming_cancels_dismissal() {
    let s = scene();
    let tooltip = build(&s);
    tooltip.remove_listener();
    tooltip.destroy();
    assert_eq!(s.host.pending_timers(), 0);
    s.host.advance(100);
    assert_eq!(s.host.listener_count(), 0);
}

#[test]
fn click_callback_receives_target_and_overlay() {
    let s = scene();
    let tooltip = build(&s);
    let seen = Rc::new(RefCell::new(Vec::new()));
    {
        let seen = Rc::clone(&seen);
        tooltip.set_click_callback(move |target, overlay| {
            seen.borrow_mut().push((target.copied(), *overlay));
        });
    }
    s.host.advance(0);

    s.host.click(Some(s.anchor));
    s.host.click(None);
    assert_eq!(
        *seen.borrow(),
        vec![(Some(s.anchor), s.overlay), (None, s.overlay)]
    );

    tooltip.off_callback();
    s.host.click(None);
    assert_eq!(seen.borrow().len(), 2);
    assert!(s.host.is_attached(s.overlay));
}

#[test]
fn off_callback_keeps_other_listeners() {
    let s = scene();
    let tooltip = build(&s);
    tooltip
        .scroll_with(&s.page)
        .set_click_callback(|_, _| {})
        .set_click_callback(|_, _| {});
    s.host.advance(0);
    assert_eq!(s.host.listener_count(), 3);
    tooltip.off_callback();
    assert_eq!(s.host.listener_count(), 1);
    assert_eq!(s.host.listener_count_for(s.page), 1);
}

#[test]
fn callback_may_destroy_its_tooltip() {
    let s = scene();
    let tooltip = build(&s);
    let handle = tooltip.clone();
    tooltip.set_click_callback(move |_, _| {
        handle.destroy();
    });
    s.host.advance(0);
    s.host.click(None);
    assert!(tooltip.is_destroyed());
    assert_eq!(s.host.listener_count(), 0);
}

#[test]
fn many_tooltips_leave_no_listeners_behind() {
    let s = scene();
    for _ in 0..100 {
        let tooltip = build(&s);
        tooltip
            .auto_place(2.0, 2.0)
            .scroll_with(&s.page)
            .set_click_callback(|_, _| {})
            .remove_listener();
        s.host.advance(50);
        tooltip.destroy();
    }
    assert_eq!(s.host.listener_count(), 0);
    assert_eq!(s.host.pending_timers(), 0);
    assert!(s.host.children(s.container).is_empty());
}

#[test]
fn hide_and_show_toggle_display() {
    let s = scene();
    let tooltip = build(&s);
    tooltip.hide();
    assert_eq!(s.host.display(s.overlay).as_deref(), Some("none"));
    tooltip.show();
    assert_eq!(s.host.display(s.overlay).as_deref(), Some("block"));

    let config = TooltipConfig {
        shown_display: "flex".to_string(),
        ..TooltipConfig::default()
    };
    let other = host_overlay_tooltip(&s, config);
    other.hide().show();
    assert_eq!(s.host.display(*other.overlay()).as_deref(), Some("flex"));
}

fn host_overlay_tooltip(s: &Scene, config: TooltipConfig) -> Tooltip<MemoryHost> {
    let overlay = s.host.add_overlay(Size::new(10.0, 10.0));
    Tooltip::with_config(
        Rc::clone(&s.host),
        s.anchor,
        s.container,
        Overlay::Element(overlay),
        config,
    )
    .unwrap()
}

#[test]
fn click_that_installs_callback_does_not_reach_it() {
    let s = scene();
    let tooltip = build(&s);
    let hits = Rc::new(Cell::new(0));
    let opener = {
        let tooltip = tooltip.clone();
        let hits = Rc::clone(&hits);
        move |_: &HostEvent<NodeId>| {
            let hits = Rc::clone(&hits);
            tooltip.set_click_callback(move |_, _| hits.set(hits.get() + 1));
        }
    };
    let opener_id = s
        .host
        .listen(
            ListenerTarget::Element(&s.anchor),
            EventKind::Click,
            Box::new(opener),
        )
        .unwrap();

    s.host.click(Some(s.anchor));
    assert_eq!(hits.get(), 0);
    s.host.unlisten(opener_id);

    s.host.advance(0);
    s.host.click(None);
    assert_eq!(hits.get(), 1);
}

#[test]
fn destroy_cancels_callback_not_yet_installed() {
    let s = scene();
    let tooltip = build(&s);
    tooltip.set_click_callback(|_, _| {});
    assert_eq!(s.host.pending_timers(), 1);
    tooltip.destroy();
    assert_eq!(s.host.pending_timers(), 0);
    s.host.advance(10);
    assert_eq!(s.host.listener_count(), 0);
}
