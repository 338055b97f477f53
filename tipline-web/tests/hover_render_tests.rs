use futures::executor::block_on;
use tipline_core::Placement;
use tipline_web::{HoverTooltip, HoverTooltipProps};
use yew::html::ChildrenRenderer;
use yew::{AttrValue, Classes, LocalServerRenderer, classes};

fn props(class: Classes) -> HoverTooltipProps {
    HoverTooltipProps {
        text: AttrValue::from("Saved <now>"),
        placements: vec![Placement::Above { cushion: 4.0 }],
        config: tipline_core::TooltipConfig::default(),
        class,
        children: ChildrenRenderer::default(),
    }
}

#[test]
fn hover_tooltip_renders_anchor_scope() {
    let renderer = LocalServerRenderer::<HoverTooltip>::with_props(props(classes!("badge")));
    let html = block_on(renderer.render());
    assert!(html.contains("tipline-scope"));
    assert!(html.contains("badge"));
    assert!(html.contains("tipline-anchor"));
    assert!(html.contains("position: relative"));
}

#[test]
fn overlay_is_not_rendered_until_hovered() {
    let renderer = LocalServerRenderer::<HoverTooltip>::with_props(props(Classes::new()));
    let html = block_on(renderer.render());
    assert!(!html.contains("tipline-tooltip"));
    assert!(!html.contains("Saved"));
}

#[test]
fn props_compare_by_value() {
    assert!(props(Classes::new()) == props(Classes::new()));
    let mut other = props(Classes::new());
    other.placements = vec![Placement::Below { cushion: 4.0 }];
    assert!(props(Classes::new()) != other);
}

#[test]
fn placements_deserialize_for_component_props() {
    let placements: Vec<Placement> =
        serde_json::from_str(r#"[{"kind":"auto","left_cushion":2,"top_cushion":3}]"#)
            .expect("placement json");
    assert_eq!(
        placements,
        vec![Placement::Auto {
            left_cushion: 2.0,
            top_cushion: 3.0
        }]
    );
}
