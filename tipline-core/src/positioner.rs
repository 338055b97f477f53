//! Placement state machine
//!
//! The positioner is a plain record of the last measurements, the centered
//! reference coordinate and the last applied coordinate. Every placement is
//! computed from the centered coordinate plus a size-derived offset and then
//! merged onto the last applied coordinate, so chained single-axis calls
//! compose instead of overwriting each other and repeated calls never drift.
use std::collections::BTreeSet;

use smallvec::{SmallVec, smallvec};

use crate::geometry::{Coordinate, Dimension, Rect, ScrollOffset, Size};
use crate::placement::{AutoOffsets, AxisUpdate, InsideEdge, Marker, Placement};

/// Everything the geometry needs, captured from the host in one pass.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Measurements {
    pub anchor_rect: Rect,
    pub container_rect: Rect,
    pub container_scroll: ScrollOffset,
    pub overlay_size: Size,
    pub viewport: Size,
}

impl Measurements {
    #[must_use]
    pub fn anchor_dimension(&self) -> Dimension {
        Dimension::relative_to(
            &self.anchor_rect,
            &self.container_rect,
            self.container_scroll,
        )
    }

    /// Coordinate that puts the overlay's center on the anchor's center.
    #[must_use]
    pub fn centered(&self) -> Coordinate {
        let dim = self.anchor_dimension();
        Coordinate {
            top: dim.top - self.overlay_size.height / 2.0 + self.anchor_rect.height / 2.0,
            left: dim.left - self.overlay_size.width / 2.0 + self.anchor_rect.width / 2.0,
        }
    }

    /// Quadrant heuristic: put the overlay on whichever side of the anchor
    /// faces the larger half of the viewport. No overflow check is made.
    #[must_use]
    pub fn auto_offsets(&self) -> AutoOffsets {
        let half_width = self.viewport.width / 2.0;
        let half_height = self.viewport.height / 2.0;
        AutoOffsets {
            horizontal: if self.anchor_rect.left > half_width {
                Marker::Right
            } else {
                Marker::Left
            },
            vertical: if self.anchor_rect.top > half_height {
                Marker::Above
            } else {
                Marker::Below
            },
        }
    }

    fn vertical_gap(&self, cushion: f64) -> f64 {
        self.anchor_rect.height / 2.0 + self.overlay_size.height / 2.0 + cushion
    }

    fn horizontal_gap(&self, cushion: f64) -> f64 {
        self.anchor_rect.width / 2.0 + self.overlay_size.width / 2.0 + cushion
    }

    fn align_difference(&self) -> f64 {
        (self.anchor_rect.width - self.overlay_size.width) / 2.0
    }
}

/// Result of applying a placement: the coordinate to write and the markers to add.
#[derive(Debug, Clone, PartialEq)]
pub struct Transition {
    pub coordinate: Coordinate,
    pub added: SmallVec<[Marker; 4]>,
}

#[derive(Debug, Clone, PartialEq)]
struct Step {
    update: AxisUpdate,
    markers: SmallVec<[Marker; 3]>,
}

impl Step {
    fn new(update: AxisUpdate, marker: Marker) -> Self {
        Self {
            update,
            markers: smallvec![marker],
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Positioner {
    measurements: Measurements,
    centered: Coordinate,
    last: Coordinate,
    markers: BTreeSet<Marker>,
}

impl Positioner {
    #[must_use]
    pub fn new(measurements: Measurements) -> Self {
        let centered = measurements.centered();
        Self {
            measurements,
            centered,
            last: centered,
            markers: BTreeSet::new(),
        }
    }

    #[must_use]
    pub const fn measurements(&self) -> &Measurements {
        &self.measurements
    }

    #[must_use]
    pub const fn centered(&self) -> Coordinate {
        self.centered
    }

    #[must_use]
    pub const fn last(&self) -> Coordinate {
        self.last
    }

    #[must_use]
    pub const fn markers(&self) -> &BTreeSet<Marker> {
        &self.markers
    }

    /// Apply a placement. Returns `None` when the request addresses no axis
    /// (an empty `Inside`), leaving the state untouched.
    pub fn place(&mut self, placement: &Placement) -> Option<Transition> {
        let steps = self.steps(placement);
        if steps.is_empty() {
            return None;
        }
        let mut coordinate = self.last;
        let mut added = SmallVec::new();
        for step in steps {
            coordinate = step.update.compose(coordinate);
            for marker in step.markers {
                if !added.contains(&marker) {
                    added.push(marker);
                }
            }
        }
        self.last = coordinate;
        self.markers.extend(added.iter().copied());
        Some(Transition { coordinate, added })
    }

    /// Replace the measurements and go back to the centered coordinate.
    pub fn recenter(&mut self, measurements: Measurements) -> Coordinate {
        self.measurements = measurements;
        self.centered = measurements.centered();
        self.last = self.centered;
        self.markers.clear();
        self.centered
    }

    /// Move the applied coordinate vertically without touching the reference.
    pub fn shift_top(&mut self, delta: f64) -> Coordinate {
        self.last.top += delta;
        self.last
    }

    fn steps(&self, placement: &Placement) -> SmallVec<[Step; 4]> {
        let m = &self.measurements;
        let centered = self.centered;
        match placement {
            Placement::Above { cushion } => smallvec![Step::new(
                AxisUpdate::top(centered.top - m.vertical_gap(*cushion)),
                Marker::Above,
            )],
            Placement::Below { cushion } => smallvec![Step::new(
                AxisUpdate::top(centered.top + m.vertical_gap(*cushion)),
                Marker::Below,
            )],
            Placement::Left { cushion } => smallvec![Step::new(
                AxisUpdate::left(centered.left - m.horizontal_gap(*cushion)),
                Marker::Left,
            )],
            Placement::Right { cushion } => smallvec![Step::new(
                AxisUpdate::left(centered.left + m.horizontal_gap(*cushion)),
                Marker::Right,
            )],
            Placement::AlignLeft { cushion } => smallvec![self.align_left(*cushion)],
            Placement::AlignRight { cushion } => smallvec![self.align_right(*cushion)],
            Placement::AutoHorizontal { cushion } => {
                smallvec![self.auto_horizontal(m.auto_offsets(), *cushion)]
            }
            Placement::AutoVertical { cushion } => {
                smallvec![self.auto_vertical(m.auto_offsets(), *cushion)]
            }
            Placement::Auto {
                left_cushion,
                top_cushion,
            } => {
                let offsets = m.auto_offsets();
                let horizontal = self.auto_horizontal(offsets, *left_cushion);
                let vertical = self.auto_vertical(offsets, *top_cushion);
                smallvec![Step {
                    update: AxisUpdate {
                        top: vertical.update.top,
                        left: horizontal.update.left,
                    },
                    markers: smallvec![offsets.vertical, offsets.horizontal, Marker::Autoplace],
                }]
            }
            Placement::Inside { edges } => edges
                .iter()
                .map(|edge| match edge {
                    InsideEdge::Top => Step::new(
                        AxisUpdate::top(centered.top - m.anchor_rect.height / 4.0),
                        Marker::InsideTop,
                    ),
                    InsideEdge::Bottom => Step::new(
                        AxisUpdate::top(centered.top + m.anchor_rect.height / 2.0),
                        Marker::InsideBottom,
                    ),
                    InsideEdge::Left => self.align_left(0.0),
                    InsideEdge::Right => self.align_right(0.0),
                })
                .collect(),
        }
    }

    fn align_left(&self, cushion: f64) -> Step {
        let left = self.centered.left - self.measurements.align_difference() - cushion;
        Step::new(AxisUpdate::left(left), Marker::AlignLeft)
    }

    fn align_right(&self, cushion: f64) -> Step {
        let left = self.centered.left + self.measurements.align_difference() + cushion;
        Step::new(AxisUpdate::left(left), Marker::AlignRight)
    }

    fn auto_horizontal(&self, offsets: AutoOffsets, cushion: f64) -> Step {
        let gap = self.measurements.horizontal_gap(cushion);
        let left = if offsets.horizontal == Marker::Left {
            self.centered.left + gap
        } else {
            self.centered.left - gap
        };
        Step::new(AxisUpdate::left(left), offsets.horizontal)
    }

    fn auto_vertical(&self, offsets: AutoOffsets, cushion: f64) -> Step {
        let gap = self.measurements.vertical_gap(cushion);
        let top = if offsets.vertical == Marker::Above {
            self.centered.top - gap
        } else {
            self.centered.top + gap
        };
        Step::new(AxisUpdate::top(top), offsets.vertical)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn measurements() -> Measurements {
        Measurements {
            anchor_rect: Rect::from_origin_size(100.0, 100.0, 50.0, 20.0),
            container_rect: Rect::from_origin_size(0.0, 0.0, 500.0, 500.0),
            container_scroll: ScrollOffset::default(),
            overlay_size: Size::new(40.0, 20.0),
            viewport: Size::new(1000.0, 800.0),
        }
    }

    #[test]
    fn starts_centered_over_anchor() {
        let positioner = Positioner::new(measurements());
        assert_eq!(positioner.centered(), Coordinate::new(100.0, 105.0));
        assert_eq!(positioner.last(), positioner.centered());
        assert!(positioner.markers().is_empty());
    }

    #[test]
    fn centered_accounts_for_container_offset_and_scroll() {
        let mut m = measurements();
        m.container_rect = Rect::from_origin_size(30.0, 60.0, 500.0, 500.0);
        m.container_scroll = ScrollOffset::new(12.0, 200.0);
        let positioner = Positioner::new(m);
        assert_eq!(positioner.centered(), Coordinate::new(240.0, 87.0));
    }

    #[test]
    fn above_subtracts_half_sizes_and_cushion() {
        let mut positioner = Positioner::new(measurements());
        let transition = positioner
            .place(&Placement::Above { cushion: 5.0 })
            .unwrap();
        assert_eq!(transition.coordinate, Coordinate::new(75.0, 105.0));
        assert_eq!(transition.added.as_slice(), &[Marker::Above]);
    }

    #[test]
    fn outward_placements_use_full_half_sizes() {
        let mut positioner = Positioner::new(measurements());
        let below = positioner
            .place(&Placement::Below { cushion: 0.0 })
            .unwrap();
        assert_eq!(below.coordinate.top, 120.0);
        let left = positioner.place(&Placement::Left { cushion: 2.0 }).unwrap();
        assert_eq!(left.coordinate, Coordinate::new(120.0, 105.0 - 47.0));
        let right = positioner
            .place(&Placement::Right { cushion: 2.0 })
            .unwrap();
        assert_eq!(right.coordinate, Coordinate::new(120.0, 105.0 + 47.0));
    }

    #[test]
    fn align_uses_width_difference() {
        let mut positioner = Positioner::new(measurements());
        let left = positioner
            .place(&Placement::AlignLeft { cushion: 1.0 })
            .unwrap();
        assert_eq!(left.coordinate.left, 105.0 - 5.0 - 1.0);
        let right = positioner
            .place(&Placement::AlignRight { cushion: 1.0 })
            .unwrap();
        assert_eq!(right.coordinate.left, 105.0 + 5.0 + 1.0);
    }

    #[test]
    fn repeated_placement_does_not_drift() {
        let mut positioner = Positioner::new(measurements());
        let first = positioner
            .place(&Placement::Above { cushion: 3.0 })
            .unwrap();
        let second = positioner
            .place(&Placement::Above { cushion: 3.0 })
            .unwrap();
        assert_eq!(first.coordinate, second.coordinate);
    }

    #[test]
    fn auto_offsets_follow_viewport_quadrant() {
        let m = measurements();
        assert_eq!(
            m.auto_offsets(),
            AutoOffsets {
                horizontal: Marker::Left,
                vertical: Marker::Below
            }
        );

        let mut far = m;
        far.anchor_rect = Rect::from_origin_size(900.0, 700.0, 50.0, 20.0);
        assert_eq!(
            far.auto_offsets(),
            AutoOffsets {
                horizontal: Marker::Right,
                vertical: Marker::Above
            }
        );

        let mut midpoint = m;
        midpoint.anchor_rect = Rect::from_origin_size(500.0, 400.0, 50.0, 20.0);
        assert_eq!(midpoint.auto_offsets().horizontal, Marker::Left);
        assert_eq!(midpoint.auto_offsets().vertical, Marker::Below);
    }

    #[test]
    fn auto_place_moves_toward_open_space() {
        let mut positioner = Positioner::new(measurements());
        let transition = positioner
            .place(&Placement::Auto {
                left_cushion: 0.0,
                top_cushion: 4.0,
            })
            .unwrap();
        assert_eq!(transition.coordinate, Coordinate::new(124.0, 150.0));
        assert_eq!(
            transition.added.as_slice(),
            &[Marker::Below, Marker::Left, Marker::Autoplace]
        );

        let mut m = measurements();
        m.viewport = Size::new(100.0, 100.0);
        let mut positioner = Positioner::new(m);
        let transition = positioner
            .place(&Placement::Auto {
                left_cushion: 0.0,
                top_cushion: 0.0,
            })
            .unwrap();
        assert_eq!(transition.coordinate, Coordinate::new(80.0, 60.0));
        assert_eq!(
            transition.added.as_slice(),
            &[Marker::Above, Marker::Right, Marker::Autoplace]
        );
    }

    #[test]
    fn inside_applies_each_edge_in_order() {
        let mut positioner = Positioner::new(measurements());
        let transition = positioner
            .place(&Placement::Inside {
                edges: smallvec![InsideEdge::Top, InsideEdge::Right],
            })
            .unwrap();
        assert_eq!(transition.coordinate, Coordinate::new(95.0, 110.0));
        assert_eq!(
            transition.added.as_slice(),
            &[Marker::InsideTop, Marker::AlignRight]
        );

        let bottom = positioner
            .place(&Placement::Inside {
                edges: smallvec![InsideEdge::Bottom],
            })
            .unwrap();
        assert_eq!(bottom.coordinate, Coordinate::new(110.0, 110.0));
    }

    #[test]
    fn empty_inside_is_a_no_op() {
        let mut positioner = Positioner::new(measurements());
        positioner.place(&Placement::Above { cushion: 0.0 });
        let before = positioner.clone();
        assert!(
            positioner
                .place(&Placement::Inside {
                    edges: SmallVec::new()
                })
                .is_none()
        );
        assert_eq!(positioner, before);
    }

    #[test]
    fn recenter_clears_markers_and_uses_new_measurements() {
        let mut positioner = Positioner::new(measurements());
        positioner.place(&Placement::Below { cushion: 0.0 });
        let mut moved = measurements();
        moved.anchor_rect = Rect::from_origin_size(200.0, 50.0, 50.0, 20.0);
        let centered = positioner.recenter(moved);
        assert_eq!(centered, Coordinate::new(50.0, 205.0));
        assert_eq!(positioner.last(), centered);
        assert!(positioner.markers().is_empty());
    }

    #[test]
    fn shift_top_moves_applied_coordinate_only() {
        let mut positioner = Positioner::new(measurements());
        positioner.place(&Placement::Above { cushion: 5.0 });
        assert_eq!(positioner.shift_top(10.0), Coordinate::new(85.0, 105.0));
        assert_eq!(positioner.centered(), Coordinate::new(100.0, 105.0));
    }
}
