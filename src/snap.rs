//! Snapping engine.
//!
//! Pure functions that turn a raw pointer position into a snapped one.
//! Wire drawing applies angle snap then alignment snap; grid snap is applied
//! only when a vertex is committed. Rotation handles and free drags have
//! their own snapping rules.

use crate::geometry::{Point, angle_between, normalize_degrees};
use crate::model::Schematic;
use crate::resolve::resolve_terminals;

pub const GRID_SIZE: f64 = 10.0;
/// Below this anchor distance a direction is too short to snap.
pub const ANGLE_SNAP_MIN_DISTANCE: f64 = 10.0;
pub const WIRE_ALIGN_THRESHOLD: f64 = 8.0;
pub const DRAG_ALIGN_THRESHOLD: f64 = 5.0;
pub const ROTATION_SNAP_THRESHOLD: f64 = 15.0;

const WIRE_ANGLES: [f64; 8] = [0.0, 45.0, 90.0, 135.0, 180.0, 225.0, 270.0, 315.0];
const ROTATION_ANGLES: [f64; 9] = [0.0, 45.0, 90.0, 135.0, 180.0, 225.0, 270.0, 315.0, 360.0];

/// Round to the nearest multiple of `grid`.
pub fn snap_to_grid(v: f64, grid: f64) -> f64 {
    (v / grid).round() * grid
}

pub fn snap_point_to_grid(p: Point, grid: f64) -> Point {
    Point::new(snap_to_grid(p.x, grid), snap_to_grid(p.y, grid))
}

/// Vertical (`x`) and horizontal (`y`) guide lines, in discovery order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Guides {
    pub x: Vec<f64>,
    pub y: Vec<f64>,
}

impl Guides {
    pub fn is_empty(&self) -> bool {
        self.x.is_empty() && self.y.is_empty()
    }

    pub fn clear(&mut self) {
        self.x.clear();
        self.y.clear();
    }

    /// Collect every candidate coordinate within `threshold` of `p` per axis.
    pub fn collect(candidates: impl IntoIterator<Item = Point>, p: Point, threshold: f64) -> Guides {
        let mut guides = Guides::default();
        for c in candidates {
            if (p.y - c.y).abs() <= threshold {
                guides.y.push(c.y);
            }
            if (p.x - c.x).abs() <= threshold {
                guides.x.push(c.x);
            }
        }
        guides
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Wire snapping
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AngleSnap {
    pub point: Point,
    /// Snapped direction in degrees; `None` when too close to the anchor.
    pub angle: Option<f64>,
}

/// Snap `target` onto the nearest of the eight canonical directions from
/// `anchor`, keeping its distance.
pub fn snap_angle(anchor: Point, target: Point) -> AngleSnap {
    let distance = anchor.distance(target);
    if distance < ANGLE_SNAP_MIN_DISTANCE {
        return AngleSnap {
            point: target,
            angle: None,
        };
    }
    let raw = normalize_degrees(angle_between(anchor, target));
    let mut best = WIRE_ANGLES[0];
    let mut best_diff = f64::INFINITY;
    for a in WIRE_ANGLES {
        let diff = (raw - a).abs();
        let diff = diff.min(360.0 - diff);
        if diff < best_diff {
            best_diff = diff;
            best = a;
        }
    }
    let (sin, cos) = best.to_radians().sin_cos();
    AngleSnap {
        point: Point::new(anchor.x + distance * cos, anchor.y + distance * sin),
        angle: Some(best),
    }
}

/// Alignment candidates for wire drawing: manual nodes first, then every
/// component terminal.
pub fn alignment_candidates(doc: &Schematic) -> Vec<Point> {
    doc.nodes
        .values()
        .map(|n| n.position())
        .chain(
            doc.components
                .values()
                .flat_map(resolve_terminals)
                .map(|t| t.position),
        )
        .collect()
}

/// Guides offered at `p` by the given candidates.
pub fn wire_alignment_guides(candidates: &[Point], p: Point) -> Guides {
    Guides::collect(candidates.iter().copied(), p, WIRE_ALIGN_THRESHOLD)
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AlignmentSnap {
    pub point: Point,
    pub snapped: bool,
}

/// Snap each axis independently to the first guide within threshold.
pub fn snap_to_alignment(candidates: &[Point], p: Point) -> AlignmentSnap {
    let guides = wire_alignment_guides(candidates, p);
    let mut point = p;
    let mut snapped = false;
    if let Some(&x) = guides.x.iter().find(|&&gx| (p.x - gx).abs() <= WIRE_ALIGN_THRESHOLD) {
        point.x = x;
        snapped = true;
    }
    if let Some(&y) = guides.y.iter().find(|&&gy| (p.y - gy).abs() <= WIRE_ALIGN_THRESHOLD) {
        point.y = y;
        snapped = true;
    }
    AlignmentSnap { point, snapped }
}

/// Result of the combined wire snap.
#[derive(Debug, Clone, PartialEq)]
pub struct WireSnap {
    pub point: Point,
    pub angle: Option<f64>,
    /// Guides active at the final point, for visual feedback.
    pub guides: Guides,
}

/// Angle snap from `anchor`, then alignment snap of the result.
pub fn snap_wire_point(candidates: &[Point], anchor: Point, raw: Point) -> WireSnap {
    let angled = snap_angle(anchor, raw);
    let aligned = snap_to_alignment(candidates, angled.point);
    WireSnap {
        point: aligned.point,
        angle: angled.angle,
        guides: wire_alignment_guides(candidates, aligned.point),
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Rotation and drag snapping
// ────────────────────────────────────────────────────────────────────────────

/// Snap a rotation-handle angle to the nearest multiple of 45° within 15°.
///
/// The result is always in `[0, 360)`.
pub fn snap_rotation(angle: f64) -> f64 {
    let normalized = normalize_degrees(angle);
    let mut best = ROTATION_ANGLES[0];
    let mut best_diff = (normalized - best).abs();
    for a in ROTATION_ANGLES {
        let diff = (normalized - a).abs();
        if diff < best_diff {
            best_diff = diff;
            best = a;
        }
    }
    if best_diff <= ROTATION_SNAP_THRESHOLD {
        if best == 360.0 { 0.0 } else { best }
    } else {
        normalized
    }
}

/// Guides for a freely dragged entity at `p` against other entities'
/// positions (5px, per axis).
pub fn drag_alignment_guides(others: impl IntoIterator<Item = Point>, p: Point) -> Guides {
    Guides::collect(others, p, DRAG_ALIGN_THRESHOLD)
}

/// Final position of a dragged entity: first guide per axis, otherwise the
/// grid when enabled, otherwise the raw coordinate.
pub fn snap_dragged_position(guides: &Guides, p: Point, grid: Option<f64>) -> Point {
    let axis = |guide: Option<&f64>, v: f64| match (guide, grid) {
        (Some(&g), _) => g,
        (None, Some(size)) => snap_to_grid(v, size),
        (None, None) => v,
    };
    Point::new(axis(guides.x.first(), p.x), axis(guides.y.first(), p.y))
}
