//! In-progress wire construction.
//!
//! An [`ActiveWire`] exists only while the user is drawing. Its points are a
//! committed prefix followed by a preview tail that follows the pointer; the
//! tail is rebuilt on every [`ActiveWire::extend`] according to the
//! [`WireStyle`]. [`ActiveWire::finish`] turns it into committed wires.

use serde::{Deserialize, Serialize};

use crate::geometry::Point;
use crate::model::{Wire, WirePoint, new_id};
use crate::snap::snap_point_to_grid;

/// How the preview tail is routed from the last committed vertex.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WireStyle {
    /// One direct segment.
    Straight,
    /// One axis-aligned bend.
    #[default]
    Elbow,
    /// Free vertices committed click by click.
    Polyline,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ActiveWire {
    id: String,
    points: Vec<WirePoint>,
    /// Length of the committed prefix of `points`.
    committed: usize,
    color: Option<String>,
}

impl ActiveWire {
    /// Start a wire at `start`; the preview initially sits on the anchor.
    pub fn begin(start: WirePoint, color: Option<String>) -> Self {
        Self {
            id: new_id(),
            points: vec![start.clone(), start],
            committed: 1,
            color,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn points(&self) -> &[WirePoint] {
        &self.points
    }

    /// The first point of the wire.
    pub fn anchor(&self) -> &WirePoint {
        &self.points[0]
    }

    /// The last committed vertex, from which the preview is routed.
    pub fn last_committed(&self) -> &WirePoint {
        &self.points[self.committed - 1]
    }

    /// The current preview end point.
    pub fn tail(&self) -> &WirePoint {
        &self.points[self.points.len() - 1]
    }

    /// Rebuild the preview tail toward `to`.
    ///
    /// Free targets are grid-snapped when `grid` is set; bound targets keep
    /// their terminal coordinates.
    pub fn extend(&mut self, to: WirePoint, style: WireStyle, grid: Option<f64>) {
        let end = snap_free(to, grid);
        self.points.truncate(self.committed);
        if style == WireStyle::Elbow {
            let from = self.last_committed().cached();
            let target = end.cached();
            let dx = (target.x - from.x).abs();
            let dy = (target.y - from.y).abs();
            let corner = if dx < dy {
                Point::new(target.x, from.y)
            } else {
                Point::new(from.x, target.y)
            };
            // a straight run needs no corner
            if !corner.approx_eq(from, 1e-9) && !corner.approx_eq(target, 1e-9) {
                self.points.push(WirePoint::free(corner));
            }
        }
        self.points.push(end);
    }

    /// Commit the route to `at` and start a fresh preview from it.
    pub fn add_vertex(&mut self, at: WirePoint, style: WireStyle, grid: Option<f64>) {
        self.extend(at, style, grid);
        self.committed = self.points.len();
        let preview = self.tail().clone();
        self.points.push(preview);
    }

    /// Drop the most recently committed vertex, keeping the preview.
    ///
    /// Returns `false` when only the anchor and preview remain.
    pub fn pop_vertex(&mut self) -> bool {
        if self.points.len() <= 2 || self.committed <= 1 {
            return false;
        }
        self.points.remove(self.committed - 1);
        self.committed -= 1;
        true
    }

    /// Drop a preview tail that still sits on the last committed vertex.
    pub fn trim_idle_preview(&mut self) {
        if self.points.len() > 2 && self.tail().cached().approx_eq(self.last_committed().cached(), 1e-9) {
            self.points.pop();
            self.committed = self.points.len() - 1;
        }
    }

    /// Convert into committed wires.
    ///
    /// Two points commit as a single wire keeping this wire's id; more points
    /// explode into one two-point wire per segment, `{id}-segment-{i}`.
    pub fn finish(self) -> Vec<Wire> {
        if self.points.len() < 2 {
            return Vec::new();
        }
        let template = Wire::new(Vec::new(), self.color);
        if self.points.len() == 2 {
            return vec![template.restyled(self.id, self.points)];
        }
        self.points
            .windows(2)
            .enumerate()
            .map(|(i, pair)| template.restyled(format!("{}-segment-{i}", self.id), pair.to_vec()))
            .collect()
    }
}

fn snap_free(p: WirePoint, grid: Option<f64>) -> WirePoint {
    match grid {
        Some(size) if p.binding.is_free() => WirePoint::free(snap_point_to_grid(p.cached(), size)),
        _ => p,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Binding;

    fn free(x: f64, y: f64) -> WirePoint {
        WirePoint::free(Point::new(x, y))
    }

    fn coords(points: &[WirePoint]) -> Vec<(f64, f64)> {
        points.iter().map(|p| (p.x, p.y)).collect()
    }

    #[test]
    fn test_begin_duplicates_start() {
        let w = ActiveWire::begin(free(1.0, 2.0), None);
        assert_eq!(coords(w.points()), vec![(1.0, 2.0), (1.0, 2.0)]);
    }

    #[test]
    fn test_straight_extend_replaces_tail() {
        let mut w = ActiveWire::begin(free(0.0, 0.0), None);
        w.extend(free(33.0, 47.0), WireStyle::Straight, None);
        w.extend(free(63.0, 17.0), WireStyle::Straight, Some(10.0));
        assert_eq!(coords(w.points()), vec![(0.0, 0.0), (60.0, 20.0)]);
    }

    #[test]
    fn test_elbow_bends_along_shorter_axis_first() {
        let mut w = ActiveWire::begin(free(0.0, 0.0), None);
        // dx < dy: corner at (end.x, anchor.y)
        w.extend(free(30.0, 100.0), WireStyle::Elbow, None);
        assert_eq!(coords(w.points()), vec![(0.0, 0.0), (30.0, 0.0), (30.0, 100.0)]);
        // dx >= dy: corner at (anchor.x, end.y)
        w.extend(free(100.0, 30.0), WireStyle::Elbow, None);
        assert_eq!(coords(w.points()), vec![(0.0, 0.0), (0.0, 30.0), (100.0, 30.0)]);
    }

    #[test]
    fn test_elbow_straight_run_has_no_corner() {
        let start = WirePoint::terminal(Point::new(124.0, 100.0), "a", "right");
        let end = WirePoint::terminal(Point::new(276.0, 100.0), "b", "left");
        let mut w = ActiveWire::begin(start, None);
        w.extend(end.clone(), WireStyle::Elbow, Some(10.0));
        assert_eq!(w.points().len(), 2);
        assert_eq!(w.tail(), &end);
    }

    #[test]
    fn test_polyline_vertices_and_pop() {
        let mut w = ActiveWire::begin(free(0.0, 0.0), None);
        w.add_vertex(free(100.0, 0.0), WireStyle::Polyline, None);
        w.extend(free(100.0, 80.0), WireStyle::Polyline, None);
        assert_eq!(coords(w.points()), vec![(0.0, 0.0), (100.0, 0.0), (100.0, 80.0)]);
        assert!(w.pop_vertex());
        assert_eq!(coords(w.points()), vec![(0.0, 0.0), (100.0, 80.0)]);
        assert!(!w.pop_vertex());
        assert_eq!(w.points().len(), 2);
    }

    #[test]
    fn test_finish_two_points_keeps_id() {
        let mut w = ActiveWire::begin(free(0.0, 0.0), Some("#334155".into()));
        w.extend(free(50.0, 0.0), WireStyle::Straight, None);
        let id = w.id().to_string();
        let wires = w.finish();
        assert_eq!(wires.len(), 1);
        assert_eq!(wires[0].id, id);
        assert_eq!(wires[0].color.as_deref(), Some("#334155"));
    }

    #[test]
    fn test_finish_explodes_polyline() {
        let mut w = ActiveWire::begin(WirePoint::node(Point::new(0.0, 0.0), "n0"), Some("red".into()));
        for (x, y) in [(10.0, 0.0), (10.0, 10.0), (20.0, 10.0)] {
            w.add_vertex(free(x, y), WireStyle::Polyline, None);
        }
        w.extend(free(20.0, 30.0), WireStyle::Polyline, None);
        let id = w.id().to_string();
        let original: Vec<_> = w.points().to_vec();
        let wires = w.finish();
        assert_eq!(wires.len(), original.len() - 1);
        for (i, wire) in wires.iter().enumerate() {
            assert_eq!(wire.id, format!("{id}-segment-{i}"));
            assert_eq!(wire.points, original[i..i + 2].to_vec());
            assert_eq!(wire.color.as_deref(), Some("red"));
        }
        assert_eq!(wires[0].points[0].binding, Binding::Node("n0".into()));
    }
}
