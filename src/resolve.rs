//! Terminal resolver.
//!
//! Computes absolute terminal positions from a component's transform and
//! resolves bound wire points to live coordinates. Nothing here caches: every
//! call recomputes from the current document, so a moved, rotated or scaled
//! component is reflected immediately.

use tracing::warn;

use crate::geometry::Point;
use crate::model::{Binding, Component, Schematic, Wire, WirePoint};

/// Base hit radius in screen pixels.
pub const HIT_RADIUS: f64 = 20.0;
/// Minimum hit radius in canvas pixels.
pub const MIN_HIT_RADIUS: f64 = 10.0;

/// A terminal with its absolute canvas position.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedTerminal {
    pub component_id: String,
    pub terminal_id: &'static str,
    pub position: Point,
}

impl ResolvedTerminal {
    /// Node-style id, `"{componentId}-{terminalId}"`.
    pub fn node_id(&self) -> String {
        format!("{}-{}", self.component_id, self.terminal_id)
    }
}

/// Resolve every terminal of a component: scale, rotate, then translate.
pub fn resolve_terminals(component: &Component) -> Vec<ResolvedTerminal> {
    component
        .kind
        .terminals()
        .iter()
        .map(|t| ResolvedTerminal {
            component_id: component.id.clone(),
            terminal_id: t.id,
            position: transform(component, Point::new(t.x, t.y)),
        })
        .collect()
}

/// Absolute position of one terminal, if the component type has it.
pub fn terminal_position(component: &Component, terminal_id: &str) -> Option<Point> {
    let offset = component.kind.terminal(terminal_id)?;
    Some(transform(component, Point::new(offset.x, offset.y)))
}

fn transform(component: &Component, local: Point) -> Point {
    let scaled = Point::new(local.x * component.scale, local.y * component.scale);
    let r = scaled.rotated(component.rotation);
    Point::new(component.x + r.x, component.y + r.y)
}

/// Live position of a bound point, or `None` if its target is gone.
pub fn try_resolve_point(point: &WirePoint, doc: &Schematic) -> Option<Point> {
    match &point.binding {
        Binding::Free => Some(point.cached()),
        Binding::Terminal {
            component_id,
            terminal_id,
        } => doc
            .components
            .get(component_id)
            .and_then(|c| terminal_position(c, terminal_id)),
        Binding::Node(id) => doc.nodes.get(id).map(|n| n.position()),
    }
}

/// Live position of a wire point.
///
/// A dangling binding is a model invariant violation: it fails loudly in
/// debug builds and falls back to the cached coordinates otherwise.
pub fn resolve_point(point: &WirePoint, doc: &Schematic) -> Point {
    match try_resolve_point(point, doc) {
        Some(p) => p,
        None => {
            warn!(binding = ?point.binding, "wire point references a missing entity");
            debug_assert!(false, "dangling wire point binding: {:?}", point.binding);
            point.cached()
        }
    }
}

/// Resolve every point of a wire.
pub fn resolve_wire(wire: &Wire, doc: &Schematic) -> Vec<Point> {
    wire.points.iter().map(|p| resolve_point(p, doc)).collect()
}

/// Hit radius in canvas units for the current zoom factor.
pub fn hit_threshold(zoom: f64) -> f64 {
    MIN_HIT_RADIUS.max(HIT_RADIUS / zoom.max(0.001))
}

// ────────────────────────────────────────────────────────────────────────────
// Snap targets
// ────────────────────────────────────────────────────────────────────────────

/// Something a wire end can attach to.
#[derive(Debug, Clone, PartialEq)]
pub struct SnapTarget {
    /// Terminal node id, manual node id, or `"{wireId}-vertex-{i}"`.
    pub id: String,
    pub position: Point,
    pub binding: Binding,
}

impl SnapTarget {
    /// A wire point attached to this target.
    pub fn to_wire_point(&self) -> WirePoint {
        WirePoint {
            x: self.position.x,
            y: self.position.y,
            binding: self.binding.clone(),
        }
    }
}

/// All attachable points in hit-test order: component terminals, then manual
/// nodes, then interior vertices of committed wires that no manual node
/// already covers.
pub fn snap_targets(doc: &Schematic) -> Vec<SnapTarget> {
    let mut targets: Vec<SnapTarget> = doc
        .components
        .values()
        .flat_map(resolve_terminals)
        .map(|t| SnapTarget {
            id: t.node_id(),
            position: t.position,
            binding: Binding::Terminal {
                component_id: t.component_id.clone(),
                terminal_id: t.terminal_id.to_string(),
            },
        })
        .collect();

    targets.extend(doc.nodes.values().map(|n| SnapTarget {
        id: n.id.clone(),
        position: n.position(),
        binding: Binding::Node(n.id.clone()),
    }));

    for wire in doc.wires.values() {
        let last = wire.points.len().saturating_sub(1);
        for (i, point) in wire.points.iter().enumerate() {
            if i == 0 || i == last {
                continue;
            }
            let Some(position) = try_resolve_point(point, doc) else {
                continue;
            };
            let covered = doc.nodes.values().any(|n| n.position().approx_eq(position, 0.05));
            if !covered {
                targets.push(SnapTarget {
                    id: format!("{}-vertex-{i}", wire.id),
                    position,
                    binding: point.binding.clone(),
                });
            }
        }
    }
    targets
}

/// Nearest target strictly within `max_distance` of `p`.
///
/// Linear scan; the first of equally near targets wins.
pub fn find_closest_terminal(targets: &[SnapTarget], p: Point, max_distance: f64) -> Option<&SnapTarget> {
    let mut best = None;
    let mut best_distance = max_distance;
    for target in targets {
        let d = target.position.distance(p);
        if d < best_distance {
            best_distance = d;
            best = Some(target);
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ConnectionNode, Wire};
    use crate::terminals::ComponentType;

    fn resistor(x: f64, y: f64, rotation: f64, scale: f64) -> Component {
        Component {
            id: "r1".into(),
            kind: ComponentType::Resistor,
            x,
            y,
            rotation,
            scale,
            color: None,
        }
    }

    #[test]
    fn test_resolve_unrotated() {
        let ts = resolve_terminals(&resistor(100.0, 100.0, 0.0, 1.0));
        assert_eq!(ts.len(), 2);
        assert_eq!(ts[0].terminal_id, "left");
        assert!(ts[0].position.approx_eq(Point::new(76.0, 100.0), 1e-9));
        assert!(ts[1].position.approx_eq(Point::new(124.0, 100.0), 1e-9));
        assert_eq!(ts[1].node_id(), "r1-right");
    }

    #[test]
    fn test_resolve_matches_closed_form() {
        let (ox, oy) = (24.0, 0.0);
        for r in (0..360).step_by(15) {
            for s in [0.5, 1.0, 1.75, 3.0] {
                let c = resistor(40.0, -10.0, r as f64, s);
                let got = terminal_position(&c, "right").unwrap();
                let rad = (r as f64).to_radians();
                let want = Point::new(
                    40.0 + s * (ox * rad.cos() - oy * rad.sin()),
                    -10.0 + s * (ox * rad.sin() + oy * rad.cos()),
                );
                assert!(got.approx_eq(want, 1e-9), "r={r} s={s}: {got:?} != {want:?}");
            }
        }
    }

    #[test]
    fn test_resolve_point_follows_component() {
        let mut doc = Schematic::new();
        doc.add_component(resistor(0.0, 0.0, 0.0, 1.0));
        let p = WirePoint::terminal(Point::new(24.0, 0.0), "r1", "right");
        doc.components.get_mut("r1").unwrap().x = 50.0;
        assert!(resolve_point(&p, &doc).approx_eq(Point::new(74.0, 0.0), 1e-9));
        doc.components.get_mut("r1").unwrap().rotation = 90.0;
        assert!(resolve_point(&p, &doc).approx_eq(Point::new(50.0, 24.0), 1e-9));
    }

    #[test]
    fn test_resolve_point_node_and_free() {
        let mut doc = Schematic::new();
        doc.add_node(ConnectionNode {
            id: "n1".into(),
            x: 7.0,
            y: 8.0,
        });
        let bound = WirePoint::node(Point::new(0.0, 0.0), "n1");
        assert_eq!(resolve_point(&bound, &doc), Point::new(7.0, 8.0));
        let free = WirePoint::free(Point::new(3.0, 4.0));
        assert_eq!(resolve_point(&free, &doc), Point::new(3.0, 4.0));
    }

    #[test]
    fn test_try_resolve_dangling() {
        let doc = Schematic::new();
        let p = WirePoint::node(Point::new(1.0, 1.0), "gone");
        assert!(try_resolve_point(&p, &doc).is_none());
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "dangling wire point binding")]
    fn test_dangling_fails_loudly_in_debug() {
        let doc = Schematic::new();
        let p = WirePoint::terminal(Point::new(1.0, 1.0), "gone", "left");
        resolve_point(&p, &doc);
    }

    #[test]
    fn test_hit_threshold_scales_with_zoom() {
        assert_eq!(hit_threshold(1.0), 20.0);
        assert_eq!(hit_threshold(0.5), 40.0);
        assert_eq!(hit_threshold(4.0), 10.0);
        assert!(hit_threshold(0.0) > 19_999.0);
    }

    #[test]
    fn test_find_closest_terminal_strict_threshold() {
        let targets = vec![
            SnapTarget {
                id: "a".into(),
                position: Point::new(0.0, 0.0),
                binding: Binding::Free,
            },
            SnapTarget {
                id: "b".into(),
                position: Point::new(10.0, 0.0),
                binding: Binding::Free,
            },
        ];
        let hit = find_closest_terminal(&targets, Point::new(8.0, 0.0), 20.0).unwrap();
        assert_eq!(hit.id, "b");
        assert!(find_closest_terminal(&targets, Point::new(30.0, 0.0), 20.0).is_none());
        // exactly on the threshold is a miss
        assert!(find_closest_terminal(&targets, Point::new(0.0, 20.0), 20.0).is_none());
    }

    #[test]
    fn test_snap_target_order() {
        let mut doc = Schematic::new();
        doc.add_component(resistor(0.0, 0.0, 0.0, 1.0));
        doc.add_node(ConnectionNode {
            id: "n1".into(),
            x: 200.0,
            y: 0.0,
        });
        let mut w = Wire::new(
            vec![
                WirePoint::free(Point::new(0.0, 100.0)),
                WirePoint::free(Point::new(50.0, 100.0)),
                WirePoint::free(Point::new(50.0, 150.0)),
            ],
            None,
        );
        w.id = "w1".into();
        doc.add_wire(w);
        let ids: Vec<_> = snap_targets(&doc).into_iter().map(|t| t.id).collect();
        assert_eq!(ids, vec!["r1-left", "r1-right", "n1", "w1-vertex-1"]);
    }
}
