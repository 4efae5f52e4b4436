//! Graph mutations on a [`Schematic`].
//!
//! These functions mutate the document directly and never touch history;
//! [`super::EditorState`] records one snapshot around each call that
//! commits. Operations whose failure mode is a silent no-op report it
//! through their return value.

use tracing::{debug, info};

use crate::geometry::{Point, closest_point_on_segment, normalize_degrees};
use crate::model::{
    Binding, ConnectionNode, LineStyle, Schematic, SignalType, Wire, WireBundle, WirePoint, new_id,
};
use crate::resolve::{resolve_point, resolve_terminals, resolve_wire};

/// Half-size of the square hit box around a component or text anchor.
pub const ENTITY_HIT_HALF_SIZE: f64 = 20.0;

// ────────────────────────────────────────────────────────────────────────────
// Hit testing
// ────────────────────────────────────────────────────────────────────────────

/// The nearest point on a committed wire.
#[derive(Debug, Clone, PartialEq)]
pub struct WireHit {
    pub wire_id: String,
    /// Index of the segment `points[i]..points[i + 1]` that was hit.
    pub segment_index: usize,
    pub point: Point,
    pub distance: f64,
}

/// Nearest point on any wire strictly within `threshold`.
///
/// Segments are measured between resolved endpoints; zero-length segments
/// are skipped.
pub fn find_wire_hit(doc: &Schematic, p: Point, threshold: f64) -> Option<WireHit> {
    let mut best: Option<WireHit> = None;
    for wire in doc.wires.values() {
        let points = resolve_wire(wire, doc);
        for (i, pair) in points.windows(2).enumerate() {
            let Some((q, d)) = closest_point_on_segment(pair[0], pair[1], p) else {
                continue;
            };
            let limit = best.as_ref().map_or(threshold, |b| b.distance);
            if d < limit {
                best = Some(WireHit {
                    wire_id: wire.id.clone(),
                    segment_index: i,
                    point: q,
                    distance: d,
                });
            }
        }
    }
    best
}

/// First wire (in document order) passing strictly within `threshold`.
pub fn wire_at(doc: &Schematic, p: Point, threshold: f64) -> Option<String> {
    doc.wires
        .values()
        .find(|wire| {
            resolve_wire(wire, doc)
                .windows(2)
                .filter_map(|pair| closest_point_on_segment(pair[0], pair[1], p))
                .any(|(_, d)| d < threshold)
        })
        .map(|w| w.id.clone())
}

/// Nearest manual node strictly within `threshold`.
pub fn node_at(doc: &Schematic, p: Point, threshold: f64) -> Option<String> {
    let mut best = None;
    let mut best_distance = threshold;
    for node in doc.nodes.values() {
        let d = node.position().distance(p);
        if d < best_distance {
            best_distance = d;
            best = Some(node.id.clone());
        }
    }
    best
}

fn in_hit_box(anchor: Point, p: Point) -> bool {
    (p.x - anchor.x).abs() < ENTITY_HIT_HALF_SIZE && (p.y - anchor.y).abs() < ENTITY_HIT_HALF_SIZE
}

/// First component whose hit box contains `p`.
pub fn component_at(doc: &Schematic, p: Point) -> Option<String> {
    doc.components
        .values()
        .find(|c| in_hit_box(c.position(), p))
        .map(|c| c.id.clone())
}

/// First text element whose hit box contains `p`.
pub fn text_at(doc: &Schematic, p: Point) -> Option<String> {
    doc.texts
        .values()
        .find(|t| in_hit_box(t.position(), p))
        .map(|t| t.id.clone())
}

// ────────────────────────────────────────────────────────────────────────────
// Subdivision
// ────────────────────────────────────────────────────────────────────────────

/// Outcome of a successful [`subdivide_wire`].
#[derive(Debug, Clone, PartialEq)]
pub struct Subdivision {
    /// The junction node created, if no component was inserted.
    pub node_id: Option<String>,
    /// Replacement wires, start side first.
    pub wire_ids: [String; 2],
}

/// Split a wire at `at` on segment `segment_index`.
///
/// With `component_id`, the component is rotated to follow the segment
/// direction and the wire is reconnected through its two terminals nearest
/// to `at`. Without it, a junction node is created at `at`. Returns `None`
/// and leaves the document untouched when the wire or segment does not
/// exist, or when the component is missing or has fewer than two terminals.
pub fn subdivide_wire(
    doc: &mut Schematic,
    wire_id: &str,
    segment_index: usize,
    at: Point,
    component_id: Option<&str>,
) -> Option<Subdivision> {
    let wire = doc.wires.get(wire_id)?;
    if segment_index + 1 >= wire.points.len() {
        debug!(wire = wire_id, segment_index, "subdivision segment out of range");
        return None;
    }
    let before = wire.points[..=segment_index].to_vec();
    let after = wire.points[segment_index + 1..].to_vec();

    let (first, second, node_id) = match component_id {
        Some(cid) => {
            let component = doc.components.get(cid)?;
            if component.kind.terminals().len() < 2 {
                debug!(component = cid, "inserted component has fewer than two terminals");
                return None;
            }
            let seg_start = resolve_point(&wire.points[segment_index], doc);
            let seg_end = resolve_point(&wire.points[segment_index + 1], doc);
            let wire_start = resolve_point(&wire.points[0], doc);
            let vertical = (seg_end.y - seg_start.y).abs() > (seg_end.x - seg_start.x).abs();

            let mut rotated = component.clone();
            rotated.rotation = if vertical { 90.0 } else { 0.0 };
            let mut terminals = resolve_terminals(&rotated);
            terminals.sort_by(|a, b| a.position.distance(at).total_cmp(&b.position.distance(at)));
            let (mut near_start, mut near_end) = (&terminals[0], &terminals[1]);
            if near_end.position.distance(wire_start) < near_start.position.distance(wire_start) {
                std::mem::swap(&mut near_start, &mut near_end);
            }

            let mut first_points = before;
            first_points.push(WirePoint::terminal(near_start.position, cid, near_start.terminal_id));
            let mut second_points = vec![WirePoint::terminal(near_end.position, cid, near_end.terminal_id)];
            second_points.extend(after);

            let first = wire.restyled(new_id(), first_points);
            let second = wire.restyled(new_id(), second_points);
            let rotation = rotated.rotation;
            if let Some(c) = doc.components.get_mut(cid) {
                c.rotation = rotation;
            }
            (first, second, None)
        }
        None => {
            let node = ConnectionNode::new(at.x, at.y);
            let mut first_points = before;
            first_points.push(WirePoint::node(at, &node.id));
            let mut second_points = vec![WirePoint::node(at, &node.id)];
            second_points.extend(after);

            let first = wire.restyled(wire.id.clone(), first_points);
            let second = wire.restyled(new_id(), second_points);
            let node_id = doc.add_node(node);
            (first, second, Some(node_id))
        }
    };

    doc.wires.shift_remove(wire_id);
    let wire_ids = [first.id.clone(), second.id.clone()];
    if let Some(bundle_id) = &first.bundle_id {
        if let Some(bundle) = doc.bundles.get_mut(bundle_id) {
            bundle.wire_ids.retain(|id| id != wire_id);
            bundle.wire_ids.extend(wire_ids.iter().cloned());
        }
    }
    doc.add_wire(first);
    doc.add_wire(second);
    info!(
        wire = wire_id,
        segment_index,
        junction = ?node_id,
        component = ?component_id,
        "subdivided wire"
    );
    Some(Subdivision { node_id, wire_ids })
}

// ────────────────────────────────────────────────────────────────────────────
// Nodes, points and deletion cascades
// ────────────────────────────────────────────────────────────────────────────

/// Move a manual node and refresh the cached coordinates of every point
/// bound to it. Returns `false` for an unknown node.
pub fn move_node(doc: &mut Schematic, node_id: &str, to: Point) -> bool {
    let Some(node) = doc.nodes.get_mut(node_id) else {
        debug!(node = node_id, "move of unknown node ignored");
        return false;
    };
    node.x = to.x;
    node.y = to.y;
    for wire in doc.wires.values_mut() {
        for point in &mut wire.points {
            if point.binding.references_node(node_id) {
                point.set_cached(to);
            }
        }
    }
    true
}

/// Drag a single wire vertex. Only free points move; bound points follow
/// their terminal or node. Returns `false` if nothing changed.
pub fn move_wire_point(doc: &mut Schematic, wire_id: &str, index: usize, to: Point) -> bool {
    let Some(point) = doc.wires.get_mut(wire_id).and_then(|w| w.points.get_mut(index)) else {
        return false;
    };
    if !point.binding.is_free() {
        debug!(wire = wire_id, index, "bound wire point cannot be dragged");
        return false;
    }
    point.set_cached(to);
    true
}

/// Remove matching wires, then any manual node they connected that no
/// remaining wire touches.
fn remove_wires_where(doc: &mut Schematic, doomed: impl Fn(&Wire) -> bool) -> Vec<String> {
    let mut removed = Vec::new();
    let mut endpoints = Vec::new();
    for w in doc.wires.values().filter(|w| doomed(*w)) {
        removed.push(w.id.clone());
        endpoints.extend(w.points.iter().filter_map(|p| match &p.binding {
            Binding::Node(id) => Some(id.clone()),
            _ => None,
        }));
    }
    for id in &removed {
        doc.wires.shift_remove(id);
    }
    doc.prune_bundles();

    endpoints.sort();
    endpoints.dedup();
    let orphans: Vec<String> = endpoints
        .into_iter()
        .filter(|n| doc.nodes.contains_key(n) && !doc.wires.values().any(|w| w.touches_node(n)))
        .collect();
    for id in &orphans {
        doc.nodes.shift_remove(id);
    }
    if !orphans.is_empty() {
        debug!(nodes = ?orphans, "removed nodes left without wires");
    }
    removed
}

/// Delete manual nodes and every wire touching any of them.
///
/// Returns the ids of the cascaded wires.
pub fn delete_nodes(doc: &mut Schematic, ids: &[String]) -> Vec<String> {
    for id in ids {
        doc.nodes.shift_remove(id);
    }
    let removed = remove_wires_where(doc, |w| ids.iter().any(|id| w.touches_node(id)));
    info!(nodes = ids.len(), wires = removed.len(), "deleted nodes");
    removed
}

/// Delete components and every wire bound to any of their terminals.
///
/// Returns the ids of the cascaded wires.
pub fn delete_components(doc: &mut Schematic, ids: &[String]) -> Vec<String> {
    for id in ids {
        doc.components.shift_remove(id);
    }
    let removed = remove_wires_where(doc, |w| ids.iter().any(|id| w.touches_component(id)));
    info!(components = ids.len(), wires = removed.len(), "deleted components");
    removed
}

/// Delete wires; returns how many existed.
pub fn delete_wires(doc: &mut Schematic, ids: &[String]) -> usize {
    let removed = remove_wires_where(doc, |w| ids.contains(&w.id));
    removed.len()
}

/// Delete text elements; returns how many existed.
pub fn delete_texts(doc: &mut Schematic, ids: &[String]) -> usize {
    ids.iter().filter(|id| doc.texts.shift_remove(*id).is_some()).count()
}

/// Re-route wires as a Manhattan "Z": `start, (midX, start.y), (midX, end.y), end`.
///
/// Endpoints keep their bindings. Returns the number of wires routed.
pub fn auto_route(doc: &mut Schematic, wire_ids: &[String]) -> usize {
    let mut routed = 0;
    for id in wire_ids {
        let Some(wire) = doc.wires.get(id) else {
            continue;
        };
        let (Some(first), Some(last)) = (wire.points.first(), wire.points.last()) else {
            continue;
        };
        if wire.points.len() < 2 {
            continue;
        }
        let start = resolve_point(first, doc);
        let end = resolve_point(last, doc);
        let mid_x = (start.x + end.x) / 2.0;
        let points = vec![
            first.clone(),
            WirePoint::free(Point::new(mid_x, start.y)),
            WirePoint::free(Point::new(mid_x, end.y)),
            last.clone(),
        ];
        if let Some(wire) = doc.wires.get_mut(id) {
            wire.points = points;
            routed += 1;
        }
    }
    debug!(routed, "auto-routed wires");
    routed
}

// ────────────────────────────────────────────────────────────────────────────
// Wire properties and bundles
// ────────────────────────────────────────────────────────────────────────────

fn edit_wire(doc: &mut Schematic, id: &str, f: impl FnOnce(&mut Wire)) -> bool {
    match doc.wires.get_mut(id) {
        Some(wire) => {
            f(wire);
            true
        }
        None => false,
    }
}

pub fn set_wire_label(doc: &mut Schematic, id: &str, label: &str) -> bool {
    edit_wire(doc, id, |w| w.label = Some(label.to_string()))
}

/// Set the signal type; the wire takes the type's colour.
pub fn set_wire_signal_type(doc: &mut Schematic, id: &str, signal: SignalType) -> bool {
    edit_wire(doc, id, |w| {
        w.signal_type = Some(signal);
        w.color = Some(signal.color().to_string());
    })
}

pub fn set_wire_thickness(doc: &mut Schematic, id: &str, thickness: f64) -> bool {
    edit_wire(doc, id, |w| w.thickness = Some(thickness))
}

pub fn set_wire_line_style(doc: &mut Schematic, id: &str, style: LineStyle) -> bool {
    edit_wire(doc, id, |w| w.style = Some(style))
}

pub fn set_wire_color(doc: &mut Schematic, id: &str, color: &str) -> bool {
    edit_wire(doc, id, |w| w.color = Some(color.to_string()))
}

/// Group wires into a new bundle and recolour them. Returns the bundle id.
pub fn create_bundle(doc: &mut Schematic, name: &str, color: &str, wire_ids: &[String]) -> String {
    let id = new_id();
    let members: Vec<String> = wire_ids
        .iter()
        .filter(|w| doc.wires.contains_key(*w))
        .cloned()
        .collect();
    for wid in &members {
        detach_from_bundle(doc, wid);
        if let Some(wire) = doc.wires.get_mut(wid) {
            wire.bundle_id = Some(id.clone());
            wire.color = Some(color.to_string());
        }
    }
    doc.bundles.insert(
        id.clone(),
        WireBundle {
            id: id.clone(),
            name: name.to_string(),
            color: color.to_string(),
            layer: 0,
            wire_ids: members,
            label: Some(name.to_string()),
        },
    );
    info!(bundle = %id, name, "created wire bundle");
    id
}

pub fn add_wire_to_bundle(doc: &mut Schematic, bundle_id: &str, wire_id: &str) -> bool {
    if !doc.bundles.contains_key(bundle_id) || !doc.wires.contains_key(wire_id) {
        return false;
    }
    detach_from_bundle(doc, wire_id);
    let Some(bundle) = doc.bundles.get_mut(bundle_id) else {
        return false;
    };
    bundle.wire_ids.push(wire_id.to_string());
    let color = bundle.color.clone();
    edit_wire(doc, wire_id, |w| {
        w.bundle_id = Some(bundle_id.to_string());
        w.color = Some(color);
    })
}

pub fn remove_wire_from_bundle(doc: &mut Schematic, bundle_id: &str, wire_id: &str) -> bool {
    let Some(bundle) = doc.bundles.get_mut(bundle_id) else {
        return false;
    };
    let before = bundle.wire_ids.len();
    bundle.wire_ids.retain(|id| id != wire_id);
    let removed = bundle.wire_ids.len() != before;
    if let Some(wire) = doc.wires.get_mut(wire_id) {
        if wire.bundle_id.as_deref() == Some(bundle_id) {
            wire.bundle_id = None;
        }
    }
    removed
}

/// Delete a bundle; member wires stay, unbundled.
pub fn delete_bundle(doc: &mut Schematic, bundle_id: &str) -> bool {
    if doc.bundles.shift_remove(bundle_id).is_none() {
        return false;
    }
    for wire in doc.wires.values_mut() {
        if wire.bundle_id.as_deref() == Some(bundle_id) {
            wire.bundle_id = None;
        }
    }
    true
}

fn detach_from_bundle(doc: &mut Schematic, wire_id: &str) {
    let Some(previous) = doc.wires.get(wire_id).and_then(|w| w.bundle_id.clone()) else {
        return;
    };
    if let Some(bundle) = doc.bundles.get_mut(&previous) {
        bundle.wire_ids.retain(|id| id != wire_id);
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Component and text transforms
// ────────────────────────────────────────────────────────────────────────────

pub const MIN_SCALE: f64 = 0.5;
pub const MAX_SCALE: f64 = 3.0;

/// Rotate components by `delta` degrees, keeping rotation in `[0, 360)`.
pub fn rotate_components(doc: &mut Schematic, ids: &[String], delta: f64) -> usize {
    let mut n = 0;
    for id in ids {
        if let Some(c) = doc.components.get_mut(id) {
            c.rotation = normalize_degrees((c.rotation + delta).round());
            n += 1;
        }
    }
    n
}

/// Translate components, then grid-snap them when `grid` is set.
pub fn translate_components(doc: &mut Schematic, ids: &[String], dx: f64, dy: f64, grid: Option<f64>) -> usize {
    let mut n = 0;
    for id in ids {
        if let Some(c) = doc.components.get_mut(id) {
            let mut p = c.position().offset(dx, dy);
            if let Some(size) = grid {
                p = crate::snap::snap_point_to_grid(p, size);
            }
            c.x = p.x;
            c.y = p.y;
            n += 1;
        }
    }
    n
}

/// Clamp a scale factor into the supported range.
pub fn clamp_scale(scale: f64) -> f64 {
    scale.clamp(MIN_SCALE, MAX_SCALE)
}

/// A terminal binding moved onto the copy of its component, if that
/// component was copied too. `component_ids` maps old ids to new ones.
pub(crate) fn remap_binding(binding: &Binding, component_ids: &[(String, String)]) -> Option<Binding> {
    match binding {
        Binding::Terminal {
            component_id,
            terminal_id,
        } => component_ids
            .iter()
            .find(|(old, _)| old == component_id)
            .map(|(_, new)| Binding::Terminal {
                component_id: new.clone(),
                terminal_id: terminal_id.clone(),
            }),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Component;
    use crate::terminals::ComponentType;

    fn free(x: f64, y: f64) -> WirePoint {
        WirePoint::free(Point::new(x, y))
    }

    fn doc_with_wire(points: Vec<WirePoint>) -> (Schematic, String) {
        let mut doc = Schematic::new();
        let id = doc.add_wire(Wire::new(points, Some("#334155".into())));
        (doc, id)
    }

    #[test]
    fn test_find_wire_hit_picks_nearest_segment() {
        let (doc, id) = doc_with_wire(vec![free(0.0, 0.0), free(100.0, 0.0), free(100.0, 100.0)]);
        let hit = find_wire_hit(&doc, Point::new(95.0, 60.0), 20.0).unwrap();
        assert_eq!(hit.wire_id, id);
        assert_eq!(hit.segment_index, 1);
        assert!(hit.point.approx_eq(Point::new(100.0, 60.0), 1e-9));
        assert!(find_wire_hit(&doc, Point::new(50.0, 50.0), 20.0).is_none());
    }

    #[test]
    fn test_junction_subdivision() {
        let (mut doc, id) = doc_with_wire(vec![free(0.0, 0.0), free(100.0, 0.0)]);
        let split = subdivide_wire(&mut doc, &id, 0, Point::new(40.0, 0.0), None).unwrap();
        let node = split.node_id.unwrap();
        assert_eq!(doc.nodes[&node].position(), Point::new(40.0, 0.0));
        assert_eq!(split.wire_ids[0], id);
        let first = &doc.wires[&split.wire_ids[0]];
        let second = &doc.wires[&split.wire_ids[1]];
        assert_eq!(first.points.last().unwrap().binding, Binding::Node(node.clone()));
        assert_eq!(second.points[0].binding, Binding::Node(node));
        assert_eq!(second.color.as_deref(), Some("#334155"));
    }

    #[test]
    fn test_subdivision_out_of_range_is_noop() {
        let (mut doc, id) = doc_with_wire(vec![free(0.0, 0.0), free(100.0, 0.0)]);
        let before = doc.clone();
        assert!(subdivide_wire(&mut doc, &id, 1, Point::new(40.0, 0.0), None).is_none());
        assert!(subdivide_wire(&mut doc, "missing", 0, Point::new(40.0, 0.0), None).is_none());
        assert_eq!(doc, before);
    }

    #[test]
    fn test_subdivision_with_single_terminal_component_is_noop() {
        let (mut doc, id) = doc_with_wire(vec![free(0.0, 0.0), free(100.0, 0.0)]);
        let g = doc.add_component(Component::new(ComponentType::Ground, 50.0, 0.0));
        let before = doc.clone();
        assert!(subdivide_wire(&mut doc, &id, 0, Point::new(50.0, 0.0), Some(&g)).is_none());
        assert_eq!(doc, before);
    }

    #[test]
    fn test_component_subdivision_on_vertical_segment() {
        let (mut doc, id) = doc_with_wire(vec![free(0.0, 0.0), free(0.0, 200.0)]);
        let r = doc.add_component(Component::new(ComponentType::Resistor, 0.0, 100.0));
        let split = subdivide_wire(&mut doc, &id, 0, Point::new(0.0, 100.0), Some(&r)).unwrap();
        assert!(split.node_id.is_none());
        assert_eq!(doc.components[&r].rotation, 90.0);
        let first = &doc.wires[&split.wire_ids[0]];
        let second = &doc.wires[&split.wire_ids[1]];
        // rotated 90°: left terminal sits above, right below
        assert_eq!(
            first.points[1].binding,
            Binding::Terminal {
                component_id: r.clone(),
                terminal_id: "left".into()
            }
        );
        assert!(resolve_point(&first.points[1], &doc).approx_eq(Point::new(0.0, 76.0), 1e-9));
        assert!(resolve_point(&second.points[0], &doc).approx_eq(Point::new(0.0, 124.0), 1e-9));
        assert!(!doc.wires.contains_key(&id));
    }

    #[test]
    fn test_move_node_updates_bound_points_only() {
        let mut doc = Schematic::new();
        let n = doc.add_node(ConnectionNode::new(10.0, 10.0));
        let w = doc.add_wire(Wire::new(
            vec![WirePoint::node(Point::new(10.0, 10.0), &n), free(10.0, 10.0)],
            None,
        ));
        assert!(move_node(&mut doc, &n, Point::new(30.0, 40.0)));
        let points = &doc.wires[&w].points;
        assert_eq!(points[0].cached(), Point::new(30.0, 40.0));
        // a coincident free point is not rebound
        assert_eq!(points[1].cached(), Point::new(10.0, 10.0));
        assert!(!move_node(&mut doc, "nope", Point::new(0.0, 0.0)));
    }

    #[test]
    fn test_delete_node_cascades_to_touching_wires() {
        let mut doc = Schematic::new();
        let n = doc.add_node(ConnectionNode::new(0.0, 0.0));
        let touching = doc.add_wire(Wire::new(
            vec![WirePoint::node(Point::new(0.0, 0.0), &n), free(50.0, 0.0), free(50.0, 50.0)],
            None,
        ));
        let other = doc.add_wire(Wire::new(vec![free(0.0, 10.0), free(50.0, 10.0)], None));
        let removed = delete_nodes(&mut doc, &[n.clone()]);
        assert_eq!(removed, vec![touching]);
        assert!(doc.wires.contains_key(&other));
        assert!(doc.nodes.is_empty());
    }

    #[test]
    fn test_removing_last_wire_drops_its_node() {
        let mut doc = Schematic::new();
        let n = doc.add_node(ConnectionNode::new(50.0, 0.0));
        let m = doc.add_node(ConnectionNode::new(50.0, 50.0));
        let standalone = doc.add_node(ConnectionNode::new(200.0, 200.0));
        let a = doc.add_wire(Wire::new(vec![free(0.0, 0.0), WirePoint::node(Point::new(50.0, 0.0), &n)], None));
        let b = doc.add_wire(Wire::new(
            vec![WirePoint::node(Point::new(50.0, 0.0), &n), WirePoint::node(Point::new(50.0, 50.0), &m)],
            None,
        ));

        assert_eq!(delete_wires(&mut doc, &[a]), 1);
        assert!(doc.nodes.contains_key(&n));

        assert_eq!(delete_wires(&mut doc, &[b]), 1);
        assert!(!doc.nodes.contains_key(&n));
        assert!(!doc.nodes.contains_key(&m));
        // never wired, so never cascaded
        assert!(doc.nodes.contains_key(&standalone));
    }

    #[test]
    fn test_move_wire_point_free_only() {
        let mut doc = Schematic::new();
        let c = doc.add_component(Component::new(ComponentType::Resistor, 0.0, 0.0));
        let w = doc.add_wire(Wire::new(
            vec![WirePoint::terminal(Point::new(24.0, 0.0), &c, "right"), free(80.0, 0.0)],
            None,
        ));
        assert!(!move_wire_point(&mut doc, &w, 0, Point::new(1.0, 1.0)));
        assert!(move_wire_point(&mut doc, &w, 1, Point::new(90.0, 10.0)));
        assert_eq!(doc.wires[&w].points[1].cached(), Point::new(90.0, 10.0));
        assert!(!move_wire_point(&mut doc, &w, 5, Point::new(1.0, 1.0)));
    }

    #[test]
    fn test_auto_route() {
        let (mut doc, id) = doc_with_wire(vec![free(0.0, 0.0), free(100.0, 60.0)]);
        assert_eq!(auto_route(&mut doc, &[id.clone()]), 1);
        let pts: Vec<_> = doc.wires[&id].points.iter().map(|p| p.cached()).collect();
        assert_eq!(
            pts,
            vec![
                Point::new(0.0, 0.0),
                Point::new(50.0, 0.0),
                Point::new(50.0, 60.0),
                Point::new(100.0, 60.0)
            ]
        );
    }

    #[test]
    fn test_signal_type_sets_color() {
        let (mut doc, id) = doc_with_wire(vec![free(0.0, 0.0), free(1.0, 0.0)]);
        assert!(set_wire_signal_type(&mut doc, &id, SignalType::Clock));
        assert_eq!(doc.wires[&id].color.as_deref(), Some("#8b5cf6"));
        assert!(!set_wire_label(&mut doc, "missing", "x"));
    }

    #[test]
    fn test_bundle_lifecycle() {
        let (mut doc, a) = doc_with_wire(vec![free(0.0, 0.0), free(1.0, 0.0)]);
        let b = doc.add_wire(Wire::new(vec![free(0.0, 5.0), free(1.0, 5.0)], None));
        let bundle = create_bundle(&mut doc, "bus", "#123456", &[a.clone()]);
        assert_eq!(doc.wires[&a].color.as_deref(), Some("#123456"));
        assert!(add_wire_to_bundle(&mut doc, &bundle, &b));
        assert_eq!(doc.bundles[&bundle].wire_ids, vec![a.clone(), b.clone()]);
        assert!(remove_wire_from_bundle(&mut doc, &bundle, &a));
        assert_eq!(doc.wires[&a].bundle_id, None);
        delete_wires(&mut doc, &[b.clone()]);
        assert!(doc.bundles[&bundle].wire_ids.is_empty());
        assert!(delete_bundle(&mut doc, &bundle));
        assert!(!delete_bundle(&mut doc, &bundle));
    }

    #[test]
    fn test_hit_boxes() {
        let mut doc = Schematic::new();
        let c = doc.add_component(Component::new(ComponentType::Resistor, 100.0, 100.0));
        assert_eq!(component_at(&doc, Point::new(119.0, 81.0)), Some(c));
        assert_eq!(component_at(&doc, Point::new(120.0, 100.0)), None);
        assert_eq!(text_at(&doc, Point::new(100.0, 100.0)), None);
    }
}
