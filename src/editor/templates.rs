//! Circuit templates: reusable groups of components, wires and text.
//!
//! Templates are stored with their bounding box normalized to the origin.
//! Instantiating one gives every entity a fresh id, remaps the wire bindings
//! onto the new ids and offsets everything by the drop position.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{EditorError, Result};
use crate::geometry::Point;
use crate::model::{Binding, Component, ConnectionNode, Schematic, TextElement, Wire, new_id};
use crate::terminals::ComponentType;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TemplateCategory {
    Sram,
    Logic,
    Memory,
    Custom,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CircuitTemplate {
    pub id: String,
    pub name: String,
    pub category: TemplateCategory,
    pub description: String,
    pub components: Vec<Component>,
    pub wires: Vec<Wire>,
    pub texts: Vec<TextElement>,
    #[serde(default, rename = "connectionNodes")]
    pub nodes: Vec<ConnectionNode>,
    pub width: f64,
    pub height: f64,
}

impl CircuitTemplate {
    /// Capture a whole document as a template, normalized so its bounding box
    /// starts at the origin. Fails with [`EditorError::EmptyDocument`] when there
    /// are no components.
    pub fn from_document(
        doc: &Schematic,
        name: &str,
        category: TemplateCategory,
        description: &str,
    ) -> Result<CircuitTemplate> {
        if doc.components.is_empty() {
            return Err(EditorError::EmptyDocument);
        }
        let points: Vec<Point> = doc
            .components
            .values()
            .map(Component::position)
            .chain(doc.wires.values().flat_map(|w| w.points.iter().map(|p| p.cached())))
            .chain(doc.nodes.values().map(ConnectionNode::position))
            .collect();
        let min_x = points.iter().map(|p| p.x).fold(f64::INFINITY, f64::min);
        let min_y = points.iter().map(|p| p.y).fold(f64::INFINITY, f64::min);
        let max_x = points.iter().map(|p| p.x).fold(f64::NEG_INFINITY, f64::max);
        let max_y = points.iter().map(|p| p.y).fold(f64::NEG_INFINITY, f64::max);

        let mut template = CircuitTemplate {
            id: new_id(),
            name: name.to_string(),
            category,
            description: description.to_string(),
            components: doc.components.values().cloned().collect(),
            wires: doc.wires.values().cloned().collect(),
            texts: doc.texts.values().cloned().collect(),
            nodes: doc.nodes.values().cloned().collect(),
            width: max_x - min_x,
            height: max_y - min_y,
        };
        template.translate(-min_x, -min_y);
        Ok(template)
    }

    fn translate(&mut self, dx: f64, dy: f64) {
        for c in &mut self.components {
            c.x += dx;
            c.y += dy;
        }
        for n in &mut self.nodes {
            n.x += dx;
            n.y += dy;
        }
        for t in &mut self.texts {
            t.x += dx;
            t.y += dy;
        }
        for p in self.wires.iter_mut().flat_map(|w| w.points.iter_mut()) {
            p.x += dx;
            p.y += dy;
        }
    }

    /// Add a fresh copy of this template to `doc`, offset by `at`.
    ///
    /// Bindings to entities outside the template become free points.
    /// Returns the new component ids.
    pub fn instantiate(&self, doc: &mut Schematic, at: Point) -> Vec<String> {
        let mut copy = self.clone();
        copy.translate(at.x, at.y);

        let component_ids: HashMap<String, String> =
            copy.components.iter().map(|c| (c.id.clone(), new_id())).collect();
        let node_ids: HashMap<String, String> = copy.nodes.iter().map(|n| (n.id.clone(), new_id())).collect();

        let mut added = Vec::new();
        for mut c in copy.components {
            if let Some(id) = component_ids.get(&c.id) {
                c.id = id.clone();
                added.push(doc.add_component(c));
            }
        }
        for mut n in copy.nodes {
            if let Some(id) = node_ids.get(&n.id) {
                n.id = id.clone();
                doc.add_node(n);
            }
        }
        for mut wire in copy.wires {
            wire.id = new_id();
            wire.bundle_id = None;
            for p in &mut wire.points {
                p.binding = match &p.binding {
                    Binding::Terminal {
                        component_id,
                        terminal_id,
                    } => component_ids
                        .get(component_id)
                        .map_or(Binding::Free, |id| Binding::Terminal {
                            component_id: id.clone(),
                            terminal_id: terminal_id.clone(),
                        }),
                    Binding::Node(node) => node_ids.get(node).map_or(Binding::Free, |id| Binding::Node(id.clone())),
                    Binding::Free => Binding::Free,
                };
            }
            doc.add_wire(wire);
        }
        for mut t in copy.texts {
            t.id = new_id();
            doc.add_text(t);
        }
        info!(template = %self.id, components = added.len(), "instantiated template");
        added
    }
}

/// Built-in plus user-saved templates.
#[derive(Debug, Clone, PartialEq)]
pub struct TemplateLibrary {
    built_in: Vec<CircuitTemplate>,
    custom: Vec<CircuitTemplate>,
}

impl Default for TemplateLibrary {
    fn default() -> Self {
        Self {
            built_in: built_in_templates(),
            custom: Vec::new(),
        }
    }
}

impl TemplateLibrary {
    pub fn get(&self, id: &str) -> Option<&CircuitTemplate> {
        self.all().find(|t| t.id == id)
    }

    pub fn all(&self) -> impl Iterator<Item = &CircuitTemplate> {
        self.built_in.iter().chain(self.custom.iter())
    }

    pub fn custom(&self) -> &[CircuitTemplate] {
        &self.custom
    }

    pub fn add_custom(&mut self, template: CircuitTemplate) {
        self.custom.push(template);
    }

    /// Remove a user template. Built-in templates cannot be deleted.
    pub fn delete_custom(&mut self, id: &str) -> bool {
        let before = self.custom.len();
        self.custom.retain(|t| t.id != id);
        self.custom.len() != before
    }
}

fn placed(id: &str, x: f64, y: f64) -> Component {
    Component {
        id: id.to_string(),
        kind: ComponentType::Resistor,
        x,
        y,
        rotation: 0.0,
        scale: 1.0,
        color: Some("#000000".to_string()),
    }
}

fn label(id: &str, text: &str, x: f64, y: f64) -> TextElement {
    TextElement {
        id: id.to_string(),
        font_size: 12.0,
        ..TextElement::new(x, y, text)
    }
}

/// The templates shipped with the editor.
pub fn built_in_templates() -> Vec<CircuitTemplate> {
    vec![
        CircuitTemplate {
            id: "sram-6t".into(),
            name: "6T SRAM Cell".into(),
            category: TemplateCategory::Sram,
            description: "Standard 6-transistor SRAM cell with cross-coupled inverters".into(),
            components: vec![
                placed("p1", 50.0, 30.0),
                placed("p2", 150.0, 30.0),
                placed("n1", 50.0, 80.0),
                placed("n2", 150.0, 80.0),
                placed("n3", 50.0, 130.0),
                placed("n4", 150.0, 130.0),
            ],
            wires: Vec::new(),
            texts: vec![
                label("t1", "VDD", 100.0, 10.0),
                label("t2", "GND", 100.0, 160.0),
                label("t3", "BL", 30.0, 100.0),
                label("t4", "BLB", 170.0, 100.0),
                label("t5", "WL", 100.0, 180.0),
            ],
            nodes: Vec::new(),
            width: 200.0,
            height: 200.0,
        },
        CircuitTemplate {
            id: "nand-gate".into(),
            name: "NAND Gate".into(),
            category: TemplateCategory::Logic,
            description: "2-input NAND gate".into(),
            components: vec![
                placed("p1", 50.0, 30.0),
                placed("p2", 50.0, 60.0),
                placed("n1", 50.0, 90.0),
                placed("n2", 80.0, 90.0),
            ],
            wires: Vec::new(),
            texts: vec![
                label("t1", "A", 20.0, 45.0),
                label("t2", "B", 20.0, 75.0),
                label("t3", "Y", 100.0, 60.0),
            ],
            nodes: Vec::new(),
            width: 120.0,
            height: 120.0,
        },
        CircuitTemplate {
            id: "nor-gate".into(),
            name: "NOR Gate".into(),
            category: TemplateCategory::Logic,
            description: "2-input NOR gate".into(),
            components: vec![
                placed("p1", 50.0, 30.0),
                placed("p2", 80.0, 30.0),
                placed("n1", 50.0, 90.0),
                placed("n2", 50.0, 120.0),
            ],
            wires: Vec::new(),
            texts: vec![
                label("t1", "A", 20.0, 45.0),
                label("t2", "B", 20.0, 105.0),
                label("t3", "Y", 100.0, 60.0),
            ],
            nodes: Vec::new(),
            width: 120.0,
            height: 150.0,
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::WirePoint;

    #[test]
    fn test_built_ins() {
        let lib = TemplateLibrary::default();
        let ids: Vec<_> = lib.all().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, vec!["sram-6t", "nand-gate", "nor-gate"]);
        assert_eq!(lib.get("sram-6t").unwrap().components.len(), 6);
    }

    #[test]
    fn test_instantiate_reids_and_offsets() {
        let lib = TemplateLibrary::default();
        let mut doc = Schematic::new();
        let a = lib.get("nand-gate").unwrap().instantiate(&mut doc, Point::new(100.0, 200.0));
        let b = lib.get("nand-gate").unwrap().instantiate(&mut doc, Point::new(100.0, 200.0));
        assert_eq!(doc.components.len(), 8);
        assert!(a.iter().all(|id| !b.contains(id)));
        assert_eq!(doc.components[&a[0]].position(), Point::new(150.0, 230.0));
        assert_eq!(doc.texts.len(), 6);
    }

    #[test]
    fn test_round_trip_through_document() {
        let mut doc = Schematic::new();
        let c = doc.add_component(Component::new(ComponentType::Resistor, 100.0, 50.0));
        doc.add_wire(Wire::new(
            vec![
                WirePoint::terminal(Point::new(124.0, 50.0), &c, "right"),
                WirePoint::free(Point::new(200.0, 80.0)),
            ],
            None,
        ));
        let template = CircuitTemplate::from_document(&doc, "pair", TemplateCategory::Custom, "").unwrap();
        assert_eq!(template.components[0].position(), Point::new(0.0, 0.0));
        assert_eq!((template.width, template.height), (100.0, 30.0));

        let mut target = Schematic::new();
        let ids = template.instantiate(&mut target, Point::new(10.0, 10.0));
        let wire = target.wires.values().next().unwrap();
        assert!(wire.points[0].binding.references_component(&ids[0]));
        assert!(target.dangling_wires().is_empty());
    }

    #[test]
    fn test_empty_document_is_not_a_template() {
        assert!(matches!(
            CircuitTemplate::from_document(&Schematic::new(), "x", TemplateCategory::Custom, ""),
            Err(EditorError::EmptyDocument)
        ));
    }

    #[test]
    fn test_only_custom_templates_delete() {
        let mut lib = TemplateLibrary::default();
        assert!(!lib.delete_custom("sram-6t"));
        let mut doc = Schematic::new();
        doc.add_component(Component::new(ComponentType::Led, 0.0, 0.0));
        let t = CircuitTemplate::from_document(&doc, "led", TemplateCategory::Custom, "").unwrap();
        let id = t.id.clone();
        lib.add_custom(t);
        assert!(lib.get(&id).is_some());
        assert!(lib.delete_custom(&id));
        assert!(lib.custom().is_empty());
    }
}
