//! Interactive schematic editing.
//!
//! The editor layers interaction on top of the [`crate::model`] document:
//!
//! - **Wire construction**: straight, elbow and polyline wires with live
//!   preview, vertex commit and polyline decomposition
//! - **Graph operations**: subdivision, node moves, delete cascades,
//!   auto-routing, wire properties and bundles
//! - **Selection**: per-kind primary and multi-selection sets
//! - **Undo/Redo**: snapshot stacks with one frame per committed edit
//! - **Templates**: built-in and user-saved circuit fragments
//! - **Input**: tool state machine for clicks, drags and shortcuts
//!
//! [`EditorState`] owns all of it and is the single mutation entry point.

pub mod history;
pub mod input;
pub mod operations;
pub mod selection;
pub mod state;
pub mod templates;
pub mod wiring;

pub use history::{EditorHistory, Snapshot};
pub use input::{Gesture, Key, Modifiers, Tool};
pub use operations::{Subdivision, WireHit, subdivide_wire};
pub use selection::{EditorSelection, EntityKind};
pub use state::{EditorClipboard, EditorState, ProjectInfo};
pub use templates::{CircuitTemplate, TemplateCategory, TemplateLibrary};
pub use wiring::{ActiveWire, WireStyle};
