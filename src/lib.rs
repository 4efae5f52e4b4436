//! Schematic editor core.
//!
//! This crate models an electronic schematic (placed components, wires
//! bound to component terminals or junction nodes, free text) and the
//! editing logic around it: terminal resolution, snapping, wire
//! construction, graph surgery, undo/redo, persistence and SVG export.
//!
//! [`editor::EditorState`] is the entry point for interactive use. The
//! binary `schematic-editor` renders and inspects saved projects.

pub mod config;
pub mod editor;
pub mod error;
pub mod export;
pub mod geometry;
pub mod model;
pub mod project;
pub mod resolve;
pub mod snap;
pub mod terminals;

pub use error::{EditorError, Result};
