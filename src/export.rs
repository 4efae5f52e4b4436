//! SVG export.
//!
//! Every bound wire point is resolved against the live document at export
//! time, so the output carries plain coordinates only. Component artwork
//! comes from a [`SymbolRenderer`]; the document model never draws.

use std::fmt::Write as _;

use camino::Utf8Path;
use tracing::{debug, info};

use crate::config::EditorSettings;
use crate::error::{EditorError, Result};
use crate::model::{LineStyle, Schematic};
use crate::resolve::{resolve_terminals, resolve_wire};
use crate::terminals::ComponentType;

/// Extra space around the content bounds.
pub const EXPORT_PADDING: f64 = 40.0;
/// Canvas size used for an empty document.
pub const DEFAULT_CANVAS: (f64, f64) = (800.0, 600.0);
const DEFAULT_STROKE: &str = "#334155";

/// Draws one component symbol in local coordinates (centered on the origin,
/// unrotated, unscaled). `None` means the type has no artwork available.
pub trait SymbolRenderer {
    fn symbol(&self, kind: ComponentType) -> Option<String>;
}

impl<F> SymbolRenderer for F
where
    F: Fn(ComponentType) -> Option<String>,
{
    fn symbol(&self, kind: ComponentType) -> Option<String> {
        self(kind)
    }
}

/// Generic artwork for every type: a body box with one lead per terminal.
#[derive(Debug, Clone, Copy, Default)]
pub struct OutlineSymbols;

impl SymbolRenderer for OutlineSymbols {
    fn symbol(&self, kind: ComponentType) -> Option<String> {
        let common = r#"fill="none" stroke="currentColor" stroke-width="1.5""#;
        let mut out = format!(r#"<rect x="-10" y="-10" width="20" height="20" rx="2" {common}/>"#);
        for t in kind.terminals() {
            // lead from the nearest body edge to the terminal
            let x1 = t.x.clamp(-10.0, 10.0);
            let y1 = t.y.clamp(-10.0, 10.0);
            let _ = write!(out, r#"<line x1="{x1}" y1="{y1}" x2="{}" y2="{}" {common}/>"#, t.x, t.y);
        }
        Some(out)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SvgOptions {
    /// Draw terminal and junction markers.
    pub show_nodes: bool,
    pub show_grid: bool,
    pub grid_size: f64,
    /// Stroke for wires without their own color.
    pub wire_color: String,
    pub background: String,
}

impl Default for SvgOptions {
    fn default() -> Self {
        Self {
            show_nodes: true,
            show_grid: false,
            grid_size: crate::snap::GRID_SIZE,
            wire_color: DEFAULT_STROKE.to_string(),
            background: "white".to_string(),
        }
    }
}

impl SvgOptions {
    /// Grid and wire defaults taken from the editor settings.
    pub fn from_settings(settings: &EditorSettings) -> Self {
        Self {
            show_grid: settings.grid_on,
            grid_size: settings.grid_size,
            wire_color: settings.wire_color.clone(),
            ..Self::default()
        }
    }
}

/// Axis-aligned bounds of the exported content, padding included.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl Bounds {
    pub fn width(&self) -> f64 {
        self.max_x - self.min_x
    }

    pub fn height(&self) -> f64 {
        self.max_y - self.min_y
    }
}

/// Content bounds: each component as a 60x40 box scaled by its scale, plus
/// every resolved wire point, padded by [`EXPORT_PADDING`].
pub fn content_bounds(doc: &Schematic) -> Bounds {
    if doc.components.is_empty() && doc.wires.is_empty() {
        return Bounds {
            min_x: 0.0,
            min_y: 0.0,
            max_x: DEFAULT_CANVAS.0,
            max_y: DEFAULT_CANVAS.1,
        };
    }
    let mut b = Bounds {
        min_x: f64::INFINITY,
        min_y: f64::INFINITY,
        max_x: f64::NEG_INFINITY,
        max_y: f64::NEG_INFINITY,
    };
    for c in doc.components.values() {
        b.min_x = b.min_x.min(c.x - 30.0 * c.scale);
        b.min_y = b.min_y.min(c.y - 20.0 * c.scale);
        b.max_x = b.max_x.max(c.x + 30.0 * c.scale);
        b.max_y = b.max_y.max(c.y + 20.0 * c.scale);
    }
    for p in doc.wires.values().flat_map(|w| resolve_wire(w, doc)) {
        b.min_x = b.min_x.min(p.x);
        b.min_y = b.min_y.min(p.y);
        b.max_x = b.max_x.max(p.x);
        b.max_y = b.max_y.max(p.y);
    }
    Bounds {
        min_x: b.min_x - EXPORT_PADDING,
        min_y: b.min_y - EXPORT_PADDING,
        max_x: b.max_x + EXPORT_PADDING,
        max_y: b.max_y + EXPORT_PADDING,
    }
}

fn dash_array(style: LineStyle) -> Option<&'static str> {
    match style {
        LineStyle::Solid => None,
        LineStyle::Dashed => Some("8,4"),
        LineStyle::Dotted => Some("2,3"),
    }
}

/// Render `doc` as a self-contained SVG document.
///
/// Fails with [`EditorError::NoSymbolSurface`] when the renderer has no
/// artwork for any component in the document.
pub fn export_svg(doc: &Schematic, renderer: &dyn SymbolRenderer, options: &SvgOptions) -> Result<String> {
    let symbols: Vec<Option<String>> = doc.components.values().map(|c| renderer.symbol(c.kind)).collect();
    if !symbols.is_empty() && symbols.iter().all(Option::is_none) {
        return Err(EditorError::NoSymbolSurface);
    }

    let bounds = content_bounds(doc);
    let (w, h) = (bounds.width(), bounds.height());
    let (ox, oy) = (-bounds.min_x, -bounds.min_y);
    let bg = html_escape::encode_double_quoted_attribute(&options.background);

    let mut svg = String::new();
    let _ = writeln!(svg, r#"<?xml version="1.0" encoding="UTF-8"?>"#);
    let _ = writeln!(
        svg,
        r#"<svg width="{w}" height="{h}" viewBox="0 0 {w} {h}" xmlns="http://www.w3.org/2000/svg">"#
    );
    let _ = writeln!(svg, r#"  <rect width="100%" height="100%" fill="{bg}"/>"#);
    if options.show_grid {
        let g = options.grid_size;
        let _ = writeln!(
            svg,
            concat!(
                r#"  <defs><pattern id="grid" width="{g}" height="{g}" patternUnits="userSpaceOnUse">"#,
                r##"<path d="M {g} 0 L 0 0 0 {g}" fill="none" stroke="#e5e7eb" stroke-width="1"/>"##,
                "</pattern></defs>"
            ),
            g = g
        );
        let _ = writeln!(svg, r#"  <rect width="100%" height="100%" fill="url(#grid)"/>"#);
    }

    for wire in doc.wires.values() {
        let points = resolve_wire(wire, doc);
        let mut d = String::new();
        for (i, p) in points.iter().enumerate() {
            let cmd = if i == 0 { "M" } else { " L" };
            let _ = write!(d, "{cmd} {} {}", p.x + ox, p.y + oy);
        }
        let color = wire.color.as_deref().unwrap_or(&options.wire_color);
        let width = wire.thickness.unwrap_or(2.0);
        let dash = wire
            .style
            .and_then(dash_array)
            .map(|a| format!(r#" stroke-dasharray="{a}""#))
            .unwrap_or_default();
        let _ = writeln!(
            svg,
            r#"  <path d="{d}" fill="none" stroke="{}" stroke-width="{width}"{dash}/>"#,
            html_escape::encode_double_quoted_attribute(color)
        );
    }

    for (c, symbol) in doc.components.values().zip(symbols) {
        let Some(symbol) = symbol else {
            debug!(component = %c.id, kind = %c.kind, "no symbol for component type");
            continue;
        };
        let color = c.color.as_deref().unwrap_or(DEFAULT_STROKE);
        let _ = writeln!(
            svg,
            r#"  <g transform="translate({},{}) rotate({}) scale({})" style="color: {}">{symbol}</g>"#,
            c.x + ox,
            c.y + oy,
            c.rotation,
            c.scale,
            html_escape::encode_double_quoted_attribute(color)
        );
    }

    for t in doc.texts.values() {
        let _ = writeln!(
            svg,
            r#"  <text x="{x}" y="{y}" font-size="{}" font-weight="{}" font-family="{}" fill="{}" text-anchor="{}" transform="rotate({} {x} {y})">{}</text>"#,
            t.font_size,
            html_escape::encode_double_quoted_attribute(&t.font_weight),
            html_escape::encode_double_quoted_attribute(&t.font_family),
            html_escape::encode_double_quoted_attribute(&t.color),
            t.text_align.as_svg(),
            t.rotation,
            html_escape::encode_text(&t.text),
            x = t.x + ox,
            y = t.y + oy,
        );
    }

    if options.show_nodes {
        let markers = doc
            .components
            .values()
            .flat_map(resolve_terminals)
            .map(|t| t.position)
            .chain(doc.nodes.values().map(|n| n.position()));
        for p in markers {
            let _ = writeln!(
                svg,
                concat!(
                    r#"  <g transform="translate({},{})">"#,
                    r##"<circle r="6" fill="none" stroke="#94a3b8" stroke-width="1.5"/>"##,
                    r##"<circle r="2" fill="#64748b"/></g>"##
                ),
                p.x + ox,
                p.y + oy
            );
        }
    }

    svg.push_str("</svg>\n");
    Ok(svg)
}

/// Render and write to `path`. The file only appears once fully written;
/// on error nothing is left behind.
pub fn write_svg(doc: &Schematic, renderer: &dyn SymbolRenderer, options: &SvgOptions, path: &Utf8Path) -> Result<()> {
    let svg = export_svg(doc, renderer, options)?;
    let tmp = path.with_extension("svg.tmp");
    std::fs::write(&tmp, svg.as_bytes())?;
    if let Err(e) = std::fs::rename(&tmp, path) {
        let _ = std::fs::remove_file(&tmp);
        return Err(e.into());
    }
    info!(%path, bytes = svg.len(), "exported svg");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Point;
    use crate::model::{Component, TextElement, Wire, WirePoint};

    fn two_resistors() -> Schematic {
        let mut doc = Schematic::new();
        let a = doc.add_component(Component::new(ComponentType::Resistor, 100.0, 100.0));
        let b = doc.add_component(Component::new(ComponentType::Resistor, 300.0, 100.0));
        doc.add_wire(Wire::new(
            vec![
                WirePoint::terminal(Point::new(0.0, 0.0), &a, "right"),
                WirePoint::terminal(Point::new(0.0, 0.0), &b, "left"),
            ],
            None,
        ));
        doc
    }

    #[test]
    fn test_bounds() {
        let b = content_bounds(&two_resistors());
        assert_eq!((b.min_x, b.min_y, b.max_x, b.max_y), (30.0, 40.0, 370.0, 160.0));
        let empty = content_bounds(&Schematic::new());
        assert_eq!((empty.width(), empty.height()), (800.0, 600.0));
    }

    #[test]
    fn test_wire_path_uses_resolved_points() {
        let svg = export_svg(&two_resistors(), &OutlineSymbols, &SvgOptions::default()).unwrap();
        // stale cached (0,0) must not leak; terminals sit at 124 and 276, offset by -30/-40
        assert!(svg.contains(r#"d="M 94 60 L 246 60""#), "{svg}");
        assert!(svg.contains(r##"stroke="#334155" stroke-width="2""##));
        assert!(svg.contains("translate(70,60) rotate(0) scale(1)"));
    }

    #[test]
    fn test_text_is_escaped() {
        let mut doc = Schematic::new();
        doc.add_text(TextElement::new(10.0, 10.0, "<R1 & R2>"));
        let svg = export_svg(&doc, &OutlineSymbols, &SvgOptions::default()).unwrap();
        assert!(svg.contains("&lt;R1 &amp; R2&gt;"));
    }

    #[test]
    fn test_no_symbol_surface() {
        let none = |_: ComponentType| -> Option<String> { None };
        let err = export_svg(&two_resistors(), &none, &SvgOptions::default()).unwrap_err();
        assert!(matches!(err, EditorError::NoSymbolSurface));
    }

    #[test]
    fn test_write_svg_leaves_nothing_on_failure() {
        let dir = tempfile::tempdir().unwrap();
        let root = camino::Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).unwrap();
        let path = root.join("out.svg");
        let none = |_: ComponentType| -> Option<String> { None };
        assert!(write_svg(&two_resistors(), &none, &SvgOptions::default(), &path).is_err());
        assert!(!path.exists());

        write_svg(&two_resistors(), &OutlineSymbols, &SvgOptions::default(), &path).unwrap();
        assert!(std::fs::read_to_string(&path).unwrap().starts_with("<?xml"));
        assert!(!root.join("out.svg.tmp").exists());
    }

    #[test]
    fn test_dashed_wire() {
        let mut doc = two_resistors();
        for w in doc.wires.values_mut() {
            w.style = Some(LineStyle::Dashed);
            w.thickness = Some(3.0);
        }
        let svg = export_svg(&doc, &OutlineSymbols, &SvgOptions::default()).unwrap();
        assert!(svg.contains(r#"stroke-width="3" stroke-dasharray="8,4""#));
    }

    #[test]
    fn test_options_follow_editor_settings() {
        let settings = EditorSettings {
            grid_size: 25.0,
            wire_color: "#ff0000".to_string(),
            ..EditorSettings::default()
        };
        let options = SvgOptions::from_settings(&settings);
        assert!(options.show_grid);
        let svg = export_svg(&two_resistors(), &OutlineSymbols, &options).unwrap();
        assert!(svg.contains(r#"<pattern id="grid" width="25" height="25""#), "{svg}");
        assert!(svg.contains(r##"stroke="#ff0000" stroke-width="2""##));

        let plain = export_svg(&two_resistors(), &OutlineSymbols, &SvgOptions::default()).unwrap();
        assert!(!plain.contains("pattern"));
    }
}
