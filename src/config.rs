//! Editor settings.
//!
//! Defaults match the interactive editor. A JSON file may override any
//! subset of fields.

use camino::Utf8Path;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::editor::wiring::WireStyle;
use crate::error::Result;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EditorSettings {
    pub grid_on: bool,
    pub grid_size: f64,
    pub wire_style: WireStyle,
    pub wire_color: String,
    pub text_color: String,
    pub text_size: f64,
    pub text_weight: String,
    /// Maximum undo depth.
    pub history_limit: usize,
    pub paste_offset: f64,
    pub duplicate_offset: f64,
    pub auto_save: bool,
}

impl Default for EditorSettings {
    fn default() -> Self {
        Self {
            grid_on: true,
            grid_size: crate::snap::GRID_SIZE,
            wire_style: WireStyle::Elbow,
            wire_color: "#334155".to_string(),
            text_color: "#000000".to_string(),
            text_size: 14.0,
            text_weight: "normal".to_string(),
            history_limit: 50,
            paste_offset: 20.0,
            duplicate_offset: 40.0,
            auto_save: true,
        }
    }
}

impl EditorSettings {
    /// Load settings from a JSON file; missing fields keep their defaults.
    pub fn load(path: &Utf8Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        let settings: EditorSettings = serde_json::from_str(&text)?;
        debug!(%path, "loaded editor settings");
        Ok(settings)
    }

    /// Grid size when the grid is enabled.
    pub fn grid(&self) -> Option<f64> {
        self.grid_on.then_some(self.grid_size)
    }
}
