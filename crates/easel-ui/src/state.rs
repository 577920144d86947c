//! Plain state records for canvases and widgets.
//!
//! These carry no behavior beyond a JSON-safe export. Widgets own their
//! [`WidgetState`]; a canvas owns its [`CanvasSettings`] and materializes a
//! [`CanvasState`] (settings plus every widget's state) on demand.

use std::fmt;
use std::str::FromStr;

use easel_core::config::CanvasDefaults;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::UiError;
use crate::value::Properties;

/// How a canvas presents itself to the toolkit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CanvasMode {
    #[default]
    Standard,
    Docking,
    MultiViewport,
    Fullscreen,
    Overlay,
}

impl CanvasMode {
    pub const ALL: [CanvasMode; 5] = [
        CanvasMode::Standard,
        CanvasMode::Docking,
        CanvasMode::MultiViewport,
        CanvasMode::Fullscreen,
        CanvasMode::Overlay,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            CanvasMode::Standard => "standard",
            CanvasMode::Docking => "docking",
            CanvasMode::MultiViewport => "multi_viewport",
            CanvasMode::Fullscreen => "fullscreen",
            CanvasMode::Overlay => "overlay",
        }
    }
}

impl fmt::Display for CanvasMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CanvasMode {
    type Err = UiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        CanvasMode::ALL
            .into_iter()
            .find(|mode| mode.as_str() == s)
            .ok_or_else(|| {
                UiError::invalid_property("mode", format!("unknown canvas mode '{}'", s))
            })
    }
}

/// State for a widget.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WidgetState {
    pub widget_id: String,
    pub widget_type: String,
    #[serde(default)]
    pub properties: Properties,
    /// Explicit cursor position; `None` lets the toolkit lay the widget out.
    #[serde(default)]
    pub position: Option<[f32; 2]>,
    #[serde(default)]
    pub size: Option<[f32; 2]>,
    #[serde(default = "default_true")]
    pub visible: bool,
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default)]
    pub parent: Option<String>,
    #[serde(default)]
    pub children: Vec<String>,
    /// Event name to handler name. Diagnostic only.
    #[serde(default)]
    pub callbacks: IndexMap<String, String>,
    #[serde(default)]
    pub data_bindings: Properties,
}

fn default_true() -> bool {
    true
}

impl WidgetState {
    pub fn new(widget_id: impl Into<String>, widget_type: impl Into<String>) -> Self {
        Self {
            widget_id: widget_id.into(),
            widget_type: widget_type.into(),
            properties: Properties::new(),
            position: None,
            size: None,
            visible: true,
            enabled: true,
            parent: None,
            children: Vec::new(),
            callbacks: IndexMap::new(),
            data_bindings: Properties::new(),
        }
    }

    pub fn with_properties(mut self, properties: Properties) -> Self {
        self.properties = properties;
        self
    }

    /// Export every field as JSON. Pairs become two-element arrays.
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or(serde_json::Value::Null)
    }
}

/// Mutable per-canvas configuration, owned by the canvas scene.
#[derive(Debug, Clone, PartialEq)]
pub struct CanvasSettings {
    pub canvas_id: String,
    pub mode: CanvasMode,
    pub size: [u32; 2],
    pub position: [i32; 2],
    pub theme: String,
    pub title: String,
    /// Gates whether `render` draws anything.
    pub active: bool,
    pub fps_idle: u32,
    pub fps_active: u32,
}

impl CanvasSettings {
    /// Settings for `canvas_id` seeded from [`CanvasDefaults::default`].
    pub fn new(canvas_id: impl Into<String>) -> Self {
        Self::from_defaults(canvas_id, &CanvasDefaults::default())
    }

    pub fn from_defaults(canvas_id: impl Into<String>, defaults: &CanvasDefaults) -> Self {
        Self {
            canvas_id: canvas_id.into(),
            mode: CanvasMode::Standard,
            size: [defaults.width, defaults.height],
            position: [0, 0],
            theme: defaults.theme.clone(),
            title: defaults.title.clone(),
            active: true,
            fps_idle: defaults.fps_idle,
            fps_active: defaults.fps_active,
        }
    }
}

/// Exported state of a canvas, including every widget it hosts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CanvasState {
    pub canvas_id: String,
    #[serde(default)]
    pub mode: CanvasMode,
    pub size: [u32; 2],
    #[serde(default)]
    pub position: [i32; 2],
    pub theme: String,
    pub title: String,
    #[serde(default)]
    pub widgets: IndexMap<String, WidgetState>,
    #[serde(default = "default_true")]
    pub active: bool,
    pub fps_idle: u32,
    pub fps_active: u32,
}

impl CanvasState {
    pub fn from_settings(
        settings: &CanvasSettings,
        widgets: IndexMap<String, WidgetState>,
    ) -> Self {
        Self {
            canvas_id: settings.canvas_id.clone(),
            mode: settings.mode,
            size: settings.size,
            position: settings.position,
            theme: settings.theme.clone(),
            title: settings.title.clone(),
            widgets,
            active: settings.active,
            fps_idle: settings.fps_idle,
            fps_active: settings.fps_active,
        }
    }

    /// The settings half of this state, without widgets.
    pub fn settings(&self) -> CanvasSettings {
        CanvasSettings {
            canvas_id: self.canvas_id.clone(),
            mode: self.mode,
            size: self.size,
            position: self.position,
            theme: self.theme.clone(),
            title: self.title.clone(),
            active: self.active,
            fps_idle: self.fps_idle,
            fps_active: self.fps_active,
        }
    }

    /// Export every field as JSON; the mode becomes its string value.
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or(serde_json::Value::Null)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::properties;

    #[test]
    fn test_widget_state_export_shape() {
        let mut state =
            WidgetState::new("b1", "button").with_properties(properties! { "label" => "Go" });
        state.position = Some([10.0, 20.0]);

        let json = state.to_json();
        assert_eq!(json["widget_id"], "b1");
        assert_eq!(json["widget_type"], "button");
        assert_eq!(json["properties"]["label"], "Go");
        assert_eq!(json["position"], serde_json::json!([10.0, 20.0]));
        assert!(json["size"].is_null());
        assert_eq!(json["visible"], true);
        assert_eq!(json["children"], serde_json::json!([]));
    }

    #[test]
    fn test_canvas_mode_strings() {
        for mode in CanvasMode::ALL {
            assert_eq!(mode.as_str().parse::<CanvasMode>().unwrap(), mode);
            assert_eq!(serde_json::to_value(mode).unwrap(), mode.as_str());
        }
        assert!("tiled".parse::<CanvasMode>().is_err());
    }

    #[test]
    fn test_canvas_state_export_uses_mode_value() {
        let settings = CanvasSettings {
            canvas_id: "c1".into(),
            mode: CanvasMode::MultiViewport,
            size: [800, 600],
            position: [0, 0],
            theme: "dark".into(),
            title: "T".into(),
            active: true,
            fps_idle: 10,
            fps_active: 60,
        };
        let state = CanvasState::from_settings(&settings, IndexMap::new());
        let json = state.to_json();
        assert_eq!(json["mode"], "multi_viewport");
        assert_eq!(json["size"], serde_json::json!([800, 600]));
        assert_eq!(state.settings(), settings);
    }

    #[test]
    fn test_widget_state_defaults_when_fields_missing() {
        let state: WidgetState =
            serde_json::from_str(r#"{"widget_id":"t","widget_type":"text"}"#).unwrap();
        assert!(state.visible && state.enabled);
        assert!(state.properties.is_empty());
    }
}
