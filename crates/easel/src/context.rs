//! Application context: the one place that owns every canvas.

use std::path::Path;
use std::sync::Arc;

use easel_core::Config;
use easel_egui::{EguiRunner, RunnerFactory};
use easel_ui::{
    Canvas, CanvasDescriptor, CanvasManager, CanvasState, Properties, SignalBus, UiError,
    UiResult, Widget, WidgetFactory, WidgetState, register_builtin_widgets,
};
use serde::{Deserialize, Serialize};

use crate::persist;

/// Everything needed to place one widget on a canvas.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WidgetSpec {
    pub widget_type: String,
    pub widget_id: String,
    #[serde(default)]
    pub properties: Properties,
    #[serde(default)]
    pub position: Option<[f32; 2]>,
    #[serde(default)]
    pub size: Option<[f32; 2]>,
}

impl WidgetSpec {
    pub fn new(widget_type: impl Into<String>, widget_id: impl Into<String>) -> Self {
        Self {
            widget_type: widget_type.into(),
            widget_id: widget_id.into(),
            properties: Properties::new(),
            position: None,
            size: None,
        }
    }

    pub fn with_properties(mut self, properties: Properties) -> Self {
        self.properties = properties;
        self
    }

    pub fn at(mut self, x: f32, y: f32) -> Self {
        self.position = Some([x, y]);
        self
    }

    pub fn sized(mut self, width: f32, height: f32) -> Self {
        self.size = Some([width, height]);
        self
    }
}

/// Owns the canvas manager, its signal bus and the configuration.
///
/// Built-in widget types are registered on construction, so every canvas
/// created through the context can build them. Dropping the context stops
/// every render thread.
///
/// # Example
///
/// ```no_run
/// use easel::{AppContext, Config, WidgetSpec, properties};
///
/// let mut app = AppContext::new(Config::default());
/// let descriptor = app.descriptor().with_title("Settings");
/// app.create_canvas("main", descriptor).unwrap();
/// app.add_widget(
///     "main",
///     WidgetSpec::new("button", "save").with_properties(properties! { "label" => "Save" }),
/// )
/// .unwrap();
/// app.shutdown();
/// ```
pub struct AppContext {
    config: Config,
    manager: CanvasManager,
}

impl AppContext {
    /// A context whose canvases run the egui frame loop.
    pub fn new(config: Config) -> Self {
        Self::with_runner(config, EguiRunner::factory())
    }

    pub fn with_runner(config: Config, runner_factory: RunnerFactory) -> Self {
        let mut factory = WidgetFactory::new();
        register_builtin_widgets(&mut factory);

        let manager = CanvasManager::with_factory(factory, runner_factory, config.canvas.clone());
        tracing::debug!(
            widget_types = ?manager.factory().list_types(),
            "Application context ready"
        );
        Self { config, manager }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn manager(&self) -> &CanvasManager {
        &self.manager
    }

    pub fn manager_mut(&mut self) -> &mut CanvasManager {
        &mut self.manager
    }

    pub fn signals(&self) -> &SignalBus {
        self.manager.signals()
    }

    /// Register a widget type for canvases created from now on.
    pub fn register_widget_type<F>(&mut self, widget_type: impl Into<String>, constructor: F)
    where
        F: Fn(&str, Properties) -> UiResult<Box<dyn Widget>> + Send + Sync + 'static,
    {
        self.manager.factory_mut().register(widget_type, constructor);
    }

    /// A descriptor seeded from the configured canvas defaults.
    pub fn descriptor(&self) -> CanvasDescriptor {
        self.manager.descriptor()
    }

    pub fn canvas(&self, canvas_id: &str) -> UiResult<Arc<Canvas>> {
        self.manager.canvas(canvas_id)
    }

    pub fn create_canvas(
        &mut self,
        canvas_id: &str,
        descriptor: CanvasDescriptor,
    ) -> UiResult<CanvasState> {
        Ok(self.manager.create_canvas(canvas_id, descriptor)?.state())
    }

    pub fn canvas_state(&self, canvas_id: &str) -> UiResult<CanvasState> {
        Ok(self.canvas(canvas_id)?.state())
    }

    pub fn list_canvases(&self) -> Vec<String> {
        self.manager.list_canvases()
    }

    pub fn active_canvas_id(&self) -> Option<&str> {
        self.manager.active_canvas_id()
    }

    pub fn set_active_canvas(&mut self, canvas_id: &str) -> UiResult<()> {
        if self.manager.set_active_canvas(canvas_id) {
            Ok(())
        } else {
            Err(UiError::CanvasNotFound(canvas_id.to_string()))
        }
    }

    /// Remove every widget from a canvas; returns how many were removed.
    pub fn clear_canvas(&self, canvas_id: &str) -> UiResult<usize> {
        Ok(self.canvas(canvas_id)?.clear())
    }

    pub fn remove_canvas(&mut self, canvas_id: &str) -> UiResult<()> {
        if self.manager.remove_canvas(canvas_id) {
            Ok(())
        } else {
            Err(UiError::CanvasNotFound(canvas_id.to_string()))
        }
    }

    /// Build a widget from `spec` and place it on a canvas.
    ///
    /// Nothing is created if the id is already taken on that canvas.
    pub fn add_widget(&self, canvas_id: &str, spec: WidgetSpec) -> UiResult<WidgetState> {
        let canvas = self.canvas(canvas_id)?;
        canvas.with_scene(|scene| -> UiResult<WidgetState> {
            if scene.registry().contains(&spec.widget_id) {
                return Err(UiError::WidgetExists(spec.widget_id));
            }

            let mut widget = scene
                .registry()
                .factory()
                .create(&spec.widget_type, &spec.widget_id, spec.properties)?;
            if let Some([x, y]) = spec.position {
                widget.set_position(x, y);
            }
            if let Some([width, height]) = spec.size {
                widget.set_size(width, height);
            }

            let state = widget.state().clone();
            scene.add_widget(widget)?;
            Ok(state)
        })
    }

    /// Merge `properties` into a widget and return its new state.
    pub fn update_widget(
        &self,
        canvas_id: &str,
        widget_id: &str,
        properties: Properties,
    ) -> UiResult<WidgetState> {
        let canvas = self.canvas(canvas_id)?;
        canvas.update_widget(widget_id, properties)?;
        canvas.widget_state(widget_id)
    }

    pub fn remove_widget(&self, canvas_id: &str, widget_id: &str) -> UiResult<()> {
        if self.canvas(canvas_id)?.remove_widget(widget_id) {
            Ok(())
        } else {
            Err(UiError::WidgetNotFound(widget_id.to_string()))
        }
    }

    pub fn canvas_json(&self, canvas_id: &str) -> UiResult<serde_json::Value> {
        Ok(self.canvas(canvas_id)?.serialize())
    }

    pub fn export_canvas_json(&self, canvas_id: &str, path: impl AsRef<Path>) -> UiResult<()> {
        let canvas = self.canvas(canvas_id)?;
        persist::export_canvas(&canvas, path)
    }

    /// Recreate a canvas from a file written by
    /// [`AppContext::export_canvas_json`].
    pub fn import_canvas_json(&mut self, path: impl AsRef<Path>) -> UiResult<CanvasState> {
        let state = persist::read_document(path)?;
        Ok(persist::import_canvas(&mut self.manager, &state)?.state())
    }

    pub fn import_canvas_str(&mut self, text: &str) -> UiResult<CanvasState> {
        let state = persist::parse_document(text)?;
        Ok(persist::import_canvas(&mut self.manager, &state)?.state())
    }

    /// Stop every render thread. Canvases and their widgets are kept.
    pub fn shutdown(&self) {
        tracing::info!(canvases = self.manager.len(), "Shutting down");
        self.manager.stop_all();
    }
}

impl std::fmt::Debug for AppContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppContext")
            .field("canvases", &self.manager.list_canvases())
            .field("active", &self.manager.active_canvas_id())
            .finish()
    }
}
