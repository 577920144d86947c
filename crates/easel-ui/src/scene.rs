//! Everything a canvas guards behind its lock: settings plus widgets.

use std::panic::{self, AssertUnwindSafe};
use std::str::FromStr;

use easel_core::profiling::{profile_function, profile_scope};
use egui::{Id, Rect, Ui, UiBuilder, vec2};

use crate::command::panic_message;
use crate::error::{UiError, UiResult};
use crate::signal::{SignalBus, UiSignal};
use crate::state::{CanvasMode, CanvasSettings, CanvasState};
use crate::value::{Properties, PropertyValue};
use crate::widget::{RenderOutput, Widget, WidgetRegistry};

/// Outcome of one render pass.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct RenderReport {
    pub rendered: usize,
    /// Widgets skipped because they were hidden.
    pub skipped: usize,
    /// Widgets whose render failed; they were isolated.
    pub faults: Vec<UiError>,
}

/// Settings and widgets of one canvas.
///
/// A scene is only ever reached through its canvas's lock, so each method
/// here is one atomic step from the caller's point of view.
#[derive(Debug)]
pub struct CanvasScene {
    settings: CanvasSettings,
    registry: WidgetRegistry,
}

impl CanvasScene {
    pub fn new(settings: CanvasSettings, registry: WidgetRegistry) -> Self {
        Self { settings, registry }
    }

    pub fn canvas_id(&self) -> &str {
        &self.settings.canvas_id
    }

    pub fn settings(&self) -> &CanvasSettings {
        &self.settings
    }

    pub fn settings_mut(&mut self) -> &mut CanvasSettings {
        &mut self.settings
    }

    pub fn registry(&self) -> &WidgetRegistry {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut WidgetRegistry {
        &mut self.registry
    }

    fn signals(&self) -> &SignalBus {
        self.registry.factory().signals()
    }

    /// Export settings plus the state of every widget.
    pub fn state(&self) -> CanvasState {
        CanvasState::from_settings(&self.settings, self.registry.states())
    }

    pub fn widget(&self, widget_id: &str) -> UiResult<&dyn Widget> {
        self.registry
            .get(widget_id)
            .ok_or_else(|| UiError::WidgetNotFound(widget_id.to_string()))
    }

    pub fn widget_mut(&mut self, widget_id: &str) -> UiResult<&mut dyn Widget> {
        self.registry
            .get_mut(widget_id)
            .ok_or_else(|| UiError::WidgetNotFound(widget_id.to_string()))
    }

    /// Add a widget, refusing to replace one with the same id.
    pub fn add_widget(&mut self, mut widget: Box<dyn Widget>) -> UiResult<()> {
        if self.registry.contains(widget.id()) {
            return Err(UiError::WidgetExists(widget.id().to_string()));
        }
        if !widget.core().has_signals() {
            widget.core_mut().attach_signals(self.signals().clone());
        }

        tracing::debug!(
            canvas_id = %self.settings.canvas_id,
            widget_id = %widget.id(),
            widget_type = %widget.widget_type(),
            "Added widget"
        );
        self.registry.add(widget);
        Ok(())
    }

    /// Create a widget through this canvas's factory and add it.
    pub fn create_widget(
        &mut self,
        widget_type: &str,
        widget_id: &str,
        properties: Properties,
    ) -> UiResult<()> {
        if self.registry.contains(widget_id) {
            return Err(UiError::WidgetExists(widget_id.to_string()));
        }
        let widget = self.registry.factory().create(widget_type, widget_id, properties)?;
        self.add_widget(widget)
    }

    /// Remove a widget. Returns `false` if it did not exist.
    pub fn remove_widget(&mut self, widget_id: &str) -> bool {
        if !self.registry.remove(widget_id) {
            return false;
        }

        tracing::debug!(canvas_id = %self.settings.canvas_id, widget_id, "Removed widget");
        self.signals().emit(UiSignal::WidgetDeleted {
            canvas_id: self.settings.canvas_id.clone(),
            widget_id: widget_id.to_string(),
        });
        true
    }

    pub fn update_widget(&mut self, widget_id: &str, properties: Properties) -> UiResult<()> {
        self.widget_mut(widget_id)?.update(properties);
        Ok(())
    }

    /// Remove every widget, returning how many there were.
    pub fn clear(&mut self) -> usize {
        let removed = self.registry.clear();
        for widget_id in &removed {
            self.signals().emit(UiSignal::WidgetDeleted {
                canvas_id: self.settings.canvas_id.clone(),
                widget_id: widget_id.clone(),
            });
        }

        tracing::debug!(
            canvas_id = %self.settings.canvas_id,
            removed = removed.len(),
            "Cleared canvas"
        );
        removed.len()
    }

    /// Apply canvas-level properties.
    ///
    /// Recognized keys are `size`, `position`, `mode`, `theme`, `title`,
    /// `fps_idle` and `fps_active`; anything else is ignored. Every
    /// recognized value is validated before any is applied. Returns whether
    /// anything changed. Every successful call emits
    /// [`UiSignal::CanvasUpdated`], changed or not.
    pub fn apply_properties(&mut self, properties: &Properties) -> UiResult<bool> {
        let mut next = self.settings.clone();

        for (key, value) in properties {
            match key.as_str() {
                "size" => next.size = pair(key, value, 1)?,
                "position" => next.position = pair::<i32>(key, value, i64::from(i32::MIN))?,
                "mode" => next.mode = CanvasMode::from_str(string(key, value)?)?,
                "theme" => next.theme = string(key, value)?.to_string(),
                "title" => next.title = string(key, value)?.to_string(),
                "fps_idle" => next.fps_idle = positive(key, value)?,
                "fps_active" => next.fps_active = positive(key, value)?,
                _ => tracing::trace!(
                    canvas_id = %self.settings.canvas_id,
                    key = %key,
                    "Ignoring unknown canvas property"
                ),
            }
        }

        let changed = next != self.settings;
        self.settings = next;

        tracing::debug!(canvas_id = %self.settings.canvas_id, changed, "Updated canvas properties");
        self.signals().emit(UiSignal::CanvasUpdated {
            canvas_id: self.settings.canvas_id.clone(),
        });
        Ok(changed)
    }

    /// Draw every visible widget into this canvas's region of `ctx`.
    ///
    /// Does nothing while the canvas is inactive. A widget whose render
    /// fails or panics is logged and recorded in the report; the remaining
    /// widgets are still drawn.
    pub fn render(&mut self, ctx: &egui::Context) -> RenderReport {
        profile_function!();

        let mut report = RenderReport::default();
        if !self.settings.active {
            return report;
        }

        let settings = &self.settings;
        let registry = &mut self.registry;
        let region = Id::new(("easel-canvas", settings.canvas_id.as_str()));

        match settings.mode {
            CanvasMode::Fullscreen => {
                egui::CentralPanel::default().show(ctx, |ui| {
                    render_widgets(&settings.canvas_id, registry, ui, &mut report)
                });
            }
            CanvasMode::Overlay => {
                let [x, y] = settings.position;
                egui::Area::new(region)
                    .fixed_pos(egui::pos2(x as f32, y as f32))
                    .show(ctx, |ui| render_widgets(&settings.canvas_id, registry, ui, &mut report));
            }
            CanvasMode::Standard | CanvasMode::Docking | CanvasMode::MultiViewport => {
                let [width, height] = settings.size;
                egui::Window::new(settings.title.as_str())
                    .id(region)
                    .default_size(vec2(width as f32, height as f32))
                    .collapsible(false)
                    .show(ctx, |ui| render_widgets(&settings.canvas_id, registry, ui, &mut report));
            }
        }

        report
    }
}

fn render_widgets(
    canvas_id: &str,
    registry: &mut WidgetRegistry,
    ui: &mut Ui,
    report: &mut RenderReport,
) {
    for widget in registry.iter_mut() {
        if !widget.state().visible {
            report.skipped += 1;
            continue;
        }

        profile_scope!("widget", widget.id());
        let result = panic::catch_unwind(AssertUnwindSafe(|| render_one(widget.as_mut(), ui)));

        let message = match result {
            Ok(Ok(_)) => {
                report.rendered += 1;
                continue;
            }
            Ok(Err(err)) => err.to_string(),
            Err(payload) => panic_message(payload.as_ref()),
        };

        tracing::error!(
            canvas_id,
            widget_id = %widget.id(),
            error = %message,
            "Widget render failed"
        );
        report.faults.push(UiError::RenderFault {
            widget_id: widget.id().to_string(),
            message,
        });
    }
}

fn render_one(widget: &mut dyn Widget, ui: &mut Ui) -> UiResult<RenderOutput> {
    let enabled = widget.state().enabled;
    let position = widget.state().position;
    let size = widget.state().size;

    match position {
        Some([x, y]) => {
            let min = ui.max_rect().min + vec2(x, y);
            let size = size.map_or_else(|| ui.available_size(), |[w, h]| vec2(w, h));
            let rect = Rect::from_min_size(min, size);
            ui.scope_builder(UiBuilder::new().max_rect(rect), |ui| {
                ui.add_enabled_ui(enabled, |ui| widget.render(ui)).inner
            })
            .inner
        }
        None => ui.add_enabled_ui(enabled, |ui| widget.render(ui)).inner,
    }
}

fn string<'a>(key: &str, value: &'a PropertyValue) -> UiResult<&'a str> {
    value
        .as_str()
        .ok_or_else(|| {
            UiError::invalid_property(key, format!("expected a string, got {}", value.type_name()))
        })
}

fn positive(key: &str, value: &PropertyValue) -> UiResult<u32> {
    value
        .as_i64()
        .filter(|v| *v > 0)
        .and_then(|v| u32::try_from(v).ok())
        .ok_or_else(|| UiError::invalid_property(key, "expected a positive integer"))
}

fn pair<T: TryFrom<i64>>(key: &str, value: &PropertyValue, min: i64) -> UiResult<[T; 2]> {
    let invalid = || UiError::invalid_property(key, format!("expected two integers >= {}", min));
    let items = value.as_list().filter(|items| items.len() == 2).ok_or_else(invalid)?;

    let mut out = Vec::with_capacity(2);
    for item in items {
        let number = item.as_i64().filter(|n| *n >= min).ok_or_else(invalid)?;
        out.push(T::try_from(number).map_err(|_| invalid())?);
    }

    let second = out.pop().ok_or_else(invalid)?;
    let first = out.pop().ok_or_else(invalid)?;
    Ok([first, second])
}
