//! JSON export and import of whole canvases.
//!
//! A canvas document is the canvas's [`CanvasState`] serialized as JSON:
//! canvas settings plus every widget state, keyed by widget id in render
//! order. Importing validates the whole document before anything is
//! created, and a canvas whose widgets cannot all be rebuilt is removed
//! again.

use std::fs;
use std::path::Path;
use std::sync::Arc;

use easel_ui::{Canvas, CanvasManager, CanvasState, UiError, UiResult, WidgetFactory};

/// Write `canvas` as a pretty-printed JSON document.
pub fn export_canvas(canvas: &Canvas, path: impl AsRef<Path>) -> UiResult<()> {
    let path = path.as_ref();
    let state = canvas.state();
    let text = serde_json::to_string_pretty(&state)?;
    fs::write(path, text)?;

    tracing::info!(
        canvas_id = %state.canvas_id,
        widgets = state.widgets.len(),
        path = %path.display(),
        "Exported canvas"
    );
    Ok(())
}

pub fn read_document(path: impl AsRef<Path>) -> UiResult<CanvasState> {
    let text = fs::read_to_string(path)?;
    parse_document(&text)
}

pub fn parse_document(text: &str) -> UiResult<CanvasState> {
    Ok(serde_json::from_str(text)?)
}

/// Check a document against the widget types `factory` can build.
pub fn validate_document(state: &CanvasState, factory: &WidgetFactory) -> UiResult<()> {
    if state.canvas_id.trim().is_empty() {
        return Err(invalid("canvas_id", "must not be empty"));
    }
    if state.size.contains(&0) {
        return Err(invalid("size", "width and height must be positive"));
    }

    for (key, widget) in &state.widgets {
        if key != &widget.widget_id {
            return Err(invalid(
                "widgets",
                format!("entry '{}' holds widget '{}'", key, widget.widget_id),
            ));
        }
        if !factory.contains(&widget.widget_type) {
            return Err(UiError::UnknownWidgetType(widget.widget_type.clone()));
        }
    }
    Ok(())
}

/// Create a canvas from `state` and rebuild its widgets.
///
/// The canvas is started only once every widget is in place, and only if
/// the manager's defaults ask for auto-start. On any failure after the
/// canvas was created it is removed again.
pub fn import_canvas(manager: &mut CanvasManager, state: &CanvasState) -> UiResult<Arc<Canvas>> {
    validate_document(state, manager.factory())?;

    let auto_start = manager.defaults().auto_start;
    let descriptor = manager
        .descriptor()
        .with_title(state.title.clone())
        .with_size(state.size[0], state.size[1])
        .with_position(state.position[0], state.position[1])
        .with_mode(state.mode)
        .with_theme(state.theme.clone())
        .with_fps(state.fps_idle, state.fps_active)
        .with_auto_start(false);
    let canvas = manager.create_canvas(&state.canvas_id, descriptor)?;

    let restored = canvas.with_scene(|scene| -> UiResult<()> {
        for widget_state in state.widgets.values() {
            let widget = scene.registry().factory().restore(widget_state)?;
            scene.add_widget(widget)?;
        }
        Ok(())
    });
    let started = restored.and_then(|()| if auto_start { canvas.run_async() } else { Ok(()) });

    if let Err(err) = started {
        tracing::warn!(canvas_id = %state.canvas_id, "Import failed, discarding canvas: {}", err);
        manager.remove_canvas(&state.canvas_id);
        return Err(err);
    }

    tracing::info!(
        canvas_id = %state.canvas_id,
        widgets = state.widgets.len(),
        "Imported canvas"
    );
    Ok(canvas)
}

fn invalid(key: &str, reason: impl Into<String>) -> UiError {
    UiError::InvalidProperty {
        key: key.to_string(),
        reason: reason.into(),
    }
}
