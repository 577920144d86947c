//! Ownership of every canvas in the process.

use std::sync::Arc;

use easel_core::config::CanvasDefaults;
use easel_egui::RunnerFactory;
use indexmap::IndexMap;

use crate::canvas::{Canvas, CanvasDescriptor};
use crate::error::{UiError, UiResult};
use crate::scene::RenderReport;
use crate::signal::{SignalBus, UiSignal};
use crate::widget::WidgetFactory;

/// Creates, tracks and tears down canvases.
///
/// Canvases are kept in creation order. At most one canvas is *active*:
/// the first one created, or whichever was picked last through
/// [`CanvasManager::set_active_canvas`].
pub struct CanvasManager {
    canvases: IndexMap<String, Arc<Canvas>>,
    active: Option<String>,
    /// Every new canvas gets a clone of this factory.
    factory: WidgetFactory,
    runner_factory: RunnerFactory,
    defaults: CanvasDefaults,
}

impl CanvasManager {
    pub fn new(runner_factory: RunnerFactory, defaults: CanvasDefaults) -> Self {
        Self::with_factory(WidgetFactory::new(), runner_factory, defaults)
    }

    pub fn with_factory(
        factory: WidgetFactory,
        runner_factory: RunnerFactory,
        defaults: CanvasDefaults,
    ) -> Self {
        tracing::info!("Initialized canvas manager");
        Self {
            canvases: IndexMap::new(),
            active: None,
            factory,
            runner_factory,
            defaults,
        }
    }

    /// The prototype factory cloned into canvases created from now on.
    pub fn factory(&self) -> &WidgetFactory {
        &self.factory
    }

    pub fn factory_mut(&mut self) -> &mut WidgetFactory {
        &mut self.factory
    }

    pub fn signals(&self) -> &SignalBus {
        self.factory.signals()
    }

    pub fn defaults(&self) -> &CanvasDefaults {
        &self.defaults
    }

    /// A descriptor seeded from this manager's defaults.
    pub fn descriptor(&self) -> CanvasDescriptor {
        CanvasDescriptor::from_defaults(&self.defaults)
    }

    /// Create a canvas and, unless `descriptor.auto_start` is off, start it.
    ///
    /// Fails with [`UiError::CanvasExists`] if the id is taken; the existing
    /// canvas is left untouched. A canvas that fails to start is discarded.
    pub fn create_canvas(
        &mut self,
        canvas_id: &str,
        descriptor: CanvasDescriptor,
    ) -> UiResult<Arc<Canvas>> {
        if self.canvases.contains_key(canvas_id) {
            return Err(UiError::CanvasExists(canvas_id.to_string()));
        }

        let canvas = Arc::new(Canvas::new(
            canvas_id,
            &descriptor,
            self.factory.clone(),
            self.runner_factory.clone(),
        )?);
        if descriptor.auto_start {
            canvas.run_async()?;
        }

        self.canvases.insert(canvas_id.to_string(), canvas.clone());
        if self.active.is_none() {
            self.active = Some(canvas_id.to_string());
        }

        tracing::info!(canvas_id, auto_start = descriptor.auto_start, "Created canvas");
        self.signals().emit(UiSignal::CanvasCreated {
            canvas_id: canvas_id.to_string(),
        });
        Ok(canvas)
    }

    pub fn get_canvas(&self, canvas_id: &str) -> Option<Arc<Canvas>> {
        self.canvases.get(canvas_id).cloned()
    }

    /// Like [`CanvasManager::get_canvas`], failing with
    /// [`UiError::CanvasNotFound`].
    pub fn canvas(&self, canvas_id: &str) -> UiResult<Arc<Canvas>> {
        self.get_canvas(canvas_id)
            .ok_or_else(|| UiError::CanvasNotFound(canvas_id.to_string()))
    }

    pub fn contains(&self, canvas_id: &str) -> bool {
        self.canvases.contains_key(canvas_id)
    }

    /// Canvas ids in creation order.
    pub fn list_canvases(&self) -> Vec<String> {
        self.canvases.keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.canvases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.canvases.is_empty()
    }

    pub fn active_canvas_id(&self) -> Option<&str> {
        self.active.as_deref()
    }

    pub fn get_active_canvas(&self) -> Option<Arc<Canvas>> {
        self.active.as_deref().and_then(|id| self.get_canvas(id))
    }

    /// Make `canvas_id` the active canvas. Returns `false` for an unknown id.
    pub fn set_active_canvas(&mut self, canvas_id: &str) -> bool {
        if !self.canvases.contains_key(canvas_id) {
            return false;
        }
        self.active = Some(canvas_id.to_string());
        true
    }

    /// Stop and forget a canvas. Returns `false` for an unknown id.
    ///
    /// If it was the active canvas, the oldest remaining canvas becomes
    /// active.
    pub fn remove_canvas(&mut self, canvas_id: &str) -> bool {
        let Some(canvas) = self.canvases.shift_remove(canvas_id) else {
            return false;
        };
        canvas.stop();

        if self.active.as_deref() == Some(canvas_id) {
            self.active = self.canvases.keys().next().cloned();
        }

        tracing::info!(canvas_id, active = ?self.active, "Removed canvas");
        self.signals().emit(UiSignal::CanvasRemoved {
            canvas_id: canvas_id.to_string(),
        });
        true
    }

    /// Start a canvas unless it is already running.
    ///
    /// Returns `Ok(false)` only if the id is unknown.
    pub fn ensure_canvas_running(&self, canvas_id: &str) -> UiResult<bool> {
        let Some(canvas) = self.canvases.get(canvas_id) else {
            return Ok(false);
        };
        if !canvas.is_running() {
            canvas.run_async()?;
        }
        Ok(true)
    }

    /// Draw every active canvas into `ctx`, in creation order.
    ///
    /// For hosts that own the egui context. Returns one report per canvas
    /// drawn; inactive canvases are skipped.
    pub fn render_all(&self, ctx: &egui::Context) -> Vec<(String, RenderReport)> {
        self.canvases
            .iter()
            .filter(|(_, canvas)| canvas.is_active())
            .map(|(canvas_id, canvas)| (canvas_id.clone(), canvas.render(ctx)))
            .collect()
    }

    /// Stop every running canvas and wait for their render threads.
    ///
    /// All canvases are signalled before any is joined, so the waits overlap.
    pub fn stop_all(&self) {
        let mut stopping = 0;
        for canvas in self.canvases.values() {
            if canvas.signal_stop() {
                stopping += 1;
            }
        }

        if stopping > 0 {
            tracing::info!(count = stopping, "Stopping all canvases");
        }
        for canvas in self.canvases.values() {
            canvas.stop();
        }
    }
}

impl Drop for CanvasManager {
    fn drop(&mut self) {
        self.stop_all();
    }
}

impl std::fmt::Debug for CanvasManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CanvasManager")
            .field("canvases", &self.list_canvases())
            .field("active", &self.active)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use easel_egui::EguiRunner;

    fn manager() -> CanvasManager {
        CanvasManager::new(EguiRunner::factory(), CanvasDefaults::default())
    }

    fn stopped(manager: &CanvasManager) -> CanvasDescriptor {
        manager.descriptor().with_auto_start(false)
    }

    #[test]
    fn test_first_canvas_becomes_active() {
        let mut manager = manager();
        manager.create_canvas("a", stopped(&manager)).unwrap();
        manager.create_canvas("b", stopped(&manager)).unwrap();

        assert_eq!(manager.active_canvas_id(), Some("a"));
        assert_eq!(manager.list_canvases(), vec!["a".to_string(), "b".to_string()]);
    }

    #[test]
    fn test_set_active_unknown_fails() {
        let mut manager = manager();
        manager.create_canvas("a", stopped(&manager)).unwrap();

        assert!(!manager.set_active_canvas("zzz"));
        assert_eq!(manager.active_canvas_id(), Some("a"));
    }

    #[test]
    fn test_remove_reassigns_active() {
        let mut manager = manager();
        for id in ["a", "b", "c"] {
            manager.create_canvas(id, stopped(&manager)).unwrap();
        }
        assert!(manager.set_active_canvas("b"));

        assert!(manager.remove_canvas("b"));
        assert_eq!(manager.active_canvas_id(), Some("a"));
        assert!(!manager.remove_canvas("b"));
    }

    #[test]
    fn test_new_canvas_after_emptying_becomes_active() {
        let mut manager = manager();
        manager.create_canvas("a", stopped(&manager)).unwrap();
        manager.remove_canvas("a");
        assert!(manager.get_active_canvas().is_none());

        manager.create_canvas("b", stopped(&manager)).unwrap();
        assert_eq!(manager.active_canvas_id(), Some("b"));
    }

    #[test]
    fn test_ensure_unknown_canvas() {
        let manager = manager();
        assert_eq!(manager.ensure_canvas_running("nope"), Ok(false));
    }

    #[test]
    fn test_lifecycle_signals() {
        let mut manager = manager();
        let rx = manager.signals().subscribe();
        manager.create_canvas("a", stopped(&manager)).unwrap();
        manager.remove_canvas("a");

        let signals: Vec<_> = rx.try_iter().collect();
        assert_eq!(
            signals,
            vec![
                UiSignal::CanvasCreated { canvas_id: "a".into() },
                UiSignal::CanvasRemoved { canvas_id: "a".into() },
            ]
        );
    }
}
