//! Widgets and fixtures shared by the integration tests.

#![allow(dead_code)]

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use easel_core::CanvasDefaults;
use easel_test_utils::{MockRunner, RunnerLog};
use easel_ui::{
    Canvas, CanvasDescriptor, CanvasManager, Properties, RenderOutput, UiResult, Widget,
    WidgetCore, WidgetFactory, register_builtin_widgets,
};

/// Upper bound for any wait on a render thread.
pub const WAIT: Duration = Duration::from_secs(5);

pub const FRAME_DELAY: Duration = Duration::from_millis(2);

/// Panics on every render.
pub struct Crash {
    core: WidgetCore,
}

impl Crash {
    pub fn boxed(widget_id: &str, properties: Properties) -> UiResult<Box<dyn Widget>> {
        Ok(Box::new(Self {
            core: WidgetCore::new("crash", widget_id, properties)?,
        }))
    }
}

impl Widget for Crash {
    fn core(&self) -> &WidgetCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut WidgetCore {
        &mut self.core
    }

    fn render(&mut self, _ui: &mut egui::Ui) -> UiResult<RenderOutput> {
        panic!("crash widget always fails");
    }
}

/// Counts its renders.
pub struct Probe {
    core: WidgetCore,
    renders: Arc<AtomicUsize>,
}

impl Probe {
    pub fn new(widget_id: &str, renders: Arc<AtomicUsize>) -> Box<dyn Widget> {
        Box::new(Self {
            core: WidgetCore::new("probe", widget_id, Properties::new()).unwrap(),
            renders,
        })
    }
}

impl Widget for Probe {
    fn core(&self) -> &WidgetCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut WidgetCore {
        &mut self.core
    }

    fn render(&mut self, ui: &mut egui::Ui) -> UiResult<RenderOutput> {
        self.renders.fetch_add(1, Ordering::SeqCst);
        ui.label("probe");
        Ok(None)
    }
}

pub fn factory() -> WidgetFactory {
    let mut factory = WidgetFactory::new();
    register_builtin_widgets(&mut factory);
    factory.register("crash", Crash::boxed);
    factory
}

pub fn descriptor() -> CanvasDescriptor {
    CanvasDescriptor::default()
        .with_title("T")
        .with_size(800, 600)
        .with_auto_start(false)
}

pub fn canvas(canvas_id: &str, log: &RunnerLog) -> Arc<Canvas> {
    Arc::new(
        Canvas::new(
            canvas_id,
            &descriptor(),
            factory(),
            MockRunner::factory(log.clone(), FRAME_DELAY),
        )
        .unwrap(),
    )
}

pub fn manager(log: &RunnerLog) -> CanvasManager {
    CanvasManager::with_factory(
        factory(),
        MockRunner::factory(log.clone(), FRAME_DELAY),
        CanvasDefaults::default(),
    )
}
