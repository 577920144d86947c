//! Easel - retained widget trees over egui
//!
//! Easel keeps a UI as plain data: canvases hold widgets, widgets hold
//! their state, and each canvas redraws its widgets every frame on its own
//! render thread. Any thread may create, update or remove widgets while a
//! canvas is running.
//!
//! - **Canvases**: one render thread each, with a command queue drained at
//!   the top of every frame
//! - **Widgets**: built by type tag through a factory, rendered in insertion
//!   order, with per-widget fault isolation
//! - **Persistence**: whole canvases export to and import from JSON
//!
//! # Quick Start
//!
//! ```no_run
//! use easel::{AppContext, Config, WidgetSpec, properties};
//!
//! fn main() {
//!     let config = Config::default();
//!     easel::init(&config);
//!
//!     let mut app = AppContext::new(config);
//!     app.create_canvas("main", app.descriptor().with_title("Demo")).unwrap();
//!     app.add_widget(
//!         "main",
//!         WidgetSpec::new("slider_float", "volume")
//!             .with_properties(properties! { "label" => "Volume", "value" => 0.5 }),
//!     )
//!     .unwrap();
//!
//!     let state = app.canvas_state("main").unwrap();
//!     assert_eq!(state.widgets.len(), 1);
//!     app.shutdown();
//! }
//! ```
//!
//! # Architecture
//!
//! - `easel-core` - logging, profiling, configuration
//! - `easel-egui` - the frame runner that drives `egui::Context`
//! - `easel-ui` - widgets, canvases and the canvas manager
//! - `easel` - this crate: [`AppContext`], [`ToolResponse`] and persistence

pub mod context;
pub mod persist;
pub mod response;

pub use easel_core as core;
pub use easel_egui as runner;
pub use easel_ui as ui;

pub use easel_core::{CanvasDefaults, Config, ProfilingMode, init};
pub use easel_egui::{EguiRunner, FrameRunner, RunnerFactory, RunnerParams};
pub use easel_ui::{
    Canvas, CanvasDescriptor, CanvasManager, CanvasMode, CanvasState, ErrorKind, Properties,
    PropertyValue, SignalBus, UiError, UiResult, UiSignal, Widget, WidgetCore, WidgetFactory,
    WidgetState, properties,
};

pub use context::{AppContext, WidgetSpec};
pub use response::ToolResponse;
