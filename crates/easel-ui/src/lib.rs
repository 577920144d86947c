//! Easel UI - retained widget trees rendered through egui
//!
//! This crate keeps a persistent, serializable model of widgets on top of
//! egui's immediate-mode API:
//! - Dynamically typed widget properties (`PropertyValue`)
//! - A `Widget` trait with a tag-based `WidgetFactory`
//! - Per-canvas `WidgetRegistry` with JSON-safe state export
//! - Canvases with their own render thread and a cross-thread command queue
//! - Typed change notifications through a `SignalBus`
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use easel_egui::EguiRunner;
//! use easel_ui::{properties, register_builtin_widgets, CanvasManager};
//! use easel_core::CanvasDefaults;
//!
//! let mut manager = CanvasManager::new(EguiRunner::factory(), CanvasDefaults::default());
//! register_builtin_widgets(manager.factory_mut());
//!
//! let canvas = manager
//!     .create_canvas("main", manager.descriptor().with_title("Demo"))
//!     .unwrap();
//! canvas.create_widget("button", "go", properties! { "label" => "Go" }).unwrap();
//!
//! // From any thread, deferred to the render thread:
//! canvas.queue_command(|scene| scene.update_widget("go", properties! { "label" => "Stop" }));
//! ```

pub mod canvas;
pub mod command;
pub mod error;
pub mod manager;
pub mod scene;
pub mod signal;
pub mod state;
pub mod value;
pub mod widget;
pub mod widgets;

pub use canvas::{Canvas, CanvasDescriptor, CanvasStatus};
pub use command::{Command, CommandQueue, DrainReport};
pub use error::{ErrorKind, UiError, UiResult};
pub use manager::CanvasManager;
pub use scene::{CanvasScene, RenderReport};
pub use signal::{ListenerId, SignalBus, UiSignal};
pub use state::{CanvasMode, CanvasSettings, CanvasState, WidgetState};
pub use value::{Properties, PropertyValue};
pub use widget::{
    Callback, RenderOutput, Widget, WidgetConstructor, WidgetCore, WidgetFactory, WidgetRegistry,
    WidgetType,
};
pub use widgets::register_builtin_widgets;
