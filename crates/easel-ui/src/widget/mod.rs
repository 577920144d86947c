//! The widget contract.
//!
//! Every concrete widget embeds a [`WidgetCore`] (its [`WidgetState`] plus
//! event handlers) and implements [`Widget::render`]. Everything else the
//! canvas needs (updates, layout mutators, callbacks, serialization) is
//! provided on top of the core.
//!
//! Widgets are created by tag through a [`WidgetFactory`] and owned by the
//! [`WidgetRegistry`] of the canvas they live on.
//!
//! # Example
//!
//! ```
//! use easel_ui::widget::{Widget, WidgetCore, WidgetType, RenderOutput};
//! use easel_ui::{Properties, UiResult};
//!
//! struct Label {
//!     core: WidgetCore,
//! }
//!
//! impl Widget for Label {
//!     fn core(&self) -> &WidgetCore { &self.core }
//!     fn core_mut(&mut self) -> &mut WidgetCore { &mut self.core }
//!
//!     fn render(&mut self, ui: &mut egui::Ui) -> UiResult<RenderOutput> {
//!         ui.label(self.core.str_or("text", ""));
//!         Ok(None)
//!     }
//! }
//!
//! impl WidgetType for Label {
//!     const TYPE: &'static str = "label";
//!
//!     fn construct(widget_id: &str, properties: Properties) -> UiResult<Self> {
//!         Ok(Self { core: WidgetCore::new(Self::TYPE, widget_id, properties)? })
//!     }
//! }
//! ```

mod base;
mod factory;
mod registry;

pub use base::{Callback, WidgetCore};
pub use factory::{WidgetConstructor, WidgetFactory};
pub use registry::WidgetRegistry;

use crate::error::UiResult;
use crate::state::WidgetState;
use crate::value::{Properties, PropertyValue};

/// Variant-specific result of a render call (click flag, new value, ...).
pub type RenderOutput = Option<PropertyValue>;

/// A renderable, stateful UI element.
pub trait Widget: Send {
    fn core(&self) -> &WidgetCore;

    fn core_mut(&mut self) -> &mut WidgetCore;

    /// Draw the widget for this frame.
    ///
    /// Runs on the render thread with the canvas scene locked. Errors and
    /// panics are contained by the canvas: they are logged and the next
    /// widget is rendered.
    fn render(&mut self, ui: &mut egui::Ui) -> UiResult<RenderOutput>;

    /// Hook run after [`Widget::update`] merged new properties.
    ///
    /// Variants that cache interactive values outside the property bag
    /// refresh them here.
    fn on_properties_changed(&mut self) {}

    fn id(&self) -> &str {
        self.core().id()
    }

    fn widget_type(&self) -> &str {
        self.core().widget_type()
    }

    fn state(&self) -> &WidgetState {
        self.core().state()
    }

    /// Merge `properties` into the widget (last write wins per key).
    fn update(&mut self, properties: Properties) {
        self.core_mut().merge(properties);
        self.on_properties_changed();
    }

    fn set_visible(&mut self, visible: bool) {
        self.core_mut().state_mut().visible = visible;
    }

    fn set_enabled(&mut self, enabled: bool) {
        self.core_mut().state_mut().enabled = enabled;
    }

    fn set_position(&mut self, x: f32, y: f32) {
        self.core_mut().state_mut().position = Some([x, y]);
    }

    fn set_size(&mut self, width: f32, height: f32) {
        self.core_mut().state_mut().size = Some([width, height]);
    }

    /// Register `handler` for `event`, replacing any previous handler.
    fn register_callback(&mut self, event: &str, handler_name: &str, handler: Callback) {
        self.core_mut().register_callback(event, handler_name, handler);
    }

    /// Invoke the handler for `event`, if any.
    fn trigger_callback(&mut self, event: &str, args: &[PropertyValue]) -> Option<PropertyValue> {
        self.core_mut().trigger_callback(event, args)
    }

    fn serialize(&self) -> serde_json::Value {
        self.state().to_json()
    }
}

impl std::fmt::Debug for dyn Widget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Widget")
            .field("id", &self.id())
            .field("type", &self.widget_type())
            .finish()
    }
}

/// A widget variant that can be constructed by tag.
pub trait WidgetType: Widget + Sized + 'static {
    /// Tag the variant registers under; also its `widget_type`.
    const TYPE: &'static str;

    /// Build the widget, validating `properties`.
    fn construct(widget_id: &str, properties: Properties) -> UiResult<Self>;
}
