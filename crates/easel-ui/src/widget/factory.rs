use std::sync::Arc;

use easel_core::alloc::HashMap;
use easel_core::profiling::profile_function;

use super::{Widget, WidgetType};
use crate::error::{UiError, UiResult};
use crate::signal::{SignalBus, UiSignal};
use crate::state::WidgetState;
use crate::value::Properties;

/// Builds a widget from its id and initial properties.
pub type WidgetConstructor =
    Arc<dyn Fn(&str, Properties) -> UiResult<Box<dyn Widget>> + Send + Sync>;

/// Tag-to-constructor table used to create widgets by name.
///
/// The factory also hands every widget it creates the signal bus, so
/// created widgets report their updates.
#[derive(Clone, Default)]
pub struct WidgetFactory {
    constructors: HashMap<String, WidgetConstructor>,
    signals: SignalBus,
}

impl WidgetFactory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_signals(signals: SignalBus) -> Self {
        Self {
            constructors: HashMap::new(),
            signals,
        }
    }

    pub fn signals(&self) -> &SignalBus {
        &self.signals
    }

    pub fn set_signals(&mut self, signals: SignalBus) {
        self.signals = signals;
    }

    /// Register `constructor` under `widget_type`. Re-registering a tag
    /// replaces the previous constructor.
    pub fn register<F>(&mut self, widget_type: impl Into<String>, constructor: F)
    where
        F: Fn(&str, Properties) -> UiResult<Box<dyn Widget>> + Send + Sync + 'static,
    {
        let widget_type = widget_type.into();
        if self
            .constructors
            .insert(widget_type.clone(), Arc::new(constructor))
            .is_some()
        {
            tracing::debug!(widget_type = %widget_type, "Replaced widget constructor");
        }
    }

    /// Register a [`WidgetType`] under its own tag.
    pub fn register_type<W: WidgetType>(&mut self) {
        self.register(W::TYPE, |widget_id, properties| {
            Ok(Box::new(W::construct(widget_id, properties)?) as Box<dyn Widget>)
        });
    }

    pub fn contains(&self, widget_type: &str) -> bool {
        self.constructors.contains_key(widget_type)
    }

    /// Registered tags, sorted.
    pub fn list_types(&self) -> Vec<String> {
        let mut types: Vec<String> = self.constructors.keys().cloned().collect();
        types.sort();
        types
    }

    pub fn len(&self) -> usize {
        self.constructors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.constructors.is_empty()
    }

    /// Create a widget of `widget_type`.
    ///
    /// The widget's state records `widget_type` as its type, whatever tag
    /// its constructor used, so the state can be fed back to
    /// [`WidgetFactory::restore`]. Emits [`UiSignal::WidgetCreated`] on
    /// success.
    pub fn create(
        &self,
        widget_type: &str,
        widget_id: &str,
        properties: Properties,
    ) -> UiResult<Box<dyn Widget>> {
        profile_function!();

        let constructor = self
            .constructors
            .get(widget_type)
            .ok_or_else(|| UiError::UnknownWidgetType(widget_type.to_string()))?;

        let mut widget = constructor(widget_id, properties)?;
        let state = widget.core_mut().state_mut();
        if state.widget_type != widget_type {
            tracing::trace!(
                widget_id,
                widget_type,
                constructed_as = %state.widget_type,
                "Tagging widget with its registered type"
            );
            state.widget_type = widget_type.to_string();
        }
        widget.core_mut().attach_signals(self.signals.clone());

        tracing::debug!(widget_id, widget_type, "Created widget");
        self.signals.emit(UiSignal::WidgetCreated {
            widget_id: widget_id.to_string(),
            widget_type: widget_type.to_string(),
        });

        Ok(widget)
    }

    /// Rebuild a widget from a serialized [`WidgetState`].
    ///
    /// Layout, flags, hierarchy and data bindings are restored. Callback
    /// handlers are not, since only their names were serialized.
    pub fn restore(&self, state: &WidgetState) -> UiResult<Box<dyn Widget>> {
        let mut widget =
            self.create(&state.widget_type, &state.widget_id, state.properties.clone())?;

        let restored = widget.core_mut().state_mut();
        restored.visible = state.visible;
        restored.enabled = state.enabled;
        restored.position = state.position;
        restored.size = state.size;
        restored.parent = state.parent.clone();
        restored.children = state.children.clone();
        restored.data_bindings = state.data_bindings.clone();

        if !state.callbacks.is_empty() {
            tracing::debug!(
                widget_id = %state.widget_id,
                callbacks = state.callbacks.len(),
                "Callback handlers are not restored"
            );
        }

        Ok(widget)
    }
}

impl std::fmt::Debug for WidgetFactory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WidgetFactory")
            .field("types", &self.list_types())
            .finish()
    }
}
