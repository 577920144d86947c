use easel_core::alloc::HashMap;

use crate::error::{UiError, UiResult};
use crate::signal::{SignalBus, UiSignal};
use crate::state::WidgetState;
use crate::value::{Properties, PropertyValue};

/// Event handler attached to a widget.
pub type Callback = Box<dyn FnMut(&[PropertyValue]) -> Option<PropertyValue> + Send>;

/// Identity, state and event hooks shared by every widget variant.
pub struct WidgetCore {
    state: WidgetState,
    callbacks: HashMap<String, Callback>,
    signals: Option<SignalBus>,
}

impl WidgetCore {
    /// Create the core for a widget of `widget_type`.
    ///
    /// Fails if `widget_id` is empty or only whitespace.
    pub fn new(widget_type: &str, widget_id: &str, properties: Properties) -> UiResult<Self> {
        if widget_id.trim().is_empty() {
            return Err(UiError::InvalidWidget {
                widget_id: widget_id.to_string(),
                reason: "widget id must not be empty".to_string(),
            });
        }

        Ok(Self {
            state: WidgetState::new(widget_id, widget_type).with_properties(properties),
            callbacks: HashMap::new(),
            signals: None,
        })
    }

    pub fn id(&self) -> &str {
        &self.state.widget_id
    }

    pub fn widget_type(&self) -> &str {
        &self.state.widget_type
    }

    pub fn state(&self) -> &WidgetState {
        &self.state
    }

    /// Id and type stay immutable, so this is crate-private.
    pub(crate) fn state_mut(&mut self) -> &mut WidgetState {
        &mut self.state
    }

    pub fn properties(&self) -> &Properties {
        &self.state.properties
    }

    pub fn property(&self, key: &str) -> Option<&PropertyValue> {
        self.state.properties.get(key)
    }

    pub fn str_or<'a>(&'a self, key: &str, default: &'a str) -> &'a str {
        self.property(key).and_then(PropertyValue::as_str).unwrap_or(default)
    }

    pub fn bool_or(&self, key: &str, default: bool) -> bool {
        self.property(key).and_then(PropertyValue::as_bool).unwrap_or(default)
    }

    pub fn f64_or(&self, key: &str, default: f64) -> f64 {
        self.property(key).and_then(PropertyValue::as_f64).unwrap_or(default)
    }

    /// Write one property without emitting an update signal.
    ///
    /// Used by variants mirroring an interactive value back into their
    /// properties during render.
    pub fn set_property(&mut self, key: &str, value: impl Into<PropertyValue>) {
        self.state.properties.insert(key.to_string(), value.into());
    }

    /// Merge `properties` and emit [`UiSignal::WidgetUpdated`].
    pub fn merge(&mut self, properties: Properties) {
        if properties.is_empty() {
            return;
        }

        tracing::debug!(
            widget_id = %self.state.widget_id,
            keys = ?properties.keys().collect::<Vec<_>>(),
            "Updated widget"
        );

        for (key, value) in &properties {
            self.state.properties.insert(key.clone(), value.clone());
        }

        if let Some(signals) = &self.signals {
            signals.emit(UiSignal::WidgetUpdated {
                widget_id: self.state.widget_id.clone(),
                changed: properties,
            });
        }
    }

    /// Route this widget's notifications to `signals`.
    pub fn attach_signals(&mut self, signals: SignalBus) {
        self.signals = Some(signals);
    }

    pub fn has_signals(&self) -> bool {
        self.signals.is_some()
    }

    pub fn register_callback(&mut self, event: &str, handler_name: &str, handler: Callback) {
        self.callbacks.insert(event.to_string(), handler);
        self.state
            .callbacks
            .insert(event.to_string(), handler_name.to_string());
    }

    pub fn has_callback(&self, event: &str) -> bool {
        self.callbacks.contains_key(event)
    }

    pub fn trigger_callback(
        &mut self,
        event: &str,
        args: &[PropertyValue],
    ) -> Option<PropertyValue> {
        let handler = self.callbacks.get_mut(event)?;
        tracing::trace!(widget_id = %self.state.widget_id, event, "Triggering callback");
        handler(args)
    }
}

impl std::fmt::Debug for WidgetCore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WidgetCore")
            .field("state", &self.state)
            .field("callbacks", &self.callbacks.keys().collect::<Vec<_>>())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::properties;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicBool, Ordering};

    #[test]
    fn test_empty_id_rejected() {
        let err = WidgetCore::new("button", "  ", Properties::new()).unwrap_err();
        assert!(matches!(err, UiError::InvalidWidget { .. }));
    }

    #[test]
    fn test_merge_is_last_write_wins() {
        let mut core =
            WidgetCore::new("button", "b1", properties! { "label" => "A", "x" => 1 }).unwrap();
        core.merge(properties! { "label" => "B", "y" => true });

        assert_eq!(core.str_or("label", ""), "B");
        assert_eq!(core.property("x"), Some(&PropertyValue::Int(1)));
        assert!(core.bool_or("y", false));
    }

    #[test]
    fn test_merge_emits_changed_keys_only() {
        let bus = SignalBus::new();
        let rx = bus.subscribe();
        let mut core = WidgetCore::new("button", "b1", properties! { "label" => "A" }).unwrap();
        core.attach_signals(bus);

        core.merge(properties! { "label" => "B" });
        core.merge(Properties::new());

        let signals: Vec<_> = rx.try_iter().collect();
        assert_eq!(
            signals,
            vec![UiSignal::WidgetUpdated {
                widget_id: "b1".into(),
                changed: properties! { "label" => "B" },
            }]
        );
    }

    #[test]
    fn test_callbacks() {
        let mut core = WidgetCore::new("button", "b1", Properties::new()).unwrap();
        assert_eq!(core.trigger_callback("on_click", &[]), None);

        let fired = Arc::new(AtomicBool::new(false));
        let flag = fired.clone();
        core.register_callback(
            "on_click",
            "mark_clicked",
            Box::new(move |_| {
                flag.store(true, Ordering::SeqCst);
                Some(PropertyValue::Bool(true))
            }),
        );

        assert_eq!(
            core.trigger_callback("on_click", &[]),
            Some(PropertyValue::Bool(true))
        );
        assert!(fired.load(Ordering::SeqCst));
        assert_eq!(core.state().callbacks["on_click"], "mark_clicked");
    }

    #[test]
    fn test_last_callback_registration_wins() {
        let mut core = WidgetCore::new("button", "b1", Properties::new()).unwrap();
        core.register_callback("on_click", "first", Box::new(|_| Some(1.into())));
        core.register_callback("on_click", "second", Box::new(|_| Some(2.into())));

        assert_eq!(core.trigger_callback("on_click", &[]), Some(PropertyValue::Int(2)));
        assert_eq!(core.state().callbacks["on_click"], "second");
    }
}
