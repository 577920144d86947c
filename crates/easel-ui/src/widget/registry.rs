use indexmap::IndexMap;
use indexmap::map::ValuesMut;

use super::{Widget, WidgetFactory};
use crate::state::WidgetState;

/// Widgets of one canvas, keyed by id, in insertion order.
///
/// The registry is the single owner of its widgets; every widget is stored
/// under its own id.
#[derive(Debug, Default)]
pub struct WidgetRegistry {
    widgets: IndexMap<String, Box<dyn Widget>>,
    factory: WidgetFactory,
}

impl WidgetRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_factory(factory: WidgetFactory) -> Self {
        Self {
            widgets: IndexMap::new(),
            factory,
        }
    }

    pub fn factory(&self) -> &WidgetFactory {
        &self.factory
    }

    pub fn factory_mut(&mut self) -> &mut WidgetFactory {
        &mut self.factory
    }

    /// Add `widget` under its id.
    ///
    /// An existing widget with the same id is replaced and returned.
    pub fn add(&mut self, widget: Box<dyn Widget>) -> Option<Box<dyn Widget>> {
        let id = widget.id().to_string();
        let displaced = self.widgets.insert(id.clone(), widget);
        if displaced.is_some() {
            tracing::warn!(widget_id = %id, "Replaced existing widget with the same id");
        }
        displaced
    }

    pub fn get(&self, widget_id: &str) -> Option<&dyn Widget> {
        self.widgets.get(widget_id).map(|widget| widget.as_ref())
    }

    pub fn get_mut(&mut self, widget_id: &str) -> Option<&mut dyn Widget> {
        match self.widgets.get_mut(widget_id) {
            Some(widget) => Some(widget.as_mut()),
            None => None,
        }
    }

    pub fn contains(&self, widget_id: &str) -> bool {
        self.widgets.contains_key(widget_id)
    }

    /// Remove a widget. Returns `false` if no widget had that id.
    pub fn remove(&mut self, widget_id: &str) -> bool {
        self.take(widget_id).is_some()
    }

    /// Remove and return a widget, keeping the order of the rest.
    pub fn take(&mut self, widget_id: &str) -> Option<Box<dyn Widget>> {
        self.widgets.shift_remove(widget_id)
    }

    /// A fresh id-to-widget view; mutating it never touches the registry.
    pub fn get_all(&self) -> IndexMap<&str, &dyn Widget> {
        self.widgets
            .iter()
            .map(|(id, widget)| (id.as_str(), widget.as_ref()))
            .collect()
    }

    pub fn ids(&self) -> Vec<String> {
        self.widgets.keys().cloned().collect()
    }

    /// Snapshot of every widget state.
    pub fn states(&self) -> IndexMap<String, WidgetState> {
        self.widgets
            .iter()
            .map(|(id, widget)| (id.clone(), widget.state().clone()))
            .collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &dyn Widget> {
        self.widgets.values().map(|widget| widget.as_ref())
    }

    pub fn iter_mut(&mut self) -> ValuesMut<'_, String, Box<dyn Widget>> {
        self.widgets.values_mut()
    }

    pub fn len(&self) -> usize {
        self.widgets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.widgets.is_empty()
    }

    /// Remove every widget, returning the removed ids in order.
    pub fn clear(&mut self) -> Vec<String> {
        self.widgets.drain(..).map(|(id, _)| id).collect()
    }
}
