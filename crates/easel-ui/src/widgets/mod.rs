//! Built-in widget variants.
//!
//! Every variant validates its properties at construction, seeds defaults
//! for the keys it understands and mirrors interactive values (`value`,
//! `checked`, `color`) back into its properties while rendering. Clicks fire
//! `on_click`; value changes fire `on_change` with the new value.

mod basic;
mod slider;

pub use basic::{Button, Checkbox, ColorPicker, InputText, Text};
pub use slider::{ProgressBar, SliderFloat, SliderInt};

use crate::error::{UiError, UiResult};
use crate::value::{Properties, PropertyValue};
use crate::widget::WidgetFactory;

/// Register every built-in variant on `factory`.
pub fn register_builtin_widgets(factory: &mut WidgetFactory) {
    factory.register_type::<Button>();
    factory.register_type::<Text>();
    factory.register_type::<InputText>();
    factory.register_type::<Checkbox>();
    factory.register_type::<ColorPicker>();
    factory.register_type::<SliderInt>();
    factory.register_type::<SliderFloat>();
    factory.register_type::<ProgressBar>();
}

/// Insert `default` under `key` unless the caller supplied a value.
fn seed(properties: &mut Properties, key: &str, default: impl Into<PropertyValue>) {
    if !properties.contains_key(key) {
        properties.insert(key.to_string(), default.into());
    }
}

/// Read `key` with `get`; absent is `None`, present with the wrong shape is
/// an error.
fn typed<'a, T>(
    properties: &'a Properties,
    key: &str,
    expected: &str,
    get: impl FnOnce(&'a PropertyValue) -> Option<T>,
) -> UiResult<Option<T>> {
    match properties.get(key) {
        None => Ok(None),
        Some(value) => get(value).map(Some).ok_or_else(|| {
            let message = format!("expected {}, got {}", expected, value.type_name());
            UiError::invalid_property(key, message)
        }),
    }
}

fn string_prop<'a>(properties: &'a Properties, key: &str) -> UiResult<Option<&'a str>> {
    typed(properties, key, "a string", PropertyValue::as_str)
}

fn bool_prop(properties: &Properties, key: &str) -> UiResult<Option<bool>> {
    typed(properties, key, "a boolean", PropertyValue::as_bool)
}

fn f64_prop(properties: &Properties, key: &str) -> UiResult<Option<f64>> {
    typed(properties, key, "a number", PropertyValue::as_f64)
}

fn i64_prop(properties: &Properties, key: &str) -> UiResult<Option<i64>> {
    typed(properties, key, "an integer", PropertyValue::as_i64)
}

fn size_prop(properties: &Properties, key: &str) -> UiResult<Option<[f32; 2]>> {
    typed(properties, key, "a pair of numbers", |value| value.as_f32_array::<2>())
}

/// RGBA in `0.0..=1.0`; an RGB triple gets full alpha.
fn color_prop(properties: &Properties, key: &str) -> UiResult<Option<[f32; 4]>> {
    typed(properties, key, "3 or 4 numbers", color_of)
}

fn color_of(value: &PropertyValue) -> Option<[f32; 4]> {
    if let Some([r, g, b, a]) = value.as_f32_array::<4>() {
        return Some([r, g, b, a]);
    }
    value.as_f32_array::<3>().map(|[r, g, b]| [r, g, b, 1.0])
}

fn to_color32([r, g, b, a]: [f32; 4]) -> egui::Color32 {
    let channel = |c: f32| (c.clamp(0.0, 1.0) * 255.0).round() as u8;
    egui::Color32::from_rgba_unmultiplied(channel(r), channel(g), channel(b), channel(a))
}
