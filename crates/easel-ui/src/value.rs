//! Dynamically-typed widget properties.
//!
//! Widgets accept arbitrary configuration, so their property bag maps string
//! keys to a small tagged union. Variants interpret the values they care
//! about with the typed accessors and reject the rest at construction time.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::{UiError, UiResult};

/// Ordered property bag keyed by property name.
pub type Properties = IndexMap<String, PropertyValue>;

/// A single property value.
///
/// Serializes to plain JSON (no tags). Integers and floats stay distinct so a
/// slider's `i64` bounds survive a JSON round trip.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PropertyValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
    List(Vec<PropertyValue>),
    Map(Properties),
}

impl PropertyValue {
    pub fn type_name(&self) -> &'static str {
        match self {
            PropertyValue::Bool(_) => "bool",
            PropertyValue::Int(_) => "int",
            PropertyValue::Float(_) => "float",
            PropertyValue::String(_) => "string",
            PropertyValue::List(_) => "list",
            PropertyValue::Map(_) => "map",
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            PropertyValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            PropertyValue::Int(i) => Some(*i),
            PropertyValue::Float(f) if f.fract() == 0.0 => Some(*f as i64),
            _ => None,
        }
    }

    /// Numeric view; integers widen to `f64`.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            PropertyValue::Int(i) => Some(*i as f64),
            PropertyValue::Float(f) => Some(*f),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            PropertyValue::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[PropertyValue]> {
        match self {
            PropertyValue::List(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&Properties> {
        match self {
            PropertyValue::Map(map) => Some(map),
            _ => None,
        }
    }

    /// A list of exactly `N` numbers, e.g. a `[w, h]` size or an RGBA color.
    pub fn as_f32_array<const N: usize>(&self) -> Option<[f32; N]> {
        let items = self.as_list()?;
        if items.len() != N {
            return None;
        }
        let mut out = [0.0; N];
        for (slot, item) in out.iter_mut().zip(items) {
            *slot = item.as_f64()? as f32;
        }
        Some(out)
    }

    pub fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or(serde_json::Value::Null)
    }
}

impl TryFrom<serde_json::Value> for PropertyValue {
    type Error = UiError;

    fn try_from(value: serde_json::Value) -> UiResult<Self> {
        if value.is_null() {
            return Err(UiError::InvalidProperty {
                key: String::new(),
                reason: "null is not a property value".to_string(),
            });
        }
        serde_json::from_value(value).map_err(|e| UiError::Serialization(e.to_string()))
    }
}

impl From<bool> for PropertyValue {
    fn from(value: bool) -> Self {
        PropertyValue::Bool(value)
    }
}

impl From<i64> for PropertyValue {
    fn from(value: i64) -> Self {
        PropertyValue::Int(value)
    }
}

impl From<i32> for PropertyValue {
    fn from(value: i32) -> Self {
        PropertyValue::Int(value as i64)
    }
}

impl From<f64> for PropertyValue {
    fn from(value: f64) -> Self {
        PropertyValue::Float(value)
    }
}

impl From<f32> for PropertyValue {
    fn from(value: f32) -> Self {
        PropertyValue::Float(value as f64)
    }
}

impl From<&str> for PropertyValue {
    fn from(value: &str) -> Self {
        PropertyValue::String(value.to_string())
    }
}

impl From<String> for PropertyValue {
    fn from(value: String) -> Self {
        PropertyValue::String(value)
    }
}

impl<T: Into<PropertyValue>> From<Vec<T>> for PropertyValue {
    fn from(items: Vec<T>) -> Self {
        PropertyValue::List(items.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<PropertyValue>, const N: usize> From<[T; N]> for PropertyValue {
    fn from(items: [T; N]) -> Self {
        PropertyValue::List(items.into_iter().map(Into::into).collect())
    }
}

impl From<Properties> for PropertyValue {
    fn from(map: Properties) -> Self {
        PropertyValue::Map(map)
    }
}

/// Build a [`Properties`] bag from `key => value` pairs.
///
/// ```
/// use easel_ui::{properties, PropertyValue};
///
/// let props = properties! { "label" => "Go", "size" => [120.0, 32.0] };
/// assert_eq!(props["label"], PropertyValue::from("Go"));
/// ```
#[macro_export]
macro_rules! properties {
    () => { $crate::Properties::new() };
    ($($key:expr => $value:expr),+ $(,)?) => {{
        let mut props = $crate::Properties::new();
        $( props.insert(::std::string::String::from($key), $crate::PropertyValue::from($value)); )+
        props
    }};
}
