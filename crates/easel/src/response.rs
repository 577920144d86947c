//! Uniform success/failure envelope for callers that speak JSON.

use easel_ui::{ErrorKind, UiError, UiResult};
use serde::Serialize;
use serde_json::Value;

/// `{ "success": true, "data": ... }` or
/// `{ "success": false, "error": ..., "kind": ... }`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ToolResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Error classification, e.g. `"not_found"`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kind: Option<&'static str>,
}

impl ToolResponse {
    pub fn ok(data: impl Into<Value>) -> Self {
        Self {
            success: true,
            data: Some(data.into()),
            error: None,
            kind: None,
        }
    }

    pub fn err(error: &UiError) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(error.to_string()),
            kind: Some(kind_name(error.kind())),
        }
    }

    /// Wrap any operation result. `Ok(())` becomes `"data": null`.
    pub fn from_result<T: Serialize>(result: UiResult<T>) -> Self {
        match result.and_then(|value| serde_json::to_value(value).map_err(UiError::from)) {
            Ok(data) => Self::ok(data),
            Err(error) => Self::err(&error),
        }
    }

    pub fn to_json(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }
}

fn kind_name(kind: ErrorKind) -> &'static str {
    match kind {
        ErrorKind::NotFound => "not_found",
        ErrorKind::AlreadyExists => "already_exists",
        ErrorKind::UnknownType => "unknown_type",
        ErrorKind::InvalidInput => "invalid_input",
        ErrorKind::RenderFault => "render_fault",
        ErrorKind::QueuedCommandFault => "queued_command_fault",
        ErrorKind::Internal => "internal",
    }
}
