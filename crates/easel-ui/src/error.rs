//! Error types for canvas and widget operations.

use std::fmt;

/// Broad classification of a [`UiError`], used by callers that report
/// failures without matching on every variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    NotFound,
    AlreadyExists,
    UnknownType,
    InvalidInput,
    RenderFault,
    QueuedCommandFault,
    Internal,
}

/// Errors that can occur in canvas, registry and widget operations.
#[derive(Debug, Clone, PartialEq)]
pub enum UiError {
    /// No canvas with this id.
    CanvasNotFound(String),

    /// No widget with this id on the canvas.
    WidgetNotFound(String),

    /// A canvas with this id already exists.
    CanvasExists(String),

    /// A widget with this id is already on the canvas.
    WidgetExists(String),

    /// The factory has no constructor for this type tag.
    UnknownWidgetType(String),

    /// A widget could not be constructed.
    InvalidWidget {
        /// The id the widget was being created with.
        widget_id: String,
        /// Why construction failed.
        reason: String,
    },

    /// A property value has the wrong type or is out of range.
    InvalidProperty {
        /// Property key.
        key: String,
        /// Why the value was rejected.
        reason: String,
    },

    /// A widget failed while rendering.
    RenderFault {
        widget_id: String,
        message: String,
    },

    /// A queued command failed on the render thread.
    CommandFault(String),

    /// The render thread could not be started.
    ThreadSpawn(String),

    /// The frame runner failed or panicked.
    Runner(String),

    /// JSON encoding or decoding failed.
    Serialization(String),

    /// Generic IO error.
    Io(String),
}

impl UiError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            UiError::CanvasNotFound(_) | UiError::WidgetNotFound(_) => ErrorKind::NotFound,
            UiError::CanvasExists(_) | UiError::WidgetExists(_) => ErrorKind::AlreadyExists,
            UiError::UnknownWidgetType(_) => ErrorKind::UnknownType,
            UiError::InvalidWidget { .. } | UiError::InvalidProperty { .. } => {
                ErrorKind::InvalidInput
            }
            UiError::RenderFault { .. } => ErrorKind::RenderFault,
            UiError::CommandFault(_) => ErrorKind::QueuedCommandFault,
            UiError::ThreadSpawn(_)
            | UiError::Runner(_)
            | UiError::Serialization(_)
            | UiError::Io(_) => {
                ErrorKind::Internal
            }
        }
    }

    pub(crate) fn invalid_property(key: &str, reason: impl Into<String>) -> Self {
        UiError::InvalidProperty {
            key: key.to_string(),
            reason: reason.into(),
        }
    }
}

impl fmt::Display for UiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UiError::CanvasNotFound(id) => write!(f, "Canvas {} not found", id),
            UiError::WidgetNotFound(id) => write!(f, "Widget {} not found", id),
            UiError::CanvasExists(id) => write!(f, "Canvas {} already exists", id),
            UiError::WidgetExists(id) => write!(f, "Widget {} already exists", id),
            UiError::UnknownWidgetType(tag) => write!(f, "Unknown widget type: {}", tag),
            UiError::InvalidWidget { widget_id, reason } => {
                write!(f, "Invalid widget '{}': {}", widget_id, reason)
            }
            UiError::InvalidProperty { key, reason } => {
                write!(f, "Invalid property '{}': {}", key, reason)
            }
            UiError::RenderFault { widget_id, message } => {
                write!(f, "Error rendering widget {}: {}", widget_id, message)
            }
            UiError::CommandFault(msg) => write!(f, "Queued command failed: {}", msg),
            UiError::ThreadSpawn(msg) => write!(f, "Failed to spawn render thread: {}", msg),
            UiError::Runner(msg) => write!(f, "Render loop error: {}", msg),
            UiError::Serialization(msg) => write!(f, "Serialization error: {}", msg),
            UiError::Io(msg) => write!(f, "IO error: {}", msg),
        }
    }
}

impl std::error::Error for UiError {}

impl From<std::io::Error> for UiError {
    fn from(err: std::io::Error) -> Self {
        UiError::Io(err.to_string())
    }
}

impl From<easel_egui::RunnerError> for UiError {
    fn from(err: easel_egui::RunnerError) -> Self {
        UiError::Runner(err.to_string())
    }
}

impl From<serde_json::Error> for UiError {
    fn from(err: serde_json::Error) -> Self {
        UiError::Serialization(err.to_string())
    }
}

/// Result type for UI operations.
pub type UiResult<T> = Result<T, UiError>;
