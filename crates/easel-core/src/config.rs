//! Configuration for the Easel toolkit.

use std::time::Duration;

/// Top-level configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// `tracing` filter directive used when `RUST_LOG` is unset.
    pub log_filter: String,
    pub profiling: ProfilingMode,
    /// Defaults applied to every newly created canvas.
    pub canvas: CanvasDefaults,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            log_filter: crate::logging::DEFAULT_FILTER.to_string(),
            profiling: ProfilingMode::Off,
            canvas: CanvasDefaults::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProfilingMode {
    /// Profiling is disabled
    Off,
    /// Scopes are recorded in-process
    On,
    /// Scopes are recorded and served to 'puffin_viewer' over HTTP
    WithWebserver,
}

/// Defaults for canvas geometry, frame pacing and thread lifecycle.
#[derive(Debug, Clone)]
pub struct CanvasDefaults {
    pub width: u32,
    pub height: u32,
    pub title: String,
    pub theme: String,
    /// Frame rate while nothing requests a repaint.
    pub fps_idle: u32,
    /// Frame rate while the UI is animating or being interacted with.
    pub fps_active: u32,
    /// Start the render thread as soon as a canvas is created.
    pub auto_start: bool,
    /// Upper bound on waiting for a new render thread's first frame.
    pub startup_timeout: Duration,
    /// Upper bound on waiting for a stopped render thread to exit.
    pub shutdown_timeout: Duration,
}

impl Default for CanvasDefaults {
    fn default() -> Self {
        Self {
            width: 1280,
            height: 720,
            title: "Easel Canvas".to_string(),
            theme: "dark".to_string(),
            fps_idle: 10,
            fps_active: 60,
            auto_start: true,
            startup_timeout: Duration::from_millis(250),
            shutdown_timeout: Duration::from_secs(1),
        }
    }
}
