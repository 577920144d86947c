//! Egui integration for Easel.
//!
//! Canvases never talk to a window system directly. They hand a [`FrameApp`]
//! to a [`FrameRunner`], which owns the per-frame loop: it asks the app
//! whether to continue, feeds an `egui::Context` one frame of input, lets the
//! app draw, tessellates the result and paces itself to the requested frame
//! rate. [`EguiRunner`] is the headless implementation; GPU submission of the
//! tessellated primitives belongs to whoever embeds it.

mod runner;
mod state;

use std::sync::Arc;

// Re-export egui types
pub use egui::{
    self, Align2, Color32, Context as EguiContext, Id, Pos2, Rect, Response, RichText, Ui,
    UiBuilder, Vec2, Visuals,
};
pub use runner::EguiRunner;
pub use state::InputState;

/// Returned by [`FrameApp::begin_frame`] to keep the loop going or end it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameControl {
    Continue,
    Exit,
}

/// Per-frame numbers reported back to the app after each frame.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameStats {
    /// 1-based index of the frame that just finished.
    pub frame: u64,
    /// Number of clipped primitives produced by tessellation.
    pub primitives: usize,
    /// Whether egui asked for an immediate repaint (drives active vs idle pacing).
    pub repaint_requested: bool,
}

/// Callbacks a runner drives once per frame.
pub trait FrameApp {
    /// Called at the top of every frame before any UI is built.
    ///
    /// Returning [`FrameControl::Exit`] ends the loop without drawing.
    fn begin_frame(&mut self) -> FrameControl;

    /// Build this frame's UI.
    fn ui(&mut self, ctx: &egui::Context);

    /// Called after the frame was tessellated.
    fn end_frame(&mut self, _stats: &FrameStats) {}
}

/// Window and pacing configuration handed to a runner.
#[derive(Debug, Clone, PartialEq)]
pub struct RunnerParams {
    pub window_title: String,
    /// Logical window size in pixels.
    pub window_size: [u32; 2],
    pub fps_idle: u32,
    pub fps_active: u32,
    /// Host a full-screen dock space behind all windows.
    pub full_screen_dock_space: bool,
    pub enable_viewports: bool,
    /// `"light"` selects light visuals, anything else dark.
    pub theme: String,
    pub pixels_per_point: f32,
}

impl Default for RunnerParams {
    fn default() -> Self {
        Self {
            window_title: "Easel Canvas".to_string(),
            window_size: [1280, 720],
            fps_idle: 10,
            fps_active: 60,
            full_screen_dock_space: false,
            enable_viewports: false,
            theme: "dark".to_string(),
            pixels_per_point: 1.0,
        }
    }
}

impl RunnerParams {
    pub fn validate(&self) -> RunnerResult<()> {
        if self.window_size[0] == 0 || self.window_size[1] == 0 {
            return Err(RunnerError::InvalidParams(format!(
                "window size must be non-zero, got {}x{}",
                self.window_size[0], self.window_size[1]
            )));
        }
        if !(self.pixels_per_point.is_finite() && self.pixels_per_point > 0.0) {
            return Err(RunnerError::InvalidParams(format!(
                "pixels_per_point must be positive, got {}",
                self.pixels_per_point
            )));
        }
        Ok(())
    }

    pub fn visuals(&self) -> Visuals {
        if self.theme.eq_ignore_ascii_case("light") {
            Visuals::light()
        } else {
            Visuals::dark()
        }
    }
}

/// Owns a frame loop. `run` blocks until the app returns [`FrameControl::Exit`].
pub trait FrameRunner: Send {
    fn run(&mut self, params: &RunnerParams, app: &mut dyn FrameApp) -> RunnerResult<()>;
}

/// Creates a fresh runner for every start of a canvas.
pub type RunnerFactory = Arc<dyn Fn() -> Box<dyn FrameRunner> + Send + Sync>;

/// Run one egui pass, hosting the dock space first when requested.
pub fn run_pass(
    ctx: &egui::Context,
    params: &RunnerParams,
    raw_input: egui::RawInput,
    app: &mut dyn FrameApp,
) -> egui::FullOutput {
    ctx.run(raw_input, |ctx| {
        if params.full_screen_dock_space {
            egui::CentralPanel::default()
                .frame(egui::Frame::NONE)
                .show(ctx, |_ui| {});
        }
        app.ui(ctx);
    })
}

/// Errors that can occur while starting or driving a frame loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunnerError {
    /// The runner parameters cannot be used.
    InvalidParams(String),
    /// The backend failed while the loop was running.
    Backend(String),
}

impl std::fmt::Display for RunnerError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RunnerError::InvalidParams(msg) => write!(f, "Invalid runner parameters: {}", msg),
            RunnerError::Backend(msg) => write!(f, "Frame runner failed: {}", msg),
        }
    }
}

impl std::error::Error for RunnerError {}

/// Result type for runner operations.
pub type RunnerResult<T> = Result<T, RunnerError>;
