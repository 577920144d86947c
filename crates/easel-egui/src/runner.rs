use std::thread;
use std::time::{Duration, Instant};

use easel_core::profiling::{self, profile_scope};

use crate::state::InputState;
use crate::{
    FrameApp, FrameControl, FrameRunner, FrameStats, RunnerFactory, RunnerParams, RunnerResult,
    run_pass,
};

/// Headless egui frame loop.
///
/// Drives an `egui::Context` at the configured frame rate: `fps_active` while
/// egui requests repaints, `fps_idle` otherwise.
pub struct EguiRunner {
    context: egui::Context,
    input: InputState,
    last_stats: Option<FrameStats>,
}

impl EguiRunner {
    pub fn new() -> Self {
        let context = egui::Context::default();
        let input = InputState::new(context.viewport_id());

        Self {
            context,
            input,
            last_stats: None,
        }
    }

    /// A [`RunnerFactory`] producing a fresh `EguiRunner` per start.
    pub fn factory() -> RunnerFactory {
        std::sync::Arc::new(|| Box::new(EguiRunner::new()) as Box<dyn FrameRunner>)
    }

    /// Get the egui context for direct access.
    pub fn context(&self) -> &egui::Context {
        &self.context
    }

    /// Input queued here is delivered with the next frame.
    pub fn input_mut(&mut self) -> &mut InputState {
        &mut self.input
    }

    pub fn last_stats(&self) -> Option<FrameStats> {
        self.last_stats
    }
}

impl Default for EguiRunner {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameRunner for EguiRunner {
    fn run(&mut self, params: &RunnerParams, app: &mut dyn FrameApp) -> RunnerResult<()> {
        params.validate()?;
        self.context.set_visuals(params.visuals());

        tracing::info!(
            title = %params.window_title,
            width = params.window_size[0],
            height = params.window_size[1],
            dock_space = params.full_screen_dock_space,
            "Frame loop started"
        );

        let mut frame = 0u64;
        loop {
            profiling::new_frame();
            let frame_start = Instant::now();

            if app.begin_frame() == FrameControl::Exit {
                break;
            }

            let raw_input = self.input.take_input(params);
            let output = run_pass(&self.context, params, raw_input, app);
            let repaint_requested = output
                .viewport_output
                .values()
                .any(|viewport| viewport.repaint_delay.is_zero());

            let primitives = {
                profile_scope!("tessellate");
                self.context
                    .tessellate(output.shapes, output.pixels_per_point)
            };

            frame += 1;
            let stats = FrameStats {
                frame,
                primitives: primitives.len(),
                repaint_requested,
            };
            self.last_stats = Some(stats);
            app.end_frame(&stats);

            let fps = if repaint_requested {
                params.fps_active
            } else {
                params.fps_idle
            };
            if let Some(remaining) = frame_budget(fps).checked_sub(frame_start.elapsed()) {
                thread::sleep(remaining);
            }
        }

        tracing::info!(title = %params.window_title, frames = frame, "Frame loop exited");
        Ok(())
    }
}

/// Time one frame may take at `fps`.
pub(crate) fn frame_budget(fps: u32) -> Duration {
    Duration::from_secs_f64(1.0 / fps.max(1) as f64)
}
