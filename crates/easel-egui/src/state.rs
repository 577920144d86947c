use std::time::Instant;

use crate::RunnerParams;

/// Accumulates egui input between frames.
///
/// There is no window system behind a headless runner, so the only input
/// egui sees is the screen rect, the clock and whatever events a host
/// pushes in with [`InputState::push_event`].
pub struct InputState {
    input: egui::RawInput,
    viewport_id: egui::ViewportId,
    started: Instant,
}

impl InputState {
    pub fn new(viewport_id: egui::ViewportId) -> Self {
        let input = egui::RawInput {
            focused: true,
            ..Default::default()
        };

        Self {
            input,
            viewport_id,
            started: Instant::now(),
        }
    }

    /// Queue an input event for the next frame.
    pub fn push_event(&mut self, event: egui::Event) {
        self.input.events.push(event);
    }

    /// Build the input for the next frame and reset the event list.
    pub fn take_input(&mut self, params: &RunnerParams) -> egui::RawInput {
        let pixels_per_point = params.pixels_per_point;
        let size_in_points = egui::vec2(
            params.window_size[0] as f32 / pixels_per_point,
            params.window_size[1] as f32 / pixels_per_point,
        );

        self.input.screen_rect = (size_in_points.x > 0.0 && size_in_points.y > 0.0)
            .then(|| egui::Rect::from_min_size(egui::Pos2::ZERO, size_in_points));
        self.input.time = Some(self.started.elapsed().as_secs_f64());
        self.input.viewport_id = self.viewport_id;

        self.input
            .viewports
            .entry(self.viewport_id)
            .or_default()
            .native_pixels_per_point = Some(pixels_per_point);

        self.input.take()
    }
}
