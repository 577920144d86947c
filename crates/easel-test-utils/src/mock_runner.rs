//! Recording frame runner for tests.

use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use easel_egui::{
    FrameApp, FrameControl, FrameRunner, FrameStats, InputState, RunnerError, RunnerFactory,
    RunnerParams, RunnerResult, run_pass,
};
use parking_lot::{Condvar, Mutex};

/// Something a [`MockRunner`] did, in order.
#[derive(Debug, Clone, PartialEq)]
pub enum RunnerCall {
    Started(RunnerParams),
    Frame(FrameStats),
    Finished { frames: u64 },
}

#[derive(Default)]
struct LogInner {
    calls: Mutex<Vec<RunnerCall>>,
    frames: Mutex<u64>,
    frame_done: Condvar,
}

/// Shared record of every call made by the runners built from one factory.
#[derive(Clone, Default)]
pub struct RunnerLog {
    inner: Arc<LogInner>,
}

impl RunnerLog {
    pub fn new() -> Self {
        Self::default()
    }

    fn record(&self, call: RunnerCall) {
        self.inner.calls.lock().push(call);
    }

    fn record_frame(&self, stats: FrameStats) {
        self.record(RunnerCall::Frame(stats));
        *self.inner.frames.lock() += 1;
        self.inner.frame_done.notify_all();
    }

    pub fn calls(&self) -> Vec<RunnerCall> {
        self.inner.calls.lock().clone()
    }

    /// Parameters of every run, oldest first.
    pub fn params(&self) -> Vec<RunnerParams> {
        self.inner
            .calls
            .lock()
            .iter()
            .filter_map(|call| match call {
                RunnerCall::Started(params) => Some(params.clone()),
                _ => None,
            })
            .collect()
    }

    /// Runs started so far.
    pub fn runs(&self) -> usize {
        self.params().len()
    }

    /// Runs that returned.
    pub fn finished_runs(&self) -> usize {
        self.inner
            .calls
            .lock()
            .iter()
            .filter(|call| matches!(call, RunnerCall::Finished { .. }))
            .count()
    }

    /// Frames completed across all runs.
    pub fn frames(&self) -> u64 {
        *self.inner.frames.lock()
    }

    /// Block until at least `count` frames completed in total.
    ///
    /// Returns `false` if `timeout` passed first.
    pub fn wait_for_frames(&self, count: u64, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        let mut frames = self.inner.frames.lock();
        while *frames < count {
            if self.inner.frame_done.wait_until(&mut frames, deadline).timed_out() {
                return *frames >= count;
            }
        }
        true
    }

    /// Block until `count` more frames completed than right now.
    pub fn wait_for_more_frames(&self, count: u64, timeout: Duration) -> bool {
        let target = self.frames() + count;
        self.wait_for_frames(target, timeout)
    }
}

impl std::fmt::Debug for RunnerLog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RunnerLog")
            .field("runs", &self.runs())
            .field("frames", &self.frames())
            .finish()
    }
}

/// A [`FrameRunner`] that drives a headless egui context without pacing.
pub struct MockRunner {
    log: RunnerLog,
    context: egui::Context,
    frame_delay: Duration,
    max_frames: Option<u64>,
    fail_with: Option<RunnerError>,
}

impl MockRunner {
    pub fn new(log: RunnerLog) -> Self {
        Self {
            log,
            context: egui::Context::default(),
            frame_delay: Duration::ZERO,
            max_frames: None,
            fail_with: None,
        }
    }

    /// Sleep this long after every frame.
    pub fn with_frame_delay(mut self, delay: Duration) -> Self {
        self.frame_delay = delay;
        self
    }

    /// Return on its own after this many frames.
    pub fn with_max_frames(mut self, frames: u64) -> Self {
        self.max_frames = Some(frames);
        self
    }

    /// Fail every run with `error` before the first frame.
    pub fn failing(mut self, error: RunnerError) -> Self {
        self.fail_with = Some(error);
        self
    }

    /// A factory building a fresh runner per run, each sleeping
    /// `frame_delay` between frames.
    pub fn factory(log: RunnerLog, frame_delay: Duration) -> RunnerFactory {
        Arc::new(move || {
            Box::new(MockRunner::new(log.clone()).with_frame_delay(frame_delay))
                as Box<dyn FrameRunner>
        })
    }
}

impl FrameRunner for MockRunner {
    fn run(&mut self, params: &RunnerParams, app: &mut dyn FrameApp) -> RunnerResult<()> {
        params.validate()?;
        self.log.record(RunnerCall::Started(params.clone()));
        if let Some(error) = self.fail_with.clone() {
            self.log.record(RunnerCall::Finished { frames: 0 });
            return Err(error);
        }

        self.context.set_visuals(params.visuals());
        let mut input = InputState::new(egui::ViewportId::ROOT);
        let mut frame = 0u64;

        while self.max_frames.is_none_or(|max| frame < max) {
            if app.begin_frame() == FrameControl::Exit {
                break;
            }

            let output = run_pass(&self.context, params, input.take_input(params), app);
            let repaint_requested = output
                .viewport_output
                .values()
                .any(|viewport| viewport.repaint_delay.is_zero());
            let primitives = self.context.tessellate(output.shapes, output.pixels_per_point);

            frame += 1;
            let stats = FrameStats {
                frame,
                primitives: primitives.len(),
                repaint_requested,
            };
            app.end_frame(&stats);
            self.log.record_frame(stats);

            if !self.frame_delay.is_zero() {
                thread::sleep(self.frame_delay);
            }
        }

        self.log.record(RunnerCall::Finished { frames: frame });
        Ok(())
    }
}
