//! A canvas: one independently rendered surface hosting a widget registry.
//!
//! A [`Canvas`] is shared as `Arc<Canvas>`; every method takes `&self`. The
//! scene (settings plus widgets) sits behind one mutex. Direct calls and
//! queued commands both run under it, and the render thread holds it for
//! the whole widget pass, so no caller ever observes a half-drawn or
//! half-mutated scene.
//!
//! # Lifecycle
//!
//! `Created` → [`Canvas::run_async`] → `Running` → [`Canvas::stop`] →
//! `Stopped`, and back to `Running` on the next start. Each start spawns a
//! fresh render thread; stopping is cooperative and observed at the top of
//! the next frame.

use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crossbeam::channel::{self, Receiver, RecvTimeoutError, Sender};
use easel_core::config::CanvasDefaults;
use easel_core::profiling::profile_function;
use easel_egui::{FrameApp, FrameControl, FrameStats, RunnerFactory, RunnerParams};
use parking_lot::{Mutex, MutexGuard};

use crate::command::{CommandQueue, DrainReport, panic_message};
use crate::error::{UiError, UiResult};
use crate::scene::{CanvasScene, RenderReport};
use crate::signal::SignalBus;
use crate::state::{CanvasMode, CanvasSettings, CanvasState, WidgetState};
use crate::value::Properties;
use crate::widget::{Widget, WidgetFactory, WidgetRegistry};

/// How to create a canvas.
#[derive(Debug, Clone, PartialEq)]
pub struct CanvasDescriptor {
    pub title: String,
    pub size: [u32; 2],
    pub position: [i32; 2],
    pub mode: CanvasMode,
    pub theme: String,
    pub fps_idle: u32,
    pub fps_active: u32,
    /// Start the render thread right after creation.
    pub auto_start: bool,
    pub startup_timeout: Duration,
    pub shutdown_timeout: Duration,
}

impl Default for CanvasDescriptor {
    fn default() -> Self {
        Self::from_defaults(&CanvasDefaults::default())
    }
}

impl CanvasDescriptor {
    pub fn from_defaults(defaults: &CanvasDefaults) -> Self {
        Self {
            title: defaults.title.clone(),
            size: [defaults.width, defaults.height],
            position: [0, 0],
            mode: CanvasMode::Standard,
            theme: defaults.theme.clone(),
            fps_idle: defaults.fps_idle,
            fps_active: defaults.fps_active,
            auto_start: defaults.auto_start,
            startup_timeout: defaults.startup_timeout,
            shutdown_timeout: defaults.shutdown_timeout,
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn with_size(mut self, width: u32, height: u32) -> Self {
        self.size = [width, height];
        self
    }

    pub fn with_position(mut self, x: i32, y: i32) -> Self {
        self.position = [x, y];
        self
    }

    pub fn with_mode(mut self, mode: CanvasMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_theme(mut self, theme: impl Into<String>) -> Self {
        self.theme = theme.into();
        self
    }

    pub fn with_fps(mut self, idle: u32, active: u32) -> Self {
        self.fps_idle = idle;
        self.fps_active = active;
        self
    }

    pub fn with_auto_start(mut self, auto_start: bool) -> Self {
        self.auto_start = auto_start;
        self
    }

    fn settings(&self, canvas_id: &str) -> CanvasSettings {
        CanvasSettings {
            canvas_id: canvas_id.to_string(),
            mode: self.mode,
            size: self.size,
            position: self.position,
            theme: self.theme.clone(),
            title: self.title.clone(),
            active: false,
            fps_idle: self.fps_idle,
            fps_active: self.fps_active,
        }
    }
}

/// Where a canvas is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CanvasStatus {
    /// Never started.
    Created,
    Running,
    Stopped,
}

struct CanvasShared {
    scene: Mutex<CanvasScene>,
    commands: CommandQueue,
    running: AtomicBool,
    started: AtomicBool,
    /// Bumped on every start; a render loop only acts while its own epoch is
    /// current.
    epoch: Mutex<u64>,
    frames: AtomicU64,
    needs_render: AtomicBool,
}

impl CanvasShared {
    fn begin_run(&self) -> u64 {
        let mut epoch = self.epoch.lock();
        *epoch += 1;
        self.running.store(true, Ordering::SeqCst);
        self.started.store(true, Ordering::SeqCst);
        self.scene.lock().settings_mut().active = true;
        *epoch
    }

    fn finish_run(&self, run: u64) {
        let epoch = self.epoch.lock();
        if *epoch == run {
            self.running.store(false, Ordering::SeqCst);
            self.scene.lock().settings_mut().active = false;
        }
    }

    fn is_current(&self, run: u64) -> bool {
        self.running.load(Ordering::SeqCst) && *self.epoch.lock() == run
    }
}

struct RenderThread {
    run: u64,
    handle: JoinHandle<()>,
    exited: Receiver<UiResult<()>>,
}

/// Per-run frame callbacks handed to the runner.
struct CanvasFrame {
    shared: Arc<CanvasShared>,
    run: u64,
    ready: Option<Sender<()>>,
}

impl FrameApp for CanvasFrame {
    fn begin_frame(&mut self) -> FrameControl {
        if !self.shared.is_current(self.run) {
            return FrameControl::Exit;
        }

        let mut scene = self.shared.scene.lock();
        self.shared.commands.drain(&mut scene);
        FrameControl::Continue
    }

    fn ui(&mut self, ctx: &egui::Context) {
        self.shared.scene.lock().render(ctx);
        self.shared.needs_render.store(false, Ordering::Relaxed);
    }

    fn end_frame(&mut self, _stats: &FrameStats) {
        self.shared.frames.fetch_add(1, Ordering::Relaxed);
        if let Some(ready) = self.ready.take() {
            let _ = ready.send(());
        }
    }
}

/// One independently rendered surface hosting a widget registry.
pub struct Canvas {
    id: String,
    shared: Arc<CanvasShared>,
    runner_factory: RunnerFactory,
    worker: Mutex<Option<RenderThread>>,
    startup_timeout: Duration,
    shutdown_timeout: Duration,
}

impl Canvas {
    /// Create a stopped canvas whose widgets are built by `factory`.
    pub fn new(
        canvas_id: impl Into<String>,
        descriptor: &CanvasDescriptor,
        factory: WidgetFactory,
        runner_factory: RunnerFactory,
    ) -> UiResult<Self> {
        let id = canvas_id.into();
        if id.trim().is_empty() {
            return Err(UiError::invalid_property("canvas_id", "canvas id must not be empty"));
        }
        if descriptor.size.contains(&0) {
            return Err(UiError::invalid_property("size", "canvas size must be non-zero"));
        }

        let scene = CanvasScene::new(
            descriptor.settings(&id),
            WidgetRegistry::with_factory(factory),
        );
        tracing::debug!(canvas_id = %id, mode = %descriptor.mode, "Created canvas");

        Ok(Self {
            id,
            shared: Arc::new(CanvasShared {
                scene: Mutex::new(scene),
                commands: CommandQueue::new(),
                running: AtomicBool::new(false),
                started: AtomicBool::new(false),
                epoch: Mutex::new(0),
                frames: AtomicU64::new(0),
                needs_render: AtomicBool::new(true),
            }),
            runner_factory,
            worker: Mutex::new(None),
            startup_timeout: descriptor.startup_timeout,
            shutdown_timeout: descriptor.shutdown_timeout,
        })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// Lock the scene. Holding the guard blocks this canvas's render thread.
    pub fn scene(&self) -> MutexGuard<'_, CanvasScene> {
        self.shared.scene.lock()
    }

    pub fn with_scene<R>(&self, f: impl FnOnce(&mut CanvasScene) -> R) -> R {
        f(&mut self.scene())
    }

    pub fn signals(&self) -> SignalBus {
        self.scene().registry().factory().signals().clone()
    }

    /// Export settings plus every widget state, taken atomically.
    pub fn state(&self) -> CanvasState {
        self.scene().state()
    }

    pub fn serialize(&self) -> serde_json::Value {
        self.state().to_json()
    }

    fn touch(&self) {
        self.shared.needs_render.store(true, Ordering::Relaxed);
    }

    /// Add a widget. Fails with [`UiError::WidgetExists`] if the id is taken.
    pub fn add_widget(&self, widget: Box<dyn Widget>) -> UiResult<()> {
        self.scene().add_widget(widget)?;
        self.touch();
        Ok(())
    }

    /// Create a widget by type tag and add it in one step.
    pub fn create_widget(
        &self,
        widget_type: &str,
        widget_id: &str,
        properties: Properties,
    ) -> UiResult<()> {
        self.scene().create_widget(widget_type, widget_id, properties)?;
        self.touch();
        Ok(())
    }

    pub fn remove_widget(&self, widget_id: &str) -> bool {
        let removed = self.scene().remove_widget(widget_id);
        if removed {
            self.touch();
        }
        removed
    }

    pub fn update_widget(&self, widget_id: &str, properties: Properties) -> UiResult<()> {
        self.scene().update_widget(widget_id, properties)?;
        self.touch();
        Ok(())
    }

    /// Run `f` against one widget with the scene locked.
    pub fn with_widget<R>(
        &self,
        widget_id: &str,
        f: impl FnOnce(&mut dyn Widget) -> R,
    ) -> UiResult<R> {
        let mut scene = self.scene();
        let result = f(scene.widget_mut(widget_id)?);
        self.touch();
        Ok(result)
    }

    pub fn widget_state(&self, widget_id: &str) -> UiResult<WidgetState> {
        Ok(self.scene().widget(widget_id)?.state().clone())
    }

    pub fn widget_ids(&self) -> Vec<String> {
        self.scene().registry().ids()
    }

    /// Remove every widget. Returns how many were removed.
    pub fn clear(&self) -> usize {
        let removed = self.scene().clear();
        self.touch();
        removed
    }

    /// Register a widget constructor on this canvas's own factory.
    pub fn register_widget_type<F>(&self, widget_type: impl Into<String>, constructor: F)
    where
        F: Fn(&str, Properties) -> UiResult<Box<dyn Widget>> + Send + Sync + 'static,
    {
        self.scene().registry_mut().factory_mut().register(widget_type, constructor);
    }

    /// Apply canvas-level properties. See [`CanvasScene::apply_properties`].
    pub fn update_properties(&self, properties: &Properties) -> UiResult<()> {
        self.scene().apply_properties(properties)?;
        self.touch();
        Ok(())
    }

    /// Defer `command` to the render thread, ahead of its next widget pass.
    pub fn queue_command<F>(&self, command: F)
    where
        F: FnOnce(&mut CanvasScene) -> UiResult<()> + Send + 'static,
    {
        self.shared.commands.push(command);
    }

    pub fn pending_commands(&self) -> usize {
        self.shared.commands.len()
    }

    /// Drain the command queue now. The render thread does this every frame.
    pub fn process_commands(&self) -> DrainReport {
        let mut scene = self.scene();
        self.shared.commands.drain(&mut scene)
    }

    /// Draw this canvas into `ctx`. A no-op while the canvas is inactive.
    pub fn render(&self, ctx: &egui::Context) -> RenderReport {
        let report = self.scene().render(ctx);
        self.shared.needs_render.store(false, Ordering::Relaxed);
        report
    }

    /// Parameters the runner is started with, derived from the settings.
    pub fn runner_params(&self) -> RunnerParams {
        let scene = self.scene();
        let settings = scene.settings();
        RunnerParams {
            window_title: settings.title.clone(),
            window_size: settings.size,
            fps_idle: settings.fps_idle,
            fps_active: settings.fps_active,
            full_screen_dock_space: settings.mode == CanvasMode::Docking,
            enable_viewports: matches!(
                settings.mode,
                CanvasMode::Docking | CanvasMode::MultiViewport
            ),
            theme: settings.theme.clone(),
            ..Default::default()
        }
    }

    /// Run the frame loop on the calling thread until [`Canvas::stop`].
    pub fn run(&self) -> UiResult<()> {
        let run = {
            let _worker = self.worker.lock();
            if self.is_running() {
                tracing::warn!(canvas_id = %self.id, "Canvas is already running");
                return Ok(());
            }
            self.shared.begin_run()
        };

        tracing::info!(canvas_id = %self.id, "Running canvas in the foreground");
        let result = drive(
            &self.runner_factory,
            &self.runner_params(),
            self.shared.clone(),
            run,
            None,
        );
        self.shared.finish_run(run);
        result
    }

    /// Start the frame loop on a dedicated thread.
    ///
    /// Returns once the first frame rendered, or after the startup timeout.
    /// Fails if the render thread exits before rendering a frame, carrying
    /// the runner's error when it reported one. Does nothing if the canvas
    /// is already running.
    pub fn run_async(&self) -> UiResult<()> {
        profile_function!();

        let mut worker = self.worker.lock();
        if self.is_running() {
            tracing::debug!(canvas_id = %self.id, "Canvas is already running");
            return Ok(());
        }
        if let Some(previous) = worker.take() {
            previous.join(&self.id, Duration::ZERO);
        }

        let run = self.shared.begin_run();
        let params = self.runner_params();
        let (ready_tx, ready_rx) = channel::bounded(1);
        let (exit_tx, exit_rx) = channel::bounded(1);

        let shared = self.shared.clone();
        let runner_factory = self.runner_factory.clone();
        let canvas_id = self.id.clone();

        let spawned = thread::Builder::new()
            .name(format!("easel-canvas-{}", self.id))
            .spawn(move || {
                let result = drive(&runner_factory, &params, shared.clone(), run, Some(ready_tx));
                if let Err(err) = &result {
                    tracing::error!(canvas_id = %canvas_id, error = %err, "Render thread failed");
                }
                shared.finish_run(run);
                tracing::debug!(canvas_id = %canvas_id, "Render thread exited");
                let _ = exit_tx.send(result);
            });

        let handle = match spawned {
            Ok(handle) => handle,
            Err(err) => {
                self.shared.finish_run(run);
                return Err(UiError::ThreadSpawn(err.to_string()));
            }
        };
        *worker = Some(RenderThread {
            run,
            handle,
            exited: exit_rx,
        });
        drop(worker);

        tracing::info!(canvas_id = %self.id, "Started canvas");
        match ready_rx.recv_timeout(self.startup_timeout) {
            Ok(()) => tracing::debug!(canvas_id = %self.id, "First frame rendered"),
            Err(RecvTimeoutError::Timeout) => tracing::warn!(
                canvas_id = %self.id,
                timeout = ?self.startup_timeout,
                "No frame rendered before the startup timeout"
            ),
            Err(RecvTimeoutError::Disconnected) => {
                let err = self
                    .take_worker(run)
                    .and_then(|worker| worker.join(&self.id, self.shutdown_timeout))
                    .and_then(Result::err)
                    .unwrap_or_else(|| {
                        UiError::Runner("render thread exited before its first frame".to_string())
                    });
                tracing::error!(
                    canvas_id = %self.id,
                    error = %err,
                    "Render thread exited before its first frame"
                );
                return Err(err);
            }
        }
        Ok(())
    }

    /// Take the worker handle if it still belongs to `run`.
    fn take_worker(&self, run: u64) -> Option<RenderThread> {
        let mut worker = self.worker.lock();
        match worker.as_ref() {
            Some(thread) if thread.run == run => worker.take(),
            _ => None,
        }
    }

    /// Ask the render loop to exit at its next frame without waiting.
    ///
    /// Returns whether the canvas was running.
    pub fn signal_stop(&self) -> bool {
        self.shared.running.swap(false, Ordering::SeqCst)
    }

    /// Stop the render loop and wait for its thread to exit.
    ///
    /// The wait is bounded by the shutdown timeout; a thread that does not
    /// exit in time is detached. A no-op on a canvas that is not running.
    pub fn stop(&self) {
        if self.signal_stop() {
            tracing::info!(canvas_id = %self.id, "Stopping canvas");
        }

        let worker = self.worker.lock().take();
        if let Some(worker) = worker {
            worker.join(&self.id, self.shutdown_timeout);
        }
    }

    pub fn is_running(&self) -> bool {
        self.shared.running.load(Ordering::SeqCst)
    }

    pub fn is_active(&self) -> bool {
        self.scene().settings().active
    }

    pub fn status(&self) -> CanvasStatus {
        if self.is_running() {
            CanvasStatus::Running
        } else if self.shared.started.load(Ordering::SeqCst) {
            CanvasStatus::Stopped
        } else {
            CanvasStatus::Created
        }
    }

    /// Frames completed across every run of this canvas.
    pub fn frame_count(&self) -> u64 {
        self.shared.frames.load(Ordering::Relaxed)
    }

    /// Whether the scene changed since the last render. Informational only.
    pub fn needs_render(&self) -> bool {
        self.shared.needs_render.load(Ordering::Relaxed)
    }
}

impl Drop for Canvas {
    fn drop(&mut self) {
        self.stop();
    }
}

impl std::fmt::Debug for Canvas {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Canvas")
            .field("id", &self.id)
            .field("status", &self.status())
            .field("frames", &self.frame_count())
            .finish()
    }
}

impl RenderThread {
    /// Wait up to `timeout` for the thread to exit and join it.
    ///
    /// Returns the run's result when the thread reported one.
    fn join(self, canvas_id: &str, timeout: Duration) -> Option<UiResult<()>> {
        if self.handle.thread().id() == thread::current().id() {
            tracing::warn!(canvas_id, "Render thread cannot join itself; detaching");
            return None;
        }

        let result = match self.exited.recv_timeout(timeout) {
            Ok(result) => Some(result),
            Err(RecvTimeoutError::Disconnected) => None,
            Err(RecvTimeoutError::Timeout) => {
                if timeout > Duration::ZERO {
                    tracing::warn!(
                        canvas_id,
                        ?timeout,
                        "Render thread did not exit in time; detaching"
                    );
                }
                return None;
            }
        };
        if self.handle.join().is_err() {
            tracing::error!(canvas_id, "Render thread panicked");
        }
        result
    }
}

/// Build a runner and drive one run of the frame loop, containing panics.
fn drive(
    runner_factory: &RunnerFactory,
    params: &RunnerParams,
    shared: Arc<CanvasShared>,
    run: u64,
    ready: Option<Sender<()>>,
) -> UiResult<()> {
    let mut frame = CanvasFrame { shared, run, ready };
    let result = panic::catch_unwind(AssertUnwindSafe(|| {
        let mut runner = runner_factory();
        runner.run(params, &mut frame)
    }));

    match result {
        Ok(result) => result.map_err(UiError::from),
        Err(payload) => Err(UiError::Runner(panic_message(payload.as_ref()))),
    }
}
