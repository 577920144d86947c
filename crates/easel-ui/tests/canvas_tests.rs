//! Canvas behavior: bookkeeping, render isolation and the render thread.

mod common;

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread;

use common::{Probe, WAIT};
use easel_egui::{FrameApp, FrameRunner, RunnerError, RunnerParams, RunnerResult};
use easel_test_utils::{MockRunner, RunnerLog};
use easel_ui::{
    Canvas, CanvasMode, CanvasStatus, ErrorKind, Properties, PropertyValue, UiError, UiSignal,
    properties,
};

#[test]
fn test_scenario_single_button() {
    let log = RunnerLog::new();
    let canvas = common::canvas("c1", &log);
    assert_eq!(canvas.state().mode, CanvasMode::Standard);

    let button = canvas
        .scene()
        .registry()
        .factory()
        .create("button", "b1", properties! { "label" => "Go" })
        .unwrap();
    canvas.add_widget(button).unwrap();

    let scene = canvas.scene();
    let all = scene.registry().get_all();
    assert_eq!(all.len(), 1);
    assert_eq!(all["b1"].state().properties["label"], PropertyValue::from("Go"));
}

#[test]
fn test_add_widget_updates_exported_state() {
    let log = RunnerLog::new();
    let canvas = common::canvas("c1", &log);
    canvas
        .create_widget("slider_int", "s1", properties! { "value" => 3 })
        .unwrap();

    let widget_state = canvas.widget_state("s1").unwrap();
    assert_eq!(canvas.state().widgets["s1"], widget_state);
    assert!(canvas.needs_render());

    canvas.update_widget("s1", properties! { "value" => 4 }).unwrap();
    assert_eq!(canvas.state().widgets["s1"], canvas.widget_state("s1").unwrap());

    assert!(canvas.remove_widget("s1"));
    assert!(!canvas.state().widgets.contains_key("s1"));
    assert!(!canvas.remove_widget("s1"));
}

#[test]
fn test_add_widget_rejects_duplicate_id() {
    let log = RunnerLog::new();
    let canvas = common::canvas("c1", &log);
    canvas.create_widget("button", "b1", properties! { "label" => "first" }).unwrap();

    let err = canvas
        .create_widget("button", "b1", properties! { "label" => "second" })
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::AlreadyExists);
    assert_eq!(
        canvas.widget_state("b1").unwrap().properties["label"],
        PropertyValue::from("first")
    );
}

#[test]
fn test_failed_creation_leaves_canvas_unchanged() {
    let log = RunnerLog::new();
    let canvas = common::canvas("c1", &log);
    let before = canvas.state();

    assert!(canvas.create_widget("knob", "k1", Properties::new()).is_err());
    assert!(canvas.create_widget("checkbox", "c", properties! { "checked" => 1 }).is_err());
    assert!(canvas.update_properties(&properties! { "mode" => "nope", "title" => "x" }).is_err());

    assert_eq!(canvas.state(), before);
}

#[test]
fn test_clear_empties_everything() {
    let log = RunnerLog::new();
    let canvas = common::canvas("c1", &log);
    let deleted = canvas.signals().subscribe();
    for id in ["a", "b"] {
        canvas.create_widget("text", id, Properties::new()).unwrap();
    }

    assert_eq!(canvas.clear(), 2);
    assert!(canvas.state().widgets.is_empty());
    assert!(canvas.widget_ids().is_empty());

    let deleted: Vec<_> = deleted
        .try_iter()
        .filter(|signal| matches!(signal, UiSignal::WidgetDeleted { .. }))
        .collect();
    assert_eq!(deleted.len(), 2);
}

#[test]
fn test_round_trip_through_restore() {
    let log = RunnerLog::new();
    let canvas = common::canvas("c1", &log);
    let specs = [
        ("button", properties! { "label" => "Go" }),
        ("text", properties! { "text" => "hello", "color" => [0.2, 0.4, 0.6, 1.0] }),
        ("input_text", properties! { "value" => "typed", "hint" => "name" }),
        ("checkbox", properties! { "checked" => true }),
        ("color_picker", properties! { "color" => [0.1, 0.2, 0.3, 0.4] }),
        ("slider_int", properties! { "value" => 7, "v_min" => -5, "v_max" => 9 }),
        ("slider_float", properties! { "value" => 0.5 }),
        ("progress_bar", properties! { "fraction" => 0.3, "overlay" => "30%" }),
    ];

    for (index, (tag, props)) in specs.into_iter().enumerate() {
        let id = format!("w{}", index);
        canvas.create_widget(tag, &id, props).unwrap();
        canvas
            .with_widget(&id, |widget| {
                widget.set_position(10.0, index as f32 * 30.0);
                widget.set_size(120.0, 24.0);
                widget.set_enabled(index % 2 == 0);
                widget.register_callback("on_change", "log_change", Box::new(|_| None));
            })
            .unwrap();

        let original = canvas.widget_state(&id).unwrap();
        let document = serde_json::to_string(&original.to_json()).unwrap();
        let parsed: easel_ui::WidgetState = serde_json::from_str(&document).unwrap();

        let restored = canvas.scene().registry().factory().restore(&parsed).unwrap();

        let mut expected = original.clone();
        expected.callbacks.clear();
        assert_eq!(restored.state(), &expected, "{} did not round-trip", tag);
    }
}

#[test]
fn test_queued_command_from_another_thread() {
    let log = RunnerLog::new();
    let canvas = common::canvas("c1", &log);
    canvas.create_widget("button", "b1", properties! { "label" => "Go" }).unwrap();
    canvas.run_async().unwrap();
    assert!(log.wait_for_frames(1, WAIT));

    let remote = canvas.clone();
    thread::spawn(move || {
        remote.queue_command(|scene| scene.update_widget("b1", properties! { "label" => "Stop" }));
    })
    .join()
    .unwrap();

    // The command may land just after a drain, so allow one extra frame.
    assert!(log.wait_for_more_frames(2, WAIT));
    assert_eq!(canvas.pending_commands(), 0);
    assert_eq!(
        canvas.widget_state("b1").unwrap().properties["label"],
        PropertyValue::from("Stop")
    );

    canvas.stop();
}

#[test]
fn test_queued_commands_run_in_order_and_survive_faults() {
    let log = RunnerLog::new();
    let canvas = common::canvas("c1", &log);
    canvas.create_widget("text", "t", properties! { "text" => "" }).unwrap();

    for step in ["a", "b", "c"] {
        canvas.queue_command(move |scene| {
            let current = scene.widget("t")?.state().properties["text"]
                .as_str()
                .unwrap_or("")
                .to_string();
            scene.update_widget("t", properties! { "text" => format!("{}{}", current, step) })
        });
        canvas.queue_command(|scene| scene.update_widget("ghost", Properties::new()));
    }
    canvas.queue_command(|_| panic!("queued panic"));

    canvas.run_async().unwrap();
    assert!(log.wait_for_frames(2, WAIT));
    canvas.stop();

    assert_eq!(canvas.widget_state("t").unwrap().properties["text"], PropertyValue::from("abc"));
}

#[test]
fn test_render_fault_is_isolated() {
    let log = RunnerLog::new();
    let canvas = common::canvas("c1", &log);
    let renders = Arc::new(AtomicUsize::new(0));

    canvas.create_widget("crash", "boom", Properties::new()).unwrap();
    canvas.add_widget(Probe::new("probe", renders.clone())).unwrap();
    canvas.create_widget("button", "b1", properties! { "label" => "Go" }).unwrap();

    canvas.run_async().unwrap();
    assert!(log.wait_for_frames(1, WAIT));

    assert!(canvas.is_running());
    assert!(renders.load(Ordering::SeqCst) >= 1);

    canvas.stop();
    assert_eq!(canvas.status(), CanvasStatus::Stopped);
}

#[test]
fn test_render_report_lists_faults() {
    let log = RunnerLog::new();
    let canvas = common::canvas("c1", &log);
    let renders = Arc::new(AtomicUsize::new(0));
    canvas.create_widget("crash", "boom", Properties::new()).unwrap();
    canvas.add_widget(Probe::new("probe", renders.clone())).unwrap();
    canvas.scene().settings_mut().active = true;

    let ctx = egui::Context::default();
    let mut report = None;
    let _ = ctx.run(egui::RawInput::default(), |ctx| report = Some(canvas.render(ctx)));
    let report = report.unwrap();

    assert_eq!(report.rendered, 1);
    assert_eq!(report.faults.len(), 1);
    assert!(matches!(
        &report.faults[0],
        UiError::RenderFault { widget_id, .. } if widget_id == "boom"
    ));
    assert_eq!(report.faults[0].kind(), ErrorKind::RenderFault);
}

#[test]
fn test_inactive_canvas_renders_nothing() {
    let log = RunnerLog::new();
    let canvas = common::canvas("c1", &log);
    let renders = Arc::new(AtomicUsize::new(0));
    canvas.add_widget(Probe::new("probe", renders.clone())).unwrap();

    let ctx = egui::Context::default();
    let _ = ctx.run(egui::RawInput::default(), |ctx| {
        canvas.render(ctx);
    });
    assert_eq!(renders.load(Ordering::SeqCst), 0);
}

#[test]
fn test_lifecycle_and_restart() {
    let log = RunnerLog::new();
    let canvas = common::canvas("c1", &log);
    assert_eq!(canvas.status(), CanvasStatus::Created);

    canvas.run_async().unwrap();
    assert_eq!(canvas.status(), CanvasStatus::Running);
    assert!(canvas.is_active());
    canvas.run_async().unwrap();
    assert!(log.wait_for_frames(1, WAIT));
    assert_eq!(log.runs(), 1);

    canvas.stop();
    assert_eq!(canvas.status(), CanvasStatus::Stopped);
    assert!(!canvas.is_active());
    assert_eq!(log.finished_runs(), 1);
    canvas.stop();

    let frames = canvas.frame_count();
    canvas.run_async().unwrap();
    assert!(log.wait_for_more_frames(1, WAIT));
    assert!(canvas.frame_count() > frames);
    assert_eq!(log.runs(), 2);

    canvas.stop();
    assert_eq!(log.finished_runs(), 2);
}

#[test]
fn test_runner_params_come_from_settings() {
    let log = RunnerLog::new();
    let canvas = common::canvas("c1", &log);
    canvas
        .update_properties(&properties! {
            "mode" => "docking",
            "theme" => "light",
            "size" => [640, 480],
        })
        .unwrap();

    canvas.run_async().unwrap();
    canvas.stop();

    let params = &log.params()[0];
    assert_eq!(params.window_title, "T");
    assert_eq!(params.window_size, [640, 480]);
    assert_eq!(params.theme, "light");
    assert!(params.full_screen_dock_space);
    assert!(params.enable_viewports);
}

#[test]
fn test_foreground_run_returns_when_runner_finishes() {
    let log = RunnerLog::new();
    let runner_log = log.clone();
    let canvas = Canvas::new(
        "fg",
        &common::descriptor(),
        common::factory(),
        Arc::new(move || {
            Box::new(MockRunner::new(runner_log.clone()).with_max_frames(3)) as Box<dyn FrameRunner>
        }),
    )
    .unwrap();

    canvas.run().unwrap();

    assert_eq!(canvas.frame_count(), 3);
    assert_eq!(canvas.status(), CanvasStatus::Stopped);
    assert!(!canvas.is_active());
}

struct PanickingRunner;

impl FrameRunner for PanickingRunner {
    fn run(&mut self, _params: &RunnerParams, _app: &mut dyn FrameApp) -> RunnerResult<()> {
        panic!("backend lost");
    }
}

#[test]
fn test_runner_panic_resets_flags() {
    let canvas = Canvas::new(
        "p",
        &common::descriptor(),
        common::factory(),
        Arc::new(|| Box::new(PanickingRunner) as Box<dyn FrameRunner>),
    )
    .unwrap();

    let err = canvas.run().unwrap_err();
    assert_eq!(err, UiError::Runner("backend lost".into()));
    assert!(!canvas.is_running());

    assert_eq!(canvas.run_async(), Err(UiError::Runner("backend lost".into())));
    canvas.stop();
    assert!(!canvas.is_running());
    assert!(!canvas.is_active());
}

#[test]
fn test_background_start_reports_runner_failure() {
    let log = RunnerLog::new();
    let runner_log = log.clone();
    let canvas = Canvas::new(
        "headless",
        &common::descriptor(),
        common::factory(),
        Arc::new(move || {
            Box::new(
                MockRunner::new(runner_log.clone())
                    .failing(RunnerError::Backend("no display".into())),
            ) as Box<dyn FrameRunner>
        }),
    )
    .unwrap();

    let err = canvas.run_async().unwrap_err();
    assert_eq!(err, UiError::Runner("Frame runner failed: no display".into()));
    assert_eq!(err.kind(), ErrorKind::Internal);

    assert!(!canvas.is_running());
    assert_eq!(canvas.status(), CanvasStatus::Stopped);
    assert_eq!(canvas.frame_count(), 0);
    assert_eq!(log.finished_runs(), 1);
}

#[test]
fn test_background_start_fails_when_runner_renders_nothing() {
    let log = RunnerLog::new();
    let runner_log = log.clone();
    let canvas = Canvas::new(
        "empty",
        &common::descriptor(),
        common::factory(),
        Arc::new(move || {
            Box::new(MockRunner::new(runner_log.clone()).with_max_frames(0)) as Box<dyn FrameRunner>
        }),
    )
    .unwrap();

    let err = canvas.run_async().unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Internal);
    assert!(!canvas.is_running());
}

#[test]
fn test_update_signal_reaches_listener_from_render_thread() {
    let log = RunnerLog::new();
    let canvas = common::canvas("c1", &log);
    canvas.create_widget("button", "b1", Properties::new()).unwrap();

    let updates = Arc::new(AtomicUsize::new(0));
    let counter = updates.clone();
    canvas.signals().connect(move |signal| {
        if matches!(signal, UiSignal::WidgetUpdated { widget_id, .. } if widget_id == "b1") {
            counter.fetch_add(1, Ordering::SeqCst);
        }
    });

    canvas.queue_command(|scene| scene.update_widget("b1", properties! { "label" => "Hi" }));
    canvas.run_async().unwrap();
    assert!(log.wait_for_frames(2, WAIT));
    canvas.stop();

    assert_eq!(updates.load(Ordering::SeqCst), 1);
}
