//! AppContext operations against canvases driven by the mock runner.

use std::time::Duration;

use easel::{
    AppContext, Config, ErrorKind, PropertyValue, ToolResponse, UiError, UiSignal, WidgetCore,
    WidgetSpec, properties,
};
use easel_test_utils::{MockRunner, RunnerLog};

const WAIT: Duration = Duration::from_secs(5);

fn context(log: &RunnerLog, auto_start: bool) -> AppContext {
    let mut config = Config::default();
    config.canvas.auto_start = auto_start;
    config.canvas.startup_timeout = WAIT;
    AppContext::with_runner(config, MockRunner::factory(log.clone(), Duration::from_millis(2)))
}

#[test]
fn test_builtin_types_are_registered() {
    let app = context(&RunnerLog::new(), false);
    let types = app.manager().factory().list_types();
    for tag in [
        "button",
        "checkbox",
        "color_picker",
        "input_text",
        "progress_bar",
        "slider_float",
        "slider_int",
        "text",
    ] {
        assert!(types.iter().any(|t| t == tag), "missing {tag}");
    }
}

#[test]
fn test_add_widget_applies_position_and_size() {
    let mut app = context(&RunnerLog::new(), false);
    app.create_canvas("main", app.descriptor()).unwrap();

    let state = app
        .add_widget(
            "main",
            WidgetSpec::new("button", "ok")
                .with_properties(properties! { "label" => "OK" })
                .at(10.0, 20.0)
                .sized(80.0, 24.0),
        )
        .unwrap();
    assert_eq!(state.position, Some([10.0, 20.0]));
    assert_eq!(state.size, Some([80.0, 24.0]));

    let canvas = app.canvas_state("main").unwrap();
    assert_eq!(canvas.widgets["ok"], state);
}

#[test]
fn test_duplicate_widget_is_rejected_before_creation() {
    let mut app = context(&RunnerLog::new(), false);
    app.create_canvas("main", app.descriptor()).unwrap();
    app.add_widget("main", WidgetSpec::new("text", "t")).unwrap();

    let signals = app.signals().subscribe();
    let err = app
        .add_widget("main", WidgetSpec::new("button", "t"))
        .unwrap_err();
    assert_eq!(err, UiError::WidgetExists("t".into()));

    assert!(signals.try_iter().next().is_none());
    assert_eq!(app.canvas_state("main").unwrap().widgets["t"].widget_type, "text");
}

#[test]
fn test_unknown_canvas_fails_every_operation() {
    let mut app = context(&RunnerLog::new(), false);

    assert_eq!(app.canvas_state("nope").unwrap_err().kind(), ErrorKind::NotFound);
    assert_eq!(app.clear_canvas("nope").unwrap_err().kind(), ErrorKind::NotFound);
    assert_eq!(app.remove_canvas("nope").unwrap_err().kind(), ErrorKind::NotFound);
    assert_eq!(app.set_active_canvas("nope").unwrap_err().kind(), ErrorKind::NotFound);
    assert!(app.add_widget("nope", WidgetSpec::new("text", "t")).is_err());
    assert!(app.canvas_json("nope").is_err());

    let response = ToolResponse::from_result(app.canvas_state("nope"));
    assert!(!response.success);
    assert_eq!(response.kind, Some("not_found"));
}

#[test]
fn test_update_and_remove_widget() {
    let mut app = context(&RunnerLog::new(), false);
    app.create_canvas("main", app.descriptor()).unwrap();
    app.add_widget(
        "main",
        WidgetSpec::new("slider_int", "s").with_properties(properties! { "value" => 3 }),
    )
    .unwrap();

    let state = app
        .update_widget("main", "s", properties! { "value" => 7, "label" => "Count" })
        .unwrap();
    assert_eq!(state.properties["value"], PropertyValue::Int(7));
    assert_eq!(state.properties["label"], PropertyValue::from("Count"));
    assert_eq!(state.properties["v_max"], PropertyValue::Int(100));

    app.remove_widget("main", "s").unwrap();
    assert_eq!(
        app.remove_widget("main", "s"),
        Err(UiError::WidgetNotFound("s".into()))
    );
}

#[test]
fn test_clear_canvas_reports_count() {
    let mut app = context(&RunnerLog::new(), false);
    app.create_canvas("main", app.descriptor()).unwrap();
    for id in ["a", "b", "c"] {
        app.add_widget("main", WidgetSpec::new("text", id)).unwrap();
    }

    assert_eq!(app.clear_canvas("main").unwrap(), 3);
    assert!(app.canvas_state("main").unwrap().widgets.is_empty());
    assert_eq!(app.clear_canvas("main").unwrap(), 0);
}

#[test]
fn test_active_canvas_follows_removal() {
    let mut app = context(&RunnerLog::new(), false);
    for id in ["one", "two", "three"] {
        app.create_canvas(id, app.descriptor()).unwrap();
    }
    assert_eq!(app.active_canvas_id(), Some("one"));

    app.set_active_canvas("three").unwrap();
    app.remove_canvas("three").unwrap();
    assert_eq!(app.active_canvas_id(), Some("one"));
    assert_eq!(app.list_canvases(), vec!["one", "two"]);
}

#[test]
fn test_canvas_json_mirrors_state() {
    let mut app = context(&RunnerLog::new(), false);
    app.create_canvas("main", app.descriptor().with_title("Panel").with_size(300, 200))
        .unwrap();
    app.add_widget("main", WidgetSpec::new("checkbox", "c")).unwrap();

    let json = app.canvas_json("main").unwrap();
    assert_eq!(json["canvas_id"], "main");
    assert_eq!(json["title"], "Panel");
    assert_eq!(json["size"], serde_json::json!([300, 200]));
    assert_eq!(json["mode"], "standard");
    assert_eq!(json["widgets"]["c"]["properties"]["checked"], false);
}

#[test]
fn test_custom_type_reaches_only_new_canvases() {
    let mut app = context(&RunnerLog::new(), false);
    app.create_canvas("before", app.descriptor()).unwrap();

    app.register_widget_type("spacer", |widget_id, properties| {
        struct Spacer(WidgetCore);
        impl easel::Widget for Spacer {
            fn core(&self) -> &WidgetCore {
                &self.0
            }
            fn core_mut(&mut self) -> &mut WidgetCore {
                &mut self.0
            }
            fn render(&mut self, ui: &mut egui::Ui) -> easel::UiResult<easel::ui::RenderOutput> {
                ui.add_space(8.0);
                Ok(None)
            }
        }
        let core = WidgetCore::new("spacer", widget_id, properties)?;
        Ok(Box::new(Spacer(core)) as Box<dyn easel::Widget>)
    });
    app.create_canvas("after", app.descriptor()).unwrap();

    assert!(matches!(
        app.add_widget("before", WidgetSpec::new("spacer", "s")),
        Err(UiError::UnknownWidgetType(_))
    ));
    app.add_widget("after", WidgetSpec::new("spacer", "s")).unwrap();
}

#[test]
fn test_shutdown_stops_render_threads() {
    let log = RunnerLog::new();
    let mut app = context(&log, true);
    app.create_canvas("a", app.descriptor()).unwrap();
    app.create_canvas("b", app.descriptor()).unwrap();
    assert!(log.wait_for_frames(2, WAIT));

    let canvases = [app.canvas("a").unwrap(), app.canvas("b").unwrap()];
    assert!(canvases.iter().all(|canvas| canvas.is_running()));

    app.shutdown();
    assert!(canvases.iter().all(|canvas| !canvas.is_running()));
    assert_eq!(log.finished_runs(), 2);
    assert_eq!(app.list_canvases().len(), 2);
}

#[test]
fn test_signals_cover_canvas_lifecycle() {
    let mut app = context(&RunnerLog::new(), false);
    let signals = app.signals().subscribe();

    app.create_canvas("main", app.descriptor()).unwrap();
    app.add_widget("main", WidgetSpec::new("text", "t")).unwrap();
    app.remove_canvas("main").unwrap();

    let received: Vec<UiSignal> = signals.try_iter().collect();
    assert_eq!(
        received.first(),
        Some(&UiSignal::CanvasCreated { canvas_id: "main".into() })
    );
    assert!(received.contains(&UiSignal::WidgetCreated {
        widget_id: "t".into(),
        widget_type: "text".into(),
    }));
    assert_eq!(
        received.last(),
        Some(&UiSignal::CanvasRemoved { canvas_id: "main".into() })
    );
}
