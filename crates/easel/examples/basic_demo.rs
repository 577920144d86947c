//! Builds a small settings panel on a headless canvas, edits it from a
//! worker thread while it renders, then exports it to JSON.
//!
//! Run with `RUST_LOG=debug` to see every widget and canvas signal.

use std::thread;
use std::time::Duration;

use easel::{AppContext, CanvasMode, Config, ToolResponse, UiSignal, WidgetSpec, properties};

fn main() {
    let config = Config::default();
    easel::init(&config);

    let mut app = AppContext::new(config);
    let signals = app.signals().subscribe();

    let descriptor = app
        .descriptor()
        .with_title("Easel Demo")
        .with_size(640, 480)
        .with_mode(CanvasMode::Standard);
    app.create_canvas("settings", descriptor)
        .expect("Failed to create canvas");

    let widgets = [
        WidgetSpec::new("text", "heading")
            .with_properties(properties! { "text" => "Audio", "color" => [0.9, 0.8, 0.2] }),
        WidgetSpec::new("slider_float", "volume").with_properties(properties! {
            "label" => "Volume",
            "value" => 0.5,
            "v_min" => 0.0,
            "v_max" => 1.0,
        }),
        WidgetSpec::new("checkbox", "mute").with_properties(properties! { "label" => "Mute" }),
        WidgetSpec::new("progress_bar", "level")
            .with_properties(properties! { "fraction" => 0.25, "overlay" => "25%" })
            .sized(200.0, 0.0),
        WidgetSpec::new("button", "apply")
            .with_properties(properties! { "label" => "Apply" })
            .at(16.0, 400.0),
    ];
    for spec in widgets {
        let response = ToolResponse::from_result(app.add_widget("settings", spec));
        println!("add_widget -> {}", response.to_json());
    }

    // Edit the canvas from another thread while it renders.
    let canvas = app.canvas("settings").expect("Canvas disappeared");
    let worker = thread::spawn(move || {
        for step in 1..=4 {
            let fraction = step as f64 * 0.25;
            canvas.queue_command(move |scene| {
                scene.update_widget("level", properties! { "fraction" => fraction })
            });
            thread::sleep(Duration::from_millis(100));
        }
    });
    worker.join().expect("Worker thread panicked");
    thread::sleep(Duration::from_millis(200));

    for signal in signals.try_iter() {
        if let UiSignal::WidgetUpdated { widget_id, changed } = signal {
            println!("updated {widget_id}: {changed:?}");
        }
    }

    let path = std::env::temp_dir().join("easel_demo_settings.json");
    let response = ToolResponse::from_result(app.export_canvas_json("settings", &path));
    println!("export -> {} ({})", response.to_json(), path.display());

    let frames = app.canvas("settings").map(|canvas| canvas.frame_count()).unwrap_or(0);
    println!("rendered {frames} frames");
    app.shutdown();
}
