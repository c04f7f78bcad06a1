mod app;
mod panel;
mod ui;

// Re-export library modules so that `crate::state` resolves to the lib crate types in the binary.
pub use plater_view_lib::state;

use app::{PlaterApp, StartupOptions};
use shared::{BuildVolume, SceneDescription};

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "plater_view=info,plater_view_lib=info".into()),
        )
        .init();

    let options = parse_args(std::env::args().skip(1));

    let native_options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title("Plater View")
            .with_inner_size([1200.0, 800.0])
            .with_min_inner_size([640.0, 420.0]),
        ..Default::default()
    };

    if let Err(e) = eframe::run_native(
        "plater-view",
        native_options,
        Box::new(move |cc| Ok(Box::new(PlaterApp::new(cc, options)))),
    ) {
        tracing::error!("Failed to start application: {e}");
    }
}

/// Recognizes `--scene <path>`, `--build-volume w,d,h[,x,y,z]` and `--ortho`.
/// Bad values are logged and ignored.
fn parse_args(args: impl Iterator<Item = String>) -> StartupOptions {
    let mut options = StartupOptions::default();
    let mut args = args.peekable();
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--scene" => match args.next() {
                Some(path) => options.scene = load_scene(&path),
                None => tracing::warn!("--scene needs a path"),
            },
            "--build-volume" => match args.next().map(|v| BuildVolume::parse(&v)) {
                Some(Ok(volume)) => options.build_volume = Some(volume),
                Some(Err(e)) => tracing::error!("{e}"),
                None => tracing::warn!("--build-volume needs a value"),
            },
            "--ortho" => options.orthographic = true,
            other => tracing::warn!("Ignoring unknown argument `{other}`"),
        }
    }
    options
}

fn load_scene(path: &str) -> Option<SceneDescription> {
    let json = match std::fs::read_to_string(path) {
        Ok(json) => json,
        Err(e) => {
            tracing::error!("Failed to read scene file {path}: {e}");
            return None;
        }
    };
    match SceneDescription::from_json(&json) {
        Ok(scene) => {
            tracing::info!("Loaded scene from {path} ({} objects)", scene.objects.len());
            Some(scene)
        }
        Err(e) => {
            tracing::error!("Failed to parse scene JSON from {path}: {e}");
            None
        }
    }
}
