//! Main application module

mod keyboard;
mod menus;

use std::time::{Duration, Instant};

use eframe::egui;
use shared::{BuildVolume, SceneDescription};

use crate::panel::ViewportPanel;
use crate::state::{AppSettings, AppState};
use crate::ui::{object_list, status_bar};
use plater_view_lib::redraw::{RedrawSignal, RedrawTicker};
use plater_view_lib::viewport::Viewport;

/// Command line overrides
#[derive(Debug, Default)]
pub struct StartupOptions {
    pub scene: Option<SceneDescription>,
    pub build_volume: Option<BuildVolume>,
    pub orthographic: bool,
}

/// Main application
pub struct PlaterApp {
    state: AppState,
    viewport: Viewport,
    panel: ViewportPanel,
    /// Runs the periodic redraw ticker; `None` if it could not be started
    runtime: Option<tokio::runtime::Runtime>,
    ticker: Option<RedrawTicker>,
    last_frame: Instant,
}

impl PlaterApp {
    pub fn new(cc: &eframe::CreationContext<'_>, options: StartupOptions) -> Self {
        let mut settings = AppSettings::load();
        // Volume precedence: command line, then scene file, then settings
        if let Some(volume) = options
            .build_volume
            .or_else(|| options.scene.as_ref().and_then(|s| s.build_volume))
        {
            settings.build_volume = volume;
        }
        if options.orthographic {
            settings.viewport.orthographic = true;
        }

        let ctx = cc.egui_ctx.clone();
        let redraw = RedrawSignal::with_waker(move || ctx.request_repaint());
        let mut viewport = Viewport::new(settings.build_volume, &settings, redraw.clone());
        let mut state = AppState::new(settings);

        if let Some(scene) = &options.scene {
            for spec in &scene.objects {
                menus::place(&mut state, &mut viewport, spec);
            }
            tracing::info!("Placed {} objects from scene file", scene.objects.len());
        }

        let panel = ViewportPanel::new(cc.gl.as_deref());

        let interval = Duration::from_millis(state.settings.viewport.redraw_interval_ms);
        let (runtime, ticker) = match tokio::runtime::Builder::new_multi_thread()
            .worker_threads(1)
            .thread_name("redraw-ticker")
            .enable_time()
            .build()
        {
            Ok(runtime) => {
                let ticker = RedrawTicker::spawn(runtime.handle(), interval, redraw);
                (Some(runtime), Some(ticker))
            }
            Err(e) => {
                tracing::error!("Cannot start redraw ticker: {e}");
                (None, None)
            }
        };

        Self {
            state,
            viewport,
            panel,
            runtime,
            ticker,
            last_frame: Instant::now(),
        }
    }
}

impl eframe::App for PlaterApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // ── Frame clock ───────────────────────────────────────
        let now = Instant::now();
        let elapsed = now - self.last_frame;
        self.last_frame = now;
        self.viewport.advance(elapsed, &mut self.state.objects);

        keyboard::handle_keyboard(ctx, &mut self.state, &mut self.viewport);

        // ── Menu bar ──────────────────────────────────────────
        egui::TopBottomPanel::top("menu_bar").show(ctx, |ui| {
            egui::menu::bar(ui, |ui| {
                menus::file_menu(ui, &mut self.state);
                menus::edit_menu(ui, &mut self.state, &mut self.viewport);
                menus::add_menu(ui, &mut self.state, &mut self.viewport);
                menus::view_menu(ui, &mut self.state, &mut self.viewport);
            });
        });

        // ── Status bar ───────────────────────────────────────
        egui::TopBottomPanel::bottom("status_bar")
            .exact_height(22.0)
            .frame(
                egui::Frame::side_top_panel(&ctx.style()).inner_margin(egui::Margin::symmetric(8, 2)),
            )
            .show(ctx, |ui| {
                status_bar::show(ui, &self.state, &self.viewport, self.panel.backend_error());
            });

        // ── Left panel: Object list ──────────────────────────
        egui::SidePanel::left("object_list")
            .default_width(180.0)
            .width_range(120.0..=360.0)
            .resizable(true)
            .frame(egui::Frame::side_top_panel(&ctx.style()).inner_margin(egui::Margin::same(6)))
            .show(ctx, |ui| {
                object_list::show(ui, &mut self.state);
            });

        // ── Central panel: 3D viewport ───────────────────────
        egui::CentralPanel::default()
            .frame(egui::Frame::NONE)
            .show(ctx, |ui| {
                self.panel.show(ui, &mut self.viewport, &mut self.state);
            });

        // Requests raised this frame are served by the repaint already scheduled
        self.viewport.redraw_signal().take();
        if self.viewport.is_animating() {
            ctx.request_repaint();
        }
    }

    fn on_exit(&mut self, gl: Option<&glow::Context>) {
        if let Some(ticker) = self.ticker.take() {
            ticker.stop();
        }
        if let Some(runtime) = self.runtime.take() {
            runtime.shutdown_background();
        }
        self.viewport.close(&mut self.state.objects);
        if let Some(gl) = gl {
            self.panel.destroy(gl);
        }
        self.state.settings.save();
        tracing::info!("Viewport closed");
    }
}
