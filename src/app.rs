use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context as _, Result};
use eframe::egui::{self, Context as EguiContext, Key, SidePanel};
use eframe::{App, Frame};
use tracing::{error, info};

use crate::canvas;
use crate::config::AppConfig;
use crate::controls::{self, StatusLine};
use crate::export;
use crate::loader::{ImageLoader, LoadEvent};
use crate::session::Session;
use crate::theme;
use crate::ui_controls;
use crate::view::ResizeGesture;

const IMAGE_EXTENSIONS: [&str; 6] = ["png", "jpg", "jpeg", "bmp", "gif", "webp"];

pub struct SegmeterApp {
    session: Session,
    loader: ImageLoader,
    config: AppConfig,
    resize: Option<ResizeGesture>,
    status: Option<StatusLine>,
    theme: theme::AppTheme,
}

impl SegmeterApp {
    pub fn new(cc: &eframe::CreationContext<'_>, config: AppConfig) -> Self {
        let theme = theme::AppTheme::for_mode(config.theme);
        theme::apply_theme(&cc.egui_ctx, &theme);

        Self {
            session: Session::new(&config),
            loader: ImageLoader::default(),
            config,
            resize: None,
            status: None,
            theme,
        }
    }

    fn request_load(&mut self, path: PathBuf) {
        let generation = self.session.begin_load();
        info!(generation, path = %path.display(), "loading image");
        self.loader.request(generation, path);
        self.status = None;
    }

    fn open_image_dialog(&mut self) {
        let file = rfd::FileDialog::new()
            .set_title("Open image")
            .add_filter("Images", &IMAGE_EXTENSIONS[..])
            .pick_file();

        if let Some(path) = file {
            self.request_load(path);
        }
    }

    fn process_load_events(&mut self, ctx: &EguiContext) {
        while let Some(event) = self.loader.try_recv() {
            match event {
                LoadEvent::Decoded {
                    generation,
                    path,
                    image,
                } => {
                    if self.session.finish_load(generation, image, Some(path)) {
                        self.status = None;
                    }
                }
                LoadEvent::Failed {
                    generation,
                    error: err,
                } => {
                    if self.session.fail_load(generation) {
                        let err = anyhow::Error::new(err).context("cannot load image");
                        error!("{err:#}");
                        self.status = Some(StatusLine::Error(format!("{err:#}")));
                    }
                }
            }
            ctx.request_repaint();
        }
    }

    fn handle_dropped_files(&mut self, ctx: &EguiContext) {
        let dropped = ctx.input(|input| {
            input
                .raw
                .dropped_files
                .iter()
                .find_map(|file| file.path.clone())
        });
        if let Some(path) = dropped {
            self.request_load(path);
        }
    }

    fn handle_shortcuts(&mut self, ctx: &EguiContext) {
        let cmd = ctx.input(|input| input.modifiers.command || input.modifiers.ctrl);

        if ctx.input(|input| input.key_pressed(Key::Escape)) {
            self.session.cancel_placement();
        }

        if cmd {
            if ctx.input(|input| input.key_pressed(Key::O)) {
                self.open_image_dialog();
            }
            if ctx.input(|input| input.key_pressed(Key::S)) {
                self.run_export();
            }
            return;
        }

        // Keep +/- for the reference length field while it has focus.
        if ctx.wants_keyboard_input() {
            return;
        }

        if ctx.input(|input| input.key_pressed(Key::Plus) || input.key_pressed(Key::Equals)) {
            self.session.zoom_in();
        }

        if ctx.input(|input| input.key_pressed(Key::Minus)) {
            self.session.zoom_out();
        }
    }

    fn run_export(&mut self) {
        match self.export_to_file() {
            Ok(Some(path)) => {
                self.status = Some(StatusLine::Info(format!("Saved {}", path.display())));
            }
            Ok(None) => {}
            Err(err) => {
                error!("{err:#}");
                self.status = Some(StatusLine::Error(format!("{err:#}")));
            }
        }
    }

    fn export_to_file(&mut self) -> Result<Option<PathBuf>> {
        if !self.session.is_ready() {
            return Ok(None);
        }

        let default_name = export::default_file_name(&self.config.export_file_prefix);
        let file = rfd::FileDialog::new()
            .set_title("Export measurement")
            .set_file_name(&default_name)
            .add_filter("PNG", &["png"])
            .save_file();

        let Some(mut path) = file else {
            return Ok(None);
        };
        if path.extension().is_none() {
            path.set_extension("png");
        }

        export::export_png(&self.session, &path)
            .with_context(|| format!("cannot export to {}", path.display()))?;
        Ok(Some(path))
    }
}

impl App for SegmeterApp {
    fn update(&mut self, ctx: &EguiContext, _frame: &mut Frame) {
        self.process_load_events(ctx);
        self.handle_dropped_files(ctx);
        self.handle_shortcuts(ctx);

        let output = SidePanel::right("controls")
            .resizable(false)
            .exact_width(self.theme.layout.side_panel_width)
            .frame(ui_controls::side_panel_frame(&self.theme))
            .show(ctx, |ui| {
                controls::show_controls(ui, &mut self.session, self.status.as_ref(), &self.theme)
            })
            .inner;

        egui::CentralPanel::default()
            .frame(
                egui::Frame::none()
                    .fill(self.theme.surfaces.app_bg)
                    .inner_margin(egui::Margin::same(self.theme.layout.gap_large)),
            )
            .show(ctx, |ui| {
                canvas::show_canvas(ui, ctx, &mut self.session, &mut self.resize, &self.theme);
            });

        if output.open {
            self.open_image_dialog();
        }
        if output.export {
            self.run_export();
        }
        if output.toggle_theme {
            self.theme = theme::AppTheme::for_mode(self.theme.mode.toggled());
            theme::apply_theme(ctx, &self.theme);
        }

        if self.session.is_loading() {
            ctx.request_repaint_after(Duration::from_millis(50));
        }
    }
}
