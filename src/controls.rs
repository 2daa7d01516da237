use egui::{DragValue, RichText, Ui};

use crate::measurement::UNIT_SUFFIX;
use crate::points::{PointLabel, SegmentRole};
use crate::session::Session;
use crate::theme::AppTheme;
use crate::ui_controls::{self, Emphasis};

/// Line shown at the bottom of the side panel.
#[derive(Clone, Debug, PartialEq)]
pub enum StatusLine {
    Info(String),
    Error(String),
}

#[derive(Default)]
pub struct ControlsOutput {
    pub open: bool,
    pub export: bool,
    pub toggle_theme: bool,
}

pub fn placement_label(placing: bool) -> &'static str {
    if placing {
        "Cancel placement"
    } else {
        "Place points"
    }
}

fn image_caption(session: &Session) -> String {
    if session.is_loading() {
        return "Loading…".to_string();
    }
    match session.image.as_ref() {
        None => "No image loaded".to_string(),
        Some(image) => image
            .source
            .as_ref()
            .and_then(|path| path.file_name())
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "Untitled image".to_string()),
    }
}

pub fn show_controls(
    ui: &mut Ui,
    session: &mut Session,
    status: Option<&StatusLine>,
    theme: &AppTheme,
) -> ControlsOutput {
    let mut out = ControlsOutput::default();

    ui.horizontal(|ui| {
        ui.label(RichText::new("Segmeter").strong().size(20.0));
        ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
            if ui.small_button(theme.mode.toggle_label()).clicked() {
                out.toggle_theme = true;
            }
        });
    });
    ui.add_space(theme.layout.gap);

    ui_controls::section(ui, theme, "Image", |ui| {
        let emphasis = if session.image.is_none() {
            Emphasis::Primary
        } else {
            Emphasis::Quiet
        };
        if ui_controls::action_button(ui, theme, "Open image…", emphasis).clicked() {
            out.open = true;
        }
        ui_controls::hint(ui, theme, &image_caption(session));
    });

    ui.add_space(theme.layout.gap);

    ui_controls::section(ui, theme, "Points", |ui| {
        let placing = session.placement().is_placing();
        let emphasis = if placing {
            Emphasis::Quiet
        } else {
            Emphasis::Primary
        };
        let toggle = ui.add_enabled_ui(placing || session.is_ready(), |ui| {
            ui_controls::action_button(ui, theme, placement_label(placing), emphasis)
        });
        if toggle.inner.clicked() {
            session.toggle_placement();
        }

        if placing {
            if let Some(next) = PointLabel::nth(session.placement().points().len()) {
                ui_controls::hint(ui, theme, &format!("Click the image to place {next}"));
            }
        }
        ui_controls::segment_legend(ui, theme, SegmentRole::Ab, "AB: reference segment");
        ui_controls::segment_legend(ui, theme, SegmentRole::Cd, "CD: measured segment");
    });

    ui.add_space(theme.layout.gap);

    ui_controls::section(ui, theme, "Calibration", |ui| {
        ui.checkbox(
            &mut session.settings.use_centimeters,
            format!("Measure in {UNIT_SUFFIX}"),
        );
        ui.add_enabled_ui(session.settings.use_centimeters, |ui| {
            ui.horizontal(|ui| {
                ui.label("AB equals");
                ui.add(
                    DragValue::new(&mut session.settings.reference_length)
                        .speed(0.1)
                        .clamp_range(0.1..=10_000.0)
                        .suffix(format!(" {UNIT_SUFFIX}")),
                );
            });
        });
    });

    ui.add_space(theme.layout.gap);

    ui_controls::section(ui, theme, "Analysis", |ui| match session.analysis() {
        Some(analysis) => {
            for line in analysis.lines() {
                ui.label(line);
            }
        }
        None => ui_controls::hint(ui, theme, "Place A, B, C and D to measure"),
    });

    ui.add_space(theme.layout.gap_large);

    let export = ui.add_enabled_ui(session.is_ready(), |ui| {
        ui_controls::action_button(ui, theme, "Export PNG…", Emphasis::Quiet)
    });
    if export.inner.clicked() {
        out.export = true;
    }

    if let Some(status) = status {
        ui.add_space(theme.layout.gap);
        let (text, color) = match status {
            StatusLine::Info(text) => (text, theme.text.secondary),
            StatusLine::Error(text) => (text, theme.text.error),
        };
        ui.label(RichText::new(text).color(color).size(13.0));
    }

    out
}
