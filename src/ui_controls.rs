use egui::{vec2, Frame, Margin, Response, RichText, Rounding, Sense, Stroke, Ui};

use crate::points::SegmentRole;
use crate::theme::AppTheme;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Emphasis {
    /// Filled with the accent colour; the next useful step.
    Primary,
    Quiet,
}

pub fn side_panel_frame(theme: &AppTheme) -> Frame {
    Frame::none()
        .fill(theme.surfaces.panel_bg)
        .inner_margin(Margin::same(theme.layout.panel_padding))
}

/// A titled card spanning the panel width.
pub fn section<R>(
    ui: &mut Ui,
    theme: &AppTheme,
    title: &str,
    add_contents: impl FnOnce(&mut Ui) -> R,
) -> R {
    Frame::none()
        .fill(theme.surfaces.card_bg)
        .rounding(Rounding::same(theme.controls.card_rounding))
        .stroke(Stroke::new(1.0, theme.surfaces.outline))
        .inner_margin(Margin::same(theme.layout.panel_padding))
        .show(ui, |ui| {
            ui.set_width(ui.available_width());
            ui.label(RichText::new(title).strong().color(theme.text.primary));
            ui.add_space(theme.layout.gap_small);
            add_contents(ui)
        })
        .inner
}

/// Full-width panel button.
pub fn action_button(ui: &mut Ui, theme: &AppTheme, label: &str, emphasis: Emphasis) -> Response {
    let (fill, outline, text) = match emphasis {
        Emphasis::Primary => (
            theme.surfaces.accent,
            theme.surfaces.accent,
            egui::Color32::WHITE,
        ),
        Emphasis::Quiet => (
            theme.surfaces.control_bg,
            theme.surfaces.outline,
            theme.text.secondary,
        ),
    };
    ui.add(
        egui::Button::new(RichText::new(label).color(text))
            .min_size(vec2(ui.available_width(), theme.controls.button_height))
            .fill(fill)
            .stroke(Stroke::new(1.0, outline))
            .rounding(Rounding::same(theme.controls.rounding)),
    )
}

/// Square button floating over the measuring surface, so it keeps a light
/// fill whatever the panel theme is.
pub fn zoom_button(ui: &mut Ui, theme: &AppTheme, glyph: &str, hint: &str) -> Response {
    let side = theme.controls.zoom_button_size;
    ui.add(
        egui::Button::new(RichText::new(glyph).size(18.0).color(egui::Color32::BLACK))
            .min_size(vec2(side, side))
            .fill(egui::Color32::from_white_alpha(230))
            .stroke(Stroke::new(1.0, egui::Color32::from_black_alpha(60)))
            .rounding(Rounding::same(side * 0.5)),
    )
    .on_hover_text(hint)
}

/// Colour swatch of a segment followed by a caption, so the panel text and
/// the overlay lines read the same way.
pub fn segment_legend(ui: &mut Ui, theme: &AppTheme, role: SegmentRole, caption: &str) {
    ui.horizontal(|ui| {
        let side = theme.controls.swatch_size;
        let (rect, _) = ui.allocate_exact_size(vec2(side * 2.0, side), Sense::hover());
        ui.painter()
            .line_segment([rect.left_center(), rect.right_center()], Stroke::new(3.0, role.color()));
        ui.label(RichText::new(caption).color(theme.text.secondary).size(13.0));
    });
}

pub fn hint(ui: &mut Ui, theme: &AppTheme, text: &str) {
    ui.label(RichText::new(text).color(theme.text.muted).size(13.0));
}
