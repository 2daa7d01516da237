use egui::epaint::Shadow;
use egui::style::WidgetVisuals;
use egui::{vec2, Color32, Context, FontFamily, FontId, Rounding, Stroke, TextStyle, Visuals};
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThemeMode {
    #[default]
    Dark,
    Light,
}

impl ThemeMode {
    pub fn toggled(self) -> Self {
        match self {
            Self::Dark => Self::Light,
            Self::Light => Self::Dark,
        }
    }

    /// Label for the button that switches away from this mode.
    pub fn toggle_label(self) -> &'static str {
        match self {
            Self::Dark => "☀ Light theme",
            Self::Light => "☾ Dark theme",
        }
    }
}

#[derive(Clone, Debug)]
pub struct AppTheme {
    pub mode: ThemeMode,
    pub surfaces: SurfaceTokens,
    pub text: TextTokens,
    pub controls: ControlTokens,
    pub layout: LayoutTokens,
}

#[derive(Clone, Debug)]
pub struct SurfaceTokens {
    pub app_bg: Color32,
    pub panel_bg: Color32,
    pub card_bg: Color32,
    pub control_bg: Color32,
    /// Fill behind the measured image; exports use the same white in both modes.
    pub measure_bg: Color32,
    pub outline: Color32,
    pub outline_strong: Color32,
    pub accent: Color32,
    pub accent_soft: Color32,
    pub shadow: Color32,
}

#[derive(Clone, Debug)]
pub struct TextTokens {
    pub primary: Color32,
    pub secondary: Color32,
    pub muted: Color32,
    pub error: Color32,
}

#[derive(Clone, Debug)]
pub struct ControlTokens {
    pub rounding: f32,
    pub card_rounding: f32,
    pub button_height: f32,
    pub zoom_button_size: f32,
    pub swatch_size: f32,
}

#[derive(Clone, Debug)]
pub struct LayoutTokens {
    pub gap_small: f32,
    pub gap: f32,
    pub gap_large: f32,
    pub panel_padding: f32,
    pub side_panel_width: f32,
}

impl AppTheme {
    pub fn for_mode(mode: ThemeMode) -> Self {
        let (surfaces, text) = match mode {
            ThemeMode::Dark => (
                SurfaceTokens {
                    app_bg: Color32::from_rgb(0x15, 0x17, 0x1C),
                    panel_bg: Color32::from_rgb(0x1B, 0x1E, 0x25),
                    card_bg: Color32::from_rgb(0x22, 0x26, 0x2F),
                    control_bg: Color32::from_rgb(0x2A, 0x2F, 0x3A),
                    measure_bg: Color32::WHITE,
                    outline: Color32::from_rgba_unmultiplied(255, 255, 255, 28),
                    outline_strong: Color32::from_rgba_unmultiplied(255, 255, 255, 60),
                    accent: Color32::from_rgb(0x3F, 0x7B, 0xF5),
                    accent_soft: Color32::from_rgba_unmultiplied(63, 123, 245, 90),
                    shadow: Color32::from_rgba_unmultiplied(0, 0, 0, 96),
                },
                TextTokens {
                    primary: Color32::from_rgb(0xF2, 0xF5, 0xFA),
                    secondary: Color32::from_rgb(0xB0, 0xBA, 0xCC),
                    muted: Color32::from_rgb(0x7E, 0x89, 0x9E),
                    error: Color32::from_rgb(0xFF, 0x7A, 0x70),
                },
            ),
            ThemeMode::Light => (
                SurfaceTokens {
                    app_bg: Color32::from_rgb(0xE9, 0xEC, 0xF1),
                    panel_bg: Color32::from_rgb(0xF6, 0xF7, 0xF9),
                    card_bg: Color32::WHITE,
                    control_bg: Color32::from_rgb(0xEE, 0xF1, 0xF6),
                    measure_bg: Color32::WHITE,
                    outline: Color32::from_rgba_unmultiplied(0, 0, 0, 30),
                    outline_strong: Color32::from_rgba_unmultiplied(0, 0, 0, 70),
                    accent: Color32::from_rgb(0x25, 0x63, 0xEB),
                    accent_soft: Color32::from_rgba_unmultiplied(37, 99, 235, 60),
                    shadow: Color32::from_rgba_unmultiplied(0, 0, 0, 40),
                },
                TextTokens {
                    primary: Color32::from_rgb(0x16, 0x1A, 0x22),
                    secondary: Color32::from_rgb(0x44, 0x4C, 0x5C),
                    muted: Color32::from_rgb(0x76, 0x7F, 0x90),
                    error: Color32::from_rgb(0xC6, 0x28, 0x28),
                },
            ),
        };

        Self {
            mode,
            surfaces,
            text,
            controls: ControlTokens {
                rounding: 6.0,
                card_rounding: 10.0,
                button_height: 32.0,
                zoom_button_size: 30.0,
                swatch_size: 12.0,
            },
            layout: LayoutTokens {
                gap_small: 4.0,
                gap: 8.0,
                gap_large: 16.0,
                panel_padding: 12.0,
                side_panel_width: 280.0,
            },
        }
    }
}

fn set_widget(visuals: &mut WidgetVisuals, fill: Color32, outline: Color32, text: Color32, rounding: f32) {
    visuals.bg_fill = fill;
    visuals.weak_bg_fill = fill;
    visuals.bg_stroke = Stroke::new(1.0, outline);
    visuals.fg_stroke = Stroke::new(1.0, text);
    visuals.rounding = Rounding::same(rounding);
}

pub fn apply_theme(ctx: &Context, theme: &AppTheme) {
    let mut style = (*ctx.style()).clone();
    let surfaces = &theme.surfaces;
    let text = &theme.text;
    let rounding = theme.controls.rounding;

    style.spacing.item_spacing = vec2(theme.layout.gap, theme.layout.gap);
    style.spacing.button_padding = vec2(theme.layout.panel_padding, theme.layout.gap_small);

    let mut visuals = match theme.mode {
        ThemeMode::Dark => Visuals::dark(),
        ThemeMode::Light => Visuals::light(),
    };
    visuals.override_text_color = Some(text.primary);
    visuals.panel_fill = surfaces.panel_bg;
    visuals.window_fill = surfaces.panel_bg;
    visuals.extreme_bg_color = surfaces.control_bg;
    visuals.window_rounding = Rounding::same(theme.controls.card_rounding);

    let widgets = &mut visuals.widgets;
    set_widget(&mut widgets.noninteractive, surfaces.panel_bg, surfaces.outline, text.secondary, rounding);
    set_widget(&mut widgets.inactive, surfaces.control_bg, surfaces.outline, text.secondary, rounding);
    set_widget(&mut widgets.hovered, surfaces.card_bg, surfaces.outline_strong, text.primary, rounding);
    set_widget(&mut widgets.active, surfaces.accent_soft, surfaces.accent, text.primary, rounding);
    set_widget(&mut widgets.open, surfaces.card_bg, surfaces.outline_strong, text.primary, rounding);

    visuals.selection.bg_fill = surfaces.accent_soft;
    visuals.selection.stroke = Stroke::new(1.0, surfaces.accent);
    visuals.popup_shadow = Shadow {
        offset: vec2(0.0, 6.0),
        blur: 16.0,
        spread: 0.0,
        color: surfaces.shadow,
    };
    style.visuals = visuals;

    for (text_style, size) in [
        (TextStyle::Body, 15.0),
        (TextStyle::Button, 14.0),
        (TextStyle::Small, 12.0),
    ] {
        style
            .text_styles
            .insert(text_style, FontId::new(size, FontFamily::Proportional));
    }

    ctx.set_style(style);
}
