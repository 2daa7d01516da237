use std::path::Path;

use ab_glyph::FontArc;
use chrono::Local;
use egui::{vec2, Color32, Pos2, Vec2};
use image::{DynamicImage, ImageFormat, Rgba, RgbaImage};
use imageproc::drawing::draw_text_mut;
use tiny_skia::{
    Color, FillRule, FilterQuality, IntSize, Paint, PathBuilder, Pattern, Pixmap, Rect,
    SpreadMode, Stroke, Transform,
};
use tracing::{info, warn};

use crate::error::{Result, SegmeterError};
use crate::render::DrawOp;
use crate::session::Session;
use crate::view::ViewMapping;

/// Renders the session exactly as the canvas shows it and writes a PNG.
pub fn export_png(session: &Session, path: &Path) -> Result<()> {
    let image = session.image.as_ref().ok_or(SegmeterError::NoImage)?;
    let rendered = render_surface(
        &session.draw_ops(),
        session.view().surface_size(),
        Some(&image.dynamic),
    )?;
    rendered
        .save_with_format(path, ImageFormat::Png)
        .map_err(|source| SegmeterError::Write {
            path: path.to_path_buf(),
            source,
        })?;
    info!(path = %path.display(), "surface exported");
    Ok(())
}

pub fn default_file_name(prefix: &str) -> String {
    format!("{prefix} {}.png", Local::now().format("%Y-%m-%d at %H.%M.%S"))
}

struct PendingLabel {
    screen: Pos2,
    text: String,
    size: f32,
    color: Color32,
}

/// Rasterizes a draw list onto a surface-sized image with a white background.
pub fn render_surface(
    ops: &[DrawOp],
    surface_size: Vec2,
    image: Option<&DynamicImage>,
) -> Result<DynamicImage> {
    let width = surface_size.x.round().max(1.0) as u32;
    let height = surface_size.y.round().max(1.0) as u32;
    let mut pixmap =
        Pixmap::new(width, height).ok_or_else(|| render_error("cannot allocate pixmap"))?;

    let mut mapping = ViewMapping::default();
    let mut labels = Vec::new();

    for op in ops {
        match op {
            DrawOp::Clear => pixmap.fill(Color::WHITE),
            DrawOp::Transform(next) => mapping = *next,
            DrawOp::Image { origin, size } => {
                if let Some(image) = image {
                    let min = mapping.view_to_screen(*origin);
                    draw_image(&mut pixmap, image, min, *size, mapping.scale)?;
                }
            }
            DrawOp::Line {
                from,
                to,
                width,
                color,
                ..
            } => {
                let line = (mapping.view_to_screen(*from), mapping.view_to_screen(*to));
                stroke_lines(&mut pixmap, &[line], mapping.length_to_screen(*width), *color);
            }
            DrawOp::Marker {
                center,
                radius,
                color,
            } => {
                let center = mapping.view_to_screen(*center);
                let path =
                    PathBuilder::from_circle(center.x, center.y, mapping.length_to_screen(*radius))
                        .ok_or_else(|| render_error("cannot build marker"))?;
                pixmap.fill_path(
                    &path,
                    &paint_for(*color),
                    FillRule::Winding,
                    Transform::identity(),
                    None,
                );
            }
            DrawOp::Label {
                anchor,
                text,
                font_size,
                color,
            } => labels.push(PendingLabel {
                screen: mapping.view_to_screen(*anchor),
                text: text.clone(),
                size: mapping.length_to_screen(*font_size),
                color: *color,
            }),
            DrawOp::Crosshair {
                center,
                arm,
                width,
                color,
            } => {
                let center = mapping.view_to_screen(*center);
                let arm = mapping.length_to_screen(*arm);
                let vertical = (center - vec2(0.0, arm), center + vec2(0.0, arm));
                let horizontal = (center - vec2(arm, 0.0), center + vec2(arm, 0.0));
                stroke_lines(
                    &mut pixmap,
                    &[vertical, horizontal],
                    mapping.length_to_screen(*width),
                    *color,
                );
            }
        }
    }

    let mut output = RgbaImage::new(width, height);
    for (src, dst) in pixmap.pixels().iter().zip(output.pixels_mut()) {
        let color = src.demultiply();
        *dst = Rgba([color.red(), color.green(), color.blue(), color.alpha()]);
    }

    draw_labels(&mut output, &labels);

    Ok(DynamicImage::ImageRgba8(output))
}

fn render_error(message: &str) -> SegmeterError {
    SegmeterError::Render(message.to_string())
}

fn paint_for(color: Color32) -> Paint<'static> {
    let [r, g, b, a] = color.to_srgba_unmultiplied();
    let mut paint = Paint::default();
    paint.set_color_rgba8(r, g, b, a);
    paint.anti_alias = true;
    paint
}

fn stroke_lines(pixmap: &mut Pixmap, lines: &[(Pos2, Pos2)], width: f32, color: Color32) {
    let mut pb = PathBuilder::new();
    for (from, to) in lines {
        pb.move_to(from.x, from.y);
        pb.line_to(to.x, to.y);
    }
    // Zero-length segments produce no path; nothing to draw.
    let Some(path) = pb.finish() else {
        return;
    };
    let stroke = Stroke {
        width,
        ..Default::default()
    };
    pixmap.stroke_path(&path, &paint_for(color), &stroke, Transform::identity(), None);
}

/// Draws the image with its top-left corner at `min` (screen pixels), scaled by `scale`.
fn draw_image(
    pixmap: &mut Pixmap,
    image: &DynamicImage,
    min: Pos2,
    size: Vec2,
    scale: f32,
) -> Result<()> {
    let source = image_to_pixmap(image)?;
    let rect = Rect::from_xywh(min.x, min.y, size.x * scale, size.y * scale)
        .ok_or_else(|| render_error("invalid image rectangle"))?;
    let paint = Paint {
        shader: Pattern::new(
            source.as_ref(),
            SpreadMode::Pad,
            FilterQuality::Bilinear,
            1.0,
            Transform::from_row(scale, 0.0, 0.0, scale, min.x, min.y),
        ),
        anti_alias: true,
        ..Default::default()
    };
    pixmap.fill_rect(rect, &paint, Transform::identity(), None);
    Ok(())
}

fn image_to_pixmap(image: &DynamicImage) -> Result<Pixmap> {
    let rgba = image.to_rgba8();
    let size = IntSize::from_wh(rgba.width(), rgba.height())
        .ok_or_else(|| render_error("image has no pixels"))?;
    let mut data = rgba.into_raw();
    for px in data.chunks_exact_mut(4) {
        let alpha = u16::from(px[3]);
        for channel in &mut px[..3] {
            *channel = ((u16::from(*channel) * alpha + 127) / 255) as u8;
        }
    }
    Pixmap::from_vec(data, size).ok_or_else(|| render_error("source image and pixmap size mismatch"))
}

fn draw_labels(image: &mut RgbaImage, labels: &[PendingLabel]) {
    if labels.is_empty() {
        return;
    }
    let Some(font) = load_system_font() else {
        warn!("no usable font found, exporting without point labels");
        return;
    };

    for label in labels {
        // The anchor is the text baseline; imageproc draws from the top edge.
        draw_text_mut(
            image,
            Rgba(label.color.to_srgba_unmultiplied()),
            label.screen.x as i32,
            (label.screen.y - label.size) as i32,
            label.size,
            &font,
            &label.text,
        );
    }
}

fn load_system_font() -> Option<FontArc> {
    let candidates = [
        "/System/Library/Fonts/Supplemental/Arial.ttf",
        "/System/Library/Fonts/Supplemental/Arial Unicode.ttf",
        "/System/Library/Fonts/SFNS.ttf",
        "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
        "/usr/share/fonts/TTF/DejaVuSans.ttf",
        "/usr/share/fonts/truetype/liberation/LiberationSans-Regular.ttf",
        "C:\\Windows\\Fonts\\arial.ttf",
    ];

    for path in candidates {
        if let Ok(bytes) = std::fs::read(path) {
            if let Ok(font) = FontArc::try_from_vec(bytes) {
                return Some(font);
            }
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use egui::{pos2, vec2};
    use image::{DynamicImage, GenericImageView, Rgba, RgbaImage};

    use super::{default_file_name, export_png, render_surface};
    use crate::error::SegmeterError;
    use crate::session::Session;

    fn blue_image(width: u32, height: u32) -> DynamicImage {
        DynamicImage::ImageRgba8(RgbaImage::from_pixel(width, height, Rgba([0, 0, 255, 255])))
    }

    #[test]
    fn render_keeps_surface_size_and_centers_image() {
        let mut session = Session::default();
        session.load_image(blue_image(40, 30), None);

        let image = session.image.as_ref().map(|image| &image.dynamic);
        let rendered = render_surface(&session.draw_ops(), session.view().surface_size(), image)
            .expect("render should succeed");

        assert_eq!(rendered.dimensions(), (800, 600));
        // image occupies (380, 285)..(420, 315)
        assert_eq!(rendered.get_pixel(400, 300), Rgba([0, 0, 255, 255]));
        assert_eq!(rendered.get_pixel(5, 5), Rgba([255, 255, 255, 255]));
    }

    #[test]
    fn render_follows_zoom_and_pan() {
        let mut session = Session::default();
        session.load_image(blue_image(40, 30), None);
        session.zoom(2.0);
        session.pan(vec2(-300.0, 0.0));

        let image = session.image.as_ref().map(|image| &image.dynamic);
        let rendered = render_surface(&session.draw_ops(), session.view().surface_size(), image)
            .expect("render should succeed");

        // scaled image spans x 360..440 before panning, 60..140 after
        assert_eq!(rendered.get_pixel(100, 300), Rgba([0, 0, 255, 255]));
        assert_eq!(rendered.get_pixel(400, 300), Rgba([255, 255, 255, 255]));
    }

    #[test]
    fn segments_are_rasterized() {
        let mut session = Session::default();
        session.load_image(
            DynamicImage::ImageRgba8(RgbaImage::from_pixel(200, 200, Rgba([255, 255, 255, 255]))),
            None,
        );
        session.toggle_placement();
        // image origin is (300, 200)
        session.place_point(pos2(320.0, 250.0));
        session.place_point(pos2(380.0, 250.0));

        let image = session.image.as_ref().map(|image| &image.dynamic);
        let rendered = render_surface(&session.draw_ops(), session.view().surface_size(), image)
            .expect("render should succeed");
        let pixel = rendered.get_pixel(350, 250);
        assert!(pixel[2] > 200 && pixel[0] < 100, "expected blue, got {pixel:?}");
    }

    #[test]
    fn marker_lands_where_the_point_was_clicked() {
        let mut session = Session::default();
        session.load_image(
            DynamicImage::ImageRgba8(RgbaImage::from_pixel(300, 200, Rgba([255, 255, 255, 255]))),
            None,
        );
        session.zoom(1.6);
        session.pan(vec2(-45.0, 30.0));
        session.toggle_placement();
        session.place_point(pos2(412.0, 288.0));
        session.track_pointer(None);

        let image = session.image.as_ref().map(|image| &image.dynamic);
        let rendered = render_surface(&session.draw_ops(), session.view().surface_size(), image)
            .expect("render should succeed");
        let pixel = rendered.get_pixel(412, 288);
        assert!(pixel[0] > 200 && pixel[1] < 60 && pixel[2] < 60, "expected red, got {pixel:?}");
        assert_eq!(rendered.get_pixel(412, 278), Rgba([255, 255, 255, 255]));
    }

    #[test]
    fn export_without_image_fails() {
        let session = Session::default();
        let path = std::env::temp_dir().join("segmeter-never-written.png");
        assert!(matches!(
            export_png(&session, &path),
            Err(SegmeterError::NoImage)
        ));
    }

    #[test]
    fn export_writes_png() {
        let mut session = Session::default();
        session.load_image(blue_image(10, 10), None);
        let path = std::env::temp_dir().join(format!("segmeter-export-{}.png", std::process::id()));

        export_png(&session, &path).expect("export should succeed");
        let written = image::open(&path).expect("exported file decodes");
        assert_eq!(written.dimensions(), (800, 600));
        let _ = std::fs::remove_file(path);
    }

    #[test]
    fn default_name_is_png() {
        let name = default_file_name("Measurement");
        assert!(name.starts_with("Measurement "));
        assert!(name.ends_with(".png"));
    }
}
