use egui::{
    vec2, Align2, Color32, Context, CursorIcon, FontId, Id, Painter, PointerButton, Pos2, Rect,
    Response, ScrollArea, Sense, Shape, Stroke, TextureId, Ui, Vec2,
};

use crate::points::PlacedPoint;
use crate::render::{DrawOp, MARKER_RADIUS};
use crate::session::Session;
use crate::theme::AppTheme;
use crate::ui_controls;
use crate::view::{ResizeDirection, ResizeGesture, ViewMapping};

const HANDLE_THICKNESS: f32 = 8.0;

/// Draws the measuring surface and routes pointer input into the session.
pub fn show_canvas(
    ui: &mut Ui,
    ctx: &Context,
    session: &mut Session,
    resize: &mut Option<ResizeGesture>,
    theme: &AppTheme,
) {
    let texture_id = session
        .image
        .as_mut()
        .map(|image| image.ensure_texture(ctx).id());

    ScrollArea::both()
        .id_source("segmeter_surface_scroll")
        .show(ui, |ui| {
            let surface_size = session.view().surface_size();
            let (outer, _) = ui.allocate_exact_size(
                surface_size + Vec2::splat(HANDLE_THICKNESS * 2.0),
                Sense::hover(),
            );
            let surface = Rect::from_min_size(outer.min + Vec2::splat(HANDLE_THICKNESS), surface_size);

            let response = ui.interact(surface, Id::new("segmeter_surface"), Sense::click_and_drag());

            let painter = ui.painter_at(surface);
            let painted = paint_ops(&session.draw_ops(), surface, texture_id, theme);
            painter.extend(painted.shapes);
            for label in painted.labels {
                painter.text(
                    label.pos,
                    Align2::LEFT_BOTTOM,
                    label.text,
                    FontId::proportional(label.size),
                    label.color,
                );
            }
            painter.rect_stroke(surface, 0.0, Stroke::new(1.0, theme.surfaces.outline_strong));

            if session.is_loading() {
                surface_hint(&painter, surface, "Loading image…", theme);
            } else if session.image.is_none() {
                surface_hint(&painter, surface, "Open an image (Cmd+O) or drop one here", theme);
            }

            handle_pointer(ctx, session, &response, surface);
            zoom_buttons(ui, session, surface, theme);
            resize_handles(ui, ctx, session, resize, surface);
        });
}

struct ScreenLabel {
    pos: Pos2,
    text: String,
    size: f32,
    color: Color32,
}

/// Egui shapes for one frame. Text needs the font atlas, so labels are
/// laid out separately by the painter.
struct PaintedOps {
    shapes: Vec<Shape>,
    labels: Vec<ScreenLabel>,
}

/// Converts a draw list to shapes in window coordinates. View-space
/// positions go through the most recent `Transform`, then move to the
/// surface's corner.
fn paint_ops(
    ops: &[DrawOp],
    surface: Rect,
    texture_id: Option<TextureId>,
    theme: &AppTheme,
) -> PaintedOps {
    let mut mapping = ViewMapping::default();
    let mut painted = PaintedOps {
        shapes: Vec::with_capacity(ops.len()),
        labels: Vec::new(),
    };
    let to_window =
        |mapping: &ViewMapping, pos: Pos2| surface.min + mapping.view_to_screen(pos).to_vec2();

    for op in ops {
        match op {
            DrawOp::Clear => {
                painted
                    .shapes
                    .push(Shape::rect_filled(surface, 0.0, theme.surfaces.measure_bg));
            }
            DrawOp::Transform(next) => mapping = *next,
            DrawOp::Image { origin, size } => {
                let Some(texture_id) = texture_id else {
                    continue;
                };
                let rect = Rect::from_min_size(to_window(&mapping, *origin), *size * mapping.scale);
                painted.shapes.push(Shape::image(
                    texture_id,
                    rect,
                    Rect::from_min_max(Pos2::ZERO, Pos2::new(1.0, 1.0)),
                    Color32::WHITE,
                ));
            }
            DrawOp::Line {
                from,
                to,
                width,
                color,
                ..
            } => {
                painted.shapes.push(Shape::line_segment(
                    [to_window(&mapping, *from), to_window(&mapping, *to)],
                    Stroke::new(mapping.length_to_screen(*width), *color),
                ));
            }
            DrawOp::Marker {
                center,
                radius,
                color,
            } => {
                painted.shapes.push(Shape::circle_filled(
                    to_window(&mapping, *center),
                    mapping.length_to_screen(*radius),
                    *color,
                ));
            }
            DrawOp::Label {
                anchor,
                text,
                font_size,
                color,
            } => painted.labels.push(ScreenLabel {
                pos: to_window(&mapping, *anchor),
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
                let center = to_window(&mapping, *center);
                let arm = mapping.length_to_screen(*arm);
                let stroke = Stroke::new(mapping.length_to_screen(*width), *color);
                painted.shapes.push(Shape::line_segment(
                    [center - vec2(0.0, arm), center + vec2(0.0, arm)],
                    stroke,
                ));
                painted.shapes.push(Shape::line_segment(
                    [center - vec2(arm, 0.0), center + vec2(arm, 0.0)],
                    stroke,
                ));
            }
        }
    }

    painted
}

fn surface_hint(painter: &Painter, surface: Rect, text: &str, theme: &AppTheme) {
    painter.text(
        surface.center(),
        Align2::CENTER_CENTER,
        text,
        FontId::proportional(17.0),
        theme.text.muted,
    );
}

#[derive(Clone, Copy, Debug, PartialEq)]
enum PointerAction {
    Place,
    Pan(Vec2),
    Idle,
}

/// While placing, a primary press drops a point and dragging does nothing.
/// Otherwise a primary drag pans.
fn pointer_action(placing: bool, pressed: bool, drag: Option<Vec2>) -> PointerAction {
    match (placing, pressed, drag) {
        (true, true, _) => PointerAction::Place,
        (false, _, Some(delta)) => PointerAction::Pan(delta),
        _ => PointerAction::Idle,
    }
}

/// The placed point whose marker is under `screen`, if any.
fn point_under(session: &Session, screen: Pos2) -> Option<PlacedPoint> {
    let view = session.view();
    session.placement().points().iter().copied().find(|point| {
        view.image_local_to_screen(point.position)
            .is_some_and(|at| at.distance(screen) <= MARKER_RADIUS + 2.0)
    })
}

fn handle_pointer(ctx: &Context, session: &mut Session, response: &Response, surface: Rect) {
    let to_surface = |pos: Pos2| (pos - surface.min).to_pos2();

    let hover = response.hover_pos().map(to_surface);
    session.track_pointer(hover);

    let placing = session.placement().is_placing();
    let pressed = response.hovered() && ctx.input(|input| input.pointer.primary_pressed());
    let drag = response
        .dragged_by(PointerButton::Primary)
        .then(|| response.drag_delta());

    match pointer_action(placing, pressed, drag) {
        PointerAction::Place => {
            if let Some(pos) = ctx.input(|input| input.pointer.interact_pos()) {
                session.place_point(to_surface(pos));
            }
        }
        PointerAction::Pan(delta) => {
            session.pan(delta);
            ctx.set_cursor_icon(CursorIcon::Grabbing);
        }
        PointerAction::Idle => {}
    }

    if !response.hovered() {
        return;
    }

    let zoom = ctx.input(|input| input.zoom_delta());
    if zoom != 1.0 {
        session.zoom(zoom);
    }

    if placing {
        ctx.set_cursor_icon(CursorIcon::Crosshair);
    } else if session.image.is_some() && drag.is_none() {
        ctx.set_cursor_icon(CursorIcon::Move);
    }

    if let Some(point) = hover.and_then(|screen| point_under(session, screen)) {
        response.clone().on_hover_text_at_pointer(format!(
            "{} ({:.0}, {:.0}) px",
            point.label, point.position.x, point.position.y
        ));
    }
}

fn zoom_buttons(ui: &mut Ui, session: &mut Session, surface: Rect, theme: &AppTheme) {
    let side = theme.controls.zoom_button_size;
    let margin = theme.layout.gap;
    let size = vec2(side * 2.0 + theme.layout.gap_small, side);
    let rect = Rect::from_min_size(surface.right_bottom() - size - Vec2::splat(margin), size);

    ui.allocate_ui_at_rect(rect, |ui| {
        ui.spacing_mut().item_spacing.x = theme.layout.gap_small;
        ui.horizontal(|ui| {
            if ui_controls::zoom_button(ui, theme, "−", "Zoom out (-)").clicked() {
                session.zoom_out();
            }
            if ui_controls::zoom_button(ui, theme, "+", "Zoom in (+)").clicked() {
                session.zoom_in();
            }
        });
    });
}

fn resize_handles(
    ui: &mut Ui,
    ctx: &Context,
    session: &mut Session,
    resize: &mut Option<ResizeGesture>,
    surface: Rect,
) {
    for direction in ResizeDirection::ALL {
        let cursor = resize_cursor(direction);
        let response = ui
            .interact(
                handle_rect(surface, direction),
                Id::new(("segmeter_resize", direction)),
                Sense::drag(),
            )
            .on_hover_cursor(cursor);

        if response.drag_started() {
            *resize = Some(session.begin_resize(direction));
        }
        if response.dragged() {
            ctx.set_cursor_icon(cursor);
            if let Some(gesture) = resize.as_mut().filter(|g| g.direction == direction) {
                session.resize(gesture, response.drag_delta());
            }
        }
        if response.drag_stopped() {
            *resize = None;
        }
    }
}

fn handle_rect(surface: Rect, direction: ResizeDirection) -> Rect {
    let t = HANDLE_THICKNESS;
    let half = t * 0.5;
    let corner = |pos: Pos2| Rect::from_center_size(pos, Vec2::splat(t * 2.0));

    match direction {
        ResizeDirection::N => Rect::from_min_max(
            Pos2::new(surface.min.x + t, surface.min.y - half),
            Pos2::new(surface.max.x - t, surface.min.y + half),
        ),
        ResizeDirection::S => Rect::from_min_max(
            Pos2::new(surface.min.x + t, surface.max.y - half),
            Pos2::new(surface.max.x - t, surface.max.y + half),
        ),
        ResizeDirection::W => Rect::from_min_max(
            Pos2::new(surface.min.x - half, surface.min.y + t),
            Pos2::new(surface.min.x + half, surface.max.y - t),
        ),
        ResizeDirection::E => Rect::from_min_max(
            Pos2::new(surface.max.x - half, surface.min.y + t),
            Pos2::new(surface.max.x + half, surface.max.y - t),
        ),
        ResizeDirection::NW => corner(surface.left_top()),
        ResizeDirection::NE => corner(surface.right_top()),
        ResizeDirection::SW => corner(surface.left_bottom()),
        ResizeDirection::SE => corner(surface.right_bottom()),
    }
}

fn resize_cursor(direction: ResizeDirection) -> CursorIcon {
    match direction {
        ResizeDirection::N => CursorIcon::ResizeNorth,
        ResizeDirection::S => CursorIcon::ResizeSouth,
        ResizeDirection::E => CursorIcon::ResizeEast,
        ResizeDirection::W => CursorIcon::ResizeWest,
        ResizeDirection::NE => CursorIcon::ResizeNorthEast,
        ResizeDirection::NW => CursorIcon::ResizeNorthWest,
        ResizeDirection::SE => CursorIcon::ResizeSouthEast,
        ResizeDirection::SW => CursorIcon::ResizeSouthWest,
    }
}

#[cfg(test)]
mod tests {
    use egui::{pos2, vec2, Rect, Shape};
    use image::DynamicImage;

    use super::{handle_rect, paint_ops, point_under, pointer_action, PointerAction};
    use crate::session::Session;
    use crate::theme::{AppTheme, ThemeMode};
    use crate::view::ResizeDirection;

    #[test]
    fn press_places_only_while_placing() {
        assert_eq!(pointer_action(true, true, None), PointerAction::Place);
        assert_eq!(
            pointer_action(true, true, Some(vec2(3.0, 0.0))),
            PointerAction::Place
        );
        assert_eq!(
            pointer_action(true, false, Some(vec2(3.0, 0.0))),
            PointerAction::Idle
        );
        assert_eq!(pointer_action(false, true, None), PointerAction::Idle);
    }

    #[test]
    fn drag_pans_outside_placement() {
        assert_eq!(
            pointer_action(false, false, Some(vec2(-4.0, 2.5))),
            PointerAction::Pan(vec2(-4.0, 2.5))
        );
        assert_eq!(pointer_action(false, false, None), PointerAction::Idle);
    }

    #[test]
    fn painted_marker_sits_under_the_click() {
        let mut session = Session::default();
        session.load_image(DynamicImage::new_rgba8(300, 200), None);
        session.zoom(2.3);
        session.pan(vec2(-120.0, 75.0));
        session.toggle_placement();
        let click = pos2(333.0, 251.0);
        session.place_point(click);

        let surface = Rect::from_min_size(pos2(16.0, 40.0), session.view().surface_size());
        let theme = AppTheme::for_mode(ThemeMode::Dark);
        let painted = paint_ops(&session.draw_ops(), surface, None, &theme);

        let centers: Vec<_> = painted
            .shapes
            .iter()
            .filter_map(|shape| match shape {
                Shape::Circle(circle) => Some(circle.center),
                _ => None,
            })
            .collect();
        assert_eq!(centers.len(), 1);
        let expected = surface.min + click.to_vec2();
        assert!((centers[0] - expected).length() < 1e-3, "{:?}", centers[0]);
        assert!(point_under(&session, click).is_some());
        assert!(point_under(&session, pos2(10.0, 10.0)).is_none());
    }

    #[test]
    fn handles_straddle_their_edges() {
        let surface = Rect::from_min_size(pos2(10.0, 10.0), vec2(400.0, 300.0));

        assert!(handle_rect(surface, ResizeDirection::N).contains(pos2(200.0, 10.0)));
        assert!(handle_rect(surface, ResizeDirection::S).contains(pos2(200.0, 310.0)));
        assert!(handle_rect(surface, ResizeDirection::W).contains(pos2(10.0, 150.0)));
        assert!(handle_rect(surface, ResizeDirection::E).contains(pos2(410.0, 150.0)));
        assert!(handle_rect(surface, ResizeDirection::SE).contains(pos2(410.0, 310.0)));
        assert!(handle_rect(surface, ResizeDirection::NW).contains(pos2(10.0, 10.0)));
    }

    #[test]
    fn edge_handles_leave_corners_free() {
        let surface = Rect::from_min_size(pos2(0.0, 0.0), vec2(400.0, 300.0));
        let north = handle_rect(surface, ResizeDirection::N);
        assert!(!north.contains(pos2(2.0, 0.0)));
        assert!(handle_rect(surface, ResizeDirection::NW).contains(pos2(2.0, 0.0)));
    }
}
