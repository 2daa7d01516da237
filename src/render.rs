use egui::{vec2, Color32, Pos2, Vec2};

use crate::geometry::Point;
use crate::points::{PlacedPoint, PlacementState, SegmentRole, MAX_POINTS};
use crate::view::{ViewMapping, ViewTransform};

/// Overlay sizes in screen pixels. Each is divided by the scale in view space
/// so it looks the same at every zoom level.
pub const SEGMENT_WIDTH: f32 = 2.0;
pub const MARKER_RADIUS: f32 = 5.0;
pub const LABEL_OFFSET: f32 = 8.0;
pub const LABEL_FONT_SIZE: f32 = 14.0;
pub const CROSSHAIR_ARM: f32 = 10.0;
pub const CROSSHAIR_WIDTH: f32 = 1.0;

pub const MARKER_COLOR: Color32 = Color32::RED;
pub const LABEL_COLOR: Color32 = Color32::BLACK;
pub const CROSSHAIR_COLOR: Color32 = Color32::RED;

/// One drawing step. Positions after `Transform` are in view space.
#[derive(Clone, Debug, PartialEq)]
pub enum DrawOp {
    Clear,
    Transform(ViewMapping),
    Image {
        origin: Pos2,
        size: Vec2,
    },
    Line {
        role: SegmentRole,
        from: Pos2,
        to: Pos2,
        width: f32,
        color: Color32,
    },
    Marker {
        center: Pos2,
        radius: f32,
        color: Color32,
    },
    Label {
        anchor: Pos2,
        text: String,
        font_size: f32,
        color: Color32,
    },
    Crosshair {
        center: Pos2,
        arm: f32,
        width: f32,
        color: Color32,
    },
}

/// Everything the surface shows, borrowed from the session.
#[derive(Clone, Copy, Debug)]
pub struct Scene<'a> {
    pub view: &'a ViewTransform,
    pub points: &'a [PlacedPoint],
    pub placement: PlacementState,
    pub cursor: Option<Point>,
}

pub fn build(scene: &Scene<'_>) -> Vec<DrawOp> {
    let mut ops = vec![DrawOp::Clear];

    let view = scene.view;
    let (Some(image_size), Some(origin)) = (view.image_size(), view.image_origin()) else {
        return ops;
    };
    let scale = view.scale();
    // The image is loaded, so the mapping always exists past this point.
    let to_view = |point: Point| view.image_local_to_view(point).unwrap_or(origin);

    ops.push(DrawOp::Transform(view.mapping()));
    ops.push(DrawOp::Image {
        origin,
        size: image_size,
    });

    let segments = [(SegmentRole::Ab, 0, 1), (SegmentRole::Cd, 2, 3)];
    for (role, start, end) in segments {
        let (Some(start), Some(end)) = (scene.points.get(start), scene.points.get(end)) else {
            continue;
        };
        ops.push(DrawOp::Line {
            role,
            from: to_view(start.position),
            to: to_view(end.position),
            width: SEGMENT_WIDTH / scale,
            color: role.color(),
        });
    }

    for point in scene.points.iter().take(MAX_POINTS) {
        let center = to_view(point.position);
        ops.push(DrawOp::Marker {
            center,
            radius: MARKER_RADIUS / scale,
            color: MARKER_COLOR,
        });
        ops.push(DrawOp::Label {
            anchor: center + vec2(LABEL_OFFSET, -LABEL_OFFSET) / scale,
            text: point.label.to_string(),
            font_size: LABEL_FONT_SIZE / scale,
            color: LABEL_COLOR,
        });
    }

    if scene.placement == PlacementState::Placing {
        if let Some(cursor) = scene.cursor {
            ops.push(DrawOp::Crosshair {
                center: to_view(cursor),
                arm: CROSSHAIR_ARM / scale,
                width: CROSSHAIR_WIDTH / scale,
                color: CROSSHAIR_COLOR,
            });
        }
    }

    ops
}
