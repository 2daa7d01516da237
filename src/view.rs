use egui::{vec2, Pos2, Vec2};

use crate::geometry::Point;

pub const MIN_SCALE: f32 = 0.1;
pub const MAX_SCALE: f32 = 5.0;
pub const ZOOM_IN_FACTOR: f32 = 1.1;
pub const ZOOM_OUT_FACTOR: f32 = 1.0 / 1.1;
pub const MIN_SURFACE_WIDTH: f32 = 400.0;
pub const MIN_SURFACE_HEIGHT: f32 = 300.0;
pub const DEFAULT_SURFACE_SIZE: Vec2 = vec2(800.0, 600.0);

/// Edge or corner of the surface being dragged.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ResizeDirection {
    N,
    S,
    E,
    W,
    NE,
    NW,
    SE,
    SW,
}

impl ResizeDirection {
    pub const ALL: [Self; 8] = [
        Self::N,
        Self::S,
        Self::E,
        Self::W,
        Self::NE,
        Self::NW,
        Self::SE,
        Self::SW,
    ];

    /// How a positive cursor delta on each axis changes the surface size.
    /// Zero means the axis is not affected.
    fn axis_signs(self) -> (f32, f32) {
        match self {
            Self::N => (0.0, -1.0),
            Self::S => (0.0, 1.0),
            Self::E => (1.0, 0.0),
            Self::W => (-1.0, 0.0),
            Self::NE => (1.0, -1.0),
            Self::NW => (-1.0, -1.0),
            Self::SE => (1.0, 1.0),
            Self::SW => (-1.0, 1.0),
        }
    }
}

/// Surface size after dragging `direction` by `delta`, floored at the minimum size.
fn resized(size: Vec2, direction: ResizeDirection, delta: Vec2) -> Vec2 {
    let (sx, sy) = direction.axis_signs();
    let width = if sx == 0.0 {
        size.x
    } else {
        (size.x + sx * delta.x).max(MIN_SURFACE_WIDTH)
    };
    let height = if sy == 0.0 {
        size.y
    } else {
        (size.y + sy * delta.y).max(MIN_SURFACE_HEIGHT)
    };
    vec2(width, height)
}

fn floor_surface(size: Vec2) -> Vec2 {
    vec2(
        size.x.max(MIN_SURFACE_WIDTH),
        size.y.max(MIN_SURFACE_HEIGHT),
    )
}

/// The pan and zoom part of a [`ViewTransform`]. Painters receive it through
/// `DrawOp::Transform` and map every view-space position with it.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ViewMapping {
    pub scale: f32,
    pub offset: Vec2,
}

impl Default for ViewMapping {
    fn default() -> Self {
        Self {
            scale: 1.0,
            offset: Vec2::ZERO,
        }
    }
}

impl ViewMapping {
    pub fn view_to_screen(&self, view: Pos2) -> Pos2 {
        (view.to_vec2() * self.scale).to_pos2() + self.offset
    }

    pub fn screen_to_view(&self, screen: Pos2) -> Pos2 {
        ((screen - self.offset).to_vec2() / self.scale).to_pos2()
    }

    /// Converts a view-space length (stroke width, radius) to screen pixels.
    pub fn length_to_screen(&self, length: f32) -> f32 {
        length * self.scale
    }
}

/// Maps between three spaces:
///
/// * screen: pixels relative to the surface's top-left corner,
/// * view: screen with the pan offset removed and the zoom undone,
/// * image-local: view relative to the image, which is centered in the scaled viewport.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ViewTransform {
    scale: f32,
    offset: Vec2,
    surface_size: Vec2,
    image_size: Option<Vec2>,
}

impl Default for ViewTransform {
    fn default() -> Self {
        Self::new(DEFAULT_SURFACE_SIZE)
    }
}

impl ViewTransform {
    pub fn new(surface_size: Vec2) -> Self {
        Self {
            scale: 1.0,
            offset: Vec2::ZERO,
            surface_size: floor_surface(surface_size),
            image_size: None,
        }
    }

    pub fn scale(&self) -> f32 {
        self.scale
    }

    pub fn offset(&self) -> Vec2 {
        self.offset
    }

    pub fn surface_size(&self) -> Vec2 {
        self.surface_size
    }

    pub fn image_size(&self) -> Option<Vec2> {
        self.image_size
    }

    /// New image: scale and pan go back to identity, the surface keeps its size.
    pub fn reset_for_image(&mut self, image_size: Vec2) {
        self.scale = 1.0;
        self.offset = Vec2::ZERO;
        self.image_size = Some(image_size);
    }

    /// Top-left corner of the image in view space.
    pub fn image_origin(&self) -> Option<Pos2> {
        let image_size = self.image_size?;
        Some(((self.surface_size / self.scale - image_size) * 0.5).to_pos2())
    }

    pub fn mapping(&self) -> ViewMapping {
        ViewMapping {
            scale: self.scale,
            offset: self.offset,
        }
    }

    pub fn screen_to_view(&self, screen: Pos2) -> Pos2 {
        self.mapping().screen_to_view(screen)
    }

    pub fn view_to_screen(&self, view: Pos2) -> Pos2 {
        self.mapping().view_to_screen(view)
    }

    pub fn screen_to_image_local(&self, screen: Pos2) -> Option<Point> {
        let origin = self.image_origin()?;
        let local = self.screen_to_view(screen) - origin;
        Some(Point::new(local.x, local.y))
    }

    pub fn image_local_to_view(&self, point: Point) -> Option<Pos2> {
        let origin = self.image_origin()?;
        Some(origin + vec2(point.x, point.y))
    }

    pub fn image_local_to_screen(&self, point: Point) -> Option<Pos2> {
        self.image_local_to_view(point)
            .map(|view| self.view_to_screen(view))
    }

    pub fn zoom(&mut self, factor: f32) {
        if !factor.is_finite() || factor <= 0.0 {
            return;
        }
        self.scale = (self.scale * factor).clamp(MIN_SCALE, MAX_SCALE);
    }

    pub fn zoom_in(&mut self) {
        self.zoom(ZOOM_IN_FACTOR);
    }

    pub fn zoom_out(&mut self) {
        self.zoom(ZOOM_OUT_FACTOR);
    }

    pub fn pan(&mut self, delta: Vec2) {
        self.offset += delta;
    }

    pub fn resize(&mut self, direction: ResizeDirection, delta: Vec2) {
        self.surface_size = resized(self.surface_size, direction, delta);
    }

    pub fn set_surface_size(&mut self, size: Vec2) {
        self.surface_size = floor_surface(size);
    }
}

/// One drag on a resize handle.
///
/// The drag delta accumulates against the size at drag start, so a handle
/// pushed past the minimum and dragged back ends where the cursor is.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ResizeGesture {
    pub direction: ResizeDirection,
    start_size: Vec2,
    total_delta: Vec2,
}

impl ResizeGesture {
    pub fn begin(direction: ResizeDirection, view: &ViewTransform) -> Self {
        Self {
            direction,
            start_size: view.surface_size(),
            total_delta: Vec2::ZERO,
        }
    }

    pub fn update(&mut self, view: &mut ViewTransform, delta: Vec2) {
        self.total_delta += delta;
        view.set_surface_size(self.start_size);
        view.resize(self.direction, self.total_delta);
    }
}

#[cfg(test)]
mod tests {
    use egui::{pos2, vec2, Pos2};

    use super::{
        resized, ResizeDirection, ResizeGesture, ViewTransform, MAX_SCALE, MIN_SCALE,
        MIN_SURFACE_HEIGHT, MIN_SURFACE_WIDTH,
    };
    use crate::geometry::Point;

    fn close(a: f32, b: f32) -> bool {
        (a - b).abs() <= 1e-3 * (1.0 + a.abs().max(b.abs()))
    }

    fn loaded_view() -> ViewTransform {
        let mut view = ViewTransform::new(vec2(800.0, 600.0));
        view.reset_for_image(vec2(640.0, 480.0));
        view
    }

    #[test]
    fn image_is_centered_at_identity() {
        let view = loaded_view();
        assert_eq!(view.image_origin(), Some(pos2(80.0, 60.0)));
        assert_eq!(view.screen_to_image_local(pos2(80.0, 60.0)), Some(Point::new(0.0, 0.0)));
    }

    #[test]
    fn screen_to_image_local_applies_offset_and_scale() {
        let mut view = loaded_view();
        view.zoom(2.0);
        view.pan(vec2(30.0, -20.0));
        // origin = (400 - 640, 300 - 480) / 2 = (-120, -90)
        assert_eq!(view.image_origin(), Some(pos2(-120.0, -90.0)));
        let local = view
            .screen_to_image_local(pos2(230.0, 180.0))
            .expect("image is loaded");
        assert!(close(local.x, 220.0));
        assert!(close(local.y, 190.0));
    }

    #[test]
    fn round_trip_through_screen_space() {
        let scales = [0.1_f32, 0.37, 1.0, 1.1, 2.5, 5.0];
        let offsets = [vec2(0.0, 0.0), vec2(-350.5, 12.25), vec2(900.0, -640.0)];
        let points = [
            Point::new(0.0, 0.0),
            Point::new(320.5, 11.75),
            Point::new(-40.0, 700.0),
            Point::new(639.0, 479.0),
        ];

        for scale in scales {
            for offset in offsets {
                let mut view = loaded_view();
                view.zoom(scale);
                view.pan(offset);
                for point in points {
                    let screen = view.image_local_to_screen(point).expect("image is loaded");
                    let back = view.screen_to_image_local(screen).expect("image is loaded");
                    assert!(close(back.x, point.x), "{point:?} -> {back:?} at {scale}");
                    assert!(close(back.y, point.y), "{point:?} -> {back:?} at {scale}");
                }
            }
        }
    }

    #[test]
    fn mapping_matches_transform() {
        let mut view = loaded_view();
        view.zoom(1.7);
        view.pan(vec2(-12.0, 40.0));
        let mapping = view.mapping();
        let at = pos2(133.0, -7.5);
        assert_eq!(mapping.view_to_screen(at), view.view_to_screen(at));
        assert_eq!(mapping.length_to_screen(2.0), 2.0 * view.scale());
        let back = mapping.screen_to_view(mapping.view_to_screen(at));
        assert!(close(back.x, at.x) && close(back.y, at.y));
    }

    #[test]
    fn mapping_without_image_is_none() {
        let view = ViewTransform::default();
        assert_eq!(view.screen_to_image_local(Pos2::ZERO), None);
        assert_eq!(view.image_local_to_screen(Point::default()), None);
    }

    #[test]
    fn zoom_is_clamped() {
        let mut view = ViewTransform::default();
        for _ in 0..50 {
            view.zoom(1.1);
            assert!(view.scale() <= MAX_SCALE);
        }
        assert_eq!(view.scale(), MAX_SCALE);

        for _ in 0..50 {
            view.zoom(0.9);
            assert!(view.scale() >= MIN_SCALE);
        }
        assert_eq!(view.scale(), MIN_SCALE);
    }

    #[test]
    fn zoom_ignores_degenerate_factors() {
        let mut view = ViewTransform::default();
        view.zoom(0.0);
        view.zoom(-2.0);
        view.zoom(f32::NAN);
        assert_eq!(view.scale(), 1.0);
    }

    #[test]
    fn zoom_in_then_out_returns_to_start() {
        let mut view = ViewTransform::default();
        view.zoom_in();
        view.zoom_out();
        assert!(close(view.scale(), 1.0));
    }

    #[test]
    fn pan_is_unbounded() {
        let mut view = loaded_view();
        view.pan(vec2(-5000.0, 12000.0));
        view.pan(vec2(1.0, 1.0));
        assert_eq!(view.offset(), vec2(-4999.0, 12001.0));
    }

    #[test]
    fn resize_west_floors_width() {
        let mut view = ViewTransform::new(vec2(800.0, 600.0));
        view.resize(ResizeDirection::W, vec2(1000.0, 0.0));
        assert_eq!(view.surface_size(), vec2(MIN_SURFACE_WIDTH, 600.0));
    }

    #[test]
    fn resize_only_touches_selected_axes() {
        let size = vec2(800.0, 600.0);
        let delta = vec2(50.0, 20.0);
        assert_eq!(resized(size, ResizeDirection::E, delta), vec2(850.0, 600.0));
        assert_eq!(resized(size, ResizeDirection::W, delta), vec2(750.0, 600.0));
        assert_eq!(resized(size, ResizeDirection::N, delta), vec2(800.0, 580.0));
        assert_eq!(resized(size, ResizeDirection::S, delta), vec2(800.0, 620.0));
        assert_eq!(resized(size, ResizeDirection::SE, delta), vec2(850.0, 620.0));
        assert_eq!(resized(size, ResizeDirection::SW, delta), vec2(750.0, 620.0));
        assert_eq!(resized(size, ResizeDirection::NE, delta), vec2(850.0, 580.0));
        assert_eq!(resized(size, ResizeDirection::NW, delta), vec2(750.0, 580.0));
    }

    #[test]
    fn resize_keeps_scale_and_offset() {
        let mut view = loaded_view();
        view.zoom(2.0);
        view.pan(vec2(10.0, 10.0));
        for direction in ResizeDirection::ALL {
            view.resize(direction, vec2(-3000.0, 3000.0));
            assert!(view.surface_size().x >= MIN_SURFACE_WIDTH);
            assert!(view.surface_size().y >= MIN_SURFACE_HEIGHT);
        }
        assert_eq!(view.scale(), 2.0);
        assert_eq!(view.offset(), vec2(10.0, 10.0));
    }

    #[test]
    fn resize_recenters_image() {
        let mut view = loaded_view();
        view.resize(ResizeDirection::E, vec2(200.0, 0.0));
        assert_eq!(view.image_origin(), Some(pos2(180.0, 60.0)));
    }

    #[test]
    fn resize_gesture_recovers_after_hitting_floor() {
        let mut view = ViewTransform::new(vec2(800.0, 600.0));
        let mut gesture = ResizeGesture::begin(ResizeDirection::SE, &view);
        gesture.update(&mut view, vec2(-600.0, -400.0));
        assert_eq!(view.surface_size(), vec2(MIN_SURFACE_WIDTH, MIN_SURFACE_HEIGHT));
        gesture.update(&mut view, vec2(500.0, 350.0));
        assert_eq!(view.surface_size(), vec2(700.0, 550.0));
    }

    #[test]
    fn reload_resets_scale_and_offset_but_not_surface() {
        let mut view = loaded_view();
        view.zoom(3.0);
        view.pan(vec2(-40.0, 25.0));
        view.resize(ResizeDirection::S, vec2(0.0, 100.0));
        view.reset_for_image(vec2(100.0, 100.0));
        assert_eq!(view.scale(), 1.0);
        assert_eq!(view.offset(), vec2(0.0, 0.0));
        assert_eq!(view.surface_size(), vec2(800.0, 700.0));
        assert_eq!(view.image_size(), Some(vec2(100.0, 100.0)));
    }
}
