use std::path::PathBuf;

use egui::{ColorImage, Context as EguiContext, Pos2, TextureHandle, TextureOptions, Vec2};
use image::DynamicImage;
use tracing::{debug, info};

use crate::config::AppConfig;
use crate::loader::LoadGeneration;
use crate::measurement::{MeasurementSettings, SegmentAnalysis};
use crate::points::{PlacedPoint, Placement, PlacementState};
use crate::render::{self, DrawOp, Scene};
use crate::view::{ResizeDirection, ResizeGesture, ViewTransform};

pub struct LoadedImage {
    pub dynamic: DynamicImage,
    pub texture: Option<TextureHandle>,
    pub source: Option<PathBuf>,
}

impl LoadedImage {
    pub fn size_vec2(&self) -> Vec2 {
        Vec2::new(self.dynamic.width() as f32, self.dynamic.height() as f32)
    }

    pub fn ensure_texture(&mut self, ctx: &EguiContext) -> &TextureHandle {
        self.texture.get_or_insert_with(|| {
            let rgba = self.dynamic.to_rgba8();
            let size = [rgba.width() as usize, rgba.height() as usize];
            let color = ColorImage::from_rgba_unmultiplied(size, rgba.as_raw());
            ctx.load_texture("measured-image", color, TextureOptions::LINEAR)
        })
    }
}

/// All state of one measuring session. Mutated only through these methods.
pub struct Session {
    pub image: Option<LoadedImage>,
    /// Plain value edited directly by the settings panel.
    pub settings: MeasurementSettings,
    view: ViewTransform,
    placement: Placement,
    next_generation: LoadGeneration,
    pending_load: Option<LoadGeneration>,
}

impl Default for Session {
    fn default() -> Self {
        Self::new(&AppConfig::default())
    }
}

impl Session {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            image: None,
            view: ViewTransform::new(config.surface_size()),
            placement: Placement::default(),
            settings: config.measurement_settings(),
            next_generation: 0,
            pending_load: None,
        }
    }

    pub fn view(&self) -> &ViewTransform {
        &self.view
    }

    pub fn placement(&self) -> &Placement {
        &self.placement
    }

    pub fn is_loading(&self) -> bool {
        self.pending_load.is_some()
    }

    /// An image is decoded and no newer one is on its way.
    pub fn is_ready(&self) -> bool {
        self.image.is_some() && !self.is_loading()
    }

    /// Reserves a generation for a new load and stops any placement in progress.
    pub fn begin_load(&mut self) -> LoadGeneration {
        self.next_generation = self.next_generation.wrapping_add(1);
        self.pending_load = Some(self.next_generation);
        if self.placement.is_placing() {
            self.placement.toggle();
        }
        self.placement.clear_pointer();
        self.next_generation
    }

    /// Applies a decoded image if it belongs to the newest request.
    pub fn finish_load(
        &mut self,
        generation: LoadGeneration,
        image: DynamicImage,
        source: Option<PathBuf>,
    ) -> bool {
        if self.pending_load != Some(generation) {
            debug!(generation, "dropping stale image");
            return false;
        }
        self.pending_load = None;
        self.load_image(image, source);
        true
    }

    /// Returns whether the failure belonged to the newest request.
    pub fn fail_load(&mut self, generation: LoadGeneration) -> bool {
        if self.pending_load != Some(generation) {
            return false;
        }
        self.pending_load = None;
        true
    }

    /// Swaps in a new image and resets pan, zoom and points in the same step.
    pub fn load_image(&mut self, image: DynamicImage, source: Option<PathBuf>) {
        let loaded = LoadedImage {
            dynamic: image,
            texture: None,
            source,
        };
        let size = loaded.size_vec2();
        info!(width = size.x, height = size.y, "image loaded");

        self.view.reset_for_image(size);
        self.placement.reset();
        self.image = Some(loaded);
    }

    pub fn toggle_placement(&mut self) -> PlacementState {
        if !self.placement.is_placing() && !self.is_ready() {
            debug!("placement needs a decoded image");
            return self.placement.state();
        }
        self.placement.toggle()
    }

    pub fn cancel_placement(&mut self) {
        if self.placement.is_placing() {
            self.placement.toggle();
        }
    }

    pub fn place_point(&mut self, screen: Pos2) -> Option<PlacedPoint> {
        if !self.is_ready() {
            return None;
        }
        self.placement.place(screen, &self.view)
    }

    pub fn track_pointer(&mut self, screen: Option<Pos2>) {
        match screen {
            Some(screen) => self.placement.track_pointer(screen, &self.view),
            None => self.placement.clear_pointer(),
        }
    }

    pub fn zoom(&mut self, factor: f32) {
        self.view.zoom(factor);
    }

    pub fn zoom_in(&mut self) {
        self.view.zoom_in();
    }

    pub fn zoom_out(&mut self) {
        self.view.zoom_out();
    }

    pub fn pan(&mut self, delta: Vec2) {
        self.view.pan(delta);
    }

    pub fn begin_resize(&self, direction: ResizeDirection) -> ResizeGesture {
        ResizeGesture::begin(direction, &self.view)
    }

    pub fn resize(&mut self, gesture: &mut ResizeGesture, delta: Vec2) {
        gesture.update(&mut self.view, delta);
    }

    pub fn analysis(&self) -> Option<SegmentAnalysis> {
        SegmentAnalysis::from_placement(&self.placement, &self.settings)
    }

    pub fn scene(&self) -> Scene<'_> {
        Scene {
            view: &self.view,
            points: self.placement.points(),
            placement: self.placement.state(),
            cursor: self.placement.cursor(),
        }
    }

    pub fn draw_ops(&self) -> Vec<DrawOp> {
        render::build(&self.scene())
    }
}
