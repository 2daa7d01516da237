use std::fmt;

use egui::{Color32, Pos2};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::geometry::{Point, Segment};
use crate::view::ViewTransform;

pub const MAX_POINTS: usize = 4;

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum PointLabel {
    A,
    B,
    C,
    D,
}

impl PointLabel {
    pub const SEQUENCE: [Self; MAX_POINTS] = [Self::A, Self::B, Self::C, Self::D];

    /// Label for the point placed at `index` (0-based), if it fits.
    pub fn nth(index: usize) -> Option<Self> {
        Self::SEQUENCE.get(index).copied()
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::A => "A",
            Self::B => "B",
            Self::C => "C",
            Self::D => "D",
        }
    }
}

impl fmt::Display for PointLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq)]
pub struct PlacedPoint {
    pub position: Point,
    pub label: PointLabel,
}

/// The two measured segments. AB is the calibration reference.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SegmentRole {
    Ab,
    Cd,
}

impl SegmentRole {
    fn indices(self) -> (usize, usize) {
        match self {
            Self::Ab => (0, 1),
            Self::Cd => (2, 3),
        }
    }

    pub fn color(self) -> Color32 {
        match self {
            Self::Ab => Color32::BLUE,
            Self::Cd => Color32::RED,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum PlacementState {
    #[default]
    Idle,
    Placing,
}

#[derive(Clone, Debug, Default)]
pub struct Placement {
    state: PlacementState,
    points: Vec<PlacedPoint>,
    cursor: Option<Point>,
}

impl Placement {
    pub fn state(&self) -> PlacementState {
        self.state
    }

    pub fn is_placing(&self) -> bool {
        self.state == PlacementState::Placing
    }

    pub fn points(&self) -> &[PlacedPoint] {
        &self.points
    }

    pub fn is_complete(&self) -> bool {
        self.points.len() == MAX_POINTS
    }

    /// Live pointer position in image-local space; only tracked while placing.
    pub fn cursor(&self) -> Option<Point> {
        if self.is_placing() {
            self.cursor
        } else {
            None
        }
    }

    /// Starting a new placement discards the previous points; cancelling keeps them.
    pub fn toggle(&mut self) -> PlacementState {
        self.state = match self.state {
            PlacementState::Idle => {
                self.points.clear();
                PlacementState::Placing
            }
            PlacementState::Placing => {
                self.cursor = None;
                PlacementState::Idle
            }
        };
        self.state
    }

    pub fn reset(&mut self) {
        self.state = PlacementState::Idle;
        self.points.clear();
        self.cursor = None;
    }

    pub fn place(&mut self, screen: Pos2, view: &ViewTransform) -> Option<PlacedPoint> {
        if !self.is_placing() {
            debug!("ignoring point outside placement mode");
            return None;
        }
        let label = PointLabel::nth(self.points.len())?;
        let position = view.screen_to_image_local(screen)?;

        let placed = PlacedPoint { position, label };
        self.points.push(placed);
        debug!(%label, x = position.x, y = position.y, "point placed");

        if self.is_complete() {
            self.state = PlacementState::Idle;
            self.cursor = None;
        }
        Some(placed)
    }

    pub fn track_pointer(&mut self, screen: Pos2, view: &ViewTransform) {
        if self.is_placing() {
            self.cursor = view.screen_to_image_local(screen);
        }
    }

    pub fn clear_pointer(&mut self) {
        self.cursor = None;
    }

    pub fn segment(&self, role: SegmentRole) -> Option<Segment> {
        let (start, end) = role.indices();
        let start = self.points.get(start)?;
        let end = self.points.get(end)?;
        Some(Segment::new(start.position, end.position))
    }
}
