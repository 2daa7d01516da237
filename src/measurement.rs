use serde::{Deserialize, Serialize};

use crate::geometry::{
    angle_between, length_difference_percentage, to_physical_length, LengthDifference,
};
use crate::points::{Placement, SegmentRole};

pub const DEFAULT_REFERENCE_LENGTH: f32 = 10.0;
pub const UNIT_SUFFIX: &str = "cm";

/// Calibration of AB against a known physical length.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MeasurementSettings {
    pub use_centimeters: bool,
    pub reference_length: f32,
}

impl Default for MeasurementSettings {
    fn default() -> Self {
        Self {
            use_centimeters: false,
            reference_length: DEFAULT_REFERENCE_LENGTH,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum CalibratedLength {
    Measured(f32),
    /// AB has zero length, so it cannot calibrate anything.
    NoReference,
}

/// Everything derived from a complete A-B-C-D set.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SegmentAnalysis {
    pub angle_degrees: u32,
    pub length_difference: LengthDifference,
    /// `None` while calibration is switched off.
    pub cd_physical_length: Option<CalibratedLength>,
}

impl SegmentAnalysis {
    pub fn from_placement(placement: &Placement, settings: &MeasurementSettings) -> Option<Self> {
        let ab = placement.segment(SegmentRole::Ab)?;
        let cd = placement.segment(SegmentRole::Cd)?;

        let cd_physical_length = settings.use_centimeters.then(|| {
            to_physical_length(cd.length(), ab.length(), settings.reference_length)
                .map_or(CalibratedLength::NoReference, CalibratedLength::Measured)
        });

        Some(Self {
            angle_degrees: angle_between(&ab, &cd),
            length_difference: length_difference_percentage(&ab, &cd),
            cd_physical_length,
        })
    }

    pub fn lines(&self) -> Vec<String> {
        let mut lines = vec![
            format!("Angle between segments: {}°", self.angle_degrees),
            format!(
                "The red segment is {} by {}%",
                if self.length_difference.is_longer {
                    "longer"
                } else {
                    "shorter"
                },
                self.length_difference.percentage
            ),
        ];

        match self.cd_physical_length {
            Some(CalibratedLength::Measured(length)) => {
                lines.push(format!("Length of segment CD: {length:.1} {UNIT_SUFFIX}"))
            }
            Some(CalibratedLength::NoReference) => {
                lines.push("Length of segment CD: n/a (AB has no length)".to_string())
            }
            None => {}
        }
        lines
    }
}
