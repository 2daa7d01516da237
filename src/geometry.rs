use egui::Vec2;
use serde::{Deserialize, Serialize};

/// A position in image-local pixels, relative to the image's own top-left corner.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Default)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn delta(self, other: Point) -> Vec2 {
        Vec2::new(other.x - self.x, other.y - self.y)
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Segment {
    pub start: Point,
    pub end: Point,
}

impl Segment {
    pub fn new(start: Point, end: Point) -> Self {
        Self { start, end }
    }

    pub fn length(&self) -> f32 {
        distance(self.start, self.end)
    }

    /// Direction of travel from `start` to `end`, in radians.
    fn direction(&self) -> f32 {
        let d = self.start.delta(self.end);
        d.y.atan2(d.x)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LengthDifference {
    /// Difference relative to the longer segment, 0..=100.
    pub percentage: u32,
    /// The second segment is strictly longer than the first.
    pub is_longer: bool,
}

pub fn distance(a: Point, b: Point) -> f32 {
    a.delta(b).length()
}

/// Unsigned angle between two segments in whole degrees, 0..=180.
pub fn angle_between(first: &Segment, second: &Segment) -> u32 {
    let mut degrees = (first.direction() - second.direction()).to_degrees().abs();
    if degrees > 180.0 {
        degrees = 360.0 - degrees;
    }
    degrees.round().clamp(0.0, 180.0) as u32
}

/// Length difference of `second` compared to `first`, always divided by the longer length.
///
/// Two zero-length segments compare as equal.
pub fn length_difference_percentage(first: &Segment, second: &Segment) -> LengthDifference {
    let first_len = first.length();
    let second_len = second.length();
    let longest = first_len.max(second_len);
    if longest <= 0.0 || !longest.is_finite() {
        return LengthDifference {
            percentage: 0,
            is_longer: false,
        };
    }

    let ratio = (first_len - second_len).abs() / longest;
    LengthDifference {
        percentage: (ratio * 100.0).round().clamp(0.0, 100.0) as u32,
        is_longer: second_len > first_len,
    }
}

/// Scales a pixel length by a reference whose physical size is known.
///
/// Returns `None` when the reference has no usable pixel length.
pub fn to_physical_length(
    pixel_length: f32,
    reference_pixel_length: f32,
    reference_units: f32,
) -> Option<f32> {
    if reference_pixel_length == 0.0 || !reference_pixel_length.is_finite() {
        return None;
    }
    let value = pixel_length * reference_units / reference_pixel_length;
    value.is_finite().then_some(value)
}

#[cfg(test)]
mod tests {
    use super::{
        angle_between, distance, length_difference_percentage, to_physical_length, Point, Segment,
    };

    fn seg(x0: f32, y0: f32, x1: f32, y1: f32) -> Segment {
        Segment::new(Point::new(x0, y0), Point::new(x1, y1))
    }

    #[test]
    fn distance_is_euclidean() {
        assert_eq!(distance(Point::new(0.0, 0.0), Point::new(3.0, 4.0)), 5.0);
        assert_eq!(distance(Point::new(2.0, 2.0), Point::new(2.0, 2.0)), 0.0);
    }

    #[test]
    fn angle_of_segment_with_itself_is_zero() {
        let s = seg(10.0, 20.0, 130.0, -45.0);
        assert_eq!(angle_between(&s, &s), 0);
    }

    #[test]
    fn angle_is_symmetric() {
        let pairs = [
            (seg(0.0, 0.0, 10.0, 0.0), seg(0.0, 0.0, 0.0, 10.0)),
            (seg(0.0, 0.0, 10.0, 3.0), seg(5.0, 5.0, -7.0, 12.0)),
            (seg(0.0, 0.0, -10.0, -1.0), seg(0.0, 0.0, -10.0, 1.0)),
        ];
        for (a, b) in pairs {
            assert_eq!(angle_between(&a, &b), angle_between(&b, &a));
        }
    }

    #[test]
    fn angle_wraps_past_half_turn() {
        // Directions of about +174° and -174° are 12° apart, not 348°.
        let a = seg(0.0, 0.0, -10.0, 1.0);
        let b = seg(0.0, 0.0, -10.0, -1.0);
        assert_eq!(angle_between(&a, &b), 11);

        let right = seg(0.0, 0.0, 10.0, 0.0);
        let up = seg(0.0, 0.0, 0.0, -10.0);
        assert_eq!(angle_between(&right, &up), 90);

        let reversed = seg(10.0, 0.0, 0.0, 0.0);
        assert_eq!(angle_between(&right, &reversed), 180);
    }

    #[test]
    fn length_difference_uses_longer_segment() {
        let ab = seg(0.0, 0.0, 10.0, 0.0);
        let cd = seg(0.0, 0.0, 0.0, 15.0);
        let diff = length_difference_percentage(&ab, &cd);
        assert_eq!(diff.percentage, 33);
        assert!(diff.is_longer);

        let reverse = length_difference_percentage(&cd, &ab);
        assert_eq!(reverse.percentage, 33);
        assert!(!reverse.is_longer);
    }

    #[test]
    fn length_difference_of_degenerate_segments_is_zero() {
        let point = seg(4.0, 4.0, 4.0, 4.0);
        let diff = length_difference_percentage(&point, &point);
        assert_eq!(diff.percentage, 0);
        assert!(!diff.is_longer);

        let real = seg(0.0, 0.0, 8.0, 0.0);
        let diff = length_difference_percentage(&point, &real);
        assert_eq!(diff.percentage, 100);
        assert!(diff.is_longer);
    }

    #[test]
    fn physical_length_scales_linearly() {
        assert_eq!(to_physical_length(20.0, 10.0, 10.0), Some(20.0));
        assert_eq!(to_physical_length(5.0, 10.0, 4.0), Some(2.0));
    }

    #[test]
    fn physical_length_without_reference_is_none() {
        assert_eq!(to_physical_length(20.0, 0.0, 10.0), None);
        assert_eq!(to_physical_length(20.0, f32::NAN, 10.0), None);
    }
}
