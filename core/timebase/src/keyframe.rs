//! Keyframe curves: a value animated over clip frame numbers.
//!
//! Points are kept sorted by `x`. Between two points the right-hand point's
//! [`Interpolation`] decides the shape of the segment. Before the first point
//! the curve holds the first value, after the last point the last value.

use thiserror::Error;

/// Bisection steps when inverting a bezier segment's `x`.
const BEZIER_MAX_ITERATIONS: usize = 64;

/// Distance in `x` at which a bezier parameter counts as found.
const BEZIER_X_TOLERANCE: f64 = 1e-9;

#[derive(Error, Debug, Clone, Copy, PartialEq)]
pub enum KeyframeError {
    #[error("Keyframe point ({x}, {y}) must have finite coordinates")]
    NonFinitePoint { x: f64, y: f64 },
}

/// Shape of the segment that ends at a point.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Interpolation {
    /// Hold the previous point's value until this point.
    Constant,
    Linear,
    /// Cubic bezier through the previous point's right handle and this point's left handle.
    #[default]
    Bezier,
}

/// A bezier handle, as fractions of the segment's `x` and `y` spans.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Handle {
    pub x: f64,
    pub y: f64,
}

impl Handle {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
    pub interpolation: Interpolation,
    /// Pulls the segment ending at this point.
    pub handle_left: Handle,
    /// Pulls the segment starting at this point.
    pub handle_right: Handle,
}

impl Point {
    /// A point with ease-in/ease-out handles.
    pub const fn new(x: f64, y: f64, interpolation: Interpolation) -> Self {
        Self {
            x,
            y,
            interpolation,
            handle_left: Handle::new(0.5, 1.0),
            handle_right: Handle::new(0.5, 0.0),
        }
    }

    pub const fn with_handles(self, handle_left: Handle, handle_right: Handle) -> Self {
        Self {
            handle_left,
            handle_right,
            ..self
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Keyframe {
    points: Vec<Point>,
}

impl Keyframe {
    pub fn new() -> Self {
        Self::default()
    }

    /// A curve holding `value` everywhere.
    pub fn constant(value: f64) -> Self {
        Self {
            points: vec![Point::new(0.0, value, Interpolation::Bezier)],
        }
    }

    pub fn points(&self) -> &[Point] {
        &self.points
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Inserts `point` in `x` order. A point already at the same `x` is replaced.
    pub fn add_point(&mut self, point: Point) -> Result<(), KeyframeError> {
        if !point.x.is_finite() || !point.y.is_finite() {
            return Err(KeyframeError::NonFinitePoint {
                x: point.x,
                y: point.y,
            });
        }
        let index = self.points.partition_point(|p| p.x < point.x);
        match self.points.get_mut(index) {
            Some(existing) if existing.x == point.x => *existing = point,
            _ => self.points.insert(index, point),
        }
        Ok(())
    }

    pub fn remove_point(&mut self, index: usize) -> Option<Point> {
        (index < self.points.len()).then(|| self.points.remove(index))
    }

    /// Value of the curve at `x`. An empty curve is zero everywhere.
    pub fn value(&self, x: f64) -> f64 {
        let (Some(first), Some(last)) = (self.points.first(), self.points.last()) else {
            return 0.0;
        };
        if x <= first.x {
            return first.y;
        }
        if x >= last.x {
            return last.y;
        }

        let index = self.points.partition_point(|p| p.x < x);
        let right = &self.points[index];
        if right.x == x {
            return right.y;
        }
        let left = &self.points[index - 1];

        match right.interpolation {
            Interpolation::Constant => left.y,
            Interpolation::Linear => {
                let slope = (right.y - left.y) / (right.x - left.x);
                slope.mul_add(x - left.x, left.y)
            }
            Interpolation::Bezier => bezier_value(left, right, x),
        }
    }

    /// Change of the curve over the frame ending at `x`: `value(x) - value(x - 1)`.
    pub fn delta(&self, x: f64) -> f64 {
        self.value(x) - self.value(x - 1.0)
    }
}

fn bezier_value(left: &Point, right: &Point, x: f64) -> f64 {
    let span_x = right.x - left.x;
    let span_y = right.y - left.y;
    let p0 = (left.x, left.y);
    let p1 = (
        left.x + left.handle_right.x * span_x,
        left.y + left.handle_right.y * span_y,
    );
    let p2 = (
        left.x + right.handle_left.x * span_x,
        left.y + right.handle_left.y * span_y,
    );
    let p3 = (right.x, right.y);

    // x(t) is monotonic for handles inside the segment; bisect for t.
    let (mut lo, mut hi) = (0.0, 1.0);
    let mut t = 0.5;
    for _ in 0..BEZIER_MAX_ITERATIONS {
        let at = cubic(p0.0, p1.0, p2.0, p3.0, t);
        if (at - x).abs() < BEZIER_X_TOLERANCE {
            break;
        }
        if at > x {
            hi = t;
        } else {
            lo = t;
        }
        t = (lo + hi) * 0.5;
    }
    cubic(p0.1, p1.1, p2.1, p3.1, t)
}

fn cubic(p0: f64, p1: f64, p2: f64, p3: f64, t: f64) -> f64 {
    let u = 1.0 - t;
    u * u * u * p0 + 3.0 * u * u * t * p1 + 3.0 * u * t * t * p2 + t * t * t * p3
}

#[cfg(test)]
mod keyframe_tests {
    use super::*;

    fn curve(points: &[(f64, f64, Interpolation)]) -> Keyframe {
        let mut keyframe = Keyframe::new();
        for &(x, y, interpolation) in points {
            keyframe.add_point(Point::new(x, y, interpolation)).unwrap();
        }
        keyframe
    }

    fn linear(from: (f64, f64), to: (f64, f64)) -> Keyframe {
        curve(&[
            (from.0, from.1, Interpolation::Linear),
            (to.0, to.1, Interpolation::Linear),
        ])
    }

    #[test]
    fn test_empty_curve_is_zero() {
        assert_eq!(Keyframe::new().value(12.0), 0.0);
    }

    #[test]
    fn test_constant_curve_holds_everywhere() {
        let keyframe = Keyframe::constant(0.8);
        assert_eq!(keyframe.value(-5.0), 0.8);
        assert_eq!(keyframe.value(1000.0), 0.8);
    }

    #[test]
    fn test_before_first_and_after_last_point() {
        let keyframe = linear((10.0, 2.0), (20.0, 4.0));
        assert_eq!(keyframe.value(0.0), 2.0);
        assert_eq!(keyframe.value(10.0), 2.0);
        assert_eq!(keyframe.value(25.0), 4.0);
    }

    #[test]
    fn test_exact_hit_returns_point_value() {
        let keyframe = curve(&[
            (0.0, 0.0, Interpolation::Linear),
            (5.0, 3.0, Interpolation::Bezier),
            (10.0, 1.0, Interpolation::Constant),
        ]);
        assert_eq!(keyframe.value(5.0), 3.0);
    }

    #[test]
    fn test_linear_midpoint() {
        let keyframe = linear((0.0, 0.0), (10.0, 1.0));
        assert!((keyframe.value(5.0) - 0.5).abs() < 1e-12);
        assert!((keyframe.value(2.5) - 0.25).abs() < 1e-12);
    }

    #[test]
    fn test_right_point_chooses_interpolation() {
        let keyframe = curve(&[
            (0.0, 1.0, Interpolation::Linear),
            (10.0, 0.0, Interpolation::Constant),
            (20.0, 1.0, Interpolation::Linear),
        ]);
        // Segment 0..10 ends at a constant point: holds the left value.
        assert_eq!(keyframe.value(9.0), 1.0);
        // Segment 10..20 ends at a linear point.
        assert!((keyframe.value(15.0) - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_bezier_eases_between_points() {
        let keyframe = curve(&[
            (0.0, 0.0, Interpolation::Bezier),
            (10.0, 1.0, Interpolation::Bezier),
        ]);
        assert!((keyframe.value(5.0) - 0.5).abs() < 1e-6);
        let quarter = keyframe.value(2.5);
        assert!(quarter > 0.0 && quarter < 0.25, "eased value {quarter}");
        let values: Vec<f64> = (0..=10).map(|x| keyframe.value(f64::from(x))).collect();
        assert!(values.windows(2).all(|w| w[0] <= w[1]));
    }

    #[test]
    fn test_add_point_keeps_order_and_replaces_same_x() {
        let mut keyframe = linear((10.0, 1.0), (0.0, 0.0));
        keyframe
            .add_point(Point::new(5.0, 0.2, Interpolation::Linear))
            .unwrap();
        keyframe
            .add_point(Point::new(10.0, 2.0, Interpolation::Linear))
            .unwrap();

        let xs: Vec<f64> = keyframe.points().iter().map(|p| p.x).collect();
        assert_eq!(xs, vec![0.0, 5.0, 10.0]);
        assert_eq!(keyframe.value(10.0), 2.0);
    }

    #[test]
    fn test_non_finite_point_is_rejected() {
        let mut keyframe = Keyframe::constant(1.0);
        let result = keyframe.add_point(Point::new(f64::NAN, 1.0, Interpolation::Linear));
        assert!(matches!(result, Err(KeyframeError::NonFinitePoint { .. })));
        assert_eq!(keyframe.points().len(), 1);
    }

    #[test]
    fn test_remove_point() {
        let mut keyframe = linear((0.0, 0.0), (10.0, 1.0));
        let removed = keyframe.remove_point(0).unwrap();
        assert_eq!(removed.x, 0.0);
        assert_eq!(keyframe.value(0.0), 1.0);
        assert!(keyframe.remove_point(3).is_none());
    }

    #[test]
    fn test_delta_is_change_over_one_frame() {
        let keyframe = linear((0.0, 0.0), (10.0, 5.0));
        assert!((keyframe.delta(4.0) - 0.5).abs() < 1e-12);
        assert_eq!(keyframe.delta(-3.0), 0.0);
        assert_eq!(keyframe.delta(30.0), 0.0);
    }
}
