//! Rectangles and axes.

use cgmath::{Point2, Vector2};

/// A layout axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Axis {
    /// Horizontal; measured and allocated first.
    X,
    /// Vertical.
    Y,
}

impl Axis {
    pub const BOTH: [Axis; 2] = [Axis::X, Axis::Y];

    /// Index into a `Vector2` or `Point2`.
    pub fn index(self) -> usize {
        match self {
            Axis::X => 0,
            Axis::Y => 1,
        }
    }
}

/// A rectangle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    /// Rectangle origin.
    pub origin: Point2<f64>,

    /// Rectangle size.
    pub size: Vector2<f64>,
}

impl Rect {
    /// Creates a new rectangle.
    pub fn new(origin: Point2<f64>, size: Vector2<f64>) -> Rect {
        Rect { origin, size }
    }

    /// Returns the far corner.
    pub fn max(&self) -> Point2<f64> {
        self.origin + self.size
    }

    /// Returns true if the other rectangle lies entirely inside this one.
    pub fn contains_rect(&self, rect: Rect) -> bool {
        let own_max = self.max();
        let rect_max = rect.max();
        rect.origin.x >= self.origin.x
            && rect.origin.y >= self.origin.y
            && rect_max.x <= own_max.x
            && rect_max.y <= own_max.y
    }

    /// Returns true if the two rectangles intersect.
    pub fn intersects(&self, rect: Rect) -> bool {
        let own_opposite = self.origin + self.size;
        let rect_opposite = rect.origin + rect.size;

        self.origin.x < rect_opposite.x
            && self.origin.y < rect_opposite.y
            && rect.origin.x < own_opposite.x
            && rect.origin.y < own_opposite.y
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn containment() {
        let outer = Rect::new(Point2::new(0., 0.), Vector2::new(10., 4.));
        let inner = Rect::new(Point2::new(1., 1.), Vector2::new(9., 3.));
        assert!(outer.contains_rect(inner));
        assert!(outer.intersects(inner));
        assert!(!inner.contains_rect(outer));
        let beside = Rect::new(Point2::new(10., 0.), Vector2::new(2., 2.));
        assert!(!outer.intersects(beside));
    }
}
