//! Axis-aligned bounding boxes.
//!
//! An `Aabb2` is a rectangle whose edges are parallel to the axes. Inside this crate it
//! is mostly used in its integer form, `Area`, to describe pixel regions of surfaces and
//! texture levels.

use std::cmp::{Ordering, PartialOrd};
use std::fmt;

use cgmath::{BaseNum, Point2};

/// A two-dimensional AABB, aka a rectangle.
#[derive(Serialize, Deserialize, Copy, Clone, PartialEq, Eq, Hash)]
pub struct Aabb2<S> {
    /// Minimum point of the AABB.
    pub min: Point2<S>,
    /// Maximum point of the AABB.
    pub max: Point2<S>,
}

impl<S: BaseNum> Aabb2<S> {
    /// Construct a empty axis-aligned bounding box.
    #[inline]
    pub fn zero() -> Self {
        Aabb2 {
            min: Point2::new(S::zero(), S::zero()),
            max: Point2::new(S::zero(), S::zero()),
        }
    }

    /// Construct a new axis-aligned bounding box from two points.
    #[inline]
    pub fn new(p1: Point2<S>, p2: Point2<S>) -> Aabb2<S> {
        Aabb2 {
            min: Point2::new(min(p1.x, p2.x), min(p1.y, p2.y)),
            max: Point2::new(max(p1.x, p2.x), max(p1.y, p2.y)),
        }
    }

    /// Construct a bounding box at `(x, y)` that spans `width` by `height`.
    #[inline]
    pub fn with_size(x: S, y: S, width: S, height: S) -> Aabb2<S> {
        Aabb2::new(Point2::new(x, y), Point2::new(x + width, y + height))
    }

    #[inline]
    pub fn width(&self) -> S {
        self.max.x - self.min.x
    }

    #[inline]
    pub fn height(&self) -> S {
        self.max.y - self.min.y
    }

    /// Returns true if `rhs` lies entirely inside of this AABB.
    #[inline]
    pub fn contains(&self, rhs: &Self) -> bool {
        rhs.min.x >= self.min.x
            && rhs.min.y >= self.min.y
            && rhs.max.x <= self.max.x
            && rhs.max.y <= self.max.y
    }
}

impl<S: BaseNum> fmt::Debug for Aabb2<S> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "[{:?} - {:?}]", self.min, self.max)
    }
}

#[inline]
fn min<S: PartialOrd + Copy>(lhs: S, rhs: S) -> S {
    match lhs.partial_cmp(&rhs) {
        Some(Ordering::Less) | Some(Ordering::Equal) | None => lhs,
        _ => rhs,
    }
}

#[inline]
fn max<S: PartialOrd + Copy>(lhs: S, rhs: S) -> S {
    match lhs.partial_cmp(&rhs) {
        Some(Ordering::Greater) | Some(Ordering::Equal) | None => lhs,
        _ => rhs,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize() {
        let area = Aabb2::new(Point2::new(4, 8), Point2::new(0, 2));
        assert_eq!(area.min, Point2::new(0, 2));
        assert_eq!(area.max, Point2::new(4, 8));
        assert_eq!((area.width(), area.height()), (4, 6));
    }

    #[test]
    fn containment() {
        let outer = Aabb2::with_size(0, 0, 16, 16);
        assert!(outer.contains(&Aabb2::with_size(4, 4, 12, 12)));
        assert!(!outer.contains(&Aabb2::with_size(4, 4, 13, 12)));
    }
}
