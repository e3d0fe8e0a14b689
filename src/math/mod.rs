//! This module contains the math utils that mainly comes from `cgmath`.

pub use cgmath::{Point2, Vector2, Vector3};

pub mod aabb;
pub use self::aabb::Aabb2;

pub mod rect;
pub use self::rect::Rect;

/// An integer pixel-space area, with the upper-left corner at `min`.
pub type Area = Aabb2<i32>;
