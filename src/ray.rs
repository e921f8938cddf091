/*

    Ray r(t) = o + d * t, queried against the KD-tree.

    Direction is NOT required to be normalized: hit distances
    reported by the tree are ray parameters t, so they are
    distances only when |d| = 1. Zero components are allowed
    (axis-parallel rays).

    @date: Oct, 2025
*/

use bevy_math::NormedVectorSpace;

use crate::prelude::*;


#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct Ray {
    #[serde(rename = "Origin", deserialize_with = "crate::json_parser::deser_vector3")]
    pub origin: Vector3,
    #[serde(rename = "Direction", deserialize_with = "crate::json_parser::deser_vector3")]
    pub direction: Vector3,
}

impl Ray {

    pub fn new(origin: Vector3, direction: Vector3) -> Self {
        Self {
            origin,
            direction,
        }
    }

    /// Ray starting at `origin` and passing through `target` at t = 1.
    pub fn towards(origin: Vector3, target: Vector3) -> Self {
        Self::new(origin, target - origin)
    }

    #[inline]
    pub fn at(&self, t: Float) -> Vector3 {
        self.origin + self.direction * t // r(t) = o + dt
    }

    #[inline]
    pub fn distance_at(&self, t: Float) -> Float {
        (self.at(t) - self.origin).norm()
    }

    /// True when every component of the direction is zero, such a ray
    /// cannot hit anything.
    pub fn is_degenerate(&self) -> bool {
        self.direction == Vector3::ZERO
    }
}
