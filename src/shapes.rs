/*

    Declare the triangle capability consumed by the KD-tree
    and a plain Triangle implementing it.

    The tree never owns shapes, it keeps indices into the
    caller's slice, so anything that can report its three
    corners and intersect a ray can be indexed.

    @date: Oct, 2025
*/

use std::fmt::Debug;

use crate::geometry::{centroid, moller_trumbore_intersection};
use crate::ray::Ray;
use crate::prelude::*;


/// Parametric hit data reported by a shape's own intersection routine.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct TriangleHit {
    pub t: Float,
    pub u: Float, // barycentric weight of the second vertex
    pub v: Float, // barycentric weight of the third vertex
}

// =======================================================================================================
// Shape Trait
// =======================================================================================================
pub trait Shape : Debug + Send + Sync {
    /// The three corners used for bounding and containment tests.
    fn vertices(&self) -> [Vector3; 3];

    /// Report a hit with 0 <= t < minimum_t, or None.
    fn intersect(&self, ray: &Ray, minimum_t: Float) -> Option<TriangleHit>;
}


// =======================================================================================================
// Triangle (impl Shape)
// =======================================================================================================
#[derive(Debug, Deserialize, Clone, Copy, PartialEq)]
pub struct Triangle {
    #[serde(rename = "Vertices", deserialize_with = "crate::json_parser::deser_vec3_array")]
    pub verts: [Vector3; 3],
}

impl Triangle {
    pub fn new(p1: Vector3, p2: Vector3, p3: Vector3) -> Self {
        Self { verts: [p1, p2, p3] }
    }

    pub fn p1(&self) -> Vector3 { self.verts[0] }
    pub fn p2(&self) -> Vector3 { self.verts[1] }
    pub fn p3(&self) -> Vector3 { self.verts[2] }

    pub fn centroid(&self) -> Vector3 {
        centroid(&self.verts)
    }
}

impl Shape for Triangle {

    fn vertices(&self) -> [Vector3; 3] {
        self.verts
    }

    fn intersect(&self, ray: &Ray, minimum_t: Float) -> Option<TriangleHit> {
        moller_trumbore_intersection(ray, minimum_t, &self.verts)
            .map(|(u, v, t)| TriangleHit { t, u, v })
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_triangle_shape() {
        let tri = Triangle::new(
            Vector3::new(-1., -1., 2.),
            Vector3::new(1., -1., 2.),
            Vector3::new(0., 1., 2.),
        );
        assert_eq!(tri.vertices()[2], tri.p3());
        assert!(approx_eq(tri.centroid().y, -1. / 3.));

        let ray = Ray::new(Vector3::ZERO, Vector3::Z);
        let hit = tri.intersect(&ray, Float::INFINITY).unwrap();
        assert!(approx_eq(hit.t, 2.));
        assert!(tri.intersect(&ray, 1.).is_none());
    }

    #[test]
    fn test_triangle_from_json() {
        let json = r#"{ "Vertices": ["0 0 0", [1, 0, 0], "0 1 0"] }"#;
        let tri: Triangle = serde_json::from_str(json).unwrap();
        assert_eq!(tri.p2(), Vector3::X);
        assert_eq!(tri.p3(), Vector3::Y);
    }
}
