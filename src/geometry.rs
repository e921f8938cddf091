/*

    Triangle geometry helpers: ray-triangle intersection,
    centroid, normal and degeneracy checks.

    @date: 9 Oct, 2025
*/

use bevy_math::NormedVectorSpace;

use crate::ray::Ray;
use crate::prelude::*;

/// Determinants below this magnitude are treated as a ray parallel to the triangle plane.
pub const PARALLEL_EPSILON: Float = 1e-12;

/// Return true if any of the two verts at the same position
/// or all three lie on a line (zero area).
pub fn is_degenerate_triangle(verts: &[Vector3; 3]) -> bool {

    for i in 0..3 {
        for j in (i + 1)..3 {
            if approx_zero(verts[i].distance_squared(verts[j])) {
                debug!("Found degenerate triangle with coincident vertices v1: {:?}, v2: {:?}, v3: {:?} ", verts[0], verts[1], verts[2]);
                return true;
            }
        }
    }

    let [a, b, c] = verts;
    approx_zero((b - a).cross(c - a).norm_squared())
}

pub fn centroid(verts: &[Vector3; 3]) -> Vector3 {
    (verts[0] + verts[1] + verts[2]) / 3.0
}

pub fn get_tri_normal(v1: &Vector3, v2: &Vector3, v3: &Vector3) -> Vector3 {
    // WARNING: Assumes triangle indices are given in counter clockwise order
    //
    //    v1
    //  /    \
    // v2 —— v3
    //
    let left = v1 - v2;
    let right = v3 - v2;
    right.cross(left).normalize()
}

/// Based on Möller-Trumbore algorithm
///
/// ```text
///     a (pivot)
///    / \
///  b  -  c
/// ```
///
/// Returns (u, v, t) where u weights b, v weights c and t is the ray parameter.
/// Only hits with 0 <= t < minimum_t are reported.
pub fn moller_trumbore_intersection(ray: &Ray, minimum_t: Float, verts: &[Vector3; 3]) -> Option<(Float, Float, Float)> {
    let [tri_pivot, tri_left, tri_right] = *verts;
    let edge_ab = tri_left - tri_pivot;
    let edge_ac = tri_right - tri_pivot;
    // Scalar triple product https://youtu.be/fK1RPmF_zjQ
    let perp = ray.direction.cross(edge_ac);
    let determinant: Float = perp.dot(edge_ab);
    if determinant.abs() < PARALLEL_EPSILON {
        return None;
    }
    let inverse_determinant = 1.0 as Float / determinant;
    let dist = ray.origin - tri_pivot;
    let barycentric_u = dist.dot(perp) * inverse_determinant;
    if !(0.0..=1.0).contains(&barycentric_u) {
        return None;
    }
    let another_perp = dist.cross(edge_ab);
    let barycentric_v = ray.direction.dot(another_perp) * inverse_determinant;
    if (barycentric_v < 0.0) || ((barycentric_u + barycentric_v) > 1.0) {
        return None;
    }
    // Get ray t
    let t = edge_ac.dot(another_perp) * inverse_determinant;
    if !(0.0..minimum_t).contains(&t) {
        return None;
    }
    Some((barycentric_u, barycentric_v, t))
}


#[cfg(test)]
mod tests {
    use super::*;

    fn unit_triangle_at_z(z: Float) -> [Vector3; 3] {
        [
            Vector3::new(0., 0., z),
            Vector3::new(1., 0., z),
            Vector3::new(0., 1., z),
        ]
    }

    #[test]
    fn test_hit_reports_t_and_barycentrics() {
        let tri = unit_triangle_at_z(5.);
        let ray = Ray::new(Vector3::new(0.25, 0.5, 0.), Vector3::new(0., 0., 1.));
        let (u, v, t) = moller_trumbore_intersection(&ray, Float::INFINITY, &tri).unwrap();
        assert!(approx_eq(t, 5.));
        assert!(approx_eq(u, 0.25));
        assert!(approx_eq(v, 0.5));
    }

    #[test]
    fn test_minimum_t_is_exclusive_upper_bound() {
        let tri = unit_triangle_at_z(5.);
        let ray = Ray::new(Vector3::new(0.25, 0.25, 0.), Vector3::new(0., 0., 1.));
        assert!(moller_trumbore_intersection(&ray, 5.0, &tri).is_none());
        assert!(moller_trumbore_intersection(&ray, 5.0 + 1e-9, &tri).is_some());
    }

    #[test]
    fn test_misses() {
        let tri = unit_triangle_at_z(5.);
        // Outside the triangle
        let ray = Ray::new(Vector3::new(0.9, 0.9, 0.), Vector3::new(0., 0., 1.));
        assert!(moller_trumbore_intersection(&ray, Float::INFINITY, &tri).is_none());
        // Behind the origin
        let ray = Ray::new(Vector3::new(0.2, 0.2, 10.), Vector3::new(0., 0., 1.));
        assert!(moller_trumbore_intersection(&ray, Float::INFINITY, &tri).is_none());
        // Parallel to the plane
        let ray = Ray::new(Vector3::new(0.2, 0.2, 0.), Vector3::new(1., 0., 0.));
        assert!(moller_trumbore_intersection(&ray, Float::INFINITY, &tri).is_none());
    }

    #[test]
    fn test_degenerate_and_centroid() {
        let tri = unit_triangle_at_z(0.);
        assert!(!is_degenerate_triangle(&tri));
        assert_eq!(centroid(&tri), Vector3::new(1. / 3., 1. / 3., 0.));

        let collinear = [Vector3::ZERO, Vector3::X, Vector3::X * 2.];
        assert!(is_degenerate_triangle(&collinear));
        let coincident = [Vector3::ZERO, Vector3::ZERO, Vector3::Y];
        assert!(is_degenerate_triangle(&coincident));
    }

    #[test]
    fn test_normal_is_unit() {
        let [a, b, c] = unit_triangle_at_z(0.);
        let n = get_tri_normal(&a, &b, &c);
        assert!(approx_eq(n.norm(), 1.0));
        assert!(approx_eq(n.z.abs(), 1.0));
    }
}
