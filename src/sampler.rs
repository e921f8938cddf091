/*

    Random workloads: triangle soups and rays aimed into them.

    Everything takes the rng as an argument so that a seed
    reproduces the same scene and the same rays.

    @date: 14 Nov, 2025
*/

use rand::Rng;

use crate::ray::Ray;
use crate::shapes::Triangle;
use crate::numeric::*;

/// Uniform point in the cube [-extent, extent]^3.
pub fn random_point<R: Rng + ?Sized>(rng: &mut R, extent: Float) -> Vector3 {
    Vector3::new(
        rng.random_range(-extent..=extent),
        rng.random_range(-extent..=extent),
        rng.random_range(-extent..=extent),
    )
}

/// `count` triangles whose corners are within `size` of a random center
/// inside [-extent, extent]^3.
pub fn random_triangle_soup<R: Rng + ?Sized>(rng: &mut R, count: usize, extent: Float, size: Float) -> Vec<Triangle> {
    (0..count)
        .map(|_| {
            let center = random_point(rng, extent);
            let p1 = center + random_point(rng, size);
            let p2 = center + random_point(rng, size);
            let p3 = center + random_point(rng, size);
            Triangle::new(p1, p2, p3)
        })
        .collect()
}

/// Rays starting anywhere in [-extent, extent]^3 and passing through a
/// random point of the (smaller) scene cube, so most of them cross the scene.
pub fn random_rays<R: Rng + ?Sized>(rng: &mut R, count: usize, extent: Float) -> Vec<Ray> {
    (0..count)
        .map(|_| {
            let origin = random_point(rng, extent);
            let target = random_point(rng, extent * 0.5);
            Ray::towards(origin, target)
        })
        .collect()
}
