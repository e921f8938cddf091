/*

    Declare numeric types used throughout this repo.

    WARNING: If you like to use f32 instead of f64
    during computations, you need to change both of these:
    pub type Float = f32;
    pub type Vector3 = Vec3;

    @date: 2 Oct, 2025
*/

use bevy_math::DVec3;

pub type Float = f64; // WARNING: If you want to change it to f32, don't forget to update Vector3 type
pub type Vector3 = DVec3;

/// Number of spatial axes, used to iterate over the components of a Vector3.
pub const AXES: usize = 3;

pub fn approx_zero(x: Float) -> bool {
    x.abs() < 1e-8
}

pub fn approx_eq(a: Float, b: Float) -> bool {
    approx_zero(a - b)
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_approx() {
        assert!(approx_zero(1e-10));
        assert!(!approx_zero(1e-3));
        assert!(approx_eq(0.1 + 0.2, 0.3));
    }
}
