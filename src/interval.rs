/*

    Responsible for creating a struct that represents
    ranges from a to b and functionality to check if
    x is in range [a,b].

    Used by the slab test (one interval of ray parameters
    per axis, intersected across axes). The result is the
    span of t for which a ray is inside a box.

    See also associated constants of Interval class:
    - EMPTY: (inf, -inf)
    - UNIVERSE: (-inf, inf)

    @date: Sept 2025

*/

use crate::numeric::{Float};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Interval {
    pub min: Float,
    pub max: Float,
}

impl Interval {

    pub const EMPTY: Self = Self {
        min: FloatConst::INF,
        max: FloatConst::NEG_INF,
    };

    pub const UNIVERSE: Self = Self {
        min: FloatConst::NEG_INF,
        max: FloatConst::INF,
    };

    pub fn new(min: Float, max: Float) -> Self {
        Self {
            min,
            max,
        }
    }

    /// Interval spanned by two values given in any order.
    pub fn from_unordered(a: Float, b: Float) -> Self {
        if b < a { Self::new(b, a) } else { Self::new(a, b) }
    }

    pub fn validate(&self) -> bool {
        self.max >= self.min
    }

    pub fn is_empty(&self) -> bool {
        !self.validate()
    }

    pub fn contains(&self, x: Float) -> bool {
        self.min <= x && x <= self.max
    }

    pub fn expand(&mut self, x: Float) {
        if x < self.min { self.min = x; }
        if x > self.max { self.max = x; }
    }

    /// Overlap of two intervals, max of lower bounds and min of upper bounds.
    /// The result may be empty, check with validate( ).
    pub fn intersect(&self, other: &Interval) -> Interval {
        Self {
            min: self.min.max(other.min),
            max: self.max.min(other.max),
        }
    }

}


pub trait FloatConst: Copy {
    const INF: Self;
    const NEG_INF: Self;
}

impl FloatConst for f32 {
    const INF: Self = f32::INFINITY;
    const NEG_INF: Self = f32::NEG_INFINITY;
}

impl FloatConst for f64 {
    const INF: Self = f64::INFINITY;
    const NEG_INF: Self = f64::NEG_INFINITY;
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_and_universe() {
        assert!(Interval::EMPTY.is_empty());
        assert!(Interval::UNIVERSE.validate());
        assert!(Interval::UNIVERSE.contains(1e300));
        assert!(!Interval::EMPTY.contains(0.0));
    }

    #[test]
    fn test_expand_from_empty() {
        let mut int = Interval::EMPTY;
        for x in [3.0, -1.0, 2.0] {
            int.expand(x);
        }
        assert_eq!(int, Interval::new(-1.0, 3.0));
    }

    #[test]
    fn test_intersect() {
        let a = Interval::new(0.0, 2.0);
        let b = Interval::from_unordered(3.0, 1.0);
        assert_eq!(a.intersect(&b), Interval::new(1.0, 2.0));

        let c = Interval::new(5.0, 6.0);
        assert!(a.intersect(&c).is_empty());

        // Touching at a single point is still a valid interval
        let d = Interval::new(2.0, 4.0);
        assert!(a.intersect(&d).validate());
        assert!(Interval::UNIVERSE.intersect(&a) == a);
    }
}
