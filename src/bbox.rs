/*

    Axis Aligned Bounding Box used as the region of a KD-tree node.

    A box knows nothing about the tree: it can be split in half
    along its longest axis, it can tell whether a point or a
    triangle (any of its corners) lies inside, and it can be
    tested against a ray with the slab test.

    @date: 9 Nov, 2025
*/

use std::fmt;

use crate::prelude::*;
use crate::interval::Interval;
use crate::ray::Ray;
use crate::shapes::Shape;


#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Axis {
    X,
    Y,
    Z,
}

impl Axis {
    pub const ALL: [Axis; 3] = [Axis::X, Axis::Y, Axis::Z];

    #[inline]
    pub fn index(self) -> usize {
        match self {
            Axis::X => 0,
            Axis::Y => 1,
            Axis::Z => 2,
        }
    }
}


#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub min: Vector3,
    pub max: Vector3,
}

impl BoundingBox {

    /// Sentinel with min = +inf and max = -inf. Every point expands it,
    /// nothing is contained in it and no ray hits it.
    pub const EMPTY: Self = Self {
        min: Vector3::splat(Float::INFINITY),
        max: Vector3::splat(Float::NEG_INFINITY),
    };

    pub fn new(min: Vector3, max: Vector3) -> Self {
        debug_assert!(
            (0..AXES).all(|i| min[i] <= max[i]),
            "Invalid bounding box, found max < min: {:?} {:?}", min, max
        );
        Self { min, max }
    }

    /// Smallest box enclosing every finite corner of every shape,
    /// EMPTY if there are none. Non-finite corners never widen the box.
    pub fn enclosing<T: Shape>(shapes: &[T]) -> Self {
        let mut intervals = [Interval::EMPTY; AXES];
        for shape in shapes {
            for p in shape.vertices() {
                if !p.is_finite() {
                    continue;
                }
                for (i, interval) in intervals.iter_mut().enumerate() {
                    interval.expand(p[i]);
                }
            }
        }

        let [x, y, z] = intervals;
        Self {
            min: Vector3::new(x.min, y.min, z.min),
            max: Vector3::new(x.max, y.max, z.max),
        }
    }

    pub fn is_empty(&self) -> bool {
        (0..AXES).any(|i| self.min[i] > self.max[i])
    }

    pub fn interval(&self, axis: Axis) -> Interval {
        let i = axis.index();
        Interval::new(self.min[i], self.max[i])
    }

    /// Absolute lengths along X, Y, Z.
    pub fn extent(&self) -> Vector3 {
        (self.max - self.min).abs()
    }

    pub fn union(&self, other: &BoundingBox) -> BoundingBox {
        Self {
            min: self.min.min(other.min),
            max: self.max.max(other.max),
        }
    }

    /// Axis to split along. X wins ties with Y, but Z wins ties with Y
    /// (and with X), keep this order to reproduce existing tree shapes.
    pub fn longest_axis(&self) -> Axis {
        let length = self.extent();
        if length.x >= length.y && length.x > length.z {
            Axis::X
        } else if length.y > length.z {
            Axis::Y
        } else {
            Axis::Z
        }
    }

    /// Split in half along the longest axis. The left box is the lower half,
    /// the two halves share the split plane.
    pub fn split(&self) -> (BoundingBox, BoundingBox) {
        let i = self.longest_axis().index();
        // Halving both ends first keeps boxes near the float limits finite
        let mid = self.min[i] * 0.5 + self.max[i] * 0.5;

        let mut left = *self;
        let mut right = *self;
        left.max[i] = mid;
        right.min[i] = mid;
        (left, right)
    }

    pub fn contains_point(&self, p: &Vector3) -> bool {
        Axis::ALL.iter().all(|&axis| self.interval(axis).contains(p[axis.index()]))
    }

    /// Vertex sampling: true if any corner of the triangle is inside.
    /// A triangle crossing the box with all corners outside is NOT contained.
    pub fn contains_triangle<T: Shape + ?Sized>(&self, triangle: &T) -> bool {
        triangle.vertices().iter().any(|p| self.contains_point(p))
    }

    /// Range of ray parameters t for which the ray is inside the box,
    /// None if the ray misses. t is not clipped to t >= 0.
    pub fn ray_interval(&self, ray: &Ray) -> Option<Interval> {
        if self.is_empty() {
            return None;
        }

        let mut t_interval = Interval::UNIVERSE;
        for axis in Axis::ALL {
            let i = axis.index();
            let (o, d) = (ray.origin[i], ray.direction[i]);

            // Parallel to this slab: either always inside it or never.
            // Handled here so that 0/0 never produces a NaN.
            if d == 0.0 {
                if o < self.min[i] || o > self.max[i] {
                    return None;
                }
                continue;
            }

            let slab = Interval::from_unordered((self.min[i] - o) / d, (self.max[i] - o) / d);
            t_interval = t_interval.intersect(&slab);
        }

        if t_interval.validate() { Some(t_interval) } else { None }
    }

    /// Slab test
    pub fn intersects(&self, origin: &Vector3, direction: &Vector3) -> bool {
        self.ray_interval(&Ray::new(*origin, *direction)).is_some()
    }
}

impl fmt::Display for BoundingBox {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}, {}, {}] - [{}, {}, {}]",
            self.min.x, self.min.y, self.min.z, self.max.x, self.max.y, self.max.z
        )
    }
}
