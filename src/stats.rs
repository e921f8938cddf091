/*

    Intersection counters for profiling KD-tree queries.

    A QueryStats object is handed to every query instead of
    living in a global, so the same tree can be traced from
    many threads with either a shared or a per-thread counter.
    Updates are relaxed atomics: totals are exact, but there
    is no ordering between different counters.

    @date: 12 Nov, 2025
*/

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};


#[derive(Debug, Default)]
pub struct QueryStats {
    ray_box_tests: AtomicU64,
    ray_triangle_intersection_tests: AtomicU64,
    ray_triangle_intersections_found: AtomicU64,
}

/// Plain copy of the counters at some point in time.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatsSnapshot {
    pub ray_box_tests: u64,
    pub ray_triangle_intersection_tests: u64,
    pub ray_triangle_intersections_found: u64,
}

impl QueryStats {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub(crate) fn record_box_test(&self) {
        self.ray_box_tests.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub(crate) fn record_triangle_test(&self, hit: bool) {
        self.ray_triangle_intersection_tests.fetch_add(1, Ordering::Relaxed);
        if hit {
            self.ray_triangle_intersections_found.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub fn ray_box_tests(&self) -> u64 {
        self.ray_box_tests.load(Ordering::Relaxed)
    }

    pub fn ray_triangle_intersection_tests(&self) -> u64 {
        self.ray_triangle_intersection_tests.load(Ordering::Relaxed)
    }

    pub fn ray_triangle_intersections_found(&self) -> u64 {
        self.ray_triangle_intersections_found.load(Ordering::Relaxed)
    }

    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            ray_box_tests: self.ray_box_tests(),
            ray_triangle_intersection_tests: self.ray_triangle_intersection_tests(),
            ray_triangle_intersections_found: self.ray_triangle_intersections_found(),
        }
    }

    pub fn reset(&self) {
        self.ray_box_tests.store(0, Ordering::Relaxed);
        self.ray_triangle_intersection_tests.store(0, Ordering::Relaxed);
        self.ray_triangle_intersections_found.store(0, Ordering::Relaxed);
    }
}

impl fmt::Display for StatsSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ray-box tests, {} ray-triangle tests, {} ray-triangle hits",
            self.ray_box_tests, self.ray_triangle_intersection_tests, self.ray_triangle_intersections_found
        )
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use rayon::prelude::*;

    #[test]
    fn test_counts_and_reset() {
        let stats = QueryStats::new();
        stats.record_box_test();
        stats.record_triangle_test(false);
        stats.record_triangle_test(true);
        assert_eq!(stats.snapshot(), StatsSnapshot {
            ray_box_tests: 1,
            ray_triangle_intersection_tests: 2,
            ray_triangle_intersections_found: 1,
        });

        stats.reset();
        assert_eq!(stats.snapshot(), StatsSnapshot::default());
    }

    #[test]
    fn test_shared_across_threads() {
        let stats = QueryStats::new();
        (0..1000).into_par_iter().for_each(|i| stats.record_triangle_test(i % 2 == 0));
        assert_eq!(stats.ray_triangle_intersection_tests(), 1000);
        assert_eq!(stats.ray_triangle_intersections_found(), 500);
    }
}
