/*

    Given a workload (tree settings, triangles and rays),
    build the KD-tree and trace every ray through it.

    Currently supports:
        - Parallel nearest hit queries over a batch of rays
        - Brute force reference search to verify the tree

    @date: Oct 11, 2025
*/

use std::time::{Duration, Instant};

use rand::{SeedableRng, rngs::StdRng};
use rayon::prelude::*;

use crate::acceleration::{KDTree, NearestHit};
use crate::config::TreeConfig;
use crate::interval::FloatConst;
use crate::json_parser::{deser_bool, deser_float, deser_usize};
use crate::ray::Ray;
use crate::sampler::{random_rays, random_triangle_soup};
use crate::shapes::{Shape, Triangle};
use crate::stats::{QueryStats, StatsSnapshot};
use crate::prelude::*;

/// Mismatches reported individually before the rest are only counted.
const MAX_REPORTED_MISMATCHES: usize = 10;


#[derive(Debug, Deserialize, SmartDefault)]
#[serde(rename_all = "PascalCase")]
#[serde(default)]
pub struct Workload {
    #[serde(rename = "KDTree")]
    pub tree: TreeConfig,

    #[default = 42]
    #[serde(deserialize_with = "deser_usize")]
    pub seed: usize,

    #[default = 10_000]
    #[serde(deserialize_with = "deser_usize")]
    pub num_triangles: usize,

    #[default = 10_000]
    #[serde(deserialize_with = "deser_usize")]
    pub num_rays: usize,

    #[default = 10.0]
    #[serde(deserialize_with = "deser_float")]
    pub scene_extent: Float,

    #[default = 0.5]
    #[serde(deserialize_with = "deser_float")]
    pub triangle_size: Float,

    #[default = true]
    #[serde(deserialize_with = "deser_bool")]
    pub verify: bool,

    // Explicit geometry, random geometry is generated when these are empty
    pub triangles: Vec<Triangle>,
    pub rays: Vec<Ray>,
}

impl Workload {
    /// Take the explicit triangles and rays, filling in random ones from
    /// `seed` where none were given.
    pub fn into_geometry(self) -> (TreeConfig, Vec<Triangle>, Vec<Ray>, bool) {
        let mut rng = StdRng::seed_from_u64(self.seed as u64);

        let triangles = if self.triangles.is_empty() {
            info!("Generating {} random triangles (seed {}).", self.num_triangles, self.seed);
            random_triangle_soup(&mut rng, self.num_triangles, self.scene_extent, self.triangle_size)
        } else {
            self.triangles
        };

        let rays = if self.rays.is_empty() {
            info!("Generating {} random rays.", self.num_rays);
            random_rays(&mut rng, self.num_rays, self.scene_extent * 1.5)
        } else {
            self.rays
        };

        (self.tree, triangles, rays, self.verify)
    }
}


#[derive(Debug, Clone)]
pub struct TraceSummary {
    pub rays: usize,
    pub hits: usize,
    pub dropped_triangles: usize,
    pub mismatches: Option<usize>, // None when verification was skipped
    pub build_time: Duration,
    pub trace_time: Duration,
    pub stats: StatsSnapshot,
}


/// Iterate over all triangles to find the closest hit
pub fn nearest_hit_naive<T: Shape>(triangles: &[T], ray: &Ray, minimum_t: Float) -> Option<NearestHit> {
    let mut rec = None;
    let mut t_min = minimum_t;
    for (idx, triangle) in triangles.iter().enumerate() {
        if let Some(hit) = triangle.intersect(ray, t_min) {
            // Update if new hit is closer
            if hit.t < t_min {
                t_min = hit.t;
                rec = Some(NearestHit { triangle: idx, t: hit.t, u: hit.u, v: hit.v });
            }
        }
    }
    rec
}

/// Nearest hit of every ray, in the same order as `rays`.
pub fn trace_batch<T: Shape>(tree: &KDTree, triangles: &[T], rays: &[Ray], stats: &QueryStats) -> Vec<Option<NearestHit>> {
    // --- Rayon Multithreading ---
    rays.par_iter()
        .map(|ray| tree.nearest_hit(triangles, ray, FloatConst::INF, stats))
        .collect()
    // -----------------------------
}

/// Number of rays whose tree result differs from brute force.
/// Two results agree when both miss or both hit at the same t.
pub fn verify_batch<T: Shape>(triangles: &[T], rays: &[Ray], results: &[Option<NearestHit>]) -> usize {
    let mismatches: Vec<(usize, Option<NearestHit>)> = rays.par_iter()
        .zip(results.par_iter())
        .enumerate()
        .filter_map(|(i, (ray, found))| {
            let expected = nearest_hit_naive(triangles, ray, FloatConst::INF);
            let agree = match (&expected, found) {
                (None, None) => true,
                (Some(e), Some(f)) => approx_eq(e.t, f.t),
                _ => false,
            };
            if agree { None } else { Some((i, expected)) }
        })
        .collect();

    for (i, expected) in mismatches.iter().take(MAX_REPORTED_MISMATCHES) {
        warn!("Ray {} {:?}: tree found {:?}, brute force found {:?}", i, rays[*i], results[*i], expected);
    }
    mismatches.len()
}

pub fn run(workload: Workload) -> Result<TraceSummary, Box<dyn std::error::Error>> {
    let (config, triangles, rays, verify) = workload.into_geometry();

    let start = Instant::now();
    let tree = KDTree::build_with_config(&triangles, &config)?;
    let build_time = start.elapsed();

    let stats = QueryStats::new();
    let start = Instant::now();
    let results = trace_batch(&tree, &triangles, &rays, &stats);
    let trace_time = start.elapsed();

    let hits = results.iter().filter(|r| r.is_some()).count();
    info!("Traced {} rays in {:?}, {} hit a triangle.", rays.len(), trace_time, hits);
    info!("{}", stats.snapshot());

    let mismatches = if verify {
        let count = verify_batch(&triangles, &rays, &results);
        if count == 0 {
            info!("All {} rays agree with brute force.", rays.len());
        } else {
            error!("{} of {} rays disagree with brute force.", count, rays.len());
        }
        Some(count)
    } else {
        None
    };

    Ok(TraceSummary {
        rays: rays.len(),
        hits,
        dropped_triangles: tree.report().dropped.len(),
        mismatches,
        build_time,
        trace_time,
        stats: stats.snapshot(),
    })
}
