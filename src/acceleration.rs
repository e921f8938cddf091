/*

    KD-tree over a static set of triangles.

    Every node owns an axis aligned box. Internal nodes split
    their box in half along the longest axis and push each
    triangle down to the child containing it. Triangles with
    corners in both children stay in the node itself.

    Triangles are never copied, nodes store indices into the
    slice given to build( ) and queries must be given the same
    slice again.

    @date: 10 Nov, 2025
*/

use std::time::Instant;

use crate::bbox::BoundingBox;
use crate::config::{ConfigError, TraversalOrder, TreeConfig};
use crate::interval::Interval;
use crate::ray::Ray;
use crate::shapes::Shape;
use crate::stats::QueryStats;
use crate::prelude::*;

/// Below this many candidates sibling subtrees are built on the current thread.
pub const PARALLEL_BUILD_CUTOFF: usize = 1024;


// ====================================================================================================
// Tree nodes
// ====================================================================================================

#[derive(Debug)]
pub enum KDNode {
    Leaf {
        bbox: BoundingBox,
        triangles: Vec<usize>,
    },
    Internal {
        bbox: BoundingBox,
        left: Box<KDNode>,
        right: Box<KDNode>,
        triangles: Vec<usize>, // straddling the split plane
    },
}

impl KDNode {
    pub fn bbox(&self) -> &BoundingBox {
        match self {
            KDNode::Leaf { bbox, .. } | KDNode::Internal { bbox, .. } => bbox,
        }
    }

    pub fn triangles(&self) -> &[usize] {
        match self {
            KDNode::Leaf { triangles, .. } | KDNode::Internal { triangles, .. } => triangles,
        }
    }

    pub fn children(&self) -> Option<(&KDNode, &KDNode)> {
        match self {
            KDNode::Leaf { .. } => None,
            KDNode::Internal { left, right, .. } => Some((left.as_ref(), right.as_ref())),
        }
    }

    pub fn is_leaf(&self) -> bool {
        matches!(self, KDNode::Leaf { .. })
    }
}


/// What happened during construction. `dropped` lists triangles that had
/// no corner in either half of a split and are therefore not in the tree.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BuildReport {
    pub nodes: usize,
    pub leaves: usize,
    pub depth: usize,
    pub stored_triangles: usize,
    pub dropped: Vec<usize>,
}

impl BuildReport {
    fn merge(mut self, other: BuildReport) -> Self {
        self.nodes += other.nodes;
        self.leaves += other.leaves;
        self.depth = self.depth.max(other.depth);
        self.stored_triangles += other.stored_triangles;
        self.dropped.extend(other.dropped);
        self
    }
}


/// Closest hit along a ray: index into the triangle slice, ray parameter t
/// and the barycentric coordinates reported by the triangle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NearestHit {
    pub triangle: usize,
    pub t: Float,
    pub u: Float,
    pub v: Float,
}


// ====================================================================================================
// Construction
// ====================================================================================================

struct Builder<'a, T> {
    triangles: &'a [T],
    config: &'a TreeConfig,
}

impl<'a, T: Shape> Builder<'a, T> {

    fn build_node(&self, bbox: BoundingBox, candidates: Vec<usize>, depth: usize) -> (KDNode, BuildReport) {

        if candidates.len() < self.config.max_triangles_per_leaf {
            return self.leaf(bbox, candidates, depth);
        }
        if depth >= self.config.max_depth {
            warn!("Reached maximum depth {} in box {} with {} triangles left, making a leaf.", depth, bbox, candidates.len());
            return self.leaf(bbox, candidates, depth);
        }

        let (left_box, right_box) = bbox.split();

        let mut left_candidates = Vec::new();
        let mut right_candidates = Vec::new();
        let mut straddling = Vec::new();
        let mut dropped = Vec::new();

        for idx in candidates {
            let triangle = &self.triangles[idx];
            let in_left = left_box.contains_triangle(triangle);
            let in_right = right_box.contains_triangle(triangle);
            match (in_left, in_right) {
                (true, false) => left_candidates.push(idx),
                (false, true) => right_candidates.push(idx),
                (true, true) => straddling.push(idx),
                (false, false) => {
                    let [p1, p2, p3] = triangle.vertices();
                    error!("Triangle {} neither in left nor in right bounding box: {:?}, {:?}, {:?}", idx, p1, p2, p3);
                    dropped.push(idx);
                }
            }
        }

        let parallel = self.config.parallel_build
            && left_candidates.len() + right_candidates.len() >= PARALLEL_BUILD_CUTOFF;

        let ((left, left_report), (right, right_report)) = if parallel {
            rayon::join(
                || self.build_node(left_box, left_candidates, depth + 1),
                || self.build_node(right_box, right_candidates, depth + 1),
            )
        } else {
            (
                self.build_node(left_box, left_candidates, depth + 1),
                self.build_node(right_box, right_candidates, depth + 1),
            )
        };

        let report = BuildReport {
            nodes: 1,
            leaves: 0,
            depth,
            stored_triangles: straddling.len(),
            dropped,
        };
        let report = report.merge(left_report).merge(right_report);

        let node = KDNode::Internal {
            bbox,
            left: Box::new(left),
            right: Box::new(right),
            triangles: straddling,
        };
        (node, report)
    }

    fn leaf(&self, bbox: BoundingBox, triangles: Vec<usize>, depth: usize) -> (KDNode, BuildReport) {
        let report = BuildReport {
            nodes: 1,
            leaves: 1,
            depth,
            stored_triangles: triangles.len(),
            dropped: Vec::new(),
        };
        (KDNode::Leaf { bbox, triangles }, report)
    }
}


// ====================================================================================================
// KD-tree
// ====================================================================================================

#[derive(Debug)]
pub struct KDTree {
    root: KDNode,
    config: TreeConfig,
    report: BuildReport,
    triangle_count: usize,
}

impl KDTree {

    /// Build with the default config.
    pub fn build<T: Shape>(triangles: &[T]) -> Self {
        Self::build_unchecked(triangles, TreeConfig::default())
    }

    pub fn build_with_config<T: Shape>(triangles: &[T], config: &TreeConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self::build_unchecked(triangles, *config))
    }

    fn build_unchecked<T: Shape>(triangles: &[T], config: TreeConfig) -> Self {
        let span = tracing::span!(tracing::Level::INFO, "build_kdtree");
        let _enter = span.enter();
        let start = Instant::now();

        let bbox = BoundingBox::enclosing(triangles);
        if bbox.is_empty() {
            warn!("Building KD-tree over an empty triangle set.");
        } else {
            info!("Min coordinates: {}, {}, {}", bbox.min.x, bbox.min.y, bbox.min.z);
            info!("Max coordinates: {}, {}, {}", bbox.max.x, bbox.max.y, bbox.max.z);
        }

        let builder = Builder { triangles, config: &config };
        let candidates: Vec<usize> = (0..triangles.len()).collect();
        let (root, report) = builder.build_node(bbox, candidates, 0);

        if !report.dropped.is_empty() {
            error!("{} of {} triangles could not be placed and were dropped.", report.dropped.len(), triangles.len());
        }
        info!(
            "Built KD-tree over {} triangles in {:?}: {} nodes, {} leaves, depth {}.",
            triangles.len(), start.elapsed(), report.nodes, report.leaves, report.depth
        );

        Self {
            root,
            config,
            report,
            triangle_count: triangles.len(),
        }
    }

    pub fn root(&self) -> &KDNode {
        &self.root
    }

    pub fn config(&self) -> &TreeConfig {
        &self.config
    }

    pub fn report(&self) -> &BuildReport {
        &self.report
    }

    pub fn bbox(&self) -> &BoundingBox {
        self.root.bbox()
    }

    /// Length of the triangle slice the tree was built on.
    pub fn triangle_count(&self) -> usize {
        self.triangle_count
    }

    /// Closest triangle hit with t < minimum_t, None if the ray misses everything.
    /// `triangles` should be the slice the tree was built on (see `triangle_count`),
    /// indices past its end are skipped.
    pub fn nearest_hit<T: Shape>(&self, triangles: &[T], ray: &Ray, minimum_t: Float, stats: &QueryStats) -> Option<NearestHit> {
        if ray.is_degenerate() {
            return None;
        }

        match self.config.traversal {
            TraversalOrder::Fixed => nearest_fixed(&self.root, triangles, ray, minimum_t, stats),
            TraversalOrder::NearFirst => {
                stats.record_box_test();
                let span = self.root.bbox().ray_interval(ray)?;
                if !overlaps_query(&span, minimum_t) {
                    return None;
                }
                nearest_near_first(&self.root, triangles, ray, minimum_t, stats)
            }
        }
    }

    pub fn query<T: Shape>(&self, triangles: &[T], origin: &Vector3, direction: &Vector3, minimum_t: Float, stats: &QueryStats) -> Option<NearestHit> {
        self.nearest_hit(triangles, &Ray::new(*origin, *direction), minimum_t, stats)
    }

    /// True if any triangle is hit with 0 <= t < maximum_t. Stops at the first hit.
    /// Indices past the end of `triangles` are skipped, as in `nearest_hit`.
    pub fn any_hit<T: Shape>(&self, triangles: &[T], ray: &Ray, maximum_t: Float, stats: &QueryStats) -> bool {
        any_hit_node(&self.root, triangles, ray, maximum_t, stats)
    }
}


// ====================================================================================================
// Traversal
// ====================================================================================================

/// Scan a node's own triangle list, tightening minimum_t on every closer hit.
fn scan_triangles<T: Shape>(indices: &[usize], triangles: &[T], ray: &Ray, minimum_t: &mut Float, stats: &QueryStats) -> Option<NearestHit> {
    let mut best = None;
    for &idx in indices {
        let Some(triangle) = triangles.get(idx) else { continue };
        let hit = triangle.intersect(ray, *minimum_t);
        stats.record_triangle_test(hit.is_some());
        if let Some(hit) = hit {
            if hit.t < *minimum_t {
                *minimum_t = hit.t;
                best = Some(NearestHit { triangle: idx, t: hit.t, u: hit.u, v: hit.v });
            }
        }
    }
    best
}

// Left, right, then own triangles, no matter which child the ray enters first.
fn nearest_fixed<T: Shape>(node: &KDNode, triangles: &[T], ray: &Ray, minimum_t: Float, stats: &QueryStats) -> Option<NearestHit> {
    stats.record_box_test();
    if !node.bbox().intersects(&ray.origin, &ray.direction) {
        return None;
    }

    let mut minimum_t = minimum_t;
    let mut best = None;

    if let Some((left, right)) = node.children() {
        for child in [left, right] {
            if let Some(hit) = nearest_fixed(child, triangles, ray, minimum_t, stats) {
                if hit.t < minimum_t {
                    minimum_t = hit.t;
                    best = Some(hit);
                }
            }
        }
    }

    if let Some(hit) = scan_triangles(node.triangles(), triangles, ray, &mut minimum_t, stats) {
        best = Some(hit);
    }
    best
}

#[inline]
fn overlaps_query(span: &Interval, minimum_t: Float) -> bool {
    span.max >= 0.0 && span.min < minimum_t
}

// Caller has already checked that the ray passes through this node's box
// somewhere in [0, minimum_t).
fn nearest_near_first<T: Shape>(node: &KDNode, triangles: &[T], ray: &Ray, minimum_t: Float, stats: &QueryStats) -> Option<NearestHit> {
    let mut minimum_t = minimum_t;
    let mut best = scan_triangles(node.triangles(), triangles, ray, &mut minimum_t, stats);

    let Some((left, right)) = node.children() else {
        return best;
    };

    let clip = |child: &KDNode| {
        stats.record_box_test();
        child.bbox().ray_interval(ray)
    };
    let left_span = clip(left);
    let right_span = clip(right);

    let order = match (left_span, right_span) {
        (Some(l), Some(r)) if r.min < l.min => [(right, right_span), (left, left_span)],
        _ => [(left, left_span), (right, right_span)],
    };

    for (child, span) in order {
        let Some(span) = span else { continue };
        // Everything in the child lies inside its box, so nothing there
        // can be closer than the entry point.
        if !overlaps_query(&span, minimum_t) {
            continue;
        }
        if let Some(hit) = nearest_near_first(child, triangles, ray, minimum_t, stats) {
            if hit.t < minimum_t {
                minimum_t = hit.t;
                best = Some(hit);
            }
        }
    }
    best
}

fn any_hit_node<T: Shape>(node: &KDNode, triangles: &[T], ray: &Ray, maximum_t: Float, stats: &QueryStats) -> bool {
    stats.record_box_test();
    match node.bbox().ray_interval(ray) {
        Some(span) if overlaps_query(&span, maximum_t) => {}
        _ => return false,
    }

    for &idx in node.triangles() {
        let Some(triangle) = triangles.get(idx) else { continue };
        let hit = triangle.intersect(ray, maximum_t).is_some();
        stats.record_triangle_test(hit);
        if hit {
            return true;
        }
    }

    match node.children() {
        Some((left, right)) => {
            any_hit_node(left, triangles, ray, maximum_t, stats)
                || any_hit_node(right, triangles, ray, maximum_t, stats)
        }
        None => false,
    }
}
