//! Downstream traversal engine
//!
//! Walks a line network from a start vertex towards increasing vertex indices.
//! Whenever another feature *starts* on a visited vertex, that whole feature is
//! explored from its own vertex 0. Markers sitting on any visited vertex are
//! collected.
//!
//! The traversal is a plain function over read-only indices with an explicit
//! work stack, so arbitrarily long or deep networks never hit recursion limits.

use crate::{
    FeatureId, PointIndex, PolylineStore, ReachableSet, SpatialIndex, TraceError, VertexRef,
    segment, utils,
};
use geo::Point;
use std::collections::HashSet;

/// Read-only view of everything a traversal needs
#[derive(Clone, Copy, Debug)]
pub struct Network<'a> {
    pub lines: &'a PolylineStore,
    pub index: &'a SpatialIndex,
    pub markers: &'a PointIndex,
    /// Connectivity tolerance, `0.0` for exact coordinates
    pub tolerance: f64,
}

/// Result of one traversal call
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Traversal {
    /// Markers reachable downstream of the start
    pub markers: ReachableSet,
    /// Number of distinct tokens processed
    pub visited: usize,
    /// Features entered, the start feature included
    pub features: HashSet<FeatureId>,
}

impl<'a> Network<'a> {
    pub fn new(lines: &'a PolylineStore, index: &'a SpatialIndex, markers: &'a PointIndex) -> Self {
        Self {
            lines,
            index,
            markers,
            tolerance: 0.0,
        }
    }

    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }
}

/// Resolve a clicked point into the token a trace starts from
///
/// Returns the nearest feature, the index of its nearest segment, and the
/// downstream end of that segment as start token.
pub fn resolve_start(
    network: &Network<'_>,
    point: Point<f64>,
) -> Result<(FeatureId, usize, VertexRef), TraceError> {
    let (feature, distance) = network
        .index
        .nearest(point, network.lines)
        .ok_or(TraceError::NoNearestFeature)?;

    let vertices = network
        .lines
        .vertices(feature)
        .ok_or(TraceError::NoValidSegment { feature })?;

    let segment = segment::nearest_segment(vertices, point)
        .ok_or(TraceError::NoValidSegment { feature })?;

    let start = VertexRef::new(feature, segment::start_vertex(segment, vertices.len()));

    tracing::debug!(
        "Click ({}, {}) resolved to feature {feature} segment {segment} at distance {distance}",
        point.x(),
        point.y()
    );

    Ok((feature, segment, start))
}

/// Collect every marker downstream of `start`, the start vertex included
///
/// Each (feature, vertex) token is processed at most once, which bounds the
/// work on cyclic networks. Tokens referring to unknown features are skipped.
pub fn trace_downstream(network: &Network<'_>, start: VertexRef) -> Traversal {
    #[cfg(feature = "profiling")]
    profiling::scope!("trace::trace_downstream");

    let mut visited: HashSet<VertexRef> = HashSet::new();
    let mut stack = vec![start];
    let mut result = Traversal::default();

    while let Some(token) = stack.pop() {
        if !visited.insert(token) {
            continue;
        }

        let Some(vertices) = network.lines.vertices(token.feature) else {
            tracing::debug!("Skipping token for unknown feature {}", token.feature);
            continue;
        };
        result.features.insert(token.feature);

        for &vertex in vertices.iter().skip(token.index) {
            if network.tolerance > 0.0 {
                result.markers.extend(network.markers.within(vertex, network.tolerance));
            } else {
                result.markers.extend(network.markers.at(vertex).iter().copied());
            }

            for candidate in network
                .index
                .candidates_intersecting_bbox(vertex, network.tolerance)
            {
                if candidate == token.feature {
                    continue;
                }
                let Some(polyline) = network.lines.get(candidate) else {
                    continue;
                };
                if utils::coincident(polyline.head(), vertex, network.tolerance) {
                    stack.push(VertexRef::new(candidate, 0));
                }
            }
        }
    }

    result.visited = visited.len();
    tracing::debug!(
        "Trace from {:?}: {} tokens, {} features, {} markers",
        start,
        result.visited,
        result.features.len(),
        result.markers.len()
    );

    result
}
