//! TraceSession - Top-level manager for one pair of line and point layers
//!
//! This module provides the high-level API: load both layers once, build the
//! spatial index, then answer any number of clicks against the read-only network.

use crate::quadtree::DEFAULT_MAX_DEPTH;
use crate::{
    DataError, FeatureId, MarkerId, Network, PointIndex, PolylineStore, ReachableSet, Result,
    SpatialIndex, TraceError, Traversal, VertexRef, resolve_start, trace_downstream,
};
use geo::{Geometry, Point};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Configuration for a tracing session
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Config {
    /// Distance under which two vertices count as the same network node.
    /// Default: 0.0, meaning exact coordinate equality.
    /// Positive values also widen marker matching by the same amount.
    pub snap_tolerance: f64,
    /// Maximum depth of the spatial index quadtree
    pub max_depth: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            snap_tolerance: 0.0,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

impl Config {
    pub fn validate(&self) -> Result<()> {
        if !self.snap_tolerance.is_finite() || self.snap_tolerance < 0.0 {
            return Err(DataError::InvalidConfig(format!(
                "snap tolerance must be a finite non-negative number, got {}",
                self.snap_tolerance
            )));
        }
        if self.max_depth > 32 {
            return Err(DataError::InvalidConfig(format!(
                "max depth must be at most 32, got {}",
                self.max_depth
            )));
        }
        Ok(())
    }
}

/// Information about the loaded layers
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SessionInfo {
    /// Line features stored
    pub features: usize,
    /// Line features filtered out at load time
    pub skipped_features: usize,
    /// Point markers indexed
    pub markers: usize,
    /// Point markers filtered out at load time
    pub skipped_markers: usize,
}

/// Everything one click produces
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TraceOutcome {
    /// Feature nearest to the click
    pub feature: FeatureId,
    /// Segment of that feature nearest to the click
    pub segment: usize,
    /// Token the traversal started from
    pub start: VertexRef,
    /// Reachable markers
    pub markers: ReachableSet,
    /// Distinct tokens processed
    pub visited: usize,
}

/// Receives the markers to highlight in the host
pub trait SelectionSink {
    fn select(&mut self, markers: &ReachableSet);
}

/// Receives human-readable status messages for the user
pub trait Notifier {
    fn notify(&mut self, message: &str);
}

impl SelectionSink for Vec<MarkerId> {
    fn select(&mut self, markers: &ReachableSet) {
        self.clear();
        self.extend(markers.iter().copied());
    }
}

impl Notifier for Vec<String> {
    fn notify(&mut self, message: &str) {
        self.push(message.to_string());
    }
}

/// Read-only network for one pair of layers
#[derive(Debug, Clone)]
pub struct TraceSession {
    lines: PolylineStore,
    markers: PointIndex,
    index: SpatialIndex,
    config: Config,
}

#[cfg_attr(feature = "profiling", profiling::all_functions)]
impl TraceSession {
    /// Load both layers and build the spatial index
    ///
    /// Degenerate input geometries are filtered out; only an invalid
    /// configuration is an error.
    pub fn new<L, P>(lines: L, points: P, config: Config) -> Result<Self>
    where
        L: IntoIterator<Item = (FeatureId, Option<Geometry<f64>>)>,
        P: IntoIterator<Item = (MarkerId, Option<Point<f64>>)>,
    {
        #[cfg(feature = "profiling")]
        profiling::scope!("session::new");

        config.validate()?;

        let lines = PolylineStore::load(lines);
        let markers = PointIndex::load(points);
        let index = SpatialIndex::build(&lines, config.max_depth);

        let session = Self {
            lines,
            markers,
            index,
            config,
        };

        let info = session.info();
        tracing::info!(
            "Tracing session ready: {} lines ({} skipped), {} points ({} skipped), index depth {}",
            info.features,
            info.skipped_features,
            info.markers,
            info.skipped_markers,
            session.index.depth()
        );

        Ok(session)
    }

    /// Borrowed view of the network for the traversal functions
    #[inline]
    pub fn network(&self) -> Network<'_> {
        Network::new(&self.lines, &self.index, &self.markers).with_tolerance(self.config.snap_tolerance)
    }

    /// Trace downstream from a clicked point
    pub fn trace_at(&self, point: Point<f64>) -> std::result::Result<TraceOutcome, TraceError> {
        let network = self.network();
        let (feature, segment, start) = resolve_start(&network, point)?;
        let Traversal {
            markers, visited, ..
        } = trace_downstream(&network, start);

        Ok(TraceOutcome {
            feature,
            segment,
            start,
            markers,
            visited,
        })
    }

    /// Trace downstream from a known token
    pub fn trace_from(&self, start: VertexRef) -> Traversal {
        trace_downstream(&self.network(), start)
    }

    /// Run one click through the host collaborators
    ///
    /// No nearby line is reported to the user and nothing gets selected. A
    /// feature without a usable segment is ignored silently. Otherwise the
    /// reachable markers are selected (even if none) and a summary is reported.
    pub fn handle_click<S, N>(
        &self,
        point: Point<f64>,
        selection: &mut S,
        notifier: &mut N,
    ) -> Option<TraceOutcome>
    where
        S: SelectionSink + ?Sized,
        N: Notifier + ?Sized,
    {
        match self.trace_at(point) {
            Ok(outcome) => {
                selection.select(&outcome.markers);
                notifier.notify(&format!(
                    "Clicked line fid={}\nSelected points: {}",
                    outcome.feature,
                    outcome.markers.len()
                ));
                tracing::info!(
                    "Traced from feature {} vertex {}: {} markers",
                    outcome.start.feature,
                    outcome.start.index,
                    outcome.markers.len()
                );
                Some(outcome)
            }
            Err(err @ TraceError::NoNearestFeature) => {
                notifier.notify(&err.to_string());
                None
            }
            Err(err @ TraceError::NoValidSegment { .. }) => {
                tracing::debug!("{err}");
                None
            }
        }
    }

    #[inline]
    pub fn lines(&self) -> &PolylineStore {
        &self.lines
    }

    #[inline]
    pub fn markers(&self) -> &PointIndex {
        &self.markers
    }

    #[inline]
    pub fn index(&self) -> &SpatialIndex {
        &self.index
    }

    #[inline]
    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn info(&self) -> SessionInfo {
        let stats = self.lines.stats();
        SessionInfo {
            features: self.lines.len(),
            skipped_features: stats.skipped,
            markers: self.markers.len(),
            skipped_markers: self.markers.skipped(),
        }
    }
}
