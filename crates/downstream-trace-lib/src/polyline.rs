//! Polyline storage and normalization module
//!
//! This module provides the `PolylineStore` which turns heterogeneous line
//! geometries into one ordered vertex sequence per feature, with precomputed
//! bounding boxes for the spatial index.

use crate::{FeatureId, utils};
use geo::{BoundingRect, Coord, Geometry, LineString, Rect};
use std::collections::BTreeMap;

/// A single directed line feature
///
/// Vertex 0 is the upstream-most point, the last vertex the downstream-most one.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Polyline {
    id: FeatureId,
    line: LineString<f64>,
    /// Precomputed bounding box
    bounding_box: Rect<f64>,
}

impl Polyline {
    /// Create a polyline from an ordered vertex sequence
    ///
    /// Returns `None` for sequences with fewer than 2 vertices.
    pub fn new(id: FeatureId, vertices: Vec<Coord<f64>>) -> Option<Self> {
        if vertices.len() < 2 {
            return None;
        }
        let line = LineString::new(vertices);
        let bounding_box = line.bounding_rect()?;
        Some(Self {
            id,
            line,
            bounding_box,
        })
    }

    #[inline]
    pub fn id(&self) -> FeatureId {
        self.id
    }

    /// Ordered vertices, upstream first
    #[inline]
    pub fn vertices(&self) -> &[Coord<f64>] {
        &self.line.0
    }

    #[inline]
    pub fn line_string(&self) -> &LineString<f64> {
        &self.line
    }

    #[inline]
    pub fn bounding_box(&self) -> Rect<f64> {
        self.bounding_box
    }

    /// First vertex, where other lines can flow into this one
    #[inline]
    pub fn head(&self) -> Coord<f64> {
        self.line.0[0]
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.line.0.len()
    }

    /// Always false: a stored polyline has at least 2 vertices
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.line.0.is_empty()
    }
}

/// Counters collected while loading a line layer
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LoadStats {
    /// Features stored
    pub loaded: usize,
    /// Features filtered out (missing, empty, degenerate or non-line geometry)
    pub skipped: usize,
}

/// Per-feature vertex sequences for one tracing session
#[derive(Clone, Debug, Default)]
pub struct PolylineStore {
    polylines: BTreeMap<FeatureId, Polyline>,
    /// Union of all feature bounding boxes (None if empty)
    bounds: Option<Rect<f64>>,
    stats: LoadStats,
}

#[cfg_attr(feature = "profiling", profiling::all_functions)]
impl PolylineStore {
    /// Load features from a line layer
    ///
    /// Multi-part lines contribute their first part only. Missing, empty and
    /// degenerate geometries are filtered out, never reported as errors.
    pub fn load<I>(features: I) -> Self
    where
        I: IntoIterator<Item = (FeatureId, Option<Geometry<f64>>)>,
    {
        #[cfg(feature = "profiling")]
        profiling::scope!("polyline::load");

        let mut store = Self::default();

        for (id, geometry) in features {
            let polyline = geometry
                .map(first_part_vertices)
                .and_then(|vertices| Polyline::new(id, vertices));

            match polyline {
                Some(polyline) => store.insert(polyline),
                None => {
                    tracing::debug!("Skipping feature {id}: no usable line geometry");
                    store.stats.skipped += 1;
                }
            }
        }

        store
    }

    fn insert(&mut self, polyline: Polyline) {
        let bbox = polyline.bounding_box();
        if let Some(previous) = self.polylines.insert(polyline.id(), polyline) {
            tracing::warn!("Duplicate feature id {}, keeping the later geometry", previous.id());
            self.stats.skipped += 1;
        } else {
            self.stats.loaded += 1;
        }

        self.bounds = Some(match self.bounds {
            Some(bounds) => utils::union_rect(bounds, bbox),
            None => bbox,
        });
    }

    #[inline]
    pub fn get(&self, id: FeatureId) -> Option<&Polyline> {
        self.polylines.get(&id)
    }

    /// Vertex sequence of a feature
    #[inline]
    pub fn vertices(&self, id: FeatureId) -> Option<&[Coord<f64>]> {
        self.polylines.get(&id).map(Polyline::vertices)
    }

    /// All polylines in ascending id order
    pub fn iter(&self) -> impl Iterator<Item = &Polyline> {
        self.polylines.values()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.polylines.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.polylines.is_empty()
    }

    /// Combined bounding box of every stored feature
    #[inline]
    pub fn bounds(&self) -> Option<Rect<f64>> {
        self.bounds
    }

    #[inline]
    pub fn stats(&self) -> LoadStats {
        self.stats
    }
}

/// Extract the vertex sequence of a line geometry
///
/// Only the first part of a multi-line is used. Other geometry kinds yield
/// no vertices.
fn first_part_vertices(geometry: Geometry<f64>) -> Vec<Coord<f64>> {
    match geometry {
        Geometry::LineString(line) => line.0,
        Geometry::MultiLineString(multi) => multi.0.into_iter().next().map(|l| l.0).unwrap_or_default(),
        Geometry::Line(line) => vec![line.start, line.end],
        _ => Vec::new(),
    }
}
