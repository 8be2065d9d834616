//! Point index mapping exact coordinates to the markers sitting on them

use crate::MarkerId;
use crate::utils::{self, CoordKey};
use geo::{Coord, Point};
use smallvec::SmallVec;
use std::collections::HashMap;

/// Markers sharing one coordinate, in load order (duplicates kept)
type Bucket = SmallVec<[MarkerId; 2]>;

/// Exact-coordinate lookup of point markers
#[derive(Clone, Debug, Default)]
pub struct PointIndex {
    buckets: HashMap<CoordKey, Bucket>,
    /// (coordinate, marker) pairs sorted by x, for tolerance queries
    by_x: Vec<(Coord<f64>, MarkerId)>,
    skipped: usize,
}

#[cfg_attr(feature = "profiling", profiling::all_functions)]
impl PointIndex {
    /// Load markers from a point layer
    ///
    /// Markers without a geometry or with non-finite coordinates are skipped.
    pub fn load<I>(markers: I) -> Self
    where
        I: IntoIterator<Item = (MarkerId, Option<Point<f64>>)>,
    {
        #[cfg(feature = "profiling")]
        profiling::scope!("markers::load");

        let mut index = Self::default();

        for (id, point) in markers {
            let Some(point) = point.filter(|p| p.x().is_finite() && p.y().is_finite()) else {
                tracing::debug!("Skipping marker {id}: no usable point geometry");
                index.skipped += 1;
                continue;
            };
            let coord = point.0;
            let Some(key) = CoordKey::new(coord) else {
                index.skipped += 1;
                continue;
            };
            index.buckets.entry(key).or_default().push(id);
            index.by_x.push((coord, id));
        }

        index.by_x.sort_by(|a, b| a.0.x.total_cmp(&b.0.x));
        index
    }

    /// Markers located exactly at `coord`
    #[inline]
    pub fn at(&self, coord: Coord<f64>) -> &[MarkerId] {
        CoordKey::new(coord)
            .and_then(|key| self.buckets.get(&key))
            .map(|bucket| bucket.as_slice())
            .unwrap_or(&[])
    }

    /// Markers within `tolerance` of `coord` on both axes
    ///
    /// A tolerance of `0.0` is the exact lookup of [`PointIndex::at`].
    pub fn within(&self, coord: Coord<f64>, tolerance: f64) -> Vec<MarkerId> {
        if tolerance <= 0.0 {
            return self.at(coord).to_vec();
        }

        let lo = coord.x - tolerance;
        let hi = coord.x + tolerance;
        let start = self.by_x.partition_point(|(c, _)| c.x < lo);

        self.by_x[start..]
            .iter()
            .take_while(|(c, _)| c.x <= hi)
            .filter(|(c, _)| utils::coincident(*c, coord, tolerance))
            .map(|(_, id)| *id)
            .collect()
    }

    /// Number of indexed markers
    #[inline]
    pub fn len(&self) -> usize {
        self.by_x.len()
    }

    /// Number of distinct marker coordinates
    #[inline]
    pub fn coordinate_count(&self) -> usize {
        self.buckets.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.by_x.is_empty()
    }

    /// Markers filtered out during load
    #[inline]
    pub fn skipped(&self) -> usize {
        self.skipped
    }
}
