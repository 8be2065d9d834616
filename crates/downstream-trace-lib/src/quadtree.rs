//! Quadtree spatial index over line features
//!
//! This module provides a region quadtree covering the extent of a
//! [`PolylineStore`]. Each feature is kept (as id and bounding box only) at the
//! deepest node whose quadrant fully contains its bounding box. Geometry stays
//! in the store and is borrowed when a query needs exact distances.

use crate::{FeatureId, PolylineStore, utils};
use geo::{Coord, Distance, Euclidean, Point, Rect};
use std::cmp::Ordering;
use std::collections::BinaryHeap;

/// Default maximum depth of the quadtree
pub const DEFAULT_MAX_DEPTH: u32 = 20;

/// A feature reference stored in the tree
#[derive(Clone, Copy, Debug)]
struct IndexedFeature {
    id: FeatureId,
    bounding_box: Rect<f64>,
}

/// Spatial index answering nearest-feature and bbox candidate queries
#[derive(Debug, Clone)]
pub struct SpatialIndex {
    /// Root node covering the store's extent (None if the store is empty)
    root: Option<QuadtreeNode>,
    max_depth: u32,
    feature_count: usize,
}

/// A single node of the quadtree
#[derive(Debug, Clone)]
struct QuadtreeNode {
    bounding_box: Rect<f64>,
    /// Depth level in the tree (0 = root)
    level: u32,
    /// Features whose bbox fits here but in none of the children
    features: Vec<IndexedFeature>,
    /// Child nodes (NW, NE, SW, SE) if subdivided
    children: Option<Box<[QuadtreeNode; 4]>>,
}

#[cfg_attr(feature = "profiling", profiling::all_functions)]
impl SpatialIndex {
    /// Build the index over every feature of the store
    pub fn build(store: &PolylineStore, max_depth: u32) -> Self {
        #[cfg(feature = "profiling")]
        profiling::scope!("quadtree::build");

        let mut root = store.bounds().map(|bounds| QuadtreeNode::new_root(square_extent(bounds)));

        if let Some(root) = root.as_mut() {
            for polyline in store.iter() {
                root.insert(
                    IndexedFeature {
                        id: polyline.id(),
                        bounding_box: polyline.bounding_box(),
                    },
                    max_depth,
                );
            }
        }

        Self {
            root,
            max_depth,
            feature_count: store.len(),
        }
    }

    /// Find the feature closest to `point`, with its distance
    ///
    /// Best-first search: nodes and bounding boxes are expanded in order of
    /// their distance lower bound, so the first exact distance popped is the
    /// minimum. Equal distances resolve to the lowest feature id.
    pub fn nearest(&self, point: Point<f64>, store: &PolylineStore) -> Option<(FeatureId, f64)> {
        let root = self.root.as_ref()?;
        let coord = point.0;

        let mut heap = BinaryHeap::new();
        heap.push(Candidate {
            distance: utils::distance_to_rect(coord, root.bounding_box),
            entry: Entry::Node(root),
        });

        while let Some(Candidate { distance, entry }) = heap.pop() {
            match entry {
                Entry::Node(node) => {
                    for feature in &node.features {
                        heap.push(Candidate {
                            distance: utils::distance_to_rect(coord, feature.bounding_box),
                            entry: Entry::Bounds(feature.id),
                        });
                    }
                    if let Some(children) = &node.children {
                        for child in children.iter() {
                            heap.push(Candidate {
                                distance: utils::distance_to_rect(coord, child.bounding_box),
                                entry: Entry::Node(child),
                            });
                        }
                    }
                }
                Entry::Bounds(id) => {
                    let Some(polyline) = store.get(id) else {
                        continue;
                    };
                    let exact = Euclidean.distance(&point, polyline.line_string());
                    if !exact.is_nan() {
                        heap.push(Candidate {
                            distance: exact,
                            entry: Entry::Exact(id),
                        });
                    }
                }
                Entry::Exact(id) => return Some((id, distance)),
            }
        }

        None
    }

    /// Every feature whose bounding box intersects the point's box
    ///
    /// The box is the point itself when `tolerance` is `0.0`, otherwise the
    /// point expanded by `tolerance` on each side. This is a pre-filter: the
    /// caller still checks the actual vertices.
    pub fn candidates_intersecting_bbox(&self, coord: Coord<f64>, tolerance: f64) -> Vec<FeatureId> {
        let mut results = Vec::new();
        if let Some(root) = &self.root {
            root.query(utils::point_box(coord, tolerance), &mut results);
        }
        results
    }

    /// Number of indexed features
    #[inline]
    pub fn len(&self) -> usize {
        self.feature_count
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.feature_count == 0
    }

    #[inline]
    pub fn max_depth(&self) -> u32 {
        self.max_depth
    }

    /// Deepest level that actually holds features
    pub fn depth(&self) -> u32 {
        self.root.as_ref().map(QuadtreeNode::depth).unwrap_or(0)
    }
}

impl QuadtreeNode {
    /// Create a root node covering `bounds`
    fn new_root(bounds: Rect<f64>) -> Self {
        Self::new_child(bounds, 0)
    }

    /// Create a child node with the given bounding box and level
    fn new_child(bounding_box: Rect<f64>, level: u32) -> Self {
        Self {
            bounding_box,
            level,
            features: Vec::new(),
            children: None,
        }
    }

    /// Subdivide this node into 4 children
    fn subdivide(&mut self) {
        if self.children.is_some() {
            return; // Already subdivided
        }

        let min = self.bounding_box.min();
        let max = self.bounding_box.max();
        let mid_x = (min.x + max.x) / 2.0;
        let mid_y = (min.y + max.y) / 2.0;

        let child_level = self.level + 1;

        // Create 4 children: NW, NE, SW, SE
        let nw = QuadtreeNode::new_child(
            Rect::new(Coord { x: min.x, y: mid_y }, Coord { x: mid_x, y: max.y }),
            child_level,
        );
        let ne = QuadtreeNode::new_child(
            Rect::new(Coord { x: mid_x, y: mid_y }, Coord { x: max.x, y: max.y }),
            child_level,
        );
        let sw = QuadtreeNode::new_child(
            Rect::new(Coord { x: min.x, y: min.y }, Coord { x: mid_x, y: mid_y }),
            child_level,
        );
        let se = QuadtreeNode::new_child(
            Rect::new(Coord { x: mid_x, y: min.y }, Coord { x: max.x, y: mid_y }),
            child_level,
        );

        self.children = Some(Box::new([nw, ne, sw, se]));
    }

    /// Index of the quadrant that fully contains `bbox`, if any
    fn containing_quadrant(&self, bbox: Rect<f64>) -> Option<usize> {
        let min = self.bounding_box.min();
        let max = self.bounding_box.max();
        let mid_x = (min.x + max.x) / 2.0;
        let mid_y = (min.y + max.y) / 2.0;

        let west = bbox.max().x < mid_x;
        let east = bbox.min().x > mid_x;
        let south = bbox.max().y < mid_y;
        let north = bbox.min().y > mid_y;

        match (west, east, north, south) {
            (true, _, true, _) => Some(0), // NW
            (_, true, true, _) => Some(1), // NE
            (true, _, _, true) => Some(2), // SW
            (_, true, _, true) => Some(3), // SE
            _ => None,
        }
    }

    /// Insert a feature at the deepest node fully containing it
    fn insert(&mut self, feature: IndexedFeature, max_depth: u32) {
        if self.level < max_depth {
            if let Some(quadrant) = self.containing_quadrant(feature.bounding_box) {
                self.subdivide();
                if let Some(children) = &mut self.children {
                    children[quadrant].insert(feature, max_depth);
                    return;
                }
            }
        }

        // Straddles a split line (or depth exhausted): store at this level
        self.features.push(feature);
    }

    /// Collect features whose bbox intersects `query`
    fn query(&self, query: Rect<f64>, results: &mut Vec<FeatureId>) {
        // Everything below this node lies inside its bounding box
        if !utils::rects_intersect(self.bounding_box, query) {
            return;
        }

        results.extend(
            self.features
                .iter()
                .filter(|f| utils::rects_intersect(f.bounding_box, query))
                .map(|f| f.id),
        );

        if let Some(children) = &self.children {
            for child in children.iter() {
                child.query(query, results);
            }
        }
    }

    fn depth(&self) -> u32 {
        let own = if self.features.is_empty() { 0 } else { self.level };
        match &self.children {
            Some(children) => children.iter().map(QuadtreeNode::depth).fold(own, u32::max),
            None => own,
        }
    }
}

/// Square region anchored at the minimum corner of `bounds`
///
/// Keeps quadrants splittable when every feature lies on one horizontal or
/// vertical line: such features always fall on the min side of each split.
/// The far corner never falls short of `bounds`, even when `min + side`
/// rounds down.
fn square_extent(bounds: Rect<f64>) -> Rect<f64> {
    let side = bounds.width().max(bounds.height());
    let side = if side > 0.0 { side } else { 1.0 };
    let min = bounds.min();
    let max = bounds.max();
    Rect::new(
        min,
        Coord {
            x: (min.x + side).max(max.x),
            y: (min.y + side).max(max.y),
        },
    )
}

/// Item of the best-first nearest-neighbour queue
enum Entry<'a> {
    Node(&'a QuadtreeNode),
    /// Bounding box of a feature, not yet measured exactly
    Bounds(FeatureId),
    /// Exact distance to a feature's geometry
    Exact(FeatureId),
}

impl Entry<'_> {
    /// Expansion order at equal distance: bounds before exact results,
    /// then lowest feature id
    fn rank(&self) -> (u8, FeatureId) {
        match self {
            Entry::Node(_) => (0, 0),
            Entry::Bounds(id) => (1, *id),
            Entry::Exact(id) => (2, *id),
        }
    }
}

struct Candidate<'a> {
    distance: f64,
    entry: Entry<'a>,
}

impl PartialEq for Candidate<'_> {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Candidate<'_> {}

impl PartialOrd for Candidate<'_> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Candidate<'_> {
    // Reversed: BinaryHeap is a max-heap and we want the closest first
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .distance
            .total_cmp(&self.distance)
            .then_with(|| other.entry.rank().cmp(&self.entry.rank()))
    }
}
