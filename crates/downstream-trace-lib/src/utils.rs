//! Utility functions for coordinate keys and rectangle arithmetic

use geo::{Coord, Rect};

/// Exact-equality hash key for a coordinate
///
/// Built from the IEEE bit patterns of both axes. `-0.0` is folded into `0.0` so
/// that key equality agrees with floating-point `==`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct CoordKey {
    x: u64,
    y: u64,
}

impl CoordKey {
    /// Create a key, or `None` if either axis is NaN
    #[inline]
    pub fn new(coord: Coord<f64>) -> Option<Self> {
        if coord.x.is_nan() || coord.y.is_nan() {
            return None;
        }
        Some(Self {
            x: normalize_zero(coord.x).to_bits(),
            y: normalize_zero(coord.y).to_bits(),
        })
    }
}

#[inline(always)]
fn normalize_zero(v: f64) -> f64 {
    if v == 0.0 { 0.0 } else { v }
}

/// Check whether two coordinates are the same network vertex
///
/// A tolerance of `0.0` means exact equality on both axes.
#[inline(always)]
pub fn coincident(a: Coord<f64>, b: Coord<f64>, tolerance: f64) -> bool {
    if tolerance > 0.0 {
        (a.x - b.x).abs() <= tolerance && (a.y - b.y).abs() <= tolerance
    } else {
        a.x == b.x && a.y == b.y
    }
}

/// Square box around a coordinate, `tolerance` wide on each side
#[inline]
pub fn point_box(coord: Coord<f64>, tolerance: f64) -> Rect<f64> {
    Rect::new(
        Coord {
            x: coord.x - tolerance,
            y: coord.y - tolerance,
        },
        Coord {
            x: coord.x + tolerance,
            y: coord.y + tolerance,
        },
    )
}

/// Inclusive rectangle intersection test
#[inline(always)]
pub fn rects_intersect(a: Rect<f64>, b: Rect<f64>) -> bool {
    !(a.max().x < b.min().x || a.min().x > b.max().x || a.max().y < b.min().y || a.min().y > b.max().y)
}

/// Smallest rectangle covering both inputs
#[inline]
pub fn union_rect(a: Rect<f64>, b: Rect<f64>) -> Rect<f64> {
    Rect::new(
        Coord {
            x: a.min().x.min(b.min().x),
            y: a.min().y.min(b.min().y),
        },
        Coord {
            x: a.max().x.max(b.max().x),
            y: a.max().y.max(b.max().y),
        },
    )
}

/// Euclidean distance from a coordinate to a rectangle (0 when inside)
///
/// Used as a lower bound for every geometry the rectangle encloses.
#[inline]
pub fn distance_to_rect(coord: Coord<f64>, rect: Rect<f64>) -> f64 {
    let dx = (rect.min().x - coord.x).max(0.0).max(coord.x - rect.max().x);
    let dy = (rect.min().y - coord.y).max(0.0).max(coord.y - rect.max().y);
    dx.hypot(dy)
}
