//! GPX layer adapters
//!
//! Turns parsed GPX documents into the line and point layers a
//! [`TraceSession`](crate::TraceSession) consumes. Tracks and routes form the line
//! layer, waypoints the point layer. Coordinates are used as stored
//! (x = longitude, y = latitude) so that shared vertices stay bit-identical.

use crate::{FeatureId, MarkerId, Result};
use geo::{Geometry, LineString, MultiLineString, Point};
use rayon::prelude::*;
use std::path::Path;

/// Read and parse a single GPX file
pub fn read_gpx<P: AsRef<Path>>(path: P) -> Result<gpx::Gpx> {
    let file = std::fs::File::open(path.as_ref())?;
    let reader = std::io::BufReader::new(file);
    Ok(gpx::read(reader)?)
}

/// Read several GPX files in parallel, keeping the input order
pub fn read_gpx_files<P: AsRef<Path> + Send + Sync>(paths: &[P]) -> Result<Vec<gpx::Gpx>> {
    #[cfg(feature = "profiling")]
    profiling::scope!("source::read_gpx_files");

    paths
        .par_iter()
        .map(|path| {
            let gpx = read_gpx(path)?;
            tracing::debug!(
                "Read {}: {} tracks, {} routes, {} waypoints",
                path.as_ref().display(),
                gpx.tracks.len(),
                gpx.routes.len(),
                gpx.waypoints.len()
            );
            Ok(gpx)
        })
        .collect()
}

/// Line layer of a set of GPX documents
///
/// Every track becomes one multi-part feature (one part per track segment) and
/// every route one single-part feature. Ids are assigned sequentially, tracks
/// before routes within each document, documents in order.
pub fn line_layer(documents: &[gpx::Gpx]) -> Vec<(FeatureId, Option<Geometry<f64>>)> {
    let mut features = Vec::new();

    for gpx in documents {
        for track in &gpx.tracks {
            let parts: Vec<LineString<f64>> = track
                .segments
                .iter()
                .map(|segment| segment.points.iter().map(|wp| wp.point().0).collect())
                .collect();
            let geometry = if parts.is_empty() {
                None
            } else {
                Some(Geometry::MultiLineString(MultiLineString::new(parts)))
            };
            features.push((features.len() as FeatureId, geometry));
        }

        for route in &gpx.routes {
            let line: LineString<f64> = route.points.iter().map(|wp| wp.point().0).collect();
            features.push((features.len() as FeatureId, Some(Geometry::LineString(line))));
        }
    }

    features
}

/// Point layer of a set of GPX documents, from their waypoints
///
/// Ids are assigned sequentially across documents.
pub fn point_layer(documents: &[gpx::Gpx]) -> Vec<(MarkerId, Option<Point<f64>>)> {
    documents
        .iter()
        .flat_map(|gpx| gpx.waypoints.iter())
        .enumerate()
        .map(|(i, wp)| (i as MarkerId, Some(wp.point())))
        .collect()
}

/// Waypoint names, indexed like [`point_layer`]
pub fn marker_names(documents: &[gpx::Gpx]) -> Vec<Option<String>> {
    documents
        .iter()
        .flat_map(|gpx| gpx.waypoints.iter())
        .map(|wp| wp.name.clone())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use gpx::{Gpx, Route, Track, TrackSegment, Waypoint};

    fn waypoint(lon: f64, lat: f64) -> Waypoint {
        Waypoint::new(Point::new(lon, lat))
    }

    fn segment(points: &[(f64, f64)]) -> TrackSegment {
        let mut segment = TrackSegment::default();
        segment.points = points.iter().map(|&(lon, lat)| waypoint(lon, lat)).collect();
        segment
    }

    fn create_test_gpx() -> Gpx {
        let mut gpx = Gpx::default();

        let mut track = Track::default();
        track.segments.push(segment(&[(0.0, 0.0), (1.0, 0.0)]));
        track.segments.push(segment(&[(5.0, 5.0), (6.0, 5.0)]));
        gpx.tracks.push(track);

        let mut route = Route::default();
        route.points = vec![waypoint(1.0, 0.0), waypoint(1.0, 1.0)];
        gpx.routes.push(route);

        let mut named = waypoint(1.0, 1.0);
        named.name = Some("Outlet".to_string());
        gpx.waypoints.push(named);
        gpx.waypoints.push(waypoint(0.0, 0.0));
        gpx
    }

    #[test]
    fn test_line_layer_ids_and_kinds() {
        let layer = line_layer(&[create_test_gpx(), create_test_gpx()]);
        assert_eq!(layer.len(), 4);
        assert_eq!(layer.iter().map(|(id, _)| *id).collect::<Vec<_>>(), vec![0, 1, 2, 3]);
        assert!(matches!(layer[0].1, Some(Geometry::MultiLineString(_))));
        assert!(matches!(layer[1].1, Some(Geometry::LineString(_))));
    }

    #[test]
    fn test_track_without_segments_is_empty() {
        let mut gpx = Gpx::default();
        gpx.tracks.push(Track::default());
        let layer = line_layer(&[gpx]);
        assert_eq!(layer.len(), 1);
        assert!(layer[0].1.is_none());
    }

    #[test]
    fn test_point_layer_and_names() {
        let docs = [create_test_gpx()];
        let points = point_layer(&docs);
        assert_eq!(points.len(), 2);
        assert_eq!(points[0], (0, Some(Point::new(1.0, 1.0))));

        let names = marker_names(&docs);
        assert_eq!(names, vec![Some("Outlet".to_string()), None]);
    }

    #[test]
    fn test_multipart_track_traces_first_segment_only() {
        let docs = [create_test_gpx()];
        let session = crate::TraceSession::new(
            line_layer(&docs),
            point_layer(&docs),
            crate::Config::default(),
        )
        .unwrap();

        // Track 0 keeps (0,0)-(1,0); the route (feature 1) starts at (1,0)
        assert_eq!(session.lines().vertices(0).unwrap().len(), 2);
        let outcome = session.trace_at(Point::new(0.5, 0.1)).unwrap();
        assert_eq!(outcome.feature, 0);
        assert_eq!(outcome.markers.iter().copied().collect::<Vec<_>>(), vec![0]);
    }

    #[test]
    fn test_read_missing_file() {
        let result = read_gpx("/nonexistent/path/to/layer.gpx");
        assert!(matches!(result, Err(crate::DataError::Io(_))));
    }
}
