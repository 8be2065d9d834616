//! End-to-end: GPX documents in, selected waypoint ids out

use downstream_trace_lib::{
    Config, MarkerId, Notifier, ReachableSet, SelectionSink, TraceSession, VertexRef, source,
};
use geo::Point;

const STREAMS: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<gpx version="1.1" creator="downstream-trace tests" xmlns="http://www.topografix.com/GPX/1/1">
  <trk>
    <name>Upper creek</name>
    <trkseg>
      <trkpt lat="0.0" lon="0.0"></trkpt>
      <trkpt lat="0.0" lon="1.0"></trkpt>
      <trkpt lat="0.0" lon="2.0"></trkpt>
    </trkseg>
  </trk>
  <trk>
    <name>Lower creek</name>
    <trkseg>
      <trkpt lat="0.0" lon="2.0"></trkpt>
      <trkpt lat="-1.0" lon="2.0"></trkpt>
      <trkpt lat="-2.0" lon="2.0"></trkpt>
    </trkseg>
  </trk>
  <trk>
    <name>Side branch</name>
    <trkseg>
      <trkpt lat="0.0" lon="1.0"></trkpt>
      <trkpt lat="1.0" lon="1.0"></trkpt>
    </trkseg>
  </trk>
</gpx>"#;

const GAUGES: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<gpx version="1.1" creator="downstream-trace tests" xmlns="http://www.topografix.com/GPX/1/1">
  <wpt lat="0.0" lon="0.0"><name>Spring</name></wpt>
  <wpt lat="1.0" lon="1.0"><name>Branch gauge</name></wpt>
  <wpt lat="-1.0" lon="2.0"><name>Mid gauge</name></wpt>
  <wpt lat="-2.0" lon="2.0"><name>Outlet</name></wpt>
  <wpt lat="-2.0" lon="2.0"><name>Outlet (backup)</name></wpt>
</gpx>"#;

#[derive(Default)]
struct RecordingHost {
    selections: Vec<ReachableSet>,
    messages: Vec<String>,
}

impl SelectionSink for RecordingHost {
    fn select(&mut self, markers: &ReachableSet) {
        self.selections.push(markers.clone());
    }
}

impl Notifier for RecordingHost {
    fn notify(&mut self, message: &str) {
        self.messages.push(message.to_string());
    }
}

fn session() -> (TraceSession, Vec<Option<String>>) {
    let lines = [gpx::read(STREAMS.as_bytes()).unwrap()];
    let points = [gpx::read(GAUGES.as_bytes()).unwrap()];
    let session = TraceSession::new(
        source::line_layer(&lines),
        source::point_layer(&points),
        Config::default(),
    )
    .unwrap();
    (session, source::marker_names(&points))
}

#[test]
fn test_click_upper_creek_selects_everything_downstream() {
    let (session, names) = session();
    let mut selections = RecordingHost::default();
    let mut messages = Vec::new();

    let outcome = session
        .handle_click(Point::new(0.4, 0.05), &mut selections, &mut messages)
        .unwrap();

    assert_eq!(outcome.feature, 0);
    assert_eq!(outcome.start, VertexRef::new(0, 1));

    let selected: Vec<&str> = selections.selections[0]
        .iter()
        .filter_map(|&id| names[id as usize].as_deref())
        .collect();
    assert_eq!(
        selected,
        vec!["Branch gauge", "Mid gauge", "Outlet", "Outlet (backup)"]
    );
    assert_eq!(messages, vec!["Clicked line fid=0\nSelected points: 4".to_string()]);
}

#[test]
fn test_click_lower_creek_skips_upstream() {
    let (session, _) = session();
    let outcome = session.trace_at(Point::new(2.1, -1.5)).unwrap();

    assert_eq!(outcome.feature, 1);
    let ids: Vec<MarkerId> = outcome.markers.into_iter().collect();
    assert_eq!(ids, vec![3, 4]);
}

#[test]
fn test_repeated_clicks_share_one_session() {
    let (session, _) = session();
    let mut host = RecordingHost::default();

    for _ in 0..3 {
        session.handle_click(Point::new(0.4, 0.05), &mut host, &mut Vec::<String>::new());
    }

    assert_eq!(host.selections.len(), 3);
    assert!(host.selections.windows(2).all(|w| w[0] == w[1]));
}

#[test]
fn test_empty_line_layer_reports_no_line() {
    let (session, _) = session();
    let empty_docs: [gpx::Gpx; 0] = [];
    let empty = TraceSession::new(
        source::line_layer(&empty_docs),
        source::point_layer(&empty_docs),
        Config::default(),
    )
    .unwrap();

    let mut host = RecordingHost::default();
    let mut notes = RecordingHost::default();
    assert!(empty.handle_click(Point::new(0.0, 0.0), &mut host, &mut notes).is_none());
    assert!(host.selections.is_empty());
    assert_eq!(notes.messages, vec!["No line found here.".to_string()]);

    assert_eq!(session.info().features, 3);
    assert_eq!(session.info().markers, 5);
}
