//! Terminal rendering of click results
//!
//! [`TerminalHost`] stands in for the map canvas: it collects what a
//! [`TraceSession`] reports through [`SelectionSink`] and [`Notifier`] during one
//! click and writes it out as text or as one JSON object per line.

use crate::CliError;
use downstream_trace_lib::{MarkerId, ReachableSet, SelectionSink, TraceSession};
use geo::Point;
use serde::Serialize;
use std::io::Write;

/// How click results are written
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Markers selected by the last click, `None` if the click selected nothing
#[derive(Debug, Default)]
struct Selection(Option<ReachableSet>);

impl SelectionSink for Selection {
    fn select(&mut self, markers: &ReachableSet) {
        self.0 = Some(markers.clone());
    }
}

#[derive(Debug, Serialize)]
struct SelectedMarker<'a> {
    id: MarkerId,
    name: Option<&'a str>,
}

#[derive(Debug, Serialize)]
struct ClickReport<'a> {
    x: f64,
    y: f64,
    messages: &'a [String],
    selected: Option<Vec<SelectedMarker<'a>>>,
}

/// Host side of a tracing session writing to a terminal (or any writer)
pub struct TerminalHost<W: Write> {
    out: W,
    format: OutputFormat,
    names: Vec<Option<String>>,
    messages: Vec<String>,
    selection: Selection,
}

impl<W: Write> TerminalHost<W> {
    /// Create a host; `names` maps marker ids to display names
    pub fn new(out: W, format: OutputFormat, names: Vec<Option<String>>) -> Self {
        Self {
            out,
            format,
            names,
            messages: Vec::new(),
            selection: Selection::default(),
        }
    }

    /// Run one click through the session and write its report
    pub fn click(&mut self, session: &TraceSession, point: Point<f64>) -> Result<(), CliError> {
        self.messages.clear();
        self.selection = Selection::default();

        session.handle_click(point, &mut self.selection, &mut self.messages);

        match self.format {
            OutputFormat::Text => self.write_text(point)?,
            OutputFormat::Json => self.write_json(point)?,
        }
        self.out.flush()?;
        Ok(())
    }

    fn write_text(&mut self, point: Point<f64>) -> std::io::Result<()> {
        writeln!(self.out, "Query ({}, {})", point.x(), point.y())?;
        for message in &self.messages {
            for line in message.lines() {
                writeln!(self.out, "  {line}")?;
            }
        }
        if let Some(markers) = &self.selection.0 {
            for &id in markers {
                match marker_name(&self.names, id) {
                    Some(name) => writeln!(self.out, "  - {id} {name}")?,
                    None => writeln!(self.out, "  - {id}")?,
                }
            }
        }
        Ok(())
    }

    fn write_json(&mut self, point: Point<f64>) -> Result<(), CliError> {
        let selected = self.selection.0.as_ref().map(|markers| {
            markers
                .iter()
                .map(|&id| SelectedMarker {
                    id,
                    name: marker_name(&self.names, id),
                })
                .collect()
        });
        let report = ClickReport {
            x: point.x(),
            y: point.y(),
            messages: &self.messages,
            selected,
        };
        serde_json::to_writer(&mut self.out, &report)?;
        writeln!(self.out)?;
        Ok(())
    }

    /// Consume the host, returning the writer
    pub fn into_inner(self) -> W {
        self.out
    }
}

fn marker_name(names: &[Option<String>], id: MarkerId) -> Option<&str> {
    usize::try_from(id)
        .ok()
        .and_then(|i| names.get(i))
        .and_then(|name| name.as_deref())
}
