use clap::Parser;
use downstream_trace_lib::{Config, DEFAULT_MAX_DEPTH};
use geo::Point;
use std::path::PathBuf;

/// Downstream Tracer - Select every point lying downstream of a location on a
/// line network (rivers, sewers, pipes) stored as GPX tracks and routes.
#[derive(Parser, Debug, Clone)]
#[clap(author, version, about, long_about = None)]
pub struct Settings {
    /// GPX files forming the line layer (tracks and routes)
    #[clap(short, long = "lines", value_name = "FILE", required = true, num_args = 1..)]
    pub line_files: Vec<PathBuf>,

    /// GPX files forming the point layer (waypoints)
    #[clap(short, long = "points", value_name = "FILE", required = true, num_args = 1..)]
    pub point_files: Vec<PathBuf>,

    /// Query location as X,Y (longitude,latitude). Can be repeated
    #[clap(
        short = 'a',
        long = "at",
        value_name = "X,Y",
        value_parser = parse_point,
        allow_hyphen_values = true,
        required = true
    )]
    pub clicks: Vec<Point<f64>>,

    /// Treat vertices closer than this (on both axes) as connected
    #[clap(long, value_name = "DISTANCE", default_value_t = 0.0)]
    pub snap_tolerance: f64,

    /// Maximum subdivision depth of the spatial index
    #[clap(long, value_name = "DEPTH", default_value_t = DEFAULT_MAX_DEPTH)]
    pub max_depth: u32,

    /// Print one JSON object per query instead of text
    #[clap(long)]
    pub json: bool,
}

impl Settings {
    /// Parse from the process arguments, exiting with usage on error
    pub fn from_cli() -> Self {
        Self::parse()
    }

    /// Session configuration requested on the command line
    pub fn config(&self) -> Config {
        Config {
            snap_tolerance: self.snap_tolerance,
            max_depth: self.max_depth,
        }
    }
}

/// Parse an `X,Y` pair into a point
pub fn parse_point(value: &str) -> Result<Point<f64>, String> {
    let (x, y) = value
        .split_once(',')
        .ok_or_else(|| format!("expected X,Y but got '{value}'"))?;
    let x: f64 = x
        .trim()
        .parse()
        .map_err(|e| format!("invalid X '{}': {e}", x.trim()))?;
    let y: f64 = y
        .trim()
        .parse()
        .map_err(|e| format!("invalid Y '{}': {e}", y.trim()))?;
    if !x.is_finite() || !y.is_finite() {
        return Err(format!("coordinates must be finite, got '{value}'"));
    }
    Ok(Point::new(x, y))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_point() {
        assert_eq!(parse_point("1.5,-2").unwrap(), Point::new(1.5, -2.0));
        assert_eq!(parse_point(" 3 , 4 ").unwrap(), Point::new(3.0, 4.0));
        assert!(parse_point("1.5").is_err());
        assert!(parse_point("a,2").is_err());
        assert!(parse_point("1,NaN").is_err());
        assert!(parse_point("inf,0").is_err());
    }

    #[test]
    fn test_cli_arguments() {
        let settings = Settings::try_parse_from([
            "downstream-tracer",
            "-l",
            "rivers.gpx",
            "canals.gpx",
            "-p",
            "gauges.gpx",
            "--at",
            "-3.5,40.25",
            "-a",
            "0,0",
            "--snap-tolerance",
            "0.001",
        ])
        .unwrap();

        assert_eq!(settings.line_files.len(), 2);
        assert_eq!(settings.point_files, vec![PathBuf::from("gauges.gpx")]);
        assert_eq!(
            settings.clicks,
            vec![Point::new(-3.5, 40.25), Point::new(0.0, 0.0)]
        );
        assert!(!settings.json);

        let config = settings.config();
        assert_eq!(config.snap_tolerance, 0.001);
        assert_eq!(config.max_depth, DEFAULT_MAX_DEPTH);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_cli_requires_query() {
        let result = Settings::try_parse_from(["downstream-tracer", "-l", "a.gpx", "-p", "b.gpx"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_cli_definition() {
        use clap::CommandFactory;
        Settings::command().debug_assert();
    }
}
