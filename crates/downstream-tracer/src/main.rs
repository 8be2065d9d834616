use downstream_trace_lib::{TraceSession, source};
use downstream_tracer::{CliError, OutputFormat, Settings, TerminalHost, logging};
use std::process::ExitCode;

fn main() -> ExitCode {
    let settings = Settings::from_cli();
    let _guard = logging::setup_logging();

    tracing::info!(
        "Starting {} v{}",
        env!("CARGO_PKG_NAME"),
        env!("CARGO_PKG_VERSION")
    );

    match run(&settings) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!("{err}");
            ExitCode::FAILURE
        }
    }
}

#[cfg_attr(feature = "profiling", profiling::function)]
fn run(settings: &Settings) -> Result<(), CliError> {
    let config = settings.config();
    config.validate()?;

    let (line_docs, point_docs) = rayon::join(
        || source::read_gpx_files(&settings.line_files),
        || source::read_gpx_files(&settings.point_files),
    );
    let (line_docs, point_docs) = (line_docs?, point_docs?);

    let session = TraceSession::new(
        source::line_layer(&line_docs),
        source::point_layer(&point_docs),
        config,
    )?;

    let format = if settings.json {
        OutputFormat::Json
    } else {
        OutputFormat::Text
    };
    let mut host = TerminalHost::new(
        std::io::stdout().lock(),
        format,
        source::marker_names(&point_docs),
    );

    for &point in &settings.clicks {
        host.click(&session, point)?;
    }

    Ok(())
}
