// Copyright (c) The scalatest-teamcity Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use crate::{
    ExpectedError,
    errors::{Result, TeamcityExitCode},
    output::{OutputContext, OutputOpts, OutputWriter, clap_styles},
};
use camino::{Utf8Path, Utf8PathBuf};
use clap::{Args, Parser, ValueEnum};
use scalatest_reporter::{
    config::{ConfigLocation, ReporterConfig},
    events::EventReader,
    reporter::{ReporterStats, TeamcityReporter},
    sink::MessageSink,
};
use std::{
    fs::File,
    io::{self, BufRead, BufReader, BufWriter},
};
use teamcity_messages::TimestampOffset;
use tracing::{debug, info};

/// Input path that means standard input.
static STDIN_PATH: &str = "-";

/// Converts a stream of ScalaTest events into TeamCity service messages.
///
/// Events are read as JSON objects, one per line. Service messages are written
/// to standard output unless `--output` is given.
#[derive(Debug, Parser)]
#[command(version, styles = clap_styles::style())]
pub struct ScalatestTeamcityApp {
    /// File to read events from, or `-` for standard input
    #[arg(long, short, value_name = "PATH", default_value = STDIN_PATH)]
    input: Utf8PathBuf,

    /// File to write service messages to [default: standard output]
    #[arg(long, short, value_name = "PATH")]
    output: Option<Utf8PathBuf>,

    #[command(flatten)]
    config_opts: ConfigOpts,

    #[command(flatten)]
    output_opts: OutputOpts,
}

impl ScalatestTeamcityApp {
    /// Initializes logging and returns the output context.
    pub fn init_output(&self) -> OutputContext {
        self.output_opts.init()
    }

    /// Executes the app, returning the process exit code.
    pub fn exec(self, output_writer: &mut OutputWriter) -> Result<i32> {
        let cwd = current_dir()?;
        let config = self.config_opts.make_config(&cwd)?;
        debug!(?config, "resolved reporter config");

        let input_name = if self.input.as_str() == STDIN_PATH {
            "standard input".to_owned()
        } else {
            format!("`{}`", self.input)
        };
        let reader = open_input(&self.input)?;
        let mut reporter = TeamcityReporter::new(config);

        let stats = match &self.output {
            Some(path) => {
                let file = File::create(path).map_err(|error| ExpectedError::OutputCreateFailed {
                    path: path.clone(),
                    error,
                })?;
                translate_stream(reader, &input_name, &mut reporter, &mut BufWriter::new(file))?
            }
            None => translate_stream(
                reader,
                &input_name,
                &mut reporter,
                &mut output_writer.stdout_writer(),
            )?,
        };

        debug!(
            events = stats.events,
            unrecognized = stats.unrecognized_events,
            messages = stats.messages,
            "finished translating events"
        );
        if reporter.node_stack().depth() > 1 {
            info!(
                "event stream ended with {} nodes still open",
                reporter.node_stack().depth() - 1
            );
        }

        Ok(TeamcityExitCode::OK)
    }
}

#[derive(Debug, Args)]
struct ConfigOpts {
    /// Config file, or `none` to use built-in defaults
    /// [default: scalatest-teamcity.toml or .config/scalatest-teamcity.toml]
    #[arg(long, value_name = "PATH", env = "SCALATEST_TEAMCITY_CONFIG")]
    config: Option<String>,

    /// Write an empty line before every service message
    #[arg(long)]
    blank_line_separators: bool,

    /// Do not decode Scala-encoded names in test names
    #[arg(long)]
    no_decode_names: bool,

    /// Offset to use for timestamps
    #[arg(long, value_enum, value_name = "OFFSET")]
    timestamp_offset: Option<TimestampOffsetOpt>,
}

impl ConfigOpts {
    /// Loads configuration and applies command-line overrides on top.
    fn make_config(&self, cwd: &Utf8Path) -> Result<ReporterConfig> {
        let location = ConfigLocation::from_cli_or_env(self.config.as_deref());
        let mut config = ReporterConfig::from_location(location, cwd)
            .map_err(|error| ExpectedError::ConfigLoadFailed { error })?;

        if self.blank_line_separators {
            config.blank_line_separators = true;
        }
        if self.no_decode_names {
            config.decode_names = false;
        }
        if let Some(offset) = self.timestamp_offset {
            config.timestamp_offset = offset.into();
        }
        Ok(config)
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum TimestampOffsetOpt {
    /// Coordinated Universal Time
    Utc,
    /// The local time zone
    Local,
}

impl From<TimestampOffsetOpt> for TimestampOffset {
    fn from(opt: TimestampOffsetOpt) -> Self {
        match opt {
            TimestampOffsetOpt::Utc => TimestampOffset::Utc,
            TimestampOffsetOpt::Local => TimestampOffset::Local,
        }
    }
}

fn current_dir() -> Result<Utf8PathBuf> {
    let cwd = std::env::current_dir().map_err(|error| ExpectedError::CurrentDirFailed { error })?;
    Utf8PathBuf::try_from(cwd).map_err(|error| ExpectedError::CurrentDirInvalidUtf8 {
        path: error.into_path_buf(),
    })
}

fn open_input(path: &Utf8Path) -> Result<Box<dyn BufRead>> {
    if path.as_str() == STDIN_PATH {
        return Ok(Box::new(io::stdin().lock()));
    }
    let file = File::open(path).map_err(|error| ExpectedError::InputOpenFailed {
        path: path.to_owned(),
        error,
    })?;
    Ok(Box::new(BufReader::new(file)))
}

/// Translates every event read from `reader`, writing messages to `sink`.
fn translate_stream(
    reader: impl BufRead,
    input_name: &str,
    reporter: &mut TeamcityReporter,
    sink: &mut impl MessageSink,
) -> Result<ReporterStats> {
    for item in EventReader::new(reader) {
        let (line_number, event) = item.map_err(|error| ExpectedError::ReadEventsFailed {
            input: input_name.to_owned(),
            error,
        })?;
        reporter
            .write_event(&event, sink)
            .map_err(|error| ExpectedError::WriteEventFailed { line_number, error })?;
    }
    sink.flush_sink()
        .map_err(|error| ExpectedError::FlushFailed { error })?;

    Ok(reporter.stats())
}
