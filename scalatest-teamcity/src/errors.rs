// Copyright (c) The scalatest-teamcity Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use crate::output::{NO_HEADING_TARGET, StderrStyles};
use camino::Utf8PathBuf;
use owo_colors::OwoColorize;
use scalatest_reporter::errors::{
    ConfigError, NestingError, ReadEventError, WriteEventError,
};
use std::{error::Error, io, path::PathBuf};
use thiserror::Error;
use tracing::error;

pub(crate) type Result<T, E = ExpectedError> = std::result::Result<T, E>;

/// Documented exit codes for `scalatest-teamcity` failures.
///
/// Unknown/unexpected failures will always result in exit code 1.
pub enum TeamcityExitCode {}

impl TeamcityExitCode {
    /// No errors occurred and the event stream was translated completely.
    pub const OK: i32 = 0;

    /// An error occurred while setting up, for example while loading
    /// configuration or opening the input.
    pub const SETUP_ERROR: i32 = 96;

    /// An input line could not be parsed as an event.
    pub const EVENT_PARSE_FAILED: i32 = 101;

    /// The event stream does not respect the nesting order of events.
    pub const NESTING_VIOLATION: i32 = 102;

    /// Writing service messages to the output failed.
    pub const WRITE_FAILED: i32 = 103;

    /// Reading the input failed partway through.
    pub const INPUT_READ_FAILED: i32 = 104;
}

// Note that the #[error()] strings are mostly placeholder messages -- the expected way to print out
// errors is with the display_to_stderr method, which colorizes errors.

/// An expected error, caused by the environment or the input rather than by a
/// bug in this program.
#[derive(Debug, Error)]
#[doc(hidden)]
pub enum ExpectedError {
    #[error("could not determine the current directory")]
    CurrentDirFailed {
        #[source]
        error: io::Error,
    },
    #[error("current directory is not valid UTF-8")]
    CurrentDirInvalidUtf8 { path: PathBuf },
    #[error("failed to load config")]
    ConfigLoadFailed {
        #[source]
        error: ConfigError,
    },
    #[error("failed to open input")]
    InputOpenFailed {
        path: Utf8PathBuf,
        #[source]
        error: io::Error,
    },
    #[error("failed to create output")]
    OutputCreateFailed {
        path: Utf8PathBuf,
        #[source]
        error: io::Error,
    },
    #[error("failed to read events")]
    ReadEventsFailed {
        input: String,
        #[source]
        error: ReadEventError,
    },
    #[error("failed to write event")]
    WriteEventFailed {
        line_number: usize,
        #[source]
        error: WriteEventError,
    },
    #[error("failed to flush output")]
    FlushFailed {
        #[source]
        error: io::Error,
    },
}

impl ExpectedError {
    /// Returns the exit code for the process.
    pub fn process_exit_code(&self) -> i32 {
        match self {
            Self::CurrentDirFailed { .. }
            | Self::CurrentDirInvalidUtf8 { .. }
            | Self::ConfigLoadFailed { .. }
            | Self::InputOpenFailed { .. }
            | Self::OutputCreateFailed { .. } => TeamcityExitCode::SETUP_ERROR,
            Self::ReadEventsFailed { error, .. } => match error {
                ReadEventError::Parse { .. } => TeamcityExitCode::EVENT_PARSE_FAILED,
                _ => TeamcityExitCode::INPUT_READ_FAILED,
            },
            Self::WriteEventFailed { error, .. } => match error {
                WriteEventError::Nesting(_) => TeamcityExitCode::NESTING_VIOLATION,
                _ => TeamcityExitCode::WRITE_FAILED,
            },
            Self::FlushFailed { .. } => TeamcityExitCode::WRITE_FAILED,
        }
    }

    /// Displays this error to stderr.
    pub fn display_to_stderr(&self, styles: &StderrStyles) {
        let mut next_error = match &self {
            Self::CurrentDirFailed { error } => {
                error!("could not determine the current directory");
                Some(error as &dyn Error)
            }
            Self::CurrentDirInvalidUtf8 { path } => {
                error!(
                    "current directory `{}` is not valid UTF-8",
                    path.display().style(styles.bold)
                );
                None
            }
            Self::ConfigLoadFailed { error } => {
                error!("failed to load config");
                Some(error as &dyn Error)
            }
            Self::InputOpenFailed { path, error } => {
                error!("failed to open input file `{}`", path.style(styles.bold));
                Some(error as &dyn Error)
            }
            Self::OutputCreateFailed { path, error } => {
                error!("failed to create output file `{}`", path.style(styles.bold));
                Some(error as &dyn Error)
            }
            Self::ReadEventsFailed { input, error } => {
                error!("failed to read events from {}", input.style(styles.bold));
                Some(error as &dyn Error)
            }
            Self::WriteEventFailed { line_number, error } => {
                match error {
                    WriteEventError::Nesting(NestingError { event_kind, .. }) => {
                        error!(
                            "{} event at line {} does not match the events before it",
                            event_kind.style(styles.bold),
                            line_number.style(styles.bold),
                        );
                    }
                    _ => {
                        error!(
                            "failed to write service messages for the event at line {}",
                            line_number.style(styles.bold)
                        );
                    }
                }
                Some(error as &dyn Error)
            }
            Self::FlushFailed { error } => {
                error!("failed to flush output");
                Some(error as &dyn Error)
            }
        };

        while let Some(err) = next_error {
            error!(target: NO_HEADING_TARGET, "\nCaused by:\n  {}", err);
            next_error = err.source();
        }
    }
}
