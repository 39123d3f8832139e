// Copyright (c) The scalatest-teamcity Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Errors produced by the reporter.

use camino::Utf8PathBuf;
use std::io;
use thiserror::Error;

/// An invalid operation on a [`NodeIdStack`](crate::node_id::NodeIdStack).
///
/// These are caused by an event source that does not respect the nesting order
/// of events, for example a `TestSucceeded` without a matching `TestStarting`.
#[derive(Copy, Clone, Debug, Error, Eq, PartialEq)]
pub enum NodeStackError {
    /// The stack was used before a `RunStarting` event initialized it.
    #[error("no test run has been started (missing RunStarting event)")]
    NotStarted,

    /// A node was closed while only the root node was open.
    #[error("attempted to close the root node (more closing than opening events)")]
    AscendPastRoot,
}

/// An event could not be translated because it violates the nesting order.
#[derive(Clone, Debug, Error, Eq, PartialEq)]
#[error("{event_kind} event violates the event nesting order")]
pub struct NestingError {
    /// The kind of event that was being translated.
    pub event_kind: &'static str,

    /// The stack operation that failed.
    #[source]
    pub error: NodeStackError,
}

/// An error that occurs while writing an event.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum WriteEventError {
    /// An error occurred while writing the event to the provided output.
    #[error("error writing to output")]
    Io(#[source] io::Error),

    /// The event violates the nesting order of the event stream.
    #[error(transparent)]
    Nesting(#[from] NestingError),
}

/// An error that occurs while reading events from a JSON-lines stream.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ReadEventError {
    /// The input could not be read.
    #[error("error reading events at line {line_number}")]
    Io {
        /// The 1-based line number being read.
        line_number: usize,

        /// The underlying error.
        #[source]
        error: io::Error,
    },

    /// A line could not be parsed as an event.
    #[error("invalid event at line {line_number}")]
    Parse {
        /// The 1-based line number of the invalid event.
        line_number: usize,

        /// The underlying error.
        #[source]
        error: serde_json::Error,
    },
}

/// An error that occurs while loading the reporter configuration.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ConfigError {
    /// An explicitly requested config file does not exist.
    #[error("config file not found at {path}")]
    FileNotFound {
        /// The path that was requested.
        path: Utf8PathBuf,
    },

    /// The config file could not be read.
    #[error("failed to read config file at {path}")]
    Read {
        /// The path of the config file.
        path: Utf8PathBuf,

        /// The underlying error.
        #[source]
        error: io::Error,
    },

    /// The config file could not be parsed.
    #[error("failed to parse config file at {path}")]
    Parse {
        /// The path of the config file.
        path: Utf8PathBuf,

        /// The underlying error.
        #[source]
        error: toml::de::Error,
    },
}
