// Copyright (c) The scalatest-teamcity Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Converts a stream of ScalaTest events into TeamCity service messages.
//!
//! Events are read as JSON lines from a file or standard input, and service
//! messages are written to standard output or a file. Diagnostics go to
//! standard error.

#![warn(missing_docs)]

mod dispatch;
mod errors;
mod output;

#[doc(hidden)]
pub use dispatch::*;
#[doc(hidden)]
pub use errors::*;
#[doc(hidden)]
pub use output::{OutputContext, OutputWriter};
