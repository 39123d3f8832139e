// Copyright (c) The scalatest-teamcity Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Translates ScalaTest reporter events into TeamCity service messages.
//!
//! ScalaTest reports a run as a stream of events: suites start and complete,
//! scopes open and close, tests start and then succeed, fail, or are ignored.
//! TeamCity (and IDEs that understand its protocol) consume
//! `##teamcity[...]` service messages, where every message names the node of
//! the test tree it belongs to.
//!
//! The main entry point is [`TeamcityReporter`](reporter::TeamcityReporter):
//!
//! ```
//! use scalatest_reporter::{config::ReporterConfig, events::Event, reporter::TeamcityReporter};
//!
//! let mut reporter = TeamcityReporter::new(ReporterConfig::default());
//! let mut out = String::new();
//! for line in [
//!     r#"{"type": "RunStarting", "testCount": 1, "timeStamp": 0}"#,
//!     r#"{"type": "SuiteStarting", "suiteName": "MySpec", "suiteId": "com.MySpec", "timeStamp": 0}"#,
//! ] {
//!     let event = Event::from_json_line(line)?;
//!     reporter.write_event(&event, &mut out)?;
//! }
//! assert_eq!(
//!     out,
//!     concat!(
//!         "##teamcity[testCount count='1']\n",
//!         "##teamcity[testSuiteStarted name='MySpec' captureStandardOutput='true' nodeId='1' parentNodeId='0']\n",
//!     ),
//! );
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

#![warn(missing_docs)]

pub mod config;
pub mod decode;
pub mod errors;
pub mod events;
pub mod failure;
pub mod location;
pub mod node_id;
pub mod reporter;
pub mod sink;
