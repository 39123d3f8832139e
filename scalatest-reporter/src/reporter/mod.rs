// Copyright (c) The scalatest-teamcity Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Translation of ScalaTest events into TeamCity service messages.
//!
//! [`translate_event`] maps a single event to its messages given a
//! [`NodeIdStack`](crate::node_id::NodeIdStack). [`TeamcityReporter`] owns the
//! stack and writes messages to a [`MessageSink`](crate::sink::MessageSink).

mod imp;
mod translate;

pub use imp::*;
pub use translate::translate_event;
