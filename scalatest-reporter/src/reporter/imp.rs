// Copyright (c) The scalatest-teamcity Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use super::translate_event;
use crate::{
    config::ReporterConfig,
    errors::{NestingError, WriteEventError},
    events::Event,
    node_id::NodeIdStack,
    sink::MessageSink,
};
use teamcity_messages::ServiceMessage;
use tracing::debug;

/// A reporter that translates ScalaTest events into TeamCity service messages.
///
/// Events must be passed in the order the test framework produced them. The
/// reporter tracks the nesting of suites, scopes and tests so that every
/// message carries the ids TeamCity needs to rebuild the test tree.
#[derive(Clone, Debug)]
pub struct TeamcityReporter {
    stack: NodeIdStack,
    config: ReporterConfig,
    stats: ReporterStats,
}

impl TeamcityReporter {
    /// Creates a new reporter.
    pub fn new(config: ReporterConfig) -> Self {
        Self {
            stack: NodeIdStack::new(),
            config,
            stats: ReporterStats::default(),
        }
    }

    /// Returns the configuration used by this reporter.
    pub fn config(&self) -> &ReporterConfig {
        &self.config
    }

    /// Returns the stack of currently open nodes.
    pub fn node_stack(&self) -> &NodeIdStack {
        &self.stack
    }

    /// Returns statistics about the events processed so far.
    pub fn stats(&self) -> ReporterStats {
        self.stats
    }

    /// Translates an event into service messages without writing them.
    pub fn translate(&mut self, event: &Event) -> Result<Vec<ServiceMessage>, NestingError> {
        let messages = translate_event(event, &mut self.stack, &self.config)?;

        self.stats.events += 1;
        if matches!(event, Event::Unrecognized) {
            self.stats.unrecognized_events += 1;
        }
        self.stats.messages += messages.len();

        Ok(messages)
    }

    /// Translates an event and writes the resulting messages to `sink`.
    ///
    /// The sink is flushed after every event, so that the consumer sees
    /// messages as soon as the event happens.
    pub fn write_event(
        &mut self,
        event: &Event,
        sink: &mut impl MessageSink,
    ) -> Result<(), WriteEventError> {
        let messages = self.translate(event)?;
        if messages.is_empty() {
            return Ok(());
        }

        debug!(
            event = event.kind_name(),
            messages = messages.len(),
            "writing service messages"
        );
        for message in &messages {
            sink.write_message(message, self.config.blank_line_separators)
                .map_err(WriteEventError::Io)?;
        }
        sink.flush_sink().map_err(WriteEventError::Io)
    }
}

/// Counts of events and messages processed by a [`TeamcityReporter`].
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub struct ReporterStats {
    /// The number of events translated successfully.
    pub events: usize,

    /// The number of events whose kind was not recognized.
    pub unrecognized_events: usize,

    /// The number of service messages produced.
    pub messages: usize,
}
