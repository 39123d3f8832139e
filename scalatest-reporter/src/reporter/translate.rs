// Copyright (c) The scalatest-teamcity Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Translation of individual events into service messages.

use crate::{
    config::ReporterConfig,
    decode::decode_display_name,
    errors::{NestingError, NodeStackError},
    events::{
        Event, RecordedEvent, RecordedEvents, ScopeClosed, ScopeOpened, ScopePending,
        SuiteStarting, TestCanceled, TestFailed, TestIgnored, TestPending, TestStarting,
        TestSucceeded, Throwable,
    },
    failure::{failure_location, stack_trace_text},
    location::location_hint,
    node_id::{NodeId, NodeIdStack},
};
use std::borrow::Cow;
use teamcity_messages::{MessageKind, MessageStatus, ServiceMessage};
use tracing::{debug, trace, warn};

const IGNORED_TEST_SUFFIX: &str = " !!! IGNORED !!!";
const SCOPE_PENDING_NAME: &str = "(Scope Pending)";

/// Translates a single event into the service messages that represent it.
///
/// The node id stack is updated to reflect the nesting of the event stream.
/// If the event violates the nesting order, an error is returned and the
/// stack is left unchanged.
pub fn translate_event(
    event: &Event,
    stack: &mut NodeIdStack,
    config: &ReporterConfig,
) -> Result<Vec<ServiceMessage>, NestingError> {
    let mut translator = Translator {
        stack,
        config,
        messages: Vec::new(),
    };
    translator
        .translate(event)
        .map_err(|error| NestingError {
            event_kind: event.kind_name(),
            error,
        })?;
    Ok(translator.messages)
}

struct Translator<'a> {
    stack: &'a mut NodeIdStack,
    config: &'a ReporterConfig,
    messages: Vec<ServiceMessage>,
}

impl Translator<'_> {
    fn translate(&mut self, event: &Event) -> Result<(), NodeStackError> {
        match event {
            Event::RunStarting(run) => {
                self.stack.reset();
                debug!(root = %self.stack.current()?, "run starting");
                self.push(MessageKind::TestCount)
                    .add_number("count", run.test_count);
            }
            Event::TestStarting(test) => self.test_starting(test)?,
            Event::TestSucceeded(test) => self.test_succeeded(test)?,
            Event::TestFailed(test) => self.test_failed(test)?,
            Event::TestIgnored(test) => self.test_ignored(test)?,
            Event::TestPending(test) => self.test_pending(test)?,
            Event::TestCanceled(test) => self.test_canceled(test)?,
            Event::SuiteStarting(suite) => self.suite_starting(suite)?,
            Event::SuiteCompleted(suite) => {
                self.close_suite(&suite.suite_name)?;
            }
            Event::SuiteAborted(suite) => {
                self.error_message(&suite.message, suite.throwable.as_ref());
            }
            Event::InfoProvided(info) => {
                self.info_message(&info.message, MessageStatus::Warning);
            }
            Event::RunAborted(run) => {
                self.error_message(&run.message, run.throwable.as_ref());
            }
            Event::RunStopped(_) | Event::RunCompleted(_) => {}
            Event::ScopeOpened(scope) => self.scope_opened(scope)?,
            Event::ScopeClosed(ScopeClosed { message, .. }) => {
                self.close_suite(message)?;
            }
            Event::ScopePending(scope) => self.scope_pending(scope)?,
            Event::Unrecognized => {
                trace!("ignoring unrecognized event");
            }
        }

        Ok(())
    }

    fn test_starting(&mut self, test: &TestStarting) -> Result<(), NodeStackError> {
        let name = self.decode(&test.test_text);
        let hint = location_hint(
            test.suite_class_name.as_deref(),
            test.location.as_ref(),
            &self.decode(&test.test_name),
        );
        let (node_id, parent_id) = self.descend()?;

        let message = self.push(MessageKind::TestStarted);
        message.add_text("name", &name);
        add_location_hint(message, hint);
        message
            .add_flag("captureStandardOutput")
            .add_number("nodeId", node_id.get())
            .add_number("parentNodeId", parent_id.get());
        Ok(())
    }

    fn test_succeeded(&mut self, test: &TestSucceeded) -> Result<(), NodeStackError> {
        let node_id = self.stack.current()?;
        let name = self.decode(&test.test_text);
        self.push(MessageKind::TestFinished)
            .add_text("name", &name)
            .add_number("duration", test.duration.unwrap_or(0))
            .add_number("nodeId", node_id.get());
        self.drain_recorded_events(test);
        self.ascend()
    }

    fn test_failed(&mut self, test: &TestFailed) -> Result<(), NodeStackError> {
        let node_id = self.stack.current()?;
        let name = self.decode(&test.test_text);

        let mut failure_message = test.message.clone();
        let mut details = String::new();
        let mut error = true;
        if let Some(throwable) = &test.throwable {
            error = !throwable.is_assertion();
            details = stack_trace_text(throwable);
            if let Some(location) = failure_location(throwable) {
                failure_message.push('\n');
                failure_message.push_str(&location);
            }
        }
        let timestamp = self.config.timestamp_offset.format_epoch_millis(test.timestamp);
        if timestamp.is_none() {
            warn!(
                timestamp = test.timestamp,
                "event timestamp is out of range, omitting it from testFailed"
            );
        }

        let message = self.push(MessageKind::TestFailed);
        message
            .add_text("name", &name)
            .add_text("message", &failure_message)
            .add_text("details", &details);
        if error {
            message.add_flag("error");
        }
        if let Some(timestamp) = timestamp {
            message.add_text("timestamp", &timestamp);
        }
        message.add_number("nodeId", node_id.get());

        self.drain_recorded_events(test);
        self.ascend()
    }

    fn test_ignored(&mut self, test: &TestIgnored) -> Result<(), NodeStackError> {
        let decoded = self.decode(&test.test_text);
        let hint = location_hint(
            test.suite_class_name.as_deref(),
            test.location.as_ref(),
            &decoded,
        );
        let name = format!("{decoded}{IGNORED_TEST_SUFFIX}");
        let (node_id, parent_id) = self.descend()?;

        let message = self.push(MessageKind::TestStarted);
        message.add_text("name", &name);
        add_location_hint(message, hint);
        message
            .add_number("nodeId", node_id.get())
            .add_number("parentNodeId", parent_id.get());
        self.push(MessageKind::TestIgnored)
            .add_text("name", &name)
            .add_text("message", "Test Ignored")
            .add_number("nodeId", node_id.get());

        self.ascend()
    }

    fn test_pending(&mut self, test: &TestPending) -> Result<(), NodeStackError> {
        let node_id = self.stack.current()?;
        let name = self.decode(&test.test_text);
        self.push(MessageKind::TestIgnored)
            .add_text("name", &name)
            .add_text("message", "Test Pending")
            .add_number("nodeId", node_id.get());
        self.drain_recorded_events(test);
        self.ascend()
    }

    fn test_canceled(&mut self, test: &TestCanceled) -> Result<(), NodeStackError> {
        let node_id = self.stack.current()?;
        let name = self.decode(&test.test_text);
        self.push(MessageKind::TestIgnored)
            .add_text("name", &name)
            .add_text("message", "Test Canceled")
            .add_number("nodeId", node_id.get());
        self.push(MessageKind::TestFinished)
            .add_text("name", &name)
            .add_number("duration", 0)
            .add_number("nodeId", node_id.get());
        self.drain_recorded_events(test);
        self.ascend()
    }

    fn suite_starting(&mut self, suite: &SuiteStarting) -> Result<(), NodeStackError> {
        let hint = location_hint(
            suite.suite_class_name.as_deref(),
            suite.location.as_ref(),
            &suite.suite_name,
        );
        self.open_suite(&suite.suite_name, hint)
    }

    fn scope_opened(&mut self, scope: &ScopeOpened) -> Result<(), NodeStackError> {
        let hint = location_hint(
            scope.name_info.suite_class_name.as_deref(),
            scope.location.as_ref(),
            &scope.message,
        );
        self.open_suite(&scope.message, hint)
    }

    fn scope_pending(&mut self, scope: &ScopePending) -> Result<(), NodeStackError> {
        let node_id = self.stack.current()?;
        self.push(MessageKind::TestIgnored)
            .add_text("name", SCOPE_PENDING_NAME)
            .add_text("message", "Scope Pending")
            .add_number("nodeId", node_id.get());
        self.push(MessageKind::TestIgnored)
            .add_text("name", &scope.message)
            .add_text("message", "Scope Pending")
            .add_number("nodeId", node_id.get());
        self.close_suite(&scope.message)
    }

    fn open_suite(&mut self, name: &str, hint: String) -> Result<(), NodeStackError> {
        let (node_id, parent_id) = self.descend()?;
        let message = self.push(MessageKind::TestSuiteStarted);
        message.add_text("name", name);
        add_location_hint(message, hint);
        message
            .add_flag("captureStandardOutput")
            .add_number("nodeId", node_id.get())
            .add_number("parentNodeId", parent_id.get());
        Ok(())
    }

    fn close_suite(&mut self, name: &str) -> Result<(), NodeStackError> {
        let node_id = self.stack.current()?;
        self.push(MessageKind::TestSuiteFinished)
            .add_text("name", name)
            .add_number("nodeId", node_id.get());
        self.ascend()
    }

    fn error_message(&mut self, text: &str, throwable: Option<&Throwable>) {
        if text.is_empty() {
            trace!("skipping error message with empty text");
            return;
        }
        let message = self.push(MessageKind::Message);
        message
            .add_text("text", text)
            .add_status(MessageStatus::Error);
        if let Some(throwable) = throwable {
            message.add_text("errorDetails", &stack_trace_text(throwable));
        }
    }

    fn info_message(&mut self, text: &str, status: MessageStatus) {
        if text.is_empty() {
            trace!("skipping info message with empty text");
            return;
        }
        self.push(MessageKind::Message)
            .add_text("text", &format!("{text}\n"))
            .add_status(status);
    }

    fn drain_recorded_events(&mut self, event: &impl RecordedEvents) {
        for recorded in event.recorded_events() {
            match recorded {
                RecordedEvent::InfoProvided(info) => {
                    self.info_message(&info.message, MessageStatus::Info);
                }
                RecordedEvent::MarkupProvided(_) | RecordedEvent::Other => {
                    trace!("skipping recorded event that is not InfoProvided");
                }
            }
        }
    }

    /// Opens a node, returning its id and its parent's id.
    fn descend(&mut self) -> Result<(NodeId, NodeId), NodeStackError> {
        let parent_id = self.stack.descend()?;
        let node_id = self.stack.current()?;
        debug!(node = %node_id, parent = %parent_id, "opened node");
        Ok((node_id, parent_id))
    }

    fn ascend(&mut self) -> Result<(), NodeStackError> {
        let node_id = self.stack.ascend()?;
        debug!(node = %node_id, "closed node");
        Ok(())
    }

    fn decode<'s>(&self, name: &'s str) -> Cow<'s, str> {
        if self.config.decode_names {
            decode_display_name(name)
        } else {
            Cow::Borrowed(name)
        }
    }

    fn push(&mut self, kind: MessageKind) -> &mut ServiceMessage {
        self.messages.push(ServiceMessage::new(kind));
        self.messages
            .last_mut()
            .expect("a message was just pushed")
    }
}

fn add_location_hint(message: &mut ServiceMessage, hint: String) {
    if !hint.is_empty() {
        message.add_raw("locationHint", hint);
    }
}
