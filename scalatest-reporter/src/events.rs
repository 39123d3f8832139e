// Copyright (c) The scalatest-teamcity Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The ScalaTest reporter events consumed by
//! [`TeamcityReporter`](crate::reporter::TeamcityReporter).
//!
//! Events deserialize from JSON objects tagged with a `type` field carrying the
//! ScalaTest event name, for example:
//!
//! ```json
//! {"type": "TestStarting", "suiteName": "MySpec", "suiteId": "com.MySpec",
//!  "testName": "adds", "testText": "adds", "timeStamp": 1700000000000}
//! ```
//!
//! Field names are camelCase. Event kinds this crate does not know about
//! deserialize to [`Event::Unrecognized`].

use crate::errors::ReadEventError;
use serde::Deserialize;
use std::{fmt, io::BufRead};

/// A ScalaTest reporter event.
#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
#[serde(tag = "type")]
pub enum Event {
    /// A run is about to start.
    RunStarting(RunStarting),
    /// A test is about to run.
    TestStarting(TestStarting),
    /// A test completed successfully.
    TestSucceeded(TestSucceeded),
    /// A test failed.
    TestFailed(TestFailed),
    /// A test was ignored.
    TestIgnored(TestIgnored),
    /// A test is pending.
    TestPending(TestPending),
    /// A test was canceled.
    TestCanceled(TestCanceled),
    /// A suite is about to run.
    SuiteStarting(SuiteStarting),
    /// A suite completed.
    SuiteCompleted(SuiteCompleted),
    /// A suite aborted.
    SuiteAborted(SuiteAborted),
    /// Some information was provided outside of a test.
    InfoProvided(InfoProvided),
    /// The run was stopped.
    RunStopped(RunStopped),
    /// The run aborted.
    RunAborted(RunAborted),
    /// The run completed.
    RunCompleted(RunCompleted),
    /// A scope (for example a `describe` clause) was opened.
    ScopeOpened(ScopeOpened),
    /// A scope was closed.
    ScopeClosed(ScopeClosed),
    /// A scope is pending.
    ScopePending(ScopePending),
    /// Any other kind of event. These are ignored by the reporter.
    #[serde(other)]
    Unrecognized,
}

impl Event {
    /// Returns the ScalaTest name of this event's kind.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::RunStarting(_) => "RunStarting",
            Self::TestStarting(_) => "TestStarting",
            Self::TestSucceeded(_) => "TestSucceeded",
            Self::TestFailed(_) => "TestFailed",
            Self::TestIgnored(_) => "TestIgnored",
            Self::TestPending(_) => "TestPending",
            Self::TestCanceled(_) => "TestCanceled",
            Self::SuiteStarting(_) => "SuiteStarting",
            Self::SuiteCompleted(_) => "SuiteCompleted",
            Self::SuiteAborted(_) => "SuiteAborted",
            Self::InfoProvided(_) => "InfoProvided",
            Self::RunStopped(_) => "RunStopped",
            Self::RunAborted(_) => "RunAborted",
            Self::RunCompleted(_) => "RunCompleted",
            Self::ScopeOpened(_) => "ScopeOpened",
            Self::ScopeClosed(_) => "ScopeClosed",
            Self::ScopePending(_) => "ScopePending",
            Self::Unrecognized => "Unrecognized",
        }
    }

    /// Parses a single event from a line of JSON.
    pub fn from_json_line(line: &str) -> serde_json::Result<Self> {
        serde_json::from_str(line)
    }
}

/// Reads events from a stream with one JSON object per line.
///
/// Blank lines are skipped. Each item carries the 1-based line number the
/// event was read from.
#[derive(Debug)]
pub struct EventReader<R> {
    reader: R,
    line_number: usize,
    buf: String,
}

impl<R: BufRead> EventReader<R> {
    /// Creates a new `EventReader`.
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            line_number: 0,
            buf: String::new(),
        }
    }
}

impl<R: BufRead> Iterator for EventReader<R> {
    type Item = Result<(usize, Event), ReadEventError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            self.buf.clear();
            self.line_number += 1;
            let line_number = self.line_number;
            match self.reader.read_line(&mut self.buf) {
                Ok(0) => return None,
                Ok(_) => {}
                Err(error) => return Some(Err(ReadEventError::Io { line_number, error })),
            }

            let line = self.buf.trim();
            if line.is_empty() {
                continue;
            }
            return Some(
                Event::from_json_line(line)
                    .map(|event| (line_number, event))
                    .map_err(|error| ReadEventError::Parse { line_number, error }),
            );
        }
    }
}

/// Payload of [`Event::RunStarting`].
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct RunStarting {
    /// The number of tests expected to run.
    pub test_count: u64,
    /// Milliseconds since the Unix epoch.
    #[serde(alias = "timeStamp")]
    pub timestamp: i64,
}

/// Payload of [`Event::TestStarting`].
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TestStarting {
    /// The display name of the suite.
    pub suite_name: String,
    /// The unique id of the suite.
    pub suite_id: String,
    /// The fully qualified class name of the suite, if known.
    pub suite_class_name: Option<String>,
    /// The full name of the test, including enclosing scopes.
    pub test_name: String,
    /// The text of the test without enclosing scopes.
    pub test_text: String,
    /// Where the event originates in source code, if known.
    pub location: Option<Location>,
    /// Milliseconds since the Unix epoch.
    #[serde(alias = "timeStamp")]
    pub timestamp: i64,
}

/// Payload of [`Event::TestSucceeded`].
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TestSucceeded {
    /// The display name of the suite.
    pub suite_name: String,
    /// The unique id of the suite.
    pub suite_id: String,
    /// The fully qualified class name of the suite, if known.
    pub suite_class_name: Option<String>,
    /// The full name of the test, including enclosing scopes.
    pub test_name: String,
    /// The text of the test without enclosing scopes.
    pub test_text: String,
    /// Events recorded while the test ran, in order.
    #[serde(default)]
    pub recorded_events: Vec<RecordedEvent>,
    /// Duration of the test in milliseconds.
    pub duration: Option<u64>,
    /// Where the event originates in source code, if known.
    pub location: Option<Location>,
    /// Milliseconds since the Unix epoch.
    #[serde(alias = "timeStamp")]
    pub timestamp: i64,
}

/// Payload of [`Event::TestFailed`].
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TestFailed {
    /// The failure message.
    pub message: String,
    /// The display name of the suite.
    pub suite_name: String,
    /// The unique id of the suite.
    pub suite_id: String,
    /// The fully qualified class name of the suite, if known.
    pub suite_class_name: Option<String>,
    /// The full name of the test, including enclosing scopes.
    pub test_name: String,
    /// The text of the test without enclosing scopes.
    pub test_text: String,
    /// Events recorded while the test ran, in order.
    #[serde(default)]
    pub recorded_events: Vec<RecordedEvent>,
    /// The throwable that caused the event, if any.
    pub throwable: Option<Throwable>,
    /// Duration in milliseconds, if known.
    pub duration: Option<u64>,
    /// Where the event originates in source code, if known.
    pub location: Option<Location>,
    /// Milliseconds since the Unix epoch.
    #[serde(alias = "timeStamp")]
    pub timestamp: i64,
}

/// Payload of [`Event::TestIgnored`].
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TestIgnored {
    /// The display name of the suite.
    pub suite_name: String,
    /// The unique id of the suite.
    pub suite_id: String,
    /// The fully qualified class name of the suite, if known.
    pub suite_class_name: Option<String>,
    /// The full name of the test, including enclosing scopes.
    pub test_name: String,
    /// The text of the test without enclosing scopes.
    pub test_text: String,
    /// Where the event originates in source code, if known.
    pub location: Option<Location>,
    /// Milliseconds since the Unix epoch.
    #[serde(alias = "timeStamp")]
    pub timestamp: i64,
}

/// Payload of [`Event::TestPending`].
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TestPending {
    /// The display name of the suite.
    pub suite_name: String,
    /// The unique id of the suite.
    pub suite_id: String,
    /// The fully qualified class name of the suite, if known.
    pub suite_class_name: Option<String>,
    /// The full name of the test, including enclosing scopes.
    pub test_name: String,
    /// The text of the test without enclosing scopes.
    pub test_text: String,
    /// Events recorded while the test ran, in order.
    #[serde(default)]
    pub recorded_events: Vec<RecordedEvent>,
    /// Duration in milliseconds, if known.
    pub duration: Option<u64>,
    /// Where the event originates in source code, if known.
    pub location: Option<Location>,
    /// Milliseconds since the Unix epoch.
    #[serde(alias = "timeStamp")]
    pub timestamp: i64,
}

/// Payload of [`Event::TestCanceled`].
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TestCanceled {
    /// The reason the test was canceled.
    pub message: String,
    /// The display name of the suite.
    pub suite_name: String,
    /// The unique id of the suite.
    pub suite_id: String,
    /// The fully qualified class name of the suite, if known.
    pub suite_class_name: Option<String>,
    /// The full name of the test, including enclosing scopes.
    pub test_name: String,
    /// The text of the test without enclosing scopes.
    pub test_text: String,
    /// Events recorded while the test ran, in order.
    #[serde(default)]
    pub recorded_events: Vec<RecordedEvent>,
    /// The throwable that caused the event, if any.
    pub throwable: Option<Throwable>,
    /// Duration in milliseconds, if known.
    pub duration: Option<u64>,
    /// Where the event originates in source code, if known.
    pub location: Option<Location>,
    /// Milliseconds since the Unix epoch.
    #[serde(alias = "timeStamp")]
    pub timestamp: i64,
}

/// Payload of [`Event::SuiteStarting`].
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SuiteStarting {
    /// The display name of the suite.
    pub suite_name: String,
    /// The unique id of the suite.
    pub suite_id: String,
    /// The fully qualified class name of the suite, if known.
    pub suite_class_name: Option<String>,
    /// Where the event originates in source code, if known.
    pub location: Option<Location>,
    /// Milliseconds since the Unix epoch.
    #[serde(alias = "timeStamp")]
    pub timestamp: i64,
}

/// Payload of [`Event::SuiteCompleted`].
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SuiteCompleted {
    /// The display name of the suite.
    pub suite_name: String,
    /// The unique id of the suite.
    pub suite_id: String,
    /// The fully qualified class name of the suite, if known.
    pub suite_class_name: Option<String>,
    /// Duration in milliseconds, if known.
    pub duration: Option<u64>,
    /// Where the event originates in source code, if known.
    pub location: Option<Location>,
    /// Milliseconds since the Unix epoch.
    #[serde(alias = "timeStamp")]
    pub timestamp: i64,
}

/// Payload of [`Event::SuiteAborted`].
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SuiteAborted {
    /// The reason the suite aborted.
    pub message: String,
    /// The display name of the suite.
    pub suite_name: String,
    /// The unique id of the suite.
    pub suite_id: String,
    /// The fully qualified class name of the suite, if known.
    pub suite_class_name: Option<String>,
    /// The throwable that caused the event, if any.
    pub throwable: Option<Throwable>,
    /// Duration in milliseconds, if known.
    pub duration: Option<u64>,
    /// Where the event originates in source code, if known.
    pub location: Option<Location>,
    /// Milliseconds since the Unix epoch.
    #[serde(alias = "timeStamp")]
    pub timestamp: i64,
}

/// Payload of [`Event::InfoProvided`], also used for recorded info events.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct InfoProvided {
    /// The information text.
    pub message: String,
    /// The suite or test the information belongs to, if any.
    pub name_info: Option<NameInfo>,
    /// The throwable that caused the event, if any.
    pub throwable: Option<Throwable>,
    /// Where the event originates in source code, if known.
    pub location: Option<Location>,
    /// Milliseconds since the Unix epoch.
    #[serde(alias = "timeStamp")]
    pub timestamp: i64,
}

/// Payload of [`Event::RunStopped`].
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct RunStopped {
    /// Duration in milliseconds, if known.
    pub duration: Option<u64>,
    /// Milliseconds since the Unix epoch.
    #[serde(alias = "timeStamp")]
    pub timestamp: i64,
}

/// Payload of [`Event::RunAborted`].
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct RunAborted {
    /// The reason the run aborted.
    pub message: String,
    /// The throwable that caused the event, if any.
    pub throwable: Option<Throwable>,
    /// Duration in milliseconds, if known.
    pub duration: Option<u64>,
    /// Milliseconds since the Unix epoch.
    #[serde(alias = "timeStamp")]
    pub timestamp: i64,
}

/// Payload of [`Event::RunCompleted`].
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct RunCompleted {
    /// Duration in milliseconds, if known.
    pub duration: Option<u64>,
    /// Milliseconds since the Unix epoch.
    #[serde(alias = "timeStamp")]
    pub timestamp: i64,
}

/// Payload of [`Event::ScopeOpened`].
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ScopeOpened {
    /// The scope text, for example the `describe` clause.
    pub message: String,
    /// The suite the event belongs to.
    pub name_info: NameInfo,
    /// Where the event originates in source code, if known.
    pub location: Option<Location>,
    /// Milliseconds since the Unix epoch.
    #[serde(alias = "timeStamp")]
    pub timestamp: i64,
}

/// Payload of [`Event::ScopeClosed`].
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ScopeClosed {
    /// The scope text, for example the `describe` clause.
    pub message: String,
    /// The suite the event belongs to.
    pub name_info: NameInfo,
    /// Where the event originates in source code, if known.
    pub location: Option<Location>,
    /// Milliseconds since the Unix epoch.
    #[serde(alias = "timeStamp")]
    pub timestamp: i64,
}

/// Payload of [`Event::ScopePending`].
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ScopePending {
    /// The scope text, for example the `describe` clause.
    pub message: String,
    /// The suite the event belongs to.
    pub name_info: NameInfo,
    /// Where the event originates in source code, if known.
    pub location: Option<Location>,
    /// Milliseconds since the Unix epoch.
    #[serde(alias = "timeStamp")]
    pub timestamp: i64,
}

/// Identifies the suite (and optionally the test) an event belongs to.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct NameInfo {
    /// The display name of the suite.
    pub suite_name: String,
    /// The unique id of the suite.
    pub suite_id: String,
    /// The fully qualified class name of the suite, if known.
    pub suite_class_name: Option<String>,
    /// The full name of the test, if the event belongs to one.
    pub test_name: Option<String>,
}

/// Where in source code a test, suite or scope is defined.
#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all_fields = "camelCase")]
pub enum Location {
    /// The top of a class.
    TopOfClass {
        /// The fully qualified class name.
        class_name: String,
    },
    /// The top of a method.
    TopOfMethod {
        /// The fully qualified name of the class declaring the method.
        class_name: String,
        /// The JVM method identifier, for example
        /// `public void com.example.MySuite.testAdd()`.
        method_id: String,
    },
    /// A line in a source file.
    LineInFile {
        /// The file name, without directories.
        file_name: String,
        /// The 1-based line number.
        line_number: u32,
        /// The full path of the file, if known.
        file_pathname: Option<String>,
    },
    /// Any other location, such as `SeeStackDepthException`.
    #[serde(other)]
    Other,
}

/// An event recorded while a test ran and delivered with its completion event.
#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
#[serde(tag = "type")]
pub enum RecordedEvent {
    /// Information provided with `info(...)`.
    InfoProvided(InfoProvided),
    /// Markup provided with `markup(...)`.
    MarkupProvided(MarkupProvided),
    /// Any other recordable event.
    #[serde(other)]
    Other,
}

/// Payload of [`RecordedEvent::MarkupProvided`].
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct MarkupProvided {
    /// The markup text.
    pub text: String,
    /// The suite or test the markup belongs to, if any.
    pub name_info: Option<NameInfo>,
    /// Milliseconds since the Unix epoch.
    #[serde(alias = "timeStamp")]
    pub timestamp: i64,
}

/// Events that carry [recorded events](RecordedEvent).
///
/// Only test completion events (succeeded, failed, pending and canceled)
/// implement this trait.
pub trait RecordedEvents {
    /// Returns the events recorded while the test ran, in order.
    fn recorded_events(&self) -> &[RecordedEvent];
}

macro_rules! impl_recorded_events {
    ($($ty:ty),* $(,)?) => {
        $(
            impl RecordedEvents for $ty {
                fn recorded_events(&self) -> &[RecordedEvent] {
                    &self.recorded_events
                }
            }
        )*
    };
}

impl_recorded_events!(TestSucceeded, TestFailed, TestPending, TestCanceled);

/// A JVM throwable attached to a failure or abort event.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Throwable {
    /// The fully qualified class name of the throwable.
    pub class_name: String,

    /// The message of the throwable, if any.
    pub message: Option<String>,

    /// The stack trace, innermost frame first.
    #[serde(default)]
    pub stack_trace: Vec<StackFrame>,

    /// True if the throwable is an instance of `java.lang.AssertionError`.
    ///
    /// Subclasses of `AssertionError` set this explicitly; the class name
    /// `java.lang.AssertionError` itself is recognized without it.
    #[serde(default)]
    pub assertion: bool,

    /// Present if the throwable is a ScalaTest `StackDepthException`.
    pub stack_depth: Option<StackDepth>,

    /// The cause of this throwable.
    pub cause: Option<Box<Throwable>>,
}

impl Throwable {
    /// The class name of JVM assertion errors.
    pub const ASSERTION_ERROR_CLASS: &'static str = "java.lang.AssertionError";

    /// Returns true if this is an assertion-style failure.
    pub fn is_assertion(&self) -> bool {
        self.assertion || self.class_name == Self::ASSERTION_ERROR_CLASS
    }
}

/// Renders the header line of a stack trace: `<class>[: <message>]`.
impl fmt::Display for Throwable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.message {
            Some(message) => write!(f, "{}: {message}", self.class_name),
            None => f.write_str(&self.class_name),
        }
    }
}

/// Stack depth information carried by ScalaTest's `StackDepthException`.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct StackDepth {
    /// Index into the stack trace of the frame containing the failed code.
    pub failed_code_stack_depth: usize,

    /// `<file>:<line>` of the failed code, if known.
    pub failed_code_file_name_and_line_number: Option<String>,
}

/// A single frame of a JVM stack trace.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct StackFrame {
    /// The fully qualified name of the class declaring the method.
    pub declaring_class: String,
    /// The method name.
    pub method_name: String,
    /// The source file name, if known.
    pub file_name: Option<String>,
    /// The line number, if known. Negative values are treated as unknown.
    pub line_number: Option<i32>,
    /// True for frames of native methods.
    #[serde(default)]
    pub native: bool,
}

/// Renders a frame the way the JVM does, for example
/// `com.example.MySuite.testAdd(MySuite.scala:12)`.
impl fmt::Display for StackFrame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.declaring_class, self.method_name)?;
        if self.native {
            return f.write_str("(Native Method)");
        }
        match (&self.file_name, self.line_number) {
            (Some(file_name), Some(line_number)) if line_number >= 0 => {
                write!(f, "({file_name}:{line_number})")
            }
            (Some(file_name), _) => write!(f, "({file_name})"),
            (None, _) => f.write_str("(Unknown Source)"),
        }
    }
}
