// Copyright (c) The scalatest-teamcity Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use crate::serialize::{escape, serialize_message};
use std::{fmt, io};

/// The kind of a service message, serialized as the message name.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum MessageKind {
    /// `testCount`: the number of tests expected in the run.
    TestCount,
    /// `testStarted`: a test node was opened.
    TestStarted,
    /// `testFinished`: a test node finished, with its duration.
    TestFinished,
    /// `testFailed`: a test failed, with its message and details.
    TestFailed,
    /// `testIgnored`: a test was ignored, pending or canceled.
    TestIgnored,
    /// `testSuiteStarted`: a suite or scope node was opened.
    TestSuiteStarted,
    /// `testSuiteFinished`: a suite or scope node was closed.
    TestSuiteFinished,
    /// `message`: a generic message with a [`MessageStatus`].
    Message,
}

impl MessageKind {
    /// Returns the name of this message kind as it appears on the wire.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::TestCount => "testCount",
            Self::TestStarted => "testStarted",
            Self::TestFinished => "testFinished",
            Self::TestFailed => "testFailed",
            Self::TestIgnored => "testIgnored",
            Self::TestSuiteStarted => "testSuiteStarted",
            Self::TestSuiteFinished => "testSuiteFinished",
            Self::Message => "message",
        }
    }
}

impl fmt::Display for MessageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The `status` attribute of a generic [`MessageKind::Message`].
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum MessageStatus {
    /// `ERROR`
    Error,
    /// `WARNING`
    Warning,
    /// `INFO`
    Info,
}

impl MessageStatus {
    /// Returns the status as it appears on the wire.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Error => "ERROR",
            Self::Warning => "WARNING",
            Self::Info => "INFO",
        }
    }
}

/// A single `key='value'` pair of a [`ServiceMessage`].
///
/// The value is stored in its escaped, on-the-wire form.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Attribute {
    /// The attribute name.
    pub name: &'static str,

    /// The escaped attribute value.
    pub value: String,
}

/// A TeamCity service message.
///
/// Attributes are serialized in the order they were added.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ServiceMessage {
    kind: MessageKind,
    attributes: Vec<Attribute>,
}

impl ServiceMessage {
    /// Creates a new message of the given kind with no attributes.
    pub fn new(kind: MessageKind) -> Self {
        Self {
            kind,
            attributes: Vec::new(),
        }
    }

    /// Returns the kind of this message.
    pub fn kind(&self) -> MessageKind {
        self.kind
    }

    /// Returns the attributes of this message, in serialization order.
    pub fn attributes(&self) -> &[Attribute] {
        &self.attributes
    }

    /// Returns the escaped value of the first attribute with the given name.
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|attribute| attribute.name == name)
            .map(|attribute| attribute.value.as_str())
    }

    /// Adds a free-text attribute, escaping `value`.
    pub fn add_text(&mut self, name: &'static str, value: &str) -> &mut Self {
        self.add_raw(name, escape(value))
    }

    /// Adds an attribute whose value is already in its on-the-wire form.
    ///
    /// The caller is responsible for escaping any free text contained in
    /// `value`.
    pub fn add_raw(&mut self, name: &'static str, value: impl Into<String>) -> &mut Self {
        self.attributes.push(Attribute {
            name,
            value: value.into(),
        });
        self
    }

    /// Adds an unsigned numeric attribute. Numbers are never escaped.
    pub fn add_number(&mut self, name: &'static str, value: u64) -> &mut Self {
        self.add_raw(name, value.to_string())
    }

    /// Adds an attribute with the value `true`.
    pub fn add_flag(&mut self, name: &'static str) -> &mut Self {
        self.add_raw(name, "true")
    }

    /// Adds a `status` attribute.
    pub fn add_status(&mut self, status: MessageStatus) -> &mut Self {
        self.add_raw("status", status.as_str())
    }

    /// Serializes this message to the given writer, without a line terminator.
    pub fn serialize(&self, mut writer: impl io::Write) -> io::Result<()> {
        writer.write_all(self.to_string().as_bytes())
    }
}

impl fmt::Display for ServiceMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&serialize_message(self))
    }
}
