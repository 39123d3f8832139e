// Copyright (c) The scalatest-teamcity Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Destinations for service messages.
//!
//! Service messages are always valid UTF-8, so the reporter writes strings
//! rather than arbitrary bytes. This lets messages be collected into a
//! [`String`] in tests while the command-line front end writes to a buffered
//! file or stdout.

use std::io::{self, BufWriter, Write};
use teamcity_messages::ServiceMessage;

/// A trait that abstracts over destinations for service messages.
///
/// For more, see the [module-level documentation](self).
pub trait MessageSink {
    /// Writes a string to the sink.
    fn write_str(&mut self, s: &str) -> io::Result<()>;

    /// Flushes the sink, ensuring that all intermediately buffered contents
    /// reach their destination.
    fn flush_sink(&mut self) -> io::Result<()>;

    /// Writes a single service message, terminated by a newline.
    ///
    /// If `blank_line_before` is true, a newline is also written before the
    /// message so that it starts on a fresh line even after partial output.
    fn write_message(&mut self, message: &ServiceMessage, blank_line_before: bool) -> io::Result<()> {
        if blank_line_before {
            self.write_str("\n")?;
        }
        self.write_str(&message.to_string())?;
        self.write_str("\n")
    }
}

impl MessageSink for String {
    fn write_str(&mut self, s: &str) -> io::Result<()> {
        self.push_str(s);
        Ok(())
    }

    fn flush_sink(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl MessageSink for Vec<u8> {
    fn write_str(&mut self, s: &str) -> io::Result<()> {
        self.extend_from_slice(s.as_bytes());
        Ok(())
    }

    fn flush_sink(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl<W: Write> MessageSink for BufWriter<W> {
    fn write_str(&mut self, s: &str) -> io::Result<()> {
        self.write_all(s.as_bytes())
    }

    fn flush_sink(&mut self) -> io::Result<()> {
        self.flush()
    }
}

impl<T: MessageSink + ?Sized> MessageSink for &mut T {
    fn write_str(&mut self, s: &str) -> io::Result<()> {
        (**self).write_str(s)
    }

    fn flush_sink(&mut self) -> io::Result<()> {
        (**self).flush_sink()
    }

    fn write_message(&mut self, message: &ServiceMessage, blank_line_before: bool) -> io::Result<()> {
        (**self).write_message(message, blank_line_before)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use teamcity_messages::MessageKind;

    fn test_count(count: u64) -> ServiceMessage {
        let mut message = ServiceMessage::new(MessageKind::TestCount);
        message.add_number("count", count);
        message
    }

    #[test]
    fn write_messages_to_string() {
        let mut out = String::new();
        out.write_message(&test_count(3), false).unwrap();
        out.write_message(&test_count(4), true).unwrap();
        assert_eq!(
            out,
            "##teamcity[testCount count='3']\n\n##teamcity[testCount count='4']\n"
        );
    }

    #[test]
    fn write_messages_through_buf_writer() {
        let mut writer = BufWriter::new(Vec::new());
        (&mut writer).write_message(&test_count(1), false).unwrap();
        writer.flush_sink().unwrap();
        assert_eq!(
            String::from_utf8(writer.into_inner().unwrap()).unwrap(),
            "##teamcity[testCount count='1']\n"
        );
    }
}
