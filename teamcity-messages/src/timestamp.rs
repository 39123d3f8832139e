// Copyright (c) The scalatest-teamcity Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use chrono::{DateTime, Local, TimeZone, Utc};
use std::fmt;

/// The `strftime` format TeamCity expects for `timestamp` attributes, e.g.
/// `2008-09-03T14:02:34.287+0400`.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.3f%z";

/// Formats a timestamp in the form TeamCity expects.
///
/// The result is not escaped; it never contains characters that need escaping.
pub fn format_timestamp<Tz>(timestamp: &DateTime<Tz>) -> String
where
    Tz: TimeZone,
    Tz::Offset: fmt::Display,
{
    timestamp.format(TIMESTAMP_FORMAT).to_string()
}

/// The offset used to render epoch timestamps.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub enum TimestampOffset {
    /// Render timestamps in UTC (`+0000`).
    #[default]
    Utc,
    /// Render timestamps in the local time zone of this machine.
    Local,
}

impl TimestampOffset {
    /// Formats milliseconds since the Unix epoch.
    ///
    /// Returns `None` if `epoch_millis` is outside the range chrono can
    /// represent.
    pub fn format_epoch_millis(self, epoch_millis: i64) -> Option<String> {
        match self {
            Self::Utc => Utc
                .timestamp_millis_opt(epoch_millis)
                .single()
                .map(|timestamp| format_timestamp(&timestamp)),
            Self::Local => Local
                .timestamp_millis_opt(epoch_millis)
                .single()
                .map(|timestamp| format_timestamp(&timestamp)),
        }
    }
}
