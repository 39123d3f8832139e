// Copyright (c) The scalatest-teamcity Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Serialize a `ServiceMessage`.

use crate::{Attribute, ServiceMessage};
use swrite::{SWrite, swrite};

static MESSAGE_PREFIX: &str = "##teamcity[";
static MESSAGE_SUFFIX: &str = "]";

/// Escapes `text` for use as a service message attribute value.
///
/// The escape introducer is `|`. Besides quotes, brackets and line breaks, the
/// Unicode next-line, line-separator and paragraph-separator characters are
/// escaped since TeamCity treats them as line breaks too.
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '|' => out.push_str("||"),
            '\'' => out.push_str("|'"),
            '\n' => out.push_str("|n"),
            '\r' => out.push_str("|r"),
            '[' => out.push_str("|["),
            ']' => out.push_str("|]"),
            '\u{0085}' => out.push_str("|x"),
            '\u{2028}' => out.push_str("|l"),
            '\u{2029}' => out.push_str("|p"),
            c => out.push(c),
        }
    }
    out
}

pub(crate) fn serialize_message(message: &ServiceMessage) -> String {
    let mut out = String::with_capacity(64);
    out.push_str(MESSAGE_PREFIX);
    out.push_str(message.kind().as_str());
    for Attribute { name, value } in message.attributes() {
        swrite!(out, " {name}='{value}'");
    }
    out.push_str(MESSAGE_SUFFIX);
    out
}
