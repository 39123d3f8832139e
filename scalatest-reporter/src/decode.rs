// Copyright (c) The scalatest-teamcity Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Decoding of Scala-encoded symbolic names.
//!
//! The Scala compiler encodes operator characters in identifiers, so a test
//! method named `===` shows up as `$eq$eq$eq`. Test names are decoded before
//! they are displayed.

use std::borrow::Cow;

/// Encoded operator names, in the form they appear after the `$`.
static OPERATORS: &[(&str, char)] = &[
    ("tilde", '~'),
    ("eq", '='),
    ("less", '<'),
    ("greater", '>'),
    ("bang", '!'),
    ("hash", '#'),
    ("percent", '%'),
    ("up", '^'),
    ("amp", '&'),
    ("bar", '|'),
    ("times", '*'),
    ("div", '/'),
    ("plus", '+'),
    ("minus", '-'),
    ("colon", ':'),
    ("bslash", '\\'),
    ("qmark", '?'),
    ("at", '@'),
];

/// Decodes a Scala-encoded name for display.
///
/// Recognizes the operator encodings (`$plus`, `$eq`, ...) and `$uXXXX`
/// unicode escapes. Anything that is not a valid encoding is kept verbatim, so
/// decoding never fails.
pub fn decode_display_name(name: &str) -> Cow<'_, str> {
    if !name.contains('$') {
        return Cow::Borrowed(name);
    }

    let mut out = String::with_capacity(name.len());
    let mut rest = name;
    while let Some(index) = rest.find('$') {
        out.push_str(&rest[..index]);
        let encoded = &rest[index + 1..];
        match decode_one(encoded) {
            Some((decoded, consumed)) => {
                out.push(decoded);
                rest = &encoded[consumed..];
            }
            None => {
                out.push('$');
                rest = encoded;
            }
        }
    }
    out.push_str(rest);

    Cow::Owned(out)
}

/// Decodes the encoding at the start of `encoded` (the text following a `$`).
///
/// Returns the decoded character and the number of bytes consumed.
fn decode_one(encoded: &str) -> Option<(char, usize)> {
    let bytes = encoded.as_bytes();
    // An encoding is at least two lowercase letters, or `u` plus four hex
    // digits.
    let (&first, &second) = (bytes.first()?, bytes.get(1)?);
    if !first.is_ascii_lowercase() {
        return None;
    }

    if second.is_ascii_lowercase() {
        OPERATORS
            .iter()
            .find(|(code, _)| encoded.starts_with(code))
            .map(|&(code, op)| (op, code.len()))
    } else if first == b'u' && (second.is_ascii_digit() || (b'A'..=b'F').contains(&second)) {
        let hex = encoded.get(1..5)?;
        if !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
            return None;
        }
        let code = u32::from_str_radix(hex, 16).ok()?;
        char::from_u32(code).map(|c| (c, 5))
    } else {
        None
    }
}
