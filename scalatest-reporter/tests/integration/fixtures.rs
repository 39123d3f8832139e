// Copyright (c) The scalatest-teamcity Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use color_eyre::eyre::{Result, WrapErr};
use scalatest_reporter::{
    config::ReporterConfig, events::EventReader, reporter::TeamcityReporter,
};

/// Runs a JSON-lines event stream through a fresh reporter and returns the
/// output along with the reporter.
pub(crate) fn run_stream(input: &str, config: ReporterConfig) -> Result<(String, TeamcityReporter)> {
    let mut reporter = TeamcityReporter::new(config);
    let mut out = String::new();
    for item in EventReader::new(input.as_bytes()) {
        let (line_number, event) = item?;
        reporter
            .write_event(&event, &mut out)
            .wrap_err_with(|| format!("failed to write event at line {line_number}"))?;
    }
    Ok((out, reporter))
}

/// Returns the value of `attribute` in a serialized service message line.
pub(crate) fn attribute<'a>(line: &'a str, attribute: &str) -> Option<&'a str> {
    let needle = format!(" {attribute}='");
    let start = line.find(&needle)? + needle.len();
    let rest = &line[start..];
    // Values are escaped, so an unescaped quote ends the value.
    let mut prev_pipe = false;
    for (index, c) in rest.char_indices() {
        match c {
            '|' => prev_pipe = !prev_pipe,
            '\'' if !prev_pipe => return Some(&rest[..index]),
            _ => prev_pipe = false,
        }
    }
    None
}
