// Copyright (c) The scalatest-teamcity Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Failure details extracted from throwables.

use crate::events::{StackFrame, Throwable};
use swrite::{SWrite, swrite};
use tracing::warn;

/// Renders the stack trace of a throwable the way the JVM prints it.
///
/// Causes are rendered as `Caused by:` sections, and frames shared with the
/// enclosing trace are elided as `... N more`.
pub fn stack_trace_text(throwable: &Throwable) -> String {
    let mut out = String::new();
    swrite!(out, "{throwable}\n");
    for frame in &throwable.stack_trace {
        swrite!(out, "\tat {frame}\n");
    }

    let mut enclosing = throwable;
    let mut cause = throwable.cause.as_deref();
    while let Some(current) = cause {
        let unique = unique_frame_count(&current.stack_trace, &enclosing.stack_trace);
        swrite!(out, "Caused by: {current}\n");
        for frame in &current.stack_trace[..unique] {
            swrite!(out, "\tat {frame}\n");
        }
        let in_common = current.stack_trace.len() - unique;
        if in_common != 0 {
            swrite!(out, "\t... {in_common} more\n");
        }

        enclosing = current;
        cause = current.cause.as_deref();
    }

    out
}

/// Returns the number of leading frames of `trace` that are not shared with
/// the tail of `enclosing`.
fn unique_frame_count(trace: &[StackFrame], enclosing: &[StackFrame]) -> usize {
    let in_common = trace
        .iter()
        .rev()
        .zip(enclosing.iter().rev())
        .take_while(|(a, b)| a == b)
        .count();
    trace.len() - in_common
}

/// Returns the `ScalaTestFailureLocation` line for a throwable, if it carries
/// stack depth information.
///
/// The line names the class of the frame at the failed code's stack depth and
/// the file and line number of the failed code.
pub fn failure_location(throwable: &Throwable) -> Option<String> {
    match locate_failure(throwable) {
        FailureLocation::Found(location) => Some(location),
        FailureLocation::DepthOutOfRange { depth, frames } => {
            warn!(
                depth,
                frames, "failed code stack depth is out of range, omitting failure location",
            );
            None
        }
        FailureLocation::Unknown => None,
    }
}

#[derive(Debug, PartialEq, Eq)]
enum FailureLocation {
    Found(String),
    /// No stack depth or no file and line were reported.
    Unknown,
    DepthOutOfRange { depth: usize, frames: usize },
}

fn locate_failure(throwable: &Throwable) -> FailureLocation {
    let Some(stack_depth) = &throwable.stack_depth else {
        return FailureLocation::Unknown;
    };
    let Some(file_and_line) = &stack_depth.failed_code_file_name_and_line_number else {
        return FailureLocation::Unknown;
    };
    let depth = stack_depth.failed_code_stack_depth;
    match throwable.stack_trace.get(depth) {
        Some(frame) => FailureLocation::Found(format!(
            "ScalaTestFailureLocation: {} at ({file_and_line})",
            frame.declaring_class
        )),
        None => FailureLocation::DepthOutOfRange {
            depth,
            frames: throwable.stack_trace.len(),
        },
    }
}
