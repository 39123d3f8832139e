// Copyright (c) The scalatest-teamcity Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `locationHint` values, which let the IDE navigate from a test node to its
//! definition.

use crate::events::Location;
use swrite::{SWrite, swrite};
use teamcity_messages::escape;

static LOCATION_SCHEME: &str = "scalatest://";

/// Builds the `locationHint` value for a test, suite or scope.
///
/// Returns an empty string unless both a class name and a location are known.
/// The returned value is already escaped: the name (and the file name of
/// [`Location::LineInFile`]) are escaped, class names are not.
pub fn location_hint(class_name: Option<&str>, location: Option<&Location>, name: &str) -> String {
    let (Some(class_name), Some(location)) = (class_name, location) else {
        return String::new();
    };

    let mut hint = String::from(LOCATION_SCHEME);
    match location {
        Location::TopOfClass {
            class_name: location_class,
        } => {
            swrite!(hint, "TopOfClass:{location_class}");
        }
        Location::TopOfMethod {
            class_name: location_class,
            method_id,
        } => {
            swrite!(
                hint,
                "TopOfMethod:{location_class}:{}",
                method_name(method_id)
            );
        }
        Location::LineInFile {
            file_name,
            line_number,
            ..
        } => {
            swrite!(
                hint,
                "LineInFile:{class_name}:{}:{line_number}",
                escape(file_name)
            );
        }
        Location::Other => return String::new(),
    }
    swrite!(hint, "TestName:{}", escape(name));
    hint
}

/// Extracts the bare method name from a JVM method id.
///
/// `public void com.example.MySuite.testAdd(int)` becomes `testAdd`.
fn method_name(method_id: &str) -> &str {
    let without_params = match method_id.rfind('(') {
        Some(index) => &method_id[..index],
        None => method_id,
    };
    match without_params.rfind('.') {
        Some(index) => &without_params[index + 1..],
        None => without_params,
    }
}
