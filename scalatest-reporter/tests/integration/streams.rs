// Copyright (c) The scalatest-teamcity Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use crate::fixtures::*;
use indoc::indoc;
use pretty_assertions::assert_eq;
use scalatest_reporter::{
    config::ReporterConfig,
    errors::{NestingError, NodeStackError, ReadEventError, WriteEventError},
    events::EventReader,
    node_id::NodeId,
    reporter::{ReporterStats, TeamcityReporter},
};
use std::collections::BTreeMap;

static STACK_SPEC_RUN: &str = indoc! {r#"
    {"type": "RunStarting", "testCount": 3, "timeStamp": 1700000000000}
    {"type": "SuiteStarting", "suiteName": "StackSpec", "suiteId": "com.example.StackSpec", "suiteClassName": "com.example.StackSpec", "location": {"type": "TopOfClass", "className": "com.example.StackSpec"}, "timeStamp": 1700000000001}
    {"type": "ScopeOpened", "message": "A Stack", "nameInfo": {"suiteName": "StackSpec", "suiteId": "com.example.StackSpec", "suiteClassName": "com.example.StackSpec"}, "location": {"type": "LineInFile", "fileName": "StackSpec.scala", "lineNumber": 8}, "timeStamp": 1700000000002}
    {"type": "TestStarting", "suiteName": "StackSpec", "suiteId": "com.example.StackSpec", "suiteClassName": "com.example.StackSpec", "testName": "A Stack should pop values", "testText": "should pop values", "location": {"type": "LineInFile", "fileName": "StackSpec.scala", "lineNumber": 9}, "timeStamp": 1700000000003}
    {"type": "TestSucceeded", "suiteName": "StackSpec", "suiteId": "com.example.StackSpec", "testName": "A Stack should pop values", "testText": "should pop values", "duration": 12, "recordedEvents": [{"type": "InfoProvided", "message": "popped 2", "timeStamp": 1700000000004}], "timeStamp": 1700000000015}

    {"type": "TestStarting", "suiteName": "StackSpec", "suiteId": "com.example.StackSpec", "testName": "A Stack should throw on empty", "testText": "should throw on empty", "timeStamp": 1700000000016}
    {"type": "TestFailed", "message": "Expected exception", "suiteName": "StackSpec", "suiteId": "com.example.StackSpec", "testName": "A Stack should throw on empty", "testText": "should throw on empty", "throwable": {"className": "java.lang.AssertionError", "message": "Expected exception", "stackTrace": [{"declaringClass": "com.example.StackSpec", "methodName": "$anonfun$new$2", "fileName": "StackSpec.scala", "lineNumber": 20}]}, "timeStamp": 1700000000123}
    {"type": "TestIgnored", "suiteName": "StackSpec", "suiteId": "com.example.StackSpec", "suiteClassName": "com.example.StackSpec", "testName": "A Stack should peek", "testText": "should peek", "location": {"type": "TopOfClass", "className": "com.example.StackSpec"}, "timeStamp": 1700000000124}
    {"type": "MarkupProvided", "text": "*done*", "timeStamp": 1700000000125}
    {"type": "ScopeClosed", "message": "A Stack", "nameInfo": {"suiteName": "StackSpec", "suiteId": "com.example.StackSpec"}, "timeStamp": 1700000000126}
    {"type": "SuiteCompleted", "suiteName": "StackSpec", "suiteId": "com.example.StackSpec", "duration": 40, "timeStamp": 1700000000127}
    {"type": "RunCompleted", "duration": 130, "timeStamp": 1700000000128}
"#};

#[test]
fn full_run() {
    let (out, reporter) = run_stream(STACK_SPEC_RUN, ReporterConfig::default()).unwrap();

    assert_eq!(
        out,
        indoc! {"
            ##teamcity[testCount count='3']
            ##teamcity[testSuiteStarted name='StackSpec' locationHint='scalatest://TopOfClass:com.example.StackSpecTestName:StackSpec' captureStandardOutput='true' nodeId='1' parentNodeId='0']
            ##teamcity[testSuiteStarted name='A Stack' locationHint='scalatest://LineInFile:com.example.StackSpec:StackSpec.scala:8TestName:A Stack' captureStandardOutput='true' nodeId='2' parentNodeId='1']
            ##teamcity[testStarted name='should pop values' locationHint='scalatest://LineInFile:com.example.StackSpec:StackSpec.scala:9TestName:A Stack should pop values' captureStandardOutput='true' nodeId='3' parentNodeId='2']
            ##teamcity[testFinished name='should pop values' duration='12' nodeId='3']
            ##teamcity[message text='popped 2|n' status='INFO']
            ##teamcity[testStarted name='should throw on empty' captureStandardOutput='true' nodeId='4' parentNodeId='2']
            ##teamcity[testFailed name='should throw on empty' message='Expected exception' details='java.lang.AssertionError: Expected exception|n\tat com.example.StackSpec.$anonfun$new$2(StackSpec.scala:20)|n' timestamp='2023-11-14T22:13:20.123+0000' nodeId='4']
            ##teamcity[testStarted name='should peek !!! IGNORED !!!' locationHint='scalatest://TopOfClass:com.example.StackSpecTestName:should peek' nodeId='5' parentNodeId='2']
            ##teamcity[testIgnored name='should peek !!! IGNORED !!!' message='Test Ignored' nodeId='5']
            ##teamcity[testSuiteFinished name='A Stack' nodeId='2']
            ##teamcity[testSuiteFinished name='StackSpec' nodeId='1']
        "}
    );

    assert_eq!(
        reporter.stats(),
        ReporterStats {
            events: 12,
            unrecognized_events: 1,
            messages: 12,
        }
    );
    assert_eq!(reporter.node_stack().depth(), 1);
}

#[test]
fn started_and_finished_ids_match() {
    let (out, _) = run_stream(STACK_SPEC_RUN, ReporterConfig::default()).unwrap();

    // Every node opened by a start message must be closed by a message with
    // the same id and name, and every parent must already be open.
    const OPENING: &[&str] = &["##teamcity[testStarted ", "##teamcity[testSuiteStarted "];
    const CLOSING: &[&str] = &[
        "##teamcity[testFinished ",
        "##teamcity[testFailed ",
        "##teamcity[testIgnored ",
        "##teamcity[testSuiteFinished ",
    ];

    let mut open: BTreeMap<String, String> = BTreeMap::new();
    open.insert("0".to_owned(), "<root>".to_owned());
    for line in out.lines() {
        let node_id = attribute(line, "nodeId");
        let name = attribute(line, "name");
        if OPENING.iter().any(|prefix| line.starts_with(prefix)) {
            let parent = attribute(line, "parentNodeId").expect("parentNodeId present");
            assert!(open.contains_key(parent), "parent {parent} is open: {line}");
            let previous = open.insert(node_id.unwrap().to_owned(), name.unwrap().to_owned());
            assert_eq!(previous, None, "ids are unique: {line}");
        } else if CLOSING.iter().any(|prefix| line.starts_with(prefix)) {
            let opened_name = open.remove(node_id.unwrap()).expect("node is open");
            assert_eq!(opened_name, name.unwrap());
        }
    }
    assert_eq!(open.len(), 1, "only the root remains open: {open:?}");
}

#[test]
fn suite_with_single_test() {
    let input = indoc! {r#"
        {"type": "RunStarting", "testCount": 1, "timeStamp": 0}
        {"type": "SuiteStarting", "suiteName": "S", "suiteId": "S", "timeStamp": 0}
        {"type": "TestStarting", "suiteName": "S", "suiteId": "S", "testName": "t1", "testText": "t1", "timeStamp": 0}
        {"type": "TestSucceeded", "suiteName": "S", "suiteId": "S", "testName": "t1", "testText": "t1", "duration": 5, "timeStamp": 0}
        {"type": "SuiteCompleted", "suiteName": "S", "suiteId": "S", "timeStamp": 0}
    "#};
    let (out, _) = run_stream(input, ReporterConfig::default()).unwrap();

    let lines: Vec<_> = out.lines().skip(1).collect();
    assert_eq!(lines.len(), 4);
    assert_eq!(attribute(lines[0], "nodeId"), Some("1"));
    assert_eq!(attribute(lines[0], "parentNodeId"), Some("0"));
    assert_eq!(attribute(lines[1], "nodeId"), Some("2"));
    assert_eq!(attribute(lines[1], "parentNodeId"), Some("1"));
    assert_eq!(attribute(lines[2], "nodeId"), Some("2"));
    assert_eq!(attribute(lines[2], "duration"), Some("5"));
    assert_eq!(attribute(lines[3], "nodeId"), Some("1"));
}

#[test]
fn consecutive_runs_keep_allocating_ids() {
    let input = indoc! {r#"
        {"type": "RunStarting", "testCount": 1, "timeStamp": 0}
        {"type": "SuiteStarting", "suiteName": "S", "suiteId": "S", "timeStamp": 0}
        {"type": "SuiteCompleted", "suiteName": "S", "suiteId": "S", "timeStamp": 0}
        {"type": "RunCompleted", "timeStamp": 0}
        {"type": "RunStarting", "testCount": 1, "timeStamp": 0}
        {"type": "SuiteStarting", "suiteName": "S", "suiteId": "S", "timeStamp": 0}
    "#};
    let (out, reporter) = run_stream(input, ReporterConfig::default()).unwrap();

    let suite_started: Vec<_> = out
        .lines()
        .filter(|line| line.starts_with("##teamcity[testSuiteStarted "))
        .map(|line| (attribute(line, "nodeId"), attribute(line, "parentNodeId")))
        .collect();
    assert_eq!(
        suite_started,
        [(Some("1"), Some("0")), (Some("2"), Some("1"))]
    );
    assert_eq!(reporter.node_stack().current(), Ok(NodeId::new(2)));
}

#[test]
fn blank_line_separators_and_undecoded_names() {
    let input = indoc! {r#"
        {"type": "RunStarting", "testCount": 1, "timeStamp": 0}
        {"type": "TestStarting", "suiteName": "S", "suiteId": "S", "testName": "$bang", "testText": "$bang", "timeStamp": 0}
    "#};
    let config = ReporterConfig {
        blank_line_separators: true,
        decode_names: false,
        ..ReporterConfig::default()
    };
    let (out, _) = run_stream(input, config).unwrap();
    assert_eq!(
        out,
        "\n##teamcity[testCount count='1']\n\
         \n##teamcity[testStarted name='$bang' captureStandardOutput='true' nodeId='1' parentNodeId='0']\n"
    );
}

#[test]
fn nesting_violation_stops_translation() {
    let input = indoc! {r#"
        {"type": "RunStarting", "testCount": 1, "timeStamp": 0}
        {"type": "TestSucceeded", "suiteName": "S", "suiteId": "S", "testName": "t", "testText": "t", "timeStamp": 0}
    "#};

    let mut reporter = TeamcityReporter::new(ReporterConfig::default());
    let mut out = String::new();
    let mut failure = None;
    for item in EventReader::new(input.as_bytes()) {
        let (line_number, event) = item.unwrap();
        if let Err(error) = reporter.write_event(&event, &mut out) {
            failure = Some((line_number, error));
            break;
        }
    }

    let (line_number, error) = failure.expect("nesting violation detected");
    assert_eq!(line_number, 2);
    assert!(
        matches!(
            error,
            WriteEventError::Nesting(NestingError {
                event_kind: "TestSucceeded",
                error: NodeStackError::AscendPastRoot,
            })
        ),
        "{error:?}"
    );
    assert_eq!(out, "##teamcity[testCount count='1']\n");
}

#[test]
fn invalid_event_reports_line_number() {
    let input = indoc! {r#"
        {"type": "RunStarting", "testCount": 1, "timeStamp": 0}

        {"type": "TestStarting", "suiteName": "S"}
    "#};
    let error = run_stream(input, ReporterConfig::default()).expect_err("invalid event");
    let read_error = error
        .downcast_ref::<ReadEventError>()
        .expect("error is a ReadEventError");
    assert!(
        matches!(read_error, ReadEventError::Parse { line_number: 3, .. }),
        "{read_error:?}"
    );
}
