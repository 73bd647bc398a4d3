//! Integration tests for capture directives and context resolution.
//!
//! These tests drive the whole pipeline through the public API: a pattern
//! with capture fields is compiled, a log call supplies (or omits) a context,
//! and the rendered line in the log file is inspected.

use std::fs;
use std::path::Path;

use loggia::{LogContext, Logger, Registry};
use tempfile::tempdir;

fn logger_with(dir: &Path, name: &str, pattern: &str) -> Logger {
    let registry = Registry::new(dir).expect("registry builds");
    let logger = registry.get(name).expect("name is valid");
    logger.set_format(Some(pattern)).expect("pattern compiles");
    logger
}

fn read_log(dir: &Path, name: &str) -> String {
    fs::read_to_string(dir.join(format!("{name}.log"))).expect("log file readable")
}

// ============================================================================
// Capture Resolution Tests
// ============================================================================

/// A bound capture renders its context value.
#[test]
fn bound_capture_renders_the_value() {
    let dir = tempdir().expect("tempdir");
    let logger = logger_with(dir.path(), "cap", "%(*request_id)s %(message)s");

    let ctx = LogContext::new().local("request_id", "r-42");
    logger.info_with("served", &ctx);

    assert_eq!(read_log(dir.path(), "cap"), "r-42 served\n");
}

/// An unbound capture renders the sentinel and never fails the call.
#[test]
fn unbound_capture_renders_the_sentinel() {
    let dir = tempdir().expect("tempdir");
    let logger = logger_with(dir.path(), "sent", "%(*request_id)s %(message)s");

    logger.info("no context supplied");
    logger.info_with("empty context", &LogContext::new());

    let contents = read_log(dir.path(), "sent");
    let mut lines = contents.lines();
    assert_eq!(lines.next(), Some("----- no context supplied"));
    assert_eq!(lines.next(), Some("----- empty context"));
}

/// The most specific layer wins when several bind one name.
#[test]
fn most_specific_layer_wins() {
    let dir = tempdir().expect("tempdir");
    let logger = logger_with(dir.path(), "layers", "%(*who)s %(message)s");

    let ctx = LogContext::new()
        .global("who", "module")
        .local("who", "call")
        .attr("who", "object");
    logger.info_with("pick one", &ctx);

    let ctx = LogContext::new().global("who", "module").local("who", "call");
    logger.info_with("pick again", &ctx);

    let contents = read_log(dir.path(), "layers");
    let mut lines = contents.lines();
    assert_eq!(lines.next(), Some("object pick one"));
    assert_eq!(lines.next(), Some("call pick again"));
}

/// Context values pass through Display, so non-string values work.
#[test]
fn display_values_are_accepted() {
    let dir = tempdir().expect("tempdir");
    let logger = logger_with(dir.path(), "disp", "%(*attempt)s/%(*total)s %(message)s");

    let ctx = LogContext::new().local("attempt", 2).local("total", 5);
    logger.warning_with("retrying", &ctx);

    assert_eq!(read_log(dir.path(), "disp"), "2/5 retrying\n");
}

/// Padding applies to capture values like any other field.
#[test]
fn capture_values_are_padded() {
    let dir = tempdir().expect("tempdir");
    let logger = logger_with(dir.path(), "pad", "[%(*tag)-6s] %(message)s");

    let ctx = LogContext::new().local("tag", "db");
    logger.info_with("query ran", &ctx);

    assert_eq!(read_log(dir.path(), "pad"), "[db    ] query ran\n");
}

// ============================================================================
// Call-Dependent Field Tests
// ============================================================================

/// `module` and `filename` come from the call site of this test file.
#[test]
fn call_site_fields_name_the_calling_file() {
    let dir = tempdir().expect("tempdir");
    let logger = logger_with(dir.path(), "site", "%(module)s %(filename)s %(message)s");

    logger.info("located");

    assert_eq!(
        read_log(dir.path(), "site"),
        "context_capture context_capture.rs located\n"
    );
}

/// `funcName` resolves only when the context supplies it.
#[test]
fn function_name_requires_the_context() {
    let dir = tempdir().expect("tempdir");
    let logger = logger_with(dir.path(), "func", "%(funcName)s %(message)s");

    logger.info("anonymous");
    let ctx = LogContext::new().function("handle");
    logger.info_with("named", &ctx);

    let contents = read_log(dir.path(), "func");
    let mut lines = contents.lines();
    assert_eq!(lines.next(), Some("----- anonymous"));
    assert_eq!(lines.next(), Some("handle named"));
}

/// `lineno` tracks the exact call line, so two calls differ.
#[test]
fn line_numbers_differ_between_calls() {
    let dir = tempdir().expect("tempdir");
    let logger = logger_with(dir.path(), "lines", "%(lineno)s");

    logger.info("first");
    logger.info("second");

    let contents = read_log(dir.path(), "lines");
    let lines: Vec<_> = contents.lines().collect();
    assert_eq!(lines.len(), 2);
    assert_ne!(lines[0], lines[1]);
}

// ============================================================================
// Exception Logging Tests
// ============================================================================

/// `exception_with` resolves captures and appends the error chain.
#[test]
fn exception_with_context_and_chain() {
    let dir = tempdir().expect("tempdir");
    let logger = logger_with(dir.path(), "exc", "%(*op)s %(levelname)s %(message)s");

    let err = std::io::Error::other("disk full");
    let ctx = LogContext::new().local("op", "flush");
    logger.exception_with("write failed", &err, &ctx);

    let contents = read_log(dir.path(), "exc");
    assert!(contents.starts_with("flush ERROR write failed: disk full"));
}
