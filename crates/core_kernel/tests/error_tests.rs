//! Tests for core_kernel error types

use core_kernel::{CoreError, PortError, UserId};

#[test]
fn test_core_error_validation() {
    let error = CoreError::validation("Invalid input");

    match error {
        CoreError::Validation(msg) => assert_eq!(msg, "Invalid input"),
    }
}

#[test]
fn test_core_error_display() {
    let error = CoreError::validation("Test error");
    let display = format!("{}", error);

    assert!(display.contains("Validation error"));
}

#[test]
fn test_identifier_parse_error_is_core_error() {
    let error = "not-a-number".parse::<UserId>().unwrap_err();
    assert!(matches!(error, CoreError::Validation(_)));
}

#[test]
fn test_port_error_internal_display() {
    let error = PortError::internal("pool closed");
    assert_eq!(error.to_string(), "Internal error: pool closed");
}

#[test]
fn test_port_error_source_is_exposed() {
    use std::error::Error;

    let io = std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "refused");
    let error = PortError::Connection {
        message: "telegram unreachable".to_string(),
        source: Some(Box::new(io)),
    };

    assert!(error.is_transient());
    assert!(error.source().is_some());
}
