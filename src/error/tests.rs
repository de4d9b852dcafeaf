use super::*;
use std::time::Duration;

#[test]
fn test_polarion_error_construction() {
    let err = PolarionError::config("Configuration file not found");
    assert!(matches!(err, PolarionError::Config { .. }));
    assert_eq!(err.exit_code(), 2);
    assert_eq!(err.code(), ErrorCode::CONFIG_GENERIC);

    let err = PolarionError::authentication("bad password");
    assert!(matches!(err, PolarionError::Authentication { .. }));
    assert_eq!(err.exit_code(), 3);
    assert_eq!(err.code(), ErrorCode::AUTH_GENERIC);

    let err = PolarionError::invalid_project("elibrary");
    assert!(matches!(err, PolarionError::InvalidProject { .. }));
    assert_eq!(err.exit_code(), 4);
    assert_eq!(err.code(), ErrorCode::PROJECT_UNRESOLVABLE);

    let err = PolarionError::remote("fault");
    assert!(matches!(err, PolarionError::RemoteLookup { .. }));
    assert_eq!(err.exit_code(), 5);

    let err = PolarionError::remote_timeout("logIn", Duration::from_secs(5));
    assert!(matches!(err, PolarionError::RemoteTimeout { .. }));
    assert_eq!(err.exit_code(), 5);
    assert_eq!(err.code(), ErrorCode::REMOTE_TIMEOUT);

    let err = PolarionError::storage("disk full");
    assert_eq!(err.exit_code(), 6);

    let err = PolarionError::validation("bad payload");
    assert_eq!(err.exit_code(), 8);

    let err = PolarionError::other("Unknown error");
    assert_eq!(err.exit_code(), 1);
    assert_eq!(err.code(), ErrorCode::OTHER_GENERIC);
}

#[test]
fn test_invalid_project_message() {
    let err = PolarionError::invalid_project("elibary");
    assert_eq!(
        err.user_message(),
        "Polarion project id: elibary does not exist. Please check the spelling."
    );
    assert!(err.to_string().contains("[E2100]"));
}

#[test]
fn test_error_with_context() {
    let err = PolarionError::config("Config error").with_context("Additional context");
    let err_str = err.to_string();
    assert!(err_str.contains("Config error"));
    assert!(err_str.contains("Additional context"));
}

#[test]
fn test_error_with_source_chain() {
    let source_err = std::io::Error::new(std::io::ErrorKind::NotFound, "measures.json");
    let err = PolarionError::storage("Storage error").with_source(source_err);

    assert!(err.to_string().contains("[E3000]"));
    assert!(err.developer_message().contains("caused by: measures.json"));
}

#[test]
fn test_io_error_conversion() {
    let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
    let err: PolarionError = io_err.into();
    assert_eq!(err.code(), ErrorCode::STORAGE_PERMISSION_DENIED);
}

#[test]
fn test_toml_error_conversion() {
    let toml_err = toml::from_str::<toml::Table>("= broken").unwrap_err();
    let err: PolarionError = toml_err.into();
    assert_eq!(err.code(), ErrorCode::CONFIG_INVALID_TOML);
}

#[test]
fn test_url_error_conversion() {
    let url_err = url::Url::parse("not a url").unwrap_err();
    let err: PolarionError = url_err.into();
    assert_eq!(err.code(), ErrorCode::CONFIG_INVALID_URL);
    assert!(err.user_message().contains("server_url"));
}

#[test]
fn test_connection_failure_classification() {
    assert!(PolarionError::authentication("nope").is_connection_failure());
    assert!(PolarionError::remote_timeout("query", Duration::from_secs(1)).is_connection_failure());
    assert!(PolarionError::remote_with_code(ErrorCode::REMOTE_TRANSPORT, "reset", None)
        .is_connection_failure());
    assert!(!PolarionError::remote("fault").is_connection_failure());
    assert!(!PolarionError::invalid_project("x").is_connection_failure());
}
