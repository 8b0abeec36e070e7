//! Tests for backend URL resolution priority order

use std::io::Write;

use serial_test::serial;
use tutorkit_common::config::{
    backend_url_from_file, resolve_backend_url, BACKEND_URL_ENV, DEFAULT_BACKEND_URL,
};

#[test]
#[serial]
fn cli_argument_wins_over_everything() {
    std::env::set_var(BACKEND_URL_ENV, "http://env.example/api");
    let url = resolve_backend_url(Some("http://cli.example/api"));
    std::env::remove_var(BACKEND_URL_ENV);
    assert_eq!(url, "http://cli.example/api");
}

#[test]
#[serial]
fn environment_variable_wins_over_default() {
    std::env::set_var(BACKEND_URL_ENV, "http://env.example/api");
    let url = resolve_backend_url(None);
    std::env::remove_var(BACKEND_URL_ENV);
    assert_eq!(url, "http://env.example/api");
}

#[test]
#[serial]
fn empty_environment_variable_is_ignored() {
    std::env::set_var(BACKEND_URL_ENV, "");
    let url = resolve_backend_url(None);
    std::env::remove_var(BACKEND_URL_ENV);
    assert_eq!(url, DEFAULT_BACKEND_URL);
}

#[test]
fn backend_url_read_from_toml_file() {
    let mut file = tempfile::NamedTempFile::new().expect("temp file");
    writeln!(file, "backend_url = \"http://file.example/api\"").expect("write");

    let url = backend_url_from_file(file.path()).expect("parse");
    assert_eq!(url.as_deref(), Some("http://file.example/api"));
}

#[test]
fn missing_key_in_toml_file_is_none() {
    let mut file = tempfile::NamedTempFile::new().expect("temp file");
    writeln!(file, "other_key = 1").expect("write");

    let url = backend_url_from_file(file.path()).expect("parse");
    assert!(url.is_none());
}

#[test]
fn invalid_toml_is_a_config_error() {
    let mut file = tempfile::NamedTempFile::new().expect("temp file");
    writeln!(file, "backend_url = [unterminated").expect("write");

    assert!(backend_url_from_file(file.path()).is_err());
}
