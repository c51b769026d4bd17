use std::collections::HashMap;

use super::*;

fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let map: HashMap<String, String> =
        pairs.iter().map(|(k, v)| ((*k).to_owned(), (*v).to_owned())).collect();
    move |key| map.get(key).cloned()
}

#[test]
fn from_lookup_defaults() {
    let cfg = ClientConfig::from_lookup(lookup_from(&[])).unwrap();
    assert_eq!(cfg.base_url, DEFAULT_API_URL);
    assert!(cfg.require_auth);
    assert_eq!(cfg.timeouts, HttpTimeouts::default());
    assert!(cfg.session_file.ends_with(SESSION_FILE_NAME));
}

#[test]
fn from_lookup_parses_overrides() {
    let cfg = ClientConfig::from_lookup(lookup_from(&[
        ("BOOKS_API_URL", "https://books.example.test/"),
        ("BOOKS_SESSION_FILE", "/tmp/books-session.json"),
        ("BOOKS_REQUIRE_AUTH", "off"),
        ("BOOKS_REQUEST_TIMEOUT_SECS", "42"),
        ("BOOKS_CONNECT_TIMEOUT_SECS", "7"),
    ]))
    .unwrap();
    assert_eq!(cfg.base_url, "https://books.example.test");
    assert_eq!(cfg.session_file, PathBuf::from("/tmp/books-session.json"));
    assert!(!cfg.require_auth);
    assert_eq!(cfg.timeouts, HttpTimeouts { request_secs: 42, connect_secs: 7 });
}

#[test]
fn from_lookup_rejects_unknown_auth_flag() {
    let err = ClientConfig::from_lookup(lookup_from(&[("BOOKS_REQUIRE_AUTH", "maybe")])).unwrap_err();
    assert_eq!(err, ConfigError::InvalidValue { var: "BOOKS_REQUIRE_AUTH", value: "maybe".to_owned() });
}

#[test]
fn from_lookup_bad_timeout_falls_back_to_default() {
    let cfg = ClientConfig::from_lookup(lookup_from(&[("BOOKS_REQUEST_TIMEOUT_SECS", "soon")])).unwrap();
    assert_eq!(cfg.timeouts.request_secs, DEFAULT_REQUEST_TIMEOUT_SECS);
}

#[test]
fn normalize_base_url_requires_scheme_and_host() {
    assert_eq!(normalize_base_url("http://localhost:5000//").unwrap(), "http://localhost:5000");
    assert!(matches!(normalize_base_url("localhost:5000"), Err(ConfigError::InvalidBaseUrl(_))));
    assert!(matches!(normalize_base_url("https://"), Err(ConfigError::InvalidBaseUrl(_))));
}

#[test]
fn with_base_url_validates() {
    let cfg = ClientConfig::from_lookup(lookup_from(&[])).unwrap();
    let cfg = cfg.with_base_url("http://10.0.0.5:9000/").unwrap();
    assert_eq!(cfg.base_url, "http://10.0.0.5:9000");
    assert!(cfg.with_base_url("ftp://nope").is_err());
}

#[test]
fn parse_bool_variants() {
    for raw in ["1", "true", "YES", " on "] {
        assert_eq!(parse_bool(raw), Some(true), "expected true for {raw:?}");
    }
    for raw in ["0", "False", "no", "off"] {
        assert_eq!(parse_bool(raw), Some(false), "expected false for {raw:?}");
    }
    assert_eq!(parse_bool(""), None);
}
