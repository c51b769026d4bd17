use super::*;

#[test]
fn validation_messages_name_the_field() {
    let err = CatalogError::from(ValidationError::MissingField("title"));
    assert_eq!(err.to_string(), "validation failed: title is required");
    assert!(!err.is_network());
}

#[test]
fn status_errors_classify_by_code() {
    let missing = CatalogError::Status { status: 404, body: String::new() };
    assert!(missing.is_network());
    assert!(missing.is_not_found());
    assert!(!missing.is_unauthorized());

    let rejected = CatalogError::Status { status: 401, body: "nope".into() };
    assert!(rejected.is_unauthorized());
    assert_eq!(rejected.to_string(), "server returned status 401");
}

#[test]
fn transport_is_network_but_auth_is_not() {
    assert!(CatalogError::Transport("connection refused".into()).is_network());
    assert!(!CatalogError::Auth("bad credentials".into()).is_network());
}
