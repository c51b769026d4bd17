use std::sync::{Arc, Mutex};

use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode, header};
use axum::routing::{get, post, put};
use axum::{Json, Router};
use serde_json::{Value, json};

use super::*;

// =============================================================================
// STUB SERVICE
// =============================================================================

const TOKEN: &str = "tok-123";

#[derive(Clone, Default)]
struct Stub {
    books: Arc<Mutex<Vec<Value>>>,
    auth_headers: Arc<Mutex<Vec<Option<String>>>>,
    echo_created: bool,
}

impl Stub {
    fn seeded() -> Self {
        let stub = Self { echo_created: true, ..Self::default() };
        stub.books.lock().unwrap().extend([
            json!({ "id": 1, "title": "Emma", "author": "Austen", "year": 1815, "genre": "Novel" }),
            json!({ "id": 2, "title": "Ubik", "author": "Dick", "year": "1969", "genre": null }),
        ]);
        stub
    }

    fn authorize(&self, headers: &HeaderMap) -> Result<(), StatusCode> {
        let value = headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .map(ToOwned::to_owned);
        let ok = value.as_deref() == Some(&format!("Bearer {TOKEN}"));
        self.auth_headers.lock().unwrap().push(value);
        if ok { Ok(()) } else { Err(StatusCode::UNAUTHORIZED) }
    }
}

async fn list(State(stub): State<Stub>, headers: HeaderMap) -> Result<Json<Vec<Value>>, StatusCode> {
    stub.authorize(&headers)?;
    Ok(Json(stub.books.lock().unwrap().clone()))
}

async fn create(
    State(stub): State<Stub>,
    headers: HeaderMap,
    Json(mut body): Json<Value>,
) -> Result<(StatusCode, Json<Value>), StatusCode> {
    stub.authorize(&headers)?;
    let mut books = stub.books.lock().unwrap();
    let next = books.iter().filter_map(|b| b["id"].as_i64()).max().unwrap_or(0) + 1;
    body["id"] = json!(next);
    books.push(body.clone());
    if stub.echo_created {
        Ok((StatusCode::CREATED, Json(body)))
    } else {
        Ok((StatusCode::CREATED, Json(json!({ "ok": true }))))
    }
}

async fn update(
    State(stub): State<Stub>,
    headers: HeaderMap,
    Path(id): Path<i64>,
    Json(mut body): Json<Value>,
) -> Result<Json<Value>, StatusCode> {
    stub.authorize(&headers)?;
    let mut books = stub.books.lock().unwrap();
    let slot = books
        .iter_mut()
        .find(|b| b["id"].as_i64() == Some(id))
        .ok_or(StatusCode::NOT_FOUND)?;
    body["id"] = json!(id);
    *slot = body.clone();
    Ok(Json(body))
}

async fn remove(State(stub): State<Stub>, headers: HeaderMap, Path(id): Path<i64>) -> StatusCode {
    if let Err(status) = stub.authorize(&headers) {
        return status;
    }
    let mut books = stub.books.lock().unwrap();
    let before = books.len();
    books.retain(|b| b["id"].as_i64() != Some(id));
    if books.len() == before { StatusCode::NOT_FOUND } else { StatusCode::NO_CONTENT }
}

async fn login(Json(body): Json<Value>) -> Result<Json<Value>, (StatusCode, &'static str)> {
    if body["email"] == "reader@example.com" && body["password"] == "hunter2" {
        Ok(Json(json!({ "token": TOKEN })))
    } else {
        Err((StatusCode::UNAUTHORIZED, "invalid credentials"))
    }
}

async fn spawn(stub: Stub) -> HttpBookApi {
    let app = Router::new()
        .route("/api/books", get(list).post(create))
        .route("/api/books/{id}", put(update).delete(remove))
        .route("/api/login", post(login))
        .with_state(stub);
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    HttpBookApi::new(format!("http://{addr}"), HttpTimeouts::default()).unwrap()
}

fn authed() -> Session {
    Session::with_token(TOKEN)
}

fn dune() -> BookInput {
    BookInput {
        title: "Dune".to_owned(),
        author: "Herbert".to_owned(),
        year: Some(1965),
        genre: Some("SciFi".to_owned()),
    }
}

// =============================================================================
// PATHS
// =============================================================================

#[test]
fn book_path_keeps_api_prefix() {
    assert_eq!(book_path(3), "/api/books/3");
    assert_eq!(BOOKS_PATH, "/api/books");
    assert_eq!(LOGIN_PATH, "/api/login");
}

#[test]
fn parse_books_reports_payload_errors() {
    let err = parse_books(r#"{"books": []}"#).unwrap_err();
    assert!(matches!(err, CatalogError::Transport(ref msg) if msg.contains("invalid books payload")));
    assert!(parse_books("[]").unwrap().is_empty());
}

// =============================================================================
// HTTP ROUND TRIPS
// =============================================================================

#[tokio::test]
async fn list_books_sends_bearer_and_keeps_order() {
    let stub = Stub::seeded();
    let api = spawn(stub.clone()).await;

    let books = api.list_books(&authed()).await.unwrap();
    assert_eq!(books.iter().map(|b| b.id).collect::<Vec<_>>(), vec![1, 2]);
    assert_eq!(books[1].year, Some(1969));
    assert_eq!(
        stub.auth_headers.lock().unwrap().as_slice(),
        &[Some(format!("Bearer {TOKEN}"))]
    );
}

#[tokio::test]
async fn list_books_without_token_sends_no_header() {
    let stub = Stub::seeded();
    let api = spawn(stub.clone()).await;

    let err = api.list_books(&Session::anonymous()).await.unwrap_err();
    assert!(err.is_unauthorized());
    assert_eq!(stub.auth_headers.lock().unwrap().as_slice(), &[None]);
}

#[tokio::test]
async fn create_book_returns_echoed_record() {
    let api = spawn(Stub::seeded()).await;
    let created = api.create_book(&authed(), &dune()).await.unwrap().unwrap();
    assert_eq!(created.id, 3);
    assert_eq!(created.title, "Dune");
    assert_eq!(created.year, Some(1965));
}

#[tokio::test]
async fn create_book_tolerates_non_record_response() {
    let stub = Stub { echo_created: false, ..Stub::seeded() };
    let api = spawn(stub.clone()).await;
    assert_eq!(api.create_book(&authed(), &dune()).await.unwrap(), None);
    assert_eq!(stub.books.lock().unwrap().len(), 3);
}

#[tokio::test]
async fn update_book_targets_prefixed_path() {
    let stub = Stub::seeded();
    let api = spawn(stub.clone()).await;
    let input = BookInput { year: Some(1816), ..dune() };

    api.update_book(&authed(), 1, &input).await.unwrap();
    let stored = stub.books.lock().unwrap()[0].clone();
    assert_eq!(stored["title"], "Dune");
    assert_eq!(stored["year"], 1816);

    let err = api.update_book(&authed(), 99, &input).await.unwrap_err();
    assert!(err.is_not_found());
}

#[tokio::test]
async fn delete_book_accepts_empty_body_and_reports_missing() {
    let stub = Stub::seeded();
    let api = spawn(stub.clone()).await;

    api.delete_book(&authed(), 2).await.unwrap();
    assert_eq!(stub.books.lock().unwrap().len(), 1);

    let err = api.delete_book(&authed(), 2).await.unwrap_err();
    assert!(err.is_not_found());
}

#[tokio::test]
async fn login_returns_token_or_auth_error() {
    let api = spawn(Stub::default()).await;

    assert_eq!(api.login("reader@example.com", "hunter2").await.unwrap(), TOKEN);

    let err = api.login("reader@example.com", "wrong").await.unwrap_err();
    assert!(matches!(err, CatalogError::Auth(_)));
}

#[tokio::test]
async fn unreachable_service_is_transport_error() {
    let api = HttpBookApi::new("http://127.0.0.1:1", HttpTimeouts { request_secs: 2, connect_secs: 1 }).unwrap();
    let err = api.list_books(&authed()).await.unwrap_err();
    assert!(matches!(err, CatalogError::Transport(_)));

    let err = api.login("a@b.c", "x").await.unwrap_err();
    assert!(matches!(err, CatalogError::Auth(_)));
}
