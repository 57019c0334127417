use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post, put};
use axum::{Json, Router};
use ledgerdesk_client::{HttpTransport, UNEXPECTED_FORMAT_MESSAGE};
use ledgerdesk_config::UpdateMethod;
use ledgerdesk_core::{
    Credential, EntityConfig, ErrorCode, PageRequest, Record, RecordId, RequestStatus, ResourceStore,
    ResourceTransport, StaticCredential, GENERIC_ERROR_MESSAGE,
};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Requests seen by the fake backend, as "METHOD path ... auth=..."
type Seen = Arc<Mutex<Vec<String>>>;

fn auth(headers: &HeaderMap) -> String {
    headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("-")
        .to_string()
}

async fn list_divisions(
    State(seen): State<Seen>,
    headers: HeaderMap,
    Query(query): Query<HashMap<String, String>>,
) -> Json<Value> {
    let page = query.get("page").cloned().unwrap_or_default();
    let limit = query.get("limit").cloned().unwrap_or_default();
    seen.lock()
        .unwrap()
        .push(format!("GET divisions page={} limit={} auth={}", page, limit, auth(&headers)));
    Json(json!({
        "success": true,
        "data": {"items": [{"id": 1, "name": "Finance"}, {"id": 2, "name": "Audit"}], "total": 42}
    }))
}

async fn create_division(State(seen): State<Seen>, headers: HeaderMap, Json(mut body): Json<Value>) -> Json<Value> {
    let content_type = headers
        .get("content-type")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("-")
        .to_string();
    seen.lock().unwrap().push(format!("POST divisions type={}", content_type));
    let name = body["name"].as_str().unwrap_or_default().trim().to_string();
    body["id"] = json!(99);
    body["name"] = json!(name);
    Json(json!({"success": true, "data": body}))
}

async fn update_division(State(seen): State<Seen>, Path(id): Path<String>, Json(mut body): Json<Value>) -> Json<Value> {
    seen.lock().unwrap().push(format!("PUT divisions/{}", id));
    body["id"] = json!(id.parse::<i64>().unwrap_or_default());
    Json(json!({"success": true, "data": body}))
}

async fn delete_division(State(seen): State<Seen>, Path(id): Path<String>) -> Response {
    seen.lock().unwrap().push(format!("DELETE divisions/{}", id));
    if id == "404" {
        return (StatusCode::NOT_FOUND, Json(json!({"success": false, "message": "Division not found"}))).into_response();
    }
    Json(json!({"success": true, "message": "Deleted"})).into_response()
}

async fn patch_role(State(seen): State<Seen>, Path(id): Path<String>, Json(body): Json<Value>) -> Json<Value> {
    seen.lock().unwrap().push(format!("PATCH roles/{}", id));
    Json(json!({"success": true, "data": {"id": id, "role_name": body["role_name"]}}))
}

async fn list_roles() -> Json<Value> {
    // Some endpoints return the collection as a bare array
    Json(json!({"success": true, "data": [{"id": "r1", "role_name": "Admin"}]}))
}

async fn expired() -> Response {
    (StatusCode::UNAUTHORIZED, Json(json!({"success": false, "message": "Token expired"}))).into_response()
}

async fn rejected_project() -> Response {
    (StatusCode::OK, Json(json!({"success": false, "message": "Project code already used"}))).into_response()
}

async fn invalid_project() -> Response {
    (StatusCode::UNPROCESSABLE_ENTITY, Json(json!({"success": false}))).into_response()
}

async fn broken() -> &'static str {
    "<html>maintenance</html>"
}

async fn crashed() -> StatusCode {
    StatusCode::INTERNAL_SERVER_ERROR
}

async fn spawn_backend() -> (String, Seen) {
    let seen: Seen = Arc::default();
    let router = Router::new()
        .route("/api/v1/divisions", get(list_divisions).post(create_division))
        .route("/api/v1/divisions/:id", put(update_division).delete(delete_division))
        .route("/api/v1/roles", get(list_roles))
        .route("/api/v1/roles/:id", axum::routing::patch(patch_role))
        .route("/api/v1/expired", get(expired))
        .route("/api/v1/projects", post(rejected_project))
        .route("/api/v1/projects/:id", put(invalid_project))
        .route("/api/v1/broken", get(broken))
        .route("/api/v1/crashed", get(crashed))
        .with_state(seen.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind listener");
    let addr = listener.local_addr().expect("addr");
    tokio::spawn(async move {
        axum::serve(listener, router).await.expect("serve");
    });
    (format!("http://{}/api/v1", addr), seen)
}

fn transport(base_url: &str) -> HttpTransport {
    HttpTransport::new(base_url, Duration::from_secs(5)).expect("transport")
}

fn credential() -> Credential {
    Credential::bearer("secret").expect("credential")
}

fn record(value: Value) -> Record {
    Record::from_value(value).expect("object")
}

#[tokio::test]
async fn list_sends_page_limit_and_bearer() {
    let (base, seen) = spawn_backend().await;
    let entity = EntityConfig::builder("divisions").build();

    let page = transport(&base)
        .list(&entity, &credential(), PageRequest::new(3, 20))
        .await
        .expect("list");

    assert_eq!(page.items.len(), 2);
    assert_eq!(page.total, Some(42));
    assert_eq!(page.items[1].text("name"), "Audit");
    assert_eq!(
        seen.lock().unwrap().clone(),
        vec!["GET divisions page=3 limit=20 auth=Bearer secret"]
    );
}

#[tokio::test]
async fn list_accepts_bare_array_data() {
    let (base, _) = spawn_backend().await;
    let entity = EntityConfig::builder("roles").build();
    let page = transport(&base)
        .list(&entity, &credential(), PageRequest::default())
        .await
        .expect("list");
    assert_eq!(page.items.len(), 1);
    assert_eq!(page.total, None);
}

#[tokio::test]
async fn create_returns_server_representation() {
    let (base, seen) = spawn_backend().await;
    let entity = EntityConfig::builder("divisions").build();

    let created = transport(&base)
        .create(&entity, &credential(), &record(json!({"name": "  Treasury  "})))
        .await
        .expect("create");

    assert_eq!(created.id("id"), Some(RecordId::from(99)));
    assert_eq!(created.text("name"), "Treasury");
    assert_eq!(seen.lock().unwrap().clone(), vec!["POST divisions type=application/json"]);
}

#[tokio::test]
async fn update_uses_entity_method() {
    let (base, seen) = spawn_backend().await;
    let transport = transport(&base);

    let divisions = EntityConfig::builder("divisions").build();
    let updated = transport
        .update(&divisions, &credential(), &RecordId::from(7), &record(json!({"name": "Ops"})))
        .await
        .expect("put");
    assert_eq!(updated.id("id"), Some(RecordId::from("7")));

    let roles = EntityConfig::builder("roles").update_method(UpdateMethod::Patch).build();
    let patched = transport
        .update(&roles, &credential(), &RecordId::from("r1"), &record(json!({"role_name": "Owner"})))
        .await
        .expect("patch");
    assert_eq!(patched.text("role_name"), "Owner");

    assert_eq!(seen.lock().unwrap().clone(), vec!["PUT divisions/7", "PATCH roles/r1"]);
}

#[tokio::test]
async fn delete_maps_not_found_to_fetch_error() {
    let (base, _) = spawn_backend().await;
    let transport = transport(&base);
    let entity = EntityConfig::builder("divisions").build();

    transport
        .delete(&entity, &credential(), &RecordId::from(3))
        .await
        .expect("delete");

    let err = transport
        .delete(&entity, &credential(), &RecordId::from(404))
        .await
        .unwrap_err();
    assert_eq!(err.code(), ErrorCode::FetchFailed);
    assert_eq!(err.user_message(), "Division not found");
}

#[tokio::test]
async fn unauthorized_is_auth_error() {
    let (base, _) = spawn_backend().await;
    let entity = EntityConfig::builder("expired").build();
    let err = transport(&base)
        .list(&entity, &credential(), PageRequest::default())
        .await
        .unwrap_err();
    assert!(err.is_auth());
    assert_eq!(err.user_message(), "Token expired");
}

#[tokio::test]
async fn write_rejections_are_validation_errors() {
    let (base, _) = spawn_backend().await;
    let transport = transport(&base);
    let entity = EntityConfig::builder("projects").build();

    let err = transport
        .create(&entity, &credential(), &record(json!({"code": "P1"})))
        .await
        .unwrap_err();
    assert_eq!(err.code(), ErrorCode::ValidationFailed);
    assert_eq!(err.user_message(), "Project code already used");

    let err = transport
        .update(&entity, &credential(), &RecordId::from(1), &record(json!({"code": ""})))
        .await
        .unwrap_err();
    assert_eq!(err.code(), ErrorCode::ValidationFailed);
    assert_eq!(err.user_message(), GENERIC_ERROR_MESSAGE);
}

#[tokio::test]
async fn malformed_and_failed_responses_are_fetch_errors() {
    let (base, _) = spawn_backend().await;
    let transport = transport(&base);

    let err = transport
        .list(&EntityConfig::builder("broken").build(), &credential(), PageRequest::default())
        .await
        .unwrap_err();
    assert_eq!(err.code(), ErrorCode::FetchFailed);
    assert_eq!(err.user_message(), UNEXPECTED_FORMAT_MESSAGE);

    let err = transport
        .list(&EntityConfig::builder("crashed").build(), &credential(), PageRequest::default())
        .await
        .unwrap_err();
    assert_eq!(err.user_message(), GENERIC_ERROR_MESSAGE);
}

#[tokio::test]
async fn unreachable_backend_is_fetch_error() {
    // Bind then drop to get a port with nothing listening
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("addr");
    drop(listener);

    let err = transport(&format!("http://{}/api/v1", addr))
        .list(&EntityConfig::builder("divisions").build(), &credential(), PageRequest::default())
        .await
        .unwrap_err();
    assert_eq!(err.code(), ErrorCode::FetchFailed);
    assert_eq!(err.user_message(), GENERIC_ERROR_MESSAGE);
}

#[tokio::test]
async fn store_over_http_fetches_and_guards_credentials() {
    let (base, seen) = spawn_backend().await;
    let http = Arc::new(transport(&base));

    let store = ResourceStore::new(
        EntityConfig::builder("divisions").build(),
        http.clone(),
        Arc::new(StaticCredential::from_token(Some("secret".into()))),
    );
    let records = store.fetch_page(1, 20).await.expect("fetch");
    assert_eq!(records.len(), 2);
    assert_eq!(store.status(), RequestStatus::Success);
    assert_eq!(store.total(), Some(42));

    let anonymous = ResourceStore::new(
        EntityConfig::builder("divisions").build(),
        http,
        Arc::new(StaticCredential::none()),
    );
    let err = anonymous.delete(&RecordId::from(1)).await.unwrap_err();
    assert!(err.is_auth());
    assert_eq!(seen.lock().unwrap().len(), 1);
}
