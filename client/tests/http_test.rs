//! HttpTransport against a local axum server.

use axum::{
    extract::{Multipart, Query, State},
    http::{HeaderMap, StatusCode},
    routing::get,
    Json, Router,
};
use kinbase_client::{Auth, Config, Database, Error, HttpTransport};
use kinbase_engine::{PendingUpload, Record};
use serde::Deserialize;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

const TOKEN: &str = "test-token";

type Reply = Result<Json<Value>, (StatusCode, Json<Value>)>;

/// Request bodies the server received, in order.
#[derive(Clone, Default)]
struct Seen(Arc<Mutex<Vec<Value>>>);

impl Seen {
    fn bodies(&self) -> Vec<Value> {
        self.0.lock().unwrap().clone()
    }
}

#[derive(Deserialize)]
struct FileKey {
    #[serde(rename = "fileKey")]
    file_key: String,
}

fn error(status: StatusCode, code: &str, message: &str) -> (StatusCode, Json<Value>) {
    (
        status,
        Json(json!({"id": "err-1", "code": code, "message": message})),
    )
}

fn authorize(headers: &HeaderMap) -> Result<(), (StatusCode, Json<Value>)> {
    match headers.get("x-cybozu-api-token") {
        Some(value) if value == TOKEN => Ok(()),
        _ => Err(error(StatusCode::UNAUTHORIZED, "CB_WA01", "bad token")),
    }
}

fn header(headers: &HeaderMap, name: &str) -> String {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string()
}

/// Echo the request back as a single record.
async fn select(headers: HeaderMap, Query(params): Query<HashMap<String, String>>) -> Reply {
    authorize(&headers)?;
    let text = |value: String| json!({"type": "SINGLE_LINE_TEXT", "value": value});
    Ok(Json(json!({
        "records": [{
            "$id": {"type": "__ID__", "value": "1"},
            "query": text(params.get("query").cloned().unwrap_or_default()),
            "field0": text(params.get("fields[0]").cloned().unwrap_or_default()),
            "agent": text(header(&headers, "user-agent")),
            "extra": text(header(&headers, "x-extra"))
        }],
        "totalCount": params.get("totalCount").map(|_| "1")
    })))
}

async fn insert(State(seen): State<Seen>, headers: HeaderMap, body: String) -> Reply {
    authorize(&headers)?;
    if header(&headers, "content-type") != "application/json" {
        return Err(error(StatusCode::BAD_REQUEST, "CB_IJ01", "not json"));
    }
    let body: Value = serde_json::from_str(&body)
        .map_err(|_| error(StatusCode::BAD_REQUEST, "CB_IJ01", "bad json"))?;
    let count = body["records"].as_array().map(Vec::len).unwrap_or(0);
    seen.0.lock().unwrap().push(body);

    let ids: Vec<String> = (1..=count).map(|i| (100 + i).to_string()).collect();
    Ok(Json(json!({"ids": ids, "revisions": vec!["1"; count]})))
}

async fn update(headers: HeaderMap) -> Reply {
    authorize(&headers)?;
    Err(error(StatusCode::CONFLICT, "GAIA_CO02", "revision mismatch"))
}

async fn delete(State(seen): State<Seen>, headers: HeaderMap, body: String) -> Reply {
    authorize(&headers)?;
    let body: Value = serde_json::from_str(&body)
        .map_err(|_| error(StatusCode::BAD_REQUEST, "CB_IJ01", "bad json"))?;
    seen.0.lock().unwrap().push(body);
    Ok(Json(json!({})))
}

/// Key encodes what the server saw: `<name>|<content type>|<size>`.
async fn upload(headers: HeaderMap, mut multipart: Multipart) -> Reply {
    authorize(&headers)?;
    while let Some(field) = multipart.next_field().await.unwrap() {
        if field.name() != Some("file") {
            continue;
        }
        let name = field.file_name().unwrap_or_default().to_string();
        let content_type = field.content_type().unwrap_or_default().to_string();
        let data = field.bytes().await.unwrap();
        if name.starts_with("reject") {
            return Err(error(StatusCode::BAD_REQUEST, "CB_VA01", "file rejected"));
        }
        return Ok(Json(json!({
            "fileKey": format!("{}|{}|{}", name, content_type, data.len())
        })));
    }
    Err(error(StatusCode::BAD_REQUEST, "CB_VA01", "no file part"))
}

async fn download(headers: HeaderMap, Query(key): Query<FileKey>) -> Result<String, StatusCode> {
    authorize(&headers).map_err(|_| StatusCode::UNAUTHORIZED)?;
    Ok(format!("content of {}", key.file_key))
}

async fn guest_select(headers: HeaderMap) -> Reply {
    authorize(&headers)?;
    Ok(Json(json!({"records": [], "totalCount": "0"})))
}

async fn start_server() -> (String, Seen) {
    let seen = Seen::default();
    let app = Router::new()
        .route(
            "/k/v1/records.json",
            get(select).post(insert).put(update).delete(delete),
        )
        .route("/k/v1/file.json", get(download).post(upload))
        .route("/k/guest/7/v1/records.json", get(guest_select))
        .with_state(seen.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    (format!("http://{}", addr), seen)
}

fn database(base: &str) -> Database<HttpTransport> {
    let config = Config::new(base, Auth::ApiToken(TOKEN.into())).with_header("X-Extra", "42");
    Database::new(HttpTransport::new(config).unwrap())
}

#[tokio::test]
async fn select_encodes_query_and_headers() {
    let (base, _) = start_server().await;
    let db = database(&base);

    let mut rs = db
        .select(1, "name = \"a&b\" order by $id desc", &["name"])
        .await
        .unwrap();

    assert!(rs.next());
    assert_eq!(rs.id().unwrap(), Some(1));
    assert_eq!(
        rs.get_string("query").unwrap(),
        Some("name = \"a&b\" order by $id desc")
    );
    assert_eq!(rs.get_string("field0").unwrap(), Some("name"));
    assert_eq!(rs.get_string("extra").unwrap(), Some("42"));
    assert!(rs
        .get_string("agent")
        .unwrap()
        .unwrap()
        .starts_with("kinbase-client/"));
    assert_eq!(rs.total_count(), None);

    let rs = db.select_with_total_count(1, "", &[]).await.unwrap();
    assert_eq!(rs.total_count(), Some(1));
}

#[tokio::test]
async fn wrong_token_is_a_transport_error() {
    let (base, _) = start_server().await;
    let config = Config::new(&base, Auth::ApiToken("nope".into()));
    let db = Database::new(HttpTransport::new(config).unwrap());

    let err = db.select(1, "", &[]).await.unwrap_err();
    assert_eq!(err.status(), Some(401));
    match err {
        Error::Transport {
            error: Some(body), ..
        } => assert_eq!(body.code.as_deref(), Some("CB_WA01")),
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn insert_uploads_file_from_path() {
    let (base, seen) = start_server().await;
    let db = database(&base);

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("report.csv");
    std::fs::write(&path, "a,b\n1,2\n").unwrap();

    let mut record = Record::new();
    record
        .set_text("title", "with file")
        .set_file("attachment", PendingUpload::from_path(&path, Some("text/csv".into())));

    let id = db.insert(1, &mut record).await.unwrap();
    assert_eq!(id, 101);

    let bodies = seen.bodies();
    assert_eq!(
        bodies[0]["records"][0]["attachment"],
        json!({"value": [{"fileKey": "report.csv|text/csv|8"}]})
    );
}

#[tokio::test]
async fn upload_bytes_with_default_content_type() {
    let (base, _) = start_server().await;
    let db = database(&base);

    let key = db
        .upload_file(&PendingUpload::from_bytes(vec![0u8; 16], "blob.bin", None))
        .await
        .unwrap();
    assert_eq!(key, "blob.bin|application/octet-stream|16");
}

#[tokio::test]
async fn rejected_upload_aborts_insert() {
    let (base, seen) = start_server().await;
    let db = database(&base);

    let mut record = Record::new();
    record.set_file(
        "attachment",
        PendingUpload::from_bytes(b"x".to_vec(), "reject.txt", None),
    );

    let err = db.insert(1, &mut record).await.unwrap_err();
    match err {
        Error::Upload { file_name, reason } => {
            assert_eq!(file_name, "reject.txt");
            assert!(reason.contains("400"), "reason: {}", reason);
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert!(seen.bodies().is_empty());
}

#[tokio::test]
async fn missing_upload_file_is_an_upload_error() {
    let (base, _) = start_server().await;
    let db = database(&base);

    let err = db
        .upload_file(&PendingUpload::from_path("/no/such/file.txt", None))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Upload { ref file_name, .. } if file_name == "file.txt"));
}

#[tokio::test]
async fn update_conflict() {
    let (base, _) = start_server().await;
    let db = database(&base);

    let mut record = Record::with_id_and_revision(3, 1);
    record.set_text("status", "done");

    let err = db.update_record(1, &mut record).await.unwrap_err();
    assert_eq!(err.status(), Some(409));
    assert!(err.to_string().contains("revision mismatch"));
}

#[tokio::test]
async fn delete_sends_body() {
    let (base, seen) = start_server().await;
    let db = database(&base);

    db.delete_records(1, &[Record::with_id_and_revision(5, 2), Record::with_id(6)])
        .await
        .unwrap();
    assert_eq!(
        seen.bodies()[0],
        json!({"app": 1, "ids": [5, 6], "revisions": [2, -1]})
    );
}

#[tokio::test]
async fn download_file() {
    let (base, _) = start_server().await;
    let db = database(&base);

    let bytes = db.transport().download("abc-123").await.unwrap();
    assert_eq!(bytes, b"content of abc-123");
}

#[tokio::test]
async fn guest_space_path() {
    let (base, _) = start_server().await;
    let config = Config::new(&base, Auth::ApiToken(TOKEN.into())).with_guest_space(7);
    let db = Database::new(HttpTransport::new(config).unwrap());

    let rs = db.select_with_total_count(1, "", &[]).await.unwrap();
    assert_eq!(rs.size(), 0);
    assert_eq!(rs.total_count(), Some(0));
}
