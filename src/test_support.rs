use std::io::Cursor;
use std::path::PathBuf;
use std::sync::{Arc, OnceLock};

use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request},
    Router,
};
use calamine::{open_workbook_auto_from_rs, Data, Reader};
use rust_xlsxwriter::Workbook;
use tokio::sync::{Mutex, OwnedMutexGuard};
use uuid::Uuid;

use crate::api;
use crate::core::{config::Settings, state::AppState};

const MULTIPART_BOUNDARY: &str = "quiz-grader-test-boundary";

const QUIZ_ENV_VARS: &[&str] = &[
    "QUIZ_HOST",
    "QUIZ_PORT",
    "QUIZ_ENV",
    "ENVIRONMENT",
    "PROJECT_NAME",
    "VERSION",
    "BACKEND_CORS_ORIGINS",
    "ANSWER_KEY_BACKEND",
    "QUIZ_DATA_DIR",
    "ANSWER_KEY_FILE",
    "REPORT_FILE",
    "MAX_UPLOAD_SIZE_MB",
    "QUIZ_LOG_LEVEL",
    "QUIZ_LOG_JSON",
    "PROMETHEUS_ENABLED",
];

pub(crate) struct TestContext {
    pub(crate) state: AppState,
    pub(crate) app: Router,
    pub(crate) data_dir: PathBuf,
    _guard: OwnedMutexGuard<()>,
}

impl Drop for TestContext {
    fn drop(&mut self) {
        let _ = std::fs::remove_dir_all(&self.data_dir);
    }
}

pub(crate) async fn env_lock() -> OwnedMutexGuard<()> {
    static LOCK: OnceLock<Arc<Mutex<()>>> = OnceLock::new();
    let lock = LOCK.get_or_init(|| Arc::new(Mutex::new(()))).clone();
    lock.lock_owned().await
}

pub(crate) fn clear_quiz_env() {
    for key in QUIZ_ENV_VARS {
        std::env::remove_var(key);
    }
}

/// Fresh, empty directory under the system temp dir.
pub(crate) fn scratch_dir() -> PathBuf {
    let dir = std::env::temp_dir().join(format!("quiz-grader-{}", Uuid::new_v4()));
    std::fs::create_dir_all(&dir).expect("create scratch dir");
    dir
}

pub(crate) async fn setup_test_context() -> TestContext {
    setup_test_context_with(&[]).await
}

pub(crate) async fn setup_test_context_with(vars: &[(&str, &str)]) -> TestContext {
    let guard = env_lock().await;
    clear_quiz_env();

    let data_dir = scratch_dir();
    std::env::set_var("QUIZ_ENV", "test");
    std::env::set_var("QUIZ_DATA_DIR", &data_dir);
    for (key, value) in vars {
        std::env::set_var(key, value);
    }

    let settings = Settings::load().expect("settings");
    let state = AppState::from_settings(settings);
    let app = api::router::router(state.clone());

    TestContext { state, app, data_dir, _guard: guard }
}

/// Builds an xlsx workbook with `headers` on the first row. Empty strings
/// are left as blank cells.
pub(crate) fn workbook_bytes(headers: &[&str], rows: &[&[&str]]) -> Vec<u8> {
    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();

    for (col, header) in headers.iter().enumerate() {
        worksheet.write_string(0, col as u16, *header).expect("write header");
    }
    for (row_index, row) in rows.iter().enumerate() {
        for (col, value) in row.iter().enumerate() {
            if value.is_empty() {
                continue;
            }
            worksheet
                .write_string(row_index as u32 + 1, col as u16, *value)
                .expect("write cell");
        }
    }

    workbook.save_to_buffer().expect("workbook bytes")
}

/// Cells of the first worksheet as text, row by row.
pub(crate) fn read_sheet(bytes: &[u8]) -> Vec<Vec<String>> {
    let mut workbook =
        open_workbook_auto_from_rs(Cursor::new(bytes.to_vec())).expect("open workbook");
    let sheet = workbook.sheet_names().first().cloned().expect("first sheet");
    let range = workbook.worksheet_range(&sheet).expect("sheet range");

    range
        .rows()
        .map(|row| {
            row.iter()
                .map(|cell| match cell {
                    Data::Empty => String::new(),
                    other => other.to_string(),
                })
                .collect()
        })
        .collect()
}

pub(crate) fn multipart_request(
    uri: &str,
    field: &str,
    filename: &str,
    bytes: &[u8],
) -> Request<Body> {
    let mut body = Vec::new();
    body.extend_from_slice(format!("--{MULTIPART_BOUNDARY}\r\n").as_bytes());
    body.extend_from_slice(
        format!("Content-Disposition: form-data; name=\"{field}\"; filename=\"{filename}\"\r\n")
            .as_bytes(),
    );
    body.extend_from_slice(b"Content-Type: application/octet-stream\r\n\r\n");
    body.extend_from_slice(bytes);
    body.extend_from_slice(format!("\r\n--{MULTIPART_BOUNDARY}--\r\n").as_bytes());

    Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={MULTIPART_BOUNDARY}"),
        )
        .body(Body::from(body))
        .expect("multipart request")
}

pub(crate) fn json_request(method: Method, uri: &str, body: serde_json::Value) -> Request<Body> {
    let bytes = serde_json::to_vec(&body).expect("serialize body");
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(bytes))
        .expect("request body")
}

pub(crate) async fn read_bytes(response: axum::response::Response<Body>) -> Vec<u8> {
    to_bytes(response.into_body(), usize::MAX).await.expect("response body").to_vec()
}

pub(crate) async fn read_json(response: axum::response::Response<Body>) -> serde_json::Value {
    let body = read_bytes(response).await;
    serde_json::from_slice(&body).unwrap_or_else(|err| {
        let body_text = String::from_utf8_lossy(&body);
        panic!("json parse: {err}; body: {body_text}");
    })
}
