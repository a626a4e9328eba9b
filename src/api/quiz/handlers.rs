use axum::{
    extract::{
        multipart::MultipartRejection,
        rejection::JsonRejection,
        Multipart, State,
    },
    http::header,
    response::{IntoResponse, Response},
    Json,
};

use crate::api::errors::ApiError;
use crate::core::state::AppState;
use crate::schemas::quiz::{SubmitAnswersRequest, UploadResponse, UPLOAD_SUCCESS_MESSAGE};
use crate::services::report::{REPORT_DOWNLOAD_NAME, XLSX_CONTENT_TYPE};
use crate::services::{answer_key, grading};

pub(super) async fn upload_answer_key(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<UploadResponse>, ApiError> {
    let mut multipart =
        multipart.map_err(|rejection| ApiError::BadRequest(rejection.body_text()))?;
    let max_bytes = state.settings().storage().max_upload_bytes();
    let mut file_bytes: Option<Vec<u8>> = None;
    let mut filename: Option<String> = None;

    while let Some(mut field) = multipart
        .next_field()
        .await
        .map_err(|_| ApiError::BadRequest("Invalid multipart data".to_string()))?
    {
        if field.name() != Some("file") {
            continue;
        }

        filename = field.file_name().map(|s| s.to_string());
        let mut bytes = Vec::new();
        while let Some(chunk) = field
            .chunk()
            .await
            .map_err(|_| ApiError::BadRequest("Failed to read file".to_string()))?
        {
            if bytes.len() + chunk.len() > max_bytes {
                return Err(ApiError::BadRequest(format!(
                    "File size exceeds {}MB limit",
                    state.settings().storage().max_upload_size_mb
                )));
            }
            bytes.extend_from_slice(&chunk);
        }
        file_bytes = Some(bytes);
    }

    let file_bytes =
        file_bytes.ok_or_else(|| ApiError::BadRequest("File is required".to_string()))?;

    tracing::info!(
        filename = filename.as_deref().unwrap_or("-"),
        size = file_bytes.len(),
        "Answer key upload received"
    );

    let summary = answer_key::ingest(state.answer_keys(), file_bytes).await?;

    tracing::info!(
        total_questions = summary.total_questions,
        columns = ?summary.columns,
        sha256 = %summary.sha256,
        "Answer key replaced"
    );

    Ok(Json(UploadResponse {
        message: UPLOAD_SUCCESS_MESSAGE.to_string(),
        total_preguntas: summary.total_questions,
    }))
}

pub(super) async fn submit_answers(
    State(state): State<AppState>,
    payload: Result<Json<SubmitAnswersRequest>, JsonRejection>,
) -> Result<Response, ApiError> {
    let Json(request) = payload.map_err(|rejection| ApiError::BadRequest(rejection.body_text()))?;

    let graded = grading::grade_submission(
        state.answer_keys(),
        &state.settings().storage().report_path(),
        request.respuestas,
    )
    .await?;

    tracing::info!(
        total_questions = graded.report.total_questions,
        missed = graded.report.missed.len(),
        correct = graded.report.correct(),
        "Submission graded"
    );

    let disposition = format!("attachment; filename=\"{REPORT_DOWNLOAD_NAME}\"");
    let headers = [
        (header::CONTENT_TYPE, XLSX_CONTENT_TYPE.to_string()),
        (header::CONTENT_DISPOSITION, disposition),
    ];
    Ok((headers, graded.workbook).into_response())
}
