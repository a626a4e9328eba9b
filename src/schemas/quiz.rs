use serde::{Deserialize, Serialize};

use crate::models::ALLOWED_ANSWERS;

pub(crate) const UPLOAD_SUCCESS_MESSAGE: &str = "Archivo subido y procesado correctamente.";

#[derive(Debug, Serialize)]
pub(crate) struct UploadResponse {
    pub(crate) message: String,
    pub(crate) total_preguntas: usize,
}

#[derive(Debug, Deserialize)]
pub(crate) struct SubmitAnswersRequest {
    #[serde(default = "example_answers")]
    pub(crate) respuestas: Vec<String>,
}

/// Forty answers cycling a..d; only a documentation default, not a required
/// length.
fn example_answers() -> Vec<String> {
    ALLOWED_ANSWERS.iter().cycle().take(40).map(|answer| answer.to_string()).collect()
}
