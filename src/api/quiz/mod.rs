mod handlers;

use axum::{routing::post, Router};

use crate::core::state::AppState;

pub(crate) fn router() -> Router<AppState> {
    Router::new()
        .route("/subir_excel/", post(handlers::upload_answer_key))
        .route("/subir_excel", post(handlers::upload_answer_key))
        .route("/enviar_respuestas/", post(handlers::submit_answers))
        .route("/enviar_respuestas", post(handlers::submit_answers))
}
