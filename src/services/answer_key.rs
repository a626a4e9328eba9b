//! Turns an uploaded workbook into the current answer key.

use std::io::Cursor;

use calamine::{open_workbook_auto_from_rs, Data, Reader};
use sha2::{Digest, Sha256};

use crate::core::metrics;
use crate::models::{AnswerKey, AnswerKeyRow, KeyColumn};
use crate::repositories::answer_keys::AnswerKeyStore;
use crate::services::errors::QuizError;

#[derive(Debug, Clone)]
pub(crate) struct IngestSummary {
    pub(crate) total_questions: usize,
    pub(crate) columns: Vec<KeyColumn>,
    pub(crate) sha256: String,
}

/// Lowercases and drops every character outside `a`..`z`.
///
/// Matching against the key columns is exact after this step, so
/// `"Respuesta_Correcta"` becomes `"respuestacorrecta"` and is not an answer
/// column.
pub(crate) fn normalize_header(raw: &str) -> String {
    raw.to_lowercase().chars().filter(|c| c.is_ascii_lowercase()).collect()
}

/// Parses the first worksheet of `bytes` into an answer key.
///
/// Columns other than `pregunta` and `respuesta` are dropped. A sheet with
/// neither column yields a key without columns rather than an error.
pub(crate) fn parse_workbook(bytes: &[u8]) -> Result<AnswerKey, QuizError> {
    if bytes.is_empty() {
        return Err(QuizError::invalid("uploaded file is empty"));
    }

    let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes.to_vec()))
        .map_err(|err| QuizError::invalid(format!("could not read spreadsheet: {err}")))?;

    let sheet_name = workbook
        .sheet_names()
        .first()
        .cloned()
        .ok_or_else(|| QuizError::invalid("spreadsheet has no worksheets"))?;

    let range = workbook
        .worksheet_range(&sheet_name)
        .map_err(|err| QuizError::invalid(format!("could not read sheet {sheet_name}: {err}")))?;

    let mut rows = range.rows();
    let Some(header) = rows.next() else {
        return Ok(AnswerKey::default());
    };

    let headers: Vec<String> = header.iter().map(|cell| normalize_header(&cell_text(cell))).collect();
    let selected: Vec<(KeyColumn, usize)> = KeyColumn::ALL
        .into_iter()
        .filter_map(|column| {
            headers.iter().position(|name| name == column.header()).map(|index| (column, index))
        })
        .collect();

    let mut key_rows = Vec::new();
    for row in rows {
        if row.iter().all(|cell| cell_text(cell).trim().is_empty()) {
            continue;
        }

        let mut key_row = AnswerKeyRow::default();
        for &(column, index) in &selected {
            let text = row.get(index).map(cell_text).unwrap_or_default();
            let value = match column {
                KeyColumn::Question => text,
                KeyColumn::Answer => text.to_lowercase(),
            };
            key_row.set_value(column, value);
        }
        key_rows.push(key_row);
    }

    Ok(AnswerKey::new(selected.into_iter().map(|(column, _)| column).collect(), key_rows))
}

/// Parses `bytes` and replaces the stored answer key with the result.
pub(crate) async fn ingest(
    store: &dyn AnswerKeyStore,
    bytes: Vec<u8>,
) -> Result<IngestSummary, QuizError> {
    let sha256 = hex::encode(Sha256::digest(&bytes));

    let key = tokio::task::spawn_blocking(move || parse_workbook(&bytes))
        .await
        .map_err(|err| QuizError::storage(err, "spreadsheet parser task failed"))??;

    let missing: Vec<&str> = KeyColumn::ALL
        .into_iter()
        .filter(|column| !key.has_column(*column))
        .map(KeyColumn::header)
        .collect();
    if !missing.is_empty() {
        tracing::warn!(
            missing = ?missing,
            "Uploaded spreadsheet lacks key columns; grading will fail until a complete key is uploaded"
        );
    }

    store.save(&key).await?;
    metrics::record_ingest(key.len());

    Ok(IngestSummary { total_questions: key.len(), columns: key.columns().to_vec(), sha256 })
}

fn cell_text(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(value) => value.clone(),
        other => other.to_string(),
    }
}
