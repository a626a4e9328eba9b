use std::path::Path;

use crate::core::metrics;
use crate::models::{AnswerKey, KeyColumn, MismatchReport, MissedQuestion, ALLOWED_ANSWERS};
use crate::repositories::answer_keys::AnswerKeyStore;
use crate::services::errors::{QuizError, COUNT_MISMATCH, INVALID_ANSWER};
use crate::services::report::{render_report, write_report};

#[derive(Debug)]
pub(crate) struct GradedReport {
    pub(crate) report: MismatchReport,
    pub(crate) workbook: Vec<u8>,
}

/// Compares `submitted` position by position against `key`.
///
/// Checks run in order: answer count, allowed values, then that the key
/// actually carries both columns.
pub(crate) fn grade(key: &AnswerKey, submitted: &[String]) -> Result<MismatchReport, QuizError> {
    if submitted.len() != key.len() {
        return Err(QuizError::invalid(COUNT_MISMATCH));
    }

    let normalized: Vec<String> = submitted.iter().map(|answer| answer.to_lowercase()).collect();
    if !normalized.iter().all(|answer| ALLOWED_ANSWERS.contains(&answer.as_str())) {
        return Err(QuizError::invalid(INVALID_ANSWER));
    }

    for column in KeyColumn::ALL {
        if !key.has_column(column) {
            return Err(QuizError::invalid(format!(
                "answer key has no '{}' column",
                column.header()
            )));
        }
    }

    let missed = key
        .rows()
        .iter()
        .zip(&normalized)
        .filter(|(row, answer)| row.correct_answer != **answer)
        .map(|(row, _)| MissedQuestion { question: row.question.clone() })
        .collect();

    Ok(MismatchReport { missed, total_questions: key.len() })
}

/// Grades against the stored key and writes the report workbook to
/// `report_path` before handing it back. Every call is counted, failures
/// under their error kind.
pub(crate) async fn grade_submission(
    store: &dyn AnswerKeyStore,
    report_path: &Path,
    submitted: Vec<String>,
) -> Result<GradedReport, QuizError> {
    let result = grade_and_write(store, report_path, submitted).await;
    let missed = result.as_ref().ok().map(|graded| graded.report.missed.len());
    metrics::record_grading(grading_outcome(&result), missed);
    result
}

fn grading_outcome(result: &Result<GradedReport, QuizError>) -> &'static str {
    match result {
        Ok(_) => "graded",
        Err(err) => err.kind(),
    }
}

async fn grade_and_write(
    store: &dyn AnswerKeyStore,
    report_path: &Path,
    submitted: Vec<String>,
) -> Result<GradedReport, QuizError> {
    let key = store.load().await?;
    let report = grade(&key, &submitted)?;

    let (report, workbook) = tokio::task::spawn_blocking(move || {
        render_report(&report).map(|bytes| (report, bytes))
    })
    .await
    .map_err(|err| QuizError::storage(err, "report writer task failed"))??;

    write_report(report_path, &workbook).await?;

    Ok(GradedReport { report, workbook })
}
