use std::path::Path;

use rust_xlsxwriter::Workbook;

use crate::models::{MismatchReport, QUESTION_COLUMN};
use crate::services::errors::QuizError;

pub(crate) const XLSX_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";
pub(crate) const REPORT_DOWNLOAD_NAME: &str = "respuestas_incorrectas.xlsx";

/// Renders the missed questions as a one-column workbook headed `pregunta`.
pub(crate) fn render_report(report: &MismatchReport) -> Result<Vec<u8>, QuizError> {
    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();

    worksheet
        .write_string(0, 0, QUESTION_COLUMN)
        .map_err(|err| QuizError::storage(err, "failed to write report header"))?;

    for (index, missed) in report.missed.iter().enumerate() {
        // Blank questions stay blank cells.
        if missed.question.is_empty() {
            continue;
        }
        let row = u32::try_from(index + 1)
            .map_err(|err| QuizError::storage(err, "report has too many rows"))?;
        worksheet
            .write_string(row, 0, missed.question.as_str())
            .map_err(|err| QuizError::storage(err, "failed to write report row"))?;
    }

    workbook.save_to_buffer().map_err(|err| QuizError::storage(err, "failed to build report"))
}

/// Overwrites the report artifact at `path`.
pub(crate) async fn write_report(path: &Path, bytes: &[u8]) -> Result<(), QuizError> {
    tokio::fs::write(path, bytes)
        .await
        .map_err(|err| QuizError::storage(err, &format!("failed to write {}", path.display())))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::MissedQuestion;
    use crate::test_support::read_sheet;

    #[test]
    fn render_lists_missed_questions_under_header() {
        let report = MismatchReport {
            missed: vec![
                MissedQuestion { question: "2+2=?".to_string() },
                MissedQuestion { question: "Capital of France?".to_string() },
            ],
            total_questions: 5,
        };

        let bytes = render_report(&report).expect("render");
        assert_eq!(
            read_sheet(&bytes),
            vec![
                vec!["pregunta".to_string()],
                vec!["2+2=?".to_string()],
                vec!["Capital of France?".to_string()],
            ]
        );
    }

    #[test]
    fn render_perfect_score_has_only_header() {
        let bytes = render_report(&MismatchReport::default()).expect("render");
        assert_eq!(read_sheet(&bytes), vec![vec!["pregunta".to_string()]]);
    }
}
