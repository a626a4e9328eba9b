/// Normalized header of the question column.
pub(crate) const QUESTION_COLUMN: &str = "pregunta";
/// Normalized header of the correct-answer column.
pub(crate) const ANSWER_COLUMN: &str = "respuesta";

pub(crate) const ALLOWED_ANSWERS: [&str; 4] = ["a", "b", "c", "d"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum KeyColumn {
    Question,
    Answer,
}

impl KeyColumn {
    /// Canonical column order of a stored answer key.
    pub(crate) const ALL: [KeyColumn; 2] = [KeyColumn::Question, KeyColumn::Answer];

    pub(crate) fn header(self) -> &'static str {
        match self {
            KeyColumn::Question => QUESTION_COLUMN,
            KeyColumn::Answer => ANSWER_COLUMN,
        }
    }

    pub(crate) fn from_header(header: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|column| column.header() == header)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct AnswerKeyRow {
    pub(crate) question: String,
    pub(crate) correct_answer: String,
}

impl AnswerKeyRow {
    #[cfg(test)]
    pub(crate) fn new(question: impl Into<String>, correct_answer: impl Into<String>) -> Self {
        Self { question: question.into(), correct_answer: correct_answer.into() }
    }

    pub(crate) fn value(&self, column: KeyColumn) -> &str {
        match column {
            KeyColumn::Question => &self.question,
            KeyColumn::Answer => &self.correct_answer,
        }
    }

    pub(crate) fn set_value(&mut self, column: KeyColumn, value: String) {
        match column {
            KeyColumn::Question => self.question = value,
            KeyColumn::Answer => self.correct_answer = value,
        }
    }
}

/// The questions and correct answers of the most recent upload.
///
/// `columns` records which key columns the upload actually carried. A row's
/// field for an absent column is empty and must not be graded against.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct AnswerKey {
    columns: Vec<KeyColumn>,
    rows: Vec<AnswerKeyRow>,
}

impl AnswerKey {
    pub(crate) fn new(columns: Vec<KeyColumn>, rows: Vec<AnswerKeyRow>) -> Self {
        let columns = KeyColumn::ALL.into_iter().filter(|column| columns.contains(column)).collect();
        Self { columns, rows }
    }

    /// Key with both columns present.
    #[cfg(test)]
    pub(crate) fn complete(rows: Vec<AnswerKeyRow>) -> Self {
        Self::new(KeyColumn::ALL.to_vec(), rows)
    }

    pub(crate) fn columns(&self) -> &[KeyColumn] {
        &self.columns
    }

    pub(crate) fn has_column(&self, column: KeyColumn) -> bool {
        self.columns.contains(&column)
    }

    pub(crate) fn rows(&self) -> &[AnswerKeyRow] {
        &self.rows
    }

    pub(crate) fn len(&self) -> usize {
        self.rows.len()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct MissedQuestion {
    pub(crate) question: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct MismatchReport {
    pub(crate) missed: Vec<MissedQuestion>,
    pub(crate) total_questions: usize,
}

impl MismatchReport {
    pub(crate) fn correct(&self) -> usize {
        self.total_questions - self.missed.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_columns_follow_canonical_order() {
        let key = AnswerKey::new(vec![KeyColumn::Answer, KeyColumn::Question], Vec::new());
        assert_eq!(key.columns(), &[KeyColumn::Question, KeyColumn::Answer]);
    }

    #[test]
    fn from_header_is_exact() {
        assert_eq!(KeyColumn::from_header("pregunta"), Some(KeyColumn::Question));
        assert_eq!(KeyColumn::from_header("respuesta"), Some(KeyColumn::Answer));
        assert_eq!(KeyColumn::from_header("respuestacorrecta"), None);
    }

    #[test]
    fn report_counts_correct_answers() {
        let report = MismatchReport {
            missed: vec![MissedQuestion { question: "2+2=?".to_string() }],
            total_questions: 3,
        };
        assert_eq!(report.correct(), 2);
    }
}
