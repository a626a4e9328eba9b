use std::io::ErrorKind;
use std::path::PathBuf;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::models::{AnswerKey, AnswerKeyRow, KeyColumn};
use crate::services::errors::{QuizError, NO_ANSWER_KEY};

/// Holds the single process-wide answer key.
///
/// `save` replaces whatever was stored before. No locking is promised
/// between a `save` and a concurrent `load`.
#[async_trait]
pub(crate) trait AnswerKeyStore: Send + Sync {
    async fn save(&self, key: &AnswerKey) -> Result<(), QuizError>;

    /// Fails with `NotFound` until the first `save`.
    async fn load(&self) -> Result<AnswerKey, QuizError>;

    async fn is_loaded(&self) -> bool;
}

/// Answer key kept as a CSV file whose header lists the key columns present.
#[derive(Debug, Clone)]
pub(crate) struct CsvAnswerKeyStore {
    path: PathBuf,
}

impl CsvAnswerKeyStore {
    pub(crate) fn new(path: PathBuf) -> Self {
        Self { path }
    }
}

#[async_trait]
impl AnswerKeyStore for CsvAnswerKeyStore {
    async fn save(&self, key: &AnswerKey) -> Result<(), QuizError> {
        let bytes = encode_csv(key)?;
        tokio::fs::write(&self.path, bytes).await.map_err(|err| {
            QuizError::storage(err, &format!("failed to write {}", self.path.display()))
        })?;
        tracing::debug!(path = %self.path.display(), rows = key.len(), "Answer key written");
        Ok(())
    }

    async fn load(&self) -> Result<AnswerKey, QuizError> {
        let bytes = match tokio::fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == ErrorKind::NotFound => {
                return Err(QuizError::NotFound(NO_ANSWER_KEY.to_string()));
            }
            Err(err) => {
                return Err(QuizError::storage(
                    err,
                    &format!("failed to read {}", self.path.display()),
                ));
            }
        };
        decode_csv(&bytes)
    }

    async fn is_loaded(&self) -> bool {
        tokio::fs::try_exists(&self.path).await.unwrap_or(false)
    }
}

#[derive(Debug, Default)]
pub(crate) struct InMemoryAnswerKeyStore {
    key: RwLock<Option<AnswerKey>>,
}

#[async_trait]
impl AnswerKeyStore for InMemoryAnswerKeyStore {
    async fn save(&self, key: &AnswerKey) -> Result<(), QuizError> {
        *self.key.write().await = Some(key.clone());
        Ok(())
    }

    async fn load(&self) -> Result<AnswerKey, QuizError> {
        self.key.read().await.clone().ok_or_else(|| QuizError::NotFound(NO_ANSWER_KEY.to_string()))
    }

    async fn is_loaded(&self) -> bool {
        self.key.read().await.is_some()
    }
}

// A key without columns is stored as an empty file.
fn encode_csv(key: &AnswerKey) -> Result<Vec<u8>, QuizError> {
    if key.columns().is_empty() {
        return Ok(Vec::new());
    }

    let mut writer = csv::Writer::from_writer(Vec::new());
    writer
        .write_record(key.columns().iter().map(|column| column.header()))
        .map_err(|err| QuizError::storage(err, "failed to encode answer key header"))?;
    for row in key.rows() {
        writer
            .write_record(key.columns().iter().map(|column| row.value(*column)))
            .map_err(|err| QuizError::storage(err, "failed to encode answer key row"))?;
    }
    writer.into_inner().map_err(|err| QuizError::storage(err, "failed to flush answer key"))
}

fn decode_csv(bytes: &[u8]) -> Result<AnswerKey, QuizError> {
    if bytes.iter().all(|byte| byte.is_ascii_whitespace()) {
        return Ok(AnswerKey::default());
    }

    let mut reader = csv::ReaderBuilder::new().flexible(true).from_reader(bytes);
    let headers = reader
        .headers()
        .map_err(|err| QuizError::storage(err, "stored answer key has an unreadable header"))?
        .clone();
    let columns: Vec<(usize, KeyColumn)> = headers
        .iter()
        .enumerate()
        .filter_map(|(index, name)| KeyColumn::from_header(name).map(|column| (index, column)))
        .collect();

    let mut rows = Vec::new();
    for record in reader.records() {
        let record =
            record.map_err(|err| QuizError::storage(err, "stored answer key is corrupt"))?;
        let mut row = AnswerKeyRow::default();
        for &(index, column) in &columns {
            row.set_value(column, record.get(index).unwrap_or_default().to_string());
        }
        rows.push(row);
    }

    Ok(AnswerKey::new(columns.into_iter().map(|(_, column)| column).collect(), rows))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::scratch_dir;

    #[tokio::test]
    async fn csv_store_round_trips_key() {
        let dir = scratch_dir();
        let store = CsvAnswerKeyStore::new(dir.join("preguntas_respuestas.csv"));
        let key = AnswerKey::complete(vec![
            AnswerKeyRow::new("2+2=?", "b"),
            AnswerKeyRow::new("Capital, of \"France\"?", "a"),
        ]);

        store.save(&key).await.expect("save");
        assert!(store.is_loaded().await);
        assert_eq!(store.load().await.expect("load"), key);
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[tokio::test]
    async fn csv_store_writes_present_columns_as_header() {
        let dir = scratch_dir();
        let path = dir.join("preguntas_respuestas.csv");
        let store = CsvAnswerKeyStore::new(path.clone());
        let key = AnswerKey::complete(vec![AnswerKeyRow::new("Q1", "c")]);

        store.save(&key).await.expect("save");
        let contents = std::fs::read_to_string(&path).expect("read csv");
        assert_eq!(contents, "pregunta,respuesta\nQ1,c\n");
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[tokio::test]
    async fn csv_store_keeps_partial_columns() {
        let dir = scratch_dir();
        let store = CsvAnswerKeyStore::new(dir.join("key.csv"));
        let key = AnswerKey::new(vec![KeyColumn::Question], vec![AnswerKeyRow::new("Q1", "")]);

        store.save(&key).await.expect("save");
        let loaded = store.load().await.expect("load");
        assert_eq!(loaded.columns(), &[KeyColumn::Question]);
        assert_eq!(loaded.len(), 1);
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[tokio::test]
    async fn csv_store_without_columns_loads_empty_key() {
        let dir = scratch_dir();
        let store = CsvAnswerKeyStore::new(dir.join("key.csv"));

        store.save(&AnswerKey::default()).await.expect("save");
        assert_eq!(store.load().await.expect("load"), AnswerKey::default());
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[tokio::test]
    async fn csv_store_missing_file_is_not_found() {
        let dir = scratch_dir();
        let store = CsvAnswerKeyStore::new(dir.join("missing.csv"));

        assert!(!store.is_loaded().await);
        let err = store.load().await.unwrap_err();
        assert!(matches!(err, QuizError::NotFound(_)));
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[tokio::test]
    async fn csv_store_ignores_unknown_columns() {
        let dir = scratch_dir();
        let path = dir.join("key.csv");
        std::fs::write(&path, "id,pregunta,respuesta\n1,Q1,a\n2,Q2,b\n").expect("seed csv");

        let loaded = CsvAnswerKeyStore::new(path).load().await.expect("load");
        assert_eq!(loaded.rows(), &[AnswerKeyRow::new("Q1", "a"), AnswerKeyRow::new("Q2", "b")]);
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[tokio::test]
    async fn memory_store_starts_empty() {
        let store = InMemoryAnswerKeyStore::default();
        assert!(!store.is_loaded().await);
        assert!(matches!(store.load().await.unwrap_err(), QuizError::NotFound(_)));
    }
}
