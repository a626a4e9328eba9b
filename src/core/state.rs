use std::sync::Arc;

use crate::core::config::{AnswerKeyBackend, Settings};
use crate::repositories::answer_keys::{
    AnswerKeyStore, CsvAnswerKeyStore, InMemoryAnswerKeyStore,
};

#[derive(Clone)]
pub(crate) struct AppState {
    inner: Arc<InnerState>,
}

struct InnerState {
    settings: Settings,
    answer_keys: Arc<dyn AnswerKeyStore>,
}

impl AppState {
    pub(crate) fn new(settings: Settings, answer_keys: Arc<dyn AnswerKeyStore>) -> Self {
        Self { inner: Arc::new(InnerState { settings, answer_keys }) }
    }

    pub(crate) fn from_settings(settings: Settings) -> Self {
        let store: Arc<dyn AnswerKeyStore> = match settings.storage().backend {
            AnswerKeyBackend::Csv => {
                Arc::new(CsvAnswerKeyStore::new(settings.storage().answer_key_path()))
            }
            AnswerKeyBackend::Memory => Arc::new(InMemoryAnswerKeyStore::default()),
        };
        Self::new(settings, store)
    }

    pub(crate) fn settings(&self) -> &Settings {
        &self.inner.settings
    }

    pub(crate) fn answer_keys(&self) -> &dyn AnswerKeyStore {
        self.inner.answer_keys.as_ref()
    }
}
