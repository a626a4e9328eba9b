use std::sync::OnceLock;

use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};

use crate::core::config::Settings;

pub(crate) const ANSWER_KEYS_INGESTED: &str = "answer_keys_ingested_total";
pub(crate) const GRADINGS: &str = "quiz_gradings_total";
pub(crate) const MISSED_QUESTIONS: &str = "quiz_missed_questions";

static PROM_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

pub(crate) fn init(settings: &Settings) -> anyhow::Result<()> {
    if !settings.telemetry().prometheus_enabled || PROM_HANDLE.get().is_some() {
        return Ok(());
    }

    let handle = PrometheusBuilder::new().install_recorder()?;
    let _ = PROM_HANDLE.set(handle);
    Ok(())
}

pub(crate) fn render() -> Option<String> {
    PROM_HANDLE.get().map(|handle| handle.render())
}

pub(crate) fn record_ingest(rows: usize) {
    metrics::counter!(ANSWER_KEYS_INGESTED).increment(1);
    metrics::gauge!("answer_key_questions").set(rows as f64);
}

pub(crate) fn record_grading(outcome: &'static str, missed: Option<usize>) {
    metrics::counter!(GRADINGS, "outcome" => outcome).increment(1);
    if let Some(missed) = missed {
        metrics::histogram!(MISSED_QUESTIONS).record(missed as f64);
    }
}
