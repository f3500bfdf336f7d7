use opentelemetry::{KeyValue, metrics::UpDownCounter};
use std::sync::LazyLock;

static STATDS: LazyLock<UpDownCounter<i64>> = LazyLock::new(|| {
    logfire::i64_up_down_counter("interakt_relay_statds")
        .with_description("Interakt relay webhook statistics")
        .with_unit("event")
        .build()
});

fn incr_statds(metric: String, value: String) {
    STATDS.add(1, &[KeyValue::new(metric, value)]);
}

pub fn incr_webhook_outcome_statds(outcome: &str) {
    incr_statds("outcome".to_string(), outcome.into())
}

pub fn incr_signature_statds(check: &str) {
    incr_statds("signature".to_string(), check.into())
}
