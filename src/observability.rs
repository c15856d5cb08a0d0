use biometrics::{Collector, Counter, Moments};

pub(crate) static CLIENT_REQUESTS: Counter = Counter::new("routechat.client.requests");
pub(crate) static CLIENT_REQUEST_ERRORS: Counter = Counter::new("routechat.client.request_errors");
pub(crate) static CLIENT_REQUEST_RETRIES: Counter = Counter::new("routechat.client.retries");
pub(crate) static CLIENT_REQUEST_DURATION: Moments =
    Moments::new("routechat.client.request_duration_seconds");
pub(crate) static CLIENT_RETRY_BACKOFF: Moments =
    Moments::new("routechat.client.retry_backoff_seconds");

pub(crate) static DECODE_ERRORS: Counter = Counter::new("routechat.decode.errors");
pub(crate) static DECODE_EMPTY_CHOICES: Counter = Counter::new("routechat.decode.empty_choices");

pub(crate) static SESSION_EXCHANGES: Counter = Counter::new("routechat.session.exchanges");
pub(crate) static SESSION_EXCHANGE_FAILURES: Counter =
    Counter::new("routechat.session.exchange_failures");
pub(crate) static SESSION_EXCHANGE_DURATION: Moments =
    Moments::new("routechat.session.exchange_duration_seconds");
pub(crate) static SESSION_HISTORY_CLEARS: Counter =
    Counter::new("routechat.session.history_clears");
pub(crate) static SESSION_MODEL_SELECTIONS: Counter =
    Counter::new("routechat.session.model_selections");

/// Register this crate's biometrics with the provided collector.
pub fn register_biometrics(collector: Collector) {
    collector.register_counter(&CLIENT_REQUESTS);
    collector.register_counter(&CLIENT_REQUEST_ERRORS);
    collector.register_counter(&CLIENT_REQUEST_RETRIES);
    collector.register_moments(&CLIENT_REQUEST_DURATION);
    collector.register_moments(&CLIENT_RETRY_BACKOFF);

    collector.register_counter(&DECODE_ERRORS);
    collector.register_counter(&DECODE_EMPTY_CHOICES);

    collector.register_counter(&SESSION_EXCHANGES);
    collector.register_counter(&SESSION_EXCHANGE_FAILURES);
    collector.register_moments(&SESSION_EXCHANGE_DURATION);
    collector.register_counter(&SESSION_HISTORY_CLEARS);
    collector.register_counter(&SESSION_MODEL_SELECTIONS);
}
