//! Tracing and metrics bootstrap.

use std::sync::Once;

use metrics::{Unit, describe_counter, describe_histogram};
use tracing::Subscriber;
use tracing_error::ErrorLayer;
use tracing_subscriber::{
    EnvFilter, fmt,
    layer::{Layer, SubscriberExt},
    registry::LookupSpan,
    util::SubscriberInitExt,
};

use crate::config::{LogFormat, LoggingSettings};

use super::error::InfraError;

static METRIC_DESCRIPTIONS: Once = Once::new();

/// Install the process-wide tracing subscriber. The configured level becomes
/// the default directive; `RUST_LOG` still narrows or widens it per target.
pub fn init(logging: &LoggingSettings) -> Result<(), InfraError> {
    describe_metrics();

    let filter = EnvFilter::builder()
        .with_default_directive(logging.level.into())
        .from_env_lossy();

    tracing_subscriber::registry()
        .with(filter)
        .with(ErrorLayer::default())
        .with(output_layer(logging.format))
        .try_init()
        .map_err(|err| {
            InfraError::telemetry(format!("tracing subscriber refused to install: {err}"))
        })
}

fn output_layer<S>(format: LogFormat) -> Box<dyn Layer<S> + Send + Sync>
where
    S: Subscriber + for<'a> LookupSpan<'a>,
{
    match format {
        LogFormat::Json => fmt::layer()
            .json()
            .with_current_span(true)
            .with_span_list(true)
            .with_target(true)
            .boxed(),
        LogFormat::Compact => fmt::layer().compact().with_target(true).boxed(),
    }
}

fn describe_metrics() {
    METRIC_DESCRIPTIONS.call_once(|| {
        describe_counter!(
            "vetrina_highlight_blocks_total",
            Unit::Count,
            "Total number of code blocks rendered, labelled by layout."
        );
        describe_counter!(
            "vetrina_newsletter_submissions_total",
            Unit::Count,
            "Total number of newsletter submission attempts, labelled by the advisory accept signal."
        );
        describe_counter!(
            "vetrina_http_requests_total",
            Unit::Count,
            "Total number of HTTP requests served, labelled by status class."
        );
        describe_histogram!(
            "vetrina_list_service_rtt_ms",
            Unit::Milliseconds,
            "List-service round-trip latency in milliseconds."
        );
    });
}
