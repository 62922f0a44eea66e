use std::sync::Once;

use metrics::{Unit, describe_counter, describe_histogram};
use tracing_error::ErrorLayer;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::{LogFormat, LoggingSettings};

use super::error::InfraError;

static DESCRIBE_ONCE: Once = Once::new();

/// Installs the global tracing subscriber and registers metric
/// descriptions. The filter honours `RUST_LOG` and falls back to the
/// configured level.
pub fn init(logging: &LoggingSettings) -> Result<(), InfraError> {
    let filter = EnvFilter::builder()
        .with_default_directive(logging.level.into())
        .from_env_lossy();
    let registry = tracing_subscriber::registry()
        .with(filter)
        .with(ErrorLayer::default());

    let installed = match logging.format {
        LogFormat::Json => registry
            .with(
                fmt::layer()
                    .json()
                    .with_current_span(true)
                    .with_span_list(true)
                    .with_target(true),
            )
            .try_init(),
        LogFormat::Compact => registry
            .with(fmt::layer().compact().with_target(true))
            .try_init(),
    };
    installed.map_err(|err| InfraError::telemetry(format!("subscriber install failed: {err}")))?;

    register_metric_descriptions();
    Ok(())
}

fn register_metric_descriptions() {
    DESCRIBE_ONCE.call_once(|| {
        describe_counter!(
            "carta_cache_hit_total",
            Unit::Count,
            "Reads served from the in-process cache."
        );
        describe_counter!(
            "carta_cache_miss_total",
            Unit::Count,
            "Reads that fell through to the repository."
        );
        describe_counter!(
            "carta_cache_events_published_total",
            Unit::Count,
            "Invalidation events appended to the queue."
        );
        describe_histogram!(
            "carta_cache_consume_ms",
            Unit::Milliseconds,
            "Time spent applying one batch of invalidation events."
        );
        describe_histogram!(
            "carta_cache_warm_ms",
            Unit::Milliseconds,
            "Time spent rebuilding cache entries after invalidation."
        );
    });
}
