use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Filter applied when `RUST_LOG` is unset: our crates at `info`, noisy
/// dependencies at `warn`.
const DEFAULT_FILTER: &str = "info,sqlx=warn,sea_orm=warn,lettre=warn";

/// Install the JSON stdout subscriber for a TrackWise binary.
///
/// Event fields are flattened into each line so request ids and user ids
/// are top-level keys. Only the first call has any effect.
pub fn init_tracing() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .json()
                .flatten_event(true)
                .with_current_span(false),
        )
        .try_init();
}
