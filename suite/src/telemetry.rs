use std::sync::LazyLock;

use tracing::subscriber::{set_global_default, SetGlobalDefaultError};
use tracing::Subscriber;
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::{EnvFilter, Registry};

/// Compose a subscriber: `RUST_LOG` if set, else `env_filter`, formatted
/// into `sink`.
pub fn get_subscriber<Sink>(env_filter: &str, sink: Sink) -> impl Subscriber + Send + Sync
where
    Sink: for<'a> MakeWriter<'a> + Send + Sync + 'static,
{
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(env_filter));
    let formatting_layer = tracing_subscriber::fmt::layer().with_writer(sink);
    Registry::default().with(env_filter).with(formatting_layer)
}

pub fn init_subscriber(subscriber: impl Subscriber + Send + Sync) -> Result<(), SetGlobalDefaultError> {
    set_global_default(subscriber)
}

// Initialised once per test binary. Output is discarded unless TEST_LOG is set.
static TRACING: LazyLock<()> = LazyLock::new(|| {
    let default_filter_level = "info";
    // A subscriber installed elsewhere in the process wins.
    let _ = if std::env::var("TEST_LOG").is_ok() {
        init_subscriber(get_subscriber(default_filter_level, std::io::stdout))
    } else {
        init_subscriber(get_subscriber(default_filter_level, std::io::sink))
    };
});

pub fn init_test_tracing() {
    LazyLock::force(&TRACING);
}
