use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use crate::Res;

/// Installs the global tracing subscriber, writing to stderr so that it
/// does not mix with the tables printed on stdout.
pub fn init_tracing(filter: &str) -> Res<()> {
    let filter_layer = EnvFilter::try_new(filter)?;
    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false);

    tracing_subscriber::registry()
        .with(filter_layer)
        .with(fmt_layer)
        .try_init()?;

    Ok(())
}
