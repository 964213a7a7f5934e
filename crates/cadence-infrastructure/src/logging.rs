//! Tracing subscriber bootstrap.

use cadence_core::config::LoggingSettings;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Installs a global fmt subscriber.
///
/// `RUST_LOG` takes precedence over `settings.level`. Returns `false` when a
/// global subscriber was already installed (e.g. by the host or a prior call).
pub fn init_tracing(settings: &LoggingSettings) -> bool {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&settings.level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_target(true))
        .try_init()
        .is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_second_init_is_harmless() {
        let settings = LoggingSettings::default();
        let _ = init_tracing(&settings);
        assert!(!init_tracing(&settings));
    }
}
