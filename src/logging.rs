//! Tracing subscriber setup for the binary.

use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Maps `-v` repetitions to a default filter directive.
pub fn default_directive(verbosity: u8) -> &'static str {
    match verbosity {
        0 => "harvest_sim=warn",
        1 => "harvest_sim=info",
        2 => "harvest_sim=debug",
        _ => "harvest_sim=trace",
    }
}

/// Installs a stderr fmt subscriber.
///
/// `RUST_LOG` takes precedence over `verbosity` when set. Calling this twice
/// is harmless; the second subscriber is simply not installed.
pub fn init_tracing(verbosity: u8) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive(verbosity)));
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false),
        )
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verbosity_raises_level() {
        assert_eq!(default_directive(0), "harvest_sim=warn");
        assert_eq!(default_directive(2), "harvest_sim=debug");
        assert_eq!(default_directive(9), "harvest_sim=trace");
    }

    #[test]
    fn init_twice_does_not_panic() {
        init_tracing(0);
        init_tracing(1);
    }
}
