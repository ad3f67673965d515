use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Default filter directive; `RUST_LOG` takes precedence when set
pub fn default_filter(verbose: bool) -> &'static str {
    if verbose {
        "breathlog=debug,warn"
    } else {
        "breathlog=warn"
    }
}

/// Install the global subscriber. Output goes to stderr so stdout stays
/// clean for tables and JSON.
pub fn init(verbose: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_filter(verbose)));

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .with_thread_ids(false)
                .with_file(false)
                .with_line_number(false)
                .compact(),
        )
        .try_init();
}
