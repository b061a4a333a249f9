use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize logging to stderr.
///
/// The log level can be controlled via the `level` parameter or overridden
/// entirely with the `RUST_LOG` environment variable. Output goes to stderr
/// so report data written to stdout stays machine-readable.
pub fn init_logging(level: &str) -> color_eyre::Result<()> {
    // Build filter from RUST_LOG env var or use provided level
    let default_filter = format!("spendopt={level},spendopt_core=warn");
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&default_filter));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(true)
                .with_thread_ids(false),
        )
        .init();

    Ok(())
}
