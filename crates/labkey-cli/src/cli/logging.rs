use env_logger::{Builder, Env};

/// Install the global logger. `RUST_LOG` wins over the verbose flag.
pub fn init_logging(verbose: bool) {
    let default_filter = if verbose { "debug" } else { "warn" };
    Builder::from_env(Env::default().default_filter_or(default_filter))
        .format_timestamp(None)
        .format_target(verbose)
        .init();
}
