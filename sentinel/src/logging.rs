use env_logger::{Builder, Env};

/// Sets up `env_logger`. `RUST_LOG` wins over the configured level; an
/// explicit `--log-level` wins over both.
pub fn init_logging(flag_level: Option<&str>, config_level: Option<&str>) {
    let mut builder = Builder::from_env(Env::default().default_filter_or(config_level.unwrap_or("info")));
    if let Some(level) = flag_level {
        builder.parse_filters(level);
    }
    // a second init in the same process keeps the first logger
    let _ = builder.try_init();
}
