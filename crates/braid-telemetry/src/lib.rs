use tracing::Level;
use tracing_subscriber::EnvFilter;

/// Configuration for the logging subsystem.
#[derive(Clone, Debug)]
pub struct TelemetryConfig {
    /// Default log level. Overridden by the RUST_LOG env var.
    pub log_level: Level,
    /// Per-module level overrides (e.g. "braid_engine" => DEBUG).
    pub module_levels: Vec<(String, Level)>,
    /// Emit JSON lines instead of human-readable output.
    pub json: bool,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            log_level: Level::INFO,
            module_levels: Vec::new(),
            json: false,
        }
    }
}

/// Initialize the tracing subscriber. Call once at startup.
pub fn init_telemetry(config: &TelemetryConfig) {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(filter_directives(config)));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(true);

    if config.json {
        builder.json().init();
    } else {
        builder.init();
    }
}

fn filter_directives(config: &TelemetryConfig) -> String {
    let mut directives = config.log_level.to_string().to_lowercase();
    for (module, level) in &config.module_levels {
        directives.push_str(&format!(",{}={}", module, level.to_string().to_lowercase()));
    }
    directives
}
