use tracing_subscriber::{fmt, EnvFilter};

use crate::core::config::Settings;

/// Crates whose debug output drowns out request logs.
const QUIET_TARGETS: &[&str] = &["sqlx=warn", "redis=warn", "hyper=info"];

pub(crate) fn init_tracing(settings: &Settings) -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_directives(&settings.telemetry().log_level)))
        .map_err(|err| anyhow::anyhow!("invalid log filter: {err}"))?;

    let builder = fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_span_events(fmt::format::FmtSpan::CLOSE);

    let installed = if settings.telemetry().json {
        builder.json().with_current_span(true).try_init()
    } else {
        builder.compact().try_init()
    };
    installed.map_err(|err| anyhow::anyhow!(err.to_string()))?;

    tracing::debug!(
        environment = settings.runtime().environment.as_str(),
        json = settings.telemetry().json,
        "Tracing initialised"
    );
    Ok(())
}

fn default_directives(level: &str) -> String {
    let mut directives = vec![level.trim().to_string()];
    directives.extend(QUIET_TARGETS.iter().map(|target| target.to_string()));
    directives.join(",")
}
