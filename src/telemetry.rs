use std::io;

use anyhow::{anyhow, Context, Result};
use tracing_subscriber::{
    fmt::{format::FmtSpan, time::UtcTime},
    prelude::__tracing_subscriber_SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter, Layer,
};

const LOG_LEVEL_ENV: &str = "SHUTTERBOX_LOG_LEVEL";
const LOG_FORMAT_ENV: &str = "SHUTTERBOX_LOG_FORMAT";

pub(crate) fn init() -> Result<()> {
    let json = matches!(std::env::var(LOG_FORMAT_ENV).as_deref(), Ok("json"));

    let json_layer = if json {
        Some(
            tracing_subscriber::fmt::layer()
                .json()
                .with_writer(io::stderr)
                .with_timer(UtcTime::rfc_3339())
                .with_span_events(FmtSpan::CLOSE)
                .with_filter(env_filter_merge_from_environment("info", LOG_LEVEL_ENV)?),
        )
    } else {
        None
    };

    let text_layer = if json {
        None
    } else {
        Some(
            tracing_subscriber::fmt::layer()
                .with_writer(io::stderr)
                .with_timer(UtcTime::rfc_3339())
                .with_span_events(FmtSpan::NEW | FmtSpan::CLOSE)
                .with_filter(env_filter_merge_from_environment("info", LOG_LEVEL_ENV)?),
        )
    };

    tracing_subscriber::registry()
        .with(json_layer)
        .with(text_layer)
        .try_init()
        .context("Failed to set global default tracing subscriber")?;

    Ok(())
}

fn env_filter_merge_from_environment(
    default_directives: &'static str,
    env_var: &'static str,
) -> Result<EnvFilter> {
    let mut filter = EnvFilter::builder()
        .parse(default_directives)
        .with_context(|| anyhow!("Default directives were invalid: {default_directives}"))?;

    if let Ok(env_value) = std::env::var(env_var) {
        for env_directive in env_value.split(',') {
            match env_directive.parse() {
                Ok(directive) => filter = filter.add_directive(directive),
                Err(err) => eprintln!("WARN ignoring log directive: {env_directive:?}: {err}"),
            }
        }
    }

    Ok(filter)
}
