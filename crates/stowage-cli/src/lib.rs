use anyhow::Context;
use serde::Serialize;
use stowage_core::Config;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Initialize tracing for the CLI. Logs go to stderr so stdout stays JSON.
pub fn init_tracing(log_format: &str) {
    let registry = tracing_subscriber::registry().with(
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("stowage=info")),
    );

    if log_format.eq_ignore_ascii_case("json") {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}

pub fn print_json(value: &impl Serialize) -> anyhow::Result<()> {
    let out = serde_json::to_string_pretty(value).context("Serialize output")?;
    println!("{}", out);
    Ok(())
}

/// Bucket from `--bucket`, falling back to `STORAGE_BUCKET`.
pub fn resolve_bucket(flag: Option<String>, config: &Config) -> anyhow::Result<String> {
    flag.filter(|b| !b.trim().is_empty())
        .or_else(|| config.storage_bucket().map(String::from))
        .context("No bucket given. Pass --bucket or set STORAGE_BUCKET")
}
