//! Writes the account-data stack template to `template.yml`.
//!
//! Log verbosity follows `RUST_LOG` (default `info`).

use anyhow::Context;
use cfn_template_core::GeneratorConfig;
use cfn_template_core::stacks::account_data;
use tracing::info;
use tracing_subscriber::EnvFilter;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .init();

    let config = GeneratorConfig::default();
    let builder = account_data::v1_minimal(config.clone())
        .context("failed to declare the account-data stack")?;
    builder
        .serialize()
        .with_context(|| format!("failed to generate {}", config.output_path.display()))?;

    info!(event = "Generate", phase = "Done", path = %config.output_path.display());
    Ok(())
}
