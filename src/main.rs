//! Jamak CLI entry point.

use anyhow::Result;
use clap::Parser;
use jamak::cli::{commands, Cli, Commands};
use jamak::config::Settings;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load configuration
    let config_path = cli.config.as_deref().map(Settings::expand_path);
    let settings = Settings::load_from(config_path.as_ref())?;

    // Initialize logging
    let log_level = match cli.verbose {
        0 => settings.general.log_level.as_str(),
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::registry()
        .with(EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| format!("jamak={}", log_level)),
        ))
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();

    // Execute command
    match &cli.command {
        Commands::Caption {
            url,
            lang,
            refine,
            refine_args,
        } => {
            commands::run_caption(url, lang, *refine, refine_args, settings).await?;
        }

        Commands::Describe { url } => {
            commands::run_describe(url, settings).await?;
        }

        Commands::Refine { input, refine_args } => {
            commands::run_refine(input, refine_args, settings).await?;
        }

        Commands::Recipe {
            url,
            file,
            refine,
            output,
        } => {
            commands::run_recipe(
                url.as_deref(),
                file.as_deref(),
                *refine,
                output.as_deref(),
                settings,
            )
            .await?;
        }

        Commands::Doctor => {
            commands::run_doctor(&settings)?;
        }

        Commands::Config { action } => {
            commands::run_config(action, config_path, settings)?;
        }
    }

    Ok(())
}
