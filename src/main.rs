// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! screen-noise - correlate battery temperature with screen power
//!
//! Entry point for the screen-noise CLI.

use std::io::IsTerminal;

use clap::Parser;

use screen_noise::cli::{BatterystatsArgs, Cli, Commands, RunArgs, TemperatureArgs};
use screen_noise::config::Settings;
use screen_noise::error::{Result, ScreenNoiseError};
use screen_noise::pipeline::Pipeline;
use screen_noise::plot;
use screen_noise::report::{self, AndroidVersion, ParseOptions};

#[tokio::main]
async fn main() -> Result<()> {
    // Parse CLI arguments
    let cli = Cli::parse();

    // Initialize tracing
    let mut env_filter = tracing_subscriber::EnvFilter::from_default_env()
        .add_directive(tracing::Level::WARN.into());

    // `-v` shows progress and skip reasons, `-vv` adds cache and download detail.
    // `RUST_LOG` still takes precedence for other targets.
    let directive = match cli.verbose {
        0 => None,
        1 => Some("screen_noise=info"),
        _ => Some("screen_noise=debug"),
    };
    if let Some(parsed) =
        directive.and_then(|d| d.parse::<tracing_subscriber::filter::Directive>().ok())
    {
        env_filter = env_filter.add_directive(parsed);
    }

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    // Load settings
    let settings = match &cli.config {
        Some(path) => Settings::load_from(path)?,
        None => Settings::load()?,
    };

    match cli.command {
        None => run_pipeline(RunArgs::default(), settings).await,
        Some(Commands::Run(args)) => run_pipeline(args, settings).await,
        Some(Commands::Batterystats(args)) => run_batterystats(args, settings),
        Some(Commands::Temperature(args)) => run_temperature(args),
    }
}

async fn run_pipeline(args: RunArgs, settings: Settings) -> Result<()> {
    let settings = args.apply(settings);
    let pipeline = Pipeline::new(settings)?;

    let points = pipeline.run().await?;
    tracing::info!("Plotting {} points", points.len());

    if args.no_plot || !std::io::stdout().is_terminal() {
        print!("{}", plot::format_points(&points));
        return Ok(());
    }

    plot::show(&points)
}

fn run_batterystats(args: BatterystatsArgs, settings: Settings) -> Result<()> {
    let text = report::unescape_newlines(&report::read_artifact(&args.file)?);

    let process = args.process.unwrap_or(settings.process_name);
    let version = args.android_version.unwrap_or(settings.android_version);
    let options = ParseOptions::new(process, settings.test_name)
        .baseline(args.baseline)
        .android_version(AndroidVersion(version));

    let breakdown = report::parse_batterystats(&text, options)?;
    println!("{}", serde_json::to_string_pretty(&breakdown.to_power_data())?);
    Ok(())
}

fn run_temperature(args: TemperatureArgs) -> Result<()> {
    let text = report::read_artifact(&args.file)?;
    match report::parse_temperature(&text) {
        Some(temperature) => {
            println!("{}", temperature);
            Ok(())
        }
        None => Err(ScreenNoiseError::Artifact(format!(
            "no temperature found in {}",
            args.file.display()
        ))),
    }
}
