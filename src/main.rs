use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crammer::config::Config;
use crammer::pipeline;
use crammer::scheduler::TopicScheduler;

#[derive(Parser)]
#[command(
    name = "crammer",
    version,
    about = "Daily exam study packet generator with LLM-backed quiz generation and chat-group push",
    long_about = None
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Config file path (TOML); environment variables overlay on top
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Log format (text, json); defaults to the configured format
    #[arg(long, global = true)]
    log_format: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate today's study packet and push notifications
    Run {
        /// Run date override (YYYY-MM-DD, defaults to today)
        #[arg(long)]
        date: Option<String>,

        /// Preview topic, prompt and payload without any network call
        #[arg(long, default_value = "false")]
        dry_run: bool,
    },

    /// Print the persisted rotation state
    State,

    /// Print the resolved topic pools
    Pools,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => Config::from_file(path)?,
        None => Config::from_env()?,
    };

    let log_format = cli
        .log_format
        .clone()
        .unwrap_or_else(|| config.logging.format.clone());
    setup_tracing(&log_format, cli.verbose, &config.logging.level)?;

    match cli.command {
        Commands::Run { date, dry_run } => {
            let today = match date {
                Some(raw) => NaiveDate::parse_from_str(&raw, "%Y-%m-%d")
                    .with_context(|| format!("Invalid --date '{raw}', expected YYYY-MM-DD"))?,
                None => chrono::Local::now().date_naive(),
            };

            tracing::info!(date = %today, dry_run, "Starting run");
            let report = pipeline::run(&config, today, dry_run).await?;

            if let Some(preview) = &report.preview {
                println!("Topic: {}\n", report.topic);
                println!("--- Prompt ---\n{}", preview.prompt);
                println!("--- Payload ---");
                println!("{}", serde_json::to_string_pretty(&preview.payload)?);
            }
            println!("{}", report.summary());
        }

        Commands::State => {
            let scheduler = TopicScheduler::from_config(&config.schedule)?;
            match scheduler.current_state() {
                Some(state) => {
                    println!("{}", serde_json::to_string_pretty(&state)?);
                }
                None => {
                    println!(
                        "No rotation state at {} (first run pending)",
                        config.schedule.state_path.display()
                    );
                }
            }
        }

        Commands::Pools => {
            let scheduler = TopicScheduler::from_config(&config.schedule)?;
            for (period, pool) in scheduler.pools().iter() {
                match period {
                    Some(month) => println!("month {month:>2}: {}", pool.join(", ")),
                    None => println!("default : {}", pool.join(", ")),
                }
            }
        }
    }

    Ok(())
}

fn setup_tracing(format: &str, verbose: bool, level: &str) -> Result<()> {
    let env_filter = if verbose {
        tracing_subscriber::EnvFilter::new("crammer=debug,info")
    } else {
        tracing_subscriber::EnvFilter::new(format!("crammer={level},warn"))
    };

    match format {
        "json" => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().json())
                .init();
        }
        _ => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().pretty())
                .init();
        }
    }

    Ok(())
}
