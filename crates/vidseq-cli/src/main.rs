//! vidseq: command-line driver for the video sequencer

mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use vidseq_services::{load_config, VidseqConfig};

#[derive(Debug, Parser)]
#[command(name = "vidseq", version, about = "Video sequencer project tools")]
struct Cli {
    /// Config file (defaults to the user config directory)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Summarize a project file
    Info {
        project: PathBuf,
    },
    /// Write a standalone MoviePy render script for a project
    Script {
        project: PathBuf,
        /// Output file
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// List the media the catalog offers
    Catalog {
        /// List a local clips directory instead of the configured one
        #[arg(long, conflicts_with = "url")]
        dir: Option<PathBuf>,
        /// List through a running app at this base URL
        #[arg(long)]
        url: Option<String>,
    },
    /// Submit a project to the render service and save the video
    Render {
        project: PathBuf,
        /// Attach a local file for an instrument: NAME=PATH
        #[arg(long = "upload", value_parser = commands::parse_upload)]
        uploads: Vec<(String, PathBuf)>,
        /// Resolve media through a running app instead of the clips directory
        #[arg(long)]
        catalog_url: Option<String>,
        /// Render service base URL
        #[arg(long)]
        render_url: Option<String>,
        /// Directory for the rendered video
        #[arg(short, long)]
        output: Option<PathBuf>,
        #[arg(long)]
        timeout_secs: Option<u64>,
    },
}

fn main() {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("vidseq=info".parse().expect("static directive"))
                .add_directive("vidseq_core=info".parse().expect("static directive"))
                .add_directive("vidseq_services=info".parse().expect("static directive")),
        )
        .init();

    if let Err(e) = run() {
        tracing::error!("{:#}", e);
        std::process::exit(1);
    }
}

fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = match &cli.config {
        Some(path) => {
            let mut config = VidseqConfig::load_from(path)?;
            config.apply_overrides(|key| std::env::var(key).ok());
            config
        }
        None => load_config(),
    };

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;
    runtime.block_on(commands::dispatch(cli.command, config))
}
