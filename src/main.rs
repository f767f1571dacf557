use anyhow::{Context, Result};
use bingewatch::{config::PipelineConfig, pipeline};
use clap::Parser;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser)]
#[command(
    author,
    version,
    about = "Percentage of binge-watchers per age group, from a movie ratings CSV"
)]
struct Args {
    /// YAML file with pipeline settings; flags below override it.
    #[arg(short, long)]
    config: Option<PathBuf>,
    #[arg(long)]
    input: Option<PathBuf>,
    #[arg(long)]
    output: Option<PathBuf>,
    #[arg(long)]
    threads: Option<usize>,
}

fn main() -> Result<()> {
    // ─── 1) init logging ─────────────────────────────────────────────
    let env = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,bingewatch=info"));
    fmt::Subscriber::builder()
        .with_env_filter(env)
        .with_span_events(fmt::format::FmtSpan::CLOSE)
        .init();
    info!("startup");

    // ─── 2) resolve configuration ────────────────────────────────────
    let args = Args::parse();
    let mut config = match &args.config {
        Some(path) => PipelineConfig::from_yaml_file(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => PipelineConfig::default(),
    };
    if let Some(input) = args.input {
        config.input = input;
    }
    if let Some(output) = args.output {
        config.output = output;
    }
    if let Some(threads) = args.threads {
        config.engine.threads = threads;
    }
    if config.engine.threads > 0 {
        // read once, when polars builds its worker pool on first use
        std::env::set_var("POLARS_MAX_THREADS", config.engine.threads.to_string());
    }
    info!(
        input = %config.input.display(),
        output = %config.output.display(),
        "configured"
    );

    // ─── 3) run ──────────────────────────────────────────────────────
    let summary = pipeline::run(&config).context("binge-watching pipeline failed")?;
    info!(
        age_groups = summary.age_groups,
        output = %summary.output.display(),
        "all done"
    );
    Ok(())
}
