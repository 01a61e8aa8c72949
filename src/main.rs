use clap::Parser;
use craft_margin::{Report, Settings};
use log::error;
use std::path::PathBuf;

/// Build a crafting profit spreadsheet from recipe and market data
#[derive(Parser)]
#[command(name = "craft-margin", version, about)]
struct Cli {
    /// Config file (defaults to craft-margin.toml in the current directory, if present)
    #[arg(long)]
    config: Option<String>,

    /// Recipe cache file
    #[arg(long)]
    cache: Option<PathBuf>,

    /// Spreadsheet to write
    #[arg(long, short)]
    output: Option<PathBuf>,

    /// Refetch recipes even if the cache exists
    #[arg(long)]
    refresh: bool,
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    if let Err(e) = run(cli) {
        error!("{}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let mut settings = Settings::load(cli.config.as_deref())?;
    if settings.xivapi.private_key.is_none() {
        settings.xivapi.private_key = std::env::var("XIVAPI_KEY").ok();
    }

    let mut builder = Report::builder().settings(settings).refresh(cli.refresh);
    if let Some(cache) = cli.cache {
        builder = builder.cache_path(cache);
    }
    if let Some(output) = cli.output {
        builder = builder.output_path(output);
    }

    let path = builder.build()?;
    println!("{}", path.display());
    Ok(())
}
