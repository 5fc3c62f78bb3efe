use clap::Parser;
use console::style;
use cuecli::cli::Cli;
use cuecli::commands;
use cuecli::core::config::load_app_config;
use cuecli::core::context::AppCtx;
use cuecli::core::storage::resolve_base_dir;
use tracing_subscriber::EnvFilter;

const LOG_ENV: &str = "CUECLI_LOG";

fn main() {
    if let Err(e) = run() {
        eprintln!("{} {}", style("•").red().bold(), e);
        std::process::exit(1);
    }
}

fn run() -> Result<(), String> {
    let cli = Cli::parse();

    let base_dir = resolve_base_dir().map_err(|e| e.to_string())?;
    let config = load_app_config(&base_dir).map_err(|e| e.to_string())?;

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(&config.logging.level))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let mut ctx = AppCtx::open(base_dir, config).map_err(|e| e.to_string())?;
    ctx.assume_yes = cli.yes;

    commands::dispatch(cli.command, &mut ctx)
}
