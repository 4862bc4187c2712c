mod cli;

use clap::Parser;
use notion_cli::output;
use tracing_subscriber::EnvFilter;

use cli::Cli;

fn init_logging(verbose: bool) {
    let default_directive = if verbose { "notion_cli=debug" } else { "warn" };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive));
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if let Err(e) = cli::dispatch(cli) {
        output::error(&format!("{e:#}"));
        std::process::exit(1);
    }
}
