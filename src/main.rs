use clap::Parser;
use todoscript::cli::commands::Cli;
use todoscript::cli::handlers;
use tracing_subscriber::EnvFilter;

/// Log to stderr; `--verbose` wins over TODOSCRIPT_LOG, default is warn.
fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("todoscript=debug")
    } else {
        EnvFilter::try_from_env("TODOSCRIPT_LOG").unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .with_target(false)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Err(e) = handlers::dispatch(cli) {
        eprintln!("error: {}", e);
        std::process::exit(1);
    }
}
