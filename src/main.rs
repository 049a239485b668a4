//! lintreport CLI entry point.

use clap::Parser;
use lintreport::cli::{self, Cli, Commands, EXIT_ERROR};

/// Environment variable holding an `env_logger` filter.
const LOG_ENV: &str = "LINTREPORT_LOG";

fn init_logging(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let env = env_logger::Env::default().filter_or(LOG_ENV, default);
    env_logger::Builder::from_env(env)
        .format_timestamp(None)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match &cli.command {
        Commands::Analyze(args) => cli::run_analyze(args),
        Commands::Pr(args) => cli::run_pr(args),
        Commands::Init(args) => cli::run_init(args),
    };

    let exit_code = match result {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {}", e);
            EXIT_ERROR
        }
    };

    std::process::exit(exit_code);
}
