//! Pixelproof CLI: visual review and design compliance
//!
//! ## Usage
//!
//! ```bash
//! pixelproof review --component chat_header --screenshot shot.png --figma design.svg
//! pixelproof review --component chat_header --approve
//! pixelproof review --component chat_header --reject --feedback "Header is 4px too tall"
//! pixelproof compare screenshots/inbox_1700000000.png inbox
//! pixelproof convert messaging-epic-figma-svg
//! pixelproof run --smoke --headless
//! ```

use clap::Parser;
use pixelproof_cli::{
    handlers, init_tracing, Cli, CliConfig, CliResult, ColorChoice, Commands, Verbosity,
};
use std::process::ExitCode;

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::from(e.exit_code())
        }
    }
}

fn run(cli: Cli) -> CliResult<()> {
    let config = build_config(&cli);
    init_tracing(config.verbosity, cli.log_json)?;
    tracing::debug!(root = %config.root.display(), "starting");

    match cli.command {
        Commands::Review(args) => handlers::execute_review(&config, &args),
        Commands::Compare(args) => handlers::execute_compare(&config, &args),
        Commands::Convert(args) => handlers::execute_convert(&config, &args).map(|_| ()),
        Commands::Run(args) => handlers::execute_run(&config, &args),
        Commands::Check(args) => handlers::execute_check(&config, &args),
    }
}

fn build_config(cli: &Cli) -> CliConfig {
    let verbosity = if cli.quiet {
        Verbosity::Quiet
    } else {
        match cli.verbose {
            0 => Verbosity::Normal,
            1 => Verbosity::Verbose,
            _ => Verbosity::Debug,
        }
    };

    let color: ColorChoice = cli.color.clone().into();

    CliConfig::new()
        .with_verbosity(verbosity)
        .with_color(color)
        .with_root(&cli.root)
}
