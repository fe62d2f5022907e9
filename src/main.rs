//! orq CLI entry point.

use clap::Parser;
use orq::cli::commands;
use orq::cli::{Cli, Commands};
use orq::error::Error;
use std::process::ExitCode;

fn main() -> ExitCode {
    let cli = Cli::parse();

    if cli.no_color {
        colored::control::set_override(false);
    }

    // Set up tracing based on verbosity
    init_tracing(cli.verbose, cli.quiet);

    // Resolve effective JSON mode: --json OR non-TTY stdout
    let json = cli.json || !std::io::IsTerminal::is_terminal(&std::io::stdout());

    match run(&cli, json) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            if json {
                eprintln!("{}", e.to_structured_json());
            } else if !cli.quiet {
                if let Some(hint) = e.hint() {
                    eprintln!("Error: {e}\n  Hint: {hint}");
                } else {
                    eprintln!("Error: {e}");
                }
            }
            ExitCode::from(e.exit_code())
        }
    }
}

fn init_tracing(verbose: u8, quiet: bool) {
    use tracing_subscriber::EnvFilter;

    if quiet {
        return;
    }

    // Honor RUST_LOG if set, otherwise use verbosity flag
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else {
        match verbose {
            0 => EnvFilter::new("warn"),
            1 => EnvFilter::new("info"),
            2 => EnvFilter::new("debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .without_time()
        .init();
}

fn run(cli: &Cli, json: bool) -> Result<(), Error> {
    let project = cli.project.as_ref();

    match &cli.command {
        Commands::Init { path, name } => {
            commands::init::execute(path, name.as_deref(), json, cli.quiet)
        }
        Commands::Info => commands::info::execute(project, json),
        Commands::Rename { name } => commands::info::rename(project, name, json),
        Commands::Version => commands::version::execute(json),
        Commands::ProjectVersion { command } => {
            commands::project_version::execute(command, project, json)
        }
        Commands::Item { command } => commands::item::execute(command, project, json),
        Commands::Label { command } => commands::label::execute(command, project, json),
        Commands::Media { command } => commands::media::execute(command, project, json),
        Commands::Backup { dest } => commands::backup::execute(project, dest, json),
        Commands::Completions { shell } => commands::completions::execute(shell),
    }
}
