//! kit CLI
//!
//! Installs command-line tools from a registry of build recipes.

mod cli;
mod commands;
mod context;
mod error;
mod interactive;

use clap::Parser;
use colored::Colorize;
use kit_meta::{InstallMethod, default_config_path};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use cli::{Cli, Commands};
use context::Context;
use error::Result;

fn main() {
    if let Err(e) = run() {
        eprintln!("{}: {}", "error".red().bold(), e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Some(cmd) => execute_command(cmd),
        None => {
            println!("{} package manager", "kit".green().bold());
            println!();
            println!("Run {} for available commands.", "kit --help".cyan());
            Ok(())
        }
    }
}

/// Log to stderr; `RUST_LOG` wins over the default level.
fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_target(verbose)
        .with_writer(std::io::stderr)
        .finish();
    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("{}: could not set up logging: {e}", "warning".yellow().bold());
    }
    tracing::debug!("Verbose mode enabled");
}

fn execute_command(cmd: Commands) -> Result<()> {
    match cmd {
        Commands::Install {
            name,
            force_refresh,
            latest,
            install_method,
            yes,
        } => {
            let method = if latest {
                Some(InstallMethod::Latest)
            } else {
                install_method.map(InstallMethod::from)
            };
            let ctx = Context::load()?;
            commands::run_install(&ctx, name.as_deref(), force_refresh, method, yes)
        }
        Commands::Update {
            name,
            force_refresh,
            yes,
        } => commands::run_update(&Context::load()?, name.as_deref(), force_refresh, yes),
        Commands::Remove { name, yes } => {
            commands::run_remove(&Context::load()?, name.as_deref(), yes)
        }
        Commands::List { force_refresh } => commands::run_list(&Context::load()?, force_refresh),
        Commands::Preview {
            name,
            force_refresh,
        } => commands::run_preview(&Context::load()?, name.as_deref(), force_refresh),
        Commands::InitConfig { base } => commands::run_init_config(&default_config_path()?, base),
        Commands::AddExecutablesPath => {
            let ctx = Context::load()?;
            commands::run_add_executables_path(&ctx.config.paths)
        }
        Commands::Completions { shell } => {
            commands::run_completions(shell);
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CliError;

    #[test]
    fn test_cli_error_user() {
        let error = CliError::user("test error");
        assert_eq!(format!("{}", error), "test error");
    }

    #[test]
    fn test_missing_config_suggests_init() {
        let temp = tempfile::TempDir::new().unwrap();
        let result = Context::load_from(&temp.path().join("config.yaml"));

        match result {
            Err(CliError::User { message }) => assert!(message.contains("kit init-config")),
            Err(other) => panic!("expected a user error, got {other}"),
            Ok(_) => panic!("expected a user error"),
        }
    }
}
