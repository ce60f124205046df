//! CLI argument parsing using clap derive

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use clap_complete::Shell;
use kit_meta::InstallMethod;

/// kit - build and install command-line tools from a package registry
#[derive(Parser, Debug)]
#[command(name = "kit")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// The command to run
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Install method as spelled on the command line
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum MethodArg {
    /// The tag or commit pinned in the manifest
    Version,
    /// The upstream HEAD at install time
    Commit,
}

impl From<MethodArg> for InstallMethod {
    fn from(arg: MethodArg) -> Self {
        match arg {
            MethodArg::Version => InstallMethod::Specific,
            MethodArg::Commit => InstallMethod::Latest,
        }
    }
}

/// Available commands
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Build and install a package
    ///
    /// Without a name, choose from the registry interactively.
    ///
    /// Examples:
    ///   kit install ripgrep            # Install the pinned version
    ///   kit install ripgrep --latest   # Track upstream HEAD
    Install {
        /// Package name
        name: Option<String>,

        /// Ignore the registry cache
        #[arg(long)]
        force_refresh: bool,

        /// Install the upstream HEAD instead of the pinned version
        #[arg(long, conflicts_with = "install_method")]
        latest: bool,

        /// Install method (defaults to options.install_method)
        #[arg(long, value_enum)]
        install_method: Option<MethodArg>,

        /// Answer yes to every prompt
        #[arg(short, long)]
        yes: bool,
    },

    /// Re-install a package whose registry entry changed
    Update {
        /// Package name
        name: Option<String>,

        /// Ignore the registry cache
        #[arg(long)]
        force_refresh: bool,

        /// Answer yes to every prompt
        #[arg(short, long)]
        yes: bool,
    },

    /// Remove an installed package
    Remove {
        /// Package name
        name: Option<String>,

        /// Answer yes to every prompt
        #[arg(short, long)]
        yes: bool,
    },

    /// List registry packages and what is installed
    List {
        /// Ignore the registry cache
        #[arg(long)]
        force_refresh: bool,
    },

    /// Show a package manifest without installing it
    Preview {
        /// Package name
        name: Option<String>,

        /// Ignore the registry cache
        #[arg(long)]
        force_refresh: bool,
    },

    /// Write a default configuration and create its directories
    InitConfig {
        /// Directory that holds bin, configs, build, man and registry
        #[arg(long)]
        base: Option<PathBuf>,
    },

    /// Add the kit bin and man directories to your shell startup file
    AddExecutablesPath,

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}
