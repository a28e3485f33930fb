mod commands;

use std::path::PathBuf;

use clap::{CommandFactory, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "siteprofile")]
#[command(about = "Validate and manage e-commerce site selector profiles")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Validate one or more profile files (.json, .yaml, .yml)
    Validate {
        #[arg(required = true)]
        paths: Vec<PathBuf>,

        /// Reject fields that are not part of the profile schema
        #[arg(long)]
        strict: bool,
    },
    /// Print a summary of a profile, or its normalized JSON
    Show {
        path: PathBuf,

        /// Print the validated profile as JSON instead of a summary
        #[arg(long)]
        json: bool,

        #[arg(long)]
        strict: bool,
    },
    /// List every profile under the storage directory
    List {
        /// Storage directory; defaults to `SITEPROFILE_DIR`
        #[arg(long)]
        dir: Option<PathBuf>,

        #[arg(long)]
        strict: bool,
    },
    /// Extract the profile from a DOM-analysis response and store it
    Import {
        /// File holding the raw analysis response text
        response: PathBuf,

        /// Storage directory; defaults to `SITEPROFILE_DIR`
        #[arg(long)]
        dir: Option<PathBuf>,

        #[arg(long)]
        strict: bool,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = siteprofile_core::load_app_config()?;

    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Some(Commands::Validate { paths, strict }) => {
            commands::run_validate(&paths, config.validation_options(strict))
        }
        Some(Commands::Show { path, json, strict }) => {
            commands::run_show(&path, json, config.validation_options(strict))
        }
        Some(Commands::List { dir, strict }) => {
            let dir = dir.unwrap_or_else(|| config.profiles_dir.clone());
            commands::run_list(&dir, config.validation_options(strict))
        }
        Some(Commands::Import {
            response,
            dir,
            strict,
        }) => {
            let dir = dir.unwrap_or_else(|| config.profiles_dir.clone());
            commands::run_import(&response, &dir, config.validation_options(strict))
        }
        None => {
            Cli::command().print_help()?;
            Ok(())
        }
    }
}
