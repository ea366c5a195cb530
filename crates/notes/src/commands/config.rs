//! Config command - configuration management.

use anyhow::Result;
use clap::{Args, Subcommand};

use notes_config::NotesConfig;

use super::Context;

/// Arguments for the config command.
#[derive(Args, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    /// Show the effective configuration and where it came from
    Show,

    /// Show configuration file path
    Path,
}

/// Run the config command.
pub async fn run(args: ConfigArgs, ctx: &Context) -> Result<()> {
    match args.command {
        ConfigCommand::Show => cmd_show(ctx),
        ConfigCommand::Path => cmd_path(),
    }
}

fn cmd_show(ctx: &Context) -> Result<()> {
    let loaded = notes_config::load_config(None)?;

    for warning in &loaded.warnings {
        eprintln!("warning: {}", warning);
    }

    let sources = loaded.loaded_from();
    if sources.is_empty() {
        println!("# No config files loaded (using defaults)");
    } else {
        for source in sources {
            println!("# Loaded: {}", source.display());
        }
    }

    if ctx.verbose {
        for source in loaded.sources.iter().filter(|s| !s.loaded) {
            println!("# Not found: {}", source.path.display());
        }
    }

    println!();
    print!("{}", effective(&loaded.config).to_toml()?);

    Ok(())
}

fn cmd_path() -> Result<()> {
    if let Some(path) = notes_config::xdg_config_path() {
        println!("{}", path.display());
    } else {
        eprintln!("Could not determine config directory");
    }
    Ok(())
}

/// Every section filled in, defaults included.
fn effective(config: &NotesConfig) -> NotesConfig {
    NotesConfig {
        server: Some(config.server()),
        store: Some(config.store()),
    }
}
