//! Configuration inspection commands.

use std::error::Error;
use std::path::PathBuf;

use clap::Subcommand;
use focuswatch_core::ConfigWatcher;

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Print the resolved configuration as TOML
    Show {
        /// Path to the configuration file
        #[arg(short, long, default_value = "config.toml")]
        config: PathBuf,
    },
    /// Validate a configuration file
    Check {
        /// Path to the configuration file
        #[arg(short, long, default_value = "config.toml")]
        config: PathBuf,
    },
}

pub fn run(action: ConfigAction) -> Result<(), Box<dyn Error>> {
    match action {
        ConfigAction::Show { config } => {
            let loaded = ConfigWatcher::new(&config).load()?;
            print!("{}", toml::to_string_pretty(&loaded)?);
        }
        ConfigAction::Check { config } => {
            ConfigWatcher::new(&config).load()?;
            println!("{} is valid", config.display());
        }
    }
    Ok(())
}
