//! `twin config`: inspect or create the settings file.

use clap::Subcommand;
use twin_config::TwinSettings;

use crate::exit_codes::EXIT_CONFIG;
use crate::util::{load_settings, print_json};
use crate::{CliError, GlobalArgs};

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Print the effective settings (defaults merged with the file)
    #[command(after_help = "\
Examples:
  twin config show
  twin --config ./twin.toml config show --json")]
    Show {
        #[arg(long)]
        json: bool,
    },

    /// Write a commented default settings file
    #[command(after_help = "\
Examples:
  twin config init
  twin --config ./twin.toml config init")]
    Init,
}

pub fn cmd_config(global: &GlobalArgs, cmd: ConfigCommands) -> Result<(), CliError> {
    let path = global.config.clone().unwrap_or_else(TwinSettings::config_path);
    match cmd {
        ConfigCommands::Show { json } => {
            let settings = load_settings(Some(&path))?;
            if path.exists() {
                eprintln!("settings: {}", path.display());
            } else {
                eprintln!("settings: {} (not found, using defaults)", path.display());
            }
            if json {
                return print_json(&settings);
            }
            let text = settings
                .to_toml()
                .map_err(|e| CliError::new(EXIT_CONFIG, e.to_string()))?;
            print!("{text}");
            Ok(())
        }
        ConfigCommands::Init => {
            TwinSettings::write_default(&path).map_err(|e| CliError::new(EXIT_CONFIG, e.to_string()))?;
            eprintln!("wrote {}", path.display());
            Ok(())
        }
    }
}
