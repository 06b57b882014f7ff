use clap::Subcommand;
use gridlock_core::ConfigParser;

use super::DEFAULT_CONFIG_PATH;

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Parse and validate the knowledge document
    Validate {
        /// Path to the knowledge document
        #[arg(long, default_value = DEFAULT_CONFIG_PATH)]
        config: String,
        /// Print the validation result as JSON
        #[arg(long)]
        json: bool,
    },
    /// Print the parsed document as pretty JSON
    Show {
        /// Path to the knowledge document
        #[arg(long, default_value = DEFAULT_CONFIG_PATH)]
        config: String,
    },
}

pub fn run(action: ConfigAction) -> Result<(), Box<dyn std::error::Error>> {
    match action {
        ConfigAction::Validate { config, json } => {
            let parsed = ConfigParser::load(&config)?;
            let validation = ConfigParser::validate(&parsed);
            if json {
                println!("{}", serde_json::to_string_pretty(&validation)?);
            } else {
                for error in &validation.errors {
                    println!("error: {error}");
                }
                for warning in &validation.warnings {
                    println!("warning: {warning}");
                }
                println!(
                    "{}: {}",
                    config,
                    if validation.is_valid { "valid" } else { "invalid" }
                );
            }
            if !validation.is_valid {
                std::process::exit(1);
            }
        }
        ConfigAction::Show { config } => {
            let parsed = ConfigParser::load(&config)?;
            println!("{}", serde_json::to_string_pretty(&parsed)?);
        }
    }
    Ok(())
}
