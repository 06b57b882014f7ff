use clap::Subcommand;
use gridlock_core::TrafficController;

use super::DEFAULT_CONFIG_PATH;

#[derive(Subcommand)]
pub enum AreaAction {
    /// Zone and hotspot classification for one area
    Info {
        /// Area name
        name: String,
        /// Path to the knowledge document
        #[arg(long, default_value = DEFAULT_CONFIG_PATH)]
        config: String,
        /// Print the info as JSON
        #[arg(long)]
        json: bool,
    },
    /// Print the prompt for adding an area to the document
    Suggest {
        /// Area name
        name: String,
        /// Path to the knowledge document
        #[arg(long, default_value = DEFAULT_CONFIG_PATH)]
        config: String,
    },
}

pub fn run(action: AreaAction) -> Result<(), Box<dyn std::error::Error>> {
    match action {
        AreaAction::Info { name, config, json } => {
            let controller = TrafficController::from_path(&config);
            if let Some(err) = controller.init_error() {
                return Err(err.into());
            }
            let info = controller.get_area_info(&name);
            if json {
                println!("{}", serde_json::to_string_pretty(&info)?);
            } else {
                println!("Area: {}", info.name);
                println!("Zone: {}", info.zone.as_deref().unwrap_or("unknown"));
                println!("Hotspot: {}", if info.is_hotspot { "yes" } else { "no" });
                if let Some(landmark) = &info.nearby_landmark {
                    println!("Landmark: {landmark}");
                }
            }
        }
        AreaAction::Suggest { name, config } => {
            let controller = TrafficController::from_path(&config);
            println!("{}", controller.suggest_area_addition(&name));
        }
    }
    Ok(())
}
