use chrono::{Local, NaiveDateTime};
use clap::Args;
use gridlock_core::TrafficController;

use super::DEFAULT_CONFIG_PATH;

#[derive(Args)]
pub struct AnalyzeArgs {
    /// Origin area name
    pub origin: String,
    /// Destination area name
    pub destination: String,
    /// Departure time, e.g. 2026-08-24T09:00 (defaults to now)
    #[arg(long)]
    pub at: Option<String>,
    /// Replace nightlife wording in the output
    #[arg(long)]
    pub avoid_nightlife: bool,
    /// Prefer family-friendly framing for replaced sentences
    #[arg(long)]
    pub family_friendly: bool,
    /// Path to the knowledge document
    #[arg(long, default_value = DEFAULT_CONFIG_PATH)]
    pub config: String,
    /// Print the full analysis as JSON
    #[arg(long)]
    pub json: bool,
}

pub fn run(args: AnalyzeArgs) -> Result<(), Box<dyn std::error::Error>> {
    let departure = parse_departure(args.at.as_deref());
    let controller = TrafficController::from_path(&args.config);

    let analysis = controller.analyze_route_with_preferences(
        &args.origin,
        &args.destination,
        departure,
        args.avoid_nightlife,
        args.family_friendly,
    );

    if args.json {
        println!("{}", serde_json::to_string_pretty(&analysis)?);
        return Ok(());
    }

    println!(
        "Route: {} -> {} at {}",
        args.origin.trim(),
        args.destination.trim(),
        departure.format("%Y-%m-%d %H:%M")
    );
    println!("Congestion: {}", analysis.congestion.level);
    println!("Reason: {}", analysis.congestion.reasoning);
    if analysis.detailed_reasoning != analysis.congestion.reasoning {
        println!("Details:");
        for line in analysis.detailed_reasoning.lines() {
            println!("  {line}");
        }
    }
    for warning in &analysis.hotspot_warnings {
        println!("Warning: {warning}");
    }
    println!(
        "Recommendation: {}",
        analysis.congestion.departure_recommendation
    );
    if !analysis.departure_window.is_empty() {
        println!("{}", analysis.departure_window);
    }
    Ok(())
}

/// Parse `--at`; a missing or malformed value falls back to the current
/// local wall-clock time with a warning.
fn parse_departure(at: Option<&str>) -> NaiveDateTime {
    let Some(raw) = at else {
        return Local::now().naive_local();
    };
    let parsed = NaiveDateTime::parse_from_str(raw.trim(), "%Y-%m-%dT%H:%M")
        .or_else(|_| NaiveDateTime::parse_from_str(raw.trim(), "%Y-%m-%d %H:%M"));
    match parsed {
        Ok(departure) => departure,
        Err(_) => {
            eprintln!("warning: could not parse departure time '{raw}', using now");
            Local::now().naive_local()
        }
    }
}
