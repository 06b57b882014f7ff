use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "gridlock-cli", version, about = "Gridlock commute congestion CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// One-shot route congestion analysis
    Analyze(commands::analyze::AnalyzeArgs),
    /// Area lookups against the knowledge document
    Area {
        #[command(subcommand)]
        action: commands::area::AreaAction,
    },
    /// Knowledge document management
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
}

fn main() {
    let cli = Cli::parse();
    let result = match cli.command {
        Commands::Analyze(args) => commands::analyze::run(args),
        Commands::Area { action } => commands::area::run(action),
        Commands::Config { action } => commands::config::run(action),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
