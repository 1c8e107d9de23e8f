mod commands;
mod settings;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use log::debug;

use commands::{InspectArgs, SettingsArgs, SimulateArgs};
use settings::Settings;

#[derive(Parser, Debug)]
#[command(name = "beatbox", about = "Rhythm boxing chart tools and headless player")]
struct Args {
    /// Settings file (defaults to the platform config directory).
    #[arg(long, global = true, env = "BEATBOX_SETTINGS")]
    settings: Option<PathBuf>,

    /// Log debug output.
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print chart metadata and note counts.
    Inspect(InspectArgs),
    /// Autoplay a chart without a window and print the final stats.
    Simulate(SimulateArgs),
    /// Show or update persisted settings.
    Settings(SettingsArgs),
}

fn main() -> Result<()> {
    let args = Args::parse();

    let default_level = if args.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .init();

    let settings_path = args.settings.unwrap_or_else(Settings::default_path);
    debug!("Settings file: {}", settings_path.display());
    let settings = Settings::load(&settings_path);

    match args.command {
        Command::Inspect(inspect) => commands::inspect::run(&settings, &inspect),
        Command::Simulate(simulate) => commands::simulate::run(&settings, &simulate),
        Command::Settings(update) => commands::settings::run(settings, &settings_path, &update),
    }
}
