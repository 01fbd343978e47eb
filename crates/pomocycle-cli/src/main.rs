use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use pomocycle_core::Config;
use tracing_subscriber::EnvFilter;

mod commands;
mod presenter;

#[derive(Parser)]
#[command(name = "pomocycle-cli", version, about = "Pomocycle CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the interactive timer
    Run {
        /// Session to start on (pomodoro, long-focus, short-break, long-break, refocus-2)
        #[arg(long, default_value = "pomodoro")]
        mode: String,
        /// Keep history and settings in memory only
        #[arg(long)]
        ephemeral: bool,
    },
    /// Today's session history
    History {
        #[command(subcommand)]
        action: commands::history::HistoryAction,
    },
    /// Today's statistics
    Stats {
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },
    /// Durations, auto-start flags and volume
    Settings {
        #[command(subcommand)]
        action: commands::settings::SettingsAction,
    },
    /// Application configuration
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
    /// Print shell completions
    Completions {
        shell: Shell,
    },
}

fn init_logging(default_level: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

fn main() {
    let cli = Cli::parse();
    let config = Config::load_or_default();
    init_logging(&config.log.level);

    let result = match cli.command {
        Commands::Run { mode, ephemeral } => commands::run::run(&mode, ephemeral, &config),
        Commands::History { action } => commands::history::run(action),
        Commands::Stats { json } => commands::stats::run(json),
        Commands::Settings { action } => commands::settings::run(action),
        Commands::Config { action } => commands::config::run(action),
        Commands::Completions { shell } => {
            clap_complete::generate(
                shell,
                &mut Cli::command(),
                "pomocycle-cli",
                &mut std::io::stdout(),
            );
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
