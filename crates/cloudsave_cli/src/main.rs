//! CloudSave CLI
//!
//! Keeps a game's local saves in step with the Save Service.
//!
//! # Commands
//!
//! - `run` - Sync periodically until Ctrl-C
//! - `sync` - Run a single sync pass
//! - `inspect` - Show a game's save files
//! - `list` - List record keys in the local stores

mod commands;

use clap::{Parser, Subcommand, ValueEnum};
use cloudsave_sync_engine::GameProfile;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// CloudSave command-line save sync tools.
#[derive(Parser, Debug)]
#[command(name = "cloudsave")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Directory holding the local stores
    #[arg(global = true, short, long, default_value = "saves")]
    store: PathBuf,

    /// Enable verbose output
    #[arg(global = true, short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

/// A game with built-in sync settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Game {
    /// Undertale (seven save files)
    Undertale,
    /// Buckshot Roulette (player stats)
    Buckshot,
    /// Flappy Bird remake (high score)
    FlappyBird,
}

impl Game {
    /// The game's profile.
    pub fn profile(self) -> GameProfile {
        match self {
            Game::Undertale => GameProfile::undertale(),
            Game::Buckshot => GameProfile::buckshot(),
            Game::FlappyBird => GameProfile::flappy_bird(),
        }
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Sync periodically until Ctrl-C, then upload the latest save
    Run {
        /// Game to sync
        #[arg(short, long, value_enum)]
        game: Game,

        /// Base URL of the Save Service
        #[arg(long)]
        server: String,

        /// Seconds between sync passes
        #[arg(short, long, default_value = "15")]
        interval: u64,

        /// Seconds before a remote call is abandoned
        #[arg(short, long, default_value = "10")]
        timeout: u64,

        /// Cookie header value carrying the session
        #[arg(long)]
        cookie: Option<String>,
    },

    /// Run a single sync pass
    Sync {
        /// Game to sync
        #[arg(short, long, value_enum)]
        game: Game,

        /// Base URL of the Save Service
        #[arg(long)]
        server: String,

        /// Seconds before a remote call is abandoned
        #[arg(short, long, default_value = "10")]
        timeout: u64,

        /// Cookie header value carrying the session
        #[arg(long)]
        cookie: Option<String>,
    },

    /// Show a game's save files, creating missing ones
    Inspect {
        /// Game to inspect
        #[arg(short, long, value_enum)]
        game: Game,

        /// Output format (text, json)
        #[arg(short, long, default_value = "text")]
        format: String,
    },

    /// List record keys in the local stores
    List {
        /// Only list this game's store
        #[arg(short, long, value_enum)]
        game: Option<Game>,
    },

    /// Show version information
    Version,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    match cli.command {
        Commands::Run {
            game,
            server,
            interval,
            timeout,
            cookie,
        } => {
            let settings = commands::EngineSettings {
                server,
                interval,
                timeout,
                cookie,
            };
            commands::run::run(&cli.store, game, settings).await?;
        }
        Commands::Sync {
            game,
            server,
            timeout,
            cookie,
        } => {
            let settings = commands::EngineSettings {
                server,
                interval: 15,
                timeout,
                cookie,
            };
            commands::sync::run(&cli.store, game, settings).await?;
        }
        Commands::Inspect { game, format } => {
            commands::inspect::run(&cli.store, game, &format)?;
        }
        Commands::List { game } => {
            commands::list::run(&cli.store, game)?;
        }
        Commands::Version => {
            println!("CloudSave CLI v{}", env!("CARGO_PKG_VERSION"));
        }
    }

    Ok(())
}
