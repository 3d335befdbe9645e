//! Slurdle bot: runs two-player image Wordle games in chat rooms.

mod adapter;
mod commands;
mod logging;
mod protocol;
mod render;

use std::path::PathBuf;
use std::process;
use std::time::Duration;

use clap::{Parser, Subcommand};

use adapter::Timing;
use commands::{GameArgs, LoadArgs};

#[derive(Parser)]
#[command(
    name = "slurdle",
    about = "Slurdle: two players, one image, one word",
    version,
    propagate_version = true
)]
struct Cli {
    /// Append log output to this file instead of stderr
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the bot: chat events in on stdin, payloads out on stdout (JSON lines)
    Serve {
        #[command(flatten)]
        game: GameArgs,

        /// Seconds a player may be gone before the game is aborted (0 aborts at once)
        #[arg(long, default_value = "300")]
        leave_grace: u64,

        /// Seconds before a running game is aborted (0 disables)
        #[arg(long, default_value = "900")]
        game_timeout: u64,
    },

    /// Validate a catalog and optional word list
    Check {
        /// Catalog file to check
        catalog: PathBuf,

        #[command(flatten)]
        load: LoadArgs,

        /// Word list to cross-check
        #[arg(short, long)]
        words: Option<PathBuf>,

        /// Print every pair
        #[arg(short, long)]
        list: bool,
    },

    /// Play a local game with two players on one terminal
    Play {
        #[command(flatten)]
        game: GameArgs,
    },
}

fn main() {
    let cli = Cli::parse();

    if let Err(e) = logging::init_logging(cli.log_file.as_deref()) {
        eprintln!("error: {e}");
        process::exit(1);
    }

    let result = match cli.command {
        Commands::Serve {
            game,
            leave_grace,
            game_timeout,
        } => {
            let timing = Timing::default()
                .with_leave_grace(Duration::from_secs(leave_grace))
                .with_game_timeout(Duration::from_secs(game_timeout));
            commands::serve::run(&game, timing)
        }
        Commands::Check {
            catalog,
            load,
            words,
            list,
        } => commands::check::run(&catalog, &load, words.as_deref(), list),
        Commands::Play { game } => commands::play::run(&game),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        process::exit(1);
    }
}
