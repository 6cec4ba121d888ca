use std::time::Duration;

use clap::{Parser, Subcommand};
use client::{
    config::ClientConfig,
    error::Result,
    retry::RetryPolicy,
    state::{ClientGameState, GamePhase, OpponentType},
    view, GameController,
};
use common::{
    model::game::{GameCode, Hand},
    utility::shutdown_signal,
};
use tokio::sync::watch;
use tracing::{info, Level};

/// Rock Paper Scissors against the computer or another player
#[derive(Parser)]
#[command(name = "rps")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Game service address
    #[arg(long, env = "RPS_SERVER_URL", default_value = "http://localhost:8080/", global = true)]
    server_url: String,

    /// Delay between status checks of a waiting game
    #[arg(long, env = "RPS_POLL_INTERVAL_MS", default_value_t = 1000, global = true)]
    poll_interval_ms: u64,

    /// Failed status checks to retry before giving up on a game
    #[arg(long, env = "RPS_MAX_RETRIES", default_value_t = 3, global = true)]
    max_retries: u32,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Play a hand, waiting for the opponent if it is a player
    Play {
        hand: Hand,
        #[arg(long, default_value = "computer")]
        opponent: OpponentType,
    },
    /// Answer an open game
    Challenge { code: String, hand: Hand },
    /// Show open and closed games
    List,
}

impl Cli {
    fn config(&self) -> ClientConfig {
        ClientConfig {
            server_url: self.server_url.clone(),
            poll_interval: Duration::from_millis(self.poll_interval_ms),
            retry: RetryPolicy {
                max_retries: self.max_retries,
                ..RetryPolicy::default()
            },
            ..ClientConfig::default()
        }
    }
}

// Resolves once the awaited game has a result or polling gave up on it
async fn wait_for_opponent(mut updates: watch::Receiver<ClientGameState>) {
    let _ = updates
        .wait_for(|state| {
            !matches!(
                state.phase,
                GamePhase::WaitingForOpponent { stalled: false, .. }
            )
        })
        .await;
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let level = if cli.verbose { Level::DEBUG } else { Level::INFO };
    tracing_subscriber::fmt()
        .with_line_number(true)
        .with_file(true)
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();

    let controller = GameController::connect(cli.config())?;
    match cli.command {
        Commands::Play { hand, opponent } => {
            controller.select_opponent(opponent);
            controller.start_game(hand).await?;
            if opponent == OpponentType::Player {
                println!("{}", view::status_line(&controller.state()));
                tokio::select! {
                    _ = wait_for_opponent(controller.subscribe()) => {}
                    _ = shutdown_signal() => {
                        info!("Abandoning game");
                        controller.abandon_game().await;
                    }
                }
            }
            let _ = controller.refresh_all_games().await;
        }
        Commands::Challenge { code, hand } => {
            controller.mount().await?;
            controller.play_opponent(&GameCode::from(code), hand).await?;
        }
        Commands::List => controller.mount().await?,
    }
    print!("{}", view::render(&controller.state()));
    controller.shutdown().await;
    Ok(())
}
