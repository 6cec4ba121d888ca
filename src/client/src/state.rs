use std::{collections::HashSet, fmt, str::FromStr};

use common::model::{
    game::{GameCode, Hand, Outcome},
    messages::{AllGames, ClosedGame, ComputerGameResult, GameSummary},
};
use tokio::sync::watch;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OpponentType {
    #[default]
    Computer,
    Player,
}

impl fmt::Display for OpponentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            OpponentType::Computer => "COMPUTER",
            OpponentType::Player => "PLAYER",
        })
    }
}

impl FromStr for OpponentType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "COMPUTER" => Ok(OpponentType::Computer),
            "PLAYER" => Ok(OpponentType::Player),
            _ => Err(format!("unknown opponent {:?}, expected COMPUTER or PLAYER", s)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameResult {
    pub player: Hand,
    pub opponent: Hand,
    pub outcome: Outcome,
}

impl From<ComputerGameResult> for GameResult {
    fn from(result: ComputerGameResult) -> Self {
        GameResult {
            player: result.player,
            opponent: result.computer,
            outcome: result.outcome,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum GamePhase {
    #[default]
    NotStarted,
    /// A created game. `stalled` once polling gave up on it.
    WaitingForOpponent { code: GameCode, stalled: bool },
    /// `code` is `None` for games against the computer.
    OpponentPlayed {
        code: Option<GameCode>,
        result: GameResult,
    },
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct ClientGameState {
    pub opponent_type: OpponentType,
    pub phase: GamePhase,
    pub active_games: Vec<GameSummary>,
    pub closed_games: Vec<ClosedGame>,
    /// Last failure worth telling the user about.
    pub message: Option<String>,
}

impl ClientGameState {
    pub fn code(&self) -> Option<&GameCode> {
        match &self.phase {
            GamePhase::NotStarted => None,
            GamePhase::WaitingForOpponent { code, .. } => Some(code),
            GamePhase::OpponentPlayed { code, .. } => code.as_ref(),
        }
    }

    pub fn result(&self) -> Option<&GameResult> {
        match &self.phase {
            GamePhase::OpponentPlayed { result, .. } => Some(result),
            _ => None,
        }
    }

    /// The code of a game that is still being polled.
    pub fn awaited_code(&self) -> Option<&GameCode> {
        match &self.phase {
            GamePhase::WaitingForOpponent {
                code,
                stalled: false,
            } => Some(code),
            _ => None,
        }
    }

    fn is_waiting_for(&self, expected: &GameCode) -> bool {
        matches!(&self.phase, GamePhase::WaitingForOpponent { code, .. } if code == expected)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    OpponentSelected(OpponentType),
    GameCreated { code: GameCode },
    StillWaiting { code: GameCode },
    OpponentPlayed { code: GameCode, result: GameResult },
    ComputerPlayed(GameResult),
    PollingStopped { code: GameCode, reason: String },
    PollingResumed { code: GameCode },
    GameAbandoned { code: GameCode },
    OpenGamesLoaded(Vec<GameSummary>),
    AllGamesLoaded(AllGames),
    RequestFailed(String),
}

// Closed wins: a game never reopens once it has an outcome
fn without_closed(active: Vec<GameSummary>, closed: &[ClosedGame]) -> Vec<GameSummary> {
    let closed: HashSet<&GameCode> = closed.iter().map(|game| &game.code).collect();
    active
        .into_iter()
        .filter(|game| !closed.contains(&game.code))
        .collect()
}

/// The only way `ClientGameState` changes. Events about a game other than the
/// one being waited on are dropped.
pub fn reduce(state: ClientGameState, event: Event) -> ClientGameState {
    match event {
        Event::OpponentSelected(opponent_type) => ClientGameState {
            opponent_type,
            ..state
        },
        Event::GameCreated { code } => ClientGameState {
            phase: GamePhase::WaitingForOpponent {
                code,
                stalled: false,
            },
            message: None,
            ..state
        },
        Event::StillWaiting { .. } => state,
        Event::OpponentPlayed { code, result } => {
            if !state.is_waiting_for(&code) {
                debug!("Ignoring result of game {} that is no longer awaited", code);
                return state;
            }
            ClientGameState {
                phase: GamePhase::OpponentPlayed {
                    code: Some(code),
                    result,
                },
                message: None,
                ..state
            }
        }
        Event::ComputerPlayed(result) => ClientGameState {
            phase: GamePhase::OpponentPlayed { code: None, result },
            message: None,
            ..state
        },
        Event::PollingStopped { code, reason } => {
            if !state.is_waiting_for(&code) {
                return state;
            }
            ClientGameState {
                message: Some(format!("Stopped checking game {}: {}", code, reason)),
                phase: GamePhase::WaitingForOpponent {
                    code,
                    stalled: true,
                },
                ..state
            }
        }
        Event::PollingResumed { code } => {
            if !state.is_waiting_for(&code) {
                return state;
            }
            ClientGameState {
                phase: GamePhase::WaitingForOpponent {
                    code,
                    stalled: false,
                },
                message: None,
                ..state
            }
        }
        Event::GameAbandoned { code } => {
            if !state.is_waiting_for(&code) {
                return state;
            }
            ClientGameState {
                phase: GamePhase::NotStarted,
                ..state
            }
        }
        Event::OpenGamesLoaded(active_games) => ClientGameState {
            active_games: without_closed(active_games, &state.closed_games),
            ..state
        },
        Event::AllGamesLoaded(all) => ClientGameState {
            active_games: without_closed(all.active_games, &all.closed_games),
            closed_games: all.closed_games,
            ..state
        },
        Event::RequestFailed(message) => ClientGameState {
            message: Some(message),
            ..state
        },
    }
}

/// Holds the current `ClientGameState` and notifies subscribers on change.
pub struct GameStore {
    sender: watch::Sender<ClientGameState>,
}

impl GameStore {
    pub fn new(state: ClientGameState) -> Self {
        GameStore {
            sender: watch::Sender::new(state),
        }
    }

    pub fn dispatch(&self, event: Event) {
        debug!("dispatch: {:?}", event);
        self.sender
            .send_modify(|state| *state = reduce(std::mem::take(state), event));
    }

    pub fn snapshot(&self) -> ClientGameState {
        self.sender.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<ClientGameState> {
        self.sender.subscribe()
    }
}

impl Default for GameStore {
    fn default() -> Self {
        Self::new(ClientGameState::default())
    }
}
