use std::fmt::Write;

use crate::state::{ClientGameState, GamePhase};

pub fn status_line(state: &ClientGameState) -> String {
    match &state.phase {
        GamePhase::NotStarted => "Select the hand you like to play".to_owned(),
        GamePhase::WaitingForOpponent {
            code,
            stalled: false,
        } => format!("Waiting for opponent to play {}", code),
        GamePhase::WaitingForOpponent {
            code,
            stalled: true,
        } => format!("Waiting for opponent to play {} (no longer checking)", code),
        GamePhase::OpponentPlayed { result, .. } => format!(
            "You played {}, opponent played {}: {}",
            result.player, result.opponent, result.outcome
        ),
    }
}

/// Text rendering of the whole state for the terminal.
pub fn render(state: &ClientGameState) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Rock Paper Scissors");
    let _ = writeln!(out, "{}", status_line(state));
    if let Some(message) = &state.message {
        let _ = writeln!(out, "{}", message);
    }

    let _ = writeln!(out, "\nActive Games");
    for (index, game) in state.active_games.iter().enumerate() {
        let _ = writeln!(out, "{:>3}  {}", index + 1, game.code);
    }

    let _ = writeln!(out, "\nClosed Games");
    for (index, game) in state.closed_games.iter().enumerate() {
        let _ = writeln!(
            out,
            "{:>3}  {}  {} vs {}  {}",
            index + 1,
            game.code,
            game.player1,
            game.player2,
            game.outcome
        );
    }
    out
}
