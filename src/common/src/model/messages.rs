use serde::{Deserialize, Serialize};

use super::game::{GameCode, GameStatus, Hand, Outcome};

// Requests
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct CreateGameRequest {
    pub player1: Hand,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct PlayGameRequest {
    pub player2: Hand,
}

// Responses
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct GameSummary {
    pub code: GameCode,
}

/// Body of `GET /game/{code}`. Hands and outcome are only present once the
/// game has been closed.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct GameDetails {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<GameCode>,
    pub state: GameStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub player1: Option<Hand>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub player2: Option<Hand>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub outcome: Option<Outcome>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ClosedGame {
    pub code: GameCode,
    pub player1: Hand,
    pub player2: Hand,
    pub outcome: Outcome,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct AllGames {
    pub active_games: Vec<GameSummary>,
    pub closed_games: Vec<ClosedGame>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ComputerGameResult {
    pub player: Hand,
    pub computer: Hand,
    pub outcome: Outcome,
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn active_game_details_have_no_hands() {
        let details: GameDetails = serde_json::from_value(json!({"state": "ACTIVE"})).unwrap();
        assert!(details.state.is_active());
        assert_eq!(details.player1, None);
        assert_eq!(details.outcome, None);
    }

    #[test]
    fn all_games_uses_camel_case_lists() {
        let all: AllGames = serde_json::from_value(json!({
            "activeGames": [{"code": "AAA"}],
            "closedGames": [{
                "code": "BBB",
                "state": "CLOSED",
                "player1": "ROCK",
                "player2": "PAPER",
                "outcome": "DRAW"
            }]
        }))
        .unwrap();
        assert_eq!(all.active_games[0].code, GameCode::from("AAA"));
        assert_eq!(all.closed_games[0].player2, Hand::Paper);
        assert_eq!(all.closed_games[0].outcome, Outcome::from("DRAW"));
    }
}
