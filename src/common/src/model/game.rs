use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Hand {
    Rock,
    Paper,
    Scissors,
}

impl Hand {
    pub const ALL: [Hand; 3] = [Hand::Rock, Hand::Paper, Hand::Scissors];

    pub fn beats(&self, other: &Hand) -> Option<bool> {
        if self == other {
            None
        } else {
            Some(matches!(
                (self, other),
                (Hand::Rock, Hand::Scissors)
                    | (Hand::Scissors, Hand::Paper)
                    | (Hand::Paper, Hand::Rock)
            ))
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Hand::Rock => "ROCK",
            Hand::Paper => "PAPER",
            Hand::Scissors => "SCISSORS",
        }
    }
}

impl fmt::Display for Hand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownHand(pub String);

impl fmt::Display for UnknownHand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown hand {:?}, expected ROCK, PAPER or SCISSORS", self.0)
    }
}

impl std::error::Error for UnknownHand {}

impl FromStr for Hand {
    type Err = UnknownHand;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Hand::ALL
            .into_iter()
            .find(|hand| hand.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| UnknownHand(s.to_owned()))
    }
}

/// Server-assigned identifier of a player-vs-player game.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct GameCode(pub String);

impl GameCode {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for GameCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for GameCode {
    fn from(code: &str) -> Self {
        GameCode(code.to_owned())
    }
}

impl From<String> for GameCode {
    fn from(code: String) -> Self {
        GameCode(code)
    }
}

/// Outcome as reported by the server. The client only displays it.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(transparent)]
pub struct Outcome(pub String);

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Outcome {
    fn from(outcome: &str) -> Self {
        Outcome(outcome.to_owned())
    }
}

// Anything other than ACTIVE means the game is over
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(from = "String", into = "String")]
pub enum GameStatus {
    Active,
    Resolved(String),
}

impl GameStatus {
    pub const ACTIVE: &'static str = "ACTIVE";

    pub fn is_active(&self) -> bool {
        matches!(self, GameStatus::Active)
    }
}

impl From<String> for GameStatus {
    fn from(value: String) -> Self {
        if value == Self::ACTIVE {
            GameStatus::Active
        } else {
            GameStatus::Resolved(value)
        }
    }
}

impl From<GameStatus> for String {
    fn from(status: GameStatus) -> Self {
        match status {
            GameStatus::Active => GameStatus::ACTIVE.to_owned(),
            GameStatus::Resolved(value) => value,
        }
    }
}
