use common::model::game::GameCode;
use reqwest::StatusCode;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ClientError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Invalid server url: {0}")]
    Url(#[from] url::ParseError),

    #[error("{request} answered {status}")]
    Status { request: String, status: StatusCode },

    #[error("Malformed response body: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Server did not return a game code")]
    MissingCode,

    #[error("Game {0} is closed but the server did not report both hands and an outcome")]
    IncompleteResult(GameCode),

    #[error("Still waiting for an opponent in game {0}")]
    GameInProgress(GameCode),
}

pub type Result<T> = std::result::Result<T, ClientError>;
