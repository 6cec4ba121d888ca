use async_trait::async_trait;
use common::model::{
    game::{GameCode, Hand},
    messages::{
        AllGames, ComputerGameResult, CreateGameRequest, GameDetails, GameSummary,
        PlayGameRequest,
    },
};
use reqwest::{header, Client, Method, RequestBuilder, Response, Url};
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::{
    config::ClientConfig,
    error::{ClientError, Result},
};

/// The game service's HTTP contract.
#[async_trait]
pub trait GameApi: Send + Sync + 'static {
    /// `POST /game`
    async fn create_game(&self, hand: Hand) -> Result<GameCode>;
    /// `GET /game/{code}`
    async fn game_status(&self, code: &GameCode) -> Result<GameDetails>;
    /// `PUT /game/{code}`. The body is service-defined.
    async fn play_game(&self, code: &GameCode, hand: Hand) -> Result<serde_json::Value>;
    /// `GET /game/list/open`
    async fn open_games(&self) -> Result<Vec<GameSummary>>;
    /// `GET /game/list/all`
    async fn all_games(&self) -> Result<AllGames>;
    /// `GET /play/{hand}`
    async fn play_computer(&self, hand: Hand) -> Result<ComputerGameResult>;
}

pub struct HttpGameApi {
    client: Client,
    base_url: Url,
}

impl HttpGameApi {
    pub fn new(config: &ClientConfig) -> Result<Self> {
        let mut base_url = config.server_url.clone();
        // Url::join drops the last segment unless the base ends in a slash
        if !base_url.ends_with('/') {
            base_url.push('/');
        }
        let client = Client::builder().timeout(config.request_timeout).build()?;
        Ok(HttpGameApi {
            client,
            base_url: Url::parse(&base_url)?,
        })
    }

    fn request(&self, method: Method, path: &str) -> Result<(String, RequestBuilder)> {
        let url = self.base_url.join(path)?;
        let name = format!("{} /{}", method, path);
        debug!("{} -> {}", name, url);
        Ok((name, self.client.request(method, url)))
    }

    async fn send(name: String, request: RequestBuilder) -> Result<Response> {
        let response = request.send().await?;
        let status = response.status();
        debug!("{}: {}", name, status);
        if !status.is_success() {
            return Err(ClientError::Status {
                request: name,
                status,
            });
        }
        Ok(response)
    }

    async fn fetch<T: DeserializeOwned>(&self, method: Method, path: &str) -> Result<T> {
        let (name, request) = self.request(method, path)?;
        decode(Self::send(name, request).await?).await
    }
}

async fn decode<T: DeserializeOwned>(response: Response) -> Result<T> {
    let body = response.bytes().await?;
    Ok(serde_json::from_slice(&body)?)
}

// Some services answer 201 with only a Location header
fn code_from_location(location: &str) -> Option<GameCode> {
    let path = location.split(['?', '#']).next()?;
    let code = path.trim_end_matches('/').rsplit('/').next()?;
    if code.is_empty() {
        None
    } else {
        Some(GameCode::from(code))
    }
}

#[async_trait]
impl GameApi for HttpGameApi {
    async fn create_game(&self, hand: Hand) -> Result<GameCode> {
        let (name, request) = self.request(Method::POST, "game")?;
        let response = Self::send(name, request.json(&CreateGameRequest { player1: hand })).await?;
        let location = response
            .headers()
            .get(header::LOCATION)
            .and_then(|value| value.to_str().ok())
            .and_then(code_from_location);
        let body = response.bytes().await?;
        if !body.iter().all(u8::is_ascii_whitespace) {
            let summary: GameSummary = serde_json::from_slice(&body)?;
            return Ok(summary.code);
        }
        location.ok_or(ClientError::MissingCode)
    }

    async fn game_status(&self, code: &GameCode) -> Result<GameDetails> {
        self.fetch(Method::GET, &format!("game/{}", code)).await
    }

    async fn play_game(&self, code: &GameCode, hand: Hand) -> Result<serde_json::Value> {
        let (name, request) = self.request(Method::PUT, &format!("game/{}", code))?;
        let response = Self::send(name, request.json(&PlayGameRequest { player2: hand })).await?;
        decode(response).await
    }

    async fn open_games(&self) -> Result<Vec<GameSummary>> {
        self.fetch(Method::GET, "game/list/open").await
    }

    async fn all_games(&self) -> Result<AllGames> {
        self.fetch(Method::GET, "game/list/all").await
    }

    async fn play_computer(&self, hand: Hand) -> Result<ComputerGameResult> {
        self.fetch(Method::GET, &format!("play/{}", hand)).await
    }
}
