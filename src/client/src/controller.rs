use std::sync::{Arc, Mutex, MutexGuard};

use common::model::game::{GameCode, Hand};
use tokio::sync::watch;
use tracing::{debug, error, info};

use crate::{
    api::{GameApi, HttpGameApi},
    config::ClientConfig,
    error::{ClientError, Result},
    poll::PollHandle,
    state::{ClientGameState, Event, GamePhase, GameStore, OpponentType},
};

/// Turns player actions into calls against the game service and folds the
/// answers into a `ClientGameState`.
pub struct GameController<A: GameApi = HttpGameApi> {
    api: Arc<A>,
    store: Arc<GameStore>,
    config: ClientConfig,
    poll: Mutex<Option<PollHandle>>,
    // Serializes game starts, so only one can pass the in-progress check
    starting: tokio::sync::Mutex<()>,
}

impl GameController<HttpGameApi> {
    pub fn connect(config: ClientConfig) -> Result<Self> {
        let api = HttpGameApi::new(&config)?;
        Ok(Self::new(api, config))
    }
}

impl<A: GameApi> GameController<A> {
    pub fn new(api: A, config: ClientConfig) -> Self {
        GameController {
            api: Arc::new(api),
            store: Arc::new(GameStore::default()),
            config,
            poll: Mutex::new(None),
            starting: tokio::sync::Mutex::new(()),
        }
    }

    pub fn state(&self) -> ClientGameState {
        self.store.snapshot()
    }

    pub fn subscribe(&self) -> watch::Receiver<ClientGameState> {
        self.store.subscribe()
    }

    fn poll_slot(&self) -> MutexGuard<'_, Option<PollHandle>> {
        // The slot only holds a handle, a poisoned lock leaves nothing half-written
        self.poll.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn take_poll(&self) -> Option<PollHandle> {
        self.poll_slot().take()
    }

    // Logs a failed one-shot action and records it for the user
    fn report<T>(&self, action: &str, result: Result<T>) -> Result<T> {
        if let Err(e) = &result {
            error!("Failed to {}: {}", action, e);
            self.store.dispatch(Event::RequestFailed(format!("Failed to {}", action)));
        }
        result
    }

    /// Load both game lists.
    pub async fn mount(&self) -> Result<()> {
        self.refresh_all_games().await
    }

    pub fn select_opponent(&self, opponent_type: OpponentType) {
        self.store.dispatch(Event::OpponentSelected(opponent_type));
    }

    /// Play `hand` against the selected opponent type. Only one player game
    /// can be awaited at a time.
    pub async fn start_game(&self, hand: Hand) -> Result<()> {
        let _starting = self.starting.lock().await;
        let state = self.ensure_idle()?;
        match state.opponent_type {
            OpponentType::Computer => self.play_against_computer(hand).await,
            OpponentType::Player => self.open_game(hand).await,
        }
    }

    /// Open a game for another player and poll it until they play.
    pub async fn create_game(&self, hand: Hand) -> Result<()> {
        let _starting = self.starting.lock().await;
        self.ensure_idle()?;
        self.open_game(hand).await
    }

    fn ensure_idle(&self) -> Result<ClientGameState> {
        let state = self.state();
        match state.awaited_code() {
            Some(code) => Err(ClientError::GameInProgress(code.clone())),
            None => Ok(state),
        }
    }

    async fn open_game(&self, hand: Hand) -> Result<()> {
        let code = self.report("create game", self.api.create_game(hand).await)?;
        info!("Created game {} playing {}", code, hand);
        self.store.dispatch(Event::GameCreated { code: code.clone() });
        self.start_polling(code);

        let _ = self.refresh_active_games().await;
        Ok(())
    }

    fn start_polling(&self, code: GameCode) {
        let handle = PollHandle::spawn(
            self.api.clone(),
            self.store.clone(),
            code,
            self.config.poll_interval,
            self.config.retry,
        );
        // Replacing the previous handle drops it, which stops its loop
        if let Some(previous) = self.poll_slot().replace(handle) {
            debug!("Replaced poll loop for game {}", previous.code);
        }
    }

    /// Restart polling for a game whose loop gave up. Returns whether a loop
    /// was started.
    pub fn resume_polling(&self) -> bool {
        let state = self.state();
        let GamePhase::WaitingForOpponent { code, stalled: true } = state.phase else {
            return false;
        };
        info!("Resuming polling for game {}", code);
        self.store.dispatch(Event::PollingResumed { code: code.clone() });
        self.start_polling(code);
        true
    }

    pub fn is_polling(&self) -> bool {
        self.poll_slot()
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }

    /// Stop waiting for the current player game.
    pub async fn abandon_game(&self) {
        if let Some(handle) = self.take_poll() {
            handle.cancel().await;
        }
        if let Some(code) = self.state().code().cloned() {
            self.store.dispatch(Event::GameAbandoned { code });
        }
    }

    pub async fn play_against_computer(&self, hand: Hand) -> Result<()> {
        let result = self.report("play computer", self.api.play_computer(hand).await)?;
        info!(
            "Played {} against computer {}: {}",
            result.player, result.computer, result.outcome
        );
        self.store.dispatch(Event::ComputerPlayed(result.into()));
        Ok(())
    }

    /// Answer an open game, then reload both lists to pick up its result.
    pub async fn play_opponent(&self, code: &GameCode, hand: Hand) -> Result<()> {
        let body = self.report("play game", self.api.play_game(code, hand).await)?;
        debug!("Played {} in game {}: {}", hand, code, body);
        self.refresh_all_games().await
    }

    pub async fn refresh_active_games(&self) -> Result<()> {
        let games = self.report("load open games", self.api.open_games().await)?;
        self.store.dispatch(Event::OpenGamesLoaded(games));
        Ok(())
    }

    pub async fn refresh_all_games(&self) -> Result<()> {
        let all = self.report("load games", self.api.all_games().await)?;
        self.store.dispatch(Event::AllGamesLoaded(all));
        Ok(())
    }

    /// Stop background work. The state stays readable, a game that was still
    /// being polled is left stalled.
    pub async fn shutdown(&self) {
        let Some(handle) = self.take_poll() else {
            return;
        };
        let code = handle.code.clone();
        handle.cancel().await;
        self.store.dispatch(Event::PollingStopped {
            code,
            reason: "client shut down".to_owned(),
        });
    }
}
