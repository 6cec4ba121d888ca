use std::{sync::Arc, time::Duration};

use common::model::{game::GameCode, messages::GameDetails};
use tokio::{sync::oneshot, task::JoinHandle, time};
use tracing::{debug, error, info, warn};

use crate::{
    api::GameApi,
    error::{ClientError, Result},
    retry::RetryPolicy,
    state::{Event, GameResult, GameStore},
};

/// A running poll loop for one game. Dropping the handle stops the loop.
pub struct PollHandle {
    pub code: GameCode,
    cancel: Option<oneshot::Sender<()>>,
    task: JoinHandle<()>,
}

impl PollHandle {
    pub fn spawn<A: GameApi>(
        api: Arc<A>,
        store: Arc<GameStore>,
        code: GameCode,
        interval: Duration,
        retry: RetryPolicy,
    ) -> Self {
        let (cancel, cancelled) = oneshot::channel();
        let task = tokio::spawn(poll_game_status(
            api,
            store,
            code.clone(),
            interval,
            retry,
            cancelled,
        ));
        PollHandle {
            code,
            cancel: Some(cancel),
            task,
        }
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    /// Stop the loop and wait for the task to exit.
    pub async fn cancel(mut self) {
        if let Some(cancel) = self.cancel.take() {
            let _ = cancel.send(());
        }
        if let Err(e) = (&mut self.task).await {
            warn!("Poll task for game {} exited abnormally: {}", self.code, e);
        }
    }
}

impl Drop for PollHandle {
    fn drop(&mut self) {
        // Dropping the sender also wakes the loop, abort covers a task that
        // has not been polled yet
        self.cancel.take();
        self.task.abort();
    }
}

fn resolved_result(code: &GameCode, details: GameDetails) -> Result<GameResult> {
    match (details.player1, details.player2, details.outcome) {
        (Some(player), Some(opponent), Some(outcome)) => Ok(GameResult {
            player,
            opponent,
            outcome,
        }),
        _ => Err(ClientError::IncompleteResult(code.clone())),
    }
}

/// Poll `GET /game/{code}` until the game resolves, failures exhaust the retry
/// policy, or the loop is cancelled.
async fn poll_game_status<A: GameApi>(
    api: Arc<A>,
    store: Arc<GameStore>,
    code: GameCode,
    interval: Duration,
    retry: RetryPolicy,
    mut cancelled: oneshot::Receiver<()>,
) {
    let mut delay = interval;
    let mut failures = 0;
    loop {
        tokio::select! {
            _ = &mut cancelled => {
                debug!("Polling for game {} cancelled", code);
                return;
            }
            _ = time::sleep(delay) => {}
        }

        let response = tokio::select! {
            _ = &mut cancelled => {
                debug!("Polling for game {} cancelled mid-request", code);
                return;
            }
            response = api.game_status(&code) => response,
        };

        let outcome = response.and_then(|details| {
            if details.state.is_active() {
                Ok(None)
            } else {
                resolved_result(&code, details).map(Some)
            }
        });

        match outcome {
            Ok(None) => {
                debug!("Game {} still active", code);
                failures = 0;
                delay = interval;
                store.dispatch(Event::StillWaiting { code: code.clone() });
            }
            Ok(Some(result)) => {
                info!("Opponent played in game {}: {}", code, result.outcome);
                store.dispatch(Event::OpponentPlayed { code, result });
                return;
            }
            Err(e) => {
                failures += 1;
                match retry.backoff(failures) {
                    Some(backoff) => {
                        warn!(
                            "Poll {} for game {} failed, retrying in {:?}: {}",
                            failures, code, backoff, e
                        );
                        delay = backoff;
                    }
                    None => {
                        error!("Giving up on game {} after {} failures: {}", code, failures, e);
                        store.dispatch(Event::PollingStopped {
                            code,
                            reason: e.to_string(),
                        });
                        return;
                    }
                }
            }
        }
    }
}
