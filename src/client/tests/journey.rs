use std::time::Duration;

use client::{
    api::{GameApi, HttpGameApi},
    config::ClientConfig,
    error::ClientError,
    retry::RetryPolicy,
    state::{GamePhase, GameResult, OpponentType},
    view, GameController,
};
use common::{
    model::game::{GameCode, Hand, Outcome},
    test::FakeGameService,
};
use tokio::{net::TcpListener, time::timeout};

fn config(service: &FakeGameService) -> ClientConfig {
    ClientConfig {
        server_url: service.url(),
        poll_interval: Duration::from_millis(20),
        retry: RetryPolicy {
            max_retries: 1,
            initial_backoff: Duration::from_millis(20),
            max_backoff: Duration::from_millis(40),
            multiplier: 2,
        },
        ..ClientConfig::default()
    }
}

async fn settle(controller: &GameController, done: impl Fn(&GamePhase) -> bool) {
    let mut updates = controller.subscribe();
    timeout(
        Duration::from_secs(5),
        updates.wait_for(|state| done(&state.phase)),
    )
    .await
    .expect("Timed out waiting for game state")
    .expect("State store closed");
}

#[tokio::test]
async fn play_rock_against_computer() {
    let service = FakeGameService::start().await;
    service.set_computer_hand(Hand::Scissors).await;
    let controller = GameController::connect(config(&service)).unwrap();

    controller.select_opponent(OpponentType::Computer);
    controller.start_game(Hand::Rock).await.unwrap();

    let state = controller.state();
    assert_eq!(
        state.result(),
        Some(&GameResult {
            player: Hand::Rock,
            opponent: Hand::Scissors,
            outcome: Outcome::from("PLAYER_WIN"),
        })
    );
    assert!(view::render(&state).contains("PLAYER_WIN"));
    assert_eq!(service.requests().await, vec!["GET /play/ROCK"]);
    service.shutdown().await;
}

#[tokio::test]
async fn play_against_another_player() {
    let service = FakeGameService::start().await;
    let first = GameController::connect(config(&service)).unwrap();
    let second = GameController::connect(config(&service)).unwrap();

    first.select_opponent(OpponentType::Player);
    first.start_game(Hand::Rock).await.unwrap();
    let code = first.state().code().cloned().expect("Game code");
    assert_eq!(code.as_str().len(), 8);
    assert!(view::status_line(&first.state()).starts_with("Waiting for opponent to play "));
    assert_eq!(first.state().active_games[0].code, code);

    second.mount().await.unwrap();
    assert!(second.state().active_games.iter().any(|game| game.code == code));
    second.play_opponent(&code, Hand::Paper).await.unwrap();

    let state = second.state();
    assert!(state.active_games.iter().all(|game| game.code != code));
    assert!(state.closed_games.iter().any(|game| game.code == code));

    settle(&first, |phase| matches!(phase, GamePhase::OpponentPlayed { .. })).await;
    assert_eq!(
        first.state().result(),
        Some(&GameResult {
            player: Hand::Rock,
            opponent: Hand::Paper,
            outcome: Outcome::from("PLAYER_2_WIN"),
        })
    );

    let polls = service.count(&format!("GET /game/{}", code)).await;
    assert!(polls >= 1);
    tokio::time::sleep(Duration::from_millis(100)).await;
    assert_eq!(service.count(&format!("GET /game/{}", code)).await, polls);
    service.shutdown().await;
}

#[tokio::test]
async fn code_is_read_from_location_header() {
    let service = FakeGameService::start().await;
    service.set_location_only(true).await;
    let api = HttpGameApi::new(&config(&service)).unwrap();

    let code = api.create_game(Hand::Paper).await.unwrap();
    let open = api.open_games().await.unwrap();
    assert_eq!(open[0].code, code);
    service.shutdown().await;
}

#[tokio::test]
async fn challenging_a_missing_game_fails() {
    let service = FakeGameService::start().await;
    let controller = GameController::connect(config(&service)).unwrap();

    let result = controller
        .play_opponent(&GameCode::from("NOPE1234"), Hand::Rock)
        .await;
    assert!(matches!(result, Err(ClientError::Status { .. })));
    assert_eq!(controller.state().message.as_deref(), Some("Failed to play game"));
    assert_eq!(service.count("GET /game/list/all").await, 0);
    service.shutdown().await;
}

#[tokio::test]
async fn outage_stalls_polling_until_resumed() {
    let service = FakeGameService::start().await;
    let first = GameController::connect(config(&service)).unwrap();
    let second = GameController::connect(config(&service)).unwrap();
    first.select_opponent(OpponentType::Player);
    first.start_game(Hand::Scissors).await.unwrap();
    let code = first.state().code().cloned().expect("Game code");

    service.set_unavailable(true).await;
    settle(&first, |phase| {
        matches!(phase, GamePhase::WaitingForOpponent { stalled: true, .. })
    })
    .await;
    assert!(!first.is_polling());
    assert!(first
        .state()
        .message
        .is_some_and(|message| message.contains(code.as_str())));

    service.set_unavailable(false).await;
    assert!(first.resume_polling());
    second.play_opponent(&code, Hand::Scissors).await.unwrap();

    settle(&first, |phase| matches!(phase, GamePhase::OpponentPlayed { .. })).await;
    assert_eq!(
        first.state().result().map(|result| result.outcome.clone()),
        Some(Outcome::from("DRAW"))
    );
    service.shutdown().await;
}

#[tokio::test]
async fn concurrent_starts_open_a_single_game() {
    let service = FakeGameService::start().await;
    let controller = GameController::connect(config(&service)).unwrap();
    controller.select_opponent(OpponentType::Player);

    let (rock, paper) = tokio::join!(
        controller.start_game(Hand::Rock),
        controller.start_game(Hand::Paper),
    );
    let code = controller.state().code().cloned().expect("Game code");
    let refused = match (rock, paper) {
        (Ok(()), Err(e)) | (Err(e), Ok(())) => e,
        other => panic!("Expected exactly one start to succeed, got {:?}", other),
    };
    assert!(matches!(&refused, ClientError::GameInProgress(busy) if *busy == code));
    assert_eq!(service.count("POST /game").await, 1);
    assert_eq!(controller.state().awaited_code(), Some(&code));
    assert!(controller.is_polling());

    let second = GameController::connect(config(&service)).unwrap();
    second.play_opponent(&code, Hand::Rock).await.unwrap();
    settle(&controller, |phase| matches!(phase, GamePhase::OpponentPlayed { .. })).await;
    assert!(controller.state().result().is_some());
    service.shutdown().await;
}

#[tokio::test]
async fn body_that_is_not_json_fails_to_decode() {
    let service = FakeGameService::start().await;
    let controller = GameController::connect(config(&service)).unwrap();
    controller.select_opponent(OpponentType::Player);
    controller.start_game(Hand::Paper).await.unwrap();
    let code = controller.state().code().cloned().expect("Game code");

    service.set_garbled(true).await;
    settle(&controller, |phase| {
        matches!(phase, GamePhase::WaitingForOpponent { stalled: true, .. })
    })
    .await;
    assert!(!controller.is_polling());
    assert!(controller
        .state()
        .message
        .is_some_and(|message| message.contains(code.as_str())));

    let result = controller.refresh_all_games().await;
    assert!(matches!(result, Err(ClientError::Decode(_))));
    assert_eq!(controller.state().message.as_deref(), Some("Failed to load games"));
    service.shutdown().await;
}

#[tokio::test]
async fn unreachable_service_is_a_transport_error() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let address = listener.local_addr().unwrap();
    drop(listener);
    let controller = GameController::connect(ClientConfig {
        server_url: format!("http://{}/", address),
        request_timeout: Duration::from_secs(2),
        ..ClientConfig::default()
    })
    .unwrap();

    let result = controller.refresh_all_games().await;
    assert!(matches!(result, Err(ClientError::Http(_))));
    assert_eq!(controller.state().message.as_deref(), Some("Failed to load games"));

    let result = controller.start_game(Hand::Rock).await;
    assert!(matches!(result, Err(ClientError::Http(_))));
    assert_eq!(controller.state().message.as_deref(), Some("Failed to play computer"));
    assert_eq!(controller.state().phase, GamePhase::NotStarted);
}
