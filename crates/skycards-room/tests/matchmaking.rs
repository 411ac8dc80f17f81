//! Integration tests for matchmaking and the room actor.

use std::time::Duration;

use skycards_protocol::{
    Card, DECK_SIZE, Deck, GameOverMessage, PlayerId, RoomCode, ServerMessage,
};
use skycards_room::{Contender, MatchStatus, Matchmaker, RoomConfig, RoomError};
use tokio::sync::mpsc;

type Inbox = mpsc::UnboundedReceiver<ServerMessage>;

// =========================================================================
// Helpers
// =========================================================================

/// A contender whose every stat on card `i` is `base + i`.
fn contender(id: u64, name: &str, base: u32) -> (Contender, Inbox) {
    let cards = (0..DECK_SIZE as u32)
        .map(|i| Card {
            name: format!("{name}-{i}"),
            rarity: "common".into(),
            wingspan: base + i,
            speed: base + i,
            height: base + i,
            passengers: base + i,
        })
        .collect::<Vec<_>>();
    let (tx, rx) = mpsc::unbounded_channel();
    let c = Contender {
        player_id: PlayerId(id),
        name: name.to_string(),
        deck: Deck::try_from(cards).unwrap(),
        outbox: tx,
    };
    (c, rx)
}

async fn next(inbox: &mut Inbox) -> ServerMessage {
    tokio::time::timeout(Duration::from_secs(2), inbox.recv())
        .await
        .expect("timed out waiting for a message")
        .expect("outbox closed")
}

async fn expect_pairing(inbox: &mut Inbox, opponent: &str) {
    assert!(matches!(next(inbox).await, ServerMessage::Pareado(_)));
    match next(inbox).await {
        ServerMessage::GameStart(msg) => assert_eq!(msg.opponent, opponent),
        other => panic!("expected GAME_START, got {other:?}"),
    }
}

async fn expect_round_start(inbox: &mut Inbox, round: u32) {
    match next(inbox).await {
        ServerMessage::RoundStart(msg) => {
            assert_eq!(msg.round, round);
            assert_eq!(msg.hand.len(), DECK_SIZE + 1 - round as usize);
        }
        other => panic!("expected ROUND_START {round}, got {other:?}"),
    }
}

async fn expect_game_over(inbox: &mut Inbox) -> GameOverMessage {
    match next(inbox).await {
        ServerMessage::GameOver(msg) => msg,
        other => panic!("expected GAME_OVER, got {other:?}"),
    }
}

async fn expect_screen(inbox: &mut Inbox) -> String {
    match next(inbox).await {
        ServerMessage::ScreenMsg(msg) => msg.content,
        other => panic!("expected SCREEN_MSG, got {other:?}"),
    }
}

/// Pairs ana (strong deck, seat one) with bia through the public queue.
async fn paired(config: RoomConfig) -> (Matchmaker, Inbox, Inbox) {
    let mm = Matchmaker::new(config);
    let (ana, mut ra) = contender(1, "ana", 10);
    let (bia, mut rb) = contender(2, "bia", 0);

    assert!(matches!(mm.find_public(ana).await.unwrap(), MatchStatus::Waiting(_)));
    assert!(matches!(mm.find_public(bia).await.unwrap(), MatchStatus::Paired(_)));

    expect_pairing(&mut ra, "bia").await;
    expect_pairing(&mut rb, "ana").await;
    (mm, ra, rb)
}

// =========================================================================
// Full match
// =========================================================================

#[tokio::test]
async fn test_public_match_plays_three_rounds_to_game_over() {
    let (mm, mut ra, mut rb) = paired(RoomConfig::immediate()).await;

    for round in 1..=3 {
        expect_round_start(&mut ra, round).await;
        expect_round_start(&mut rb, round).await;

        mm.submit_move(PlayerId(1), 0, "speed".into()).await.unwrap();
        mm.submit_move(PlayerId(2), 0, "height".into()).await.unwrap();

        for inbox in [&mut ra, &mut rb] {
            match next(inbox).await {
                ServerMessage::RoundResult(result) => {
                    assert_eq!(result.round, round);
                    assert_eq!(result.player1_move.player_name, "ana");
                    assert_eq!(result.player2_move.card_name, format!("bia-{}", round - 1));
                    assert_eq!(result.round_points_p1, 3);
                    assert_eq!(result.round_points_p2, 0);
                    assert_eq!(result.total_score_p1, 3 * round);
                }
                other => panic!("expected ROUND_RESULT, got {other:?}"),
            }
        }
    }

    let over_a = expect_game_over(&mut ra).await;
    let over_b = expect_game_over(&mut rb).await;
    assert_eq!(over_a.winner, "ana");
    assert_eq!((over_a.final_score_p1, over_a.final_score_p2), (9, 0));
    assert_eq!(over_a.coins_earned, 9);
    assert_eq!(over_b.winner, "ana");
    assert_eq!(over_b.coins_earned, 0);

    // The room is out of the registry before GAME_OVER is delivered.
    assert_eq!(mm.room_count().await, 0);
    assert!(mm.room_of(PlayerId(1)).await.is_none());
    assert!(mm.room_of(PlayerId(2)).await.is_none());
}

#[tokio::test]
async fn test_player_can_queue_again_after_game_over() {
    let (mm, mut ra, mut rb) = paired(RoomConfig::immediate()).await;
    for round in 1..=3 {
        expect_round_start(&mut ra, round).await;
        expect_round_start(&mut rb, round).await;
        mm.submit_move(PlayerId(1), 0, "wingspan".into()).await.unwrap();
        mm.submit_move(PlayerId(2), 0, "wingspan".into()).await.unwrap();
        next(&mut ra).await;
        next(&mut rb).await;
    }
    expect_game_over(&mut ra).await;

    let (again, _rx) = contender(1, "ana", 10);
    assert!(matches!(mm.find_public(again).await.unwrap(), MatchStatus::Waiting(_)));
}

#[tokio::test]
async fn test_move_before_round_start_returns_no_active_match() {
    let config = RoomConfig {
        start_delay: Duration::from_millis(300),
        ..RoomConfig::immediate()
    };
    let (mm, mut ra, _rb) = paired(config).await;

    let result = mm.submit_move(PlayerId(1), 0, "speed".into()).await;
    assert!(matches!(result, Err(RoomError::NoActiveMatch)));

    expect_round_start(&mut ra, 1).await;
    mm.submit_move(PlayerId(1), 0, "speed".into()).await.unwrap();
}

#[tokio::test]
async fn test_invalid_move_is_reported_and_round_continues() {
    let (mm, mut ra, mut rb) = paired(RoomConfig::immediate()).await;
    expect_round_start(&mut ra, 1).await;
    expect_round_start(&mut rb, 1).await;

    let result = mm.submit_move(PlayerId(1), 9, "speed".into()).await;
    assert!(matches!(result, Err(RoomError::InvalidCardIndex { index: 9, hand_len: 4 })));
    let result = mm.submit_move(PlayerId(1), 0, "altitude".into()).await;
    assert!(matches!(result, Err(RoomError::InvalidAttribute(_))));

    mm.submit_move(PlayerId(1), 0, "speed".into()).await.unwrap();
    mm.submit_move(PlayerId(2), 0, "speed".into()).await.unwrap();
    assert!(matches!(next(&mut ra).await, ServerMessage::RoundResult(_)));
}

#[tokio::test]
async fn test_submit_move_outside_room_returns_no_active_match() {
    let mm = Matchmaker::new(RoomConfig::immediate());
    let result = mm.submit_move(PlayerId(5), 0, "speed".into()).await;
    assert!(matches!(result, Err(RoomError::NoActiveMatch)));

    let (solo, _rx) = contender(5, "solo", 0);
    mm.find_public(solo).await.unwrap();
    let result = mm.submit_move(PlayerId(5), 0, "speed".into()).await;
    assert!(matches!(result, Err(RoomError::NoActiveMatch)));
}

// =========================================================================
// Private rooms
// =========================================================================

#[tokio::test]
async fn test_private_room_pairs_by_code() {
    let mm = Matchmaker::new(RoomConfig::immediate());
    let (ana, mut ra) = contender(1, "ana", 0);
    let (bia, mut rb) = contender(2, "bia", 0);

    let code = mm.create_private(ana).await.unwrap();
    assert_eq!(code.as_str().len(), 6);
    assert_eq!(mm.waiting_public().await, 0);

    mm.join_private(bia, &code).await.unwrap();
    expect_pairing(&mut ra, "bia").await;
    expect_pairing(&mut rb, "ana").await;
    assert_eq!(mm.room_of(PlayerId(2)).await, Some(code));
}

#[tokio::test]
async fn test_join_private_unknown_code_leaves_player_free() {
    let mm = Matchmaker::new(RoomConfig::immediate());
    let (bia, _rb) = contender(2, "bia", 0);

    let result = mm.join_private(bia.clone(), &RoomCode::new("ZZZZZZ")).await;
    assert!(matches!(result, Err(RoomError::UnknownRoomCode(_))));
    assert!(matches!(mm.find_public(bia).await.unwrap(), MatchStatus::Waiting(_)));
}

// =========================================================================
// Leaving and forfeits
// =========================================================================

#[tokio::test]
async fn test_leave_waiting_room_removes_it() {
    let mm = Matchmaker::new(RoomConfig::immediate());
    let (ana, _ra) = contender(1, "ana", 0);
    let (bia, _rb) = contender(2, "bia", 0);

    mm.find_public(ana).await.unwrap();
    mm.leave(PlayerId(1)).await;
    assert_eq!(mm.room_count().await, 0);
    assert_eq!(mm.waiting_public().await, 0);

    assert!(matches!(mm.find_public(bia).await.unwrap(), MatchStatus::Waiting(_)));
}

#[tokio::test]
async fn test_leave_mid_match_forfeits_to_opponent() {
    let (mm, mut ra, mut rb) = paired(RoomConfig::immediate()).await;
    expect_round_start(&mut ra, 1).await;
    expect_round_start(&mut rb, 1).await;

    mm.leave(PlayerId(1)).await;

    assert_eq!(expect_screen(&mut rb).await, "opponent left the match");
    let over = expect_game_over(&mut rb).await;
    assert_eq!(over.winner, "bia");
    assert_eq!((over.final_score_p1, over.final_score_p2), (0, 0));
    assert_eq!(mm.room_count().await, 0);
}

#[tokio::test]
async fn test_closed_outbox_forfeits_match() {
    let mm = Matchmaker::new(RoomConfig::immediate());
    let (ana, ra) = contender(1, "ana", 0);
    let (bia, mut rb) = contender(2, "bia", 0);

    mm.find_public(ana).await.unwrap();
    drop(ra);
    mm.find_public(bia).await.unwrap();

    expect_pairing(&mut rb, "ana").await;
    assert_eq!(expect_screen(&mut rb).await, "opponent left the match");
    assert_eq!(expect_game_over(&mut rb).await.winner, "bia");
}

#[tokio::test]
async fn test_move_timeout_forfeits_idle_player() {
    let config = RoomConfig {
        move_timeout: Some(Duration::from_millis(100)),
        ..RoomConfig::immediate()
    };
    let (mm, mut ra, mut rb) = paired(config).await;
    expect_round_start(&mut ra, 1).await;
    expect_round_start(&mut rb, 1).await;

    mm.submit_move(PlayerId(1), 0, "speed".into()).await.unwrap();

    assert_eq!(expect_screen(&mut ra).await, "opponent ran out of time");
    assert_eq!(expect_game_over(&mut ra).await.winner, "ana");
    assert_eq!(expect_game_over(&mut rb).await.winner, "ana");
}

#[tokio::test]
async fn test_move_timeout_with_no_moves_is_a_draw() {
    let config = RoomConfig {
        move_timeout: Some(Duration::from_millis(100)),
        ..RoomConfig::immediate()
    };
    let (_mm, mut ra, mut rb) = paired(config).await;
    expect_round_start(&mut ra, 1).await;
    expect_round_start(&mut rb, 1).await;

    assert_eq!(expect_game_over(&mut ra).await.winner, "DRAW");
    assert_eq!(expect_game_over(&mut rb).await.winner, "DRAW");
}

// =========================================================================
// Chat and concurrency
// =========================================================================

#[tokio::test]
async fn test_chat_relays_to_opponent() {
    let (mm, _ra, mut rb) = paired(RoomConfig::immediate()).await;
    expect_round_start(&mut rb, 1).await;

    mm.chat(PlayerId(1), "good luck".into()).await.unwrap();
    match next(&mut rb).await {
        ServerMessage::Chat(msg) => {
            assert_eq!(msg.from, "ana");
            assert_eq!(msg.content, "good luck");
        }
        other => panic!("expected CHAT, got {other:?}"),
    }
}

#[tokio::test]
async fn test_chat_without_opponent_returns_error() {
    let mm = Matchmaker::new(RoomConfig::immediate());
    let (ana, _ra) = contender(1, "ana", 0);
    mm.find_public(ana).await.unwrap();

    let result = mm.chat(PlayerId(1), "anyone?".into()).await;
    assert!(matches!(result, Err(RoomError::NoOpponent)));
}

#[tokio::test]
async fn test_concurrent_public_requests_pair_everyone_once() {
    let mm = Matchmaker::new(RoomConfig::immediate());
    let mut inboxes = Vec::new();
    let mut tasks = Vec::new();

    for id in 0..10 {
        let (c, rx) = contender(id, &format!("p{id}"), 0);
        inboxes.push(rx);
        let mm = mm.clone();
        tasks.push(tokio::spawn(async move { mm.find_public(c).await }));
    }

    let mut paired = 0;
    for task in tasks {
        if let MatchStatus::Paired(_) = task.await.unwrap().unwrap() {
            paired += 1;
        }
    }

    assert_eq!(paired, 5);
    assert_eq!(mm.room_count().await, 5);
    assert_eq!(mm.waiting_public().await, 0);
}
