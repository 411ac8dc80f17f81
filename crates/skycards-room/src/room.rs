//! Room actor: one Tokio task per paired room, owning its round engine.
//!
//! The outside world talks to a room only through its [`RoomHandle`]; the
//! actor processes one command at a time, so a move submission, the check
//! for the second move, and the round resolution never interleave with
//! anything else in the room. The actor never touches a socket. Outbound
//! messages go to each player's unbounded outbox and the connection task
//! writes them.

use std::sync::Arc;
use std::time::Duration;

use skycards_protocol::{
    ChatMessage, DRAW, Deck, GameOverMessage, GameStartMessage, MoveReport,
    PairingNotice, PlayerId, RoomCode, RoundResultMessage, RoundStartMessage,
    ServerMessage,
};
use tokio::sync::{mpsc, oneshot};
use tokio::time::Instant;

use crate::round::{GameState, Play, RoundOutcome, Seat, Standing};
use crate::{Matchmaker, RewardPolicy, RoomConfig, RoomError, RoomState};

/// Told to the remaining player when the opponent disconnects or quits.
const OPPONENT_LEFT: &str = "opponent left the match";

/// Told to the remaining player when the opponent lets the move timer run out.
const OPPONENT_TIMED_OUT: &str = "opponent ran out of time";

/// Channel sender for delivering outbound messages to a player's connection.
pub type PlayerSender = mpsc::UnboundedSender<ServerMessage>;

/// A player entering matchmaking: who they are, what they play with, and
/// where to send their messages.
#[derive(Debug, Clone)]
pub struct Contender {
    pub player_id: PlayerId,
    pub name: String,
    pub deck: Deck,
    pub outbox: PlayerSender,
}

/// Commands sent to a room actor through its channel.
pub(crate) enum RoomCommand {
    SubmitMove {
        player_id: PlayerId,
        card_index: i64,
        attribute: String,
        reply: oneshot::Sender<Result<(), RoomError>>,
    },

    /// Relay a chat line to the other seat.
    Chat { player_id: PlayerId, content: String },

    /// The player is gone; they forfeit.
    Leave {
        player_id: PlayerId,
        reply: oneshot::Sender<()>,
    },
}

/// Handle to a running room actor.
///
/// Cheap to clone. The matchmaker keeps one per paired room.
#[derive(Debug, Clone)]
pub struct RoomHandle {
    code: RoomCode,
    sender: mpsc::Sender<RoomCommand>,
}

impl RoomHandle {
    pub fn code(&self) -> &RoomCode {
        &self.code
    }

    /// Submits a move and waits for the room to accept or reject it.
    pub async fn submit_move(
        &self,
        player_id: PlayerId,
        card_index: i64,
        attribute: String,
    ) -> Result<(), RoomError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.sender
            .send(RoomCommand::SubmitMove {
                player_id,
                card_index,
                attribute,
                reply: reply_tx,
            })
            .await
            .map_err(|_| RoomError::Unavailable(self.code.clone()))?;
        reply_rx
            .await
            .map_err(|_| RoomError::Unavailable(self.code.clone()))?
    }

    /// Relays a chat line to the opponent (fire-and-forget).
    pub async fn chat(
        &self,
        player_id: PlayerId,
        content: String,
    ) -> Result<(), RoomError> {
        self.sender
            .send(RoomCommand::Chat { player_id, content })
            .await
            .map_err(|_| RoomError::Unavailable(self.code.clone()))
    }

    /// Removes the player from the match, forfeiting it.
    pub async fn leave(&self, player_id: PlayerId) -> Result<(), RoomError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.sender
            .send(RoomCommand::Leave {
                player_id,
                reply: reply_tx,
            })
            .await
            .map_err(|_| RoomError::Unavailable(self.code.clone()))?;
        reply_rx
            .await
            .map_err(|_| RoomError::Unavailable(self.code.clone()))
    }
}

/// What the single actor timer is counting down to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Timer {
    NextRound,
    MoveDeadline,
}

struct Seated {
    player_id: PlayerId,
    name: String,
    outbox: PlayerSender,
    /// Cleared on the first failed send; the player then forfeits.
    reachable: bool,
}

/// The internal room actor state. Runs inside a Tokio task.
struct RoomActor {
    code: RoomCode,
    config: RoomConfig,
    state: RoomState,
    seats: [Seated; 2],
    game: GameState,
    rewards: Arc<dyn RewardPolicy>,
    receiver: mpsc::Receiver<RoomCommand>,
    timer: Option<(Instant, Timer)>,
    /// Messages held back until the room is out of the registry, so a
    /// player who sees `GAME_OVER` can queue again straight away.
    farewell: Vec<(Seat, ServerMessage)>,
}

impl RoomActor {
    /// Runs the match to completion and hands the actor back for the
    /// final deliveries.
    async fn run(mut self) -> Self {
        tracing::info!(
            room = %self.code,
            first = %self.seats[0].player_id,
            second = %self.seats[1].player_id,
            "match started"
        );

        self.announce_pairing();
        self.schedule(Timer::NextRound, self.config.start_delay);
        self.check_reachable();

        while self.state == RoomState::InProgress {
            let deadline = self.timer.map(|(at, _)| at);
            tokio::select! {
                cmd = self.receiver.recv() => match cmd {
                    Some(cmd) => self.handle_command(cmd),
                    None => {
                        tracing::warn!(room = %self.code, "room handle dropped mid-match");
                        self.game.abandon();
                        self.state = RoomState::Finished;
                    }
                },
                () = wait_until(deadline) => self.on_timer(),
            }
            self.check_reachable();
        }

        self
    }

    fn handle_command(&mut self, cmd: RoomCommand) {
        match cmd {
            RoomCommand::SubmitMove {
                player_id,
                card_index,
                attribute,
                reply,
            } => {
                let result = self.submit_move(player_id, card_index, &attribute);
                if let Err(e) = &result {
                    tracing::debug!(room = %self.code, %player_id, error = %e, "move rejected");
                }
                let _ = reply.send(result);
            }
            RoomCommand::Chat { player_id, content } => {
                if let Some(seat) = self.seat_of(player_id) {
                    let from = self.seats[seat.index()].name.clone();
                    self.send_to(
                        seat.other(),
                        ServerMessage::Chat(ChatMessage { from, content }),
                    );
                }
            }
            RoomCommand::Leave { player_id, reply } => {
                if let Some(seat) = self.seat_of(player_id) {
                    self.forfeit(seat, OPPONENT_LEFT);
                }
                let _ = reply.send(());
            }
        }
    }

    fn submit_move(
        &mut self,
        player_id: PlayerId,
        card_index: i64,
        attribute: &str,
    ) -> Result<(), RoomError> {
        let seat = self.seat_of(player_id).ok_or(RoomError::NoActiveMatch)?;
        let Some(outcome) = self.game.submit_move(seat, card_index, attribute)? else {
            tracing::debug!(room = %self.code, %player_id, "move recorded");
            return Ok(());
        };

        self.timer = None;
        let result = self.round_result(&outcome);
        for seat in Seat::BOTH {
            self.send_to(seat, ServerMessage::RoundResult(result.clone()));
        }
        tracing::info!(
            room = %self.code,
            round = outcome.round,
            total_p1 = outcome.totals[0],
            total_p2 = outcome.totals[1],
            "round resolved"
        );

        if self.game.is_over() {
            self.conclude(self.game.standing());
        } else {
            self.schedule(Timer::NextRound, self.config.result_delay);
        }
        Ok(())
    }

    fn on_timer(&mut self) {
        let Some((_, timer)) = self.timer.take() else {
            return;
        };
        match timer {
            Timer::NextRound => self.start_round(),
            Timer::MoveDeadline => self.expire_round(),
        }
    }

    fn start_round(&mut self) {
        let Ok(round) = self.game.begin_round() else {
            return;
        };
        for seat in Seat::BOTH {
            let hand = self.game.hand(seat).to_vec();
            self.send_to(
                seat,
                ServerMessage::RoundStart(RoundStartMessage { round, hand }),
            );
        }
        if let Some(timeout) = self.config.move_timeout {
            self.schedule(Timer::MoveDeadline, timeout);
        }
        tracing::debug!(room = %self.code, round, "round started");
    }

    /// The move timer ran out. A lone straggler forfeits; if nobody moved
    /// the match ends level.
    fn expire_round(&mut self) {
        let idle: Vec<Seat> = Seat::BOTH
            .into_iter()
            .filter(|seat| !self.game.has_submitted(*seat))
            .collect();
        match idle.as_slice() {
            [seat] => self.forfeit(*seat, OPPONENT_TIMED_OUT),
            _ => {
                tracing::warn!(room = %self.code, "no moves before the deadline");
                self.game.abandon();
                self.conclude(Standing::Draw);
            }
        }
    }

    fn forfeit(&mut self, loser: Seat, notice: &str) {
        if self.state != RoomState::InProgress {
            return;
        }
        tracing::warn!(
            room = %self.code,
            player_id = %self.seats[loser.index()].player_id,
            notice,
            "player forfeited"
        );
        self.game.abandon();
        self.farewell
            .push((loser.other(), ServerMessage::screen(notice)));
        self.conclude(Standing::Winner(loser.other()));
    }

    /// Queues each player's `GAME_OVER` and finishes the room.
    fn conclude(&mut self, standing: Standing) {
        let scores = self.game.scores();
        let winner = match standing {
            Standing::Winner(seat) => self.seats[seat.index()].name.clone(),
            Standing::Draw => DRAW.to_string(),
        };

        for seat in Seat::BOTH {
            let own = scores[seat.index()];
            let opponent = scores[seat.other().index()];
            let msg = GameOverMessage {
                winner: winner.clone(),
                final_score_p1: scores[0],
                final_score_p2: scores[1],
                coins_earned: self.rewards.coins(own, opponent),
            };
            self.farewell.push((seat, ServerMessage::GameOver(msg)));
        }

        self.timer = None;
        debug_assert!(self.state.can_transition_to(RoomState::Finished));
        self.state = RoomState::Finished;
        tracing::info!(
            room = %self.code,
            %winner,
            final_p1 = scores[0],
            final_p2 = scores[1],
            "game over"
        );
    }

    /// A player whose outbox has closed is treated as having left.
    fn check_reachable(&mut self) {
        if let Some(seat) = Seat::BOTH
            .into_iter()
            .find(|seat| !self.seats[seat.index()].reachable)
        {
            self.forfeit(seat, OPPONENT_LEFT);
        }
    }

    fn announce_pairing(&mut self) {
        for seat in Seat::BOTH {
            let opponent = self.seats[seat.other().index()].name.clone();
            self.send_to(seat, ServerMessage::Pareado(PairingNotice::default()));
            self.send_to(
                seat,
                ServerMessage::GameStart(GameStartMessage { opponent }),
            );
        }
    }

    fn round_result(&self, outcome: &RoundOutcome) -> RoundResultMessage {
        let report = |seat: Seat, play: &Play| MoveReport {
            player_name: self.seats[seat.index()].name.clone(),
            card_name: play.card.name.clone(),
            attribute: play.attribute,
            attribute_value: play.value,
        };
        RoundResultMessage {
            round: outcome.round,
            player1_move: report(Seat::First, &outcome.plays[0]),
            player2_move: report(Seat::Second, &outcome.plays[1]),
            round_points_p1: outcome.plays[0].points,
            round_points_p2: outcome.plays[1].points,
            total_score_p1: outcome.totals[0],
            total_score_p2: outcome.totals[1],
        }
    }

    fn seat_of(&self, player_id: PlayerId) -> Option<Seat> {
        Seat::BOTH
            .into_iter()
            .find(|seat| self.seats[seat.index()].player_id == player_id)
    }

    fn schedule(&mut self, timer: Timer, after: Duration) {
        self.timer = Some((Instant::now() + after, timer));
    }

    /// Sends to one seat. A closed outbox marks the seat unreachable
    /// instead of failing.
    fn send_to(&mut self, seat: Seat, msg: ServerMessage) {
        let seated = &mut self.seats[seat.index()];
        if !seated.reachable {
            return;
        }
        if seated.outbox.send(msg).is_err() {
            seated.reachable = false;
            tracing::warn!(
                room = %self.code,
                player_id = %seated.player_id,
                "player outbox closed"
            );
        }
    }

    fn deliver_farewell(&mut self) {
        for (seat, msg) in std::mem::take(&mut self.farewell) {
            self.send_to(seat, msg);
        }
    }
}

async fn wait_until(deadline: Option<Instant>) {
    match deadline {
        Some(at) => tokio::time::sleep_until(at).await,
        None => std::future::pending().await,
    }
}

/// Spawns the actor for a freshly paired room.
///
/// `first` is the player who opened the room. When the match ends the
/// actor removes the room from `matchmaker` before sending `GAME_OVER`.
pub(crate) fn spawn_room(
    code: RoomCode,
    first: Contender,
    second: Contender,
    config: RoomConfig,
    rewards: Arc<dyn RewardPolicy>,
    matchmaker: Matchmaker,
) -> RoomHandle {
    let (tx, rx) = mpsc::channel(config.channel_size.max(1));
    let game = GameState::new(&first.deck, &second.deck);
    let seat = |c: Contender| Seated {
        player_id: c.player_id,
        name: c.name,
        outbox: c.outbox,
        reachable: true,
    };

    let actor = RoomActor {
        code: code.clone(),
        config,
        state: RoomState::InProgress,
        seats: [seat(first), seat(second)],
        game,
        rewards,
        receiver: rx,
        timer: None,
        farewell: Vec::new(),
    };

    let finished = code.clone();
    tokio::spawn(async move {
        let mut actor = actor.run().await;
        matchmaker.finish_room(&finished).await;
        actor.deliver_farewell();
        tracing::info!(room = %finished, "room actor stopped");
    });

    RoomHandle { code, sender: tx }
}
