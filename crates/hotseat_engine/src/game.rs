//! The shared table: seats, queue, board, and round rotation.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, instrument, warn};

use crate::board::Board;
use crate::error::GameError;
use crate::sink::StateSink;
use crate::types::{Piece, Player, PlayerId, Seat, Status};
use crate::watchdog::Watchdog;

/// Timing knobs for a table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TableConfig {
    /// How long the current player may take before the watchdog moves
    /// for them.
    pub move_timeout: Duration,
    /// How long a finished board stays visible before it clears for
    /// the next round.
    pub grace_delay: Duration,
}

impl Default for TableConfig {
    fn default() -> Self {
        Self {
            move_timeout: Duration::from_secs(5),
            grace_delay: Duration::from_secs(3),
        }
    }
}

/// Full state of the table at one instant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableSnapshot {
    /// The board grid, row by row, cells as piece weights.
    pub board: Option<Board>,
    /// Players waiting for a seat, front of the queue first.
    pub queue: Vec<Player>,
    /// Occupant of seat A.
    pub seat_a: Option<Player>,
    /// Occupant of seat B.
    pub seat_b: Option<Player>,
    /// Seat expected to move next, when a round is underway.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub turn: Option<Seat>,
    /// Status derived from the seats and the board.
    pub status: Status,
}

/// Sink handle plus the snapshot to hand it, captured under the lock
/// and delivered after release.
type Notification = Option<(Arc<dyn StateSink>, TableSnapshot)>;

/// Cloneable handle to one shared table.
///
/// All clones operate on the same state; public operations, the
/// watchdog's automatic moves, and deferred round transitions all
/// serialize on one internal lock. The table spawns its timers onto
/// the ambient tokio runtime, so operations must run inside one.
#[derive(Debug, Clone)]
pub struct Table {
    shared: Arc<Shared>,
}

impl Table {
    /// Creates a table with an empty board, empty seats, and an empty
    /// queue. The draw coin is seeded from entropy.
    pub fn new(config: TableConfig) -> Self {
        Self::with_rng(config, ChaCha8Rng::from_entropy())
    }

    /// Creates a table whose draw coin is seeded, for reproducible
    /// rotation in tests and simulations.
    pub fn with_seed(config: TableConfig, seed: u64) -> Self {
        Self::with_rng(config, ChaCha8Rng::seed_from_u64(seed))
    }

    fn with_rng(config: TableConfig, rng: ChaCha8Rng) -> Self {
        Self {
            shared: Arc::new(Shared {
                config,
                inner: Mutex::new(Inner::new(rng)),
            }),
        }
    }

    /// Attaches the sink that receives a snapshot after every
    /// successful mutation, replacing any previous one. Until a sink
    /// is attached, notifications are dropped.
    pub fn set_sink(&self, sink: Arc<dyn StateSink>) {
        let mut inner = self.shared.inner.lock().unwrap();
        inner.sink = Some(sink);
    }

    /// Current state of the table.
    pub fn snapshot(&self) -> TableSnapshot {
        self.shared.inner.lock().unwrap().snapshot()
    }

    /// Seats the player, or queues them when both seats are taken.
    ///
    /// Seat A fills before seat B; filling the second seat starts the
    /// round and arms the watchdog. Rejected when the id is already
    /// seated or queued.
    #[instrument(skip(self, player), fields(player_id = %player.id))]
    pub fn add_player(&self, player: Player) -> Result<(), GameError> {
        let mut inner = self.shared.inner.lock().unwrap();
        self.shared.add_player_locked(&mut inner, player)?;
        let notification = inner.notification();
        drop(inner);
        deliver(notification);
        Ok(())
    }

    /// Replaces the stored record for the player with this id,
    /// searching seat A, then seat B, then the queue.
    #[instrument(skip(self, player), fields(player_id = %player.id))]
    pub fn update_player(&self, player: Player) -> Result<(), GameError> {
        let mut inner = self.shared.inner.lock().unwrap();
        inner.update_player(player)?;
        let notification = inner.notification();
        drop(inner);
        deliver(notification);
        Ok(())
    }

    /// Removes the player with this id.
    ///
    /// Removing a seated player clears the board and advances the
    /// round immediately so the seat refills from the queue. Removing
    /// a queued player splices them out with the queue order intact.
    #[instrument(skip(self))]
    pub fn remove_player(&self, id: &str) -> Result<(), GameError> {
        let mut inner = self.shared.inner.lock().unwrap();
        self.shared.remove_player_locked(&mut inner, id)?;
        let notification = inner.notification();
        drop(inner);
        deliver(notification);
        Ok(())
    }

    /// Places the mover's piece at (`x`, `y`).
    ///
    /// Legal only while a round is in progress, for the player whose
    /// turn it is, onto an empty in-range cell. A successful move
    /// flips the turn and restarts the watchdog; a move that ends the
    /// round schedules the next one after the grace delay, leaving the
    /// final board visible in the meantime.
    #[instrument(skip(self))]
    pub fn place_move(&self, player_id: &str, x: usize, y: usize) -> Result<(), GameError> {
        let mut inner = self.shared.inner.lock().unwrap();
        self.shared.place_move_locked(&mut inner, player_id, x, y)?;
        let notification = inner.notification();
        drop(inner);
        deliver(notification);
        Ok(())
    }

    /// Returns the table to its just-constructed shape: fresh board,
    /// empty seats and queue, no turn holder, watchdog stopped. The
    /// sink and the timing configuration survive.
    #[instrument(skip(self))]
    pub fn reset(&self) {
        let mut inner = self.shared.inner.lock().unwrap();
        self.shared.reset_locked(&mut inner);
        let notification = inner.notification();
        drop(inner);
        deliver(notification);
    }
}

/// State and configuration behind one table handle.
#[derive(Debug)]
struct Shared {
    config: TableConfig,
    inner: Mutex<Inner>,
}

impl Shared {
    fn add_player_locked(
        self: &Arc<Self>,
        inner: &mut Inner,
        player: Player,
    ) -> Result<(), GameError> {
        if inner.contains_id(&player.id) {
            warn!("Player already seated or queued");
            return Err(GameError::AlreadyRegistered {
                player_id: player.id,
            });
        }

        if inner.seat_a.is_none() {
            info!(seat = ?Seat::A, "Seating player");
            inner.seat_a = Some(player);
            if inner.seat_b.is_none() {
                // First of the pair to sit moves first.
                inner.turn = Some(Seat::A);
            } else {
                self.begin_round(inner);
            }
        } else if inner.seat_b.is_none() {
            info!(seat = ?Seat::B, "Seating player");
            inner.seat_b = Some(player);
            self.begin_round(inner);
        } else {
            info!(depth = inner.queue.len(), "Queueing player");
            inner.queue.push_back(player);
        }

        inner.refresh_status();
        Ok(())
    }

    /// Starts play once both seats are occupied. The turn holder is
    /// whoever it already points at: the first of the pair to sit, or
    /// the side named by the previous round's transition.
    fn begin_round(self: &Arc<Self>, inner: &mut Inner) {
        info!(turn = ?inner.turn, "Round starting");
        self.start_watchdog(inner);
    }

    fn remove_player_locked(
        self: &Arc<Self>,
        inner: &mut Inner,
        id: &str,
    ) -> Result<(), GameError> {
        for seat in [Seat::A, Seat::B] {
            if inner.seat(seat).as_ref().is_some_and(|p| p.id == id) {
                info!(seat = ?seat, "Removing seated player");
                *inner.seat_mut(seat) = None;
                inner.board = Some(Board::new());
                return self.advance(inner);
            }
        }

        if let Some(position) = inner.queue.iter().position(|p| p.id == id) {
            inner.queue.remove(position);
            info!(position, "Removed queued player");
            return Ok(());
        }

        warn!("No seated or queued player with this id");
        Err(GameError::PlayerNotFound {
            player_id: id.to_string(),
        })
    }

    fn place_move_locked(
        self: &Arc<Self>,
        inner: &mut Inner,
        player_id: &str,
        x: usize,
        y: usize,
    ) -> Result<(), GameError> {
        if inner.status != Status::InProgress {
            warn!(status = ?inner.status, "Rejecting move, no round in progress");
            return Err(invalid_move(player_id, x, y));
        }

        let Some(seat) = inner.turn else {
            warn!("Rejecting move, no seat holds the turn");
            return Err(invalid_move(player_id, x, y));
        };
        if !inner.seat(seat).as_ref().is_some_and(|p| p.id == player_id) {
            warn!(turn = ?seat, "Rejecting move, not this player's turn");
            return Err(invalid_move(player_id, x, y));
        }

        let Some(board) = inner.board.as_mut() else {
            warn!("Rejecting move, no board");
            return Err(invalid_move(player_id, x, y));
        };
        match board.get(x, y) {
            Some(Piece::Empty) => {}
            Some(_) => {
                warn!("Rejecting move, cell already occupied");
                return Err(invalid_move(player_id, x, y));
            }
            None => {
                warn!("Rejecting move, coordinates out of range");
                return Err(invalid_move(player_id, x, y));
            }
        }

        board.place(x, y, seat.piece());
        inner.turn = Some(seat.other());
        inner.refresh_status();
        info!(seat = ?seat, status = ?inner.status, "Move placed");

        if inner.status.is_terminal() {
            self.stop_watchdog(inner);
            self.schedule_advance(inner);
        } else {
            // The other player gets a full timeout window.
            self.start_watchdog(inner);
        }
        Ok(())
    }

    fn reset_locked(&self, inner: &mut Inner) {
        info!("Resetting table");
        self.stop_watchdog(inner);
        inner.board = Some(Board::new());
        inner.queue.clear();
        inner.seat_a = None;
        inner.seat_b = None;
        inner.turn = None;
        inner.refresh_status();
    }

    /// Applies the round transition for the current status.
    ///
    /// Winners keep their seat while the loser rotates to the back of
    /// the queue; a drawn round displaces one occupant chosen by an
    /// unweighted coin, and the displaced side moves first next round.
    /// An in-progress round with a vacated seat refills it from the
    /// queue without touching the board or turn.
    fn advance(self: &Arc<Self>, inner: &mut Inner) -> Result<(), GameError> {
        let from = inner.status;
        match from {
            Status::AWins => {
                inner.turn = Some(Seat::B);
                inner.board = Some(Board::new());
                inner.displace(Seat::B);
            }
            Status::BWins => {
                inner.turn = Some(Seat::A);
                inner.board = Some(Board::new());
                inner.displace(Seat::A);
            }
            Status::Draw => {
                let displaced = if inner.rng.gen_bool(0.5) {
                    Seat::B
                } else {
                    Seat::A
                };
                info!(displaced = ?displaced, "Draw resolved by coin flip");
                inner.turn = Some(displaced);
                inner.board = Some(Board::new());
                inner.displace(displaced);
            }
            Status::InProgress
                if inner.seat_a.is_none() || inner.seat_b.is_none() =>
            {
                if inner.seat_a.is_none() {
                    inner.seat_a = inner.advance_queue(None);
                }
                if inner.seat_b.is_none() {
                    inner.seat_b = inner.advance_queue(None);
                }
            }
            Status::InsufficientPlayers => {}
            status => {
                warn!(status = ?status, "Round advancement called out of turn");
                return Err(GameError::InvalidStateTransition { status });
            }
        }

        self.stop_watchdog(inner);
        if inner.seat_a.is_some() && inner.seat_b.is_some() {
            self.start_watchdog(inner);
        }
        inner.refresh_status();
        info!(from = ?from, to = ?inner.status, "Round advanced");
        Ok(())
    }

    /// Arms a fresh countdown, superseding any existing one. Also
    /// serves as the reset after a successful move.
    fn start_watchdog(self: &Arc<Self>, inner: &mut Inner) {
        inner.epoch += 1;
        let epoch = inner.epoch;
        let weak = Arc::downgrade(self);
        inner.watchdog = Some(Watchdog::arm(
            epoch,
            self.config.move_timeout,
            async move {
                if let Some(shared) = weak.upgrade() {
                    shared.watchdog_elapsed(epoch);
                }
            },
        ));
    }

    fn stop_watchdog(&self, inner: &mut Inner) {
        inner.epoch += 1;
        inner.watchdog = None;
    }

    /// Queues the round transition to run after the grace delay. The
    /// captured epoch lets an advancement that happened in the
    /// meantime (a removal, a reset) supersede this one.
    fn schedule_advance(self: &Arc<Self>, inner: &Inner) {
        let epoch = inner.epoch;
        let weak = Arc::downgrade(self);
        let delay = self.config.grace_delay;
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            if let Some(shared) = weak.upgrade() {
                shared.deferred_advance(epoch);
            }
        });
    }

    #[instrument(skip(self))]
    fn deferred_advance(self: &Arc<Self>, epoch: u64) {
        let notification;
        {
            let mut inner = self.inner.lock().unwrap();
            if inner.epoch != epoch {
                debug!("Skipping superseded round advancement");
                return;
            }
            if let Err(err) = self.advance(&mut inner) {
                warn!(error = %err, "Deferred round advancement dropped");
                return;
            }
            notification = inner.notification();
        }
        deliver(notification);
    }

    /// Runs when an armed countdown elapses: places a move for the
    /// stalled turn holder in the first empty cell, through the same
    /// path a human move takes. Failures are logged and swallowed;
    /// nobody is waiting on this call.
    #[instrument(skip(self))]
    fn watchdog_elapsed(self: &Arc<Self>, epoch: u64) {
        let notification;
        {
            let mut inner = self.inner.lock().unwrap();
            if inner.watchdog.as_ref().map(Watchdog::epoch) != Some(epoch) {
                debug!("Stale watchdog firing ignored");
                return;
            }

            let Some(player_id) = inner.turn_holder_id() else {
                error!(status = ?inner.status, "Watchdog cannot identify a mover");
                self.start_watchdog(&mut inner);
                return;
            };
            let Some((x, y)) = inner.board.as_ref().and_then(Board::first_empty) else {
                error!("Watchdog found no empty cell");
                self.start_watchdog(&mut inner);
                return;
            };

            info!(player_id = %player_id, x, y, "Placing automatic move for stalled player");
            if let Err(err) = self.place_move_locked(&mut inner, &player_id, x, y) {
                error!(error = %err, "Automatic move rejected");
                self.start_watchdog(&mut inner);
                return;
            }
            notification = inner.notification();
        }
        deliver(notification);
    }
}

/// State guarded by the table lock.
#[derive(Debug)]
struct Inner {
    board: Option<Board>,
    queue: VecDeque<Player>,
    seat_a: Option<Player>,
    seat_b: Option<Player>,
    turn: Option<Seat>,
    status: Status,
    sink: Option<Arc<dyn StateSink>>,
    rng: ChaCha8Rng,
    watchdog: Option<Watchdog>,
    epoch: u64,
}

impl Inner {
    fn new(rng: ChaCha8Rng) -> Self {
        Self {
            board: Some(Board::new()),
            queue: VecDeque::new(),
            seat_a: None,
            seat_b: None,
            turn: None,
            status: Status::InsufficientPlayers,
            sink: None,
            rng,
            watchdog: None,
            epoch: 0,
        }
    }

    fn snapshot(&self) -> TableSnapshot {
        TableSnapshot {
            board: self.board.clone(),
            queue: self.queue.iter().cloned().collect(),
            seat_a: self.seat_a.clone(),
            seat_b: self.seat_b.clone(),
            turn: self.turn,
            status: self.status,
        }
    }

    fn notification(&self) -> Notification {
        self.sink.as_ref().map(|sink| (sink.clone(), self.snapshot()))
    }

    /// Derives the status from the seats and the board alone, without
    /// side effects. An empty seat short-circuits board evaluation.
    fn evaluate(&self) -> Status {
        if self.seat_a.is_none() || self.seat_b.is_none() {
            return Status::InsufficientPlayers;
        }
        let Some(board) = &self.board else {
            return Status::NoBoard;
        };

        let scan = board.scan();
        match scan.winner {
            Some(Seat::A) => Status::AWins,
            Some(Seat::B) => Status::BWins,
            None if scan.is_full() => Status::Draw,
            None => Status::InProgress,
        }
    }

    fn refresh_status(&mut self) {
        self.status = self.evaluate();
    }

    /// Appends `outgoing` to the back of the queue, then pops the new
    /// front. Append-then-pop keeps a displaced player behind everyone
    /// already waiting.
    fn advance_queue(&mut self, outgoing: Option<Player>) -> Option<Player> {
        if let Some(player) = outgoing {
            self.queue.push_back(player);
        }
        self.queue.pop_front()
    }

    /// Rotates one seat through the queue: its occupant goes to the
    /// tail and the head, if any, takes the seat.
    fn displace(&mut self, seat: Seat) {
        let outgoing = self.seat_mut(seat).take();
        let incoming = self.advance_queue(outgoing);
        *self.seat_mut(seat) = incoming;
    }

    fn seat(&self, seat: Seat) -> &Option<Player> {
        match seat {
            Seat::A => &self.seat_a,
            Seat::B => &self.seat_b,
        }
    }

    fn seat_mut(&mut self, seat: Seat) -> &mut Option<Player> {
        match seat {
            Seat::A => &mut self.seat_a,
            Seat::B => &mut self.seat_b,
        }
    }

    fn contains_id(&self, id: &str) -> bool {
        let seated = |slot: &Option<Player>| slot.as_ref().is_some_and(|p| p.id == id);
        seated(&self.seat_a) || seated(&self.seat_b) || self.queue.iter().any(|p| p.id == id)
    }

    /// Id of the player expected to move, when a round is underway.
    fn turn_holder_id(&self) -> Option<PlayerId> {
        if self.status != Status::InProgress {
            return None;
        }
        let seat = self.turn?;
        self.seat(seat).as_ref().map(|player| player.id.clone())
    }

    fn update_player(&mut self, player: Player) -> Result<(), GameError> {
        for seat in [Seat::A, Seat::B] {
            if self.seat(seat).as_ref().is_some_and(|p| p.id == player.id) {
                info!(seat = ?seat, "Updating seated player");
                *self.seat_mut(seat) = Some(player);
                return Ok(());
            }
        }
        if let Some(slot) = self.queue.iter_mut().find(|p| p.id == player.id) {
            info!("Updating queued player");
            *slot = player;
            return Ok(());
        }
        warn!("No seated or queued player with this id");
        Err(GameError::PlayerNotFound {
            player_id: player.id,
        })
    }
}

fn invalid_move(player_id: &str, x: usize, y: usize) -> GameError {
    GameError::InvalidMove {
        player_id: player_id.to_string(),
        x,
        y,
    }
}

/// Hands a snapshot to the sink outside the state lock.
fn deliver(notification: Notification) {
    if let Some((sink, snapshot)) = notification {
        sink.publish(snapshot);
    }
}
