//! Table error types.

use derive_more::{Display, Error};

use crate::types::{PlayerId, Status};

/// Errors returned by table operations.
///
/// None of these are fatal: a failed operation leaves the table
/// unchanged, and every rejection is logged with its context at the
/// point of failure.
#[derive(Debug, Clone, PartialEq, Eq, Display, Error)]
pub enum GameError {
    /// No seated or queued player carries the given id.
    #[display("player {} not found", player_id)]
    PlayerNotFound {
        /// Id that matched nothing.
        player_id: PlayerId,
    },
    /// Move rejected: no round in progress, wrong turn, occupied cell,
    /// or coordinates off the board.
    #[display("invalid move by {} at ({}, {})", player_id, x, y)]
    InvalidMove {
        /// Id of the player who attempted the move.
        player_id: PlayerId,
        /// Targeted column.
        x: usize,
        /// Targeted row.
        y: usize,
    },
    /// The id already occupies a seat or a queue position.
    #[display("player {} is already registered", player_id)]
    AlreadyRegistered {
        /// Offending id.
        player_id: PlayerId,
    },
    /// Round advancement invoked while the status does not permit a
    /// transition. Signals a caller or scheduling error, not a user
    /// mistake.
    #[display("no round transition from status {:?}", status)]
    InvalidStateTransition {
        /// Status at the time of the call.
        status: Status,
    },
}
