//! Core domain types: pieces, seats, players, and table status.

use serde::{Deserialize, Serialize};

/// Unique identifier for a player.
pub type PlayerId = String;

/// A mark on the board.
///
/// Pieces carry signed weights (A is -1, B is +1) so that a line of
/// three sums to a winning threshold without inspecting individual
/// cells. On the wire a piece is its weight.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "i8", try_from = "i8")]
pub enum Piece {
    /// Unoccupied cell, weight 0.
    #[default]
    Empty,
    /// Seat A's mark, weight -1.
    MarkA,
    /// Seat B's mark, weight +1.
    MarkB,
}

impl Piece {
    /// Signed weight used by line-sum win detection.
    pub fn weight(self) -> i8 {
        match self {
            Piece::Empty => 0,
            Piece::MarkA => -1,
            Piece::MarkB => 1,
        }
    }
}

impl From<Piece> for i8 {
    fn from(piece: Piece) -> i8 {
        piece.weight()
    }
}

impl TryFrom<i8> for Piece {
    type Error = String;

    fn try_from(weight: i8) -> Result<Self, Self::Error> {
        match weight {
            0 => Ok(Piece::Empty),
            -1 => Ok(Piece::MarkA),
            1 => Ok(Piece::MarkB),
            other => Err(format!("no piece with weight {}", other)),
        }
    }
}

/// One of the two active player slots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Seat {
    /// Seat A, playing [`Piece::MarkA`].
    A,
    /// Seat B, playing [`Piece::MarkB`].
    B,
}

impl Seat {
    /// Returns the opposing seat.
    pub fn other(self) -> Self {
        match self {
            Seat::A => Seat::B,
            Seat::B => Seat::A,
        }
    }

    /// The mark this seat places on the board.
    pub fn piece(self) -> Piece {
        match self {
            Seat::A => Piece::MarkA,
            Seat::B => Piece::MarkB,
        }
    }
}

/// Table status, always derived from the seats and the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Status {
    /// Fewer than two seated players.
    InsufficientPlayers,
    /// Both seats occupied but no board allocated.
    NoBoard,
    /// Seat A completed a line of three.
    AWins,
    /// Seat B completed a line of three.
    BWins,
    /// Full board with no line of three.
    Draw,
    /// A round is underway.
    InProgress,
}

impl Status {
    /// True for the statuses that end a round and trigger rotation.
    pub fn is_terminal(self) -> bool {
        matches!(self, Status::AWins | Status::BWins | Status::Draw)
    }
}

/// A participant, either seated or waiting in the queue.
///
/// Identity is the id; the display name is metadata only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Player {
    /// Opaque unique id.
    pub id: PlayerId,
    /// Optional display name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl Player {
    /// Creates a player with no display name.
    pub fn new(id: impl Into<PlayerId>) -> Self {
        Self {
            id: id.into(),
            name: None,
        }
    }

    /// Creates a player with a display name.
    pub fn named(id: impl Into<PlayerId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: Some(name.into()),
        }
    }
}
