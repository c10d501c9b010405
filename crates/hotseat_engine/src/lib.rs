//! Hotseat engine - one shared tic-tac-toe table with queue rotation
//!
//! This library keeps a single board, two seats, and an unbounded FIFO
//! queue of waiting players. Winners keep their seat, losers rejoin the
//! back of the queue, and a drawn round evicts one occupant by coin
//! flip. A watchdog moves for players who stall past the move timeout.
//!
//! # Architecture
//!
//! - **Table**: cloneable handle over the locked table state
//! - **Board**: 3x3 grid scanned by line sums for wins and draws
//! - **Watchdog**: countdown task that plays for a stalled player
//! - **StateSink**: observer fed a snapshot after every mutation
//!
//! Timers run on the ambient tokio runtime, so table operations must
//! be called from inside one.
//!
//! # Example
//!
//! ```no_run
//! use hotseat_engine::{Player, Table, TableConfig};
//!
//! # async fn example() -> Result<(), hotseat_engine::GameError> {
//! let table = Table::new(TableConfig::default());
//!
//! // First two players take the seats, the third waits in line.
//! table.add_player(Player::new("ada"))?;
//! table.add_player(Player::new("bo"))?;
//! table.add_player(Player::new("cy"))?;
//!
//! // Seat A opens in the top-left corner.
//! table.place_move("ada", 0, 0)?;
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

// Private module declarations
mod board;
mod error;
mod game;
mod sink;
mod types;
mod watchdog;

// Crate-level exports - Board
pub use board::{Board, LineScan};

// Crate-level exports - Errors
pub use error::GameError;

// Crate-level exports - Table
pub use game::{Table, TableConfig, TableSnapshot};

// Crate-level exports - State notifications
pub use sink::{ChannelSink, StateSink};

// Crate-level exports - Core types
pub use types::{Piece, Player, PlayerId, Seat, Status};
