//! Move validation: turn order, cell occupancy, bounds, and status.

use std::time::Duration;

use hotseat_engine::{GameError, Piece, Player, Seat, Status, Table, TableConfig};

fn quiet_config() -> TableConfig {
    TableConfig {
        move_timeout: Duration::from_secs(60),
        grace_delay: Duration::from_secs(60),
    }
}

fn seated_table() -> Table {
    let table = Table::with_seed(quiet_config(), 9);
    table.add_player(Player::new("p1")).unwrap();
    table.add_player(Player::new("p2")).unwrap();
    table
}

#[tokio::test]
async fn test_occupied_cell_rejected_for_second_player() {
    let table = seated_table();

    table.place_move("p1", 0, 0).unwrap();
    assert_eq!(
        table.snapshot().board.unwrap().get(0, 0),
        Some(Piece::MarkA)
    );

    let err = table.place_move("p2", 0, 0).unwrap_err();
    assert_eq!(
        err,
        GameError::InvalidMove {
            player_id: "p2".to_string(),
            x: 0,
            y: 0,
        }
    );

    // The cell keeps the first mark and p2 still holds the turn.
    let snap = table.snapshot();
    assert_eq!(snap.board.unwrap().get(0, 0), Some(Piece::MarkA));
    assert_eq!(snap.turn, Some(Seat::B));
}

#[tokio::test]
async fn test_moves_rejected_before_round_starts() {
    let table = Table::with_seed(quiet_config(), 9);
    table.add_player(Player::new("solo")).unwrap();

    let before = table.snapshot();
    assert_eq!(before.status, Status::InsufficientPlayers);

    table.place_move("solo", 0, 0).unwrap_err();
    assert_eq!(table.snapshot(), before);
}

#[tokio::test]
async fn test_out_of_turn_moves_rejected() {
    let table = seated_table();

    table.place_move("p2", 1, 1).unwrap_err();

    table.place_move("p1", 1, 1).unwrap();
    table.place_move("p1", 0, 0).unwrap_err();

    let snap = table.snapshot();
    assert_eq!(snap.board.unwrap().scan().filled, 1);
    assert_eq!(snap.turn, Some(Seat::B));
}

#[tokio::test]
async fn test_out_of_range_coordinates_rejected() {
    let table = seated_table();
    let before = table.snapshot();

    let err = table.place_move("p1", 3, 0).unwrap_err();
    assert_eq!(
        err,
        GameError::InvalidMove {
            player_id: "p1".to_string(),
            x: 3,
            y: 0,
        }
    );
    table.place_move("p1", 0, 3).unwrap_err();
    table.place_move("p1", 9, 9).unwrap_err();

    assert_eq!(table.snapshot(), before);
}

#[tokio::test]
async fn test_queued_player_cannot_move() {
    let table = seated_table();
    table.add_player(Player::new("p3")).unwrap();

    table.place_move("p3", 0, 0).unwrap_err();
    assert_eq!(table.snapshot().board.unwrap().scan().filled, 0);
}

#[tokio::test]
async fn test_unknown_player_cannot_move() {
    let table = seated_table();
    table.place_move("ghost", 0, 0).unwrap_err();
    assert_eq!(table.snapshot().board.unwrap().scan().filled, 0);
}

#[tokio::test]
async fn test_no_moves_during_grace_window() {
    let table = Table::with_seed(
        TableConfig {
            move_timeout: Duration::from_secs(60),
            grace_delay: Duration::from_millis(50),
        },
        9,
    );
    table.add_player(Player::new("p1")).unwrap();
    table.add_player(Player::new("p2")).unwrap();

    table.place_move("p1", 0, 0).unwrap();
    table.place_move("p2", 0, 1).unwrap();
    table.place_move("p1", 1, 0).unwrap();
    table.place_move("p2", 1, 1).unwrap();
    table.place_move("p1", 2, 0).unwrap();

    // The won board is frozen while it stays on display.
    let snap = table.snapshot();
    assert_eq!(snap.status, Status::AWins);
    table.place_move("p2", 2, 2).unwrap_err();
    assert_eq!(table.snapshot().board, snap.board);

    for _ in 0..1000 {
        if table.snapshot().status == Status::InProgress {
            break;
        }
        tokio::time::sleep(Duration::from_millis(1)).await;
    }
    assert_eq!(table.snapshot().status, Status::InProgress);
    assert_eq!(table.snapshot().board.unwrap().scan().filled, 0);
}
