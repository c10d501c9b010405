//! Seating, queueing, updating, and removing players.

use std::time::Duration;

use hotseat_engine::{Board, GameError, Player, Seat, Status, Table, TableConfig};

fn quiet_config() -> TableConfig {
    TableConfig {
        move_timeout: Duration::from_secs(60),
        grace_delay: Duration::from_secs(60),
    }
}

fn table_with(ids: &[&str]) -> Table {
    let table = Table::with_seed(quiet_config(), 11);
    for id in ids {
        table.add_player(Player::new(*id)).unwrap();
    }
    table
}

#[tokio::test]
async fn test_seats_fill_before_the_queue() {
    let table = Table::with_seed(quiet_config(), 11);

    table.add_player(Player::new("a")).unwrap();
    let snap = table.snapshot();
    assert_eq!(snap.seat_a, Some(Player::new("a")));
    assert_eq!(snap.seat_b, None);
    assert_eq!(snap.status, Status::InsufficientPlayers);
    assert_eq!(snap.turn, Some(Seat::A));

    table.add_player(Player::new("b")).unwrap();
    let snap = table.snapshot();
    assert_eq!(snap.seat_b, Some(Player::new("b")));
    assert_eq!(snap.status, Status::InProgress);
    assert_eq!(snap.turn, Some(Seat::A));

    table.add_player(Player::new("c")).unwrap();
    table.add_player(Player::new("d")).unwrap();
    let snap = table.snapshot();
    assert_eq!(snap.queue, vec![Player::new("c"), Player::new("d")]);
}

#[tokio::test]
async fn test_duplicate_ids_rejected_everywhere() {
    let table = table_with(&["a", "b", "c"]);
    let before = table.snapshot();

    for id in ["a", "b", "c"] {
        let err = table.add_player(Player::new(id)).unwrap_err();
        assert_eq!(
            err,
            GameError::AlreadyRegistered {
                player_id: id.to_string()
            }
        );
    }
    assert_eq!(table.snapshot(), before);
}

#[tokio::test]
async fn test_update_renames_wherever_the_player_sits() {
    let table = table_with(&["a", "b", "c"]);

    table.update_player(Player::named("a", "Ada")).unwrap();
    table.update_player(Player::named("c", "Cleo")).unwrap();

    let snap = table.snapshot();
    assert_eq!(snap.seat_a, Some(Player::named("a", "Ada")));
    assert_eq!(snap.queue, vec![Player::named("c", "Cleo")]);

    let err = table.update_player(Player::new("ghost")).unwrap_err();
    assert_eq!(
        err,
        GameError::PlayerNotFound {
            player_id: "ghost".to_string()
        }
    );
}

#[tokio::test]
async fn test_remove_queued_player_keeps_queue_order() {
    let table = table_with(&["a", "b", "c", "d", "e"]);

    table.remove_player("d").unwrap();

    let snap = table.snapshot();
    assert_eq!(snap.queue, vec![Player::new("c"), Player::new("e")]);
    assert_eq!(snap.seat_a, Some(Player::new("a")));
    assert_eq!(snap.status, Status::InProgress);
}

#[tokio::test]
async fn test_remove_seated_player_reseats_from_the_queue() {
    let table = table_with(&["a", "b", "c"]);

    // One mark is already down; removal still wipes the board.
    table.place_move("a", 0, 0).unwrap();
    table.remove_player("a").unwrap();

    let snap = table.snapshot();
    assert_eq!(snap.seat_a, Some(Player::new("c")));
    assert_eq!(snap.seat_b, Some(Player::new("b")));
    assert!(snap.queue.is_empty());
    assert_eq!(snap.status, Status::InProgress);
    assert_eq!(snap.board, Some(Board::new()));
    // The turn had already passed to seat B and stays there.
    assert_eq!(snap.turn, Some(Seat::B));
}

#[tokio::test]
async fn test_remove_seated_player_without_replacement() {
    let table = table_with(&["a", "b"]);

    table.remove_player("b").unwrap();

    let snap = table.snapshot();
    assert_eq!(snap.seat_a, Some(Player::new("a")));
    assert_eq!(snap.seat_b, None);
    assert_eq!(snap.status, Status::InsufficientPlayers);
    assert_eq!(snap.board, Some(Board::new()));
}

#[tokio::test]
async fn test_remove_unknown_player() {
    let table = table_with(&["a", "b"]);
    let err = table.remove_player("ghost").unwrap_err();
    assert_eq!(
        err,
        GameError::PlayerNotFound {
            player_id: "ghost".to_string()
        }
    );
}

#[tokio::test]
async fn test_reset_restores_the_constructed_shape() {
    let table = table_with(&["a", "b", "c"]);
    table.place_move("a", 1, 1).unwrap();

    table.reset();

    let snap = table.snapshot();
    assert_eq!(snap.board, Some(Board::new()));
    assert_eq!(snap.seat_a, None);
    assert_eq!(snap.seat_b, None);
    assert!(snap.queue.is_empty());
    assert_eq!(snap.turn, None);
    assert_eq!(snap.status, Status::InsufficientPlayers);

    // The table keeps working after a reset.
    table.add_player(Player::new("x")).unwrap();
    table.add_player(Player::new("y")).unwrap();
    assert_eq!(table.snapshot().status, Status::InProgress);
    table.place_move("x", 0, 0).unwrap();
}
