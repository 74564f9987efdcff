//! Integration tests for the world layer: rooms, rosters, and grids
//! working together the way the dispatcher drives them.

use brickwork_protocol::{Layer, PlayerId, Point, RoomId};
use brickwork_transport::ConnectionId;
use brickwork_world::{BlockType, Player, Room, RoomStore};

fn join(room: &mut Room, conn: u64) -> PlayerId {
    let id = room.roster().allocate_id().expect("room should have space");
    let spawn = room.spawn();
    room.roster_mut().add(Player::new(
        id,
        format!("user-{conn}"),
        40,
        ConnectionId::new(conn),
        spawn,
    ));
    id
}

fn assert_roster_invariants(room: &Room) {
    let mut seen = std::collections::HashSet::new();
    for (pos, p) in room.roster().iter().enumerate() {
        assert!(usize::from(p.id.0) < room.roster().max_players());
        assert!(seen.insert(p.id), "duplicate in-room id {}", p.id);
        assert_eq!(p.index(), pos);
    }
}

#[test]
fn test_rooms_keep_rosters_isolated() {
    let mut store = RoomStore::new(8);
    let a = store.create("a".into(), String::new(), 20, 10);
    let b = store.create("b".into(), String::new(), 20, 10);

    // Both rooms hand out id 0 independently.
    let id_a = join(store.get_mut(a).unwrap(), 1);
    let id_b = join(store.get_mut(b).unwrap(), 2);
    assert_eq!(id_a, PlayerId(0));
    assert_eq!(id_b, PlayerId(0));

    assert_eq!(store.get(a).unwrap().roster().len(), 1);
    assert_eq!(store.get(b).unwrap().roster().len(), 1);
}

#[test]
fn test_join_leave_churn_preserves_invariants() {
    let mut store = RoomStore::new(4);
    let id = store.create("churn".into(), String::new(), 20, 10);
    let room = store.get_mut(id).unwrap();

    for conn in 0..4 {
        join(room, conn);
    }
    assert_eq!(room.roster().allocate_id(), None, "room should be full");

    // Leave from the middle, rejoin, repeat from both ends.
    for victim in [1u8, 0, 3] {
        room.roster_mut().remove(PlayerId(victim)).unwrap();
        assert_roster_invariants(room);

        let rejoined = join(room, 100 + u64::from(victim));
        assert_eq!(
            rejoined,
            PlayerId(victim),
            "the freed id should be reused"
        );
        assert_roster_invariants(room);
    }
}

#[test]
fn test_room_persists_after_all_players_leave() {
    // A created room outlives its creator; there is no removal path.
    let mut store = RoomStore::new(8);
    let id = store.create("Test".into(), "desc".into(), 200, 100);

    let room = store.get_mut(id).unwrap();
    let pid = join(room, 7);
    room.roster_mut().remove(pid).unwrap();

    let room = store.get(id).unwrap();
    assert!(room.roster().is_empty());
    assert_eq!(room.name(), "Test");
    assert_eq!(store.summaries()[id.0 as usize].players, 0);
}

#[test]
fn test_placement_round_trip_through_init_payload() {
    let mut store = RoomStore::new(8);
    let id = store.create("grid".into(), String::new(), 3, 2);
    let room = store.get_mut(id).unwrap();

    let brick = BlockType::from_id(4).unwrap();
    assert!(room.grid_mut().place(1, 1, Layer::Foreground, brick));

    let brickwork_protocol::Message::Init { blocks, .. } =
        room.init_message()
    else {
        panic!("wrong variant");
    };
    // Foreground layer starts after the 6 background tiles; (1, 1) is the
    // fifth tile of its layer.
    assert_eq!(blocks[6 + 3 + 1], 4);
}

#[test]
fn test_store_ids_stay_stable_as_rooms_accumulate() {
    let mut store = RoomStore::new(8);
    for i in 0..10 {
        let id = store.create(format!("room-{i}"), String::new(), 10, 10);
        assert_eq!(id, RoomId(i));
    }
    // Lookups by id keep working as the store grows.
    assert_eq!(store.get(RoomId(3)).unwrap().name(), "room-3");
}

#[test]
fn test_clamp_matches_room_dimensions() {
    let mut store = RoomStore::new(8);
    let id = store.create("small".into(), String::new(), 10, 5);
    let room = store.get(id).unwrap();

    // 10x5 tiles at 16px: x in [16, 128], y in [16, 48].
    assert_eq!(
        room.clamp_position(Point::new(1000, 1000)),
        Point::new(128, 48)
    );
    assert_eq!(
        room.clamp_position(Point::new(-5, 20)),
        Point::new(16, 20)
    );
}
