use battleship_core::*;
use proptest::prelude::*;

fn orientation() -> impl Strategy<Value = Orientation> {
    prop_oneof![Just(Orientation::Horizontal), Just(Orientation::Vertical)]
}

fn fresh_player() -> (Game, PlayerToken) {
    let mut game = Game::new("1:2,2:2,3:2,4:2,5:2".parse().unwrap());
    let token = game.add_player().unwrap();
    (game, token)
}

fn fleet_len(game: &Game, token: &PlayerToken) -> usize {
    game.lookup_player(token, true).unwrap().fleet.len()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    #[test]
    fn placement_rejected_iff_off_grid(
        x in -3i32..13,
        y in -3i32..13,
        length in 1usize..=5,
        orientation in orientation(),
    ) {
        let (mut game, token) = fresh_player();
        let ship = Ship::new(Coord::new(x, y), length, orientation);
        let on_grid = ship.points().iter().all(Coord::in_bounds);

        let result = game.add_ship(&token, Coord::new(x, y), length, orientation);
        if on_grid {
            prop_assert_eq!(result, Ok(()));
            prop_assert_eq!(fleet_len(&game, &token), 1);
        } else {
            prop_assert_eq!(result, Err(GameError::OutOfBounds));
            prop_assert_eq!(fleet_len(&game, &token), 0);
            prop_assert_eq!(game.lookup_player(&token, true).unwrap().remaining(length), 2);
        }
    }

    #[test]
    fn ships_within_one_cell_never_coexist(
        (x1, y1) in (0i32..10, 0i32..10),
        (x2, y2) in (0i32..10, 0i32..10),
        l1 in 1usize..=5,
        l2 in 1usize..=5,
        o1 in orientation(),
        o2 in orientation(),
    ) {
        let first = Ship::new(Coord::new(x1, y1), l1, o1);
        let second = Ship::new(Coord::new(x2, y2), l2, o2);
        prop_assume!(first.in_bounds() && second.in_bounds());

        let touching = first
            .points()
            .iter()
            .any(|p| second.points().iter().any(|q| p.chebyshev(q) <= 1));

        let (mut game, token) = fresh_player();
        game.add_ship(&token, first.origin(), l1, o1).unwrap();
        let result = game.add_ship(&token, second.origin(), l2, o2);

        if touching {
            prop_assert_eq!(result, Err(GameError::ShipOverlaps));
            prop_assert_eq!(fleet_len(&game, &token), 1);
        } else {
            prop_assert_eq!(result, Ok(()));
            prop_assert_eq!(fleet_len(&game, &token), 2);
        }
        prop_assert_eq!(first.allowed(&second), second.allowed(&first));
    }

    #[test]
    fn repeat_shot_is_rejected_without_damage(x in 0i32..10, y in 0i32..10) {
        let mut game = Game::new("3:1".parse().unwrap());
        let a = game.add_player().unwrap();
        let b = game.add_player().unwrap();
        game.add_ship(&a, Coord::new(0, 9), 3, Orientation::Horizontal).unwrap();
        game.add_ship(&b, Coord::new(4, 4), 3, Orientation::Vertical).unwrap();

        game.hit(&a, x, y).unwrap();
        // Never sinks a 3-cell ship, so the match continues
        game.hit(&b, 9, 0).unwrap();

        let lives_before = game.lookup_player(&b, true).unwrap().fleet[0].lives();
        prop_assert_eq!(game.hit(&a, x, y), Err(GameError::AlreadyHit));
        let enemy = game.lookup_player(&b, true).unwrap();
        prop_assert_eq!(enemy.fleet[0].lives(), lives_before);
        prop_assert_eq!(enemy.shots_received.len(), 1);
        prop_assert!(!enemy.has_turn);
    }
}
