use battleship_lobby::{
    format_coordinate, parse_coordinate, Board, Cell, FireResult, Orientation, ShipType,
    CLASSIC_FLEET, MAX_BOARD_SIZE,
};
use proptest::prelude::*;
use rand::{rngs::SmallRng, Rng, SeedableRng};

fn random_board(seed: u64) -> Board {
    let mut rng = SmallRng::seed_from_u64(seed);
    let mut board = Board::new(10);
    board.place_randomly(&mut rng, &CLASSIC_FLEET).unwrap();
    let shots = rng.random_range(0..40);
    for _ in 0..shots {
        let r = rng.random_range(0..10);
        let c = rng.random_range(0..10);
        board.fire(r, c).unwrap();
    }
    board
}

fn orientation() -> impl Strategy<Value = Orientation> {
    prop_oneof![Just(Orientation::Horizontal), Just(Orientation::Vertical)]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn fire_is_idempotent(seed in any::<u64>(), row in 0..10usize, col in 0..10usize) {
        let mut board = random_board(seed);
        let first = board.fire(row, col).unwrap();
        let after_first = board.clone();
        let second = board.fire(row, col).unwrap();
        prop_assert_eq!(second, FireResult::AlreadyTargeted);
        prop_assert_eq!(&board, &after_first);
        if first != FireResult::AlreadyTargeted {
            prop_assert_ne!(board.cell(row, col), Some(Cell::Ship));
            prop_assert_ne!(board.cell(row, col), Some(Cell::Water));
        }
    }

    #[test]
    fn each_ship_sunk_exactly_once(seed in any::<u64>()) {
        let mut rng = SmallRng::seed_from_u64(seed);
        let mut board = Board::new(10);
        board.place_randomly(&mut rng, &CLASSIC_FLEET).unwrap();

        let mut sunk = Vec::new();
        for r in 0..10 {
            for c in 0..10 {
                prop_assert!(!board.is_cleared() || sunk.len() == CLASSIC_FLEET.len());
                if let FireResult::Hit { sunk: Some(name) } = board.fire(r, c).unwrap() {
                    sunk.push(name);
                }
            }
        }
        sunk.sort_unstable();
        let mut expected: Vec<_> = CLASSIC_FLEET.iter().map(|s| s.name()).collect();
        expected.sort_unstable();
        prop_assert_eq!(sunk, expected);
        prop_assert!(board.is_cleared());
    }

    #[test]
    fn place_never_covers_non_water_or_leaves_board(
        seed in any::<u64>(),
        len in 1..6usize,
        row in 0..12usize,
        col in 0..12usize,
        orient in orientation(),
    ) {
        let mut board = random_board(seed);
        let before = board.clone();
        let ship = ShipType::new("Probe", len);
        let cells: Vec<_> = (0..len).map(|i| orient.step((row, col), i)).collect();
        let fits = cells
            .iter()
            .all(|&(r, c)| board.cell(r, c) == Some(Cell::Water));

        match board.place(ship, row, col, orient) {
            Ok(()) => {
                prop_assert!(fits);
                for &(r, c) in &cells {
                    prop_assert_eq!(board.cell(r, c), Some(Cell::Ship));
                }
            }
            Err(e) => {
                prop_assert!(!fits);
                prop_assert!(e.is_placement_invalid());
                prop_assert_eq!(&board, &before);
            }
        }
    }

    #[test]
    fn coordinates_round_trip(size in 1..=MAX_BOARD_SIZE, r in 0..MAX_BOARD_SIZE, c in 0..MAX_BOARD_SIZE) {
        let token = format_coordinate(r, c);
        let parsed = parse_coordinate(&token, size);
        if r < size && c < size {
            prop_assert_eq!(parsed, Ok((r, c)));
        } else {
            prop_assert!(parsed.is_err());
        }
    }
}
