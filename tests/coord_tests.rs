use battleship_lobby::protocol::{self, Inbound};
use battleship_lobby::ui::{grid_dump, View};
use battleship_lobby::{
    format_coordinate, parse_coordinate, Board, ConfigError, CoordinateError, FireResult,
    GameConfig, Orientation, Seat, ShipType,
};

#[test]
fn test_parse_valid_tokens() {
    assert_eq!(parse_coordinate("A1", 3), Ok((0, 0)));
    assert_eq!(parse_coordinate("b2", 3), Ok((1, 1)));
    assert_eq!(parse_coordinate("  C3 ", 3), Ok((2, 2)));
    assert_eq!(parse_coordinate("J10", 10), Ok((9, 9)));
    assert_eq!(format_coordinate(9, 9), "J10");
}

#[test]
fn test_parse_rejections() {
    assert_eq!(parse_coordinate("A", 3), Err(CoordinateError::TooShort));
    assert_eq!(parse_coordinate("", 3), Err(CoordinateError::TooShort));
    assert_eq!(parse_coordinate("D1", 3), Err(CoordinateError::InvalidRow('D')));
    assert_eq!(parse_coordinate("11", 3), Err(CoordinateError::InvalidRow('1')));
    assert_eq!(
        parse_coordinate("Ax", 3),
        Err(CoordinateError::InvalidColumn("x".to_string()))
    );
    assert_eq!(
        parse_coordinate("A-1", 3),
        Err(CoordinateError::InvalidColumn("-1".to_string()))
    );
    assert_eq!(parse_coordinate("A0", 3), Err(CoordinateError::ColumnOutOfBounds(0)));
    assert_eq!(parse_coordinate("A4", 3), Err(CoordinateError::ColumnOutOfBounds(4)));
    assert!(matches!(
        parse_coordinate("A99999999999999999999999", 3),
        Err(CoordinateError::ColumnOutOfBounds(_))
    ));
}

#[test]
fn test_orientation_tokens() {
    assert_eq!(Orientation::parse("h"), Some(Orientation::Horizontal));
    assert_eq!(Orientation::parse(" V "), Some(Orientation::Vertical));
    assert_eq!(Orientation::parse("x"), None);
    assert_eq!(Orientation::parse("hv"), None);
}

#[test]
fn test_game_config_validation() {
    assert!(GameConfig::classic().validate().is_ok());
    assert!(GameConfig::skirmish().validate().is_ok());
    assert_eq!(
        GameConfig::new(0, vec![ShipType::new("Destroyer", 2)]),
        Err(ConfigError::BoardSize(0))
    );
    assert_eq!(
        GameConfig::new(27, vec![ShipType::new("Destroyer", 2)]),
        Err(ConfigError::BoardSize(27))
    );
    assert_eq!(GameConfig::new(5, vec![]), Err(ConfigError::EmptyFleet));
    assert_eq!(
        GameConfig::new(3, vec![ShipType::new("Carrier", 5)]),
        Err(ConfigError::ShipLength {
            name: "Carrier",
            length: 5
        })
    );
    assert_eq!(
        GameConfig::new(2, vec![ShipType::new("Destroyer", 2); 3]),
        Err(ConfigError::FleetTooLarge {
            cells: 6,
            capacity: 4
        })
    );
}

#[test]
fn test_inbound_parse() {
    assert_eq!(
        Inbound::parse("CHAT hello there"),
        Inbound::Chat("hello there".to_string())
    );
    assert_eq!(Inbound::parse("chat hi\r"), Inbound::Chat("hi".to_string()));
    assert_eq!(Inbound::parse(" B2 "), Inbound::Line("B2".to_string()));
    assert_eq!(Inbound::parse("CHATTY"), Inbound::Line("CHATTY".to_string()));
    assert!(protocol::is_quit(" QUIT "));
    assert!(!protocol::is_quit("quitter"));
}

#[test]
fn test_shot_reports() {
    let sank = FireResult::Hit {
        sunk: Some("Destroyer"),
    };
    assert_eq!(protocol::shot_report(sank), "HIT! You sank the Destroyer!");
    assert_eq!(
        protocol::shot_report_for_target(Seat::One, sank),
        "HIT! Player 1 sank the Destroyer!"
    );
    assert_eq!(protocol::shot_report(FireResult::Miss), "MISS!");
    assert_eq!(
        protocol::shot_report_for_target(Seat::Two, FireResult::Miss),
        "Player 2: MISS!"
    );
    assert_eq!(protocol::you_are(Seat::Two), "You are Player 2.");
    assert_eq!(protocol::chat("ann", "gg"), "ann: gg");
}

#[test]
fn test_grid_dump_views() {
    let mut board = Board::new(3);
    board
        .place(ShipType::new("Destroyer", 2), 0, 0, Orientation::Horizontal)
        .unwrap();
    board.fire(0, 0).unwrap();
    board.fire(2, 2).unwrap();

    let opponent = grid_dump(&board, View::Opponent);
    let lines: Vec<&str> = opponent.lines().collect();
    assert_eq!(lines.len(), 5);
    assert_eq!(lines[0], "GRID");
    assert_eq!(lines[1], "   1 2 3");
    assert_eq!(lines[2], "A  X . .");
    assert_eq!(lines[3], "B  . . .");
    assert_eq!(lines[4], "C  . . o");
    assert!(opponent.ends_with('\n'));

    let owner = grid_dump(&board, View::Owner);
    assert!(owner.lines().any(|l| l == "A  X S ."));
}
