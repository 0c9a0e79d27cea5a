use std::sync::Arc;
use std::time::Duration;

use battleship_lobby::protocol;
use battleship_lobby::transport::{Outbound, Outbox};
use battleship_lobby::{
    Delivery, GameConfig, InputGate, Seat, SeatIo, ServerConfig, Session, SessionOutcome, Signals,
};
use rand::rngs::SmallRng;
use rand::SeedableRng;
use tokio::sync::mpsc::UnboundedReceiver;
use tokio::task::JoinHandle;
use tokio::time::timeout;

const WAIT: Duration = Duration::from_secs(5);

struct TestSeat {
    rx: UnboundedReceiver<Outbound>,
    gate: Arc<InputGate>,
}

impl TestSeat {
    async fn expect(&mut self, text: &str) -> String {
        loop {
            match timeout(WAIT, self.rx.recv()).await {
                Ok(Some(Outbound::Line(line))) if line.contains(text) => return line,
                Ok(Some(_)) => continue,
                Ok(None) => panic!("outbox closed while waiting for {:?}", text),
                Err(_) => panic!("timed out waiting for {:?}", text),
            }
        }
    }

    /// Wait for `prompt`, then answer it.
    async fn answer(&mut self, prompt: &str, line: &str) {
        self.expect(prompt).await;
        assert_eq!(self.gate.deliver(line), Delivery::Accepted, "answer {:?}", line);
    }

    async fn place_destroyer(&mut self, origin: &str) {
        self.answer(protocol::PLACEMENT_CHOICE, "M").await;
        self.answer(protocol::ASK_ORIGIN, origin).await;
        self.answer(protocol::ASK_ORIENTATION, "H").await;
    }
}

fn skirmish_config() -> ServerConfig {
    ServerConfig {
        game: GameConfig::skirmish(),
        turn_timeout: Duration::from_secs(5),
        placement_timeout: Duration::from_secs(5),
        seed: Some(9),
        ..ServerConfig::default()
    }
}

fn start(config: ServerConfig) -> (JoinHandle<SessionOutcome>, TestSeat, TestSeat, Arc<Signals>) {
    let signals = Arc::new(Signals::new());
    signals.begin_session();
    let mut test_seats = Vec::new();
    let mut ios = Vec::new();
    for name in ["ann", "bob"] {
        let (outbox, rx) = Outbox::channel();
        let gate = Arc::new(InputGate::new());
        ios.push(SeatIo {
            name: name.to_string(),
            outbox,
            gate: gate.clone(),
        });
        test_seats.push(TestSeat { rx, gate });
    }
    let seats: [SeatIo; 2] = ios.try_into().unwrap();
    let session = Session::new(
        seats,
        &config,
        signals.clone(),
        SmallRng::seed_from_u64(5),
    );
    let handle = tokio::spawn(session.run());
    let two = test_seats.pop().unwrap();
    let one = test_seats.pop().unwrap();
    (handle, one, two, signals)
}

async fn outcome(handle: JoinHandle<SessionOutcome>) -> SessionOutcome {
    timeout(WAIT, handle).await.expect("session should finish").unwrap()
}

#[tokio::test(flavor = "multi_thread")]
async fn test_full_game_player_one_wins() {
    let (handle, mut one, mut two, signals) = start(skirmish_config());
    one.expect("You are Player 1.").await;
    two.expect("You are Player 2.").await;
    two.expect("Wait for Player 1 to place their ships").await;

    one.place_destroyer("A1").await;
    two.place_destroyer("B1").await;

    one.answer(protocol::ASK_TARGET, "B1").await;
    one.expect("HIT!").await;
    two.expect("Player 1 Inputs: B1").await;
    two.expect("Player 1: HIT!").await;

    two.answer(protocol::ASK_TARGET, "C3").await;
    two.expect("MISS!").await;

    one.answer(protocol::ASK_TARGET, "B2").await;
    one.expect("HIT! You sank the Destroyer!").await;
    one.expect("Congratulations! You sank all ships in 2 moves.").await;
    two.expect("HIT! Player 1 sank the Destroyer!").await;
    two.expect("You lose! Player 1 sank all ships in 2 moves.").await;

    assert_eq!(
        outcome(handle).await,
        SessionOutcome::Won {
            winner: Seat::One,
            moves: 2
        }
    );
    // a late disconnect finds the result already announced
    assert!(!signals.abandon());
}

#[tokio::test(flavor = "multi_thread")]
async fn test_invalid_placement_reprompts() {
    let (handle, mut one, mut two, _signals) = start(skirmish_config());

    one.answer(protocol::PLACEMENT_CHOICE, "x").await;
    one.expect(protocol::INVALID_INPUT).await;
    one.answer(protocol::PLACEMENT_CHOICE, "m").await;

    // C3 horizontal runs off the board
    one.answer(protocol::ASK_ORIGIN, "C3").await;
    one.answer(protocol::ASK_ORIENTATION, "H").await;
    one.expect("Cannot place Destroyer at C3 (orientation=H)").await;

    one.answer(protocol::ASK_ORIGIN, "Z9").await;
    one.answer(protocol::ASK_ORIENTATION, "H").await;
    one.expect("Invalid coordinate: Invalid row letter: Z").await;

    one.answer(protocol::ASK_ORIGIN, "A1").await;
    one.answer(protocol::ASK_ORIENTATION, "Q").await;
    one.expect("Invalid orientation").await;

    one.answer(protocol::ASK_ORIGIN, "A1").await;
    one.answer(protocol::ASK_ORIENTATION, "v").await;
    one.expect("GRID").await;
    two.answer(protocol::PLACEMENT_CHOICE, "R").await;
    one.answer(protocol::ASK_TARGET, "quit").await;
    assert_eq!(outcome(handle).await, SessionOutcome::Quit { by: Seat::One });
}

#[tokio::test(flavor = "multi_thread")]
async fn test_quit_mid_turn_forfeits() {
    let (handle, mut one, mut two, _signals) = start(skirmish_config());
    one.place_destroyer("A1").await;
    two.place_destroyer("A1").await;

    one.answer(protocol::ASK_TARGET, "C1").await;
    two.answer(protocol::ASK_TARGET, "QUIT").await;

    two.expect(protocol::GOODBYE).await;
    one.expect("Player 2 quit the game. You win by forfeit!").await;
    assert_eq!(outcome(handle).await, SessionOutcome::Quit { by: Seat::Two });
}

#[tokio::test(flavor = "multi_thread")]
async fn test_quit_during_placement_aborts() {
    let (handle, mut one, mut two, _signals) = start(skirmish_config());
    one.answer(protocol::PLACEMENT_CHOICE, "quit").await;
    one.expect(protocol::GOODBYE).await;
    let notice = two.expect("Player 1 quit the game.").await;
    assert!(!notice.contains("forfeit"));
    assert_eq!(
        outcome(handle).await,
        SessionOutcome::Aborted {
            by: Some(Seat::One)
        }
    );
}

#[tokio::test(flavor = "multi_thread")]
async fn test_turn_timeout_skips_to_other_seat() {
    let config = ServerConfig {
        turn_timeout: Duration::from_millis(500),
        ..skirmish_config()
    };
    let (handle, mut one, mut two, _signals) = start(config);
    one.place_destroyer("A1").await;
    two.place_destroyer("A1").await;

    one.expect(protocol::ASK_TARGET).await;
    one.expect(protocol::TURN_TIMED_OUT).await;
    two.expect("Player 1 ran out of time.").await;

    // the skipped turn passes to seat two, with no shot fired
    two.answer(protocol::ASK_TARGET, "A1").await;
    two.expect("HIT!").await;
    one.answer(protocol::ASK_TARGET, "quit").await;
    assert_eq!(outcome(handle).await, SessionOutcome::Quit { by: Seat::One });
}

#[tokio::test(flavor = "multi_thread")]
async fn test_bad_coordinate_consumes_turn() {
    let (handle, mut one, mut two, _signals) = start(skirmish_config());
    one.place_destroyer("A1").await;
    two.place_destroyer("A1").await;

    one.answer(protocol::ASK_TARGET, "K7").await;
    one.expect("Invalid input: Invalid row letter: K").await;
    two.answer(protocol::ASK_TARGET, "quit").await;
    assert_eq!(outcome(handle).await, SessionOutcome::Quit { by: Seat::Two });
}

#[tokio::test(flavor = "multi_thread")]
async fn test_placement_timeout_places_randomly() {
    let config = ServerConfig {
        placement_timeout: Duration::from_millis(100),
        ..skirmish_config()
    };
    let (handle, mut one, mut two, _signals) = start(config);
    one.expect(protocol::PLACEMENT_TIMED_OUT).await;
    two.expect(protocol::PLACEMENT_TIMED_OUT).await;
    one.expect(protocol::BATTLE_STATIONS).await;
    one.answer(protocol::ASK_TARGET, "quit").await;
    assert_eq!(outcome(handle).await, SessionOutcome::Quit { by: Seat::One });
}

#[tokio::test(flavor = "multi_thread")]
async fn test_abandoned_session_ends_promptly() {
    let (handle, mut one, two, signals) = start(skirmish_config());
    one.expect(protocol::PLACEMENT_CHOICE).await;
    signals.abandon();
    one.gate.force_disconnect();
    two.gate.force_disconnect();
    assert_eq!(outcome(handle).await, SessionOutcome::Disconnected);
}

#[tokio::test(flavor = "multi_thread")]
async fn test_answer_before_prompt_is_rejected() {
    let (handle, mut one, two, _signals) = start(skirmish_config());
    assert_eq!(two.gate.deliver("R"), Delivery::Rejected);
    one.answer(protocol::PLACEMENT_CHOICE, "quit").await;
    assert_eq!(
        outcome(handle).await,
        SessionOutcome::Aborted {
            by: Some(Seat::One)
        }
    );
}

#[tokio::test(flavor = "multi_thread")]
async fn test_disconnect_during_placement_leaves_verdict_to_lobby() {
    let (handle, mut one, mut two, signals) = start(skirmish_config());
    one.place_destroyer("A1").await;
    two.answer(protocol::PLACEMENT_CHOICE, "M").await;
    two.expect(protocol::ASK_ORIGIN).await;

    // seat one leaves mid-placement: the lobby claims the game and unblocks both gates
    assert!(signals.abandon());
    one.gate.force_disconnect();
    two.gate.force_disconnect();
    assert_eq!(outcome(handle).await, SessionOutcome::Disconnected);

    // the session itself announces nothing; the lobby tells the survivor it won
    while let Ok(item) = two.rx.try_recv() {
        if let Outbound::Line(line) = item {
            assert!(!line.contains("You win"), "unexpected verdict {:?}", line);
            assert!(!line.contains("quit the game"), "unexpected verdict {:?}", line);
        }
    }
}

#[test]
fn test_game_end_is_claimed_once() {
    let signals = Signals::new();
    signals.begin_session();
    assert!(signals.conclude());
    assert!(!signals.abandon());
    assert!(!signals.game_active());

    signals.end_session();
    signals.begin_session();
    assert!(signals.abandon());
    assert!(!signals.conclude());
    assert!(!signals.new_game_ready());
}
