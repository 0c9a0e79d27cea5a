#![cfg(feature = "std")]

//! One match between two seats, from ship placement to a terminal outcome.
//!
//! The session talks to its seats only through their outboxes and input
//! gates. It polls the lobby's `game_active` signal at every prompt so a
//! disconnect elsewhere makes it bail out promptly.

use std::sync::Arc;
use std::time::Duration;

use log::{debug, info, warn};
use rand::rngs::SmallRng;

use crate::board::Board;
use crate::common::{BoardError, FireResult, Seat};
use crate::config::{GameConfig, ServerConfig};
use crate::coord::parse_coordinate;
use crate::gate::{GateRead, InputGate};
use crate::lobby::Signals;
use crate::protocol::{self, is_quit};
use crate::ship::Orientation;
use crate::transport::Outbox;
use crate::ui::{grid_dump, View};

/// Connection endpoints of one seated identity.
#[derive(Debug, Clone)]
pub struct SeatIo {
    pub name: String,
    pub outbox: Outbox,
    pub gate: Arc<InputGate>,
}

/// How a session ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionOutcome {
    /// `winner` cleared the opponent's board in `moves` shots.
    Won { winner: Seat, moves: u32 },
    /// `by` typed `quit` during the turn phase; the opponent wins by forfeit.
    Quit { by: Seat },
    /// Placement never completed. `by` is the seat that quit, `None` if the
    /// fleet could not be laid out at all.
    Aborted { by: Option<Seat> },
    /// A seat disconnected; the disconnect coordinator already told the survivor.
    Disconnected,
}

/// Reasons a prompt did not produce an answer the session can act on.
#[derive(Debug)]
enum Interrupt {
    Quit(Seat),
    /// The lobby cleared `game_active` or the gate handed back its disconnect sentinel.
    Abandoned,
    Layout(BoardError),
}

pub struct Session {
    seats: [SeatIo; 2],
    boards: [Board; 2],
    game: GameConfig,
    turn_timeout: Duration,
    placement_timeout: Duration,
    signals: Arc<Signals>,
    rng: SmallRng,
    moves: [u32; 2],
    /// Both fleets are down; a quit from here on is a forfeit.
    placement_done: bool,
}

impl Session {
    pub fn new(
        seats: [SeatIo; 2],
        config: &ServerConfig,
        signals: Arc<Signals>,
        rng: SmallRng,
    ) -> Self {
        let size = config.game.board_size;
        Self {
            seats,
            boards: [Board::new(size), Board::new(size)],
            game: config.game.clone(),
            turn_timeout: config.turn_timeout,
            placement_timeout: config.placement_timeout,
            signals,
            rng,
            moves: [0; 2],
            placement_done: false,
        }
    }

    /// Run the match to completion.
    pub async fn run(mut self) -> SessionOutcome {
        info!(
            "session started: {} vs {}",
            self.seats[0].name, self.seats[1].name
        );
        let outcome = match self.play().await {
            Ok(outcome) => outcome,
            Err(Interrupt::Quit(seat)) if self.signals.conclude() => {
                self.send(seat, protocol::GOODBYE);
                if !self.placement_done {
                    self.send(seat.other(), protocol::quit_notice(seat));
                    SessionOutcome::Aborted { by: Some(seat) }
                } else {
                    self.send(seat.other(), protocol::forfeit_win(seat));
                    SessionOutcome::Quit { by: seat }
                }
            }
            Err(Interrupt::Quit(_)) | Err(Interrupt::Abandoned) => SessionOutcome::Disconnected,
            Err(Interrupt::Layout(e)) => {
                warn!("could not lay out fleet: {}", e);
                SessionOutcome::Aborted { by: None }
            }
        };
        info!("session finished: {:?}", outcome);
        outcome
    }

    async fn play(&mut self) -> Result<SessionOutcome, Interrupt> {
        for seat in Seat::BOTH {
            self.send(seat, protocol::you_are(seat));
        }
        for seat in Seat::BOTH {
            self.place_fleet(seat).await?;
        }
        self.placement_done = true;
        for seat in Seat::BOTH {
            self.send(seat, protocol::BATTLE_STATIONS);
        }

        let mut active = Seat::One;
        loop {
            if let Some(outcome) = self.take_turn(active).await? {
                return Ok(outcome);
            }
            active = active.other();
        }
    }

    fn send(&self, seat: Seat, line: impl Into<String>) {
        self.seats[seat.index()].outbox.send(line);
    }

    fn checkpoint(&self) -> Result<(), Interrupt> {
        if self.signals.game_active() {
            Ok(())
        } else {
            Err(Interrupt::Abandoned)
        }
    }

    /// Arm `seat`, send `prompt` and wait for one answer.
    ///
    /// `Ok(None)` is a timeout. The gate is armed before the prompt goes out
    /// so an answer typed right after the prompt is never rejected.
    async fn ask(
        &self,
        seat: Seat,
        prompt: &str,
        timeout: Duration,
    ) -> Result<Option<String>, Interrupt> {
        self.checkpoint()?;
        let io = &self.seats[seat.index()];
        io.gate.arm();
        io.outbox.send(prompt);
        let read = io.gate.read(timeout).await;
        io.gate.disarm();
        self.checkpoint()?;
        match read {
            GateRead::Line(line) if is_quit(&line) => Err(Interrupt::Quit(seat)),
            GateRead::Line(line) => Ok(Some(line)),
            GateRead::Timeout => Ok(None),
            GateRead::Disconnected => Err(Interrupt::Abandoned),
        }
    }

    async fn place_fleet(&mut self, seat: Seat) -> Result<(), Interrupt> {
        self.send(seat.other(), protocol::wait_for_placement(seat));
        loop {
            let choice = self
                .ask(seat, protocol::PLACEMENT_CHOICE, self.placement_timeout)
                .await?;
            match choice.as_deref().map(str::trim) {
                None => {
                    self.send(seat, protocol::PLACEMENT_TIMED_OUT);
                    self.place_remaining(seat)?;
                    break;
                }
                Some(c) if c.eq_ignore_ascii_case("m") => {
                    self.place_manually(seat).await?;
                    break;
                }
                Some(c) if c.eq_ignore_ascii_case("r") => {
                    self.place_remaining(seat)?;
                    break;
                }
                Some(_) => self.send(seat, protocol::INVALID_INPUT),
            }
        }
        self.send(seat, grid_dump(&self.boards[seat.index()], View::Owner));
        debug!("{} placed {} ships", seat, self.boards[seat.index()].ships().len());
        Ok(())
    }

    /// Randomly place every fleet ship the seat has not placed yet.
    fn place_remaining(&mut self, seat: Seat) -> Result<(), Interrupt> {
        let board = &mut self.boards[seat.index()];
        let placed = board.ships().len();
        let remaining = self.game.fleet.get(placed..).unwrap_or_default();
        board
            .place_randomly(&mut self.rng, remaining)
            .map_err(Interrupt::Layout)
    }

    async fn place_manually(&mut self, seat: Seat) -> Result<(), Interrupt> {
        self.send(seat, protocol::MANUAL_PLACEMENT);
        let size = self.game.board_size;
        let fleet = self.game.fleet.clone();
        for ship in fleet {
            loop {
                self.send(seat, grid_dump(&self.boards[seat.index()], View::Owner));
                self.send(seat, protocol::placing_ship(ship.name(), ship.length()));

                let origin = self
                    .ask(seat, protocol::ASK_ORIGIN, self.placement_timeout)
                    .await?;
                let Some(origin) = origin else {
                    return self.placement_timed_out(seat);
                };
                let orientation = self
                    .ask(seat, protocol::ASK_ORIENTATION, self.placement_timeout)
                    .await?;
                let Some(orientation) = orientation else {
                    return self.placement_timed_out(seat);
                };

                let (row, col) = match parse_coordinate(&origin, size) {
                    Ok(rc) => rc,
                    Err(e) => {
                        self.send(seat, protocol::invalid_coordinate(&e));
                        continue;
                    }
                };
                let Some(orientation) = Orientation::parse(&orientation) else {
                    self.send(seat, protocol::INVALID_ORIENTATION);
                    continue;
                };
                match self.boards[seat.index()].place(ship, row, col, orientation) {
                    Ok(()) => break,
                    Err(e) => {
                        debug!("{} placement rejected: {}", seat, e);
                        self.send(
                            seat,
                            protocol::cannot_place(
                                ship.name(),
                                &origin.trim().to_ascii_uppercase(),
                                orientation.letter(),
                            ),
                        );
                    }
                }
            }
        }
        Ok(())
    }

    fn placement_timed_out(&mut self, seat: Seat) -> Result<(), Interrupt> {
        self.send(seat, protocol::PLACEMENT_TIMED_OUT);
        self.place_remaining(seat)
    }

    /// Play one turn for `active`. Returns the outcome if the game ended.
    async fn take_turn(&mut self, active: Seat) -> Result<Option<SessionOutcome>, Interrupt> {
        let target = active.other();
        self.send(active, grid_dump(&self.boards[target.index()], View::Opponent));
        self.send(target, protocol::wait_for_turn(active));

        let Some(guess) = self
            .ask(active, protocol::ASK_TARGET, self.turn_timeout)
            .await?
        else {
            debug!("{} timed out", active);
            self.send(active, protocol::TURN_TIMED_OUT);
            self.send(target, protocol::opponent_timed_out(active));
            return Ok(None);
        };
        self.send(target, protocol::opponent_input(active, &guess));

        let size = self.game.board_size;
        let (row, col) = match parse_coordinate(&guess, size) {
            Ok(rc) => rc,
            Err(e) => {
                self.send(active, protocol::invalid_target(&e));
                return Ok(None);
            }
        };
        let result = match self.boards[target.index()].fire(row, col) {
            Ok(result) => result,
            Err(e) => {
                self.send(active, protocol::invalid_target(&e));
                return Ok(None);
            }
        };
        self.moves[active.index()] += 1;
        self.send(active, protocol::shot_report(result));
        self.send(target, protocol::shot_report_for_target(active, result));

        if matches!(result, FireResult::Hit { .. }) && self.boards[target.index()].is_cleared() {
            if !self.signals.conclude() {
                return Err(Interrupt::Abandoned);
            }
            let moves = self.moves[active.index()];
            for seat in Seat::BOTH {
                self.send(seat, grid_dump(&self.boards[target.index()], View::Opponent));
                self.send(seat, grid_dump(&self.boards[active.index()], View::Opponent));
            }
            self.send(active, protocol::victory(moves));
            self.send(target, protocol::defeat(active, moves));
            return Ok(Some(SessionOutcome::Won {
                winner: active,
                moves,
            }));
        }
        Ok(None)
    }
}
