//! Newline-delimited text protocol between the server and its clients.

use alloc::format;
use alloc::string::{String, ToString};

use crate::common::{FireResult, Seat};

/// Prefix of the chat command; routed to the broadcast regardless of role.
pub const CHAT_PREFIX: &str = "CHAT ";
/// Token that forfeits the current session.
pub const QUIT: &str = "quit";

pub const ASK_USERNAME: &str = "Enter your username:";
pub const SPECTATING: &str = "You are spectating.";
pub const WAITING_FOR_PLAYERS: &str = "Waiting for players to join...";
pub const CANNOT_INPUT: &str = "You cannot input right now.";
pub const OPPONENT_DISCONNECTED: &str = "Opponent has disconnected. You win!";

pub const PLACEMENT_CHOICE: &str = "Place ships manually (M) or randomly (R)? [M/R]: ";
pub const MANUAL_PLACEMENT: &str = "Please place your ships manually on the board.";
pub const ASK_ORIGIN: &str = "Enter starting coordinate (e.g. A1): ";
pub const ASK_ORIENTATION: &str = "  Orientation? Enter 'H' (horizontal) or 'V' (vertical): ";
pub const INVALID_ORIENTATION: &str = "  [!] Invalid orientation. Please enter 'H' or 'V'.";
pub const PLACEMENT_TIMED_OUT: &str = "No placement received in time; placing your remaining ships randomly.";
pub const INVALID_INPUT: &str = "Invalid input";
pub const ASK_TARGET: &str = "Enter coordinate to fire at (e.g. B5):";
pub const TURN_TIMED_OUT: &str = "Turn timed out. Your turn was skipped.";
pub const GOODBYE: &str = "Thanks for playing. Goodbye.";
pub const BATTLE_STATIONS: &str = "All ships placed. Fire in turns; type 'quit' to forfeit.";

/// A line received from a client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Inbound {
    /// `CHAT <text>`.
    Chat(String),
    /// Anything else: a game answer when seated and armed.
    Line(String),
}

impl Inbound {
    pub fn parse(line: &str) -> Self {
        let line = line.trim_end_matches(['\r', '\n']);
        match line.get(..CHAT_PREFIX.len()) {
            Some(prefix) if prefix.eq_ignore_ascii_case(CHAT_PREFIX) => {
                Inbound::Chat(line[CHAT_PREFIX.len()..].trim().to_string())
            }
            _ => Inbound::Line(line.trim().to_string()),
        }
    }
}

/// True when `line` is the forfeit token.
pub fn is_quit(line: &str) -> bool {
    line.trim().eq_ignore_ascii_case(QUIT)
}

pub fn welcome(name: &str) -> String {
    format!("Welcome, {}!", name)
}

pub fn chat(sender: &str, text: &str) -> String {
    format!("{}: {}", sender, text)
}

pub fn next_match_preview(first: &str, second: &str) -> String {
    format!(
        "[INFO] After the active game ends, the next game will be between: {} and {}",
        first, second
    )
}

pub fn you_are(seat: Seat) -> String {
    format!("You are {}.", seat)
}

pub fn wait_for_placement(seat: Seat) -> String {
    format!("Wait for {} to place their ships...", seat)
}

pub fn placing_ship(name: &str, size: usize) -> String {
    format!("Placing your {} (size {}).", name, size)
}

pub fn invalid_coordinate(reason: &dyn core::fmt::Display) -> String {
    format!("  [!] Invalid coordinate: {}", reason)
}

pub fn cannot_place(name: &str, origin: &str, orientation: char) -> String {
    format!(
        "  [!] Cannot place {} at {} (orientation={}). Try again.",
        name, origin, orientation
    )
}

pub fn wait_for_turn(seat: Seat) -> String {
    format!("Wait for {} turn...", seat)
}

pub fn opponent_input(seat: Seat, line: &str) -> String {
    format!("{} Inputs: {}", seat, line)
}

pub fn opponent_timed_out(seat: Seat) -> String {
    format!("{} ran out of time.", seat)
}

pub fn invalid_target(reason: &dyn core::fmt::Display) -> String {
    format!("Invalid input: {}", reason)
}

/// Outcome line for the seat that fired.
pub fn shot_report(result: FireResult) -> String {
    match result {
        FireResult::Hit { sunk: Some(name) } => format!("HIT! You sank the {}!", name),
        FireResult::Hit { sunk: None } => "HIT!".to_string(),
        FireResult::Miss => "MISS!".to_string(),
        FireResult::AlreadyTargeted => "You've already fired at that location.".to_string(),
    }
}

/// Outcome line for the seat that was fired upon.
pub fn shot_report_for_target(shooter: Seat, result: FireResult) -> String {
    match result {
        FireResult::Hit { sunk: Some(name) } => format!("HIT! {} sank the {}!", shooter, name),
        FireResult::Hit { sunk: None } => format!("{}: HIT!", shooter),
        FireResult::Miss => format!("{}: MISS!", shooter),
        FireResult::AlreadyTargeted => {
            format!("{}: You've already fired at that location.", shooter)
        }
    }
}

pub fn victory(moves: u32) -> String {
    format!("Congratulations! You sank all ships in {} moves.", moves)
}

pub fn defeat(winner: Seat, moves: u32) -> String {
    format!("You lose! {} sank all ships in {} moves.", winner, moves)
}

pub fn quit_notice(seat: Seat) -> String {
    format!("{} quit the game.", seat)
}

pub fn forfeit_win(seat: Seat) -> String {
    format!("{} quit the game. You win by forfeit!", seat)
}
