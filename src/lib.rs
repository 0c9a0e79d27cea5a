#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;
#[cfg(feature = "std")]
extern crate std;

mod board;
mod common;
mod config;
mod coord;
pub mod protocol;
mod ship;
pub mod ui;

#[cfg(feature = "std")]
pub mod client;
#[cfg(feature = "std")]
pub mod gate;
#[cfg(feature = "std")]
pub mod lobby;
#[cfg(feature = "std")]
mod logging;
#[cfg(feature = "std")]
pub mod server;
#[cfg(feature = "std")]
pub mod session;
#[cfg(feature = "std")]
pub mod transport;

pub use board::*;
pub use common::*;
pub use config::*;
pub use coord::*;
pub use ship::*;

#[cfg(feature = "std")]
pub use gate::{Delivery, GateRead, InputGate};
#[cfg(feature = "std")]
pub use lobby::{ClientId, Lobby, LobbySnapshot, Signals};
#[cfg(feature = "std")]
pub use logging::{init_logging, log_level, LOG_ENV};
#[cfg(feature = "std")]
pub use server::{handle_connection, run_server, Server};
#[cfg(feature = "std")]
pub use session::{SeatIo, Session, SessionOutcome};
