#![cfg(feature = "std")]

//! Lobby: known identities, the waiting queue and the two seats.
//!
//! All of it lives behind one mutex. The manager loop (`manager.rs`) fills
//! seats and runs sessions, the disconnect coordinator (`disconnect.rs`)
//! tears them down, and `broadcast.rs` fans text out to everyone.

use std::collections::{BTreeMap, VecDeque};
use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

use log::info;
use tokio::sync::{Mutex, Notify};

use crate::common::{Role, Seat};
use crate::config::ServerConfig;
use crate::gate::InputGate;
use crate::transport::Outbox;

mod broadcast;
mod disconnect;
mod manager;

pub use broadcast::spawn_announcer;

/// Server-assigned identifier of a connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ClientId(pub u64);

impl fmt::Display for ClientId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A connected participant.
#[derive(Debug)]
pub struct Identity {
    pub id: ClientId,
    pub name: String,
    pub role: Role,
    pub outbox: Outbox,
    pub gate: Arc<InputGate>,
}

/// The two coarse flags shared by the lobby, the disconnect path and the session.
#[derive(Debug)]
pub struct Signals {
    new_game_ready: AtomicBool,
    game_active: AtomicBool,
}

impl Default for Signals {
    fn default() -> Self {
        Self {
            new_game_ready: AtomicBool::new(true),
            game_active: AtomicBool::new(false),
        }
    }
}

impl Signals {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn new_game_ready(&self) -> bool {
        self.new_game_ready.load(Ordering::Acquire)
    }

    pub fn game_active(&self) -> bool {
        self.game_active.load(Ordering::Acquire)
    }

    /// Seats are committed to a session that is about to run.
    pub fn begin_session(&self) {
        self.new_game_ready.store(false, Ordering::Release);
        self.game_active.store(true, Ordering::Release);
    }

    /// Tell a running session to stop at its next checkpoint.
    ///
    /// Returns `true` only if the game was still active, i.e. the caller and
    /// not the session gets to announce how it ended.
    pub fn abandon(&self) -> bool {
        self.game_active.swap(false, Ordering::AcqRel)
    }

    /// Claim the end of the game from inside the session.
    ///
    /// Returns `false` if a disconnect already abandoned it; the session must
    /// then stay silent.
    pub fn conclude(&self) -> bool {
        self.game_active.swap(false, Ordering::AcqRel)
    }

    /// Session bookkeeping is done; the lobby may seat the next pair.
    pub fn end_session(&self) {
        self.game_active.store(false, Ordering::Release);
        self.new_game_ready.store(true, Ordering::Release);
    }
}

/// Returned to a connection handler when its identity joins the lobby.
#[derive(Debug, Clone)]
pub struct Registration {
    pub id: ClientId,
    pub name: String,
    pub gate: Arc<InputGate>,
}

/// Point-in-time view of the lobby.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LobbySnapshot {
    /// Waiting queue in service order, including ids that already left.
    pub queue: Vec<ClientId>,
    pub seats: [Option<ClientId>; 2],
    /// Every known identity with its name and role, by id.
    pub clients: Vec<(ClientId, String, Role)>,
    pub new_game_ready: bool,
    pub game_active: bool,
}

impl LobbySnapshot {
    pub fn role_of(&self, id: ClientId) -> Option<Role> {
        self.clients
            .iter()
            .find(|(c, _, _)| *c == id)
            .map(|&(_, _, role)| role)
    }

    pub fn seat_holder(&self, seat: Seat) -> Option<ClientId> {
        self.seats[seat.index()]
    }
}

#[derive(Debug, Default)]
struct State {
    clients: BTreeMap<ClientId, Identity>,
    queue: VecDeque<ClientId>,
    seats: [Option<ClientId>; 2],
    next_id: u64,
}

impl State {
    fn seat_of(&self, id: ClientId) -> Option<Seat> {
        Seat::BOTH
            .into_iter()
            .find(|seat| self.seats[seat.index()] == Some(id))
    }
}

pub struct Lobby {
    state: Mutex<State>,
    signals: Arc<Signals>,
    wake: Notify,
    config: ServerConfig,
    sessions: AtomicU64,
}

impl Lobby {
    pub fn new(config: ServerConfig) -> Arc<Self> {
        Arc::new(Self {
            state: Mutex::new(State::default()),
            signals: Arc::new(Signals::new()),
            wake: Notify::new(),
            config,
            sessions: AtomicU64::new(0),
        })
    }

    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    pub fn signals(&self) -> &Arc<Signals> {
        &self.signals
    }

    pub fn game_active(&self) -> bool {
        self.signals.game_active()
    }

    /// Add a new identity as a spectator at the tail of the waiting queue.
    ///
    /// A blank `name` becomes `Player<id>`.
    pub async fn register(&self, name: &str, outbox: Outbox) -> Registration {
        let mut state = self.state.lock().await;
        state.next_id += 1;
        let id = ClientId(state.next_id);
        let name = match name.trim() {
            "" => format!("Player{}", id.0),
            trimmed => trimmed.to_string(),
        };
        let gate = Arc::new(InputGate::new());
        state.clients.insert(
            id,
            Identity {
                id,
                name: name.clone(),
                role: Role::Spectator,
                outbox,
                gate: gate.clone(),
            },
        );
        state.queue.push_back(id);
        drop(state);
        info!("{} registered as {}", id, name);
        self.wake.notify_one();
        Registration { id, name, gate }
    }

    /// Current role of `id`, or `None` once it has left.
    pub async fn role_of(&self, id: ClientId) -> Option<Role> {
        self.state.lock().await.clients.get(&id).map(|c| c.role)
    }

    pub async fn snapshot(&self) -> LobbySnapshot {
        let state = self.state.lock().await;
        LobbySnapshot {
            queue: state.queue.iter().copied().collect(),
            seats: state.seats,
            clients: state
                .clients
                .values()
                .map(|c| (c.id, c.name.clone(), c.role))
                .collect(),
            new_game_ready: self.signals.new_game_ready(),
            game_active: self.signals.game_active(),
        }
    }
}
