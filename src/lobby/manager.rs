//! Seat assignment and the session lifecycle.

use std::sync::atomic::Ordering;
use std::sync::Arc;

use log::{debug, error, info};
use rand::rngs::SmallRng;
use rand::SeedableRng;

use super::{ClientId, Lobby, State};
use crate::common::{Role, Seat};
use crate::session::{SeatIo, Session, SessionOutcome};

/// What one pass over the lobby decided.
enum Step {
    Seated,
    Start([SeatIo; 2], [ClientId; 2]),
    Idle,
}

impl Lobby {
    /// Lobby control loop. Sleeps until something changes; never returns.
    pub async fn run(self: Arc<Self>) {
        loop {
            match self.step().await {
                Step::Seated => continue,
                Step::Start(seats, ids) => {
                    let outcome = self.play(seats).await;
                    self.finish_session(ids).await;
                    info!("session between {} and {} ended: {:?}", ids[0], ids[1], outcome);
                }
                Step::Idle => self.wake.notified().await,
            }
        }
    }

    async fn step(&self) -> Step {
        let mut state = self.state.lock().await;
        if !self.signals.new_game_ready() {
            return Step::Idle;
        }
        for seat in Seat::BOTH {
            if state.seats[seat.index()].is_none() {
                return match seat_next(&mut state, seat) {
                    Some(id) => {
                        info!("{} takes {}", id, seat);
                        Step::Seated
                    }
                    None => Step::Idle,
                };
            }
        }
        let ids = match state.seats {
            [Some(a), Some(b)] => [a, b],
            _ => return Step::Idle,
        };
        let io = |id: ClientId| {
            state.clients.get(&id).map(|c| SeatIo {
                name: c.name.clone(),
                outbox: c.outbox.clone(),
                gate: c.gate.clone(),
            })
        };
        match (io(ids[0]), io(ids[1])) {
            (Some(one), Some(two)) => {
                self.signals.begin_session();
                Step::Start([one, two], ids)
            }
            _ => Step::Idle,
        }
    }

    /// Run a session on its own task so a panic inside it cannot take the lobby down.
    async fn play(&self, seats: [SeatIo; 2]) -> Option<SessionOutcome> {
        let rng = self.session_rng();
        let session = Session::new(seats, &self.config, self.signals.clone(), rng);
        match tokio::spawn(session.run()).await {
            Ok(outcome) => Some(outcome),
            Err(e) => {
                error!("session task failed: {}", e);
                None
            }
        }
    }

    fn session_rng(&self) -> SmallRng {
        let n = self.sessions.fetch_add(1, Ordering::Relaxed);
        match self.config.seed {
            Some(seed) => SmallRng::seed_from_u64(seed.wrapping_add(n)),
            None => SmallRng::from_rng(&mut rand::rng()),
        }
    }

    /// Return both seat holders to the queue tail and reopen the seats.
    async fn finish_session(&self, ids: [ClientId; 2]) {
        let mut guard = self.state.lock().await;
        let state = &mut *guard;
        for id in ids {
            if let Some(client) = state.clients.get_mut(&id) {
                client.role = Role::Spectator;
                client.gate.clear();
                state.queue.push_back(id);
            }
        }
        state.seats = [None, None];
        self.signals.end_session();
        drop(guard);
        self.wake.notify_one();
    }
}

/// Pop queued ids until one is still connected and seat it.
fn seat_next(state: &mut State, seat: Seat) -> Option<ClientId> {
    while let Some(id) = state.queue.pop_front() {
        let Some(client) = state.clients.get_mut(&id) else {
            debug!("skipping {} in queue: no longer connected", id);
            continue;
        };
        client.role = Role::Player(seat);
        client.gate.clear();
        state.seats[seat.index()] = Some(id);
        return Some(id);
    }
    None
}
