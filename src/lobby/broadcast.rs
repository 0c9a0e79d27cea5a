//! Chat fan-out and the next-match announcer.

use std::sync::Arc;
use std::time::Duration;

use log::debug;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};

use super::{ClientId, Lobby};
use crate::common::Role;
use crate::protocol;

impl Lobby {
    /// Send `<sender name>: <text>` to everyone but the sender.
    ///
    /// Returns how many identities the line was queued for. An unknown
    /// sender (already disconnected) sends nothing.
    pub async fn send_all(&self, sender: ClientId, text: &str) -> usize {
        let state = self.state.lock().await;
        let Some(from) = state.clients.get(&sender) else {
            return 0;
        };
        let line = protocol::chat(&from.name, text);
        let mut reached = 0;
        for client in state.clients.values().filter(|c| c.id != sender) {
            if client.outbox.send(line.clone()) {
                reached += 1;
            }
        }
        reached
    }

    /// Names of the two identities slated for the next session, if known.
    ///
    /// Uses the two oldest live queue entries, topping up from the current
    /// seat holders when the queue is short.
    pub async fn next_match(&self) -> Option<(String, String)> {
        let state = self.state.lock().await;
        let name = |id: &ClientId| state.clients.get(id).map(|c| c.name.clone());
        let queued: Vec<String> = state.queue.iter().filter_map(name).take(2).collect();
        let seated = state.seats.iter().flatten();

        let mut picks = queued.into_iter();
        match (picks.next(), picks.next()) {
            (Some(a), Some(b)) => Some((a, b)),
            (Some(a), None) => {
                let b = state.seats[1].iter().chain(state.seats[0].iter()).find_map(name)?;
                Some((a, b))
            }
            _ => {
                let mut seated = seated.filter_map(name);
                Some((seated.next()?, seated.next()?))
            }
        }
    }

    /// Send the next-match preview to spectators while a game is running.
    ///
    /// Returns the number of spectators reached; zero when there is no
    /// active game or fewer than two candidates.
    pub async fn announce_next_match(&self) -> usize {
        if !self.game_active() {
            return 0;
        }
        let Some((first, second)) = self.next_match().await else {
            debug!("announcer: fewer than two candidates");
            return 0;
        };
        let line = protocol::next_match_preview(&first, &second);
        let state = self.state.lock().await;
        let mut reached = 0;
        for client in state.clients.values().filter(|c| c.role == Role::Spectator) {
            if client.outbox.send(line.clone()) {
                reached += 1;
            }
        }
        debug!("announced {} vs {} to {} spectators", first, second, reached);
        reached
    }
}

/// Start the periodic announcer. The first preview goes out one `period` after start.
pub fn spawn_announcer(lobby: Arc<Lobby>, period: Duration) -> JoinHandle<()> {
    // interval_at panics on a zero period
    let period = period.max(Duration::from_millis(1));
    tokio::spawn(async move {
        let mut ticks = interval_at(Instant::now() + period, period);
        ticks.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            ticks.tick().await;
            lobby.announce_next_match().await;
        }
    })
}
