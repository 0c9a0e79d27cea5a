//! Teardown when a connection ends.

use log::info;

use super::{ClientId, Lobby};
use crate::common::Seat;
use crate::protocol;

impl Lobby {
    /// Forget `id` after its connection ended.
    ///
    /// Runs under the lobby lock so the manager never sees a half-removed
    /// identity. A seat held during an active game ends the session: both
    /// gates get the disconnect sentinel and the other seat wins. The queue
    /// entry is left for the manager to skip.
    pub async fn disconnect(&self, id: ClientId) {
        let mut state = self.state.lock().await;
        let Some(client) = state.clients.remove(&id) else {
            return;
        };
        info!("{} ({}) disconnected", id, client.name);

        if let Some(seat) = state.seat_of(id) {
            // Placement counts too: the survivor wins even if no shot was
            // fired. A session that already announced its own result has
            // cleared the flag, so no second verdict goes out.
            if self.signals.abandon() {
                for s in Seat::BOTH {
                    let gate = match state.seats[s.index()] {
                        Some(holder) if holder == id => Some(&client.gate),
                        Some(holder) => state.clients.get(&holder).map(|c| &c.gate),
                        None => None,
                    };
                    if let Some(gate) = gate {
                        gate.force_disconnect();
                    }
                }
                let survivor = state.seats[seat.other().index()]
                    .and_then(|other| state.clients.get(&other));
                if let Some(survivor) = survivor {
                    survivor.outbox.send(protocol::OPPONENT_DISCONNECTED);
                    info!("{} wins by disconnect of {}", survivor.name, client.name);
                }
            }
            state.seats[seat.index()] = None;
        }

        client.outbox.close();
        drop(state);
        self.wake.notify_one();
    }
}
