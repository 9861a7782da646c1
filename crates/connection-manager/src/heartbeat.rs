//! Idle-connection detection: ping on an interval, drop a connection that
//! never answers within the timeout.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::{interval, timeout};

use core_types::{CloseReason, UserId};
use protocol::ServerMessage;

use crate::manager::ConnectionManager;

pub const PING_INTERVAL: Duration = Duration::from_secs(15);
pub const PONG_TIMEOUT: Duration = Duration::from_secs(45);

/// Runs until the connection is dropped (by this loop, or by someone else
/// unregistering `user_id` first). `pong_rx` receives a unit value each time
/// the websocket read task observes a pong (or any client traffic — any
/// sign of life resets the timeout, matching how the teacher's socket loop
/// treats `Ping`/`Pong` passthrough as liveness).
pub async fn run(manager: Arc<ConnectionManager>, user_id: UserId, mut pong_rx: mpsc::Receiver<()>) {
    let mut ticks = interval(PING_INTERVAL);
    ticks.tick().await; // first tick fires immediately; skip it

    loop {
        ticks.tick().await;
        if !manager.is_connected(user_id) {
            return;
        }
        if manager.send(user_id, ServerMessage::Pong).is_err() {
            return;
        }
        match timeout(PONG_TIMEOUT, pong_rx.recv()).await {
            Ok(Some(())) => continue,
            Ok(None) => return, // sender dropped: connection already torn down
            Err(_elapsed) => {
                tracing::info!(%user_id, "heartbeat timed out");
                manager.kill(user_id, CloseReason::Timeout);
                return;
            }
        }
    }
}
