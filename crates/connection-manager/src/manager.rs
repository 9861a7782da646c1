//! Registry of live websocket connections.
//!
//! One entry per authenticated user: a bounded outbound queue the
//! connection's write task drains, and a kill switch the manager can fire to
//! proactively tear down a socket (superseded login, backpressure, a
//! heartbeat timeout) without waiting for the read side to notice.

use std::collections::{HashMap, HashSet};
use std::sync::RwLock;

use tokio::sync::{mpsc, oneshot};

use core_types::{CloseReason, SessionId, UserId};
use protocol::ServerMessage;

use crate::error::SendError;

/// Outbound queue depth per connection. A client that can't keep up with
/// this many unacked server messages is treated as unreachable rather than
/// buffered indefinitely.
pub const OUTBOX_CAPACITY: usize = 256;

struct Connection {
    outbox: mpsc::Sender<ServerMessage>,
    kill: Option<oneshot::Sender<CloseReason>>,
    session_id: Option<SessionId>,
}

/// A freshly registered connection's receiving half, handed back to the
/// websocket task that owns the actual socket.
pub struct RegisteredConnection {
    pub outbox_rx: mpsc::Receiver<ServerMessage>,
    pub kill_rx: oneshot::Receiver<CloseReason>,
}

#[derive(Default)]
pub struct ConnectionManager {
    connections: RwLock<HashMap<UserId, Connection>>,
    sessions: RwLock<HashMap<SessionId, HashSet<UserId>>>,
}

impl ConnectionManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `user_id` as connected, superseding and closing any
    /// previous connection for the same user — at most one active socket
    /// per user.
    pub fn register(&self, user_id: UserId) -> RegisteredConnection {
        let (outbox_tx, outbox_rx) = mpsc::channel(OUTBOX_CAPACITY);
        let (kill_tx, kill_rx) = oneshot::channel();

        let mut connections = self.connections.write().expect("connections lock poisoned");
        if let Some(previous) = connections.remove(&user_id) {
            if let Some(kill) = previous.kill {
                let _ = kill.send(CloseReason::Superseded);
            }
            tracing::info!(%user_id, "superseding existing connection");
        }
        connections.insert(
            user_id,
            Connection {
                outbox: outbox_tx,
                kill: Some(kill_tx),
                session_id: None,
            },
        );

        RegisteredConnection { outbox_rx, kill_rx }
    }

    /// Removes `user_id`'s connection entry. Safe to call even if a newer
    /// connection already superseded it — only removes if still present,
    /// idempotent on double-calls from racing cleanup paths.
    pub fn unregister(&self, user_id: UserId) {
        let mut connections = self.connections.write().expect("connections lock poisoned");
        if let Some(connection) = connections.remove(&user_id) {
            if let Some(session_id) = connection.session_id {
                let mut sessions = self.sessions.write().expect("sessions lock poisoned");
                if let Some(members) = sessions.get_mut(&session_id) {
                    members.remove(&user_id);
                    if members.is_empty() {
                        sessions.remove(&session_id);
                    }
                }
            }
        }
    }

    pub fn join_session(&self, user_id: UserId, session_id: SessionId) {
        {
            let mut connections = self.connections.write().expect("connections lock poisoned");
            if let Some(connection) = connections.get_mut(&user_id) {
                connection.session_id = Some(session_id);
            }
        }
        self.sessions
            .write()
            .expect("sessions lock poisoned")
            .entry(session_id)
            .or_default()
            .insert(user_id);
    }

    pub fn leave_session(&self, user_id: UserId, session_id: SessionId) {
        if let Some(connection) = self.connections.write().expect("connections lock poisoned").get_mut(&user_id) {
            if connection.session_id == Some(session_id) {
                connection.session_id = None;
            }
        }
        if let Some(members) = self.sessions.write().expect("sessions lock poisoned").get_mut(&session_id) {
            members.remove(&user_id);
        }
    }

    /// Best-effort send: a full outbox is treated as the client being
    /// unreachable and the connection is killed rather than buffered
    /// further, since an unbounded or larger queue would just delay the
    /// same outcome under sustained backpressure.
    pub fn send(&self, user_id: UserId, message: ServerMessage) -> Result<(), SendError> {
        let connections = self.connections.read().expect("connections lock poisoned");
        let connection = connections.get(&user_id).ok_or(SendError::NotConnected)?;
        match connection.outbox.try_send(message) {
            Ok(()) => Ok(()),
            Err(mpsc::error::TrySendError::Full(_)) => {
                tracing::warn!(%user_id, "outbound queue full, disconnecting");
                drop(connections);
                self.kill(user_id, CloseReason::Backpressure);
                Err(SendError::Backpressure)
            }
            Err(mpsc::error::TrySendError::Closed(_)) => {
                drop(connections);
                self.unregister(user_id);
                Err(SendError::NotConnected)
            }
        }
    }

    pub fn broadcast(&self, session_id: SessionId, message: ServerMessage) {
        let members: Vec<UserId> = self
            .sessions
            .read()
            .expect("sessions lock poisoned")
            .get(&session_id)
            .map(|set| set.iter().copied().collect())
            .unwrap_or_default();
        for user_id in members {
            let _ = self.send(user_id, message.clone());
        }
    }

    pub fn broadcast_except(&self, session_id: SessionId, exclude: UserId, message: ServerMessage) {
        let members: Vec<UserId> = self
            .sessions
            .read()
            .expect("sessions lock poisoned")
            .get(&session_id)
            .map(|set| set.iter().copied().filter(|id| *id != exclude).collect())
            .unwrap_or_default();
        for user_id in members {
            let _ = self.send(user_id, message.clone());
        }
    }

    pub fn is_connected(&self, user_id: UserId) -> bool {
        self.connections.read().expect("connections lock poisoned").contains_key(&user_id)
    }

    pub fn session_member_count(&self, session_id: SessionId) -> usize {
        self.sessions
            .read()
            .expect("sessions lock poisoned")
            .get(&session_id)
            .map(|set| set.len())
            .unwrap_or(0)
    }

    /// Tears down every connection currently joined to `session_id`: each
    /// member is sent a `Closing` message and then killed. Used when a
    /// session's coordinator task goes away unexpectedly and there's no one
    /// left to keep talking to.
    pub fn close_session(&self, session_id: SessionId, reason: CloseReason) {
        let members: Vec<UserId> = self
            .sessions
            .read()
            .expect("sessions lock poisoned")
            .get(&session_id)
            .map(|set| set.iter().copied().collect())
            .unwrap_or_default();
        for user_id in members {
            let _ = self.send(user_id, ServerMessage::Closing { reason });
            self.kill(user_id, reason);
        }
    }

    pub fn kill(&self, user_id: UserId, reason: CloseReason) {
        let mut connections = self.connections.write().expect("connections lock poisoned");
        if let Some(connection) = connections.remove(&user_id) {
            if let Some(kill) = connection.kill {
                let _ = kill.send(reason);
            }
        }
    }
}
