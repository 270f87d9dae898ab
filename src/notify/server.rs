use std::collections::HashMap;
use tokio::sync::{RwLock, mpsc};
use uuid::Uuid;

use crate::notify::protocol::ServerEvent;

/// A handle to send events to one connected WebSocket client.
#[derive(Debug)]
struct SessionHandle {
    conn_id: Uuid,
    sender: mpsc::UnboundedSender<ServerEvent>,
}

/// Registry of live notification channels, keyed by user id.
///
/// A user can hold several connections at once (multiple tabs); an event is
/// fanned out to all of them. Delivery is fire-and-forget: no channel for
/// the user means the event is dropped, and a send failure just means the
/// receiver disconnected before `deregister` ran.
pub struct NotifyServer {
    sessions: RwLock<HashMap<Uuid, Vec<SessionHandle>>>,
}

impl NotifyServer {
    pub fn new() -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
        }
    }

    /// Register a new WebSocket connection for a user.
    /// Returns the connection id and the receiver the session should drain.
    pub async fn register(&self, user_id: Uuid) -> (Uuid, mpsc::UnboundedReceiver<ServerEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let conn_id = Uuid::new_v4();

        let mut sessions = self.sessions.write().await;
        sessions.entry(user_id).or_default().push(SessionHandle {
            conn_id,
            sender: tx,
        });

        (conn_id, rx)
    }

    /// Remove one WebSocket connection for a user.
    pub async fn deregister(&self, user_id: Uuid, conn_id: Uuid) {
        let mut sessions = self.sessions.write().await;

        if let Some(handles) = sessions.get_mut(&user_id) {
            handles.retain(|h| h.conn_id != conn_id);
            if handles.is_empty() {
                sessions.remove(&user_id);
            }
        }
    }

    /// Deliver an event to every live connection of one user.
    pub async fn deliver(&self, user_id: Uuid, event: ServerEvent) {
        let sessions = self.sessions.read().await;
        match sessions.get(&user_id) {
            Some(handles) => {
                for handle in handles {
                    // Send failure means the receiver disconnected; the
                    // session task cleans itself up via deregister().
                    let _ = handle.sender.send(event.clone());
                }
            }
            None => {
                tracing::debug!(%user_id, "no live channel, dropping event");
            }
        }
    }

    /// Check if a user has at least one live connection.
    pub async fn is_online(&self, user_id: Uuid) -> bool {
        self.sessions.read().await.contains_key(&user_id)
    }
}

impl Default for NotifyServer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hired_event(gig_title: &str) -> ServerEvent {
        ServerEvent::Hired {
            message: format!("You have been hired for \"{gig_title}\"!"),
            gig_id: Uuid::new_v4(),
            gig_title: gig_title.to_string(),
            bid_id: Uuid::new_v4(),
        }
    }

    #[tokio::test]
    async fn delivers_to_registered_user() {
        let server = NotifyServer::new();
        let user = Uuid::new_v4();
        let (_conn, mut rx) = server.register(user).await;

        server.deliver(user, hired_event("Logo design")).await;

        let event = rx.try_recv().expect("event should be queued");
        let ServerEvent::Hired { gig_title, .. } = event;
        assert_eq!(gig_title, "Logo design");
    }

    #[tokio::test]
    async fn fans_out_to_every_connection_of_a_user() {
        let server = NotifyServer::new();
        let user = Uuid::new_v4();
        let (_c1, mut rx1) = server.register(user).await;
        let (_c2, mut rx2) = server.register(user).await;

        server.deliver(user, hired_event("Logo design")).await;

        assert!(rx1.try_recv().is_ok());
        assert!(rx2.try_recv().is_ok());
    }

    #[tokio::test]
    async fn delivery_to_absent_user_is_a_noop() {
        let server = NotifyServer::new();
        let user = Uuid::new_v4();
        let (_conn, mut rx) = server.register(user).await;

        server.deliver(Uuid::new_v4(), hired_event("Logo design")).await;

        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn deregister_removes_only_that_connection() {
        let server = NotifyServer::new();
        let user = Uuid::new_v4();
        let (c1, mut rx1) = server.register(user).await;
        let (_c2, mut rx2) = server.register(user).await;

        server.deregister(user, c1).await;
        assert!(server.is_online(user).await);

        server.deliver(user, hired_event("Logo design")).await;
        assert!(rx1.try_recv().is_err());
        assert!(rx2.try_recv().is_ok());
    }

    #[tokio::test]
    async fn last_deregister_takes_user_offline() {
        let server = NotifyServer::new();
        let user = Uuid::new_v4();
        let (conn, _rx) = server.register(user).await;

        server.deregister(user, conn).await;
        assert!(!server.is_online(user).await);
    }
}
