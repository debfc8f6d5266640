//! Transport between the recorder's execution contexts.
//!
//! Two shapes of traffic exist: calls that suspend the caller until a typed
//! reply arrives (`request`), and one-way notifications fanned out to
//! whoever is listening (`NotificationChannel`).

use std::time::Duration;

use tokio::sync::{broadcast, mpsc, oneshot};
use tracing::{debug, warn};

use crate::types::errors::TransportError;

/// Sends a command carrying a reply slot and waits for the reply.
///
/// `build` receives the oneshot sender the handler must answer on.
/// `timeout` bounds the whole exchange, including waiting for room in a
/// full command queue. No retry is attempted on any failure.
pub async fn request<C, T>(
    tx: &mpsc::Sender<C>,
    build: impl FnOnce(oneshot::Sender<T>) -> C,
    timeout: Duration,
) -> Result<T, TransportError> {
    let (reply_tx, reply_rx) = oneshot::channel();
    let exchange = async move {
        tx.send(build(reply_tx))
            .await
            .map_err(|_| TransportError::Closed("receiver is no longer running".to_string()))?;
        reply_rx
            .await
            .map_err(|_| TransportError::NoResponse("handler dropped the reply".to_string()))
    };

    match tokio::time::timeout(timeout, exchange).await {
        Ok(result) => result,
        Err(_) => Err(TransportError::Timeout(timeout.as_millis() as u64)),
    }
}

/// Fan-out channel for fire-and-forget notifications.
#[derive(Debug)]
pub struct NotificationChannel<T: Clone> {
    name: &'static str,
    sender: broadcast::Sender<T>,
}

impl<T: Clone> Clone for NotificationChannel<T> {
    fn clone(&self) -> Self {
        Self {
            name: self.name,
            sender: self.sender.clone(),
        }
    }
}

impl<T: Clone + std::fmt::Debug> NotificationChannel<T> {
    pub fn new(name: &'static str, capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { name, sender }
    }

    /// Attaches a new listener. It only sees notifications sent afterwards.
    pub fn subscribe(&self) -> broadcast::Receiver<T> {
        self.sender.subscribe()
    }

    pub fn receiver_count(&self) -> usize {
        self.sender.receiver_count()
    }

    /// Delivers `message` to every listener. Returns how many received it.
    ///
    /// Having no listeners is not an error for the sender: the message is
    /// logged and dropped.
    pub fn notify(&self, message: T) -> usize {
        match self.sender.send(message) {
            Ok(count) => {
                debug!(channel = self.name, receivers = count, "Notification sent");
                count
            }
            Err(broadcast::error::SendError(message)) => {
                warn!(channel = self.name, ?message, "No listener attached, notification dropped");
                0
            }
        }
    }
}
