//! The engine inbox and the handle used to talk to it

use tokio::sync::{broadcast, mpsc, oneshot, watch};
use tracing::warn;

use super::messages::{Message, Reply};
use crate::{
    error::ChannelError,
    state::{TimerStatus, TimerUpdate},
};

const UPDATE_CAPACITY: usize = 64;

/// Everything the engine loop consumes, in arrival order
#[derive(Debug)]
pub enum Envelope {
    /// A UI command. `reply` is `None` for fire-and-forget sends.
    Message {
        message: Message,
        reply: Option<oneshot::Sender<Reply>>,
    },
    /// Posted by the ticker; stale generations are ignored
    Tick { generation: u64 },
}

/// The engine's ends of the channels
#[derive(Debug)]
pub struct EngineLinks {
    /// Weak so a pending tick task never keeps the loop alive
    pub inbox: mpsc::WeakUnboundedSender<Envelope>,
    pub status: watch::Sender<TimerStatus>,
    pub updates: broadcast::Sender<TimerUpdate>,
}

/// Client side of the message channel. Cheap to clone.
#[derive(Debug, Clone)]
pub struct EngineHandle {
    inbox: mpsc::UnboundedSender<Envelope>,
    status: watch::Receiver<TimerStatus>,
    updates: broadcast::Sender<TimerUpdate>,
}

/// Build a connected handle, engine links and inbox receiver
pub fn engine_channel() -> (EngineHandle, EngineLinks, mpsc::UnboundedReceiver<Envelope>) {
    let (inbox_tx, inbox_rx) = mpsc::unbounded_channel();
    let (status_tx, status_rx) = watch::channel(TimerStatus::default());
    let (updates_tx, _) = broadcast::channel(UPDATE_CAPACITY);

    let links = EngineLinks {
        inbox: inbox_tx.downgrade(),
        status: status_tx,
        updates: updates_tx.clone(),
    };
    let handle = EngineHandle {
        inbox: inbox_tx,
        status: status_rx,
        updates: updates_tx,
    };
    (handle, links, inbox_rx)
}

impl EngineHandle {
    /// Send a message and wait for the engine's reply
    pub async fn request(&self, message: Message) -> Result<Reply, ChannelError> {
        let (reply, response) = oneshot::channel();
        self.inbox
            .send(Envelope::Message {
                message,
                reply: Some(reply),
            })
            .map_err(|_| ChannelError::Closed)?;
        response.await.map_err(|_| ChannelError::NoReply)
    }

    /// Send a message without waiting for it to be handled
    pub fn send(&self, message: Message) -> Result<(), ChannelError> {
        self.inbox
            .send(Envelope::Message {
                message,
                reply: None,
            })
            .map_err(|_| ChannelError::Closed)
    }

    /// Current status, or the last one the engine published if it cannot be
    /// reached
    pub async fn status(&self) -> TimerStatus {
        match self.request(Message::GetTimerStatus).await {
            Ok(Reply::Status(status)) => status,
            Ok(other) => {
                warn!("Unexpected reply to getTimerStatus: {:?}", other);
                self.last_known_status()
            }
            Err(e) => {
                warn!("Engine unreachable ({}), using last known status", e);
                self.last_known_status()
            }
        }
    }

    pub fn last_known_status(&self) -> TimerStatus {
        self.status.borrow().clone()
    }

    /// Listen for `timerUpdate` pushes
    pub fn subscribe_updates(&self) -> broadcast::Receiver<TimerUpdate> {
        self.updates.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn closed_inbox_is_reported_and_status_falls_back() {
        let (handle, links, inbox) = engine_channel();
        links.status.send_replace(TimerStatus {
            remaining: 1_000,
            ..TimerStatus::default()
        });
        drop(inbox);

        assert_eq!(
            handle.request(Message::PauseTimer).await,
            Err(ChannelError::Closed)
        );
        assert_eq!(handle.send(Message::PauseTimer), Err(ChannelError::Closed));
        assert_eq!(handle.status().await.remaining, 1_000);
    }

    #[tokio::test]
    async fn dropped_reply_is_reported() {
        let (handle, _links, mut inbox) = engine_channel();
        let responder = tokio::spawn(async move {
            // Swallow the request without answering
            let _ = inbox.recv().await;
        });

        assert_eq!(
            handle.request(Message::GetPresets).await,
            Err(ChannelError::NoReply)
        );
        responder.await.unwrap();
    }
}
