use serde::Deserialize;
use tokio::sync::mpsc;

use crate::{CloseReason, NotificationId};

/// Outbound event produced by the executor for the transport layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Signal {
    NotificationClosed { id: NotificationId, reason: CloseReason },
    ActionInvoked { id: NotificationId, action_key: String },
}

/// What to do with a signal when the queue is full.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OverflowPolicy {
    /// Suspend the executor until the emitter catches up.
    #[default]
    Block,
    /// Discard the signal that did not fit and log a warning.
    DropNewest,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct SignalQueueConfig {
    pub capacity: usize,
    pub overflow: OverflowPolicy,
}

impl Default for SignalQueueConfig {
    fn default() -> Self {
        SignalQueueConfig { capacity: 64, overflow: OverflowPolicy::Block }
    }
}

pub type SignalReceiver = mpsc::Receiver<Signal>;

/// Write side of the bounded signal FIFO. Only the executor pushes into it.
#[derive(Debug)]
pub struct SignalQueue {
    sender: mpsc::Sender<Signal>,
    overflow: OverflowPolicy,
}

impl SignalQueue {
    pub fn new(config: SignalQueueConfig) -> (SignalQueue, SignalReceiver) {
        let (sender, receiver) = mpsc::channel(config.capacity.max(1));
        (SignalQueue { sender, overflow: config.overflow }, receiver)
    }

    pub async fn push(&self, signal: Signal) {
        match self.overflow {
            OverflowPolicy::Block => {
                if self.sender.send(signal).await.is_err() {
                    log::warn!("Signal emitter is gone, discarding signal");
                }
            }
            OverflowPolicy::DropNewest => match self.sender.try_send(signal) {
                Ok(()) => {}
                Err(mpsc::error::TrySendError::Full(signal)) => {
                    log::warn!("Signal queue is full, dropping {:?}", signal);
                }
                Err(mpsc::error::TrySendError::Closed(_)) => {
                    log::warn!("Signal emitter is gone, discarding signal");
                }
            },
        }
    }
}

/// The transport layer's two emission primitives.
#[async_trait::async_trait]
pub trait SignalSink: Send + Sync {
    async fn notification_closed(&self, id: NotificationId, reason: CloseReason) -> zbus::Result<()>;
    async fn action_invoked(&self, id: NotificationId, action_key: &str) -> zbus::Result<()>;
}

/// Forward every queued signal to the sink, in order, until the queue is closed.
pub async fn run_emitter<S: SignalSink>(sink: S, mut receiver: SignalReceiver) {
    while let Some(signal) = receiver.recv().await {
        log::debug!("Sending {:?}", signal);
        let result = match &signal {
            Signal::NotificationClosed { id, reason } => sink.notification_closed(*id, *reason).await,
            Signal::ActionInvoked { id, action_key } => sink.action_invoked(*id, action_key).await,
        };
        if let Err(e) = result {
            log::error!("failed to emit {:?}: {}", signal, e);
        }
    }
    log::debug!("Signal queue closed, emitter finished");
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::sync::{Arc, Mutex};

    #[derive(Clone, Default)]
    struct RecordingSink {
        emitted: Arc<Mutex<Vec<Signal>>>,
    }

    #[async_trait::async_trait]
    impl SignalSink for RecordingSink {
        async fn notification_closed(&self, id: NotificationId, reason: CloseReason) -> zbus::Result<()> {
            self.emitted.lock().unwrap().push(Signal::NotificationClosed { id, reason });
            Ok(())
        }

        async fn action_invoked(&self, id: NotificationId, action_key: &str) -> zbus::Result<()> {
            self.emitted.lock().unwrap().push(Signal::ActionInvoked { id, action_key: action_key.to_string() });
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_emitter_preserves_order() {
        let (queue, receiver) = SignalQueue::new(SignalQueueConfig::default());
        let signals = vec![
            Signal::ActionInvoked { id: 1, action_key: "default".to_string() },
            Signal::NotificationClosed { id: 1, reason: CloseReason::Dismissed },
            Signal::NotificationClosed { id: 2, reason: CloseReason::Expired },
        ];
        for signal in signals.clone() {
            queue.push(signal).await;
        }
        drop(queue);

        let sink = RecordingSink::default();
        run_emitter(sink.clone(), receiver).await;
        assert_eq!(*sink.emitted.lock().unwrap(), signals);
    }

    #[tokio::test]
    async fn test_drop_newest_when_full() {
        let (queue, mut receiver) =
            SignalQueue::new(SignalQueueConfig { capacity: 1, overflow: OverflowPolicy::DropNewest });
        queue.push(Signal::NotificationClosed { id: 1, reason: CloseReason::Closed }).await;
        queue.push(Signal::NotificationClosed { id: 2, reason: CloseReason::Closed }).await;

        assert_eq!(receiver.try_recv().ok(), Some(Signal::NotificationClosed { id: 1, reason: CloseReason::Closed }));
        assert!(receiver.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_block_waits_for_room() {
        let (queue, mut receiver) = SignalQueue::new(SignalQueueConfig { capacity: 1, overflow: OverflowPolicy::Block });
        queue.push(Signal::NotificationClosed { id: 1, reason: CloseReason::Closed }).await;

        let pusher = tokio::spawn(async move {
            queue.push(Signal::NotificationClosed { id: 2, reason: CloseReason::Closed }).await;
        });
        assert_eq!(receiver.recv().await, Some(Signal::NotificationClosed { id: 1, reason: CloseReason::Closed }));
        pusher.await.unwrap();
        assert_eq!(receiver.recv().await, Some(Signal::NotificationClosed { id: 2, reason: CloseReason::Closed }));
    }

    #[test]
    fn test_zero_capacity_is_clamped() {
        let (queue, _receiver) = SignalQueue::new(SignalQueueConfig { capacity: 0, overflow: OverflowPolicy::Block });
        assert_eq!(queue.sender.max_capacity(), 1);
    }
}
