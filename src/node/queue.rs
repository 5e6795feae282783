use crate::protocol::LsaBuffer;
use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard, PoisonError};
use tokio::sync::Notify;
use tokio::sync::futures::Notified;

/// FIFO hand-off of advertisement buffers between the network task and the
/// node loop.
///
/// Emptiness check and removal happen under one lock (`try_pop`), so a
/// consumer never observes an item that another caller already took.
#[derive(Debug, Default)]
pub struct TransferQueue {
    items: Mutex<VecDeque<LsaBuffer>>,
    ready: Notify,
}

impl TransferQueue {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, VecDeque<LsaBuffer>> {
        self.items.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn push(&self, buffer: LsaBuffer) {
        self.lock().push_back(buffer);
        self.ready.notify_one();
    }

    pub fn try_pop(&self) -> Option<LsaBuffer> {
        self.lock().pop_front()
    }

    /// Completes once a push happens after the last wake-up.
    ///
    /// A push racing with the caller leaves a stored permit, so waiting
    /// after an empty `try_pop` cannot miss it. Meant for a single consumer.
    pub fn notified(&self) -> Notified<'_> {
        self.ready.notified()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }
}
