//! Suspending Queue
//!
//! FIFO handoff between producers and consumers. A consumer that finds the
//! queue empty parks on a one-shot channel until a producer hands it an item.

use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard, PoisonError};

use tokio::sync::oneshot;

#[derive(Debug)]
struct State<T> {
    /// Items nobody has asked for yet
    buffer: VecDeque<T>,
    /// Parked consumers in arrival order
    waiters: VecDeque<oneshot::Sender<T>>,
}

#[derive(Debug, Clone, Copy)]
enum Position {
    Front,
    Back,
}

impl<T> State<T> {
    // Gives `item` to the oldest live waiter, otherwise buffers it.
    fn deliver(&mut self, item: T, position: Position) {
        let mut item = item;
        while let Some(waiter) = self.waiters.pop_front() {
            match waiter.send(item) {
                Ok(()) => return,
                Err(returned) => item = returned,
            }
        }
        match position {
            Position::Front => self.buffer.push_front(item),
            Position::Back => self.buffer.push_back(item),
        }
    }
}

/// A consumer parked in `dequeue`.
///
/// On drop it closes its channel, unregisters itself, and puts back any
/// item that was sent to it but never read.
struct Waiting<'a, T> {
    queue: &'a SuspendingQueue<T>,
    receiver: oneshot::Receiver<T>,
}

impl<T> Drop for Waiting<'_, T> {
    fn drop(&mut self) {
        self.receiver.close();
        let mut state = self.queue.lock();
        if let Ok(item) = self.receiver.try_recv() {
            // Sent before any later item, so it goes back ahead of them.
            state.deliver(item, Position::Front);
        }
        state.waiters.retain(|waiter| !waiter.is_closed());
    }
}

// == Suspending Queue ==
/// Unbounded FIFO queue whose `dequeue` suspends while it is empty.
///
/// Items are delivered in `enqueue` order and parked consumers are served
/// first come, first served. The buffer and the waiter list are never both
/// non-empty: `enqueue` only buffers when no live consumer is waiting.
#[derive(Debug)]
pub struct SuspendingQueue<T> {
    state: Mutex<State<T>>,
}

impl<T> Default for SuspendingQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> SuspendingQueue<T> {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(State {
                buffer: VecDeque::new(),
                waiters: VecDeque::new(),
            }),
        }
    }

    // == Enqueue ==
    /// Hands `item` to the oldest waiting consumer, or buffers it.
    ///
    /// Consumers that stopped waiting (their dequeue future was dropped) are
    /// skipped, so an item is never lost to a cancelled dequeue.
    pub fn enqueue(&self, item: T) {
        self.lock().deliver(item, Position::Back);
    }

    // == Dequeue ==
    /// Takes the front item, suspending until one is available.
    ///
    /// Cancel safe: if the future is dropped after an item was handed to it
    /// but before it returned, the item goes back to the head of the queue.
    pub async fn dequeue(&self) -> T {
        loop {
            let mut waiting = {
                let mut state = self.lock();
                if let Some(item) = state.buffer.pop_front() {
                    return item;
                }
                let (sender, receiver) = oneshot::channel();
                state.waiters.push_back(sender);
                Waiting {
                    queue: self,
                    receiver,
                }
            };

            // Senders are only dropped unsent if the waiter list is cleared,
            // in which case register again.
            if let Ok(item) = (&mut waiting.receiver).await {
                return item;
            }
        }
    }

    /// Takes the front item without suspending.
    pub fn try_dequeue(&self) -> Option<T> {
        self.lock().buffer.pop_front()
    }

    /// Number of buffered items.
    pub fn len(&self) -> usize {
        self.lock().buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().buffer.is_empty()
    }

    /// Number of consumers currently parked in `dequeue`.
    pub fn waiting(&self) -> usize {
        self.lock()
            .waiters
            .iter()
            .filter(|waiter| !waiter.is_closed())
            .count()
    }

    #[cfg(test)]
    fn registered_waiters(&self) -> usize {
        self.lock().waiters.len()
    }

    // Critical sections never panic mid-update, so a poisoned lock still
    // guards consistent state.
    fn lock(&self) -> MutexGuard<'_, State<T>> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
