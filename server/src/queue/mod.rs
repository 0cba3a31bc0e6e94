//! Ordered Event Queue
//!
//! In-process, single-consumer mailbox that decouples acknowledging a webhook
//! from processing it. Items reach the consumer strictly in arrival order.
//!
//! State machine:
//! - Consumer parked in [`EventQueue::next`] and an item arrives: the item is
//!   handed over directly through the waiter slot, the buffer is untouched.
//! - No consumer parked: the item is appended to the FIFO buffer.
//! - Consumer asks for the next item while the buffer is empty: the queue is
//!   drained, every pending [`EventQueue::ready`] waiter resolves, then the
//!   consumer parks.

pub mod dispatcher;

pub use dispatcher::{Dispatchable, Dispatcher, Handler};

use std::collections::VecDeque;
use std::fmt;
use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use futures::Stream;
use tokio::sync::oneshot;

struct State<T> {
    /// Items waiting for the consumer, oldest first.
    buffer: VecDeque<T>,
    /// Parked consumer, if any.
    waiter: Option<oneshot::Sender<T>>,
    /// One-shot listeners for the next drain.
    ready_waiters: Vec<oneshot::Sender<()>>,
}

impl<T> State<T> {
    fn is_idle(&self) -> bool {
        self.buffer.is_empty() && self.waiter.as_ref().is_some_and(|w| !w.is_closed())
    }

    fn notify_drained(&mut self) {
        for waiter in self.ready_waiters.drain(..) {
            let _ = waiter.send(());
        }
    }
}

/// Unbounded, ordered, single-consumer async queue with drain notification.
///
/// Cloning is cheap and every clone refers to the same queue, so producers
/// (request handlers) and the consumer ([`Dispatcher`]) each hold their own
/// handle.
///
/// Only one consumer may pull at a time. A second concurrent `next()` call
/// replaces the first one's registration; the displaced call re-registers
/// itself, but ordering between the two consumers is unspecified.
pub struct EventQueue<T> {
    state: Arc<Mutex<State<T>>>,
}

impl<T> EventQueue<T> {
    /// Create an empty queue.
    #[must_use]
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(State {
                buffer: VecDeque::new(),
                waiter: None,
                ready_waiters: Vec::new(),
            })),
        }
    }

    fn lock(&self) -> MutexGuard<'_, State<T>> {
        // No user code runs under the lock, a poisoned state is still consistent.
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Push an item. Never blocks and never fails.
    ///
    /// A parked consumer receives the item directly; otherwise it is appended
    /// to the tail of the buffer.
    pub fn enqueue(&self, item: T) {
        let mut state = self.lock();

        let item = match state.waiter.take() {
            Some(waiter) => match waiter.send(item) {
                Ok(()) => return,
                // The consumer dropped its pending `next()`; keep the item for the next pull.
                Err(item) => item,
            },
            None => item,
        };

        state.buffer.push_back(item);
    }

    /// Pull the next item, waiting for one if the buffer is empty.
    ///
    /// Dropping the returned future before it completes loses nothing: an
    /// item already handed over goes back to the head of the buffer, and an
    /// item that arrives afterwards is buffered instead of handed over.
    pub async fn next(&self) -> T {
        loop {
            let mut pull = {
                let mut state = self.lock();
                if let Some(item) = state.buffer.pop_front() {
                    return item;
                }

                state.notify_drained();

                let (sender, receiver) = oneshot::channel();
                state.waiter = Some(sender);
                PendingPull {
                    queue: self,
                    receiver,
                }
            };

            if let Ok(item) = (&mut pull.receiver).await {
                return item;
            }
        }
    }

    /// Resolve once, at the next drain after this call.
    ///
    /// The waiter is registered immediately, not on first poll, so an
    /// `enqueue` followed by `ready()` can never miss the drain caused by
    /// processing that item.
    pub fn ready(&self) -> impl Future<Output = ()> + Send + 'static {
        let receiver = {
            let mut state = self.lock();
            let (sender, receiver) = oneshot::channel();
            state.ready_waiters.push(sender);
            receiver
        };

        async move {
            let _ = receiver.await;
        }
    }

    /// Like [`ready`](Self::ready), but resolves immediately when the queue
    /// is already idle.
    pub fn idle(&self) -> impl Future<Output = ()> + Send + 'static {
        let receiver = {
            let mut state = self.lock();
            if state.is_idle() {
                None
            } else {
                let (sender, receiver) = oneshot::channel();
                state.ready_waiters.push(sender);
                Some(receiver)
            }
        };

        async move {
            if let Some(receiver) = receiver {
                let _ = receiver.await;
            }
        }
    }

    /// Number of buffered items. Items handed directly to a parked consumer
    /// are never counted.
    pub fn len(&self) -> usize {
        self.lock().buffer.len()
    }

    /// Whether the buffer is empty.
    pub fn is_empty(&self) -> bool {
        self.lock().buffer.is_empty()
    }

    /// Buffer empty and the consumer parked waiting for the next arrival.
    pub fn is_idle(&self) -> bool {
        self.lock().is_idle()
    }

    /// View the queue as an infinite stream of items.
    pub fn into_stream(self) -> impl Stream<Item = T> + Send
    where
        T: Send + 'static,
    {
        futures::stream::unfold(self, |queue| async move {
            let item = queue.next().await;
            Some((item, queue))
        })
    }
}

/// A parked `next()` call. Puts a handed-over item back if the call is
/// abandoned before it could return it.
struct PendingPull<'a, T> {
    queue: &'a EventQueue<T>,
    receiver: oneshot::Receiver<T>,
}

impl<T> Drop for PendingPull<'_, T> {
    fn drop(&mut self) {
        // After `close`, `enqueue` can no longer hand over to this receiver.
        self.receiver.close();
        let unclaimed = self.receiver.try_recv().ok();

        let mut state = self.queue.lock();
        if state.waiter.as_ref().is_some_and(oneshot::Sender::is_closed) {
            state.waiter = None;
        }
        // A handed-over item predates everything in the buffer.
        if let Some(item) = unclaimed {
            state.buffer.push_front(item);
        }
    }
}

impl<T> Clone for EventQueue<T> {
    fn clone(&self) -> Self {
        Self {
            state: Arc::clone(&self.state),
        }
    }
}

impl<T> Default for EventQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for EventQueue<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.lock();
        f.debug_struct("EventQueue")
            .field("buffered", &state.buffer.len())
            .field("consumer_parked", &state.waiter.is_some())
            .field("ready_waiters", &state.ready_waiters.len())
            .finish()
    }
}
