//! Snapshot subscribers.
//!
//! Every subscriber gets its own delivery thread fed by a bounded mailbox, so a slow or
//! panicking callback never stalls the clock or other subscribers. When a subscriber's
//! backlog is full the oldest pending snapshot is discarded to make room, so the most
//! recently published state always reaches every subscriber.
//!
//! Unsubscribing closes the mailbox without waiting for the delivery thread: a delivery
//! already in progress may finish, but nothing further is delivered afterwards.

use std::collections::{BTreeMap, VecDeque};
use std::panic::{self, AssertUnwindSafe};
use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};
use std::thread;

use tracing::{debug, warn};

use crate::sim::snapshot::Snapshot;

/// Snapshots buffered per subscriber before the oldest are discarded.
pub const SUBSCRIBER_BACKLOG: usize = 16;

#[derive(Debug, Default)]
struct Pending {
    queue: VecDeque<Arc<Snapshot>>,
    closed: bool,
}

/// Bounded hand-off between publishers and one delivery thread.
#[derive(Debug, Default)]
struct Mailbox {
    pending: Mutex<Pending>,
    ready: Condvar,
}

impl Mailbox {
    /// Queues `snapshot`, evicting the oldest entry when full. Returns the evicted cycle.
    fn post(&self, snapshot: &Arc<Snapshot>) -> Option<u64> {
        let mut pending = self.lock();
        let evicted = if pending.queue.len() >= SUBSCRIBER_BACKLOG {
            pending.queue.pop_front().map(|s| s.cycle)
        } else {
            None
        };
        pending.queue.push_back(Arc::clone(snapshot));
        drop(pending);
        self.ready.notify_one();
        evicted
    }

    /// Blocks until a snapshot is available; `None` once closed.
    fn take(&self) -> Option<Arc<Snapshot>> {
        let mut pending = self.lock();
        loop {
            if pending.closed {
                return None;
            }
            if let Some(s) = pending.queue.pop_front() {
                return Some(s);
            }
            pending = self
                .ready
                .wait(pending)
                .unwrap_or_else(PoisonError::into_inner);
        }
    }

    fn close(&self) {
        let mut pending = self.lock();
        pending.closed = true;
        pending.queue.clear();
        drop(pending);
        self.ready.notify_all();
    }

    fn lock(&self) -> MutexGuard<'_, Pending> {
        self.pending.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[derive(Debug)]
struct Subscriber {
    mailbox: Arc<Mailbox>,
}

impl Drop for Subscriber {
    fn drop(&mut self) {
        self.mailbox.close();
    }
}

/// Set of snapshot observers keyed by id.
#[derive(Debug, Default)]
pub struct SubscriberRegistry {
    subscribers: Mutex<BTreeMap<String, Subscriber>>,
}

impl SubscriberRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `callback` under `id`.
    ///
    /// Returns `false` if `id` is already registered or the delivery thread cannot start.
    pub fn subscribe<F>(&self, id: &str, callback: F) -> bool
    where
        F: Fn(&Snapshot) + Send + 'static,
    {
        let mut subs = self.lock();
        if subs.contains_key(id) {
            return false;
        }

        let mailbox = Arc::new(Mailbox::default());
        let inbox = Arc::clone(&mailbox);
        let name = id.to_owned();
        let spawned = thread::Builder::new()
            .name(format!("tomasim-sub-{id}"))
            .spawn(move || {
                while let Some(snapshot) = inbox.take() {
                    let delivered =
                        panic::catch_unwind(AssertUnwindSafe(|| callback(&snapshot)));
                    if delivered.is_err() {
                        warn!(subscriber = %name, cycle = snapshot.cycle, "subscriber panicked");
                    }
                }
                debug!(subscriber = %name, "delivery thread exiting");
            });
        if let Err(e) = spawned {
            warn!(subscriber = id, error = %e, "could not start delivery thread");
            return false;
        }

        let _ = subs.insert(id.to_owned(), Subscriber { mailbox });
        debug!(subscriber = id, "subscribed");
        true
    }

    /// Removes the subscriber `id`. Returns `false` if it was not registered.
    pub fn unsubscribe(&self, id: &str) -> bool {
        // Dropping the entry closes its mailbox.
        if self.lock().remove(id).is_none() {
            return false;
        }
        debug!(subscriber = id, "unsubscribed");
        true
    }

    /// Hands `snapshot` to every subscriber's delivery thread.
    pub fn publish(&self, snapshot: &Arc<Snapshot>) {
        let subs = self.lock();
        for (id, sub) in subs.iter() {
            if let Some(cycle) = sub.mailbox.post(snapshot) {
                debug!(subscriber = %id, cycle, "backlog full; oldest snapshot discarded");
            }
        }
    }

    /// Number of registered subscribers.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Returns `true` if nobody is subscribed.
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> MutexGuard<'_, BTreeMap<String, Subscriber>> {
        self.subscribers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}
