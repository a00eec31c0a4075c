//! De-duplicating work queue of Trigger keys.

use crate::model::ObjectKey;
use std::collections::{HashSet, VecDeque};
use std::pin::pin;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, Notify};

#[derive(Default)]
struct QueueState {
    queue: VecDeque<ObjectKey>,
    /// Keys waiting to be processed, whether queued or parked behind an in-flight run.
    dirty: HashSet<ObjectKey>,
    processing: HashSet<ObjectKey>,
    shutting_down: bool,
}

/// FIFO of keys where each key is queued at most once and handed to at most one
/// worker at a time.
///
/// A key added while it is being processed is parked until `done` is called for
/// it, then queued again.
#[derive(Default)]
pub struct WorkQueue {
    state: Mutex<QueueState>,
    notify: Notify,
}

impl WorkQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues `key`. Returns `true` only when the key was not already pending.
    pub async fn add(&self, key: ObjectKey) -> bool {
        let mut state = self.state.lock().await;
        if state.shutting_down || !state.dirty.insert(key.clone()) {
            return false;
        }
        if !state.processing.contains(&key) {
            state.queue.push_back(key);
            drop(state);
            self.notify.notify_one();
        }
        true
    }

    /// Queues `key` once `delay` has elapsed.
    pub fn add_after(self: &Arc<Self>, key: ObjectKey, delay: Duration) {
        let queue = Arc::clone(self);
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            queue.add(key).await;
        });
    }

    /// Waits for the next key. Returns `None` once the queue is shut down and empty.
    pub async fn get(&self) -> Option<ObjectKey> {
        loop {
            let mut notified = pin!(self.notify.notified());
            notified.as_mut().enable();

            {
                let mut state = self.state.lock().await;
                if let Some(key) = state.queue.pop_front() {
                    state.dirty.remove(&key);
                    state.processing.insert(key.clone());
                    return Some(key);
                }
                if state.shutting_down {
                    return None;
                }
            }

            notified.await;
        }
    }

    /// Releases `key` after processing, re-queueing it when it was added meanwhile.
    pub async fn done(&self, key: &ObjectKey) {
        let mut state = self.state.lock().await;
        state.processing.remove(key);
        if state.dirty.contains(key) {
            state.queue.push_back(key.clone());
            drop(state);
            self.notify.notify_one();
        }
    }

    /// Rejects further adds and wakes every waiting worker.
    pub async fn shutdown(&self) {
        self.state.lock().await.shutting_down = true;
        self.notify.notify_waiters();
    }

    pub async fn len(&self) -> usize {
        self.state.lock().await.queue.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[cfg(test)]
mod tests {
    use super::WorkQueue;
    use crate::model::ObjectKey;
    use std::sync::Arc;
    use std::time::Duration;

    fn key(name: &str) -> ObjectKey {
        ObjectKey::new("ns1", name)
    }

    #[tokio::test]
    async fn pending_keys_are_deduplicated() {
        let queue = WorkQueue::new();

        assert!(queue.add(key("t1")).await);
        assert!(!queue.add(key("t1")).await);
        assert!(queue.add(key("t2")).await);

        assert_eq!(queue.len().await, 2);
        assert_eq!(queue.get().await, Some(key("t1")));
        assert_eq!(queue.get().await, Some(key("t2")));
    }

    #[tokio::test]
    async fn in_flight_key_is_parked_until_done() {
        let queue = WorkQueue::new();
        queue.add(key("t1")).await;
        let in_flight = queue.get().await.unwrap();

        assert!(queue.add(key("t1")).await);
        assert!(queue.is_empty().await);

        queue.done(&in_flight).await;
        assert_eq!(queue.get().await, Some(key("t1")));
    }

    #[tokio::test]
    async fn shutdown_wakes_waiting_workers() {
        let queue = Arc::new(WorkQueue::new());
        let waiter = {
            let queue = queue.clone();
            tokio::spawn(async move { queue.get().await })
        };

        tokio::task::yield_now().await;
        queue.shutdown().await;

        assert_eq!(waiter.await.unwrap(), None);
        assert!(!queue.add(key("t1")).await);
    }

    #[tokio::test(start_paused = true)]
    async fn delayed_add_arrives_after_delay() {
        let queue = Arc::new(WorkQueue::new());
        queue.add_after(key("t1"), Duration::from_secs(5));

        tokio::time::sleep(Duration::from_secs(4)).await;
        assert!(queue.is_empty().await);

        tokio::time::sleep(Duration::from_secs(2)).await;
        assert_eq!(queue.get().await, Some(key("t1")));
    }
}
