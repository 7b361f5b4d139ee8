//! FIFO of chunk load requests shared between the main thread and the worker.

use std::collections::VecDeque;
use std::sync::{Condvar, Mutex, MutexGuard, PoisonError};

use quarry_voxel::ChunkCoord;

#[derive(Default)]
struct WorkState {
    requests: VecDeque<ChunkCoord>,
    stopped: bool,
}

/// Unbounded request queue guarded by its own mutex and condition variable.
///
/// The consumer blocks in [`next`](Self::next) until a request arrives or the
/// queue is stopped.
#[derive(Default)]
pub struct WorkQueue {
    state: Mutex<WorkState>,
    wake: Condvar,
}

impl WorkQueue {
    /// An empty queue that accepts requests.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a request and wakes the consumer. Ignored once stopped.
    pub fn push(&self, coord: ChunkCoord) {
        let mut state = self.lock();
        if state.stopped {
            return;
        }
        state.requests.push_back(coord);
        drop(state);
        self.wake.notify_one();
    }

    /// Blocks until a request is available and returns it.
    ///
    /// Returns `None` once the queue is stopped, even if requests remain.
    pub fn next(&self) -> Option<ChunkCoord> {
        let mut state = self.lock();
        loop {
            if state.stopped {
                return None;
            }
            if let Some(coord) = state.requests.pop_front() {
                return Some(coord);
            }
            state = self
                .wake
                .wait(state)
                .unwrap_or_else(PoisonError::into_inner);
        }
    }

    /// Signals the stop condition and wakes every waiter.
    pub fn stop(&self) {
        self.lock().stopped = true;
        self.wake.notify_all();
    }

    /// Number of requests not yet taken by the consumer.
    pub(crate) fn len(&self) -> usize {
        self.lock().requests.len()
    }

    fn lock(&self) -> MutexGuard<'_, WorkState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::time::Duration;

    #[test]
    fn test_requests_come_out_in_submission_order() {
        let queue = WorkQueue::new();
        for x in 0..5 {
            queue.push(ChunkCoord::new(x, -x));
        }
        assert_eq!(queue.len(), 5);
        for x in 0..5 {
            assert_eq!(queue.next(), Some(ChunkCoord::new(x, -x)));
        }
        assert_eq!(queue.len(), 0);
    }

    #[test]
    fn test_next_blocks_until_push() {
        let queue = Arc::new(WorkQueue::new());
        let consumer = {
            let queue = Arc::clone(&queue);
            std::thread::spawn(move || queue.next())
        };

        std::thread::sleep(Duration::from_millis(20));
        queue.push(ChunkCoord::new(7, 7));
        assert_eq!(consumer.join().unwrap(), Some(ChunkCoord::new(7, 7)));
    }

    #[test]
    fn test_stop_wakes_waiting_consumer() {
        let queue = Arc::new(WorkQueue::new());
        let consumer = {
            let queue = Arc::clone(&queue);
            std::thread::spawn(move || queue.next())
        };

        std::thread::sleep(Duration::from_millis(20));
        queue.stop();
        assert_eq!(consumer.join().unwrap(), None);
    }

    #[test]
    fn test_stop_takes_precedence_over_pending_requests() {
        let queue = WorkQueue::new();
        queue.push(ChunkCoord::new(1, 1));
        queue.stop();
        assert_eq!(queue.next(), None);

        queue.push(ChunkCoord::new(2, 2));
        assert_eq!(queue.len(), 1, "push after stop is ignored");
    }
}
