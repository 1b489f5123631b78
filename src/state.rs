//! State shared by all workers of one search run.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use concurrent_queue::ConcurrentQueue;

use crate::oracle::ExtractedEntry;

/// A password that opened the archive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Recovered {
    pub password: String,
    pub worker: usize,
    pub extracted: Vec<ExtractedEntry>,
}

/// The found flag, the write-once result cell and the attempt counter.
///
/// The result cell is a queue of capacity one: the only `push` that succeeds
/// is the winning claim, every later one bounces off a full (or closed) queue.
pub struct SearchState {
    found: AtomicBool,
    aborted: AtomicBool,
    attempts: AtomicU64,
    result: ConcurrentQueue<Recovered>,
}

impl SearchState {
    pub fn new() -> Self {
        Self {
            found: AtomicBool::new(false),
            aborted: AtomicBool::new(false),
            attempts: AtomicU64::new(0),
            result: ConcurrentQueue::bounded(1),
        }
    }

    /// Stores `recovered` unless another worker got there first.
    /// Returns whether this call won.
    pub fn claim(&self, recovered: Recovered) -> bool {
        if self.result.push(recovered).is_err() {
            return false;
        }
        self.found.store(true, Ordering::Release);
        true
    }

    pub fn is_found(&self) -> bool {
        self.found.load(Ordering::Acquire)
    }

    /// Asks every worker to stop without a result.
    pub fn abort(&self) {
        self.aborted.store(true, Ordering::Release);
    }

    pub fn is_aborted(&self) -> bool {
        self.aborted.load(Ordering::Acquire)
    }

    /// Checked by workers before every verification.
    pub fn should_stop(&self) -> bool {
        self.is_found() || self.is_aborted()
    }

    pub fn add_attempts(&self, count: u64) {
        self.attempts.fetch_add(count, Ordering::Relaxed);
    }

    pub fn attempts(&self) -> u64 {
        self.attempts.load(Ordering::Relaxed)
    }

    /// Seals the result cell and takes what it holds. Claims made after this
    /// fail, so the cell is never written twice.
    pub fn take_result(&self) -> Option<Recovered> {
        self.result.close();
        self.result.pop().ok()
    }
}

impl Default for SearchState {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Barrier;
    use std::thread;

    use super::*;

    fn recovered(password: &str, worker: usize) -> Recovered {
        Recovered {
            password: password.to_string(),
            worker,
            extracted: Vec::new(),
        }
    }

    #[test]
    fn first_claim_wins() {
        let state = SearchState::new();
        assert!(!state.should_stop());
        assert!(state.claim(recovered("abc", 0)));
        assert!(state.is_found());
        assert!(!state.claim(recovered("xyz", 1)));
        assert_eq!(state.take_result(), Some(recovered("abc", 0)));
    }

    #[test]
    fn sealed_cell_rejects_claims() {
        let state = SearchState::new();
        assert_eq!(state.take_result(), None);
        assert!(!state.claim(recovered("late", 3)));
        assert!(!state.is_found());
        assert_eq!(state.take_result(), None);
    }

    #[test]
    fn abort_stops_without_result() {
        let state = SearchState::new();
        state.abort();
        assert!(state.should_stop());
        assert!(!state.is_found());
    }

    #[test]
    fn concurrent_claims_write_once() {
        const CLAIMERS: usize = 8;
        let state = SearchState::new();
        let barrier = Barrier::new(CLAIMERS);

        let wins: usize = thread::scope(|s| {
            let handles: Vec<_> = (0..CLAIMERS)
                .map(|i| {
                    let state = &state;
                    let barrier = &barrier;
                    s.spawn(move || {
                        barrier.wait();
                        state.claim(recovered(&format!("pw{i}"), i)) as usize
                    })
                })
                .collect();
            handles.into_iter().map(|h| h.join().unwrap()).sum()
        });

        assert_eq!(wins, 1);
        let result = state.take_result().unwrap();
        assert_eq!(result.password, format!("pw{}", result.worker));
        assert_eq!(state.take_result(), None);
    }
}
