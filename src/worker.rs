use log::{debug, info};

use crate::error::ArchiveError;
use crate::keyspace::{Keyspace, Partition};
use crate::oracle::{PasswordOracle, Verdict};
use crate::state::{Recovered, SearchState};

/// Attempts are published to the shared counter in batches of this size.
const FLUSH_EVERY: u64 = 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkerState {
    Idle,
    Running,
    Succeeded,
    Exhausted,
    Cancelled,
}

/// How a worker ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorkerReport {
    pub index: usize,
    pub state: WorkerState,
    pub attempts: u64,
}

/// Scans one partition in enumeration order until the password turns up,
/// the partition runs dry, or the shared state says stop.
pub struct Worker<'a> {
    keyspace: &'a Keyspace,
    partition: &'a Partition,
    shared: &'a SearchState,
    state: WorkerState,
    attempts: u64,
    unflushed: u64,
}

impl<'a> Worker<'a> {
    pub fn new(keyspace: &'a Keyspace, partition: &'a Partition, shared: &'a SearchState) -> Self {
        Self {
            keyspace,
            partition,
            shared,
            state: WorkerState::Idle,
            attempts: 0,
            unflushed: 0,
        }
    }

    pub fn state(&self) -> WorkerState {
        self.state
    }

    pub fn run<O: PasswordOracle>(mut self, oracle: &mut O) -> Result<WorkerReport, ArchiveError> {
        self.transition(WorkerState::Running);
        let outcome = self.scan(oracle);
        self.shared.add_attempts(self.unflushed);
        let state = outcome?;
        self.transition(state);
        Ok(WorkerReport {
            index: self.partition.index(),
            state,
            attempts: self.attempts,
        })
    }

    fn scan<O: PasswordOracle>(&mut self, oracle: &mut O) -> Result<WorkerState, ArchiveError> {
        let (keyspace, partition) = (self.keyspace, self.partition);

        for mut candidates in partition.candidate_runs(keyspace) {
            while let Some(candidate) = candidates.advance() {
                if self.shared.should_stop() {
                    return Ok(WorkerState::Cancelled);
                }

                self.attempts += 1;
                self.unflushed += 1;
                if self.unflushed == FLUSH_EVERY {
                    self.shared.add_attempts(self.unflushed);
                    self.unflushed = 0;
                }

                if let Verdict::Valid(extracted) = oracle.verify(candidate)? {
                    let recovered = Recovered {
                        password: candidate.to_owned(),
                        worker: partition.index(),
                        extracted,
                    };
                    if !self.shared.claim(recovered) {
                        debug!(
                            "worker {}: {candidate} also valid, result already claimed",
                            partition.index()
                        );
                        return Ok(WorkerState::Cancelled);
                    }
                    info!(
                        "worker {} found password {candidate} after {} attempts",
                        partition.index(),
                        self.attempts
                    );
                    return Ok(WorkerState::Succeeded);
                }
            }
        }
        Ok(WorkerState::Exhausted)
    }

    fn transition(&mut self, next: WorkerState) {
        debug!(
            "worker {}: {:?} -> {:?}",
            self.partition.index(),
            self.state,
            next
        );
        self.state = next;
    }
}
