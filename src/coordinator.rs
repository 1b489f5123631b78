//! Runs one search: spawns a worker per partition, polls until a password
//! is claimed or every worker has stopped, then joins them all.

use std::any::Any;
use std::path::Path;
use std::thread::{self, ScopedJoinHandle};
use std::time::{Duration, Instant};

use log::{error, info, warn};

use crate::archive::Archive;
use crate::config::SearchConfig;
use crate::error::{ArchiveError, SearchError};
use crate::oracle::OracleFactory;
use crate::state::{Recovered, SearchState};
use crate::worker::{Worker, WorkerReport};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Found(Recovered),
    /// Every candidate was tried.
    NotFound,
    /// The configured timeout expired first.
    TimedOut,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchReport {
    pub outcome: Outcome,
    /// Oracle invocations across all workers.
    pub attempts: u64,
    pub elapsed: Duration,
    /// Workers that stopped normally, by partition index.
    pub workers: Vec<WorkerReport>,
}

type WorkerResult = Result<WorkerReport, ArchiveError>;

enum Exit {
    Finished(WorkerReport),
    Failed(usize, ArchiveError),
    Panicked(usize),
}

struct Supervision {
    exits: Vec<Exit>,
    timed_out: bool,
}

pub struct Coordinator {
    config: SearchConfig,
}

impl Coordinator {
    pub fn new(config: SearchConfig) -> Self {
        Self { config }
    }

    pub fn run<F: OracleFactory>(&self, factory: &F) -> Result<SearchReport, SearchError> {
        let keyspace = &self.config.keyspace;
        let partitions = keyspace.partition(self.config.workers)?;
        info!(
            "Starting to bruteforce {} candidates using {} workers",
            keyspace.size(),
            partitions.len()
        );

        let state = SearchState::new();
        let start = Instant::now();

        let (supervision, spawn_error) = thread::scope(|s| {
            let mut handles = Vec::with_capacity(partitions.len());
            let mut spawn_error = None;
            for partition in &partitions {
                let state = &state;
                let spawned = thread::Builder::new()
                    .name(format!("worker-{}", partition.index()))
                    .spawn_scoped(s, move || -> WorkerResult {
                        let mut oracle = factory.instantiate()?;
                        Worker::new(keyspace, partition, state).run(&mut oracle)
                    });
                match spawned {
                    Ok(handle) => handles.push(Some(handle)),
                    Err(e) => {
                        state.abort();
                        spawn_error = Some(e);
                        break;
                    }
                }
            }
            (self.supervise(&state, handles, start), spawn_error)
        });

        if let Some(e) = spawn_error {
            return Err(SearchError::Spawn(e));
        }

        let elapsed = start.elapsed();
        let attempts = state.attempts();
        let mut workers = Vec::new();
        let mut failed = Vec::new();
        let mut archive_error = None;
        for exit in supervision.exits {
            match exit {
                Exit::Finished(report) => workers.push(report),
                Exit::Failed(index, e) => {
                    failed.push(index);
                    archive_error.get_or_insert((index, e));
                }
                Exit::Panicked(index) => failed.push(index),
            }
        }
        workers.sort_by_key(|r| r.index);
        failed.sort_unstable();

        let outcome = match state.take_result() {
            Some(recovered) => {
                if !failed.is_empty() {
                    warn!("Password found, but partitions {failed:?} did not finish");
                }
                Outcome::Found(recovered)
            }
            None => {
                if let Some((worker, source)) = archive_error {
                    return Err(SearchError::Oracle { worker, source });
                }
                if supervision.timed_out {
                    Outcome::TimedOut
                } else if !failed.is_empty() {
                    return Err(SearchError::WorkersFailed { partitions: failed });
                } else {
                    Outcome::NotFound
                }
            }
        };

        info!("Tried {attempts} candidates in {elapsed:.2?}");
        Ok(SearchReport {
            outcome,
            attempts,
            elapsed,
            workers,
        })
    }

    fn supervise(
        &self,
        state: &SearchState,
        mut handles: Vec<Option<ScopedJoinHandle<'_, WorkerResult>>>,
        start: Instant,
    ) -> Supervision {
        let deadline = self.config.timeout.map(|t| start + t);
        let mut exits = Vec::with_capacity(handles.len());
        let mut last_progress = Instant::now();
        let mut timed_out = false;

        loop {
            for (index, slot) in handles.iter_mut().enumerate() {
                if !matches!(slot, Some(handle) if handle.is_finished()) {
                    continue;
                }
                if let Some(handle) = slot.take() {
                    let exit = reap(index, handle);
                    if matches!(exit, Exit::Failed(..)) {
                        state.abort();
                    }
                    exits.push(exit);
                }
            }

            if state.should_stop() || handles.iter().all(Option::is_none) {
                break;
            }
            if deadline.map_or(false, |d| Instant::now() >= d) {
                warn!("Timeout reached, stopping all workers");
                timed_out = true;
                state.abort();
                break;
            }
            if let Some(every) = self.config.progress_interval {
                if last_progress.elapsed() >= every {
                    self.log_progress(state, start);
                    last_progress = Instant::now();
                }
            }

            thread::sleep(self.config.poll_interval);
        }

        // Remaining workers stop after at most one more candidate.
        for (index, slot) in handles.into_iter().enumerate() {
            if let Some(handle) = slot {
                exits.push(reap(index, handle));
            }
        }
        Supervision { exits, timed_out }
    }

    fn log_progress(&self, state: &SearchState, start: Instant) {
        let attempts = state.attempts();
        let total = self.config.keyspace.size();
        let secs = start.elapsed().as_secs_f64();
        info!(
            "{attempts} / {total} candidates tried ({:.2} %, {:.0} passwords/s)",
            attempts as f64 / total as f64 * 100.0,
            attempts as f64 / secs
        );
    }
}

fn reap(index: usize, handle: ScopedJoinHandle<'_, WorkerResult>) -> Exit {
    match handle.join() {
        Ok(Ok(report)) => Exit::Finished(report),
        Ok(Err(e)) => {
            error!("worker {index} failed: {e}");
            Exit::Failed(index, e)
        }
        Err(panic) => {
            warn!("worker {index} panicked: {}", panic_message(panic.as_ref()));
            Exit::Panicked(index)
        }
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> &str {
    panic
        .downcast_ref::<&str>()
        .copied()
        .or_else(|| panic.downcast_ref::<String>().map(String::as_str))
        .unwrap_or("unknown panic")
}

/// Loads the archive at `path` and searches it.
pub fn crack_archive(path: impl AsRef<Path>, config: SearchConfig) -> Result<SearchReport, SearchError> {
    let path = path.as_ref();
    let archive = Archive::load(path)?;
    info!(
        "Loaded {} ({} bytes, {} encrypted entries)",
        path.display(),
        archive.byte_len(),
        archive.encrypted_entries()
    );
    Coordinator::new(config).run(&archive)
}
