use std::thread;
use std::time::Duration;

use crate::alphabet::Alphabet;
use crate::error::ConfigError;
use crate::keyspace::Keyspace;

pub const DEFAULT_LENGTH: usize = 6;
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(50);
pub const DEFAULT_PROGRESS_INTERVAL: Duration = Duration::from_secs(10);

/// Validated parameters of one search run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchConfig {
    pub keyspace: Keyspace,
    pub workers: usize,
    /// How long the coordinator sleeps between checks.
    pub poll_interval: Duration,
    /// `None` disables progress logging.
    pub progress_interval: Option<Duration>,
    /// Stop the search after this long.
    pub timeout: Option<Duration>,
}

impl SearchConfig {
    pub fn new(symbols: &str, length: usize, workers: usize) -> Result<Self, ConfigError> {
        if workers == 0 {
            return Err(ConfigError::ZeroWorkers);
        }
        let keyspace = Keyspace::new(Alphabet::new(symbols)?, length)?;
        Ok(Self {
            keyspace,
            workers,
            poll_interval: DEFAULT_POLL_INTERVAL,
            progress_interval: Some(DEFAULT_PROGRESS_INTERVAL),
            timeout: None,
        })
    }

    pub fn with_poll_interval(mut self, interval: Duration) -> Result<Self, ConfigError> {
        if interval.is_zero() {
            return Err(ConfigError::ZeroPollInterval);
        }
        self.poll_interval = interval;
        Ok(self)
    }

    pub fn with_progress_interval(mut self, interval: Option<Duration>) -> Self {
        self.progress_interval = interval.filter(|i| !i.is_zero());
        self
    }

    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }
}

/// `0` means one worker per available CPU core.
pub fn resolve_workers(requested: usize) -> usize {
    if requested != 0 {
        return requested;
    }
    thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
}
