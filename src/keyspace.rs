//! Splitting the keyspace into disjoint, contiguous partitions.
//!
//! A partition is a range of prefix ordinals at a fixed depth. Because each
//! prefix is followed by every possible suffix, a partition is also a
//! contiguous range of the whole keyspace in enumeration order.

use std::ops::Range;

use log::{debug, warn};

use crate::alphabet::Alphabet;
use crate::candidates::Candidates;
use crate::error::ConfigError;

/// All strings of `length` symbols over an alphabet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Keyspace {
    alphabet: Alphabet,
    length: usize,
    size: u64,
}

impl Keyspace {
    pub fn new(alphabet: Alphabet, length: usize) -> Result<Self, ConfigError> {
        if length == 0 {
            return Err(ConfigError::ZeroLength);
        }
        let size = alphabet
            .combinations(length)
            .ok_or(ConfigError::KeyspaceTooLarge {
                symbols: alphabet.len(),
                length,
            })?;
        Ok(Self {
            alphabet,
            length,
            size,
        })
    }

    pub fn alphabet(&self) -> &Alphabet {
        &self.alphabet
    }

    pub fn length(&self) -> usize {
        self.length
    }

    /// Total number of candidates.
    pub fn size(&self) -> u64 {
        self.size
    }

    /// Splits the keyspace into at most `worker_count` partitions.
    ///
    /// Each partition gets `prefixes / workers` prefixes and the last one also
    /// takes the remainder. Prefixes start as single symbols and grow one
    /// symbol at a time, never past the password length, while there are
    /// fewer prefixes than workers or the remainder is worth more than one
    /// single-symbol prefix group. If there are fewer prefixes than workers
    /// the partition count drops to the prefix count.
    pub fn partition(&self, worker_count: usize) -> Result<Vec<Partition>, ConfigError> {
        if worker_count == 0 {
            return Err(ConfigError::ZeroWorkers);
        }

        let base = self.alphabet.len() as u64;
        let workers = worker_count as u64;
        let mut depth = 1;
        let mut prefixes = base;
        // prefixes of one leading symbol, in units of the current depth
        let mut group = 1;
        while depth < self.length && (prefixes < workers || prefixes % workers > group) {
            depth += 1;
            prefixes *= base;
            group *= base;
        }

        let count = worker_count.min(prefixes as usize);
        if count < worker_count {
            warn!(
                "Only {prefixes} prefixes in the keyspace, using {count} workers instead of {worker_count}"
            );
        }

        let chunk = prefixes / count as u64;
        let suffixes = self.size / prefixes;
        let partitions = (0..count)
            .map(|index| {
                let start = index as u64 * chunk;
                let end = if index + 1 == count {
                    prefixes
                } else {
                    start + chunk
                };
                let partition = Partition {
                    index,
                    depth,
                    prefixes: start..end,
                    candidates: (end - start) * suffixes,
                };
                debug!(
                    "partition {index}: prefixes {:?}..{:?} ({} candidates)",
                    partition.prefix(&self.alphabet, start),
                    partition.prefix(&self.alphabet, end - 1),
                    partition.candidates
                );
                partition
            })
            .collect();
        Ok(partitions)
    }
}

/// A contiguous run of prefixes, owned by exactly one worker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Partition {
    index: usize,
    depth: usize,
    prefixes: Range<u64>,
    candidates: u64,
}

impl Partition {
    pub fn index(&self) -> usize {
        self.index
    }

    /// Number of symbols in each prefix.
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Prefix ordinals, in base `|alphabet|` with the first symbol most significant.
    pub fn prefix_range(&self) -> Range<u64> {
        self.prefixes.clone()
    }

    /// Number of candidates covered.
    pub fn candidates(&self) -> u64 {
        self.candidates
    }

    /// The prefix strings, in enumeration order.
    pub fn prefixes<'a>(&'a self, alphabet: &'a Alphabet) -> impl Iterator<Item = String> + 'a {
        self.prefixes
            .clone()
            .map(move |ordinal| self.prefix(alphabet, ordinal))
    }

    /// One candidate run per prefix, each covering every suffix that
    /// completes it to the keyspace's password length. `self` must come from
    /// `keyspace.partition`.
    pub(crate) fn candidate_runs<'a>(
        &'a self,
        keyspace: &'a Keyspace,
    ) -> impl Iterator<Item = Candidates<'a>> + 'a {
        let symbols = keyspace.alphabet().symbols();
        let remaining = keyspace.length().saturating_sub(self.depth);
        self.prefixes(keyspace.alphabet())
            .map(move |prefix| Candidates::including_prefix(symbols, &prefix, remaining))
    }

    fn prefix(&self, alphabet: &Alphabet, mut ordinal: u64) -> String {
        let symbols = alphabet.symbols();
        let base = symbols.len() as u64;
        let mut prefix = vec![symbols[0]; self.depth];
        for slot in prefix.iter_mut().rev() {
            *slot = symbols[(ordinal % base) as usize];
            ordinal /= base;
        }
        prefix.into_iter().collect()
    }
}
