//! Lexicographic enumeration of fixed-length candidates.
//!
//! [`Candidates`] is an odometer over symbol indices. The current candidate
//! lives in one reused `String`, so stepping through billions of candidates
//! with [`Candidates::advance`] never allocates after construction.

/// Every `remaining`-symbol suffix of `prefix` over `symbols`, in the order
/// the symbols are declared.
///
/// Yields nothing when `symbols` is empty or `remaining` is zero.
pub fn generate<'a>(symbols: &'a [char], prefix: &str, remaining: usize) -> Candidates<'a> {
    Candidates::new(symbols, prefix, remaining)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Cursor {
    Fresh,
    Running,
    Done,
}

#[derive(Debug, Clone)]
pub struct Candidates<'a> {
    symbols: &'a [char],
    prefix_len: usize,
    digits: Vec<usize>,
    current: String,
    cursor: Cursor,
}

impl<'a> Candidates<'a> {
    pub fn new(symbols: &'a [char], prefix: &str, remaining: usize) -> Self {
        let mut candidates = Self::including_prefix(symbols, prefix, remaining);
        if remaining == 0 {
            candidates.cursor = Cursor::Done;
        }
        candidates
    }

    /// Like [`Candidates::new`], except that a `remaining` of zero yields
    /// `prefix` itself once. Partitions whose prefix already spans the whole
    /// password need this.
    pub(crate) fn including_prefix(symbols: &'a [char], prefix: &str, remaining: usize) -> Self {
        let mut current = String::with_capacity(prefix.len() + remaining * 4);
        current.push_str(prefix);
        let cursor = if symbols.is_empty() {
            Cursor::Done
        } else {
            Cursor::Fresh
        };
        Self {
            symbols,
            prefix_len: prefix.len(),
            digits: vec![0; remaining],
            current,
            cursor,
        }
    }

    /// Steps to the next candidate and borrows it.
    pub fn advance(&mut self) -> Option<&str> {
        match self.cursor {
            Cursor::Done => return None,
            Cursor::Fresh => self.cursor = Cursor::Running,
            Cursor::Running => {
                if !self.increment() {
                    self.cursor = Cursor::Done;
                    return None;
                }
            }
        }
        self.render();
        Some(&self.current)
    }

    /// Rightmost position turns fastest. Returns false once every position
    /// has wrapped around.
    fn increment(&mut self) -> bool {
        let base = self.symbols.len();
        for digit in self.digits.iter_mut().rev() {
            *digit += 1;
            if *digit < base {
                return true;
            }
            *digit = 0;
        }
        false
    }

    fn render(&mut self) {
        self.current.truncate(self.prefix_len);
        for &d in &self.digits {
            self.current.push(self.symbols[d]);
        }
    }
}

impl Iterator for Candidates<'_> {
    type Item = String;

    fn next(&mut self) -> Option<String> {
        self.advance().map(str::to_owned)
    }
}
