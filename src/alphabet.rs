use std::fmt;

use crate::error::ConfigError;

/// Digits followed by lowercase ASCII letters.
pub const DEFAULT_ALPHABET: &str = "0123456789abcdefghijklmnopqrstuvwxyz";

/// An ordered set of distinct symbols. The declaration order is the
/// enumeration order of every candidate built from it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alphabet {
    symbols: Vec<char>,
}

impl Alphabet {
    pub fn new(symbols: &str) -> Result<Self, ConfigError> {
        let symbols: Vec<char> = symbols.chars().collect();
        if symbols.is_empty() {
            return Err(ConfigError::EmptyAlphabet);
        }
        for (i, c) in symbols.iter().enumerate() {
            if symbols[..i].contains(c) {
                return Err(ConfigError::DuplicateSymbol(*c));
            }
        }
        Ok(Self { symbols })
    }

    pub fn symbols(&self) -> &[char] {
        &self.symbols
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    /// Number of strings of `length` symbols, `None` on overflow.
    pub fn combinations(&self, length: usize) -> Option<u64> {
        let length = u32::try_from(length).ok()?;
        (self.symbols.len() as u64).checked_pow(length)
    }
}

impl Default for Alphabet {
    fn default() -> Self {
        Self {
            symbols: DEFAULT_ALPHABET.chars().collect(),
        }
    }
}

impl fmt::Display for Alphabet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.symbols.iter().try_for_each(|c| write!(f, "{c}"))
    }
}
