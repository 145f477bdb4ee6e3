//! The verified symbol universe.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Ordered, deduplicated set of uppercase ticker symbols.
///
/// Immutable once produced for a run; stages receive it by reference
/// or rebuild it from the `train.csv` artifact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SymbolSet {
    symbols: Vec<String>,
}

impl SymbolSet {
    /// Build a symbol set from raw tokens.
    ///
    /// Tokens are trimmed and uppercased; tokens failing the format check
    /// are dropped and counted. Duplicates keep their first position.
    /// Returns the set and the number of dropped tokens.
    pub fn from_raw<I, S>(raw: I) -> (Self, usize)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut seen = HashSet::new();
        let mut symbols = Vec::new();
        let mut dropped = 0;

        for token in raw {
            let normalized = token.as_ref().trim().to_ascii_uppercase();
            if !Self::is_valid(&normalized) {
                dropped += 1;
                continue;
            }
            if seen.insert(normalized.clone()) {
                symbols.push(normalized);
            }
        }

        (Self { symbols }, dropped)
    }

    /// Format check: 1-5 ASCII alphabetic characters.
    pub fn is_valid(symbol: &str) -> bool {
        !symbol.is_empty()
            && symbol.len() <= 5
            && symbol.chars().all(|c| c.is_ascii_alphabetic())
    }

    /// Get the symbols in order.
    pub fn symbols(&self) -> &[String] {
        &self.symbols
    }

    /// Get the number of symbols.
    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    /// Check whether the universe is empty.
    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    /// Iterate over the symbols.
    pub fn iter(&self) -> impl Iterator<Item = &String> {
        self.symbols.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalization_and_dedup() {
        let (set, dropped) = SymbolSet::from_raw(["aapl", " MSFT ", "AAPL", "msft"]);
        assert_eq!(set.symbols(), &["AAPL".to_string(), "MSFT".to_string()]);
        assert_eq!(dropped, 0);
    }

    #[test]
    fn test_invalid_symbols_dropped_with_count() {
        let (set, dropped) = SymbolSet::from_raw(["AAPL", "MSFT", "ZZZZ99", "", "TOOLONG"]);
        assert_eq!(set.symbols(), &["AAPL".to_string(), "MSFT".to_string()]);
        assert_eq!(dropped, 3);
    }

    #[test]
    fn test_never_contains_empty_or_duplicate() {
        let (set, _) = SymbolSet::from_raw(["", " ", "IBM", "ibm", "IBM"]);
        assert_eq!(set.len(), 1);
        assert!(set.iter().all(|s| !s.is_empty()));
    }
}
