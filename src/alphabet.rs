// src/alphabet.rs
//! Caller-declared alphabet: a bijection between characters and small integers.

use std::collections::HashMap;

use crate::error::{Error, Result};

/// One position of a trie path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Symbol {
    /// Alphabet index of a character.
    Letter(u32),
    /// The path up to this point is itself a complete string.
    EndOfString,
}

impl Symbol {
    pub fn letter(self) -> Option<u32> {
        match self {
            Symbol::Letter(code) => Some(code),
            Symbol::EndOfString => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alphabet {
    symbols: Vec<char>,
    index:   HashMap<char, u32>,
}

impl Alphabet {
    /// Characters are numbered in the order given.
    pub fn new<I: IntoIterator<Item = char>>(chars: I) -> Result<Self> {
        let mut symbols = Vec::new();
        let mut index = HashMap::new();
        for c in chars {
            let code = u32::try_from(symbols.len()).map_err(|_| Error::Format {
                field: "alphabet size",
                value: symbols.len() as u64,
                width: u32::BITS,
            })?;
            if index.insert(c, code).is_some() {
                return Err(Error::DuplicateSymbol { symbol: c });
            }
            symbols.push(c);
        }
        Ok(Alphabet { symbols, index })
    }

    /// `a..=z` mapped to `0..=25`.
    pub fn lowercase() -> Self {
        let symbols: Vec<char> = ('a'..='z').collect();
        let index = symbols.iter().zip(0u32..).map(|(&c, i)| (c, i)).collect();
        Alphabet { symbols, index }
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    pub fn code(&self, c: char) -> Result<u32> {
        self.index.get(&c).copied().ok_or(Error::Alphabet { symbol: c })
    }

    pub fn symbol(&self, code: u32) -> Option<char> {
        self.symbols.get(code as usize).copied()
    }

    pub fn encode_str(&self, s: &str) -> Result<Vec<u32>> {
        s.chars().map(|c| self.code(c)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lowercase_maps_in_order() {
        let a = Alphabet::lowercase();
        assert_eq!(a.len(), 26);
        assert_eq!(a.code('a').unwrap(), 0);
        assert_eq!(a.code('z').unwrap(), 25);
        assert_eq!(a.symbol(2), Some('c'));
        assert_eq!(a.symbol(26), None);
        assert_eq!(a, Alphabet::new('a'..='z').unwrap());
    }

    #[test]
    fn unknown_character_is_an_alphabet_error() {
        let a = Alphabet::new("acdgort".chars()).unwrap();
        assert_eq!(a.encode_str("dog").unwrap(), vec![2, 4, 3]);
        assert!(matches!(a.encode_str("dig"), Err(Error::Alphabet { symbol: 'i' })));
    }

    #[test]
    fn duplicate_character_is_rejected() {
        assert!(matches!(
            Alphabet::new("abca".chars()),
            Err(Error::DuplicateSymbol { symbol: 'a' })
        ));
    }

    #[test]
    fn end_of_string_sorts_after_letters() {
        let mut syms = vec![Symbol::EndOfString, Symbol::Letter(3), Symbol::Letter(1)];
        syms.sort();
        assert_eq!(syms, vec![Symbol::Letter(1), Symbol::Letter(3), Symbol::EndOfString]);
        assert_eq!(Symbol::EndOfString.letter(), None);
    }
}
