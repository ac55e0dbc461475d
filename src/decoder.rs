// src/decoder.rs
//! Rebuilds the word list from a trie stream.
//!
//! Leaf policy per mode:
//!   Fixed     a node is a leaf exactly when it sits at the last depth table;
//!             inner nodes always carry a non-zero fan-out.
//!   Variable  a node is a leaf when its fan-out is zero; an inner node ends a
//!             word when its end flag is set.
//!
//! The mode is not stored in the header. A variable-length stream always has
//! a fan-out table entry for zero (every trie has a leaf) and a fixed-length
//! stream never does.

use std::collections::HashSet;
use std::ops::ControlFlow;

use tracing::debug;

use crate::alphabet::Alphabet;
use crate::bitreader::BitStreamReader;
use crate::entropy::DecodeTable;
use crate::error::{Error, Result};
use crate::format::{Header, Mode};

/// A parsed stream: header and tables are read once, the payload is walked
/// on demand.
#[derive(Debug, Clone)]
pub struct Dictionary<'a> {
    bytes:         &'a [u8],
    alphabet:      &'a Alphabet,
    header:        Header,
    depth_tables:  Vec<DecodeTable>,
    fanout_table:  DecodeTable,
    mode:          Mode,
    payload_start: usize,
    /// Start bit of each root branch with its first character, once
    /// [`with_offsets`](Self::with_offsets) has run.
    offsets:       Vec<(char, usize)>,
}

impl<'a> Dictionary<'a> {
    pub fn parse(bytes: &'a [u8], alphabet: &'a Alphabet) -> Result<Self> {
        let mut r = BitStreamReader::new(bytes);
        let header = Header::read(&mut r)?;

        let mut depth_tables = Vec::with_capacity(header.depth_tables());
        for index in 0..header.depth_tables() {
            depth_tables.push(DecodeTable::read(&mut r, index, &header)?);
        }
        let fanout_table = DecodeTable::read(&mut r, header.depth_tables(), &header)?;

        let mode = if fanout_table.contains_value(0) {
            Mode::Variable
        } else {
            Mode::Fixed
        };

        Ok(Dictionary {
            bytes,
            alphabet,
            header,
            depth_tables,
            fanout_table,
            mode,
            payload_start: r.position(),
            offsets:       Vec::new(),
        })
    }

    /// Walks the payload once and records where every root branch starts,
    /// so [`contains`](Self::contains) can seek straight to one branch.
    pub fn with_offsets(mut self) -> Result<Self> {
        let mut offsets = Vec::with_capacity(self.root_symbols());
        self.walk_from(
            self.payload_start,
            self.root_symbols(),
            |first, start| offsets.push((first, start)),
            |_| ControlFlow::Continue(()),
        )?;
        self.offsets = offsets;
        Ok(self)
    }

    /// Recorded root-branch offsets; empty unless built [`with_offsets`](Self::with_offsets).
    pub fn offsets(&self) -> &[(char, usize)] {
        &self.offsets
    }

    pub fn header(&self) -> &Header {
        &self.header
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// Number of distinct first characters.
    pub fn root_symbols(&self) -> usize {
        self.header.num_root_symbols as usize
    }

    /// Every stored word, in traversal order.
    pub fn words(&self) -> Result<Vec<String>> {
        let mut words = Vec::new();
        let end = self.walk(|word| {
            words.push(word.to_owned());
            ControlFlow::Continue(())
        })?;

        // Anything past the payload beyond the final pad is not ours.
        let trailing = self.bytes.len() * 8 - end;
        if trailing >= 8 {
            return Err(Error::Malformed(format!(
                "{trailing} bits left after the payload"
            )));
        }

        debug!(
            words = words.len(),
            mode = ?self.mode,
            payload_bits = end - self.payload_start,
            "decoded word list"
        );
        Ok(words)
    }

    /// Whether `word` is stored. With recorded offsets only the branch for
    /// the word's first character is read; otherwise the walk stops once
    /// that branch has been passed.
    pub fn contains(&self, word: &str) -> Result<bool> {
        let first = match word.chars().next() {
            Some(c) => c,
            None => return Ok(false),
        };

        if !self.offsets.is_empty() {
            let start = match self.offsets.iter().find(|&&(c, _)| c == first) {
                Some(&(_, start)) => start,
                None => return Ok(false),
            };
            let mut found = false;
            self.walk_from(start, 1, |_, _| {}, |candidate| {
                if candidate == word {
                    found = true;
                    return ControlFlow::Break(());
                }
                ControlFlow::Continue(())
            })?;
            return Ok(found);
        }

        let mut found = false;
        let mut in_branch = false;
        self.walk(|candidate| {
            if candidate == word {
                found = true;
                return ControlFlow::Break(());
            }
            let same_branch = candidate.starts_with(first);
            if in_branch && !same_branch {
                return ControlFlow::Break(());
            }
            in_branch = same_branch;
            ControlFlow::Continue(())
        })?;
        Ok(found)
    }

    /// The word at 1-based traversal `ordinal`, the inverse of
    /// [`index_of`](Self::index_of). `None` for 0 or past the last word.
    pub fn word(&self, ordinal: usize) -> Result<Option<String>> {
        if ordinal == 0 {
            return Ok(None);
        }
        let mut seen = 0;
        let mut hit = None;
        self.walk(|word| {
            seen += 1;
            if seen == ordinal {
                hit = Some(word.to_owned());
                return ControlFlow::Break(());
            }
            ControlFlow::Continue(())
        })?;
        Ok(hit)
    }

    /// 1-based traversal ordinals of the `targets` that are stored, in
    /// traversal order. Targets that are absent are left out.
    pub fn index_of<S: AsRef<str>>(&self, targets: &[S]) -> Result<Vec<(String, usize)>> {
        let wanted: HashSet<&str> = targets.iter().map(|t| t.as_ref()).collect();
        let mut hits = Vec::new();
        let mut ordinal = 0;
        self.walk(|word| {
            ordinal += 1;
            if wanted.contains(word) {
                hits.push((word.to_owned(), ordinal));
                if hits.len() == wanted.len() {
                    return ControlFlow::Break(());
                }
            }
            ControlFlow::Continue(())
        })?;
        Ok(hits)
    }

    /// Replays the payload, handing every completed word to `visit`.
    /// Returns the bit position where the walk stopped.
    fn walk<F>(&self, visit: F) -> Result<usize>
    where
        F: FnMut(&str) -> ControlFlow<()>,
    {
        self.walk_from(self.payload_start, self.root_symbols(), |_, _| {}, visit)
    }

    /// Walks `roots` consecutive root branches starting at bit `start`.
    /// `on_branch` gets each branch's first character and start bit.
    fn walk_from<B, F>(&self, start: usize, roots: usize, mut on_branch: B, mut visit: F) -> Result<usize>
    where
        B: FnMut(char, usize),
        F: FnMut(&str) -> ControlFlow<()>,
    {
        let mut r = BitStreamReader::at(self.bytes, start)?;
        let last_depth = self.depth_tables.len() - 1;
        let mut prefix = String::new();
        // Children still to read at each open level; the bottom entry is the root.
        let mut pending: Vec<usize> = vec![roots];

        while let Some(remaining) = pending.last_mut() {
            if *remaining == 0 {
                pending.pop();
                if !pending.is_empty() {
                    prefix.pop();
                }
                continue;
            }
            *remaining -= 1;

            let depth = pending.len() - 1;
            let node_start = r.position();
            let table = self.depth_tables.get(depth).ok_or_else(|| {
                Error::Malformed(format!("node at depth {depth} has no symbol table"))
            })?;

            let fanout = match self.mode {
                Mode::Fixed if depth == last_depth => 0,
                _ => r.read_prefix_code(&self.fanout_table)? as usize,
            };
            if self.mode == Mode::Fixed && depth < last_depth && fanout == 0 {
                return Err(Error::Malformed(format!(
                    "fixed-length node at depth {depth} has no children"
                )));
            }

            let code = r.read_prefix_code(table)?;
            let symbol = self.alphabet.symbol(code).ok_or_else(|| {
                Error::Malformed(format!(
                    "symbol index {code} outside alphabet of {}",
                    self.alphabet.len()
                ))
            })?;
            prefix.push(symbol);
            if depth == 0 {
                on_branch(symbol, node_start);
            }

            if fanout == 0 {
                let flow = visit(&prefix);
                prefix.pop();
                if flow.is_break() {
                    return Ok(r.position());
                }
                continue;
            }

            if self.mode == Mode::Variable && r.read_bit()? && visit(&prefix).is_break() {
                return Ok(r.position());
            }
            pending.push(fanout);
        }
        Ok(r.position())
    }
}

/// Decodes a stream produced by [`crate::encode`].
pub fn decode(bytes: &[u8], alphabet: &Alphabet) -> Result<Vec<String>> {
    Dictionary::parse(bytes, alphabet)?.words()
}

/// The word at 1-based traversal `ordinal`, if there is one.
pub fn word_at(bytes: &[u8], alphabet: &Alphabet, ordinal: usize) -> Result<Option<String>> {
    Dictionary::parse(bytes, alphabet)?.word(ordinal)
}

/// Traversal ordinals (1-based) of the `targets` present in the stream.
pub fn index_of<S: AsRef<str>>(
    bytes:    &[u8],
    alphabet: &Alphabet,
    targets:  &[S],
) -> Result<Vec<(String, usize)>> {
    Dictionary::parse(bytes, alphabet)?.index_of(targets)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encoder::encode;
    use crate::format::{Options, SiblingOrder};

    fn fixed(words: &[&str], alphabet: &Alphabet) -> Vec<u8> {
        encode(words, alphabet, &Options::default()).unwrap()
    }

    fn variable(words: &[&str], alphabet: &Alphabet) -> Vec<u8> {
        encode(words, alphabet, &Options::default().with_mode(Mode::Variable)).unwrap()
    }

    #[test]
    fn fixed_roundtrip_keeps_insertion_order() {
        let alphabet = Alphabet::lowercase();
        let bytes = fixed(&["cat", "car", "dog", "cot"], &alphabet);
        let dict = Dictionary::parse(&bytes, &alphabet).unwrap();
        assert_eq!(dict.mode(), Mode::Fixed);
        assert_eq!(dict.root_symbols(), 2);
        assert_eq!(dict.words().unwrap(), vec!["cat", "car", "cot", "dog"]);
    }

    #[test]
    fn alphabetical_siblings_sort_output() {
        let alphabet = Alphabet::lowercase();
        let opts = Options::default().with_sibling_order(SiblingOrder::Alphabetical);
        let bytes = encode(&["dog", "cat", "car"], &alphabet, &opts).unwrap();
        assert_eq!(decode(&bytes, &alphabet).unwrap(), vec!["car", "cat", "dog"]);
    }

    #[test]
    fn variable_roundtrip_uses_end_flags() {
        let alphabet = Alphabet::lowercase();
        let bytes = variable(&["a", "an", "and", "ant", "b"], &alphabet);
        let dict = Dictionary::parse(&bytes, &alphabet).unwrap();
        assert_eq!(dict.mode(), Mode::Variable);
        assert_eq!(dict.words().unwrap(), vec!["a", "an", "and", "ant", "b"]);
    }

    #[test]
    fn single_word_vocabulary() {
        let alphabet = Alphabet::lowercase();
        assert_eq!(decode(&fixed(&["x"], &alphabet), &alphabet).unwrap(), vec!["x"]);
        assert_eq!(decode(&variable(&["zz"], &alphabet), &alphabet).unwrap(), vec!["zz"]);
    }

    #[test]
    fn contains_walks_only_the_relevant_branch() {
        let alphabet = Alphabet::lowercase();
        let bytes = fixed(&["aahed", "rosti", "zymic"], &alphabet);
        let dict = Dictionary::parse(&bytes, &alphabet).unwrap();
        assert!(dict.contains("rosti").unwrap());
        assert!(dict.contains("zymic").unwrap());
        assert!(!dict.contains("aaaaa").unwrap());
        assert!(!dict.contains("zzzzz").unwrap());
        assert!(!dict.contains("").unwrap());
    }

    #[test]
    fn index_of_counts_from_one() {
        let alphabet = Alphabet::lowercase();
        let bytes = fixed(&["cat", "car", "dog"], &alphabet);
        let hits = index_of(&bytes, &alphabet, &["dog", "car", "emu"]).unwrap();
        assert_eq!(hits, vec![("car".to_owned(), 2), ("dog".to_owned(), 3)]);
    }

    #[test]
    fn word_resolves_ordinals() {
        let alphabet = Alphabet::lowercase();
        let bytes = variable(&["cat", "car", "ca", "dog"], &alphabet);
        let dict = Dictionary::parse(&bytes, &alphabet).unwrap();
        assert_eq!(dict.words().unwrap(), vec!["ca", "cat", "car", "dog"]);

        assert_eq!(dict.word(1).unwrap().as_deref(), Some("ca"));
        assert_eq!(dict.word(3).unwrap().as_deref(), Some("car"));
        assert_eq!(word_at(&bytes, &alphabet, 4).unwrap().as_deref(), Some("dog"));
        assert_eq!(dict.word(0).unwrap(), None);
        assert_eq!(dict.word(5).unwrap(), None);
    }

    #[test]
    fn offsets_point_at_root_branches() {
        let alphabet = Alphabet::lowercase();
        let bytes = fixed(&["aahed", "rosti", "roses", "zymic"], &alphabet);
        let dict = Dictionary::parse(&bytes, &alphabet).unwrap();
        assert!(dict.offsets().is_empty());

        let dict = dict.with_offsets().unwrap();
        let firsts: Vec<char> = dict.offsets().iter().map(|&(c, _)| c).collect();
        assert_eq!(firsts, vec!['a', 'r', 'z']);
        assert_eq!(dict.offsets()[0].1, dict.payload_start);
        assert!(dict.offsets().windows(2).all(|w| w[0].1 < w[1].1));

        for word in ["aahed", "rosti", "roses", "zymic"] {
            assert!(dict.contains(word).unwrap(), "{word}");
        }
        for word in ["aahex", "rosty", "zzzzz", "bbbbb", ""] {
            assert!(!dict.contains(word).unwrap(), "{word}");
        }
    }

    #[test]
    fn offsets_work_in_variable_mode() {
        let alphabet = Alphabet::lowercase();
        let words = ["a", "an", "ant", "b", "be", "bee"];
        let bytes = variable(&words, &alphabet);
        let dict = Dictionary::parse(&bytes, &alphabet).unwrap().with_offsets().unwrap();
        for word in words {
            assert!(dict.contains(word).unwrap(), "{word}");
        }
        assert!(!dict.contains("bet").unwrap());
        assert!(!dict.contains("c").unwrap());
    }

    #[test]
    fn truncated_payload_fails() {
        let alphabet = Alphabet::lowercase();
        let bytes = fixed(&["cat", "car", "dog", "emu", "fox"], &alphabet);
        let cut = &bytes[..bytes.len() - 1];
        assert!(matches!(decode(cut, &alphabet), Err(Error::TruncatedStream { .. })
            | Err(Error::InvalidPrefixCode { .. })));
        assert!(matches!(decode(&bytes[..3], &alphabet), Err(Error::TruncatedStream { .. })));
    }

    #[test]
    fn trailing_bytes_are_rejected() {
        let alphabet = Alphabet::lowercase();
        let mut bytes = fixed(&["cat"], &alphabet);
        bytes.push(0);
        assert!(matches!(decode(&bytes, &alphabet), Err(Error::Malformed(_))));
    }

    #[test]
    fn symbol_outside_alphabet_is_malformed() {
        let wide = Alphabet::lowercase();
        let narrow = Alphabet::new("abc".chars()).unwrap();
        let bytes = fixed(&["zz"], &wide);
        assert!(matches!(decode(&bytes, &narrow), Err(Error::Malformed(_))));
    }
}
