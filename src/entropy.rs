// src/entropy.rs
//! Huffman tables for the trie payload.
//!
//! Construction follows a sorted-list greedy merge rather than a heap so that
//! ties always break the same way:
//!   - symbols are listed in first-appearance order, then stably sorted by
//!     descending count;
//!   - the two last (lightest) entries are merged, the last one becoming the
//!     `0` branch and the second-to-last the `1` branch;
//!   - the merged node is re-inserted after every entry at least as heavy.
//!
//! A table with a single symbol has no tree to walk; that symbol gets the
//! one-bit code `0`.

use std::collections::HashMap;
use std::fmt;
use std::hash::Hash;

use crate::bitreader::BitStreamReader;
use crate::bitwriter::BitStreamWriter;
use crate::error::{Error, Result};
use crate::format::{Header, CODE_LENGTH_FIELD_BITS, MAX_CODE_LEN};

// ── Code ──────────────────────────────────────────────────────────────────────

/// A short bit sequence, stored right-aligned in `bits`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Code {
    bits: u64,
    len:  u32,
}

impl Code {
    pub const fn empty() -> Self {
        Code { bits: 0, len: 0 }
    }

    pub fn from_bits(bits: u64, len: u32) -> Result<Self> {
        if len > MAX_CODE_LEN {
            return Err(Error::Format {
                field: "huffman code",
                value: len as u64,
                width: MAX_CODE_LEN,
            });
        }
        crate::format::ensure_fits("huffman code", bits, len)?;
        Ok(Code { bits, len })
    }

    pub fn bits(&self) -> u64 {
        self.bits
    }

    pub fn len(&self) -> u32 {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Returns this code extended by one bit.
    pub fn push(self, bit: bool) -> Result<Self> {
        if self.len >= MAX_CODE_LEN {
            return Err(Error::Format {
                field: "huffman code",
                value: self.len as u64 + 1,
                width: MAX_CODE_LEN,
            });
        }
        Ok(Code {
            bits: (self.bits << 1) | bit as u64,
            len:  self.len + 1,
        })
    }

    pub fn is_prefix_of(&self, other: &Code) -> bool {
        self.len <= other.len && (self.len == 0 || other.bits >> (other.len - self.len) == self.bits)
    }
}

impl fmt::Display for Code {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for i in (0..self.len).rev() {
            f.write_str(if (self.bits >> i) & 1 == 1 { "1" } else { "0" })?;
        }
        Ok(())
    }
}

// ── Frequency counting ────────────────────────────────────────────────────────

/// Counts each distinct symbol, skipping `excluded`. The result is sorted by
/// descending count; equal counts keep first-appearance order.
pub fn count_frequencies<K, I>(symbols: I, excluded: &[K]) -> Vec<(K, u64)>
where
    K: Copy + Eq + Hash,
    I: IntoIterator<Item = K>,
{
    let mut slot: HashMap<K, usize> = HashMap::new();
    let mut freq: Vec<(K, u64)> = Vec::new();
    for sym in symbols {
        if excluded.contains(&sym) {
            continue;
        }
        let i = *slot.entry(sym).or_insert_with(|| {
            freq.push((sym, 0));
            freq.len() - 1
        });
        freq[i].1 += 1;
    }
    // sort_by is stable.
    freq.sort_by(|a, b| b.1.cmp(&a.1));
    freq
}

// ── Huffman tree ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
enum TreeNode<K> {
    Leaf(K),
    Internal { left: usize, right: usize },
}

/// Arena-backed Huffman tree.
#[derive(Debug, Clone)]
pub struct HuffmanTree<K> {
    nodes: Vec<TreeNode<K>>,
    root:  usize,
}

/// Greedy merge over a list sorted by descending count (as returned by
/// [`count_frequencies`]). Returns `None` for an empty list.
pub fn build_tree<K: Copy>(freqs: &[(K, u64)]) -> Option<HuffmanTree<K>> {
    let mut nodes: Vec<TreeNode<K>> = Vec::with_capacity(2 * freqs.len());
    let mut queue: Vec<(usize, u64)> = Vec::with_capacity(freqs.len());
    for &(sym, count) in freqs {
        nodes.push(TreeNode::Leaf(sym));
        queue.push((nodes.len() - 1, count));
    }

    while queue.len() > 1 {
        let (left,  w1) = queue.pop()?;
        let (right, w2) = queue.pop()?;
        nodes.push(TreeNode::Internal { left, right });
        let weight = w1 + w2;
        let at = queue.partition_point(|&(_, w)| w >= weight);
        queue.insert(at, (nodes.len() - 1, weight));
    }

    let (root, _) = queue.pop()?;
    Some(HuffmanTree { nodes, root })
}

/// Walks the tree (left = `0`, right = `1`) and lists every symbol's code in
/// pre-order, left branch first.
pub fn generate_codes<K: Copy>(tree: &HuffmanTree<K>) -> Result<Vec<(K, Code)>> {
    if let TreeNode::Leaf(sym) = tree.nodes[tree.root] {
        return Ok(vec![(sym, Code::empty().push(false)?)]);
    }

    let mut codes = Vec::new();
    let mut stack: Vec<(usize, Code)> = vec![(tree.root, Code::empty())];
    while let Some((node, code)) = stack.pop() {
        match tree.nodes[node] {
            TreeNode::Leaf(sym) => codes.push((sym, code)),
            TreeNode::Internal { left, right } => {
                stack.push((right, code.push(true)?));
                stack.push((left,  code.push(false)?));
            }
        }
    }
    Ok(codes)
}

// ── Tables ────────────────────────────────────────────────────────────────────

/// Symbol → code mapping for one table of the stream.
#[derive(Debug, Clone)]
pub struct HuffmanTable<K> {
    index:   usize,
    entries: Vec<(K, Code)>,
    lookup:  HashMap<K, Code>,
}

impl<K: Copy + Eq + Hash> HuffmanTable<K> {
    /// Builds table number `index` from a multiset of symbols.
    pub fn from_symbols<I>(index: usize, symbols: I, excluded: &[K]) -> Result<Self>
    where
        I: IntoIterator<Item = K>,
    {
        let freqs = count_frequencies(symbols, excluded);
        let tree = build_tree(&freqs).ok_or(Error::DegenerateTable { table: index })?;
        let entries = generate_codes(&tree)?;
        let lookup = entries.iter().copied().collect();
        Ok(HuffmanTable { index, entries, lookup })
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in generation order, which is also their order on the wire.
    pub fn entries(&self) -> &[(K, Code)] {
        &self.entries
    }

    pub fn code(&self, sym: K) -> Option<Code> {
        self.lookup.get(&sym).copied()
    }

    pub fn max_code_len(&self) -> u32 {
        self.entries.iter().map(|(_, c)| c.len()).max().unwrap_or(0)
    }

    pub fn is_prefix_free(&self) -> bool {
        self.entries.iter().enumerate().all(|(i, (_, a))| {
            self.entries
                .iter()
                .enumerate()
                .all(|(j, (_, b))| i == j || !a.is_prefix_of(b))
        })
    }
}

impl HuffmanTable<u32> {
    pub fn to_decode_table(&self) -> DecodeTable {
        DecodeTable {
            index:   self.index,
            codes:   self.entries.iter().map(|&(sym, code)| (code, sym)).collect(),
            max_len: self.max_code_len(),
        }
    }

    /// Emits `count`, then `[symbol][code length][code]` per entry.
    pub fn write(&self, w: &mut BitStreamWriter, header: &Header) -> Result<()> {
        w.write_field("table entry count", self.len() as u64, header.table_size_bits)?;
        for &(sym, code) in &self.entries {
            w.write_field("table symbol", sym as u64, header.symbol_width_bits)?;
            w.write_field("code length", code.len() as u64, CODE_LENGTH_FIELD_BITS)?;
            w.append(code)?;
        }
        Ok(())
    }
}

/// Code → symbol mapping used by [`BitStreamReader::read_prefix_code`].
#[derive(Debug, Clone)]
pub struct DecodeTable {
    index:   usize,
    codes:   HashMap<Code, u32>,
    max_len: u32,
}

impl DecodeTable {
    /// Parses table number `index` from the table section.
    pub fn read(r: &mut BitStreamReader<'_>, index: usize, header: &Header) -> Result<Self> {
        let count = r.read_int(header.table_size_bits)?;
        if count == 0 {
            return Err(Error::DegenerateTable { table: index });
        }

        let mut codes = HashMap::new();
        let mut max_len = 0;
        for _ in 0..count {
            let sym = r.read_int(header.symbol_width_bits)? as u32;
            let len = r.read_int(CODE_LENGTH_FIELD_BITS)? as u32;
            if len == 0 || len > MAX_CODE_LEN {
                return Err(Error::Malformed(format!(
                    "table {index}: code length {len} outside 1..={MAX_CODE_LEN}"
                )));
            }
            let code = r.read(len)?;
            if codes.insert(code, sym).is_some() {
                return Err(Error::Malformed(format!("table {index}: duplicate code {code}")));
            }
            max_len = max_len.max(len);
        }
        Ok(DecodeTable { index, codes, max_len })
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn len(&self) -> usize {
        self.codes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }

    pub fn max_len(&self) -> u32 {
        self.max_len
    }

    pub fn get(&self, code: Code) -> Option<u32> {
        self.codes.get(&code).copied()
    }

    pub fn contains_value(&self, value: u32) -> bool {
        self.codes.values().any(|&v| v == value)
    }

    /// No code read from the stream is a prefix of another.
    pub fn is_prefix_free(&self) -> bool {
        self.codes
            .keys()
            .all(|a| self.codes.keys().all(|b| a == b || !a.is_prefix_of(b)))
    }
}
