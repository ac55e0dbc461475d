// src/encoder.rs
//! Trie + Huffman encoder.
//!
//! Stream layout:
//!   header   [table_size_bits:8][symbol_width_bits:8][num_tables:8][num_root_symbols:16]
//!   tables   one block per depth, then the fan-out block:
//!            [count:table_size_bits] then per entry
//!            [symbol:symbol_width_bits][code_len:8][code:code_len]
//!   payload  pre-order walk of the trie. Per node:
//!            fan-out code   (omitted at the last depth in fixed-length mode)
//!            symbol code    (table for the node's depth)
//!            end flag bit   (variable-length mode, only when fan-out > 0)
//!
//! The last byte is zero-padded; nothing else is aligned.

use tracing::{debug, trace};

use crate::alphabet::{Alphabet, Symbol};
use crate::bitwriter::BitStreamWriter;
use crate::entropy::{Code, HuffmanTable};
use crate::error::{Error, Result};
use crate::format::{
    bits_needed, ensure_fits, Header, Mode, Options, SiblingOrder, HEADER_BITS,
    NUM_ROOT_SYMBOLS_FIELD_BITS, NUM_TABLES_FIELD_BITS, TABLE_SIZE_FIELD_BITS,
};
use crate::trie::{Trie, ROOT};

/// Bit counts of the three stream sections.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SectionSizes {
    pub header_bits:  usize,
    pub table_bits:   usize,
    pub payload_bits: usize,
}

impl SectionSizes {
    pub fn total_bits(&self) -> usize {
        self.header_bits + self.table_bits + self.payload_bits
    }

    /// Size of the exported buffer, including the final pad.
    pub fn total_bytes(&self) -> usize {
        self.total_bits().div_ceil(8)
    }
}

/// Encoded stream plus what went into it.
#[derive(Debug, Clone)]
pub struct Encoded {
    pub bytes:    Vec<u8>,
    pub header:   Header,
    pub sections: SectionSizes,
}

/// Encodes `words` into a self-describing byte buffer.
///
/// Duplicate words collapse into one trie path. In fixed-length mode every
/// word must have the same number of characters.
pub fn encode<S: AsRef<str>>(words: &[S], alphabet: &Alphabet, options: &Options) -> Result<Vec<u8>> {
    encode_with_report(words, alphabet, options).map(|e| e.bytes)
}

pub fn encode_with_report<S: AsRef<str>>(
    words:    &[S],
    alphabet: &Alphabet,
    options:  &Options,
) -> Result<Encoded> {
    let trie = build_trie(words, alphabet, options)?;
    if trie.is_empty() {
        return Err(Error::DegenerateTable { table: 0 });
    }

    // Header counts are checked before any table is built.
    let depth_count = trie.max_depth();
    let num_tables = depth_count as u64 + 1;
    let num_root_symbols = trie.fanout(ROOT) as u64;
    ensure_fits("table count", num_tables, NUM_TABLES_FIELD_BITS)?;
    ensure_fits("root symbol count", num_root_symbols, NUM_ROOT_SYMBOLS_FIELD_BITS)?;

    // ── Tables ────────────────────────────────────────────────────────────────
    let mut tables = Vec::with_capacity(depth_count + 1);
    for (depth, level) in trie.levels().into_iter().take(depth_count).enumerate() {
        let symbols = level.into_iter().filter_map(Symbol::letter);
        tables.push(HuffmanTable::from_symbols(depth, symbols, &[])?);
    }

    // Fixed-length leaves sit at the last depth, so fan-out zero never needs a code.
    let excluded: &[u32] = match options.mode {
        Mode::Fixed    => &[0],
        Mode::Variable => &[],
    };
    let fanout = HuffmanTable::from_symbols(depth_count, trie.fanout_counts(), excluded)?;

    // ── Header ────────────────────────────────────────────────────────────────
    let largest = tables.iter().chain([&fanout]).map(|t| t.len()).max().unwrap_or(0);
    let header = Header {
        table_size_bits:   bits_needed(largest as u64),
        symbol_width_bits: bits_needed(alphabet.len() as u64),
        num_tables:        num_tables as u32,
        num_root_symbols:  num_root_symbols as u32,
    };
    ensure_fits("table size bits", header.table_size_bits as u64, TABLE_SIZE_FIELD_BITS)?;

    let mut w = BitStreamWriter::new();
    header.write(&mut w)?;
    debug_assert_eq!(w.bit_len(), HEADER_BITS as usize);

    for table in tables.iter().chain([&fanout]) {
        trace!(table = table.index(), entries = table.len(), max_code_len = table.max_code_len(), "table");
        table.write(&mut w, &header)?;
    }
    let table_end = w.bit_len();

    // ── Payload ───────────────────────────────────────────────────────────────
    let last_depth = depth_count - 1;
    for visit in trie.preorder() {
        let children = trie.fanout(visit.node) as u32;
        let implied_leaf = options.mode == Mode::Fixed && visit.depth == last_depth;
        if !implied_leaf {
            w.append(lookup(&fanout, children)?)?;
        }
        w.append(lookup(&tables[visit.depth], visit.letter)?)?;
        if options.mode == Mode::Variable && children > 0 {
            w.write_bit(trie.terminates(visit.node))?;
        }
    }

    let sections = SectionSizes {
        header_bits:  HEADER_BITS as usize,
        table_bits:   table_end - HEADER_BITS as usize,
        payload_bits: w.bit_len() - table_end,
    };
    let bytes = w.into_bytes()?;

    debug!(
        words = words.len(),
        mode = ?options.mode,
        num_tables = header.num_tables,
        num_root_symbols = header.num_root_symbols,
        table_size_bits = header.table_size_bits,
        symbol_width_bits = header.symbol_width_bits,
        header_bits = sections.header_bits,
        table_bits = sections.table_bits,
        payload_bits = sections.payload_bits,
        bytes = bytes.len(),
        "encoded word list"
    );

    Ok(Encoded { bytes, header, sections })
}

fn build_trie<S: AsRef<str>>(words: &[S], alphabet: &Alphabet, options: &Options) -> Result<Trie> {
    let mut trie = Trie::new(options.mode);
    let mut expected: Option<usize> = None;
    for word in words {
        let letters = alphabet.encode_str(word.as_ref())?;
        if letters.is_empty() {
            return Err(Error::EmptyString);
        }
        if options.mode == Mode::Fixed {
            let expected = *expected.get_or_insert(letters.len());
            if letters.len() != expected {
                return Err(Error::RaggedLength { expected, found: letters.len() });
            }
        }
        trie.insert(&letters);
    }
    if options.sibling_order == SiblingOrder::Alphabetical {
        trie.sort_children();
    }
    Ok(trie)
}

fn lookup(table: &HuffmanTable<u32>, sym: u32) -> Result<Code> {
    table.code(sym).ok_or_else(|| {
        Error::Malformed(format!("symbol {sym} missing from table {}", table.index()))
    })
}
