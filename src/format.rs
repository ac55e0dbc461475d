// src/format.rs
//! Fixed field widths and codec options shared by the encoder and decoder.
//! Single source of truth for all header and table bit widths.
//!
//! Header layout (40 bits, big-endian, no alignment):
//!   [table_size_bits:8][symbol_width_bits:8][num_tables:8][num_root_symbols:16]

use crate::bitreader::BitStreamReader;
use crate::bitwriter::BitStreamWriter;
use crate::error::{Error, Result};

// ── Fixed header field widths ─────────────────────────────────────────────────
pub const TABLE_SIZE_FIELD_BITS:       u32 = 8;
pub const SYMBOL_WIDTH_FIELD_BITS:     u32 = 8;
pub const NUM_TABLES_FIELD_BITS:       u32 = 8;
pub const NUM_ROOT_SYMBOLS_FIELD_BITS: u32 = 16;

pub const HEADER_BITS: u32 = TABLE_SIZE_FIELD_BITS
    + SYMBOL_WIDTH_FIELD_BITS
    + NUM_TABLES_FIELD_BITS
    + NUM_ROOT_SYMBOLS_FIELD_BITS; // 40

// ── Table entry widths ────────────────────────────────────────────────────────
pub const CODE_LENGTH_FIELD_BITS: u32 = 8;
/// Longest Huffman code the codec will emit or accept.
pub const MAX_CODE_LEN: u32 = 64;
/// Widest count or symbol field a decoder will accept from a header.
pub const MAX_VALUE_FIELD_BITS: u32 = 32;

/// Number of binary digits needed to hold `n` (at least 1).
pub fn bits_needed(n: u64) -> u32 {
    (u64::BITS - n.leading_zeros()).max(1)
}

/// Fails with [`Error::Format`] when `value` has more than `width` significant bits.
pub fn ensure_fits(field: &'static str, value: u64, width: u32) -> Result<()> {
    if width < u64::BITS && value >> width != 0 {
        return Err(Error::Format { field, value, width });
    }
    Ok(())
}

// ── Options ───────────────────────────────────────────────────────────────────

/// How string ends are represented in the trie payload.
///
/// * `Fixed`: every string has the same length. Leaf-ness is implied by
///   depth, so the deepest level carries no fan-out code and fan-out zero is
///   never coded.
/// * `Variable`: strings may end anywhere. Every node carries a fan-out code
///   (zero marks a leaf) and inner nodes carry one end flag bit.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Mode {
    #[default]
    Fixed,
    Variable,
}

/// Order in which siblings are serialised.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SiblingOrder {
    /// First-inserted child first.
    #[default]
    Insertion,
    /// Ascending alphabet index.
    Alphabetical,
}

/// Encoder configuration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Options {
    pub mode: Mode,
    pub sibling_order: SiblingOrder,
}

impl Options {
    pub fn with_mode(mut self, mode: Mode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_sibling_order(mut self, order: SiblingOrder) -> Self {
        self.sibling_order = order;
        self
    }
}

// ── Header ────────────────────────────────────────────────────────────────────

/// The four fixed-width fields at the start of every stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Header {
    /// Width of each table's entry-count field.
    pub table_size_bits: u32,
    /// Width of each table entry's symbol field.
    pub symbol_width_bits: u32,
    /// Depth tables plus the trailing fan-out table.
    pub num_tables: u32,
    /// Number of children of the trie root.
    pub num_root_symbols: u32,
}

impl Header {
    pub fn write(&self, w: &mut BitStreamWriter) -> Result<()> {
        w.write_field("table size bits",   self.table_size_bits as u64,   TABLE_SIZE_FIELD_BITS)?;
        w.write_field("symbol width bits", self.symbol_width_bits as u64, SYMBOL_WIDTH_FIELD_BITS)?;
        w.write_field("table count",       self.num_tables as u64,        NUM_TABLES_FIELD_BITS)?;
        w.write_field("root symbol count", self.num_root_symbols as u64,  NUM_ROOT_SYMBOLS_FIELD_BITS)?;
        Ok(())
    }

    /// Reads and sanity-checks a header.
    pub fn read(r: &mut BitStreamReader<'_>) -> Result<Self> {
        let header = Header {
            table_size_bits:   r.read_int(TABLE_SIZE_FIELD_BITS)? as u32,
            symbol_width_bits: r.read_int(SYMBOL_WIDTH_FIELD_BITS)? as u32,
            num_tables:        r.read_int(NUM_TABLES_FIELD_BITS)? as u32,
            num_root_symbols:  r.read_int(NUM_ROOT_SYMBOLS_FIELD_BITS)? as u32,
        };

        if !(1..=MAX_VALUE_FIELD_BITS).contains(&header.table_size_bits) {
            return Err(Error::Malformed(format!(
                "table size field width {} outside 1..={}",
                header.table_size_bits, MAX_VALUE_FIELD_BITS
            )));
        }
        if !(1..=MAX_VALUE_FIELD_BITS).contains(&header.symbol_width_bits) {
            return Err(Error::Malformed(format!(
                "symbol field width {} outside 1..={}",
                header.symbol_width_bits, MAX_VALUE_FIELD_BITS
            )));
        }
        // At least one depth table plus the fan-out table.
        if header.num_tables < 2 {
            return Err(Error::Malformed(format!(
                "stream declares {} tables, need at least 2",
                header.num_tables
            )));
        }
        Ok(header)
    }

    /// Number of per-depth symbol tables (excludes the fan-out table).
    pub fn depth_tables(&self) -> usize {
        self.num_tables as usize - 1
    }
}
