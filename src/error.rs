// src/error.rs
//! Error types for the trie codec.

use thiserror::Error;

/// Error variants for encode, decode and bit-level stream operations.
#[derive(Debug, Error)]
pub enum Error {
    /// An input character is not part of the supplied alphabet.
    #[error("symbol {symbol:?} is not in the alphabet")]
    Alphabet { symbol: char },

    /// The alphabet lists the same character more than once.
    #[error("symbol {symbol:?} appears twice in the alphabet")]
    DuplicateSymbol { symbol: char },

    /// A value does not fit the bit width of the field it is written to.
    #[error("value {value} does not fit in {width}-bit {field}")]
    Format {
        field: &'static str,
        value: u64,
        width: u32,
    },

    /// A read needed more bits than the stream has left.
    #[error("truncated stream: needed {needed} bits, {remaining} remaining")]
    TruncatedStream { needed: usize, remaining: usize },

    /// A Huffman table would have no entries.
    #[error("table {table} has no entries")]
    DegenerateTable { table: usize },

    /// No code of the table matched within its longest code length.
    #[error("no code in table {table} matches after {max_len} bits")]
    InvalidPrefixCode { table: usize, max_len: u32 },

    /// The stream is structurally inconsistent with its own header or tables.
    #[error("malformed stream: {0}")]
    Malformed(String),

    /// Fixed-length mode received strings of different lengths.
    #[error("fixed-length mode expects {expected} symbols per string, found {found}")]
    RaggedLength { expected: usize, found: usize },

    /// An input string has no symbols.
    #[error("empty strings cannot be encoded")]
    EmptyString,

    /// An I/O error surfaced from the bit-level backend.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// A specialized Result type for codec operations.
pub type Result<T> = std::result::Result<T, Error>;
