// src/lib.rs
//! lexhuff: compact word lists as a Huffman-coded trie.
//!
//! A fixed vocabulary over a small declared alphabet is stored as a prefix
//! trie. Each trie depth gets its own Huffman table, and one more table codes
//! node fan-out. The trie is then written pre-order through those tables.
//!
//! ```
//! use lexhuff::{decode, encode, index_of, word_at, Alphabet, Options};
//!
//! let alphabet = Alphabet::lowercase();
//! let bytes = encode(&["cat", "car", "dog"], &alphabet, &Options::default())?;
//!
//! let words = decode(&bytes, &alphabet)?;
//! assert_eq!(words, vec!["cat", "car", "dog"]);
//! assert_eq!(index_of(&bytes, &alphabet, &["dog"])?, vec![("dog".to_string(), 3)]);
//! assert_eq!(word_at(&bytes, &alphabet, 3)?.as_deref(), Some("dog"));
//! # Ok::<(), lexhuff::Error>(())
//! ```
//!
//! Stream layout (bit-packed, big-endian, only the last byte padded):
//!   header   table_size_bits:8  symbol_width_bits:8  num_tables:8  num_root_symbols:16
//!   tables   num_tables blocks: per-depth symbol tables, then the fan-out table
//!   payload  pre-order trie nodes coded through the tables

pub mod alphabet;
pub mod bitreader;
pub mod bitwriter;
pub mod decoder;
pub mod encoder;
pub mod entropy;
pub mod error;
pub mod format;
pub mod trie;

pub use alphabet::{Alphabet, Symbol};
pub use decoder::{decode, index_of, word_at, Dictionary};
pub use encoder::{encode, encode_with_report, Encoded, SectionSizes};
pub use error::{Error, Result};
pub use format::{Header, Mode, Options, SiblingOrder};
