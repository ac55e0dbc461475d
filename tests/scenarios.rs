use std::collections::BTreeSet;

use lexhuff::{
    decode, encode, encode_with_report, index_of, Alphabet, Dictionary, Error, Mode, Options,
    SiblingOrder,
};

fn set(words: &[String]) -> BTreeSet<&str> {
    words.iter().map(String::as_str).collect()
}

#[test]
fn scenario_fixed_length_cat_car_dog() {
    let alphabet = Alphabet::new("acdgort".chars()).unwrap();
    let words = ["cat", "car", "dog"];
    let opts = Options::default().with_sibling_order(SiblingOrder::Alphabetical);

    let bytes = encode(&words, &alphabet, &opts).unwrap();
    let decoded = decode(&bytes, &alphabet).unwrap();
    assert_eq!(set(&decoded), BTreeSet::from(["cat", "car", "dog"]));
    assert_eq!(decoded, vec!["car", "cat", "dog"]);

    let hits = index_of(&bytes, &alphabet, &["dog"]).unwrap();
    assert_eq!(hits, vec![("dog".to_string(), 3)]);
}

#[test]
fn scenario_variable_length_cat_cats() {
    let alphabet = Alphabet::lowercase();
    let opts = Options::default().with_mode(Mode::Variable);
    let bytes = encode(&["cat", "cats"], &alphabet, &opts).unwrap();

    let dict = Dictionary::parse(&bytes, &alphabet).unwrap();
    assert_eq!(dict.mode(), Mode::Variable);
    assert_eq!(dict.words().unwrap(), vec!["cat", "cats"]);
    assert!(dict.contains("cat").unwrap());
    assert!(dict.contains("cats").unwrap());
    assert!(!dict.contains("ca").unwrap());
}

#[test]
fn variable_mode_handles_mixed_lengths_and_input_order() {
    let alphabet = Alphabet::lowercase();
    let words = ["zebra", "a", "be", "bee", "been", "beet", "z", "abc"];
    let opts = Options::default().with_mode(Mode::Variable);
    let decoded = decode(&encode(&words, &alphabet, &opts).unwrap(), &alphabet).unwrap();
    assert_eq!(decoded.len(), words.len());
    assert_eq!(set(&decoded), words.iter().copied().collect());
}

#[test]
fn one_word_vocabulary_uses_single_entry_tables() {
    let alphabet = Alphabet::lowercase();
    let encoded = encode_with_report(&["hello"], &alphabet, &Options::default()).unwrap();
    assert_eq!(encoded.header.num_root_symbols, 1);
    // Every table has exactly one entry.
    assert_eq!(encoded.header.table_size_bits, 1);
    assert_eq!(decode(&encoded.bytes, &alphabet).unwrap(), vec!["hello"]);
}

#[test]
fn custom_alphabet_with_non_ascii_symbols() {
    let alphabet = Alphabet::new("αβγδ".chars()).unwrap();
    let words = ["αβ", "αγ", "δδ"];
    let decoded = decode(&encode(&words, &alphabet, &Options::default()).unwrap(), &alphabet).unwrap();
    assert_eq!(decoded, vec!["αβ", "αγ", "δδ"]);
}

#[test]
fn wide_root_fanout_fits_header() {
    let alphabet = Alphabet::lowercase();
    let words: Vec<String> = ('a'..='z').flat_map(|a| ('a'..='z').map(move |b| format!("{a}{b}"))).collect();
    let encoded = encode_with_report(&words, &alphabet, &Options::default()).unwrap();
    assert_eq!(encoded.header.num_root_symbols, 26);
    // 26 entries need five bits; the fan-out table has one entry (26).
    assert_eq!(encoded.header.table_size_bits, 5);
    assert_eq!(decode(&encoded.bytes, &alphabet).unwrap(), words);
}

#[test]
fn failures_are_explicit() {
    let alphabet = Alphabet::lowercase();

    assert!(matches!(
        encode(&["Cat"], &alphabet, &Options::default()),
        Err(Error::Alphabet { symbol: 'C' })
    ));
    assert!(matches!(decode(&[], &alphabet), Err(Error::TruncatedStream { .. })));

    // Header claiming one zero-entry table after the depth tables.
    let bytes = [1u8, 1, 2, 0, 1, 0];
    assert!(matches!(decode(&bytes, &alphabet), Err(Error::DegenerateTable { table: 0 })));
}

#[test]
fn garbage_never_hangs() {
    let alphabet = Alphabet::lowercase();
    let bytes = encode(&["apple", "angle", "ankle", "baker"], &alphabet, &Options::default()).unwrap();
    for i in 5..bytes.len() {
        let mut corrupt = bytes.clone();
        corrupt[i] ^= 0xA5;
        // Any outcome is fine as long as it returns.
        let _ = decode(&corrupt, &alphabet);
    }
}
