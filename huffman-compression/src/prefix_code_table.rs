use std::collections::{BTreeMap, HashMap};

use itertools::Itertools;

use crate::{config::MergePolicy, frequency::FrequencyTable, tree::PrefixTree};

/// Builds the tree for `table` and flattens it into a codebook. The tree is
/// dropped once the codes are extracted.
pub fn generate_codes(table: &FrequencyTable, policy: MergePolicy) -> Codebook {
    let tree = PrefixTree::new(table, policy);
    log::trace!("prefix tree:\n{}", tree.render());
    tree.codebook()
}

/// Symbol to code mapping. Codes are strings of `'0'` and `'1'`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Codebook(BTreeMap<u8, String>);

impl Codebook {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the previous code if `symbol` already had one.
    pub fn insert(&mut self, symbol: u8, code: impl Into<String>) -> Option<String> {
        self.0.insert(symbol, code.into())
    }

    pub fn get(&self, symbol: u8) -> Option<&str> {
        self.0.get(&symbol).map(String::as_str)
    }

    pub fn contains(&self, symbol: u8) -> bool {
        self.0.contains_key(&symbol)
    }

    /// Entries in ascending symbol order.
    pub fn iter(&self) -> impl Iterator<Item = (u8, &str)> {
        self.0.iter().map(|(&symbol, code)| (symbol, code.as_str()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn max_code_len(&self) -> usize {
        self.0.values().map(String::len).max().unwrap_or_default()
    }

    /// Code to symbol lookup used while decoding.
    pub fn decoding_table(&self) -> HashMap<&str, u8> {
        self.0
            .iter()
            .map(|(&symbol, code)| (code.as_str(), symbol))
            .collect()
    }

    /// True when no code equals or starts with another code.
    pub fn is_prefix_free(&self) -> bool {
        // after sorting, a code that prefixes others sorts right before one of them
        self.0
            .values()
            .sorted()
            .tuple_windows()
            .all(|(shorter, longer)| !longer.starts_with(shorter.as_str()))
    }

    /// Bits needed to encode an input with the given symbol counts.
    pub fn encoded_len(&self, table: &FrequencyTable) -> usize {
        table
            .iter()
            .filter_map(|(symbol, count)| self.get(symbol).map(|code| code.len() * count))
            .sum()
    }
}

impl FromIterator<(u8, String)> for Codebook {
    fn from_iter<T: IntoIterator<Item = (u8, String)>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::{generate_codes, Codebook};
    use crate::{config::MergePolicy, frequency::FrequencyTable};

    fn codebook(entries: &[(u8, &str)]) -> Codebook {
        entries
            .iter()
            .map(|&(symbol, code)| (symbol, code.to_owned()))
            .collect()
    }

    #[rstest]
    #[case(&[(b'a', "0")], true)]
    #[case(&[(b'a', "11"), (b'b', "10"), (b'c', "0")], true)]
    #[case(&[(b'a', "1"), (b'b', "10")], false)]
    #[case(&[(b'a', "01"), (b'b', "01")], false)]
    #[case(&[(b'a', "0"), (b'b', "10"), (b'c', "011")], false)]
    fn test_prefix_free(#[case] entries: &[(u8, &str)], #[case] expected: bool) {
        assert_eq!(codebook(entries).is_prefix_free(), expected);
    }

    #[test]
    fn test_empty_codebook() {
        let codes = Codebook::new();
        assert!(codes.is_prefix_free());
        assert_eq!(codes.max_code_len(), 0);
        assert!(codes.decoding_table().is_empty());
    }

    #[test]
    fn test_generate_codes_for_scenario() {
        let table = FrequencyTable::from_bytes(b"aaabbc");
        let codes = generate_codes(&table, MergePolicy::Legacy);

        assert_eq!(codes.get(b'a'), Some("11"));
        assert_eq!(codes.get(b'b'), Some("10"));
        assert_eq!(codes.get(b'c'), Some("0"));
        assert_eq!(codes.max_code_len(), 2);
        assert_eq!(codes.encoded_len(&table), 11);
    }

    #[test]
    fn test_min_redundancy_is_never_longer() {
        let input = b"the quick brown fox jumps over the lazy dog, again and again";
        let table = FrequencyTable::from_bytes(input);

        let legacy = generate_codes(&table, MergePolicy::Legacy);
        let optimal = generate_codes(&table, MergePolicy::MinRedundancy);
        assert!(optimal.encoded_len(&table) <= legacy.encoded_len(&table));
    }

    #[test]
    fn test_decoding_table_reverses_codes() {
        let codes = codebook(&[(b'a', "11"), (b'b', "10"), (b'c', "0")]);
        let table = codes.decoding_table();

        assert_eq!(table.len(), 3);
        assert_eq!(table.get("11"), Some(&b'a'));
        assert_eq!(table.get("0"), Some(&b'c'));
        assert_eq!(table.get("1"), None);
    }

    #[test]
    fn test_insert_reports_duplicates() {
        let mut codes = Codebook::new();
        assert_eq!(codes.insert(b'a', "0"), None);
        assert_eq!(codes.insert(b'a', "1"), Some("0".to_owned()));
        assert!(codes.contains(b'a'));
        assert_eq!(codes.len(), 1);
    }
}
