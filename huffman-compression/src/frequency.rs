use itertools::Itertools;

/// Occurrence count of every byte value seen in an input, kept in the order
/// the bytes were first encountered.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FrequencyTable(Vec<(u8, usize)>);

impl FrequencyTable {
    pub fn from_bytes(bytes: &[u8]) -> Self {
        let counts = bytes.iter().copied().counts();
        let entries = bytes
            .iter()
            .copied()
            .unique()
            .map(|byte| (byte, counts[&byte]))
            .collect_vec();
        Self(entries)
    }

    pub fn get(&self, symbol: u8) -> Option<usize> {
        self.0
            .iter()
            .find_map(|&(byte, count)| (byte == symbol).then_some(count))
    }

    pub fn iter(&self) -> impl Iterator<Item = (u8, usize)> + '_ {
        self.0.iter().copied()
    }

    /// Number of distinct symbols.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn total(&self) -> usize {
        self.0.iter().map(|(_, count)| count).sum()
    }
}

/// Repeated symbols are merged by adding their counts; zero counts are dropped.
impl FromIterator<(u8, usize)> for FrequencyTable {
    fn from_iter<T: IntoIterator<Item = (u8, usize)>>(iter: T) -> Self {
        let mut entries: Vec<(u8, usize)> = Vec::new();
        for (symbol, count) in iter.into_iter().filter(|&(_, count)| count > 0) {
            match entries.iter_mut().find(|(byte, _)| *byte == symbol) {
                Some((_, total)) => *total += count,
                None => entries.push((symbol, count)),
            }
        }
        Self(entries)
    }
}
