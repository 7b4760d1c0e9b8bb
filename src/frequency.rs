use std::collections::HashMap;
use std::hash::Hash;


/// Occurrence counts per distinct symbol, kept in first-occurrence order.
///
/// The order is only used to break ties between equal weights when the tree
/// is built; callers should otherwise treat the table as unordered.
#[derive(Debug, Clone)]
pub struct FrequencyTable<T> {

    entries: Vec<(T, usize)>,
    index: HashMap<T, usize>

}

impl<T> FrequencyTable<T>
where
    T: Eq + Hash + Clone
{

    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            index: HashMap::new()
        }
    }


    /// Counts every symbol yielded by `data`.
    pub fn count(data: impl IntoIterator<Item = T>) -> Self {

        let mut table = Self::new();

        for value in data {
            table.add(value, 1);
        }

        log::trace!("Counted {} distinct symbols", table.len());

        table
    }


    /// Adds `freq` occurrences of `value`.
    pub fn add(&mut self, value: T, freq: usize) {

        match self.index.get(&value) {

            Some(&i) => self.entries[i].1 += freq,

            None => {
                self.index.insert(value.clone(), self.entries.len());
                self.entries.push((value, freq));
            }
        }
    }


    pub fn get(&self, value: &T) -> Option<usize> {
        self.index.get(value).map(|&i| self.entries[i].1)
    }


    /// Number of distinct symbols.
    pub fn len(&self) -> usize {
        self.entries.len()
    }


    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }


    pub fn total(&self) -> usize {
        self.entries.iter().map(|(_, freq)| freq).sum()
    }


    /// Entries in first-occurrence order.
    pub fn iter(&self) -> impl Iterator<Item = (&T, usize)> {
        self.entries.iter().map(|(value, freq)| (value, *freq))
    }


    /// Entries sorted ascending by frequency. The sort is stable, so equal
    /// frequencies keep their first-occurrence order.
    pub fn sorted_by_frequency(&self) -> Vec<(T, usize)> {
        let mut sorted = self.entries.clone();
        sorted.sort_by_key(|pair| pair.1);
        sorted
    }

}


impl<T> Default for FrequencyTable<T>
where
    T: Eq + Hash + Clone
{
    fn default() -> Self {
        Self::new()
    }
}


impl<T> FromIterator<(T, usize)> for FrequencyTable<T>
where
    T: Eq + Hash + Clone
{
    fn from_iter<I: IntoIterator<Item = (T, usize)>>(iter: I) -> Self {

        let mut table = Self::new();

        for (value, freq) in iter {
            table.add(value, freq);
        }

        table
    }
}
