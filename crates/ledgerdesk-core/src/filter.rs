//! Client-side search over the loaded page

use crate::record::Record;

/// Search query applied to the already-fetched collection
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterState {
    query: String,
    /// Lowercased copy of `query`
    needle: String,
}

impl FilterState {
    pub fn new(query: &str) -> Self {
        let mut state = Self::default();
        state.set(query);
        state
    }

    pub fn set(&mut self, query: &str) {
        self.query = query.to_string();
        self.needle = query.to_lowercase();
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn is_empty(&self) -> bool {
        self.needle.is_empty()
    }

    pub fn matches(&self, record: &Record) -> bool {
        self.is_empty() || record.search_text().contains(&self.needle)
    }

    /// Records matching the query, in collection order
    pub fn apply(&self, records: &[Record]) -> Vec<Record> {
        records.iter().filter(|r| self.matches(r)).cloned().collect()
    }
}
