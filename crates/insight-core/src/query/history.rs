use std::collections::VecDeque;

use serde::Serialize;

/// Most-recent-first list of submitted queries with a fixed capacity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QueryHistory {
    entries: VecDeque<String>,
    #[serde(skip)]
    limit: usize,
}

impl QueryHistory {
    /// A limit of zero is treated as one.
    pub fn new(limit: usize) -> Self {
        let limit = limit.max(1);
        Self {
            entries: VecDeque::with_capacity(limit),
            limit,
        }
    }

    /// Prepends `query` unless it equals the current head.
    ///
    /// Evicts from the tail once the limit is exceeded. Returns whether
    /// the history changed.
    pub fn push(&mut self, query: &str) -> bool {
        if self.entries.front().is_some_and(|head| head == query) {
            return false;
        }
        self.entries.push_front(query.to_string());
        self.entries.truncate(self.limit);
        true
    }

    pub fn get(&self, index: usize) -> Option<&str> {
        self.entries.get(index).map(String::as_str)
    }

    pub fn head(&self) -> Option<&str> {
        self.get(0)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(String::as_str)
    }

    pub fn to_vec(&self) -> Vec<String> {
        self.entries.iter().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn limit(&self) -> usize {
        self.limit
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dedup_against_head_only() {
        let mut history = QueryHistory::new(10);
        assert!(history.push("a"));
        assert!(!history.push("a"));
        assert_eq!(history.to_vec(), vec!["a"]);

        history.push("b");
        // "a" is no longer the head, so it is recorded again
        assert!(history.push("a"));
        assert_eq!(history.to_vec(), vec!["a", "b", "a"]);
    }

    #[test]
    fn test_cap_evicts_oldest() {
        let mut history = QueryHistory::new(10);
        for i in 0..11 {
            history.push(&format!("q{i}"));
        }
        assert_eq!(history.len(), 10);
        assert_eq!(history.head(), Some("q10"));
        assert_eq!(history.get(9), Some("q1"));
        assert!(!history.iter().any(|q| q == "q0"));
    }

    #[test]
    fn test_zero_limit_clamped() {
        let mut history = QueryHistory::new(0);
        history.push("a");
        history.push("b");
        assert_eq!(history.limit(), 1);
        assert_eq!(history.to_vec(), vec!["b"]);
    }
}
