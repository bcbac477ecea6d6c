//! Query suggestions offered while the user types.

use serde::{Deserialize, Serialize};

const DEFAULT_SUGGESTIONS: [&str; 5] = [
    "Show sales performance by region for Q1 2023",
    "Compare revenue across product categories",
    "What are the top 5 customers by revenue?",
    "Show monthly website traffic trends",
    "Analyze customer churn rate by segment",
];

const EXAMPLE_QUERIES: [&str; 3] = [
    "Show sales performance by region",
    "Compare revenue across product categories",
    "Top 5 customers by revenue",
];

/// Input shorter than this shows no suggestions.
const MIN_FILTER_CHARS: usize = 2;

pub fn default_suggestions() -> Vec<String> {
    DEFAULT_SUGGESTIONS.iter().map(|s| s.to_string()).collect()
}

pub fn example_queries() -> Vec<String> {
    EXAMPLE_QUERIES.iter().map(|s| s.to_string()).collect()
}

/// Suggestion list plus the quick example queries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuggestionBook {
    suggestions: Vec<String>,
    examples: Vec<String>,
}

impl Default for SuggestionBook {
    fn default() -> Self {
        Self::new(default_suggestions())
    }
}

impl SuggestionBook {
    pub fn new(suggestions: Vec<String>) -> Self {
        Self {
            suggestions,
            examples: example_queries(),
        }
    }

    pub fn suggestions(&self) -> &[String] {
        &self.suggestions
    }

    pub fn examples(&self) -> &[String] {
        &self.examples
    }

    /// Suggestions containing `input`, case-insensitively, in list order.
    ///
    /// Returns nothing for input under two characters.
    pub fn filter(&self, input: &str) -> Vec<&str> {
        let needle = input.trim().to_lowercase();
        if needle.chars().count() < MIN_FILTER_CHARS {
            return Vec::new();
        }
        self.suggestions
            .iter()
            .filter(|s| s.to_lowercase().contains(&needle))
            .map(String::as_str)
            .collect()
    }
}
