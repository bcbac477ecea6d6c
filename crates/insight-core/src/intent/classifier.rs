//! Keyword-rule intent classification.
//!
//! Queries are lowercased and checked against an ordered rule table.
//! The first matching rule decides the topic; when nothing matches the
//! classifier falls back to its default topic, so classification never fails.
//! Rule order matters because rules overlap: "churn for sales by region"
//! matches both the sales rule and the churn rule, and sales is listed first.

use serde::Serialize;

use crate::catalog::{DatasetCatalog, topics};

/// Keyword condition evaluated against a lowercased query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", content = "keywords", rename_all = "snake_case")]
pub enum KeywordMatcher {
    /// Every keyword must appear.
    AllOf(Vec<&'static str>),
    /// At least one keyword must appear.
    AnyOf(Vec<&'static str>),
}

impl KeywordMatcher {
    pub fn matches(&self, lowered: &str) -> bool {
        match self {
            Self::AllOf(keywords) => keywords.iter().all(|kw| lowered.contains(kw)),
            Self::AnyOf(keywords) => keywords.iter().any(|kw| lowered.contains(kw)),
        }
    }
}

/// One row of the rule table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct KeywordRule {
    pub matcher: KeywordMatcher,
    pub topic: &'static str,
}

impl KeywordRule {
    pub const fn new(matcher: KeywordMatcher, topic: &'static str) -> Self {
        Self { matcher, topic }
    }
}

/// Maps free text to a topic key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IntentClassifier {
    rules: Vec<KeywordRule>,
    fallback: &'static str,
}

impl Default for IntentClassifier {
    fn default() -> Self {
        Self::new(default_rules(), topics::SALES)
    }
}

impl IntentClassifier {
    pub fn new(rules: Vec<KeywordRule>, fallback: &'static str) -> Self {
        Self { rules, fallback }
    }

    pub fn rules(&self) -> &[KeywordRule] {
        &self.rules
    }

    pub fn fallback(&self) -> &'static str {
        self.fallback
    }

    /// Returns the topic key for `query`.
    pub fn classify(&self, query: &str) -> &'static str {
        let lowered = query.to_lowercase();
        self.rules
            .iter()
            .find(|rule| rule.matcher.matches(&lowered))
            .map(|rule| rule.topic)
            .unwrap_or(self.fallback)
    }

    /// Every topic this classifier can produce, fallback last, without duplicates.
    pub fn reachable_topics(&self) -> Vec<&'static str> {
        let mut topics: Vec<&'static str> = Vec::new();
        for topic in self
            .rules
            .iter()
            .map(|rule| rule.topic)
            .chain(std::iter::once(self.fallback))
        {
            if !topics.contains(&topic) {
                topics.push(topic);
            }
        }
        topics
    }

    /// Topics the classifier can produce that `catalog` does not hold.
    ///
    /// An empty result means classifier and catalog are in sync.
    pub fn missing_topics(&self, catalog: &dyn DatasetCatalog) -> Vec<&'static str> {
        self.reachable_topics()
            .into_iter()
            .filter(|topic| !catalog.contains(topic))
            .collect()
    }
}

/// The ordered rule table used by the default classifier.
pub fn default_rules() -> Vec<KeywordRule> {
    use KeywordMatcher::{AllOf, AnyOf};

    vec![
        KeywordRule::new(AllOf(vec!["sales", "region"]), topics::SALES),
        KeywordRule::new(AllOf(vec!["revenue", "product"]), topics::REVENUE),
        KeywordRule::new(AllOf(vec!["top", "customer"]), topics::CUSTOMERS),
        KeywordRule::new(AnyOf(vec!["traffic", "website"]), topics::TRAFFIC),
        KeywordRule::new(AnyOf(vec!["churn"]), topics::CHURN),
    ]
}

/// Classifies with the default rule table.
pub fn classify(query: &str) -> &'static str {
    IntentClassifier::default().classify(query)
}
