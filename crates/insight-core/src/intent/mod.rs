//! Intent classification: free text to topic key.

mod classifier;

pub use classifier::{IntentClassifier, KeywordMatcher, KeywordRule, classify, default_rules};
