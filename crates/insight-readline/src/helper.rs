use std::borrow::Cow::{self, Borrowed, Owned};

use colored::Colorize;
use rustyline::completion::{Completer, Pair};
use rustyline::highlight::Highlighter;
use rustyline::hint::Hinter;
use rustyline::validate::Validator;
use rustyline::{Context, Helper};

use insight_core::suggestion::SuggestionBook;

use crate::command::COMMANDS;

/// Rustyline helper: completes slash commands and hints query suggestions.
#[derive(Clone)]
pub struct CliHelper {
    commands: Vec<String>,
    suggestions: SuggestionBook,
}

impl CliHelper {
    pub fn new(suggestions: SuggestionBook) -> Self {
        Self {
            commands: COMMANDS.iter().map(|(name, _)| name.to_string()).collect(),
            suggestions,
        }
    }

    /// First suggestion that extends what has been typed so far.
    fn suggestion_tail(&self, line: &str) -> Option<String> {
        let lowered = line.to_lowercase();
        self.suggestions
            .filter(line)
            .into_iter()
            .find(|s| s.to_lowercase().starts_with(&lowered) && s.len() > line.len())
            .and_then(|s| s.get(line.len()..))
            .map(str::to_string)
    }
}

impl Helper for CliHelper {}

impl Completer for CliHelper {
    type Candidate = Pair;

    fn complete(
        &self,
        line: &str,
        pos: usize,
        _ctx: &Context<'_>,
    ) -> rustyline::Result<(usize, Vec<Pair>)> {
        let line = &line[..pos];

        let candidates: Vec<Pair> = if line.starts_with('/') {
            self.commands
                .iter()
                .filter(|cmd| cmd.starts_with(line))
                .map(|cmd| Pair {
                    display: cmd.clone(),
                    replacement: cmd.clone(),
                })
                .collect()
        } else {
            self.suggestions
                .filter(line)
                .into_iter()
                .map(|s| Pair {
                    display: s.to_string(),
                    replacement: s.to_string(),
                })
                .collect()
        };
        Ok((0, candidates))
    }
}

impl Highlighter for CliHelper {
    fn highlight<'l>(&self, line: &'l str, _pos: usize) -> Cow<'l, str> {
        if line.starts_with('/') {
            Owned(line.bright_cyan().to_string())
        } else {
            Borrowed(line)
        }
    }

    fn highlight_hint<'h>(&self, hint: &'h str) -> Cow<'h, str> {
        Owned(hint.bright_black().to_string())
    }

    fn highlight_char(&self, _line: &str, _pos: usize, _forced: bool) -> bool {
        true
    }
}

impl Hinter for CliHelper {
    type Hint = String;

    fn hint(&self, line: &str, pos: usize, _ctx: &Context<'_>) -> Option<String> {
        let line = &line[..pos];

        if line.starts_with('/') {
            if line.contains(' ') {
                return None;
            }
            self.commands
                .iter()
                .find(|cmd| cmd.starts_with(line) && cmd.len() > line.len())
                .map(|cmd| cmd[line.len()..].to_string())
        } else {
            self.suggestion_tail(line)
        }
    }
}

impl Validator for CliHelper {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_suggestion_tail_extends_prefix() {
        let helper = CliHelper::new(SuggestionBook::default());
        assert_eq!(
            helper.suggestion_tail("show monthly").as_deref(),
            Some(" website traffic trends")
        );
        assert_eq!(helper.suggestion_tail("S"), None);
    }

    #[test]
    fn test_suggestion_tail_requires_prefix_match() {
        let helper = CliHelper::new(SuggestionBook::default());
        // "churn" matches a suggestion, but only in the middle.
        assert_eq!(helper.suggestion_tail("churn"), None);
    }
}
