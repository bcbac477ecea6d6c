//! Parsing of REPL input lines.

/// Slash commands offered for completion, with their help text.
pub const COMMANDS: [(&str, &str); 9] = [
    ("/run", "Submit the current draft"),
    ("/history", "List recent queries (1 = most recent)"),
    ("/pick", "<n> Copy history entry n into the draft"),
    ("/suggest", "[text] Show suggestions for text or the current draft"),
    ("/use", "<n> Copy suggestion n from the last list into the draft"),
    ("/clear", "Clear the displayed result"),
    ("/status", "Show the session state"),
    ("/topics", "List catalog topics and their availability"),
    ("/help", "Show this help"),
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShellCommand {
    /// Plain text: becomes the draft and is submitted.
    Ask(String),
    Run,
    History,
    Pick(usize),
    Suggest(Option<String>),
    Use(usize),
    Clear,
    Status,
    Topics,
    Help,
    Quit,
    /// A slash command that could not be understood, with the reason.
    Invalid(String),
}

impl ShellCommand {
    /// Parses one input line. Returns `None` for blank input.
    pub fn parse(line: &str) -> Option<Self> {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            return None;
        }
        if trimmed == "quit" || trimmed == "exit" {
            return Some(Self::Quit);
        }
        if !trimmed.starts_with('/') {
            return Some(Self::Ask(trimmed.to_string()));
        }

        let (name, rest) = match trimmed.split_once(char::is_whitespace) {
            Some((name, rest)) => (name, rest.trim()),
            None => (trimmed, ""),
        };

        let command = match name {
            "/run" => Self::Run,
            "/history" => Self::History,
            "/pick" => Self::Pick(parse_position(rest).unwrap_or(0)),
            "/suggest" => Self::Suggest((!rest.is_empty()).then(|| rest.to_string())),
            "/use" => Self::Use(parse_position(rest).unwrap_or(0)),
            "/clear" => Self::Clear,
            "/status" => Self::Status,
            "/topics" => Self::Topics,
            "/help" => Self::Help,
            other => return Some(Self::Invalid(format!("Unknown command: {other}"))),
        };

        match command {
            Self::Pick(0) | Self::Use(0) => {
                Some(Self::Invalid(format!("{name} expects a position starting at 1")))
            }
            command => Some(command),
        }
    }
}

fn parse_position(text: &str) -> Option<usize> {
    text.parse::<usize>().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_text_is_ask() {
        assert_eq!(
            ShellCommand::parse("  show sales  "),
            Some(ShellCommand::Ask("show sales".into()))
        );
        assert_eq!(ShellCommand::parse("   "), None);
    }

    #[test]
    fn test_positions_are_one_based() {
        assert_eq!(ShellCommand::parse("/pick 2"), Some(ShellCommand::Pick(2)));
        assert_eq!(ShellCommand::parse("/use 1"), Some(ShellCommand::Use(1)));
        assert!(matches!(ShellCommand::parse("/pick 0"), Some(ShellCommand::Invalid(_))));
        assert!(matches!(ShellCommand::parse("/use x"), Some(ShellCommand::Invalid(_))));
    }

    #[test]
    fn test_suggest_argument_optional() {
        assert_eq!(ShellCommand::parse("/suggest"), Some(ShellCommand::Suggest(None)));
        assert_eq!(
            ShellCommand::parse("/suggest  churn rate"),
            Some(ShellCommand::Suggest(Some("churn rate".into())))
        );
    }

    #[test]
    fn test_unknown_and_quit() {
        assert!(matches!(ShellCommand::parse("/nope"), Some(ShellCommand::Invalid(_))));
        assert_eq!(ShellCommand::parse("exit"), Some(ShellCommand::Quit));
    }

    #[test]
    fn test_every_listed_command_parses() {
        for (name, _) in COMMANDS {
            let line = match name {
                "/pick" | "/use" => format!("{name} 1"),
                _ => name.to_string(),
            };
            let parsed = ShellCommand::parse(&line);
            assert!(
                !matches!(parsed, Some(ShellCommand::Invalid(_)) | None),
                "{name} did not parse"
            );
        }
    }
}
