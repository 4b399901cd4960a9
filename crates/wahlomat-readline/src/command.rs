//! REPL input parsing.

/// Every slash command the REPL understands, in the order `/help` lists them.
pub const COMMANDS: [&str; 9] = [
    "/key", "/parties", "/party", "/analyze", "/compare", "/history", "/outputs", "/clear",
    "/help",
];

/// A line ending in this character continues on the next line.
pub const LINE_CONTINUATION: char = '\\';

/// Commands that only make sense once the chat has started.
pub const CONVERSATION_COMMANDS: [&str; 3] = ["/party", "/analyze", "/compare"];

/// One parsed line of user input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Plain text, sent to the main assistant as typed (continuation markers removed).
    Message(String),
    Key,
    Parties,
    /// `/party` with an optional party name (may contain spaces).
    Party(Option<String>),
    Analyze,
    Compare,
    History,
    Outputs,
    Clear,
    Help,
    Quit,
    Unknown(String),
}

impl Command {
    /// Parses a line of input. Returns `None` for blank lines.
    ///
    /// Slash commands and `quit` are recognised after trimming; messages keep their
    /// whitespace and line breaks.
    pub fn parse(line: &str) -> Option<Self> {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            return None;
        }

        if trimmed == "quit" || trimmed == "exit" {
            return Some(Command::Quit);
        }

        if !trimmed.starts_with('/') {
            return Some(Command::Message(join_continued_lines(line)));
        }

        let (name, rest) = match trimmed.split_once(char::is_whitespace) {
            Some((name, rest)) => (name, rest.trim()),
            None => (trimmed, ""),
        };

        let command = match name {
            "/key" => Command::Key,
            "/parties" => Command::Parties,
            "/party" => Command::Party((!rest.is_empty()).then(|| rest.to_string())),
            "/analyze" => Command::Analyze,
            "/compare" => Command::Compare,
            "/history" => Command::History,
            "/outputs" => Command::Outputs,
            "/clear" => Command::Clear,
            "/help" => Command::Help,
            other => Command::Unknown(other.to_string()),
        };
        Some(command)
    }

    /// True for commands that need at least one message in the transcript.
    pub fn needs_conversation(&self) -> bool {
        matches!(
            self,
            Command::Party(_) | Command::Analyze | Command::Compare
        )
    }
}

/// True when the input so far ends with a continuation marker.
pub fn is_continued(input: &str) -> bool {
    input.ends_with(LINE_CONTINUATION)
}

fn join_continued_lines(input: &str) -> String {
    input.replace(&format!("{LINE_CONTINUATION}\n"), "\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_plain_text_and_quit() {
        assert_eq!(Command::parse("   "), None);
        assert_eq!(
            Command::parse("  Wie steht es um die Rente? "),
            Some(Command::Message("  Wie steht es um die Rente? ".to_string()))
        );
        assert_eq!(Command::parse("quit"), Some(Command::Quit));
        assert_eq!(Command::parse("exit"), Some(Command::Quit));
    }

    #[test]
    fn test_multi_line_message_is_kept_verbatim() {
        let input = "Erstens: Klima\\\n  Zweitens: Rente\\\n\\\nDrittens: Bildung";
        assert!(!is_continued(input));
        assert!(is_continued("Erstens: Klima\\"));
        assert_eq!(
            Command::parse(input),
            Some(Command::Message(
                "Erstens: Klima\n  Zweitens: Rente\n\nDrittens: Bildung".to_string()
            ))
        );
    }

    #[test]
    fn test_parse_party_keeps_spaces_in_name() {
        assert_eq!(
            Command::parse("/party Die Grünen"),
            Some(Command::Party(Some("Die Grünen".to_string())))
        );
        assert_eq!(Command::parse("/party"), Some(Command::Party(None)));
        assert_eq!(Command::parse("/party   "), Some(Command::Party(None)));
    }

    #[test]
    fn test_parse_slash_commands() {
        assert_eq!(Command::parse("/analyze"), Some(Command::Analyze));
        assert_eq!(Command::parse("/clear"), Some(Command::Clear));
        assert_eq!(
            Command::parse("/unknown arg"),
            Some(Command::Unknown("/unknown".to_string()))
        );
    }

    #[test]
    fn test_conversation_commands_are_gated() {
        assert!(Command::Analyze.needs_conversation());
        assert!(Command::Party(None).needs_conversation());
        assert!(!Command::Key.needs_conversation());
        assert!(!Command::Clear.needs_conversation());

        for name in CONVERSATION_COMMANDS {
            assert!(COMMANDS.contains(&name));
            assert!(Command::parse(name).is_some_and(|c| c.needs_conversation()));
        }
    }
}
