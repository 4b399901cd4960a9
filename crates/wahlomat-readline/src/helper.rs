use std::borrow::Cow::{self, Borrowed, Owned};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use colored::Colorize;
use rustyline::completion::{Completer, Pair};
use rustyline::highlight::Highlighter;
use rustyline::hint::Hinter;
use rustyline::validate::{ValidationContext, ValidationResult, Validator};
use rustyline::{Context, Helper};

use crate::command::{COMMANDS, CONVERSATION_COMMANDS, is_continued};

/// CLI helper for rustyline that provides completion, highlighting, and hints.
///
/// `/party`, `/analyze` and `/compare` are only offered once the chat has started. A line
/// ending in `\` continues on the next line.
#[derive(Clone)]
pub struct CliHelper {
    conversation_started: Arc<AtomicBool>,
}

impl CliHelper {
    pub fn new() -> Self {
        Self {
            conversation_started: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Updates which commands are offered.
    pub fn set_conversation_started(&self, started: bool) {
        self.conversation_started.store(started, Ordering::Relaxed);
    }

    /// Commands currently offered that start with `prefix`.
    pub fn candidates(&self, prefix: &str) -> Vec<&'static str> {
        let started = self.conversation_started.load(Ordering::Relaxed);
        COMMANDS
            .iter()
            .copied()
            .filter(|cmd| started || !CONVERSATION_COMMANDS.contains(cmd))
            .filter(|cmd| cmd.starts_with(prefix))
            .collect()
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

        if line.starts_with('/') && !line.contains(' ') {
            let candidates: Vec<Pair> = self
                .candidates(line)
                .into_iter()
                .map(|cmd| Pair {
                    display: cmd.to_string(),
                    replacement: cmd.to_string(),
                })
                .collect();
            Ok((0, candidates))
        } else {
            Ok((0, vec![]))
        }
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

    fn highlight_char(&self, _line: &str, _pos: usize, _forced: bool) -> bool {
        true
    }
}

impl Hinter for CliHelper {
    type Hint = String;

    fn hint(&self, line: &str, pos: usize, _ctx: &Context<'_>) -> Option<String> {
        let line = &line[..pos];

        if line.starts_with('/') && !line.contains(' ') {
            self.candidates(line)
                .into_iter()
                .find(|cmd| cmd.len() > line.len())
                .map(|cmd| cmd[line.len()..].to_string())
        } else {
            None
        }
    }
}

impl Validator for CliHelper {
    fn validate(&self, ctx: &mut ValidationContext<'_>) -> rustyline::Result<ValidationResult> {
        if is_continued(ctx.input()) {
            Ok(ValidationResult::Incomplete)
        } else {
            Ok(ValidationResult::Valid(None))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_conversation_commands_hidden_until_started() {
        let helper = CliHelper::new();
        assert!(helper.candidates("/").contains(&"/key"));
        assert!(!helper.candidates("/").contains(&"/analyze"));
        assert_eq!(helper.candidates("/pa"), vec!["/parties"]);

        helper.set_conversation_started(true);
        assert!(helper.candidates("/").contains(&"/analyze"));
        assert_eq!(helper.candidates("/pa"), vec!["/parties", "/party"]);
    }

    #[test]
    fn test_clones_share_state() {
        let helper = CliHelper::new();
        let clone = helper.clone();
        helper.set_conversation_started(true);
        assert_eq!(clone.candidates("/com"), vec!["/compare"]);
    }
}
