//! The interactive loop: reads a line, dispatches it to the `SessionUseCase`, prints the
//! outcome.

use std::sync::Arc;

use anyhow::Result;
use colored::Colorize;
use rustyline::Editor;
use rustyline::error::ReadlineError;
use rustyline::history::DefaultHistory;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use wahlomat_application::SessionUseCase;
use wahlomat_core::error::WahlError;
use wahlomat_core::prompt::{FOLLOW_UP_TEXT, WELCOME_TEXT};
use wahlomat_core::session::{MessageRole, Session};

use crate::command::Command;
use crate::helper::CliHelper;

const KEY_PROMPT: &str = "OpenAI API-Schlüssel eingeben: ";

/// Whether the loop should keep reading input.
#[derive(Debug, PartialEq, Eq)]
enum Flow {
    Continue,
    Exit,
}

pub struct Repl {
    use_case: SessionUseCase,
    session: Arc<Mutex<Session>>,
    editor: Editor<CliHelper, DefaultHistory>,
    /// Shares its state with the helper installed in `editor`.
    helper: CliHelper,
}

impl Repl {
    pub fn new(use_case: SessionUseCase, session: Arc<Mutex<Session>>) -> Result<Self> {
        let helper = CliHelper::new();
        let mut editor = Editor::new()?;
        editor.set_helper(Some(helper.clone()));

        Ok(Self {
            use_case,
            session,
            editor,
            helper,
        })
    }

    /// Stores `secret` as the session's key, or asks for one if `None`.
    pub async fn init_credential(&mut self, secret: Option<String>) -> Result<()> {
        match secret {
            Some(secret) => {
                let mut session = self.session.lock().await;
                if let Err(e) = self.use_case.set_credential(&mut session, &secret) {
                    print_error(&e);
                }
                Ok(())
            }
            None => self.prompt_credential().await,
        }
    }

    pub async fn run(&mut self) -> Result<()> {
        println!("{}", "=== Wahl-O-Mat ===".bright_magenta().bold());
        println!(
            "{}",
            "Type your question, '/help' for commands, or 'quit' to exit.".bright_black()
        );
        println!();
        self.print_welcome().await;

        loop {
            match self.editor.readline(">> ") {
                Ok(line) => {
                    let Some(command) = Command::parse(&line) else {
                        continue;
                    };
                    let _ = self.editor.add_history_entry(line.trim());

                    if self.dispatch(command).await? == Flow::Exit {
                        println!("{}", "Auf Wiedersehen!".bright_green());
                        break;
                    }
                }
                Err(ReadlineError::Interrupted) => {
                    println!("{}", "CTRL-C detected. Type 'quit' to exit.".yellow());
                }
                Err(ReadlineError::Eof) => {
                    println!("{}", "CTRL-D detected. Exiting...".bright_green());
                    break;
                }
                Err(err) => {
                    eprintln!("{}", format!("Error: {:?}", err).red());
                    break;
                }
            }
        }

        Ok(())
    }

    async fn dispatch(&mut self, command: Command) -> Result<Flow> {
        if command.needs_conversation() && self.session.lock().await.transcript().is_empty() {
            println!(
                "{}",
                "Ask a question first; this command becomes available after the first message."
                    .yellow()
            );
            return Ok(Flow::Continue);
        }

        match command {
            Command::Message(text) => self.send_message(&text).await,
            Command::Key => self.prompt_credential().await?,
            Command::Parties => self.print_parties().await,
            Command::Party(Some(name)) => {
                let mut session = self.session.lock().await;
                match self.use_case.select_party(&mut session, &name) {
                    Ok(()) => println!(
                        "{}",
                        format!("Partei ausgewählt: {}", session.selected_party()).green()
                    ),
                    Err(e) => print_error(&e),
                }
            }
            Command::Party(None) => {
                let session = self.session.lock().await;
                println!(
                    "{}",
                    format!("Ausgewählte Partei: {}", session.selected_party()).bright_black()
                );
                println!("{}", "Usage: /party <name>".bright_black());
            }
            Command::Analyze => self.request_analysis().await,
            Command::Compare => self.request_party_comparison().await,
            Command::History => self.print_history().await,
            Command::Outputs => self.print_outputs().await,
            Command::Clear => {
                {
                    let mut session = self.session.lock().await;
                    self.use_case.clear_session(&mut session);
                }
                self.helper.set_conversation_started(false);
                println!("{}", "Chat cleared!".bright_green());
                self.print_welcome().await;
            }
            Command::Help => self.print_help().await,
            Command::Quit => return Ok(Flow::Exit),
            Command::Unknown(name) => {
                println!(
                    "{}",
                    format!("Unknown command: {}. Type '/help' for commands.", name)
                        .bright_black()
                );
            }
        }

        Ok(Flow::Continue)
    }

    async fn prompt_credential(&mut self) -> Result<()> {
        let secret = match self.editor.readline(KEY_PROMPT) {
            Ok(secret) => secret,
            Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => String::new(),
            Err(err) => return Err(err.into()),
        };

        if secret.trim().is_empty() {
            println!(
                "{}",
                "No key entered. Use /key to set it before asking.".yellow()
            );
            return Ok(());
        }

        let mut session = self.session.lock().await;
        match self.use_case.set_credential(&mut session, &secret) {
            Ok(()) => println!("{}", "API key set.".green()),
            Err(e) => print_error(&e),
        }
        Ok(())
    }

    async fn send_message(&mut self, text: &str) {
        println!("{}", format!("> {}", text).green());

        let mut session = self.session.lock().await;
        let cancel = CancellationToken::new();
        let watcher = watch_interrupt(cancel.clone());
        let result = self.use_case.send_message(&mut session, text, &cancel).await;
        watcher.abort();

        // The user turn is in the transcript even when the request failed
        self.helper
            .set_conversation_started(!session.transcript().is_empty());

        match result {
            Ok(Some(reply)) => {
                print_reply(&reply);
                if session.completed_exchanges() == 1 {
                    println!("{}", FOLLOW_UP_TEXT.bright_black());
                    println!();
                }
            }
            Ok(None) => {}
            Err(e) => print_error(&e),
        }
    }

    async fn request_analysis(&mut self) {
        println!("{}", "Analysiere den Chatverlauf...".bright_black());

        let mut session = self.session.lock().await;
        let cancel = CancellationToken::new();
        let watcher = watch_interrupt(cancel.clone());
        let result = self.use_case.request_analysis(&mut session, &cancel).await;
        watcher.abort();

        match result {
            Ok(output) => {
                println!("{}", "[Analyse]".bright_magenta());
                print_reply(&output);
            }
            Err(e) => print_error(&e),
        }
    }

    async fn request_party_comparison(&mut self) {
        let mut session = self.session.lock().await;
        println!(
            "{}",
            format!("Vergleiche mit {}...", session.selected_party()).bright_black()
        );

        let cancel = CancellationToken::new();
        let watcher = watch_interrupt(cancel.clone());
        let result = self
            .use_case
            .request_party_comparison(&mut session, &cancel)
            .await;
        watcher.abort();

        match result {
            Ok(output) => {
                println!(
                    "{}",
                    format!("[Vergleich mit {}]", session.selected_party()).bright_magenta()
                );
                print_reply(&output);
            }
            Err(e) => print_error(&e),
        }
    }

    async fn print_welcome(&self) {
        let session = self.session.lock().await;
        if session.transcript().is_empty() {
            println!("{}", WELCOME_TEXT.bright_blue());
            println!();
        }
    }

    async fn print_parties(&self) {
        let session = self.session.lock().await;
        for party in self.use_case.party_catalog().parties() {
            if party == session.selected_party() {
                println!("{}", format!("* {}", party).green());
            } else {
                println!("  {}", party);
            }
        }
    }

    async fn print_history(&self) {
        let session = self.session.lock().await;
        if session.transcript().is_empty() {
            println!("{}", "No messages yet.".bright_black());
            return;
        }

        for message in session.transcript_newest_first() {
            match message.role {
                MessageRole::User => println!("{}", format!("You: {}", message.content).green()),
                MessageRole::Assistant => {
                    println!("{}", format!("Assistant: {}", message.content).bright_blue())
                }
            }
        }
    }

    async fn print_outputs(&self) {
        let session = self.session.lock().await;

        println!("{}", "[Analyse]".bright_magenta());
        match session.analysis_output() {
            Some(output) => print_reply(output),
            None => println!("{}", "(none)".bright_black()),
        }

        println!(
            "{}",
            format!("[Vergleich mit {}]", session.selected_party()).bright_magenta()
        );
        match session.comparison_output() {
            Some(output) => print_reply(output),
            None => println!("{}", "(none)".bright_black()),
        }
    }

    async fn print_help(&self) {
        let started = !self.session.lock().await.transcript().is_empty();

        println!("{}", "Commands:".bright_yellow());
        println!("  /key              set the OpenAI API key");
        println!("  /parties          list the parties");
        if started {
            println!("  /party <name>     select the party to compare with");
            println!("  /analyze          classify the chat against the party platforms");
            println!("  /compare          compare the chat with the selected party");
        }
        println!("  /history          show the chat, most recent first");
        println!("  /outputs          show the last analysis and comparison");
        println!("  /clear            clear the chat");
        println!("  quit | exit       leave");
        println!("  end a line with \\ to continue the message on the next line");
        if started {
            println!();
            println!("{}", FOLLOW_UP_TEXT.bright_black());
        }
    }
}

/// Cancels `cancel` when Ctrl-C arrives while a request is in flight.
///
/// The returned task must be aborted once the request is over.
fn watch_interrupt(cancel: CancellationToken) -> JoinHandle<()> {
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            println!("{}", "Cancelling request...".yellow());
            cancel.cancel();
        }
    })
}

fn print_reply(text: &str) {
    for line in text.lines() {
        println!("{}", line.bright_blue());
    }
    println!();
}

fn print_error(error: &WahlError) {
    if error.is_cancelled() {
        println!("{}", "Request cancelled.".yellow());
        return;
    }

    eprintln!("{}", format!("Error: {}", error).red());
    if let Some(hint) = error_hint(error) {
        eprintln!("{}", hint.yellow());
    }
}

/// What the user can do about `error`, if anything.
fn error_hint(error: &WahlError) -> Option<&'static str> {
    if error.is_credential_missing() {
        Some("Use /key to set your OpenAI API key.")
    } else if error.is_unauthorized() {
        Some("The API key was rejected. Use /key to enter another one.")
    } else if error.is_remote() {
        Some("The chat is unchanged; you can try again.")
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_hints() {
        assert!(error_hint(&WahlError::CredentialMissing).is_some_and(|h| h.contains("/key")));
        assert!(
            error_hint(&WahlError::remote_status(401, "bad key"))
                .is_some_and(|h| h.contains("rejected"))
        );
        assert!(error_hint(&WahlError::RunTimedOut { waited_secs: 120 }).is_some());
        assert_eq!(error_hint(&WahlError::InvalidParty("X".to_string())), None);
    }
}
