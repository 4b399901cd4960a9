//! Texts sent to the assistants and shown to the user.

use crate::party::Party;

/// Shown while the transcript is still empty.
pub const WELCOME_TEXT: &str = "\
Herzlich willkommen beim Wahl-O-Mat!
Ihre Stimme zählt! Bei der Bundestagswahl geht es um die Zukunft unseres Landes – und Ihre \
Meinung macht den Unterschied. Der Wahl-O-Mat hilft Ihnen dabei, Ihre Überzeugungen mit den \
Positionen der Parteien zu vergleichen. Einfach, interaktiv und individuell.

Durch die Beantwortung spannender Fragen zu verschiedenen Themenbereichen erhalten Sie eine \
klare Orientierung. Entdecken Sie, welche Parteien Ihre Ansichten teilen und treffen Sie eine \
informierte Wahlentscheidung.

Lassen Sie uns gemeinsam starten: Welche Themen sind Ihnen besonders wichtig?";

/// Shown once the first exchange is in the transcript.
pub const FOLLOW_UP_TEXT: &str = "Haben Sie Lust, ein neues Thema zu besprechen? Kein Problem – \
schlagen Sie einfach ein neues Thema vor oder lassen Sie sich inspirieren!";

/// One completed exchange in the flattened chat history.
pub fn history_block(user_message: &str, assistant_reply: &str) -> String {
    format!("User: {user_message}\nAssistant: {assistant_reply}\n")
}

/// Message sent to the party comparison assistant.
pub fn party_comparison_prompt(chat_history: &str, party: &Party) -> String {
    format!(
        "Das ist die Position:\n{chat_history}\n\
         Bitte ordnen Sie diese Position ein und vergleichen Sie diese Position mit dem \
         Wahlprogramm von {party}."
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::party::PartyCatalog;

    #[test]
    fn test_history_block_format() {
        assert_eq!(
            history_block("Climate policy?", "Climate is important"),
            "User: Climate policy?\nAssistant: Climate is important\n"
        );
    }

    #[test]
    fn test_party_comparison_prompt() {
        let party = PartyCatalog::default().resolve("SPD").unwrap();
        let prompt = party_comparison_prompt("User: a\nAssistant: b\n", &party);
        assert_eq!(
            prompt,
            "Das ist die Position:\nUser: a\nAssistant: b\n\n\
             Bitte ordnen Sie diese Position ein und vergleichen Sie diese Position mit dem \
             Wahlprogramm von SPD."
        );
    }
}
