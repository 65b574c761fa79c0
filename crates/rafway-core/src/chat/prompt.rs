//! Fixed texts and request assembly for the Raf persona.

use rafway_types::chat::{HistoryEntry, Sender};
use rafway_types::config::GenerationConfig;
use rafway_types::llm::{CompletionRequest, Message};

/// Persona instruction used by interactive chat sessions.
pub const PERSONA_PROMPT: &str = "Tu es \"Raf\", un conseiller d'orientation expert de l'agence \"Raf Advisory\".
Ton public cible sont des adolescents de 15 à 20 ans.
Ton ton doit être :
1. Empathique et encourageant (pas de jugement).
2. Dynamique et moderne (tu peux utiliser des emojis avec parcimonie).
3. Structuré et expert (tu guides vers des solutions concrètes).

Ta mission est d'aider l'utilisateur à trouver sa voie scolaire et professionnelle.";

/// Shorter instruction used by the server-side exchange.
pub const SERVER_PROMPT: &str =
    "Tu es expert Raf Advisory. Tu aides les ados à s'orienter. Sois concis et utile.";

/// Assistant text appended when generation fails.
pub const FALLBACK_REPLY: &str = "Oups, j'ai eu un petit bug de connexion. Réessaie stp !";

/// Assistant text appended when generation succeeds with no text.
pub const NO_REPLY_TEXT: &str = "Désolé, je n'ai pas pu générer de réponse.";

/// Returned by the server-side exchange once the free quota is spent.
pub const QUOTA_EXCEEDED_MESSAGE: &str = "Limite de messages atteinte. Passez en Premium.";

/// Shown in place of the input box while the paywall is up.
pub const PAYWALL_MESSAGE: &str = "Tu as atteint la limite de la version gratuite. Passe en Premium pour continuer à discuter avec Raf et débloquer ton bilan complet.";

/// Opening assistant message of every session.
pub fn greeting(first_name: Option<&str>) -> String {
    let name = first_name.unwrap_or("l'ami");
    format!(
        "Salut {name} ! 👋 Je suis Raf, ton coach d'orientation.\n\
         Dis-moi, qu'est-ce qui te passionne dans la vie ou quelles matières tu préfères à l'école ?"
    )
}

/// Generation knobs taken from `[generation]` in config.toml.
#[derive(Debug, Clone, Default)]
pub struct PromptOptions {
    pub include_history: bool,
    pub temperature: Option<f64>,
    pub max_tokens: Option<u32>,
}

impl From<&GenerationConfig> for PromptOptions {
    fn from(config: &GenerationConfig) -> Self {
        Self {
            include_history: config.include_history,
            temperature: config.temperature,
            max_tokens: config.max_output_tokens,
        }
    }
}

/// Build a completion request from prior turns and the new user text.
///
/// `history` is ignored unless `options.include_history` is set. Leading
/// assistant turns are skipped so the conversation always opens with the user.
pub fn build_request(
    system: &str,
    history: &[HistoryEntry],
    text: &str,
    options: &PromptOptions,
) -> CompletionRequest {
    let mut messages: Vec<Message> = Vec::new();
    if options.include_history {
        messages.extend(
            history
                .iter()
                .skip_while(|entry| entry.sender == Sender::Assistant)
                .map(|entry| Message {
                    role: entry.sender.into(),
                    content: entry.text.clone(),
                }),
        );
    }
    messages.push(Message::user(text));

    CompletionRequest {
        model: String::new(),
        messages,
        system: Some(system.to_string()),
        max_tokens: options.max_tokens,
        temperature: options.temperature,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rafway_types::llm::MessageRole;

    fn history() -> Vec<HistoryEntry> {
        vec![
            HistoryEntry {
                sender: Sender::Assistant,
                text: greeting(None),
            },
            HistoryEntry {
                sender: Sender::User,
                text: "J'aime le dessin".into(),
            },
            HistoryEntry {
                sender: Sender::Assistant,
                text: "Super !".into(),
            },
        ]
    }

    #[test]
    fn test_greeting_uses_first_name() {
        assert!(greeting(Some("Léa")).starts_with("Salut Léa ! 👋"));
        assert!(greeting(None).starts_with("Salut l'ami !"));
    }

    #[test]
    fn test_build_request_newest_message_only_by_default() {
        let request = build_request(PERSONA_PROMPT, &history(), "Et le code ?", &PromptOptions::default());
        assert_eq!(request.messages.len(), 1);
        assert_eq!(request.messages[0].content, "Et le code ?");
        assert_eq!(request.system.as_deref(), Some(PERSONA_PROMPT));
        assert!(request.model.is_empty());
    }

    #[test]
    fn test_build_request_with_history_skips_leading_greeting() {
        let options = PromptOptions {
            include_history: true,
            ..Default::default()
        };
        let request = build_request(SERVER_PROMPT, &history(), "Et le code ?", &options);
        let roles: Vec<MessageRole> = request.messages.iter().map(|m| m.role).collect();
        assert_eq!(
            roles,
            vec![MessageRole::User, MessageRole::Assistant, MessageRole::User]
        );
        assert_eq!(request.messages[2].content, "Et le code ?");
    }

    #[test]
    fn test_prompt_options_from_config() {
        let config = GenerationConfig {
            include_history: true,
            temperature: Some(0.2),
            max_output_tokens: Some(512),
            ..Default::default()
        };
        let options = PromptOptions::from(&config);
        assert!(options.include_history);
        assert_eq!(options.max_tokens, Some(512));
    }
}
