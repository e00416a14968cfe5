//! Local keyword responder used when the chat endpoint cannot be reached.
//!
//! Rules are tested in table order against the lower-cased input; the first match wins.

/// Which canned answer a message falls under.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FallbackTopic {
    Schedule,
    Venue,
    Teams,
    Host,
    Greeting,
    OutOfScope,
}

struct Rule {
    keywords: &'static [&'static str],
    topic: FallbackTopic,
}

// Order matters: "bonjour maroc" must resolve to Host, not Greeting.
const RULES: &[Rule] = &[
    Rule {
        keywords: &["date", "quand"],
        topic: FallbackTopic::Schedule,
    },
    Rule {
        keywords: &["stade", "où", "lieu"],
        topic: FallbackTopic::Venue,
    },
    Rule {
        keywords: &["équipe", "pays"],
        topic: FallbackTopic::Teams,
    },
    Rule {
        keywords: &["maroc"],
        topic: FallbackTopic::Host,
    },
    Rule {
        keywords: &["bonjour", "salut"],
        topic: FallbackTopic::Greeting,
    },
];

impl FallbackTopic {
    pub fn reply(self) -> &'static str {
        match self {
            FallbackTopic::Schedule => {
                "La CAN 2025 se déroulera du 21 décembre 2025 au 18 janvier 2026 🗓️"
            }
            FallbackTopic::Venue => {
                "Les matchs auront lieu dans 5 stades principaux : Casablanca, Rabat, Agadir, Marrakech 🏟️"
            }
            FallbackTopic::Teams => "24 équipes nationales participeront à la CAN 2025 🌍",
            FallbackTopic::Host => "Le Maroc accueille la CAN 2025 ! 🇲🇦👑",
            FallbackTopic::Greeting => "Bonjour ! Comment puis-je vous aider sur la CAN 2025 ? 🙌",
            FallbackTopic::OutOfScope => {
                "Je suis spécialisé dans la CAN 2025. Posez-moi vos questions ! ⚽"
            }
        }
    }
}

/// First rule whose keyword occurs in the lower-cased text, or `OutOfScope`.
pub fn classify(text: &str) -> FallbackTopic {
    let lowered = text.to_lowercase();
    RULES
        .iter()
        .find(|rule| rule.keywords.iter().any(|k| lowered.contains(k)))
        .map(|rule| rule.topic)
        .unwrap_or(FallbackTopic::OutOfScope)
}

/// Canned reply for `text`. Pure and deterministic.
pub fn local_reply(text: &str) -> String {
    classify(text).reply().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn schedule_question_matches_quand() {
        assert_eq!(classify("Quand commence la CAN?"), FallbackTopic::Schedule);
        assert_eq!(
            local_reply("Quand commence la CAN?"),
            FallbackTopic::Schedule.reply()
        );
    }

    #[test]
    fn team_count_question() {
        assert_eq!(
            classify("Combien d'équipes participent?"),
            FallbackTopic::Teams
        );
    }

    #[test]
    fn host_rule_precedes_greeting() {
        assert_eq!(classify("Bonjour Maroc"), FallbackTopic::Host);
        assert_eq!(local_reply("Bonjour Maroc"), "Le Maroc accueille la CAN 2025 ! 🇲🇦👑");
    }

    #[test]
    fn schedule_precedes_venue() {
        // "date" and "lieu" both present; rule 1 wins.
        assert_eq!(classify("date et lieu ?"), FallbackTopic::Schedule);
    }

    #[test]
    fn uppercase_accented_keywords_match() {
        assert_eq!(classify("OÙ JOUE-T-ON ?"), FallbackTopic::Venue);
        assert_eq!(classify("Quelle ÉQUIPE ?"), FallbackTopic::Teams);
        assert_eq!(classify("SALUT"), FallbackTopic::Greeting);
    }

    #[test]
    fn unmatched_text_is_out_of_scope() {
        assert_eq!(classify("What about basketball?"), FallbackTopic::OutOfScope);
        assert_eq!(classify(""), FallbackTopic::OutOfScope);
    }

    #[test]
    fn repeated_calls_agree() {
        for text in ["Bonjour", "stade", "pays", "rien", "Quand ?"] {
            assert_eq!(local_reply(text), local_reply(text));
        }
    }
}
