//! Rule-based query guardrail.
//!
//! Best-effort keyword screening applied before retrieval and generation.
//! It is not a security boundary: paraphrases slip through.

use std::sync::LazyLock;

use regex::Regex;
use tracing::info;

/// Answer given instead of calling the model when a query is rejected.
pub const FALLBACK_MESSAGE: &str = "I'm sorry, but I can't help with that request. \
     Please ask a question about the documents in the knowledge base.";

/// Ordered `(pattern, reason)` table; the first match decides.
///
/// Patterns anchor on a word start and accept inflected endings
/// ("illegally", "hates", "suicides"). Stems that are prefixes of unrelated
/// words ("hat", "bomb") list their endings instead.
const RULES: &[(&str, &str)] = &[
    (r"^\s*$", "empty query"),
    (r"(?i)\billegal\w*", "illegal activity"),
    (r"(?i)\bviolen(?:ce|t)\w*", "violence"),
    (r"(?i)\bhat(?:e[sdr]?s?|eful(?:ly|ness)?|red|ing)\b", "hate"),
    (r"(?i)\bself[\s-]?harm\w*|\bsuicid\w*", "self-harm"),
    (r"(?i)\bexplicit\w*", "explicit content"),
    (
        r"(?i)\b(?:weapon(?:s|ry|ize[sd]?)?|bomb(?:s|ed|er|ers|ing)?|explosives?)\b",
        "weapons",
    ),
];

static COMPILED: LazyLock<Vec<(Regex, &'static str)>> = LazyLock::new(|| {
    RULES
        .iter()
        .map(|(pattern, reason)| (Regex::new(pattern).expect("static safety rule"), *reason))
        .collect()
});

/// Outcome of screening one query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SafetyVerdict {
    Allowed,
    Rejected {
        /// Name of the rule that matched.
        reason: &'static str,
        /// Message to show instead of an answer.
        fallback: &'static str,
    },
}

impl SafetyVerdict {
    #[must_use]
    pub fn is_allowed(&self) -> bool {
        matches!(self, Self::Allowed)
    }
}

/// Screen `query` against the rule table.
pub fn check(query: &str) -> SafetyVerdict {
    match COMPILED.iter().find(|(re, _)| re.is_match(query)) {
        Some((_, reason)) => {
            info!(reason, "Query rejected by safety rule");
            SafetyVerdict::Rejected {
                reason,
                fallback: FALLBACK_MESSAGE,
            }
        }
        None => SafetyVerdict::Allowed,
    }
}
