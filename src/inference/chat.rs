//! Conversation composition, chat-format rendering, and reply extraction.
//!
//! Every request produces the same two-turn shape: the fixed system
//! instruction followed by the raw user question. The turns are rendered in
//! the Llama 3 header format with a generation-start marker appended, and the
//! assistant's reply is recovered from the decoded output by splitting on the
//! literal role word.

use std::fmt;

use serde::{Deserialize, Serialize};

/// The fixed system instruction applied to every request.
pub const SYSTEM_PROMPT: &str = "You are an AI Medical Assistant trained on a vast dataset of \
health and mental health information. Please be thorough and provide an informative answer. \
If you don't know the answer to a specific medical inquiry, advise seeking professional help. \
Do not be much creative.";

/// Marker preceding the model's reply in the rendered chat format.
///
/// Extraction splits on this literal, so it breaks if the reply's own text
/// ends with a stray "assistant" in a misleading position. Known limitation
/// of marker-based extraction; the no-marker fallback is covered by tests.
pub const ANSWER_MARKER: &str = "assistant";

/// Generation-start suffix: an opened assistant turn the model completes.
pub const GENERATION_PROMPT: &str = "<|start_header_id|>assistant<|end_header_id|>\n\n";

/// Speaker role of a conversation turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::System => write!(f, "system"),
            Role::User => write!(f, "user"),
        }
    }
}

/// A role paired with free-text content.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversationTurn {
    pub role: Role,
    pub content: String,
}

/// Build the two-turn conversation for a question.
///
/// The question is carried verbatim — no validation, no truncation; empty
/// and arbitrarily long strings compose fine.
pub fn conversation_for(question: &str) -> Vec<ConversationTurn> {
    vec![
        ConversationTurn {
            role: Role::System,
            content: SYSTEM_PROMPT.to_string(),
        },
        ConversationTurn {
            role: Role::User,
            content: question.to_string(),
        },
    ]
}

/// Render conversation turns into a single prompt string in the Llama 3
/// header format, with the generation-start marker appended.
///
/// The result carries its own begin-of-text token; encode it without adding
/// special tokens a second time.
pub fn render_prompt(turns: &[ConversationTurn]) -> String {
    let mut prompt = String::from("<|begin_of_text|>");
    for turn in turns {
        prompt.push_str("<|start_header_id|>");
        prompt.push_str(&turn.role.to_string());
        prompt.push_str("<|end_header_id|>\n\n");
        prompt.push_str(&turn.content);
        prompt.push_str("<|eot_id|>");
    }
    prompt.push_str(GENERATION_PROMPT);
    prompt
}

/// Extract the assistant's reply from the full decoded output.
///
/// Takes everything after the last occurrence of [`ANSWER_MARKER`], trimmed.
/// When the marker is absent the whole trimmed text is returned unchanged.
pub fn extract_answer(decoded: &str) -> String {
    let text = decoded.trim();
    text.rsplit(ANSWER_MARKER)
        .next()
        .unwrap_or(text)
        .trim()
        .to_string()
}
