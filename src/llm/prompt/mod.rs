#[cfg(test)]
mod tests;

use itertools::Itertools;

use crate::llm::ChatMessage;
use crate::retrieval::RankedChunk;
use crate::session::Turn;

pub const DEFAULT_SYSTEM_PROMPT: &str = "You are a renovation and construction consultant. \
Answer using the knowledge base fragments provided with each question when they are relevant, \
and cite building norms from them where possible. If the fragments do not cover the question, \
say so and answer from general knowledge. Reply in the language of the question.";

const NO_CONTEXT_NOTICE: &str =
    "No relevant fragments were found in the knowledge base for this question.";

/// Assemble the conversation sent to the model
///
/// The system prompt comes first, then past turns, then the question with its context.
#[inline]
pub fn build_messages(
    system_prompt: &str,
    history: &[Turn],
    context: &[RankedChunk],
    question: &str,
) -> Vec<ChatMessage> {
    let mut messages = Vec::with_capacity(history.len() * 2 + 2);
    messages.push(ChatMessage::system(system_prompt));

    for turn in history {
        messages.push(ChatMessage::user(turn.question.as_str()));
        messages.push(ChatMessage::assistant(turn.answer.as_str()));
    }

    let user_message = if context.is_empty() {
        format!("{NO_CONTEXT_NOTICE}\n\nQuestion: {question}")
    } else {
        format!(
            "Knowledge base fragments:\n\n{}\n\nQuestion: {question}",
            format_context(context)
        )
    };
    messages.push(ChatMessage::user(user_message));

    messages
}

/// Number the fragments as `[1] ...`, separated by blank lines
#[inline]
pub fn format_context(context: &[RankedChunk]) -> String {
    context
        .iter()
        .enumerate()
        .map(|(i, chunk)| format!("[{}] {}", i + 1, chunk.text))
        .join("\n\n")
}
