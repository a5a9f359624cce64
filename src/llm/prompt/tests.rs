use super::*;
use crate::llm::Role;
use chrono::Utc;

fn chunk(text: &str, score: f64) -> RankedChunk {
    RankedChunk {
        text: text.to_string(),
        score,
    }
}

#[test]
fn context_is_numbered() {
    let context = vec![
        chunk("Стены можно выровнять штукатуркой.", 0.6),
        chunk("Плитка крепится на клей.", 0.3),
    ];

    assert_eq!(
        format_context(&context),
        "[1] Стены можно выровнять штукатуркой.\n\n[2] Плитка крепится на клей."
    );
    assert_eq!(format_context(&[]), "");
}

#[test]
fn messages_without_history() {
    let context = vec![chunk("Электрика требует отдельного автомата.", 0.4)];
    let messages = build_messages("system text", &[], &context, "Нужен ли автомат?");

    assert_eq!(messages.len(), 2);
    assert_eq!(messages[0], ChatMessage::system("system text"));
    assert_eq!(messages[1].role, Role::User);
    assert!(messages[1].content.contains("[1] Электрика требует отдельного автомата."));
    assert!(messages[1].content.ends_with("Question: Нужен ли автомат?"));
}

#[test]
fn history_is_replayed_before_question() {
    let history = vec![Turn {
        question: "Чем выровнять стены?".to_string(),
        answer: "Штукатуркой.".to_string(),
        at: Utc::now(),
    }];

    let messages = build_messages(DEFAULT_SYSTEM_PROMPT, &history, &[], "А потолок?");

    let roles = messages.iter().map(|m| m.role).collect::<Vec<_>>();
    assert_eq!(
        roles,
        vec![Role::System, Role::User, Role::Assistant, Role::User]
    );
    assert_eq!(messages[1].content, "Чем выровнять стены?");
    assert_eq!(messages[2].content, "Штукатуркой.");
}

#[test]
fn missing_context_is_stated() {
    let messages = build_messages(DEFAULT_SYSTEM_PROMPT, &[], &[], "сварка труб");
    let last = messages.last().expect("question message should exist");

    assert!(last.content.starts_with(NO_CONTEXT_NOTICE));
    assert!(!last.content.contains("[1]"));
    assert!(last.content.ends_with("Question: сварка труб"));
}
