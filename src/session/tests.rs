use super::*;
use chrono::TimeZone;

fn start() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 3, 1, 12, 0, 0)
        .single()
        .expect("valid timestamp")
}

fn store() -> SessionStore {
    SessionStore::new(TimeDelta::minutes(30), 3)
}

#[test]
fn session_id_conversions() {
    assert_eq!(SessionId::from(364_191_893_i64).as_str(), "364191893");
    assert_eq!(SessionId::from("chat-7").to_string(), "chat-7");
    assert_eq!(SessionId::from(String::from("x")), SessionId::new("x"));
    assert_ne!(SessionId::generate(), SessionId::generate());
}

#[test]
fn unknown_session_has_no_history() {
    let store = store();

    assert!(store.history(&SessionId::from("nobody")).is_empty());
    assert!(store.is_empty());
}

#[test]
fn turns_are_recorded_in_order() {
    let store = store();
    let id = SessionId::from(42_i64);
    let now = start();

    store.record_at(&id, "Чем выровнять стены?", "Штукатуркой.", now);
    store.record_at(&id, "А плитку?", "На клей.", now + TimeDelta::minutes(1));

    let history = store.history_at(&id, now + TimeDelta::minutes(2));
    assert_eq!(history.len(), 2);
    assert_eq!(history[0].question, "Чем выровнять стены?");
    assert_eq!(history[1].answer, "На клей.");
    assert_eq!(history[1].at, now + TimeDelta::minutes(1));
}

#[test]
fn history_is_bounded() {
    let store = store();
    let id = SessionId::from("bounded");
    let now = start();

    for i in 0..5 {
        store.record_at(&id, &format!("q{i}"), &format!("a{i}"), now);
    }

    let questions = store
        .history_at(&id, now)
        .into_iter()
        .map(|t| t.question)
        .collect::<Vec<_>>();
    assert_eq!(questions, vec!["q2", "q3", "q4"]);
}

#[test]
fn zero_turn_limit_keeps_no_history() {
    let store = SessionStore::new(TimeDelta::minutes(30), 0);
    let id = SessionId::from("forgetful");

    store.record_at(&id, "q", "a", start());

    assert!(store.history_at(&id, start()).is_empty());
    assert_eq!(store.len(), 1);
}

#[test]
fn idle_sessions_expire() {
    let store = store();
    let id = SessionId::from("idle");
    let now = start();

    store.record_at(&id, "q", "a", now);

    assert_eq!(store.history_at(&id, now + TimeDelta::minutes(30)).len(), 1);
    assert!(store.history_at(&id, now + TimeDelta::minutes(31)).is_empty());
    assert!(store.is_empty(), "expired session should be evicted on read");
}

#[test]
fn recording_into_expired_session_starts_fresh() {
    let store = store();
    let id = SessionId::from("stale");
    let now = start();

    store.record_at(&id, "old", "old", now);
    let later = now + TimeDelta::hours(2);
    store.record_at(&id, "new", "new", later);

    let history = store.history_at(&id, later);
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].question, "new");
}

#[test]
fn activity_extends_lifetime() {
    let store = store();
    let id = SessionId::from("active");
    let now = start();

    store.record_at(&id, "q1", "a1", now);
    store.record_at(&id, "q2", "a2", now + TimeDelta::minutes(25));

    assert_eq!(store.history_at(&id, now + TimeDelta::minutes(50)).len(), 2);
}

#[test]
fn end_removes_session() {
    let store = store();
    let id = SessionId::from("cancel");

    store.record(&id, "q", "a");

    assert!(store.end(&id));
    assert!(!store.end(&id));
    assert!(store.history(&id).is_empty());
}

#[test]
fn purge_removes_only_expired_sessions() {
    let store = store();
    let now = start();

    store.record_at(&SessionId::from("old-1"), "q", "a", now);
    store.record_at(&SessionId::from("old-2"), "q", "a", now);
    store.record_at(&SessionId::from("fresh"), "q", "a", now + TimeDelta::minutes(40));

    let removed = store.purge_expired_at(now + TimeDelta::minutes(45));

    assert_eq!(removed, 2);
    assert_eq!(store.len(), 1);
    assert_eq!(
        store
            .history_at(&SessionId::from("fresh"), now + TimeDelta::minutes(45))
            .len(),
        1
    );
}

#[test]
fn config_conversion() {
    let store = SessionStore::from_config(&SessionConfig {
        ttl_minutes: 90,
        max_turns: 7,
    });

    assert_eq!(store.ttl(), TimeDelta::minutes(90));
    assert_eq!(store.max_turns(), 7);

    let default = SessionStore::default();
    assert_eq!(default.ttl(), TimeDelta::minutes(30));
    assert_eq!(default.max_turns(), 5);
}
