mod common;

use common::{reply, segment, server_error, ScriptedBackend};
use std::sync::Arc;
use ytachunker_client::{
    ChatSession, HistoryStore, Language, MemoryStorage, RequestOrchestrator, ResultModel, Role,
    FALLBACK_REPLY,
};

fn result() -> ResultModel {
    ResultModel::Segments(vec![
        segment("s/chunk_1.wav", 0.0, 10.0, "intro"),
        segment("s/chunk_2.wav", 10.0, 20.0, "body"),
    ])
}

#[tokio::test]
async fn test_overlapping_queries_keep_order_and_match_by_id() {
    let backend = Arc::new(
        ScriptedBackend::default()
            .with_reply(Ok(reply("first answer", Some(1.0), Some(2.0))))
            .with_reply(Ok(reply("second answer", Some(12.0), Some(15.0)))),
    );
    let mut session = ChatSession::open(backend, &result()).unwrap();

    session.set_input("a");
    let a = session.dispatch().unwrap();
    session.set_input("b");
    let b = session.dispatch().unwrap();
    assert!(session.is_sending());

    let query_a = session.query(&a);
    let query_b = session.query(&b);

    // Both user entries are visible before any reply arrives
    let roles: Vec<_> = session.messages().iter().map(|m| m.role).collect();
    assert_eq!(roles, vec![Role::User, Role::User]);
    assert_eq!(session.messages()[0].content, "a");
    assert_eq!(session.messages()[1].content, "b");

    // b's reply is settled first, as if it arrived first
    let outcome_a = query_a.await;
    let outcome_b = query_b.await;
    session.resolve(b.id, outcome_b);
    session.resolve(a.id, outcome_a);

    let messages = session.messages();
    assert_eq!(messages.len(), 4);
    assert_eq!(messages[2].role, Role::Assistant);
    assert_eq!(messages[2].reply_to, Some(b.id));
    assert_eq!(messages[3].role, Role::Assistant);
    assert_eq!(messages[3].reply_to, Some(a.id));
    assert!(!session.is_sending());

    let answer_to_a = messages.iter().find(|m| m.reply_to == Some(a.id)).unwrap();
    let answer_to_b = messages.iter().find(|m| m.reply_to == Some(b.id)).unwrap();
    assert_eq!(answer_to_a.content, "first answer");
    assert_eq!(answer_to_b.content, "second answer");
    assert_eq!(
        session.attributed_segment(answer_to_b).map(|(row, _)| row),
        Some(1)
    );
}

#[tokio::test]
async fn test_failed_query_appends_fallback_and_clears_input() {
    let backend = Arc::new(ScriptedBackend::default().with_reply(Err(server_error())));
    let mut session = ChatSession::open(backend, &result()).unwrap();

    let message = session.send("what happens?").await.cloned().unwrap();

    assert_eq!(message.role, Role::Assistant);
    assert_eq!(message.content, FALLBACK_REPLY);
    assert_eq!(message.start_time, None);
    assert_eq!(message.end_time, None);
    assert_eq!(session.messages().len(), 2);
    assert_eq!(session.input(), "");
    assert!(!session.is_sending());
}

#[tokio::test]
async fn test_failure_does_not_clear_thread() {
    let backend = Arc::new(
        ScriptedBackend::default()
            .with_reply(Ok(reply("ok", None, None)))
            .with_reply(Err(server_error())),
    );
    let mut session = ChatSession::open(backend.clone(), &result()).unwrap();

    session.send("one").await;
    session.send("two").await;
    assert!(session.send("   ").await.is_none());

    let contents: Vec<_> = session
        .messages()
        .iter()
        .map(|m| m.content.as_str())
        .collect();
    assert_eq!(contents, vec!["one", "ok", "two", FALLBACK_REPLY]);

    let sent: Vec<_> = backend
        .chat_requests
        .lock()
        .unwrap()
        .iter()
        .map(|r| r.user_message.clone())
        .collect();
    assert_eq!(sent, vec!["one", "two"]);
}

#[tokio::test]
async fn test_reopening_chat_starts_a_fresh_thread() {
    let storage = MemoryStorage::new();
    let backend = Arc::new(
        ScriptedBackend::default()
            .with_job(Ok(vec![segment("s/chunk_1.wav", 0.0, 5.0, "x")]))
            .with_reply(Ok(reply("answer", Some(0.0), Some(5.0)))),
    );
    let mut orchestrator = RequestOrchestrator::new(backend, HistoryStore::load(&storage));
    orchestrator
        .submit("https://youtu.be/abc", false, Language::En)
        .await;

    let mut session = orchestrator.open_chat().unwrap();
    session.send("question").await;
    assert_eq!(session.messages().len(), 2);
    session.close();
    drop(session);

    let session = orchestrator.open_chat().unwrap();
    assert!(session.messages().is_empty());
}
