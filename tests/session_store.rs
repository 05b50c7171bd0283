use nexora::models::{Message, Role};
use nexora::session::{ChatStore, FilesystemStorage, MemoryStorage, StateStorage};
use nexora::NexoraError;
use std::sync::Arc;
use tempfile::TempDir;

fn memory_store() -> (ChatStore, Arc<MemoryStorage>) {
    let storage = Arc::new(MemoryStorage::new());
    (ChatStore::empty(storage.clone()), storage)
}

fn assert_current_resolves(store: &ChatStore) {
    if let Some(id) = store.current_session_id() {
        assert!(
            store.session(id).is_some(),
            "current session {} is not in the store",
            id
        );
    }
}

#[test]
fn test_create_new_session_prepends_and_selects() {
    let (mut store, _) = memory_store();
    let first = store.create_new_session().unwrap();
    let second = store.create_new_session().unwrap();

    assert_ne!(first, second);
    assert_eq!(store.sessions().len(), 2);
    assert_eq!(store.sessions()[0].id, second);
    assert_eq!(store.sessions()[1].id, first);
    assert_eq!(store.current_session_id(), Some(second.as_str()));
}

#[test]
fn test_current_id_always_resolves() {
    let (mut store, _) = memory_store();
    for i in 0..20 {
        if i % 3 == 0 {
            store.create_new_session().unwrap();
        } else {
            store.add_message(Message::user(format!("message {}", i))).unwrap();
        }
        assert_current_resolves(&store);
    }
    assert_eq!(store.sessions().len(), 7);
}

#[test]
fn test_add_message_without_session_creates_exactly_one() {
    let (mut store, _) = memory_store();
    assert!(store.current_session_id().is_none());

    let id = store.add_message(Message::user("hello")).unwrap();

    assert_eq!(store.sessions().len(), 1);
    let session = store.current_session().unwrap();
    assert_eq!(session.id, id);
    assert_eq!(session.messages.len(), 1);
    assert_eq!(session.messages[0].content, "hello");
}

#[test]
fn test_add_message_keeps_insertion_order_and_bumps_updated_at() {
    let (mut store, _) = memory_store();
    let id = store.create_new_session().unwrap();
    let created = store.session(&id).unwrap().updated_at;

    std::thread::sleep(std::time::Duration::from_millis(5));
    store.add_message(Message::user("one")).unwrap();
    store.add_message(Message::assistant("two")).unwrap();
    store.add_message(Message::user("one")).unwrap();

    let session = store.session(&id).unwrap();
    let contents: Vec<&str> = session.messages.iter().map(|m| m.content.as_str()).collect();
    assert_eq!(contents, vec!["one", "two", "one"]);
    assert!(session.updated_at > created);
}

#[test]
fn test_title_derived_from_long_first_user_message() {
    let (mut store, _) = memory_store();
    let content = "Explain how the borrow checker reasons about lifetimes in async code";
    assert!(content.chars().count() > 50);

    store.add_message(Message::user(content)).unwrap();
    store.add_message(Message::assistant("Sure.")).unwrap();
    store.add_message(Message::user("A different question entirely")).unwrap();

    let title = store.current_session().unwrap().title.clone().unwrap();
    let expected: String = content.chars().take(50).collect();
    assert_eq!(title, format!("{}...", expected));
}

#[test]
fn test_rename_is_not_overwritten_by_messages() {
    let (mut store, _) = memory_store();
    let id = store.create_new_session().unwrap();
    assert!(store.update_session_title(&id, "Trip plans").unwrap());

    store.add_message(Message::user("where should we go?")).unwrap();

    assert_eq!(store.session(&id).unwrap().title.as_deref(), Some("Trip plans"));
}

#[test]
fn test_update_title_unknown_id_is_noop() {
    let (mut store, _) = memory_store();
    store.create_new_session().unwrap();
    assert!(!store.update_session_title("missing", "x").unwrap());
    assert!(store.sessions()[0].title.is_none());
}

#[test]
fn test_switch_session_unknown_id_is_noop() {
    let (mut store, _) = memory_store();
    let first = store.create_new_session().unwrap();
    let second = store.create_new_session().unwrap();

    assert!(store.switch_session(&first).unwrap());
    assert_eq!(store.current_session_id(), Some(first.as_str()));

    assert!(!store.switch_session("session_0_nothing").unwrap());
    assert_eq!(store.current_session_id(), Some(first.as_str()));
    assert!(store.session(&second).is_some());
}

#[test]
fn test_delete_current_session_repoints_to_first_remaining() {
    let (mut store, _) = memory_store();
    let a = store.create_new_session().unwrap();
    let b = store.create_new_session().unwrap();
    let c = store.create_new_session().unwrap();
    // order is now [c, b, a]
    store.switch_session(&b).unwrap();

    assert!(store.delete_session(&b).unwrap());
    assert_eq!(store.current_session_id(), Some(c.as_str()));
    assert_current_resolves(&store);

    assert!(store.delete_session(&c).unwrap());
    assert_eq!(store.current_session_id(), Some(a.as_str()));

    assert!(store.delete_session(&a).unwrap());
    assert!(store.current_session_id().is_none());
    assert!(store.sessions().is_empty());
}

#[test]
fn test_delete_other_session_keeps_current() {
    let (mut store, _) = memory_store();
    let a = store.create_new_session().unwrap();
    let b = store.create_new_session().unwrap();

    assert!(store.delete_session(&a).unwrap());
    assert_eq!(store.current_session_id(), Some(b.as_str()));
    assert!(!store.delete_session(&a).unwrap());
}

#[test]
fn test_clear_all_chats() {
    let (mut store, storage) = memory_store();
    store.add_message(Message::user("one")).unwrap();
    store.create_new_session().unwrap();

    store.clear_all_chats().unwrap();

    assert!(store.sessions().is_empty());
    assert!(store.current_session_id().is_none());
    assert!(store.current_session().is_none());

    let reopened = ChatStore::open(storage).unwrap();
    assert!(reopened.sessions().is_empty());
    assert!(reopened.current_session_id().is_none());
}

#[test]
fn test_failed_write_keeps_in_memory_state() {
    let (mut store, storage) = memory_store();
    store.add_message(Message::user("saved")).unwrap();
    let saved = storage.contents().unwrap();

    storage.set_fail_writes(true);
    let err = store.add_message(Message::assistant("not saved")).unwrap_err();
    assert!(matches!(err, NexoraError::PersistenceError(_)));

    let session = store.current_session().unwrap();
    assert_eq!(session.messages.len(), 2);
    assert_eq!(session.messages[1].role, Role::Assistant);
    assert_eq!(storage.contents().unwrap(), saved);

    storage.set_fail_writes(false);
    store.add_message(Message::user("saved again")).unwrap();
    let reopened = ChatStore::open(storage).unwrap();
    assert_eq!(reopened.current_session().unwrap().messages.len(), 3);
}

#[test]
fn test_recent_messages_window() {
    let (mut store, _) = memory_store();
    for i in 0..20 {
        store.add_message(Message::user(format!("m{}", i))).unwrap();
    }

    let recent = store.recent_messages(16);
    assert_eq!(recent.len(), 16);
    assert_eq!(recent[0].content, "m4");
    assert_eq!(recent[15].content, "m19");
    assert_eq!(store.recent_messages(100).len(), 20);
}

#[test]
fn test_filesystem_storage_round_trip() {
    let temp_dir = TempDir::new().unwrap();
    let storage = Arc::new(FilesystemStorage::new(
        temp_dir.path().join("nested"),
        "nexora-chat-store",
    ));
    assert!(storage.load().unwrap().is_none());

    let mut store = ChatStore::empty(storage.clone());
    store.add_message(Message::user("persist me")).unwrap();
    assert!(storage.path().exists());
    assert!(storage
        .path()
        .ends_with("nested/nexora-chat-store.json"));

    let reopened = ChatStore::open(storage.clone()).unwrap();
    assert_eq!(
        reopened.current_session().unwrap().messages[0].content,
        "persist me"
    );

    storage.clear().unwrap();
    assert!(!storage.path().exists());
}

#[test]
fn test_open_corrupt_blob_reports_persistence_error() {
    let temp_dir = TempDir::new().unwrap();
    let storage = Arc::new(FilesystemStorage::new(temp_dir.path(), "nexora-chat-store"));
    storage.save("{ not json").unwrap();

    let result = ChatStore::open(storage.clone());
    assert!(matches!(result, Err(NexoraError::PersistenceError(_))));

    // Degraded mode: an empty store over the same slot still works
    let mut store = ChatStore::empty(storage.clone());
    store.add_message(Message::user("fresh start")).unwrap();
    assert!(ChatStore::open(storage).is_ok());
}

#[test]
fn test_concurrent_saves_on_same_key_all_succeed() {
    let temp_dir = TempDir::new().unwrap();
    let dir = temp_dir.path().to_path_buf();

    let writers: Vec<_> = ["first", "second"]
        .into_iter()
        .map(|name| {
            let storage = FilesystemStorage::new(dir.clone(), "nexora-chat-store");
            std::thread::spawn(move || {
                let mut failures = 0;
                for i in 0..20 {
                    let blob = format!("{{\"writer\":\"{}\",\"round\":{}}}", name, i);
                    if storage.save(&blob).is_err() {
                        failures += 1;
                    }
                }
                failures
            })
        })
        .collect();

    let failures: usize = writers.into_iter().map(|w| w.join().unwrap()).sum();
    assert_eq!(failures, 0);

    let storage = FilesystemStorage::new(dir.clone(), "nexora-chat-store");
    let last: serde_json::Value = serde_json::from_str(&storage.load().unwrap().unwrap()).unwrap();
    assert_eq!(last["round"], 19);

    let leftovers: Vec<_> = std::fs::read_dir(&dir)
        .unwrap()
        .map(|entry| entry.unwrap().file_name())
        .filter(|name| name != "nexora-chat-store.json")
        .collect();
    assert!(leftovers.is_empty(), "temp files left behind: {:?}", leftovers);
}
