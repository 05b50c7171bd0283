use nexora::models::{Message, Role};
use nexora::session::persisted::{decode, encode};
use nexora::session::{ChatStore, FilesystemStorage, MemoryStorage, StateStorage};
use serde_json::Value;
use std::sync::Arc;
use tempfile::TempDir;

fn populated_store(storage: Arc<dyn StateStorage>) -> ChatStore {
    let mut store = ChatStore::empty(storage);
    store.add_message(Message::user("first chat")).unwrap();
    store.add_message(Message::assistant("reply one")).unwrap();

    let second = store.create_new_session().unwrap();
    store
        .add_message(Message::user("Generate image: a lighthouse"))
        .unwrap();
    store
        .add_message(
            Message::assistant("Here's your generated image:")
                .with_image("https://img.test/lighthouse.png"),
        )
        .unwrap();
    store.update_session_title(&second, "Pictures").unwrap();
    store
}

#[test]
fn test_reopened_store_matches_saved_state() {
    let storage = Arc::new(MemoryStorage::new());
    let store = populated_store(storage.clone());

    let reopened = ChatStore::open(storage).unwrap();

    assert_eq!(reopened.sessions(), store.sessions());
    assert_eq!(reopened.current_session_id(), store.current_session_id());
    let image = &reopened.current_session().unwrap().messages[1];
    assert_eq!(image.image_url.as_deref(), Some("https://img.test/lighthouse.png"));
}

#[test]
fn test_round_trip_through_files() {
    let temp_dir = TempDir::new().unwrap();
    let storage = Arc::new(FilesystemStorage::new(temp_dir.path(), "nexora-chat-store"));
    let store = populated_store(storage.clone());

    let reopened = ChatStore::open(storage).unwrap();

    assert_eq!(reopened.sessions(), store.sessions());
    assert_eq!(reopened.sessions()[0].title.as_deref(), Some("Pictures"));
    assert_eq!(reopened.sessions()[1].title.as_deref(), Some("first chat"));
}

#[test]
fn test_persisted_layout_uses_iso_strings() {
    let storage = Arc::new(MemoryStorage::new());
    let store = populated_store(storage.clone());

    let blob: Value = serde_json::from_str(&storage.contents().unwrap()).unwrap();

    let sessions = blob["chatSessions"].as_array().unwrap();
    assert_eq!(sessions.len(), 2);
    assert_eq!(blob["currentSessionId"], store.current_session_id().unwrap());
    assert_eq!(blob["currentSession"]["id"], store.current_session_id().unwrap());

    let created_at = sessions[0]["createdAt"].as_str().unwrap();
    assert!(created_at.ends_with('Z'));
    assert_eq!(created_at.len(), "2025-08-12T10:00:00.000Z".len());
    assert!(sessions[0]["messages"][1]["timestamp"].is_string());
    assert_eq!(
        sessions[0]["messages"][1]["imageUrl"],
        "https://img.test/lighthouse.png"
    );
    assert!(sessions[1]["messages"][0].get("imageUrl").is_none());
}

#[test]
fn test_encode_decode_preserves_timestamps() {
    let storage = Arc::new(MemoryStorage::new());
    let store = populated_store(storage);

    let blob = encode(store.sessions(), store.current_session_id()).unwrap();
    let state = decode(&blob).unwrap();

    for (decoded, saved) in state.sessions.iter().zip(store.sessions()) {
        assert_eq!(decoded.created_at, saved.created_at);
        assert_eq!(decoded.updated_at, saved.updated_at);
        for (a, b) in decoded.messages.iter().zip(&saved.messages) {
            assert_eq!(a.timestamp, b.timestamp);
        }
    }
    assert_eq!(
        state.current_session.map(|s| s.id).as_deref(),
        store.current_session_id()
    );
}

#[test]
fn test_open_falls_back_to_current_session_mirror() {
    let blob = r#"{
        "chatSessions": [
            {"id": "a", "messages": [], "createdAt": "2025-08-12T10:00:00.000Z", "updatedAt": "2025-08-12T10:00:00.000Z"},
            {"id": "b", "messages": [{"role": "user", "content": "hi", "timestamp": "2025-08-12T10:00:02.000Z"}],
             "createdAt": "2025-08-12T10:00:01.000Z", "updatedAt": "2025-08-12T10:00:02.000Z"}
        ],
        "currentSession": {"id": "b", "messages": [], "createdAt": "2025-08-12T10:00:01.000Z", "updatedAt": "2025-08-12T10:00:02.000Z"}
    }"#;
    let store = ChatStore::open(Arc::new(MemoryStorage::with_contents(blob))).unwrap();

    assert_eq!(store.current_session_id(), Some("b"));
    let current = store.current_session().unwrap();
    assert_eq!(current.messages.len(), 1);
    assert_eq!(current.messages[0].role, Role::User);
}
