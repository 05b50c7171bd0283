//! On-disk layout of the chat store.
//!
//! Timestamps cross this boundary as ISO-8601 strings and are parsed back
//! into `DateTime<Utc>` here, and only here.

use crate::error::{NexoraError, Result};
use crate::models::{ChatSession, Message, Role};
use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersistedState {
    #[serde(default)]
    pub chat_sessions: Vec<PersistedSession>,
    #[serde(default)]
    pub current_session_id: Option<String>,
    #[serde(default)]
    pub current_session: Option<PersistedSession>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersistedSession {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default)]
    pub messages: Vec<PersistedMessage>,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersistedMessage {
    pub role: Role,
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    pub timestamp: String,
}

pub fn format_timestamp(time: &DateTime<Utc>) -> String {
    time.to_rfc3339_opts(SecondsFormat::Millis, true)
}

pub fn parse_timestamp(value: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|time| time.with_timezone(&Utc))
        .map_err(|e| NexoraError::PersistenceError(format!("invalid timestamp {:?}: {}", value, e)))
}

impl From<&Message> for PersistedMessage {
    fn from(message: &Message) -> Self {
        Self {
            role: message.role,
            content: message.content.clone(),
            image_url: message.image_url.clone(),
            timestamp: format_timestamp(&message.timestamp),
        }
    }
}

impl From<&ChatSession> for PersistedSession {
    fn from(session: &ChatSession) -> Self {
        Self {
            id: session.id.clone(),
            title: session.title.clone(),
            messages: session.messages.iter().map(PersistedMessage::from).collect(),
            created_at: format_timestamp(&session.created_at),
            updated_at: format_timestamp(&session.updated_at),
        }
    }
}

impl TryFrom<PersistedMessage> for Message {
    type Error = NexoraError;

    fn try_from(message: PersistedMessage) -> Result<Self> {
        Ok(Message {
            role: message.role,
            content: message.content,
            image_url: message.image_url,
            timestamp: parse_timestamp(&message.timestamp)?,
        })
    }
}

impl TryFrom<PersistedSession> for ChatSession {
    type Error = NexoraError;

    fn try_from(session: PersistedSession) -> Result<Self> {
        let messages = session
            .messages
            .into_iter()
            .map(Message::try_from)
            .collect::<Result<Vec<_>>>()?;
        Ok(ChatSession {
            id: session.id,
            title: session.title,
            messages,
            created_at: parse_timestamp(&session.created_at)?,
            updated_at: parse_timestamp(&session.updated_at)?,
        })
    }
}

/// Serialize the store state into its persisted JSON form
pub fn encode(sessions: &[ChatSession], current_session_id: Option<&str>) -> Result<String> {
    let current_session = current_session_id
        .and_then(|id| sessions.iter().find(|s| s.id == id))
        .map(PersistedSession::from);
    let state = PersistedState {
        chat_sessions: sessions.iter().map(PersistedSession::from).collect(),
        current_session_id: current_session_id.map(str::to_string),
        current_session,
    };
    Ok(serde_json::to_string(&state)?)
}

/// Decoded store contents, timestamps already rehydrated
#[derive(Debug)]
pub struct RehydratedState {
    pub sessions: Vec<ChatSession>,
    pub current_session_id: Option<String>,
    pub current_session: Option<ChatSession>,
}

pub fn decode(contents: &str) -> Result<RehydratedState> {
    let state: PersistedState = serde_json::from_str(contents)
        .map_err(|e| NexoraError::PersistenceError(format!("corrupt chat store: {}", e)))?;

    let sessions = state
        .chat_sessions
        .into_iter()
        .map(ChatSession::try_from)
        .collect::<Result<Vec<_>>>()?;
    let current_session = state
        .current_session
        .map(ChatSession::try_from)
        .transpose()?;

    Ok(RehydratedState {
        sessions,
        current_session_id: state.current_session_id,
        current_session,
    })
}
