use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::{Arc, Mutex};

/// Key under which the runner stages the text of the current user turn.
pub(crate) const USER_TURN: &str = "user_turn";

/// Who produced a transcript entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Speaker {
    User,
    Bot,
}

/// One line of a conversation transcript
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranscriptEntry {
    pub speaker: Speaker,
    pub content: String,
}

impl TranscriptEntry {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            speaker: Speaker::User,
            content: content.into(),
        }
    }

    pub fn bot(content: impl Into<String>) -> Self {
        Self {
            speaker: Speaker::Bot,
            content: content.into(),
        }
    }
}

/// Shared state for one conversation: typed key/value data plus the
/// transcript of everything said so far. Cloning is cheap and all clones
/// observe the same underlying state.
#[derive(Clone, Debug, Default)]
pub struct Context {
    data: Arc<DashMap<String, Value>>,
    transcript: Arc<Mutex<Vec<TranscriptEntry>>>,
}

impl Context {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn set(&self, key: impl Into<String>, value: impl serde::Serialize) {
        let value = serde_json::to_value(value).expect("Failed to serialize value");
        self.data.insert(key.into(), value);
    }

    pub async fn get<T: serde::de::DeserializeOwned>(&self, key: &str) -> Option<T> {
        self.data
            .get(key)
            .and_then(|v| serde_json::from_value(v.clone()).ok())
    }

    pub async fn remove(&self, key: &str) -> Option<Value> {
        self.data.remove(key).map(|(_, v)| v)
    }

    pub async fn clear(&self) {
        self.data.clear();
    }

    /// Raw text of the turn currently being processed, if any.
    pub async fn user_turn(&self) -> Option<String> {
        self.get(USER_TURN).await
    }

    /// Stage the text of the next turn. Normally called by the runner.
    pub async fn set_user_turn(&self, content: impl Into<String>) {
        self.set(USER_TURN, content.into()).await;
    }

    pub async fn add_user_message(&self, content: impl Into<String>) {
        self.transcript
            .lock()
            .unwrap()
            .push(TranscriptEntry::user(content));
    }

    pub async fn add_bot_message(&self, content: impl Into<String>) {
        self.transcript
            .lock()
            .unwrap()
            .push(TranscriptEntry::bot(content));
    }

    /// Snapshot of the transcript in insertion order.
    pub async fn transcript(&self) -> Vec<TranscriptEntry> {
        self.transcript.lock().unwrap().clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn typed_roundtrip_and_remove() {
        let context = Context::new();
        context.set("budget", 30000.0_f64).await;

        let budget: f64 = context.get("budget").await.unwrap();
        assert_eq!(budget, 30000.0);

        context.remove("budget").await;
        assert!(context.get::<f64>("budget").await.is_none());
    }

    #[tokio::test]
    async fn clones_share_state() {
        let context = Context::new();
        let other = context.clone();
        other.set("key", "value").await;

        let value: String = context.get("key").await.unwrap();
        assert_eq!(value, "value");
    }

    #[tokio::test]
    async fn transcript_preserves_order() {
        let context = Context::new();
        context.add_user_message("hello").await;
        context.add_bot_message("hi there").await;

        let transcript = context.transcript().await;
        assert_eq!(transcript.len(), 2);
        assert_eq!(transcript[0].speaker, Speaker::User);
        assert_eq!(transcript[0].content, "hello");
        assert_eq!(transcript[1].speaker, Speaker::Bot);
    }

    #[tokio::test]
    async fn clear_drops_data_but_keeps_transcript() {
        let context = Context::new();
        context.set("key", 1).await;
        context.add_user_message("hello").await;

        context.clear().await;
        assert!(context.get::<i32>("key").await.is_none());
        assert_eq!(context.transcript().await.len(), 1);
    }
}
