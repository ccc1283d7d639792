//! Conversation history persistence.
//!
//! [`RedisHistory`] keeps the last [`MAX_TURNS`] turns per user in a Redis
//! list under `conversations:{user_id}`, newest at the head (pipelined
//! LPUSH + LTRIM). Each record is serialized as
//! `{ "user": ..., "bot": ..., "timestamp": ISO-8601 }`.
//!
//! Reads tolerate individual malformed records (skipped with a warning); a
//! list that is entirely unreadable surfaces as a store error.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use redis::AsyncCommands;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::config::HistoryConfig;
use crate::error::{Error, Result};
use crate::models::ConversationTurn;

/// Turns retained per user; appending beyond this evicts the oldest.
pub const MAX_TURNS: isize = 10;

/// Persists and retrieves per-user conversation turns.
#[async_trait]
pub trait HistoryStore: Send + Sync {
    /// Append a turn, keeping only the newest [`MAX_TURNS`] for the user.
    async fn append(&self, turn: &ConversationTurn) -> Result<()>;

    /// The most recent turns for a user, newest first.
    async fn recent(&self, user_id: &str) -> Result<Vec<ConversationTurn>>;
}

/// Serialized per-turn record, the wire shape stored in the list.
#[derive(Debug, Serialize, Deserialize)]
struct HistoryRecord {
    user: String,
    bot: String,
    timestamp: String,
}

/// Redis-backed history store.
pub struct RedisHistory {
    conn: redis::aio::MultiplexedConnection,
}

impl RedisHistory {
    /// Connect to Redis, verifying reachability before returning.
    pub async fn connect(config: &HistoryConfig) -> Result<Self> {
        let url = format!("redis://{}:{}/{}", config.host, config.port, config.db);
        let client = redis::Client::open(url.as_str())
            .map_err(|e| Error::Connection(format!("invalid history store address: {}", e)))?;

        let conn = client
            .get_multiplexed_tokio_connection()
            .await
            .map_err(|e| {
                Error::Connection(format!("history store unreachable at {}: {}", url, e))
            })?;

        info!(endpoint = %url, "history store ready");
        Ok(Self { conn })
    }
}

fn history_key(user_id: &str) -> String {
    format!("conversations:{}", user_id)
}

/// Deserialize one stored record; `None` if the record is malformed.
fn parse_record(user_id: &str, raw: &str) -> Option<ConversationTurn> {
    let record: HistoryRecord = serde_json::from_str(raw).ok()?;
    let timestamp = DateTime::parse_from_rfc3339(&record.timestamp)
        .ok()?
        .with_timezone(&Utc);
    Some(ConversationTurn {
        user_id: user_id.to_string(),
        user_msg: record.user,
        bot_msg: record.bot,
        timestamp,
    })
}

#[async_trait]
impl HistoryStore for RedisHistory {
    async fn append(&self, turn: &ConversationTurn) -> Result<()> {
        let key = history_key(&turn.user_id);
        let record = HistoryRecord {
            user: turn.user_msg.clone(),
            bot: turn.bot_msg.clone(),
            timestamp: turn.timestamp.to_rfc3339(),
        };
        let payload = serde_json::to_string(&record)
            .map_err(|e| Error::Store(format!("failed to serialize turn: {}", e)))?;

        let mut conn = self.conn.clone();
        let _: () = redis::pipe()
            .lpush(&key, payload)
            .ltrim(&key, 0, MAX_TURNS - 1)
            .query_async(&mut conn)
            .await
            .map_err(|e| Error::Store(format!("failed to save conversation: {}", e)))?;
        Ok(())
    }

    async fn recent(&self, user_id: &str) -> Result<Vec<ConversationTurn>> {
        let key = history_key(user_id);
        let mut conn = self.conn.clone();
        let raw: Vec<String> = conn
            .lrange(&key, 0, MAX_TURNS - 1)
            .await
            .map_err(|e| Error::Store(format!("failed to read conversation history: {}", e)))?;

        let mut turns = Vec::with_capacity(raw.len());
        for item in &raw {
            match parse_record(user_id, item) {
                Some(turn) => turns.push(turn),
                None => warn!(user_id, "skipping malformed history record"),
            }
        }

        if turns.is_empty() && !raw.is_empty() {
            return Err(Error::Store(format!(
                "history for user {} is entirely unreadable ({} records)",
                user_id,
                raw.len()
            )));
        }

        Ok(turns)
    }
}
