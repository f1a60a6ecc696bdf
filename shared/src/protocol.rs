//! Request and response bodies exchanged with the canvas service.
//!
//! Field names follow the service's JSON. Aliases accept the descriptive
//! spellings (`colorIndex`, `sessionToken`, ...) as well.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::grid::Pixel;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlacePixelRequest {
    pub x: u32,
    pub y: u32,
    #[serde(rename = "color", alias = "colorIndex")]
    pub color_index: u8,
    #[serde(rename = "mood", alias = "moodIndex")]
    pub mood_index: u8,
    #[serde(rename = "sessionId", alias = "sessionToken")]
    pub session_token: String,
}

/// Generic `{success, error}` acknowledgement. Failures may also arrive as a
/// bare `{error}` body on a non-2xx status.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ack {
    #[serde(default)]
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl Ack {
    /// `Ok` on success, otherwise the server reason (or `fallback` when absent).
    pub fn into_result(self, fallback: &str) -> Result<(), String> {
        if self.success {
            Ok(())
        } else {
            Err(self
                .error
                .filter(|reason| !reason.trim().is_empty())
                .unwrap_or_else(|| fallback.to_string()))
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegionResponse {
    #[serde(default)]
    pub pixels: Vec<Pixel>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(
        default,
        rename = "sessionId",
        alias = "sessionToken",
        skip_serializing_if = "Option::is_none"
    )]
    pub session_token: Option<String>,
    #[serde(default, rename = "userId", skip_serializing_if = "Option::is_none")]
    pub user_id: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EpisodeInfo {
    #[serde(rename = "episodeNumber")]
    pub number: u32,
    #[serde(rename = "timeRemaining", alias = "secondsRemaining")]
    pub seconds_remaining: i64,
    #[serde(default = "default_true", rename = "isActive")]
    pub is_active: bool,
    #[serde(default, rename = "isFrozen")]
    pub is_frozen: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeasonInfo {
    #[serde(rename = "season")]
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Quest {
    pub description: String,
    pub progress: i64,
    pub target: i64,
    #[serde(default)]
    pub completed: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestList {
    #[serde(default)]
    pub quests: Vec<Quest>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    #[serde(rename = "username", alias = "author")]
    pub author: String,
    #[serde(rename = "message", alias = "text")]
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<u64>,
}

/// Chat window as served, oldest first.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatLog {
    #[serde(default)]
    pub messages: Vec<ChatMessage>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatPostRequest {
    pub message: String,
    #[serde(rename = "sessionId", alias = "sessionToken")]
    pub session_token: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    #[serde(rename = "episodeNumber")]
    pub episode_number: u32,
    /// Unix seconds at which the episode ended.
    #[serde(rename = "timestamp")]
    pub ended_at: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thumbnail: Option<String>,
}

impl HistoryEntry {
    pub fn ended_at_utc(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.ended_at, 0)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EpisodeHistory {
    #[serde(default)]
    pub episodes: Vec<HistoryEntry>,
}
