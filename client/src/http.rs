use std::time::Duration;

use bytes::Bytes;
use placeboard_shared::{
    Ack, AuthResponse, ChatLog, ChatMessage, ChatPostRequest, EpisodeHistory, EpisodeInfo,
    HistoryEntry, LoginRequest, PlacePixelRequest, Pixel, Quest, QuestList, Region,
    RegionResponse, RegisterRequest, SeasonInfo,
};
use reqwest::StatusCode;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{trace, warn};

use crate::api::{CanvasApi, Credentials};
use crate::config::{Config, USER_AGENT};
use crate::error::{ClientError, Result};

/// [`CanvasApi`] over HTTP/JSON.
#[derive(Debug, Clone)]
pub struct HttpApi {
    client: reqwest::Client,
    base: String,
    export_timeout: Duration,
}

impl HttpApi {
    pub fn new(config: &Config) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(config.http_timeout)
            .connect_timeout(config.connect_timeout)
            .build()
            .or_else(|e| {
                warn!(
                    error = %e,
                    "failed to build configured HTTP client, retrying without custom user-agent"
                );
                reqwest::Client::builder()
                    .timeout(config.http_timeout)
                    .connect_timeout(config.connect_timeout)
                    .build()
            })?;
        Ok(Self {
            client,
            base: config.api_base.trim_end_matches('/').to_string(),
            export_timeout: config.export_timeout,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base, path)
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str, query: &[(&str, u32)]) -> Result<T> {
        let resp = self
            .client
            .get(self.url(path))
            .query(query)
            .query(&[("t", cache_buster())])
            .send()
            .await?;
        let status = resp.status();
        let body = resp.bytes().await?;
        if !status.is_success() {
            return Err(error_from_body(status, &body));
        }
        trace!(path, bytes = body.len(), "fetched");
        Ok(serde_json::from_slice(&body)?)
    }

    async fn post_ack<B: Serialize>(&self, path: &str, body: &B, fallback: &str) -> Result<()> {
        let resp = self.client.post(self.url(path)).json(body).send().await?;
        let status = resp.status();
        let body = resp.bytes().await?;
        decode_ack(status, &body, fallback)
    }

    async fn post_auth<B: Serialize>(
        &self,
        path: &str,
        body: &B,
        fallback: &str,
    ) -> Result<Credentials> {
        let resp = self.client.post(self.url(path)).json(body).send().await?;
        let status = resp.status();
        let body = resp.bytes().await?;
        decode_auth(status, &body, fallback)
    }

    async fn get_bytes(&self, path: &str) -> Result<Bytes> {
        let resp = self
            .client
            .get(self.url(path))
            .timeout(self.export_timeout)
            .send()
            .await?;
        let status = resp.status();
        let body = resp.bytes().await?;
        if !status.is_success() {
            return Err(error_from_body(status, &body));
        }
        Ok(body)
    }
}

fn cache_buster() -> String {
    chrono::Utc::now().timestamp_millis().to_string()
}

/// Failure from a non-2xx response: the service reason when the body carries
/// one, otherwise the bare status.
fn error_from_body(status: StatusCode, body: &[u8]) -> ClientError {
    match serde_json::from_slice::<Ack>(body) {
        Ok(Ack {
            error: Some(reason),
            ..
        }) if !reason.trim().is_empty() => ClientError::Rejected(reason),
        _ => ClientError::Transport(format!("HTTP {status}")),
    }
}

/// Non-2xx responses only count as rejections when they carry a reason.
pub(crate) fn decode_ack(status: StatusCode, body: &[u8], fallback: &str) -> Result<()> {
    if !status.is_success() {
        return Err(error_from_body(status, body));
    }
    match serde_json::from_slice::<Ack>(body) {
        Ok(ack) => ack.into_result(fallback).map_err(ClientError::Rejected),
        Err(_) => Err(ClientError::transport("malformed acknowledgement")),
    }
}

pub(crate) fn decode_auth(status: StatusCode, body: &[u8], fallback: &str) -> Result<Credentials> {
    if !status.is_success() {
        return Err(error_from_body(status, body));
    }
    let auth = serde_json::from_slice::<AuthResponse>(body)
        .map_err(|_| ClientError::transport("malformed auth response"))?;
    match auth {
        AuthResponse {
            success: true,
            session_token: Some(session_token),
            user_id: Some(user_id),
            ..
        } if !session_token.is_empty() => Ok(Credentials {
            session_token,
            user_id,
        }),
        AuthResponse { error, .. } => Err(ClientError::Rejected(
            error
                .filter(|reason| !reason.trim().is_empty())
                .unwrap_or_else(|| fallback.to_string()),
        )),
    }
}

impl CanvasApi for HttpApi {
    async fn place_pixel(&self, request: &PlacePixelRequest) -> Result<()> {
        self.post_ack("place_pixel", request, "Failed to place pixel")
            .await
    }

    async fn canvas_region(&self, region: Region) -> Result<Vec<Pixel>> {
        let query = [
            ("x", region.x),
            ("y", region.y),
            ("width", region.width),
            ("height", region.height),
        ];
        let response: RegionResponse = self.get_json("canvas", &query).await?;
        Ok(response.pixels)
    }

    async fn login(&self, request: &LoginRequest) -> Result<Credentials> {
        self.post_auth("login", request, "Login failed").await
    }

    async fn register(&self, request: &RegisterRequest) -> Result<Credentials> {
        self.post_auth("register", request, "Registration failed")
            .await
    }

    async fn episode(&self) -> Result<EpisodeInfo> {
        self.get_json("episode", &[]).await
    }

    async fn season(&self) -> Result<SeasonInfo> {
        self.get_json("season", &[]).await
    }

    async fn quests(&self) -> Result<Vec<Quest>> {
        let list: QuestList = self.get_json("quests", &[]).await?;
        Ok(list.quests)
    }

    async fn chat(&self) -> Result<Vec<ChatMessage>> {
        let log: ChatLog = self.get_json("chat", &[]).await?;
        Ok(log.messages)
    }

    async fn post_chat(&self, request: &ChatPostRequest) -> Result<()> {
        self.post_ack("chat", request, "Failed to send").await
    }

    async fn export_png(&self) -> Result<Bytes> {
        self.get_bytes("export_png").await
    }

    async fn export_video(&self) -> Result<Bytes> {
        self.get_bytes("export_video").await
    }

    async fn history(&self) -> Result<Vec<HistoryEntry>> {
        let history: EpisodeHistory = self.get_json("history", &[]).await?;
        Ok(history.episodes)
    }
}
