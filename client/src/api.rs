use bytes::Bytes;
use placeboard_shared::{
    ChatMessage, ChatPostRequest, EpisodeInfo, HistoryEntry, LoginRequest, PlacePixelRequest,
    Pixel, Quest, Region, RegisterRequest, SeasonInfo,
};

use crate::error::Result;

/// Session issued by a successful login or registration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    pub session_token: String,
    pub user_id: u64,
}

/// Request/response contract of the canvas service.
///
/// Implementations report service-side failures as
/// [`ClientError::Rejected`](crate::error::ClientError::Rejected) and
/// network or decode failures as
/// [`ClientError::Transport`](crate::error::ClientError::Transport).
#[allow(async_fn_in_trait)]
pub trait CanvasApi {
    async fn place_pixel(&self, request: &PlacePixelRequest) -> Result<()>;
    async fn canvas_region(&self, region: Region) -> Result<Vec<Pixel>>;
    async fn login(&self, request: &LoginRequest) -> Result<Credentials>;
    async fn register(&self, request: &RegisterRequest) -> Result<Credentials>;
    async fn episode(&self) -> Result<EpisodeInfo>;
    async fn season(&self) -> Result<SeasonInfo>;
    async fn quests(&self) -> Result<Vec<Quest>>;
    async fn chat(&self) -> Result<Vec<ChatMessage>>;
    async fn post_chat(&self, request: &ChatPostRequest) -> Result<()>;
    async fn export_png(&self) -> Result<Bytes>;
    async fn export_video(&self) -> Result<Bytes>;
    async fn history(&self) -> Result<Vec<HistoryEntry>>;
}
