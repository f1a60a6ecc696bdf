use placeboard_shared::{ChatMessage, EpisodeInfo, Pixel, Quest, Region, SeasonInfo};

use crate::session::SessionState;
use crate::viewport::Viewport;

/// A region payload that passed the staleness check, together with the
/// viewport it was requested for.
#[derive(Debug, Clone, PartialEq)]
pub struct RegionFrame {
    pub region: Region,
    pub viewport: Viewport,
    pub pixels: Vec<Pixel>,
}

/// Wholesale replacement of one side panel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PanelUpdate {
    Episode(EpisodeInfo),
    Season(SeasonInfo),
    Quests(Vec<Quest>),
    Chat(Vec<ChatMessage>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Warning,
}

/// User-facing message, e.g. a rejection reason.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl Notice {
    pub fn info(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Info,
            message: message.into(),
        }
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Warning,
            message: message.into(),
        }
    }
}

/// Consumer of everything the engine decides to display.
pub trait PresentationSink {
    fn draw_region(&mut self, frame: RegionFrame);
    fn show_panel(&mut self, update: PanelUpdate);
    /// Remaining cooldown in whole seconds, `0` meaning ready.
    fn show_cooldown(&mut self, remaining_secs: u64);
    fn show_session(&mut self, state: SessionState);
    fn notify(&mut self, notice: Notice);
}
