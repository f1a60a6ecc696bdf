//! Text rendering of engine output, for the command-line client.

use std::fmt::Write as _;
use std::io::Write;

use placeboard_shared::{ChatMessage, EpisodeInfo, Quest, colors};

use crate::session::SessionState;
use crate::sink::{Notice, NoticeLevel, PanelUpdate, PresentationSink, RegionFrame};
use crate::time_format::format_countdown;

const EMPTY_CELL: char = '.';
const PALETTE_GLYPHS: &[u8; 16] = b"0123456789abcdef";
const MAX_CHAT_LINES: usize = 10;

/// Sink that prints each view when, and only when, its text changes.
pub struct TerminalSink<W: Write> {
    out: W,
    last_region: String,
    last_episode: String,
    last_season: String,
    last_quests: String,
    last_chat: String,
    last_cooldown: Option<u64>,
}

impl<W: Write> TerminalSink<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            last_region: String::new(),
            last_episode: String::new(),
            last_season: String::new(),
            last_quests: String::new(),
            last_chat: String::new(),
            last_cooldown: None,
        }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn emit(&mut self, text: &str) {
        let _ = writeln!(self.out, "{text}");
        let _ = self.out.flush();
    }
}

/// Draw a region as one glyph per cell: `.` for empty, otherwise the palette
/// index in hex. Unknown colors draw as white (`f`).
pub fn render_region(frame: &RegionFrame) -> String {
    let region = frame.region;
    let grid = frame.viewport.grid_size();
    let width = region.width.min(grid.saturating_sub(region.x)) as usize;
    let height = region.height.min(grid.saturating_sub(region.y)) as usize;

    let mut cells = vec![EMPTY_CELL; width * height];
    for pixel in &frame.pixels {
        if !region.contains(pixel.cell()) {
            continue;
        }
        let col = (pixel.x - region.x) as usize;
        let row = (pixel.y - region.y) as usize;
        if col >= width || row >= height {
            continue;
        }
        let index = colors::display_index(i64::from(pixel.color_index));
        cells[row * width + col] = char::from(PALETTE_GLYPHS[usize::from(index)]);
    }

    let mut out = String::with_capacity((width + 1) * height + 64);
    let _ = write!(
        out,
        "canvas x {}..{} y {}..{} zoom {:.2}x",
        region.x,
        region.x as usize + width,
        region.y,
        region.y as usize + height,
        frame.viewport.zoom()
    );
    for row in cells.chunks(width.max(1)) {
        out.push('\n');
        out.extend(row.iter());
    }
    out
}

pub fn render_episode(episode: &EpisodeInfo) -> String {
    let status = if episode.is_frozen {
        " (frozen)"
    } else if !episode.is_active {
        " (ended)"
    } else {
        ""
    };
    format!(
        "Episode {} | {} left{status}",
        episode.number,
        format_countdown(episode.seconds_remaining)
    )
}

pub fn render_quests(quests: &[Quest]) -> String {
    if quests.is_empty() {
        return "Quests: none".to_string();
    }
    let mut out = String::from("Quests:");
    for quest in quests {
        let mark = if quest.completed { 'x' } else { ' ' };
        let _ = write!(
            out,
            "\n  [{mark}] {} {}/{}",
            quest.description, quest.progress, quest.target
        );
    }
    out
}

pub fn render_chat(messages: &[ChatMessage]) -> String {
    let mut out = String::from("Chat:");
    let skip = messages.len().saturating_sub(MAX_CHAT_LINES);
    for message in &messages[skip..] {
        let _ = write!(out, "\n  {}: {}", message.author, message.text);
    }
    out
}

fn replace_if_changed(slot: &mut String, text: String) -> bool {
    if *slot == text {
        return false;
    }
    *slot = text;
    true
}

impl<W: Write> PresentationSink for TerminalSink<W> {
    fn draw_region(&mut self, frame: RegionFrame) {
        let text = render_region(&frame);
        if replace_if_changed(&mut self.last_region, text) {
            let text = self.last_region.clone();
            self.emit(&text);
        }
    }

    fn show_panel(&mut self, update: PanelUpdate) {
        let (slot, text) = match &update {
            PanelUpdate::Episode(episode) => (&mut self.last_episode, render_episode(episode)),
            PanelUpdate::Season(season) => (&mut self.last_season, format!("Season: {}", season.name)),
            PanelUpdate::Quests(quests) => (&mut self.last_quests, render_quests(quests)),
            PanelUpdate::Chat(messages) => (&mut self.last_chat, render_chat(messages)),
        };
        if replace_if_changed(slot, text) {
            let text = slot.clone();
            self.emit(&text);
        }
    }

    fn show_cooldown(&mut self, remaining_secs: u64) {
        if self.last_cooldown == Some(remaining_secs) {
            return;
        }
        self.last_cooldown = Some(remaining_secs);
        if remaining_secs == 0 {
            self.emit("Ready!");
        } else {
            self.emit(&format!("Wait {remaining_secs}s"));
        }
    }

    fn show_session(&mut self, state: SessionState) {
        let text = match state {
            SessionState::Disconnected => "Session: disconnected (login, register or guest)",
            SessionState::Connected { guest: true } => "Session: playing as guest",
            SessionState::Connected { guest: false } => "Session: logged in",
        };
        self.emit(text);
    }

    fn notify(&mut self, notice: Notice) {
        let prefix = match notice.level {
            NoticeLevel::Info => "*",
            NoticeLevel::Warning => "!",
        };
        self.emit(&format!("{prefix} {}", notice.message));
    }
}
