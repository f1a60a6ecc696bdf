//! User intents and their line-oriented text form.

use std::path::PathBuf;
use std::str::FromStr;

use placeboard_shared::Mood;

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// Click at a screen position, in screen units.
    Place { screen_x: f64, screen_y: f64 },
    /// Place on a grid cell directly, as if its center was clicked.
    PlaceCell { x: u32, y: u32 },
    SelectColor(u8),
    SelectMood(Mood),
    ZoomIn,
    ZoomOut,
    /// Pan by a delta in grid units.
    Pan { dx: f64, dy: f64 },
    ResetView,
    Login { email: String, password: String },
    Register { email: String, username: String, password: String },
    Guest,
    Logout,
    SendChat(String),
    ExportPng(PathBuf),
    ExportVideo(PathBuf),
    ViewHistory,
}

impl Command {
    /// Variant name, for logs. Never includes arguments.
    pub fn name(&self) -> &'static str {
        match self {
            Command::Place { .. } => "place",
            Command::PlaceCell { .. } => "place_cell",
            Command::SelectColor(_) => "select_color",
            Command::SelectMood(_) => "select_mood",
            Command::ZoomIn => "zoom_in",
            Command::ZoomOut => "zoom_out",
            Command::Pan { .. } => "pan",
            Command::ResetView => "reset_view",
            Command::Login { .. } => "login",
            Command::Register { .. } => "register",
            Command::Guest => "guest",
            Command::Logout => "logout",
            Command::SendChat(_) => "send_chat",
            Command::ExportPng(_) => "export_png",
            Command::ExportVideo(_) => "export_video",
            Command::ViewHistory => "view_history",
        }
    }
}

pub const USAGE: &str = "commands: place <sx> <sy> | cell <x> <y> | color <0-15> | mood <happy|sad|calm|energetic> \
| zoom in|out | pan <dx> <dy> | reset | login <email> <password> \
| register <email> <username> <password> | guest | logout | say <text> \
| export png|video <path> | history | quit";

impl FromStr for Command {
    type Err = String;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let line = line.trim();
        let (verb, rest) = match line.split_once(char::is_whitespace) {
            Some((verb, rest)) => (verb, rest.trim()),
            None => (line, ""),
        };
        let args: Vec<&str> = rest.split_whitespace().collect();

        match (verb.to_ascii_lowercase().as_str(), args.as_slice()) {
            ("place" | "click", [x, y]) => Ok(Command::Place {
                screen_x: parse_number(x)?,
                screen_y: parse_number(y)?,
            }),
            ("cell", [x, y]) => Ok(Command::PlaceCell {
                x: parse_number(x)?,
                y: parse_number(y)?,
            }),
            ("color", [index]) => Ok(Command::SelectColor(parse_number(index)?)),
            ("mood", [mood]) => mood.parse().map(Command::SelectMood),
            ("zoom", ["in"]) | ("+", []) => Ok(Command::ZoomIn),
            ("zoom", ["out"]) | ("-", []) => Ok(Command::ZoomOut),
            ("pan", [dx, dy]) => Ok(Command::Pan {
                dx: parse_number(dx)?,
                dy: parse_number(dy)?,
            }),
            ("reset", []) => Ok(Command::ResetView),
            ("login", [email, password]) => Ok(Command::Login {
                email: email.to_string(),
                password: password.to_string(),
            }),
            ("register", [email, username, password]) => Ok(Command::Register {
                email: email.to_string(),
                username: username.to_string(),
                password: password.to_string(),
            }),
            ("guest", []) => Ok(Command::Guest),
            ("logout", []) => Ok(Command::Logout),
            ("say" | "chat", _) => Ok(Command::SendChat(rest.to_string())),
            ("export", ["png", path]) => Ok(Command::ExportPng(PathBuf::from(path))),
            ("export", ["video", path]) => Ok(Command::ExportVideo(PathBuf::from(path))),
            ("history", []) => Ok(Command::ViewHistory),
            ("", _) => Err("empty command".to_string()),
            _ => Err(format!("unrecognized command `{line}`; {USAGE}")),
        }
    }
}

fn parse_number<T: FromStr>(raw: &str) -> Result<T, String> {
    raw.parse()
        .map_err(|_| format!("`{raw}` is not a valid number"))
}
