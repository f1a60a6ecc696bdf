//! Durable storage for the session token.

use std::cell::RefCell;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::warn;
use uuid::Uuid;

use crate::error::Result;

pub trait SessionStore {
    fn load(&self) -> Option<String>;
    fn save(&self, token: &str) -> Result<()>;
    fn clear(&self) -> Result<()>;
}

/// Fresh anonymous token: `sess_` followed by 32 hex chars.
pub fn generate_session_token() -> String {
    format!("sess_{}", Uuid::new_v4().simple())
}

/// Stored token, or a newly generated (and persisted) one when absent.
pub fn load_or_create(store: &impl SessionStore) -> String {
    if let Some(token) = store.load() {
        return token;
    }
    let token = generate_session_token();
    if let Err(e) = store.save(&token) {
        warn!(error = %e, "failed to persist anonymous session token");
    }
    token
}

#[derive(Debug, Serialize, Deserialize)]
struct SessionRecord {
    #[serde(rename = "sessionId")]
    session_id: String,
}

/// JSON file holding `{"sessionId": "..."}`.
#[derive(Debug, Clone)]
pub struct FileSessionStore {
    path: PathBuf,
}

impl FileSessionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SessionStore for FileSessionStore {
    fn load(&self) -> Option<String> {
        let raw = match fs::read(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => return None,
            Err(e) => {
                warn!(error = %e, path = %self.path.display(), "failed to read session file");
                return None;
            }
        };
        match serde_json::from_slice::<SessionRecord>(&raw) {
            Ok(record) if !record.session_id.trim().is_empty() => Some(record.session_id),
            Ok(_) => None,
            Err(e) => {
                warn!(error = %e, path = %self.path.display(), "ignoring corrupt session file");
                None
            }
        }
    }

    fn save(&self, token: &str) -> Result<()> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)?;
        }
        let record = SessionRecord {
            session_id: token.to_string(),
        };
        let json = serde_json::to_vec(&record)?;
        fs::write(&self.path, json)?;
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// Process-local store, for tests and ephemeral sessions.
#[derive(Debug, Default)]
pub struct MemorySessionStore {
    token: RefCell<Option<String>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_token(token: impl Into<String>) -> Self {
        Self {
            token: RefCell::new(Some(token.into())),
        }
    }
}

impl SessionStore for MemorySessionStore {
    fn load(&self) -> Option<String> {
        self.token.borrow().clone()
    }

    fn save(&self, token: &str) -> Result<()> {
        *self.token.borrow_mut() = Some(token.to_string());
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        self.token.borrow_mut().take();
        Ok(())
    }
}
