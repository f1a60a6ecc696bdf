use std::cell::RefCell;
use std::rc::Rc;

use crate::api::Credentials;
use crate::cooldown::CooldownGate;
use crate::viewport::Viewport;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Disconnected,
    Connected { guest: bool },
}

impl SessionState {
    pub fn is_connected(self) -> bool {
        matches!(self, SessionState::Connected { .. })
    }
}

/// Who is placing pixels. `user_id == None` means guest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub session_token: String,
    pub user_id: Option<u64>,
}

impl Identity {
    pub fn guest(session_token: impl Into<String>) -> Self {
        Self {
            session_token: session_token.into(),
            user_id: None,
        }
    }

    pub fn is_guest(&self) -> bool {
        self.user_id.is_none()
    }
}

impl From<Credentials> for Identity {
    fn from(credentials: Credentials) -> Self {
        Self {
            session_token: credentials.session_token,
            user_id: Some(credentials.user_id),
        }
    }
}

/// State owned by one connected session. Created when the session starts,
/// dropped at logout, never shared between sessions.
#[derive(Debug)]
pub struct SessionContext {
    pub identity: Identity,
    pub viewport: Rc<RefCell<Viewport>>,
    pub cooldown: Rc<RefCell<CooldownGate>>,
}

impl SessionContext {
    pub fn new(identity: Identity, grid_size: u32) -> Self {
        Self {
            identity,
            viewport: Rc::new(RefCell::new(Viewport::new(grid_size))),
            cooldown: Rc::new(RefCell::new(CooldownGate::new())),
        }
    }

    pub fn state(&self) -> SessionState {
        SessionState::Connected {
            guest: self.identity.is_guest(),
        }
    }
}
