//! Session lifecycle and command dispatch.
//!
//! The app is either disconnected or connected with exactly one
//! [`SessionContext`]. Connecting builds a fresh context, scheduler and
//! placement controller; logging out tears all three down.
//!
//! Every method takes `&self` so commands can run concurrently on one
//! `LocalSet`: a slow export or placement never holds up the next command.
//! No borrow of the app's state is held across an await.

use std::cell::{Cell as StdCell, RefCell};
use std::fmt::Write as _;
use std::path::Path;
use std::rc::Rc;

use bytes::Bytes;
use placeboard_shared::{
    Cell, ChatPostRequest, GRID_SIZE, HistoryEntry, LoginRequest, Mood, PALETTE_LEN,
    RegisterRequest, colors,
};
use tracing::{debug, info, warn};

use crate::api::{CanvasApi, Credentials};
use crate::command::Command;
use crate::config::Config;
use crate::error::{ClientError, Result};
use crate::placement::{PlaceOutcome, PlacementController};
use crate::session::{Identity, SessionContext, SessionState};
use crate::sink::{Notice, PresentationSink};
use crate::store::{self, SessionStore};
use crate::sync::{Panel, SyncScheduler};
use crate::time_format;
use crate::viewport::Viewport;

/// Color and mood applied to the next placement. Survives logout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Selection {
    pub color_index: u8,
    pub mood: Mood,
}

struct ActiveSession<A, S> {
    context: SessionContext,
    scheduler: SyncScheduler<A, S>,
    placement: PlacementController<A, S>,
}

pub struct App<A, S, St> {
    api: Rc<A>,
    sink: Rc<RefCell<S>>,
    store: St,
    config: Config,
    /// Token used for the next guest session.
    session_token: RefCell<String>,
    selection: StdCell<Selection>,
    active: RefCell<Option<Rc<ActiveSession<A, S>>>>,
}

impl<A, S, St> App<A, S, St>
where
    A: CanvasApi + 'static,
    S: PresentationSink + 'static,
    St: SessionStore,
{
    pub fn new(api: Rc<A>, sink: Rc<RefCell<S>>, store: St, config: Config) -> Self {
        let session_token = store::load_or_create(&store);
        sink.borrow_mut().show_session(SessionState::Disconnected);
        Self {
            api,
            sink,
            store,
            config,
            session_token: RefCell::new(session_token),
            selection: StdCell::new(Selection::default()),
            active: RefCell::new(None),
        }
    }

    fn active(&self) -> Option<Rc<ActiveSession<A, S>>> {
        self.active.borrow().clone()
    }

    pub fn state(&self) -> SessionState {
        self.active()
            .map_or(SessionState::Disconnected, |active| active.context.state())
    }

    pub fn identity(&self) -> Option<Identity> {
        self.active().map(|active| active.context.identity.clone())
    }

    pub fn viewport(&self) -> Option<Viewport> {
        self.active().map(|active| *active.context.viewport.borrow())
    }

    pub fn cooldown_remaining(&self) -> u64 {
        self.active()
            .map_or(0, |active| active.context.cooldown.borrow_mut().remaining_seconds())
    }

    pub fn store(&self) -> &St {
        &self.store
    }

    /// Run one command. Failures are also reported to the sink.
    pub async fn dispatch(&self, command: Command) -> Result<()> {
        debug!(command = command.name(), "dispatch");
        let result = self.handle(command).await;
        if let Err(e) = &result {
            self.sink.borrow_mut().notify(Notice::warning(e.to_string()));
        }
        result
    }

    /// Stop background work without touching the stored session.
    pub fn shutdown(&self) {
        self.teardown();
    }

    async fn handle(&self, command: Command) -> Result<()> {
        match command {
            Command::Place { screen_x, screen_y } => self.place(screen_x, screen_y).await,
            Command::PlaceCell { x, y } => {
                let Some(viewport) = self.viewport() else {
                    return Ok(());
                };
                let (screen_x, screen_y) =
                    viewport.cell_to_screen(Cell::new(x, y), self.config.pixel_unit);
                let half = self.config.pixel_unit * viewport.zoom() / 2.0;
                self.place(screen_x + half, screen_y + half).await
            }
            Command::SelectColor(color_index) => {
                if !colors::is_palette_index(color_index) {
                    return Err(ClientError::validation(format!(
                        "Color must be between 0 and {}",
                        PALETTE_LEN - 1
                    )));
                }
                self.selection.set(Selection {
                    color_index,
                    ..self.selection.get()
                });
                Ok(())
            }
            Command::SelectMood(mood) => {
                self.selection.set(Selection {
                    mood,
                    ..self.selection.get()
                });
                Ok(())
            }
            Command::ZoomIn => self.change_view(|viewport| {
                viewport.zoom_in();
            }),
            Command::ZoomOut => self.change_view(|viewport| {
                viewport.zoom_out();
            }),
            Command::Pan { dx, dy } => self.change_view(|viewport| viewport.pan(dx, dy)),
            Command::ResetView => self.change_view(Viewport::reset_view),
            Command::Login { email, password } => self.login(email, password).await,
            Command::Register {
                email,
                username,
                password,
            } => self.register(email, username, password).await,
            Command::Guest => {
                let token = self.session_token.borrow().clone();
                self.connect(Identity::guest(token));
                Ok(())
            }
            Command::Logout => {
                self.logout();
                Ok(())
            }
            Command::SendChat(text) => self.send_chat(&text).await,
            Command::ExportPng(path) => {
                let bytes = self.api.export_png().await?;
                self.save_export("canvas image", &path, bytes).await
            }
            Command::ExportVideo(path) => {
                let bytes = self.api.export_video().await?;
                self.save_export("episode video", &path, bytes).await
            }
            Command::ViewHistory => {
                let entries = self.api.history().await?;
                self.sink
                    .borrow_mut()
                    .notify(Notice::info(format_history(&entries)));
                Ok(())
            }
        }
    }

    async fn place(&self, screen_x: f64, screen_y: f64) -> Result<()> {
        let Some(active) = self.active() else {
            debug!("ignoring placement while disconnected");
            return Ok(());
        };
        let Selection { color_index, mood } = self.selection.get();
        match active
            .placement
            .attempt_place(screen_x, screen_y, color_index, mood)
            .await
        {
            PlaceOutcome::Placed { .. } | PlaceOutcome::OutsideGrid => Ok(()),
            PlaceOutcome::InFlight => Err(ClientError::validation(
                "Previous placement is still being sent",
            )),
            PlaceOutcome::CoolingDown { remaining_secs } => Err(ClientError::validation(format!(
                "Please wait for cooldown! ({remaining_secs}s)"
            ))),
            PlaceOutcome::Invalid(message) => Err(ClientError::Validation(message)),
            PlaceOutcome::Rejected(reason) => Err(ClientError::Rejected(reason)),
            PlaceOutcome::Failed(_) => Err(ClientError::transport("Failed to place pixel")),
        }
    }

    fn change_view(&self, change: impl FnOnce(&mut Viewport)) -> Result<()> {
        let Some(active) = self.active() else {
            debug!("ignoring view change while disconnected");
            return Ok(());
        };
        let changed = {
            let mut viewport = active.context.viewport.borrow_mut();
            let before = *viewport;
            change(&mut *viewport);
            viewport.clamp();
            *viewport != before
        };
        if changed {
            active.scheduler.refresh_now();
        }
        Ok(())
    }

    async fn login(&self, email: String, password: String) -> Result<()> {
        let email = email.trim().to_string();
        if email.is_empty() || password.is_empty() {
            return Err(ClientError::validation("Email and password are required"));
        }
        let credentials = self.api.login(&LoginRequest { email, password }).await?;
        info!(user_id = credentials.user_id, "logged in");
        self.adopt(credentials);
        Ok(())
    }

    async fn register(&self, email: String, username: String, password: String) -> Result<()> {
        let email = email.trim().to_string();
        let username = username.trim().to_string();
        if email.is_empty() || username.is_empty() || password.is_empty() {
            return Err(ClientError::validation(
                "Email, username and password are required",
            ));
        }
        let credentials = self
            .api
            .register(&RegisterRequest {
                email,
                username,
                password,
            })
            .await?;
        info!(user_id = credentials.user_id, "registered");
        self.adopt(credentials);
        Ok(())
    }

    fn adopt(&self, credentials: Credentials) {
        if let Err(e) = self.store.save(&credentials.session_token) {
            warn!(error = %e, "failed to persist session token");
        }
        self.session_token.replace(credentials.session_token.clone());
        self.connect(Identity::from(credentials));
    }

    fn connect(&self, identity: Identity) {
        self.teardown();

        let context = SessionContext::new(identity, GRID_SIZE);
        let scheduler = SyncScheduler::new(
            Rc::clone(&self.api),
            Rc::clone(&self.sink),
            Rc::clone(&context.viewport),
            self.config.poll_interval,
        );
        let sink = Rc::clone(&self.sink);
        context
            .cooldown
            .borrow_mut()
            .on_tick(move |remaining| sink.borrow_mut().show_cooldown(remaining));
        let placement = PlacementController::new(
            Rc::clone(&self.api),
            context.identity.clone(),
            Rc::clone(&context.viewport),
            Rc::clone(&context.cooldown),
            scheduler.clone(),
            self.config.pixel_unit,
            self.config.cooldown_tick,
        );

        let state = context.state();
        {
            let mut sink = self.sink.borrow_mut();
            sink.show_session(state);
            sink.show_cooldown(0);
        }
        info!(guest = context.identity.is_guest(), "session connected");

        self.active.replace(Some(Rc::new(ActiveSession {
            context,
            scheduler: scheduler.clone(),
            placement,
        })));
        scheduler.start();
    }

    /// Drop the active session, if any. Returns whether there was one.
    fn teardown(&self) -> bool {
        let previous = self.active.borrow_mut().take();
        match previous {
            Some(active) => {
                active.scheduler.stop();
                true
            }
            None => false,
        }
    }

    fn logout(&self) {
        if !self.teardown() {
            debug!("logout while disconnected");
            return;
        }
        if let Err(e) = self.store.clear() {
            warn!(error = %e, "failed to clear stored session");
        }
        self.session_token.replace(store::generate_session_token());
        self.sink
            .borrow_mut()
            .show_session(SessionState::Disconnected);
        info!("logged out");
    }

    async fn send_chat(&self, text: &str) -> Result<()> {
        let message = text.trim();
        if message.is_empty() {
            return Err(ClientError::validation("Message is empty"));
        }
        let Some(active) = self
            .active()
            .filter(|active| !active.context.identity.is_guest())
        else {
            return Err(ClientError::validation("Please login to chat"));
        };
        let request = ChatPostRequest {
            message: message.to_string(),
            session_token: active.context.identity.session_token.clone(),
        };
        self.api.post_chat(&request).await?;
        active.scheduler.refresh_panel_now(Panel::Chat);
        Ok(())
    }

    async fn save_export(&self, what: &str, path: &Path, bytes: Bytes) -> Result<()> {
        tokio::fs::write(path, &bytes).await?;
        info!(path = %path.display(), len = bytes.len(), "{what} saved");
        self.sink
            .borrow_mut()
            .notify(Notice::info(format!("Saved {what} to {}", path.display())));
        Ok(())
    }
}

/// Human-readable list of finished episodes.
pub fn format_history(entries: &[HistoryEntry]) -> String {
    if entries.is_empty() {
        return "No history available".to_string();
    }
    let mut out = String::from("Previous Episodes:");
    for entry in entries {
        let date = time_format::format_date(entry.ended_at).unwrap_or_else(|| "unknown date".to_string());
        let _ = write!(out, "\nEpisode {} - {date}", entry.episode_number);
    }
    out
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;
    use std::time::Duration;

    use placeboard_shared::{HistoryEntry, Mood, Region};
    use tokio::task::LocalSet;

    use super::{App, format_history};
    use crate::api::Credentials;
    use crate::command::Command;
    use crate::config::Config;
    use crate::error::ClientError;
    use crate::session::SessionState;
    use crate::sink::NoticeLevel;
    use crate::store::{MemorySessionStore, SessionStore};
    use crate::sync::Panel;
    use crate::testing::{RecordingSink, ScriptedApi, settle};

    type TestApp = App<ScriptedApi, RecordingSink, MemorySessionStore>;

    fn app(store: MemorySessionStore) -> (Rc<ScriptedApi>, Rc<RefCell<RecordingSink>>, TestApp) {
        let api = Rc::new(ScriptedApi::default());
        let sink = Rc::new(RefCell::new(RecordingSink::default()));
        let config = Config {
            poll_interval: Duration::from_secs(3_600),
            ..Config::default()
        };
        let app = App::new(Rc::clone(&api), Rc::clone(&sink), store, config);
        (api, sink, app)
    }

    fn credentials(token: &str, user_id: u64) -> Credentials {
        Credentials {
            session_token: token.to_string(),
            user_id,
        }
    }

    #[tokio::test]
    async fn starts_disconnected_with_persisted_anonymous_token() {
        let (_api, sink, app) = app(MemorySessionStore::new());
        assert_eq!(app.state(), SessionState::Disconnected);
        assert_eq!(sink.borrow().sessions, vec![SessionState::Disconnected]);
        let token = app.store().load().expect("token should be persisted");
        assert!(token.starts_with("sess_"));
    }

    #[tokio::test]
    async fn guest_uses_stored_token_and_starts_polling() {
        LocalSet::new()
            .run_until(async {
                let (api, sink, app) = app(MemorySessionStore::with_token("sess_kept"));
                app.dispatch(Command::Guest).await.expect("guest");
                settle().await;

                assert_eq!(app.state(), SessionState::Connected { guest: true });
                let identity = app.identity().expect("connected");
                assert_eq!(identity.session_token, "sess_kept");
                assert_eq!(identity.user_id, None);
                assert_eq!(api.region_requests.borrow().len(), 1);
                assert_eq!(api.panel_calls(Panel::Episode), 1);
                assert_eq!(sink.borrow().frames.len(), 1);
            })
            .await;
    }

    #[tokio::test]
    async fn login_persists_token_and_connects() {
        LocalSet::new()
            .run_until(async {
                let (api, sink, app) = app(MemorySessionStore::new());
                *api.auth_result.borrow_mut() = Some(Ok(credentials("sess_user", 42)));

                app.dispatch(Command::Login {
                    email: " a@b.c ".to_string(),
                    password: "hunter2".to_string(),
                })
                .await
                .expect("login");

                assert_eq!(api.login_requests.borrow()[0].email, "a@b.c");
                assert_eq!(app.state(), SessionState::Connected { guest: false });
                assert_eq!(app.identity().and_then(|i| i.user_id), Some(42));
                assert_eq!(app.store().load().as_deref(), Some("sess_user"));
                assert_eq!(
                    sink.borrow().sessions.last(),
                    Some(&SessionState::Connected { guest: false })
                );
            })
            .await;
    }

    #[tokio::test]
    async fn failed_login_stays_disconnected_and_shows_reason() {
        LocalSet::new()
            .run_until(async {
                let (_api, sink, app) = app(MemorySessionStore::new());
                let result = app
                    .dispatch(Command::Login {
                        email: "a@b.c".to_string(),
                        password: "wrong".to_string(),
                    })
                    .await;

                assert_eq!(result, Err(ClientError::rejected("Invalid credentials")));
                assert_eq!(app.state(), SessionState::Disconnected);
                let sink = sink.borrow();
                let notice = sink.notices.last().expect("notice");
                assert_eq!(notice.level, NoticeLevel::Warning);
                assert_eq!(notice.message, "Invalid credentials");
            })
            .await;
    }

    #[tokio::test]
    async fn register_requires_all_fields() {
        LocalSet::new()
            .run_until(async {
                let (api, _sink, app) = app(MemorySessionStore::new());
                let result = app
                    .dispatch(Command::Register {
                        email: "a@b.c".to_string(),
                        username: " ".to_string(),
                        password: "pw".to_string(),
                    })
                    .await;
                assert!(matches!(result, Err(ClientError::Validation(_))));
                assert!(api.register_requests.borrow().is_empty());

                *api.auth_result.borrow_mut() = Some(Ok(credentials("sess_new", 7)));
                app.dispatch(Command::Register {
                    email: "a@b.c".to_string(),
                    username: "alice".to_string(),
                    password: "pw".to_string(),
                })
                .await
                .expect("register");
                assert_eq!(app.identity().and_then(|i| i.user_id), Some(7));
            })
            .await;
    }

    #[tokio::test]
    async fn logout_stops_polling_and_rotates_token() {
        LocalSet::new()
            .run_until(async {
                let (api, sink, app) = app(MemorySessionStore::new());
                *api.auth_result.borrow_mut() = Some(Ok(credentials("sess_user", 1)));
                app.dispatch(Command::Login {
                    email: "a@b.c".to_string(),
                    password: "pw".to_string(),
                })
                .await
                .expect("login");
                settle().await;
                let before = api.region_requests.borrow().len();

                app.dispatch(Command::Logout).await.expect("logout");
                assert_eq!(app.state(), SessionState::Disconnected);
                assert_eq!(app.store().load(), None);
                assert_eq!(sink.borrow().sessions.last(), Some(&SessionState::Disconnected));

                app.dispatch(Command::ZoomIn).await.expect("ignored");
                app.dispatch(Command::Place {
                    screen_x: 5.0,
                    screen_y: 5.0,
                })
                .await
                .expect("ignored");
                settle().await;
                assert_eq!(api.region_requests.borrow().len(), before);
                assert!(api.place_requests.borrow().is_empty());

                app.dispatch(Command::Guest).await.expect("guest");
                let guest_token = app.identity().map(|i| i.session_token.clone());
                assert_ne!(guest_token.as_deref(), Some("sess_user"));

                app.dispatch(Command::Logout).await.expect("logout");
                app.dispatch(Command::Logout).await.expect("second logout is a no-op");
            })
            .await;
    }

    #[tokio::test]
    async fn new_session_starts_with_fresh_view_and_cooldown() {
        LocalSet::new()
            .run_until(async {
                let (api, _sink, app) = app(MemorySessionStore::new());
                app.dispatch(Command::Guest).await.expect("guest");
                app.dispatch(Command::ZoomIn).await.expect("zoom");
                app.dispatch(Command::Place {
                    screen_x: 5.0,
                    screen_y: 5.0,
                })
                .await
                .expect("place");
                assert!(app.cooldown_remaining() > 0);

                app.dispatch(Command::Logout).await.expect("logout");
                app.dispatch(Command::Guest).await.expect("guest again");
                assert_eq!(app.viewport().map(|v| v.zoom()), Some(1.0));
                assert_eq!(app.cooldown_remaining(), 0);

                app.dispatch(Command::Place {
                    screen_x: 5.0,
                    screen_y: 5.0,
                })
                .await
                .expect("place after new session");
                assert_eq!(api.place_requests.borrow().len(), 2);
            })
            .await;
    }

    #[tokio::test]
    async fn view_commands_refresh_the_new_region() {
        LocalSet::new()
            .run_until(async {
                let (api, sink, app) = app(MemorySessionStore::new());
                app.dispatch(Command::Guest).await.expect("guest");
                settle().await;

                app.dispatch(Command::ZoomIn).await.expect("zoom");
                settle().await;
                assert_eq!(
                    api.region_requests.borrow().last(),
                    Some(&Region::new(8, 8, 34, 34))
                );
                assert_eq!(
                    sink.borrow().frames.last().map(|f| f.region),
                    Some(Region::new(8, 8, 34, 34))
                );

                let count = api.region_requests.borrow().len();
                app.dispatch(Command::Pan { dx: -100.0, dy: 0.0 })
                    .await
                    .expect("pan");
                app.dispatch(Command::Pan { dx: -100.0, dy: 0.0 })
                    .await
                    .expect("pan at edge");
                settle().await;
                assert_eq!(api.region_requests.borrow().len(), count + 1);
            })
            .await;
    }

    #[tokio::test]
    async fn placement_uses_selection_and_reports_cooldown() {
        LocalSet::new()
            .run_until(async {
                let (api, sink, app) = app(MemorySessionStore::new());
                app.dispatch(Command::Guest).await.expect("guest");
                app.dispatch(Command::SelectColor(9)).await.expect("color");
                app.dispatch(Command::SelectMood(Mood::Energetic))
                    .await
                    .expect("mood");
                assert!(app.dispatch(Command::SelectColor(16)).await.is_err());

                app.dispatch(Command::PlaceCell { x: 4, y: 7 })
                    .await
                    .expect("place");
                {
                    let sent = api.place_requests.borrow();
                    assert_eq!((sent[0].x, sent[0].y), (4, 7));
                    assert_eq!(sent[0].color_index, 9);
                    assert_eq!(sent[0].mood_index, 3);
                }

                let result = app.dispatch(Command::PlaceCell { x: 5, y: 7 }).await;
                assert!(matches!(result, Err(ClientError::Validation(m)) if m.starts_with("Please wait for cooldown!")));
                assert_eq!(api.place_requests.borrow().len(), 1);
                assert_eq!(sink.borrow().cooldowns.first(), Some(&0));
            })
            .await;
    }

    #[tokio::test]
    async fn commands_run_while_a_placement_is_outstanding() {
        LocalSet::new()
            .run_until(async {
                let (api, _sink, app) = app(MemorySessionStore::new());
                let app = Rc::new(app);
                app.dispatch(Command::Guest).await.expect("guest");
                api.hold_places.set(true);

                let pending = tokio::task::spawn_local({
                    let app = Rc::clone(&app);
                    async move { app.dispatch(Command::PlaceCell { x: 0, y: 0 }).await }
                });
                settle().await;
                assert_eq!(api.place_requests.borrow().len(), 1);

                app.dispatch(Command::ZoomIn).await.expect("zoom");
                assert_eq!(app.viewport().map(|v| v.zoom()), Some(1.5));
                let second = app.dispatch(Command::PlaceCell { x: 1, y: 1 }).await;
                assert_eq!(
                    second,
                    Err(ClientError::validation("Previous placement is still being sent"))
                );
                assert_eq!(api.place_requests.borrow().len(), 1);

                api.release_place(Ok(()));
                pending.await.expect("placement task").expect("placed");
                assert!(app.cooldown_remaining() > 0);
            })
            .await;
    }

    #[tokio::test]
    async fn service_rejection_is_shown_verbatim() {
        LocalSet::new()
            .run_until(async {
                let (api, sink, app) = app(MemorySessionStore::new());
                app.dispatch(Command::Guest).await.expect("guest");
                api.place_results
                    .borrow_mut()
                    .push_back(Err(ClientError::rejected("Episode is frozen")));

                let result = app.dispatch(Command::PlaceCell { x: 0, y: 0 }).await;
                assert_eq!(result, Err(ClientError::rejected("Episode is frozen")));
                assert_eq!(app.cooldown_remaining(), 0);
                assert_eq!(
                    sink.borrow().notices.last().map(|n| n.message.as_str()),
                    Some("Episode is frozen")
                );
            })
            .await;
    }

    #[tokio::test]
    async fn chat_requires_login_and_refreshes_chat() {
        LocalSet::new()
            .run_until(async {
                let (api, _sink, app) = app(MemorySessionStore::new());
                assert!(app.dispatch(Command::SendChat("hi".to_string())).await.is_err());

                app.dispatch(Command::Guest).await.expect("guest");
                let result = app.dispatch(Command::SendChat("hi".to_string())).await;
                assert_eq!(result, Err(ClientError::validation("Please login to chat")));
                let result = app.dispatch(Command::SendChat("   ".to_string())).await;
                assert_eq!(result, Err(ClientError::validation("Message is empty")));
                assert!(api.chat_posts.borrow().is_empty());

                *api.auth_result.borrow_mut() = Some(Ok(credentials("sess_user", 3)));
                app.dispatch(Command::Login {
                    email: "a@b.c".to_string(),
                    password: "pw".to_string(),
                })
                .await
                .expect("login");
                settle().await;
                let chat_fetches = api.panel_calls(Panel::Chat);

                assert!(app.dispatch(Command::SendChat("   ".to_string())).await.is_err());
                app.dispatch(Command::SendChat("  hello canvas ".to_string()))
                    .await
                    .expect("chat");
                settle().await;

                let posts = api.chat_posts.borrow();
                assert_eq!(posts.len(), 1);
                assert_eq!(posts[0].message, "hello canvas");
                assert_eq!(posts[0].session_token, "sess_user");
                assert_eq!(api.panel_calls(Panel::Chat), chat_fetches + 1);
            })
            .await;
    }

    #[tokio::test]
    async fn export_writes_downloaded_bytes() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("canvas.png");
        let (api, sink, app) = app(MemorySessionStore::new());

        app.dispatch(Command::ExportPng(path.clone()))
            .await
            .expect("export");
        assert_eq!(std::fs::read(&path).expect("file"), b"\x89PNG");
        assert_eq!(sink.borrow().notices.last().map(|n| n.level), Some(NoticeLevel::Info));

        *api.export_result.borrow_mut() = Some(Err(ClientError::rejected("No episode to export")));
        let result = app
            .dispatch(Command::ExportVideo(dir.path().join("ep.mp4")))
            .await;
        assert_eq!(result, Err(ClientError::rejected("No episode to export")));
        assert!(!dir.path().join("ep.mp4").exists());
    }

    #[tokio::test]
    async fn history_is_listed_by_episode() {
        let (api, sink, app) = app(MemorySessionStore::new());
        app.dispatch(Command::ViewHistory).await.expect("history");
        assert_eq!(
            sink.borrow().notices.last().map(|n| n.message.clone()),
            Some("No history available".to_string())
        );

        api.history_entries.borrow_mut().push(HistoryEntry {
            episode_number: 3,
            ended_at: 1_700_000_000,
            thumbnail: None,
        });
        app.dispatch(Command::ViewHistory).await.expect("history");
        assert_eq!(
            sink.borrow().notices.last().map(|n| n.message.clone()),
            Some("Previous Episodes:\nEpisode 3 - 2023-11-14".to_string())
        );
    }

    #[test]
    fn history_lists_every_entry() {
        let entries = [
            HistoryEntry {
                episode_number: 1,
                ended_at: 0,
                thumbnail: None,
            },
            HistoryEntry {
                episode_number: 2,
                ended_at: 86_400,
                thumbnail: Some("t.png".to_string()),
            },
        ];
        assert_eq!(
            format_history(&entries),
            "Previous Episodes:\nEpisode 1 - 1970-01-01\nEpisode 2 - 1970-01-02"
        );
    }
}
