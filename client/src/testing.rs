//! In-process doubles for the canvas service and the presentation sink.

use std::cell::{Cell as StdCell, RefCell};
use std::collections::{HashMap, HashSet, VecDeque};

use bytes::Bytes;
use placeboard_shared::{
    ChatMessage, ChatPostRequest, EpisodeInfo, HistoryEntry, LoginRequest, PlacePixelRequest,
    Pixel, Quest, Region, RegisterRequest, SeasonInfo,
};
use tokio::sync::oneshot;

use crate::api::{CanvasApi, Credentials};
use crate::error::{ClientError, Result};
use crate::session::SessionState;
use crate::sink::{Notice, PanelUpdate, PresentationSink, RegionFrame};
use crate::sync::Panel;

pub(crate) fn pixel(x: u32, y: u32, color_index: u8) -> Pixel {
    Pixel {
        x,
        y,
        color_index,
        mood: None,
        timestamp: None,
        user_id: None,
    }
}

/// Let spawned local tasks run to their next await point. Does not move the
/// clock; timer-driven work needs `tokio::time` to advance.
pub(crate) async fn settle() {
    for _ in 0..32 {
        tokio::task::yield_now().await;
    }
}

/// Scripted canvas service. Region requests answer immediately with one
/// pixel at the region origin unless `hold_regions` is set, in which case
/// each waits for [`ScriptedApi::release_region`].
#[derive(Default)]
pub(crate) struct ScriptedApi {
    pub hold_regions: StdCell<bool>,
    pub region_requests: RefCell<Vec<Region>>,
    held_regions: RefCell<Vec<Option<oneshot::Sender<Result<Vec<Pixel>>>>>>,
    regions_in_flight: StdCell<usize>,
    pub max_regions_in_flight: StdCell<usize>,

    panel_calls: RefCell<HashMap<Panel, usize>>,
    failing_panels: RefCell<HashMap<Panel, ClientError>>,
    held_panel_kinds: RefCell<HashSet<Panel>>,
    held_panels: RefCell<Vec<oneshot::Sender<()>>>,

    pub place_requests: RefCell<Vec<PlacePixelRequest>>,
    pub place_results: RefCell<VecDeque<Result<()>>>,
    pub hold_places: StdCell<bool>,
    held_places: RefCell<VecDeque<oneshot::Sender<Result<()>>>>,

    pub login_requests: RefCell<Vec<LoginRequest>>,
    pub register_requests: RefCell<Vec<RegisterRequest>>,
    pub auth_result: RefCell<Option<Result<Credentials>>>,

    pub chat_posts: RefCell<Vec<ChatPostRequest>>,
    pub chat_post_result: RefCell<Option<Result<()>>>,

    pub export_result: RefCell<Option<Result<Bytes>>>,
    pub history_entries: RefCell<Vec<HistoryEntry>>,
}

impl ScriptedApi {
    pub fn holding_regions() -> Self {
        let api = Self::default();
        api.hold_regions.set(true);
        api
    }

    pub fn release_region(&self, index: usize, result: Result<Vec<Pixel>>) {
        let sender = self
            .held_regions
            .borrow_mut()
            .get_mut(index)
            .and_then(Option::take)
            .expect("no held region request at that index");
        let _ = sender.send(result);
    }

    /// Answer the oldest held placement.
    pub fn release_place(&self, result: Result<()>) {
        let sender = self
            .held_places
            .borrow_mut()
            .pop_front()
            .expect("no held placement");
        let _ = sender.send(result);
    }

    pub fn panel_calls(&self, panel: Panel) -> usize {
        self.panel_calls.borrow().get(&panel).copied().unwrap_or(0)
    }

    pub fn fail_panel(&self, panel: Panel, error: ClientError) {
        self.failing_panels.borrow_mut().insert(panel, error);
    }

    pub fn hold_panel(&self, panel: Panel) {
        self.held_panel_kinds.borrow_mut().insert(panel);
    }

    /// Complete every held panel request and stop holding new ones.
    pub fn release_panels(&self) {
        self.held_panel_kinds.borrow_mut().clear();
        for sender in self.held_panels.borrow_mut().drain(..) {
            let _ = sender.send(());
        }
    }

    async fn panel_gate(&self, panel: Panel) -> Result<()> {
        *self.panel_calls.borrow_mut().entry(panel).or_default() += 1;
        if self.held_panel_kinds.borrow().contains(&panel) {
            let (tx, rx) = oneshot::channel();
            self.held_panels.borrow_mut().push(tx);
            let _ = rx.await;
        }
        match self.failing_panels.borrow().get(&panel) {
            Some(error) => Err(error.clone()),
            None => Ok(()),
        }
    }
}

impl CanvasApi for ScriptedApi {
    async fn place_pixel(&self, request: &PlacePixelRequest) -> Result<()> {
        self.place_requests.borrow_mut().push(request.clone());
        if self.hold_places.get() {
            let (tx, rx) = oneshot::channel();
            self.held_places.borrow_mut().push_back(tx);
            return rx
                .await
                .unwrap_or_else(|_| Err(ClientError::transport("request dropped")));
        }
        self.place_results.borrow_mut().pop_front().unwrap_or(Ok(()))
    }

    async fn canvas_region(&self, region: Region) -> Result<Vec<Pixel>> {
        self.region_requests.borrow_mut().push(region);
        let in_flight = self.regions_in_flight.get() + 1;
        self.regions_in_flight.set(in_flight);
        self.max_regions_in_flight
            .set(self.max_regions_in_flight.get().max(in_flight));

        let result = if self.hold_regions.get() {
            let (tx, rx) = oneshot::channel();
            self.held_regions.borrow_mut().push(Some(tx));
            rx.await
                .unwrap_or_else(|_| Err(ClientError::transport("request dropped")))
        } else {
            Ok(vec![pixel(region.x, region.y, 1)])
        };

        self.regions_in_flight.set(self.regions_in_flight.get() - 1);
        result
    }

    async fn login(&self, request: &LoginRequest) -> Result<Credentials> {
        self.login_requests.borrow_mut().push(request.clone());
        self.auth_result
            .borrow_mut()
            .take()
            .unwrap_or_else(|| Err(ClientError::rejected("Invalid credentials")))
    }

    async fn register(&self, request: &RegisterRequest) -> Result<Credentials> {
        self.register_requests.borrow_mut().push(request.clone());
        self.auth_result
            .borrow_mut()
            .take()
            .unwrap_or_else(|| Err(ClientError::rejected("Registration failed")))
    }

    async fn episode(&self) -> Result<EpisodeInfo> {
        self.panel_gate(Panel::Episode).await?;
        Ok(EpisodeInfo {
            number: 1,
            seconds_remaining: 600,
            is_active: true,
            is_frozen: false,
        })
    }

    async fn season(&self) -> Result<SeasonInfo> {
        self.panel_gate(Panel::Season).await?;
        Ok(SeasonInfo {
            name: "Spring".to_string(),
        })
    }

    async fn quests(&self) -> Result<Vec<Quest>> {
        self.panel_gate(Panel::Quests).await?;
        Ok(Vec::new())
    }

    async fn chat(&self) -> Result<Vec<ChatMessage>> {
        self.panel_gate(Panel::Chat).await?;
        Ok(Vec::new())
    }

    async fn post_chat(&self, request: &ChatPostRequest) -> Result<()> {
        self.chat_posts.borrow_mut().push(request.clone());
        self.chat_post_result.borrow_mut().take().unwrap_or(Ok(()))
    }

    async fn export_png(&self) -> Result<Bytes> {
        self.export_result
            .borrow_mut()
            .take()
            .unwrap_or_else(|| Ok(Bytes::from_static(b"\x89PNG")))
    }

    async fn export_video(&self) -> Result<Bytes> {
        self.export_result
            .borrow_mut()
            .take()
            .unwrap_or_else(|| Ok(Bytes::from_static(b"\x00\x00\x00\x18ftypmp42")))
    }

    async fn history(&self) -> Result<Vec<HistoryEntry>> {
        Ok(self.history_entries.borrow().clone())
    }
}

/// Sink that records everything it is shown.
#[derive(Debug, Default)]
pub(crate) struct RecordingSink {
    pub frames: Vec<RegionFrame>,
    pub panels: Vec<PanelUpdate>,
    pub cooldowns: Vec<u64>,
    pub sessions: Vec<SessionState>,
    pub notices: Vec<Notice>,
}

impl PresentationSink for RecordingSink {
    fn draw_region(&mut self, frame: RegionFrame) {
        self.frames.push(frame);
    }

    fn show_panel(&mut self, update: PanelUpdate) {
        self.panels.push(update);
    }

    fn show_cooldown(&mut self, remaining_secs: u64) {
        self.cooldowns.push(remaining_secs);
    }

    fn show_session(&mut self, state: SessionState) {
        self.sessions.push(state);
    }

    fn notify(&mut self, notice: Notice) {
        self.notices.push(notice);
    }
}
