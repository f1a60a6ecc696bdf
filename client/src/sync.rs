//! Periodic refresh of the visible region and the side panels.
//!
//! Every request is tagged when issued. Region payloads carry the generation
//! of the viewport region they were requested for and are dropped when the
//! viewport has moved on by the time they arrive. Each resource has at most
//! one request outstanding; a cycle that finds one in flight skips it.

use std::cell::RefCell;
use std::collections::HashSet;
use std::rc::Rc;
use std::time::Duration;

use placeboard_shared::{Pixel, Region};
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, info, trace, warn};

use crate::api::CanvasApi;
use crate::error::Result;
use crate::sink::{PanelUpdate, PresentationSink, RegionFrame};
use crate::viewport::Viewport;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Panel {
    Episode,
    Season,
    Quests,
    Chat,
}

impl Panel {
    pub const ALL: [Panel; 4] = [Panel::Episode, Panel::Season, Panel::Quests, Panel::Chat];

    pub fn label(self) -> &'static str {
        match self {
            Panel::Episode => "episode",
            Panel::Season => "season",
            Panel::Quests => "quests",
            Panel::Chat => "chat",
        }
    }
}

#[derive(Debug, Default)]
struct SyncState {
    running: bool,
    generation: u64,
    last_region: Option<Region>,
    /// Generation of the outstanding region request.
    region_in_flight: Option<u64>,
    region_refetch: bool,
    panels_in_flight: HashSet<Panel>,
    panel_refetch: HashSet<Panel>,
    timer: Option<JoinHandle<()>>,
}

struct Shared<A, S> {
    api: Rc<A>,
    sink: Rc<RefCell<S>>,
    viewport: Rc<RefCell<Viewport>>,
    interval: Duration,
    state: RefCell<SyncState>,
}

/// Drives refreshes for one session. Clones share the same schedule.
pub struct SyncScheduler<A, S> {
    shared: Rc<Shared<A, S>>,
}

impl<A, S> Clone for SyncScheduler<A, S> {
    fn clone(&self) -> Self {
        Self {
            shared: Rc::clone(&self.shared),
        }
    }
}

impl<A, S> SyncScheduler<A, S>
where
    A: CanvasApi + 'static,
    S: PresentationSink + 'static,
{
    pub fn new(
        api: Rc<A>,
        sink: Rc<RefCell<S>>,
        viewport: Rc<RefCell<Viewport>>,
        interval: Duration,
    ) -> Self {
        Self {
            shared: Rc::new(Shared {
                api,
                sink,
                viewport,
                interval,
                state: RefCell::new(SyncState::default()),
            }),
        }
    }

    /// Run one cycle right away, then one per interval. Calling `start` on a
    /// running scheduler does nothing. Must be called inside a `LocalSet`.
    ///
    /// The first cycle is issued before `start` returns, so the initial
    /// requests never wait on the timer.
    pub fn start(&self) {
        let period = self.shared.interval;
        {
            let mut state = self.shared.state.borrow_mut();
            if state.running {
                return;
            }
            state.running = true;

            let weak = Rc::downgrade(&self.shared);
            state.timer = Some(tokio::task::spawn_local(async move {
                let mut interval = tokio::time::interval_at(Instant::now() + period, period);
                interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
                loop {
                    interval.tick().await;
                    let Some(shared) = weak.upgrade() else {
                        return;
                    };
                    shared.run_cycle();
                }
            }));
        }
        info!(interval_ms = period.as_millis() as u64, "sync started");
        self.shared.run_cycle();
    }

    /// Cancel the timer. Requests already in flight finish but their results
    /// are ignored.
    pub fn stop(&self) {
        let mut state = self.shared.state.borrow_mut();
        if !state.running {
            return;
        }
        state.running = false;
        state.region_refetch = false;
        state.panel_refetch.clear();
        if let Some(timer) = state.timer.take() {
            timer.abort();
        }
        info!("sync stopped");
    }

    pub fn is_running(&self) -> bool {
        self.shared.state.borrow().running
    }

    /// Issue the region request and every panel request not already in flight.
    pub fn run_cycle(&self) {
        self.shared.run_cycle();
    }

    /// Fetch the visible region now, outside the periodic schedule. If a
    /// request for the current region is already outstanding, one follow-up
    /// fetch runs after it completes, however many times this is called.
    pub fn refresh_now(&self) {
        self.shared.issue_region(true);
    }

    /// Like [`refresh_now`](Self::refresh_now) for a single panel.
    pub fn refresh_panel_now(&self, panel: Panel) {
        self.shared.issue_panel(panel, true);
    }

    /// Generation of the region currently in view. Bumps if the viewport
    /// has moved to a different region since it was last observed.
    pub fn generation(&self) -> u64 {
        self.shared.observe_region().0
    }

    pub fn region_in_flight(&self) -> bool {
        self.shared.state.borrow().region_in_flight.is_some()
    }
}

impl<A, S> Shared<A, S>
where
    A: CanvasApi + 'static,
    S: PresentationSink + 'static,
{
    fn run_cycle(self: &Rc<Self>) {
        trace!("sync cycle");
        self.issue_region(false);
        for panel in Panel::ALL {
            self.issue_panel(panel, false);
        }
    }

    fn observe_region(&self) -> (u64, Region) {
        let region = {
            let mut viewport = self.viewport.borrow_mut();
            viewport.clamp();
            viewport.current_region()
        };
        let mut state = self.state.borrow_mut();
        if state.last_region != Some(region) {
            state.generation += 1;
            state.last_region = Some(region);
            debug!(generation = state.generation, ?region, "visible region changed");
        }
        (state.generation, region)
    }

    fn issue_region(self: &Rc<Self>, coalesce: bool) {
        if !self.state.borrow().running {
            return;
        }
        let (generation, region) = self.observe_region();
        {
            let mut state = self.state.borrow_mut();
            if state.region_in_flight == Some(generation) {
                if coalesce {
                    state.region_refetch = true;
                }
                trace!(generation, "region request already in flight");
                return;
            }
            state.region_in_flight = Some(generation);
            state.region_refetch = false;
        }

        debug!(generation, ?region, "fetching region");
        let shared = Rc::clone(self);
        tokio::task::spawn_local(async move {
            let result = shared.api.canvas_region(region).await;
            shared.finish_region(generation, region, result);
        });
    }

    fn finish_region(self: &Rc<Self>, issued: u64, region: Region, result: Result<Vec<Pixel>>) {
        let (current, _) = self.observe_region();
        let (running, refetch, idle) = {
            let mut state = self.state.borrow_mut();
            if state.region_in_flight == Some(issued) {
                state.region_in_flight = None;
            }
            let refetch = issued == current && std::mem::take(&mut state.region_refetch);
            (state.running, refetch, state.region_in_flight.is_none())
        };
        if !running {
            debug!(generation = issued, "ignoring region result after stop");
            return;
        }

        match result {
            Ok(pixels) if issued == current => {
                let viewport = *self.viewport.borrow();
                self.sink.borrow_mut().draw_region(RegionFrame {
                    region,
                    viewport,
                    pixels,
                });
            }
            Ok(pixels) => {
                debug!(
                    issued,
                    current,
                    discarded = pixels.len(),
                    "discarding stale region payload"
                );
            }
            Err(e) => warn!(error = %e, ?region, "region fetch failed"),
        }

        // A stale result means the current region may never have been asked for.
        if refetch || (issued != current && idle) {
            self.issue_region(false);
        }
    }

    fn issue_panel(self: &Rc<Self>, panel: Panel, coalesce: bool) {
        {
            let mut state = self.state.borrow_mut();
            if !state.running {
                return;
            }
            if !state.panels_in_flight.insert(panel) {
                if coalesce {
                    state.panel_refetch.insert(panel);
                }
                trace!(panel = panel.label(), "panel request already in flight");
                return;
            }
        }

        let shared = Rc::clone(self);
        tokio::task::spawn_local(async move {
            let result = fetch_panel(&*shared.api, panel).await;
            shared.finish_panel(panel, result);
        });
    }

    fn finish_panel(self: &Rc<Self>, panel: Panel, result: Result<PanelUpdate>) {
        let (running, refetch) = {
            let mut state = self.state.borrow_mut();
            state.panels_in_flight.remove(&panel);
            (state.running, state.panel_refetch.remove(&panel))
        };
        if !running {
            return;
        }
        match result {
            Ok(update) => self.sink.borrow_mut().show_panel(update),
            Err(e) => warn!(panel = panel.label(), error = %e, "panel refresh failed"),
        }
        if refetch {
            self.issue_panel(panel, false);
        }
    }
}

async fn fetch_panel<A: CanvasApi>(api: &A, panel: Panel) -> Result<PanelUpdate> {
    match panel {
        Panel::Episode => api.episode().await.map(PanelUpdate::Episode),
        Panel::Season => api.season().await.map(PanelUpdate::Season),
        Panel::Quests => api.quests().await.map(PanelUpdate::Quests),
        Panel::Chat => api.chat().await.map(PanelUpdate::Chat),
    }
}
