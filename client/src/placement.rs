use std::cell::{Cell as StdCell, RefCell};
use std::rc::Rc;
use std::time::Duration;

use placeboard_shared::{Cell, Mood, PlacePixelRequest, colors};
use tracing::{debug, info, warn};

use crate::api::CanvasApi;
use crate::cooldown::{self, CooldownGate};
use crate::error::ClientError;
use crate::session::Identity;
use crate::sink::PresentationSink;
use crate::sync::SyncScheduler;
use crate::viewport::Viewport;

/// Result of a single placement attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlaceOutcome {
    Placed { cell: Cell, cooldown: Duration },
    /// The click mapped outside the grid. Nothing was sent.
    OutsideGrid,
    /// An earlier placement is still awaiting the service. Nothing was sent.
    InFlight,
    /// The local cooldown is running. Nothing was sent.
    CoolingDown { remaining_secs: u64 },
    /// Color or mood failed local validation. Nothing was sent.
    Invalid(String),
    /// The service refused the placement; the reason is shown verbatim.
    Rejected(String),
    Failed(String),
}

/// Turns a screen click into at most one placement request.
pub struct PlacementController<A, S> {
    api: Rc<A>,
    identity: Identity,
    viewport: Rc<RefCell<Viewport>>,
    cooldown: Rc<RefCell<CooldownGate>>,
    scheduler: SyncScheduler<A, S>,
    pixel_unit: f64,
    cooldown_tick: Duration,
    in_flight: StdCell<bool>,
}

/// Clears the in-flight flag however the request ends, including when the
/// placing task is dropped.
struct InFlightGuard<'a>(&'a StdCell<bool>);

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.0.set(false);
    }
}

impl<A, S> PlacementController<A, S>
where
    A: CanvasApi + 'static,
    S: PresentationSink + 'static,
{
    pub fn new(
        api: Rc<A>,
        identity: Identity,
        viewport: Rc<RefCell<Viewport>>,
        cooldown: Rc<RefCell<CooldownGate>>,
        scheduler: SyncScheduler<A, S>,
        pixel_unit: f64,
        cooldown_tick: Duration,
    ) -> Self {
        Self {
            api,
            identity,
            viewport,
            cooldown,
            scheduler,
            pixel_unit,
            cooldown_tick,
            in_flight: StdCell::new(false),
        }
    }

    /// Validate locally, then send at most one request. Concurrent attempts
    /// share the cooldown check, so only one may be outstanding at a time.
    pub async fn attempt_place(
        &self,
        screen_x: f64,
        screen_y: f64,
        color_index: u8,
        mood: Mood,
    ) -> PlaceOutcome {
        let Some(cell) = self
            .viewport
            .borrow()
            .screen_to_cell(screen_x, screen_y, self.pixel_unit)
        else {
            debug!(screen_x, screen_y, "click outside grid");
            return PlaceOutcome::OutsideGrid;
        };

        if self.in_flight.get() {
            debug!("placement already in flight");
            return PlaceOutcome::InFlight;
        }

        let remaining_secs = self.cooldown.borrow_mut().remaining_seconds();
        if remaining_secs > 0 {
            debug!(remaining_secs, "placement blocked by cooldown");
            return PlaceOutcome::CoolingDown { remaining_secs };
        }

        if !colors::is_palette_index(color_index) {
            return PlaceOutcome::Invalid(format!("unknown color index {color_index}"));
        }

        self.in_flight.set(true);
        let _guard = InFlightGuard(&self.in_flight);
        let request = PlacePixelRequest {
            x: cell.x,
            y: cell.y,
            color_index,
            mood_index: mood.index(),
            session_token: self.identity.session_token.clone(),
        };
        match self.api.place_pixel(&request).await {
            Ok(()) => {
                let duration = cooldown::cooldown_for(self.identity.user_id);
                self.cooldown.borrow_mut().start(duration);
                cooldown::spawn_ticker(Rc::clone(&self.cooldown), self.cooldown_tick);
                self.scheduler.refresh_now();
                info!(x = cell.x, y = cell.y, color_index, %mood, "pixel placed");
                PlaceOutcome::Placed {
                    cell,
                    cooldown: duration,
                }
            }
            Err(ClientError::Rejected(reason)) => {
                info!(%reason, "placement rejected");
                PlaceOutcome::Rejected(reason)
            }
            Err(e) => {
                warn!(error = %e, "placement failed");
                PlaceOutcome::Failed(e.to_string())
            }
        }
    }
}
