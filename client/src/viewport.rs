use placeboard_shared::{Cell, Region};

/// Viewport manages zoom and pan over the logical grid and maps screen
/// positions onto grid cells.
///
/// Pan is kept in logical grid units. After every mutation pan is clamped so
/// the visible window stays inside the grid.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    zoom: f64,
    pan_x: f64,
    pan_y: f64,
    grid_size: u32,
}

pub const MIN_ZOOM: f64 = 0.5;
pub const MAX_ZOOM: f64 = 5.0;
pub const ZOOM_STEP: f64 = 1.5;

impl Viewport {
    pub fn new(grid_size: u32) -> Self {
        Self {
            zoom: 1.0,
            pan_x: 0.0,
            pan_y: 0.0,
            grid_size,
        }
    }

    pub fn zoom(&self) -> f64 {
        self.zoom
    }

    pub fn pan_x(&self) -> f64 {
        self.pan_x
    }

    pub fn pan_y(&self) -> f64 {
        self.pan_y
    }

    pub fn grid_size(&self) -> u32 {
        self.grid_size
    }

    /// Visible columns, rounded up.
    pub fn visible_width(&self) -> u32 {
        (f64::from(self.grid_size) / self.zoom).ceil() as u32
    }

    /// Visible rows, rounded up.
    pub fn visible_height(&self) -> u32 {
        self.visible_width()
    }

    /// Grid point at the center of the visible window.
    pub fn center(&self) -> (f64, f64) {
        let half = f64::from(self.grid_size) / self.zoom / 2.0;
        (self.pan_x + half, self.pan_y + half)
    }

    /// Set zoom (clamped) while keeping the current center point centered.
    ///
    /// Returns `false` and leaves pan untouched when the clamped zoom equals
    /// the current zoom or the factor is not finite.
    pub fn set_zoom(&mut self, zoom: f64) -> bool {
        if !zoom.is_finite() {
            return false;
        }
        let new_zoom = zoom.clamp(MIN_ZOOM, MAX_ZOOM);
        if new_zoom == self.zoom {
            return false;
        }

        let (center_x, center_y) = self.center();
        let half = f64::from(self.grid_size) / new_zoom / 2.0;
        self.zoom = new_zoom;
        self.pan_x = center_x - half;
        self.pan_y = center_y - half;
        self.clamp();
        true
    }

    pub fn zoom_in(&mut self) -> bool {
        self.set_zoom(self.zoom * ZOOM_STEP)
    }

    pub fn zoom_out(&mut self) -> bool {
        self.set_zoom(self.zoom / ZOOM_STEP)
    }

    /// Pan by a grid-unit delta.
    pub fn pan(&mut self, dx: f64, dy: f64) {
        if dx.is_finite() {
            self.pan_x += dx;
        }
        if dy.is_finite() {
            self.pan_y += dy;
        }
        self.clamp();
    }

    pub fn reset_view(&mut self) {
        self.zoom = 1.0;
        self.pan_x = 0.0;
        self.pan_y = 0.0;
    }

    /// Clamp pan into `[0, grid - visible]` on both axes. When the visible
    /// window is wider than the grid the upper bound collapses to 0.
    pub fn clamp(&mut self) {
        let max_x = f64::from(self.grid_size.saturating_sub(self.visible_width()));
        let max_y = f64::from(self.grid_size.saturating_sub(self.visible_height()));
        self.pan_x = self.pan_x.min(max_x).max(0.0);
        self.pan_y = self.pan_y.min(max_y).max(0.0);
    }

    /// Map a screen point to a grid cell. `None` means the point falls outside
    /// the grid and must not be used for placement.
    pub fn screen_to_cell(&self, px: f64, py: f64, pixel_unit: f64) -> Option<Cell> {
        let scale = pixel_unit * self.zoom;
        if scale.is_nan() || scale <= 0.0 || !px.is_finite() || !py.is_finite() {
            return None;
        }
        let x = (px / scale + self.pan_x).floor();
        let y = (py / scale + self.pan_y).floor();
        let size = f64::from(self.grid_size);
        if x < 0.0 || y < 0.0 || x >= size || y >= size {
            return None;
        }
        Some(Cell::new(x as u32, y as u32))
    }

    /// Screen-space top-left corner of a cell. Inverse of [`Self::screen_to_cell`].
    pub fn cell_to_screen(&self, cell: Cell, pixel_unit: f64) -> (f64, f64) {
        let scale = pixel_unit * self.zoom;
        (
            (f64::from(cell.x) - self.pan_x) * scale,
            (f64::from(cell.y) - self.pan_y) * scale,
        )
    }

    /// Request descriptor for the visible region.
    pub fn current_region(&self) -> Region {
        Region {
            x: self.pan_x.floor() as u32,
            y: self.pan_y.floor() as u32,
            width: self.visible_width(),
            height: self.visible_height(),
        }
    }
}
