use serde::{Deserialize, Deserializer, Serialize};

use crate::colors;

/// Side length of the shared square canvas, in cells.
pub const GRID_SIZE: u32 = 50;

/// One addressable grid cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Cell {
    pub x: u32,
    pub y: u32,
}

impl Cell {
    pub const fn new(x: u32, y: u32) -> Self {
        Self { x, y }
    }
}

/// Rectangular sub-region of the grid, used as the canvas fetch descriptor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Region {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl Region {
    pub const fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn contains(&self, cell: Cell) -> bool {
        cell.x >= self.x
            && cell.y >= self.y
            && cell.x - self.x < self.width
            && cell.y - self.y < self.height
    }

    pub fn full(grid_size: u32) -> Self {
        Self {
            x: 0,
            y: 0,
            width: grid_size,
            height: grid_size,
        }
    }
}

/// A colored cell as reported by the canvas service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pixel {
    pub x: u32,
    pub y: u32,
    /// Colors the palette does not know decode as white rather than failing
    /// the whole region.
    #[serde(
        rename = "color",
        alias = "colorIndex",
        deserialize_with = "palette_index_or_white"
    )]
    pub color_index: u8,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mood: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<u64>,
    #[serde(
        default,
        rename = "userId",
        skip_serializing_if = "Option::is_none"
    )]
    pub user_id: Option<u64>,
}

impl Pixel {
    pub fn cell(&self) -> Cell {
        Cell::new(self.x, self.y)
    }
}

fn palette_index_or_white<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u8, D::Error> {
    i64::deserialize(deserializer).map(colors::display_index)
}
