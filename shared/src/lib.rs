pub mod colors;
pub mod grid;
pub mod mood;
pub mod protocol;

pub use colors::{PALETTE, PALETTE_LEN, WHITE_INDEX};
pub use grid::*;
pub use mood::Mood;
pub use protocol::*;
