mod board;
mod util;

pub use board::{BoardPanel, BoardView};
pub use util::{KeyHandleResult, Shortcut};
