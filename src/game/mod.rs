//! Core peg-solitaire environment: the cell arena, the board state machine
//! with its legal-move generator and reward signal, and the canonical
//! binary state encoding.

mod board;
mod cell;
mod state;

pub use board::{Board, BoardConfig, BoardShape};
pub use cell::{Cell, CellId, Occupancy};
pub use state::{Action, Sap, State};
