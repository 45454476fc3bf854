use serde::{Deserialize, Serialize};

use super::cell::CellId;

/// Canonical binary encoding of board occupancy: bit `i` is 1 when cell `i`
/// (in arena order) holds a peg. Value semantics, used as a lookup key.
///
/// A `u64` holds one bit per cell, which caps the board at 64 cells; config
/// validation keeps board sizes within that bound.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct State(u64);

impl State {
    pub fn new(bits: u64) -> Self {
        State(bits)
    }

    pub fn bits(self) -> u64 {
        self.0
    }

    /// Whether cell `i` holds a peg in this state.
    pub fn is_peg(self, i: usize) -> bool {
        (self.0 >> i) & 1 == 1
    }
}

/// A single peg jump: `mover` jumps over `jumped` into `landing`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Action {
    pub mover: CellId,
    pub jumped: CellId,
    pub landing: CellId,
}

/// Joint key indexing the actor's policy and eligibility maps.
pub type Sap = (State, Action);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_bits() {
        let state = State::new(0b1011);
        assert!(state.is_peg(0));
        assert!(state.is_peg(1));
        assert!(!state.is_peg(2));
        assert!(state.is_peg(3));
        assert!(!state.is_peg(63));
    }

    #[test]
    fn test_state_value_semantics() {
        let a = State::new(0b101);
        let b = State::new(0b101);
        assert_eq!(a, b);
        assert_ne!(a, State::new(0b100));
    }
}
