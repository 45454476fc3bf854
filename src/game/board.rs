use crate::error::BoardError;

use super::cell::{Cell, CellId, Occupancy};
use super::state::{Action, State};

/// Adjacency pattern of the board graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BoardShape {
    Diamond,
    Triangular,
}

/// Board geometry configuration.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct BoardConfig {
    pub shape: BoardShape,
    pub size: usize,
    /// Initial hole locations as (row, col) coordinates.
    pub holes: Vec<(usize, usize)>,
}

impl Default for BoardConfig {
    fn default() -> Self {
        BoardConfig {
            shape: BoardShape::Triangular,
            size: 5,
            holes: vec![(2, 1)],
        }
    }
}

/// A peg-solitaire board: a fixed undirected cell graph plus mutable
/// occupancy. Cells live in a flat arena and reference each other by index.
#[derive(Debug, Clone)]
pub struct Board {
    cells: Vec<Cell>,
    /// row * size + col -> arena index, for coordinate lookups.
    grid: Vec<Option<CellId>>,
    size: usize,
    initial_holes: Vec<CellId>,
}

impl Board {
    /// Build a board from its geometry description. Fails fast on hole
    /// coordinates that name no cell of the chosen shape.
    pub fn build(
        shape: BoardShape,
        size: usize,
        holes: &[(usize, usize)],
    ) -> Result<Board, BoardError> {
        let mut board = Board {
            cells: Vec::new(),
            grid: vec![None; size * size],
            size,
            initial_holes: Vec::new(),
        };

        match shape {
            BoardShape::Diamond => board.build_diamond(),
            BoardShape::Triangular => board.build_triangular(),
        }

        for &(row, col) in holes {
            let id = board
                .cell_at(row, col)
                .ok_or(BoardError::HoleOutOfBounds { row, col })?;
            board.initial_holes.push(id);
        }
        board.reset();
        Ok(board)
    }

    /// Diamond adjacency: every cell links to its left, upper, and
    /// upper-right neighbors (each link registered once, symmetrically).
    fn build_diamond(&mut self) {
        for r in 0..self.size {
            for c in 0..self.size {
                let id = self.push_cell(r, c);
                if c > 0 {
                    self.link(id, self.cell_at(r, c - 1).unwrap());
                }
                if r > 0 {
                    self.link(id, self.cell_at(r - 1, c).unwrap());
                }
                if r > 0 && c + 1 < self.size {
                    self.link(id, self.cell_at(r - 1, c + 1).unwrap());
                }
            }
        }
    }

    /// Triangular adjacency: row `r` holds `r + 1` cells; every cell links
    /// to its left, upper, and upper-left neighbors.
    fn build_triangular(&mut self) {
        for r in 0..self.size {
            for c in 0..=r {
                let id = self.push_cell(r, c);
                if c > 0 {
                    self.link(id, self.cell_at(r, c - 1).unwrap());
                }
                if r > 0 && c <= r - 1 {
                    self.link(id, self.cell_at(r - 1, c).unwrap());
                }
                if r > 0 && c > 0 {
                    self.link(id, self.cell_at(r - 1, c - 1).unwrap());
                }
            }
        }
    }

    fn push_cell(&mut self, row: usize, col: usize) -> CellId {
        let id = self.cells.len();
        self.cells.push(Cell::new(row, col));
        self.grid[row * self.size + col] = Some(id);
        id
    }

    /// Register an undirected edge: both endpoints see each other.
    fn link(&mut self, a: CellId, b: CellId) {
        self.cells[a].push_neighbor(b);
        self.cells[b].push_neighbor(a);
    }

    /// Arena index of the cell at (row, col), if the shape has one there.
    pub fn cell_at(&self, row: usize, col: usize) -> Option<CellId> {
        if row >= self.size || col >= self.size {
            return None;
        }
        self.grid[row * self.size + col]
    }

    pub fn cell(&self, id: CellId) -> Option<&Cell> {
        self.cells.get(id)
    }

    pub fn num_cells(&self) -> usize {
        self.cells.len()
    }

    pub fn peg_count(&self) -> usize {
        self.cells.iter().filter(|c| !c.is_hole()).count()
    }

    pub fn hole_count(&self) -> usize {
        self.cells.iter().filter(|c| c.is_hole()).count()
    }

    pub fn pegs(&self) -> Vec<CellId> {
        (0..self.cells.len())
            .filter(|&i| !self.cells[i].is_hole())
            .collect()
    }

    pub fn holes(&self) -> Vec<CellId> {
        (0..self.cells.len())
            .filter(|&i| self.cells[i].is_hole())
            .collect()
    }

    /// All legal jumps from the current occupancy: for every hole H, every
    /// peg neighbor N of H, and every peg neighbor J of N, the triple
    /// (J, N, H) is legal when the three cells line up along a row, a
    /// column, or a diagonal with both coordinate deltas of magnitude 2.
    /// Order is deterministic for a fixed board (arena index iteration).
    pub fn legal_actions(&self) -> Vec<Action> {
        let mut actions = Vec::new();
        for hole in self.holes() {
            let hole_cell = &self.cells[hole];
            for &n in hole_cell.neighbors() {
                let jumped_cell = &self.cells[n];
                if jumped_cell.is_hole() {
                    continue;
                }
                for &j in jumped_cell.neighbors() {
                    let mover_cell = &self.cells[j];
                    if mover_cell.is_hole() {
                        continue;
                    }
                    if Self::colinear(mover_cell, jumped_cell, hole_cell) {
                        actions.push(Action {
                            mover: j,
                            jumped: n,
                            landing: hole,
                        });
                    }
                }
            }
        }
        actions
    }

    fn colinear(mover: &Cell, jumped: &Cell, hole: &Cell) -> bool {
        let same_row = mover.row() == jumped.row() && jumped.row() == hole.row();
        let same_col = mover.col() == jumped.col() && jumped.col() == hole.col();
        let diagonal = mover.row().abs_diff(hole.row()) == 2 && mover.col().abs_diff(hole.col()) == 2;
        same_row || same_col || diagonal
    }

    /// Apply a jump: mover and jumped cell become holes, the landing cell
    /// becomes a peg. A no-op, not an error, if any referenced cell is
    /// absent from the arena.
    pub fn apply(&mut self, action: Action) {
        let n = self.cells.len();
        if action.mover >= n || action.jumped >= n || action.landing >= n {
            return;
        }
        self.cells[action.mover].set_occupancy(Occupancy::Hole);
        self.cells[action.jumped].set_occupancy(Occupancy::Hole);
        self.cells[action.landing].set_occupancy(Occupancy::Peg);
    }

    /// More than one peg left and at least one legal action remaining.
    pub fn is_neutral(&self) -> bool {
        self.peg_count() > 1 && !self.legal_actions().is_empty()
    }

    /// Exactly one peg left.
    pub fn is_win(&self) -> bool {
        self.peg_count() == 1
    }

    /// More than one peg left but no legal action remaining.
    pub fn is_loss(&self) -> bool {
        self.peg_count() > 1 && self.legal_actions().is_empty()
    }

    /// Reward of the current occupancy: 0 while neutral, +1000 on a win,
    /// minus the stranded peg count on a loss.
    pub fn reward(&self) -> f32 {
        if self.is_win() {
            1000.0
        } else if self.is_loss() {
            -(self.peg_count() as f32)
        } else {
            0.0
        }
    }

    /// Canonical binary state: bit per cell in arena order, 1 = peg.
    pub fn encode(&self) -> State {
        let mut bits = 0u64;
        for (i, cell) in self.cells.iter().enumerate() {
            if !cell.is_hole() {
                bits |= 1 << i;
            }
        }
        State::new(bits)
    }

    /// Restore the initial occupancy: every cell a peg, then the configured
    /// starting holes re-applied.
    pub fn reset(&mut self) {
        for cell in &mut self.cells {
            cell.set_occupancy(Occupancy::Peg);
        }
        for &id in &self.initial_holes {
            self.cells[id].set_occupancy(Occupancy::Hole);
        }
    }
}
