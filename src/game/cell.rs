/// Index of a cell in the board's flat arena.
pub type CellId = usize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Occupancy {
    Peg,
    Hole,
}

/// One position on the board. Adjacency is stored as arena indices rather
/// than cell references; the symmetric neighbor invariant is maintained by
/// `Board::link`. Topology never changes after construction, only occupancy.
#[derive(Debug, Clone)]
pub struct Cell {
    row: usize,
    col: usize,
    neighbors: Vec<CellId>,
    occupancy: Occupancy,
}

impl Cell {
    pub(super) fn new(row: usize, col: usize) -> Self {
        Cell {
            row,
            col,
            neighbors: Vec::new(),
            occupancy: Occupancy::Peg,
        }
    }

    pub fn row(&self) -> usize {
        self.row
    }

    pub fn col(&self) -> usize {
        self.col
    }

    pub fn neighbors(&self) -> &[CellId] {
        &self.neighbors
    }

    pub fn is_hole(&self) -> bool {
        self.occupancy == Occupancy::Hole
    }

    pub fn occupancy(&self) -> Occupancy {
        self.occupancy
    }

    pub(super) fn set_occupancy(&mut self, occupancy: Occupancy) {
        self.occupancy = occupancy;
    }

    pub(super) fn push_neighbor(&mut self, id: CellId) {
        self.neighbors.push(id);
    }
}
