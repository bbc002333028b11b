use grid_util::point::Point;
use smallvec::SmallVec;

/// What a [Cell] currently represents. Only the search engine moves cells into [Open](CellState::Open),
/// [Closed](CellState::Closed) and [Path](CellState::Path); the other states are set by editing.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum CellState {
    #[default]
    Empty,
    Start,
    End,
    Wall,
    Open,
    Closed,
    Path,
}

impl CellState {
    /// Start and end keep their state for the whole search.
    pub fn is_endpoint(self) -> bool {
        matches!(self, CellState::Start | CellState::End)
    }

    /// States written by a search and wiped by clearing the search.
    pub fn is_search_mark(self) -> bool {
        matches!(self, CellState::Open | CellState::Closed | CellState::Path)
    }

    /// Character used by the text form of a grid.
    pub fn symbol(self) -> char {
        match self {
            CellState::Empty => '.',
            CellState::Start => 'S',
            CellState::End => 'E',
            CellState::Wall => '#',
            CellState::Open => 'o',
            CellState::Closed => 'x',
            CellState::Path => '*',
        }
    }

    pub fn from_symbol(symbol: char) -> Option<CellState> {
        Some(match symbol {
            '.' => CellState::Empty,
            'S' => CellState::Start,
            'E' => CellState::End,
            '#' => CellState::Wall,
            'o' => CellState::Open,
            'x' => CellState::Closed,
            '*' => CellState::Path,
            _ => return None,
        })
    }
}

/// A single square of the grid. The neighbour list holds flat indices into the owning grid and
/// is only as fresh as the last [recompute_adjacency](crate::Grid::recompute_adjacency).
#[derive(Clone, Debug)]
pub struct Cell {
    pos: Point,
    state: CellState,
    neighbours: SmallVec<[usize; 4]>,
}

impl Cell {
    pub fn new(pos: Point) -> Cell {
        Cell {
            pos,
            state: CellState::Empty,
            neighbours: SmallVec::new(),
        }
    }
    pub fn pos(&self) -> Point {
        self.pos
    }
    pub fn row(&self) -> usize {
        self.pos.y as usize
    }
    pub fn col(&self) -> usize {
        self.pos.x as usize
    }
    pub fn state(&self) -> CellState {
        self.state
    }
    pub fn neighbours(&self) -> &[usize] {
        &self.neighbours
    }
    pub fn is_wall(&self) -> bool {
        self.state == CellState::Wall
    }

    pub(crate) fn set_state(&mut self, state: CellState) {
        self.state = state;
    }

    /// Applies a search mark unless the cell is an endpoint or a wall.
    pub(crate) fn mark(&mut self, state: CellState) {
        debug_assert!(state.is_search_mark());
        if !self.state.is_endpoint() && !self.is_wall() {
            self.state = state;
        }
    }

    pub(crate) fn set_neighbours(&mut self, neighbours: SmallVec<[usize; 4]>) {
        self.neighbours = neighbours;
    }
}
