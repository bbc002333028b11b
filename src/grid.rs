use crate::cell::{Cell, CellState};
use core::fmt;
use grid_util::point::Point;
use itertools::{iproduct, Itertools};
use log::debug;
use petgraph::unionfind::UnionFind;
use smallvec::SmallVec;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum GridError {
    #[error("grid size must be at least 1, got {0}")]
    InvalidSize(usize),
    #[error("{0:?} lies outside the grid")]
    OutOfBounds(Point),
    #[error("row {row} has {found} cells but the grid is {expected} wide")]
    NotSquare {
        row: usize,
        expected: usize,
        found: usize,
    },
    #[error("unknown cell symbol {symbol:?} at row {row}, column {col}")]
    UnknownSymbol { symbol: char, row: usize, col: usize },
    #[error("more than one {0:?} cell")]
    DuplicateEndpoint(CellState),
}

/// Square grid of [Cell]s stored row-major, so the cell at `(x, y)` lives at index
/// `y * size + x`. Points use `x` for the column and `y` for the row.
///
/// Besides the cells, [Grid] remembers which cells are the start and end so that there is at
/// most one of each, and keeps a [UnionFind] over open cells to answer reachability queries.
/// Both adjacency lists and components go stale when walls change; adjacency is rebuilt with
/// [recompute_adjacency](Self::recompute_adjacency), components with
/// [update_components](Self::update_components).
#[derive(Clone, Debug)]
pub struct Grid {
    size: usize,
    cells: Vec<Cell>,
    start: Option<usize>,
    end: Option<usize>,
    adjacency_dirty: bool,
    components: UnionFind<usize>,
    components_dirty: bool,
}

impl Grid {
    /// Builds a `size`×`size` grid of empty cells.
    pub fn new(size: usize) -> Result<Grid, GridError> {
        if size == 0 {
            return Err(GridError::InvalidSize(size));
        }
        let cells = iproduct!(0..size, 0..size)
            .map(|(y, x)| Cell::new(Point::new(x as i32, y as i32)))
            .collect();
        Ok(Grid {
            size,
            cells,
            start: None,
            end: None,
            adjacency_dirty: true,
            components: UnionFind::new(size * size),
            components_dirty: true,
        })
    }

    /// Parses the text form produced by the [Display](fmt::Display) implementation: one line per
    /// row, one symbol per cell. Blank lines are skipped and surrounding whitespace is trimmed.
    pub fn from_ascii(text: &str) -> Result<Grid, GridError> {
        let rows = text
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .collect::<Vec<&str>>();
        let mut grid = Grid::new(rows.len())?;
        for (row, line) in rows.iter().enumerate() {
            let found = line.chars().count();
            if found != grid.size {
                return Err(GridError::NotSquare {
                    row,
                    expected: grid.size,
                    found,
                });
            }
            for (col, symbol) in line.chars().enumerate() {
                let state = CellState::from_symbol(symbol)
                    .ok_or(GridError::UnknownSymbol { symbol, row, col })?;
                let ix = row * grid.size + col;
                match state {
                    CellState::Start if grid.start.is_some() => {
                        return Err(GridError::DuplicateEndpoint(state))
                    }
                    CellState::End if grid.end.is_some() => {
                        return Err(GridError::DuplicateEndpoint(state))
                    }
                    CellState::Start => grid.start = Some(ix),
                    CellState::End => grid.end = Some(ix),
                    _ => {}
                }
                grid.cells[ix].set_state(state);
            }
        }
        Ok(grid)
    }

    pub fn size(&self) -> usize {
        self.size
    }
    pub fn cell_count(&self) -> usize {
        self.cells.len()
    }
    pub fn cells(&self) -> impl Iterator<Item = &Cell> {
        self.cells.iter()
    }
    pub fn in_bounds(&self, point: &Point) -> bool {
        point.x >= 0
            && point.y >= 0
            && (point.x as usize) < self.size
            && (point.y as usize) < self.size
    }
    pub fn index_of(&self, point: &Point) -> Option<usize> {
        self.in_bounds(point)
            .then(|| point.y as usize * self.size + point.x as usize)
    }
    pub fn point_of(&self, ix: usize) -> Point {
        self.cells[ix].pos()
    }
    pub fn cell(&self, point: &Point) -> Option<&Cell> {
        self.index_of(point).map(|ix| &self.cells[ix])
    }
    pub fn state(&self, point: &Point) -> Option<CellState> {
        self.cell(point).map(Cell::state)
    }
    pub fn start(&self) -> Option<Point> {
        self.start.map(|ix| self.point_of(ix))
    }
    pub fn end(&self) -> Option<Point> {
        self.end.map(|ix| self.point_of(ix))
    }
    /// Whether walls changed since adjacency was last recomputed.
    pub fn adjacency_dirty(&self) -> bool {
        self.adjacency_dirty
    }

    pub(crate) fn cell_at(&self, ix: usize) -> &Cell {
        &self.cells[ix]
    }
    pub(crate) fn mark(&mut self, ix: usize, state: CellState) {
        self.cells[ix].mark(state);
    }

    fn checked_index(&self, point: &Point) -> Result<usize, GridError> {
        self.index_of(point).ok_or(GridError::OutOfBounds(*point))
    }

    /// Overwrites a cell, keeping the start/end designations and the dirty flags consistent.
    fn replace(&mut self, ix: usize, state: CellState) {
        let previous = self.cells[ix].state();
        if previous == state {
            return;
        }
        if self.start == Some(ix) {
            self.start = None;
        }
        if self.end == Some(ix) {
            self.end = None;
        }
        if previous == CellState::Wall || state == CellState::Wall {
            self.adjacency_dirty = true;
            if state == CellState::Wall {
                // Removing a cell can split a component, which union-find cannot undo.
                self.components_dirty = true;
            } else {
                self.join_with_neighbours(ix);
            }
        }
        self.cells[ix].set_state(state);
    }

    /// Makes the cell at `point` the start, demoting any previous start to an empty cell.
    pub fn set_start(&mut self, point: &Point) -> Result<(), GridError> {
        let ix = self.checked_index(point)?;
        if let Some(old) = self.start.filter(|&old| old != ix) {
            self.replace(old, CellState::Empty);
        }
        self.replace(ix, CellState::Start);
        self.start = Some(ix);
        Ok(())
    }

    /// Makes the cell at `point` the end, demoting any previous end to an empty cell.
    pub fn set_end(&mut self, point: &Point) -> Result<(), GridError> {
        let ix = self.checked_index(point)?;
        if let Some(old) = self.end.filter(|&old| old != ix) {
            self.replace(old, CellState::Empty);
        }
        self.replace(ix, CellState::End);
        self.end = Some(ix);
        Ok(())
    }

    /// Turns a cell into a wall. A start or end placed there loses its designation.
    pub fn set_wall(&mut self, point: &Point) -> Result<(), GridError> {
        let ix = self.checked_index(point)?;
        self.replace(ix, CellState::Wall);
        Ok(())
    }

    /// Resets a single cell to [CellState::Empty].
    pub fn reset_cell(&mut self, point: &Point) -> Result<(), GridError> {
        let ix = self.checked_index(point)?;
        self.replace(ix, CellState::Empty);
        Ok(())
    }

    /// Returns every cell to [CellState::Empty] and forgets start and end, as if the grid had
    /// just been built.
    pub fn clear(&mut self) {
        debug!("Clearing {0}x{0} grid", self.size);
        for cell in self.cells.iter_mut() {
            cell.set_state(CellState::Empty);
            cell.set_neighbours(SmallVec::new());
        }
        self.start = None;
        self.end = None;
        self.adjacency_dirty = true;
        self.components_dirty = true;
    }

    /// Wipes the open, closed and path marks left by a search.
    pub fn clear_search_marks(&mut self) {
        for cell in self.cells.iter_mut() {
            if cell.state().is_search_mark() {
                cell.set_state(CellState::Empty);
            }
        }
    }

    /// Orthogonal positions of `ix` that are inside the grid and not walls, ordered down, up,
    /// right, left.
    fn open_neighbours(&self, ix: usize) -> SmallVec<[usize; 4]> {
        let p = self.point_of(ix);
        [
            Point::new(p.x, p.y + 1),
            Point::new(p.x, p.y - 1),
            Point::new(p.x + 1, p.y),
            Point::new(p.x - 1, p.y),
        ]
        .iter()
        .filter_map(|n| self.index_of(n))
        .filter(|&n| !self.cells[n].is_wall())
        .collect()
    }

    /// Rebuilds the neighbour list of every cell from the current walls.
    pub fn recompute_adjacency(&mut self) {
        debug!("Recomputing adjacency for {0}x{0} grid", self.size);
        for ix in 0..self.cells.len() {
            let neighbours = self.open_neighbours(ix);
            self.cells[ix].set_neighbours(neighbours);
        }
        self.adjacency_dirty = false;
    }

    fn join_with_neighbours(&mut self, ix: usize) {
        for n in self.open_neighbours(ix) {
            self.components.union(ix, n);
        }
    }

    /// Regenerates the components if they are marked as dirty.
    pub fn update_components(&mut self) {
        if self.components_dirty {
            self.generate_components();
        }
    }

    /// Generates a new [UnionFind] structure and links up orthogonally adjacent open cells.
    pub fn generate_components(&mut self) {
        debug!("Generating connected components");
        self.components = UnionFind::new(self.cells.len());
        self.components_dirty = false;
        for ix in 0..self.cells.len() {
            if !self.cells[ix].is_wall() {
                self.join_with_neighbours(ix);
            }
        }
    }

    /// Checks if `start` and `goal` are on the same component. Only meaningful once
    /// [update_components](Self::update_components) has run after the last wall edit.
    pub fn reachable(&self, start: &Point, goal: &Point) -> bool {
        match (self.index_of(start), self.index_of(goal)) {
            (Some(s), Some(g)) => {
                !self.cells[s].is_wall()
                    && !self.cells[g].is_wall()
                    && self.components.equiv(s, g)
            }
            _ => false,
        }
    }
}

impl fmt::Display for Grid {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for row in self.cells.chunks(self.size) {
            writeln!(f, "{}", row.iter().map(|c| c.state().symbol()).join(""))?;
        }
        Ok(())
    }
}
