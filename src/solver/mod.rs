use crate::grid::Grid;
use grid_util::point::Point;
use std::ops::ControlFlow;
use thiserror::Error;

pub mod astar;
pub mod context;
mod frontier;

pub use astar::Search;
pub use context::SearchContext;

/// Reasons a search refuses to start. A search that runs but finds no path is not an error, it
/// ends in [SearchOutcome::Exhausted].
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SearchError {
    #[error("no start cell has been placed")]
    MissingStart,
    #[error("no end cell has been placed")]
    MissingEnd,
    #[error("{0:?} lies outside the grid")]
    OutOfBounds(Point),
    #[error("{0:?} is a wall")]
    Blocked(Point),
    #[error("walls changed since adjacency was computed; call recompute_adjacency first")]
    StaleAdjacency,
}

/// How a search ended.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SearchOutcome {
    /// The path from start to end, both included.
    Found(Vec<Point>),
    /// Every reachable cell was expanded without meeting the end.
    Exhausted,
    /// The progress hook or the host stopped the search.
    Cancelled,
}

impl SearchOutcome {
    pub fn is_found(&self) -> bool {
        matches!(self, SearchOutcome::Found(_))
    }
    pub fn path(&self) -> Option<&[Point]> {
        match self {
            SearchOutcome::Found(path) => Some(path),
            _ => None,
        }
    }
}

/// What a single call to [Search::step] did.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Step {
    /// The cell was taken off the frontier and its neighbours were relaxed.
    Expanded(Point),
    /// The cell was marked as part of the found path.
    Traced(Point),
    Done(SearchOutcome),
}

/// Runs A* on `grid` from `start` to `end` in one go, calling `on_step` after every expansion and
/// every marked path cell so the caller can redraw. Adjacency must be up to date, see
/// [Grid::recompute_adjacency].
pub fn astar_search<F>(
    grid: &mut Grid,
    start: Point,
    end: Point,
    on_step: F,
) -> Result<SearchOutcome, SearchError>
where
    F: FnMut(&Grid, &Step) -> ControlFlow<()>,
{
    let mut search = Search::new(grid, start, end)?;
    Ok(search.run(grid, on_step))
}
