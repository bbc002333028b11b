//! # astar_visualizer
//!
//! An interactive visualizer for the
//! [A* search algorithm](https://en.wikipedia.org/wiki/A*_search_algorithm) on a uniform
//! 4-connected grid. A start cell, an end cell and walls are painted with the mouse, after
//! which the search animates its frontier and, if the end can be reached, the shortest path.
//!
//! The library splits into the search core ([Grid], [heuristic], [solver]) and the
//! [shell] that owns the window. The core knows nothing about drawing: the search reports each
//! step through a hook or through [Search::step], and the shell maps cell states to colors.
//!
//! ```
//! use std::ops::ControlFlow;
//! use astar_visualizer::{astar_search, Grid};
//! use grid_util::point::Point;
//!
//! let mut grid = Grid::new(5).unwrap();
//! grid.recompute_adjacency();
//! let outcome = astar_search(&mut grid, Point::new(0, 0), Point::new(4, 4), |_, _| {
//!     ControlFlow::Continue(())
//! })
//! .unwrap();
//! assert_eq!(outcome.path().map(|p| p.len()), Some(9));
//! ```
pub mod cell;
pub mod grid;
pub mod heuristic;
pub mod shell;
pub mod solver;

pub use cell::{Cell, CellState};
pub use grid::{Grid, GridError};
pub use solver::{astar_search, Search, SearchContext, SearchError, SearchOutcome, Step};
