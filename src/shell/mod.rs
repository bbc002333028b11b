//! The interactive side of the visualizer.
//!
//! [Visualizer] holds everything the window needs besides the window itself: the grid being
//! edited, the search in progress and the configuration. It reacts to abstract inputs (clicks on
//! grid positions, the run/reset/clear keys) so the editing rules can be exercised without a
//! display. [window] translates winit events into these inputs and [render] paints the grid.
pub mod config;
pub mod render;
pub mod window;

use grid_util::point::Point;
use log::{debug, info, warn};

use crate::cell::CellState;
use crate::grid::{Grid, GridError};
use crate::solver::{Search, SearchContext, SearchOutcome, Step};
use config::Config;

pub const CAPTION_EDITING: &str = "Pathfinding Game";
pub const CAPTION_SEARCHING: &str = "A* Search Algorithm";
pub const CAPTION_FINISHED: &str = "Click R to reset the display";

pub struct Visualizer {
    config: Config,
    grid: Grid,
    search: Option<Search>,
    spare: Option<SearchContext>,
    last_outcome: Option<SearchOutcome>,
}

impl Visualizer {
    pub fn new(config: Config) -> Result<Visualizer, GridError> {
        let grid = Grid::new(config.grid_size)?;
        Ok(Visualizer {
            config,
            grid,
            search: None,
            spare: None,
            last_outcome: None,
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }
    pub fn grid(&self) -> &Grid {
        &self.grid
    }
    pub fn is_searching(&self) -> bool {
        self.search.is_some()
    }
    /// Outcome of the most recent search, until the grid is reset or cleared.
    pub fn last_outcome(&self) -> Option<&SearchOutcome> {
        self.last_outcome.as_ref()
    }

    pub fn caption(&self) -> &'static str {
        if self.is_searching() {
            CAPTION_SEARCHING
        } else if self.last_outcome.is_some() {
            CAPTION_FINISHED
        } else {
            CAPTION_EDITING
        }
    }

    /// Main button on a cell: places the start, then the end, then walls. Start and end cannot
    /// be painted over. Returns whether the grid changed.
    pub fn left_click(&mut self, point: Point) -> bool {
        if self.is_searching() {
            return false;
        }
        let Some(state) = self.grid.state(&point) else {
            return false;
        };
        let result = if self.grid.start().is_none() && state != CellState::End {
            self.grid.set_start(&point)
        } else if self.grid.end().is_none() && state != CellState::Start {
            self.grid.set_end(&point)
        } else if !state.is_endpoint() && state != CellState::Wall {
            self.grid.set_wall(&point)
        } else {
            return false;
        };
        result.is_ok()
    }

    /// Secondary button on a cell: empties it, dropping a start or end placed there.
    pub fn right_click(&mut self, point: Point) -> bool {
        if self.is_searching() {
            return false;
        }
        match self.grid.state(&point) {
            Some(CellState::Empty) | None => false,
            Some(_) => self.grid.reset_cell(&point).is_ok(),
        }
    }

    /// Starts a search between start and end. Ignored while a search runs or when either
    /// endpoint is missing.
    pub fn press_run(&mut self) -> bool {
        if self.is_searching() {
            return false;
        }
        let (Some(start), Some(end)) = (self.grid.start(), self.grid.end()) else {
            debug!("Run ignored: start and end must both be placed");
            return false;
        };
        self.grid.clear_search_marks();
        self.grid.recompute_adjacency();
        self.grid.update_components();
        if !self.grid.reachable(&start, &end) {
            warn!("{:?} is not reachable from {:?}", end, start);
        }
        let ctx = self.spare.take().unwrap_or_default();
        match Search::between_endpoints(&self.grid, ctx) {
            Ok(search) => {
                self.search = Some(search);
                self.last_outcome = None;
                true
            }
            Err(e) => {
                warn!("Could not start search: {}", e);
                false
            }
        }
    }

    /// Discards everything painted so far.
    pub fn press_reset(&mut self) {
        self.cancel();
        self.grid.clear();
        self.last_outcome = None;
        info!("Grid reset");
    }

    /// Removes the marks of the last search but keeps start, end and walls.
    pub fn press_clear(&mut self) -> bool {
        if self.is_searching() {
            return false;
        }
        self.grid.clear_search_marks();
        self.last_outcome = None;
        true
    }

    /// Advances the running search by up to `budget` steps. Returns whether anything happened.
    pub fn advance(&mut self, budget: usize) -> bool {
        let Some(search) = self.search.as_mut() else {
            return false;
        };
        for _ in 0..budget {
            if let Step::Done(outcome) = search.step(&mut self.grid) {
                self.finish(outcome);
                break;
            }
        }
        true
    }

    /// Stops a running search where it is.
    pub fn cancel(&mut self) {
        if let Some(mut search) = self.search.take() {
            search.cancel(&mut self.grid);
            self.spare = Some(search.into_context());
            self.last_outcome = Some(SearchOutcome::Cancelled);
        }
    }

    fn finish(&mut self, outcome: SearchOutcome) {
        if let Some(search) = self.search.take() {
            self.spare = Some(search.into_context());
        }
        self.last_outcome = Some(outcome);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn visualizer(size: usize) -> Visualizer {
        Visualizer::new(Config {
            grid_size: size,
            ..Config::default()
        })
        .unwrap()
    }

    fn finish(vis: &mut Visualizer) -> SearchOutcome {
        while vis.advance(16) {}
        vis.last_outcome().cloned().unwrap()
    }

    #[test]
    fn clicks_place_start_end_then_walls() {
        let mut vis = visualizer(4);
        assert!(vis.left_click(Point::new(0, 0)));
        // Clicking the start again does not turn it into the end.
        assert!(!vis.left_click(Point::new(0, 0)));
        assert!(vis.left_click(Point::new(3, 3)));
        assert!(vis.left_click(Point::new(1, 1)));
        assert!(!vis.left_click(Point::new(3, 3)));
        assert!(!vis.left_click(Point::new(1, 1)));
        assert!(!vis.left_click(Point::new(4, 0)));
        assert_eq!(vis.grid().to_string(), "S...\n.#..\n....\n...E\n");
    }

    #[test]
    fn right_click_clears_designation() {
        let mut vis = visualizer(3);
        vis.left_click(Point::new(0, 0));
        vis.left_click(Point::new(2, 2));
        assert!(vis.right_click(Point::new(0, 0)));
        assert_eq!(vis.grid().start(), None);
        assert!(!vis.right_click(Point::new(0, 0)));
        // The next main click places a new start, not a wall.
        vis.left_click(Point::new(1, 0));
        assert_eq!(vis.grid().start(), Some(Point::new(1, 0)));
        assert_eq!(vis.grid().end(), Some(Point::new(2, 2)));
    }

    #[test]
    fn run_needs_both_endpoints() {
        let mut vis = visualizer(3);
        assert!(!vis.press_run());
        vis.left_click(Point::new(0, 0));
        assert!(!vis.press_run());
        vis.left_click(Point::new(2, 0));
        assert!(vis.press_run());
        assert_eq!(vis.caption(), CAPTION_SEARCHING);
        assert!(!vis.press_run());
        assert!(!vis.left_click(Point::new(1, 1)));

        let outcome = finish(&mut vis);
        assert_eq!(outcome.path().map(|p| p.len()), Some(3));
        assert_eq!(vis.caption(), CAPTION_FINISHED);
        assert_eq!(vis.grid().state(&Point::new(1, 0)), Some(CellState::Path));
    }

    #[test]
    fn rerun_after_editing_walls() {
        let mut vis = visualizer(3);
        vis.left_click(Point::new(0, 0));
        vis.left_click(Point::new(2, 0));
        vis.press_run();
        finish(&mut vis);
        vis.left_click(Point::new(1, 0));
        vis.left_click(Point::new(1, 1));
        vis.left_click(Point::new(1, 2));
        vis.press_run();
        assert_eq!(finish(&mut vis), SearchOutcome::Exhausted);
        assert!(vis.grid().cells().all(|c| c.state() != CellState::Path));
    }

    #[test]
    fn reset_cancels_and_empties() {
        let mut vis = visualizer(10);
        vis.left_click(Point::new(0, 0));
        vis.left_click(Point::new(9, 9));
        vis.left_click(Point::new(5, 5));
        vis.press_run();
        vis.advance(3);
        vis.press_reset();
        assert!(!vis.is_searching());
        assert_eq!(vis.caption(), CAPTION_EDITING);
        assert!(vis.grid().cells().all(|c| c.state() == CellState::Empty));
        assert_eq!(vis.grid().start(), None);
        assert_eq!(vis.grid().size(), 10);
    }

    #[test]
    fn cancel_reports_cancelled() {
        let mut vis = visualizer(10);
        vis.left_click(Point::new(0, 0));
        vis.left_click(Point::new(9, 9));
        vis.press_run();
        vis.advance(2);
        vis.cancel();
        assert_eq!(vis.last_outcome(), Some(&SearchOutcome::Cancelled));
        let closed = vis
            .grid()
            .cells()
            .filter(|c| c.state() == CellState::Closed)
            .count();
        assert_eq!(closed, 1);
        assert!(vis.press_clear());
        assert!(vis.grid().cells().all(|c| !c.state().is_search_mark()));
    }
}
