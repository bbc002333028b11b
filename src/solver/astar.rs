use std::ops::ControlFlow;

use grid_util::point::Point;
use log::info;
use smallvec::SmallVec;

use super::context::SearchContext;
use super::{SearchError, SearchOutcome, Step};
use crate::cell::CellState;
use crate::grid::Grid;
use crate::heuristic::manhattan;

#[derive(Clone, Debug)]
enum Phase {
    Expanding,
    /// The end was reached; `pending` holds the intermediate cells still to be marked, the
    /// predecessor of the end last so it is marked first.
    Tracing {
        path: Vec<Point>,
        pending: Vec<usize>,
    },
    Finished(SearchOutcome),
}

/// A* over the 4-connected adjacency of a [Grid] with unit edge costs and the
/// [Manhattan](crate::heuristic::manhattan) heuristic.
///
/// The search is a state machine advanced one [Step] at a time, so a host event loop can
/// interleave drawing and input handling between steps. [run](Self::run) drives it to the end
/// with a progress hook instead. While the search is in progress it writes
/// [Open](CellState::Open) on newly discovered cells, [Closed](CellState::Closed) on expanded
/// cells and finally [Path](CellState::Path) on the intermediate cells of the found path; start
/// and end keep their own states.
///
/// The grid passed to [step](Self::step) must be the one the search was created for, and its
/// walls must not change until the search is done.
#[derive(Clone, Debug)]
pub struct Search {
    ctx: SearchContext,
    start: usize,
    end: usize,
    goal: Point,
    phase: Phase,
    pending_close: Option<usize>,
    expanded: usize,
}

impl Search {
    /// Prepares a search from `start` to `end` with freshly allocated buffers.
    pub fn new(grid: &Grid, start: Point, end: Point) -> Result<Search, SearchError> {
        Search::with_context(SearchContext::new(), grid, start, end)
    }

    /// Prepares a search between the start and end cells designated on the grid.
    pub fn between_endpoints(grid: &Grid, ctx: SearchContext) -> Result<Search, SearchError> {
        let start = grid.start().ok_or(SearchError::MissingStart)?;
        let end = grid.end().ok_or(SearchError::MissingEnd)?;
        Search::with_context(ctx, grid, start, end)
    }

    /// Prepares a search reusing the buffers of an earlier one.
    pub fn with_context(
        mut ctx: SearchContext,
        grid: &Grid,
        start: Point,
        end: Point,
    ) -> Result<Search, SearchError> {
        if grid.adjacency_dirty() {
            return Err(SearchError::StaleAdjacency);
        }
        let start_ix = endpoint_index(grid, start)?;
        let end_ix = endpoint_index(grid, end)?;
        ctx.reset(grid.cell_count());
        ctx.push(start_ix, 0, manhattan(&start, &end));
        info!("Searching from {:?} to {:?}", start, end);
        Ok(Search {
            ctx,
            start: start_ix,
            end: end_ix,
            goal: end,
            phase: Phase::Expanding,
            pending_close: None,
            expanded: 0,
        })
    }

    /// Number of cells expanded so far.
    pub fn expanded(&self) -> usize {
        self.expanded
    }

    /// The outcome, once the search has finished.
    pub fn outcome(&self) -> Option<&SearchOutcome> {
        match &self.phase {
            Phase::Finished(outcome) => Some(outcome),
            _ => None,
        }
    }

    pub fn is_finished(&self) -> bool {
        self.outcome().is_some()
    }

    /// Stops the search, closing the last expanded cell. Later steps report
    /// [SearchOutcome::Cancelled].
    pub fn cancel(&mut self, grid: &mut Grid) {
        if let Some(ix) = self.pending_close.take() {
            grid.mark(ix, CellState::Closed);
        }
        if !self.is_finished() {
            info!("Search cancelled after {} expansions", self.expanded);
            self.phase = Phase::Finished(SearchOutcome::Cancelled);
        }
    }

    /// Hands back the buffers for a later search.
    pub fn into_context(self) -> SearchContext {
        self.ctx
    }

    /// Performs one unit of work: either expands the best frontier cell or marks one cell of the
    /// found path.
    pub fn step(&mut self, grid: &mut Grid) -> Step {
        debug_assert!(self.start < grid.cell_count() && self.end < grid.cell_count());
        match &mut self.phase {
            Phase::Finished(outcome) => Step::Done(outcome.clone()),
            Phase::Tracing { path, pending } => match pending.pop() {
                Some(ix) => {
                    grid.mark(ix, CellState::Path);
                    Step::Traced(grid.point_of(ix))
                }
                None => {
                    let outcome = SearchOutcome::Found(std::mem::take(path));
                    self.finish(outcome)
                }
            },
            Phase::Expanding => self.expand(grid),
        }
    }

    /// Runs the search to the end, calling `on_step` after every expansion and after every path
    /// cell that gets marked. Returning [ControlFlow::Break] from the hook cancels the search.
    pub fn run<F>(&mut self, grid: &mut Grid, mut on_step: F) -> SearchOutcome
    where
        F: FnMut(&Grid, &Step) -> ControlFlow<()>,
    {
        loop {
            let step = self.step(grid);
            if let Step::Done(outcome) = step {
                return outcome;
            }
            if on_step(grid, &step).is_break() {
                self.cancel(grid);
                return SearchOutcome::Cancelled;
            }
        }
    }

    fn expand(&mut self, grid: &mut Grid) -> Step {
        // The previous cell is closed only now so the hook still saw it as the current cell.
        if let Some(ix) = self.pending_close.take() {
            grid.mark(ix, CellState::Closed);
        }
        let Some(current) = self.ctx.pop() else {
            return self.finish(SearchOutcome::Exhausted);
        };
        if current == self.end {
            let cells = self.ctx.path_to(current);
            let path = cells.iter().map(|&ix| grid.point_of(ix)).collect();
            let pending = match cells.len() {
                0..=2 => Vec::new(),
                n => cells[1..n - 1].to_vec(),
            };
            self.phase = Phase::Tracing { path, pending };
            return self.step(grid);
        }

        self.expanded += 1;
        let tentative = self.ctx.g(current) + 1;
        let neighbours = SmallVec::<[usize; 4]>::from_slice(grid.cell_at(current).neighbours());
        for n in neighbours {
            let h = manhattan(&grid.point_of(n), &self.goal);
            if let Some(true) = self.ctx.relax(n, current, tentative, h) {
                grid.mark(n, CellState::Open);
            }
        }
        if current != self.start {
            self.pending_close = Some(current);
        }
        Step::Expanded(grid.point_of(current))
    }

    fn finish(&mut self, outcome: SearchOutcome) -> Step {
        match &outcome {
            SearchOutcome::Found(path) => info!(
                "Path of length {} found after {} expansions ({} cells discovered)",
                path.len().saturating_sub(1),
                self.expanded,
                self.ctx.discovered()
            ),
            SearchOutcome::Exhausted => info!(
                "Frontier exhausted after {} expansions, no path exists",
                self.expanded
            ),
            SearchOutcome::Cancelled => {}
        }
        self.phase = Phase::Finished(outcome.clone());
        Step::Done(outcome)
    }
}

fn endpoint_index(grid: &Grid, point: Point) -> Result<usize, SearchError> {
    let ix = grid
        .index_of(&point)
        .ok_or(SearchError::OutOfBounds(point))?;
    if grid.cell_at(ix).is_wall() {
        return Err(SearchError::Blocked(point));
    }
    Ok(ix)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ready(text: &str) -> Grid {
        let mut grid = Grid::from_ascii(text).unwrap();
        grid.recompute_adjacency();
        grid
    }

    fn expansion_order(grid: &mut Grid) -> (Vec<Point>, SearchOutcome) {
        let mut search = Search::between_endpoints(grid, SearchContext::new()).unwrap();
        let mut order = Vec::new();
        let outcome = search.run(grid, |_, step| {
            if let Step::Expanded(p) = step {
                order.push(*p);
            }
            ControlFlow::Continue(())
        });
        (order, outcome)
    }

    /// Both routes around the 2x2 square cost the same; the cell below the start is discovered
    /// first and must therefore be expanded first and carry the path.
    #[test]
    fn equal_estimates_expand_in_discovery_order() {
        let mut grid = ready("S.\n.E");
        let (order, outcome) = expansion_order(&mut grid);
        assert_eq!(order, vec![Point::new(0, 0), Point::new(0, 1), Point::new(1, 0)]);
        assert_eq!(
            outcome,
            SearchOutcome::Found(vec![Point::new(0, 0), Point::new(0, 1), Point::new(1, 1)])
        );
        assert_eq!(grid.to_string(), "Sx\n*E\n");
    }

    #[test]
    fn equal_start_goal() {
        let mut grid = ready("...\n...\n...");
        let p = Point::new(1, 1);
        let mut search = Search::new(&grid, p, p).unwrap();
        let mut hook_calls = 0;
        let outcome = search.run(&mut grid, |_, _| {
            hook_calls += 1;
            ControlFlow::Continue(())
        });
        assert_eq!(outcome, SearchOutcome::Found(vec![p]));
        assert_eq!(hook_calls, 0);
        assert!(grid.cells().all(|c| c.state() == CellState::Empty));
    }

    #[test]
    fn hook_sees_every_step() {
        // |S..E|: three expansions, then two path cells.
        let mut grid = ready("S..E\n####\n####\n####");
        let mut steps = Vec::new();
        let mut search = Search::between_endpoints(&grid, SearchContext::new()).unwrap();
        let outcome = search.run(&mut grid, |_, step| {
            steps.push(step.clone());
            ControlFlow::Continue(())
        });
        assert!(outcome.is_found());
        assert_eq!(
            steps,
            vec![
                Step::Expanded(Point::new(0, 0)),
                Step::Expanded(Point::new(1, 0)),
                Step::Expanded(Point::new(2, 0)),
                Step::Traced(Point::new(2, 0)),
                Step::Traced(Point::new(1, 0)),
            ]
        );
        assert_eq!(grid.to_string().lines().next(), Some("S**E"));
    }

    #[test]
    fn breaking_from_hook_cancels() {
        let mut grid = ready(
            "S....
             .....
             .....
             .....
             ....E",
        );
        let mut search = Search::between_endpoints(&grid, SearchContext::new()).unwrap();
        let outcome = search.run(&mut grid, |_, _| ControlFlow::Break(()));
        assert_eq!(outcome, SearchOutcome::Cancelled);
        assert_eq!(search.expanded(), 1);
        assert_eq!(search.step(&mut grid), Step::Done(SearchOutcome::Cancelled));
        assert!(grid.cells().all(|c| c.state() != CellState::Path));
    }

    fn count(grid: &Grid, state: CellState) -> usize {
        grid.cells().filter(|c| c.state() == state).count()
    }

    #[test]
    fn discovered_cells_are_marked_open() {
        let mut grid = ready(
            ".....
             .....
             ..S..
             .....
             E....",
        );
        let mut search = Search::between_endpoints(&grid, SearchContext::new()).unwrap();
        let mut seen = Vec::new();
        let outcome = search.run(&mut grid, |grid, _| {
            seen.push((count(grid, CellState::Open), grid.state(&Point::new(2, 2))));
            ControlFlow::Break(())
        });
        assert_eq!(outcome, SearchOutcome::Cancelled);
        assert_eq!(seen, vec![(4, Some(CellState::Start))]);
        for p in [(2, 3), (2, 1), (3, 2), (1, 2)] {
            assert_eq!(grid.state(&Point::new(p.0, p.1)), Some(CellState::Open));
        }
        assert_eq!(count(&grid, CellState::Closed), 0);
    }

    #[test]
    fn cancelling_closes_the_current_cell() {
        let mut grid = ready(
            ".....
             .....
             ..S..
             .....
             E....",
        );
        let mut search = Search::between_endpoints(&grid, SearchContext::new()).unwrap();
        let mut expanded = Vec::new();
        let mut open_counts = Vec::new();
        let outcome = search.run(&mut grid, |grid, step| {
            if let Step::Expanded(p) = step {
                expanded.push(*p);
            }
            open_counts.push(count(grid, CellState::Open));
            if expanded.len() == 2 {
                ControlFlow::Break(())
            } else {
                ControlFlow::Continue(())
            }
        });
        assert_eq!(outcome, SearchOutcome::Cancelled);
        assert_eq!(open_counts, vec![4, 7]);
        // (2,3) and (1,2) tie on the estimate; (2,3) was discovered first.
        assert_eq!(expanded, vec![Point::new(2, 2), Point::new(2, 3)]);
        assert_eq!(grid.state(&Point::new(2, 3)), Some(CellState::Closed));
        assert_eq!(count(&grid, CellState::Open), 6);
        assert_eq!(count(&grid, CellState::Closed), 1);
        search.cancel(&mut grid);
        assert_eq!(count(&grid, CellState::Closed), 1);
    }

    #[test]
    fn rejects_bad_preconditions() {
        let mut grid = Grid::from_ascii("S#\n..").unwrap();
        assert_eq!(
            Search::new(&grid, Point::new(0, 0), Point::new(1, 1)).unwrap_err(),
            SearchError::StaleAdjacency
        );
        grid.recompute_adjacency();
        assert_eq!(
            Search::new(&grid, Point::new(0, 0), Point::new(1, 0)).unwrap_err(),
            SearchError::Blocked(Point::new(1, 0))
        );
        assert_eq!(
            Search::new(&grid, Point::new(0, 0), Point::new(2, 0)).unwrap_err(),
            SearchError::OutOfBounds(Point::new(2, 0))
        );
        assert_eq!(
            Search::between_endpoints(&grid, SearchContext::new()).unwrap_err(),
            SearchError::MissingEnd
        );
    }

    #[test]
    fn context_is_reusable() {
        let mut grid = ready("S..\n.#.\n..E");
        let mut search = Search::between_endpoints(&grid, SearchContext::new()).unwrap();
        let first = search.run(&mut grid, |_, _| ControlFlow::Continue(()));
        grid.clear_search_marks();
        let mut again = Search::between_endpoints(&grid, search.into_context()).unwrap();
        let second = again.run(&mut grid, |_, _| ControlFlow::Continue(()));
        assert_eq!(first, second);
        assert_eq!(second.path().map(|p| p.len()), Some(5));
    }
}
