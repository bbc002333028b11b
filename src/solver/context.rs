use super::frontier::FrontierEntry;
use std::collections::BinaryHeap;

const UNREACHED: u32 = u32::MAX;
const NO_PARENT: usize = usize::MAX;

/// Per-search bookkeeping indexed by flat cell index. Kept around between searches so the
/// buffers are only reallocated when the grid grows.
#[derive(Clone, Debug, Default)]
pub struct SearchContext {
    g: Vec<u32>,
    f: Vec<u32>,
    came_from: Vec<usize>,
    in_frontier: Vec<bool>,
    seq_of: Vec<u64>,
    frontier: BinaryHeap<FrontierEntry>,
    next_seq: u64,
}

impl SearchContext {
    pub fn new() -> SearchContext {
        SearchContext::default()
    }

    /// Clears all scores and sizes the buffers for `len` cells.
    pub(crate) fn reset(&mut self, len: usize) {
        self.g.clear();
        self.g.resize(len, UNREACHED);
        self.f.clear();
        self.f.resize(len, UNREACHED);
        self.came_from.clear();
        self.came_from.resize(len, NO_PARENT);
        self.in_frontier.clear();
        self.in_frontier.resize(len, false);
        self.seq_of.clear();
        self.seq_of.resize(len, 0);
        self.frontier.clear();
        self.next_seq = 0;
    }

    pub(crate) fn g(&self, ix: usize) -> u32 {
        self.g[ix]
    }

    /// Puts `ix` on the frontier with cost `g` and estimate `f`. A cell that is already waiting
    /// keeps its sequence number, so its position among equal estimates does not change; the
    /// heap entry holding the outdated estimate is dropped when it surfaces.
    /// Returns whether the cell was newly added.
    pub(crate) fn push(&mut self, ix: usize, g: u32, f: u32) -> bool {
        self.g[ix] = g;
        self.f[ix] = f;
        let newly_added = !self.in_frontier[ix];
        if newly_added {
            self.seq_of[ix] = self.next_seq;
            self.next_seq += 1;
            self.in_frontier[ix] = true;
        }
        self.frontier.push(FrontierEntry {
            estimated_cost: f,
            seq: self.seq_of[ix],
            index: ix,
        });
        newly_added
    }

    /// Records that `ix` was reached from `parent` with cost `g`. Returns [None] if `g` does not
    /// improve on the best known cost, otherwise whether `ix` was newly added to the frontier.
    pub(crate) fn relax(&mut self, ix: usize, parent: usize, g: u32, h: u32) -> Option<bool> {
        if g >= self.g[ix] {
            return None;
        }
        self.came_from[ix] = parent;
        Some(self.push(ix, g, g + h))
    }

    /// Removes and returns the waiting cell with the smallest estimate, skipping heap entries
    /// that no longer match the cell's current estimate.
    pub(crate) fn pop(&mut self) -> Option<usize> {
        while let Some(FrontierEntry {
            estimated_cost,
            seq,
            index,
        }) = self.frontier.pop()
        {
            if self.in_frontier[index]
                && self.f[index] == estimated_cost
                && self.seq_of[index] == seq
            {
                self.in_frontier[index] = false;
                return Some(index);
            }
        }
        None
    }

    /// Cells from the root of the search to `ix`, both included.
    pub(crate) fn path_to(&self, ix: usize) -> Vec<usize> {
        let mut path = std::iter::successors(Some(ix), |&i| {
            Some(self.came_from[i]).filter(|&p| p != NO_PARENT)
        })
        .collect::<Vec<usize>>();
        path.reverse();
        path
    }

    /// Number of sequence numbers handed out so far, the root included.
    pub(crate) fn discovered(&self) -> u64 {
        self.next_seq
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn improved_cell_keeps_its_place() {
        let mut ctx = SearchContext::new();
        ctx.reset(4);
        ctx.push(0, 0, 2);
        assert_eq!(ctx.pop(), Some(0));
        assert_eq!(ctx.relax(1, 0, 3, 3), Some(true));
        assert_eq!(ctx.relax(2, 0, 1, 3), Some(true));
        // Cell 1 improves to the estimate of cell 2 but was discovered first.
        assert_eq!(ctx.relax(1, 3, 1, 3), Some(false));
        assert_eq!(ctx.relax(1, 0, 2, 3), None);
        assert_eq!(ctx.pop(), Some(1));
        assert_eq!(ctx.pop(), Some(2));
        // The outdated entry for cell 1 is skipped.
        assert_eq!(ctx.pop(), None);
        assert_eq!(ctx.path_to(1), vec![3, 1]);
        assert_eq!(ctx.discovered(), 3);
    }
}
