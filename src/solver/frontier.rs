use std::cmp::Ordering;

/// Heap entry of the open set. [BinaryHeap](std::collections::BinaryHeap) is a max-heap, so the
/// ordering is reversed: the smallest estimated cost wins, and among equal estimates the entry
/// with the smallest sequence number (the cell discovered first) wins.
#[derive(Clone, Copy, Debug)]
pub(crate) struct FrontierEntry {
    pub estimated_cost: u32,
    pub seq: u64,
    pub index: usize,
}

impl Eq for FrontierEntry {}

impl PartialEq for FrontierEntry {
    fn eq(&self, other: &Self) -> bool {
        self.estimated_cost == other.estimated_cost && self.seq == other.seq
    }
}

impl PartialOrd for FrontierEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for FrontierEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        match other.estimated_cost.cmp(&self.estimated_cost) {
            Ordering::Equal => other.seq.cmp(&self.seq),
            s => s,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BinaryHeap;

    #[test]
    fn pops_lowest_cost_then_earliest() {
        let mut heap = BinaryHeap::new();
        for (estimated_cost, seq, index) in [(4, 0, 0), (2, 3, 1), (2, 1, 2), (3, 2, 3)] {
            heap.push(FrontierEntry {
                estimated_cost,
                seq,
                index,
            });
        }
        let order = std::iter::from_fn(|| heap.pop().map(|e| e.index)).collect::<Vec<_>>();
        assert_eq!(order, vec![2, 1, 3, 0]);
    }
}
