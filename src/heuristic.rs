use grid_util::point::Point;

/// [Manhattan distance](https://en.wikipedia.org/wiki/Taxicab_geometry) between two grid
/// positions. Never overestimates the number of orthogonal unit moves needed to get from one to
/// the other, which keeps A* optimal on a 4-connected grid.
pub fn manhattan(p1: &Point, p2: &Point) -> u32 {
    p1.x.abs_diff(p2.x) + p1.y.abs_diff(p2.y)
}
