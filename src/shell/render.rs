//! Software rendering of a [Grid] into a `0RGB` pixel buffer as used by softbuffer.
use grid_util::point::Point;

use crate::cell::CellState;
use crate::grid::Grid;

const fn rgb(r: u8, g: u8, b: u8) -> u32 {
    ((r as u32) << 16) | ((g as u32) << 8) | (b as u32)
}

pub const WHITE: u32 = rgb(255, 250, 250);
pub const VIOLET: u32 = rgb(238, 130, 238);
pub const RED: u32 = rgb(250, 128, 114);
pub const GREY: u32 = rgb(128, 128, 128);
pub const BLUE: u32 = rgb(0, 191, 255);
pub const TURQUOISE: u32 = rgb(64, 224, 208);
pub const ORANGE: u32 = rgb(255, 127, 80);
pub const SILVER: u32 = rgb(192, 192, 192);

pub fn state_color(state: CellState) -> u32 {
    match state {
        CellState::Empty => WHITE,
        CellState::Start => VIOLET,
        CellState::End => RED,
        CellState::Wall => GREY,
        CellState::Open => BLUE,
        CellState::Closed => TURQUOISE,
        CellState::Path => ORANGE,
    }
}

/// Paints every cell as a `cell_px` square followed by the grid lines. Pixels outside the grid
/// are left white; cells that fall outside the buffer are clipped.
pub fn paint(grid: &Grid, cell_px: usize, buf: &mut [u32], buf_width: usize, buf_height: usize) {
    debug_assert!(buf.len() >= buf_width * buf_height);
    buf.fill(WHITE);
    if cell_px == 0 {
        return;
    }
    for cell in grid.cells() {
        let color = state_color(cell.state());
        if color == WHITE {
            continue;
        }
        let x0 = cell.col() * cell_px;
        let y0 = cell.row() * cell_px;
        let x1 = (x0 + cell_px).min(buf_width);
        for y in y0..(y0 + cell_px).min(buf_height) {
            if x0 < x1 {
                buf[y * buf_width + x0..y * buf_width + x1].fill(color);
            }
        }
    }
    let extent = grid.size() * cell_px;
    for i in 0..grid.size() {
        let offset = i * cell_px;
        if offset < buf_height {
            let row = offset * buf_width;
            buf[row..row + extent.min(buf_width)].fill(SILVER);
        }
        if offset < buf_width {
            for y in 0..extent.min(buf_height) {
                buf[y * buf_width + offset] = SILVER;
            }
        }
    }
}

/// Maps a cursor position in pixels to the grid cell under it.
pub fn pixel_to_point(x: f64, y: f64, cell_px: usize, grid_size: usize) -> Option<Point> {
    if x < 0.0 || y < 0.0 || cell_px == 0 {
        return None;
    }
    let col = x as usize / cell_px;
    let row = y as usize / cell_px;
    (col < grid_size && row < grid_size).then(|| Point::new(col as i32, row as i32))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cells_and_lines_are_painted() {
        let grid = Grid::from_ascii("....\n....\n.S#.\n...E").unwrap();
        let (w, h) = (45, 40);
        let mut buf = vec![0; w * h];
        paint(&grid, 10, &mut buf, w, h);
        let at = |x: usize, y: usize| buf[y * w + x];
        assert_eq!(at(15, 25), VIOLET);
        assert_eq!(at(25, 25), GREY);
        assert_eq!(at(35, 35), RED);
        assert_eq!(at(5, 5), WHITE);
        assert_eq!(at(10, 3), SILVER);
        assert_eq!(at(3, 20), SILVER);
        // Right of the grid.
        assert_eq!(at(42, 5), WHITE);
    }

    #[test]
    fn cursor_mapping() {
        assert_eq!(pixel_to_point(39.9, 5.0, 10, 4), Some(Point::new(3, 0)));
        assert_eq!(pixel_to_point(40.0, 5.0, 10, 4), None);
        assert_eq!(pixel_to_point(-1.0, 5.0, 10, 4), None);
    }
}
