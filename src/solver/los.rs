use crate::pathing_grid::PathingGrid;
use grid_util::point::Point;

/// Checks whether a straight line between two cells only crosses clear cells.
///
/// Pure diagonals step one cell along both axes and also test the two cells flanking each step.
/// Any other line is stepped along its major axis; the minor coordinate is interpolated with
/// truncating integer division, and wherever it is not a whole cell the neighbouring cell on
/// the minor axis is tested as well, so the line cannot slip past the corner of a blocked cell.
pub fn check_line(grid: &PathingGrid, start: Point, end: Point) -> bool {
    let dx = end.x - start.x;
    let dy = end.y - start.y;
    let (sx, sy) = (dx.signum(), dy.signum());
    let (ax, ay) = (dx.abs(), dy.abs());

    if ax == ay {
        for k in 0..ax {
            let x = start.x + k * sx;
            let y = start.y + k * sy;
            if !grid.is_clear(Point::new(x, y))
                || !grid.is_clear(Point::new(x + sx, y))
                || !grid.is_clear(Point::new(x, y + sy))
            {
                return false;
            }
        }
        return grid.is_clear(end);
    }

    if ax > ay {
        (0..=ax).all(|k| {
            let x = start.x + k * sx;
            let num = dy * k;
            let y = start.y + num / ax;
            grid.is_clear(Point::new(x, y))
                && (num % ax == 0 || grid.is_clear(Point::new(x, y + sy)))
        })
    } else {
        (0..=ay).all(|k| {
            let y = start.y + k * sy;
            let num = dx * k;
            let x = start.x + num / ay;
            grid.is_clear(Point::new(x, y))
                && (num % ay == 0 || grid.is_clear(Point::new(x + sx, y)))
        })
    }
}
