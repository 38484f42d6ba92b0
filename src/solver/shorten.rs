use super::los::check_line;
use crate::pathing_grid::PathingGrid;
use grid_util::point::Point;
use log::{trace, warn};

/// Upper bound on full smoothing passes, reached only if corner swaps keep undoing each other.
const MAX_LOCAL_PASSES: usize = 32;

/// Follows the parent links back from `end` and returns the arena indices from start to end.
pub fn reconstruct_path(grid: &PathingGrid, end: usize) -> Vec<usize> {
    let mut path: Vec<usize> =
        std::iter::successors(Some(end), |&ix| grid.node(ix).parent).collect();
    path.reverse();
    path
}

fn delta(from: Point, to: Point) -> (i32, i32) {
    (to.x - from.x, to.y - from.y)
}

fn offset(p: Point, (dx, dy): (i32, i32)) -> Point {
    Point::new(p.x + dx, p.y + dy)
}

/// Removes and straightens kinks in a path whose consecutive points are neighbouring cells.
///
/// Every interior point is classified by the squared distance between its neighbours on the
/// path: 1 means a 45 degree bend, 2 a right angle, 5 a 135 degree bend, and 4 or 8 either a
/// straight run or a one-cell bump. Each change rewinds by one point so simplifications can
/// cascade, and passes repeat until the path no longer changes.
///
/// A new diagonal step follows the same corner rule as the search: both cells beside it must be
/// clear. When a right angle or a 135 degree bend is cut, one of those cells is the point being
/// removed or moved, so a costly bend point is never cut past.
///
/// # Panics
///
/// If two consecutive points are not neighbouring cells.
pub fn shorten_local(grid: &PathingGrid, path: &mut Vec<Point>) {
    for _ in 0..MAX_LOCAL_PASSES {
        if !local_pass(grid, path) {
            return;
        }
    }
    warn!(
        "Local shortening did not settle after {} passes",
        MAX_LOCAL_PASSES
    );
}

fn local_pass(grid: &PathingGrid, path: &mut Vec<Point>) -> bool {
    let mut changed_any = false;
    let mut i = 1;
    while i + 1 < path.len() {
        let (prev, cur, next) = (path[i - 1], path[i], path[i + 1]);
        let (dx, dy) = delta(prev, next);
        let changed = match dx * dx + dy * dy {
            // 45 degrees, the neighbours touch directly
            1 => {
                path.remove(i);
                true
            }
            // 90 degrees, cut the corner if both cells beside the new diagonal are clear
            2 => {
                let corner = offset(prev, delta(cur, next));
                if grid.is_clear(corner) && grid.is_clear(cur) {
                    path.remove(i);
                    true
                } else {
                    false
                }
            }
            5 => i >= 2 && swap_corner(grid, path, i),
            4 | 8 => {
                let (v1, v2) = (delta(prev, cur), delta(cur, next));
                if v1.0 * v2.1 - v1.1 * v2.0 == 0 {
                    false
                } else {
                    let fill = offset(prev, (dx / 2, dy / 2));
                    replace_if_clear(grid, path, i, fill)
                }
            }
            other => panic!(
                "Path points {} and {} around {} are not neighbouring cells (squared distance {})",
                prev, next, cur, other
            ),
        };
        if changed {
            trace!("Local shortening changed the path at {}", cur);
            changed_any = true;
            i = (i - 1).max(1);
        } else {
            i += 1;
        }
    }
    changed_any
}

/// At a 135 degree bend there are two ways of ordering the straight and the diagonal step. The
/// one whose corner lies closer to the point before the bend is preferred.
fn swap_corner(grid: &PathingGrid, path: &mut Vec<Point>, i: usize) -> bool {
    let (before, prev, cur, next) = (path[i - 2], path[i - 1], path[i], path[i + 1]);
    let (dx, dy) = delta(prev, next);
    let (sx, sy) = (dx.signum(), dy.signum());
    let straight = if dx.abs() == 2 {
        offset(prev, (sx, 0))
    } else {
        offset(prev, (0, sy))
    };
    let diagonal = offset(prev, (sx, sy));
    let dist = |p: Point| {
        let (ex, ey) = delta(before, p);
        ex * ex + ey * ey
    };
    let pick = if dist(straight) < dist(diagonal) {
        straight
    } else {
        diagonal
    };
    if pick == cur {
        return false;
    }
    // The new diagonal step passes between the old corner and this cell
    let (a, b) = if pick == straight {
        (pick, next)
    } else {
        (prev, pick)
    };
    let flank = Point::new(a.x, b.y);
    let cut = if flank == cur {
        Point::new(b.x, a.y)
    } else {
        flank
    };
    grid.is_clear(cut) && grid.is_clear(cur) && replace_if_clear(grid, path, i, pick)
}

/// Replaces the point at `i` unless the replacement is blocked or already on the path.
fn replace_if_clear(grid: &PathingGrid, path: &mut [Point], i: usize, p: Point) -> bool {
    if grid.is_clear(p) && !path.contains(&p) {
        path[i] = p;
        true
    } else {
        false
    }
}

/// Whether `cur` continues the straight run from `anchor` through its neighbour `prev`, given
/// that `prev` is visible from `anchor`. Such a run is a pure orthogonal or diagonal line, so
/// only the cells of the last step need checking.
fn continues_run(grid: &PathingGrid, anchor: Point, prev: Point, cur: Point) -> bool {
    let (vx, vy) = delta(anchor, prev);
    let (sx, sy) = delta(prev, cur);
    vx * sy - vy * sx == 0
        && vx * sx + vy * sy > 0
        && grid.is_clear(cur)
        && (sx == 0
            || sy == 0
            || (grid.is_clear(Point::new(prev.x + sx, prev.y))
                && grid.is_clear(Point::new(prev.x, prev.y + sy))))
}

/// Collapses runs of mutually visible points into straight segments.
///
/// Walking the path, a point is skipped while it is visible from the current tail of the
/// output, or while some later point still is. Once neither holds, the earliest skipped point
/// that sees the current point becomes the new tail. The first and last points are always
/// kept. Paths that touch any cell that is not clear are returned unchanged, since line of
/// sight only holds across open ground.
pub fn shorten_global(grid: &PathingGrid, path: &[Point]) -> Vec<Point> {
    let n = path.len();
    if n < 3 || !path.iter().all(|&p| grid.is_clear(p)) {
        return path.to_vec();
    }
    let mut out = vec![path[0]];
    let mut tail = 0;
    // Indices after `tail` that are visible from it
    let mut seen: Vec<usize> = Vec::new();
    let mut i = 1;
    while i < n {
        let anchor = path[tail];
        let cur = path[i];
        let run = seen.last() == Some(&(i - 1)) && continues_run(grid, anchor, path[i - 1], cur);
        if run || check_line(grid, anchor, cur) {
            seen.push(i);
            i += 1;
            continue;
        }
        if path[i + 1..].iter().any(|&p| check_line(grid, anchor, p)) {
            i += 1;
            continue;
        }
        let corner = seen
            .iter()
            .copied()
            .find(|&j| check_line(grid, path[j], cur))
            .or_else(|| seen.last().copied());
        seen.clear();
        match corner {
            Some(j) => {
                out.push(path[j]);
                tail = j;
                i = j + 1;
            }
            None => {
                out.push(cur);
                tail = i;
                i += 1;
            }
        }
    }
    if out.last() != Some(&path[n - 1]) {
        out.push(path[n - 1]);
    }
    trace!("Global shortening kept {} of {} points", out.len(), n);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::solver::astar::AstarSolver;
    use itertools::Itertools;

    fn open_grid(width: usize) -> PathingGrid {
        let mut grid = PathingGrid::new(width);
        for y in 0..width as i32 {
            for x in 0..width as i32 {
                grid.set_walkable(Point::new(x, y), true);
            }
        }
        grid
    }

    fn points(coords: &[(i32, i32)]) -> Vec<Point> {
        coords.iter().map(|&(x, y)| Point::new(x, y)).collect()
    }

    fn local(grid: &PathingGrid, coords: &[(i32, i32)]) -> Vec<Point> {
        let mut path = points(coords);
        shorten_local(grid, &mut path);
        path
    }

    #[test]
    fn reconstruct_follows_parents() {
        let mut grid = open_grid(4);
        let solver = AstarSolver::new(1.0, 100);
        let end = grid.ix_fast(Point::new(3, 0));
        assert!(solver.search(&mut grid, 0, end).found);
        assert_eq!(reconstruct_path(&grid, end), vec![0, 1, 2, 3]);
    }

    #[test]
    fn zigzag_loses_its_detour() {
        let grid = open_grid(4);
        let path = local(&grid, &[(0, 0), (1, 1), (1, 0), (2, 0)]);
        assert_eq!(path, points(&[(0, 0), (1, 0), (2, 0)]));
    }

    #[test]
    fn right_angle_is_cut_when_corner_is_clear() {
        let mut grid = open_grid(3);
        let path = local(&grid, &[(0, 0), (1, 0), (1, 1)]);
        assert_eq!(path, points(&[(0, 0), (1, 1)]));

        grid.add_cost(Point::new(0, 1), 1.0);
        let path = local(&grid, &[(0, 0), (1, 0), (1, 1)]);
        assert_eq!(path, points(&[(0, 0), (1, 0), (1, 1)]));

        // A costly corner on the path itself is not cut either
        let mut grid = open_grid(3);
        grid.add_cost(Point::new(1, 0), 1.0);
        let path = local(&grid, &[(0, 0), (1, 0), (1, 1)]);
        assert_eq!(path, points(&[(0, 0), (1, 0), (1, 1)]));
    }

    #[test]
    fn bend_prefers_corner_near_previous_point() {
        let grid = open_grid(5);
        let path = local(&grid, &[(0, 0), (1, 0), (2, 1), (3, 1)]);
        assert_eq!(path, points(&[(0, 0), (1, 0), (2, 0), (3, 1)]));
        // Already in the preferred shape
        let path = local(&grid, &[(0, 0), (1, 0), (2, 0), (3, 1)]);
        assert_eq!(path, points(&[(0, 0), (1, 0), (2, 0), (3, 1)]));
    }

    #[test]
    fn bend_keeps_shape_when_cut_corner_is_blocked() {
        let mut grid = open_grid(5);
        grid.set_walkable(Point::new(3, 0), false);
        let path = local(&grid, &[(0, 0), (1, 0), (2, 1), (3, 1)]);
        assert_eq!(path, points(&[(0, 0), (1, 0), (2, 1), (3, 1)]));
    }

    #[test]
    fn bump_is_flattened() {
        let mut grid = open_grid(3);
        let path = local(&grid, &[(0, 0), (1, 1), (2, 0)]);
        assert_eq!(path, points(&[(0, 0), (1, 0), (2, 0)]));

        grid.set_walkable(Point::new(1, 0), false);
        let path = local(&grid, &[(0, 0), (1, 1), (2, 0)]);
        assert_eq!(path, points(&[(0, 0), (1, 1), (2, 0)]));
    }

    #[test]
    fn straight_runs_are_kept() {
        let grid = open_grid(4);
        let diagonal = points(&[(0, 0), (1, 1), (2, 2), (3, 3)]);
        let mut path = diagonal.clone();
        shorten_local(&grid, &mut path);
        assert_eq!(path, diagonal);
    }

    #[test]
    #[should_panic]
    fn non_adjacent_points_fail_loudly() {
        let grid = open_grid(8);
        local(&grid, &[(0, 0), (3, 0), (6, 0)]);
    }

    #[test]
    fn local_shortening_is_idempotent() {
        // |S.....|
        // |.####.|
        // |.#..#.|
        // |.#.G#.|
        // |.#..#.|
        // |......|
        let mut grid = open_grid(6);
        for i in 1..5 {
            grid.set_walkable(Point::new(1, i), false);
            grid.set_walkable(Point::new(4, i), false);
        }
        grid.set_walkable(Point::new(2, 1), false);
        grid.set_walkable(Point::new(3, 1), false);
        let solver = AstarSolver::new(1.0, 500);
        let end = grid.ix_fast(Point::new(3, 3));
        assert!(solver.search(&mut grid, 0, end).found);
        let mut path = reconstruct_path(&grid, end)
            .into_iter()
            .map(|ix| grid.point(ix))
            .collect::<Vec<_>>();
        shorten_local(&grid, &mut path);
        let once = path.clone();
        shorten_local(&grid, &mut path);
        assert_eq!(path, once);
        assert_eq!(path.first(), Some(&Point::new(0, 0)));
        assert_eq!(path.last(), Some(&Point::new(3, 3)));
        for (a, b) in path.iter().tuple_windows() {
            assert!((a.x - b.x).abs() <= 1 && (a.y - b.y).abs() <= 1);
        }
    }

    #[test]
    fn open_ground_collapses_to_a_segment() {
        let grid = open_grid(5);
        let path = points(&[(0, 0), (1, 0), (2, 0), (3, 1), (4, 2)]);
        assert_eq!(shorten_global(&grid, &path), points(&[(0, 0), (4, 2)]));
    }

    #[test]
    fn costly_cells_disable_global_shortening() {
        let mut grid = open_grid(5);
        grid.add_cost(Point::new(2, 0), 0.5);
        let path = points(&[(0, 0), (1, 0), (2, 0), (3, 1), (4, 2)]);
        assert_eq!(shorten_global(&grid, &path), path);
    }

    #[test]
    fn global_shortening_keeps_corners_around_walls() {
        // |S.#..|
        // |..#..|
        // |..#G.|
        // |..#..|
        // |.....|
        let mut grid = open_grid(5);
        for y in 0..4 {
            grid.set_walkable(Point::new(2, y), false);
        }
        let solver = AstarSolver::new(1.0, 500);
        let end = grid.ix_fast(Point::new(3, 2));
        assert!(solver.search(&mut grid, 0, end).found);
        let mut path = reconstruct_path(&grid, end)
            .into_iter()
            .map(|ix| grid.point(ix))
            .collect::<Vec<_>>();
        shorten_local(&grid, &mut path);
        let short = shorten_global(&grid, &path);
        assert_eq!(short.first(), Some(&Point::new(0, 0)));
        assert_eq!(short.last(), Some(&Point::new(3, 2)));
        assert!(short.len() > 2);
        assert!(short.len() <= path.len());
        for (a, b) in short.iter().tuple_windows() {
            assert!(check_line(&grid, *a, *b), "{} -> {}", a, b);
        }
    }
}
