use crate::grid::{Grid, Position};

/// Stateless backtracking solver. Every call works on a private copy of the
/// input grid; the caller's grid is never mutated.
pub struct Solver;

impl Default for Solver {
    fn default() -> Self {
        Self::new()
    }
}

impl Solver {
    /// Create a new solver.
    pub fn new() -> Self {
        Self
    }

    /// Solve the puzzle, returning the first completion found.
    pub fn solve(&self, grid: &Grid) -> Option<Grid> {
        let mut working = grid.clone();
        if solve_from(&mut working, 0) {
            Some(working)
        } else {
            None
        }
    }

    /// Count completions of the grid, stopping once the count reaches
    /// `limit`. The return value is therefore in `0..=limit`; callers that
    /// only need to certify uniqueness pass 2.
    pub fn count_solutions(&self, grid: &Grid, limit: usize) -> usize {
        let mut working = grid.clone();
        let mut count = 0;
        count_from(&mut working, 0, &mut count, limit);
        count
    }

    /// Whether the grid admits exactly one completion.
    pub fn has_unique_solution(&self, grid: &Grid) -> bool {
        self.count_solutions(grid, 2) == 1
    }
}

/// Fill cells from `idx` (row-major) onward, trying digits 1-9 in order.
/// The single grid buffer is restored on every unwind.
fn solve_from(grid: &mut Grid, idx: usize) -> bool {
    if idx == 81 {
        return true;
    }
    let pos = Position::new(idx / 9, idx % 9);
    if grid.get(pos).is_some() {
        return solve_from(grid, idx + 1);
    }
    for digit in 1..=9 {
        if grid.admits(pos, digit) {
            grid.set(pos, Some(digit));
            if solve_from(grid, idx + 1) {
                return true;
            }
            grid.set(pos, None);
        }
    }
    false
}

/// Same search as `solve_from`, but explores every branch and tallies
/// completions, pruning as soon as `count` reaches `limit`.
fn count_from(grid: &mut Grid, idx: usize, count: &mut usize, limit: usize) {
    if *count >= limit {
        return;
    }
    if idx == 81 {
        *count += 1;
        return;
    }
    let pos = Position::new(idx / 9, idx % 9);
    if grid.get(pos).is_some() {
        count_from(grid, idx + 1, count, limit);
        return;
    }
    for digit in 1..=9 {
        if grid.admits(pos, digit) {
            grid.set(pos, Some(digit));
            count_from(grid, idx + 1, count, limit);
            grid.set(pos, None);
            if *count >= limit {
                return;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PUZZLE: &str =
        "530070000600195000098000060800060003400803001700020006060000280000419005000080079";
    const SOLUTION: &str =
        "534678912672195348198342567859761423426853791713924856961537284287419635345286179";

    #[test]
    fn test_solve_known_puzzle() {
        let grid = Grid::from_string(PUZZLE).unwrap();
        let solver = Solver::new();
        let solved = solver.solve(&grid).unwrap();
        assert!(solved.is_solved());
        assert_eq!(solved.to_string_compact(), SOLUTION);
    }

    #[test]
    fn test_solve_preserves_givens() {
        let grid = Grid::from_string(PUZZLE).unwrap();
        let solved = Solver::new().solve(&grid).unwrap();
        for pos in Position::all() {
            if let Some(v) = grid.get(pos) {
                assert_eq!(solved.get(pos), Some(v));
            }
        }
    }

    #[test]
    fn test_unique_solution() {
        let grid = Grid::from_string(PUZZLE).unwrap();
        let solver = Solver::new();
        assert!(solver.has_unique_solution(&grid));
        assert_eq!(solver.count_solutions(&grid, 2), 1);
    }

    #[test]
    fn test_count_caps_at_limit() {
        // A single given leaves an astronomical number of completions; the
        // counter must stop at the cap rather than enumerate them.
        let mut grid = Grid::empty();
        grid.set(Position::new(0, 0), Some(1));
        let solver = Solver::new();
        assert_eq!(solver.count_solutions(&grid, 2), 2);
        assert!(!solver.has_unique_solution(&grid));
    }

    #[test]
    fn test_unsolvable_grid() {
        // 1..8 in row 0 and the missing 9 blocked in by the column below.
        let mut grid = Grid::empty();
        for (c, v) in (1..=8u8).enumerate() {
            grid.set(Position::new(0, c), Some(v));
        }
        grid.set(Position::new(1, 8), Some(9));
        let solver = Solver::new();
        assert!(solver.solve(&grid).is_none());
        assert_eq!(solver.count_solutions(&grid, 2), 0);
    }

    #[test]
    fn test_caller_grid_untouched() {
        let grid = Grid::from_string(PUZZLE).unwrap();
        let before = grid.to_string_compact();
        let solver = Solver::new();
        solver.solve(&grid);
        solver.count_solutions(&grid, 2);
        assert_eq!(grid.to_string_compact(), before);
    }
}
