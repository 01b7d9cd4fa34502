use crate::grid::{Grid, Position};
use crate::solver::Solver;
use serde::{Deserialize, Serialize};

/// Difficulty level: how many cells are carved out of the solved grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    /// Number of cells removed from the solution at this level.
    pub fn cells_to_remove(&self) -> usize {
        match self {
            Difficulty::Easy => 40,
            Difficulty::Medium => 50,
            Difficulty::Hard => 60,
        }
    }

    /// All levels, easiest first.
    pub fn all() -> &'static [Difficulty] {
        &[Difficulty::Easy, Difficulty::Medium, Difficulty::Hard]
    }
}

impl std::fmt::Display for Difficulty {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Difficulty::Easy => write!(f, "Easy"),
            Difficulty::Medium => write!(f, "Medium"),
            Difficulty::Hard => write!(f, "Hard"),
        }
    }
}

/// Candidate cells tried per removal before the carver settles for a
/// smaller removal count. Keeps high removal targets from degenerating
/// into an unbounded rejection loop.
const CARVE_RETRY_BUDGET: usize = 60;

/// Produces solved grids and carves uniquely solvable puzzles from them.
pub struct Generator {
    rng: SimpleRng,
}

impl Default for Generator {
    fn default() -> Self {
        Self::new()
    }
}

impl Generator {
    /// Create a generator seeded from the system entropy source.
    pub fn new() -> Self {
        Self {
            rng: SimpleRng::new(),
        }
    }

    /// Create a generator with a specific seed for reproducibility.
    pub fn with_seed(seed: u64) -> Self {
        Self {
            rng: SimpleRng::with_seed(seed),
        }
    }

    /// Generate a complete, rule-valid grid.
    ///
    /// The three diagonal boxes are seeded with independent random
    /// permutations of 1-9 first; they share no row, column, or box, so no
    /// validity check is needed and the subsequent search starts from the
    /// hardest constraints already satisfied. The rest is filled by
    /// row-major backtracking.
    pub fn generate_solved(&mut self) -> Grid {
        let mut grid = Grid::empty();
        for start in [0, 3, 6] {
            self.fill_box(&mut grid, start, start);
        }
        // A diagonal seeding is always extendable to a full solution, so
        // failure here means the search itself is broken.
        assert!(
            fill_from(&mut grid, 0),
            "diagonal-seeded grid must be completable"
        );
        debug_assert!(grid.is_solved());
        grid
    }

    /// Carve a puzzle out of `solution` by clearing
    /// `difficulty.cells_to_remove()` cells, keeping each removal only if
    /// the grid still has exactly one solution.
    ///
    /// Each removal tries up to `CARVE_RETRY_BUDGET` candidate cells; if
    /// none of them can be cleared without breaking uniqueness, the carver
    /// stops early and returns the puzzle with fewer cells removed. The
    /// result is uniquely solvable in either case.
    pub fn carve(&mut self, solution: &Grid, difficulty: Difficulty) -> Grid {
        debug_assert!(solution.is_solved());
        let solver = Solver::new();
        let mut puzzle = solution.clone();
        let target = difficulty.cells_to_remove();
        let mut removed = 0;

        'removals: while removed < target {
            let mut filled: Vec<Position> = Position::all()
                .filter(|&p| puzzle.get(p).is_some())
                .collect();
            self.shuffle(&mut filled);

            for &pos in filled.iter().take(CARVE_RETRY_BUDGET) {
                let value = puzzle.get(pos);
                puzzle.set(pos, None);
                if solver.has_unique_solution(&puzzle) {
                    removed += 1;
                    continue 'removals;
                }
                puzzle.set(pos, value);
            }

            log::warn!(
                "carve settled for {} of {} removals at {:?}",
                removed,
                target,
                difficulty
            );
            break;
        }

        log::debug!("carved {:?} puzzle: {}", difficulty, puzzle.to_string_compact());
        puzzle
    }

    /// Fill a 3x3 box with a random permutation of 1-9.
    fn fill_box(&mut self, grid: &mut Grid, start_row: usize, start_col: usize) {
        let mut values: Vec<u8> = (1..=9).collect();
        self.shuffle(&mut values);

        let mut idx = 0;
        for row in start_row..start_row + 3 {
            for col in start_col..start_col + 3 {
                grid.set(Position::new(row, col), Some(values[idx]));
                idx += 1;
            }
        }
    }

    /// Fisher-Yates shuffle.
    fn shuffle<T>(&mut self, slice: &mut [T]) {
        for i in (1..slice.len()).rev() {
            let j = self.rng.next_usize(i + 1);
            slice.swap(i, j);
        }
    }
}

/// Complete the grid from cell `idx` (row-major) onward, trying digits 1-9
/// in order and skipping seeded cells. Undoes its own writes on unwind.
fn fill_from(grid: &mut Grid, idx: usize) -> bool {
    if idx == 81 {
        return true;
    }
    let pos = Position::new(idx / 9, idx % 9);
    if grid.get(pos).is_some() {
        return fill_from(grid, idx + 1);
    }
    for digit in 1..=9 {
        if grid.admits(pos, digit) {
            grid.set(pos, Some(digit));
            if fill_from(grid, idx + 1) {
                return true;
            }
            grid.set(pos, None);
        }
    }
    false
}

/// Small PCG-style PRNG, seeded from `getrandom` for WASM compatibility.
struct SimpleRng {
    state: u64,
}

impl SimpleRng {
    fn new() -> Self {
        let mut seed_bytes = [0u8; 8];
        getrandom::getrandom(&mut seed_bytes).unwrap_or_else(|_| {
            // Fallback: use a static counter if getrandom fails
            static COUNTER: std::sync::atomic::AtomicU64 = std::sync::atomic::AtomicU64::new(1);
            let counter = COUNTER.fetch_add(1, std::sync::atomic::Ordering::Relaxed);
            seed_bytes = counter.to_le_bytes();
        });
        Self::with_seed(u64::from_le_bytes(seed_bytes))
    }

    fn with_seed(seed: u64) -> Self {
        Self {
            state: seed.wrapping_add(1),
        }
    }

    fn next_u64(&mut self) -> u64 {
        self.state = self
            .state
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407);
        let xorshifted = (((self.state >> 18) ^ self.state) >> 27) as u32;
        let rot = (self.state >> 59) as u32;
        (xorshifted.rotate_right(rot)) as u64
    }

    fn next_usize(&mut self, bound: usize) -> usize {
        (self.next_u64() as usize) % bound
    }
}
