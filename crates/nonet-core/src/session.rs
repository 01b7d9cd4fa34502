use crate::generator::{Difficulty, Generator};
use crate::grid::{Grid, Position, UnitKind};
use crate::hint::Hint;
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};

/// Wrong attempts allowed before the session fails.
pub const MAX_WRONG_ATTEMPTS: u32 = 3;

/// Hint allowance per session.
pub const HINTS_PER_SESSION: u32 = 3;

/// Lifecycle of a play session.
///
/// `Idle -> Generating -> Playing <-> Paused`, terminating in `Completed`
/// or `Failed`. Construction runs generation synchronously, so a freshly
/// built session is already `Playing`; `Completed` and `Failed` are
/// terminal for the instance and a new game means a new `Session`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionState {
    Idle,
    Generating,
    Playing,
    Paused,
    Completed,
    Failed,
}

/// Remaining placements per digit. The board and budget move together:
/// `remaining(d) + count_of(d) == 9` for every digit at all times.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DigitBudget {
    remaining: [u8; 9],
}

impl DigitBudget {
    /// Budget consistent with the digits already on `board`.
    fn for_board(board: &Grid) -> Self {
        let mut remaining = [9u8; 9];
        for pos in Position::all() {
            if let Some(v) = board.get(pos) {
                remaining[(v - 1) as usize] -= 1;
            }
        }
        Self { remaining }
    }

    /// Placements left for `digit`.
    pub fn remaining(&self, digit: u8) -> u8 {
        self.remaining[(digit - 1) as usize]
    }

    /// Whether all nine copies of `digit` are on the board.
    pub fn is_exhausted(&self, digit: u8) -> bool {
        self.remaining(digit) == 0
    }

    fn take(&mut self, digit: u8) {
        debug_assert!(!self.is_exhausted(digit));
        self.remaining[(digit - 1) as usize] -= 1;
    }

    fn put(&mut self, digit: u8) {
        debug_assert!(self.remaining(digit) < 9);
        self.remaining[(digit - 1) as usize] += 1;
    }
}

/// The set of units a single placement just completed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShapeSet {
    bits: u8,
}

impl ShapeSet {
    fn bit(unit: UnitKind) -> u8 {
        match unit {
            UnitKind::Row => 1,
            UnitKind::Column => 2,
            UnitKind::Box => 4,
        }
    }

    /// Build a set from the listed units.
    pub fn from_units(units: &[UnitKind]) -> Self {
        let mut set = Self::default();
        for &u in units {
            set.bits |= Self::bit(u);
        }
        set
    }

    pub fn contains(&self, unit: UnitKind) -> bool {
        self.bits & Self::bit(unit) != 0
    }

    pub fn is_empty(&self) -> bool {
        self.bits == 0
    }

    /// Human label: "row", "row+box", "all three", ...
    pub fn label(&self) -> &'static str {
        match (
            self.contains(UnitKind::Row),
            self.contains(UnitKind::Column),
            self.contains(UnitKind::Box),
        ) {
            (true, true, true) => "all three",
            (true, true, false) => "row+column",
            (true, false, true) => "row+box",
            (false, true, true) => "column+box",
            (true, false, false) => "row",
            (false, true, false) => "column",
            (false, false, true) => "box",
            (false, false, false) => "",
        }
    }
}

/// Why a move or hint request was refused. Rejections are verdicts carried
/// in return values, never panics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Rejection {
    /// The targeted cell is a given.
    NonEditableCell,
    /// The digit contradicts the solution.
    WrongDigit,
    /// All nine copies of the digit are already on the board.
    DigitExhausted,
    /// Hint allowance exhausted, nothing selected, or cell not eligible.
    HintUnavailable,
}

impl std::fmt::Display for Rejection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Rejection::NonEditableCell => write!(f, "that cell is a given"),
            Rejection::WrongDigit => write!(f, "wrong digit"),
            Rejection::DigitExhausted => write!(f, "all nine copies are placed"),
            Rejection::HintUnavailable => write!(f, "no hint available"),
        }
    }
}

/// Verdict for a single input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveResult {
    /// The digit (or erase) was written to the board.
    Committed {
        /// Completed units, when they differ from the previous signal.
        smart_move: Option<ShapeSet>,
        /// The whole board now matches the solution.
        board_complete: bool,
    },
    /// Nothing was written; the reason says why.
    Rejected(Rejection),
    /// No cell selected, or the session is not accepting moves.
    Ignored,
}

/// A full play session: the solution, the carved puzzle, the player's
/// working board, and the scoring state around them. The presentation
/// layer drives it through `select`/`input`/`hint`/`pause`/`resume` and
/// renders from the accessors; it never touches the solution.
pub struct Session {
    solution: Grid,
    puzzle: Grid,
    board: Grid,
    budget: DigitBudget,
    difficulty: Difficulty,
    state: SessionState,
    selected: Option<Position>,
    wrong_attempts: u32,
    hints_left: u32,
    last_smart: Option<ShapeSet>,
    start_time: Instant,
    elapsed: Duration,
}

impl Session {
    /// Generate a puzzle at `difficulty` and start playing.
    pub fn new(difficulty: Difficulty) -> Self {
        Self::generate(Generator::new(), difficulty)
    }

    /// Like `new`, but with deterministic generation.
    pub fn with_seed(difficulty: Difficulty, seed: u64) -> Self {
        Self::generate(Generator::with_seed(seed), difficulty)
    }

    fn generate(mut generator: Generator, difficulty: Difficulty) -> Self {
        let solution = generator.generate_solved();
        let puzzle = generator.carve(&solution, difficulty);
        Self::start(solution, puzzle, difficulty)
    }

    /// Start a session from an existing solution/puzzle pair. Returns
    /// `None` if the solution is not solved or the puzzle's givens
    /// disagree with it.
    pub fn from_parts(solution: Grid, puzzle: Grid, difficulty: Difficulty) -> Option<Self> {
        if !solution.is_solved() {
            return None;
        }
        let consistent = Position::all()
            .all(|p| puzzle.get(p).is_none() || puzzle.get(p) == solution.get(p));
        if !consistent {
            return None;
        }
        Some(Self::start(solution, puzzle, difficulty))
    }

    fn start(solution: Grid, puzzle: Grid, difficulty: Difficulty) -> Self {
        let board = puzzle.clone();
        let budget = DigitBudget::for_board(&board);
        Self {
            solution,
            puzzle,
            board,
            budget,
            difficulty,
            state: SessionState::Playing,
            selected: None,
            wrong_attempts: 0,
            hints_left: HINTS_PER_SESSION,
            last_smart: None,
            start_time: Instant::now(),
            elapsed: Duration::ZERO,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn difficulty(&self) -> Difficulty {
        self.difficulty
    }

    /// The player's working board.
    pub fn board(&self) -> &Grid {
        &self.board
    }

    /// The carved puzzle; non-empty cells are givens.
    pub fn puzzle(&self) -> &Grid {
        &self.puzzle
    }

    pub fn budget(&self) -> &DigitBudget {
        &self.budget
    }

    pub fn selected(&self) -> Option<Position> {
        self.selected
    }

    pub fn wrong_attempts(&self) -> u32 {
        self.wrong_attempts
    }

    pub fn hints_left(&self) -> u32 {
        self.hints_left
    }

    /// Whether `pos` was pre-filled by the puzzle.
    pub fn is_given(&self, pos: Position) -> bool {
        self.puzzle.get(pos).is_some()
    }

    /// Time spent in `Playing`; frozen while paused and after the session
    /// ends.
    pub fn elapsed(&self) -> Duration {
        match self.state {
            SessionState::Playing => self.elapsed + self.start_time.elapsed(),
            _ => self.elapsed,
        }
    }

    /// Elapsed time as MM:SS.
    pub fn elapsed_string(&self) -> String {
        let secs = self.elapsed().as_secs();
        format!("{:02}:{:02}", secs / 60, secs % 60)
    }

    /// Select a cell for subsequent `input` calls. Accepted only while
    /// `Playing` and only on editable cells.
    pub fn select(&mut self, pos: Position) -> bool {
        if self.state != SessionState::Playing || self.is_given(pos) {
            return false;
        }
        self.selected = Some(pos);
        true
    }

    /// Apply a digit (1-9) or an erase (0) to the selected cell.
    pub fn input(&mut self, digit: u8) -> MoveResult {
        if self.state != SessionState::Playing {
            return MoveResult::Ignored;
        }
        let Some(pos) = self.selected else {
            return MoveResult::Ignored;
        };
        self.apply_move(pos, digit)
    }

    /// Pause the timer. Only meaningful while `Playing`.
    pub fn pause(&mut self) {
        if self.state == SessionState::Playing {
            self.elapsed += self.start_time.elapsed();
            self.state = SessionState::Paused;
        }
    }

    /// Resume from `Paused`.
    pub fn resume(&mut self) {
        if self.state == SessionState::Paused {
            self.start_time = Instant::now();
            self.state = SessionState::Playing;
        }
    }

    /// Reveal the solution digit for the selected cell, spending one of
    /// the session's hint allowances. The board is not written; the digit
    /// still goes through `input`.
    pub fn hint(&mut self) -> Result<Hint, Rejection> {
        if self.state != SessionState::Playing {
            return Err(Rejection::HintUnavailable);
        }
        let pos = self.selected.ok_or(Rejection::HintUnavailable)?;
        if self.hints_left == 0 || self.board.get(pos).is_some() {
            return Err(Rejection::HintUnavailable);
        }
        self.hints_left -= 1;
        let value = self.solution.get(pos).expect("solution is complete");
        Ok(Hint::explain(&self.board, pos, value))
    }

    fn apply_move(&mut self, pos: Position, digit: u8) -> MoveResult {
        // Givens are already refused at `select`; this guards direct misuse.
        if self.puzzle.get(pos).is_some() {
            return MoveResult::Rejected(Rejection::NonEditableCell);
        }

        if digit == 0 {
            if let Some(prev) = self.board.get(pos) {
                self.board.set(pos, None);
                self.budget.put(prev);
            }
            return MoveResult::Committed {
                smart_move: None,
                board_complete: false,
            };
        }

        debug_assert!((1..=9).contains(&digit));
        let expected = self.solution.get(pos).expect("solution is complete");
        if digit != expected {
            self.wrong_attempts += 1;
            if self.wrong_attempts >= MAX_WRONG_ATTEMPTS {
                self.halt(SessionState::Failed);
            }
            return MoveResult::Rejected(Rejection::WrongDigit);
        }

        // Cannot trigger on a board built from a valid puzzle: nine correct
        // copies leave no tenth correct cell to aim at.
        if self.budget.is_exhausted(digit) {
            return MoveResult::Rejected(Rejection::DigitExhausted);
        }

        let prev = self.board.get(pos);
        self.board.set(pos, Some(digit));
        self.budget.take(digit);
        if let Some(p) = prev {
            self.budget.put(p);
        }

        let shapes = self.completed_shapes(pos);
        let smart_move = if !shapes.is_empty() && self.last_smart != Some(shapes) {
            self.last_smart = Some(shapes);
            Some(shapes)
        } else {
            None
        };

        // Wrong digits never land, so a full board is a correct board; the
        // solution comparison stays as the authoritative terminal check.
        let board_complete = self.board.is_full() && self.board == self.solution;
        if board_complete {
            self.halt(SessionState::Completed);
        }

        MoveResult::Committed {
            smart_move,
            board_complete,
        }
    }

    /// Units of `pos` that are now fully filled.
    fn completed_shapes(&self, pos: Position) -> ShapeSet {
        let units: Vec<UnitKind> = pos
            .units()
            .into_iter()
            .filter(|&(kind, index)| self.board.unit_filled(kind, index))
            .map(|(kind, _)| kind)
            .collect();
        ShapeSet::from_units(&units)
    }

    /// Fold the running time in and enter a terminal state.
    fn halt(&mut self, state: SessionState) {
        debug_assert!(matches!(
            state,
            SessionState::Completed | SessionState::Failed
        ));
        self.elapsed += self.start_time.elapsed();
        self.state = state;
    }
}
