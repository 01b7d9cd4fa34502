use crate::records::BestTimes;
use crossterm::event::{KeyCode, KeyEvent};
use nonet_core::{
    Difficulty, Hint, MoveResult, Position, Rejection, Session, SessionState, MAX_WRONG_ATTEMPTS,
};

/// Result of handling a key press.
pub enum AppAction {
    Continue,
    Quit,
}

/// Current screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Playing,
    Won,
    Lost,
}

/// Outcome details shown on the win screen.
pub struct Finish {
    pub secs: u64,
    pub previous_best: Option<u64>,
    pub new_best: bool,
}

/// The application state: one engine session plus the chrome around it.
pub struct App {
    pub session: Session,
    pub cursor: Position,
    pub screen: Screen,
    pub player: String,
    /// Difficulty the next game starts at; cycled with the `d` key.
    pub next_difficulty: Difficulty,
    pub message: Option<String>,
    message_ticks: u32,
    pub current_hint: Option<Hint>,
    pub records: BestTimes,
    pub finish: Option<Finish>,
    recorded: bool,
}

impl App {
    /// Start with a fresh session; `seed` makes the first puzzle
    /// reproducible.
    pub fn new(difficulty: Difficulty, player: &str, seed: Option<u64>) -> Self {
        let session = match seed {
            Some(seed) => Session::with_seed(difficulty, seed),
            None => Session::new(difficulty),
        };
        Self {
            session,
            cursor: Position::new(4, 4),
            screen: Screen::Playing,
            player: player.to_string(),
            next_difficulty: difficulty,
            message: None,
            message_ticks: 0,
            current_hint: None,
            records: BestTimes::load(),
            finish: None,
            recorded: false,
        }
    }

    /// Swap in a new session at the chosen difficulty.
    fn new_game(&mut self) {
        self.session = Session::new(self.next_difficulty);
        self.cursor = Position::new(4, 4);
        self.screen = Screen::Playing;
        self.message = None;
        self.message_ticks = 0;
        self.current_hint = None;
        self.finish = None;
        self.recorded = false;
    }

    /// Advance timers and pick up session terminal states.
    pub fn tick(&mut self) {
        if self.message_ticks > 0 {
            self.message_ticks -= 1;
            if self.message_ticks == 0 {
                self.message = None;
            }
        }

        if self.screen == Screen::Playing {
            match self.session.state() {
                SessionState::Completed => {
                    self.finish_won();
                    self.screen = Screen::Won;
                }
                SessionState::Failed => {
                    self.screen = Screen::Lost;
                }
                _ => {}
            }
        }
    }

    /// Compare against the stored personal best and record once.
    fn finish_won(&mut self) {
        if self.recorded {
            return;
        }
        self.recorded = true;

        let secs = self.session.elapsed().as_secs();
        let difficulty = self.session.difficulty();
        let previous_best = self.records.best(&self.player, difficulty);
        let new_best = self.records.record(&self.player, difficulty, secs);
        log::info!("{} solved {} in {}s (best: {})", self.player, difficulty, secs, new_best);
        self.finish = Some(Finish {
            secs,
            previous_best,
            new_best,
        });
    }

    /// Show a short-lived status message.
    fn flash(&mut self, msg: &str) {
        self.message = Some(msg.to_string());
        self.message_ticks = 30;
    }

    /// Handle a key press for the current screen.
    pub fn handle_key(&mut self, key: KeyEvent) -> AppAction {
        match self.screen {
            Screen::Won | Screen::Lost => self.handle_endgame_key(key),
            Screen::Playing => self.handle_game_key(key),
        }
    }

    fn handle_endgame_key(&mut self, key: KeyEvent) -> AppAction {
        match key.code {
            KeyCode::Char('n') => {
                self.new_game();
                AppAction::Continue
            }
            KeyCode::Char('d') => {
                self.cycle_difficulty();
                AppAction::Continue
            }
            KeyCode::Char('q') | KeyCode::Esc => AppAction::Quit,
            _ => AppAction::Continue,
        }
    }

    fn handle_game_key(&mut self, key: KeyEvent) -> AppAction {
        // While paused only the pause toggle, a new game, or quitting make
        // sense; the board is hidden and moves are gated off anyway.
        if self.session.state() == SessionState::Paused {
            match key.code {
                KeyCode::Char('p') | KeyCode::Char(' ') => self.session.resume(),
                KeyCode::Char('n') => self.new_game(),
                KeyCode::Char('q') | KeyCode::Esc => return AppAction::Quit,
                _ => {}
            }
            return AppAction::Continue;
        }

        match key.code {
            KeyCode::Up => self.move_cursor(-1, 0),
            KeyCode::Down => self.move_cursor(1, 0),
            KeyCode::Left => self.move_cursor(0, -1),
            KeyCode::Right => self.move_cursor(0, 1),
            KeyCode::Char(c @ '1'..='9') => self.place(c as u8 - b'0'),
            KeyCode::Char('0') | KeyCode::Backspace | KeyCode::Delete => self.place(0),
            KeyCode::Char('h') => self.request_hint(),
            KeyCode::Char('d') => self.cycle_difficulty(),
            KeyCode::Char('p') | KeyCode::Char(' ') => self.session.pause(),
            KeyCode::Char('n') => self.new_game(),
            KeyCode::Char('q') | KeyCode::Esc => return AppAction::Quit,
            _ => {}
        }
        AppAction::Continue
    }

    /// Advance the next-game difficulty through the levels, wrapping.
    fn cycle_difficulty(&mut self) {
        let levels = Difficulty::all();
        let idx = levels
            .iter()
            .position(|&d| d == self.next_difficulty)
            .unwrap_or(0);
        self.next_difficulty = levels[(idx + 1) % levels.len()];
        self.flash(&format!("Next game: {}", self.next_difficulty));
    }

    fn move_cursor(&mut self, dr: isize, dc: isize) {
        let row = (self.cursor.row as isize + dr).rem_euclid(9) as usize;
        let col = (self.cursor.col as isize + dc).rem_euclid(9) as usize;
        self.cursor = Position::new(row, col);
    }

    /// Route a digit (or erase, 0) through the engine and narrate the
    /// verdict.
    fn place(&mut self, digit: u8) {
        if self.session.state() != SessionState::Playing {
            return;
        }
        if !self.session.select(self.cursor) {
            self.flash("That cell is a given");
            return;
        }
        match self.session.input(digit) {
            MoveResult::Committed { smart_move, .. } => {
                self.current_hint = None;
                if let Some(shapes) = smart_move {
                    self.flash(&format!("Smart move: {}!", shapes.label()));
                }
                // Completion and failure are picked up on the next tick.
            }
            MoveResult::Rejected(Rejection::WrongDigit) => {
                self.flash(&format!(
                    "Wrong digit ({}/{})",
                    self.session.wrong_attempts(),
                    MAX_WRONG_ATTEMPTS
                ));
            }
            MoveResult::Rejected(reason) => self.flash(&reason.to_string()),
            MoveResult::Ignored => {}
        }
    }

    fn request_hint(&mut self) {
        if self.session.state() != SessionState::Playing {
            return;
        }
        if !self.session.select(self.cursor) {
            self.flash("That cell is a given");
            return;
        }
        match self.session.hint() {
            Ok(hint) => self.current_hint = Some(hint),
            Err(reason) => self.flash(&reason.to_string()),
        }
    }
}
