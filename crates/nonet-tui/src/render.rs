use crate::app::{App, Screen};
use crate::records::format_time;
use crossterm::{
    cursor::MoveTo,
    queue,
    style::{Attribute, Color, Print, ResetColor, SetAttribute, SetForegroundColor},
    terminal::{Clear, ClearType},
};
use nonet_core::{Position, SessionState, MAX_WRONG_ATTEMPTS};
use std::io;

const BOARD_TOP: u16 = 2;
const TOP_BORDER: &str = "┌───────┬───────┬───────┐";
const MID_BORDER: &str = "├───────┼───────┼───────┤";
const BOTTOM_BORDER: &str = "└───────┴───────┴───────┘";

/// Draw the whole screen for the current app state.
pub fn render(stdout: &mut io::Stdout, app: &App) -> io::Result<()> {
    queue!(stdout, Clear(ClearType::All))?;
    match app.screen {
        Screen::Playing if app.session.state() == SessionState::Paused => {
            render_paused(stdout, app)
        }
        Screen::Playing => render_game(stdout, app),
        Screen::Won => render_won(stdout, app),
        Screen::Lost => render_lost(stdout, app),
    }
}

fn render_header(stdout: &mut io::Stdout, app: &App) -> io::Result<()> {
    queue!(
        stdout,
        MoveTo(0, 0),
        SetAttribute(Attribute::Bold),
        Print(format!("nonet · {}", app.session.difficulty())),
        SetAttribute(Attribute::Reset),
        MoveTo(19, 0),
        Print(app.session.elapsed_string()),
    )
}

fn render_game(stdout: &mut io::Stdout, app: &App) -> io::Result<()> {
    render_header(stdout, app)?;

    queue!(stdout, MoveTo(0, BOARD_TOP), Print(TOP_BORDER))?;
    for row in 0..9 {
        let y = BOARD_TOP + 1 + row as u16 + row as u16 / 3;
        queue!(stdout, MoveTo(0, y), Print("│"))?;
        for col in 0..9 {
            queue!(stdout, Print(" "))?;
            render_cell(stdout, app, Position::new(row, col))?;
            if col % 3 == 2 {
                queue!(stdout, Print(" │"))?;
            }
        }
        match row {
            2 | 5 => queue!(stdout, MoveTo(0, y + 1), Print(MID_BORDER))?,
            8 => queue!(stdout, MoveTo(0, y + 1), Print(BOTTOM_BORDER))?,
            _ => {}
        }
    }

    render_budget(stdout, app, BOARD_TOP + 14)?;
    render_status(stdout, app, BOARD_TOP + 15)?;

    let info_y = BOARD_TOP + 17;
    if let Some(msg) = &app.message {
        queue!(
            stdout,
            MoveTo(0, info_y),
            SetForegroundColor(Color::Yellow),
            Print(msg),
            ResetColor
        )?;
    } else if let Some(hint) = &app.current_hint {
        queue!(
            stdout,
            MoveTo(0, info_y),
            SetForegroundColor(Color::Green),
            Print(format!("hint: {}", hint)),
            ResetColor
        )?;
    }

    queue!(
        stdout,
        MoveTo(0, info_y + 2),
        SetForegroundColor(Color::DarkGrey),
        Print("arrows move  1-9 place  0 erase  h hint  d difficulty  p pause  n new  q quit"),
        ResetColor
    )
}

fn render_cell(stdout: &mut io::Stdout, app: &App, pos: Position) -> io::Result<()> {
    if pos == app.cursor {
        queue!(stdout, SetAttribute(Attribute::Reverse))?;
    }
    match app.session.board().get(pos) {
        Some(v) if app.session.is_given(pos) => {
            queue!(stdout, SetAttribute(Attribute::Bold), Print(v))?;
        }
        Some(v) => {
            queue!(stdout, SetForegroundColor(Color::Cyan), Print(v))?;
        }
        None => {
            queue!(stdout, SetForegroundColor(Color::DarkGrey), Print("·"))?;
        }
    }
    queue!(stdout, SetAttribute(Attribute::Reset), ResetColor)
}

/// One line of remaining placements per digit; exhausted digits are dimmed.
fn render_budget(stdout: &mut io::Stdout, app: &App, y: u16) -> io::Result<()> {
    queue!(stdout, MoveTo(0, y), Print("left "))?;
    for digit in 1..=9 {
        let remaining = app.session.budget().remaining(digit);
        if remaining == 0 {
            queue!(
                stdout,
                SetForegroundColor(Color::DarkGrey),
                Print(format!(" {}:{}", digit, remaining)),
                ResetColor
            )?;
        } else {
            queue!(stdout, Print(format!(" {}:{}", digit, remaining)))?;
        }
    }
    Ok(())
}

fn render_status(stdout: &mut io::Stdout, app: &App, y: u16) -> io::Result<()> {
    let wrong = app.session.wrong_attempts();
    let lives = MAX_WRONG_ATTEMPTS.saturating_sub(wrong);
    queue!(
        stdout,
        MoveTo(0, y),
        SetForegroundColor(Color::Red),
        Print("♥ ".repeat(lives as usize)),
        SetForegroundColor(Color::DarkGrey),
        Print("· ".repeat(wrong as usize)),
        ResetColor,
        Print(format!("  hints left: {}", app.session.hints_left())),
    )
}

fn render_paused(stdout: &mut io::Stdout, app: &App) -> io::Result<()> {
    render_header(stdout, app)?;
    queue!(
        stdout,
        MoveTo(0, BOARD_TOP + 2),
        SetAttribute(Attribute::Bold),
        Print("Paused"),
        SetAttribute(Attribute::Reset),
        MoveTo(0, BOARD_TOP + 4),
        Print("The board is hidden while the clock is stopped."),
        MoveTo(0, BOARD_TOP + 6),
        SetForegroundColor(Color::DarkGrey),
        Print("p resume  n new game  q quit"),
        ResetColor
    )
}

fn render_won(stdout: &mut io::Stdout, app: &App) -> io::Result<()> {
    render_header(stdout, app)?;
    queue!(
        stdout,
        MoveTo(0, BOARD_TOP + 2),
        SetForegroundColor(Color::Green),
        SetAttribute(Attribute::Bold),
        Print("Solved!"),
        SetAttribute(Attribute::Reset),
        ResetColor
    )?;

    if let Some(finish) = &app.finish {
        queue!(
            stdout,
            MoveTo(0, BOARD_TOP + 4),
            Print(format!(
                "{} on {} as {}",
                format_time(finish.secs),
                app.session.difficulty(),
                app.player
            ))
        )?;
        let best_line = if finish.new_best {
            match finish.previous_best {
                Some(prev) => format!("New personal best (was {})", format_time(prev)),
                None => "First clear at this difficulty".to_string(),
            }
        } else {
            match finish.previous_best {
                Some(prev) => format!("Personal best stands at {}", format_time(prev)),
                None => String::new(),
            }
        };
        if !best_line.is_empty() {
            queue!(
                stdout,
                MoveTo(0, BOARD_TOP + 5),
                SetForegroundColor(Color::Yellow),
                Print(best_line),
                ResetColor
            )?;
        }
    }

    render_endgame_footer(stdout, app, BOARD_TOP + 7)
}

fn render_lost(stdout: &mut io::Stdout, app: &App) -> io::Result<()> {
    render_header(stdout, app)?;
    queue!(
        stdout,
        MoveTo(0, BOARD_TOP + 2),
        SetForegroundColor(Color::Red),
        SetAttribute(Attribute::Bold),
        Print("Out of attempts"),
        SetAttribute(Attribute::Reset),
        ResetColor,
        MoveTo(0, BOARD_TOP + 4),
        Print(format!(
            "Three wrong digits after {}. The puzzle stays unsolved.",
            app.session.elapsed_string()
        )),
    )?;
    render_endgame_footer(stdout, app, BOARD_TOP + 6)
}

fn render_endgame_footer(stdout: &mut io::Stdout, app: &App, y: u16) -> io::Result<()> {
    queue!(
        stdout,
        MoveTo(0, y),
        SetForegroundColor(Color::DarkGrey),
        Print(format!(
            "n new game ({})  d difficulty  q quit",
            app.next_difficulty
        )),
        ResetColor
    )
}
