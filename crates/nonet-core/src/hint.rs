use crate::grid::{Grid, Position, UnitKind};
use serde::{Deserialize, Serialize};

/// Why a particular digit cannot occupy the hinted cell: it already
/// appears in the named unit of that cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Exclusion {
    pub digit: u8,
    pub unit: UnitKind,
}

/// Structured justification attached to a hint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum HintReason {
    /// Every other digit is excluded from the cell; `exclusions` records
    /// which unit rules each one out.
    OnlyCandidate { exclusions: Vec<Exclusion> },
    /// The digit fits nowhere else in the named unit of the cell.
    OnlyPlace { unit: UnitKind },
    /// Not directly forced by a single constraint scan; taken from the
    /// held solution.
    Revealed,
}

/// A revealed digit for one cell, with the reasoning behind it. A hint
/// never writes to the board; the player still enters the digit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Hint {
    pub pos: Position,
    pub value: u8,
    pub reason: HintReason,
}

impl Hint {
    /// Build the explanation for `value` at an empty `pos` of `board`.
    pub(crate) fn explain(board: &Grid, pos: Position, value: u8) -> Self {
        debug_assert!(board.get(pos).is_none());
        let reason = if board.candidates(pos) == [value] {
            let exclusions = (1..=9)
                .filter(|&d| d != value)
                .map(|d| Exclusion {
                    digit: d,
                    unit: excluding_unit(board, pos, d),
                })
                .collect();
            HintReason::OnlyCandidate { exclusions }
        } else if let Some(unit) = only_place_unit(board, pos, value) {
            HintReason::OnlyPlace { unit }
        } else {
            HintReason::Revealed
        };
        Self { pos, value, reason }
    }
}

impl std::fmt::Display for Hint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let cell = format!("r{}c{}", self.pos.row + 1, self.pos.col + 1);
        match &self.reason {
            HintReason::OnlyCandidate { .. } => {
                write!(f, "{} is the only digit left for {}", self.value, cell)
            }
            HintReason::OnlyPlace { unit } => {
                write!(f, "{} fits nowhere else in the {} of {}", self.value, unit, cell)
            }
            HintReason::Revealed => write!(f, "{} goes in {}", self.value, cell),
        }
    }
}

/// The unit of `pos` that already contains `digit`. Row, then column, then
/// box; callers only ask about digits `admits` has rejected, so one of the
/// three must hold it.
fn excluding_unit(board: &Grid, pos: Position, digit: u8) -> UnitKind {
    for (kind, index) in pos.units() {
        let occupied = Grid::unit_positions(kind, index).any(|p| board.get(p) == Some(digit));
        if occupied {
            return kind;
        }
    }
    unreachable!("digit {} is not excluded at {:?}", digit, pos)
}

/// A unit of `pos` in which `value` is admitted at no other empty cell,
/// if one exists.
fn only_place_unit(board: &Grid, pos: Position, value: u8) -> Option<UnitKind> {
    pos.units().into_iter().find_map(|(kind, index)| {
        let elsewhere = Grid::unit_positions(kind, index).any(|p| {
            p != pos && board.get(p).is_none() && board.admits(p, value)
        });
        if elsewhere {
            None
        } else {
            Some(kind)
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generator::Generator;

    #[test]
    fn test_only_candidate_with_full_exclusions() {
        let solution = Generator::with_seed(11).generate_solved();
        let pos = Position::new(0, 0);
        let value = solution.get(pos).unwrap();
        let mut board = solution;
        board.set(pos, None);

        let hint = Hint::explain(&board, pos, value);
        assert_eq!(hint.value, value);
        match hint.reason {
            HintReason::OnlyCandidate { exclusions } => {
                assert_eq!(exclusions.len(), 8);
                let mut digits: Vec<u8> = exclusions.iter().map(|e| e.digit).collect();
                digits.sort_unstable();
                let expected: Vec<u8> = (1..=9).filter(|&d| d != value).collect();
                assert_eq!(digits, expected);
            }
            other => panic!("expected OnlyCandidate, got {:?}", other),
        }
    }

    #[test]
    fn test_only_place_in_row() {
        // Row 0 is 4..9 with three holes; 1 is blocked out of the other two
        // holes by their columns, so it can only land at r1c1.
        let board = Grid::from_string(
            "000456789\
             000000000\
             000000000\
             000000000\
             000000000\
             010000000\
             001000000\
             000000000\
             000000000",
        )
        .unwrap();
        let pos = Position::new(0, 0);
        assert!(board.candidates(pos).len() > 1);

        let hint = Hint::explain(&board, pos, 1);
        assert_eq!(hint.reason, HintReason::OnlyPlace { unit: UnitKind::Row });
    }

    #[test]
    fn test_revealed_when_unconstrained() {
        let board = Grid::empty();
        let hint = Hint::explain(&board, Position::new(4, 4), 7);
        assert_eq!(hint.reason, HintReason::Revealed);
    }

    #[test]
    fn test_display_forms() {
        let board = Grid::empty();
        let hint = Hint::explain(&board, Position::new(4, 4), 7);
        assert_eq!(hint.to_string(), "7 goes in r5c5");
    }

    #[test]
    fn test_serializes() {
        let board = Grid::empty();
        let hint = Hint::explain(&board, Position::new(0, 0), 3);
        let json = serde_json::to_string(&hint).unwrap();
        let back: Hint = serde_json::from_str(&json).unwrap();
        assert_eq!(back, hint);
    }
}
