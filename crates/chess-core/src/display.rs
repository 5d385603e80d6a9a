//! SAN presentation for blindfold play: how much a rendered move gives away
//! is a setting, so checks, mates and captures can be hidden from the
//! notation shown to the player.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisplayOptions {
    pub show_check: bool,
    pub show_mate: bool,
    pub show_capture: bool,
}

impl Default for DisplayOptions {
    fn default() -> Self {
        Self {
            show_check: true,
            show_mate: false,
            show_capture: true,
        }
    }
}

/// Apply the display toggles to a SAN. A hidden mate downgrades to a check
/// first, so `show_check` still governs whether anything remains visible.
pub fn format_san(san: &str, opts: &DisplayOptions) -> String {
    let mut out = san.to_string();
    if !opts.show_mate {
        out = out.replace('#', "+");
    }
    if !opts.show_capture {
        out = out.replace('x', "");
    }
    if !opts.show_check {
        out = out.replace('+', "");
    }
    out
}

/// Sort order for the move-entry list: pawn moves alphabetically, then
/// castling, then piece moves alphabetically.
pub fn entry_sort(moves: &mut [String]) {
    moves.sort_by(|a, b| entry_order(a, b));
}

fn entry_order(a: &str, b: &str) -> Ordering {
    let a_pawn = a.chars().next().is_some_and(|c| c.is_ascii_lowercase());
    let b_pawn = b.chars().next().is_some_and(|c| c.is_ascii_lowercase());
    if a_pawn != b_pawn {
        return if a_pawn { Ordering::Less } else { Ordering::Greater };
    }
    let a_castle = a.starts_with('O');
    let b_castle = b.starts_with('O');
    if a_castle != b_castle {
        return if a_castle { Ordering::Less } else { Ordering::Greater };
    }
    a.cmp(b)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_hides_mate_only() {
        let opts = DisplayOptions::default();
        assert_eq!(format_san("Qxf7#", &opts), "Qxf7+");
        assert_eq!(format_san("Nf3", &opts), "Nf3");
        assert_eq!(format_san("exd5+", &opts), "exd5+");
    }

    #[test]
    fn test_hide_everything() {
        let opts = DisplayOptions {
            show_check: false,
            show_mate: false,
            show_capture: false,
        };
        assert_eq!(format_san("Qxf7#", &opts), "Qf7");
        assert_eq!(format_san("exd5+", &opts), "ed5");
    }

    #[test]
    fn test_mate_shown_when_enabled() {
        let opts = DisplayOptions {
            show_check: true,
            show_mate: true,
            show_capture: true,
        };
        assert_eq!(format_san("Qxf7#", &opts), "Qxf7#");
    }

    #[test]
    fn test_entry_sort_pawns_castles_pieces() {
        let mut moves = vec![
            "Nf3".to_string(),
            "O-O".to_string(),
            "a4".to_string(),
            "Bb5".to_string(),
            "e4".to_string(),
        ];
        entry_sort(&mut moves);
        assert_eq!(moves, ["a4", "e4", "O-O", "Bb5", "Nf3"]);
    }
}
