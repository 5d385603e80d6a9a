//! Cross-game settings. These live outside the game's lifecycle: a reset
//! replaces the game, never the settings.

use chess_core::display::DisplayOptions;
use chess_core::shakmaty::Color;
use serde::{Deserialize, Serialize};

/// Engine strength. Skill 0 selects the random mover; 1..=20 map onto
/// Stockfish skill levels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Strength {
    pub skill: u8,
    pub depth: u8,
}

impl Strength {
    pub const MAX_SKILL: u8 = 20;
    // Search gets too slow past this in interactive play.
    pub const MAX_DEPTH: u8 = 16;

    pub fn new(skill: u8, depth: u8) -> Self {
        Self {
            skill: skill.min(Self::MAX_SKILL),
            depth: depth.clamp(1, Self::MAX_DEPTH),
        }
    }

    pub fn is_random(&self) -> bool {
        self.skill == 0
    }

    /// Rough Elo estimate for the settings display. Stockfish skill levels
    /// span roughly 1100 to 3100 Elo.
    pub fn elo_label(&self) -> String {
        if self.is_random() {
            return "Random Moves".to_string();
        }
        let elo = (1100 + 2000 * u32::from(self.skill) / 20) / 100 * 100;
        elo.to_string()
    }
}

impl Default for Strength {
    fn default() -> Self {
        Self { skill: 1, depth: 3 }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// When true the engine answers every human move; when false both sides
    /// are entered manually.
    pub auto_move: bool,
    pub own_color_white: bool,
    /// Whether the board itself is revealed (blindfold play keeps it
    /// hidden and shows notation only).
    pub reveal_board: bool,
    pub strength: Strength,
    pub display: DisplayOptions,
}

impl Settings {
    pub fn own_color(&self) -> Color {
        Color::from_white(self.own_color_white)
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            auto_move: true,
            own_color_white: true,
            reveal_board: false,
            strength: Strength::default(),
            display: DisplayOptions::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strength_clamping() {
        let s = Strength::new(40, 0);
        assert_eq!(s.skill, Strength::MAX_SKILL);
        assert_eq!(s.depth, 1);
        assert!(!s.is_random());
        assert!(Strength::new(0, 3).is_random());
    }

    #[test]
    fn test_elo_labels() {
        assert_eq!(Strength::new(0, 3).elo_label(), "Random Moves");
        assert_eq!(Strength::new(1, 3).elo_label(), "1200");
        assert_eq!(Strength::new(20, 3).elo_label(), "3100");
    }

    #[test]
    fn test_default_settings() {
        let s = Settings::default();
        assert!(s.auto_move);
        assert_eq!(s.own_color(), Color::White);
        assert!(!s.reveal_board);
        assert_eq!(s.strength.depth, 3);
    }
}
