use std::env;

use game_session::Strength;

#[derive(Clone, Debug)]
pub struct Config {
    pub stockfish_path: String,
    pub skill: u8,
    pub depth: u8,
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            stockfish_path: env::var("STOCKFISH_PATH")
                .unwrap_or_else(|_| "/usr/local/bin/stockfish".to_string()),
            skill: env::var("ENGINE_SKILL")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(1),
            depth: env::var("ENGINE_DEPTH")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(3),
        }
    }

    pub fn strength(&self) -> Strength {
        Strength::new(self.skill, self.depth)
    }
}
