//! PGN export — the one externalized artifact of a session.
//!
//! Header layout: Date, Time, UTCDate, UTCTime, Result, plus a SetUp/FEN
//! pair when the game did not start from the standard position, followed by
//! numbered movetext and the trailing result token.

use chrono::{DateTime, Local, TimeZone, Utc};
use shakmaty::Color;

use crate::client::GameClient;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameResult {
    WhiteWins,
    BlackWins,
    Draw,
    Unknown,
}

impl GameResult {
    pub fn token(&self) -> &'static str {
        match self {
            GameResult::WhiteWins => "1-0",
            GameResult::BlackWins => "0-1",
            GameResult::Draw => "1/2-1/2",
            GameResult::Unknown => "*",
        }
    }

    /// The w/b/d/* shorthand used when prompting for an unfinished game.
    pub fn from_shorthand(s: &str) -> Option<GameResult> {
        match s.trim() {
            "w" => Some(GameResult::WhiteWins),
            "b" => Some(GameResult::BlackWins),
            "d" => Some(GameResult::Draw),
            "*" => Some(GameResult::Unknown),
            _ => None,
        }
    }
}

/// Derive the result tag from a finished game; `None` while still playing.
pub fn infer_result(client: &GameClient) -> Option<GameResult> {
    if !client.is_game_over() {
        return None;
    }
    if client.is_checkmate() {
        // The mated side is the side to move.
        Some(match client.turn() {
            Color::Black => GameResult::WhiteWins,
            Color::White => GameResult::BlackWins,
        })
    } else {
        Some(GameResult::Draw)
    }
}

pub fn export_pgn(client: &GameClient, result: GameResult) -> String {
    export_pgn_at(client, result, Local::now(), Utc::now())
}

fn export_pgn_at<L: TimeZone, U: TimeZone>(
    client: &GameClient,
    result: GameResult,
    local: DateTime<L>,
    utc: DateTime<U>,
) -> String
where
    L::Offset: std::fmt::Display,
    U::Offset: std::fmt::Display,
{
    let mut pgn = String::new();
    pgn.push_str(&format!("[Date \"{}\"]\n", local.format("%Y.%m.%d")));
    pgn.push_str(&format!("[Time \"{}\"]\n", local.format("%H:%M:%S")));
    pgn.push_str(&format!("[UTCDate \"{}\"]\n", utc.format("%Y.%m.%d")));
    pgn.push_str(&format!("[UTCTime \"{}\"]\n", utc.format("%H:%M:%S")));
    pgn.push_str(&format!("[Result \"{}\"]\n", result.token()));
    if !client.is_standard_start() {
        pgn.push_str("[SetUp \"1\"]\n");
        pgn.push_str(&format!("[FEN \"{}\"]\n", client.start_fen()));
    }
    pgn.push('\n');
    let text = movetext(client);
    if !text.is_empty() {
        pgn.push_str(&text);
        pgn.push(' ');
    }
    pgn.push_str(result.token());
    pgn
}

/// Numbered movetext from the SAN log, continuing the seed position's move
/// number and starting with `N...` when the seed has black to move.
pub fn movetext(client: &GameClient) -> String {
    let mut out = String::new();
    let mut move_no = client.start_fullmoves();
    let mut white_to_move = client.start_turn() == Color::White;
    for (i, san) in client.history().iter().enumerate() {
        if white_to_move {
            out.push_str(&format!("{}. ", move_no));
        } else if i == 0 {
            out.push_str(&format!("{}... ", move_no));
        }
        out.push_str(san);
        out.push(' ');
        if !white_to_move {
            move_no += 1;
        }
        white_to_move = !white_to_move;
    }
    out.trim_end().to_string()
}
