//! The authoritative game: an append/truncate-only move log plus the
//! current position. The position is always derivable by replaying the log
//! from the seed FEN; historical positions are derived the same way, so
//! look-back browsing never needs to clone-and-undo a live object.

use shakmaty::{
    fen::Fen,
    san::SanPlus,
    uci::UciMove,
    CastlingMode, Chess, Color, EnPassantMode, File, Move, Position, Role, Square,
};

use crate::error::GameError;

pub const STANDARD_START_FEN: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

/// A move as entered by a caller: notation, engine output, or a square pair
/// from click-to-move. The canonical stored form after application is SAN.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MoveInput {
    San(String),
    Uci(String),
    Coords {
        from: Square,
        to: Square,
        promotion: Option<Role>,
    },
}

#[derive(Debug, Clone)]
pub struct GameClient {
    start: Chess,
    start_fen: String,
    position: Chess,
    moves: Vec<Move>,
    sans: Vec<String>,
}

impl GameClient {
    pub fn new() -> Self {
        Self {
            start: Chess::default(),
            start_fen: STANDARD_START_FEN.to_string(),
            position: Chess::default(),
            moves: Vec::new(),
            sans: Vec::new(),
        }
    }

    /// Seed a game from a FEN. Rejects syntactically malformed FENs and
    /// positions shakmaty considers unplayable (missing kings, side not to
    /// move in check, ...).
    pub fn from_fen(fen: &str) -> Result<Self, GameError> {
        let start = parse_fen(fen)?;
        let start_fen = Fen::from_position(start.clone(), EnPassantMode::Legal).to_string();
        Ok(Self {
            position: start.clone(),
            start,
            start_fen,
            moves: Vec::new(),
            sans: Vec::new(),
        })
    }

    /// The validation gate for custom positions: invalid FEN never seeds a
    /// game.
    pub fn validate_fen(fen: &str) -> Result<(), GameError> {
        parse_fen(fen).map(|_| ())
    }

    /// Resolve and apply a move. On error no state changes; on success the
    /// resulting SAN (with check/mate suffix) is appended to the log and
    /// returned.
    pub fn play(&mut self, input: &MoveInput) -> Result<String, GameError> {
        let mv = self.resolve(input)?;
        let san = SanPlus::from_move_and_play_unchecked(&mut self.position, &mv).to_string();
        self.moves.push(mv);
        self.sans.push(san.clone());
        Ok(san)
    }

    /// Remove the last move from the log and rebuild the position by
    /// replay. Returns the removed SAN.
    pub fn undo(&mut self) -> Option<String> {
        self.moves.pop()?;
        let san = self.sans.pop();
        self.position = self.replay(self.moves.len());
        san
    }

    /// The position after the first `ply` moves of the log (pure replay;
    /// `ply` is clamped to the log length). `position_at(0)` is the seed
    /// position.
    pub fn position_at(&self, ply: usize) -> Chess {
        self.replay(ply.min(self.moves.len()))
    }

    fn replay(&self, ply: usize) -> Chess {
        let mut pos = self.start.clone();
        for mv in &self.moves[..ply] {
            pos.play_unchecked(mv);
        }
        pos
    }

    fn resolve(&self, input: &MoveInput) -> Result<Move, GameError> {
        match input {
            MoveInput::San(s) => {
                let san: SanPlus = s
                    .trim()
                    .parse()
                    .map_err(|_| GameError::InvalidNotation(s.clone()))?;
                san.san
                    .to_move(&self.position)
                    .map_err(|_| GameError::IllegalMove(s.clone()))
            }
            MoveInput::Uci(s) => {
                let uci: UciMove = s
                    .trim()
                    .parse()
                    .map_err(|_| GameError::InvalidNotation(s.clone()))?;
                uci.to_move(&self.position)
                    .map_err(|_| GameError::IllegalMove(s.clone()))
            }
            MoveInput::Coords {
                from,
                to,
                promotion,
            } => self
                .position
                .legal_moves()
                .iter()
                .find(|m| matches_coords(m, *from, *to, *promotion))
                .cloned()
                .ok_or_else(|| GameError::IllegalMove(format!("{}{}", from, to))),
        }
    }

    pub fn position(&self) -> &Chess {
        &self.position
    }

    pub fn turn(&self) -> Color {
        self.position.turn()
    }

    pub fn fen(&self) -> String {
        Fen::from_position(self.position.clone(), EnPassantMode::Legal).to_string()
    }

    pub fn start_fen(&self) -> &str {
        &self.start_fen
    }

    pub fn is_standard_start(&self) -> bool {
        self.start_fen == STANDARD_START_FEN
    }

    pub fn start_turn(&self) -> Color {
        self.start.turn()
    }

    pub fn start_fullmoves(&self) -> u32 {
        self.start.fullmoves().get()
    }

    /// FEN of the position after the first `ply` moves of the log.
    pub fn fen_at(&self, ply: usize) -> String {
        Fen::from_position(self.position_at(ply), EnPassantMode::Legal).to_string()
    }

    /// SAN log, index 0 = first move of the game.
    pub fn history(&self) -> &[String] {
        &self.sans
    }

    /// Structured move log, parallel to `history()`.
    pub fn moves(&self) -> &[Move] {
        &self.moves
    }

    pub fn len(&self) -> usize {
        self.moves.len()
    }

    pub fn is_empty(&self) -> bool {
        self.moves.is_empty()
    }

    pub fn legal_moves(&self) -> Vec<Move> {
        self.position.legal_moves().to_vec()
    }

    /// Legal SANs in the current position (move-entry buttons).
    pub fn legal_sans(&self) -> Vec<String> {
        self.position
            .legal_moves()
            .iter()
            .map(|m| SanPlus::from_move(self.position.clone(), m).to_string())
            .collect()
    }

    pub fn legal_moves_from(&self, from: Square) -> Vec<Move> {
        self.position
            .legal_moves()
            .iter()
            .filter(|m| move_origin(m) == Some(from))
            .cloned()
            .collect()
    }

    pub fn piece_at(&self, sq: Square) -> Option<shakmaty::Piece> {
        self.position.board().piece_at(sq)
    }

    pub fn is_check(&self) -> bool {
        self.position.is_check()
    }

    pub fn is_checkmate(&self) -> bool {
        self.position.is_checkmate()
    }

    pub fn is_stalemate(&self) -> bool {
        self.position.is_stalemate()
    }

    pub fn is_insufficient_material(&self) -> bool {
        self.position.is_insufficient_material()
    }

    pub fn is_fifty_moves(&self) -> bool {
        self.position.halfmoves() >= 100
    }

    /// Same position (pieces, turn, castling, en passant) seen three times
    /// on the played line, the seed position included. shakmaty does not
    /// track game history, so this counts over a replay of the log.
    pub fn is_threefold_repetition(&self) -> bool {
        let current = epd(&self.position);
        let mut count = usize::from(epd(&self.start) == current);
        let mut pos = self.start.clone();
        for mv in &self.moves {
            pos.play_unchecked(mv);
            if epd(&pos) == current {
                count += 1;
            }
        }
        count >= 3
    }

    pub fn is_draw(&self) -> bool {
        self.is_stalemate()
            || self.is_insufficient_material()
            || self.is_threefold_repetition()
            || self.is_fifty_moves()
    }

    pub fn is_game_over(&self) -> bool {
        self.is_checkmate() || self.is_draw()
    }
}

impl Default for GameClient {
    fn default() -> Self {
        Self::new()
    }
}

fn parse_fen(fen: &str) -> Result<Chess, GameError> {
    let parsed: Fen = fen
        .trim()
        .parse()
        .map_err(|e| GameError::InvalidFen(format!("{e}")))?;
    parsed
        .into_position(CastlingMode::Standard)
        .map_err(|e| GameError::InvalidFen(format!("{e}")))
}

/// FEN without the clock fields, the identity used for repetition counting.
fn epd(pos: &Chess) -> String {
    let fen = Fen::from_position(pos.clone(), EnPassantMode::Legal).to_string();
    fen.split(' ').take(4).collect::<Vec<_>>().join(" ")
}

/// Origin square of a move; castling is anchored at the king.
pub fn move_origin(m: &Move) -> Option<Square> {
    match m {
        Move::Normal { from, .. } => Some(*from),
        Move::EnPassant { from, .. } => Some(*from),
        Move::Castle { king, .. } => Some(*king),
        _ => None,
    }
}

/// Destination square as a user sees it; for castling that is the king's
/// landing square (g- or c-file), not the rook.
pub fn move_dest(m: &Move) -> Square {
    match m {
        Move::Normal { to, .. } => *to,
        Move::EnPassant { to, .. } => *to,
        Move::Castle { king, rook } => {
            let file = if rook.file() > king.file() {
                File::G
            } else {
                File::C
            };
            Square::from_coords(file, king.rank())
        }
        Move::Put { to, .. } => *to,
    }
}

fn matches_coords(m: &Move, from: Square, to: Square, promotion: Option<Role>) -> bool {
    match m {
        Move::Normal {
            from: f,
            to: t,
            promotion: p,
            ..
        } => *f == from && *t == to && *p == promotion,
        Move::EnPassant { from: f, to: t } => *f == from && *t == to && promotion.is_none(),
        Move::Castle { king, .. } => {
            *king == from && move_dest(m) == to && promotion.is_none()
        }
        _ => false,
    }
}
