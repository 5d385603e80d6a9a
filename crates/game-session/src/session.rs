//! The game session: one live game plus everything around it that is not
//! chess itself. The session owns the takeback cache, the square-selection
//! state machine, the history cursor and the engine-request generation.
//!
//! All mutation funnels through [`Session::apply_move`], which clears the
//! takeback cache, the selection and the cursor on success. Takeback and
//! redo bypass it deliberately so the cache survives.

use chess_core::client::{move_dest, move_origin};
use chess_core::display::entry_sort;
use chess_core::pgn::{self, GameResult};
use chess_core::shakmaty::{Role, Square};
use chess_core::status::{self, GameStatus};
use chess_core::{GameClient, GameError, MoveInput};

use crate::coordinator::{self, EngineReply, EngineRequest};
use crate::history::HistoryCursor;
use crate::settings::Settings;

/// What a highlighted destination square means on the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetKind {
    Capture,
    Quiet,
}

/// Square-selection state. Exactly one of these holds at any time; applying
/// a move or mutating the game resets it to `Idle`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Interaction {
    Idle,
    SquareSelected {
        from: Square,
        targets: Vec<(Square, TargetKind)>,
    },
    AwaitingPromotion {
        from: Square,
        to: Square,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MoveOutcome {
    Applied { san: String, game_over: bool },
    Rejected,
}

impl MoveOutcome {
    pub fn is_applied(&self) -> bool {
        matches!(self, MoveOutcome::Applied { .. })
    }
}

/// What a square click did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectOutcome {
    /// Not the human's turn, or the game is over.
    Ignored,
    Selected,
    Cleared,
    Moved(MoveOutcome),
    /// The click completed a promotion push; the session now waits for
    /// [`Session::resolve_promotion`].
    PromotionPending,
}

#[derive(Debug)]
pub struct Session {
    game: GameClient,
    settings: Settings,
    takeback_cache: Vec<String>,
    interaction: Interaction,
    cursor: Option<HistoryCursor>,
    generation: u64,
}

impl Session {
    pub fn new() -> Self {
        Self::with_settings(Settings::default())
    }

    pub fn with_settings(settings: Settings) -> Self {
        Self {
            game: GameClient::new(),
            settings,
            takeback_cache: Vec::new(),
            interaction: Interaction::Idle,
            cursor: None,
            generation: 0,
        }
    }

    pub fn game(&self) -> &GameClient {
        &self.game
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Settings changes take effect on the next turn check; callers that
    /// flip `auto_move` or the color should re-run
    /// [`Session::next_engine_request`] afterwards.
    pub fn settings_mut(&mut self) -> &mut Settings {
        &mut self.settings
    }

    pub fn interaction(&self) -> &Interaction {
        &self.interaction
    }

    pub fn is_human_turn(&self) -> bool {
        coordinator::is_human_turn(&self.settings, self.game.turn())
    }

    pub fn status(&self) -> GameStatus {
        GameStatus::of(&self.game)
    }

    pub fn game_over_message(&self) -> Option<String> {
        status::game_over_message(&self.game)
    }

    // -- mutation --------------------------------------------------------

    /// Play a move for the human. Rejected outright when it is not the
    /// human's turn.
    pub fn play_human(&mut self, input: &MoveInput) -> MoveOutcome {
        if !self.is_human_turn() {
            return MoveOutcome::Rejected;
        }
        self.apply_move(input)
    }

    fn apply_move(&mut self, input: &MoveInput) -> MoveOutcome {
        if self.game.is_game_over() {
            return MoveOutcome::Rejected;
        }
        match self.game.play(input) {
            Ok(san) => {
                self.takeback_cache.clear();
                self.interaction = Interaction::Idle;
                self.cursor = None;
                let game_over = self.game.is_game_over();
                tracing::debug!(%san, game_over, ply = self.game.len(), "move applied");
                MoveOutcome::Applied { san, game_over }
            }
            Err(err) => {
                tracing::debug!(%err, "move rejected");
                MoveOutcome::Rejected
            }
        }
    }

    /// Rewind the last turn, caching the removed moves for redo. Removes two
    /// half-moves so the human is back on move, except when playing both
    /// sides manually, or when undoing the human's own game-ending move.
    /// Taking back while the engine is thinking also works; the generation
    /// bump makes its in-flight reply stale. Returns the removed moves in
    /// undo order.
    pub fn takeback(&mut self) -> Vec<String> {
        if self.game.is_empty() {
            return Vec::new();
        }
        let single = !self.settings.auto_move
            || (self.game.is_game_over() && !self.is_human_turn());
        let mut removed = Vec::new();
        for _ in 0..if single { 1 } else { 2 } {
            match self.game.undo() {
                Some(san) => {
                    self.takeback_cache.push(san.clone());
                    removed.push(san);
                }
                None => break,
            }
        }
        if !removed.is_empty() {
            self.generation += 1;
            self.interaction = Interaction::Idle;
            self.cursor = None;
            tracing::debug!(?removed, "takeback");
        }
        removed
    }

    /// Replay cached takebacks until the human is back on move. Does not go
    /// through `apply_move` so the rest of the cache survives.
    pub fn redo(&mut self) -> Vec<String> {
        if !self.is_human_turn() {
            return Vec::new();
        }
        let mut replayed = Vec::new();
        while let Some(san) = self.takeback_cache.pop() {
            match self.game.play(&MoveInput::San(san.clone())) {
                Ok(applied) => replayed.push(applied),
                Err(err) => {
                    // The cache is cleared on every fresh move, so a stale
                    // entry here means a bug upstream. Put it back and stop.
                    tracing::warn!(%san, %err, "cached redo move no longer legal");
                    self.takeback_cache.push(san);
                    break;
                }
            }
            if !self.settings.auto_move || self.game.is_game_over() || self.is_human_turn() {
                break;
            }
        }
        if !replayed.is_empty() {
            self.generation += 1;
            self.interaction = Interaction::Idle;
            self.cursor = None;
        }
        replayed
    }

    pub fn can_redo(&self) -> bool {
        !self.takeback_cache.is_empty()
    }

    /// Start over, optionally from a custom position.
    pub fn reset(&mut self, fen: Option<&str>) -> Result<(), GameError> {
        self.game = match fen {
            Some(fen) => GameClient::from_fen(fen)?,
            None => GameClient::new(),
        };
        self.takeback_cache.clear();
        self.interaction = Interaction::Idle;
        self.cursor = None;
        self.generation += 1;
        Ok(())
    }

    /// Validate-then-replace for custom positions. An invalid FEN leaves
    /// the live game untouched.
    pub fn set_custom_position(&mut self, fen: &str) -> bool {
        self.reset(Some(fen)).is_ok()
    }

    // -- square selection ------------------------------------------------

    /// Handle a board click. Clicking an own piece selects it (and computes
    /// its targets), clicking elsewhere with a selection tries the move, and
    /// a pawn push to the last rank parks in `AwaitingPromotion` instead.
    pub fn select_square(&mut self, sq: Square) -> SelectOutcome {
        if !self.is_human_turn() || self.game.is_game_over() {
            return SelectOutcome::Ignored;
        }
        let own = self
            .game
            .piece_at(sq)
            .is_some_and(|p| p.color == self.game.turn());
        if let Interaction::SquareSelected { from, .. } = self.interaction {
            if !own {
                if self.is_promotion_push(from, sq) {
                    self.interaction = Interaction::AwaitingPromotion { from, to: sq };
                    return SelectOutcome::PromotionPending;
                }
                let outcome = self.apply_move(&MoveInput::Coords {
                    from,
                    to: sq,
                    promotion: None,
                });
                if !outcome.is_applied() {
                    self.interaction = Interaction::Idle;
                }
                return SelectOutcome::Moved(outcome);
            }
        }
        if own {
            let targets = self.targets_from(sq);
            if targets.is_empty() {
                self.interaction = Interaction::Idle;
                SelectOutcome::Cleared
            } else {
                self.interaction = Interaction::SquareSelected { from: sq, targets };
                SelectOutcome::Selected
            }
        } else {
            self.interaction = Interaction::Idle;
            SelectOutcome::Cleared
        }
    }

    /// Complete a pending promotion with the chosen piece.
    pub fn resolve_promotion(&mut self, role: Role) -> MoveOutcome {
        let Interaction::AwaitingPromotion { from, to } = self.interaction else {
            return MoveOutcome::Rejected;
        };
        self.interaction = Interaction::Idle;
        self.apply_move(&MoveInput::Coords {
            from,
            to,
            promotion: Some(role),
        })
    }

    pub fn clear_selection(&mut self) {
        self.interaction = Interaction::Idle;
    }

    fn targets_from(&self, from: Square) -> Vec<(Square, TargetKind)> {
        self.game
            .legal_moves_from(from)
            .iter()
            .map(|m| {
                let kind = if m.is_capture() {
                    TargetKind::Capture
                } else {
                    TargetKind::Quiet
                };
                (move_dest(m), kind)
            })
            .collect()
    }

    fn is_promotion_push(&self, from: Square, to: Square) -> bool {
        self.game
            .legal_moves_from(from)
            .iter()
            .any(|m| move_dest(m) == to && m.promotion().is_some())
    }

    // -- history browsing ------------------------------------------------

    /// Step one move back from the viewed position. The first step lands on
    /// the position before the last move.
    pub fn look_back(&mut self) {
        if self.game.is_empty() {
            return;
        }
        match &mut self.cursor {
            Some(cursor) => cursor.step_back(),
            None => {
                self.cursor = Some(HistoryCursor::at(self.game.len() as isize - 2));
                self.interaction = Interaction::Idle;
            }
        }
    }

    /// Step one move forward; reaching the live position drops the cursor.
    pub fn look_forward(&mut self) {
        if let Some(cursor) = &mut self.cursor {
            if cursor.index() >= self.game.len() as isize - 2 {
                self.cursor = None;
            } else {
                cursor.step_forward();
            }
        }
    }

    /// Jump the view to the position after move `index` (-1 for the start).
    pub fn look_back_to(&mut self, index: isize) {
        if self.game.is_empty() {
            return;
        }
        if index >= self.game.len() as isize - 1 {
            self.cursor = None;
        } else {
            self.cursor = Some(HistoryCursor::at(index.max(-1)));
            self.interaction = Interaction::Idle;
        }
    }

    pub fn look_back_to_start(&mut self) {
        self.look_back_to(-1);
    }

    pub fn jump_to_current(&mut self) {
        self.cursor = None;
    }

    pub fn is_browsing(&self) -> bool {
        self.cursor.is_some()
    }

    /// Ply of the viewed position (number of moves played to reach it).
    pub fn viewed_ply(&self) -> usize {
        match &self.cursor {
            Some(cursor) => cursor.ply(),
            None => self.game.len(),
        }
    }

    pub fn viewed_fen(&self) -> String {
        match &self.cursor {
            Some(cursor) => self.game.fen_at(cursor.ply()),
            None => self.game.fen(),
        }
    }

    /// Origin and destination of the move that produced the viewed position,
    /// for highlighting. `None` at the starting position.
    pub fn viewed_last_move(&self) -> Option<(Option<Square>, Square)> {
        let ply = self.viewed_ply();
        if ply == 0 {
            return None;
        }
        let m = &self.game.moves()[ply - 1];
        Some((move_origin(m), move_dest(m)))
    }

    // -- engine handshake ------------------------------------------------

    /// If it is the engine's turn, mint a request for the current position.
    /// Each request gets a fresh generation; replies to older generations
    /// are dropped.
    pub fn next_engine_request(&mut self) -> Option<EngineRequest> {
        if self.is_human_turn() || self.game.is_game_over() {
            return None;
        }
        self.generation += 1;
        Some(EngineRequest {
            generation: self.generation,
            fen: self.game.fen(),
            strength: self.settings.strength,
        })
    }

    pub fn accept_engine_reply(&mut self, reply: &EngineReply) -> MoveOutcome {
        if reply.generation != self.generation {
            tracing::debug!(
                reply = reply.generation,
                current = self.generation,
                "dropping stale engine reply"
            );
            return MoveOutcome::Rejected;
        }
        if self.is_human_turn() {
            return MoveOutcome::Rejected;
        }
        self.apply_move(&MoveInput::Uci(reply.uci.clone()))
    }

    // -- views -----------------------------------------------------------

    /// The human's most recent move, if any.
    pub fn last_human_move(&self) -> Option<&str> {
        let history = self.game.history();
        let offset = if !self.settings.auto_move || !self.is_human_turn() {
            1
        } else {
            2
        };
        history.len().checked_sub(offset).map(|i| history[i].as_str())
    }

    /// The engine's most recent move, if any. Always `None` in manual play.
    pub fn last_engine_move(&self) -> Option<&str> {
        if !self.settings.auto_move {
            return None;
        }
        let history = self.game.history();
        let offset = if self.is_human_turn() { 1 } else { 2 };
        history.len().checked_sub(offset).map(|i| history[i].as_str())
    }

    /// Legal moves for the text-entry dropdown: pawn moves first, then
    /// castles, then piece moves. Empty once the game is over.
    pub fn legal_sans_for_entry(&self) -> Vec<String> {
        if self.game.is_game_over() {
            return Vec::new();
        }
        let mut sans = self.game.legal_sans();
        entry_sort(&mut sans);
        sans
    }

    /// Export the game as PGN. `None` before any move has been played.
    pub fn export_pgn(&self, result: Option<GameResult>) -> Option<String> {
        if self.game.is_empty() {
            return None;
        }
        let result = result
            .or_else(|| pgn::infer_result(&self.game))
            .unwrap_or(GameResult::Unknown);
        Some(pgn::export_pgn(&self.game, result))
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chess_core::shakmaty::Color;

    fn manual() -> Session {
        let mut settings = Settings::default();
        settings.auto_move = false;
        Session::with_settings(settings)
    }

    fn san(s: &str) -> MoveInput {
        MoveInput::San(s.to_string())
    }

    fn play_all(session: &mut Session, moves: &[&str]) {
        for m in moves {
            assert!(session.play_human(&san(m)).is_applied(), "move {m}");
        }
    }

    #[test]
    fn test_play_human_respects_turn() {
        let mut session = Session::new(); // auto-move on, human is white
        assert!(session.play_human(&san("e4")).is_applied());
        // black is the engine's side now
        assert_eq!(session.play_human(&san("e5")), MoveOutcome::Rejected);
    }

    #[test]
    fn test_takeback_removes_pair_with_auto_move() {
        let mut session = Session::new();
        assert!(session.play_human(&san("e4")).is_applied());
        let reply = session.next_engine_request().map(|req| EngineReply {
            generation: req.generation,
            uci: "e7e5".to_string(),
        });
        assert!(session.accept_engine_reply(&reply.unwrap()).is_applied());
        assert_eq!(session.game().len(), 2);

        let removed = session.takeback();
        assert_eq!(removed, vec!["e5".to_string(), "e4".to_string()]);
        assert!(session.game().is_empty());
        assert!(session.is_human_turn());
        assert!(session.can_redo());
    }

    #[test]
    fn test_takeback_single_in_manual_play() {
        let mut session = manual();
        play_all(&mut session, &["e4", "e5", "Nf3"]);
        assert_eq!(session.takeback(), vec!["Nf3".to_string()]);
        assert_eq!(session.game().len(), 2);
    }

    #[test]
    fn test_takeback_of_own_mating_move_removes_one() {
        let mut session = Session::new();
        session.settings_mut().own_color_white = false; // human plays black
        for (engine_uci, human) in [("f2f3", "e5"), ("g2g4", "Qh4")] {
            let req = session.next_engine_request().unwrap();
            let reply = EngineReply {
                generation: req.generation,
                uci: engine_uci.to_string(),
            };
            assert!(session.accept_engine_reply(&reply).is_applied());
            assert!(session.play_human(&san(human)).is_applied());
        }
        assert!(session.game().is_game_over());

        // Only the human's Qh4# comes off; the human is back on move.
        assert_eq!(session.takeback(), vec!["Qh4#".to_string()]);
        assert_eq!(session.game().turn(), Color::Black);
    }

    #[test]
    fn test_redo_restores_pair_and_survives() {
        let mut session = manual();
        play_all(&mut session, &["e4", "e5", "Nf3", "Nc6"]);
        session.takeback();
        session.takeback();
        assert_eq!(session.game().len(), 2);

        assert_eq!(session.redo(), vec!["Nf3".to_string()]);
        assert_eq!(session.redo(), vec!["Nc6".to_string()]);
        assert!(!session.can_redo());
        assert_eq!(session.game().history(), ["e4", "e5", "Nf3", "Nc6"]);
    }

    #[test]
    fn test_fresh_move_invalidates_redo() {
        let mut session = manual();
        play_all(&mut session, &["e4", "e5"]);
        session.takeback();
        assert!(session.can_redo());
        assert!(session.play_human(&san("c5")).is_applied());
        assert!(!session.can_redo());
        assert!(session.redo().is_empty());
    }

    #[test]
    fn test_select_square_flow() {
        let mut session = Session::new();
        let e2: Square = "e2".parse().unwrap();
        let e4: Square = "e4".parse().unwrap();
        let e5: Square = "e5".parse().unwrap();

        // empty square with nothing selected
        assert_eq!(session.select_square(e5), SelectOutcome::Cleared);
        assert_eq!(session.select_square(e2), SelectOutcome::Selected);
        match session.interaction() {
            Interaction::SquareSelected { from, targets } => {
                assert_eq!(*from, e2);
                assert!(targets.contains(&(e4, TargetKind::Quiet)));
            }
            other => panic!("unexpected interaction {other:?}"),
        }

        match session.select_square(e4) {
            SelectOutcome::Moved(MoveOutcome::Applied { san, .. }) => assert_eq!(san, "e4"),
            other => panic!("unexpected outcome {other:?}"),
        }
        assert_eq!(*session.interaction(), Interaction::Idle);
    }

    #[test]
    fn test_select_square_illegal_target_clears() {
        let mut session = Session::new();
        let e2: Square = "e2".parse().unwrap();
        let e6: Square = "e6".parse().unwrap();
        assert_eq!(session.select_square(e2), SelectOutcome::Selected);
        assert_eq!(
            session.select_square(e6),
            SelectOutcome::Moved(MoveOutcome::Rejected)
        );
        assert_eq!(*session.interaction(), Interaction::Idle);
    }

    #[test]
    fn test_promotion_interposition() {
        let mut session = manual();
        session
            .reset(Some("8/4P3/8/8/8/1k6/8/1K6 w - - 0 1"))
            .unwrap();
        let e7: Square = "e7".parse().unwrap();
        let e8: Square = "e8".parse().unwrap();

        assert_eq!(session.select_square(e7), SelectOutcome::Selected);
        assert_eq!(session.select_square(e8), SelectOutcome::PromotionPending);
        // nothing committed yet
        assert!(session.game().is_empty());

        match session.resolve_promotion(Role::Queen) {
            MoveOutcome::Applied { san, .. } => assert_eq!(san, "e8=Q"),
            other => panic!("unexpected outcome {other:?}"),
        }
        assert_eq!(session.game().len(), 1);
    }

    #[test]
    fn test_look_back_views_do_not_mutate() {
        let mut session = manual();
        play_all(&mut session, &["e4", "e5", "Nf3", "Nc6"]);
        let live_fen = session.game().fen();

        session.look_back();
        assert!(session.is_browsing());
        assert_eq!(session.viewed_ply(), 3);
        session.look_back();
        assert_eq!(session.viewed_ply(), 2);
        session.look_back_to_start();
        assert_eq!(session.viewed_fen(), chess_core::STANDARD_START_FEN);
        assert!(session.viewed_last_move().is_none());

        // the live game never moved
        assert_eq!(session.game().fen(), live_fen);
        session.jump_to_current();
        assert_eq!(session.viewed_fen(), live_fen);
    }

    #[test]
    fn test_look_forward_to_tip_drops_cursor() {
        let mut session = manual();
        play_all(&mut session, &["e4", "e5"]);
        session.look_back();
        assert_eq!(session.viewed_ply(), 1);
        session.look_forward();
        assert!(!session.is_browsing());
        assert_eq!(session.viewed_ply(), 2);
    }

    #[test]
    fn test_mutation_discards_cursor() {
        let mut session = manual();
        play_all(&mut session, &["e4", "e5"]);
        session.look_back();
        assert!(session.is_browsing());
        assert!(session.play_human(&san("Nf3")).is_applied());
        assert!(!session.is_browsing());
    }

    #[test]
    fn test_stale_engine_reply_is_dropped() {
        let mut session = Session::new();
        assert!(session.play_human(&san("e4")).is_applied());
        let req = session.next_engine_request().unwrap();

        // the human takes the move back before the reply lands
        session.takeback();
        let reply = EngineReply {
            generation: req.generation,
            uci: "e7e5".to_string(),
        };
        assert_eq!(session.accept_engine_reply(&reply), MoveOutcome::Rejected);
        assert!(session.game().is_empty());
    }

    #[test]
    fn test_no_engine_request_on_human_turn_or_after_end() {
        let mut session = Session::new();
        assert!(session.next_engine_request().is_none());

        let mut over = manual();
        play_all(&mut over, &["f3", "e5", "g4", "Qh4#"]);
        over.settings_mut().auto_move = true;
        over.settings_mut().own_color_white = false;
        assert!(over.next_engine_request().is_none());
    }

    #[test]
    fn test_last_move_views() {
        let mut session = Session::new();
        assert!(session.last_human_move().is_none());
        assert!(session.play_human(&san("e4")).is_applied());
        assert_eq!(session.last_human_move(), Some("e4"));
        assert!(session.last_engine_move().is_none());

        let req = session.next_engine_request().unwrap();
        let reply = EngineReply {
            generation: req.generation,
            uci: "e7e5".to_string(),
        };
        assert!(session.accept_engine_reply(&reply).is_applied());
        assert_eq!(session.last_human_move(), Some("e4"));
        assert_eq!(session.last_engine_move(), Some("e5"));
    }

    #[test]
    fn test_entry_list_empty_after_game_over() {
        let mut session = manual();
        assert!(!session.legal_sans_for_entry().is_empty());
        play_all(&mut session, &["f3", "e5", "g4", "Qh4#"]);
        assert!(session.legal_sans_for_entry().is_empty());
    }

    #[test]
    fn test_reset_clears_everything() {
        let mut session = manual();
        play_all(&mut session, &["e4", "e5"]);
        session.takeback();
        session.look_back();
        session.reset(None).unwrap();
        assert!(session.game().is_empty());
        assert!(!session.can_redo());
        assert!(!session.is_browsing());
        assert!(session.export_pgn(None).is_none());
    }

    #[test]
    fn test_custom_position_validated_before_replacing() {
        let mut session = manual();
        play_all(&mut session, &["e4", "e5"]);
        assert!(!session.set_custom_position("not a fen"));
        assert_eq!(session.game().len(), 2);

        assert!(session.set_custom_position("4k3/8/8/8/8/8/4P3/4K3 w - - 0 40"));
        assert!(session.game().is_empty());
        assert!(!session.game().is_standard_start());
    }
}
