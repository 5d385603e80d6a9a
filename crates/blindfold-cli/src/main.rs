//! Blindfold chess at the terminal.
//!
//! Moves are typed in SAN (or UCI coordinates) and announced as filtered
//! notation; the board stays hidden unless revealed. The engine answers
//! over a channel, so takebacks and resets while it is thinking are safe.

mod config;
mod render;

use anyhow::Result;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::info;

use chess_core::display::format_san;
use chess_core::pgn::GameResult;
use chess_core::shakmaty::{Role, Square};
use chess_core::MoveInput;
use game_session::{
    reveal_delay, Interaction, MoveOutcome, SelectOutcome, Session, Settings, Strength,
};

use crate::config::Config;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .init();

    let config = Config::from_env();
    info!(?config, "starting");

    let mut settings = Settings::default();
    settings.strength = config.strength();
    let mut session = Session::with_settings(settings);

    let engine_worker::EngineService {
        requests,
        mut replies,
    } = engine_worker::spawn(config.stockfish_path.clone());

    println!("blindfold chess. type a move in SAN, or 'help'.");
    print_turn(&session);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else { break };
                match handle_command(&mut session, line.trim()) {
                    CommandOutcome::Quit => break,
                    // queries must not re-mint a request mid-search
                    CommandOutcome::Mutated => dispatch_engine(&mut session, &requests).await,
                    CommandOutcome::Query => {}
                }
            }
            reply = replies.recv() => {
                let Some(reply) = reply else { break };
                if let MoveOutcome::Applied { san, game_over } =
                    session.accept_engine_reply(&reply)
                {
                    let shown = format_san(&san, &session.settings().display);
                    println!("engine plays {shown}");
                    if game_over {
                        announce_game_over(&session);
                    }
                    print_turn(&session);
                }
            }
        }
    }

    Ok(())
}

/// Issue an engine request if it is the engine's turn. The reveal delay
/// gives the board animation time to finish before the engine answers.
async fn dispatch_engine(
    session: &mut Session,
    requests: &tokio::sync::mpsc::UnboundedSender<game_session::EngineRequest>,
) {
    if let Some(request) = session.next_engine_request() {
        if let Some(delay) = reveal_delay(session.settings()) {
            tokio::time::sleep(delay).await;
        }
        let _ = requests.send(request);
    }
}

/// What a line of input did to the session. Only `Mutated` warrants a
/// fresh engine request; read-only commands typed while the engine is
/// thinking must not restart the search.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CommandOutcome {
    Quit,
    Mutated,
    Query,
}

fn handle_command(session: &mut Session, line: &str) -> CommandOutcome {
    let (cmd, rest) = match line.split_once(' ') {
        Some((cmd, rest)) => (cmd, rest.trim()),
        None => (line, ""),
    };
    match cmd {
        "" => CommandOutcome::Query,
        "quit" | "exit" => CommandOutcome::Quit,
        "help" => {
            print_help();
            CommandOutcome::Query
        }
        "new" => {
            let fen = (!rest.is_empty()).then_some(rest);
            match session.reset(fen) {
                Ok(()) => print_turn(session),
                Err(err) => println!("{err}"),
            }
            CommandOutcome::Mutated
        }
        "takeback" | "tb" => {
            let removed = session.takeback();
            if removed.is_empty() {
                println!("nothing to take back");
            } else {
                println!("took back {}", removed.join(", "));
            }
            CommandOutcome::Mutated
        }
        "redo" => {
            let replayed = session.redo();
            if replayed.is_empty() {
                println!("nothing to redo");
            } else {
                println!("replayed {}", replayed.join(", "));
            }
            CommandOutcome::Mutated
        }
        "back" => {
            session.look_back();
            print_view(session);
            CommandOutcome::Query
        }
        "forward" | "fwd" => {
            session.look_forward();
            print_view(session);
            CommandOutcome::Query
        }
        "start" => {
            session.look_back_to_start();
            print_view(session);
            CommandOutcome::Query
        }
        "goto" => {
            match rest.parse::<isize>() {
                // 1-based move numbers at the prompt
                Ok(n) => {
                    session.look_back_to(n - 1);
                    print_view(session);
                }
                Err(_) => println!("usage: goto <move number>"),
            }
            CommandOutcome::Query
        }
        "click" => {
            match rest.parse::<Square>() {
                Ok(sq) => click_square(session, sq),
                Err(_) => println!("usage: click <square>"),
            }
            CommandOutcome::Mutated
        }
        "promote" => {
            match rest.chars().next().and_then(Role::from_char) {
                Some(role) => match session.resolve_promotion(role) {
                    MoveOutcome::Applied { san, game_over } => {
                        println!("you play {}", format_san(&san, &session.settings().display));
                        if game_over {
                            announce_game_over(session);
                        }
                    }
                    MoveOutcome::Rejected => println!("no promotion pending"),
                },
                None => println!("usage: promote q|r|b|n"),
            }
            CommandOutcome::Mutated
        }
        "moves" => {
            let sans = session.legal_sans_for_entry();
            let display = &session.settings().display;
            let shown: Vec<String> = sans.iter().map(|s| format_san(s, display)).collect();
            println!("{}", shown.join(" "));
            CommandOutcome::Query
        }
        "history" => {
            let display = &session.settings().display;
            let shown: Vec<String> = session
                .game()
                .history()
                .iter()
                .map(|s| format_san(s, display))
                .collect();
            println!("{}", shown.join(" "));
            CommandOutcome::Query
        }
        "status" => {
            println!("{}", session.status().label());
            if let Some(san) = session.last_human_move() {
                println!("your last move: {san}");
            }
            if let Some(san) = session.last_engine_move() {
                println!("engine's last move: {san}");
            }
            CommandOutcome::Query
        }
        "fen" => {
            println!("{}", session.viewed_fen());
            CommandOutcome::Query
        }
        "board" => {
            println!("{}", render::board(&session.viewed_fen()));
            CommandOutcome::Query
        }
        "pgn" => {
            match session.export_pgn(None) {
                Some(pgn) => println!("{pgn}"),
                None => println!("no moves yet"),
            }
            CommandOutcome::Query
        }
        "resign" => {
            match session.export_pgn(Some(loss_for_human(session))) {
                Some(pgn) => println!("{pgn}"),
                None => println!("no moves yet"),
            }
            CommandOutcome::Query
        }
        "reveal" => {
            let settings = session.settings_mut();
            settings.reveal_board = !settings.reveal_board;
            if session.settings().reveal_board {
                println!("{}", render::board(&session.viewed_fen()));
            } else {
                println!("board hidden");
            }
            CommandOutcome::Query
        }
        "auto" => {
            match rest {
                "on" => session.settings_mut().auto_move = true,
                "off" => session.settings_mut().auto_move = false,
                _ => println!("usage: auto on|off"),
            }
            CommandOutcome::Mutated
        }
        "color" => {
            match rest {
                "white" => session.settings_mut().own_color_white = true,
                "black" => session.settings_mut().own_color_white = false,
                _ => println!("usage: color white|black"),
            }
            CommandOutcome::Mutated
        }
        "skill" => {
            match rest.parse::<u8>() {
                Ok(skill) => {
                    let depth = session.settings().strength.depth;
                    session.settings_mut().strength = Strength::new(skill, depth);
                    println!("engine: {}", session.settings().strength.elo_label());
                }
                Err(_) => println!("usage: skill <0-20>"),
            }
            CommandOutcome::Query
        }
        "depth" => {
            match rest.parse::<u8>() {
                Ok(depth) => {
                    let skill = session.settings().strength.skill;
                    session.settings_mut().strength = Strength::new(skill, depth);
                }
                Err(_) => println!("usage: depth <1-16>"),
            }
            CommandOutcome::Query
        }
        _ => {
            play_typed_move(session, line);
            CommandOutcome::Mutated
        }
    }
}

fn click_square(session: &mut Session, sq: Square) {
    match session.select_square(sq) {
        SelectOutcome::Ignored => println!("not your move"),
        SelectOutcome::Selected => {
            if let Interaction::SquareSelected { from, targets } = session.interaction() {
                let squares: Vec<String> =
                    targets.iter().map(|(to, _)| to.to_string()).collect();
                println!("{from}: {}", squares.join(" "));
            }
        }
        SelectOutcome::Cleared => println!("selection cleared"),
        SelectOutcome::PromotionPending => println!("promote to? (promote q|r|b|n)"),
        SelectOutcome::Moved(MoveOutcome::Applied { san, game_over }) => {
            println!("you play {}", format_san(&san, &session.settings().display));
            if game_over {
                announce_game_over(session);
            }
        }
        SelectOutcome::Moved(MoveOutcome::Rejected) => println!("illegal move"),
    }
}

fn play_typed_move(session: &mut Session, text: &str) {
    let input = if looks_like_uci(text) {
        MoveInput::Uci(text.to_string())
    } else {
        MoveInput::San(text.to_string())
    };
    match session.play_human(&input) {
        MoveOutcome::Applied { san, game_over } => {
            let shown = format_san(&san, &session.settings().display);
            println!("you play {shown}");
            if game_over {
                announce_game_over(session);
            }
        }
        MoveOutcome::Rejected => {
            if !session.is_human_turn() {
                println!("not your move");
            } else {
                println!("illegal move: {text}");
            }
        }
    }
}

fn looks_like_uci(text: &str) -> bool {
    let bytes = text.as_bytes();
    matches!(bytes.len(), 4 | 5)
        && bytes[0].is_ascii_lowercase()
        && bytes[1].is_ascii_digit()
        && bytes[2].is_ascii_lowercase()
        && bytes[3].is_ascii_digit()
}

fn loss_for_human(session: &Session) -> GameResult {
    if session.settings().own_color_white {
        GameResult::BlackWins
    } else {
        GameResult::WhiteWins
    }
}

fn announce_game_over(session: &Session) {
    if let Some(message) = session.game_over_message() {
        println!("{message}");
    }
}

fn print_turn(session: &Session) {
    if session.game().is_game_over() {
        return;
    }
    if session.is_human_turn() {
        println!("your move ({:?} to play)", session.game().turn());
    }
}

fn print_view(session: &Session) {
    let ply = session.viewed_ply();
    let label = match session.viewed_last_move() {
        Some(_) => format!("after move {ply}"),
        None => "starting position".to_string(),
    };
    if session.is_browsing() {
        println!("viewing {label} (read-only)");
    } else {
        println!("at the live position");
    }
    if session.settings().reveal_board {
        println!("{}", render::board(&session.viewed_fen()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_queries_do_not_trigger_engine_dispatch() {
        let mut settings = Settings::default();
        settings.auto_move = false;
        let mut session = Session::with_settings(settings);
        assert_eq!(handle_command(&mut session, "e4"), CommandOutcome::Mutated);

        // read-only commands while a search could be running
        for query in ["status", "fen", "moves", "history", "pgn", "back", "board"] {
            assert_eq!(
                handle_command(&mut session, query),
                CommandOutcome::Query,
                "command {query}"
            );
        }
        // browsing is a view concern, never a reason to re-request
        assert_eq!(session.game().history(), ["e4"]);

        assert_eq!(
            handle_command(&mut session, "takeback"),
            CommandOutcome::Mutated
        );
        assert_eq!(handle_command(&mut session, "quit"), CommandOutcome::Quit);
    }
}

fn print_help() {
    println!(
        "\
<san|uci>        play a move (e4, Nf3, e7e8q)
click <square>   select a piece / pick its destination
promote q|r|b|n  finish a pending promotion
moves            list legal moves
takeback, redo   rewind or replay the last turn
back, forward    browse the game history (read-only)
goto <n>, start, current
history, status, fen, pgn, resign
reveal           toggle the board display
auto on|off, color white|black, skill <0-20>, depth <1-16>
new [fen], quit"
    );
}
