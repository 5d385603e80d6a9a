//! The engine service task: receives position requests, answers with moves.
//!
//! Requests arrive on an unbounded channel. Before answering, the task
//! drains the channel and keeps only the newest request, so a burst of
//! takebacks never queues up answers for positions that no longer exist.
//! The session's generation gate catches whatever slips through anyway.

use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use game_session::{EngineReply, EngineRequest};

use crate::random;
use crate::stockfish::StockfishEngine;

pub struct EngineService {
    pub requests: mpsc::UnboundedSender<EngineRequest>,
    pub replies: mpsc::UnboundedReceiver<EngineReply>,
}

/// Spawn the engine task. `stockfish_path` is the binary to launch for
/// skill levels above 0; the process is started lazily on the first such
/// request. Dropping the request sender shuts the task down.
pub fn spawn(stockfish_path: String) -> EngineService {
    let (req_tx, mut req_rx) = mpsc::unbounded_channel::<EngineRequest>();
    let (reply_tx, reply_rx) = mpsc::unbounded_channel::<EngineReply>();

    tokio::spawn(async move {
        let mut engine: Option<StockfishEngine> = None;

        while let Some(mut request) = req_rx.recv().await {
            // keep only the newest request
            while let Ok(newer) = req_rx.try_recv() {
                debug!(
                    superseded = request.generation,
                    by = newer.generation,
                    "dropping superseded request"
                );
                request = newer;
            }

            let uci = if request.strength.is_random() {
                random::random_move(&request.fen)
            } else {
                match ensure_engine(&mut engine, &stockfish_path).await {
                    Some(engine) => {
                        engine
                            .best_move(&request.fen, request.strength.skill, request.strength.depth)
                            .await
                    }
                    // play goes on without the binary, just weaker
                    None => random::random_move(&request.fen),
                }
            };

            match uci {
                Ok(uci) => {
                    let reply = EngineReply {
                        generation: request.generation,
                        uci,
                    };
                    if reply_tx.send(reply).is_err() {
                        break;
                    }
                }
                Err(err) => {
                    error!(%err, fen = %request.fen, "engine request failed");
                }
            }
        }

        if let Some(mut engine) = engine {
            engine.quit().await;
        }
        info!("engine service stopped");
    });

    EngineService {
        requests: req_tx,
        replies: reply_rx,
    }
}

async fn ensure_engine<'a>(
    engine: &'a mut Option<StockfishEngine>,
    path: &str,
) -> Option<&'a mut StockfishEngine> {
    if engine.is_none() {
        match StockfishEngine::new(path).await {
            Ok(started) => {
                info!(path, "Stockfish started");
                *engine = Some(started);
            }
            Err(err) => {
                warn!(%err, path, "Stockfish unavailable, falling back to random moves");
                return None;
            }
        }
    }
    engine.as_mut()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chess_core::{GameClient, MoveInput, STANDARD_START_FEN};
    use game_session::Strength;

    #[tokio::test]
    async fn test_random_strength_answers_with_legal_move() {
        // skill 0 never touches the binary, so a bogus path is fine
        let mut service = spawn("/nonexistent/stockfish".to_string());
        service
            .requests
            .send(EngineRequest {
                generation: 7,
                fen: STANDARD_START_FEN.to_string(),
                strength: Strength::new(0, 3),
            })
            .unwrap();

        let reply = service.replies.recv().await.unwrap();
        assert_eq!(reply.generation, 7);
        let mut game = GameClient::new();
        assert!(game.play(&MoveInput::Uci(reply.uci)).is_ok());
    }

    #[tokio::test]
    async fn test_missing_binary_falls_back_to_random() {
        let mut service = spawn("/nonexistent/stockfish".to_string());
        service
            .requests
            .send(EngineRequest {
                generation: 1,
                fen: STANDARD_START_FEN.to_string(),
                strength: Strength::new(5, 3),
            })
            .unwrap();

        let reply = service.replies.recv().await.unwrap();
        assert_eq!(reply.generation, 1);
        let mut game = GameClient::new();
        assert!(game.play(&MoveInput::Uci(reply.uci)).is_ok());
    }
}
