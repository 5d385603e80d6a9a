//! Stockfish engine wrapper using UCI protocol (async I/O)

use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::process::{Child, ChildStdin, ChildStdout, Command};

use tracing::debug;

use crate::error::EngineError;

/// Stockfish engine instance
pub struct StockfishEngine {
    process: Child,
    stdin: ChildStdin,
    stdout: BufReader<ChildStdout>,
    skill: Option<u8>,
}

impl StockfishEngine {
    /// Spawn a new Stockfish process and initialize UCI
    pub async fn new(path: &str) -> Result<Self, EngineError> {
        let mut process = Command::new(path)
            .stdin(std::process::Stdio::piped())
            .stdout(std::process::Stdio::piped())
            .stderr(std::process::Stdio::null())
            .spawn()
            .map_err(|e| EngineError::Stockfish(format!("Failed to spawn Stockfish: {e}")))?;

        let stdin = process.stdin.take().unwrap();
        let stdout = BufReader::new(process.stdout.take().unwrap());

        let mut engine = Self {
            process,
            stdin,
            stdout,
            skill: None,
        };

        // Initialize UCI
        engine.send("uci").await?;
        engine.wait_for("uciok").await?;

        // Interactive play needs a fast engine, not a strong one
        engine.send("setoption name Threads value 1").await?;
        engine.send("setoption name Hash value 16").await?;
        engine.send("isready").await?;
        engine.wait_for("readyok").await?;

        Ok(engine)
    }

    /// Send a command to Stockfish
    async fn send(&mut self, cmd: &str) -> Result<(), EngineError> {
        debug!(cmd, "SF <");
        self.stdin
            .write_all(format!("{cmd}\n").as_bytes())
            .await
            .map_err(|e| EngineError::Stockfish(format!("Failed to write to Stockfish: {e}")))?;
        self.stdin
            .flush()
            .await
            .map_err(|e| EngineError::Stockfish(format!("Failed to flush stdin: {e}")))?;
        Ok(())
    }

    /// Read one line; a zero-byte read means the process died.
    async fn read_line(&mut self, line: &mut String) -> Result<(), EngineError> {
        line.clear();
        let n = self
            .stdout
            .read_line(line)
            .await
            .map_err(|e| EngineError::Stockfish(format!("Failed to read from Stockfish: {e}")))?;
        if n == 0 {
            return Err(EngineError::Stockfish(
                "Stockfish exited unexpectedly".to_string(),
            ));
        }
        Ok(())
    }

    /// Wait for a specific response line
    async fn wait_for(&mut self, expected: &str) -> Result<(), EngineError> {
        let mut line = String::new();
        loop {
            self.read_line(&mut line).await?;
            let trimmed = line.trim();
            debug!(line = trimmed, "SF >");
            if trimmed == expected {
                return Ok(());
            }
        }
    }

    async fn set_skill(&mut self, skill: u8) -> Result<(), EngineError> {
        if self.skill == Some(skill) {
            return Ok(());
        }
        self.send(&format!("setoption name Skill Level value {skill}"))
            .await?;
        self.skill = Some(skill);
        Ok(())
    }

    /// Search a position and return the best move in UCI notation
    pub async fn best_move(
        &mut self,
        fen: &str,
        skill: u8,
        depth: u8,
    ) -> Result<String, EngineError> {
        self.set_skill(skill).await?;
        self.send(&format!("position fen {fen}")).await?;
        self.send(&format!("go depth {depth}")).await?;

        let mut line = String::new();
        loop {
            self.read_line(&mut line).await?;
            let trimmed = line.trim();
            debug!(line = trimmed, "SF >");

            if let Some(best) = parse_bestmove(trimmed) {
                if best == "(none)" {
                    return Err(EngineError::NoLegalMoves(fen.to_string()));
                }
                return Ok(best.to_string());
            }
        }
    }

    /// Send quit command and wait for process to exit
    pub async fn quit(&mut self) {
        let _ = self.send("quit").await;
        let _ = self.process.wait().await;
    }
}

impl Drop for StockfishEngine {
    fn drop(&mut self) {
        // Best-effort synchronous kill in drop
        let _ = self.process.start_kill();
    }
}

/// Parse the move out of a `bestmove` line
fn parse_bestmove(line: &str) -> Option<&str> {
    let mut parts = line.split_whitespace();
    if parts.next() != Some("bestmove") {
        return None;
    }
    parts.next()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_dead_process_is_an_error_not_a_hang() {
        // `true` exits without ever speaking UCI, so the handshake hits EOF.
        let result = tokio::time::timeout(
            std::time::Duration::from_secs(5),
            StockfishEngine::new("true"),
        )
        .await
        .expect("handshake must fail fast on a dead process");
        assert!(matches!(result, Err(EngineError::Stockfish(_))));
    }

    #[test]
    fn test_parse_bestmove() {
        assert_eq!(parse_bestmove("bestmove e2e4 ponder e7e5"), Some("e2e4"));
        assert_eq!(parse_bestmove("bestmove (none)"), Some("(none)"));
        assert_eq!(parse_bestmove("info depth 3 score cp 35"), None);
        assert_eq!(parse_bestmove("bestmove"), None);
    }
}
