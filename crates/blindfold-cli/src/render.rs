//! Plain-text board rendering for the reveal command.

/// Render the piece placement field of a FEN as an 8x8 diagram, white at
/// the bottom.
pub fn board(fen: &str) -> String {
    let placement = fen.split_whitespace().next().unwrap_or("");
    let mut out = String::new();
    for (i, rank) in placement.split('/').enumerate() {
        out.push_str(&format!("{} ", 8 - i));
        for c in rank.chars() {
            if let Some(n) = c.to_digit(10) {
                for _ in 0..n {
                    out.push_str(". ");
                }
            } else {
                out.push(c);
                out.push(' ');
            }
        }
        out.push('\n');
    }
    out.push_str("  a b c d e f g h");
    out
}

#[cfg(test)]
mod tests {
    use super::board;
    use chess_core::STANDARD_START_FEN;

    #[test]
    fn test_start_position() {
        let diagram = board(STANDARD_START_FEN);
        let lines: Vec<&str> = diagram.lines().collect();
        assert_eq!(lines.len(), 9);
        assert_eq!(lines[0], "8 r n b q k b n r ");
        assert_eq!(lines[4], "4 . . . . . . . . ");
        assert_eq!(lines[7], "1 R N B Q K B N R ");
        assert_eq!(lines[8], "  a b c d e f g h");
    }
}
