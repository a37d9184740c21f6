use anyhow::{Context, Result};
use regex::Regex;

const RESULT_TOKENS: [&str; 4] = ["1-0", "0-1", "1/2-1/2", "*"];

/// Counts half-moves (plies) in PGN move text
pub struct MoveCounter {
    comment_regex: Regex,
    variation_regex: Regex,
    move_number_regex: Regex,
}

impl MoveCounter {
    pub fn new() -> Result<Self> {
        Ok(Self {
            comment_regex: Self::compile(r"\{[^}]*\}")?,
            variation_regex: Self::compile(r"\([^)]*\)")?,
            move_number_regex: Self::compile(r"^\d+\.+")?,
        })
    }

    /// Number of half-moves in `pgn`. Headers, comments, variations,
    /// move numbers, NAGs and result tokens are not counted.
    pub fn count(&self, pgn: &str) -> u32 {
        let moves_text = Self::strip_headers(pgn);
        let moves_text = self.comment_regex.replace_all(&moves_text, " ");
        let moves_text = self.variation_regex.replace_all(&moves_text, " ");

        moves_text
            .split_whitespace()
            .filter(|token| self.is_move(token))
            .count() as u32
    }

    fn strip_headers(pgn: &str) -> String {
        pgn.lines()
            .filter(|line| !line.trim_start().starts_with('['))
            .collect::<Vec<_>>()
            .join(" ")
    }

    fn is_move(&self, token: &str) -> bool {
        if RESULT_TOKENS.contains(&token) || token.starts_with('$') {
            return false;
        }

        // "12." and "12..." are numbering; "12.e4" still carries a move
        let rest = self.move_number_regex.replace(token, "");
        !rest.is_empty()
    }

    fn compile(pattern: &str) -> Result<Regex> {
        Regex::new(pattern).with_context(|| format!("Failed to compile regex: {}", pattern))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_pgn() {
        let counter = MoveCounter::new().unwrap();
        assert_eq!(counter.count(""), 0);
        assert_eq!(counter.count("[Event \"Daily\"]\n[Result \"0-1\"]\n\n0-1"), 0);
    }

    #[test]
    fn test_counts_plain_moves() {
        let counter = MoveCounter::new().unwrap();
        assert_eq!(counter.count("1. e4 e5 2. Nf3 1-0"), 3);
        assert_eq!(counter.count("1.e4 e5 2.Nf3 Nc6 *"), 4);
    }

    #[test]
    fn test_ignores_headers_clock_comments_and_continuations() {
        let counter = MoveCounter::new().unwrap();
        let pgn = "[Event \"Team Match\"]\n\
                   [White \"alice\"]\n\
                   [Black \"bob\"]\n\
                   \n\
                   1. d4 {[%clk 23:59:51]} 1... d5 {[%clk 23:58:02]} 2. c4 (2. Nf3 Nf6) $1 0-1";
        assert_eq!(counter.count(pgn), 3);
    }
}
