// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Line tokenizer.
//!
//! Splits a note line into playable units: single characters, bracketed
//! chords, and filler characters that are skipped during playback.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// Zero-width non-joiner, used by sheet authors to separate notes invisibly
pub const INVISIBLE_JOINER: char = '\u{200C}';

/// Characters that are never matched against key presses
pub const FILLER_CHARS: [char; 6] = [' ', '-', '\'', INVISIBLE_JOINER, '|', '\u{2019}'];

/// Check whether a character is filler
pub fn is_filler(c: char) -> bool {
    FILLER_CHARS.contains(&c)
}

/// A playable unit within a line
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Token {
    /// A single character matched by one key press
    Char(char),
    /// Characters between `[` and `]`, all of which must be pressed
    Chord {
        /// Literal text between the brackets
        text: String,
        /// Notes to press (filler removed)
        notes: BTreeSet<char>,
    },
    /// A character that is auto-skipped
    Filler(char),
}

impl Token {
    /// Build a chord token from the text between its brackets
    pub fn chord(text: impl Into<String>) -> Self {
        let text = text.into();
        let notes = text.chars().filter(|c| !is_filler(*c)).collect();
        Token::Chord { text, notes }
    }

    /// Check if this is a chord
    pub fn is_chord(&self) -> bool {
        matches!(self, Token::Chord { .. })
    }

    /// Check if this is filler
    pub fn is_filler(&self) -> bool {
        matches!(self, Token::Filler(_))
    }

    /// Whether the token needs no key press at all.
    ///
    /// Filler and chords with no notes (`[]`, `[ - ]`) are both passed over
    /// by the matcher without waiting for input.
    pub fn is_skippable(&self) -> bool {
        match self {
            Token::Filler(_) => true,
            Token::Chord { notes, .. } => notes.is_empty(),
            Token::Char(_) => false,
        }
    }

    /// Literal text of the token as it appears in the line
    pub fn literal(&self) -> String {
        match self {
            Token::Char(c) | Token::Filler(c) => c.to_string(),
            Token::Chord { text, .. } => format!("[{}]", text),
        }
    }

    /// Width of the literal text in characters
    pub fn width(&self) -> usize {
        match self {
            Token::Char(_) | Token::Filler(_) => 1,
            Token::Chord { text, .. } => text.chars().count() + 2,
        }
    }
}

/// Tokenize one raw note line
pub fn tokenize(line: &str) -> Vec<Token> {
    let chars: Vec<char> = line.chars().filter(|c| *c != '\r' && *c != '\n').collect();
    let mut tokens = Vec::with_capacity(chars.len());
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];

        if is_filler(c) {
            tokens.push(Token::Filler(c));
            i += 1;
            continue;
        }

        if c == '[' {
            let close = chars[i + 1..].iter().position(|&ch| ch == ']');
            if let Some(offset) = close {
                let end = i + 1 + offset;
                let text: String = chars[i + 1..end].iter().collect();
                tokens.push(Token::chord(text));
                i = end + 1;
                continue;
            }
            // Unterminated chord, keep the bracket as a plain character
        }

        tokens.push(Token::Char(c));
        i += 1;
    }

    tokens
}

/// Reassemble the literal text of a token sequence
pub fn render(tokens: &[Token]) -> String {
    tokens.iter().map(Token::literal).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn notes(s: &str) -> BTreeSet<char> {
        s.chars().collect()
    }

    #[test]
    fn test_single_chars() {
        assert_eq!(
            tokenize("ab"),
            vec![Token::Char('a'), Token::Char('b')]
        );
    }

    #[test]
    fn test_chord_and_chars() {
        let tokens = tokenize("ab[cd]");
        assert_eq!(tokens.len(), 3);
        assert_eq!(tokens[0], Token::Char('a'));
        assert_eq!(tokens[1], Token::Char('b'));
        assert_eq!(
            tokens[2],
            Token::Chord {
                text: "cd".to_string(),
                notes: notes("cd")
            }
        );
    }

    #[test]
    fn test_chord_drops_filler() {
        let tokens = tokenize("[ad-g]");
        assert_eq!(tokens.len(), 1);
        match &tokens[0] {
            Token::Chord { text, notes: n } => {
                assert_eq!(text, "ad-g");
                assert_eq!(*n, notes("adg"));
            }
            other => panic!("expected chord, got {:?}", other),
        }
    }

    #[test]
    fn test_filler_tokens() {
        let tokens = tokenize("a b-c'd\u{200C}e|f\u{2019}g");
        let fillers = tokens.iter().filter(|t| t.is_filler()).count();
        assert_eq!(fillers, 6);
        assert_eq!(tokens.len(), 13);
    }

    #[test]
    fn test_unterminated_chord() {
        let tokens = tokenize("a[bc");
        assert_eq!(
            tokens,
            vec![
                Token::Char('a'),
                Token::Char('['),
                Token::Char('b'),
                Token::Char('c')
            ]
        );
    }

    #[test]
    fn test_empty_chords_are_skippable() {
        let tokens = tokenize("[]x[ - ]");
        assert_eq!(tokens.len(), 3);
        assert!(tokens[0].is_skippable());
        assert!(!tokens[1].is_skippable());
        assert!(tokens[2].is_skippable());
        assert!(tokens[2].is_chord());
    }

    #[test]
    fn test_strips_line_endings() {
        assert_eq!(tokenize("ab\r\n"), tokenize("ab"));
    }

    #[test]
    fn test_render_reproduces_line() {
        for line in [
            "ab[cd] e-f",
            "[]|[ a ] x'y",
            "8 [0wt] 9 [qe] [ty]- u",
            "]stray close",
            "",
        ] {
            assert_eq!(render(&tokenize(line)), line);
        }
    }

    #[test]
    fn test_nested_bracket_closes_at_first() {
        let tokens = tokenize("[a[b]c]");
        assert_eq!(tokens.len(), 3);
        assert_eq!(tokens[0], Token::chord("a[b"));
        assert_eq!(tokens[1], Token::Char('c'));
        assert_eq!(tokens[2], Token::Char(']'));
        assert_eq!(render(&tokens), "[a[b]c]");
    }

    #[test]
    fn test_token_width() {
        assert_eq!(Token::Char('a').width(), 1);
        assert_eq!(Token::chord("abc").width(), 5);
        assert_eq!(Token::chord("").width(), 2);
    }
}
