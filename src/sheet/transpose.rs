// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Transpose directive detection.
//!
//! Sheet authors write lines such as `+5`, `(-3)`, `Transpose +2` or
//! `octave 1` between note lines to tell the player to shift the in-game
//! instrument. Those lines are consumed by playback instead of being played.
//!
//! Rules are tried in order:
//! 1. A signed number (`+5`, `-12`) that is the whole line once `*`, `(`
//!    and `)` are removed, or that appears alongside a keyword.
//! 2. A keyword followed somewhere by an unsigned number (`Transpose by 2`).
//! 3. A keyword alone (`Transpose here`), value 0.

use once_cell::sync::Lazy;
use regex::Regex;

/// Keyword stems; any word starting with one of these counts
pub const TRANSPOSE_KEYWORDS: [&str; 2] = ["tran", "octave"];

static KEYWORD: Lazy<Regex> = Lazy::new(|| {
    let pattern = format!(r"(?i)\b(?:{})\w*", TRANSPOSE_KEYWORDS.join("|"));
    Regex::new(&pattern).expect("keyword pattern is valid")
});

static SIGNED_NUMBER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[+-][0-9]+").expect("signed pattern is valid"));

static UNSIGNED_NUMBER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b[0-9]+\b").expect("unsigned pattern is valid"));

static DECORATION: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[*()]").expect("decoration pattern is valid"));

/// Classify a line, returning the directive value if it is a transpose line
pub fn detect_transpose(line: &str) -> Option<i32> {
    let trimmed = line.trim();
    let has_keyword = KEYWORD.is_match(trimmed);

    if let Some(signed) = signed_number(trimmed) {
        let cleaned = DECORATION.replace_all(trimmed, "");
        if cleaned.trim() == signed.text || has_keyword {
            return Some(signed.value);
        }
    }

    if !has_keyword {
        return None;
    }

    let value = UNSIGNED_NUMBER
        .find(trimmed)
        .and_then(|m| m.as_str().parse::<i32>().ok())
        .unwrap_or(0);
    Some(value)
}

/// Check whether a line is a transpose directive
pub fn is_directive(line: &str) -> bool {
    detect_transpose(line).is_some()
}

struct SignedNumber<'a> {
    text: &'a str,
    value: i32,
}

/// First signed number in the line, if it fits in an `i32`
fn signed_number(line: &str) -> Option<SignedNumber<'_>> {
    let m = SIGNED_NUMBER.find(line)?;
    let value = m.as_str().parse::<i32>().ok()?;
    Some(SignedNumber {
        text: m.as_str(),
        value,
    })
}
