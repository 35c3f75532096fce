//! Character- and token-level comparison of typed text against a target.
//!
//! Two pure functions share one primitive ([`compare_chars`]): [`classify`]
//! feeds live highlighting and [`is_token_correct`] feeds scoring. `Extra` and
//! `Pending` are display states only.

use itertools::{EitherOrBoth, Itertools};
use serde::Serialize;

use crate::language::Token;

#[derive(Clone, Debug, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CharClass {
    Correct,
    Incorrect,
    /// Typed past the end of the target.
    Extra,
    /// Target character not typed yet.
    Pending,
}

#[derive(Clone, Debug, Copy, PartialEq, Eq, Serialize)]
pub struct CharClassification {
    /// The typed character, or the target character when pending.
    pub char: char,
    pub class: CharClass,
}

/// Pairs target and typed characters position by position.
pub fn compare_chars<'a>(
    target: &'a str,
    typed: &'a str,
) -> impl Iterator<Item = EitherOrBoth<char, char>> + 'a {
    target.chars().zip_longest(typed.chars())
}

/// Classifies every typed character plus every pending target character.
pub fn classify(target: &str, typed: &str) -> Vec<CharClassification> {
    compare_chars(target, typed)
        .map(|pair| match pair {
            EitherOrBoth::Both(expected, got) if expected == got => CharClassification {
                char: got,
                class: CharClass::Correct,
            },
            EitherOrBoth::Both(_, got) => CharClassification {
                char: got,
                class: CharClass::Incorrect,
            },
            EitherOrBoth::Right(got) => CharClassification {
                char: got,
                class: CharClass::Extra,
            },
            EitherOrBoth::Left(expected) => CharClassification {
                char: expected,
                class: CharClass::Pending,
            },
        })
        .collect()
}

/// Exact match: no incorrect, extra or missing characters.
pub fn is_token_correct(target: &str, typed: &str) -> bool {
    compare_chars(target, typed).all(|pair| matches!(pair, EitherOrBoth::Both(a, b) if a == b))
}

/// Whether `committing` ends the attempt at `target`.
///
/// Words end on a space, code lines on a newline. A separator on an empty
/// buffer is swallowed rather than committing a blank attempt.
pub fn is_commit_ready(target: &Token, typed: &str, committing: char) -> bool {
    committing == target.kind().separator() && !typed.is_empty()
}
