use rand::Rng;

use super::{corpus::Corpus, token::Token};
use crate::error::Result;
use crate::session::{Language, WordLength, WordMode};

/// Upper bound on the number of tokens in a session plan.
pub const MAX_PLAN_LEN: usize = 50;

/// In-place Fisher-Yates shuffle. `pick(i)` must return an index in `0..=i`;
/// it is called for `i` from the last index down to 1.
pub fn shuffle_with<T>(items: &mut [T], mut pick: impl FnMut(usize) -> usize) {
    for i in (1..items.len()).rev() {
        let j = pick(i);
        debug_assert!(j <= i, "picked {j} outside 0..={i}");
        items.swap(i, j.min(i));
    }
}

/// Unbiased uniform shuffle driven by `rng`.
pub fn shuffle<T, R: Rng + ?Sized>(items: &mut [T], rng: &mut R) {
    shuffle_with(items, |i| rng.gen_range(0..=i));
}

/// Builds session plans from a [`Corpus`].
#[derive(Clone, Debug)]
pub struct ContentProvider {
    corpus: Corpus,
}

impl ContentProvider {
    pub fn new(corpus: Corpus) -> Self {
        Self { corpus }
    }

    pub fn builtin() -> Result<Self> {
        Corpus::builtin().map(Self::new)
    }

    pub fn corpus(&self) -> &Corpus {
        &self.corpus
    }

    /// A shuffled plan of at most [`MAX_PLAN_LEN`] tokens.
    ///
    /// Code modes draw lines for the named programming language (empty when the
    /// language has no corpus); normal mode draws words for `language` from the
    /// `word_length` bucket, falling back to the default language.
    pub fn generate<R: Rng + ?Sized>(
        &self,
        word_mode: &WordMode,
        word_length: WordLength,
        language: Language,
        rng: &mut R,
    ) -> Vec<Token> {
        let mut pool: Vec<Token> = match word_mode.code_language() {
            Some(code_lang) => self
                .corpus
                .code_lines(code_lang)
                .iter()
                .map(Token::line)
                .collect(),
            None => self
                .corpus
                .words_for(language)
                .pool(word_length)
                .into_iter()
                .map(Token::word)
                .collect(),
        };

        shuffle(&mut pool, rng);
        pool.truncate(MAX_PLAN_LEN);

        tracing::debug!(
            %word_mode,
            %word_length,
            %language,
            tokens = pool.len(),
            "generated session plan"
        );
        pool
    }
}
