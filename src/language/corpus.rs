use include_dir::{include_dir, Dir};
use serde::Deserialize;
use serde_json::from_str;
use std::collections::HashMap;

use crate::error::{Error, Result};
use crate::session::{Language, WordLength};

static LANG_DIR: Dir = include_dir!("src/lang");

const WORDS_FILE: &str = "words.json";
const CODE_FILE: &str = "code.json";

/// The three length buckets of one natural language.
#[derive(Deserialize, Clone, Debug, Default, PartialEq)]
pub struct WordBuckets {
    pub short: Vec<String>,
    pub medium: Vec<String>,
    pub long: Vec<String>,
}

impl WordBuckets {
    /// The pool for a bucket; `Mixed` concatenates short, medium and long.
    pub fn pool(&self, length: WordLength) -> Vec<String> {
        match length {
            WordLength::Short => self.short.clone(),
            WordLength::Medium => self.medium.clone(),
            WordLength::Long => self.long.clone(),
            WordLength::Mixed => self
                .short
                .iter()
                .chain(&self.medium)
                .chain(&self.long)
                .cloned()
                .collect(),
        }
    }
}

#[derive(Deserialize, Clone, Debug)]
struct WordTable {
    default: String,
    languages: HashMap<String, WordBuckets>,
}

/// Word and code-line tables the content provider draws from.
#[derive(Clone, Debug)]
pub struct Corpus {
    default_language: String,
    words: HashMap<String, WordBuckets>,
    code: HashMap<String, Vec<String>>,
}

impl Corpus {
    /// Corpora compiled into the binary from `src/lang`.
    pub fn builtin() -> Result<Self> {
        let words = read_embedded(WORDS_FILE)?;
        let code = read_embedded(CODE_FILE)?;
        Self::from_json(words, code)
    }

    pub fn from_json(words_json: &str, code_json: &str) -> Result<Self> {
        let table: WordTable = from_str(words_json).map_err(|source| Error::Corpus {
            file: WORDS_FILE.to_string(),
            source,
        })?;
        let code = from_str(code_json).map_err(|source| Error::Corpus {
            file: CODE_FILE.to_string(),
            source,
        })?;

        Ok(Self {
            default_language: table.default,
            words: table.languages,
            code,
        })
    }

    /// Buckets for `language`, or for the default language when the table has
    /// no entry for it (programming languages never do).
    pub fn words_for(&self, language: Language) -> &WordBuckets {
        let name = language.to_string();
        if let Some(buckets) = self.words.get(&name) {
            return buckets;
        }
        tracing::warn!(
            language = %name,
            fallback = %self.default_language,
            "no word corpus for language"
        );
        static EMPTY: WordBuckets = WordBuckets {
            short: Vec::new(),
            medium: Vec::new(),
            long: Vec::new(),
        };
        self.words.get(&self.default_language).unwrap_or(&EMPTY)
    }

    /// Code lines for a programming language; empty when unknown.
    pub fn code_lines(&self, language: &str) -> &[String] {
        match self.code.get(language) {
            Some(lines) => lines.as_slice(),
            None => {
                tracing::warn!(language, "no code corpus for language");
                &[]
            }
        }
    }

    pub fn word_languages(&self) -> impl Iterator<Item = &str> {
        self.words.keys().map(String::as_str)
    }

    pub fn code_languages(&self) -> impl Iterator<Item = &str> {
        self.code.keys().map(String::as_str)
    }
}

fn read_embedded(file_name: &str) -> Result<&'static str> {
    LANG_DIR
        .get_file(file_name)
        .and_then(|file| file.contents_utf8())
        .ok_or_else(|| Error::MissingCorpus(file_name.to_string()))
}
