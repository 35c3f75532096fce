use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

use crate::stats::WordHistoryEntry;
use crate::time_series::PerformanceSnapshot;

/// Test duration / special behavior. Interpreted by the timer and the bot,
/// never by the scoring path.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, strum_macros::Display,
)]
#[serde(from = "String", into = "String")]
pub enum TestMode {
    #[strum(serialize = "15")]
    Fifteen,
    #[default]
    #[strum(serialize = "30")]
    Thirty,
    #[strum(serialize = "60")]
    Sixty,
    #[strum(serialize = "bot")]
    Bot,
    #[strum(serialize = "multiplier")]
    Multiplier,
}

impl TestMode {
    pub const ALL: [TestMode; 5] = [
        TestMode::Fifteen,
        TestMode::Thirty,
        TestMode::Sixty,
        TestMode::Bot,
        TestMode::Multiplier,
    ];

    pub fn duration_secs(&self) -> u64 {
        match self {
            TestMode::Fifteen => 15,
            TestMode::Thirty => 30,
            TestMode::Sixty | TestMode::Bot | TestMode::Multiplier => 60,
        }
    }

    pub fn duration(&self) -> Duration {
        Duration::from_secs(self.duration_secs())
    }
}

impl From<&str> for TestMode {
    fn from(token: &str) -> Self {
        match token.trim().to_lowercase().as_str() {
            "15" => TestMode::Fifteen,
            "30" => TestMode::Thirty,
            "60" => TestMode::Sixty,
            "bot" => TestMode::Bot,
            "multiplier" => TestMode::Multiplier,
            other => {
                tracing::warn!(mode = other, "unknown test mode, using default");
                TestMode::default()
            }
        }
    }
}

/// Whether the plan is natural-language words or lines of code.
///
/// `code-<lang>` with a language that has no corpus is kept as-is and simply
/// produces an empty plan.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum WordMode {
    #[default]
    Normal,
    Code(String),
}

impl WordMode {
    pub fn code(language: &str) -> Self {
        WordMode::Code(language.to_lowercase())
    }

    pub fn is_code(&self) -> bool {
        matches!(self, WordMode::Code(_))
    }

    pub fn code_language(&self) -> Option<&str> {
        match self {
            WordMode::Normal => None,
            WordMode::Code(lang) => Some(lang),
        }
    }
}

impl fmt::Display for WordMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WordMode::Normal => write!(f, "normal"),
            WordMode::Code(lang) => write!(f, "code-{lang}"),
        }
    }
}

impl From<&str> for WordMode {
    fn from(token: &str) -> Self {
        let token = token.trim().to_lowercase();
        match token.strip_prefix("code-") {
            Some(lang) => WordMode::code(lang),
            None if token == "normal" => WordMode::Normal,
            None => {
                tracing::warn!(word_mode = %token, "unknown word mode, using normal");
                WordMode::Normal
            }
        }
    }
}

/// Which word-length bucket to draw from. Anything unrecognized is `Mixed`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, strum_macros::Display,
)]
#[serde(from = "String", into = "String")]
#[strum(serialize_all = "lowercase")]
pub enum WordLength {
    Short,
    Medium,
    Long,
    #[default]
    Mixed,
}

impl From<&str> for WordLength {
    fn from(token: &str) -> Self {
        match token.trim().to_lowercase().as_str() {
            "short" => WordLength::Short,
            "medium" => WordLength::Medium,
            "long" => WordLength::Long,
            _ => WordLength::Mixed,
        }
    }
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, strum_macros::Display,
)]
#[serde(from = "String", into = "String")]
#[strum(serialize_all = "lowercase")]
pub enum Language {
    #[default]
    English,
    Tamil,
    Hindi,
    Spanish,
    French,
    German,
    Python,
    Javascript,
    Java,
}

impl Language {
    pub const ALL: [Language; 9] = [
        Language::English,
        Language::Tamil,
        Language::Hindi,
        Language::Spanish,
        Language::French,
        Language::German,
        Language::Python,
        Language::Javascript,
        Language::Java,
    ];

    pub fn is_programming(&self) -> bool {
        matches!(
            self,
            Language::Python | Language::Javascript | Language::Java
        )
    }
}

impl From<&str> for Language {
    fn from(token: &str) -> Self {
        let token = token.trim().to_lowercase();
        Language::ALL
            .into_iter()
            .find(|lang| lang.to_string() == token)
            .unwrap_or_else(|| {
                tracing::warn!(language = %token, "unsupported language, using english");
                Language::default()
            })
    }
}

macro_rules! string_token {
    ($($ty:ty),*) => {
        $(
            impl From<String> for $ty {
                fn from(token: String) -> Self {
                    Self::from(token.as_str())
                }
            }

            impl From<$ty> for String {
                fn from(value: $ty) -> Self {
                    value.to_string()
                }
            }
        )*
    };
}

string_token!(TestMode, WordMode, WordLength, Language);

/// Everything a session is created with.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionConfig {
    pub mode: TestMode,
    pub word_mode: WordMode,
    pub word_length: WordLength,
    pub language: Language,
}

impl SessionConfig {
    pub fn new(
        mode: TestMode,
        word_mode: WordMode,
        word_length: WordLength,
        language: Language,
    ) -> Self {
        Self {
            mode,
            word_mode,
            word_length,
            language,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, strum_macros::Display)]
#[strum(serialize_all = "lowercase")]
pub enum Phase {
    #[default]
    Idle,
    Running,
    Terminal,
}

/// Mutable state owned by a [`crate::engine::TypingSession`].
///
/// `history.len() == current_index` holds after every operation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionState {
    pub phase: Phase,
    pub current_index: usize,
    pub current_input: String,
    pub history: Vec<WordHistoryEntry>,
    pub snapshots: Vec<PerformanceSnapshot>,
    pub started_at: Option<Duration>,
    pub ended_at: Option<Duration>,
    pub timer_elapsed_secs: f64,
}

impl SessionState {
    pub fn is_running(&self) -> bool {
        self.phase == Phase::Running
    }
}
