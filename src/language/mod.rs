pub mod corpus;
pub mod selector;
pub mod token;

pub use corpus::{Corpus, WordBuckets};
pub use selector::{shuffle, shuffle_with, ContentProvider, MAX_PLAN_LEN};
pub use token::{Token, TokenKind};
