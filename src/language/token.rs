use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenKind {
    /// A natural-language word, committed with a space.
    Word,
    /// A full source line, committed with a newline.
    Line,
}

impl TokenKind {
    pub fn separator(&self) -> char {
        match self {
            TokenKind::Word => ' ',
            TokenKind::Line => '\n',
        }
    }
}

/// One unit of target text. Immutable once generated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    text: String,
    kind: TokenKind,
}

impl Token {
    pub fn word(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            kind: TokenKind::Word,
        }
    }

    pub fn line(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            kind: TokenKind::Line,
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn kind(&self) -> TokenKind {
        self.kind
    }

    pub fn char_len(&self) -> usize {
        self.text.chars().count()
    }

    /// Leading whitespace of the token, verbatim.
    pub fn indentation(&self) -> &str {
        let body = self.text.trim_start();
        &self.text[..self.text.len() - body.len()]
    }

    /// Number of leading whitespace characters.
    pub fn indent_depth(&self) -> usize {
        self.indentation().chars().count()
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

impl AsRef<str> for Token {
    fn as_ref(&self) -> &str {
        &self.text
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_indentation_of_code_line() {
        let token = Token::line("        self.speed = 0");
        assert_eq!(token.indentation(), "        ");
        assert_eq!(token.indent_depth(), 8);
        assert_eq!(token.kind().separator(), '\n');
    }

    #[test]
    fn test_indentation_with_tabs() {
        let token = Token::line("\t\treturn value;");
        assert_eq!(token.indentation(), "\t\t");
        assert_eq!(token.indent_depth(), 2);
    }

    #[test]
    fn test_word_has_no_indentation() {
        let token = Token::word("வணக்கம்");
        assert_eq!(token.indent_depth(), 0);
        assert_eq!(token.char_len(), 7);
        assert_eq!(token.kind().separator(), ' ');
        assert_eq!(token.to_string(), "வணக்கம்");
    }

    #[test]
    fn test_blank_line_is_all_indentation() {
        let token = Token::line("    ");
        assert_eq!(token.indent_depth(), 4);
    }
}
