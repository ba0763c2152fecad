//! Block message tokenization.
//!
//! A block message is a human-readable string such as `"roll %{DICE} and keep
//! %{COUNT}"`. Tokenizing it yields, in order, the runs of plain text, the line
//! breaks and the `%{NAME}` parameter references that make up the block's
//! visual line.

use once_cell::sync::Lazy;
use regex::Regex;
use std::borrow::Cow;
use std::fmt;

/// Anchored pattern applied repeatedly from the current scan position.
/// Alternation order matters: parameters, then newlines, then plain text.
static MESSAGE_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?:%\{([^}]+)\}|(\n)|([^\n%]+))").expect("message pattern is valid")
});

/// The kind of a single message token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MessageTokenKind {
    Text,
    Newline,
    ParameterName,
}

/// A single token produced by [`tokenize_message`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MessageToken {
    pub kind: MessageTokenKind,
    pub value: String,
}

impl MessageToken {
    pub fn text(value: impl Into<String>) -> Self {
        Self {
            kind: MessageTokenKind::Text,
            value: value.into(),
        }
    }

    pub fn newline() -> Self {
        Self {
            kind: MessageTokenKind::Newline,
            value: "\n".to_string(),
        }
    }

    pub fn parameter(name: impl Into<String>) -> Self {
        Self {
            kind: MessageTokenKind::ParameterName,
            value: name.into(),
        }
    }
}

impl fmt::Display for MessageToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            MessageTokenKind::Text => write!(f, "{}", self.value),
            MessageTokenKind::Newline => write!(f, "\\n"),
            MessageTokenKind::ParameterName => write!(f, "%{{{}}}", self.value),
        }
    }
}

/// A lazy sequence of message tokens.
///
/// Cloning the iterator restarts nothing; it forks the scan at the current
/// position. Call [`tokenize_message`] again to scan from the beginning.
#[derive(Debug, Clone)]
pub struct MessageTokens<'a> {
    source: Cow<'a, str>,
    position: usize,
}

impl Iterator for MessageTokens<'_> {
    type Item = MessageToken;

    fn next(&mut self) -> Option<Self::Item> {
        let rest = self.source.get(self.position..)?;
        let captures = MESSAGE_REGEX.captures(rest)?;
        let whole = captures.get(0)?;

        // Every alternative consumes at least one character.
        self.position += whole.end();

        if let Some(name) = captures.get(1) {
            return Some(MessageToken::parameter(name.as_str()));
        }
        if captures.get(2).is_some() {
            return Some(MessageToken::newline());
        }
        captures.get(3).map(|text| MessageToken::text(text.as_str()))
    }
}

/// Tokenizes a block message.
///
/// Literal `\n` escape sequences are normalized to real newlines first.
/// Scanning stops at the end of the string, or at the first position where no
/// token matches (a stray `%` that does not open a `%{NAME}` reference).
pub fn tokenize_message(message: &str) -> MessageTokens<'_> {
    let source = if message.contains("\\n") {
        Cow::Owned(message.replace("\\n", "\n"))
    } else {
        Cow::Borrowed(message)
    };
    MessageTokens {
        source,
        position: 0,
    }
}
