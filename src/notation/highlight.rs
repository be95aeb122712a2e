//! Syntax highlighting for the SH notation and pattern grammars.
//!
//! Tokenizes input into classified spans using the same PEG grammar that
//! backs [`super::parse`] and [`crate::pattern::parse`], then maps each span
//! to an ANSI terminal color for REPL highlighting.

use super::{NotationGrammar, Rule};
use pest::Parser;
use std::ops::Range;

/// Token classification for syntax highlighting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    Comment,
    TypeCode,
    RoleSuffix,
    Variable,
    Wildcard,
    SequenceWildcard,
    Label,
    Punctuation,
    Whitespace,
    Unknown,
}

impl TokenKind {
    /// ANSI escape code for this token kind (dark terminal background).
    #[must_use]
    pub fn ansi_code(self) -> &'static str {
        match self {
            Self::Comment => "\x1b[90m",          // dark gray
            Self::TypeCode => "\x1b[1;36m",       // bold cyan
            Self::RoleSuffix => "\x1b[33m",       // yellow
            Self::Variable => "\x1b[1;37m",       // bold white
            Self::Wildcard | Self::SequenceWildcard => "\x1b[1;35m", // bold magenta
            Self::Label => "\x1b[97m",            // bright white
            Self::Punctuation => "\x1b[90m",      // dark gray
            Self::Whitespace | Self::Unknown => "",
        }
    }
}

/// A classified token span.
#[derive(Debug, Clone)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Range<usize>,
}

/// Tokenize a line of SH notation (or pattern) input into classified spans.
///
/// On parse failure (partial/malformed input), returns the entire input as
/// a single `Unknown` token so highlighting degrades gracefully in a REPL.
#[must_use]
pub fn tokenize(input: &str) -> Vec<Token> {
    let pairs = match NotationGrammar::parse(Rule::top_level, input) {
        Ok(pairs) => pairs,
        Err(_) => {
            return vec![Token {
                kind: TokenKind::Unknown,
                span: 0..input.len(),
            }];
        }
    };

    let mut tokens = Vec::new();
    for pair in pairs.flatten() {
        let kind = match pair.as_rule() {
            Rule::type_code => TokenKind::TypeCode,
            Rule::role_suffix => TokenKind::RoleSuffix,
            Rule::var_name => TokenKind::Variable,
            Rule::wildcard => TokenKind::Wildcard,
            Rule::sequence_wildcard => TokenKind::SequenceWildcard,
            Rule::label => TokenKind::Label,
            Rule::edge | Rule::unordered_set | Rule::atom | Rule::variable | Rule::top_level => {
                continue
            }
            _ => continue,
        };
        let span = pair.as_span();
        tokens.push(Token {
            kind,
            span: span.start()..span.end(),
        });
    }

    // Fill punctuation/whitespace gaps so every byte is covered — the
    // highlighter contract is a total span partition.
    tokens.sort_by_key(|t| t.span.start);
    let mut filled = Vec::with_capacity(tokens.len() * 2);
    let mut cursor = 0;
    for token in tokens {
        if token.span.start > cursor {
            filled.push(gap_token(input, cursor..token.span.start));
        }
        cursor = token.span.end.max(cursor);
        filled.push(token);
    }
    if cursor < input.len() {
        filled.push(gap_token(input, cursor..input.len()));
    }
    filled
}

fn gap_token(input: &str, span: Range<usize>) -> Token {
    let text = &input[span.clone()];
    let kind = if text.chars().all(char::is_whitespace) {
        TokenKind::Whitespace
    } else if text.starts_with(';') {
        TokenKind::Comment
    } else {
        TokenKind::Punctuation
    };
    Token { kind, span }
}
