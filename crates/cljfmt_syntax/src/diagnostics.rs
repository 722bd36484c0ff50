//! Syntax diagnostics shared by the scanner and the tree builder.
//!
//! Both stages fail fast: the first error aborts the whole parse, so an error carries exactly one position and one
//! message. The `Display` form is a stable contract that downstream tooling may pattern-match on:
//!
//! ```text
//! <stage> error at <name>:<line>:<col>: <message>
//! ```

use std::fmt;

use miette::{Diagnostic, SourceSpan};
use thiserror::Error;

use crate::node::Pos;

/// Pipeline stage an error originated in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Lex,
    Parse,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::Lex => write!(f, "lex"),
            Stage::Parse => write!(f, "parse"),
        }
    }
}

/// A fatal scan or parse error.
#[derive(Debug, Error, Diagnostic)]
pub enum SyntaxError {
    #[error("{stage} error at {pos}: {message}")]
    #[diagnostic(code(cljfmt::syntax))]
    At {
        stage: Stage,
        pos: Pos,
        message: String,
        #[label("here")]
        span: SourceSpan,
    },

    #[error("error reading {path}: {source}")]
    #[diagnostic(code(cljfmt::io))]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

impl SyntaxError {
    /// Create a scanner error at `pos`.
    pub fn lex(pos: Pos, message: impl Into<String>) -> Self {
        Self::at(Stage::Lex, pos, message)
    }

    /// Create a tree-builder error at `pos`.
    pub fn parse(pos: Pos, message: impl Into<String>) -> Self {
        Self::at(Stage::Parse, pos, message)
    }

    fn at(stage: Stage, pos: Pos, message: impl Into<String>) -> Self {
        let span = SourceSpan::from((pos.offset, 1));
        Self::At {
            stage,
            pos,
            message: message.into(),
            span,
        }
    }

    /// The bare message, without the stage and position prefix.
    pub fn message(&self) -> String {
        match self {
            Self::At { message, .. } => message.clone(),
            Self::Io { source, .. } => source.to_string(),
        }
    }

    /// Position of the error, if it came from the scanner or the tree builder.
    pub fn pos(&self) -> Option<&Pos> {
        match self {
            Self::At { pos, .. } => Some(pos),
            Self::Io { .. } => None,
        }
    }

    /// Stage of the error, if it came from the scanner or the tree builder.
    pub fn stage(&self) -> Option<Stage> {
        match self {
            Self::At { stage, .. } => Some(*stage),
            Self::Io { .. } => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn pos(line: usize, col: usize) -> Pos {
        Pos {
            name: Arc::from("core.clj"),
            offset: 7,
            line,
            col,
        }
    }

    #[test]
    fn test_display_shape_lex() {
        let err = SyntaxError::lex(pos(3, 14), "reached EOF before string closing quote");
        assert_eq!(
            err.to_string(),
            "lex error at core.clj:3:14: reached EOF before string closing quote"
        );
        assert_eq!(err.stage(), Some(Stage::Lex));
    }

    #[test]
    fn test_display_shape_parse() {
        let err = SyntaxError::parse(pos(1, 2), "unexpected EOF");
        assert_eq!(err.to_string(), "parse error at core.clj:1:2: unexpected EOF");
        assert_eq!(err.message(), "unexpected EOF");
        assert_eq!(err.pos().map(|p| p.line), Some(1));
    }

    #[test]
    fn test_io_error_has_no_position() {
        let err = SyntaxError::Io {
            path: "missing.clj".to_string(),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "not found"),
        };
        assert!(err.pos().is_none());
        assert!(err.to_string().starts_with("error reading missing.clj"));
    }
}
