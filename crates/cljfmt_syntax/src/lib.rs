//! Full-fidelity syntax frontend for Clojure: scanner, tree builder, node model, diagnostics.
//!
//! The tree keeps every lexical detail the printer needs to reproduce a file byte for byte: comments, newlines, and
//! the exact spelling of dispatch forms and character literals.
//!
//! ## Notes
//! - This crate is "syntax-only": it does not resolve symbols or evaluate reader conditionals.
//! - Character classification and named character literals come from `cljfmt_core`.
//!
//! ## Examples
//! ```rust
//! use cljfmt_syntax::parser::{parse_str, ParseOptions};
//!
//! let tree = parse_str("user.clj", "(inc 1) ; one\n", ParseOptions::non_semantic()).unwrap();
//! let kinds: Vec<_> = tree.roots().iter().map(|&id| tree.describe(id)).collect();
//! assert_eq!(kinds, ["list(length=2)", "comment(\"; one\")", "newline"]);
//! ```

pub mod diagnostics;
pub mod lexer;
pub mod node;
pub mod parser;

pub use diagnostics::{Stage, SyntaxError};
pub use node::{Node, NodeError, NodeId, NodeKind, ParseOptions, Pos, Tree};
