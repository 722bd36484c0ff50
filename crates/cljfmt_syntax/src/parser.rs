//! Tree builder for Clojure source
//!
//! Consumes the scanner's token stream with one token of lookahead and assembles a [`Tree`]. All grammar decisions
//! live here: what follows a quote, what terminates a list, how namespaced maps and reader conditionals nest, and
//! how character literals decode.
//!
//! ## Examples
//!
//! ```rust
//! use cljfmt_syntax::parser::{self, ParseOptions};
//!
//! let tree = parser::parse_str("core.clj", "(defn f [x]\n  x)", ParseOptions::non_semantic()).unwrap();
//! assert_eq!(tree.roots().len(), 1);
//! assert_eq!(tree.describe(tree.roots()[0]), "list(length=4)");
//! ```

use std::path::Path;

use crate::diagnostics::SyntaxError;
use crate::lexer::{Lexer, Token, TokenKind};
use crate::node::{NodeId, NodeKind, Pos, Tree};
use cljfmt_core::chars;

pub use crate::node::ParseOptions;

// NOTE: This module is split across multiple files using `include!` to keep all parser
// methods in the same Rust module (preserving privacy + call patterns) while avoiding
// a single large source file.

include!("parser/core.rs");
include!("parser/forms.rs");
include!("parser/dispatch.rs");
include!("parser/api.rs");
include!("parser/tests.rs");
