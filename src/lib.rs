#![forbid(unsafe_code)]
//! cljfmt: a full-fidelity Clojure formatter
//!
//! The syntax frontend lives in `cljfmt_syntax` (scanner, tree builder, node model) and the indentation vocabulary in
//! `cljfmt_core`. This crate adds the printer, the `.cljfmt` loader, the opt-in tree transforms and the command line.
//!
//! ## Panic Policy
//!
//! This codebase follows explicit error handling:
//!
//! - **Production code**: Use `Result` or `Option` with `?` / `ok_or` / `map_err`. The `cli` module enforces
//!   `#![deny(clippy::unwrap_used)]`.
//!
//! - **Test code**: `.unwrap()` and `.expect()` are acceptable in tests.
//!
//! - **True invariants**: If a panic represents a formatter bug (logic error), use `.expect("INVARIANT: reason")` with
//!   a clear explanation.

pub mod cli;
pub mod format;

pub use cljfmt_syntax::{ParseOptions, SyntaxError, Tree};

pub use format::{
    FormatConfig, FormatError, Transform, check_formatted, format_diff, format_source, format_source_with_config,
};
