//! `.cljfmt` configuration file loader.
//!
//! The file is itself Clojure data, read with the crate's own parser:
//!
//! ```text
//! {:indent-overrides ["delete" :list-body
//!                     ["foo.core/defthing" "defthing"] :list-body]}
//! ```

use std::collections::BTreeMap;
use std::path::Path;

use cljfmt_core::IndentStyle;
use cljfmt_syntax::parser::{parse_file, parse_str};
use cljfmt_syntax::{NodeId, NodeKind, ParseOptions, Pos, SyntaxError, Tree};
use thiserror::Error;

/// Errors found while reading a `.cljfmt` file.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error(transparent)]
    Syntax(#[from] SyntaxError),

    #[error("found unexpected node ({kind}) at {pos}")]
    UnexpectedNode { kind: &'static str, pos: Pos },

    #[error("map value at {pos} has odd number of children")]
    OddMap { pos: Pos },

    #[error(":indent-overrides value has odd number of children")]
    OddOverrides,

    #[error("unknown indent style {0:?}")]
    UnknownStyle(String),
}

pub type ConfigResult<T> = Result<T, ConfigError>;

/// Read and parse a `.cljfmt` file.
///
/// ## Errors
/// [`ConfigError::Syntax`] wraps both read failures and malformed Clojure; the other variants describe a
/// well-formed file with the wrong shape.
#[tracing::instrument(skip_all, fields(path = %path.as_ref().display()))]
pub fn load_dot_config(path: impl AsRef<Path>) -> ConfigResult<BTreeMap<String, IndentStyle>> {
    let tree = parse_file(path, ParseOptions::new())?;
    let overrides = overrides_from_tree(&tree)?;
    tracing::debug!(overrides = overrides.len(), "loaded indent overrides");
    Ok(overrides)
}

/// Parse `.cljfmt` content held in memory.
///
/// `name` is only used in positions.
pub fn parse_dot_config(name: &str, source: &str) -> ConfigResult<BTreeMap<String, IndentStyle>> {
    // Semantic mode: no comments or newlines to step around.
    let tree = parse_str(name, source, ParseOptions::new())?;
    overrides_from_tree(&tree)
}

fn overrides_from_tree(tree: &Tree) -> ConfigResult<BTreeMap<String, IndentStyle>> {
    let roots = tree.roots();
    let Some(&root) = roots.first() else {
        return Ok(BTreeMap::new());
    };
    if let Some(&extra) = roots.get(1) {
        return Err(unexpected(tree, extra));
    }
    let NodeKind::Map { nodes, .. } = tree.kind(root) else {
        return Err(unexpected(tree, root));
    };
    if nodes.len() % 2 != 0 {
        return Err(ConfigError::OddMap {
            pos: tree.pos(root).clone(),
        });
    }
    for pair in nodes.chunks_exact(2) {
        if matches!(tree.kind(pair[0]), NodeKind::Keyword(k) if k == ":indent-overrides") {
            return parse_indent_overrides(tree, sequence(tree, pair[1])?);
        }
    }
    Ok(BTreeMap::new())
}

fn parse_indent_overrides(tree: &Tree, nodes: &[NodeId]) -> ConfigResult<BTreeMap<String, IndentStyle>> {
    if nodes.len() % 2 != 0 {
        return Err(ConfigError::OddOverrides);
    }
    let mut overrides = BTreeMap::new();
    for pair in nodes.chunks_exact(2) {
        let names = match sequence(tree, pair[0]) {
            Ok(seq) => seq.iter().map(|&n| string(tree, n)).collect::<ConfigResult<Vec<_>>>()?,
            Err(_) => vec![string(tree, pair[0])?],
        };
        let NodeKind::Keyword(kw) = tree.kind(pair[1]) else {
            return Err(unexpected(tree, pair[1]));
        };
        let style = IndentStyle::from_keyword(kw).ok_or_else(|| ConfigError::UnknownStyle(kw.clone()))?;
        for name in names {
            overrides.insert(name, style);
        }
    }
    Ok(overrides)
}

fn sequence(tree: &Tree, id: NodeId) -> ConfigResult<&[NodeId]> {
    match tree.kind(id) {
        NodeKind::List(nodes) | NodeKind::Vector(nodes) => Ok(nodes),
        _ => Err(unexpected(tree, id)),
    }
}

fn string(tree: &Tree, id: NodeId) -> ConfigResult<String> {
    match tree.kind(id) {
        NodeKind::String(s) => Ok(s.clone()),
        _ => Err(unexpected(tree, id)),
    }
}

fn unexpected(tree: &Tree, id: NodeId) -> ConfigError {
    ConfigError::UnexpectedNode {
        kind: tree.kind(id).kind_name(),
        pos: tree.pos(id).clone(),
    }
}
