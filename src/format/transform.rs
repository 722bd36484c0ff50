//! Opt-in tree transforms run between parse and print.
//!
//! Each transform edits the tree through [`Tree::children`] and [`Tree::set_children`] only. None is enabled by
//! default, so a tree that skips this module prints exactly as it was parsed.

use std::collections::BTreeSet;
use std::fmt;

use cljfmt_syntax::{NodeError, NodeId, NodeKind, Tree};

/// A named tree transformation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Transform {
    /// Pull a closing delimiter up onto the line of the last form:
    ///
    /// ```text
    /// (foo bar       =>   (foo bar)
    ///  )
    /// ```
    RemoveTrailingNewlines,
    /// Move a defn arglist onto the name's line when the body starts on the line after it.
    FixDefnArglistNewline,
    /// Move a keyword dispatch value of a defmethod onto the name's line.
    FixDefmethodDispatchValNewline,
    /// Collapse runs of blank lines to a single blank line.
    RemoveExtraBlankLines,
}

impl Transform {
    /// Every transform, in the order [`apply`] runs them.
    pub const ALL: &'static [Transform] = &[
        Transform::RemoveTrailingNewlines,
        Transform::FixDefnArglistNewline,
        Transform::FixDefmethodDispatchValNewline,
        Transform::RemoveExtraBlankLines,
    ];

    /// Stable kebab-case name, as accepted by `--transform`.
    pub fn name(self) -> &'static str {
        match self {
            Transform::RemoveTrailingNewlines => "remove-trailing-newlines",
            Transform::FixDefnArglistNewline => "fix-defn-arglist-newline",
            Transform::FixDefmethodDispatchValNewline => "fix-defmethod-dispatch-val-newline",
            Transform::RemoveExtraBlankLines => "remove-extra-blank-lines",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|t| t.name() == name)
    }
}

impl fmt::Display for Transform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Run every enabled transform over `tree`, root by root.
///
/// ## Errors
/// Returns a [`NodeError`] if an edit is rejected by the node model. The edits below only ever replace the children
/// of composite nodes, so this indicates a tree that was built inconsistently.
pub fn apply(tree: &mut Tree, enabled: &BTreeSet<Transform>) -> Result<(), NodeError> {
    if enabled.is_empty() {
        return Ok(());
    }
    tracing::debug!(transforms = ?enabled, "applying transforms");

    let roots = tree.roots().to_vec();
    for &root in &roots {
        if enabled.contains(&Transform::RemoveTrailingNewlines) {
            remove_trailing_newlines(tree, root)?;
        }
        if enabled.contains(&Transform::FixDefnArglistNewline) && is_form(tree, root, "defn") {
            fix_defn_arglist(tree, root)?;
        }
        if enabled.contains(&Transform::FixDefmethodDispatchValNewline) && is_form(tree, root, "defmethod") {
            fix_defmethod_dispatch_val(tree, root)?;
        }
        if enabled.contains(&Transform::RemoveExtraBlankLines) {
            remove_extra_blank_lines_rec(tree, root)?;
        }
    }
    if enabled.contains(&Transform::RemoveExtraBlankLines) {
        let roots = remove_extra_blank_lines(tree, &roots);
        tree.set_roots(roots);
    }
    Ok(())
}

fn is_form(tree: &Tree, id: NodeId, head: &str) -> bool {
    let NodeKind::List(nodes) = tree.kind(id) else {
        return false;
    };
    nodes
        .first()
        .is_some_and(|&first| matches!(tree.kind(first), NodeKind::Symbol(s) if s == head))
}

fn is_newline(tree: &Tree, id: NodeId) -> bool {
    matches!(tree.kind(id), NodeKind::Newline)
}

fn remove_trailing_newlines(tree: &mut Tree, id: NodeId) -> Result<(), NodeError> {
    let mut nodes = tree.children(id).to_vec();
    if nodes.is_empty() {
        return Ok(());
    }
    if matches!(
        tree.kind(id),
        NodeKind::List(_) | NodeKind::Map { .. } | NodeKind::Vector(_) | NodeKind::FnLiteral(_) | NodeKind::Set(_)
    ) {
        while let Some(&last) = nodes.last() {
            // A comment would swallow the closing delimiter.
            if nodes.len() >= 2 && matches!(tree.kind(nodes[nodes.len() - 2]), NodeKind::Comment(_)) {
                break;
            }
            if !is_newline(tree, last) {
                break;
            }
            nodes.pop();
        }
        tree.set_children(id, nodes.clone())?;
    }
    for child in nodes {
        remove_trailing_newlines(tree, child)?;
    }
    Ok(())
}

fn fix_defn_arglist(tree: &mut Tree, defn: NodeId) -> Result<(), NodeError> {
    let mut nodes = tree.children(defn).to_vec();
    if nodes.len() < 5 {
        return Ok(());
    }
    if !is_newline(tree, nodes[2]) || is_newline(tree, nodes[4]) {
        return Ok(());
    }
    if !matches!(tree.kind(nodes[3]), NodeKind::Vector(_)) {
        return Ok(());
    }
    nodes.swap(2, 3);
    tree.set_children(defn, nodes)
}

fn fix_defmethod_dispatch_val(tree: &mut Tree, defmethod: NodeId) -> Result<(), NodeError> {
    let mut nodes = tree.children(defmethod).to_vec();
    if nodes.len() < 5 {
        return Ok(());
    }
    if !is_newline(tree, nodes[2]) || !matches!(tree.kind(nodes[3]), NodeKind::Keyword(_)) {
        return Ok(());
    }
    if is_newline(tree, nodes[4]) {
        nodes.remove(2);
    } else {
        nodes.swap(2, 3);
    }
    tree.set_children(defmethod, nodes)
}

fn remove_extra_blank_lines_rec(tree: &mut Tree, id: NodeId) -> Result<(), NodeError> {
    let mut nodes = tree.children(id).to_vec();
    if nodes.is_empty() {
        return Ok(());
    }
    if nodes.len() > 2 {
        nodes = remove_extra_blank_lines(tree, &nodes);
        tree.set_children(id, nodes.clone())?;
    }
    for child in nodes {
        remove_extra_blank_lines_rec(tree, child)?;
    }
    Ok(())
}

fn remove_extra_blank_lines(tree: &Tree, nodes: &[NodeId]) -> Vec<NodeId> {
    let mut out = Vec::with_capacity(nodes.len());
    let mut newlines = 0;
    for &id in nodes {
        if is_newline(tree, id) {
            newlines += 1;
        } else {
            newlines = 0;
        }
        if newlines <= 2 {
            out.push(id);
        }
    }
    out
}
