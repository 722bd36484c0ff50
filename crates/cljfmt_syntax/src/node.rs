//! Concrete syntax tree for Clojure source.
//!
//! Nodes live in an arena owned by [`Tree`] and refer to each other through [`NodeId`]s. A composite node owns the
//! ordered list of its children's ids; a child id appears in exactly one such list. Every node also records a
//! non-owning `parent` link, set when the parent is allocated.
//!
//! ## Notes
//! - Comment and newline nodes are "non-semantic": they exist only when the tree was parsed with
//!   [`ParseOptions::include_non_semantic`], and they ride along inside composite children lists so the printer can
//!   reproduce the original layout.
//! - Forms suppressed by the parser options (`(comment ...)`, `#_x`, non-semantic nodes) may still occupy arena
//!   slots, but they are unreachable from [`Tree::roots`].

use std::fmt;
use std::sync::Arc;

use thiserror::Error;

// ============================================================================
// Positions
// ============================================================================

/// A position in source text.
///
/// `line` and `col` are 1-based. `col` advances by the UTF-8 width of each character, matching `offset`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Pos {
    pub name: Arc<str>,
    pub offset: usize,
    pub line: usize,
    pub col: usize,
}

impl Pos {
    /// Position of the first character of `name`.
    pub fn start(name: Arc<str>) -> Self {
        Self {
            name,
            offset: 0,
            line: 1,
            col: 1,
        }
    }
}

impl fmt::Display for Pos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.name, self.line, self.col)
    }
}

// ============================================================================
// Parse options
// ============================================================================

/// Options recorded on a [`Tree`] describing how it was built.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ParseOptions {
    /// Keep comment and newline nodes in the tree.
    pub include_non_semantic: bool,
    /// Drop `(comment ...)` forms entirely.
    pub ignore_comment_forms: bool,
    /// Drop `#_`-discarded forms entirely.
    pub ignore_reader_discard: bool,
}

impl ParseOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Options for lossless round-tripping: non-semantic nodes are kept and nothing is suppressed.
    pub fn non_semantic() -> Self {
        Self::new().with_include_non_semantic(true)
    }

    pub fn with_include_non_semantic(mut self, value: bool) -> Self {
        self.include_non_semantic = value;
        self
    }

    pub fn with_ignore_comment_forms(mut self, value: bool) -> Self {
        self.ignore_comment_forms = value;
        self
    }

    pub fn with_ignore_reader_discard(mut self, value: bool) -> Self {
        self.ignore_reader_discard = value;
        self
    }
}

// ============================================================================
// Nodes
// ============================================================================

/// Index of a node inside its [`Tree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u32);

impl NodeId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// The variant and payload of a node.
///
/// Wrapper variants (`Deref`, `Metadata`, `Quote`, `SyntaxQuote`, `Unquote`, `UnquoteSplice`, `ReaderDiscard`,
/// `ReaderEval`) hold exactly one child. Composite variants hold an ordered child list. Everything else is a leaf.
///
/// `Metadata` holds only the metadata form: in `^String x` the `x` is the metadata node's following sibling, and in
/// `#inst "..."` the string follows the `Tag` the same way.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
    Bool(bool),
    /// A decoded character literal plus its source spelling (including the backslash).
    Character { value: char, text: String },
    /// Comment text including the leading `;` (or `#!`).
    Comment(String),
    Deref(NodeId),
    FnLiteral(Vec<NodeId>),
    /// Keyword text including the leading colon(s).
    Keyword(String),
    List(Vec<NodeId>),
    /// `namespace` is `Some` only for `#:ns{...}` and `#::{...}` literals and holds the keyword text (`:ns`, `::`).
    Map {
        namespace: Option<String>,
        nodes: Vec<NodeId>,
    },
    Metadata(NodeId),
    Newline,
    Nil,
    /// Raw numeric text. Not validated.
    Number(String),
    Quote(NodeId),
    ReaderCond(Vec<NodeId>),
    ReaderCondSplice(Vec<NodeId>),
    ReaderDiscard(NodeId),
    ReaderEval(NodeId),
    /// Regex body between the quotes, escapes intact.
    Regex(String),
    Set(Vec<NodeId>),
    /// String body between the quotes, escapes intact.
    String(String),
    Symbol(String),
    SyntaxQuote(NodeId),
    Tag(String),
    Unquote(NodeId),
    UnquoteSplice(NodeId),
    VarQuote(String),
    Vector(Vec<NodeId>),
}

impl NodeKind {
    /// Stable type name, used in diagnostics.
    pub fn kind_name(&self) -> &'static str {
        match self {
            NodeKind::Bool(_) => "BoolNode",
            NodeKind::Character { .. } => "CharacterNode",
            NodeKind::Comment(_) => "CommentNode",
            NodeKind::Deref(_) => "DerefNode",
            NodeKind::FnLiteral(_) => "FnLiteralNode",
            NodeKind::Keyword(_) => "KeywordNode",
            NodeKind::List(_) => "ListNode",
            NodeKind::Map { .. } => "MapNode",
            NodeKind::Metadata(_) => "MetadataNode",
            NodeKind::Newline => "NewlineNode",
            NodeKind::Nil => "NilNode",
            NodeKind::Number(_) => "NumberNode",
            NodeKind::Quote(_) => "QuoteNode",
            NodeKind::ReaderCond(_) => "ReaderCondNode",
            NodeKind::ReaderCondSplice(_) => "ReaderCondSpliceNode",
            NodeKind::ReaderDiscard(_) => "ReaderDiscardNode",
            NodeKind::ReaderEval(_) => "ReaderEvalNode",
            NodeKind::Regex(_) => "RegexNode",
            NodeKind::Set(_) => "SetNode",
            NodeKind::String(_) => "StringNode",
            NodeKind::Symbol(_) => "SymbolNode",
            NodeKind::SyntaxQuote(_) => "SyntaxQuoteNode",
            NodeKind::Tag(_) => "TagNode",
            NodeKind::Unquote(_) => "UnquoteNode",
            NodeKind::UnquoteSplice(_) => "UnquoteSpliceNode",
            NodeKind::VarQuote(_) => "VarQuoteNode",
            NodeKind::Vector(_) => "VectorNode",
        }
    }

    /// Whether the node affects program meaning. Only comments and newlines do not.
    pub fn is_semantic(&self) -> bool {
        !matches!(self, NodeKind::Comment(_) | NodeKind::Newline)
    }

    /// Children of this node, in order. Empty for leaves.
    pub fn children(&self) -> &[NodeId] {
        match self {
            NodeKind::Deref(child)
            | NodeKind::Metadata(child)
            | NodeKind::Quote(child)
            | NodeKind::ReaderDiscard(child)
            | NodeKind::ReaderEval(child)
            | NodeKind::SyntaxQuote(child)
            | NodeKind::Unquote(child)
            | NodeKind::UnquoteSplice(child) => std::slice::from_ref(child),
            NodeKind::FnLiteral(nodes)
            | NodeKind::List(nodes)
            | NodeKind::Map { nodes, .. }
            | NodeKind::ReaderCond(nodes)
            | NodeKind::ReaderCondSplice(nodes)
            | NodeKind::Set(nodes)
            | NodeKind::Vector(nodes) => nodes,
            _ => &[],
        }
    }

    fn wrapped_mut(&mut self) -> Option<&mut NodeId> {
        match self {
            NodeKind::Deref(child)
            | NodeKind::Metadata(child)
            | NodeKind::Quote(child)
            | NodeKind::ReaderDiscard(child)
            | NodeKind::ReaderEval(child)
            | NodeKind::SyntaxQuote(child)
            | NodeKind::Unquote(child)
            | NodeKind::UnquoteSplice(child) => Some(child),
            _ => None,
        }
    }

    fn sequence_mut(&mut self) -> Option<&mut Vec<NodeId>> {
        match self {
            NodeKind::FnLiteral(nodes)
            | NodeKind::List(nodes)
            | NodeKind::Map { nodes, .. }
            | NodeKind::ReaderCond(nodes)
            | NodeKind::ReaderCondSplice(nodes)
            | NodeKind::Set(nodes)
            | NodeKind::Vector(nodes) => Some(nodes),
            _ => None,
        }
    }
}

/// One node: position, payload, and the non-owning link to its parent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    pub pos: Pos,
    pub kind: NodeKind,
    parent: Option<NodeId>,
}

impl Node {
    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }
}

/// Errors from structural edits through [`Tree::set_children`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NodeError {
    #[error("cannot set children of leaf node {kind}")]
    Leaf { kind: &'static str },

    #[error("{kind} must have exactly one child, got {count}")]
    WrapperArity { kind: &'static str, count: usize },
}

// ============================================================================
// Tree
// ============================================================================

/// A parsed file: the node arena, the ordered root ids, and the options used to build it.
#[derive(Debug, Clone, Default)]
pub struct Tree {
    nodes: Vec<Node>,
    roots: Vec<NodeId>,
    options: ParseOptions,
}

impl Tree {
    pub fn new(options: ParseOptions) -> Self {
        Self {
            nodes: Vec::new(),
            roots: Vec::new(),
            options,
        }
    }

    pub fn options(&self) -> ParseOptions {
        self.options
    }

    pub fn roots(&self) -> &[NodeId] {
        &self.roots
    }

    /// Replace the root list. Roots never have parents.
    pub fn set_roots(&mut self, roots: Vec<NodeId>) {
        for &id in &roots {
            self.nodes[id.index()].parent = None;
        }
        self.roots = roots;
    }

    pub(crate) fn push_root(&mut self, id: NodeId) {
        self.roots.push(id);
    }

    /// Number of nodes in the arena, reachable or not.
    pub fn arena_len(&self) -> usize {
        self.nodes.len()
    }

    /// Allocate a node, linking each of its children back to it.
    ///
    /// ## Panics
    /// Panics if the arena outgrows `u32` ids.
    pub fn alloc(&mut self, pos: Pos, kind: NodeKind) -> NodeId {
        let id = match u32::try_from(self.nodes.len()) {
            Ok(raw) => NodeId(raw),
            Err(_) => panic!("syntax tree exceeded {} nodes", u32::MAX),
        };
        for &child in kind.children() {
            self.nodes[child.index()].parent = Some(id);
        }
        self.nodes.push(Node {
            pos,
            kind,
            parent: None,
        });
        id
    }

    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.index()]
    }

    pub fn kind(&self, id: NodeId) -> &NodeKind {
        &self.nodes[id.index()].kind
    }

    pub fn pos(&self, id: NodeId) -> &Pos {
        &self.nodes[id.index()].pos
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id.index()].parent
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.kind(id).children()
    }

    /// Replace a node's children wholesale, re-linking the parent of every new child.
    ///
    /// ## Errors
    /// - [`NodeError::Leaf`] for leaf kinds.
    /// - [`NodeError::WrapperArity`] when a wrapper kind is given anything but exactly one child.
    pub fn set_children(&mut self, id: NodeId, children: Vec<NodeId>) -> Result<(), NodeError> {
        let kind = &mut self.nodes[id.index()].kind;
        let name = kind.kind_name();
        if let Some(slot) = kind.wrapped_mut() {
            let [child] = children.as_slice() else {
                return Err(NodeError::WrapperArity {
                    kind: name,
                    count: children.len(),
                });
            };
            *slot = *child;
        } else if let Some(nodes) = kind.sequence_mut() {
            nodes.clone_from(&children);
        } else {
            return Err(NodeError::Leaf { kind: name });
        }
        for child in children {
            self.nodes[child.index()].parent = Some(id);
        }
        Ok(())
    }

    /// Number of semantic (non-comment, non-newline) nodes among `ids`.
    pub fn count_semantic(&self, ids: &[NodeId]) -> usize {
        ids.iter().filter(|&&id| self.kind(id).is_semantic()).count()
    }

    /// Number of forms among a map's children that take part in key/value pairing.
    ///
    /// Metadata, tags, and discarded forms attach to a neighbor rather than standing alone.
    pub fn count_paired(&self, ids: &[NodeId]) -> usize {
        ids.iter()
            .filter(|&&id| {
                !matches!(
                    self.kind(id),
                    NodeKind::Comment(_)
                        | NodeKind::Newline
                        | NodeKind::Metadata(_)
                        | NodeKind::Tag(_)
                        | NodeKind::ReaderDiscard(_)
                )
            })
            .count()
    }

    /// Whether `id` is a list whose first child is the symbol `comment`.
    pub fn is_comment_form(&self, id: NodeId) -> bool {
        let NodeKind::List(nodes) = self.kind(id) else {
            return false;
        };
        nodes
            .first()
            .is_some_and(|&first| matches!(self.kind(first), NodeKind::Symbol(s) if s == "comment"))
    }

    /// A short, non-recursive description of a node, for tests and debugging.
    ///
    /// ```text
    /// list(length=3)   keyword(:foo)   map(ns=:foo, length=1)   char('s')
    /// ```
    pub fn describe(&self, id: NodeId) -> String {
        match self.kind(id) {
            NodeKind::Bool(true) => "true".to_string(),
            NodeKind::Bool(false) => "false".to_string(),
            NodeKind::Character { value, .. } => format!("char({value:?})"),
            NodeKind::Comment(text) => format!("comment({text:?})"),
            NodeKind::Deref(_) => "deref".to_string(),
            NodeKind::FnLiteral(nodes) => format!("lambda(length={})", self.count_semantic(nodes)),
            NodeKind::Keyword(text) => format!("keyword({text})"),
            NodeKind::List(nodes) => format!("list(length={})", self.count_semantic(nodes)),
            NodeKind::Map { namespace, nodes } => {
                let length = self.count_paired(nodes) / 2;
                match namespace {
                    Some(ns) => format!("map(ns={ns}, length={length})"),
                    None => format!("map(length={length})"),
                }
            }
            NodeKind::Metadata(_) => "metadata".to_string(),
            NodeKind::Newline => "newline".to_string(),
            NodeKind::Nil => "nil".to_string(),
            NodeKind::Number(text) => format!("num({text})"),
            NodeKind::Quote(_) => "quote".to_string(),
            NodeKind::ReaderCond(nodes) => format!("reader-cond(length={})", self.count_semantic(nodes)),
            NodeKind::ReaderCondSplice(nodes) => {
                format!("reader-cond-splice(length={})", self.count_semantic(nodes))
            }
            NodeKind::ReaderDiscard(_) => "discard".to_string(),
            NodeKind::ReaderEval(_) => "eval".to_string(),
            NodeKind::Regex(text) => format!("regex({text:?})"),
            NodeKind::Set(nodes) => format!("set(length={})", self.count_semantic(nodes)),
            NodeKind::String(text) => format!("string({text:?})"),
            NodeKind::Symbol(text) => format!("sym({text})"),
            NodeKind::SyntaxQuote(_) => "syntax quote".to_string(),
            NodeKind::Tag(text) => format!("tag({text})"),
            NodeKind::Unquote(_) => "unquote".to_string(),
            NodeKind::UnquoteSplice(_) => "unquote splice".to_string(),
            NodeKind::VarQuote(text) => format!("varquote({text})"),
            NodeKind::Vector(nodes) => format!("vector(length={})", self.count_semantic(nodes)),
        }
    }

    /// Every node reachable from the roots, depth-first in document order.
    pub fn flatten(&self) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack: Vec<NodeId> = self.roots.iter().rev().copied().collect();
        while let Some(id) = stack.pop() {
            out.push(id);
            stack.extend(self.children(id).iter().rev().copied());
        }
        out
    }

    /// Indented multi-line dump of the whole tree using [`Tree::describe`].
    pub fn dump(&self) -> String {
        let mut out = String::new();
        for &root in &self.roots {
            self.dump_node(root, 0, &mut out);
        }
        out
    }

    fn dump_node(&self, id: NodeId, depth: usize, out: &mut String) {
        out.push_str(&"  ".repeat(depth));
        out.push_str(&self.describe(id));
        out.push('\n');
        for &child in self.children(id) {
            self.dump_node(child, depth + 1, out);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pos() -> Pos {
        Pos::start(Arc::from("test"))
    }

    fn sym(tree: &mut Tree, name: &str) -> NodeId {
        tree.alloc(pos(), NodeKind::Symbol(name.to_string()))
    }

    #[test]
    fn test_alloc_links_parents() {
        let mut tree = Tree::new(ParseOptions::default());
        let a = sym(&mut tree, "a");
        let b = sym(&mut tree, "b");
        let list = tree.alloc(pos(), NodeKind::List(vec![a, b]));
        assert_eq!(tree.parent(a), Some(list));
        assert_eq!(tree.parent(b), Some(list));
        assert_eq!(tree.parent(list), None);
        assert_eq!(tree.children(list), &[a, b]);
    }

    #[test]
    fn test_set_children_relinks_parents() {
        let mut tree = Tree::new(ParseOptions::default());
        let a = sym(&mut tree, "a");
        let list = tree.alloc(pos(), NodeKind::List(vec![a]));
        let b = sym(&mut tree, "b");
        let c = sym(&mut tree, "c");
        tree.set_children(list, vec![b, c]).unwrap();
        assert_eq!(tree.children(list), &[b, c]);
        assert_eq!(tree.parent(b), Some(list));
        assert_eq!(tree.parent(c), Some(list));
        assert_eq!(tree.describe(list), "list(length=2)");
    }

    #[test]
    fn test_set_children_rejects_leaf() {
        let mut tree = Tree::new(ParseOptions::default());
        let a = sym(&mut tree, "a");
        let b = sym(&mut tree, "b");
        let err = tree.set_children(a, vec![b]).unwrap_err();
        assert_eq!(err, NodeError::Leaf { kind: "SymbolNode" });
    }

    #[test]
    fn test_set_children_wrapper_arity() {
        let mut tree = Tree::new(ParseOptions::default());
        let a = sym(&mut tree, "a");
        let quote = tree.alloc(pos(), NodeKind::Quote(a));
        let err = tree.set_children(quote, vec![]).unwrap_err();
        assert_eq!(err.to_string(), "QuoteNode must have exactly one child, got 0");

        let b = sym(&mut tree, "b");
        tree.set_children(quote, vec![b]).unwrap();
        assert_eq!(tree.children(quote), &[b]);
        assert_eq!(tree.parent(b), Some(quote));
    }

    #[test]
    fn test_describe_counts_only_semantic_children() {
        let mut tree = Tree::new(ParseOptions::non_semantic());
        let a = sym(&mut tree, "a");
        let nl = tree.alloc(pos(), NodeKind::Newline);
        let c = tree.alloc(pos(), NodeKind::Comment("; x".to_string()));
        let v = tree.alloc(pos(), NodeKind::Vector(vec![a, nl, c]));
        assert_eq!(tree.describe(v), "vector(length=1)");
        assert_eq!(tree.describe(c), "comment(\"; x\")");
    }

    #[test]
    fn test_flatten_document_order() {
        let mut tree = Tree::new(ParseOptions::default());
        let a = sym(&mut tree, "a");
        let b = sym(&mut tree, "b");
        let inner = tree.alloc(pos(), NodeKind::Vector(vec![b]));
        let outer = tree.alloc(pos(), NodeKind::List(vec![a, inner]));
        let c = sym(&mut tree, "c");
        tree.set_roots(vec![outer, c]);
        assert_eq!(tree.flatten(), vec![outer, a, inner, b, c]);
        assert_eq!(tree.dump(), "list(length=2)\n  sym(a)\n  vector(length=1)\n    sym(b)\nsym(c)\n");
    }
}
