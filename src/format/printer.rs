//! Indentation printer
//!
//! Renders a [`Tree`] back to text. Horizontal whitespace is never taken from the source: every line break comes
//! from a newline node, and the indentation after it is recomputed from the enclosing form's [`IndentStyle`].
//!
//! The printer makes three read-only passes over the tree before printing anything:
//! - `(ns ... (:require ...))` forms are scanned for `:as` aliases and `:refer`red names, so that `str/join` or a
//!   referred `join` can resolve to an override written as `clojure.string/join`;
//! - threading macros mark the lists they thread into;
//! - `def`-like forms mark their docstring.
//!
//! List-specific marks made while printing (binding vectors, `letfn` specs, `deftype` methods) are keyed by
//! [`NodeId`] and consumed when the marked node is printed.

use std::collections::{HashMap, HashSet};
use std::io;

use cljfmt_core::indent::prefix_indent;
use cljfmt_core::{IndentStyle, ThreadFirstStyle, split_qualified, symbol_name};
use cljfmt_syntax::{NodeError, NodeId, NodeKind, Pos, SyntaxError, Tree};
use thiserror::Error;

use super::config::{FormatConfig, IndentTable};
use super::writer::FormatWriter;

/// Errors produced while formatting.
#[derive(Debug, Error)]
pub enum FormatError {
    #[error(transparent)]
    Syntax(#[from] SyntaxError),

    /// A node kind reached a printing path that cannot render it. This is a tree-construction bug, never bad input.
    #[error("{pos}: unhandled node type {kind}")]
    UnhandledNode { pos: Pos, kind: &'static str },

    #[error("transform failed: {0}")]
    Transform(#[from] NodeError),

    #[error("error writing output: {0}")]
    Io(#[from] io::Error),
}

/// A leading comment longer than this does not set the alignment column of a `list` form.
const LONG_COMMENT: usize = 12;

/// Heads whose form may carry a docstring after the defined symbol.
const DOCSTRING_FORMS: &[&str] = &["ns", "defmulti", "def", "defmacro", "defn"];

/// How [`Printer::print_sequence`] positions continuation lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Layout {
    Normal,
    List,
    ListBody,
    /// Alternating name/value pairs: a value that starts a line gets two extra columns.
    Bindings,
    /// `ListBody` whose arguments after the first `leading` are test/expression pairs.
    /// `condp` additionally reads `test :>> result` triples.
    Cond { leading: usize, condp: bool },
}

impl From<IndentStyle> for Layout {
    fn from(style: IndentStyle) -> Self {
        if let Some(leading) = style.cond_leading_args() {
            return Layout::Cond { leading, condp: false };
        }
        match style {
            IndentStyle::Normal => Layout::Normal,
            IndentStyle::List => Layout::List,
            _ => Layout::ListBody,
        }
    }
}

/// Semantic position tracking for [`Layout::Bindings`] and [`Layout::Cond`].
#[derive(Debug, Default)]
struct Pairing {
    idx_semantic: usize,
    paired: usize,
    extra_indent: bool,
}

impl Pairing {
    fn count(&mut self, layout: Layout, kind: &NodeKind) {
        self.idx_semantic += 1;
        if let Layout::Cond { leading, condp } = layout {
            // `test :>> result` is a triple in condp: the marker does not advance the pairing.
            let condp_arrow =
                condp && self.paired % 2 == 1 && matches!(kind, NodeKind::Keyword(k) if k == ":>>");
            if self.idx_semantic > leading + 1 && !condp_arrow {
                self.paired += 1;
            }
        }
    }

    /// Columns to add to the base indent at a newline found at index `i`.
    fn newline_indent(&mut self, layout: Layout, i: usize) -> usize {
        match layout {
            Layout::List | Layout::ListBody | Layout::Cond { .. } if i == 1 => 1,
            Layout::Bindings if self.idx_semantic % 2 == 1 && !self.extra_indent => {
                self.extra_indent = true;
                2
            }
            Layout::Cond { .. } if self.paired % 2 == 1 && !self.extra_indent => {
                self.extra_indent = true;
                2
            }
            _ => 0,
        }
    }

    /// Columns to take back once the element that received the extra indent is printed.
    fn take_extra_indent(&mut self) -> usize {
        if std::mem::take(&mut self.extra_indent) { 2 } else { 0 }
    }
}

/// Prints one tree. Construct a new printer per tree.
pub struct Printer<'t> {
    tree: &'t Tree,
    writer: FormatWriter,
    table: IndentTable,

    /// List styles pushed down by an enclosing form.
    special: HashMap<NodeId, IndentStyle>,
    /// Vectors printed with [`Layout::Bindings`].
    bindings: HashSet<NodeId>,
    /// Lists in a threaded position.
    thread_first: HashSet<NodeId>,
    docstrings: HashSet<NodeId>,
    /// `:as` alias to namespace.
    requires: HashMap<String, String>,
    /// `:refer`red name to namespace.
    refers: HashMap<String, String>,
}

impl<'t> Printer<'t> {
    pub fn new(tree: &'t Tree, config: &FormatConfig) -> Self {
        let mut printer = Self {
            tree,
            writer: FormatWriter::new(config.indent_char),
            table: IndentTable::for_config(config),
            special: HashMap::new(),
            bindings: HashSet::new(),
            thread_first: HashSet::new(),
            docstrings: HashSet::new(),
            requires: HashMap::new(),
            refers: HashMap::new(),
        };
        for &root in tree.roots() {
            printer.mark_requires(root);
            printer.mark_forms(root);
        }
        tracing::trace!(
            aliases = printer.requires.len(),
            refers = printer.refers.len(),
            threaded = printer.thread_first.len(),
            docstrings = printer.docstrings.len(),
            "printer pre-passes done"
        );
        printer
    }

    /// Print every root and return the output.
    pub fn print(mut self) -> Result<String, FormatError> {
        let tree = self.tree;
        self.print_sequence(tree.roots(), 0, Layout::Normal, false)?;
        Ok(self.writer.finish())
    }

    // ========================================================================
    // Pre-passes
    // ========================================================================

    fn mark_requires(&mut self, root: NodeId) {
        let tree = self.tree;
        let Some(("ns", nodes)) = head_symbol(tree, root) else {
            return;
        };
        for &clause in nodes {
            let NodeKind::List(clause_nodes) = tree.kind(clause) else {
                continue;
            };
            let is_require = clause_nodes
                .first()
                .is_some_and(|&first| matches!(tree.kind(first), NodeKind::Keyword(k) if k == ":require"));
            if !is_require {
                continue;
            }
            for &spec in clause_nodes.iter().skip(1) {
                let Some(require) = parse_require(tree, spec) else {
                    continue;
                };
                if let Some(alias) = require.alias {
                    self.requires.insert(alias.to_string(), require.name.to_string());
                }
                for name in require.refer {
                    self.refers.insert(name.to_string(), require.name.to_string());
                }
            }
        }
    }

    /// Thread-first and docstring marking, top-down so that an outer threading form marks before an inner one.
    fn mark_forms(&mut self, id: NodeId) {
        let tree = self.tree;
        if let Some((head, nodes)) = head_symbol(tree, id) {
            if let Some(style) = self.table.thread_first(head) {
                self.mark_thread_first_style(id, nodes, style);
            }
            if DOCSTRING_FORMS.contains(&head) {
                self.mark_docstring(nodes);
            }
        }
        for &child in tree.children(id) {
            self.mark_forms(child);
        }
    }

    fn mark_thread_first_style(&mut self, form: NodeId, nodes: &[NodeId], style: ThreadFirstStyle) {
        let tree = self.tree;
        // A threading form that is itself threaded into has lost its first argument too.
        let begin = if self.thread_first.contains(&form) { 1 } else { 2 };
        let mut idx = 0;
        for &id in nodes {
            let kind = tree.kind(id);
            if !kind.is_semantic() {
                continue;
            }
            if matches!(kind, NodeKind::List(_)) && idx >= begin {
                let threaded = match style {
                    ThreadFirstStyle::Normal => true,
                    // Only the second of each test/form pair.
                    ThreadFirstStyle::CondArrow => (idx - begin) % 2 == 1,
                };
                if threaded {
                    self.thread_first.insert(id);
                }
            }
            idx += 1;
        }
    }

    fn mark_docstring(&mut self, nodes: &[NodeId]) {
        let tree = self.tree;
        if nodes.len() < 3 || !matches!(tree.kind(nodes[1]), NodeKind::Symbol(_)) {
            return;
        }
        for &id in &nodes[2..] {
            match tree.kind(id) {
                NodeKind::String(_) => {
                    self.docstrings.insert(id);
                    return;
                }
                NodeKind::Newline => continue,
                _ => return,
            }
        }
    }

    // ========================================================================
    // Style resolution
    // ========================================================================

    fn resolve_list_style(&self, nodes: &[NodeId]) -> IndentStyle {
        let Some(&head) = nodes.first() else {
            return IndentStyle::Normal;
        };
        match self.tree.kind(head) {
            NodeKind::Keyword(_) => IndentStyle::List,
            NodeKind::Symbol(sym) => self.lookup(sym).unwrap_or(IndentStyle::List),
            _ => IndentStyle::Normal,
        }
    }

    /// Exact name, then the namespace-resolved name, then the bare name, then the prefix heuristic.
    fn lookup(&self, sym: &str) -> Option<IndentStyle> {
        if let Some(style) = self.table.style(sym) {
            return Some(style);
        }
        let resolved = match split_qualified(sym) {
            Some((alias, name)) => self.requires.get(alias).map(|ns| format!("{ns}/{name}")),
            None => self.refers.get(sym).map(|ns| format!("{ns}/{sym}")),
        };
        if let Some(style) = resolved.and_then(|qualified| self.table.style(&qualified)) {
            return Some(style);
        }
        let name = symbol_name(sym);
        self.table.style(name).or_else(|| prefix_indent(name))
    }

    fn apply_special_rules(&mut self, style: IndentStyle, nodes: &[NodeId]) {
        let tree = self.tree;
        match style {
            IndentStyle::Let | IndentStyle::For => {
                let Some(vector) = first_vector(tree, nodes) else {
                    return;
                };
                self.bindings.insert(vector);
                if style == IndentStyle::For {
                    self.mark_let_modifiers(vector);
                }
            }
            IndentStyle::Letfn => {
                let Some(vector) = first_vector(tree, nodes) else {
                    return;
                };
                for &spec in tree.children(vector) {
                    if matches!(tree.kind(spec), NodeKind::List(_)) {
                        self.special.insert(spec, IndentStyle::ListBody);
                    }
                }
            }
            IndentStyle::Deftype => {
                for &id in nodes.iter().skip(1) {
                    if matches!(tree.kind(id), NodeKind::List(_)) {
                        self.special.insert(id, IndentStyle::ListBody);
                    }
                }
            }
            _ => {}
        }
    }

    /// `(for [x xs :let [y (f x)]] ...)`: the vector after `:let` holds bindings too.
    fn mark_let_modifiers(&mut self, vector: NodeId) {
        let tree = self.tree;
        let mut after_let = false;
        for &id in tree.children(vector) {
            let kind = tree.kind(id);
            if !kind.is_semantic() {
                continue;
            }
            if after_let && matches!(kind, NodeKind::Vector(_)) {
                self.bindings.insert(id);
            }
            after_let = matches!(kind, NodeKind::Keyword(k) if k == ":let");
        }
    }

    // ========================================================================
    // Printing
    // ========================================================================

    /// Print `id` starting at column `w` and return the column after it.
    fn print_node(&mut self, id: NodeId, w: usize) -> Result<usize, FormatError> {
        let tree = self.tree;
        match tree.kind(id) {
            NodeKind::Bool(true) => Ok(w + self.writer.write("true")),
            NodeKind::Bool(false) => Ok(w + self.writer.write("false")),
            NodeKind::Character { text, .. } => Ok(w + self.writer.write(text)),
            NodeKind::Comment(text) => Ok(w + self.writer.write(text)),
            NodeKind::Deref(child) => self.print_prefixed("@", *child, w),
            NodeKind::FnLiteral(nodes) => {
                let layout = self.resolve_list_style(nodes).into();
                self.print_delimited("#(", nodes, w, layout, ")")
            }
            NodeKind::Keyword(text) => Ok(w + self.writer.write(text)),
            NodeKind::List(nodes) => self.print_list(id, nodes, w),
            NodeKind::Map { namespace, nodes } => match namespace {
                Some(ns) => self.print_delimited(&format!("#{ns}{{"), nodes, w, Layout::Normal, "}"),
                None => self.print_delimited("{", nodes, w, Layout::Normal, "}"),
            },
            NodeKind::Metadata(child) => self.print_prefixed("^", *child, w),
            NodeKind::Newline => Err(FormatError::UnhandledNode {
                pos: tree.pos(id).clone(),
                kind: tree.kind(id).kind_name(),
            }),
            NodeKind::Nil => Ok(w + self.writer.write("nil")),
            NodeKind::Number(text) => Ok(w + self.writer.write(text)),
            NodeKind::Quote(child) => self.print_prefixed("'", *child, w),
            NodeKind::ReaderCond(nodes) => self.print_delimited("#?(", nodes, w, Layout::Normal, ")"),
            NodeKind::ReaderCondSplice(nodes) => self.print_delimited("#?@(", nodes, w, Layout::Normal, ")"),
            NodeKind::ReaderDiscard(child) => self.print_prefixed("#_", *child, w),
            NodeKind::ReaderEval(child) => self.print_prefixed("#=", *child, w),
            NodeKind::Regex(text) => {
                let w = w + self.writer.write("#\"");
                let w = w + self.writer.write(text);
                Ok(w + self.writer.write_char('"'))
            }
            NodeKind::Set(nodes) => self.print_delimited("#{", nodes, w, Layout::Normal, "}"),
            NodeKind::String(text) => {
                let text = if self.docstrings.contains(&id) {
                    self.align_docstring(text, w)
                } else {
                    text.clone()
                };
                let w = w + self.writer.write_char('"');
                let w = w + self.writer.write(&text);
                Ok(w + self.writer.write_char('"'))
            }
            NodeKind::Symbol(text) => Ok(w + self.writer.write(text)),
            NodeKind::SyntaxQuote(child) => self.print_prefixed("`", *child, w),
            NodeKind::Tag(text) => {
                let w = w + self.writer.write_char('#');
                Ok(w + self.writer.write(text))
            }
            NodeKind::Unquote(child) => self.print_prefixed("~", *child, w),
            NodeKind::UnquoteSplice(child) => self.print_prefixed("~@", *child, w),
            NodeKind::VarQuote(text) => {
                let w = w + self.writer.write("#'");
                Ok(w + self.writer.write(text))
            }
            NodeKind::Vector(nodes) => {
                let layout = if self.bindings.remove(&id) {
                    Layout::Bindings
                } else {
                    Layout::Normal
                };
                self.print_delimited("[", nodes, w, layout, "]")
            }
        }
    }

    fn print_list(&mut self, id: NodeId, nodes: &[NodeId], w: usize) -> Result<usize, FormatError> {
        let resolved = self.resolve_list_style(nodes);
        self.apply_special_rules(resolved, nodes);
        let mut style = self.special.remove(&id).unwrap_or(resolved);
        if self.thread_first.contains(&id) {
            style = style.thread_first();
        }
        let mut layout = Layout::from(style);
        if let Layout::Cond { condp, .. } = &mut layout {
            *condp = head_symbol(self.tree, id).is_some_and(|(head, _)| symbol_name(head) == "condp");
        }
        self.print_delimited("(", nodes, w, layout, ")")
    }

    fn print_prefixed(&mut self, prefix: &str, child: NodeId, w: usize) -> Result<usize, FormatError> {
        let w = w + self.writer.write(prefix);
        self.print_node(child, w)
    }

    fn print_delimited(
        &mut self,
        open: &str,
        nodes: &[NodeId],
        w: usize,
        layout: Layout,
        close: &str,
    ) -> Result<usize, FormatError> {
        let w = w + self.writer.write(open);
        let w = self.print_sequence(nodes, w, layout, true)?;
        Ok(w + self.writer.write(close))
    }

    /// Print `nodes` with continuation lines positioned by `layout`, relative to base column `w`.
    ///
    /// `w` is the indent applied after the next newline and `w2` is the running column. `closed` is true when a
    /// delimiter follows the last node.
    ///
    /// A comment always ends its line. One that the scanner cut short at a bare `\r` has no newline node after it,
    /// so a line break is written as if there were one.
    fn print_sequence(
        &mut self,
        nodes: &[NodeId],
        w: usize,
        layout: Layout,
        closed: bool,
    ) -> Result<usize, FormatError> {
        let tree = self.tree;
        let mut w = w;
        let mut w2 = w;
        let mut need_space = false;
        let mut need_indent = false;
        let mut open_comment = false;

        // Column after nodes[0], for Layout::List.
        let mut first_indent = 0;

        // Layout::Bindings and Layout::Cond.
        let mut pairing = Pairing::default();

        for (i, &id) in nodes.iter().enumerate() {
            let kind = tree.kind(id);
            let is_newline = matches!(kind, NodeKind::Newline);
            let implied_newline = open_comment && !is_newline;
            if is_newline || implied_newline {
                w += pairing.newline_indent(layout, i);
                w2 = w;
                self.writer.newline();
                need_indent = true;
                need_space = false;
                open_comment = false;
                if is_newline {
                    continue;
                }
            }

            if counts_as_semantic(kind) {
                pairing.count(layout, kind);
            }

            // At an implied newline these column rules already ran for the newline's index.
            match layout {
                Layout::List if i == 1 && !implied_newline => {
                    w = match tree.kind(nodes[0]) {
                        NodeKind::Comment(text) if text.chars().count() > LONG_COMMENT => w + 1,
                        _ => first_indent + 1,
                    };
                }
                Layout::ListBody | Layout::Cond { .. } if i == 1 && !implied_newline => w += 1,
                _ => {}
            }

            if need_indent {
                self.writer.indent(w);
            }
            if need_space {
                w2 += self.writer.write_char(' ');
            }
            w2 = self.print_node(id, w2)?;
            if i == 0 {
                first_indent = w2;
            }
            need_indent = false;
            need_space = true;
            open_comment = matches!(kind, NodeKind::Comment(_));
            w -= pairing.take_extra_indent();
        }

        if closed && open_comment {
            w += pairing.newline_indent(layout, nodes.len());
            w2 = w;
            self.writer.newline();
            need_indent = true;
        }

        // The next token closes this sequence, so it is never a newline.
        if need_indent {
            self.writer.indent(w);
        }
        Ok(w2)
    }

    /// Re-indent the continuation lines of a docstring whose opening quote sits at column `w`.
    ///
    /// Lines start under the quote. Indentation deeper than that is kept; blank lines lose their whitespace.
    fn align_docstring(&self, docstring: &str, w: usize) -> String {
        let mut lines = docstring.split('\n');
        let mut aligned: Vec<String> = lines.next().map(str::to_string).into_iter().collect();
        let indent: String = std::iter::repeat_n(self.writer.indent_char(), w).collect();
        for line in lines {
            let trimmed = line.trim();
            if trimmed.is_empty() {
                aligned.push(String::new());
                continue;
            }
            let depth = line.chars().take_while(|&c| c == ' ').count();
            let mut prefixed = indent.clone();
            prefixed.extend(std::iter::repeat_n(' ', depth.saturating_sub(w)));
            prefixed.push_str(trimmed);
            aligned.push(prefixed);
        }
        aligned.join("\n")
    }
}

/// Semantic for pairing purposes: metadata attaches to the following form.
fn counts_as_semantic(kind: &NodeKind) -> bool {
    kind.is_semantic() && !matches!(kind, NodeKind::Metadata(_))
}

/// The head symbol and children of a list form like `(sym ...)`.
fn head_symbol(tree: &Tree, id: NodeId) -> Option<(&str, &[NodeId])> {
    let NodeKind::List(nodes) = tree.kind(id) else {
        return None;
    };
    let &head = nodes.first()?;
    match tree.kind(head) {
        NodeKind::Symbol(sym) => Some((sym.as_str(), nodes.as_slice())),
        _ => None,
    }
}

/// The first form after a list's head, if it is a vector.
fn first_vector(tree: &Tree, nodes: &[NodeId]) -> Option<NodeId> {
    let &id = nodes.iter().skip(1).find(|&&id| tree.kind(id).is_semantic())?;
    matches!(tree.kind(id), NodeKind::Vector(_)).then_some(id)
}

/// A `:require` libspec: `ns.name`, `[ns.name :as alias]`, or `[ns.name :refer [a b]]`.
struct Require<'t> {
    name: &'t str,
    alias: Option<&'t str>,
    refer: Vec<&'t str>,
}

fn parse_require(tree: &Tree, id: NodeId) -> Option<Require<'_>> {
    let nodes: Vec<NodeId> = match tree.kind(id) {
        NodeKind::Symbol(name) => {
            return Some(Require {
                name,
                alias: None,
                refer: Vec::new(),
            });
        }
        NodeKind::List(nodes) | NodeKind::Vector(nodes) => {
            nodes.iter().copied().filter(|&n| tree.kind(n).is_semantic()).collect()
        }
        _ => return None,
    };
    let (&first, options) = nodes.split_first()?;
    let NodeKind::Symbol(name) = tree.kind(first) else {
        return None;
    };
    if options.len() % 2 != 0 {
        return None;
    }
    let mut require = Require {
        name,
        alias: None,
        refer: Vec::new(),
    };
    // A repeated option takes the last value.
    for pair in options.chunks_exact(2) {
        let NodeKind::Keyword(key) = tree.kind(pair[0]) else {
            return None;
        };
        match (key.as_str(), tree.kind(pair[1])) {
            (":as", NodeKind::Symbol(alias)) => require.alias = Some(alias.as_str()),
            (":refer", NodeKind::List(names) | NodeKind::Vector(names)) => {
                let mut refer = Vec::new();
                for &n in names {
                    match tree.kind(n) {
                        NodeKind::Symbol(s) => refer.push(s.as_str()),
                        NodeKind::Comment(_) | NodeKind::Newline => {}
                        _ => return None,
                    }
                }
                require.refer = refer;
            }
            _ => return None,
        }
    }
    Some(require)
}
