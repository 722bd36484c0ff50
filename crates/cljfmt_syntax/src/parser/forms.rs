/// Collection and wrapper parsing.
///
/// Every collection loops until its closing delimiter. Reaching EOF first is reported at the opening delimiter so
/// the diagnostic points at the form that was never closed.

impl<'a> Parser<'a> {
    /// Parse forms up to (and consuming) the `close` delimiter.
    ///
    /// Children suppressed by the parse options are dropped here, at every depth.
    fn parse_seq(&mut self, open: &Pos, close: TokenKind) -> Result<Vec<NodeId>, SyntaxError> {
        let mut nodes = Vec::new();
        loop {
            let tok = self.next()?;
            if tok.kind == close {
                return Ok(nodes);
            }
            if tok.kind == TokenKind::Eof {
                return Err(self.unexpected_eof(open));
            }
            self.backup(tok);
            match self.parse_next()? {
                Some(id) => {
                    if self.include(id) {
                        nodes.push(id);
                    }
                }
                None => return Err(self.unexpected_eof(open)),
            }
        }
    }

    fn parse_list(&mut self, pos: Pos) -> Result<NodeId, SyntaxError> {
        let nodes = self.parse_seq(&pos, TokenKind::RightParen)?;
        Ok(self.alloc(pos, NodeKind::List(nodes)))
    }

    fn parse_vector(&mut self, pos: Pos) -> Result<NodeId, SyntaxError> {
        let nodes = self.parse_seq(&pos, TokenKind::RightBracket)?;
        Ok(self.alloc(pos, NodeKind::Vector(nodes)))
    }

    /// Parse a map body whose `{` was already consumed at `open`.
    ///
    /// `pos` is where the node itself starts: the `{` for plain maps, the `#` for namespaced ones.
    fn parse_map_at(&mut self, pos: Pos, open: &Pos, namespace: Option<String>) -> Result<NodeId, SyntaxError> {
        let nodes = self.parse_seq(open, TokenKind::RightBrace)?;
        if self.tree.count_paired(&nodes) % 2 != 0 {
            return Err(self.error(&pos, "map literal must contain an even number of forms"));
        }
        Ok(self.alloc(pos, NodeKind::Map { namespace, nodes }))
    }

    fn parse_map(&mut self, pos: Pos, namespace: Option<String>) -> Result<NodeId, SyntaxError> {
        let open = pos.clone();
        self.parse_map_at(pos, &open, namespace)
    }

    /// Wrap the next semantic form in a single-child node.
    fn parse_wrapper(&mut self, pos: Pos, wrap: fn(NodeId) -> NodeKind) -> Result<NodeId, SyntaxError> {
        let child = self.parse_next_semantic()?;
        Ok(self.alloc(pos, wrap(child)))
    }

    /// `~form` or `~@form`.
    fn parse_unquote(&mut self, pos: Pos) -> Result<NodeId, SyntaxError> {
        let tok = self.next()?;
        match tok.kind {
            TokenKind::Eof => Err(self.unexpected_eof(&tok.pos)),
            TokenKind::AtSign => self.parse_wrapper(pos, NodeKind::UnquoteSplice),
            _ => {
                self.backup(tok);
                self.parse_wrapper(pos, NodeKind::Unquote)
            }
        }
    }
}
