/// Reader dispatch, tags and character literals.
///
/// The scanner has already split `#{` / `#(` / `#"` from their delimiter, so each route here reads the delimiter
/// (or the string, keyword or symbol) as the very next token.

impl<'a> Parser<'a> {
    fn parse_dispatch(&mut self, tok: Token) -> Result<NodeId, SyntaxError> {
        let pos = tok.pos.clone();
        match tok.text.as_str() {
            "#(" => self.parse_fn_literal(pos),
            "#?" => self.parse_reader_cond(pos, false),
            "#?@" => self.parse_reader_cond(pos, true),
            "#:" => self.parse_namespaced_map(pos),
            "#_" => self.parse_wrapper(pos, NodeKind::ReaderDiscard),
            "#=" => self.parse_wrapper(pos, NodeKind::ReaderEval),
            "#^" => self.parse_wrapper(pos, NodeKind::Metadata),
            "#\"" => self.parse_regex(pos),
            "#{" => self.parse_set(pos),
            "#'" => self.parse_var_quote(pos),
            "#<" => Err(self.error(&pos, "unreadable dispatch macro")),
            _ => Err(self.unexpected(&tok)),
        }
    }

    /// Read the token that must follow a dispatch prefix, requiring `kind`.
    fn expect(&mut self, kind: TokenKind) -> Result<Token, SyntaxError> {
        let tok = self.next()?;
        match tok.kind {
            k if k == kind => Ok(tok),
            TokenKind::Eof => Err(self.unexpected_eof(&tok.pos)),
            _ => Err(self.unexpected(&tok)),
        }
    }

    fn parse_fn_literal(&mut self, pos: Pos) -> Result<NodeId, SyntaxError> {
        if self.in_fn_literal {
            return Err(self.error(&pos, "cannot nest fn literals"));
        }
        self.expect(TokenKind::LeftParen)?;
        self.in_fn_literal = true;
        let nodes = self.parse_seq(&pos, TokenKind::RightParen)?;
        self.in_fn_literal = false;
        Ok(self.alloc(pos, NodeKind::FnLiteral(nodes)))
    }

    /// `#?(...)` and `#?@(...)`. The list's children become the conditional's children directly.
    fn parse_reader_cond(&mut self, pos: Pos, splice: bool) -> Result<NodeId, SyntaxError> {
        let tok = self.next()?;
        if tok.kind == TokenKind::Eof {
            return Err(self.unexpected_eof(&tok.pos));
        }
        if tok.kind != TokenKind::LeftParen {
            return Err(self.error(&tok.pos, "reader conditional body must be a list"));
        }
        let nodes = self.parse_seq(&tok.pos, TokenKind::RightParen)?;
        let kind = if splice {
            NodeKind::ReaderCondSplice(nodes)
        } else {
            NodeKind::ReaderCond(nodes)
        };
        Ok(self.alloc(pos, kind))
    }

    /// `#:ns{...}` and `#::{...}`.
    fn parse_namespaced_map(&mut self, pos: Pos) -> Result<NodeId, SyntaxError> {
        let namespace = self.expect(TokenKind::Keyword)?.text;
        let tok = self.next()?;
        if tok.kind == TokenKind::Eof {
            return Err(self.unexpected_eof(&tok.pos));
        }
        if tok.kind != TokenKind::LeftBrace {
            return Err(self.error(&tok.pos, "namespaced map must have a map"));
        }
        self.parse_map_at(pos, &tok.pos, Some(namespace))
    }

    fn parse_regex(&mut self, pos: Pos) -> Result<NodeId, SyntaxError> {
        let tok = self.expect(TokenKind::String)?;
        Ok(self.alloc(pos, NodeKind::Regex(strip_delimiters(&tok.text))))
    }

    fn parse_set(&mut self, pos: Pos) -> Result<NodeId, SyntaxError> {
        self.expect(TokenKind::LeftBrace)?;
        let nodes = self.parse_seq(&pos, TokenKind::RightBrace)?;
        Ok(self.alloc(pos, NodeKind::Set(nodes)))
    }

    fn parse_var_quote(&mut self, pos: Pos) -> Result<NodeId, SyntaxError> {
        let tok = self.expect(TokenKind::Symbol)?;
        Ok(self.alloc(pos, NodeKind::VarQuote(tok.text)))
    }

    /// A bare `#` followed by the tag symbol (`#inst`, `# foo`).
    fn parse_tag(&mut self, pos: Pos) -> Result<NodeId, SyntaxError> {
        let tok = self.expect(TokenKind::Symbol)?;
        Ok(self.alloc(pos, NodeKind::Tag(tok.text)))
    }

    fn parse_char_literal(&mut self, tok: Token) -> Result<NodeId, SyntaxError> {
        let body = tok.text.get(1..).unwrap_or_default();
        let value = decode_char(body).map_err(|message| self.error(&tok.pos, message))?;
        Ok(self.alloc(
            tok.pos,
            NodeKind::Character {
                value,
                text: tok.text,
            },
        ))
    }
}

/// Decode the text of a character literal after its backslash.
///
/// ```text
/// "a" → 'a'    "newline" → '\n'    "o101" → 'A'    "u00e9" → 'é'
/// ```
fn decode_char(body: &str) -> Result<char, &'static str> {
    let mut runes = body.chars();
    let first = runes.next().ok_or("invalid character literal")?;
    if runes.next().is_none() {
        return Ok(first);
    }
    if let Some(c) = chars::from_name(body) {
        return Ok(c);
    }
    match first {
        'o' => decode_escape(&body[1..], 3, 8).ok_or("invalid octal literal"),
        'u' => decode_escape(&body[1..], 4, 16).ok_or("invalid unicode literal"),
        _ => Err("invalid character literal"),
    }
}

/// Exactly `len` digits in `radix`, forming a valid scalar value.
fn decode_escape(digits: &str, len: usize, radix: u32) -> Option<char> {
    if digits.len() != len || !digits.chars().all(|c| c.is_digit(radix)) {
        return None;
    }
    u32::from_str_radix(digits, radix).ok().and_then(char::from_u32)
}
