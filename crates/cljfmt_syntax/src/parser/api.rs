/// Parse Clojure source text into a [`Tree`].
///
/// This is the main public entrypoint for parsing.
///
/// ## Parameters
/// - `name`: Diagnostic source name; only appears in positions.
/// - `source`: Clojure source text.
/// - `options`: Which nodes to keep. Use [`ParseOptions::non_semantic`] for lossless round-trips.
///
/// ## Errors
/// Returns the first scan or parse error.
#[tracing::instrument(skip_all, fields(name = name, source_len = source.len()))]
pub fn parse_str(name: &str, source: &str, options: ParseOptions) -> Result<Tree, SyntaxError> {
    Parser::new(Lexer::new(name, source), options).parse()
}

/// Read and parse a file. The path's display form is used as the source name.
///
/// ## Errors
/// - [`SyntaxError::Io`] if the file cannot be read.
/// - Any scan or parse error in its content.
pub fn parse_file(path: impl AsRef<Path>, options: ParseOptions) -> Result<Tree, SyntaxError> {
    let path = path.as_ref();
    let name = path.display().to_string();
    let source = std::fs::read_to_string(path).map_err(|source| SyntaxError::Io {
        path: name.clone(),
        source,
    })?;
    parse_str(&name, &source, options)
}
