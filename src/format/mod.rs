//! cljfmt code formatter
//!
//! This module turns Clojure source into canonically indented Clojure source:
//! - parse with comments and newlines kept (see [`FormatConfig::parse_options`]);
//! - run the enabled [`Transform`]s, if any;
//! - print with per-form indentation styles (see [`Printer`]).
//!
//! Line breaks are never added or removed by the printer itself, only by transforms. Already-canonical input comes
//! back byte for byte.

mod config;
mod dotconfig;
mod printer;
mod transform;
mod writer;

pub use config::{FormatConfig, IndentTable};
pub use dotconfig::{ConfigError, ConfigResult, load_dot_config, parse_dot_config};
pub use printer::{FormatError, Printer};
pub use transform::Transform;

use std::io::Write;

use cljfmt_syntax::Tree;
use cljfmt_syntax::parser::parse_str;

/// Source name used when formatting text that did not come from a file.
pub const ANONYMOUS_SOURCE: &str = "<input>";

/// Format Clojure source code with default settings
pub fn format_source(source: &str) -> Result<String, FormatError> {
    format_source_with_config(source, &FormatConfig::default())
}

/// Format Clojure source code with custom configuration
pub fn format_source_with_config(source: &str, config: &FormatConfig) -> Result<String, FormatError> {
    format_named(ANONYMOUS_SOURCE, source, config)
}

/// Format source whose diagnostics should name `name` (usually a file path).
#[tracing::instrument(skip_all, fields(name = name, source_len = source.len()))]
pub fn format_named(name: &str, source: &str, config: &FormatConfig) -> Result<String, FormatError> {
    let mut tree = parse_str(name, source, config.parse_options)?;
    transform::apply(&mut tree, &config.transforms)?;
    let formatted = format_tree(&tree, config)?;
    tracing::debug!(changed = formatted != source, "formatted");
    Ok(formatted)
}

/// Print an already-built tree. Transforms are not applied here; they need the tree mutably.
pub fn format_tree(tree: &Tree, config: &FormatConfig) -> Result<String, FormatError> {
    Printer::new(tree, config).print()
}

/// Print an already-built tree to `out`.
pub fn print_tree(tree: &Tree, config: &FormatConfig, out: &mut impl Write) -> Result<(), FormatError> {
    let formatted = format_tree(tree, config)?;
    out.write_all(formatted.as_bytes())?;
    out.flush()?;
    Ok(())
}

/// Check if source code is already formatted
pub fn check_formatted(source: &str) -> Result<bool, FormatError> {
    let formatted = format_source(source)?;
    Ok(source == formatted)
}

/// Get the diff between original and formatted source
pub fn format_diff(source: &str) -> Result<Option<String>, FormatError> {
    let formatted = format_source(source)?;
    Ok(line_diff(source, &formatted))
}

/// Simple line-by-line diff between `original` and `formatted`, or `None` if they are equal.
pub fn line_diff(original: &str, formatted: &str) -> Option<String> {
    if original == formatted {
        return None;
    }

    let mut diff = String::new();
    let original_lines: Vec<&str> = original.lines().collect();
    let formatted_lines: Vec<&str> = formatted.lines().collect();

    let max_lines = original_lines.len().max(formatted_lines.len());

    for i in 0..max_lines {
        let orig = original_lines.get(i).unwrap_or(&"");
        let fmt = formatted_lines.get(i).unwrap_or(&"");

        if orig != fmt {
            if !orig.is_empty() {
                diff.push_str(&format!("-{:4} | {}\n", i + 1, orig));
            }
            if !fmt.is_empty() {
                diff.push_str(&format!("+{:4} | {}\n", i + 1, fmt));
            }
        }
    }

    Some(diff)
}

#[cfg(test)]
mod tests {
    use super::*;
    use cljfmt_core::IndentStyle;
    use cljfmt_syntax::ParseOptions;

    // ========================================
    // format_source tests
    // ========================================

    #[test]
    fn test_format_source_reindents_defn() {
        let source = "(defn foo [x]\n        (inc x))\n";
        assert_eq!(format_source(source).unwrap(), "(defn foo [x]\n  (inc x))\n");
    }

    #[test]
    fn test_format_source_invalid_syntax() {
        let err = format_source("(defn foo [").unwrap_err();
        assert!(matches!(err, FormatError::Syntax(_)));
        assert_eq!(err.to_string(), "parse error at <input>:1:11: unexpected EOF");
    }

    #[test]
    fn test_format_source_empty() {
        assert_eq!(format_source("").unwrap(), "");
    }

    // ========================================
    // format_source_with_config tests
    // ========================================

    #[test]
    fn test_format_source_with_indent_override() {
        let config = FormatConfig::new().with_indent_override("my-macro", IndentStyle::ListBody);
        let result = format_source_with_config("(my-macro x\ny)", &config).unwrap();
        assert_eq!(result, "(my-macro x\n  y)");
    }

    #[test]
    fn test_format_source_with_transforms() {
        let config = FormatConfig::new()
            .with_transform(Transform::RemoveTrailingNewlines)
            .with_transform(Transform::RemoveExtraBlankLines);
        let result = format_source_with_config("(foo\n bar\n)\n\n\n\n(baz)\n", &config).unwrap();
        assert_eq!(result, "(foo\n  bar)\n\n(baz)\n");
    }

    #[test]
    fn test_format_named_uses_name_in_errors() {
        let err = format_named("src/core.clj", "{:a}", &FormatConfig::default()).unwrap_err();
        assert!(err.to_string().starts_with("parse error at src/core.clj:1:1:"));
    }

    #[test]
    fn test_semantic_parse_options_drop_comments() {
        let config = FormatConfig::new().with_parse_options(ParseOptions::new());
        let result = format_source_with_config("(a ; gone\n b)", &config).unwrap();
        assert_eq!(result, "(a b)");
    }

    // ========================================
    // print_tree tests
    // ========================================

    #[test]
    fn test_print_tree_writes_to_sink() {
        let tree = parse_str("t.clj", "[1\n   2]", ParseOptions::non_semantic()).unwrap();
        let mut out = Vec::new();
        print_tree(&tree, &FormatConfig::default(), &mut out).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "[1\n 2]");
    }

    // ========================================
    // check_formatted tests
    // ========================================

    #[test]
    fn test_check_formatted() {
        assert!(check_formatted("(when x\n  y)\n").unwrap());
        assert!(!check_formatted("(when x\ny)\n").unwrap());
        assert!(check_formatted("(when x").is_err());
    }

    // ========================================
    // format_diff tests
    // ========================================

    #[test]
    fn test_format_diff_no_changes() {
        assert_eq!(format_diff("(a b)\n").unwrap(), None);
    }

    #[test]
    fn test_format_diff_returns_diff() {
        let diff = format_diff("(when x\ny)\n").unwrap().expect("source needs formatting");
        assert_eq!(diff, "-   2 | y)\n+   2 |   y)\n");
    }

    #[test]
    fn test_format_diff_invalid_syntax() {
        assert!(format_diff("(").is_err());
    }
}
