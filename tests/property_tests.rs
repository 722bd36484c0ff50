//! Property-based tests for the formatter
//!
//! These tests use proptest to verify invariants across many randomly
//! generated inputs, catching edge cases that hand-written tests might miss.

use cljfmt::format::format_source;
use cljfmt_syntax::ParseOptions;
use cljfmt_syntax::parser::parse_str;
use proptest::prelude::*;

// =============================================================================
// Format Properties
// =============================================================================

#[cfg(test)]
mod format_tests {
    use super::*;

    /// Property: Formatting is idempotent (format(format(x)) == format(x))
    #[test]
    fn format_is_idempotent_simple() {
        let source = r#"
(ns demo.core
    (:require [clojure.string :as str]))

(defn add
      "Adds two numbers.
         Really."
   [a b]
(+ a
b))
"#;

        let formatted1 = format_source(source).expect("First format failed");
        let formatted2 = format_source(&formatted1).expect("Second format failed");

        assert_eq!(formatted1, formatted2, "Formatting should be idempotent");
    }

    /// Property: Formatting preserves the tree (same node descriptions before and after)
    #[test]
    fn format_preserves_structure() {
        let source = "(let [x 1\n y 2]\n    ;; sum\n (+ x y))\n";

        let describe = |s: &str| {
            let tree = parse_str("t.clj", s, ParseOptions::non_semantic()).expect("parse failed");
            tree.flatten().into_iter().map(|id| tree.describe(id)).collect::<Vec<_>>()
        };

        let formatted = format_source(source).expect("Format failed");
        assert_eq!(describe(source), describe(&formatted), "Formatting changed tree structure");
    }

    /// Property: Whitespace-only input formats to its newlines
    #[test]
    fn format_handles_empty_input() {
        for (source, expected) in [("", ""), ("   ", ""), ("\n\n\n", "\n\n\n"), ("\t\t\n", "\n")] {
            assert_eq!(format_source(source).expect("whitespace should format"), expected);
        }
    }
}

// =============================================================================
// Generated Forms
// =============================================================================

#[cfg(test)]
mod proptest_strategies {
    use super::*;

    // Strategy for generating symbols that are not special reader tokens
    fn symbol_strategy() -> impl Strategy<Value = String> {
        "[a-z][a-z0-9-]{0,6}".prop_filter("Not a literal", |s| !matches!(s.as_str(), "nil" | "true" | "false"))
    }

    fn atom_strategy() -> impl Strategy<Value = String> {
        prop_oneof![
            symbol_strategy(),
            "[a-z]{1,5}".prop_map(|s| format!(":{s}")),
            (0u32..1000).prop_map(|n| n.to_string()),
            "[a-z ]{0,8}".prop_map(|s| format!("\"{s}\"")),
        ]
    }

    // A line comment, ended by a newline or by a bare carriage return
    fn comment_strategy() -> impl Strategy<Value = String> {
        (";[a-z ]{0,5}", prop_oneof![Just("\n"), Just("\r")]).prop_map(|(text, end)| format!(" {text}{end}"))
    }

    // Separators: a space, a newline followed by arbitrary indentation, or a comment
    fn separator_strategy() -> impl Strategy<Value = String> {
        prop_oneof![
            3 => Just(" ".to_string()),
            3 => (0usize..8).prop_map(|n| format!("\n{}", " ".repeat(n))),
            1 => (comment_strategy(), 0usize..4).prop_map(|(comment, n)| format!("{comment}{}", " ".repeat(n))),
        ]
    }

    fn trailing_strategy() -> impl Strategy<Value = String> {
        prop_oneof![3 => Just(String::new()), 1 => comment_strategy()]
    }

    fn form_strategy() -> impl Strategy<Value = String> {
        atom_strategy().prop_recursive(4, 48, 6, |inner| {
            let items = prop::collection::vec((separator_strategy(), inner), 0..6);
            let head = prop_oneof![
                Just("let".to_string()),
                Just("defn".to_string()),
                Just("cond".to_string()),
                Just("condp".to_string()),
                Just("->".to_string()),
                symbol_strategy(),
            ];
            (0usize..3, head, items, trailing_strategy()).prop_map(|(kind, head, items, trailing)| {
                let body: String = items.into_iter().map(|(sep, item)| format!("{sep}{item}")).collect();
                match kind {
                    0 => format!("({head}{body}{trailing})"),
                    1 => format!("[{head}{body}{trailing}]"),
                    _ => format!("#{{{head}{body}{trailing}}}"),
                }
            })
        })
    }

    // Forms as the reader sees them, with comments and newlines dropped
    fn semantic_nodes(source: &str) -> Vec<String> {
        let tree = parse_str("t.clj", source, ParseOptions::new()).expect("parse failed");
        tree.flatten().into_iter().map(|id| tree.describe(id)).collect()
    }

    proptest! {
        /// Property: Generated forms format, and formatting them again changes nothing
        #[test]
        fn generated_forms_are_idempotent(form in form_strategy()) {
            let formatted = format_source(&form).expect("Format failed");
            let again = format_source(&formatted).expect("Format formatted failed");
            prop_assert_eq!(formatted, again);
        }

        /// Property: Only leading whitespace on each line may change
        #[test]
        fn formatting_only_touches_indentation(form in form_strategy()) {
            let formatted = format_source(&form).expect("Format failed");
            // A comment cut short by a bare carriage return ends up on a line of its own.
            let form = form.replace('\r', "\n");
            let original: Vec<&str> = form.lines().map(str::trim_start).collect();
            let result: Vec<&str> = formatted.lines().map(str::trim_start).collect();
            prop_assert_eq!(original, result);
        }

        /// Property: Formatting never turns code into comment text, or the reverse
        #[test]
        fn formatting_preserves_forms(form in form_strategy()) {
            let formatted = format_source(&form).expect("Format failed");
            prop_assert_eq!(semantic_nodes(&form), semantic_nodes(&formatted));
        }

        /// Property: The scanner never panics on arbitrary input
        #[test]
        fn arbitrary_input_never_panics(source in "\\PC{0,64}") {
            let _ = parse_str("fuzz.clj", &source, ParseOptions::non_semantic());
            let _ = format_source(&source);
        }
    }
}
