//! Property-based tests for the TDF parser.
//!
//! These check invariants that must hold for any input: the parser never
//! panics, error positions agree with each other, and documents rendered
//! from generated trees parse back to the same tree.

use proptest::prelude::*;
use tdf_parser::{Document, Parser, ParserConfig, SectionId};

fn config() -> ProptestConfig {
    ProptestConfig {
        cases: 200,
        max_shrink_iters: 200,
        ..ProptestConfig::default()
    }
}

// =============================================================================
// Test Helpers
// =============================================================================

/// Recompute the 1-based row/column of byte offset `pos`.
fn row_col(source: &str, pos: usize) -> (usize, usize) {
    let mut row = 1;
    let mut col = 1;
    for ch in source[..pos].chars() {
        if ch == '\n' {
            row += 1;
            col = 1;
        } else {
            col += 1;
        }
    }
    (row, col)
}

/// A generated section: fields and named children, names unique per level.
#[derive(Debug, Clone)]
struct GenSection {
    fields: Vec<(String, String)>,
    sections: Vec<(String, GenSection)>,
}

fn name() -> impl Strategy<Value = String> {
    "[A-Za-z_][A-Za-z0-9_]{0,6}"
}

fn value() -> impl Strategy<Value = String> {
    // No `;`, no line breaks, no `//`, no surrounding whitespace.
    "[A-Za-z0-9_.:=\\[\\]{}]([A-Za-z0-9_ .:=\\[\\]{}]{0,10}[A-Za-z0-9_.:=\\[\\]{}])?"
}

fn dedup<T>(mut entries: Vec<(String, T)>) -> Vec<(String, T)> {
    let mut seen = std::collections::HashSet::new();
    entries.retain(|(k, _)| seen.insert(k.clone()));
    entries
}

fn section() -> impl Strategy<Value = GenSection> {
    let leaf = prop::collection::vec((name(), value()), 0..4).prop_map(|fields| GenSection {
        fields: dedup(fields),
        sections: Vec::new(),
    });
    leaf.prop_recursive(4, 32, 4, |inner| {
        (
            prop::collection::vec((name(), value()), 0..4),
            prop::collection::vec((name(), inner), 0..4),
        )
            .prop_map(|(fields, sections)| GenSection {
                fields: dedup(fields),
                sections: dedup(sections),
            })
    })
}

fn render(section: &GenSection, depth: usize, out: &mut String) {
    let indent = "  ".repeat(depth);
    for (key, value) in &section.fields {
        out.push_str(&format!("{indent}{key} = {value}; // {key}\n"));
    }
    for (name, child) in &section.sections {
        out.push_str(&format!("{indent}[{name}]\n{indent}{{\n"));
        render(child, depth + 1, out);
        out.push_str(&format!("{indent}}}\n"));
    }
}

fn build(section: &GenSection, doc: &mut Document, id: SectionId) {
    for (key, value) in &section.fields {
        doc.insert_field(id, key.as_str(), value.as_str());
    }
    for (name, child) in &section.sections {
        let child_id = doc.insert_section(id, name.as_str());
        build(child, doc, child_id);
    }
}

// =============================================================================
// Properties
// =============================================================================

proptest! {
    #![proptest_config(config())]

    /// The parser must never panic, whatever the input.
    #[test]
    fn parser_never_panics(input in any::<String>()) {
        let _ = Parser::parse_default(&input);
    }

    /// Inputs drawn from the format's own alphabet reach deeper states.
    #[test]
    fn parser_never_panics_tdf_alphabet(input in "[a-zA-Z0-9_\\[\\]{}=;/ \\t\\n]{0,300}") {
        let lenient = ParserConfig::new().allow_root_fields(true).allow_name_overrides(true);
        let _ = Parser::parse_default(&input);
        let _ = Parser::parse(&input, &lenient);
    }

    /// `row`/`col` always describe the character at `pos`.
    #[test]
    fn error_position_is_consistent(input in "[a-zA-Zé0-9_\\[\\]{}=;/ \\t\\n]{0,300}") {
        if let Err(err) = Parser::parse_default(&input) {
            prop_assert!(err.pos <= input.len());
            prop_assert!(input.is_char_boundary(err.pos));
            prop_assert_eq!(row_col(&input, err.pos), (err.row, err.col));
        }
    }

    /// Same input and config, same result.
    #[test]
    fn parsing_is_deterministic(input in "[a-zA-Z0-9_\\[\\]{}=;/ \\n]{0,200}") {
        let config = ParserConfig::new().allow_root_fields(true);
        prop_assert_eq!(Parser::parse(&input, &config), Parser::parse(&input, &config));
    }

    /// A rendered tree parses back to the same tree.
    #[test]
    fn rendered_tree_parses_back(root in section()) {
        let mut source = String::new();
        render(&root, 0, &mut source);

        let mut expected = Document::new();
        let root_id = expected.root_id();
        build(&root, &mut expected, root_id);

        let config = ParserConfig::new().allow_root_fields(true);
        let parsed = Parser::parse(&source, &config);
        prop_assert_eq!(parsed, Ok(expected));
    }
}
