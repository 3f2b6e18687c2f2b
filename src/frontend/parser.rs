//! Tree-sitter parser integration for JavaScript/TypeScript snippets
//!
//! Provides parsing using tree-sitter grammars for JS/TS/JSX/TSX and a single
//! iterative pass over the concrete tree that collects parse diagnostics and
//! the syntax facts used for dialect detection.

use crate::core::{Diagnostic, Dialect, Location};
use tree_sitter::{Language as TsLanguage, Node, Parser, Tree};

/// Upper bound on parse diagnostics recorded for one snippet.
pub const MAX_PARSE_DIAGNOSTICS: usize = 50;

/// Node kinds that only exist in the typed superset.
const TYPED_KINDS: &[&str] = &[
    "type_annotation",
    "interface_declaration",
    "type_alias_declaration",
    "enum_declaration",
    "type_arguments",
    "type_parameters",
    "as_expression",
    "satisfies_expression",
    "non_null_expression",
    "type_assertion",
    "abstract_class_declaration",
    "accessibility_modifier",
    "optional_parameter",
];

const MARKUP_KINDS: &[&str] = &["jsx_element", "jsx_self_closing_element", "jsx_fragment"];

/// Get the tree-sitter language for a dialect
fn get_language(dialect: Dialect) -> TsLanguage {
    match dialect {
        Dialect::JavaScript | Dialect::Jsx => tree_sitter_javascript::LANGUAGE.into(),
        Dialect::TypeScript => tree_sitter_typescript::LANGUAGE_TYPESCRIPT.into(),
        Dialect::Tsx => tree_sitter_typescript::LANGUAGE_TSX.into(),
    }
}

/// Parse source with the grammar for `dialect`.
///
/// Tree-sitter recovers from syntax errors on its own, so `None` is only
/// returned when the grammar cannot be loaded or parsing is aborted.
pub fn parse_source(content: &str, dialect: Dialect) -> Option<Tree> {
    let mut parser = Parser::new();
    let language = get_language(dialect);

    if let Err(e) = parser.set_language(&language) {
        tracing::warn!(dialect = %dialect, error = %e, "Failed to set tree-sitter language");
        return None;
    }

    parser.parse(content, None)
}

/// Syntax facts gathered from one pass over the concrete tree.
#[derive(Debug, Clone, Default)]
pub struct CstFacts {
    pub error_count: usize,
    pub diagnostics: Vec<Diagnostic>,
    pub saw_type_syntax: bool,
    pub saw_markup: bool,
}

/// Walk the whole tree with a cursor (no recursion) collecting error nodes,
/// missing tokens and dialect markers.
pub fn scan_tree(tree: &Tree, source: &str) -> CstFacts {
    let mut facts = CstFacts::default();
    let mut cursor = tree.walk();

    loop {
        let node = cursor.node();
        record_node(&node, source, &mut facts);

        if cursor.goto_first_child() {
            continue;
        }
        loop {
            if cursor.goto_next_sibling() {
                break;
            }
            if !cursor.goto_parent() {
                return facts;
            }
        }
    }
}

fn record_node(node: &Node, source: &str, facts: &mut CstFacts) {
    let kind = node.kind();
    if TYPED_KINDS.contains(&kind) {
        facts.saw_type_syntax = true;
    }
    if MARKUP_KINDS.contains(&kind) {
        facts.saw_markup = true;
    }

    if node.is_error() {
        facts.error_count += 1;
        push_diagnostic(
            facts,
            Diagnostic::parse(
                format!("syntax error near `{}`", excerpt(node_text(node, source))),
                Some(node_location(node)),
            ),
        );
    } else if node.is_missing() {
        facts.error_count += 1;
        push_diagnostic(
            facts,
            Diagnostic::parse(format!("missing `{}`", kind), Some(node_location(node))),
        );
    }
}

fn push_diagnostic(facts: &mut CstFacts, diagnostic: Diagnostic) {
    if facts.diagnostics.len() < MAX_PARSE_DIAGNOSTICS {
        facts.diagnostics.push(diagnostic);
    }
}

fn excerpt(text: &str) -> String {
    const MAX_CHARS: usize = 24;
    let first_line = text.lines().next().unwrap_or("").trim();
    if first_line.chars().count() > MAX_CHARS {
        let cut: String = first_line.chars().take(MAX_CHARS).collect();
        format!("{}…", cut)
    } else {
        first_line.to_string()
    }
}

/// Get text for a tree-sitter node
pub fn node_text<'a>(node: &Node, source: &'a str) -> &'a str {
    source.get(node.start_byte()..node.end_byte()).unwrap_or("")
}

/// Start position of a node (1-based line, 0-based column)
pub fn node_location(node: &Node) -> Location {
    let start = node.start_position();
    Location::new(start.row + 1, start.column)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_javascript() {
        let source = "function hello() { return 'world'; }";
        let tree = parse_source(source, Dialect::JavaScript).unwrap();
        let facts = scan_tree(&tree, source);
        assert_eq!(facts.error_count, 0);
        assert!(facts.diagnostics.is_empty());
        assert!(!facts.saw_type_syntax);
    }

    #[test]
    fn test_parse_typescript_sets_type_fact() {
        let source = "function hello(name: string): string { return `Hello ${name}`; }";
        let tree = parse_source(source, Dialect::TypeScript).unwrap();
        let facts = scan_tree(&tree, source);
        assert_eq!(facts.error_count, 0);
        assert!(facts.saw_type_syntax);
        assert!(!facts.saw_markup);
    }

    #[test]
    fn test_parse_tsx_sets_markup_fact() {
        let source = "const App = () => <div>Hello</div>;";
        let tree = parse_source(source, Dialect::Tsx).unwrap();
        let facts = scan_tree(&tree, source);
        assert!(facts.saw_markup);
    }

    #[test]
    fn test_syntax_error_is_recorded() {
        let source = "const = = ;";
        let tree = parse_source(source, Dialect::JavaScript).unwrap();
        let facts = scan_tree(&tree, source);
        assert!(facts.error_count > 0);
        assert!(!facts.diagnostics.is_empty());
        assert!(facts.diagnostics[0].location.is_some());
    }

    #[test]
    fn test_node_text_and_location() {
        let source = "const x = 42;\nconst y = 24;";
        let tree = parse_source(source, Dialect::JavaScript).unwrap();
        let root = tree.root_node();
        assert_eq!(node_text(&root, source), source);

        let second = root.named_child(1).unwrap();
        assert_eq!(node_location(&second), Location::new(2, 0));
    }

    #[test]
    fn test_excerpt_truncates_long_lines() {
        let text = "a".repeat(100);
        assert!(excerpt(&text).ends_with('…'));
        assert_eq!(excerpt("short\nsecond"), "short");
    }
}
