//! Front end: parse a snippet, detect its dialect and framework usage, and
//! lower it into the closed AST.
//!
//! Parsing never fails. Syntax errors become [`Diagnostic`]s and analysis
//! continues over whatever the parser recovered, possibly an empty program.

pub mod ast;
pub mod lower;
pub mod parser;

use crate::core::{Diagnostic, Dialect};
use ast::{ExprKind, Program, StmtKind};
use once_cell::sync::Lazy;
use parser::{parse_source, scan_tree, CstFacts};
use regex::Regex;
use tree_sitter::Tree;

/// Hook naming convention: `use` followed by an uppercase letter or digit.
static HOOK_NAME: Lazy<Regex> = Lazy::new(|| Regex::new(r"^use[A-Z0-9]").unwrap());

/// Module specifiers that mark a snippet as using the component framework.
const FRAMEWORK_MODULES: &[&str] = &["react", "react-dom", "preact"];

/// Everything the rest of the pipeline needs from the front end.
#[derive(Debug, Clone)]
pub struct FrontEndOutput {
    pub program: Program,
    pub dialect: Dialect,
    /// True when the caller supplied the dialect
    pub dialect_declared: bool,
    pub uses_framework: bool,
    pub diagnostics: Vec<Diagnostic>,
    /// True when the tree was recovered from errors or truncated
    pub partial: bool,
}

impl FrontEndOutput {
    pub fn uses_typed_superset(&self) -> bool {
        self.dialect.is_typed()
    }
}

struct Candidate {
    tree: Tree,
    facts: CstFacts,
    grammar: Dialect,
}

fn parse_candidate(code: &str, grammar: Dialect) -> Option<Candidate> {
    let tree = parse_source(code, grammar)?;
    let facts = scan_tree(&tree, code);
    Some(Candidate {
        tree,
        facts,
        grammar,
    })
}

/// Pick a grammar when no hint was given: the tsx grammar first, then the
/// plain javascript grammar if tsx produced errors. Fewer error nodes wins.
fn parse_without_hint(code: &str) -> Option<Candidate> {
    let tsx = parse_candidate(code, Dialect::Tsx);
    match tsx {
        Some(candidate) if candidate.facts.error_count == 0 => Some(candidate),
        tsx => {
            let js = parse_candidate(code, Dialect::Jsx);
            match (tsx, js) {
                (Some(t), Some(j)) => Some(if j.facts.error_count < t.facts.error_count {
                    j
                } else {
                    t
                }),
                (t, j) => t.or(j),
            }
        }
    }
}

/// Parse `code`, lowering it into the closed AST.
pub fn parse_snippet(code: &str, hint: Option<Dialect>) -> FrontEndOutput {
    let candidate = match hint {
        Some(dialect) => parse_candidate(code, dialect),
        None => parse_without_hint(code),
    };

    let Some(candidate) = candidate else {
        return FrontEndOutput {
            program: Program::default(),
            dialect: hint.unwrap_or(Dialect::JavaScript),
            dialect_declared: hint.is_some(),
            uses_framework: false,
            diagnostics: vec![Diagnostic::parse("parser unavailable for snippet", None)],
            partial: true,
        };
    };

    let lowered = lower::lower_program(candidate.tree.root_node(), code);

    let dialect = match hint {
        Some(dialect) => dialect,
        None => Dialect::from_flags(
            candidate.facts.saw_type_syntax && candidate.grammar.is_typed(),
            candidate.facts.saw_markup,
        ),
    };

    let mut diagnostics = candidate.facts.diagnostics;
    diagnostics.extend(lowered.diagnostics);

    let mut partial = lowered.partial || candidate.facts.error_count > 0;
    // Input that produced nothing usable must still report why
    if candidate.facts.error_count > 0 && diagnostics.is_empty() {
        diagnostics.push(Diagnostic::parse("unparseable input", None));
        partial = true;
    }

    let uses_framework = candidate.facts.saw_markup || detect_framework(&lowered.program);

    tracing::debug!(
        dialect = %dialect,
        grammar = %candidate.grammar,
        errors = candidate.facts.error_count,
        statements = lowered.program.body.len(),
        "Parsed snippet"
    );

    FrontEndOutput {
        program: lowered.program,
        dialect,
        dialect_declared: hint.is_some(),
        uses_framework,
        diagnostics,
        partial,
    }
}

/// True if `name` follows the hook naming convention.
pub fn is_hook_name(name: &str) -> bool {
    HOOK_NAME.is_match(name)
}

fn is_framework_module(source: &str) -> bool {
    FRAMEWORK_MODULES.contains(&source)
        || FRAMEWORK_MODULES
            .iter()
            .any(|module| source.starts_with(&format!("{}/", module)))
}

/// One pass over the program looking for framework imports, `require`s of the
/// framework, or hook-style calls.
fn detect_framework(program: &Program) -> bool {
    use crate::traversal::{NodeRef, Walker};

    let imports = program.body.iter().any(|stmt| match &stmt.kind {
        StmtKind::Import(import) => is_framework_module(&import.source),
        _ => false,
    });
    if imports {
        return true;
    }

    let walker = Walker::default();
    let hits = walker.collect_program(program, |node, _| match node {
        NodeRef::Expr(expr) => match &expr.kind {
            ExprKind::Call { callee, args, .. } => {
                let hook_call = crate::traversal::callee_name(callee)
                    .map(is_hook_name)
                    .unwrap_or(false);
                let framework_require = callee.as_ident() == Some("require")
                    && args
                        .first()
                        .and_then(|arg| arg.as_str_lit())
                        .map(is_framework_module)
                        .unwrap_or(false);
                (hook_call || framework_require).then_some(())
            }
            ExprKind::Jsx(_) => Some(()),
            _ => None,
        },
        _ => None,
    });
    !hits.is_empty()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_javascript_dialect() {
        let out = parse_snippet("var x = 1;", None);
        assert_eq!(out.dialect, Dialect::JavaScript);
        assert!(!out.dialect_declared);
        assert!(!out.uses_framework);
        assert!(out.diagnostics.is_empty());
        assert_eq!(out.program.body.len(), 1);
    }

    #[test]
    fn test_typed_dialect_detected() {
        let out = parse_snippet("interface User { name: string }\nconst u: User = { name: 'a' };", None);
        assert_eq!(out.dialect, Dialect::TypeScript);
        assert!(out.uses_typed_superset());
    }

    #[test]
    fn test_component_dialect_detected() {
        let out = parse_snippet("const App = () => <div>Hi</div>;", None);
        assert_eq!(out.dialect, Dialect::Jsx);
        assert!(out.uses_framework);
    }

    #[test]
    fn test_combined_dialect_detected() {
        let out = parse_snippet(
            "type Props = { title: string };\nconst Title = ({ title }: Props) => <h1>{title}</h1>;",
            None,
        );
        assert_eq!(out.dialect, Dialect::Tsx);
    }

    #[test]
    fn test_hint_is_respected() {
        let out = parse_snippet("let n = 1;", Some(Dialect::TypeScript));
        assert_eq!(out.dialect, Dialect::TypeScript);
        assert!(out.dialect_declared);
    }

    #[test]
    fn test_framework_from_import_and_hooks() {
        assert!(parse_snippet("import React from 'react';", None).uses_framework);
        assert!(parse_snippet("import { render } from 'react-dom/client';", None).uses_framework);
        assert!(parse_snippet("const [a, setA] = useState(0);", None).uses_framework);
        assert!(!parse_snippet("const user = getUser();", None).uses_framework);
    }

    #[test]
    fn test_comparison_parses_cleanly_without_hint() {
        let out = parse_snippet("const a = 1 < 2;", None);
        assert!(out.diagnostics.is_empty());
    }

    #[test]
    fn test_malformed_input_never_panics() {
        let out = parse_snippet(")))((( }}} {{{", None);
        assert!(!out.diagnostics.is_empty());
        assert!(out.partial);
    }

    #[test]
    fn test_hook_name_convention() {
        assert!(is_hook_name("useState"));
        assert!(is_hook_name("useFetch2"));
        assert!(!is_hook_name("user"));
        assert!(!is_hook_name("use"));
    }
}
