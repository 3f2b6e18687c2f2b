//! Lowering from the tree-sitter concrete tree into the closed [`ast`](super::ast).
//!
//! Lowering never fails. Unrecognized node kinds become `Unknown` nodes,
//! statements inside `ERROR` nodes are salvaged, and subtrees deeper than
//! [`MAX_LOWERING_DEPTH`] are truncated.

use super::ast::*;
use super::parser::{node_location, node_text};
use crate::core::{Diagnostic, Location};
use tree_sitter::Node;

/// Recursion cap for lowering. A snippet nested this deep still lowers and
/// analyzes within a 2MB thread stack in unoptimized builds.
pub const MAX_LOWERING_DEPTH: usize = 96;

pub struct Lowerer<'s> {
    source: &'s str,
    depth: usize,
    truncated: bool,
    recovered_errors: bool,
    diagnostics: Vec<Diagnostic>,
}

/// Output of lowering one tree.
pub struct Lowered {
    pub program: Program,
    pub diagnostics: Vec<Diagnostic>,
    /// True when statements were salvaged from error nodes or truncated
    pub partial: bool,
}

pub fn lower_program(root: Node, source: &str) -> Lowered {
    let mut lowerer = Lowerer::new(source);
    let body = lowerer.lower_stmt_list(&named_children(root));
    Lowered {
        program: Program { body },
        partial: lowerer.truncated || lowerer.recovered_errors,
        diagnostics: lowerer.diagnostics,
    }
}

/// Named children with comments and other extras filtered out.
fn named_children(node: Node) -> Vec<Node> {
    (0..node.named_child_count())
        .filter_map(|i| node.named_child(i))
        .filter(|child| !child.is_extra() && child.kind() != "comment")
        .collect()
}

fn has_token(node: Node, token: &str) -> bool {
    (0..node.child_count())
        .filter_map(|i| node.child(i))
        .any(|child| !child.is_named() && child.kind() == token)
}

fn is_statement_kind(kind: &str) -> bool {
    kind.ends_with("_statement") || kind.ends_with("_declaration") || kind == "statement_block"
}

fn strip_quotes(text: &str) -> String {
    let mut chars = text.chars();
    match (chars.next(), text.chars().last()) {
        (Some(first), Some(last))
            if text.len() >= 2 && (first == '"' || first == '\'') && first == last =>
        {
            text[1..text.len() - 1].to_string()
        }
        _ => text.to_string(),
    }
}

fn parse_number(raw: &str) -> f64 {
    let cleaned: String = raw.chars().filter(|c| *c != '_').collect();
    let lower = cleaned.to_ascii_lowercase();
    let radix_value = |digits: &str, radix: u32| {
        u64::from_str_radix(digits, radix)
            .map(|v| v as f64)
            .unwrap_or(f64::NAN)
    };
    if let Some(hex) = lower.strip_prefix("0x") {
        radix_value(hex, 16)
    } else if let Some(oct) = lower.strip_prefix("0o") {
        radix_value(oct, 8)
    } else if let Some(bin) = lower.strip_prefix("0b") {
        radix_value(bin, 2)
    } else {
        lower.parse::<f64>().unwrap_or(f64::NAN)
    }
}

impl<'s> Lowerer<'s> {
    pub fn new(source: &'s str) -> Self {
        Self {
            source,
            depth: 0,
            truncated: false,
            recovered_errors: false,
            diagnostics: Vec::new(),
        }
    }

    fn text(&self, node: Node) -> &'s str {
        node_text(&node, self.source)
    }

    fn field_text(&self, node: Node, field: &str) -> Option<String> {
        node.child_by_field_name(field)
            .map(|child| self.text(child).to_string())
    }

    fn enter(&mut self, loc: Location) -> bool {
        if self.depth >= MAX_LOWERING_DEPTH {
            if !self.truncated {
                self.truncated = true;
                self.diagnostics.push(Diagnostic::parse(
                    "nesting too deep; subtree truncated",
                    Some(loc),
                ));
            }
            return false;
        }
        self.depth += 1;
        true
    }

    fn leave(&mut self) {
        self.depth -= 1;
    }

    // ---------------------------------------------------------------------
    // Statements
    // ---------------------------------------------------------------------

    fn lower_stmt_list(&mut self, nodes: &[Node]) -> Vec<Stmt> {
        let mut stmts = Vec::with_capacity(nodes.len());
        for node in nodes {
            if node.is_error() {
                self.recovered_errors = true;
                let salvaged: Vec<Node> = named_children(*node)
                    .into_iter()
                    .filter(|child| is_statement_kind(child.kind()))
                    .collect();
                stmts.extend(self.lower_stmt_list(&salvaged));
            } else {
                stmts.push(self.lower_stmt(*node));
            }
        }
        stmts
    }

    fn lower_block(&mut self, node: Option<Node>) -> Vec<Stmt> {
        match node {
            Some(block) if block.kind() == "statement_block" => {
                self.lower_stmt_list(&named_children(block))
            }
            Some(other) => vec![self.lower_stmt(other)],
            None => Vec::new(),
        }
    }

    pub fn lower_stmt(&mut self, node: Node) -> Stmt {
        let loc = node_location(&node);
        if !self.enter(loc) {
            return Stmt {
                kind: StmtKind::Unknown,
                loc,
            };
        }
        let kind = self.lower_stmt_kind(node);
        self.leave();
        Stmt { kind, loc }
    }

    fn boxed_stmt(&mut self, node: Option<Node>, fallback: Location) -> Box<Stmt> {
        Box::new(match node {
            Some(n) => self.lower_stmt(n),
            None => Stmt {
                kind: StmtKind::Empty,
                loc: fallback,
            },
        })
    }

    fn lower_stmt_kind(&mut self, node: Node) -> StmtKind {
        let loc = node_location(&node);
        match node.kind() {
            "lexical_declaration" | "variable_declaration" => {
                StmtKind::Var(self.lower_var_decl(node))
            }
            "function_declaration" | "generator_function_declaration" => {
                StmtKind::Function(Box::new(self.lower_function(node)))
            }
            "class_declaration" | "abstract_class_declaration" => {
                StmtKind::Class(Box::new(self.lower_class(node)))
            }
            "expression_statement" => match named_children(node).first() {
                Some(expr) => StmtKind::Expr(self.lower_expr(*expr)),
                None => StmtKind::Empty,
            },
            "statement_block" => StmtKind::Block(self.lower_stmt_list(&named_children(node))),
            "if_statement" => {
                let test = self.lower_opt_expr(node.child_by_field_name("condition"), loc);
                let consequent = self.boxed_stmt(node.child_by_field_name("consequence"), loc);
                let alternate = node
                    .child_by_field_name("alternative")
                    .and_then(|clause| {
                        if clause.kind() == "else_clause" {
                            named_children(clause).into_iter().next()
                        } else {
                            Some(clause)
                        }
                    })
                    .map(|stmt| Box::new(self.lower_stmt(stmt)));
                StmtKind::If {
                    test,
                    consequent,
                    alternate,
                }
            }
            "for_statement" => self.lower_for(node, loc),
            "for_in_statement" => self.lower_for_in(node, loc),
            "while_statement" => StmtKind::While {
                test: self.lower_opt_expr(node.child_by_field_name("condition"), loc),
                body: self.boxed_stmt(node.child_by_field_name("body"), loc),
            },
            "do_statement" => StmtKind::DoWhile {
                body: self.boxed_stmt(node.child_by_field_name("body"), loc),
                test: self.lower_opt_expr(node.child_by_field_name("condition"), loc),
            },
            "return_statement" => {
                StmtKind::Return(named_children(node).first().map(|e| self.lower_expr(*e)))
            }
            "throw_statement" => {
                let arg = named_children(node).first().copied();
                StmtKind::Throw(self.lower_opt_expr(arg, loc))
            }
            "try_statement" => {
                let block = self.lower_block(node.child_by_field_name("body"));
                let handler = node.child_by_field_name("handler").map(|clause| CatchClause {
                    param: clause
                        .child_by_field_name("parameter")
                        .map(|p| self.lower_pat(p)),
                    body: self.lower_block(clause.child_by_field_name("body")),
                    loc: node_location(&clause),
                });
                let finalizer = node
                    .child_by_field_name("finalizer")
                    .map(|clause| self.lower_block(clause.child_by_field_name("body")));
                StmtKind::Try {
                    block,
                    handler,
                    finalizer,
                }
            }
            "switch_statement" => self.lower_switch(node, loc),
            "break_statement" => StmtKind::Break,
            "continue_statement" => StmtKind::Continue,
            "labeled_statement" => StmtKind::Labeled {
                label: self.field_text(node, "label").unwrap_or_default(),
                body: self.boxed_stmt(node.child_by_field_name("body"), loc),
            },
            "import_statement" => StmtKind::Import(self.lower_import(node)),
            "export_statement" => self.lower_export(node),
            "interface_declaration" | "type_alias_declaration" | "enum_declaration" => {
                StmtKind::TypeDecl(self.field_text(node, "name").unwrap_or_default())
            }
            "empty_statement" => StmtKind::Empty,
            "debugger_statement" => StmtKind::Debugger,
            _ => StmtKind::Unknown,
        }
    }

    fn lower_var_decl(&mut self, node: Node) -> VarDecl {
        let kind = if node.kind() == "variable_declaration" {
            DeclKind::Var
        } else {
            match node.child_by_field_name("kind").map(|k| self.text(k)) {
                Some("let") => DeclKind::Let,
                Some("const") => DeclKind::Const,
                _ if has_token(node, "let") => DeclKind::Let,
                _ => DeclKind::Const,
            }
        };

        let declarators = named_children(node)
            .into_iter()
            .filter(|child| child.kind() == "variable_declarator")
            .map(|declarator| self.lower_declarator(declarator))
            .collect();

        VarDecl { kind, declarators }
    }

    fn lower_declarator(&mut self, node: Node) -> Declarator {
        let loc = node_location(&node);
        let id = match node.child_by_field_name("name") {
            Some(name) => self.lower_pat(name),
            None => Pat::new(PatKind::Unknown, loc),
        };
        let mut init = node.child_by_field_name("value").map(|v| self.lower_expr(v));

        // Anonymous functions and classes take the name of their binding
        if let (PatKind::Ident(name), Some(value)) = (&id.kind, init.as_mut()) {
            match &mut value.kind {
                ExprKind::Function(function) if function.name.is_none() => {
                    function.name = Some(name.clone());
                }
                ExprKind::Class(class) if class.name.is_none() => {
                    class.name = Some(name.clone());
                }
                _ => {}
            }
        }

        Declarator { id, init, loc }
    }

    fn lower_for(&mut self, node: Node, loc: Location) -> StmtKind {
        let init = node
            .child_by_field_name("initializer")
            .and_then(|init| match init.kind() {
                "lexical_declaration" | "variable_declaration" => {
                    Some(ForInit::Var(self.lower_var_decl(init)))
                }
                "empty_statement" | ";" => None,
                "expression_statement" => named_children(init)
                    .first()
                    .map(|e| ForInit::Expr(self.lower_expr(*e))),
                _ => Some(ForInit::Expr(self.lower_expr(init))),
            });

        let test = node
            .child_by_field_name("condition")
            .and_then(|cond| match cond.kind() {
                "empty_statement" | ";" => None,
                "expression_statement" => named_children(cond).first().map(|e| self.lower_expr(*e)),
                _ => Some(self.lower_expr(cond)),
            });

        let update = node
            .child_by_field_name("increment")
            .map(|inc| self.lower_expr(inc));

        StmtKind::For {
            init,
            test,
            update,
            body: self.boxed_stmt(node.child_by_field_name("body"), loc),
        }
    }

    fn lower_for_in(&mut self, node: Node, loc: Location) -> StmtKind {
        let of = match node.child_by_field_name("operator") {
            Some(op) => self.text(op) == "of",
            None => has_token(node, "of"),
        };

        let pat = match node.child_by_field_name("left") {
            Some(left) => self.lower_assign_target(left),
            None => Pat::new(PatKind::Unknown, loc),
        };
        let decl_kind = node
            .child_by_field_name("kind")
            .map(|k| self.text(k))
            .or_else(|| {
                ["const", "let", "var"]
                    .into_iter()
                    .find(|token| has_token(node, token))
            });
        let left = match decl_kind {
            Some("var") => ForHead::Var {
                kind: DeclKind::Var,
                pat,
            },
            Some("let") => ForHead::Var {
                kind: DeclKind::Let,
                pat,
            },
            Some("const") => ForHead::Var {
                kind: DeclKind::Const,
                pat,
            },
            _ => ForHead::Pat(pat),
        };

        StmtKind::ForIn {
            left,
            right: self.lower_opt_expr(node.child_by_field_name("right"), loc),
            body: self.boxed_stmt(node.child_by_field_name("body"), loc),
            of,
        }
    }

    fn lower_switch(&mut self, node: Node, loc: Location) -> StmtKind {
        let discriminant = self.lower_opt_expr(node.child_by_field_name("value"), loc);
        let cases = node
            .child_by_field_name("body")
            .map(|body| {
                named_children(body)
                    .into_iter()
                    .filter(|c| c.kind() == "switch_case" || c.kind() == "switch_default")
                    .map(|case| {
                        let value = case.child_by_field_name("value");
                        let stmts: Vec<Node> = named_children(case)
                            .into_iter()
                            .filter(|child| Some(child.id()) != value.map(|v| v.id()))
                            .collect();
                        SwitchCase {
                            test: value.map(|v| self.lower_expr(v)),
                            body: self.lower_stmt_list(&stmts),
                            loc: node_location(&case),
                        }
                    })
                    .collect()
            })
            .unwrap_or_default();

        StmtKind::Switch {
            discriminant,
            cases,
        }
    }

    fn lower_import(&mut self, node: Node) -> ImportDecl {
        let source = node
            .child_by_field_name("source")
            .map(|s| strip_quotes(self.text(s)))
            .unwrap_or_default();

        let mut specifiers = Vec::new();
        for clause in named_children(node)
            .into_iter()
            .filter(|c| c.kind() == "import_clause")
        {
            for part in named_children(clause) {
                match part.kind() {
                    "identifier" => specifiers.push(ImportSpec {
                        local: self.text(part).to_string(),
                        imported: None,
                        kind: ImportKind::Default,
                    }),
                    "namespace_import" => {
                        if let Some(ident) = named_children(part).first() {
                            specifiers.push(ImportSpec {
                                local: self.text(*ident).to_string(),
                                imported: None,
                                kind: ImportKind::Namespace,
                            });
                        }
                    }
                    "named_imports" => {
                        for spec in named_children(part)
                            .into_iter()
                            .filter(|s| s.kind() == "import_specifier")
                        {
                            let imported = self.field_text(spec, "name");
                            let local = self
                                .field_text(spec, "alias")
                                .or_else(|| imported.clone())
                                .unwrap_or_default();
                            specifiers.push(ImportSpec {
                                local,
                                imported,
                                kind: ImportKind::Named,
                            });
                        }
                    }
                    _ => {}
                }
            }
        }

        ImportDecl { source, specifiers }
    }

    fn lower_export(&mut self, node: Node) -> StmtKind {
        if let Some(decl) = node.child_by_field_name("declaration") {
            return StmtKind::Export(ExportDecl::Decl(Box::new(self.lower_stmt(decl))));
        }
        if let Some(value) = node.child_by_field_name("value") {
            return StmtKind::Export(ExportDecl::Default(self.lower_expr(value)));
        }
        let source = node
            .child_by_field_name("source")
            .map(|s| strip_quotes(self.text(s)));
        StmtKind::Export(ExportDecl::Named { source })
    }

    // ---------------------------------------------------------------------
    // Functions and classes
    // ---------------------------------------------------------------------

    fn lower_function(&mut self, node: Node) -> Function {
        let loc = node_location(&node);
        let is_arrow = node.kind() == "arrow_function";

        let params = if let Some(single) = node.child_by_field_name("parameter") {
            vec![self.lower_pat(single)]
        } else {
            node.child_by_field_name("parameters")
                .map(|params| self.lower_params(params))
                .unwrap_or_default()
        };

        let body = match node.child_by_field_name("body") {
            Some(body) if body.kind() == "statement_block" => {
                FunctionBody::Block(self.lower_stmt_list(&named_children(body)))
            }
            Some(expr) => FunctionBody::Expr(Box::new(self.lower_expr(expr))),
            None => FunctionBody::Block(Vec::new()),
        };

        Function {
            name: node
                .child_by_field_name("name")
                .map(|n| self.text(n).to_string()),
            params,
            body,
            is_arrow,
            is_async: has_token(node, "async"),
            is_generator: has_token(node, "*") || node.kind().starts_with("generator_"),
            loc,
        }
    }

    fn lower_params(&mut self, node: Node) -> Vec<Pat> {
        named_children(node)
            .into_iter()
            .map(|param| match param.kind() {
                "required_parameter" | "optional_parameter" => {
                    let loc = node_location(&param);
                    let target = param
                        .child_by_field_name("pattern")
                        .map(|p| self.lower_pat(p))
                        .unwrap_or_else(|| Pat::new(PatKind::Unknown, loc));
                    match param.child_by_field_name("value") {
                        Some(default) => Pat::new(
                            PatKind::Default {
                                target: Box::new(target),
                                default: Box::new(self.lower_expr(default)),
                            },
                            loc,
                        ),
                        None => target,
                    }
                }
                _ => self.lower_pat(param),
            })
            .collect()
    }

    fn lower_class(&mut self, node: Node) -> Class {
        let loc = node_location(&node);
        let super_class = named_children(node)
            .into_iter()
            .find(|c| c.kind() == "class_heritage")
            .and_then(|heritage| named_children(heritage).into_iter().next())
            .and_then(|clause| {
                if clause.kind() == "extends_clause" {
                    clause
                        .child_by_field_name("value")
                        .or_else(|| named_children(clause).into_iter().next())
                } else {
                    Some(clause)
                }
            })
            .map(|expr| self.lower_expr(expr));

        let members = node
            .child_by_field_name("body")
            .map(|body| {
                named_children(body)
                    .into_iter()
                    .filter_map(|member| self.lower_class_member(member))
                    .collect()
            })
            .unwrap_or_default();

        Class {
            name: node
                .child_by_field_name("name")
                .map(|n| self.text(n).to_string()),
            super_class,
            members,
            loc,
        }
    }

    fn lower_class_member(&mut self, node: Node) -> Option<ClassMember> {
        let is_static = has_token(node, "static");
        match node.kind() {
            "method_definition" => {
                let key = self.lower_prop_key(node.child_by_field_name("name"));
                let kind = if key.name() == Some("constructor") {
                    MethodKind::Constructor
                } else if has_token(node, "get") {
                    MethodKind::Getter
                } else if has_token(node, "set") {
                    MethodKind::Setter
                } else {
                    MethodKind::Method
                };
                let mut function = self.lower_function(node);
                function.name = key.name().map(String::from);
                Some(ClassMember::Method {
                    key,
                    function,
                    kind,
                    is_static,
                })
            }
            "field_definition" | "public_field_definition" => {
                let key_node = node
                    .child_by_field_name("property")
                    .or_else(|| node.child_by_field_name("name"));
                Some(ClassMember::Field {
                    key: self.lower_prop_key(key_node),
                    value: node
                        .child_by_field_name("value")
                        .map(|v| self.lower_expr(v)),
                    is_static,
                })
            }
            "class_static_block" => Some(ClassMember::StaticBlock(
                self.lower_block(node.child_by_field_name("body")),
            )),
            _ => None,
        }
    }

    fn lower_prop_key(&mut self, node: Option<Node>) -> PropKey {
        let Some(node) = node else {
            return PropKey::Ident(String::new());
        };
        match node.kind() {
            "string" => PropKey::Str(strip_quotes(self.text(node))),
            "number" => PropKey::Num(self.text(node).to_string()),
            "private_property_identifier" => PropKey::Private(self.text(node).to_string()),
            "computed_property_name" => match named_children(node).first() {
                Some(expr) => PropKey::Computed(Box::new(self.lower_expr(*expr))),
                None => PropKey::Ident(String::new()),
            },
            _ => PropKey::Ident(self.text(node).to_string()),
        }
    }

    // ---------------------------------------------------------------------
    // Expressions
    // ---------------------------------------------------------------------

    fn lower_opt_expr(&mut self, node: Option<Node>, fallback: Location) -> Expr {
        match node {
            Some(n) => self.lower_expr(n),
            None => Expr::new(ExprKind::Unknown, fallback),
        }
    }

    pub fn lower_expr(&mut self, node: Node) -> Expr {
        let loc = node_location(&node);
        if !self.enter(loc) {
            return Expr::new(ExprKind::Unknown, loc);
        }
        let expr = match node.kind() {
            // Parentheses are transparent
            "parenthesized_expression" => match named_children(node).first() {
                Some(inner) => self.lower_expr(*inner),
                None => Expr::new(ExprKind::Unknown, loc),
            },
            _ => Expr::new(self.lower_expr_kind(node, loc), loc),
        };
        self.leave();
        expr
    }

    fn lower_args(&mut self, node: Option<Node>) -> Vec<Expr> {
        match node {
            Some(args) if args.kind() == "arguments" => named_children(args)
                .into_iter()
                .map(|a| self.lower_expr(a))
                .collect(),
            // Tagged template: the template is the sole argument
            Some(template) => vec![self.lower_expr(template)],
            None => Vec::new(),
        }
    }

    fn lower_expr_kind(&mut self, node: Node, loc: Location) -> ExprKind {
        match node.kind() {
            "identifier" | "shorthand_property_identifier" | "property_identifier" | "import" => {
                ExprKind::Ident(self.text(node).to_string())
            }
            "this" => ExprKind::This,
            "super" => ExprKind::Super,
            "true" => ExprKind::Lit(Lit::Bool(true)),
            "false" => ExprKind::Lit(Lit::Bool(false)),
            "null" => ExprKind::Lit(Lit::Null),
            "undefined" => ExprKind::Lit(Lit::Undefined),
            "number" => {
                let raw = self.text(node).to_string();
                if let Some(digits) = raw.strip_suffix('n') {
                    ExprKind::Lit(Lit::BigInt(digits.to_string()))
                } else {
                    ExprKind::Lit(Lit::Num {
                        value: parse_number(&raw),
                        raw,
                    })
                }
            }
            "string" => ExprKind::Lit(Lit::Str(strip_quotes(self.text(node)))),
            "regex" => ExprKind::Lit(Lit::Regex {
                pattern: self.field_text(node, "pattern").unwrap_or_default(),
                flags: self.field_text(node, "flags").unwrap_or_default(),
            }),
            "template_string" => self.lower_template(node),
            "array" => ExprKind::Array(
                named_children(node)
                    .into_iter()
                    .map(|e| self.lower_expr(e))
                    .collect(),
            ),
            "object" => ExprKind::Object(self.lower_object(node)),
            "function" | "function_expression" | "generator_function" | "arrow_function" => {
                ExprKind::Function(Box::new(self.lower_function(node)))
            }
            "class" => ExprKind::Class(Box::new(self.lower_class(node))),
            "call_expression" => {
                let callee = self.lower_opt_expr(node.child_by_field_name("function"), loc);
                ExprKind::Call {
                    callee: Box::new(callee),
                    args: self.lower_args(node.child_by_field_name("arguments")),
                    optional: node.child_by_field_name("optional_chain").is_some(),
                }
            }
            "new_expression" => {
                let callee = self.lower_opt_expr(node.child_by_field_name("constructor"), loc);
                ExprKind::New {
                    callee: Box::new(callee),
                    args: self.lower_args(node.child_by_field_name("arguments")),
                }
            }
            "member_expression" => {
                let object = self.lower_opt_expr(node.child_by_field_name("object"), loc);
                let prop = match node.child_by_field_name("property") {
                    Some(p) if p.kind() == "private_property_identifier" => {
                        MemberProp::Private(self.text(p).to_string())
                    }
                    Some(p) => MemberProp::Ident(self.text(p).to_string()),
                    None => MemberProp::Ident(String::new()),
                };
                ExprKind::Member {
                    object: Box::new(object),
                    prop,
                    optional: node.child_by_field_name("optional_chain").is_some(),
                }
            }
            "subscript_expression" => {
                let object = self.lower_opt_expr(node.child_by_field_name("object"), loc);
                let index = self.lower_opt_expr(node.child_by_field_name("index"), loc);
                ExprKind::Member {
                    object: Box::new(object),
                    prop: MemberProp::Computed(Box::new(index)),
                    optional: node.child_by_field_name("optional_chain").is_some(),
                }
            }
            "assignment_expression" | "augmented_assignment_expression" => {
                let op = match node.child_by_field_name("operator") {
                    Some(op) => AssignOp::from_token(self.text(op)),
                    None => AssignOp::Assign,
                };
                let target = match node.child_by_field_name("left") {
                    Some(left) => self.lower_assign_target(left),
                    None => Pat::new(PatKind::Unknown, loc),
                };
                ExprKind::Assign {
                    op,
                    target: Box::new(target),
                    value: Box::new(self.lower_opt_expr(node.child_by_field_name("right"), loc)),
                }
            }
            "update_expression" => {
                let op_text = node
                    .child_by_field_name("operator")
                    .map(|op| self.text(op))
                    .unwrap_or("++");
                let prefix = node
                    .child(0)
                    .map(|first| !first.is_named())
                    .unwrap_or(false);
                ExprKind::Update {
                    op: if op_text == "--" {
                        UpdateOp::Decrement
                    } else {
                        UpdateOp::Increment
                    },
                    prefix,
                    arg: Box::new(self.lower_opt_expr(node.child_by_field_name("argument"), loc)),
                }
            }
            "unary_expression" => {
                let op = node
                    .child_by_field_name("operator")
                    .and_then(|op| UnaryOp::from_token(self.text(op)));
                let arg = self.lower_opt_expr(node.child_by_field_name("argument"), loc);
                match op {
                    Some(op) => ExprKind::Unary {
                        op,
                        arg: Box::new(arg),
                    },
                    None => ExprKind::Unknown,
                }
            }
            "binary_expression" => {
                let op = node
                    .child_by_field_name("operator")
                    .and_then(|op| BinaryOp::from_token(self.text(op)));
                let left = self.lower_opt_expr(node.child_by_field_name("left"), loc);
                let right = self.lower_opt_expr(node.child_by_field_name("right"), loc);
                match op {
                    Some(op) => ExprKind::Binary {
                        op,
                        left: Box::new(left),
                        right: Box::new(right),
                    },
                    None => ExprKind::Unknown,
                }
            }
            "ternary_expression" => ExprKind::Conditional {
                test: Box::new(self.lower_opt_expr(node.child_by_field_name("condition"), loc)),
                consequent: Box::new(
                    self.lower_opt_expr(node.child_by_field_name("consequence"), loc),
                ),
                alternate: Box::new(
                    self.lower_opt_expr(node.child_by_field_name("alternative"), loc),
                ),
            },
            "sequence_expression" => {
                let mut exprs = Vec::new();
                for child in named_children(node) {
                    let lowered = self.lower_expr(child);
                    match lowered.kind {
                        ExprKind::Sequence(inner) => exprs.extend(inner),
                        _ => exprs.push(lowered),
                    }
                }
                ExprKind::Sequence(exprs)
            }
            "spread_element" => {
                let inner = named_children(node).first().copied();
                ExprKind::Spread(Box::new(self.lower_opt_expr(inner, loc)))
            }
            "await_expression" => {
                let inner = named_children(node).first().copied();
                ExprKind::Await(Box::new(self.lower_opt_expr(inner, loc)))
            }
            "yield_expression" => ExprKind::Yield(
                named_children(node)
                    .first()
                    .map(|e| Box::new(self.lower_expr(*e))),
            ),
            "as_expression" | "satisfies_expression" | "non_null_expression" => {
                let inner = named_children(node).first().copied();
                ExprKind::TypeWrap(Box::new(self.lower_opt_expr(inner, loc)))
            }
            "type_assertion" => {
                let inner = named_children(node).last().copied();
                ExprKind::TypeWrap(Box::new(self.lower_opt_expr(inner, loc)))
            }
            "jsx_element" | "jsx_self_closing_element" | "jsx_fragment" => {
                ExprKind::Jsx(Box::new(self.lower_jsx(node)))
            }
            _ => ExprKind::Unknown,
        }
    }

    fn lower_template(&mut self, node: Node) -> ExprKind {
        let mut quasis = Vec::new();
        let mut exprs = Vec::new();
        let mut current = String::new();

        for child in named_children(node) {
            if child.kind() == "template_substitution" {
                quasis.push(std::mem::take(&mut current));
                let inner = named_children(child).first().copied();
                exprs.push(self.lower_opt_expr(inner, node_location(&child)));
            } else {
                current.push_str(self.text(child));
            }
        }
        quasis.push(current);

        ExprKind::Template { quasis, exprs }
    }

    fn lower_object(&mut self, node: Node) -> Vec<Prop> {
        named_children(node)
            .into_iter()
            .filter_map(|prop| {
                let loc = node_location(&prop);
                match prop.kind() {
                    "pair" => {
                        let key = self.lower_prop_key(prop.child_by_field_name("key"));
                        let value = self.lower_opt_expr(prop.child_by_field_name("value"), loc);
                        Some(Prop::KeyValue { key, value, loc })
                    }
                    "shorthand_property_identifier" => Some(Prop::Shorthand {
                        name: self.text(prop).to_string(),
                        loc,
                    }),
                    "spread_element" => {
                        let inner = named_children(prop).first().copied();
                        Some(Prop::Spread(self.lower_opt_expr(inner, loc)))
                    }
                    "method_definition" => {
                        let key = self.lower_prop_key(prop.child_by_field_name("name"));
                        let mut function = self.lower_function(prop);
                        function.name = key.name().map(String::from);
                        Some(Prop::Method { key, function })
                    }
                    _ => None,
                }
            })
            .collect()
    }

    // ---------------------------------------------------------------------
    // Patterns
    // ---------------------------------------------------------------------

    fn lower_assign_target(&mut self, node: Node) -> Pat {
        match node.kind() {
            "member_expression" | "subscript_expression" => {
                let expr = self.lower_expr(node);
                Pat::new(PatKind::Expr(Box::new(expr)), node_location(&node))
            }
            "parenthesized_expression" => match named_children(node).first() {
                Some(inner) => self.lower_assign_target(*inner),
                None => Pat::new(PatKind::Unknown, node_location(&node)),
            },
            _ => self.lower_pat(node),
        }
    }

    pub fn lower_pat(&mut self, node: Node) -> Pat {
        let loc = node_location(&node);
        if !self.enter(loc) {
            return Pat::new(PatKind::Unknown, loc);
        }
        let kind = self.lower_pat_kind(node, loc);
        self.leave();
        Pat::new(kind, loc)
    }

    fn lower_pat_kind(&mut self, node: Node, loc: Location) -> PatKind {
        match node.kind() {
            "identifier" | "shorthand_property_identifier_pattern" | "undefined" => {
                PatKind::Ident(self.text(node).to_string())
            }
            "object_pattern" => PatKind::Object(
                named_children(node)
                    .into_iter()
                    .filter_map(|prop| self.lower_object_pat_prop(prop))
                    .collect(),
            ),
            "array_pattern" => PatKind::Array(
                named_children(node)
                    .into_iter()
                    .map(|p| self.lower_pat(p))
                    .collect(),
            ),
            "rest_pattern" => match named_children(node).first() {
                Some(inner) => PatKind::Rest(Box::new(self.lower_pat(*inner))),
                None => PatKind::Unknown,
            },
            "assignment_pattern" => {
                let target = match node.child_by_field_name("left") {
                    Some(left) => self.lower_pat(left),
                    None => Pat::new(PatKind::Unknown, loc),
                };
                PatKind::Default {
                    target: Box::new(target),
                    default: Box::new(self.lower_opt_expr(node.child_by_field_name("right"), loc)),
                }
            }
            "member_expression" | "subscript_expression" => {
                PatKind::Expr(Box::new(self.lower_expr(node)))
            }
            "required_parameter" | "optional_parameter" => {
                match node.child_by_field_name("pattern") {
                    Some(pattern) => self.lower_pat(pattern).kind,
                    None => PatKind::Unknown,
                }
            }
            _ => PatKind::Unknown,
        }
    }

    fn lower_object_pat_prop(&mut self, node: Node) -> Option<ObjectPatProp> {
        let loc = node_location(&node);
        match node.kind() {
            "pair_pattern" => Some(ObjectPatProp::KeyValue {
                key: self.lower_prop_key(node.child_by_field_name("key")),
                value: match node.child_by_field_name("value") {
                    Some(value) => self.lower_pat(value),
                    None => Pat::new(PatKind::Unknown, loc),
                },
            }),
            "shorthand_property_identifier_pattern" => Some(ObjectPatProp::Shorthand {
                name: self.text(node).to_string(),
                default: None,
            }),
            "object_assignment_pattern" => {
                let left = node.child_by_field_name("left")?;
                let default = node.child_by_field_name("right").map(|r| self.lower_expr(r));
                if left.kind() == "shorthand_property_identifier_pattern" {
                    Some(ObjectPatProp::Shorthand {
                        name: self.text(left).to_string(),
                        default,
                    })
                } else {
                    let target = self.lower_pat(left);
                    Some(ObjectPatProp::KeyValue {
                        key: PropKey::Ident(String::new()),
                        value: match default {
                            Some(default) => Pat::new(
                                PatKind::Default {
                                    target: Box::new(target),
                                    default: Box::new(default),
                                },
                                loc,
                            ),
                            None => target,
                        },
                    })
                }
            }
            "rest_pattern" => Some(ObjectPatProp::Rest(self.lower_pat(node))),
            _ => None,
        }
    }

    // ---------------------------------------------------------------------
    // JSX
    // ---------------------------------------------------------------------

    fn lower_jsx(&mut self, node: Node) -> JsxElement {
        let loc = node_location(&node);
        let opening = if node.kind() == "jsx_element" {
            named_children(node)
                .into_iter()
                .find(|c| c.kind() == "jsx_opening_element")
        } else if node.kind() == "jsx_self_closing_element" {
            Some(node)
        } else {
            None
        };

        let (name, attrs) = match opening {
            Some(open) => {
                let name_node = open.child_by_field_name("name");
                let name = name_node.map(|n| self.text(n).to_string());
                let attrs = named_children(open)
                    .into_iter()
                    .filter(|c| Some(c.id()) != name_node.map(|n| n.id()))
                    .filter_map(|attr| self.lower_jsx_attr(attr))
                    .collect();
                (name, attrs)
            }
            None => (None, Vec::new()),
        };

        let children = if node.kind() == "jsx_self_closing_element" {
            Vec::new()
        } else {
            named_children(node)
                .into_iter()
                .filter_map(|child| self.lower_jsx_child(child))
                .collect()
        };

        JsxElement {
            name,
            attrs,
            children,
            loc,
        }
    }

    fn lower_jsx_attr(&mut self, node: Node) -> Option<JsxAttr> {
        let loc = node_location(&node);
        match node.kind() {
            "jsx_attribute" => {
                let parts = named_children(node);
                let name = parts.first().map(|n| self.text(*n).to_string())?;
                let value = parts.get(1).and_then(|value| match value.kind() {
                    "jsx_expression" => self.lower_jsx_expression(*value),
                    _ => Some(self.lower_expr(*value)),
                });
                Some(JsxAttr::Named { name, value, loc })
            }
            "jsx_expression" => self.lower_jsx_expression(node).map(|expr| match expr.kind {
                ExprKind::Spread(inner) => JsxAttr::Spread(*inner),
                _ => JsxAttr::Spread(expr),
            }),
            _ => None,
        }
    }

    fn lower_jsx_expression(&mut self, node: Node) -> Option<Expr> {
        named_children(node).first().map(|inner| self.lower_expr(*inner))
    }

    fn lower_jsx_child(&mut self, node: Node) -> Option<JsxChild> {
        match node.kind() {
            "jsx_text" | "html_character_reference" => {
                let text = self.text(node).trim();
                (!text.is_empty()).then(|| JsxChild::Text(text.to_string()))
            }
            "jsx_expression" => self.lower_jsx_expression(node).map(JsxChild::Expr),
            "jsx_element" | "jsx_self_closing_element" | "jsx_fragment" => {
                if !self.enter(node_location(&node)) {
                    return None;
                }
                let element = self.lower_jsx(node);
                self.leave();
                Some(JsxChild::Element(Box::new(element)))
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Dialect;
    use crate::frontend::parser::parse_source;

    fn lower(source: &str, dialect: Dialect) -> Lowered {
        let tree = parse_source(source, dialect).unwrap();
        lower_program(tree.root_node(), source)
    }

    fn first_stmt(source: &str) -> Stmt {
        lower(source, Dialect::Tsx).program.body.remove(0)
    }

    #[test]
    fn test_lower_declarations() {
        let program = lower("var a = 1; let b = 'x'; const c = [1, 2];", Dialect::JavaScript).program;
        let kinds: Vec<DeclKind> = program
            .body
            .iter()
            .filter_map(|s| match &s.kind {
                StmtKind::Var(decl) => Some(decl.kind),
                _ => None,
            })
            .collect();
        assert_eq!(kinds, vec![DeclKind::Var, DeclKind::Let, DeclKind::Const]);
    }

    #[test]
    fn test_arrow_function_inherits_binding_name() {
        let stmt = first_stmt("const App = () => <div />;");
        let StmtKind::Var(decl) = stmt.kind else {
            panic!("expected declaration");
        };
        let init = decl.declarators[0].init.as_ref().unwrap();
        let function = init.as_function().unwrap();
        assert_eq!(function.name.as_deref(), Some("App"));
        assert!(function.is_arrow);
        assert!(matches!(function.body, FunctionBody::Expr(_)));
    }

    #[test]
    fn test_for_statement_parts() {
        let stmt = first_stmt("for (let i = 0; i <= arr.length; i++) { use(arr[i]); }");
        let StmtKind::For {
            init, test, update, ..
        } = stmt.kind
        else {
            panic!("expected for statement");
        };
        assert!(matches!(init, Some(ForInit::Var(_))));
        assert!(matches!(
            test.map(|t| t.kind),
            Some(ExprKind::Binary {
                op: BinaryOp::LtEq,
                ..
            })
        ));
        assert!(matches!(
            update.map(|u| u.kind),
            Some(ExprKind::Update {
                op: UpdateOp::Increment,
                prefix: false,
                ..
            })
        ));
    }

    #[test]
    fn test_for_of_head() {
        let stmt = first_stmt("for (const item of items) {}");
        assert!(matches!(
            stmt.kind,
            StmtKind::ForIn {
                of: true,
                left: ForHead::Var {
                    kind: DeclKind::Const,
                    ..
                },
                ..
            }
        ));
    }

    #[test]
    fn test_member_assignment_target() {
        let stmt = first_stmt("copy.nested.value = 5;");
        let StmtKind::Expr(expr) = stmt.kind else {
            panic!("expected expression");
        };
        let ExprKind::Assign { target, .. } = expr.kind else {
            panic!("expected assignment");
        };
        assert!(target.as_expr().is_some());
    }

    #[test]
    fn test_typescript_wrappers_are_erased() {
        let stmt = first_stmt("const xs = [] as string[];");
        let StmtKind::Var(decl) = stmt.kind else {
            panic!("expected declaration");
        };
        let init = decl.declarators[0].init.as_ref().unwrap();
        assert!(matches!(init.unwrapped().kind, ExprKind::Array(_)));
    }

    #[test]
    fn test_jsx_attributes_and_children() {
        let stmt = first_stmt(r#"const el = <li key={item.id} {...rest}>Hi {name}</li>;"#);
        let StmtKind::Var(decl) = stmt.kind else {
            panic!("expected declaration");
        };
        let ExprKind::Jsx(element) = &decl.declarators[0].init.as_ref().unwrap().kind else {
            panic!("expected jsx");
        };
        assert_eq!(element.name.as_deref(), Some("li"));
        assert!(element.attr("key").is_some());
        assert!(element.has_spread_attr());
        assert_eq!(element.children.len(), 2);
    }

    fn attr_value<'a>(element: &'a JsxElement, name: &str) -> Option<&'a ExprKind> {
        match element.attr(name)? {
            JsxAttr::Named { value, .. } => value.as_ref().map(|expr| &expr.kind),
            JsxAttr::Spread(_) => None,
        }
    }

    #[test]
    fn test_jsx_attribute_values() {
        let stmt = first_stmt(r#"const el = <input value={draft} type="text" disabled />;"#);
        let StmtKind::Var(decl) = stmt.kind else {
            panic!("expected declaration");
        };
        let ExprKind::Jsx(element) = &decl.declarators[0].init.as_ref().unwrap().kind else {
            panic!("expected jsx");
        };
        assert!(matches!(
            attr_value(element, "value"),
            Some(ExprKind::Ident(name)) if name == "draft"
        ));
        assert!(matches!(attr_value(element, "type"), Some(ExprKind::Lit(_))));
        assert!(element.attr("disabled").is_some());
        assert!(attr_value(element, "disabled").is_none());
    }

    #[test]
    fn test_class_with_heritage() {
        let stmt = first_stmt("class Counter extends React.Component { constructor() { super(); } render() { return null; } }");
        let StmtKind::Class(class) = stmt.kind else {
            panic!("expected class");
        };
        assert!(class.super_class.is_some());
        assert_eq!(class.members.len(), 2);
        assert!(matches!(
            class.members[0],
            ClassMember::Method {
                kind: MethodKind::Constructor,
                ..
            }
        ));
    }

    #[test]
    fn test_error_nodes_mark_tree_partial() {
        let lowered = lower("const x = ;\nconst y = 2;", Dialect::JavaScript);
        assert!(lowered.program.body.len() <= 2);
        // Either the error was salvaged or a declaration still lowered
        assert!(!lowered.program.body.is_empty() || lowered.partial);
    }

    #[test]
    fn test_deep_nesting_is_truncated() {
        let depth = MAX_LOWERING_DEPTH + 50;
        let source = format!("x = {}1{};", "(".repeat(depth), ")".repeat(depth));
        let lowered = lower(&source, Dialect::JavaScript);
        assert!(lowered.partial);
        assert!(lowered
            .diagnostics
            .iter()
            .any(|d| d.message.contains("too deep")));
    }

    fn on_small_stack<F: FnOnce() + Send + 'static>(f: F) {
        std::thread::Builder::new()
            .stack_size(2 * 1024 * 1024)
            .spawn(f)
            .unwrap()
            .join()
            .unwrap();
    }

    fn assert_truncated(source: String) {
        on_small_stack(move || {
            let lowered = lower(&source, Dialect::JavaScript);
            assert!(lowered.partial);
            assert!(lowered
                .diagnostics
                .iter()
                .any(|d| d.message.contains("too deep")));
        });
    }

    #[test]
    fn test_deep_array_nesting_fits_small_stack() {
        let depth = 1200;
        assert_truncated(format!("const a = {}1{};", "[".repeat(depth), "]".repeat(depth)));
    }

    #[test]
    fn test_long_binary_chain_fits_small_stack() {
        assert_truncated(format!("const s = {}1;", "1 + ".repeat(1200)));
    }

    #[test]
    fn test_long_member_chain_fits_small_stack() {
        assert_truncated(format!("a{} = 1;", ".b".repeat(1200)));
    }

    #[test]
    fn test_deep_call_nesting_fits_small_stack() {
        let depth = 1200;
        assert_truncated(format!("{}1{};", "f(".repeat(depth), ")".repeat(depth)));
    }

    #[test]
    fn test_number_parsing() {
        assert_eq!(parse_number("1_000"), 1000.0);
        assert_eq!(parse_number("0x1F"), 31.0);
        assert_eq!(parse_number("0.5"), 0.5);
        assert!(parse_number("abc").is_nan());
    }

    #[test]
    fn test_strip_quotes() {
        assert_eq!(strip_quotes("'react'"), "react");
        assert_eq!(strip_quotes("\"x\""), "x");
        assert_eq!(strip_quotes("plain"), "plain");
    }
}
