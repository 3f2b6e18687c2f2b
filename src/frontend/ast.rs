//! Owned, closed syntax tree for JavaScript, TypeScript and JSX snippets.
//!
//! The tree-sitter CST is lowered into these types so detectors can match
//! exhaustively on node kinds. Type-level syntax is erased during lowering.

use crate::core::Location;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Program {
    pub body: Vec<Stmt>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Stmt {
    pub kind: StmtKind,
    pub loc: Location,
}

#[derive(Debug, Clone, PartialEq)]
pub enum StmtKind {
    Var(VarDecl),
    Function(Box<Function>),
    Class(Box<Class>),
    Expr(Expr),
    Block(Vec<Stmt>),
    If {
        test: Expr,
        consequent: Box<Stmt>,
        alternate: Option<Box<Stmt>>,
    },
    For {
        init: Option<ForInit>,
        test: Option<Expr>,
        update: Option<Expr>,
        body: Box<Stmt>,
    },
    /// `for…in` (`of == false`) and `for…of` (`of == true`)
    ForIn {
        left: ForHead,
        right: Expr,
        body: Box<Stmt>,
        of: bool,
    },
    While {
        test: Expr,
        body: Box<Stmt>,
    },
    DoWhile {
        body: Box<Stmt>,
        test: Expr,
    },
    Return(Option<Expr>),
    Throw(Expr),
    Try {
        block: Vec<Stmt>,
        handler: Option<CatchClause>,
        finalizer: Option<Vec<Stmt>>,
    },
    Switch {
        discriminant: Expr,
        cases: Vec<SwitchCase>,
    },
    Break,
    Continue,
    Labeled {
        label: String,
        body: Box<Stmt>,
    },
    Import(ImportDecl),
    Export(ExportDecl),
    /// Interface, type alias or enum; only the name survives lowering
    TypeDecl(String),
    Empty,
    Debugger,
    /// Unrecognized or truncated statement
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeclKind {
    Var,
    Let,
    Const,
}

#[derive(Debug, Clone, PartialEq)]
pub struct VarDecl {
    pub kind: DeclKind,
    pub declarators: Vec<Declarator>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Declarator {
    pub id: Pat,
    pub init: Option<Expr>,
    pub loc: Location,
}

impl Declarator {
    /// Name bound by a simple `name = …` declarator.
    pub fn name(&self) -> Option<&str> {
        match &self.id.kind {
            PatKind::Ident(name) => Some(name),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ForInit {
    Var(VarDecl),
    Expr(Expr),
}

#[derive(Debug, Clone, PartialEq)]
pub enum ForHead {
    Var { kind: DeclKind, pat: Pat },
    Pat(Pat),
}

#[derive(Debug, Clone, PartialEq)]
pub struct CatchClause {
    pub param: Option<Pat>,
    pub body: Vec<Stmt>,
    pub loc: Location,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SwitchCase {
    /// `None` for `default:`
    pub test: Option<Expr>,
    pub body: Vec<Stmt>,
    pub loc: Location,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportKind {
    Default,
    Named,
    Namespace,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ImportSpec {
    pub local: String,
    pub imported: Option<String>,
    pub kind: ImportKind,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ImportDecl {
    pub source: String,
    pub specifiers: Vec<ImportSpec>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ExportDecl {
    Decl(Box<Stmt>),
    Default(Expr),
    Named { source: Option<String> },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Function {
    pub name: Option<String>,
    pub params: Vec<Pat>,
    pub body: FunctionBody,
    pub is_arrow: bool,
    pub is_async: bool,
    pub is_generator: bool,
    pub loc: Location,
}

#[derive(Debug, Clone, PartialEq)]
pub enum FunctionBody {
    Block(Vec<Stmt>),
    /// Arrow function with an expression body (implicit return)
    Expr(Box<Expr>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Class {
    pub name: Option<String>,
    pub super_class: Option<Expr>,
    pub members: Vec<ClassMember>,
    pub loc: Location,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MethodKind {
    Constructor,
    Method,
    Getter,
    Setter,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ClassMember {
    Method {
        key: PropKey,
        function: Function,
        kind: MethodKind,
        is_static: bool,
    },
    Field {
        key: PropKey,
        value: Option<Expr>,
        is_static: bool,
    },
    StaticBlock(Vec<Stmt>),
}

#[derive(Debug, Clone, PartialEq)]
pub enum PropKey {
    Ident(String),
    Str(String),
    Num(String),
    Private(String),
    Computed(Box<Expr>),
}

impl PropKey {
    /// Static key name, if the key is not computed.
    pub fn name(&self) -> Option<&str> {
        match self {
            PropKey::Ident(name) | PropKey::Str(name) | PropKey::Num(name) | PropKey::Private(name) => {
                Some(name)
            }
            PropKey::Computed(_) => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Expr {
    pub kind: ExprKind,
    pub loc: Location,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ExprKind {
    Ident(String),
    This,
    Super,
    Lit(Lit),
    Template {
        quasis: Vec<String>,
        exprs: Vec<Expr>,
    },
    Array(Vec<Expr>),
    Object(Vec<Prop>),
    Function(Box<Function>),
    Class(Box<Class>),
    Call {
        callee: Box<Expr>,
        args: Vec<Expr>,
        optional: bool,
    },
    New {
        callee: Box<Expr>,
        args: Vec<Expr>,
    },
    Member {
        object: Box<Expr>,
        prop: MemberProp,
        optional: bool,
    },
    Assign {
        op: AssignOp,
        target: Box<Pat>,
        value: Box<Expr>,
    },
    Update {
        op: UpdateOp,
        prefix: bool,
        arg: Box<Expr>,
    },
    Unary {
        op: UnaryOp,
        arg: Box<Expr>,
    },
    Binary {
        op: BinaryOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    Conditional {
        test: Box<Expr>,
        consequent: Box<Expr>,
        alternate: Box<Expr>,
    },
    Sequence(Vec<Expr>),
    Spread(Box<Expr>),
    Await(Box<Expr>),
    Yield(Option<Box<Expr>>),
    Jsx(Box<JsxElement>),
    /// `x as T`, `x satisfies T`, `x!`, `<T>x`; the type is erased
    TypeWrap(Box<Expr>),
    /// Unrecognized or truncated expression
    Unknown,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Lit {
    Str(String),
    Num { value: f64, raw: String },
    BigInt(String),
    Bool(bool),
    Null,
    Undefined,
    Regex { pattern: String, flags: String },
}

#[derive(Debug, Clone, PartialEq)]
pub enum MemberProp {
    Ident(String),
    Private(String),
    Computed(Box<Expr>),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Prop {
    KeyValue { key: PropKey, value: Expr, loc: Location },
    Shorthand { name: String, loc: Location },
    Method { key: PropKey, function: Function },
    Spread(Expr),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Pat {
    pub kind: PatKind,
    pub loc: Location,
}

#[derive(Debug, Clone, PartialEq)]
pub enum PatKind {
    Ident(String),
    Object(Vec<ObjectPatProp>),
    Array(Vec<Pat>),
    Rest(Box<Pat>),
    Default { target: Box<Pat>, default: Box<Expr> },
    /// Member-expression target of an assignment (`a.b = …`)
    Expr(Box<Expr>),
    Unknown,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ObjectPatProp {
    KeyValue { key: PropKey, value: Pat },
    Shorthand { name: String, default: Option<Expr> },
    Rest(Pat),
}

#[derive(Debug, Clone, PartialEq)]
pub struct JsxElement {
    /// `None` for fragments (`<>…</>`)
    pub name: Option<String>,
    pub attrs: Vec<JsxAttr>,
    pub children: Vec<JsxChild>,
    pub loc: Location,
}

impl JsxElement {
    pub fn attr(&self, name: &str) -> Option<&JsxAttr> {
        self.attrs.iter().find(|attr| match attr {
            JsxAttr::Named { name: n, .. } => n == name,
            JsxAttr::Spread(_) => false,
        })
    }

    pub fn has_spread_attr(&self) -> bool {
        self.attrs.iter().any(|attr| matches!(attr, JsxAttr::Spread(_)))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum JsxAttr {
    Named {
        name: String,
        value: Option<Expr>,
        loc: Location,
    },
    Spread(Expr),
}

#[derive(Debug, Clone, PartialEq)]
pub enum JsxChild {
    Text(String),
    Expr(Expr),
    Element(Box<JsxElement>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssignOp {
    Assign,
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Exp,
    /// `&&=`, `||=`, `??=`
    Logical,
    /// Bitwise and shift compound assignments
    Bitwise,
}

impl AssignOp {
    pub fn from_token(token: &str) -> Self {
        match token {
            "+=" => AssignOp::Add,
            "-=" => AssignOp::Sub,
            "*=" => AssignOp::Mul,
            "/=" => AssignOp::Div,
            "%=" => AssignOp::Mod,
            "**=" => AssignOp::Exp,
            "&&=" | "||=" | "??=" => AssignOp::Logical,
            "=" => AssignOp::Assign,
            _ => AssignOp::Bitwise,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateOp {
    Increment,
    Decrement,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Not,
    Minus,
    Plus,
    BitNot,
    Typeof,
    Void,
    Delete,
}

impl UnaryOp {
    pub fn from_token(token: &str) -> Option<Self> {
        Some(match token {
            "!" => UnaryOp::Not,
            "-" => UnaryOp::Minus,
            "+" => UnaryOp::Plus,
            "~" => UnaryOp::BitNot,
            "typeof" => UnaryOp::Typeof,
            "void" => UnaryOp::Void,
            "delete" => UnaryOp::Delete,
            _ => return None,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Eq,
    NotEq,
    StrictEq,
    StrictNotEq,
    Lt,
    LtEq,
    Gt,
    GtEq,
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Exp,
    And,
    Or,
    Nullish,
    BitAnd,
    BitOr,
    BitXor,
    Shl,
    Shr,
    UShr,
    In,
    InstanceOf,
}

impl BinaryOp {
    pub fn from_token(token: &str) -> Option<Self> {
        Some(match token {
            "==" => BinaryOp::Eq,
            "!=" => BinaryOp::NotEq,
            "===" => BinaryOp::StrictEq,
            "!==" => BinaryOp::StrictNotEq,
            "<" => BinaryOp::Lt,
            "<=" => BinaryOp::LtEq,
            ">" => BinaryOp::Gt,
            ">=" => BinaryOp::GtEq,
            "+" => BinaryOp::Add,
            "-" => BinaryOp::Sub,
            "*" => BinaryOp::Mul,
            "/" => BinaryOp::Div,
            "%" => BinaryOp::Mod,
            "**" => BinaryOp::Exp,
            "&&" => BinaryOp::And,
            "||" => BinaryOp::Or,
            "??" => BinaryOp::Nullish,
            "&" => BinaryOp::BitAnd,
            "|" => BinaryOp::BitOr,
            "^" => BinaryOp::BitXor,
            "<<" => BinaryOp::Shl,
            ">>" => BinaryOp::Shr,
            ">>>" => BinaryOp::UShr,
            "in" => BinaryOp::In,
            "instanceof" => BinaryOp::InstanceOf,
            _ => return None,
        })
    }

    pub fn is_equality(self) -> bool {
        matches!(
            self,
            BinaryOp::Eq | BinaryOp::NotEq | BinaryOp::StrictEq | BinaryOp::StrictNotEq
        )
    }

    pub fn is_loose_equality(self) -> bool {
        matches!(self, BinaryOp::Eq | BinaryOp::NotEq)
    }

    pub fn is_logical(self) -> bool {
        matches!(self, BinaryOp::And | BinaryOp::Or | BinaryOp::Nullish)
    }

    pub fn is_comparison(self) -> bool {
        self.is_equality()
            || matches!(self, BinaryOp::Lt | BinaryOp::LtEq | BinaryOp::Gt | BinaryOp::GtEq)
    }
}

impl Expr {
    pub fn new(kind: ExprKind, loc: Location) -> Self {
        Self { kind, loc }
    }

    /// Strip TypeScript wrappers (`as`, `satisfies`, `!`).
    pub fn unwrapped(&self) -> &Expr {
        let mut current = self;
        while let ExprKind::TypeWrap(inner) = &current.kind {
            current = inner;
        }
        current
    }

    pub fn as_ident(&self) -> Option<&str> {
        match &self.unwrapped().kind {
            ExprKind::Ident(name) => Some(name),
            _ => None,
        }
    }

    pub fn as_str_lit(&self) -> Option<&str> {
        match &self.unwrapped().kind {
            ExprKind::Lit(Lit::Str(value)) => Some(value),
            ExprKind::Template { quasis, exprs } if exprs.is_empty() => {
                quasis.first().map(String::as_str)
            }
            _ => None,
        }
    }

    pub fn as_num_lit(&self) -> Option<f64> {
        match &self.unwrapped().kind {
            ExprKind::Lit(Lit::Num { value, .. }) => Some(*value),
            _ => None,
        }
    }

    pub fn as_function(&self) -> Option<&Function> {
        match &self.unwrapped().kind {
            ExprKind::Function(function) => Some(function),
            _ => None,
        }
    }

    pub fn is_literal(&self) -> bool {
        matches!(
            self.unwrapped().kind,
            ExprKind::Lit(_) | ExprKind::Template { .. }
        )
    }

    pub fn is_jsx(&self) -> bool {
        matches!(self.unwrapped().kind, ExprKind::Jsx(_))
    }
}

impl Pat {
    pub fn new(kind: PatKind, loc: Location) -> Self {
        Self { kind, loc }
    }

    /// Every identifier bound by this pattern.
    pub fn bound_names(&self) -> Vec<&str> {
        let mut names = Vec::new();
        self.collect_bound_names(&mut names);
        names
    }

    fn collect_bound_names<'a>(&'a self, names: &mut Vec<&'a str>) {
        match &self.kind {
            PatKind::Ident(name) => names.push(name),
            PatKind::Object(props) => {
                for prop in props {
                    match prop {
                        ObjectPatProp::KeyValue { value, .. } => value.collect_bound_names(names),
                        ObjectPatProp::Shorthand { name, .. } => names.push(name),
                        ObjectPatProp::Rest(pat) => pat.collect_bound_names(names),
                    }
                }
            }
            PatKind::Array(items) => items.iter().for_each(|p| p.collect_bound_names(names)),
            PatKind::Rest(inner) => inner.collect_bound_names(names),
            PatKind::Default { target, .. } => target.collect_bound_names(names),
            PatKind::Expr(_) | PatKind::Unknown => {}
        }
    }

    pub fn is_destructuring(&self) -> bool {
        match &self.kind {
            PatKind::Object(_) | PatKind::Array(_) => true,
            PatKind::Default { target, .. } => target.is_destructuring(),
            _ => false,
        }
    }

    /// Target expression of a member assignment (`a.b = …`).
    pub fn as_expr(&self) -> Option<&Expr> {
        match &self.kind {
            PatKind::Expr(expr) => Some(expr),
            _ => None,
        }
    }
}

impl Function {
    pub fn body_stmts(&self) -> &[Stmt] {
        match &self.body {
            FunctionBody::Block(stmts) => stmts,
            FunctionBody::Expr(_) => &[],
        }
    }

    pub fn param_names(&self) -> Vec<&str> {
        self.params.iter().flat_map(|p| p.bound_names()).collect()
    }
}
