//! The expression/statement AST.
//!
//! Nodes form a strict tree: every parent owns its children through `Box`
//! or `Vec`, there is no sharing and no cycles, and the evaluator walks the
//! tree by reference. Expression nodes evaluate to a value and may also act
//! as assignment targets or call targets; statement nodes execute for
//! effect and may produce a control signal.

use crate::{Name, Span};
use std::fmt;

/// Syntactic mode a source string is compiled under.
///
/// A cached program is keyed by `(Mode, source)`; the same text compiled
/// under a different mode is a different program.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum Mode {
    /// A plain expression; the whole input must be one comma-expression.
    Expression,
    /// An expression whose root must be an assignment target.
    Assign,
    /// An expression whose root must be a call.
    Call,
    /// A full statement script.
    Script,
    /// An event-handler body: script grammar, with `$sender`/`$args` bound
    /// by the engine before execution.
    EventHandler,
}

/// A parsed compilation unit: either a single expression or a script.
#[derive(Clone, Debug, PartialEq)]
pub enum Program {
    Expr(Expr),
    Script(Vec<Stmt>),
}

/// An expression node.
#[derive(Clone, Debug, PartialEq)]
pub struct Expr {
    pub kind: ExprKind,
    pub span: Span,
}

impl Expr {
    pub fn new(kind: ExprKind, span: Span) -> Self {
        Expr { kind, span }
    }

    /// Whether this node can act as an assignment target.
    pub fn is_assignable(&self) -> bool {
        matches!(
            self.kind,
            ExprKind::Variable(_) | ExprKind::Member { .. } | ExprKind::Index { .. }
        )
    }

    /// Whether this node is a call.
    pub fn is_call(&self) -> bool {
        matches!(self.kind, ExprKind::Call { .. })
    }
}

/// Expression variants.
#[derive(Clone, Debug, PartialEq)]
pub enum ExprKind {
    // Literals
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(Name),

    /// Variable reference: `$x`
    Variable(Name),
    /// The ambient context object: `@context`
    Context,
    /// Member access: `a.B`, or `B` alone (property on the ambient context
    /// when `target` is `None`). Resolves statically when the target
    /// evaluates to a type reference.
    Member {
        target: Option<Box<Expr>>,
        name: Name,
    },
    /// Indexer access: `a[i]`, `a[i, j]`
    Index {
        target: Box<Expr>,
        args: Vec<Expr>,
    },

    Unary {
        op: UnaryOp,
        operand: Box<Expr>,
    },
    Binary {
        op: BinaryOp,
        lhs: Box<Expr>,
        rhs: Box<Expr>,
    },
    /// Ternary conditional: `c ? a : b`
    Conditional {
        cond: Box<Expr>,
        then_branch: Box<Expr>,
        else_branch: Box<Expr>,
    },
    /// Comma sequence: `a, b, c` — evaluates left to right, yields the last.
    Sequence(Vec<Expr>),

    /// Assignment, plain (`op` None) or compound (`op` Some): `$x = e`, `$x += e`
    Assign {
        op: Option<BinaryOp>,
        target: Box<Expr>,
        value: Box<Expr>,
    },
    /// Prefix or postfix increment/decrement.
    IncDec {
        increment: bool,
        prefix: bool,
        target: Box<Expr>,
    },

    /// A call: `$f(args)`, `a.M(args)`, `[T].M(args)`.
    Call {
        callee: Box<Expr>,
        args: Vec<Expr>,
    },
    /// Bracketed type reference used as a value: `[List<Int32>]`
    TypeLit(TypeRef),
    /// Object construction with optional initializer entries:
    /// `[T](args)`, `[T] { X = 1 }`, `[List<Int32>] { 1, 2 }`
    New {
        ty: TypeRef,
        args: Vec<Expr>,
        init: Vec<InitEntry>,
    },
    /// String formatting: `@format(template, args...)`
    Format {
        args: Vec<Expr>,
    },

    /// Iterator block: `@iterator [T]: { ... }` — collects yielded values.
    IteratorBlock {
        ty: Option<TypeRef>,
        body: Vec<Stmt>,
    },
    /// Scoped block expression: `@block: { ... }` — value is its `return`.
    BlockExpr {
        body: Vec<Stmt>,
    },
}

/// One entry of an object/collection/dictionary initializer.
#[derive(Clone, Debug, PartialEq)]
pub enum InitEntry {
    /// `Name = expr`
    Property { name: Name, value: Expr },
    /// A positional collection element.
    Element(Expr),
    /// `{ key, value }` dictionary entry.
    Pair(Expr, Expr),
}

/// A bracketed type reference.
///
/// `arity > 0` with empty `args` denotes an open generic (`[List<>]`);
/// non-empty `args` must match `arity` exactly (all-or-none rule, enforced
/// by the parser).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TypeRef {
    /// Possibly dotted type name, without generic arity suffix.
    pub name: Name,
    /// Number of generic parameters named in source (`List<>` is 1).
    pub arity: u32,
    /// Closed generic arguments; empty when open or non-generic.
    pub args: Vec<TypeRef>,
    pub span: Span,
}

/// A statement node.
#[derive(Clone, Debug, PartialEq)]
pub struct Stmt {
    pub kind: StmtKind,
    pub span: Span,
}

impl Stmt {
    pub fn new(kind: StmtKind, span: Span) -> Self {
        Stmt { kind, span }
    }
}

/// Statement variants.
#[derive(Clone, Debug, PartialEq)]
pub enum StmtKind {
    /// Expression statement (covers assignments and calls).
    Expr(Expr),
    /// Bare `;`
    Empty,
    /// `var $x = e;`
    VarDecl { name: Name, init: Option<Expr> },
    /// `var $F($a, ...$rest) { ... }`
    FuncDecl(FuncDecl),
    /// `{ ... }`
    Block(Vec<Stmt>),
    If {
        cond: Expr,
        then_branch: Box<Stmt>,
        else_branch: Option<Box<Stmt>>,
    },
    While {
        cond: Expr,
        body: Box<Stmt>,
    },
    /// C-style three-clause `for`.
    For {
        init: Option<Box<Stmt>>,
        cond: Option<Expr>,
        step: Option<Expr>,
        body: Box<Stmt>,
    },
    /// `foreach ($x in e) body`
    ForEach {
        binding: Name,
        iterable: Expr,
        body: Box<Stmt>,
    },
    /// `switch (e) { case v: ... default: ... }` — first equal case wins,
    /// no fallthrough; `break` inside a case exits the switch.
    Switch {
        subject: Expr,
        cases: Vec<SwitchCase>,
        default: Option<Vec<Stmt>>,
    },
    Break,
    Continue,
    Return(Option<Expr>),
    Yield(Expr),
}

/// One `case` arm of a switch statement.
#[derive(Clone, Debug, PartialEq)]
pub struct SwitchCase {
    pub value: Expr,
    pub body: Vec<Stmt>,
}

/// A user function declaration.
#[derive(Clone, Debug, PartialEq)]
pub struct FuncDecl {
    pub name: Name,
    pub params: Vec<Param>,
    pub body: Vec<Stmt>,
}

/// A declared parameter. At most the final parameter may be variadic.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Param {
    pub name: Name,
    pub variadic: bool,
}

/// Binary operators.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    BitAnd,
    BitOr,
    BitXor,
    Shl,
    Shr,
    Eq,
    NotEq,
    Lt,
    LtEq,
    Gt,
    GtEq,
    /// Short-circuit logical and.
    And,
    /// Short-circuit logical or.
    Or,
    /// First non-null.
    Coalesce,
}

impl BinaryOp {
    /// Source symbol, for diagnostics.
    pub fn as_symbol(self) -> &'static str {
        match self {
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
            BinaryOp::Mod => "%",
            BinaryOp::BitAnd => "&",
            BinaryOp::BitOr => "|",
            BinaryOp::BitXor => "^",
            BinaryOp::Shl => "<<",
            BinaryOp::Shr => ">>",
            BinaryOp::Eq => "==",
            BinaryOp::NotEq => "!=",
            BinaryOp::Lt => "<",
            BinaryOp::LtEq => "<=",
            BinaryOp::Gt => ">",
            BinaryOp::GtEq => ">=",
            BinaryOp::And => "&&",
            BinaryOp::Or => "||",
            BinaryOp::Coalesce => "??",
        }
    }
}

impl fmt::Display for BinaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_symbol())
    }
}

/// Unary prefix operators.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum UnaryOp {
    Neg,
    Not,
    BitNot,
}

impl UnaryOp {
    pub fn as_symbol(self) -> &'static str {
        match self {
            UnaryOp::Neg => "-",
            UnaryOp::Not => "!",
            UnaryOp::BitNot => "~",
        }
    }
}

impl fmt::Display for UnaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_symbol())
    }
}
