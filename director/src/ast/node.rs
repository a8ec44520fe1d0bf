//! The expression/statement tree the lifter produces and the writer
//! serializes. Modeled as flat tagged enums rather than a class hierarchy
//! per node kind — a handler's body is small and entirely local, so there's
//! no benefit to the extra indirection a trait-object tree would add.

use super::datum::Datum;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum BinOp {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Lt,
    Le,
    Gt,
    Ge,
    Eq,
    Ne,
    And,
    Or,
    Concat,
    ConcatSpaced,
    Contains,
    Starts,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum UnOp {
    Negate,
    Not,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ChunkKind {
    Char,
    Word,
    Item,
    Line,
}

/// Which of `put`/`putChunk`'s three destinations a `Put` statement names.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum PutMode {
    Into,
    After,
    Before,
}

#[derive(Clone, Debug)]
pub enum Expr {
    Literal(Datum),
    Var(String),
    Global(String),
    Property(String),
    ObjectProperty { object: Box<Expr>, prop: String },
    Param(String),
    Binary { op: BinOp, lhs: Box<Expr>, rhs: Box<Expr> },
    Unary { op: UnOp, expr: Box<Expr> },
    List(Vec<Expr>),
    PropList(Vec<(Expr, Expr)>),
    Chunk { kind: ChunkKind, first: Box<Expr>, last: Box<Expr>, of: Box<Expr> },
    /// `the last <kind> in <of>` — the `category 0, id >= 0x0b` v4 property.
    LastChunk { kind: ChunkKind, of: Box<Expr> },
    /// `the number of <kind>s in <of>` — the `category 1` v4 property.
    ChunkCount { kind: ChunkKind, of: Box<Expr> },
    /// `the <prop> of castLib <lib>` — the `category 8, id 2` v4 property
    /// (Director 5+ only).
    CastLibProperty { prop: String, lib: Box<Expr> },
    /// A `Get`/`Set` v4 property outside the categories this lifter gives
    /// a named rendering to. Keeps the category/id pair visible instead of
    /// dropping the access entirely.
    RawProperty { category: i64, id: i64, of: Option<Box<Expr>> },
    /// A field chunk reference built from a cast id and field id popped by
    /// a `putType == 6` variable reference.
    FieldRef { cast: Box<Expr>, field: Box<Expr> },
    Index { base: Box<Expr>, index: Box<Expr> },
    TheBuiltin(String),
    Call { name: String, args: Vec<Expr> },
    ObjCall { receiver: Box<Expr>, name: String, args: Vec<Expr> },
    NewObj { factory: String, args: Vec<Expr> },
    /// An opcode the lifter didn't recognize. Rendered as a comment so the
    /// rest of the handler still decompiles.
    Unrecognized { opcode: u8, note: String },
}

#[derive(Clone, Debug)]
pub enum Stmt {
    Expr(Expr),
    Assign { target: Expr, value: Expr },
    Put { value: Expr, target: Option<Expr>, mode: PutMode },
    If { cond: Expr, then_branch: Vec<Stmt>, else_branch: Vec<Stmt> },
    While { cond: Expr, body: Vec<Stmt> },
    RepeatWithTo { var: String, from: Expr, to: Expr, down: bool, body: Vec<Stmt> },
    RepeatWithIn { var: String, list: Expr, body: Vec<Stmt> },
    /// Each arm may carry more than one label (`case 1, 2 of`).
    Case { subject: Expr, arms: Vec<(Vec<Expr>, Vec<Stmt>)>, otherwise: Vec<Stmt> },
    Tell { window: Expr, body: Vec<Stmt> },
    Hilite(Expr),
    Delete(Expr),
    Exit,
    Return(Option<Expr>),
    /// An opcode the lifter couldn't turn into a statement at all.
    Comment(String),
}
