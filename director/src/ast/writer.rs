//! Pretty-prints a lifted handler back into Lingo source text.
//!
//! Two surface styles exist for property access: `the prop of obj`
//! (verbose, the only form before Director 7) and `obj.prop` (dot syntax,
//! the default from Director 7 on). [`Writer::new`] picks one based on the
//! movie's version; either can be forced via [`Writer::with_dot_syntax`].

use std::fmt::Write as _;

use super::datum::Datum;
use super::node::{BinOp, ChunkKind, Expr, PutMode, Stmt, UnOp};

pub struct Writer {
    dot_syntax: bool,
}

impl Writer {
    #[must_use]
    pub fn new(dot_syntax_default: bool) -> Self {
        Self { dot_syntax: dot_syntax_default }
    }

    #[must_use]
    pub fn with_dot_syntax(mut self, dot_syntax: bool) -> Self {
        self.dot_syntax = dot_syntax;
        self
    }

    #[must_use]
    pub fn write_handler(&self, name: &str, params: &[String], body: &[Stmt]) -> String {
        let mut out = String::new();
        let _ = write!(out, "on {name}");
        if !params.is_empty() {
            let _ = write!(out, " {}", params.join(", "));
        }
        out.push('\n');
        self.write_block(body, 1, &mut out);
        out.push_str("end\n");
        out
    }

    #[must_use]
    pub fn write_factory_handler(&self, factory: &str, name: &str, params: &[String], body: &[Stmt]) -> String {
        let mut out = String::new();
        let _ = write!(out, "on {name}");
        if !params.is_empty() {
            let _ = write!(out, " {}", params.join(", "));
        }
        let _ = writeln!(out, " -- {factory}");
        self.write_block(body, 1, &mut out);
        out.push_str("end\n");
        out
    }

    fn write_block(&self, stmts: &[Stmt], indent: usize, out: &mut String) {
        for stmt in stmts {
            self.write_stmt(stmt, indent, out);
        }
    }

    fn write_stmt(&self, stmt: &Stmt, indent: usize, out: &mut String) {
        let pad = "  ".repeat(indent);
        match stmt {
            Stmt::Expr(expr) => {
                let _ = writeln!(out, "{pad}{}", self.write_expr(expr, 0));
            },
            Stmt::Assign { target, value } => {
                let _ = writeln!(out, "{pad}{} = {}", self.write_expr(target, 0), self.write_expr(value, 0));
            },
            Stmt::Put { value, target, mode } => match target {
                Some(target) => {
                    let keyword = match mode {
                        PutMode::Into => "into",
                        PutMode::After => "after",
                        PutMode::Before => "before",
                    };
                    let _ = writeln!(out, "{pad}put {} {keyword} {}", self.write_expr(value, 0), self.write_expr(target, 0));
                },
                None => {
                    let _ = writeln!(out, "{pad}put {}", self.write_expr(value, 0));
                },
            },
            Stmt::If { cond, then_branch, else_branch } => {
                let _ = writeln!(out, "{pad}if {} then", self.write_expr(cond, 0));
                self.write_block(then_branch, indent + 1, out);
                if !else_branch.is_empty() {
                    let _ = writeln!(out, "{pad}else");
                    self.write_block(else_branch, indent + 1, out);
                }
                let _ = writeln!(out, "{pad}end if");
            },
            Stmt::While { cond, body } => {
                let _ = writeln!(out, "{pad}repeat while {}", self.write_expr(cond, 0));
                self.write_block(body, indent + 1, out);
                let _ = writeln!(out, "{pad}end repeat");
            },
            Stmt::RepeatWithTo { var, from, to, down, body } => {
                let direction = if *down { "down to" } else { "to" };
                let _ = writeln!(out, "{pad}repeat with {var} = {} {direction} {}", self.write_expr(from, 0), self.write_expr(to, 0));
                self.write_block(body, indent + 1, out);
                let _ = writeln!(out, "{pad}end repeat");
            },
            Stmt::RepeatWithIn { var, list, body } => {
                let _ = writeln!(out, "{pad}repeat with {var} in {}", self.write_expr(list, 0));
                self.write_block(body, indent + 1, out);
                let _ = writeln!(out, "{pad}end repeat");
            },
            Stmt::Case { subject, arms, otherwise } => {
                let _ = writeln!(out, "{pad}case {} of", self.write_expr(subject, 0));
                for (labels, arm_body) in arms {
                    let label_text = labels.iter().map(|label| self.write_expr(label, 0)).collect::<Vec<_>>().join(", ");
                    let _ = writeln!(out, "{pad}  {label_text}:");
                    self.write_block(arm_body, indent + 2, out);
                }
                if !otherwise.is_empty() {
                    let _ = writeln!(out, "{pad}  otherwise:");
                    self.write_block(otherwise, indent + 2, out);
                }
                let _ = writeln!(out, "{pad}end case");
            },
            Stmt::Tell { window, body } => {
                let _ = writeln!(out, "{pad}tell {}", self.write_expr(window, 0));
                self.write_block(body, indent + 1, out);
                let _ = writeln!(out, "{pad}end tell");
            },
            Stmt::Hilite(expr) => {
                let _ = writeln!(out, "{pad}hilite {}", self.write_expr(expr, 0));
            },
            Stmt::Delete(expr) => {
                let _ = writeln!(out, "{pad}delete {}", self.write_expr(expr, 0));
            },
            Stmt::Exit => {
                let _ = writeln!(out, "{pad}exit");
            },
            Stmt::Return(Some(expr)) => {
                let _ = writeln!(out, "{pad}return {}", self.write_expr(expr, 0));
            },
            Stmt::Return(None) => {
                let _ = writeln!(out, "{pad}return");
            },
            Stmt::Comment(text) => {
                let _ = writeln!(out, "{pad}-- {text}");
            },
        }
    }

    fn write_expr(&self, expr: &Expr, parent_prec: u8) -> String {
        match expr {
            Expr::Literal(datum) => write_datum(datum),
            Expr::Var(name) | Expr::Param(name) | Expr::Global(name) => name.clone(),
            Expr::Property(name) => format!("the {name}"),
            Expr::ObjectProperty { object, prop } => {
                if self.dot_syntax {
                    format!("{}.{}", self.write_expr(object, 9), prop)
                } else {
                    format!("the {} of {}", prop, self.write_expr(object, 0))
                }
            },
            Expr::TheBuiltin(name) => format!("the {name}"),
            Expr::Binary { op, lhs, rhs } => {
                let prec = bin_prec(*op);
                let text = format!("{} {} {}", self.write_expr(lhs, prec), bin_symbol(*op), self.write_expr(rhs, prec + 1));
                wrap_if(text, prec, parent_prec)
            },
            Expr::Unary { op, expr } => {
                let prec = 8;
                let text = match op {
                    UnOp::Negate => format!("-{}", self.write_expr(expr, prec)),
                    UnOp::Not => format!("not {}", self.write_expr(expr, prec)),
                };
                wrap_if(text, prec, parent_prec)
            },
            Expr::List(items) => {
                let inner: Vec<_> = items.iter().map(|item| self.write_expr(item, 0)).collect();
                format!("[{}]", inner.join(", "))
            },
            Expr::PropList(pairs) => {
                if pairs.is_empty() {
                    return "[:]".to_string();
                }
                let inner: Vec<_> = pairs.iter().map(|(k, v)| format!("{}: {}", self.write_expr(k, 0), self.write_expr(v, 0))).collect();
                format!("[{}]", inner.join(", "))
            },
            Expr::Chunk { kind, first, last, of } => {
                let keyword = chunk_keyword(*kind);
                format!("{} {} to {} of {}", keyword, self.write_expr(first, 0), self.write_expr(last, 0), self.write_expr(of, 0))
            },
            Expr::LastChunk { kind, of } => format!("the last {} in {}", chunk_keyword(*kind), self.write_expr(of, 0)),
            Expr::ChunkCount { kind, of } => format!("the number of {}s in {}", chunk_keyword(*kind), self.write_expr(of, 0)),
            Expr::CastLibProperty { prop, lib } => format!("the {} of castLib {}", prop, self.write_expr(lib, 0)),
            Expr::RawProperty { category, id, of } => match of {
                Some(of) => format!("the prop{category}_{id} of {}", self.write_expr(of, 0)),
                None => format!("the prop{category}_{id}"),
            },
            Expr::FieldRef { cast, field } => format!("field {} of castLib {}", self.write_expr(field, 0), self.write_expr(cast, 0)),
            Expr::Index { base, index } => format!("{}[{}]", self.write_expr(base, 9), self.write_expr(index, 0)),
            Expr::Call { name, args } => {
                let inner: Vec<_> = args.iter().map(|a| self.write_expr(a, 0)).collect();
                format!("{}({})", name, inner.join(", "))
            },
            Expr::ObjCall { receiver, name, args } => {
                let inner: Vec<_> = args.iter().map(|a| self.write_expr(a, 0)).collect();
                if self.dot_syntax {
                    format!("{}.{}({})", self.write_expr(receiver, 9), name, inner.join(", "))
                } else {
                    format!("{}({}{}{})", name, self.write_expr(receiver, 0), if inner.is_empty() { "" } else { ", " }, inner.join(", "))
                }
            },
            Expr::NewObj { factory, args } => {
                let inner: Vec<_> = args.iter().map(|a| self.write_expr(a, 0)).collect();
                format!("new({}{}{})", factory, if inner.is_empty() { "" } else { ", " }, inner.join(", "))
            },
            Expr::Unrecognized { opcode, note } => format!("-- unrecognized opcode 0x{opcode:02x}: {note}"),
        }
    }
}

fn wrap_if(text: String, prec: u8, parent_prec: u8) -> String {
    if prec < parent_prec {
        format!("({text})")
    } else {
        text
    }
}

fn bin_prec(op: BinOp) -> u8 {
    match op {
        BinOp::Mul | BinOp::Div | BinOp::Mod => 7,
        BinOp::Add | BinOp::Sub => 6,
        BinOp::Concat | BinOp::ConcatSpaced => 5,
        BinOp::Lt | BinOp::Le | BinOp::Gt | BinOp::Ge | BinOp::Eq | BinOp::Ne | BinOp::Contains | BinOp::Starts => 4,
        BinOp::And => 3,
        BinOp::Or => 2,
    }
}

fn bin_symbol(op: BinOp) -> &'static str {
    match op {
        BinOp::Mul => "*",
        BinOp::Div => "/",
        BinOp::Mod => "mod",
        BinOp::Add => "+",
        BinOp::Sub => "-",
        BinOp::Concat => "&",
        BinOp::ConcatSpaced => "&&",
        BinOp::Lt => "<",
        BinOp::Le => "<=",
        BinOp::Gt => ">",
        BinOp::Ge => ">=",
        BinOp::Eq => "=",
        BinOp::Ne => "<>",
        BinOp::Contains => "contains",
        BinOp::Starts => "starts",
        BinOp::And => "and",
        BinOp::Or => "or",
    }
}

fn chunk_keyword(kind: ChunkKind) -> &'static str {
    match kind {
        ChunkKind::Char => "char",
        ChunkKind::Word => "word",
        ChunkKind::Item => "item",
        ChunkKind::Line => "line",
    }
}

fn write_datum(datum: &Datum) -> String {
    match datum {
        Datum::Void => "VOID".to_string(),
        Datum::Int(value) => value.to_string(),
        Datum::Float(value) => format_float(*value),
        Datum::String(text) => quote_string(text),
        Datum::Symbol(name) => format!("#{name}"),
        Datum::List(items) => format!("[{}]", items.iter().map(write_datum).collect::<Vec<_>>().join(", ")),
        Datum::ArgList(items) | Datum::ArgListNoRet(items) => items.iter().map(write_datum).collect::<Vec<_>>().join(", "),
        Datum::PropList(pairs) => {
            format!("[{}]", pairs.iter().map(|(k, v)| format!("{}: {}", write_datum(k), write_datum(v))).collect::<Vec<_>>().join(", "))
        },
    }
}

fn format_float(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{value:.4}")
    } else {
        format!("{value}")
    }
}

/// Lingo has no in-string escape; a literal quote or control character
/// breaks the string into a `&`-joined run of quoted segments and named
/// constants (`QUOTE`, `RETURN`, `TAB`, …).
fn quote_string(text: &str) -> String {
    let mut segments: Vec<String> = Vec::new();
    let mut current = String::new();

    for ch in text.chars() {
        if let Some(name) = Datum::quote_special_char(ch) {
            if !current.is_empty() {
                segments.push(format!("\"{current}\""));
                current.clear();
            }
            segments.push(name.to_string());
        } else {
            current.push(ch);
        }
    }
    if !current.is_empty() || segments.is_empty() {
        segments.push(format!("\"{current}\""));
    }

    segments.join(" & ")
}
