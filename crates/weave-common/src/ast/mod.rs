//! The validated syntax tree handed over by the front end. Every name is
//! resolved to a symbol with a kind and a scope, and every constant
//! expression is already evaluated.

pub mod build;

use serde::{Deserialize, Serialize};

use crate::message::Span;

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct Program {
    #[serde(default)]
    pub globals: Vec<VarDecl>,
    pub procs: Vec<ProcDecl>,
    #[serde(default)]
    pub span: Span,
}

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct VarDecl {
    pub name: String,
    pub kind: VarKind,
    #[serde(default)]
    pub span: Span,
}

#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub enum VarKind {
    Int,
    Chan,
    IntArray(u32),
    ChanArray(u32),
    IntAlias,
}

impl VarKind {
    /// Size in words.
    pub fn size(&self) -> u32 {
        match self {
            Self::IntArray(len) | Self::ChanArray(len) => *len,
            Self::Int | Self::Chan | Self::IntAlias => 1,
        }
    }

    pub fn is_array(&self) -> bool {
        matches!(self, Self::IntArray(_) | Self::ChanArray(_))
    }
}

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct ProcDecl {
    pub name: String,
    pub kind: ProcKind,
    #[serde(default)]
    pub formals: Vec<Formal>,
    #[serde(default)]
    pub locals: Vec<VarDecl>,
    pub body: Stmt,
    #[serde(default)]
    pub span: Span,
}

#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub enum ProcKind {
    Proc,
    Func,
}

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct Formal {
    pub name: String,
    pub kind: FormalKind,
    #[serde(default)]
    pub span: Span,
}

#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub enum FormalKind {
    Int,
    Port,
    Chanend,
    IntArray,
    ChanArray,
}

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct Stmt {
    pub node: StmtNode,
    #[serde(default)]
    pub span: Span,
}

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub enum StmtNode {
    Skip,
    Return(Expr),
    If(Expr, Box<Stmt>, Box<Stmt>),
    While(Expr, Box<Stmt>),
    For {
        var: Var,
        from: Expr,
        to: Expr,
        body: Box<Stmt>,
    },
    Call(Call),
    Assign(Elem, Expr),
    /// `chan ? dest`
    Input {
        chan: Elem,
        dest: Elem,
    },
    /// `chan ! value`
    Output {
        chan: Elem,
        value: Expr,
    },
    /// `on dest : call`
    On {
        dest: Elem,
        call: Call,
    },
    /// `alias dest := array[index]`
    Alias {
        dest: Elem,
        array: Elem,
        index: Expr,
    },
    Connect {
        to: Elem,
        first: Elem,
        second: Elem,
    },
    Seq(Vec<Stmt>),
    Par(Vec<Stmt>),
}

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct Call {
    pub name: String,
    #[serde(default)]
    pub args: Vec<Expr>,
    #[serde(default)]
    pub span: Span,
}

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct Expr {
    pub node: ExprNode,
    #[serde(default)]
    pub span: Span,
}

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub enum ExprNode {
    Elem(Elem),
    Unary(UnOp, Elem),
    /// Binary operator chains nest to the right, as the grammar has no
    /// precedence.
    Binary(BinOp, Elem, Box<Expr>),
}

#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub enum UnOp {
    Neg,
    Not,
}

#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub enum BinOp {
    Add,
    Sub,
    Mul,
    Div,
    Rem,
    Or,
    And,
    Xor,
    Shl,
    Shr,
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct Elem {
    pub node: ElemNode,
    #[serde(default)]
    pub span: Span,
}

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub enum ElemNode {
    Name(Var),
    Sub(Var, Box<Expr>),
    Call(Call),
    Number(i64),
    Bool(bool),
    Str(String),
    Paren(Box<Expr>),
}

/// A resolved name.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct Var {
    pub name: String,
    pub kind: SymbolKind,
    pub scope: Scope,
}

#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub enum SymbolKind {
    Const(i64),
    /// Module ports carry their resource number; port formals don't.
    Port(Option<u32>),
    Int,
    Chan,
    Chanend,
    Proc,
    Func,
    IntArray,
    ChanArray,
    CoreArray,
    IntAlias,
    IntArrayRef,
}

#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub enum Scope {
    /// The builtin `core` and `chan` resource arrays.
    System,
    Module,
    Local,
}
