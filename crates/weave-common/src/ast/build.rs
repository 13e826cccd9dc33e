//! Shorthands for putting trees together by hand. All nodes get an empty
//! span.

use super::{
    BinOp, Call, Elem, ElemNode, Expr, ExprNode, Formal, FormalKind, ProcDecl, ProcKind, Scope,
    Stmt, StmtNode, SymbolKind, UnOp, Var, VarDecl, VarKind,
};
use crate::message::Span;

pub fn var(name: &str, kind: SymbolKind, scope: Scope) -> Var {
    Var {
        name: name.into(),
        kind,
        scope,
    }
}

pub fn local(name: &str) -> Var {
    var(name, SymbolKind::Int, Scope::Local)
}

pub fn global(name: &str) -> Var {
    var(name, SymbolKind::Int, Scope::Module)
}

pub fn elem(node: ElemNode) -> Elem {
    Elem {
        node,
        span: Span::default(),
    }
}

pub fn name(var: Var) -> Elem {
    elem(ElemNode::Name(var))
}

pub fn sub(var: Var, index: Expr) -> Elem {
    elem(ElemNode::Sub(var, Box::new(index)))
}

pub fn core(index: Expr) -> Elem {
    sub(var("core", SymbolKind::CoreArray, Scope::System), index)
}

pub fn chan(index: Expr) -> Elem {
    sub(var("chan", SymbolKind::ChanArray, Scope::System), index)
}

pub fn expr(elem: Elem) -> Expr {
    Expr {
        node: ExprNode::Elem(elem),
        span: Span::default(),
    }
}

pub fn num(value: i64) -> Expr {
    expr(elem(ElemNode::Number(value)))
}

pub fn read(var: Var) -> Expr {
    expr(name(var))
}

pub fn unary(op: UnOp, elem: Elem) -> Expr {
    Expr {
        node: ExprNode::Unary(op, elem),
        span: Span::default(),
    }
}

pub fn binary(op: BinOp, left: Elem, right: Expr) -> Expr {
    Expr {
        node: ExprNode::Binary(op, left, Box::new(right)),
        span: Span::default(),
    }
}

pub fn call(name: &str, args: Vec<Expr>) -> Call {
    Call {
        name: name.into(),
        args,
        span: Span::default(),
    }
}

pub fn fcall(name: &str, args: Vec<Expr>) -> Expr {
    expr(elem(ElemNode::Call(call(name, args))))
}

pub fn stmt(node: StmtNode) -> Stmt {
    Stmt {
        node,
        span: Span::default(),
    }
}

pub fn skip() -> Stmt {
    stmt(StmtNode::Skip)
}

pub fn assign(dst: Elem, src: Expr) -> Stmt {
    stmt(StmtNode::Assign(dst, src))
}

pub fn seq(stmts: Vec<Stmt>) -> Stmt {
    stmt(StmtNode::Seq(stmts))
}

pub fn par(arms: Vec<Stmt>) -> Stmt {
    stmt(StmtNode::Par(arms))
}

pub fn if_(cond: Expr, then: Stmt, other: Stmt) -> Stmt {
    stmt(StmtNode::If(cond, Box::new(then), Box::new(other)))
}

pub fn while_(cond: Expr, body: Stmt) -> Stmt {
    stmt(StmtNode::While(cond, Box::new(body)))
}

pub fn for_(var: Var, from: Expr, to: Expr, body: Stmt) -> Stmt {
    stmt(StmtNode::For {
        var,
        from,
        to,
        body: Box::new(body),
    })
}

pub fn pcall(name: &str, args: Vec<Expr>) -> Stmt {
    stmt(StmtNode::Call(call(name, args)))
}

pub fn ret(value: Expr) -> Stmt {
    stmt(StmtNode::Return(value))
}

pub fn decl(name: &str, kind: VarKind) -> VarDecl {
    VarDecl {
        name: name.into(),
        kind,
        span: Span::default(),
    }
}

pub fn formal(name: &str, kind: FormalKind) -> Formal {
    Formal {
        name: name.into(),
        kind,
        span: Span::default(),
    }
}

pub fn proc(name: &str, formals: Vec<Formal>, locals: Vec<VarDecl>, body: Stmt) -> ProcDecl {
    ProcDecl {
        name: name.into(),
        kind: ProcKind::Proc,
        formals,
        locals,
        body,
        span: Span::default(),
    }
}

pub fn func(name: &str, formals: Vec<Formal>, locals: Vec<VarDecl>, body: Stmt) -> ProcDecl {
    ProcDecl {
        kind: ProcKind::Func,
        ..proc(name, formals, locals, body)
    }
}
