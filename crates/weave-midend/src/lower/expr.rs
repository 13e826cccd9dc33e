use weave_common::ast::{self, ElemNode, ExprNode, Scope, SymbolKind, UnOp, Var};
use weave_common::ir::{BinOp, Expr, FnCall, Mem, MemKind, Operand, Sys};
use weave_common::target::{ALL_ONES, FALSE, NUM_PARAM_REGS, TRUE};

use super::Lowerer;

impl Lowerer {
    pub(super) fn lower_expr(&mut self, expr: &ast::Expr) -> Expr {
        match &expr.node {
            ExprNode::Elem(elem) => self.lower_elem(elem),
            ExprNode::Unary(op, elem) => {
                let value = self.lower_elem(elem);
                self.lower_unary(*op, value)
            }
            ExprNode::Binary(op, left, right) => {
                let left = self.lower_elem(left);
                let right = self.lower_expr(right);
                self.lower_binary(lower_binop(*op), left, right)
            }
        }
    }

    pub(super) fn lower_elem(&mut self, elem: &ast::Elem) -> Expr {
        match &elem.node {
            ElemNode::Name(var) => self.lower_name(var),
            ElemNode::Sub(var, index) => self.lower_sub(var, index),
            ElemNode::Call(call) => {
                let args = self.lower_args(&call.args);
                let func = self.note_call(&call.name, args.len());
                let stacked = args.len() > NUM_PARAM_REGS;

                let call = Expr::Call(FnCall {
                    func,
                    args: self.pass_args(args),
                });

                // Nothing may touch the outgoing band between the stores and
                // the call.
                if stacked {
                    Expr::Temp(self.hoist(call))
                } else {
                    call
                }
            }
            ElemNode::Number(value) => Expr::Const(*value as u32),
            ElemNode::Bool(value) => Expr::Const(if *value { TRUE } else { FALSE }),
            ElemNode::Str(value) => {
                let label = self.program.labels.fresh();
                self.program.strings.add(label, value.as_str());

                // Pool addresses are computed in one shared register, so get
                // the address out of it right away.
                let address = self.hoist(Expr::Mem(Mem::new(
                    MemKind::CpAddr,
                    Some(Operand::Name(label)),
                    Operand::Const(0),
                )));
                Expr::Temp(address)
            }
            ElemNode::Paren(expr) => self.lower_expr(expr),
        }
    }

    fn lower_unary(&mut self, op: UnOp, value: Expr) -> Expr {
        match (op, value) {
            (UnOp::Neg, Expr::Const(value)) => Expr::Const(value.wrapping_neg()),
            (UnOp::Not, Expr::Const(value)) => Expr::Const(!value),

            (UnOp::Neg, value) => {
                let value = self.operand(value);
                Expr::Binop(BinOp::Sub, Operand::Const(0), value)
            }

            (UnOp::Not, value) => {
                let value = self.operand(value);
                Expr::Binop(BinOp::Xor, Operand::Const(ALL_ONES), value)
            }
        }
    }

    fn lower_binary(&mut self, op: BinOp, left: Expr, right: Expr) -> Expr {
        if let (Expr::Const(a), Expr::Const(b)) = (&left, &right) {
            if let Some(value) = fold(op, *a, *b) {
                return Expr::Const(value);
            }
        }

        let left = self.operand(left);
        let right = self.operand(right);
        Expr::Binop(op, left, right)
    }

    fn lower_name(&mut self, var: &Var) -> Expr {
        match (var.kind, var.scope) {
            (SymbolKind::Const(value), _) => Expr::Const(value as u32),
            (SymbolKind::Port(Some(number)), Scope::Module) => Expr::Const(number),

            (SymbolKind::IntArray | SymbolKind::ChanArray, Scope::Local) => {
                let offset = self.frame().array_offset(&var.name);
                Expr::Mem(Mem::new(
                    MemKind::SpAddr,
                    None,
                    Operand::Const(offset as u32),
                ))
            }

            (SymbolKind::IntArray | SymbolKind::ChanArray, Scope::Module) => {
                let label = self.program.data.location(&var.name);
                Expr::Mem(Mem::new(
                    MemKind::DpAddr,
                    Some(Operand::Name(label)),
                    Operand::Const(0),
                ))
            }

            (SymbolKind::CoreArray, _)
            | (SymbolKind::IntArray | SymbolKind::ChanArray, Scope::System) => {
                panic!("inconsistency: resource array `{}` used whole", var.name)
            }

            (
                SymbolKind::Port(_)
                | SymbolKind::Int
                | SymbolKind::Chan
                | SymbolKind::Chanend
                | SymbolKind::Proc
                | SymbolKind::Func
                | SymbolKind::IntAlias
                | SymbolKind::IntArrayRef,
                _,
            ) => Expr::Temp(self.named_temp(var)),
        }
    }

    fn lower_sub(&mut self, var: &Var, index: &ast::Expr) -> Expr {
        let offset = self.lower_expr(index);
        let offset = self.operand(offset);

        match (var.scope, var.kind) {
            (Scope::System, _) => Expr::Sys(Sys {
                resource: self.program.labels.named(var.name.as_str()),
                value: offset,
            }),

            (Scope::Module, _) => {
                let label = self.program.data.location(&var.name);
                Expr::Mem(Mem::new(MemKind::Dp, Some(Operand::Name(label)), offset))
            }

            (Scope::Local, SymbolKind::IntArray | SymbolKind::ChanArray) => {
                let base = self.frame().array_offset(&var.name) as u32;
                match offset {
                    Operand::Const(at) => Expr::Mem(Mem::new(
                        MemKind::SpLocal,
                        None,
                        Operand::Const(base.wrapping_add(at)),
                    )),

                    offset => {
                        let address = self.hoist(Expr::Mem(Mem::new(
                            MemKind::SpAddr,
                            None,
                            Operand::Const(base),
                        )));
                        Expr::Mem(Mem::new(MemKind::Abs, Some(Operand::Temp(address)), offset))
                    }
                }
            }

            (Scope::Local, _) => {
                let base = self.named_temp(var);
                let offset = self.hoist(Expr::from(offset));
                Expr::Mem(Mem::new(
                    MemKind::Abs,
                    Some(Operand::Temp(base)),
                    Operand::Temp(offset),
                ))
            }
        }
    }
}

pub(super) fn lower_binop(op: ast::BinOp) -> BinOp {
    match op {
        ast::BinOp::Add => BinOp::Add,
        ast::BinOp::Sub => BinOp::Sub,
        ast::BinOp::Mul => BinOp::Mul,
        ast::BinOp::Div => BinOp::Div,
        ast::BinOp::Rem => BinOp::Rem,
        ast::BinOp::Or => BinOp::Or,
        ast::BinOp::And => BinOp::And,
        ast::BinOp::Xor => BinOp::Xor,
        ast::BinOp::Shl => BinOp::Shl,
        ast::BinOp::Shr => BinOp::Shr,
        ast::BinOp::Eq => BinOp::Eq,
        ast::BinOp::Ne => BinOp::Ne,
        ast::BinOp::Lt => BinOp::Lt,
        ast::BinOp::Le => BinOp::Le,
        ast::BinOp::Gt => BinOp::Gt,
        ast::BinOp::Ge => BinOp::Ge,
    }
}

/// Evaluate `a op b` on 32-bit words. Comparisons are signed and give
/// [`TRUE`] or [`FALSE`]. Division by zero is left to the target.
pub(super) fn fold(op: BinOp, a: u32, b: u32) -> Option<u32> {
    let truth = |cond: bool| if cond { TRUE } else { FALSE };
    let (sa, sb) = (a as i32, b as i32);

    Some(match op {
        BinOp::Add => a.wrapping_add(b),
        BinOp::Sub => a.wrapping_sub(b),
        BinOp::Mul => a.wrapping_mul(b),
        BinOp::Div | BinOp::Rem if sb == 0 => return None,
        BinOp::Div => sa.wrapping_div(sb) as u32,
        BinOp::Rem => sa.wrapping_rem(sb) as u32,
        BinOp::Or => a | b,
        BinOp::And => a & b,
        BinOp::Xor => a ^ b,
        BinOp::Shl => a.checked_shl(b).unwrap_or(0),
        BinOp::Shr => a.checked_shr(b).unwrap_or(0),
        BinOp::Eq => truth(a == b),
        BinOp::Ne => truth(a != b),
        BinOp::Lt => truth(sa < sb),
        BinOp::Le => truth(sa <= sb),
        BinOp::Gt => truth(sa > sb),
        BinOp::Ge => truth(sa >= sb),
    })
}
