use weave_common::ast::{self, Var};
use weave_common::ir::{BinOp, Expr, FnCall, Operand, Resource, StmtNode, Sys, Target, Temp};
use weave_common::target::WORD_SIZE;

use super::Lowerer;

impl Lowerer {
    pub(super) fn lower_stmt(&mut self, stmt: &ast::Stmt) {
        match &stmt.node {
            ast::StmtNode::Skip => {}

            ast::StmtNode::Return(value) => {
                let value = self.lower_expr(value);
                let end = self.frame().epilogue();
                self.emit(StmtNode::Return { end, value });
            }

            ast::StmtNode::If(cond, then, other) => self.lower_if(cond, then, other),
            ast::StmtNode::While(cond, body) => self.lower_while(cond, body),
            ast::StmtNode::For {
                var,
                from,
                to,
                body,
            } => self.lower_for(var, from, to, body),

            ast::StmtNode::Call(call) => {
                let args = self.lower_args(&call.args);
                let proc = self.note_call(&call.name, args.len());
                let args = self.pass_args(args);
                self.emit(StmtNode::Call { proc, args });
            }

            ast::StmtNode::Assign(dst, src) => {
                let src = self.lower_expr(src);
                let dst = self.lower_elem(dst);

                match dst {
                    Expr::Temp(temp) => self.emit(StmtNode::Move {
                        dst: Target::Temp(temp),
                        src,
                    }),

                    Expr::Mem(mem) => {
                        let src = Expr::Temp(self.hoist(src));
                        self.emit(StmtNode::Move {
                            dst: Target::Mem(mem),
                            src,
                        });
                    }

                    _ => panic!("inconsistency: assignment to a non-variable"),
                }
            }

            ast::StmtNode::Input { chan, dest } => {
                let chan = self.lower_elem(chan);
                let chan = self.resource(chan);

                match self.lower_elem(dest) {
                    Expr::Temp(dst) => self.emit(StmtNode::Input { dst, chan }),

                    Expr::Mem(mem) => {
                        let dst = self.fresh_temp();
                        self.emit(StmtNode::Input { dst, chan });
                        self.emit(StmtNode::Move {
                            dst: Target::Mem(mem),
                            src: Expr::Temp(dst),
                        });
                    }

                    _ => panic!("inconsistency: input into a non-variable"),
                }
            }

            ast::StmtNode::Output { chan, value } => {
                let chan = self.lower_elem(chan);
                let chan = self.resource(chan);
                let value = self.lower_expr(value);
                let src = self.hoist(value);
                self.emit(StmtNode::Output { chan, src });
            }

            ast::StmtNode::On { dest, call } => {
                let Expr::Sys(dest) = self.lower_elem(dest) else {
                    panic!("inconsistency: migration to something other than a core");
                };

                let args = self.lower_args(&call.args);
                let func = self.note_call(&call.name, args.len());
                self.emit(StmtNode::On {
                    dest,
                    call: FnCall { func, args },
                });
            }

            ast::StmtNode::Alias { dest, array, index } => self.lower_alias(dest, array, index),

            ast::StmtNode::Connect { to, first, second } => {
                let to = self.connect_operand(to);
                let first = self.connect_operand(first);
                let second = self.connect_operand(second);
                self.emit(StmtNode::Connect { to, first, second });
            }

            ast::StmtNode::Seq(stmts) => {
                for stmt in stmts.iter() {
                    self.lower_stmt(stmt);
                }
            }

            ast::StmtNode::Par(arms) => self.lower_par(stmt.span, arms),
        }
    }

    fn lower_if(&mut self, cond: &ast::Expr, then: &ast::Stmt, other: &ast::Stmt) {
        let cond = self.condition(cond);
        let then_label = self.fresh_label();
        let other_label = self.fresh_label();
        let end = self.fresh_label();

        self.emit(StmtNode::CJump {
            cond,
            then: then_label,
            other: other_label,
        });

        self.emit(StmtNode::Label(then_label));
        self.lower_stmt(then);
        self.emit(StmtNode::Jump(end));

        self.emit(StmtNode::Label(other_label));
        self.lower_stmt(other);
        self.emit(StmtNode::Label(end));
    }

    fn lower_while(&mut self, cond: &ast::Expr, body: &ast::Stmt) {
        let start = self.fresh_label();
        let body_label = self.fresh_label();
        let end = self.fresh_label();

        self.emit(StmtNode::Label(start));
        let cond = self.condition(cond);
        self.emit(StmtNode::CJump {
            cond,
            then: body_label,
            other: end,
        });

        self.emit(StmtNode::Label(body_label));
        self.lower_stmt(body);
        self.emit(StmtNode::Jump(start));
        self.emit(StmtNode::Label(end));
    }

    fn lower_for(&mut self, var: &Var, from: &ast::Expr, to: &ast::Expr, body: &ast::Stmt) {
        let counter = self.named_temp(var);
        let from = self.lower_expr(from);
        self.emit(StmtNode::Move {
            dst: Target::Temp(counter),
            src: from,
        });

        let bound = match self.lower_expr(to) {
            Expr::Const(value) => Operand::Const(value),
            bound => {
                let temp = self.fresh_temp();
                self.emit(StmtNode::Move {
                    dst: Target::Temp(temp),
                    src: bound,
                });
                Operand::Temp(temp)
            }
        };

        let start = self.fresh_label();
        let body_label = self.fresh_label();
        let end = self.fresh_label();

        self.emit(StmtNode::Label(start));
        let cond = self.fresh_temp();
        self.emit(StmtNode::Move {
            dst: Target::Temp(cond),
            src: Expr::Binop(BinOp::Le, Operand::Temp(counter), bound),
        });
        self.emit(StmtNode::CJump {
            cond,
            then: body_label,
            other: end,
        });

        self.emit(StmtNode::Label(body_label));
        self.lower_stmt(body);
        self.emit(StmtNode::Move {
            dst: Target::Temp(counter),
            src: Expr::Binop(BinOp::Add, Operand::Temp(counter), Operand::Const(1)),
        });
        self.emit(StmtNode::Jump(start));
        self.emit(StmtNode::Label(end));
    }

    /// `dest := array + index * WORD_SIZE`
    fn lower_alias(&mut self, dest: &ast::Elem, array: &ast::Elem, index: &ast::Expr) {
        let Expr::Temp(dst) = self.lower_elem(dest) else {
            panic!("inconsistency: alias into a non-variable");
        };

        let base = self.lower_elem(array);
        let base = self.hoist(base);

        match self.lower_expr(index) {
            Expr::Const(at) => self.emit(StmtNode::Move {
                dst: Target::Temp(dst),
                src: Expr::Binop(
                    BinOp::Add,
                    Operand::Temp(base),
                    Operand::Const(at.wrapping_mul(WORD_SIZE)),
                ),
            }),

            index => {
                let index = self.hoist(index);
                self.emit(StmtNode::Move {
                    dst: Target::Temp(dst),
                    src: Expr::Binop(BinOp::Mul, Operand::Temp(index), Operand::Const(WORD_SIZE)),
                });
                self.emit(StmtNode::Move {
                    dst: Target::Temp(dst),
                    src: Expr::Binop(BinOp::Add, Operand::Temp(base), Operand::Temp(dst)),
                });
            }
        }
    }

    /// Conditions are always tested from a temp.
    fn condition(&mut self, cond: &ast::Expr) -> Temp {
        let cond = self.lower_expr(cond);
        self.hoist(cond)
    }

    fn resource(&mut self, chan: Expr) -> Resource {
        match chan {
            Expr::Sys(sys) => Resource::Sys(sys),
            chan => Resource::Temp(self.hoist(chan)),
        }
    }

    fn connect_operand(&mut self, elem: &ast::Elem) -> Sys {
        let Expr::Sys(sys) = self.lower_elem(elem) else {
            panic!("inconsistency: connect operand is not a system resource");
        };

        let value = match sys.value {
            Operand::Temp(temp) => temp,
            value => self.hoist(Expr::from(value)),
        };

        Sys {
            resource: sys.resource,
            value: Operand::Temp(value),
        }
    }
}
