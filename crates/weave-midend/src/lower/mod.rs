//! Lowering of the validated syntax tree into linear IR, one procedure at a
//! time.

mod declare;
mod expr;
mod par;
mod stmt;

#[cfg(test)]
mod tests;

use log::{debug, trace};

use weave_common::ast::{self, Scope, Var};
use weave_common::frame::Frame;
use weave_common::ir::{
    Expr, Mem, MemKind, Operand, Program, Stmt, StmtNode, Target, Temp, TempKind,
};
use weave_common::labels::Label;
use weave_common::message::Messages;
use weave_common::target::NUM_PARAM_REGS;

pub fn lower(ast: &ast::Program, entry: &str) -> (Program, Messages) {
    debug!("beginning lowering");

    let mut lowerer = Lowerer::new();
    let order = lowerer.declare(ast, entry);

    for (current, decl) in order.into_iter().enumerate() {
        lowerer.lower_proc(current, &ast.procs[decl]);
    }

    lowerer.close_children();

    trace!("done lowering");

    (lowerer.program, lowerer.messages)
}

#[derive(Debug)]
struct Lowerer {
    program: Program,
    messages: Messages,

    /// Index of the procedure currently being lowered.
    current: usize,
    stmts: Vec<Stmt>,
}

impl Lowerer {
    fn new() -> Self {
        Self {
            program: Program::new(),
            messages: Messages::new(),
            current: 0,
            stmts: Vec::new(),
        }
    }

    fn lower_proc(&mut self, current: usize, decl: &ast::ProcDecl) {
        debug!("lowering `{}`", decl.name);

        self.current = current;
        self.lower_stmt(&decl.body);

        let epilogue = self.frame().epilogue();
        self.emit(StmtNode::Label(epilogue));
        self.emit(StmtNode::End);

        let stmts = std::mem::take(&mut self.stmts);
        trace!("`{}` lowered to {} statements", decl.name, stmts.len());
        self.program.procs[current].stmts = stmts;
    }

    /// Extend every procedure's children with the children of its children
    /// until nothing changes.
    fn close_children(&mut self) {
        let mut rounds = 0;

        loop {
            rounds += 1;
            let mut changed = false;

            for index in 0..self.program.procs.len() {
                let mut children = self.program.procs[index].children.clone();
                let mut at = 0;

                while at < children.len() {
                    if let Some(child) = self.program.get(&children[at]) {
                        for grandchild in child.children.iter() {
                            if !children.contains(grandchild) {
                                children.push(*grandchild);
                                changed = true;
                            }
                        }
                    }

                    at += 1;
                }

                self.program.procs[index].children = children;
            }

            if !changed {
                break;
            }
        }

        trace!("children closed after {rounds} rounds");
    }

    fn frame(&mut self) -> &mut Frame {
        &mut self.program.procs[self.current].frame
    }

    fn emit(&mut self, node: StmtNode) {
        self.stmts.push(Stmt::new(node));
    }

    fn fresh_label(&mut self) -> Label {
        self.program.labels.fresh()
    }

    fn fresh_temp(&mut self) -> Temp {
        self.frame().fresh_temp()
    }

    /// The temp holding the variable `var`.
    fn named_temp(&mut self, var: &Var) -> Temp {
        let kind = match var.scope {
            Scope::Module => TempKind::Global,
            Scope::Local | Scope::System => TempKind::Local,
        };

        self.frame().add_temp(var.name.as_str(), kind)
    }

    /// Make sure the value of `expr` is held in a temp.
    fn hoist(&mut self, expr: Expr) -> Temp {
        if let Some(temp) = expr.as_temp() {
            return temp;
        }

        let temp = self.fresh_temp();
        self.emit(StmtNode::Move {
            dst: Target::Temp(temp),
            src: expr,
        });
        temp
    }

    /// Make sure `expr` can be used as a single operand.
    fn operand(&mut self, expr: Expr) -> Operand {
        match expr.as_operand() {
            Some(operand) => operand,
            None => Operand::Temp(self.hoist(expr)),
        }
    }

    /// Record a call to `name` from the current procedure, returning the
    /// callee's label.
    fn note_call(&mut self, name: &str, args: usize) -> Label {
        let callee = self.program.labels.named(name);
        self.frame().note_call(args);

        if self.program.get(&callee).is_some() {
            self.program.procs[self.current].add_child(callee);
        }

        callee
    }

    /// Evaluate every argument into a fresh temp, left to right.
    fn lower_args(&mut self, args: &[ast::Expr]) -> Vec<Temp> {
        args.iter()
            .map(|arg| {
                let value = self.lower_expr(arg);
                let temp = self.fresh_temp();
                self.emit(StmtNode::Move {
                    dst: Target::Temp(temp),
                    src: value,
                });
                temp
            })
            .collect()
    }

    /// Store the arguments past the parameter registers into the outgoing
    /// argument band, returning the ones passed in registers.
    fn pass_args(&mut self, mut args: Vec<Temp>) -> Vec<Temp> {
        let stacked = args.split_off(args.len().min(NUM_PARAM_REGS));

        for (offset, arg) in stacked.into_iter().enumerate() {
            self.emit(StmtNode::Move {
                dst: Target::Mem(Mem::new(
                    MemKind::SpOut,
                    None,
                    Operand::Const(offset as u32),
                )),
                src: Expr::Temp(arg),
            });
        }

        args
    }
}
