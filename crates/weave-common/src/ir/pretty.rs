use pretty::{Arena, DocAllocator, DocBuilder};

use super::{
    Access, BinOp, Expr, FnCall, Mem, MemKind, Operand, Procedure, Program, Resource, Stmt,
    StmtNode, Sys, Target, Temp, Temps,
};
use crate::labels::{Label, Labels};

pub struct Prettier<'a> {
    labels: &'a Labels,
    temps: &'a Temps,
    allocator: Arena<'a>,
    width: usize,
    positions: bool,
}

impl<'a> Prettier<'a> {
    pub fn new(labels: &'a Labels, temps: &'a Temps) -> Self {
        Self {
            labels,
            temps,
            allocator: Arena::new(),
            width: 80,
            positions: false,
        }
    }

    pub fn with_width(self, width: usize) -> Self {
        Self { width, ..self }
    }

    /// Prefix every statement with its position.
    pub fn with_positions(self, positions: bool) -> Self {
        Self { positions, ..self }
    }

    #[must_use]
    pub fn pretty_procedure(&'a self, proc: &Procedure) -> String {
        let doc = self
            .allocator
            .text(format!("proc {}:", self.labels.name(&proc.name)))
            .append(
                self.allocator
                    .hardline()
                    .append(self.doc_stmts(&proc.stmts))
                    .nest(2),
            );
        self.render(doc)
    }

    #[must_use]
    pub fn pretty_stmts(&'a self, stmts: &[Stmt]) -> String {
        let doc = self.doc_stmts(stmts);
        self.render(doc)
    }

    #[must_use]
    pub fn pretty_stmt(&'a self, stmt: &StmtNode) -> String {
        let doc = self.doc_stmt(stmt);
        self.render(doc)
    }

    fn render(&'a self, doc: DocBuilder<'a, Arena<'a>>) -> String {
        let mut res = Vec::new();
        // Rendering into memory cannot fail.
        let _ = doc.render(self.width, &mut res);
        String::from_utf8_lossy(&res).into_owned()
    }

    fn doc_stmts(&'a self, stmts: &[Stmt]) -> DocBuilder<'a, Arena<'a>> {
        self.allocator.intersperse(
            stmts.iter().map(|stmt| {
                let doc = match &stmt.node {
                    StmtNode::Label(_) => self.doc_stmt(&stmt.node),
                    _ => self.allocator.text("  ").append(self.doc_stmt(&stmt.node)),
                };

                if self.positions {
                    self.allocator
                        .text(format!("{:>4} ", stmt.pos))
                        .append(doc)
                } else {
                    doc
                }
            }),
            self.allocator.hardline(),
        )
    }

    fn doc_stmt(&'a self, stmt: &StmtNode) -> DocBuilder<'a, Arena<'a>> {
        match stmt {
            StmtNode::Label(label) => self.doc_label(label).append(self.allocator.text(":")),
            StmtNode::Jump(label) => self.allocator.text("jump ").append(self.doc_label(label)),
            StmtNode::CJump { cond, then, other } => self
                .allocator
                .text("cjump ")
                .append(self.doc_temp(cond))
                .append(self.allocator.text(", "))
                .append(self.doc_label(then))
                .append(self.allocator.text(", "))
                .append(self.doc_label(other)),
            StmtNode::Move { dst, src } => {
                let dst = match dst {
                    Target::Temp(temp) => self.doc_temp(temp),
                    Target::Mem(mem) => self.doc_mem(mem),
                };

                dst.append(self.allocator.text(" := "))
                    .append(self.doc_expr(src))
                    .group()
            }
            StmtNode::Input { dst, chan } => self
                .doc_resource(chan)
                .append(self.allocator.text(" ? "))
                .append(self.doc_temp(dst)),
            StmtNode::Output { chan, src } => self
                .doc_resource(chan)
                .append(self.allocator.text(" ! "))
                .append(self.doc_temp(src)),
            StmtNode::Fork {
                sync,
                thread,
                space,
                threads,
            } => self
                .allocator
                .text("fork ")
                .append(self.doc_temps(&[*sync, *thread, *space]))
                .append(self.allocator.text(" "))
                .append(
                    self.allocator
                        .intersperse(
                            threads.iter().map(|label| self.doc_label(label)),
                            self.allocator.text(", "),
                        )
                        .brackets(),
                ),
            StmtNode::ForkSet {
                sync,
                thread,
                space,
                entry,
            } => self
                .allocator
                .text("forkset ")
                .append(self.doc_temps(&[*sync, *thread, *space]))
                .append(self.allocator.text(" -> "))
                .append(self.doc_label(entry)),
            StmtNode::ForkSync { sync } => {
                self.allocator.text("forksync ").append(self.doc_temp(sync))
            }
            StmtNode::Join { sync, master, exit } => self
                .allocator
                .text(if *master { "join master " } else { "join " })
                .append(self.doc_temp(sync))
                .append(self.allocator.text(" -> "))
                .append(self.doc_label(exit)),
            StmtNode::Call { proc, args } => self
                .allocator
                .text("call ")
                .append(self.doc_label(proc))
                .append(self.doc_temps(args).parens()),
            StmtNode::On { dest, call } => self
                .allocator
                .text("on ")
                .append(self.doc_sys(dest))
                .append(self.allocator.text(" : "))
                .append(self.doc_call(call)),
            StmtNode::Connect { to, first, second } => self
                .allocator
                .text("connect ")
                .append(self.doc_sys(to))
                .append(self.allocator.text(" to "))
                .append(self.doc_sys(first))
                .append(self.allocator.text(" : "))
                .append(self.doc_sys(second)),
            StmtNode::Return { end, value } => self
                .allocator
                .text("return ")
                .append(self.doc_expr(value))
                .append(self.allocator.text(" -> "))
                .append(self.doc_label(end)),
            StmtNode::Nop => self.allocator.text("nop"),
            StmtNode::End => self.allocator.text("end"),
        }
    }

    fn doc_expr(&'a self, expr: &Expr) -> DocBuilder<'a, Arena<'a>> {
        match expr {
            Expr::Binop(op, left, right) => self
                .doc_operand(left)
                .append(self.allocator.text(format!(" {} ", binop(op))))
                .append(self.doc_operand(right)),
            Expr::Mem(mem) => self.doc_mem(mem),
            Expr::Temp(temp) => self.doc_temp(temp),
            Expr::Name(label) => self.doc_label(label),
            Expr::Const(value) => self.allocator.text(format!("{value}")),
            Expr::Call(call) => self.doc_call(call),
            Expr::Sys(sys) => self.doc_sys(sys),
        }
    }

    fn doc_operand(&'a self, operand: &Operand) -> DocBuilder<'a, Arena<'a>> {
        match operand {
            Operand::Temp(temp) => self.doc_temp(temp),
            Operand::Name(label) => self.doc_label(label),
            Operand::Const(value) => self.allocator.text(format!("{value}")),
        }
    }

    fn doc_mem(&'a self, mem: &Mem) -> DocBuilder<'a, Arena<'a>> {
        let (prefix, address) = match mem.kind {
            MemKind::Abs => ("mem", false),
            MemKind::SpOut => ("sp.out", false),
            MemKind::SpLocal => ("sp.local", false),
            MemKind::SpPreserved => ("sp.saved", false),
            MemKind::SpIn => ("sp.in", false),
            MemKind::Dp => ("dp", false),
            MemKind::Cp => ("cp", false),
            MemKind::SpAddr => ("sp", true),
            MemKind::DpAddr => ("dp", true),
            MemKind::CpAddr => ("cp", true),
        };

        let inner = match &mem.base {
            Some(base) => self
                .doc_operand(base)
                .append(self.allocator.text(" + "))
                .append(self.doc_operand(&mem.offset)),
            None => self.doc_operand(&mem.offset),
        };

        self.allocator
            .text(if address { "&" } else { "" })
            .append(self.allocator.text(prefix))
            .append(inner.brackets())
    }

    fn doc_sys(&'a self, sys: &Sys) -> DocBuilder<'a, Arena<'a>> {
        self.doc_label(&sys.resource)
            .append(self.doc_operand(&sys.value).brackets())
    }

    fn doc_resource(&'a self, resource: &Resource) -> DocBuilder<'a, Arena<'a>> {
        match resource {
            Resource::Temp(temp) => self.doc_temp(temp),
            Resource::Sys(sys) => self.doc_sys(sys),
        }
    }

    fn doc_call(&'a self, call: &FnCall) -> DocBuilder<'a, Arena<'a>> {
        self.doc_label(&call.func)
            .append(self.doc_temps(&call.args).parens())
    }

    fn doc_temps(&'a self, temps: &[Temp]) -> DocBuilder<'a, Arena<'a>> {
        self.allocator.intersperse(
            temps.iter().map(|temp| self.doc_temp(temp)),
            self.allocator.text(", "),
        )
    }

    fn doc_temp(&'a self, temp: &Temp) -> DocBuilder<'a, Arena<'a>> {
        let info = self.temps.get(temp);
        let access = match info.access {
            Access::Undefined => String::new(),
            Access::Reg(reg) => format!("@{reg}"),
            Access::Frame(offset) => format!("@sp.local[{offset}]"),
            Access::Caller(offset) => format!("@sp.in[{offset}]"),
            Access::Data => "@dp".into(),
            Access::Unused => "@_".into(),
        };

        self.allocator.text(format!("{}{access}", info.name))
    }

    fn doc_label(&'a self, label: &Label) -> DocBuilder<'a, Arena<'a>> {
        self.allocator.text(self.labels.name(label).to_string())
    }
}

impl Program {
    /// Render every procedure, optionally with statement positions.
    pub fn pretty(&self, positions: bool) -> String {
        let mut res = String::new();
        for proc in self.procs.iter() {
            let prettier =
                Prettier::new(&self.labels, &proc.frame.temps).with_positions(positions);
            res.push_str(&prettier.pretty_procedure(proc));
            res.push_str("\n\n");
        }

        res
    }

    pub fn pretty_frames(&self) -> String {
        self.procs
            .iter()
            .map(|proc| proc.frame.dump(&self.labels))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

fn binop(op: &BinOp) -> &'static str {
    match op {
        BinOp::Add => "+",
        BinOp::Sub => "-",
        BinOp::Mul => "*",
        BinOp::Div => "/",
        BinOp::Rem => "%",
        BinOp::Or => "or",
        BinOp::And => "and",
        BinOp::Xor => "xor",
        BinOp::Shl => "<<",
        BinOp::Shr => ">>",
        BinOp::Eq => "=",
        BinOp::Ne => "~=",
        BinOp::Lt => "<",
        BinOp::Le => "<=",
        BinOp::Gt => ">",
        BinOp::Ge => ">=",
    }
}
