//! Rewriting of temps that live in memory into explicit loads and stores.


use log::trace;

use weave_common::frame::Frame;
use weave_common::ir::{
    Access, DataPool, Expr, Mem, MemKind, Operand, Stmt, StmtNode, Target, Temp,
};

use crate::blocks::Block;

/// Load every memory-resident temp into a fresh temp right before it is read,
/// and store it right after it is written. Returns the number of rewritten
/// accesses.
pub fn rewrite(frame: &mut Frame, data: &DataPool, blocks: &mut [Block]) -> usize {
    let mut rewriter = Rewriter {
        frame,
        data,
        rewritten: 0,
    };

    for block in blocks.iter_mut() {
        let stmts = std::mem::take(&mut block.stmts);
        let mut rewritten = Vec::with_capacity(stmts.len());

        for stmt in stmts {
            rewriter.rewrite_stmt(stmt, &mut rewritten);
        }

        block.stmts = rewritten;
    }

    rewriter.rewritten
}

struct Rewriter<'a> {
    frame: &'a mut Frame,
    data: &'a DataPool,
    rewritten: usize,
}

impl Rewriter<'_> {
    fn rewrite_stmt(&mut self, stmt: Stmt, out: &mut Vec<Stmt>) {
        let mut node = stmt.node;

        for temp in node.uses() {
            let Some(slot) = self.slot(temp) else {
                continue;
            };

            let loaded = self.copy_of(temp);
            trace!(
                "loading {} into {}",
                self.frame.temps.name(&temp),
                self.frame.temps.name(&loaded)
            );

            out.push(Stmt::new(StmtNode::Move {
                dst: Target::Temp(loaded),
                src: Expr::Mem(slot),
            }));
            node.rename_uses(temp, loaded);
            self.rewritten += 1;
        }

        let mut stores = Vec::new();
        for temp in node.defs() {
            let Some(slot) = self.slot(temp) else {
                continue;
            };

            self.rewritten += 1;

            // Plain copies store straight into the slot.
            if let StmtNode::Move {
                dst,
                src: Expr::Temp(_),
            } = &mut node
            {
                *dst = Target::Mem(slot);
                trace!("storing {} directly", self.frame.temps.name(&temp));
                continue;
            }

            let stored = self.copy_of(temp);
            trace!(
                "storing {} through {}",
                self.frame.temps.name(&temp),
                self.frame.temps.name(&stored)
            );

            node.rename_def(temp, stored);
            stores.push(Stmt::new(StmtNode::Move {
                dst: Target::Mem(slot),
                src: Expr::Temp(stored),
            }));
        }

        out.push(Stmt::new(node));
        out.extend(stores);
    }

    /// A fresh temp standing in for `temp` around one statement.
    fn copy_of(&mut self, temp: Temp) -> Temp {
        let origin = self.frame.temps.get(&temp).origin().to_string();
        let copy = self.frame.fresh_temp();
        self.frame.temps.set_spilled(&copy, origin);
        copy
    }

    /// The memory slot of `temp`, if it lives in memory.
    fn slot(&self, temp: Temp) -> Option<Mem> {
        let info = self.frame.temps.get(&temp);

        match info.access {
            Access::Frame(offset) => Some(Mem::new(
                MemKind::SpLocal,
                None,
                Operand::Const(offset as u32),
            )),

            Access::Caller(offset) => Some(Mem::new(
                MemKind::SpIn,
                None,
                Operand::Const(offset as u32),
            )),

            Access::Data => Some(Mem::new(
                MemKind::Dp,
                None,
                Operand::Name(self.data.location(info.origin())),
            )),

            Access::Undefined | Access::Reg(_) | Access::Unused => None,
        }
    }
}
