use std::collections::BTreeSet;

use log::trace;

use weave_common::frame::Location;
use weave_common::ir::{Access, Expr, Mem, MemKind, Operand, Stmt, StmtNode, Target};

use super::Allocator;
use crate::blocks::Block;

impl Allocator<'_> {
    /// Load stack-passed formals that got a register, mark temps that were
    /// never needed, and report the used registers to the frame.
    pub(super) fn complete(&mut self, blocks: &mut [Block]) {
        self.load_stack_formals(blocks);

        let unused: Vec<_> = self
            .frame
            .temps
            .iter()
            .filter(|(_, info)| !info.access.is_defined())
            .map(|(temp, _)| temp)
            .collect();

        for temp in unused {
            trace!("{} is unused", self.frame.temps.name(&temp));
            self.frame.temps.set_access(&temp, Access::Unused);
        }

        let used: BTreeSet<_> = blocks
            .iter()
            .flat_map(|block| block.stmts.iter())
            .flat_map(|stmt| stmt.node.defs().into_iter().chain(stmt.node.uses()))
            .filter_map(|temp| match self.frame.temps.access(&temp) {
                Access::Reg(reg) => Some(reg),
                _ => None,
            })
            .collect();

        self.frame.set_used_regs(used);
    }

    /// Insert a load from the caller's frame where the live range of every
    /// register-resident stack formal begins.
    fn load_stack_formals(&mut self, blocks: &mut [Block]) {
        let mut loads = Vec::new();

        for formal in self.frame.formals() {
            let Location::InFrame(offset) = formal.location else {
                continue;
            };

            let Some(temp) = self.frame.temps.lookup(&formal.name) else {
                continue;
            };

            let Some((interval, _)) = self
                .assigned
                .iter()
                .find(|(interval, _)| interval.temp == temp)
            else {
                continue;
            };

            let at = blocks.iter().enumerate().find_map(|(block, stmts)| {
                stmts
                    .stmts
                    .iter()
                    .position(|stmt| stmt.pos == interval.begin)
                    .map(|index| (block, index))
            });

            let Some((block, index)) = at else {
                unreachable!("intervals start at a statement");
            };

            trace!("loading {} from the caller's frame", formal.name);
            loads.push((block, index, temp, offset));
        }

        // Back to front, so earlier insertions don't shift later ones.
        loads.sort_by(|a, b| (b.0, b.1).cmp(&(a.0, a.1)));

        // A load in front of a label only runs on the fall-through path, never
        // again from a jump back to that label.
        for (block, index, temp, offset) in loads {
            blocks[block].stmts.insert(
                index,
                Stmt::new(StmtNode::Move {
                    dst: Target::Temp(temp),
                    src: Expr::Mem(Mem::new(
                        MemKind::SpIn,
                        None,
                        Operand::Const(offset as u32),
                    )),
                }),
            );
        }
    }
}
