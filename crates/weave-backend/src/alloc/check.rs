//! Sanity checks on a finished allocation.

use weave_common::ir::Access;

use super::Allocator;
use crate::blocks::Block;

impl Allocator<'_> {
    pub(super) fn check(&self, blocks: &[Block]) {
        for stmt in blocks.iter().flat_map(|block| block.stmts.iter()) {
            for temp in stmt.node.defs().into_iter().chain(stmt.node.uses()) {
                let access = self.frame.temps.access(&temp);
                if !matches!(access, Access::Reg(_)) {
                    panic!(
                        "inconsistency: {} is still in {access:?} after allocation",
                        self.frame.temps.name(&temp)
                    );
                }
            }
        }

        // Pool addresses all share one register, so they must not overlap
        // either.
        for (index, (this, reg)) in self.assigned.iter().enumerate() {
            for (other, other_reg) in self.assigned[index + 1..].iter() {
                if reg == other_reg && this.overlaps(other) {
                    panic!(
                        "inconsistency: both {} and {} were given {reg}, but their live ranges overlap",
                        self.frame.temps.name(&this.temp),
                        self.frame.temps.name(&other.temp)
                    );
                }
            }
        }
    }
}
