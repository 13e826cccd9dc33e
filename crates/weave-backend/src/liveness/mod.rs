//! Per-statement backward liveness over the blocks of one procedure.

#[cfg(test)]
mod tests;

use std::collections::HashMap;

use log::trace;

use weave_common::ir::{TempKind, TempSet, Temps};
use weave_common::labels::Label;

use crate::blocks::Block;

/// Recompute the def and use sets of every statement and iterate the in and
/// out sets to a fixpoint. Returns the number of passes made.
pub fn liveness(blocks: &mut [Block]) -> usize {
    let mut analyzer = Analyzer::new(blocks);
    analyzer.analyze()
}

/// Remove every statement whose defined temp is dead right after it. Calls,
/// inputs and forks stay, as do writes to module variables. Returns the number
/// of removed statements; the liveness sets are stale afterwards.
pub fn eliminate_dead(temps: &Temps, blocks: &mut [Block]) -> usize {
    let mut removed = 0;

    for block in blocks.iter_mut() {
        block.stmts.retain(|stmt| {
            let Some(temp) = stmt.node.defined() else {
                return true;
            };

            let dead = !stmt.live_out.contains(&temp)
                && !stmt.node.has_side_effects()
                && temps.get(&temp).kind != TempKind::Global;

            if dead {
                trace!("removing dead definition of {}", temps.name(&temp));
                removed += 1;
            }

            !dead
        });
    }

    removed
}

struct Analyzer<'a> {
    blocks: &'a mut [Block],
    index: HashMap<Label, usize>,
}

impl<'a> Analyzer<'a> {
    fn new(blocks: &'a mut [Block]) -> Self {
        let index = blocks
            .iter()
            .enumerate()
            .map(|(index, block)| (block.label, index))
            .collect();

        Self { blocks, index }
    }

    fn analyze(&mut self) -> usize {
        for stmt in self.blocks.iter_mut().flat_map(|block| block.stmts.iter_mut()) {
            stmt.def = stmt.node.defs();
            stmt.uses = stmt.node.uses();
            stmt.live_in = TempSet::new();
            stmt.live_out = TempSet::new();
        }

        let mut passes = 0;
        loop {
            passes += 1;

            let mut changed = false;
            for block in (0..self.blocks.len()).rev() {
                changed |= self.analyze_block(block);
            }

            if !changed {
                break;
            }
        }

        trace!("liveness converged after {passes} passes");
        passes
    }

    fn analyze_block(&mut self, block: usize) -> bool {
        let mut changed = false;
        let mut out = self.block_out(block);

        for stmt in self.blocks[block].stmts.iter_mut().rev() {
            let live_in = stmt.uses.clone().union(out.clone().relative_complement(stmt.def.clone()));

            if live_in != stmt.live_in || out != stmt.live_out {
                changed = true;
                stmt.live_in = live_in.clone();
                stmt.live_out = out;
            }

            out = live_in;
        }

        changed
    }

    /// The union of the in sets at the start of every successor.
    fn block_out(&self, block: usize) -> TempSet {
        self.blocks[block]
            .succs()
            .filter_map(|label| self.index.get(&label))
            .filter_map(|succ| self.blocks[*succ].stmts.first())
            .fold(TempSet::new(), |out, stmt| out.union(stmt.live_in.clone()))
    }
}
