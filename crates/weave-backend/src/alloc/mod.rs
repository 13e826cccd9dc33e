//! Linear scan register allocation, iterated with spill rewriting until a
//! scan spills nothing.

mod check;
mod complete;
mod interval;
mod scan;


use std::collections::BTreeSet;

use log::{debug, trace};

use weave_common::frame::Frame;
use weave_common::ir::{Access, DataPool, Reg, TempKind};

use crate::blocks::{self, Block};
use crate::liveness::{eliminate_dead, liveness};
use crate::spill;

pub use interval::{intervals, Interval};

/// Assign every temp in `blocks` a register, rewriting spilled temps into
/// loads and stores. The frame is told which registers end up used. Returns
/// the number of allocation rounds.
pub fn allocate(frame: &mut Frame, data: &DataPool, blocks: &mut Vec<Block>) -> usize {
    let mut allocator = Allocator::new(frame, data);
    allocator.allocate(blocks)
}

struct Allocator<'a> {
    frame: &'a mut Frame,
    data: &'a DataPool,

    /// Registers the scan may hand out, lowest first.
    free: BTreeSet<Reg>,
    /// Register-resident intervals overlapping the current position, by
    /// increasing end.
    active: Vec<(Interval, Reg)>,
    /// Every register decision of the current round, pinned ones included.
    assigned: Vec<(Interval, Reg)>,
    spilled: usize,
}

impl<'a> Allocator<'a> {
    fn new(frame: &'a mut Frame, data: &'a DataPool) -> Self {
        Self {
            frame,
            data,
            free: BTreeSet::new(),
            active: Vec::new(),
            assigned: Vec::new(),
            spilled: 0,
        }
    }

    fn allocate(&mut self, blocks: &mut Vec<Block>) -> usize {
        let mut rounds = 0;

        loop {
            rounds += 1;

            self.analyze(blocks);
            self.reset(blocks);

            let intervals = intervals(blocks);
            let intervals = self.preallocate(blocks, intervals);
            self.scan(intervals);

            let rewritten = spill::rewrite(self.frame, self.data, blocks);
            debug!(
                "round {rounds}: {} spilled, {rewritten} accesses rewritten",
                self.spilled
            );

            if rewritten == 0 {
                break;
            }
        }

        self.complete(blocks);
        self.check(blocks);

        trace!("allocation done after {rounds} rounds");
        rounds
    }

    /// Number the statements and compute liveness, removing dead code until
    /// there is none left.
    fn analyze(&mut self, blocks: &mut [Block]) {
        loop {
            blocks::number(blocks);
            liveness(blocks);

            if eliminate_dead(&self.frame.temps, blocks) == 0 {
                break;
            }
        }
    }

    /// Forget the previous round's decisions for every temp still in the code.
    /// Module variables always live in the data pool.
    fn reset(&mut self, blocks: &[Block]) {
        for stmt in blocks.iter().flat_map(|block| block.stmts.iter()) {
            for temp in stmt.def.iter().chain(stmt.uses.iter()) {
                let access = match self.frame.temps.get(temp).kind {
                    TempKind::Global => Access::Data,
                    TempKind::Local => Access::Undefined,
                };

                self.frame.temps.set_access(temp, access);
            }
        }
    }
}
