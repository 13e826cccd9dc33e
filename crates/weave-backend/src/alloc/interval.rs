use std::collections::{HashMap, HashSet};

use log::trace;

use weave_common::frame::Location;
use weave_common::ir::{Access, Expr, Mem, MemKind, StmtNode, Target, Temp, TempKind};
use weave_common::target::CP_ADDRESS_REG;

use super::Allocator;
use crate::blocks::Block;

/// The positions over which a temp must keep its value: from its first
/// definition or appearance in an out set, up to one past the last such
/// position.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct Interval {
    pub temp: Temp,
    pub begin: usize,
    pub end: usize,
}

impl Interval {
    pub fn overlaps(&self, other: &Interval) -> bool {
        !(self.end < other.begin || other.end < self.begin)
    }
}

/// Build one interval per temp from the liveness sets, ordered by increasing
/// start.
pub fn intervals(blocks: &[Block]) -> Vec<Interval> {
    let mut intervals: Vec<Interval> = Vec::new();
    let mut at: HashMap<Temp, usize> = HashMap::new();

    for stmt in blocks.iter().flat_map(|block| block.stmts.iter()) {
        for temp in stmt.def.iter().chain(stmt.live_out.iter()) {
            match at.get(temp) {
                Some(index) => intervals[*index].end = stmt.pos + 1,
                None => {
                    at.insert(*temp, intervals.len());
                    intervals.push(Interval {
                        temp: *temp,
                        begin: stmt.pos,
                        end: stmt.pos + 1,
                    });
                }
            }
        }
    }

    intervals
}

impl Allocator<'_> {
    /// Settle the intervals that don't take part in the scan: module
    /// variables, formals passed in registers and constant pool addresses.
    /// Returns the remaining intervals.
    pub(super) fn preallocate(&mut self, blocks: &[Block], intervals: Vec<Interval>) -> Vec<Interval> {
        self.assigned.clear();

        let pool_addresses: HashSet<Temp> = blocks
            .iter()
            .flat_map(|block| block.stmts.iter())
            .filter_map(|stmt| match &stmt.node {
                StmtNode::Move {
                    dst: Target::Temp(temp),
                    src:
                        Expr::Mem(Mem {
                            kind: MemKind::CpAddr,
                            ..
                        }),
                } => Some(*temp),
                _ => None,
            })
            .collect();

        intervals
            .into_iter()
            .filter(|interval| {
                let info = self.frame.temps.get(&interval.temp);
                if info.kind == TempKind::Global {
                    return false;
                }

                let pinned = match self.frame.formal(&info.name) {
                    Some(formal) if info.spilled.is_none() => match formal.location {
                        Location::InReg(reg) => Some(reg),
                        Location::InFrame(_) => None,
                    },
                    _ => None,
                };

                let pinned = pinned.or_else(|| {
                    pool_addresses
                        .contains(&interval.temp)
                        .then_some(CP_ADDRESS_REG)
                });

                match pinned {
                    Some(reg) => {
                        trace!("{} pinned to {reg}", info.name);
                        self.frame.temps.set_access(&interval.temp, Access::Reg(reg));
                        self.assigned.push((*interval, reg));
                        false
                    }

                    None => true,
                }
            })
            .collect()
    }
}
