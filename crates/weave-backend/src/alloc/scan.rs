use log::trace;

use weave_common::frame::SpillKind;
use weave_common::ir::{Access, Reg, Temp};

use super::{Allocator, Interval};

impl Allocator<'_> {
    /// Hand out registers to `intervals`, which must be sorted by increasing
    /// start, spilling whatever doesn't fit.
    pub(super) fn scan(&mut self, intervals: Vec<Interval>) {
        self.free = self.frame.free_regs().into_iter().collect();
        self.active.clear();
        self.spilled = 0;

        for interval in intervals {
            self.expire(interval.begin);

            match self.free.pop_first() {
                Some(reg) => self.assign(interval, reg),
                None => self.spill_at(interval),
            }
        }
    }

    /// Free the registers of every active interval that ends before `begin`.
    fn expire(&mut self, begin: usize) {
        let expired = self
            .active
            .iter()
            .take_while(|(interval, _)| interval.end < begin)
            .count();

        for (interval, reg) in self.active.drain(..expired) {
            trace!("{} frees {reg}", self.frame.temps.name(&interval.temp));
            self.free.insert(reg);
        }
    }

    /// Out of registers: spill whichever of `interval` and the active interval
    /// ending last ends later. A reload copy that would lose instead takes the
    /// register of the active interval ending last that isn't a reload copy.
    fn spill_at(&mut self, interval: Interval) {
        let victim = match self.active.last() {
            Some((last, _)) if last.end > interval.end && !self.is_reload(last.temp) => {
                Some(self.active.len() - 1)
            }

            _ if self.is_reload(interval.temp) => self
                .active
                .iter()
                .rposition(|(active, _)| !self.is_reload(active.temp)),

            _ => None,
        };

        match victim {
            Some(at) => {
                let (loser, reg) = self.active.remove(at);
                self.assigned
                    .retain(|(assigned, _)| assigned.temp != loser.temp);
                self.spill(loser.temp);
                self.assign(interval, reg);
            }

            None => self.spill(interval.temp),
        }
    }

    fn is_reload(&self, temp: Temp) -> bool {
        self.frame.temps.get(&temp).spilled.is_some()
    }

    fn assign(&mut self, interval: Interval, reg: Reg) {
        trace!("{} gets {reg}", self.frame.temps.name(&interval.temp));
        self.frame
            .temps
            .set_access(&interval.temp, Access::Reg(reg));

        let at = self
            .active
            .partition_point(|(active, _)| active.end < interval.end);
        self.active.insert(at, (interval, reg));
        self.assigned.push((interval, reg));
    }

    /// Decide where a spilled temp lives in memory.
    fn spill(&mut self, temp: Temp) {
        let info = self.frame.temps.get(&temp);
        if let Some(origin) = &info.spilled {
            panic!("inconsistency: insufficient registers to reload `{origin}`");
        }

        let name = info.name.clone();
        let access = match self.frame.spill_kind(&name) {
            SpillKind::Local => Access::Frame(self.frame.alloc_local(&name)),
            SpillKind::Caller => Access::Caller(self.frame.formal_location(&name)),
            SpillKind::Global => Access::Data,
        };

        trace!("spilling {name} to {access:?}");
        self.frame.temps.set_access(&temp, access);
        self.spilled += 1;
    }
}
