//! Stack layout and calling convention bookkeeping for one procedure.
//!
//! The frame is laid out in bands, from the stack pointer upwards:
//!
//! ```text
//! | link | outgoing args | preserved regs | arrays | locals | (caller) incoming args
//! ```
//!
//! Band sizes keep changing while allocation runs, so every offset query is
//! computed from the current counters.

mod dump;


use log::trace;

use crate::ast::FormalKind;
use crate::ir::{Reg, Temp, TempKind, Temps};
use crate::labels::Label;
use crate::target::{CP_ADDRESS_REG, NUM_GPRS, NUM_PARAM_REGS};

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Location {
    InReg(Reg),
    /// Offset into the caller's outgoing argument band.
    InFrame(usize),
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct FormalAccess {
    pub name: String,
    pub kind: FormalKind,
    pub location: Location,
}

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum LocalKind {
    Array,
    Spill,
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct LocalAccess {
    pub name: String,
    pub kind: LocalKind,
    pub offset: usize,
}

/// Where a variable goes once it no longer fits in a register.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum SpillKind {
    /// A new slot in the local band.
    Local,
    /// The variable already lives in the caller's frame.
    Caller,
    /// The variable's slot in the data pool.
    Global,
}

#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub enum RegUsage {
    #[default]
    Unused,
    Param,
    Scratch,
}

#[derive(Debug)]
pub struct Frame {
    pub name: Label,
    pub temps: Temps,

    epilogue: Option<Label>,
    formals: Vec<FormalAccess>,
    locals: Vec<LocalAccess>,
    preserved: Vec<(Reg, usize)>,
    reg_usage: [RegUsage; NUM_GPRS],

    num_param_regs: usize,
    branch_link: usize,
    max_out_args: usize,
    num_out_args: usize,
    array_space: usize,
    local_space: usize,
    num_in_args: usize,
}

impl Frame {
    /// Create a frame with the given formals. The first [`NUM_PARAM_REGS`]
    /// formals arrive in registers, the rest in the caller's frame.
    pub fn new<'a>(name: Label, formals: impl IntoIterator<Item = (&'a str, FormalKind)>) -> Self {
        let mut frame = Self {
            name,
            temps: Temps::new(),
            epilogue: None,
            formals: Vec::new(),
            locals: Vec::new(),
            preserved: Vec::new(),
            reg_usage: [RegUsage::Unused; NUM_GPRS],
            num_param_regs: 0,
            branch_link: 0,
            max_out_args: 0,
            num_out_args: 0,
            array_space: 0,
            local_space: 0,
            num_in_args: 0,
        };

        for (name, kind) in formals {
            let location = if frame.num_param_regs < NUM_PARAM_REGS {
                let reg = Reg(frame.num_param_regs as u8);
                frame.reg_usage[frame.num_param_regs] = RegUsage::Param;
                frame.num_param_regs += 1;
                Location::InReg(reg)
            } else {
                frame.num_in_args += 1;
                Location::InFrame(frame.num_in_args - 1)
            };

            frame.formals.push(FormalAccess {
                name: name.into(),
                kind,
                location,
            });
        }

        frame
    }

    pub fn epilogue(&self) -> Label {
        self.epilogue
            .unwrap_or_else(|| panic!("inconsistency: frame has no epilogue label"))
    }

    pub fn set_epilogue(&mut self, label: Label) {
        self.epilogue = Some(label);
    }

    pub fn formals(&self) -> &[FormalAccess] {
        &self.formals
    }

    pub fn formal(&self, name: &str) -> Option<&FormalAccess> {
        self.formals.iter().find(|formal| formal.name == name)
    }

    pub fn locals(&self) -> &[LocalAccess] {
        &self.locals
    }

    pub fn preserved(&self) -> &[(Reg, usize)] {
        &self.preserved
    }

    pub fn reg_usage(&self, reg: Reg) -> RegUsage {
        self.reg_usage[reg.0 as usize]
    }

    pub fn num_param_regs(&self) -> usize {
        self.num_param_regs
    }

    pub fn add_temp(&mut self, name: impl Into<String>, kind: TempKind) -> Temp {
        self.temps.named(name, kind)
    }

    pub fn fresh_temp(&mut self) -> Temp {
        self.temps.fresh(TempKind::Local)
    }

    /// Reserve `size` words for a local array, returning its offset within the
    /// array band.
    pub fn alloc_array(&mut self, name: impl Into<String>, size: u32) -> usize {
        let offset = self.array_space;
        self.locals.push(LocalAccess {
            name: name.into(),
            kind: LocalKind::Array,
            offset,
        });
        self.array_space += size as usize;
        offset
    }

    /// Reserve a spill slot for `name`. Asking twice for the same name gives the
    /// same slot.
    pub fn alloc_local(&mut self, name: &str) -> usize {
        if let Some(local) = self
            .locals
            .iter()
            .find(|local| local.kind == LocalKind::Spill && local.name == name)
        {
            return local.offset;
        }

        let offset = self.array_space + self.local_space;
        self.locals.push(LocalAccess {
            name: name.into(),
            kind: LocalKind::Spill,
            offset,
        });
        self.local_space += 1;

        trace!("spill slot {offset} for {name}");
        offset
    }

    pub fn array_offset(&self, name: &str) -> usize {
        self.locals
            .iter()
            .find(|local| local.kind == LocalKind::Array && local.name == name)
            .unwrap_or_else(|| panic!("inconsistency: no local array `{name}`"))
            .offset
    }

    /// Note a call with `args` arguments made from this procedure.
    pub fn note_call(&mut self, args: usize) {
        if args > self.max_out_args {
            self.max_out_args = args;
            self.num_out_args = args.saturating_sub(NUM_PARAM_REGS);
        }

        self.branch_link = 1;
    }

    pub fn spill_kind(&self, name: &str) -> SpillKind {
        if let Some(FormalAccess {
            location: Location::InFrame(_),
            ..
        }) = self.formal(name)
        {
            return SpillKind::Caller;
        }

        match self.temps.lookup(name).map(|temp| self.temps.get(&temp).kind) {
            Some(TempKind::Local) => SpillKind::Local,
            Some(TempKind::Global) => SpillKind::Global,
            None => panic!("inconsistency: spilling unknown variable `{name}`"),
        }
    }

    /// Offset of a stack-passed formal within the caller's frame.
    pub fn formal_location(&self, name: &str) -> usize {
        match self.formal(name) {
            Some(FormalAccess {
                location: Location::InFrame(offset),
                ..
            }) => *offset,
            _ => panic!("inconsistency: `{name}` is not a stack-passed formal"),
        }
    }

    /// The registers the allocator may hand out, lowest first.
    pub fn free_regs(&self) -> Vec<Reg> {
        (self.num_param_regs..NUM_GPRS)
            .map(|reg| Reg(reg as u8))
            .collect()
    }

    /// Record the registers used by the final allocation, reserving preserved
    /// slots for them.
    pub fn set_used_regs(&mut self, regs: impl IntoIterator<Item = Reg>) {
        for reg in regs {
            if reg == CP_ADDRESS_REG {
                continue;
            }

            let index = reg.0 as usize;
            assert!(index < NUM_GPRS, "inconsistency: r{index} is not allocatable");

            if index >= self.num_param_regs {
                self.reg_usage[index] = RegUsage::Scratch;
            }

            if !self.preserved.iter().any(|(saved, _)| *saved == reg) {
                self.preserved.push((reg, self.preserved.len()));
            }
        }
    }

    pub fn num_preserved(&self) -> usize {
        self.preserved.len()
    }

    pub fn num_out_args(&self) -> usize {
        self.num_out_args
    }

    pub fn size(&self) -> usize {
        self.branch_link
            + self.num_out_args
            + self.array_space
            + self.local_space
            + self.num_preserved()
    }

    pub fn out_arg_offset(&self) -> usize {
        self.branch_link
    }

    pub fn preserved_offset(&self) -> usize {
        self.out_arg_offset() + self.num_out_args
    }

    pub fn array_band_offset(&self) -> usize {
        self.preserved_offset() + self.num_preserved()
    }

    pub fn local_band_offset(&self) -> usize {
        self.array_band_offset() + self.array_space
    }

    pub fn in_arg_offset(&self) -> usize {
        self.local_band_offset() + self.local_space + 1
    }
}
