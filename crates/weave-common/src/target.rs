//! Constants of the multicore target.

use crate::ir::Reg;

pub const WORD_SIZE: u32 = 4;

/// Registers r0 to r3 carry the first arguments of a call.
pub const NUM_PARAM_REGS: usize = 4;

/// Registers r0 to r10 are available to the allocator.
pub const NUM_GPRS: usize = 11;

/// Emission always addresses the constant pool through this register.
pub const CP_ADDRESS_REG: Reg = Reg(11);

pub const RETURN_REG: Reg = Reg(0);

/// Hardware threads one `par` may occupy.
pub const MAX_THREADS: usize = 8;

/// Jump table entries reserved for the migrate handler, the thread initializer
/// and the channel connect handler.
pub const JUMP_INDEX_OFFSET: usize = 3;

pub const ALL_ONES: u32 = 0xFFFF_FFFF;

pub const TRUE: u32 = 1;
pub const FALSE: u32 = 0;
