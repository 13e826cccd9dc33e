mod pretty;
mod program;
mod sets;
mod temp;


use std::fmt;

pub use self::pretty::Prettier;
pub use self::program::{Closure, DataPool, Global, Procedure, Program, StringPool};
pub use self::temp::{Access, TempInfo, TempKind, Temps};

use crate::labels::Label;

pub type TempSet = im::OrdSet<Temp>;

/// A virtual register. Temps are interned per procedure by name, so every
/// occurrence of a source variable shares one `Temp`.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct Temp(pub(crate) usize);

#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct Reg(pub u8);

impl fmt::Display for Reg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "r{}", self.0)
    }
}

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum BinOp {
    Add,
    Sub,
    Mul,
    Div,
    Rem,
    Or,
    And,
    Xor,
    Shl,
    Shr,
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

/// Where a memory operand is addressed from.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum MemKind {
    /// `mem[base + offset]`
    Abs,
    /// `sp[offset]` within the outgoing argument band.
    SpOut,
    /// `sp[offset]` within the local band.
    SpLocal,
    /// `sp[offset]` within the preserved register band.
    SpPreserved,
    /// `sp[offset]` within the caller's frame.
    SpIn,
    Dp,
    Cp,
    /// `&sp[offset]`
    SpAddr,
    /// `&dp[offset]`
    DpAddr,
    /// `&cp[offset]`
    CpAddr,
}

/// The operands a binary operation or memory address may take.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Operand {
    Temp(Temp),
    Name(Label),
    Const(u32),
}

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct Mem {
    pub kind: MemKind,
    pub base: Option<Operand>,
    pub offset: Operand,
}

impl Mem {
    pub fn new(kind: MemKind, base: Option<Operand>, offset: Operand) -> Self {
        Self { kind, base, offset }
    }
}

/// An element of one of the system resource arrays, such as `core[i]` or
/// `chan[i]`.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct Sys {
    pub resource: Label,
    pub value: Operand,
}

#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct FnCall {
    pub func: Label,
    /// The arguments passed in registers. Ordinary calls store the rest into
    /// the outgoing argument band beforehand; migrated calls carry them all.
    pub args: Vec<Temp>,
}

#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub enum Expr {
    Binop(BinOp, Operand, Operand),
    Mem(Mem),
    Temp(Temp),
    Name(Label),
    Const(u32),
    Call(FnCall),
    Sys(Sys),
}

impl Expr {
    pub fn as_temp(&self) -> Option<Temp> {
        match self {
            Self::Temp(temp) => Some(*temp),
            _ => None,
        }
    }

    pub fn as_operand(&self) -> Option<Operand> {
        match self {
            Self::Temp(temp) => Some(Operand::Temp(*temp)),
            Self::Name(name) => Some(Operand::Name(*name)),
            Self::Const(value) => Some(Operand::Const(*value)),
            _ => None,
        }
    }
}

impl From<Operand> for Expr {
    fn from(operand: Operand) -> Self {
        match operand {
            Operand::Temp(temp) => Self::Temp(temp),
            Operand::Name(name) => Self::Name(name),
            Operand::Const(value) => Self::Const(value),
        }
    }
}

/// The destination of a move.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Target {
    Temp(Temp),
    Mem(Mem),
}

/// A channel end operand: either held in a temp or one of the system
/// resources.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Resource {
    Temp(Temp),
    Sys(Sys),
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum StmtNode {
    Label(Label),
    Jump(Label),
    CJump {
        cond: Temp,
        then: Label,
        other: Label,
    },
    Move {
        dst: Target,
        src: Expr,
    },
    Input {
        dst: Temp,
        chan: Resource,
    },
    Output {
        chan: Resource,
        src: Temp,
    },
    /// Acquire a synchronizer. `threads` holds the entry label of every arm.
    Fork {
        sync: Temp,
        thread: Temp,
        space: Temp,
        threads: Vec<Label>,
    },
    /// Initialize one more synchronized thread starting at `entry`.
    ForkSet {
        sync: Temp,
        thread: Temp,
        space: Temp,
        entry: Label,
    },
    ForkSync {
        sync: Temp,
    },
    Join {
        sync: Temp,
        master: bool,
        exit: Label,
    },
    /// `args` are the register-passed arguments, as for [`FnCall`].
    Call {
        proc: Label,
        args: Vec<Temp>,
    },
    /// Migrate a call to the core `dest`. Only the callee is named here; the
    /// jump indices the call carries along come from [`Program::closure`].
    On {
        dest: Sys,
        call: FnCall,
    },
    Connect {
        to: Sys,
        first: Sys,
        second: Sys,
    },
    Return {
        end: Label,
        value: Expr,
    },
    Nop,
    End,
}

impl StmtNode {
    pub fn is_transfer(&self) -> bool {
        matches!(
            self,
            Self::Jump(_) | Self::CJump { .. } | Self::Return { .. }
        )
    }
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Stmt {
    pub node: StmtNode,
    pub pos: usize,
    pub def: TempSet,
    pub uses: TempSet,
    pub live_in: TempSet,
    pub live_out: TempSet,
}

impl Stmt {
    pub fn new(node: StmtNode) -> Self {
        Self {
            node,
            pos: 0,
            def: TempSet::new(),
            uses: TempSet::new(),
            live_in: TempSet::new(),
            live_out: TempSet::new(),
        }
    }
}

impl From<StmtNode> for Stmt {
    fn from(node: StmtNode) -> Self {
        Self::new(node)
    }
}
