use super::{Expr, FnCall, Mem, Operand, Resource, StmtNode, Sys, Target, Temp, TempSet};

impl StmtNode {
    /// The temps directly assigned by this statement. Stores through memory
    /// define nothing.
    pub fn defs(&self) -> TempSet {
        match self {
            Self::Move {
                dst: Target::Temp(temp),
                ..
            } => TempSet::unit(*temp),
            Self::Input { dst, .. } => TempSet::unit(*dst),
            Self::Fork {
                sync,
                thread,
                space,
                ..
            } => TempSet::from(vec![*sync, *thread, *space]),

            Self::Move {
                dst: Target::Mem(_),
                ..
            }
            | Self::Label(_)
            | Self::Jump(_)
            | Self::CJump { .. }
            | Self::Output { .. }
            | Self::ForkSet { .. }
            | Self::ForkSync { .. }
            | Self::Join { .. }
            | Self::Call { .. }
            | Self::On { .. }
            | Self::Connect { .. }
            | Self::Return { .. }
            | Self::Nop
            | Self::End => TempSet::new(),
        }
    }

    /// The temp whose liveness decides whether this statement is dead.
    pub fn defined(&self) -> Option<Temp> {
        match self {
            Self::Move {
                dst: Target::Temp(temp),
                ..
            } => Some(*temp),
            Self::Input { dst, .. } => Some(*dst),
            Self::Fork { sync, .. } => Some(*sync),
            _ => None,
        }
    }

    /// Every temp read by this statement, including temps used to address
    /// memory.
    pub fn uses(&self) -> TempSet {
        let mut uses = TempSet::new();

        match self {
            Self::CJump { cond, .. } => {
                uses.insert(*cond);
            }

            Self::Move { dst, src } => {
                expr_uses(src, &mut uses);
                if let Target::Mem(mem) = dst {
                    mem_uses(mem, &mut uses);
                }
            }

            Self::Input { chan, .. } => resource_uses(chan, &mut uses),

            Self::Output { chan, src } => {
                resource_uses(chan, &mut uses);
                uses.insert(*src);
            }

            Self::Call { args, .. } => uses.extend(args.iter().copied()),

            Self::On { dest, call } => {
                sys_uses(dest, &mut uses);
                call_uses(call, &mut uses);
            }

            Self::Connect { to, first, second } => {
                sys_uses(to, &mut uses);
                sys_uses(first, &mut uses);
                sys_uses(second, &mut uses);
            }

            Self::Return { value, .. } => expr_uses(value, &mut uses),

            Self::ForkSet {
                sync,
                thread,
                space,
                ..
            } => uses.extend([*sync, *thread, *space]),

            Self::ForkSync { sync } | Self::Join { sync, .. } => {
                uses.insert(*sync);
            }

            Self::Fork { .. } | Self::Label(_) | Self::Jump(_) | Self::Nop | Self::End => {}
        }

        uses
    }

    /// Whether this statement must stay even when the temp it defines is
    /// dead.
    pub fn has_side_effects(&self) -> bool {
        matches!(
            self,
            Self::Move {
                src: Expr::Call(_),
                ..
            } | Self::Input { .. }
                | Self::Fork { .. }
        )
    }
}

fn operand_uses(operand: &Operand, uses: &mut TempSet) {
    if let Operand::Temp(temp) = operand {
        uses.insert(*temp);
    }
}

fn mem_uses(mem: &Mem, uses: &mut TempSet) {
    if let Some(base) = &mem.base {
        operand_uses(base, uses);
    }

    operand_uses(&mem.offset, uses);
}

fn sys_uses(sys: &Sys, uses: &mut TempSet) {
    operand_uses(&sys.value, uses);
}

fn call_uses(call: &FnCall, uses: &mut TempSet) {
    uses.extend(call.args.iter().copied());
}

fn resource_uses(resource: &Resource, uses: &mut TempSet) {
    match resource {
        Resource::Temp(temp) => {
            uses.insert(*temp);
        }
        Resource::Sys(sys) => sys_uses(sys, uses),
    }
}

fn expr_uses(expr: &Expr, uses: &mut TempSet) {
    match expr {
        Expr::Binop(_, left, right) => {
            operand_uses(left, uses);
            operand_uses(right, uses);
        }
        Expr::Mem(mem) => mem_uses(mem, uses),
        Expr::Temp(temp) => {
            uses.insert(*temp);
        }
        Expr::Call(call) => call_uses(call, uses),
        Expr::Sys(sys) => sys_uses(sys, uses),
        Expr::Name(_) | Expr::Const(_) => {}
    }
}

impl StmtNode {
    /// Replace every read of `from` with `to`. Definitions are left alone.
    pub fn rename_uses(&mut self, from: Temp, to: Temp) {
        let swap = |temp: &mut Temp| {
            if *temp == from {
                *temp = to;
            }
        };

        match self {
            Self::CJump { cond, .. } => swap(cond),

            Self::Move { dst, src } => {
                rename_expr(src, from, to);
                if let Target::Mem(mem) = dst {
                    rename_mem(mem, from, to);
                }
            }

            Self::Input { chan, .. } => rename_resource(chan, from, to),

            Self::Output { chan, src } => {
                rename_resource(chan, from, to);
                swap(src);
            }

            Self::Call { args, .. } => args.iter_mut().for_each(swap),

            Self::On { dest, call } => {
                rename_operand(&mut dest.value, from, to);
                call.args.iter_mut().for_each(swap);
            }

            Self::Connect { to: target, first, second } => {
                rename_operand(&mut target.value, from, to);
                rename_operand(&mut first.value, from, to);
                rename_operand(&mut second.value, from, to);
            }

            Self::Return { value, .. } => rename_expr(value, from, to),

            Self::ForkSet {
                sync,
                thread,
                space,
                ..
            } => {
                swap(sync);
                swap(thread);
                swap(space);
            }

            Self::ForkSync { sync } | Self::Join { sync, .. } => swap(sync),

            Self::Fork { .. } | Self::Label(_) | Self::Jump(_) | Self::Nop | Self::End => {}
        }
    }

    /// Replace the definition of `from` with `to`.
    pub fn rename_def(&mut self, from: Temp, to: Temp) {
        let swap = |temp: &mut Temp| {
            if *temp == from {
                *temp = to;
            }
        };

        match self {
            Self::Move {
                dst: Target::Temp(temp),
                ..
            } => swap(temp),
            Self::Input { dst, .. } => swap(dst),
            Self::Fork {
                sync,
                thread,
                space,
                ..
            } => {
                swap(sync);
                swap(thread);
                swap(space);
            }
            _ => {}
        }
    }
}

fn rename_operand(operand: &mut Operand, from: Temp, to: Temp) {
    if *operand == Operand::Temp(from) {
        *operand = Operand::Temp(to);
    }
}

fn rename_mem(mem: &mut Mem, from: Temp, to: Temp) {
    if let Some(base) = &mut mem.base {
        rename_operand(base, from, to);
    }

    rename_operand(&mut mem.offset, from, to);
}

fn rename_resource(resource: &mut Resource, from: Temp, to: Temp) {
    match resource {
        Resource::Temp(temp) => {
            if *temp == from {
                *temp = to;
            }
        }
        Resource::Sys(sys) => rename_operand(&mut sys.value, from, to),
    }
}

fn rename_expr(expr: &mut Expr, from: Temp, to: Temp) {
    match expr {
        Expr::Binop(_, left, right) => {
            rename_operand(left, from, to);
            rename_operand(right, from, to);
        }
        Expr::Mem(mem) => rename_mem(mem, from, to),
        Expr::Temp(temp) => {
            if *temp == from {
                *temp = to;
            }
        }
        Expr::Call(call) => call.args.iter_mut().for_each(|temp| {
            if *temp == from {
                *temp = to;
            }
        }),
        Expr::Sys(sys) => rename_operand(&mut sys.value, from, to),
        Expr::Name(_) | Expr::Const(_) => {}
    }
}
