pub mod alloc;
pub mod blocks;
pub mod liveness;
pub mod spill;


use log::{debug, info, trace};

use weave_common::ir::{Prettier, Program};
use weave_common::{Driver, IrOutput};

use crate::blocks::Block;

/// Schedule and allocate every procedure of `program`. Afterwards every temp
/// has an access, every frame knows its size and every label its position.
pub fn compile(driver: &mut impl Driver, program: &mut Program) {
    info!("beginning back end");

    let mut scheduled = Vec::with_capacity(program.procs.len());
    for proc in program.procs.iter_mut() {
        debug!("scheduling {}", program.labels.name(&proc.name));

        let stmts = std::mem::take(&mut proc.stmts);
        let blocks = blocks::split(&mut program.labels, stmts);
        let blocks = blocks::schedule(blocks);
        let blocks = blocks::fix_branches(&mut program.labels, &mut proc.frame.temps, blocks);
        let blocks = blocks::prune(blocks);

        scheduled.push(blocks);
    }

    driver.output_ir(IrOutput::Scheduled, || pretty_blocks(program, &scheduled));

    for (proc, mut blocks) in program.procs.iter_mut().zip(scheduled) {
        debug!("allocating {}", program.labels.name(&proc.name));

        let rounds = alloc::allocate(&mut proc.frame, &program.data, &mut blocks);

        let mut stmts = blocks::flatten(blocks);
        blocks::place_labels(&mut program.labels, &mut stmts);
        proc.stmts = stmts;

        trace!(
            "{} done after {rounds} rounds, frame size {}",
            program.labels.name(&proc.name),
            proc.frame.size()
        );
    }

    driver.output_ir(IrOutput::Allocated, || program.pretty(true));
    driver.output_ir(IrOutput::Frames, || program.pretty_frames());
}

fn pretty_blocks(program: &Program, scheduled: &[Vec<Block>]) -> String {
    let mut res = String::new();

    for (proc, blocks) in program.procs.iter().zip(scheduled) {
        let prettier = Prettier::new(&program.labels, &proc.frame.temps);
        let stmts = blocks::flatten(blocks.clone());

        res.push_str(&format!("proc {}:\n", program.labels.name(&proc.name)));
        res.push_str(&prettier.pretty_stmts(&stmts));
        res.push_str("\n\n");
    }

    res
}
