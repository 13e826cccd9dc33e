use std::collections::HashMap;

use log::trace;

use weave_common::ir::{BinOp, Expr, Operand, Stmt, StmtNode, Target, TempKind, Temps};
use weave_common::labels::{Label, Labels};
use weave_common::target::FALSE;

use super::Block;

fn index_of(blocks: &[Block]) -> HashMap<Label, usize> {
    blocks
        .iter()
        .enumerate()
        .map(|(index, block)| (block.label, index))
        .collect()
}

/// Order the blocks into traces. Each trace greedily follows unplaced
/// successors, the false branch first. The block holding the end of the
/// procedure always goes last.
pub fn schedule(blocks: Vec<Block>) -> Vec<Block> {
    let index = index_of(&blocks);
    let exit = blocks.iter().position(Block::is_exit);

    let mut marked = vec![false; blocks.len()];
    if let Some(exit) = exit {
        marked[exit] = true;
    }

    let mut order = Vec::with_capacity(blocks.len());
    let mut traces = 0;

    for start in 0..blocks.len() {
        if marked[start] {
            continue;
        }

        traces += 1;
        let mut at = start;

        loop {
            marked[at] = true;
            order.push(at);

            let unmarked = |label: Option<Label>| {
                label
                    .and_then(|label| index.get(&label).copied())
                    .filter(|next| !marked[*next])
            };

            let block = &blocks[at];
            match unmarked(block.other).or_else(|| unmarked(block.then)) {
                Some(next) => at = next,
                None => break,
            }
        }
    }

    order.extend(exit);
    trace!("{} blocks in {traces} traces", order.len());

    let mut slots: Vec<_> = blocks.into_iter().map(Some).collect();
    order
        .into_iter()
        .map(|at| {
            slots[at]
                .take()
                .unwrap_or_else(|| unreachable!("blocks are placed once"))
        })
        .collect()
}

/// Make every conditional fall through to its false branch, negating it or
/// adding a jump where the block order doesn't allow that.
///
/// Negation tests the condition against `FALSE` into a fresh temp instead of
/// complementing it in place. Conditions are `TRUE` or `FALSE`, and the
/// complement of `TRUE` is still nonzero.
pub fn fix_branches(labels: &mut Labels, temps: &mut Temps, blocks: Vec<Block>) -> Vec<Block> {
    let nexts: Vec<_> = blocks
        .iter()
        .skip(1)
        .map(|block| Some(block.label))
        .chain(std::iter::once(None))
        .collect();

    let mut fixed = Vec::with_capacity(blocks.len());

    for (mut block, next) in blocks.into_iter().zip(nexts) {
        let &StmtNode::CJump { cond, then, other } = block.last() else {
            fixed.push(block);
            continue;
        };

        if next == Some(other) {
            fixed.push(block);
        } else if next == Some(then) {
            let negated = temps.fresh(TempKind::Local);
            block.stmts.pop();
            block.stmts.push(Stmt::new(StmtNode::Move {
                dst: Target::Temp(negated),
                src: Expr::Binop(BinOp::Eq, Operand::Temp(cond), Operand::Const(FALSE)),
            }));
            block.terminate(Stmt::new(StmtNode::CJump {
                cond: negated,
                then: other,
                other: then,
            }));

            trace!("negated branch in {}", labels.name(&block.label));
            fixed.push(block);
        } else {
            let bridge = labels.fresh();
            block.stmts.pop();
            block.terminate(Stmt::new(StmtNode::CJump {
                cond,
                then,
                other: bridge,
            }));
            fixed.push(block);

            let mut block = Block::new(bridge);
            block.terminate(Stmt::new(StmtNode::Jump(other)));
            fixed.push(block);
        }
    }

    fixed
}

/// Remove every block that can't be reached from the first one. The block
/// holding the end of the procedure is always kept.
pub fn prune(blocks: Vec<Block>) -> Vec<Block> {
    let index = index_of(&blocks);
    let mut reached = vec![false; blocks.len()];
    let mut worklist = Vec::new();

    if !blocks.is_empty() {
        worklist.push(0);
    }

    while let Some(at) = worklist.pop() {
        if reached[at] {
            continue;
        }

        reached[at] = true;
        worklist.extend(
            blocks[at]
                .succs()
                .filter_map(|label| index.get(&label).copied()),
        );
    }

    let before = blocks.len();
    let kept: Vec<_> = blocks
        .into_iter()
        .zip(reached)
        .filter_map(|(block, reached)| (reached || block.is_exit()).then_some(block))
        .collect();

    trace!("pruned {} unreachable blocks", before - kept.len());
    kept
}
