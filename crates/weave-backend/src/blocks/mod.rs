//! Basic blocks: splitting a linear statement list into blocks, ordering them
//! into traces and flattening them back.

mod schedule;


pub use schedule::{fix_branches, prune, schedule};

use log::trace;

use weave_common::ir::{Stmt, StmtNode};
use weave_common::labels::{Label, Labels};

/// A labelled, straight-line run of statements. Only the last statement may
/// transfer control.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Block {
    pub label: Label,
    pub stmts: Vec<Stmt>,
    /// The jump target, the true branch of a conditional or the end of the
    /// procedure for a return.
    pub then: Option<Label>,
    /// The false branch of a conditional.
    pub other: Option<Label>,
}

impl Block {
    pub fn new(label: Label) -> Self {
        Self {
            label,
            stmts: vec![Stmt::new(StmtNode::Label(label))],
            then: None,
            other: None,
        }
    }

    pub fn succs(&self) -> impl Iterator<Item = Label> {
        self.then.into_iter().chain(self.other)
    }

    pub fn last(&self) -> &StmtNode {
        match self.stmts.last() {
            Some(stmt) => &stmt.node,
            None => unreachable!("blocks start with their label"),
        }
    }

    /// Whether this block holds the end of the procedure.
    pub fn is_exit(&self) -> bool {
        self.stmts
            .iter()
            .any(|stmt| matches!(stmt.node, StmtNode::End))
    }

    /// Close the block with `stmt` and set the successors it names.
    fn terminate(&mut self, stmt: Stmt) {
        match &stmt.node {
            StmtNode::Jump(target) => self.then = Some(*target),
            StmtNode::CJump { then, other, .. } => {
                self.then = Some(*then);
                self.other = Some(*other);
            }
            StmtNode::Return { end, .. } => self.then = Some(*end),
            _ => unreachable!(),
        }

        self.stmts.push(stmt);
    }
}

/// Split a linear list of statements into blocks. Every block starts with a
/// label and ends in at most one transfer; a block that falls into a label
/// gets an explicit jump to it.
pub fn split(labels: &mut Labels, stmts: Vec<Stmt>) -> Vec<Block> {
    let mut blocks = Vec::new();
    let mut current: Option<Block> = None;

    for stmt in stmts {
        match stmt.node {
            StmtNode::Label(label) => {
                if let Some(mut block) = current.take() {
                    block.terminate(Stmt::new(StmtNode::Jump(label)));
                    blocks.push(block);
                }

                current = Some(Block::new(label));
            }

            _ => {
                let block = current.get_or_insert_with(|| {
                    let label = labels.fresh();
                    trace!("new block {}", labels.name(&label));
                    Block::new(label)
                });

                if stmt.node.is_transfer() {
                    block.terminate(stmt);
                    blocks.extend(current.take());
                } else {
                    block.stmts.push(stmt);
                }
            }
        }
    }

    blocks.extend(current);
    blocks
}

/// Concatenate the blocks, dropping jumps to the immediately following block.
pub fn flatten(blocks: Vec<Block>) -> Vec<Stmt> {
    let next_labels: Vec<_> = blocks
        .iter()
        .skip(1)
        .map(|block| Some(block.label))
        .chain(std::iter::once(None))
        .collect();

    let mut stmts = Vec::new();
    for (mut block, next) in blocks.into_iter().zip(next_labels) {
        let falls_through = matches!(
            (block.last(), next),
            (StmtNode::Jump(target), Some(next)) if *target == next
        );

        if falls_through {
            block.stmts.pop();
        }

        stmts.extend(block.stmts);
    }

    stmts
}

/// Give every statement its position, counting across all blocks.
pub fn number(blocks: &mut [Block]) {
    let stmts = blocks.iter_mut().flat_map(|block| block.stmts.iter_mut());
    for (pos, stmt) in stmts.enumerate() {
        stmt.pos = pos;
    }
}

/// Number a flat statement list and record the position of every label.
pub fn place_labels(labels: &mut Labels, stmts: &mut [Stmt]) {
    for (pos, stmt) in stmts.iter_mut().enumerate() {
        stmt.pos = pos;
        if let StmtNode::Label(label) = stmt.node {
            labels.set_position(label, pos);
        }
    }
}
