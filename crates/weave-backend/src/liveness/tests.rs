use weave_common::ir::{
    BinOp, Expr, Operand, Resource, Stmt, StmtNode, Target, Temp, TempKind, TempSet, Temps,
};
use weave_common::labels::Labels;

use super::{eliminate_dead, liveness};
use crate::blocks::{split, Block};

fn blocks(labels: &mut Labels, nodes: Vec<StmtNode>) -> Vec<Block> {
    split(labels, nodes.into_iter().map(Stmt::new).collect())
}

fn set(x: Temp, src: Expr) -> StmtNode {
    StmtNode::Move {
        dst: Target::Temp(x),
        src,
    }
}

fn add(x: Temp, value: u32) -> Expr {
    Expr::Binop(BinOp::Add, Operand::Temp(x), Operand::Const(value))
}

#[test]
fn straight_line() {
    let mut labels = Labels::new();
    let mut temps = Temps::new();
    let x = temps.named("x", TempKind::Local);
    let y = temps.named("y", TempKind::Local);
    let end = labels.named("end");

    let mut blocks = blocks(
        &mut labels,
        vec![
            set(x, Expr::Const(1)),
            set(y, add(x, 1)),
            StmtNode::Return {
                end,
                value: Expr::Temp(y),
            },
            StmtNode::Label(end),
            StmtNode::End,
        ],
    );
    liveness(&mut blocks);

    let stmts = &blocks[0].stmts;
    assert_eq!(TempSet::unit(x), stmts[1].live_out);
    assert_eq!(TempSet::unit(x), stmts[2].live_in);
    assert_eq!(TempSet::unit(y), stmts[2].live_out);
    assert_eq!(TempSet::unit(y), stmts[3].live_in);
    assert!(stmts[3].live_out.is_empty());
    assert!(stmts[0].live_in.is_empty());
}

#[test]
fn loops_keep_their_counter_alive() {
    let mut labels = Labels::new();
    let mut temps = Temps::new();
    let i = temps.named("i", TempKind::Local);
    let t = temps.named("t", TempKind::Local);
    let (head, body, exit, end) = (
        labels.named("head"),
        labels.named("body"),
        labels.named("exit"),
        labels.named("end"),
    );

    let mut blocks = blocks(
        &mut labels,
        vec![
            set(i, Expr::Const(0)),
            StmtNode::Label(head),
            set(
                t,
                Expr::Binop(BinOp::Lt, Operand::Temp(i), Operand::Const(10)),
            ),
            StmtNode::CJump {
                cond: t,
                then: body,
                other: exit,
            },
            StmtNode::Label(body),
            set(i, add(i, 1)),
            StmtNode::Jump(head),
            StmtNode::Label(exit),
            StmtNode::Return {
                end,
                value: Expr::Temp(i),
            },
            StmtNode::Label(end),
            StmtNode::End,
        ],
    );
    liveness(&mut blocks);

    // head
    assert_eq!(TempSet::unit(i), blocks[1].stmts[0].live_in);
    assert_eq!(TempSet::from(vec![i, t]), blocks[1].stmts[1].live_out);
    assert_eq!(TempSet::unit(i), blocks[1].stmts[2].live_out);

    // the increment feeds the next round
    assert_eq!(TempSet::unit(i), blocks[2].stmts[1].live_out);
    assert_eq!(TempSet::unit(i), blocks[2].stmts[2].live_out);
}

#[test]
fn liveness_is_idempotent() {
    let mut labels = Labels::new();
    let mut temps = Temps::new();
    let i = temps.named("i", TempKind::Local);
    let (head, end) = (labels.named("head"), labels.named("end"));

    let mut blocks = blocks(
        &mut labels,
        vec![
            StmtNode::Label(head),
            set(i, add(i, 1)),
            StmtNode::CJump {
                cond: i,
                then: head,
                other: end,
            },
            StmtNode::Label(end),
            StmtNode::End,
        ],
    );

    liveness(&mut blocks);
    let first = blocks.clone();
    let passes = liveness(&mut blocks);

    assert_eq!(first, blocks);
    assert!(passes >= 2);
}

#[test]
fn dead_definitions_are_removed() {
    let mut labels = Labels::new();
    let mut temps = Temps::new();
    let x = temps.named("x", TempKind::Local);
    let y = temps.named("y", TempKind::Local);
    let c = temps.named("c", TempKind::Local);
    let g = temps.named("g", TempKind::Global);
    let end = labels.named("end");

    let mut blocks = blocks(
        &mut labels,
        vec![
            set(x, Expr::Const(1)),
            StmtNode::Input {
                dst: x,
                chan: Resource::Temp(c),
            },
            set(g, Expr::Const(3)),
            set(y, Expr::Const(2)),
            StmtNode::Return {
                end,
                value: Expr::Temp(y),
            },
            StmtNode::Label(end),
            StmtNode::End,
        ],
    );

    liveness(&mut blocks);
    assert_eq!(1, eliminate_dead(&temps, &mut blocks));

    let nodes: Vec<_> = blocks[0].stmts.iter().map(|stmt| &stmt.node).collect();
    assert_eq!(5, nodes.len());
    assert!(matches!(nodes[1], StmtNode::Input { .. }));
    assert_eq!(&set(g, Expr::Const(3)), nodes[2]);

    liveness(&mut blocks);
    assert_eq!(0, eliminate_dead(&temps, &mut blocks));
}
