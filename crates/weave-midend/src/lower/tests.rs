use weave_common::ast::build::*;
use weave_common::ast::{self, BinOp as AstBinOp, ElemNode, FormalKind, Scope, SymbolKind, UnOp, VarKind};
use weave_common::ir::{BinOp, Expr, Mem, MemKind, Operand, Program, StmtNode, Target};
use weave_common::message::{Messages, Span};
use weave_common::target::{ALL_ONES, TRUE};

use super::expr::fold;
use super::lower;

fn program(procs: Vec<ast::ProcDecl>) -> ast::Program {
    ast::Program {
        globals: Vec::new(),
        procs,
        span: Span::default(),
    }
}

fn lower_main(locals: Vec<ast::VarDecl>, body: ast::Stmt) -> Program {
    let (program, messages) = lower(&program(vec![proc("main", vec![], locals, body)]), "main");
    assert!(messages.is_empty());
    program
}

fn nodes(program: &Program) -> Vec<StmtNode> {
    program.procs[0]
        .stmts
        .iter()
        .map(|stmt| stmt.node.clone())
        .collect()
}

fn codes(messages: &Messages) -> Vec<String> {
    messages
        .msgs
        .iter()
        .filter_map(|msg| msg.code.clone())
        .collect()
}

#[test]
fn body_ends_in_epilogue() {
    let program = lower_main(vec![], skip());
    let epilogue = program.procs[0].frame.epilogue();

    assert_eq!(vec![StmtNode::Label(epilogue), StmtNode::End], nodes(&program));
}

#[test]
fn return_jumps_to_epilogue() {
    let (program, _) = lower(
        &program(vec![func("main", vec![], vec![], ret(num(7)))]),
        "main",
    );
    let epilogue = program.procs[0].frame.epilogue();

    assert_eq!(
        StmtNode::Return {
            end: epilogue,
            value: Expr::Const(7)
        },
        program.procs[0].stmts[0].node
    );
}

#[test]
fn if_branches_to_both_arms() {
    let program = lower_main(
        vec![],
        if_(
            read(local("c")),
            assign(name(local("x")), num(1)),
            assign(name(local("x")), num(2)),
        ),
    );

    let temps = &program.procs[0].frame.temps;
    let c = temps.lookup("c").unwrap();
    let x = temps.lookup("x").unwrap();
    let nodes = nodes(&program);
    assert_eq!(9, nodes.len());

    let StmtNode::CJump { cond, then, other } = nodes[0] else {
        panic!("expected a conditional jump, got {:?}", nodes[0]);
    };
    let StmtNode::Jump(end) = nodes[3] else {
        panic!("expected a jump, got {:?}", nodes[3]);
    };

    assert_eq!(c, cond);
    assert_eq!(StmtNode::Label(then), nodes[1]);
    assert_eq!(
        StmtNode::Move {
            dst: Target::Temp(x),
            src: Expr::Const(1)
        },
        nodes[2]
    );
    assert_eq!(StmtNode::Label(other), nodes[4]);
    assert_eq!(StmtNode::Label(end), nodes[6]);
}

#[test]
fn while_tests_at_the_top() {
    let program = lower_main(
        vec![],
        while_(
            binary(AstBinOp::Lt, name(local("i")), num(10)),
            assign(
                name(local("i")),
                binary(AstBinOp::Add, name(local("i")), num(1)),
            ),
        ),
    );

    let i = program.procs[0].frame.temps.lookup("i").unwrap();
    let nodes = nodes(&program);
    assert_eq!(9, nodes.len());

    let StmtNode::Label(start) = nodes[0] else {
        panic!("expected the loop head, got {:?}", nodes[0]);
    };
    let StmtNode::Move {
        dst: Target::Temp(cond_temp),
        src: Expr::Binop(BinOp::Lt, Operand::Temp(left), Operand::Const(10)),
    } = nodes[1]
    else {
        panic!("expected the hoisted condition, got {:?}", nodes[1]);
    };
    let StmtNode::CJump { cond, then, other } = nodes[2] else {
        panic!("expected a conditional jump, got {:?}", nodes[2]);
    };

    assert_eq!(i, left);
    assert_eq!(cond_temp, cond);
    assert_eq!(StmtNode::Label(then), nodes[3]);
    assert_eq!(StmtNode::Jump(start), nodes[5]);
    assert_eq!(StmtNode::Label(other), nodes[6]);
}

#[test]
fn for_increments_before_looping_back() {
    let program = lower_main(vec![], for_(local("i"), num(0), num(3), skip()));

    let i = program.procs[0].frame.temps.lookup("i").unwrap();
    let nodes = nodes(&program);
    assert_eq!(10, nodes.len());

    assert_eq!(
        StmtNode::Move {
            dst: Target::Temp(i),
            src: Expr::Const(0)
        },
        nodes[0]
    );

    let StmtNode::Label(start) = nodes[1] else {
        panic!("expected the loop head, got {:?}", nodes[1]);
    };
    assert!(matches!(
        nodes[2],
        StmtNode::Move {
            src: Expr::Binop(BinOp::Le, Operand::Temp(_), Operand::Const(3)),
            ..
        }
    ));
    assert!(matches!(nodes[3], StmtNode::CJump { .. }));
    assert_eq!(
        StmtNode::Move {
            dst: Target::Temp(i),
            src: Expr::Binop(BinOp::Add, Operand::Temp(i), Operand::Const(1))
        },
        nodes[5]
    );
    assert_eq!(StmtNode::Jump(start), nodes[6]);
}

#[test]
fn for_evaluates_its_bound_once() {
    let program = lower_main(vec![], for_(local("i"), num(0), read(local("n")), skip()));

    let n = program.procs[0].frame.temps.lookup("n").unwrap();
    let nodes = nodes(&program);

    let StmtNode::Move {
        dst: Target::Temp(bound),
        src: Expr::Temp(source),
    } = nodes[1]
    else {
        panic!("expected the bound copy, got {:?}", nodes[1]);
    };
    assert_eq!(n, source);

    assert!(matches!(nodes[2], StmtNode::Label(_)));
    assert!(matches!(
        nodes[3],
        StmtNode::Move {
            src: Expr::Binop(BinOp::Le, _, Operand::Temp(used)),
            ..
        } if used == bound
    ));
}

#[test]
fn par_forks_and_joins_every_arm() {
    let program = lower_main(
        vec![],
        par(vec![
            assign(name(local("x")), num(1)),
            assign(name(local("y")), num(2)),
        ]),
    );

    let nodes = nodes(&program);

    let StmtNode::Fork {
        sync,
        ref threads,
        ..
    } = nodes[0]
    else {
        panic!("expected a fork, got {:?}", nodes[0]);
    };
    assert_eq!(2, threads.len());

    let forksets: Vec<_> = nodes
        .iter()
        .filter_map(|node| match node {
            StmtNode::ForkSet { entry, .. } => Some(*entry),
            _ => None,
        })
        .collect();
    assert_eq!(vec![threads[1]], forksets);
    assert_eq!(StmtNode::ForkSync { sync }, nodes[2]);

    let joins: Vec<_> = nodes
        .iter()
        .filter_map(|node| match node {
            StmtNode::Join {
                sync: joined,
                master,
                exit,
            } => Some((*joined, *master, *exit)),
            _ => None,
        })
        .collect();
    assert_eq!(2, joins.len());
    assert_eq!((sync, true), (joins[0].0, joins[0].1));
    assert_eq!((sync, false), (joins[1].0, joins[1].1));
    assert_eq!(joins[0].2, joins[1].2);

    assert_eq!(StmtNode::Label(threads[0]), nodes[3]);
    assert_eq!(StmtNode::Label(threads[1]), nodes[6]);
    assert_eq!(StmtNode::Label(joins[0].2), nodes[9]);
}

#[test]
fn too_many_threads_is_reported() {
    let arms = (0..9).map(|_| skip()).collect();
    let (program, messages) = lower(
        &program(vec![proc("main", vec![], vec![], par(arms))]),
        "main",
    );

    assert_eq!(vec!["EL00".to_string()], codes(&messages));
    assert_eq!(Some(&StmtNode::End), program.procs[0].stmts.last().map(|stmt| &stmt.node));
}

#[test]
fn missing_entry_is_reported() {
    let (_, messages) = lower(&program(vec![proc("start", vec![], vec![], skip())]), "main");
    assert_eq!(vec!["EL01".to_string()], codes(&messages));
}

#[test]
fn entry_comes_first() {
    let (program, messages) = lower(
        &program(vec![
            proc("helper", vec![], vec![], skip()),
            proc("main", vec![], vec![], skip()),
        ]),
        "main",
    );

    assert!(messages.is_empty());
    assert_eq!("main", program.labels.name(&program.procs[0].name));
    assert_eq!("helper", program.labels.name(&program.procs[1].name));
    assert_eq!(3, program.procs[0].jump_index());
    assert_eq!(4, program.procs[1].jump_index());
}

#[test]
fn constant_subscripts_address_the_local_band() {
    let a = var("a", SymbolKind::IntArray, Scope::Local);
    let program = lower_main(
        vec![decl("b", VarKind::IntArray(4)), decl("a", VarKind::IntArray(10))],
        assign(sub(a, num(2)), num(5)),
    );

    let nodes = nodes(&program);
    let StmtNode::Move {
        dst: Target::Temp(value),
        src: Expr::Const(5),
    } = nodes[0]
    else {
        panic!("expected the hoisted source, got {:?}", nodes[0]);
    };

    assert_eq!(
        StmtNode::Move {
            dst: Target::Mem(Mem::new(MemKind::SpLocal, None, Operand::Const(6))),
            src: Expr::Temp(value),
        },
        nodes[1]
    );
}

#[test]
fn variable_subscripts_address_absolutely() {
    let a = var("a", SymbolKind::IntArray, Scope::Local);
    let program = lower_main(
        vec![decl("a", VarKind::IntArray(10))],
        assign(sub(a, read(local("i"))), num(5)),
    );

    let i = program.procs[0].frame.temps.lookup("i").unwrap();
    let nodes = nodes(&program);

    let StmtNode::Move {
        dst: Target::Temp(base),
        src: Expr::Mem(Mem {
            kind: MemKind::SpAddr,
            offset: Operand::Const(0),
            ..
        }),
    } = nodes[0]
    else {
        panic!("expected the array address, got {:?}", nodes[0]);
    };

    let StmtNode::Move {
        dst: Target::Mem(mem),
        ..
    } = nodes[2]
    else {
        panic!("expected a store, got {:?}", nodes[2]);
    };

    assert_eq!(
        Mem::new(MemKind::Abs, Some(Operand::Temp(base)), Operand::Temp(i)),
        mem
    );
}

#[test]
fn module_arrays_address_the_data_pool() {
    let g = var("g", SymbolKind::IntArray, Scope::Module);
    let mut ast = program(vec![proc(
        "main",
        vec![],
        vec![],
        assign(sub(g, num(1)), num(0)),
    )]);
    ast.globals.push(decl("n", VarKind::Int));
    ast.globals.push(decl("g", VarKind::IntArray(4)));

    let (program, _) = lower(&ast, "main");
    let label = program.data.location("g");

    assert_eq!(1, program.data.get("g").unwrap().offset);
    assert_eq!(5, program.data.size());
    assert!(matches!(
        program.procs[0].stmts[1].node,
        StmtNode::Move {
            dst: Target::Mem(Mem {
                kind: MemKind::Dp,
                base: Some(Operand::Name(at)),
                offset: Operand::Const(1),
            }),
            ..
        } if at == label
    ));
}

#[test]
fn constant_alias_is_scaled_and_folded() {
    let a = var("a", SymbolKind::IntArray, Scope::Local);
    let p = var("p", SymbolKind::IntAlias, Scope::Local);
    let body = stmt(ast::StmtNode::Alias {
        dest: name(p),
        array: name(a),
        index: num(3),
    });
    let program = lower_main(vec![decl("a", VarKind::IntArray(10))], body);

    let p = program.procs[0].frame.temps.lookup("p").unwrap();
    let nodes = nodes(&program);

    let StmtNode::Move {
        dst: Target::Temp(base),
        ..
    } = nodes[0]
    else {
        panic!("expected the array address, got {:?}", nodes[0]);
    };

    assert_eq!(
        StmtNode::Move {
            dst: Target::Temp(p),
            src: Expr::Binop(BinOp::Add, Operand::Temp(base), Operand::Const(12)),
        },
        nodes[1]
    );
}

#[test]
fn variable_alias_multiplies_then_adds() {
    let a = var("a", SymbolKind::IntArrayRef, Scope::Local);
    let p = var("p", SymbolKind::IntAlias, Scope::Local);
    let body = stmt(ast::StmtNode::Alias {
        dest: name(p),
        array: name(a),
        index: read(local("i")),
    });
    let program = lower_main(vec![], body);

    let temps = &program.procs[0].frame.temps;
    let (a, p, i) = (
        temps.lookup("a").unwrap(),
        temps.lookup("p").unwrap(),
        temps.lookup("i").unwrap(),
    );

    assert_eq!(
        vec![
            StmtNode::Move {
                dst: Target::Temp(p),
                src: Expr::Binop(BinOp::Mul, Operand::Temp(i), Operand::Const(4)),
            },
            StmtNode::Move {
                dst: Target::Temp(p),
                src: Expr::Binop(BinOp::Add, Operand::Temp(a), Operand::Temp(p)),
            },
        ],
        nodes(&program)[..2]
    );
}

#[test]
fn constants_fold() {
    let program = lower_main(
        vec![],
        seq(vec![
            assign(
                name(local("x")),
                binary(
                    AstBinOp::Add,
                    elem(ElemNode::Number(2)),
                    binary(AstBinOp::Mul, elem(ElemNode::Number(3)), num(4)),
                ),
            ),
            assign(
                name(local("y")),
                binary(AstBinOp::Lt, elem(ElemNode::Number(1)), num(2)),
            ),
            assign(name(local("z")), unary(UnOp::Neg, elem(ElemNode::Number(5)))),
            assign(name(local("w")), unary(UnOp::Not, name(local("x")))),
            assign(
                name(local("v")),
                binary(AstBinOp::Div, elem(ElemNode::Number(4)), num(0)),
            ),
        ]),
    );

    let temps = &program.procs[0].frame.temps;
    let x = temps.lookup("x").unwrap();
    let sources: Vec<_> = nodes(&program)
        .into_iter()
        .filter_map(|node| match node {
            StmtNode::Move { src, .. } => Some(src),
            _ => None,
        })
        .collect();

    assert_eq!(
        vec![
            Expr::Const(14),
            Expr::Const(TRUE),
            Expr::Const(-5i32 as u32),
            Expr::Binop(BinOp::Xor, Operand::Const(ALL_ONES), Operand::Temp(x)),
            Expr::Binop(BinOp::Div, Operand::Const(4), Operand::Const(0)),
        ],
        sources
    );
}

#[test]
fn folding_wraps_and_compares_signed() {
    assert_eq!(Some(0), fold(BinOp::Add, u32::MAX, 1));
    assert_eq!(Some(TRUE), fold(BinOp::Lt, -1i32 as u32, 0));
    assert_eq!(Some(-2i32 as u32), fold(BinOp::Div, -7i32 as u32, 3));
    assert_eq!(None, fold(BinOp::Rem, 1, 0));
    assert_eq!(Some(0), fold(BinOp::Shl, 1, 32));
}

#[test]
fn call_arguments_get_fresh_temps() {
    let program = lower_main(
        vec![],
        assign(
            name(local("x")),
            fcall("f", vec![read(local("y")), num(1)]),
        ),
    );

    let frame = &program.procs[0].frame;
    let y = frame.temps.lookup("y").unwrap();
    let nodes = nodes(&program);

    let StmtNode::Move {
        dst: Target::Temp(first),
        src: Expr::Temp(source),
    } = nodes[0]
    else {
        panic!("expected the first argument, got {:?}", nodes[0]);
    };
    assert_eq!(y, source);
    assert_ne!(y, first);

    let StmtNode::Move {
        src: Expr::Call(ref call),
        ..
    } = nodes[2]
    else {
        panic!("expected the call, got {:?}", nodes[2]);
    };
    assert_eq!(2, call.args.len());
    assert_eq!(first, call.args[0]);
    assert_eq!(1, frame.out_arg_offset());
}

#[test]
fn stacked_arguments_are_stored_before_the_call() {
    let program = lower_main(vec![], pcall("f", (1..=6).map(num).collect()));

    let frame = &program.procs[0].frame;
    assert_eq!(2, frame.num_out_args());

    let nodes = nodes(&program);
    let args: Vec<_> = nodes[..6]
        .iter()
        .map(|node| match node {
            StmtNode::Move {
                dst: Target::Temp(temp),
                src: Expr::Const(_),
            } => *temp,
            other => panic!("expected an argument, got {other:?}"),
        })
        .collect();

    let out = |offset| {
        Target::Mem(Mem::new(MemKind::SpOut, None, Operand::Const(offset)))
    };

    assert_eq!(
        StmtNode::Move {
            dst: out(0),
            src: Expr::Temp(args[4]),
        },
        nodes[6]
    );
    assert_eq!(
        StmtNode::Move {
            dst: out(1),
            src: Expr::Temp(args[5]),
        },
        nodes[7]
    );

    let StmtNode::Call { args: ref passed, .. } = nodes[8] else {
        panic!("expected the call, got {:?}", nodes[8]);
    };
    assert_eq!(&args[..4], passed.as_slice());
}

#[test]
fn function_calls_with_stacked_arguments_are_hoisted() {
    let program = lower_main(
        vec![],
        assign(name(local("x")), fcall("f", (1..=5).map(num).collect())),
    );

    let x = program.procs[0].frame.temps.lookup("x").unwrap();
    let nodes = nodes(&program);

    assert!(matches!(
        nodes[5],
        StmtNode::Move {
            dst: Target::Mem(Mem {
                kind: MemKind::SpOut,
                ..
            }),
            ..
        }
    ));

    let StmtNode::Move {
        dst: Target::Temp(result),
        src: Expr::Call(ref call),
    } = nodes[6]
    else {
        panic!("expected the call, got {:?}", nodes[6]);
    };
    assert_eq!(4, call.args.len());

    assert_eq!(
        StmtNode::Move {
            dst: Target::Temp(x),
            src: Expr::Temp(result),
        },
        nodes[7]
    );
}

#[test]
fn strings_go_to_the_constant_pool() {
    let program = lower_main(
        vec![],
        assign(name(local("s")), expr(elem(ElemNode::Str("hello".into())))),
    );

    assert_eq!(2, program.strings.size());
    let (label, _) = program.strings.iter().next().unwrap();
    assert!(matches!(
        program.procs[0].stmts[0].node,
        StmtNode::Move {
            src: Expr::Mem(Mem {
                kind: MemKind::CpAddr,
                base: Some(Operand::Name(at)),
                ..
            }),
            ..
        } if at == *label
    ));

    let s = program.procs[0].frame.temps.lookup("s").unwrap();
    assert!(matches!(
        program.procs[0].stmts[1].node,
        StmtNode::Move {
            dst: Target::Temp(dst),
            src: Expr::Temp(_),
        } if dst == s
    ));
}

#[test]
fn children_are_closed_transitively() {
    let migrate = stmt(ast::StmtNode::On {
        dest: core(num(1)),
        call: call("a", vec![]),
    });
    let (program, _) = lower(
        &program(vec![
            proc("main", vec![], vec![], migrate),
            proc("a", vec![], vec![], pcall("b", vec![])),
            proc("b", vec![formal("n", FormalKind::Int)], vec![], skip()),
        ]),
        "main",
    );

    let a = program.labels.lookup("a").unwrap();
    let b = program.labels.lookup("b").unwrap();
    assert_eq!(vec![a, b], program.procs[0].children);
    assert_eq!(vec![b], program.procs[1].children);
    assert!(program.procs[2].children.is_empty());

    let migrated: Vec<_> = nodes(&program)
        .into_iter()
        .filter_map(|node| match node {
            StmtNode::On { call, .. } => Some(call.func),
            _ => None,
        })
        .collect();
    assert_eq!(vec![a], migrated);

    let closure = program.closure(&a);
    assert_eq!(4, closure.index);
    assert_eq!(vec![5], closure.children);
}

#[test]
fn connect_operands_are_temps() {
    let body = stmt(ast::StmtNode::Connect {
        to: core(num(1)),
        first: chan(num(0)),
        second: chan(num(1)),
    });
    let program = lower_main(vec![], body);

    let nodes = nodes(&program);
    let StmtNode::Connect { to, first, second } = nodes[3] else {
        panic!("expected a connect, got {:?}", nodes[3]);
    };

    for sys in [to, first, second] {
        assert!(matches!(sys.value, Operand::Temp(_)));
    }
    assert_eq!("core", program.labels.name(&to.resource));
    assert_eq!("chan", program.labels.name(&first.resource));
}
