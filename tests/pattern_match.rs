//! Pattern match compilation, checked structurally and by evaluation.

use termlower::error::{InterpError, LowerError};
use termlower::interp::{eval_function, Term};
use termlower::ir::{
    Arg, BinarySpecifier, BlockId, Constant, Endianness, IrFunction, IrFunctionBuilder, IrInstr,
    IrType, LocId, TermType, ValueId,
};
use termlower::lower::{Match, MatchBranch, MatchPattern};
use termlower::{seal_function, LowerConfig, Lowerer};

fn arg(b: &IrFunctionBuilder, index: usize) -> ValueId {
    b.func().entry_block().params[index].id
}

fn konst(b: &mut IrFunctionBuilder, value: Constant) -> ValueId {
    let ty = IrType::Term(value.term_type());
    b.emit(ty, |result| IrInstr::Const { result, value })
}

/// Seals `block` with a return of the atom `name`.
fn return_atom(b: &mut IrFunctionBuilder, block: BlockId, name: &str) {
    b.set_current_block(block);
    let v = konst(b, Constant::atom(name));
    b.terminate(IrInstr::Return { values: vec![v] });
}

fn branch(dest: BlockId, pattern: MatchPattern) -> MatchBranch {
    MatchBranch {
        loc: None,
        dest,
        dest_args: vec![],
        pattern,
    }
}

fn count(func: &IrFunction, pred: impl Fn(&IrInstr) -> bool) -> usize {
    func.blocks()
        .iter()
        .flat_map(|blk| blk.instrs.iter())
        .filter(|i| pred(i))
        .count()
}

/// `case x of [h | t] -> cons; {a, b} -> b; _ -> other end`
fn cons_tuple_any(config: &LowerConfig) -> IrFunction {
    let mut b = IrFunctionBuilder::declare("classify", &[Arg::new(TermType::Any)]);
    let x = arg(&b, 0);
    let on_cons = b.create_block(Some("on_cons"));
    b.add_block_param(on_cons, Some("h"), IrType::ANY);
    b.add_block_param(on_cons, Some("t"), IrType::ANY);
    let on_tuple = b.create_block(Some("on_tuple"));
    b.add_block_param(on_tuple, Some("a"), IrType::ANY);
    let second = b.add_block_param(on_tuple, Some("b"), IrType::ANY);
    let on_other = b.create_block(Some("on_other"));

    let m = Match {
        loc: None,
        selector: x,
        branches: vec![
            branch(on_cons, MatchPattern::Cons),
            branch(on_tuple, MatchPattern::Tuple(2)),
            branch(on_other, MatchPattern::Any),
        ],
        fallthrough: None,
    };
    Lowerer::new(&mut b, config).lower_match(&m).unwrap();

    return_atom(&mut b, on_cons, "cons");
    b.set_current_block(on_tuple);
    b.terminate(IrInstr::Return {
        values: vec![second],
    });
    return_atom(&mut b, on_other, "other");
    seal_function(b, config).unwrap()
}

#[test]
fn test_first_matching_branch_wins() {
    let func = cons_tuple_any(&LowerConfig::default());

    let pair = Term::tuple(vec![Term::Int(1), Term::Int(2)]);
    assert_eq!(eval_function(&func, &[pair]).unwrap(), vec![Term::Int(2)]);

    let list = Term::list(vec![Term::Int(1)]);
    assert_eq!(
        eval_function(&func, &[list]).unwrap(),
        vec![Term::atom("cons")]
    );

    let triple = Term::tuple(vec![Term::Nil, Term::Nil, Term::Nil]);
    assert_eq!(
        eval_function(&func, &[triple]).unwrap(),
        vec![Term::atom("other")]
    );
    assert_eq!(
        eval_function(&func, &[Term::Nil]).unwrap(),
        vec![Term::atom("other")]
    );
}

#[test]
fn test_tuple_test_is_exact_arity() {
    let func = cons_tuple_any(&LowerConfig::default());
    let tests: Vec<TermType> = func
        .blocks()
        .iter()
        .flat_map(|blk| blk.instrs.iter())
        .filter_map(|i| match i {
            IrInstr::IsType { ty, .. } => Some(*ty),
            _ => None,
        })
        .collect();
    assert_eq!(tests, vec![TermType::Cons, TermType::Tuple(2)]);
    assert_eq!(
        count(&func, |i| matches!(i, IrInstr::GetElement { .. })),
        2
    );
}

#[test]
fn test_empty_match_is_rejected() {
    let config = LowerConfig::default();
    let mut b = IrFunctionBuilder::declare("f", &[Arg::new(TermType::Any)]);
    let x = arg(&b, 0);
    let m = Match {
        loc: None,
        selector: x,
        branches: vec![],
        fallthrough: None,
    };
    let err = Lowerer::new(&mut b, &config).lower_match(&m).unwrap_err();
    assert!(matches!(err, LowerError::EmptyMatch));
}

#[test]
fn test_destination_arity_mismatch_emits_nothing() {
    let config = LowerConfig::default();
    let mut b = IrFunctionBuilder::declare("f", &[Arg::new(TermType::Any)]);
    let x = arg(&b, 0);
    let ok = b.create_block(Some("ok"));
    b.add_block_param(ok, None, IrType::ANY);
    let other = b.create_block(Some("other"));

    let m = Match {
        loc: None,
        selector: x,
        branches: vec![
            branch(other, MatchPattern::IsType(TermType::Atom)),
            branch(ok, MatchPattern::Tuple(2)),
        ],
        fallthrough: None,
    };
    let err = Lowerer::new(&mut b, &config).lower_match(&m).unwrap_err();
    match err {
        LowerError::DestinationArity {
            expected, found, ..
        } => {
            assert_eq!(expected, 1);
            assert_eq!(found, 2);
        }
        other => panic!("expected DestinationArity, got {:?}", other),
    }
    assert!(b.func().entry_block().instrs.is_empty());
    assert_eq!(b.func().blocks().len(), 3);
}

#[test]
fn test_fallthrough_must_take_no_arguments() {
    let config = LowerConfig::default();
    let mut b = IrFunctionBuilder::declare("f", &[Arg::new(TermType::Any)]);
    let x = arg(&b, 0);
    let ok = b.create_block(Some("ok"));
    let fallthrough = b.create_block(Some("fallthrough"));
    b.add_block_param(fallthrough, None, IrType::ANY);

    let m = Match {
        loc: None,
        selector: x,
        branches: vec![branch(ok, MatchPattern::IsType(TermType::Map))],
        fallthrough: Some(fallthrough),
    };
    let err = Lowerer::new(&mut b, &config).lower_match(&m).unwrap_err();
    assert!(matches!(
        err,
        LowerError::DestinationArity { expected: 1, found: 0, .. }
    ));
}

#[test]
fn test_branch_args_follow_bound_values() {
    let config = LowerConfig::default();
    let mut b = IrFunctionBuilder::declare(
        "f",
        &[Arg::new(TermType::Any), Arg::new(TermType::Any)],
    );
    let x = arg(&b, 0);
    let extra = arg(&b, 1);
    let on_cons = b.create_block(Some("on_cons"));
    let head = b.add_block_param(on_cons, Some("h"), IrType::ANY);
    b.add_block_param(on_cons, Some("t"), IrType::ANY);
    let passed = b.add_block_param(on_cons, Some("extra"), IrType::ANY);
    let fallthrough = b.create_block(Some("fallthrough"));

    let m = Match {
        loc: None,
        selector: x,
        branches: vec![MatchBranch {
            loc: None,
            dest: on_cons,
            dest_args: vec![extra],
            pattern: MatchPattern::Cons,
        }],
        fallthrough: Some(fallthrough),
    };
    Lowerer::new(&mut b, &config).lower_match(&m).unwrap();
    b.set_current_block(on_cons);
    b.terminate(IrInstr::Return {
        values: vec![head, passed],
    });
    return_atom(&mut b, fallthrough, "nomatch");
    let func = seal_function(b, &config).unwrap();

    let list = Term::list(vec![Term::Int(9), Term::Int(8)]);
    assert_eq!(
        eval_function(&func, &[list, Term::atom("x")]).unwrap(),
        vec![Term::Int(9), Term::atom("x")]
    );
    assert_eq!(
        eval_function(&func, &[Term::Nil, Term::atom("x")]).unwrap(),
        vec![Term::atom("nomatch")]
    );
}

#[test]
fn test_map_item_binds_value_under_key() {
    let config = LowerConfig::default();
    let mut b = IrFunctionBuilder::declare("f", &[Arg::new(TermType::Any)]);
    let x = arg(&b, 0);
    let key = konst(&mut b, Constant::atom("a"));
    let found = b.create_block(Some("found"));
    let value = b.add_block_param(found, Some("v"), IrType::ANY);
    let missing = b.create_block(Some("missing"));

    let m = Match {
        loc: None,
        selector: x,
        branches: vec![branch(found, MatchPattern::MapItem(key))],
        fallthrough: Some(missing),
    };
    Lowerer::new(&mut b, &config).lower_match(&m).unwrap();
    b.set_current_block(found);
    b.terminate(IrInstr::Return {
        values: vec![value],
    });
    return_atom(&mut b, missing, "missing");
    let func = seal_function(b, &config).unwrap();

    let with_a = Term::map(vec![(Term::atom("a"), Term::Int(1))]);
    assert_eq!(eval_function(&func, &[with_a]).unwrap(), vec![Term::Int(1)]);

    let without = Term::map(vec![(Term::atom("b"), Term::Int(1))]);
    assert_eq!(
        eval_function(&func, &[without]).unwrap(),
        vec![Term::atom("missing")]
    );
    assert_eq!(
        eval_function(&func, &[Term::Int(3)]).unwrap(),
        vec![Term::atom("missing")]
    );
}

#[test]
fn test_literal_value_comparison_is_decided_statically() {
    let config = LowerConfig::default();
    let mut b = IrFunctionBuilder::declare("f", &[]);
    let selector = konst(&mut b, Constant::Int(1));
    let two = konst(&mut b, Constant::Int(2));
    let one = konst(&mut b, Constant::Int(1));
    let is_two = b.create_block(Some("is_two"));
    let is_one = b.create_block(Some("is_one"));

    let m = Match {
        loc: None,
        selector,
        branches: vec![
            branch(is_two, MatchPattern::Value(two)),
            branch(is_one, MatchPattern::Value(one)),
        ],
        fallthrough: None,
    };
    Lowerer::new(&mut b, &config).lower_match(&m).unwrap();
    return_atom(&mut b, is_two, "two");
    return_atom(&mut b, is_one, "one");
    let func = seal_function(b, &config).unwrap();

    assert_eq!(count(&func, |i| matches!(i, IrInstr::Eq { .. })), 0);
    assert_eq!(eval_function(&func, &[]).unwrap(), vec![Term::atom("one")]);
}

#[test]
fn test_runtime_value_comparison_without_folding() {
    let config = LowerConfig {
        fold_constants: false,
        ..LowerConfig::default()
    };
    let mut b = IrFunctionBuilder::declare("f", &[Arg::new(TermType::Any)]);
    let x = arg(&b, 0);
    let one = konst(&mut b, Constant::Int(1));
    let hit = b.create_block(Some("hit"));
    let miss = b.create_block(Some("miss"));

    let m = Match {
        loc: None,
        selector: x,
        branches: vec![
            branch(hit, MatchPattern::Value(one)),
            branch(miss, MatchPattern::Any),
        ],
        fallthrough: None,
    };
    Lowerer::new(&mut b, &config).lower_match(&m).unwrap();
    return_atom(&mut b, hit, "hit");
    return_atom(&mut b, miss, "miss");
    let func = seal_function(b, &config).unwrap();

    assert_eq!(count(&func, |i| matches!(i, IrInstr::Eq { .. })), 1);
    assert_eq!(
        eval_function(&func, &[Term::Int(1)]).unwrap(),
        vec![Term::atom("hit")]
    );
    // Exact comparison: 1.0 is not 1.
    assert_eq!(
        eval_function(&func, &[Term::Float(1.0)]).unwrap(),
        vec![Term::atom("miss")]
    );
}

#[test]
fn test_literal_tuple_is_destructured_without_tests() {
    let config = LowerConfig::default();
    let mut b = IrFunctionBuilder::declare("f", &[Arg::new(TermType::Any)]);
    let x = arg(&b, 0);
    let one = konst(&mut b, Constant::Int(1));
    let tuple = b.emit(IrType::Term(TermType::Tuple(2)), |result| {
        IrInstr::MakeTuple {
            result,
            elements: vec![one, x],
        }
    });
    let dest = b.create_block(Some("dest"));
    b.add_block_param(dest, None, IrType::ANY);
    let second = b.add_block_param(dest, None, IrType::ANY);

    let m = Match {
        loc: None,
        selector: tuple,
        branches: vec![branch(dest, MatchPattern::Tuple(2))],
        fallthrough: None,
    };
    Lowerer::new(&mut b, &config).lower_match(&m).unwrap();
    b.set_current_block(dest);
    b.terminate(IrInstr::Return {
        values: vec![second],
    });
    let func = seal_function(b, &config).unwrap();

    assert_eq!(count(&func, |i| matches!(i, IrInstr::IsType { .. })), 0);
    assert_eq!(count(&func, |i| matches!(i, IrInstr::GetElement { .. })), 0);
    assert_eq!(
        eval_function(&func, &[Term::atom("y")]).unwrap(),
        vec![Term::atom("y")]
    );
}

#[test]
fn test_impossible_type_test_falls_through() {
    let config = LowerConfig::default();
    let mut b = IrFunctionBuilder::declare("f", &[Arg::new(TermType::Integer)]);
    let x = arg(&b, 0);
    let on_map = b.create_block(Some("on_map"));
    let other = b.create_block(Some("other"));

    let m = Match {
        loc: None,
        selector: x,
        branches: vec![
            branch(on_map, MatchPattern::IsType(TermType::Map)),
            branch(other, MatchPattern::IsType(TermType::Number)),
        ],
        fallthrough: None,
    };
    Lowerer::new(&mut b, &config).lower_match(&m).unwrap();
    return_atom(&mut b, on_map, "map");
    return_atom(&mut b, other, "number");
    let func = seal_function(b, &config).unwrap();

    // Integer can never be a map, and is always a number.
    assert_eq!(count(&func, |i| matches!(i, IrInstr::IsType { .. })), 0);
    assert_eq!(
        eval_function(&func, &[Term::Int(4)]).unwrap(),
        vec![Term::atom("number")]
    );
}

#[test]
fn test_exhausted_match_without_fallthrough_is_unreachable() {
    let config = LowerConfig::default();
    let mut b = IrFunctionBuilder::declare("f", &[Arg::new(TermType::Any)]);
    let x = arg(&b, 0);
    let on_atom = b.create_block(Some("on_atom"));

    let m = Match {
        loc: None,
        selector: x,
        branches: vec![branch(on_atom, MatchPattern::IsType(TermType::Atom))],
        fallthrough: None,
    };
    Lowerer::new(&mut b, &config).lower_match(&m).unwrap();
    return_atom(&mut b, on_atom, "atom");
    let func = seal_function(b, &config).unwrap();

    assert_eq!(count(&func, |i| matches!(i, IrInstr::Unreachable)), 1);
    assert_eq!(
        eval_function(&func, &[Term::atom("ok")]).unwrap(),
        vec![Term::atom("atom")]
    );
    let err = eval_function(&func, &[Term::Int(1)]).unwrap_err();
    assert!(matches!(err, InterpError::Unreachable { .. }));
}

#[test]
fn test_branches_after_any_are_not_emitted() {
    let config = LowerConfig::default();
    let mut b = IrFunctionBuilder::declare("f", &[Arg::new(TermType::Any)]);
    let x = arg(&b, 0);
    let first = b.create_block(Some("first"));
    let second = b.create_block(Some("second"));

    let m = Match {
        loc: None,
        selector: x,
        branches: vec![
            branch(first, MatchPattern::Any),
            branch(second, MatchPattern::IsType(TermType::Atom)),
        ],
        fallthrough: None,
    };
    Lowerer::new(&mut b, &config).lower_match(&m).unwrap();
    return_atom(&mut b, first, "first");
    return_atom(&mut b, second, "second");
    let func = seal_function(b, &config).unwrap();

    assert_eq!(count(&func, |i| matches!(i, IrInstr::IsType { .. })), 0);
    assert_eq!(
        eval_function(&func, &[Term::atom("a")]).unwrap(),
        vec![Term::atom("first")]
    );
}

#[test]
fn test_binary_pattern_binds_value_and_rest() {
    let config = LowerConfig::default();
    let mut b = IrFunctionBuilder::declare("f", &[Arg::new(TermType::Any)]);
    let x = arg(&b, 0);
    let dest = b.create_block(Some("dest"));
    let value = b.add_block_param(dest, Some("v"), IrType::ANY);
    let rest = b.add_block_param(dest, Some("rest"), IrType::ANY);
    let short = b.create_block(Some("short"));

    let spec = BinarySpecifier::integer(false, Endianness::Big, 8).unwrap();
    let size = konst(&mut b, Constant::Int(2));
    let m = Match {
        loc: None,
        selector: x,
        branches: vec![branch(
            dest,
            MatchPattern::Binary {
                spec,
                size: Some(size),
            },
        )],
        fallthrough: Some(short),
    };
    Lowerer::new(&mut b, &config).lower_match(&m).unwrap();
    b.set_current_block(dest);
    b.terminate(IrInstr::Return {
        values: vec![value, rest],
    });
    return_atom(&mut b, short, "short");
    let func = seal_function(b, &config).unwrap();

    assert_eq!(
        eval_function(&func, &[Term::binary(&[1, 2, 3])]).unwrap(),
        vec![Term::Int(258), Term::binary(&[3])]
    );
    assert_eq!(
        eval_function(&func, &[Term::binary(&[1])]).unwrap(),
        vec![Term::atom("short")]
    );
    assert_eq!(
        eval_function(&func, &[Term::Nil]).unwrap(),
        vec![Term::atom("short")]
    );
}

#[test]
fn test_branch_locations_are_stamped() {
    let config = LowerConfig::default();
    let mut b = IrFunctionBuilder::declare("f", &[Arg::new(TermType::Any)]);
    let x = arg(&b, 0);
    let on_map = b.create_block(Some("on_map"));
    let other = b.create_block(Some("other"));

    let m = Match {
        loc: Some(LocId(0)),
        selector: x,
        branches: vec![
            MatchBranch {
                loc: Some(LocId(1)),
                dest: on_map,
                dest_args: vec![],
                pattern: MatchPattern::IsType(TermType::Map),
            },
            branch(other, MatchPattern::Any),
        ],
        fallthrough: None,
    };
    Lowerer::new(&mut b, &config).lower_match(&m).unwrap();
    return_atom(&mut b, on_map, "map");
    return_atom(&mut b, other, "other");
    let func = seal_function(b, &config).unwrap();

    let entry = func.entry_block();
    assert!(entry.locs.iter().all(|l| *l == Some(LocId(1))));
    let next = func
        .blocks()
        .iter()
        .find(|blk| blk.name.as_deref() == Some("match.next"))
        .unwrap();
    assert_eq!(next.locs, vec![Some(LocId(0))]);
    // Code emitted after the match carries no location.
    let on_map_block = func.block(on_map).unwrap();
    assert!(on_map_block.locs.iter().all(Option::is_none));
}

/// ```text
/// entry:       br loop({1, 2})
/// loop(p):     case p of {a, b} -> body(a, b) end
/// body(a, b):  if a =:= 1 -> br loop({10, 20}); else -> br exit(b)
/// exit(r):     return r
/// ```
fn tuple_loop(config: &LowerConfig) -> IrFunction {
    let mut b = IrFunctionBuilder::declare("walk", &[]);
    let one = konst(&mut b, Constant::Int(1));
    let two = konst(&mut b, Constant::Int(2));
    let start = b.emit(IrType::Term(TermType::Tuple(2)), |result| {
        IrInstr::MakeTuple {
            result,
            elements: vec![one, two],
        }
    });
    let header = b.create_block(Some("loop"));
    let p = b.add_block_param(header, Some("p"), IrType::ANY);
    let body = b.create_block(Some("body"));
    let a = b.add_block_param(body, Some("a"), IrType::ANY);
    let second = b.add_block_param(body, Some("b"), IrType::ANY);
    let exit = b.create_block(Some("exit"));
    let r = b.add_block_param(exit, Some("r"), IrType::ANY);
    b.terminate(IrInstr::Br {
        target: header,
        args: vec![start],
    });

    // The back-edge into `loop` does not exist yet.
    b.set_current_block(header);
    let m = Match {
        loc: None,
        selector: p,
        branches: vec![branch(body, MatchPattern::Tuple(2))],
        fallthrough: None,
    };
    Lowerer::new(&mut b, config).lower_match(&m).unwrap();

    b.set_current_block(body);
    let one_again = konst(&mut b, Constant::Int(1));
    let again = b.emit(IrType::I1, |result| IrInstr::Eq {
        result,
        lhs: a,
        rhs: one_again,
    });
    let ten = konst(&mut b, Constant::Int(10));
    let twenty = konst(&mut b, Constant::Int(20));
    let next = b.emit(IrType::Term(TermType::Tuple(2)), |result| {
        IrInstr::MakeTuple {
            result,
            elements: vec![ten, twenty],
        }
    });
    b.terminate(IrInstr::CondBr {
        cond: again,
        then_block: header,
        then_args: vec![next],
        else_block: exit,
        else_args: vec![second],
    });
    b.set_current_block(exit);
    b.terminate(IrInstr::Return { values: vec![r] });
    seal_function(b, config).unwrap()
}

#[test]
fn test_loop_header_selector_is_not_folded_before_back_edge() {
    let folded = tuple_loop(&LowerConfig::default());
    assert_eq!(count(&folded, |i| matches!(i, IrInstr::IsType { .. })), 1);
    assert_eq!(count(&folded, |i| matches!(i, IrInstr::GetElement { .. })), 2);
    assert_eq!(eval_function(&folded, &[]).unwrap(), vec![Term::Int(20)]);

    let plain = tuple_loop(&LowerConfig {
        fold_constants: false,
        ..LowerConfig::default()
    });
    assert_eq!(eval_function(&plain, &[]).unwrap(), vec![Term::Int(20)]);
}

#[test]
fn test_selector_of_sealed_join_is_folded() {
    let config = LowerConfig::default();
    let mut b = IrFunctionBuilder::declare("f", &[Arg::new(TermType::Any)]);
    let x = arg(&b, 0);
    let one = konst(&mut b, Constant::Int(1));
    let tuple = b.emit(IrType::Term(TermType::Tuple(2)), |result| {
        IrInstr::MakeTuple {
            result,
            elements: vec![one, x],
        }
    });
    let join = b.create_block(Some("join"));
    let p = b.add_block_param(join, Some("p"), IrType::ANY);
    let dest = b.create_block(Some("dest"));
    b.add_block_param(dest, None, IrType::ANY);
    let second = b.add_block_param(dest, None, IrType::ANY);
    b.terminate(IrInstr::Br {
        target: join,
        args: vec![tuple],
    });
    b.seal_predecessors(join);

    b.set_current_block(join);
    let m = Match {
        loc: None,
        selector: p,
        branches: vec![branch(dest, MatchPattern::Tuple(2))],
        fallthrough: None,
    };
    Lowerer::new(&mut b, &config).lower_match(&m).unwrap();
    b.set_current_block(dest);
    b.terminate(IrInstr::Return {
        values: vec![second],
    });
    let func = seal_function(b, &config).unwrap();

    assert_eq!(count(&func, |i| matches!(i, IrInstr::IsType { .. })), 0);
    assert_eq!(count(&func, |i| matches!(i, IrInstr::GetElement { .. })), 0);
    assert_eq!(
        eval_function(&func, &[Term::atom("z")]).unwrap(),
        vec![Term::atom("z")]
    );
}

#[test]
fn test_type_tests_that_always_pass_end_the_match() {
    let config = LowerConfig::default();
    let mut b = IrFunctionBuilder::declare("f", &[Arg::new(TermType::Integer)]);
    let x = arg(&b, 0);
    let first = b.create_block(Some("first"));
    let second = b.create_block(Some("second"));

    let m = Match {
        loc: None,
        selector: x,
        branches: vec![
            branch(first, MatchPattern::IsType(TermType::Number)),
            branch(second, MatchPattern::Cons),
        ],
        fallthrough: None,
    };
    Lowerer::new(&mut b, &config).lower_match(&m).unwrap();
    return_atom(&mut b, first, "number");
    return_atom(&mut b, second, "cons");
    let func = seal_function(b, &config).unwrap();

    assert_eq!(count(&func, |i| matches!(i, IrInstr::IsType { .. })), 0);
    assert!(func
        .blocks()
        .iter()
        .all(|blk| !matches!(blk.name.as_deref(), Some("match.next" | "match.fail"))));
    assert_eq!(
        eval_function(&func, &[Term::Int(3)]).unwrap(),
        vec![Term::atom("number")]
    );
}

#[test]
fn test_is_type_any_is_irrefutable() {
    assert!(MatchPattern::IsType(TermType::Any).is_irrefutable());
    assert!(MatchPattern::Any.is_irrefutable());
    assert!(!MatchPattern::IsType(TermType::Atom).is_irrefutable());
}
