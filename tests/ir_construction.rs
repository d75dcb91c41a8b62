//! Tests that construct IR using the builder API directly, without any
//! descriptor lowering. These verify IR invariants at the type and
//! structure level, and the validator and printer that check them.

use termlower::codegen::{emit_function_text, emit_ir_text};
use termlower::error::{LowerError, PassError};
use termlower::ir::{
    Arg, Constant, IrFunction, IrFunctionBuilder, IrInstr, IrModule, IrType, LocId, TermType,
    ValueDef,
};
use termlower::pass::{validate_function, PassManager, ValidatePass};
use termlower::{seal_function, Error, LowerConfig};

fn identity(name: &str) -> IrFunction {
    let mut b = IrFunctionBuilder::declare(name, &[Arg::new(TermType::Any)]);
    let x = b.func().entry_block().params[0].id;
    b.terminate(IrInstr::Return { values: vec![x] });
    b.build()
}

#[test]
fn test_declare_binds_entry_params() {
    let args = [Arg::new(TermType::Integer), Arg::new(TermType::Map)];
    let mut b = IrFunctionBuilder::declare("f", &args);
    let entry = b.entry_block();
    let params: Vec<_> = b.func().entry_block().params.iter().map(|p| p.id).collect();
    b.terminate(IrInstr::Return {
        values: params.clone(),
    });
    let func = b.build();

    assert_eq!(func.blocks().len(), 1);
    assert_eq!(func.entry_block().params.len(), 2);
    assert_eq!(func.value_count(), 2);
    assert_eq!(
        func.value_type(params[1]),
        Some(&IrType::Term(TermType::Map))
    );
    assert_eq!(
        func.value_def(params[1]),
        Some(&ValueDef::BlockParam {
            block: entry,
            index: 1
        })
    );
    assert_eq!(func.value_def(params[0]).map(|d| d.block()), Some(entry));
}

#[test]
fn test_value_types_recorded() {
    let mut b = IrFunctionBuilder::declare("f", &[]);
    let c = b.emit(IrType::Term(TermType::Integer), |result| IrInstr::Const {
        result,
        value: Constant::Int(3),
    });
    b.terminate(IrInstr::Return { values: vec![c] });
    let func = b.build();

    assert_eq!(func.value_type(c), Some(&IrType::Term(TermType::Integer)));
}

#[test]
fn test_duplicate_function_name_rejected() {
    let mut module = IrModule::new("dup_test");
    module.add_function(identity("foo")).unwrap();
    let result = module.add_function(identity("foo"));
    assert!(matches!(
        result,
        Err(LowerError::DuplicateFunction { ref name }) if name == "foo"
    ));
    assert!(module.function_by_name("foo").is_some());
}

#[test]
fn test_multi_block_function_predecessors() {
    let mut b = IrFunctionBuilder::declare("two_blocks", &[Arg::new(TermType::Any)]);
    let x = b.func().entry_block().params[0].id;
    let merge = b.create_block(Some("merge"));
    let v = b.add_block_param(merge, Some("v"), IrType::ANY);
    b.terminate(IrInstr::Br {
        target: merge,
        args: vec![x],
    });
    b.set_current_block(merge);
    b.terminate(IrInstr::Return { values: vec![v] });
    let func = b.build();

    assert_eq!(func.predecessors(merge), vec![IrFunction::ENTRY]);
    assert!(func.predecessors(IrFunction::ENTRY).is_empty());
    validate_function(&func).unwrap();
}

#[test]
fn test_use_before_def_rejected() {
    let mut b = IrFunctionBuilder::declare("f", &[]);
    let later = b.create_block(Some("later"));
    let c = {
        b.set_current_block(later);
        b.emit(IrType::ANY, |result| IrInstr::Const {
            result,
            value: Constant::Nil,
        })
    };
    b.terminate(IrInstr::Return { values: vec![c] });
    b.set_current_block(IrFunction::ENTRY);
    b.terminate(IrInstr::Return { values: vec![c] });
    let func = b.build();

    let err = validate_function(&func).unwrap_err();
    assert!(matches!(err, PassError::UseBeforeDef { .. }));
}

#[test]
fn test_unsealed_block_rejected() {
    let config = LowerConfig::default();
    let mut b = IrFunctionBuilder::declare("f", &[]);
    b.terminate(IrInstr::Return { values: vec![] });
    b.create_block(Some("dangling"));

    let err = seal_function(b, &config).unwrap_err();
    assert!(matches!(
        err,
        Error::Pass(PassError::MissingTerminator { .. })
    ));
}

#[test]
fn test_unsealed_block_passes_without_verification() {
    let config = LowerConfig {
        verify: false,
        ..LowerConfig::default()
    };
    let mut b = IrFunctionBuilder::declare("f", &[]);
    b.terminate(IrInstr::Return { values: vec![] });
    b.create_block(Some("dangling"));

    let func = seal_function(b, &config).unwrap();
    assert_eq!(func.blocks().len(), 2);
}

#[test]
fn test_edge_arity_mismatch_rejected() {
    let mut b = IrFunctionBuilder::declare("f", &[]);
    let target = b.create_block(Some("target"));
    b.add_block_param(target, None, IrType::ANY);
    b.terminate(IrInstr::Br {
        target,
        args: vec![],
    });
    b.set_current_block(target);
    b.terminate(IrInstr::Return { values: vec![] });
    let func = b.build();

    let err = validate_function(&func).unwrap_err();
    assert!(matches!(
        err,
        PassError::EdgeArity {
            expected: 1,
            found: 0,
            ..
        }
    ));
}

#[test]
fn test_branch_to_unknown_block_rejected() {
    let mut b = IrFunctionBuilder::declare("f", &[]);
    b.terminate(IrInstr::Br {
        target: termlower::ir::BlockId(9),
        args: vec![],
    });
    let func = b.build();

    let err = validate_function(&func).unwrap_err();
    assert!(matches!(err, PassError::UnknownBlock { .. }));
}

#[test]
fn test_pass_manager_runs_validation_over_module() {
    let mut module = IrModule::new("m");
    module.add_function(identity("a")).unwrap();
    module.add_function(identity("b")).unwrap();

    let mut pm = PassManager::new();
    pm.add_pass(ValidatePass);
    pm.set_dump_after("validate");
    assert_eq!(pm.pass_names(), vec!["validate"]);
    pm.run(&mut module).unwrap();
}

#[test]
fn test_pass_pipeline_follows_verify_flag() {
    let verifying = PassManager::from_config(&LowerConfig::default());
    assert_eq!(verifying.pass_names(), vec!["validate"]);

    let quiet = PassManager::from_config(&LowerConfig {
        verify: false,
        ..LowerConfig::default()
    });
    assert!(quiet.pass_names().is_empty());
}

#[test]
fn test_printer_output() {
    let mut module = IrModule::new("demo");
    let mut b = IrFunctionBuilder::declare("check", &[Arg::new(TermType::Any)]);
    let x = b.func().entry_block().params[0].id;
    let yes = b.create_block(Some("yes"));
    let no = b.create_block(Some("no"));
    b.set_location(Some(LocId(0)));
    let cond = b.emit(IrType::I1, |result| IrInstr::IsType {
        result,
        value: x,
        ty: TermType::Tuple(2),
    });
    b.set_location(None);
    b.terminate(IrInstr::CondBr {
        cond,
        then_block: yes,
        then_args: vec![],
        else_block: no,
        else_args: vec![],
    });
    b.set_current_block(yes);
    b.terminate(IrInstr::Return { values: vec![x] });
    b.set_current_block(no);
    b.terminate(IrInstr::Unreachable);
    let func = b.build();

    let text = emit_function_text(&func).unwrap();
    assert!(text.starts_with("func @check(term) {"), "{}", text);
    assert!(text.contains("%1 = is_type %0, tuple<2>  @loc0"), "{}", text);
    assert!(text.contains("cond_br %1, bb1(), bb2()"), "{}", text);
    assert!(text.contains("bb2 \"no\"():"), "{}", text);
    assert!(text.contains("unreachable"), "{}", text);

    module.add_function(func).unwrap();
    let module_text = emit_ir_text(&module).unwrap();
    assert!(module_text.starts_with("// module: demo"));
    assert!(module_text.contains("func @check"));
}

#[test]
#[should_panic(expected = "was not created by this builder")]
fn test_foreign_block_handle_is_a_builder_bug() {
    let mut b = IrFunctionBuilder::declare("f", &[]);
    b.add_block_param(termlower::ir::BlockId(7), None, IrType::ANY);
}
