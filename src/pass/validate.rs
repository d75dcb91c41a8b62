//! SSA validation pass.
//!
//! Checks structural correctness of lowered functions. The pass is
//! conservative: it rejects anything it cannot prove correct.

use std::collections::HashSet;

use crate::error::PassError;
use crate::ir::block::IrBlock;
use crate::ir::function::IrFunction;
use crate::ir::instr::IrInstr;
use crate::ir::module::IrModule;
use crate::ir::value::ValueId;
use crate::pass::Pass;

/// Validates SSA invariants across the entire module.
///
/// Checks, per function:
/// 1. Every value used in an instruction is defined before its first use
///    (linear scan in block order, which the lowering emits in topological
///    order).
/// 2. Every value is defined exactly once.
/// 3. Every block ends with exactly one terminator as its last instruction.
/// 4. Every edge targets an existing block and binds exactly as many values
///    as the target has parameters. The `ok` edge of `BinaryMatch` binds two
///    (value, rest), the `ok` edge of `BinaryPush` one (the builder), and
///    `err` edges none.
pub struct ValidatePass;

impl Pass for ValidatePass {
    fn name(&self) -> &'static str {
        "validate"
    }

    fn run(&mut self, module: &mut IrModule) -> Result<(), PassError> {
        for func in module.functions() {
            validate_function(func)?;
        }
        Ok(())
    }
}

/// Checks one function. See `ValidatePass` for what is checked.
pub fn validate_function(func: &IrFunction) -> Result<(), PassError> {
    let twice = |value: ValueId| PassError::MultipleDefinition {
        func: func.name.clone(),
        value: value.to_string(),
    };
    let unsealed = |block: &IrBlock| PassError::MissingTerminator {
        func: func.name.clone(),
        block: block.label(),
    };

    let mut defined: HashSet<ValueId> = HashSet::new();
    for block in func.blocks() {
        if let Some(param) = block.params.iter().find(|p| !defined.insert(p.id)) {
            return Err(twice(param.id));
        }

        let Some((term, body)) = block.instrs.split_last() else {
            return Err(unsealed(block));
        };
        if !term.is_terminator() || body.iter().any(IrInstr::is_terminator) {
            return Err(unsealed(block));
        }

        for instr in block.instrs.iter() {
            if let Some(operand) = instr.operands().into_iter().find(|v| !defined.contains(v)) {
                return Err(PassError::UseBeforeDef {
                    func: func.name.clone(),
                    value: operand.to_string(),
                });
            }
            if let Some(result) = instr.result() {
                if !defined.insert(result) {
                    return Err(twice(result));
                }
            }
        }

        check_edges(func, block, term)?;
    }
    Ok(())
}

fn check_edges(func: &IrFunction, block: &IrBlock, term: &IrInstr) -> Result<(), PassError> {
    let produced = match term {
        IrInstr::BinaryMatch { .. } => 2,
        IrInstr::BinaryPush { .. } => 1,
        _ => 0,
    };
    for edge in term.edges() {
        let Some(target) = func.block(edge.target) else {
            return Err(PassError::UnknownBlock {
                func: func.name.clone(),
                block: block.label(),
                target: edge.target.to_string(),
            });
        };
        let found = edge.args.map_or(produced, <[ValueId]>::len);
        if found != target.params.len() {
            return Err(PassError::EdgeArity {
                func: func.name.clone(),
                from: block.id.to_string(),
                to: edge.target.to_string(),
                expected: target.params.len(),
                found,
            });
        }
    }
    Ok(())
}
