//! IR pretty-printer.
//!
//! Emits a human-readable text representation of an `IrModule`.
//! Output is deterministic: functions are printed in `FunctionId` order,
//! blocks in `BlockId` order, instructions in program order.

use std::fmt::Write;

use crate::error::CodegenError;
use crate::ir::function::IrFunction;
use crate::ir::instr::IrInstr;
use crate::ir::module::IrModule;
use crate::ir::value::ValueId;

/// Emits a full text dump of the IR module.
pub fn emit_ir_text(module: &IrModule) -> Result<String, CodegenError> {
    let mut out = String::new();
    writeln!(out, "// module: {}", module.name)?;
    for func in module.functions() {
        writeln!(out)?;
        write_function(&mut out, func)?;
    }
    Ok(out)
}

/// Emits one function.
pub fn emit_function_text(func: &IrFunction) -> Result<String, CodegenError> {
    let mut out = String::new();
    write_function(&mut out, func)?;
    Ok(out)
}

fn write_function(out: &mut String, func: &IrFunction) -> Result<(), CodegenError> {
    write!(out, "func @{}(", func.name)?;
    for (i, arg) in func.args.iter().enumerate() {
        if i > 0 {
            write!(out, ", ")?;
        }
        if arg.implicit {
            write!(out, "implicit ")?;
        }
        write!(out, "{}", arg.ty)?;
    }
    writeln!(out, ") {{")?;

    for block in func.blocks() {
        write!(out, "  {}", block.id)?;
        if let Some(name) = &block.name {
            write!(out, " \"{}\"", name)?;
        }
        write!(out, "(")?;
        for (i, param) in block.params.iter().enumerate() {
            if i > 0 {
                write!(out, ", ")?;
            }
            write!(out, "{}: {}", param.id, param.ty)?;
        }
        writeln!(out, "):")?;

        for (instr, loc) in block.instrs.iter().zip(&block.locs) {
            write!(out, "    ")?;
            emit_instr(out, instr)?;
            if let Some(loc) = loc {
                write!(out, "  @{}", loc)?;
            }
            writeln!(out)?;
        }
    }
    writeln!(out, "}}")?;
    Ok(())
}

fn list(values: &[ValueId]) -> String {
    values
        .iter()
        .map(|v| v.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

fn emit_instr(out: &mut String, instr: &IrInstr) -> Result<(), CodegenError> {
    match instr {
        IrInstr::Const { result, value } => {
            write!(out, "{} = const {}", result, value)?;
        }
        IrInstr::IsType { result, value, ty } => {
            write!(out, "{} = is_type {}, {}", result, value, ty)?;
        }
        IrInstr::Eq { result, lhs, rhs } => {
            write!(out, "{} = eq.exact {}, {}", result, lhs, rhs)?;
        }
        IrInstr::MakeCons { result, head, tail } => {
            write!(out, "{} = cons {}, {}", result, head, tail)?;
        }
        IrInstr::GetHead { result, list } => {
            write!(out, "{} = head {}", result, list)?;
        }
        IrInstr::GetTail { result, list } => {
            write!(out, "{} = tail {}", result, list)?;
        }
        IrInstr::MakeTuple { result, elements } => {
            write!(out, "{} = tuple ({})", result, list(elements))?;
        }
        IrInstr::GetElement {
            result,
            tuple,
            index,
        } => {
            write!(out, "{} = element {}[{}]", result, tuple, index)?;
        }
        IrInstr::MakeMap { result, entries } => {
            let pairs = entries
                .iter()
                .map(|(k, v)| format!("{} => {}", k, v))
                .collect::<Vec<_>>()
                .join(", ");
            write!(out, "{} = map #{{{}}}", result, pairs)?;
        }
        IrInstr::MapIsKey { result, map, key } => {
            write!(out, "{} = map.is_key {}, {}", result, map, key)?;
        }
        IrInstr::MapGet { result, map, key } => {
            write!(out, "{} = map.get {}, {}", result, map, key)?;
        }
        IrInstr::MapPut {
            result,
            map,
            key,
            value,
        } => {
            write!(out, "{} = map.put {}, {} => {}", result, map, key, value)?;
        }
        IrInstr::MapReplace {
            result,
            map,
            key,
            value,
        } => {
            write!(out, "{} = map.replace {}, {} := {}", result, map, key, value)?;
        }
        IrInstr::FunctionRef {
            result,
            callee,
            version,
        } => {
            write!(
                out,
                "{} = fun.ref {} index={} old_unique={} unique={:?}",
                result, callee, version.index, version.old_unique, version.unique
            )?;
        }
        IrInstr::MakeClosure {
            result,
            callee,
            version,
            env,
        } => {
            write!(
                out,
                "{} = closure {} index={} old_unique={} unique={:?} env=[{}]",
                result,
                callee,
                version.index,
                version.old_unique,
                version.unique,
                list(env)
            )?;
        }
        IrInstr::BinaryStart { result } => {
            write!(out, "{} = binary.start", result)?;
        }
        IrInstr::BinaryFinish { result, builder } => {
            write!(out, "{} = binary.finish {}", result, builder)?;
        }
        IrInstr::BinaryPush {
            builder,
            value,
            segment,
            ok,
            err,
        } => {
            write!(
                out,
                "binary.push {}, {} : {} ok {} err {}",
                builder, value, segment, ok, err
            )?;
        }
        IrInstr::BinaryMatch {
            bin,
            segment,
            ok,
            err,
        } => {
            write!(
                out,
                "binary.match {} : {} ok {} err {}",
                bin, segment, ok, err
            )?;
        }
        IrInstr::Br { target, args } => {
            write!(out, "br {}({})", target, list(args))?;
        }
        IrInstr::CondBr {
            cond,
            then_block,
            then_args,
            else_block,
            else_args,
        } => {
            write!(
                out,
                "cond_br {}, {}({}), {}({})",
                cond,
                then_block,
                list(then_args),
                else_block,
                list(else_args)
            )?;
        }
        IrInstr::Return { values } => {
            write!(out, "return {}", list(values))?;
        }
        IrInstr::Unreachable => {
            write!(out, "unreachable")?;
        }
    }
    Ok(())
}
