//! Descriptor → IR lowering.
//!
//! A `Lowerer` wraps the builder of the function being lowered. Each entry
//! point consumes one front-end descriptor (a match, a map update, a list of
//! binary segments, a closure) and appends the control flow that implements
//! it. Entry points that branch leave every block they create sealed; those
//! that produce a value leave the cursor on the block where that value is
//! available.
//!
//! With `LowerConfig::fold_constants` set, the lowerer consults the value
//! definition resolver and drops tests whose outcome is already known.

pub mod binary;
pub mod closure;
pub mod map;
pub mod pattern;

pub use binary::BinarySegment;
pub use closure::Closure;
pub use map::{KeyValuePair, MapAction, MapEntry, MapUpdate};
pub use pattern::{Match, MatchBranch, MatchPattern};

use tracing::trace;

use crate::config::LowerConfig;
use crate::error::LowerError;
use crate::ir::block::BlockId;
use crate::ir::constant::Constant;
use crate::ir::def::Definition;
use crate::ir::instr::IrInstr;
use crate::ir::module::IrFunctionBuilder;
use crate::ir::types::{IrType, TermType};
use crate::ir::value::ValueId;

/// Lowers front-end descriptors into the function under construction.
pub struct Lowerer<'b> {
    builder: &'b mut IrFunctionBuilder,
    config: &'b LowerConfig,
}

impl<'b> Lowerer<'b> {
    pub fn new(builder: &'b mut IrFunctionBuilder, config: &'b LowerConfig) -> Self {
        Self { builder, config }
    }

    /// The underlying builder, for emitting code between lowerings.
    pub fn builder(&mut self) -> &mut IrFunctionBuilder {
        &mut *self.builder
    }

    pub fn config(&self) -> &LowerConfig {
        self.config
    }

    // -----------------------------------------------------------------------
    // Static facts
    // -----------------------------------------------------------------------

    /// The producer of `value`, or `None` when folding is disabled.
    ///
    /// Block parameters are only looked through once the builder has been
    /// told their predecessors are final; a loop header still waiting for
    /// its back-edge has no known producer.
    fn definition(&self, value: ValueId) -> Option<Definition<'_>> {
        if !self.config.fold_constants {
            return None;
        }
        self.builder.definition(value)
    }

    /// The literal behind `value`, if it was produced by a `Const`.
    fn constant(&self, value: ValueId) -> Option<&Constant> {
        match self.definition(value)?.op {
            IrInstr::Const { value, .. } => Some(value),
            _ => None,
        }
    }

    /// The most precise type known for `value` at compile time.
    fn known_type(&self, value: ValueId) -> TermType {
        let declared = self
            .builder
            .func()
            .value_type(value)
            .and_then(IrType::term)
            .unwrap_or(TermType::Any);
        let Some(def) = self.definition(value) else {
            return declared;
        };
        match def.op {
            IrInstr::Const { value, .. } => value.term_type(),
            IrInstr::MakeCons { .. } => TermType::Cons,
            IrInstr::MakeTuple { elements, .. } => TermType::Tuple(elements.len() as u32),
            IrInstr::MakeMap { .. } | IrInstr::MapPut { .. } | IrInstr::MapReplace { .. } => {
                TermType::Map
            }
            IrInstr::FunctionRef { .. } | IrInstr::MakeClosure { .. } => TermType::Closure,
            IrInstr::BinaryFinish { .. } => TermType::Binary,
            _ => declared,
        }
    }

    /// Whether `a` and `b` are statically the same term.
    fn same_term(&self, a: ValueId, b: ValueId) -> bool {
        if !self.config.fold_constants {
            return false;
        }
        if a == b {
            return true;
        }
        match (self.constant(a), self.constant(b)) {
            (Some(x), Some(y)) => x.exact_eq(y),
            _ => false,
        }
    }

    // -----------------------------------------------------------------------
    // Emission helpers
    // -----------------------------------------------------------------------

    /// Fails unless `block` takes exactly `found` parameters.
    fn check_arity(&self, block: BlockId, found: usize) -> Result<(), LowerError> {
        let expected = self
            .builder
            .func()
            .block(block)
            .ok_or(LowerError::UnknownHandle {
                what: "block",
                handle: block.0,
            })?
            .params
            .len();
        if expected != found {
            return Err(LowerError::DestinationArity {
                block: block.to_string(),
                expected,
                found,
            });
        }
        Ok(())
    }

    fn br(&mut self, target: BlockId, args: Vec<ValueId>) {
        self.builder.terminate(IrInstr::Br { target, args });
    }

    /// Branches on `cond` to a fresh block named `name`, or to `fail`.
    /// Leaves the cursor on the fresh block.
    fn branch_or_fail(&mut self, cond: ValueId, name: &str, fail: BlockId) -> BlockId {
        let pass = self.builder.create_block(Some(name));
        self.builder.terminate(IrInstr::CondBr {
            cond,
            then_block: pass,
            then_args: vec![],
            else_block: fail,
            else_args: vec![],
        });
        self.builder.set_current_block(pass);
        pass
    }

    /// Lets control continue only when `value` has type `ty`.
    ///
    /// Returns `false` when the test can never pass; the current block has
    /// then been sealed with a branch to `fail` and nothing may follow.
    fn guard_type(&mut self, value: ValueId, ty: TermType, fail: BlockId) -> bool {
        if self.config.fold_constants {
            let known = self.known_type(value);
            if known.is_subtype_of(&ty) {
                trace!(%value, %known, %ty, "type test elided");
                return true;
            }
            if !known.overlaps(&ty) {
                trace!(%value, %known, %ty, "type test cannot pass");
                self.br(fail, vec![]);
                return false;
            }
        }
        let cond = self
            .builder
            .emit(IrType::I1, |result| IrInstr::IsType { result, value, ty });
        self.branch_or_fail(cond, "is_type", fail);
        true
    }
}
