//! termlower: lowering of term-level constructs into block-parameter SSA.
//!
//! Pipeline for one function body:
//!
//! ```text
//! front-end descriptors (abi::Raw*) → abi::decode_* → [Match / MapUpdate /
//!   BinarySegment / Closure] → Lowerer → [IrFunction] → ValidatePass → code generator
//! ```
//!
//! Components:
//! 1. `ir::types`: term type tags and the subtype lattice
//! 2. `ir::def`: value definition resolver
//! 3. `ir::binary`: binary segment specifiers and widths
//! 4. `lower::pattern`: ordered pattern match compilation
//! 5. `lower::map`: all-or-nothing map update sequencing
//! 6. `lower::closure`: closure materialization
//!
//! `interp` is a reference evaluator for the emitted dialect.

pub mod abi;
pub mod codegen;
pub mod config;
pub mod error;
pub mod interp;
pub mod ir;
pub mod lower;
pub mod pass;

pub use config::LowerConfig;
pub use error::Error;
pub use lower::Lowerer;

use tracing::debug;

use crate::ir::function::IrFunction;
use crate::ir::module::IrFunctionBuilder;

/// Takes the finished function out of `builder`, running the SSA validator
/// first when `config.verify` is set.
pub fn seal_function(
    builder: IrFunctionBuilder,
    config: &LowerConfig,
) -> Result<IrFunction, Error> {
    let func = builder.finish();
    if config.verify {
        pass::validate_function(&func)?;
        debug!(
            function = %func.name,
            blocks = func.blocks().len(),
            values = func.value_count(),
            "function verified"
        );
    }
    Ok(func)
}
