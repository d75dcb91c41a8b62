use tracing::debug;

use crate::ir::function::{ClosureVersion, FunctionSymbol};
use crate::ir::instr::IrInstr;
use crate::ir::loc::LocId;
use crate::ir::types::{IrType, TermType};
use crate::ir::value::ValueId;
use crate::lower::Lowerer;

/// Everything needed to materialize a fun: the callee, the version
/// fingerprint hot upgrade matches against, and the captured values.
#[derive(Debug, Clone)]
pub struct Closure {
    pub loc: Option<LocId>,
    pub symbol: FunctionSymbol,
    pub version: ClosureVersion,
    pub env: Vec<ValueId>,
}

impl Lowerer<'_> {
    /// Emits the closure value at the cursor.
    ///
    /// An empty environment needs no storage and lowers to a bare
    /// `FunctionRef`; otherwise `MakeClosure` allocates an environment
    /// holding `env` in order.
    pub fn lower_closure(&mut self, closure: &Closure) -> ValueId {
        let saved = self.builder.set_location(closure.loc);
        let ty = IrType::Term(TermType::Closure);
        let callee = closure.symbol.clone();

        let version = closure.version;

        let value = if closure.env.is_empty() {
            debug!(%callee, "closure without environment lowered to function reference");
            self.builder.emit(ty, |result| IrInstr::FunctionRef {
                result,
                callee,
                version,
            })
        } else {
            let env = closure.env.clone();
            self.builder.emit(ty, |result| IrInstr::MakeClosure {
                result,
                callee,
                version,
                env,
            })
        };

        self.builder.set_location(saved);
        value
    }
}
