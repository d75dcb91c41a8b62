use std::fmt;

use crate::ir::block::BlockId;
use crate::ir::instr::InstrId;
use crate::ir::types::IrType;

/// Handle to an SSA value. Only meaningful inside the function that
/// allocated it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ValueId(pub u32);

impl fmt::Display for ValueId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "%{}", self.0)
    }
}

/// A value bound on entry to a block. Each incoming edge supplies one
/// argument per parameter, in order; the entry block's parameters are the
/// function's arguments.
#[derive(Debug, Clone)]
pub struct BlockParam {
    pub id: ValueId,
    pub ty: IrType,
    pub name: Option<String>,
}

/// Where a value comes from. Each value has exactly one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueDef {
    BlockParam { block: BlockId, index: usize },
    InstrResult { block: BlockId, instr: InstrId },
}

impl ValueDef {
    /// The block the value becomes available in.
    pub fn block(&self) -> BlockId {
        match *self {
            ValueDef::BlockParam { block, .. } | ValueDef::InstrResult { block, .. } => block,
        }
    }
}
