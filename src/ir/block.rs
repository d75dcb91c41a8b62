use std::fmt;

use crate::ir::instr::IrInstr;
use crate::ir::loc::LocId;
use crate::ir::value::BlockParam;

/// Position of a block in its function's block list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BlockId(pub u32);

impl fmt::Display for BlockId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "bb{}", self.0)
    }
}

/// A straight-line run of instructions entered only at the top.
///
/// Values flowing in from predecessors arrive as `params`. A block is
/// sealed once its last instruction is a terminator, after which nothing
/// more may be appended. `locs[i]` is the source location of `instrs[i]`.
#[derive(Debug, Clone)]
pub struct IrBlock {
    pub id: BlockId,
    pub params: Vec<BlockParam>,
    pub instrs: Vec<IrInstr>,
    pub locs: Vec<Option<LocId>>,
    /// Hint shown next to the id in dumps and diagnostics, e.g. `match.fail`.
    pub name: Option<String>,
}

impl IrBlock {
    pub fn new(id: BlockId, name: Option<String>) -> Self {
        Self {
            id,
            params: Vec::new(),
            instrs: Vec::new(),
            locs: Vec::new(),
            name,
        }
    }

    pub fn terminator(&self) -> Option<&IrInstr> {
        self.instrs.last().filter(|instr| instr.is_terminator())
    }

    pub fn is_sealed(&self) -> bool {
        self.terminator().is_some()
    }

    /// `bb3 (match.fail)` when the block is named, `bb3` otherwise.
    pub fn label(&self) -> String {
        match &self.name {
            Some(name) => format!("{} ({})", self.id, name),
            None => self.id.to_string(),
        }
    }
}
