use std::collections::HashMap;
use std::fmt;

use crate::error::LowerError;
use crate::ir::block::{BlockId, IrBlock};
use crate::ir::loc::Arg;
use crate::ir::types::IrType;
use crate::ir::value::{ValueDef, ValueId};

/// Position of a function in its module.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FunctionId(pub u32);

/// Largest arity a function may declare.
pub const MAX_FUNCTION_ARITY: u32 = 255;

/// Module/name/arity identity of a source function.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FunctionSymbol {
    pub module: String,
    pub name: String,
    pub arity: u8,
}

impl FunctionSymbol {
    /// Builds a symbol, rejecting arities that do not fit the runtime's
    /// one-byte arity field.
    pub fn new(
        module: impl Into<String>,
        name: impl Into<String>,
        arity: u32,
    ) -> Result<Self, LowerError> {
        let arity = u8::try_from(arity).map_err(|_| LowerError::ArityOutOfRange {
            what: "function",
            arity: arity as u64,
            max: MAX_FUNCTION_ARITY as u64,
        })?;
        Ok(Self {
            module: module.into(),
            name: name.into(),
            arity,
        })
    }
}

impl fmt::Display for FunctionSymbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}/{}", self.module, self.name, self.arity)
    }
}

/// 16-byte identity blob used by hot code upgrade to match closures
/// against their defining module version. Compared bitwise only.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Uniq(pub [u8; 16]);

impl fmt::Debug for Uniq {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Uniq(")?;
        for b in &self.0 {
            write!(f, "{:02x}", b)?;
        }
        write!(f, ")")
    }
}

/// Version fingerprint of a closure's defining function.
///
/// Carried through lowering untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct ClosureVersion {
    /// Monotonic index of the fun within its module.
    pub index: u32,
    /// Tag of the previous version of the fun.
    pub old_unique: u32,
    pub unique: Uniq,
}

/// One lowered function body.
///
/// `blocks[n]` is `BlockId(n)` and block 0 is the entry, whose parameters
/// are `args`. Every value has an entry in both side tables from the moment
/// the builder allocates it.
#[derive(Debug, Clone)]
pub struct IrFunction {
    pub id: FunctionId,
    pub name: String,
    pub args: Vec<Arg>,
    pub(crate) blocks: Vec<IrBlock>,
    pub(crate) value_defs: HashMap<ValueId, ValueDef>,
    pub(crate) value_types: HashMap<ValueId, IrType>,
    pub(crate) next_value: u32,
}

impl IrFunction {
    pub const ENTRY: BlockId = BlockId(0);

    pub fn entry_block(&self) -> &IrBlock {
        &self.blocks[Self::ENTRY.0 as usize]
    }

    pub fn block(&self, id: BlockId) -> Option<&IrBlock> {
        self.blocks.get(id.0 as usize)
    }

    pub fn blocks(&self) -> &[IrBlock] {
        &self.blocks
    }

    pub fn value_type(&self, value: ValueId) -> Option<&IrType> {
        self.value_types.get(&value)
    }

    pub fn value_def(&self, value: ValueId) -> Option<&ValueDef> {
        self.value_defs.get(&value)
    }

    /// Number of values allocated so far.
    pub fn value_count(&self) -> u32 {
        self.next_value
    }

    /// Blocks whose terminator has at least one edge into `block`, in block
    /// order, without duplicates.
    pub fn predecessors(&self, block: BlockId) -> Vec<BlockId> {
        self.blocks
            .iter()
            .filter(|b| {
                b.terminator()
                    .map_or(false, |t| t.successors().contains(&block))
            })
            .map(|b| b.id)
            .collect()
    }

    /// Predecessors of every block with at least one, computed in a single
    /// scan. Each list is in block order without duplicates.
    pub fn predecessor_map(&self) -> HashMap<BlockId, Vec<BlockId>> {
        let mut map: HashMap<BlockId, Vec<BlockId>> = HashMap::new();
        for block in &self.blocks {
            let Some(term) = block.terminator() else {
                continue;
            };
            for target in term.successors() {
                let preds = map.entry(target).or_default();
                if preds.last() != Some(&block.id) {
                    preds.push(block.id);
                }
            }
        }
        map
    }

    pub(crate) fn fresh_value(&mut self) -> ValueId {
        self.next_value += 1;
        ValueId(self.next_value - 1)
    }
}
