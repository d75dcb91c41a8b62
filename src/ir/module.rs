use std::collections::{HashMap, HashSet};

use crate::error::LowerError;
use crate::ir::block::{BlockId, IrBlock};
use crate::ir::constant::Constant;
use crate::ir::def::{self, Definition};
use crate::ir::function::{FunctionId, IrFunction};
use crate::ir::instr::{InstrId, IrInstr};
use crate::ir::loc::{Arg, LocId, Location};
use crate::ir::types::IrType;
use crate::ir::value::{BlockParam, ValueDef, ValueId};

/// Index of a constant in the module's attribute table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct AttrId(pub u32);

/// Owns everything the front-end refers to by handle while one module is
/// lowered: finished functions, source locations and constant attributes.
///
/// Handles index the tables directly, so entries are never removed or
/// reordered. Function names are unique.
#[derive(Debug, Default)]
pub struct IrModule {
    pub name: String,
    pub(crate) functions: Vec<IrFunction>,
    pub(crate) by_name: HashMap<String, FunctionId>,
    pub(crate) locations: Vec<Location>,
    pub(crate) attributes: Vec<Constant>,
}

impl IrModule {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn add_location(&mut self, loc: Location) -> LocId {
        self.locations.push(loc);
        LocId(self.locations.len() as u32 - 1)
    }

    pub fn location(&self, id: LocId) -> Option<&Location> {
        self.locations.get(id.0 as usize)
    }

    pub fn add_attribute(&mut self, value: Constant) -> AttrId {
        self.attributes.push(value);
        AttrId(self.attributes.len() as u32 - 1)
    }

    pub fn attribute(&self, id: AttrId) -> Option<&Constant> {
        self.attributes.get(id.0 as usize)
    }

    pub fn function(&self, id: FunctionId) -> Option<&IrFunction> {
        self.functions.get(id.0 as usize)
    }

    pub fn function_by_name(&self, name: &str) -> Option<&IrFunction> {
        self.by_name.get(name).and_then(|id| self.function(*id))
    }

    pub fn functions(&self) -> &[IrFunction] {
        &self.functions
    }

    /// Takes ownership of a sealed function and assigns its id.
    pub fn add_function(&mut self, mut func: IrFunction) -> Result<FunctionId, LowerError> {
        if self.by_name.contains_key(&func.name) {
            return Err(LowerError::DuplicateFunction { name: func.name });
        }
        let id = FunctionId(self.functions.len() as u32);
        func.id = id;
        self.by_name.insert(func.name.clone(), id);
        self.functions.push(func);
        Ok(id)
    }
}

/// Appends blocks and instructions to one function.
///
/// The builder keeps a cursor (the block instructions go to) and the
/// location stamped onto each instruction. `declare` leaves the cursor on
/// the entry block. Lowerings move it with `set_current_block` and seal
/// blocks with `terminate`; `build` or `finish` hands the function over.
///
/// Block handles passed in must come from `create_block` on the same
/// builder; an unknown `BlockId` is a caller bug and panics. Handles from
/// the front-end are checked by `abi::HandleScope` before they get here.
pub struct IrFunctionBuilder {
    func: IrFunction,
    cursor: Option<BlockId>,
    loc: Option<LocId>,
    final_preds: HashSet<BlockId>,
}

impl IrFunctionBuilder {
    /// Starts a function whose entry block takes one parameter per `args`
    /// entry, typed by its term type.
    pub fn declare(name: impl Into<String>, args: &[Arg]) -> Self {
        let mut builder = Self {
            func: IrFunction {
                id: FunctionId(0),
                name: name.into(),
                args: args.to_vec(),
                blocks: Vec::new(),
                value_defs: HashMap::new(),
                value_types: HashMap::new(),
                next_value: 0,
            },
            cursor: None,
            loc: None,
            final_preds: HashSet::new(),
        };
        let entry = builder.create_block(Some("entry"));
        for arg in args {
            builder.add_block_param(entry, None, IrType::Term(arg.ty));
        }
        builder.cursor = Some(entry);
        builder
    }

    /// The function so far. Analyses may inspect it at any point.
    pub fn func(&self) -> &IrFunction {
        &self.func
    }

    pub fn entry_block(&self) -> BlockId {
        IrFunction::ENTRY
    }

    pub fn create_block(&mut self, name: Option<&str>) -> BlockId {
        let id = BlockId(self.func.blocks.len() as u32);
        self.func.blocks.push(IrBlock::new(id, name.map(str::to_owned)));
        id
    }

    pub fn add_block_param(&mut self, block: BlockId, name: Option<&str>, ty: IrType) -> ValueId {
        let id = self.func.fresh_value();
        let params = &mut self.block_mut(block).params;
        let index = params.len();
        params.push(BlockParam {
            id,
            ty,
            name: name.map(str::to_owned),
        });
        self.func
            .value_defs
            .insert(id, ValueDef::BlockParam { block, index });
        self.func.value_types.insert(id, ty);
        id
    }

    /// Declares that every edge into `block` has been emitted. From then on
    /// `definition` may look through the block's parameters.
    pub fn seal_predecessors(&mut self, block: BlockId) {
        self.final_preds.insert(block);
    }

    pub fn predecessors_sealed(&self, block: BlockId) -> bool {
        self.final_preds.contains(&block)
    }

    /// The producer of `value` as far as the function built so far can
    /// tell. Only parameters of blocks passed to `seal_predecessors` are
    /// looked through.
    pub fn definition(&self, value: ValueId) -> Option<Definition<'_>> {
        def::definition_in(&self.func, value, &self.final_preds)
    }

    pub fn set_current_block(&mut self, block: BlockId) {
        self.cursor = Some(block);
    }

    /// Sets the location for instructions appended from now on and returns
    /// the one it replaces.
    pub fn set_location(&mut self, loc: Option<LocId>) -> Option<LocId> {
        std::mem::replace(&mut self.loc, loc)
    }

    /// Allocates a result, builds the instruction around it and appends it.
    pub fn emit(&mut self, ty: IrType, make: impl FnOnce(ValueId) -> IrInstr) -> ValueId {
        let result = self.func.fresh_value();
        let block = self.cursor();
        let index = InstrId(self.block_mut(block).instrs.len() as u32);
        self.func
            .value_defs
            .insert(result, ValueDef::InstrResult { block, instr: index });
        self.func.value_types.insert(result, ty);
        self.append(make(result));
        result
    }

    /// Seals the block under the cursor with `instr`.
    pub fn terminate(&mut self, instr: IrInstr) {
        debug_assert!(instr.is_terminator(), "not a terminator: {:?}", instr);
        self.append(instr);
    }

    /// Returns the function, asserting in debug builds that every block is
    /// sealed.
    pub fn build(self) -> IrFunction {
        #[cfg(debug_assertions)]
        for block in &self.func.blocks {
            assert!(block.is_sealed(), "block {} is not sealed", block.label());
        }
        self.func
    }

    /// Returns the function as is; unsealed blocks are left for the
    /// validator to report.
    pub fn finish(self) -> IrFunction {
        self.func
    }

    fn cursor(&self) -> BlockId {
        // `declare` always sets the cursor and nothing clears it.
        self.cursor.unwrap_or(IrFunction::ENTRY)
    }

    fn block_mut(&mut self, id: BlockId) -> &mut IrBlock {
        match self.func.blocks.get_mut(id.0 as usize) {
            Some(block) => block,
            None => panic!("block {} was not created by this builder", id),
        }
    }

    fn append(&mut self, instr: IrInstr) {
        let loc = self.loc;
        let id = self.cursor();
        let block = self.block_mut(id);
        block.instrs.push(instr);
        block.locs.push(loc);
    }
}
