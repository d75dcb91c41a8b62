//! Value definition resolution.
//!
//! Finds the single instruction that produced a value, looking through
//! block parameters by following every predecessor edge back to the operand
//! it forwards. "No single producer" is an ordinary answer: callers use the
//! result to spot literal constructions they can simplify, and must treat
//! `None` as "unknown", never as an error.
//!
//! Loop back-edges can route a block parameter into itself. The walk keeps
//! the `(block, parameter index)` pairs on the current path and answers
//! `None` when it meets one again. Finished pairs are memoized, so each is
//! resolved once per query however many paths reach it.
//!
//! While a function is still under construction its edges are incomplete.
//! `definition_in` only looks through parameters of blocks whose
//! predecessor set the caller has declared final.

use std::collections::{HashMap, HashSet};

use tracing::trace;

use crate::ir::block::BlockId;
use crate::ir::constant::Constant;
use crate::ir::function::IrFunction;
use crate::ir::instr::{InstrId, IrInstr};
use crate::ir::value::{ValueDef, ValueId};

/// The producing instruction of a value.
#[derive(Debug, Clone, Copy)]
pub struct Definition<'f> {
    pub block: BlockId,
    pub instr: InstrId,
    pub op: &'f IrInstr,
}

impl PartialEq for Definition<'_> {
    fn eq(&self, other: &Self) -> bool {
        self.block == other.block && self.instr == other.instr
    }
}

impl Eq for Definition<'_> {}

/// Returns the instruction that produced `value`, or `None` when no single
/// producer can be determined. `func` is taken to be complete.
///
/// - Instruction results resolve to their instruction.
/// - Entry-block parameters come from the caller and resolve to `None`.
/// - Parameters of blocks without predecessors resolve to `None`.
/// - Other parameters resolve through every incoming edge; all edges must
///   agree on one producer.
pub fn definition(func: &IrFunction, value: ValueId) -> Option<Definition<'_>> {
    Resolver::new(func, None).resolve(value)
}

/// Like `definition` for a function still being built: parameters of blocks
/// outside `final_preds` resolve to `None`, since edges into them may still
/// be added.
pub fn definition_in<'f>(
    func: &'f IrFunction,
    value: ValueId,
    final_preds: &HashSet<BlockId>,
) -> Option<Definition<'f>> {
    Resolver::new(func, Some(final_preds)).resolve(value)
}

/// Like `definition`, but also requires the producer to satisfy `pred`.
pub fn definition_where<'f>(
    func: &'f IrFunction,
    value: ValueId,
    pred: impl FnOnce(&IrInstr) -> bool,
) -> Option<Definition<'f>> {
    definition(func, value).filter(|d| pred(d.op))
}

/// Returns the literal behind `value` if it was produced by `Const`.
pub fn constant(func: &IrFunction, value: ValueId) -> Option<&Constant> {
    match definition(func, value)?.op {
        IrInstr::Const { value, .. } => Some(value),
        _ => None,
    }
}

type ParamKey = (BlockId, usize);

struct Resolver<'f, 's> {
    func: &'f IrFunction,
    final_preds: Option<&'s HashSet<BlockId>>,
    preds: Option<HashMap<BlockId, Vec<BlockId>>>,
    on_path: HashSet<ParamKey>,
    memo: HashMap<ParamKey, Option<Definition<'f>>>,
    /// Bumped on every cycle cut-off. A `None` computed while it moved
    /// depends on the path taken and is not memoized.
    cuts: usize,
}

impl<'f, 's> Resolver<'f, 's> {
    fn new(func: &'f IrFunction, final_preds: Option<&'s HashSet<BlockId>>) -> Self {
        Self {
            func,
            final_preds,
            preds: None,
            on_path: HashSet::new(),
            memo: HashMap::new(),
            cuts: 0,
        }
    }

    fn resolve(&mut self, value: ValueId) -> Option<Definition<'f>> {
        match *self.func.value_def(value)? {
            ValueDef::InstrResult { block, instr } => {
                let op = self.func.block(block)?.instrs.get(instr.0 as usize)?;
                Some(Definition { block, instr, op })
            }
            ValueDef::BlockParam { block, index } => {
                if block == IrFunction::ENTRY {
                    return None;
                }
                if self.final_preds.is_some_and(|set| !set.contains(&block)) {
                    trace!(%block, index, "predecessors still open, not resolved");
                    return None;
                }
                let key = (block, index);
                if let Some(known) = self.memo.get(&key) {
                    return *known;
                }
                if !self.on_path.insert(key) {
                    trace!(%block, index, "definition walk hit a cycle");
                    self.cuts += 1;
                    return None;
                }
                let cuts_before = self.cuts;
                let found = self.resolve_param(block, index);
                self.on_path.remove(&key);
                if found.is_some() || self.cuts == cuts_before {
                    self.memo.insert(key, found);
                }
                found
            }
        }
    }

    fn resolve_param(&mut self, block: BlockId, index: usize) -> Option<Definition<'f>> {
        let func = self.func;
        let preds = self
            .preds
            .get_or_insert_with(|| func.predecessor_map())
            .get(&block)?
            .clone();

        let mut found: Option<Definition<'f>> = None;
        for pred in preds {
            let term = func.block(pred)?.terminator()?;
            for edge in term.edges().into_iter().filter(|e| e.target == block) {
                // Values bound by the terminator itself have no forwarded operand.
                let incoming = *edge.args?.get(index)?;
                let def = self.resolve(incoming)?;
                match found {
                    Some(prev) if prev != def => return None,
                    _ => found = Some(def),
                }
            }
        }
        found
    }
}
